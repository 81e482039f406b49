// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::io::Read;

use crate::decoder::{DecodeError, Decoder, VideoDetails};
use nlmeans::prelude::*;

impl<R: Read> Decoder for y4m::Decoder<R> {
  fn get_video_details(&self) -> VideoDetails {
    let colorspace = self.get_colorspace();
    VideoDetails {
      width: self.get_width(),
      height: self.get_height(),
      chroma_sampling: map_y4m_color_space(colorspace)
        .unwrap_or(ChromaSampling::Cs420),
      colorspace,
      framerate: self.get_framerate(),
      pixel_aspect: self.get_pixel_aspect(),
    }
  }

  fn read_frame(&mut self, cfg: &VideoDetails) -> Result<Frame, DecodeError> {
    let layout = cfg.layout();
    let (chroma_width, _) =
      cfg.chroma_sampling.get_chroma_dimensions(cfg.width, cfg.height);

    let frame = y4m::Decoder::read_frame(self)?;
    let mut f = Frame::new(&layout);
    f.planes[0].copy_from_raw_u8(frame.get_y_plane(), cfg.width);
    if f.planes.len() > 1 {
      f.planes[1].copy_from_raw_u8(frame.get_u_plane(), chroma_width);
      f.planes[2].copy_from_raw_u8(frame.get_v_plane(), chroma_width);
    }
    Ok(f)
  }
}

impl From<y4m::Error> for DecodeError {
  fn from(e: y4m::Error) -> DecodeError {
    match e {
      y4m::Error::EOF => DecodeError::EOF,
      y4m::Error::BadInput => DecodeError::BadInput,
      y4m::Error::UnknownColorspace => DecodeError::UnknownColorspace,
      y4m::Error::ParseError(_) => DecodeError::ParseError,
      y4m::Error::IoError(e) => DecodeError::IoError(e),
      y4m::Error::OutOfMemory => DecodeError::MemoryLimitExceeded,
    }
  }
}

/// Maps the 8-bit colourspaces onto a chroma layout. Deeper samples are
/// rejected.
pub fn map_y4m_color_space(
  color_space: y4m::Colorspace,
) -> Option<ChromaSampling> {
  use y4m::Colorspace::*;
  match color_space {
    Cmono => Some(ChromaSampling::Cs400),
    C420 | C420jpeg | C420paldv | C420mpeg2 => Some(ChromaSampling::Cs420),
    C422 => Some(ChromaSampling::Cs422),
    C444 => Some(ChromaSampling::Cs444),
    _ => None,
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn only_8bit_colourspaces_map() {
    use y4m::Colorspace::*;
    assert_eq!(map_y4m_color_space(C420mpeg2), Some(ChromaSampling::Cs420));
    assert_eq!(map_y4m_color_space(Cmono), Some(ChromaSampling::Cs400));
    assert_eq!(map_y4m_color_space(C444), Some(ChromaSampling::Cs444));
    assert_eq!(map_y4m_color_space(C420p10), None);
    assert_eq!(map_y4m_color_space(C422p12), None);
  }
}
