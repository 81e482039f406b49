// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use nlmeans::prelude::*;
use std::io;

pub mod y4m;

pub use self::y4m::map_y4m_color_space;

pub trait Decoder {
  fn get_video_details(&self) -> VideoDetails;
  fn read_frame(&mut self, cfg: &VideoDetails) -> Result<Frame, DecodeError>;
}

#[derive(Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum DecodeError {
  EOF,
  BadInput,
  UnknownColorspace,
  ParseError,
  IoError(io::Error),
  MemoryLimitExceeded,
}

/// Stream parameters carried over unchanged to the output header.
#[derive(Debug, Clone, Copy)]
pub struct VideoDetails {
  pub width: usize,
  pub height: usize,
  pub chroma_sampling: ChromaSampling,
  pub colorspace: ::y4m::Colorspace,
  pub framerate: ::y4m::Ratio,
  pub pixel_aspect: ::y4m::Ratio,
}

impl VideoDetails {
  pub const fn layout(&self) -> FrameLayout {
    FrameLayout::new(self.width, self.height, self.chroma_sampling)
  }
}
