// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::fmt;

use arrayvec::ArrayVec;

use crate::util::Fixed;

mod plane;
pub use plane::*;

/// Chroma subsampling format
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChromaSampling {
  /// Subsampled by 4 in both directions.
  Cs410,
  /// Horizontally subsampled by 4.
  Cs411,
  /// Both vertically and horizontally subsampled.
  #[default]
  Cs420,
  /// Horizontally subsampled.
  Cs422,
  /// Vertically subsampled.
  Cs440,
  /// Not subsampled. Planar RGB also uses this layout.
  Cs444,
  /// Monochrome.
  Cs400,
}

impl fmt::Display for ChromaSampling {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(
      f,
      "{}",
      match self {
        ChromaSampling::Cs410 => "4:1:0",
        ChromaSampling::Cs411 => "4:1:1",
        ChromaSampling::Cs420 => "4:2:0",
        ChromaSampling::Cs422 => "4:2:2",
        ChromaSampling::Cs440 => "4:4:0",
        ChromaSampling::Cs444 => "4:4:4",
        ChromaSampling::Cs400 => "Monochrome",
      }
    )
  }
}

impl ChromaSampling {
  /// Provides the amount to right shift the luma plane dimensions to get the
  ///  chroma plane dimensions.
  /// The plane dimensions must also be rounded up to accommodate odd luma
  ///  plane sizes.
  /// Cs400 returns None, as there are no chroma planes.
  pub const fn get_decimation(self) -> Option<(usize, usize)> {
    use self::ChromaSampling::*;
    match self {
      Cs410 => Some((2, 2)),
      Cs411 => Some((2, 0)),
      Cs420 => Some((1, 1)),
      Cs422 => Some((1, 0)),
      Cs440 => Some((0, 1)),
      Cs444 => Some((0, 0)),
      Cs400 => None,
    }
  }

  /// Calculates the size of a chroma plane for this sampling type, given
  /// the luma plane dimensions.
  pub fn get_chroma_dimensions(
    self, luma_width: usize, luma_height: usize,
  ) -> (usize, usize) {
    if let Some((ss_x, ss_y)) = self.get_decimation() {
      (
        luma_width.align_power_of_two_and_shift(ss_x),
        luma_height.align_power_of_two_and_shift(ss_y),
      )
    } else {
      (0, 0)
    }
  }
}

/// Which parameter set a plane is filtered with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaneKind {
  Luma,
  Chroma,
  Alpha,
}

impl PlaneKind {
  /// Planes 0 and 3 are full resolution and use the luma parameters.
  pub const fn from_index(index: usize) -> Self {
    match index {
      0 => PlaneKind::Luma,
      3 => PlaneKind::Alpha,
      _ => PlaneKind::Chroma,
    }
  }

  #[inline]
  pub const fn uses_luma_params(self) -> bool {
    !matches!(self, PlaneKind::Chroma)
  }
}

/// Geometry of the frames a filter instance is set up for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameLayout {
  /// Width of the luma plane in samples.
  pub width: usize,
  /// Height of the luma plane in samples.
  pub height: usize,
  pub chroma_sampling: ChromaSampling,
  /// Whether a full-resolution alpha plane follows the colour planes.
  pub alpha: bool,
}

impl FrameLayout {
  pub const fn new(
    width: usize, height: usize, chroma_sampling: ChromaSampling,
  ) -> Self {
    FrameLayout { width, height, chroma_sampling, alpha: false }
  }

  pub const fn with_alpha(mut self, alpha: bool) -> Self {
    self.alpha = alpha;
    self
  }

  pub fn plane_count(&self) -> usize {
    let colour = match self.chroma_sampling {
      ChromaSampling::Cs400 => 1,
      _ => 3,
    };
    if self.alpha {
      // Alpha keeps its index of 3 even on monochrome input.
      4
    } else {
      colour
    }
  }

  /// Returns `(width, height, xdec, ydec)` of plane `index`.
  pub fn plane_geometry(&self, index: usize) -> (usize, usize, usize, usize) {
    match PlaneKind::from_index(index) {
      PlaneKind::Luma | PlaneKind::Alpha => (self.width, self.height, 0, 0),
      PlaneKind::Chroma => {
        let (xdec, ydec) =
          self.chroma_sampling.get_decimation().unwrap_or((0, 0));
        let (w, h) = self
          .chroma_sampling
          .get_chroma_dimensions(self.width, self.height);
        (w, h, xdec, ydec)
      }
    }
  }

  /// Whether plane `index` carries samples. Monochrome frames with alpha
  /// keep two empty placeholder planes at indices 1 and 2.
  pub fn has_plane(&self, index: usize) -> bool {
    match PlaneKind::from_index(index) {
      PlaneKind::Luma => true,
      PlaneKind::Alpha => self.alpha,
      PlaneKind::Chroma => self.chroma_sampling != ChromaSampling::Cs400,
    }
  }
}

/// One video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
  /// Planes constituting the frame.
  pub planes: ArrayVec<Plane, 4>,
}

impl Frame {
  /// Creates a new frame with the given layout.
  ///
  /// Allocates data for the planes.
  pub fn new(layout: &FrameLayout) -> Self {
    let planes = (0..layout.plane_count())
      .map(|index| {
        if layout.has_plane(index) {
          let (width, height, xdec, ydec) = layout.plane_geometry(index);
          Plane::new(width, height, xdec, ydec)
        } else {
          Plane::new(0, 0, 0, 0)
        }
      })
      .collect();

    Frame { planes }
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn chroma_dimensions_round_up() {
    assert_eq!(ChromaSampling::Cs420.get_chroma_dimensions(7, 5), (4, 3));
    assert_eq!(ChromaSampling::Cs422.get_chroma_dimensions(7, 5), (4, 5));
    assert_eq!(ChromaSampling::Cs410.get_chroma_dimensions(7, 5), (2, 2));
    assert_eq!(ChromaSampling::Cs411.get_chroma_dimensions(7, 5), (2, 5));
    assert_eq!(ChromaSampling::Cs440.get_chroma_dimensions(7, 5), (7, 3));
    assert_eq!(ChromaSampling::Cs444.get_chroma_dimensions(7, 5), (7, 5));
    assert_eq!(ChromaSampling::Cs400.get_chroma_dimensions(7, 5), (0, 0));
  }

  #[test]
  fn plane_kinds() {
    assert_eq!(PlaneKind::from_index(0), PlaneKind::Luma);
    assert_eq!(PlaneKind::from_index(1), PlaneKind::Chroma);
    assert_eq!(PlaneKind::from_index(2), PlaneKind::Chroma);
    assert_eq!(PlaneKind::from_index(3), PlaneKind::Alpha);
    assert!(PlaneKind::Alpha.uses_luma_params());
    assert!(!PlaneKind::Chroma.uses_luma_params());
  }

  #[test]
  fn frame_planes_follow_layout() {
    let layout = FrameLayout::new(33, 17, ChromaSampling::Cs420);
    let frame = Frame::new(&layout);
    assert_eq!(frame.planes.len(), 3);
    assert_eq!(frame.planes[0].cfg.width, 33);
    assert_eq!(frame.planes[1].cfg.width, 17);
    assert_eq!(frame.planes[2].cfg.height, 9);

    let gray = Frame::new(&FrameLayout::new(8, 8, ChromaSampling::Cs400));
    assert_eq!(gray.planes.len(), 1);

    let layout = FrameLayout::new(8, 6, ChromaSampling::Cs444);
    let rgba = Frame::new(&layout.with_alpha(true));
    assert_eq!(rgba.planes.len(), 4);
    assert_eq!(rgba.planes[3].cfg.width, 8);
    assert_eq!(rgba.planes[3].cfg.height, 6);
  }

  #[test]
  fn monochrome_alpha_keeps_index() {
    let layout = FrameLayout::new(8, 6, ChromaSampling::Cs400);
    let frame = Frame::new(&layout.with_alpha(true));
    assert_eq!(frame.planes.len(), 4);
    assert_eq!(frame.planes[1].cfg.width, 0);
    assert_eq!(frame.planes[3].cfg.width, 8);
  }
}
