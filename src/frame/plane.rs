// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use crate::util::{AlignedBoxedSlice, Fixed, Slice2D, Slice2DMut};

/// Plane-specific configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneConfig {
  /// Data stride.
  pub stride: usize,
  /// Width of the plane in samples.
  pub width: usize,
  /// Height of the plane in samples.
  pub height: usize,
  /// Decimator along the X axis.
  ///
  /// For example, for chroma planes in a 4:2:0 configuration this would be 1.
  pub xdec: usize,
  /// Decimator along the Y axis.
  ///
  /// For example, for chroma planes in a 4:2:0 configuration this would be 1.
  pub ydec: usize,
}

impl PlaneConfig {
  /// Stride alignment in bytes.
  const STRIDE_ALIGNMENT_LOG2: usize = 6;

  #[inline]
  pub fn new(width: usize, height: usize, xdec: usize, ydec: usize) -> Self {
    let stride = width.align_power_of_two(Self::STRIDE_ALIGNMENT_LOG2);
    PlaneConfig { stride, width, height, xdec, ydec }
  }
}

/// Backing buffer for one 8-bit plane.
#[derive(Clone, PartialEq)]
pub struct Plane {
  pub data: AlignedBoxedSlice<u8>,
  /// Plane configuration.
  pub cfg: PlaneConfig,
}

impl std::fmt::Debug for Plane {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "Plane {{ data: [{}, ...], cfg: {:?} }}",
      self.data.first().copied().unwrap_or_default(),
      self.cfg
    )
  }
}

impl Plane {
  /// Allocates a zeroed plane.
  pub fn new(width: usize, height: usize, xdec: usize, ydec: usize) -> Self {
    let cfg = PlaneConfig::new(width, height, xdec, ydec);
    let data = AlignedBoxedSlice::new(cfg.stride * height, 0u8);

    Plane { data, cfg }
  }

  /// Builds a full-resolution plane out of `width`-sample rows packed with
  /// `stride` samples between rows.
  ///
  /// # Panics
  ///
  /// - If `data` does not hold a whole number of rows.
  pub fn from_slice(data: &[u8], width: usize, stride: usize) -> Self {
    assert!(width <= stride);
    let height = if stride == 0 { 0 } else { data.len() / stride };
    assert_eq!(height * stride, data.len());
    let mut plane = Plane::new(width, height, 0, 0);
    plane.copy_from_raw_u8(data, stride);
    plane
  }

  /// Returns the sample at `(x, y)`.
  #[inline]
  pub fn p(&self, x: usize, y: usize) -> u8 {
    self.data[y * self.cfg.stride + x]
  }

  /// Copies `height` rows of `width` samples out of a packed buffer.
  pub fn copy_from_raw_u8(&mut self, source: &[u8], source_stride: usize) {
    let PlaneConfig { stride, width, .. } = self.cfg;
    if width == 0 {
      return;
    }
    for (self_row, source_row) in
      self.data.chunks_mut(stride).zip(source.chunks(source_stride))
    {
      self_row[..width].copy_from_slice(&source_row[..width]);
    }
  }

  /// Copies the visible samples into a packed buffer.
  pub fn copy_to_raw_u8(&self, dest: &mut [u8], dest_stride: usize) {
    let PlaneConfig { stride, width, .. } = self.cfg;
    if width == 0 {
      return;
    }
    for (self_row, dest_row) in
      self.data.chunks(stride).zip(dest.chunks_mut(dest_stride))
    {
      dest_row[..width].copy_from_slice(&self_row[..width]);
    }
  }

  #[inline]
  pub fn as_slice2d(&self) -> Slice2D<'_, u8> {
    Slice2D::new(&self.data, self.cfg.width, self.cfg.height, self.cfg.stride)
  }

  #[inline]
  pub fn as_slice2d_mut(&mut self) -> Slice2DMut<'_, u8> {
    let PlaneConfig { stride, width, height, .. } = self.cfg;
    Slice2DMut::new(&mut self.data, width, height, stride)
  }

  pub fn rows_iter(&self) -> impl Iterator<Item = &[u8]> {
    self.data.chunks(self.cfg.stride.max(1)).map(|row| &row[..self.cfg.width])
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn stride_is_aligned() {
    let plane = Plane::new(65, 3, 0, 0);
    assert_eq!(plane.cfg.stride, 128);
    assert_eq!(plane.data.len(), 128 * 3);
  }

  #[test]
  fn copy_raw_round_trip() {
    let packed: Vec<u8> = (0..5 * 4).map(|v| v as u8).collect();
    let plane = Plane::from_slice(&packed, 5, 5);
    assert_eq!(plane.cfg.height, 4);
    assert_eq!(plane.p(2, 3), 17);

    let mut out = vec![0u8; 6 * 4];
    plane.copy_to_raw_u8(&mut out, 6);
    assert_eq!(&out[6..11], &packed[5..10]);
    assert_eq!(out[11], 0);
  }

  #[test]
  fn views_share_geometry() {
    let mut plane = Plane::new(6, 5, 0, 0);
    plane.as_slice2d_mut()[4][5] = 42;
    let view = plane.as_slice2d();
    assert_eq!((view.width(), view.height()), (6, 5));
    assert_eq!(view.get(5, 4), 42);
    assert_eq!(plane.rows_iter().count(), 5);
  }

  #[test]
  fn empty_plane() {
    let plane = Plane::new(0, 0, 0, 0);
    assert!(plane.data.is_empty());
    assert_eq!(plane.rows_iter().count(), 0);
  }
}
