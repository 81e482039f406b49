// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

/// Borrowed, read-only view of a strided 2-D buffer.
///
/// Row `y` starts at `y * stride` in the backing slice and holds `width`
/// meaningful elements; anything between `width` and `stride` is padding
/// and never read.
#[derive(Copy, Clone)]
pub struct Slice2D<'a, T> {
  data: &'a [T],
  width: usize,
  height: usize,
  stride: usize,
}

/// Borrowed, mutable view of a strided 2-D buffer.
pub struct Slice2DMut<'a, T> {
  data: &'a mut [T],
  width: usize,
  height: usize,
  stride: usize,
}

#[inline(always)]
fn required_len(width: usize, height: usize, stride: usize) -> usize {
  if height == 0 {
    0
  } else {
    (height - 1) * stride + width
  }
}

impl<'a, T> Slice2D<'a, T> {
  /// # Panics
  ///
  /// - If `width > stride`.
  /// - If `data` is too short to hold `height` rows.
  #[inline(always)]
  pub fn new(
    data: &'a [T], width: usize, height: usize, stride: usize,
  ) -> Self {
    assert!(width <= stride);
    assert!(data.len() >= required_len(width, height, stride));
    Self { data, width, height, stride }
  }

  #[inline(always)]
  pub const fn width(&self) -> usize {
    self.width
  }

  #[inline(always)]
  pub const fn height(&self) -> usize {
    self.height
  }

  #[inline(always)]
  pub const fn stride(&self) -> usize {
    self.stride
  }

  /// Backing slice starting at `(x, y)` and running to the end of the
  /// buffer, for routines that walk rows with the stride themselves.
  #[inline(always)]
  pub fn data_at(&self, x: usize, y: usize) -> &'a [T] {
    debug_assert!(x < self.width && y < self.height);
    &self.data[y * self.stride + x..]
  }

  pub fn rows_iter(&self) -> RowsIter<'a, T> {
    RowsIter {
      data: self.data,
      stride: self.stride,
      width: self.width,
      remaining: self.height,
    }
  }
}

impl<T: Copy> Slice2D<'_, T> {
  #[inline(always)]
  pub fn get(&self, x: usize, y: usize) -> T {
    debug_assert!(x < self.width && y < self.height);
    self.data[y * self.stride + x]
  }
}

impl<T> Index<usize> for Slice2D<'_, T> {
  type Output = [T];
  #[inline(always)]
  fn index(&self, index: usize) -> &Self::Output {
    debug_assert!(index < self.height);
    &self.data[index * self.stride..][..self.width]
  }
}

impl<T> fmt::Debug for Slice2D<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Slice2D {{ ptr: {:?}, size: {}({})x{} }}",
      self.data.as_ptr(),
      self.width,
      self.stride,
      self.height
    )
  }
}

impl<'a, T> Slice2DMut<'a, T> {
  /// # Panics
  ///
  /// - If `width > stride`.
  /// - If `data` is too short to hold `height` rows.
  #[inline(always)]
  pub fn new(
    data: &'a mut [T], width: usize, height: usize, stride: usize,
  ) -> Self {
    assert!(width <= stride);
    assert!(data.len() >= required_len(width, height, stride));
    Self { data, width, height, stride }
  }

  #[inline(always)]
  pub const fn width(&self) -> usize {
    self.width
  }

  #[inline(always)]
  pub const fn height(&self) -> usize {
    self.height
  }

  #[inline(always)]
  pub const fn stride(&self) -> usize {
    self.stride
  }

  pub fn as_const(&self) -> Slice2D<'_, T> {
    Slice2D {
      data: &*self.data,
      width: self.width,
      height: self.height,
      stride: self.stride,
    }
  }

  pub fn rows_iter_mut(&mut self) -> RowsIterMut<'_, T> {
    RowsIterMut {
      data: &mut *self.data,
      stride: self.stride,
      width: self.width,
      remaining: self.height,
    }
  }
}

impl<T> Index<usize> for Slice2DMut<'_, T> {
  type Output = [T];
  #[inline(always)]
  fn index(&self, index: usize) -> &Self::Output {
    debug_assert!(index < self.height);
    &self.data[index * self.stride..][..self.width]
  }
}

impl<T> IndexMut<usize> for Slice2DMut<'_, T> {
  #[inline(always)]
  fn index_mut(&mut self, index: usize) -> &mut Self::Output {
    debug_assert!(index < self.height);
    &mut self.data[index * self.stride..][..self.width]
  }
}

impl<T> fmt::Debug for Slice2DMut<'_, T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "Slice2DMut {{ ptr: {:?}, size: {}({})x{} }}",
      self.data.as_ptr(),
      self.width,
      self.stride,
      self.height
    )
  }
}

/// Iterator over rows
pub struct RowsIter<'a, T> {
  data: &'a [T],
  stride: usize,
  width: usize,
  remaining: usize,
}

/// Mutable iterator over rows
pub struct RowsIterMut<'a, T> {
  data: &'a mut [T],
  stride: usize,
  width: usize,
  remaining: usize,
}

impl<'a, T> Iterator for RowsIter<'a, T> {
  type Item = &'a [T];

  #[inline(always)]
  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining > 0 {
      let row = &self.data[..self.width];
      self.remaining -= 1;
      if self.remaining > 0 {
        self.data = &self.data[self.stride..];
      }
      Some(row)
    } else {
      None
    }
  }

  #[inline(always)]
  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<'a, T> Iterator for RowsIterMut<'a, T> {
  type Item = &'a mut [T];

  #[inline(always)]
  fn next(&mut self) -> Option<Self::Item> {
    if self.remaining > 0 {
      let data = std::mem::take(&mut self.data);
      self.remaining -= 1;
      let (row, rest) = if self.remaining > 0 {
        data.split_at_mut(self.stride)
      } else {
        (data, &mut [][..])
      };
      self.data = rest;
      Some(&mut row[..self.width])
    } else {
      None
    }
  }

  #[inline(always)]
  fn size_hint(&self) -> (usize, Option<usize>) {
    (self.remaining, Some(self.remaining))
  }
}

impl<T> ExactSizeIterator for RowsIter<'_, T> {}
impl<T> FusedIterator for RowsIter<'_, T> {}
impl<T> ExactSizeIterator for RowsIterMut<'_, T> {}
impl<T> FusedIterator for RowsIterMut<'_, T> {}
