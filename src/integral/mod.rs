// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! Sum-of-squared-differences integral images.
//!
//! For one displacement `(offx, offy)` the image covers a canvas of
//! `(w + 2e) x (h + 2e)` cells, with the plane placed at `(e, e)` as the
//! first source and at `(e + offx, e + offy)` as the second. Canvas cell
//! `(x, y)` holds the squared difference of the two sources there, reading
//! each source through coordinates clamped into the plane, summed over every
//! cell above and to the left of it.
//!
//! Where both sources are read without clamping the rows are handed to a
//! bulk routine that may use SIMD; the clamped border strips around it are
//! filled by a plain scalar loop.

use crate::cpu_features::CpuFeatureLevel;
use crate::error::NlMeansError;
use crate::util::{align_down, AlignedBoxedSlice, Fixed, Slice2D};

cfg_if::cfg_if! {
  if #[cfg(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "aarch64"
  ))] {
    mod simd;
  }
}

/// Fills `h` rows of `w` cells of an integral image where neither source
/// needs clamping.
///
/// `dst[0]` is the cell one row above and one column left of the first
/// cell written. `s1` and `s2` start at the samples compared for that first
/// cell.
pub(crate) type SafeSsdFn = fn(
  dst: &mut [u32],
  dst_stride: usize,
  s1: &[u8],
  s1_stride: usize,
  s2: &[u8],
  s2_stride: usize,
  w: usize,
  h: usize,
);

cfg_if::cfg_if! {
  if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
    cpu_function_lookup_table!(
      SAFE_SSD_FNS: [SafeSsdFn],
      default: rust::compute_safe_ssd_integral_image as SafeSsdFn,
      [
        (RUST, rust::compute_safe_ssd_integral_image),
        (SSE2, simd::compute_safe_ssd_integral_image)
      ]
    );
  } else if #[cfg(target_arch = "aarch64")] {
    cpu_function_lookup_table!(
      SAFE_SSD_FNS: [SafeSsdFn],
      default: rust::compute_safe_ssd_integral_image as SafeSsdFn,
      [
        (RUST, rust::compute_safe_ssd_integral_image),
        (NEON, simd::compute_safe_ssd_integral_image)
      ]
    );
  } else {
    cpu_function_lookup_table!(
      SAFE_SSD_FNS: [SafeSsdFn],
      default: rust::compute_safe_ssd_integral_image as SafeSsdFn,
      [(RUST, rust::compute_safe_ssd_integral_image)]
    );
  }
}

/// # Panics
///
/// - If in `check_asm` mode, panics on mismatch between the selected and
///   the scalar routine.
pub fn compute_safe_ssd_integral_image(
  dst: &mut [u32], dst_stride: usize, s1: &[u8], s1_stride: usize,
  s2: &[u8], s2_stride: usize, w: usize, h: usize, cpu: CpuFeatureLevel,
) {
  #[cfg(feature = "check_asm")]
  let reference = {
    let len = (h * dst_stride + w + 1).min(dst.len());
    let mut reference = dst[..len].to_vec();
    rust::compute_safe_ssd_integral_image(
      &mut reference,
      dst_stride,
      s1,
      s1_stride,
      s2,
      s2_stride,
      w,
      h,
    );
    reference
  };

  SAFE_SSD_FNS[cpu.as_index()](
    dst, dst_stride, s1, s1_stride, s2, s2_stride, w, h,
  );

  #[cfg(feature = "check_asm")]
  assert_eq!(
    &dst[..reference.len()],
    &reference[..],
    "Safe SSD {}x{}: SIMD doesn't match reference code.",
    w,
    h
  );
}

pub mod rust {
  pub fn compute_safe_ssd_integral_image(
    dst: &mut [u32], dst_stride: usize, s1: &[u8], s1_stride: usize,
    s2: &[u8], s2_stride: usize, w: usize, h: usize,
  ) {
    for y in 0..h {
      let (top, cur) = dst[y * dst_stride..].split_at_mut(dst_stride);
      let s1 = &s1[y * s1_stride..][..w];
      let s2 = &s2[y * s2_stride..][..w];

      // Row prefix of the cells left of the region.
      let mut acc = cur[0].wrapping_sub(top[0]);
      for (x, (&a, &b)) in s1.iter().zip(s2).enumerate() {
        let d = i32::from(a) - i32::from(b);
        acc = acc.wrapping_add((d * d) as u32);
        cur[x + 1] = top[x + 1].wrapping_add(acc);
      }
    }
  }
}

#[inline(always)]
fn clip(v: isize, len: usize) -> usize {
  v.clamp(0, len as isize - 1) as usize
}

/// SSD integral image with a virtual zero row above and zero column left of
/// the canvas.
///
/// Allocated once for the largest plane and padding a filter instance will
/// see; each build overwrites every cell of the current canvas, so the
/// buffer is never cleared between displacements.
pub struct IntegralImage {
  data: AlignedBoxedSlice<u32>,
  stride: usize,
  max_width: usize,
  max_height: usize,
  width: usize,
  height: usize,
}

impl std::fmt::Debug for IntegralImage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IntegralImage")
      .field("stride", &self.stride)
      .field("max_width", &self.max_width)
      .field("max_height", &self.max_height)
      .field("width", &self.width)
      .field("height", &self.height)
      .finish()
  }
}

impl IntegralImage {
  /// Allocates a zeroed image able to hold the canvas of a
  /// `plane_width x plane_height` plane with a border of `padding`.
  ///
  /// # Errors
  ///
  /// - Returns `NlMeansError::OutOfMemory` if the buffer cannot be
  ///   allocated.
  pub fn try_new(
    plane_width: usize, plane_height: usize, padding: usize,
  ) -> Result<Self, NlMeansError> {
    let oom = |len: usize| NlMeansError::OutOfMemory {
      what: "integral image",
      bytes: AlignedBoxedSlice::<u32>::byte_size(len),
    };
    let max_width = plane_width + 2 * padding;
    let max_height = plane_height + 2 * padding;
    let stride = (max_width + 1).align_power_of_two(2);
    let len = stride.checked_mul(max_height + 1).ok_or(oom(usize::MAX))?;
    let data = AlignedBoxedSlice::try_new(len, 0u32).ok_or(oom(len))?;

    Ok(IntegralImage {
      data,
      stride,
      max_width,
      max_height,
      width: 0,
      height: 0,
    })
  }

  /// Distance in cells between two rows.
  #[inline(always)]
  pub const fn stride(&self) -> usize {
    self.stride
  }

  /// Width of the canvas built last.
  #[inline(always)]
  pub const fn width(&self) -> usize {
    self.width
  }

  /// Height of the canvas built last.
  #[inline(always)]
  pub const fn height(&self) -> usize {
    self.height
  }

  /// The whole buffer, zero row and column included.
  #[inline(always)]
  pub fn as_raw(&self) -> &[u32] {
    &self.data
  }

  #[inline(always)]
  fn index(&self, x: isize, y: isize) -> usize {
    debug_assert!(x >= -1 && (x as usize).wrapping_add(1) <= self.max_width);
    debug_assert!(y >= -1 && (y as usize).wrapping_add(1) <= self.max_height);
    (y + 1) as usize * self.stride + (x + 1) as usize
  }

  /// Returns cell `(x, y)`; either coordinate may be -1.
  #[inline(always)]
  pub fn get(&self, x: isize, y: isize) -> u32 {
    self.data[self.index(x, y)]
  }

  /// Sum of the canvas cells in the inclusive rectangle
  /// `(x1, y1)..=(x2, y2)`.
  #[inline]
  pub fn box_sum(&self, x1: isize, y1: isize, x2: isize, y2: isize) -> u32 {
    debug_assert!(x1 <= x2 && y1 <= y2);
    let a = self.get(x1 - 1, y1 - 1);
    let b = self.get(x2, y1 - 1);
    let d = self.get(x1 - 1, y2);
    let e = self.get(x2, y2);
    e.wrapping_sub(d).wrapping_sub(b).wrapping_add(a)
  }

  fn set_canvas(&mut self, src: &Slice2D<'_, u8>, e: usize) {
    let width = src.width() + 2 * e;
    let height = src.height() + 2 * e;
    assert!(
      width <= self.max_width && height <= self.max_height,
      "canvas {}x{} exceeds the allocated {}x{}",
      width,
      height,
      self.max_width,
      self.max_height
    );
    self.width = width;
    self.height = height;
  }

  /// Builds the image for displacement `(offx, offy)` and padding `e`,
  /// handing the unclamped region to the bulk routine for `cpu` in blocks
  /// of `safe_alignment` columns.
  ///
  /// # Panics
  ///
  /// - If the canvas does not fit the allocation.
  /// - If the plane is empty or `safe_alignment` is zero.
  pub fn compute_ssd(
    &mut self, src: Slice2D<'_, u8>, offx: isize, offy: isize, e: usize,
    safe_alignment: usize, cpu: CpuFeatureLevel,
  ) {
    assert!(src.width() > 0 && src.height() > 0);
    assert!(safe_alignment > 0);
    debug_assert!(offx.unsigned_abs() <= e && offy.unsigned_abs() <= e);
    self.set_canvas(&src, e);

    let (ii_w, ii_h) = (self.width, self.height);
    let (w, h) = (src.width() as isize, src.height() as isize);
    let ei = e as isize;

    // Intersection of the two sources' valid domains.
    let startx_safe = ei.max(ei + offx) as usize;
    let starty_safe = ei.max(ei + offy) as usize;
    let endx_safe = (ei + w).min(ei + offx + w);
    let endy_safe = (ei + h).min(ei + offy + h);

    let safe_pw = align_down(
      (endx_safe - startx_safe as isize).max(0) as usize,
      safe_alignment,
    );
    let safe_ph = (endy_safe - starty_safe as isize).max(0) as usize;

    let endx = startx_safe + safe_pw;
    let endy = starty_safe + safe_ph;

    self.compute_unsafe_ssd(&src, 0, 0, ii_w, starty_safe, offx, offy, e);
    self.compute_unsafe_ssd(
      &src,
      0,
      starty_safe,
      startx_safe,
      safe_ph,
      offx,
      offy,
      e,
    );

    if safe_pw != 0 && safe_ph != 0 {
      let s1 = src.data_at(startx_safe - e, starty_safe - e);
      let s2 = src.data_at(
        (startx_safe as isize - ei - offx) as usize,
        (starty_safe as isize - ei - offy) as usize,
      );
      let stride = self.stride;
      compute_safe_ssd_integral_image(
        &mut self.data[starty_safe * stride + startx_safe..],
        stride,
        s1,
        src.stride(),
        s2,
        src.stride(),
        safe_pw,
        safe_ph,
        cpu,
      );
    }

    self.compute_unsafe_ssd(
      &src,
      endx,
      starty_safe,
      ii_w - endx,
      safe_ph,
      offx,
      offy,
      e,
    );
    self.compute_unsafe_ssd(&src, 0, endy, ii_w, ii_h - endy, offx, offy, e);
  }

  /// Builds the image for displacement `(offx, offy)` clamping every read.
  ///
  /// Produces the same buffer as [`compute_ssd`](Self::compute_ssd).
  ///
  /// # Panics
  ///
  /// - If the canvas does not fit the allocation.
  /// - If the plane is empty.
  pub fn compute_ssd_clamped(
    &mut self, src: Slice2D<'_, u8>, offx: isize, offy: isize, e: usize,
  ) {
    assert!(src.width() > 0 && src.height() > 0);
    self.set_canvas(&src, e);
    let (ii_w, ii_h) = (self.width, self.height);
    self.compute_unsafe_ssd(&src, 0, 0, ii_w, ii_h, offx, offy, e);
  }

  /// Fills the `w x h` block of cells at `(startx, starty)`, continuing the
  /// row prefix from the cell to the left and adding the row above.
  fn compute_unsafe_ssd(
    &mut self, src: &Slice2D<'_, u8>, startx: usize, starty: usize,
    w: usize, h: usize, offx: isize, offy: isize, e: usize,
  ) {
    let stride = self.stride;
    let (pw, ph) = (src.width(), src.height());
    let e = e as isize;

    for y in starty..starty + h {
      // cur[i] is cell (i - 1, y), top[i] is cell (i - 1, y - 1).
      let (top, cur) = self.data[y * stride..].split_at_mut(stride);
      let s1 = &src[clip(y as isize - e, ph)];
      let s2 = &src[clip(y as isize - e - offy, ph)];

      let mut acc = cur[startx].wrapping_sub(top[startx]);
      for x in startx..startx + w {
        let s1x = clip(x as isize - e, pw);
        let s2x = clip(x as isize - e - offx, pw);
        let d = i32::from(s1[s1x]) - i32::from(s2[s2x]);
        acc = acc.wrapping_add((d * d) as u32);
        cur[x + 1] = top[x + 1].wrapping_add(acc);
      }
    }
  }
}
