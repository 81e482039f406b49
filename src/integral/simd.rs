// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use wide::i32x8;

#[inline(always)]
fn widen_u8(s: &[u8]) -> i32x8 {
  i32x8::new(std::array::from_fn(|i| i32::from(s[i])))
}

#[inline(always)]
fn reinterpret_u32(s: &[u32]) -> i32x8 {
  i32x8::new(std::array::from_fn(|i| s[i] as i32))
}

/// Eight columns at a time: the squared differences and the vertical
/// deltas of the row above are computed in lanes, the row prefix is then
/// carried through the lanes in order. Lane arithmetic wraps like the
/// scalar `u32` code.
pub(crate) fn compute_safe_ssd_integral_image(
  dst: &mut [u32], dst_stride: usize, s1: &[u8], s1_stride: usize,
  s2: &[u8], s2_stride: usize, w: usize, h: usize,
) {
  for y in 0..h {
    let (top, cur) = dst[y * dst_stride..].split_at_mut(dst_stride);
    let s1 = &s1[y * s1_stride..][..w];
    let s2 = &s2[y * s2_stride..][..w];

    let mut x = 0;
    while x + 8 <= w {
      let d = widen_u8(&s1[x..x + 8]) - widen_u8(&s2[x..x + 8]);
      let above = reinterpret_u32(&top[x + 1..x + 9]);
      let above_left = reinterpret_u32(&top[x..x + 8]);
      let deltas = (above - above_left + d * d).to_array();

      let mut left = cur[x];
      for (i, &delta) in deltas.iter().enumerate() {
        left = left.wrapping_add(delta as u32);
        cur[x + 1 + i] = left;
      }
      x += 8;
    }

    let mut acc = cur[x].wrapping_sub(top[x]);
    for (x, (&a, &b)) in s1.iter().zip(s2).enumerate().skip(x) {
      let d = i32::from(a) - i32::from(b);
      acc = acc.wrapping_add((d * d) as u32);
      cur[x + 1] = top[x + 1].wrapping_add(acc);
    }
  }
}
