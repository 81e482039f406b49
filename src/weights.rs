// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use crate::error::NlMeansError;

/// Decay weights indexed by patch SSD.
///
/// `weight(i) = exp(-i / (10 * sigma)^2)` below the point where the weight
/// drops to `1 / 255`. From there on a patch is too different to matter and
/// every larger difference reads the zero in the last entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightLut {
  table: Vec<f32>,
  max_meaningful_diff: u32,
}

impl WeightLut {
  /// # Errors
  ///
  /// - Returns `NlMeansError::OutOfMemory` if the table cannot be
  ///   allocated.
  pub fn try_new(sigma: f64) -> Result<Self, NlMeansError> {
    let h = sigma * 10.0;
    let pdiff_scale = 1.0 / (h * h);
    let max_meaningful_diff = (255f64.ln() / pdiff_scale) as u32;

    let len = max_meaningful_diff as usize + 1;
    let mut table = Vec::new();
    table.try_reserve_exact(len).map_err(|_| NlMeansError::OutOfMemory {
      what: "weight table",
      bytes: len.saturating_mul(std::mem::size_of::<f32>()),
    })?;
    table.extend(
      (0..max_meaningful_diff as usize)
        .map(|i| (-(i as f64) * pdiff_scale).exp() as f32),
    );
    table.push(0.0);

    Ok(WeightLut { table, max_meaningful_diff })
  }

  /// Wraps an explicit table; the last entry applies to every difference
  /// past the end.
  ///
  /// # Panics
  ///
  /// - If `table` is empty.
  pub fn from_table(table: Vec<f32>) -> Self {
    assert!(!table.is_empty());
    let max_meaningful_diff = (table.len() - 1) as u32;
    WeightLut { table, max_meaningful_diff }
  }

  /// Largest difference with its own entry.
  #[inline(always)]
  pub const fn max_meaningful_diff(&self) -> u32 {
    self.max_meaningful_diff
  }

  #[inline(always)]
  pub fn weight(&self, patch_diff_sq: u32) -> f32 {
    self.table[patch_diff_sq.min(self.max_meaningful_diff) as usize]
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.table
  }
}

/// Adds the contribution of one displacement to a run of pixels.
///
/// The four tap rows hold the integral image at the corners of each
/// pixel's patch box: `a` above-left, `b` above-right, `d` below-left and
/// `e` below-right. `neighbor` holds the displaced samples the weights
/// apply to. All slices cover the same run of pixels.
pub fn compute_weights_line(
  a: &[u32], b: &[u32], d: &[u32], e: &[u32], neighbor: &[u8],
  total_weight: &mut [f32], sum: &mut [f32], lut: &WeightLut,
) {
  let n = total_weight.len();
  debug_assert!(sum.len() == n && neighbor.len() == n);
  debug_assert!(a.len() >= n && b.len() >= n && d.len() >= n && e.len() >= n);

  let taps = a.iter().zip(b).zip(d).zip(e);
  let acc = neighbor.iter().zip(total_weight.iter_mut().zip(sum.iter_mut()));
  for ((((&a, &b), &d), &e), (&n, (tw, s))) in taps.zip(acc) {
    let patch_diff_sq = e.wrapping_sub(d).wrapping_sub(b).wrapping_add(a);
    let weight = lut.weight(patch_diff_sq);
    *tw += weight;
    *s += weight * f32::from(n);
  }
}

/// Adds the unit self weight to a row of accumulators and writes the
/// rounded averages.
pub fn weight_averages(
  total_weight: &mut [f32], sum: &mut [f32], src: &[u8], dst: &mut [u8],
) {
  debug_assert!(total_weight.len() == dst.len());
  for (((tw, s), &src), dst) in
    total_weight.iter_mut().zip(sum.iter_mut()).zip(src).zip(dst.iter_mut())
  {
    *tw += 1.0;
    *s += f32::from(src);
    *dst = ((*s / *tw + 0.5) as i32).clamp(0, 255) as u8;
  }
}
