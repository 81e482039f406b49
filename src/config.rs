// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::sync::Arc;

use log::warn;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::cpu_features::CpuFeatureLevel;
use crate::error::NlMeansError;

/// Largest accepted patch or research window size.
pub const MAX_WINDOW_SIZE: usize = 99;
/// Accepted range of the denoising strength.
pub const SIGMA_RANGE: std::ops::RangeInclusive<f64> = 1.0..=30.0;
/// Column granularity of the region handed to the bulk integral routine.
pub const DEFAULT_SAFE_ALIGNMENT: usize = 16;

/// Enumeration of possible invalid configuration errors.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[non_exhaustive]
pub enum InvalidConfig {
  /// The denoising strength is out of range.
  #[error("invalid sigma {0} (expected >= 1.0, <= 30.0)")]
  InvalidSigma(f64),
  /// The luma patch size is out of range.
  #[error("invalid patch size {0} (expected <= 99)")]
  InvalidPatchSize(usize),
  /// The luma research window size is out of range.
  #[error("invalid research size {0} (expected <= 99)")]
  InvalidResearchSize(usize),
  /// The chroma patch size is out of range.
  #[error("invalid chroma patch size {0} (expected <= 99)")]
  InvalidPatchSizeChroma(usize),
  /// The chroma research window size is out of range.
  #[error("invalid chroma research size {0} (expected <= 99)")]
  InvalidResearchSizeChroma(usize),
  /// The width is invalid.
  #[error("invalid width {0} (expected >= 1, <= 65535)")]
  InvalidWidth(usize),
  /// The height is invalid.
  #[error("invalid height {0} (expected >= 1, <= 65535)")]
  InvalidHeight(usize),
  /// The bulk routine column alignment is zero.
  #[error("invalid safe region alignment {0} (expected >= 1)")]
  InvalidSafeAlignment(usize),
}

/// Half sizes used to filter one kind of plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneParams {
  /// Half the patch size; patches span `2 * patch_hsize + 1` samples.
  pub patch_hsize: usize,
  /// Half the research window size.
  pub research_hsize: usize,
}

impl PlaneParams {
  #[inline]
  pub const fn patch_size(&self) -> usize {
    self.patch_hsize * 2 + 1
  }

  #[inline]
  pub const fn research_size(&self) -> usize {
    self.research_hsize * 2 + 1
  }

  /// Border the integral image needs around the plane: patches centred on
  /// every position of the research window overflow it by `patch_hsize`.
  #[inline]
  pub const fn padding(&self) -> usize {
    self.research_hsize + self.patch_hsize
  }
}

/// Normalized parameters for every kind of plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterParams {
  /// Used by the luma and alpha planes.
  pub luma: PlaneParams,
  pub chroma: PlaneParams,
}

impl FilterParams {
  /// Largest border over both parameter sets.
  pub fn max_padding(&self) -> usize {
    self.luma.research_hsize.max(self.chroma.research_hsize)
      + self.luma.patch_hsize.max(self.chroma.patch_hsize)
  }
}

/// Filter configuration.
#[derive(Clone, Debug)]
pub struct NlMeansConfig {
  /// Denoising strength.
  pub sigma: f64,
  /// Luma patch size; even values are bumped to the next odd one.
  pub patch_size: usize,
  /// Luma research window size; even values are bumped to the next odd one.
  pub research_size: usize,
  /// Chroma patch size, 0 to inherit the luma value.
  pub patch_size_chroma: usize,
  /// Chroma research window size, 0 to inherit the luma value.
  pub research_size_chroma: usize,
  /// Number of worker threads, 0 to run on the global rayon pool.
  pub threads: usize,
  /// Column granularity of the bulk integral routine. Any value of 1 or
  /// more produces the same output.
  pub safe_alignment: usize,
  /// Caps the detected CPU feature level.
  pub cpu_feature_level: Option<CpuFeatureLevel>,
  pub(crate) pool: Option<Arc<ThreadPool>>,
}

impl Default for NlMeansConfig {
  fn default() -> Self {
    NlMeansConfig {
      sigma: 1.0,
      patch_size: 7,
      research_size: 15,
      patch_size_chroma: 0,
      research_size_chroma: 0,
      threads: 0,
      safe_alignment: DEFAULT_SAFE_ALIGNMENT,
      cpu_feature_level: None,
      pool: None,
    }
  }
}

impl NlMeansConfig {
  /// Create a default configuration
  ///
  /// same as `Default::default()`
  pub fn new() -> Self {
    Self::default()
  }

  pub const fn with_sigma(mut self, sigma: f64) -> Self {
    self.sigma = sigma;
    self
  }

  pub const fn with_patch_size(mut self, patch_size: usize) -> Self {
    self.patch_size = patch_size;
    self
  }

  pub const fn with_research_size(mut self, research_size: usize) -> Self {
    self.research_size = research_size;
    self
  }

  pub const fn with_patch_size_chroma(mut self, patch_size: usize) -> Self {
    self.patch_size_chroma = patch_size;
    self
  }

  pub const fn with_research_size_chroma(
    mut self, research_size: usize,
  ) -> Self {
    self.research_size_chroma = research_size;
    self
  }

  /// Set the number of workers in the threadpool
  ///
  /// The threadpool is shared across all the different parallel
  /// components in the filter.
  ///
  /// If it is left unset, the filter will use the default global
  /// threadpool provided by Rayon instead.
  pub const fn with_threads(mut self, threads: usize) -> Self {
    self.threads = threads;
    self
  }

  /// Set the threadpool to be used
  ///
  /// Takes precedence over `with_threads`.
  pub fn with_thread_pool(mut self, pool: Arc<ThreadPool>) -> Self {
    self.pool = Some(pool);
    self
  }

  pub const fn with_safe_alignment(mut self, align: usize) -> Self {
    self.safe_alignment = align;
    self
  }

  pub const fn with_cpu_feature_level(
    mut self, level: CpuFeatureLevel,
  ) -> Self {
    self.cpu_feature_level = Some(level);
    self
  }

  /// Validates the configuration.
  ///
  /// # Errors
  ///
  /// - Returns `InvalidConfig` if a value is out of range.
  pub fn validate(&self) -> Result<(), InvalidConfig> {
    use InvalidConfig::*;

    if !SIGMA_RANGE.contains(&self.sigma) {
      return Err(InvalidSigma(self.sigma));
    }
    if self.patch_size > MAX_WINDOW_SIZE {
      return Err(InvalidPatchSize(self.patch_size));
    }
    if self.research_size > MAX_WINDOW_SIZE {
      return Err(InvalidResearchSize(self.research_size));
    }
    if self.patch_size_chroma > MAX_WINDOW_SIZE {
      return Err(InvalidPatchSizeChroma(self.patch_size_chroma));
    }
    if self.research_size_chroma > MAX_WINDOW_SIZE {
      return Err(InvalidResearchSizeChroma(self.research_size_chroma));
    }
    if self.safe_alignment == 0 {
      return Err(InvalidSafeAlignment(self.safe_alignment));
    }

    Ok(())
  }

  /// Bumps even sizes to odd ones, resolves chroma inheritance and halves
  /// the results.
  ///
  /// The luma sizes are fixed up before the chroma ones inherit them, so an
  /// inherited size only warns once.
  pub fn normalize(&self) -> FilterParams {
    let research_size = make_odd(self.research_size, "Luma research window");
    let patch_size = make_odd(self.patch_size, "Luma patch");

    let research_size_chroma = match self.research_size_chroma {
      0 => research_size,
      size => make_odd(size, "Chroma research window"),
    };
    let patch_size_chroma = match self.patch_size_chroma {
      0 => patch_size,
      size => make_odd(size, "Chroma patch"),
    };

    FilterParams {
      luma: PlaneParams {
        patch_hsize: patch_size / 2,
        research_hsize: research_size / 2,
      },
      chroma: PlaneParams {
        patch_hsize: patch_size_chroma / 2,
        research_hsize: research_size_chroma / 2,
      },
    }
  }

  /// Resolves the configured level against the host.
  pub(crate) fn cpu(&self) -> CpuFeatureLevel {
    CpuFeatureLevel::capped(self.cpu_feature_level, CpuFeatureLevel::default())
  }

  pub(crate) fn new_thread_pool(
    &self,
  ) -> Result<Option<Arc<ThreadPool>>, NlMeansError> {
    if let Some(ref p) = self.pool {
      Ok(Some(p.clone()))
    } else if self.threads != 0 {
      let pool = ThreadPoolBuilder::new()
        .num_threads(self.threads)
        .build()
        .map_err(|e| NlMeansError::ThreadPool(e.to_string()))?;
      Ok(Some(Arc::new(pool)))
    } else {
      Ok(None)
    }
  }
}

fn make_odd(size: usize, name: &str) -> usize {
  if size & 1 == 0 {
    let odd = size | 1;
    warn!("{} size must be odd, setting it to {} (was {})", name, odd, size);
    odd
  } else {
    size
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    let config = NlMeansConfig::default();
    assert!(config.validate().is_ok());
    let params = config.normalize();
    assert_eq!(params.luma, PlaneParams { patch_hsize: 3, research_hsize: 7 });
    assert_eq!(params.chroma, params.luma);
    assert_eq!(params.max_padding(), 10);
  }

  #[test]
  fn even_sizes_become_odd() {
    let params = NlMeansConfig::new()
      .with_patch_size(4)
      .with_research_size(10)
      .with_patch_size_chroma(2)
      .normalize();
    assert_eq!(params.luma.patch_size(), 5);
    assert_eq!(params.luma.research_size(), 11);
    assert_eq!(params.chroma.patch_size(), 3);
    // Inherited from the already bumped luma value.
    assert_eq!(params.chroma.research_size(), 11);
  }

  #[test]
  fn zero_luma_size_is_bumped() {
    let params = NlMeansConfig::new().with_patch_size(0).normalize();
    assert_eq!(params.luma.patch_hsize, 0);
    assert_eq!(params.luma.padding(), 7);
  }

  #[test]
  fn chroma_overrides() {
    let params = NlMeansConfig::new()
      .with_patch_size_chroma(3)
      .with_research_size_chroma(21)
      .normalize();
    assert_eq!(
      params.chroma,
      PlaneParams { patch_hsize: 1, research_hsize: 10 }
    );
    assert_eq!(params.max_padding(), 10 + 3);
  }

  #[test]
  fn out_of_range_values_rejected() {
    use InvalidConfig::*;
    let base = NlMeansConfig::default();
    assert_eq!(
      base.clone().with_sigma(0.5).validate(),
      Err(InvalidSigma(0.5))
    );
    assert!(matches!(
      base.clone().with_sigma(f64::NAN).validate(),
      Err(InvalidSigma(_))
    ));
    assert_eq!(
      base.clone().with_patch_size(101).validate(),
      Err(InvalidPatchSize(101))
    );
    assert_eq!(
      base.clone().with_research_size(100).validate(),
      Err(InvalidResearchSize(100))
    );
    assert_eq!(
      base.clone().with_patch_size_chroma(255).validate(),
      Err(InvalidPatchSizeChroma(255))
    );
    assert_eq!(
      base.clone().with_research_size_chroma(120).validate(),
      Err(InvalidResearchSizeChroma(120))
    );
    assert_eq!(
      base.with_safe_alignment(0).validate(),
      Err(InvalidSafeAlignment(0))
    );
  }

  #[test]
  fn largest_sizes_accepted() {
    let config = NlMeansConfig::new()
      .with_sigma(30.0)
      .with_patch_size(99)
      .with_research_size(98);
    assert!(config.validate().is_ok());
    assert_eq!(config.normalize().luma.research_size(), 99);
  }
}
