// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

//! nlmeans is a non-local means denoiser for 8-bit planar video.
//!
//! Each output sample is a weighted average of the samples around it, where
//! the weight of a candidate falls off exponentially with the squared
//! difference between the patch around it and the patch around the sample
//! being filtered. Patch differences are read off sum-of-squared-differences
//! integral images, one per displacement in the research window, so the
//! cost per sample does not grow with the patch size.
//!
//! # Example
//!
//! ```
//! use nlmeans::prelude::*;
//!
//! # fn main() -> Result<(), NlMeansError> {
//! let layout = FrameLayout::new(64, 48, ChromaSampling::Cs420);
//! let config = NlMeansConfig::new().with_sigma(4.0).with_patch_size(5);
//! let mut filter = NlMeans::new(&config, layout)?;
//!
//! let src = Frame::new(&layout);
//! let mut dst = Frame::new(&layout);
//! filter.filter_frame(&src, &mut dst);
//! # Ok(())
//! # }
//! ```

#![deny(bare_trait_objects)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::verbose_bit_mask)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::upper_case_acronyms)]
#![warn(clippy::expl_impl_clone_on_copy)]
#![warn(clippy::linkedlist)]
#![warn(clippy::map_flatten)]
#![warn(clippy::mem_forget)]
#![warn(clippy::mut_mut)]
#![warn(clippy::mutex_integer)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_continue)]
#![warn(clippy::path_buf_push_overwrite)]
#![warn(clippy::range_plus_one)]

#[macro_use]
mod cpu_features;

mod config;
mod denoise;
mod error;
mod frame;
mod integral;
mod util;
mod weights;

pub use crate::config::{
  FilterParams, InvalidConfig, NlMeansConfig, PlaneParams,
  DEFAULT_SAFE_ALIGNMENT, MAX_WINDOW_SIZE, SIGMA_RANGE,
};
pub use crate::cpu_features::CpuFeatureLevel;
pub use crate::denoise::NlMeans;
pub use crate::error::NlMeansError;
pub use crate::frame::{
  ChromaSampling, Frame, FrameLayout, Plane, PlaneConfig, PlaneKind,
};
pub use crate::integral::IntegralImage;
pub use crate::util::{AlignedBoxedSlice, Slice2D, Slice2DMut};
pub use crate::weights::{compute_weights_line, weight_averages, WeightLut};

/// Commonly used types and traits.
pub mod prelude {
  pub use crate::config::{InvalidConfig, NlMeansConfig};
  pub use crate::cpu_features::CpuFeatureLevel;
  pub use crate::denoise::NlMeans;
  pub use crate::error::NlMeansError;
  pub use crate::frame::{
    ChromaSampling, Frame, FrameLayout, Plane, PlaneKind,
  };
  pub use crate::util::{Slice2D, Slice2DMut};
}

/// Internals exposed for the benchmarks.
#[cfg(feature = "bench")]
pub mod bench {
  pub mod integral {
    pub use crate::integral::compute_safe_ssd_integral_image;
    pub use crate::integral::rust;
  }
}

#[cfg(fuzzing)]
pub mod fuzzing;
