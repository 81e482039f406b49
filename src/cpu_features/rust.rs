// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use arg_enum_proc_macro::ArgEnum;

#[derive(
  Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ArgEnum, Default,
)]
pub enum CpuFeatureLevel {
  #[default]
  RUST,
}

impl CpuFeatureLevel {
  pub const fn all() -> &'static [Self] {
    use CpuFeatureLevel::*;
    &[RUST]
  }

  pub const fn len() -> usize {
    CpuFeatureLevel::RUST as usize + 1
  }

  #[inline(always)]
  pub const fn as_index(self) -> usize {
    self as usize
  }

  pub fn detect() -> CpuFeatureLevel {
    CpuFeatureLevel::RUST
  }
}
