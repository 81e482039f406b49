// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

cfg_if::cfg_if! {
  if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
    mod x86;
    pub use x86::*;
  } else if #[cfg(target_arch = "aarch64")] {
    mod aarch64;
    pub use aarch64::*;
  } else {
    mod rust;
    pub use rust::*;
  }
}

/// Environment variable that caps the detected feature level.
pub(crate) const CPU_TARGET_ENV: &str = "NLMEANS_CPU_TARGET";

impl CpuFeatureLevel {
  /// Picks the lower of `requested` and `detected`; a request can only
  /// disable features, never enable ones the host lacks.
  #[inline]
  pub(crate) fn capped(requested: Option<Self>, detected: Self) -> Self {
    match requested {
      Some(manual) if manual < detected => manual,
      _ => detected,
    }
  }

  pub(crate) fn from_env(detected: Self) -> Self {
    use std::str::FromStr;
    let manual = std::env::var(CPU_TARGET_ENV)
      .ok()
      .and_then(|feature| CpuFeatureLevel::from_str(&feature).ok());
    Self::capped(manual, detected)
  }
}

// Create a static lookup table for CpuFeatureLevel enums
// Note: keys are CpuFeatureLevels without any prefix (no CpuFeatureLevel::)
//
// Levels are ordered, so a level without its own entry inherits the entry of
// the closest level below it.
macro_rules! cpu_function_lookup_table {
  ($name:ident: [$type:ty], default: $empty:expr, [$(($key:ident, $value:expr)),*]) => {
    static $name: [$type; crate::cpu_features::CpuFeatureLevel::len()] = {
      use crate::cpu_features::CpuFeatureLevel;
      #[allow(unused_mut)]
      let mut out: [$type; CpuFeatureLevel::len()] =
        [$empty; CpuFeatureLevel::len()];

      #[allow(unused_mut)]
      let mut set: [bool; CpuFeatureLevel::len()] =
        [false; CpuFeatureLevel::len()];

      #[allow(unused_imports)]
      use CpuFeatureLevel::*;
      $(
        out[$key as usize] = $value;
        set[$key as usize] = true;
      )*

      let mut i = 1;
      while i < CpuFeatureLevel::len() {
        if !set[i] {
          out[i] = out[i - 1];
        }
        i += 1;
      }
      out
    };
  };
}
