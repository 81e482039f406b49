// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use thiserror::Error;

use crate::config::InvalidConfig;

/// Errors returned while setting up a filter instance.
///
/// Filtering itself cannot fail once setup succeeded.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum NlMeansError {
  /// The configuration or the frame layout was rejected.
  #[error("invalid configuration")]
  Config(#[from] InvalidConfig),
  /// A scratch buffer could not be allocated.
  #[error("out of memory allocating the {what} ({bytes} bytes)")]
  OutOfMemory {
    /// Which buffer failed.
    what: &'static str,
    /// Requested size.
    bytes: usize,
  },
  /// The dedicated thread pool could not be spawned.
  #[error("failed to build the thread pool: {0}")]
  ThreadPool(String),
}
