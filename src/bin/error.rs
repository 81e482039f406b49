// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use crate::decoder::DecodeError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
  #[error("{msg}: {io}")]
  Io { msg: String, io: std::io::Error },
  #[error("{msg}: {err:?}")]
  Decode { msg: String, err: DecodeError },
  #[error("{msg}: {err:?}")]
  Y4m { msg: String, err: y4m::Error },
  #[error("{msg}")]
  Filter {
    msg: String,
    #[source]
    err: nlmeans::NlMeansError,
  },
  #[error("{msg}")]
  Generic { msg: String },
}

impl CliError {
  pub fn new(msg: &str) -> CliError {
    CliError::Generic { msg: msg.to_owned() }
  }
}

pub trait ToError {
  fn context(self, msg: &str) -> CliError;
}

impl ToError for std::io::Error {
  fn context(self, msg: &str) -> CliError {
    CliError::Io { msg: msg.to_owned(), io: self }
  }
}

impl ToError for DecodeError {
  fn context(self, msg: &str) -> CliError {
    CliError::Decode { msg: msg.to_owned(), err: self }
  }
}

impl ToError for y4m::Error {
  fn context(self, msg: &str) -> CliError {
    CliError::Y4m { msg: msg.to_owned(), err: self }
  }
}

impl ToError for nlmeans::NlMeansError {
  fn context(self, msg: &str) -> CliError {
    CliError::Filter { msg: msg.to_owned(), err: self }
  }
}

pub fn print_error(e: &dyn std::error::Error) {
  error!("{}", e);
  let mut cause = e.source();
  while let Some(e) = cause {
    error!("Caused by: {}", e);
    cause = e.source();
  }
}
