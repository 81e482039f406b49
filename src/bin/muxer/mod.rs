// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

mod y4m;

pub use self::y4m::{new_y4m_encoder, write_y4m_frame};

use crate::error::*;
use std::fs::File;
use std::io;
use std::io::Write;

pub fn open_output(path: &str) -> Result<Box<dyn Write>, CliError> {
  match path {
    "-" => Ok(Box::new(io::stdout())),
    _ => Ok(Box::new(
      File::create(path).map_err(|e| e.context("Cannot open output file"))?,
    )),
  }
}
