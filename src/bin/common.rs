// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use crate::error::*;
use clap::Parser;
use nlmeans::prelude::*;

use std::fs::File;
use std::io;
use std::io::prelude::*;

#[derive(Parser, Debug)]
#[command(
  name = "nlmeans",
  version,
  about = "Non-local means denoiser for YUV4MPEG2 video"
)]
pub struct CliOptions {
  /// Uncompressed YUV4MPEG2 video input, `-` for stdin
  #[arg(value_name = "INPUT")]
  pub input: String,
  /// Denoised YUV4MPEG2 video output, `-` for stdout
  #[arg(short, long, value_name = "OUTPUT")]
  pub output: String,
  /// Denoising strength
  #[arg(short, long, default_value_t = 1.0)]
  pub sigma: f64,
  /// Patch size, bumped to the next odd value if even
  #[arg(short, long, default_value_t = 7)]
  pub patch_size: usize,
  /// Research window size, bumped to the next odd value if even
  #[arg(short, long, default_value_t = 15)]
  pub research_size: usize,
  /// Patch size for the chroma planes, 0 to reuse the luma value
  #[arg(long, default_value_t = 0)]
  pub patch_size_chroma: usize,
  /// Research window size for the chroma planes, 0 to reuse the luma value
  #[arg(long, default_value_t = 0)]
  pub research_size_chroma: usize,
  /// Number of worker threads, 0 for one per core
  #[arg(long, default_value_t = 0)]
  pub threads: usize,
  /// Maximum number of frames to process, 0 for all
  #[arg(short, long, default_value_t = 0)]
  pub limit: usize,
  /// Log the time spent on every frame
  #[arg(short, long)]
  pub verbose: bool,
}

impl CliOptions {
  pub fn config(&self) -> NlMeansConfig {
    NlMeansConfig::new()
      .with_sigma(self.sigma)
      .with_patch_size(self.patch_size)
      .with_research_size(self.research_size)
      .with_patch_size_chroma(self.patch_size_chroma)
      .with_research_size_chroma(self.research_size_chroma)
      .with_threads(self.threads)
  }
}

pub struct FilterIO {
  pub input: Box<dyn Read>,
  pub output: Box<dyn Write>,
}

pub fn parse_cli() -> Result<(CliOptions, FilterIO), CliError> {
  let opts = CliOptions::parse();

  let input: Box<dyn Read> = match opts.input.as_str() {
    "-" => Box::new(io::stdin()),
    f => Box::new(
      File::open(f).map_err(|e| e.context("Cannot open input file"))?,
    ),
  };
  let output = crate::muxer::open_output(&opts.output)?;

  Ok((opts, FilterIO { input, output }))
}
