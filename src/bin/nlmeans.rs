// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

#![deny(bare_trait_objects)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::cognitive_complexity)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::verbose_bit_mask)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::many_single_char_names)]
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
extern crate log;

mod common;
mod decoder;
mod error;
mod muxer;

use crate::common::*;
use crate::decoder::{map_y4m_color_space, DecodeError, Decoder};
use crate::error::*;
use nlmeans::prelude::*;

use std::process::exit;
use std::time::{Duration, Instant};

fn main() {
  init_logger();

  run().unwrap_or_else(|e| {
    error::print_error(&e);
    exit(1);
  });
}

fn init_logger() {
  use std::str::FromStr;
  fn level_colored(l: log::Level) -> console::StyledObject<&'static str> {
    use console::style;
    use log::Level;
    match l {
      Level::Trace => style("??").dim(),
      Level::Debug => style("? ").dim(),
      Level::Info => style("> ").green(),
      Level::Warn => style("! ").yellow(),
      Level::Error => style("!!").red(),
    }
  }

  let level = std::env::var("NLMEANS_LOG")
    .ok()
    .and_then(|l| log::LevelFilter::from_str(&l).ok())
    .unwrap_or(log::LevelFilter::Info);

  fern::Dispatch::new()
    .format(move |out, message, record| {
      out.finish(format_args!(
        "{level} {message}",
        level = level_colored(record.level()),
        message = message,
      ));
    })
    // Dependencies only get to report warnings.
    .level(log::LevelFilter::Warn)
    .level_for("nlmeans", level)
    .chain(std::io::stderr())
    .apply()
    .unwrap();
}

fn run() -> Result<(), CliError> {
  let (cli, io) = parse_cli()?;
  // Largest 8-bit 4:4:4 frame we accept plus the y4m header
  let limit = y4m::Limits {
    // Use saturating operations to gracefully handle 32-bit architectures
    bytes: 65535usize
      .saturating_mul(65535)
      .saturating_mul(3)
      .saturating_add(1024),
  };
  let mut y4m_dec = match y4m::Decoder::new_with_limits(io.input, limit) {
    Err(e) => {
      return Err(CliError::new(match e {
        y4m::Error::ParseError(_) => {
          "Could not parse input video. Is it a y4m file?"
        }
        y4m::Error::IoError(_) => {
          "Could not read input file. Check that the path is correct and you have read permissions."
        }
        y4m::Error::UnknownColorspace => "Unknown colorspace.",
        y4m::Error::OutOfMemory => "The video's frame size exceeds the limit.",
        y4m::Error::EOF => "Unexpected end of input.",
        y4m::Error::BadInput => "Bad y4m input parameters provided.",
      }))
    }
    Ok(d) => d,
  };

  let colorspace = y4m_dec.get_colorspace();
  if map_y4m_color_space(colorspace).is_none() {
    return Err(CliError::new(&format!(
      "Unsupported colorspace {:?}, only 8-bit input can be denoised.",
      colorspace
    )));
  }
  let video_info = y4m_dec.get_video_details();

  let mut filter = NlMeans::new(&cli.config(), video_info.layout())
    .map_err(|e| e.context("Cannot set up the denoiser"))?;
  let mut y4m_enc = muxer::new_y4m_encoder(io.output, &video_info)?;

  info!(
    "Using y4m decoder: {}x{}p @ {}/{} fps, {}",
    video_info.width,
    video_info.height,
    video_info.framerate.num,
    video_info.framerate.den,
    video_info.chroma_sampling
  );

  let mut dst = Frame::new(&video_info.layout());
  let mut frames = 0usize;
  let mut filter_time = Duration::ZERO;
  let start = Instant::now();

  while cli.limit == 0 || frames < cli.limit {
    let src = match Decoder::read_frame(&mut y4m_dec, &video_info) {
      Ok(frame) => frame,
      Err(DecodeError::EOF) => break,
      Err(e) => return Err(e.context("Cannot read the input frame")),
    };

    let frame_start = Instant::now();
    filter.filter_frame(&src, &mut dst);
    let elapsed = frame_start.elapsed();
    filter_time += elapsed;

    muxer::write_y4m_frame(&mut y4m_enc, &dst, &video_info)?;
    if cli.verbose {
      info!("Frame {} - {:.2} ms", frames, elapsed.as_secs_f64() * 1000.);
    }
    frames += 1;
  }

  let total = start.elapsed().as_secs_f64();
  let fps = if total > 0. { frames as f64 / total } else { 0. };
  eprintln!(
    "Denoised {} frames in {:.2}s ({:.2}s filtering), {:.2} fps",
    frames,
    total,
    filter_time.as_secs_f64(),
    fps
  );

  Ok(())
}
