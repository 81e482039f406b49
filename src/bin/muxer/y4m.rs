// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use crate::decoder::VideoDetails;
use crate::error::*;
use nlmeans::prelude::*;
use std::io::Write;

pub fn new_y4m_encoder(
  output: Box<dyn Write>, details: &VideoDetails,
) -> Result<y4m::Encoder<Box<dyn Write>>, CliError> {
  y4m::encode(details.width, details.height, details.framerate)
    .with_colorspace(details.colorspace)
    .with_pixel_aspect(details.pixel_aspect)
    .write_header(output)
    .map_err(|e| e.context("Cannot write the output header"))
}

pub fn write_y4m_frame(
  y4m_enc: &mut y4m::Encoder<Box<dyn Write>>, frame: &Frame,
  details: &VideoDetails,
) -> Result<(), CliError> {
  let (chroma_width, chroma_height) = details
    .chroma_sampling
    .get_chroma_dimensions(details.width, details.height);
  let chroma_len = if frame.planes.len() > 1 {
    chroma_width * chroma_height
  } else {
    0
  };

  let mut out_y = vec![0u8; details.width * details.height];
  let mut out_u = vec![0u8; chroma_len];
  let mut out_v = vec![0u8; chroma_len];

  frame.planes[0].copy_to_raw_u8(&mut out_y, details.width);
  if chroma_len > 0 {
    frame.planes[1].copy_to_raw_u8(&mut out_u, chroma_width);
    frame.planes[2].copy_to_raw_u8(&mut out_v, chroma_width);
  }

  let out_frame = y4m::Frame::new([&out_y, &out_u, &out_v], None);
  y4m_enc
    .write_frame(&out_frame)
    .map_err(|e| e.context("Cannot write the output frame"))
}
