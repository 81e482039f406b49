// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use libfuzzer_sys::arbitrary::{Arbitrary, Error, Unstructured};

use crate::integral::IntegralImage;
use crate::prelude::*;

// Adding new fuzz targets
//
// 1. Add a function to this file which looks like this:
//
//    pub fn fuzz_something(data: Data) {
//      // Invoke everything you need.
//      //
//      // Your function may accept a value of any type that implements
//      // Arbitrary. This is how the fuzzer affects the execution: by
//      // feeding in different bytes, which result in different
//      // arbitrary values being generated.
//      //
//      // Derive Debug for the structures you create with arbitrary data.
//    }
//
// 2. cargo fuzz add something
// 3. Copy the contents of any other .rs file from fuzz/fuzz_targets/ into the
//    newly created fuzz/fuzz_targets/something.rs and change the function
//    being called to fuzz_something.
//
// Now you can fuzz the new target with cargo fuzz.

/// A small plane and one displacement to build an integral image for.
#[derive(Debug)]
pub struct ArbitraryDisplacement {
  width: usize,
  height: usize,
  stride: usize,
  data: Vec<u8>,
  padding: usize,
  offx: isize,
  offy: isize,
  safe_alignment: usize,
}

impl Arbitrary<'_> for ArbitraryDisplacement {
  fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self, Error> {
    let width = u.int_in_range(1..=64)?;
    let height = u.int_in_range(1..=64)?;
    let stride = width + u.int_in_range(0..=16)?;
    let mut data = vec![0u8; stride * height];
    u.fill_buffer(&mut data)?;
    let padding: usize = u.int_in_range(0..=12)?;
    let reach = padding as isize;
    Ok(Self {
      width,
      height,
      stride,
      data,
      padding,
      offx: u.int_in_range(-reach..=reach)?,
      offy: u.int_in_range(-reach..=reach)?,
      safe_alignment: u.int_in_range(1..=32)?,
    })
  }
}

pub fn fuzz_integral_image(d: ArbitraryDisplacement) {
  let src = Slice2D::new(&d.data, d.width, d.height, d.stride);

  let Ok(mut reference) = IntegralImage::try_new(d.width, d.height, d.padding)
  else {
    return;
  };
  reference.compute_ssd_clamped(src, d.offx, d.offy, d.padding);

  for &cpu in CpuFeatureLevel::all() {
    if cpu > CpuFeatureLevel::default() {
      break;
    }
    let Ok(mut ii) = IntegralImage::try_new(d.width, d.height, d.padding)
    else {
      return;
    };
    ii.compute_ssd(src, d.offx, d.offy, d.padding, d.safe_alignment, cpu);
    assert_eq!(ii.as_raw(), reference.as_raw());
  }
}

/// A filter setup and the frame to run through it.
#[derive(Debug)]
pub struct ArbitraryDenoise {
  config: NlMeansConfig,
  layout: FrameLayout,
  seed: Vec<u8>,
}

impl Arbitrary<'_> for ArbitraryDenoise {
  fn arbitrary(u: &mut Unstructured<'_>) -> Result<Self, Error> {
    let sigma = f64::from(u.int_in_range(0u16..=320)?) / 10.0;
    let config = NlMeansConfig::new()
      .with_sigma(sigma)
      .with_patch_size(u.int_in_range(0..=9)?)
      .with_research_size(u.int_in_range(0..=11)?)
      .with_patch_size_chroma(u.int_in_range(0..=9)?)
      .with_research_size_chroma(u.int_in_range(0..=11)?)
      .with_safe_alignment(u.int_in_range(0..=24)?)
      .with_threads(1);
    let chroma_sampling = *u.choose(&[
      ChromaSampling::Cs410,
      ChromaSampling::Cs411,
      ChromaSampling::Cs420,
      ChromaSampling::Cs422,
      ChromaSampling::Cs440,
      ChromaSampling::Cs444,
      ChromaSampling::Cs400,
    ])?;
    let layout = FrameLayout::new(
      u.int_in_range(0..=40)?,
      u.int_in_range(0..=40)?,
      chroma_sampling,
    )
    .with_alpha(Arbitrary::arbitrary(u)?);
    let seed = Arbitrary::arbitrary(u)?;
    Ok(Self { config, layout, seed })
  }
}

pub fn fuzz_denoise(d: ArbitraryDenoise) {
  let Ok(mut filter) = NlMeans::new(&d.config, d.layout) else {
    return;
  };

  let mut src = Frame::new(&d.layout);
  let mut bytes = d.seed.iter().copied().cycle();
  for plane in src.planes.iter_mut() {
    plane.data.iter_mut().for_each(|v| *v = bytes.next().unwrap_or(0));
  }
  let mut dst = Frame::new(&d.layout);
  filter.filter_frame(&src, &mut dst);
}
