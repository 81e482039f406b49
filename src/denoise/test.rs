// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use super::*;
use crate::frame::ChromaSampling;

use interpolate_name::interpolate_test;
use pretty_assertions::assert_eq;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

fn random_plane(w: usize, h: usize, seed: u64) -> Vec<u8> {
  let mut rng = ChaChaRng::seed_from_u64(seed);
  (0..w * h).map(|_| rng.gen()).collect()
}

/// Smooth gradient plus a little noise, so patches actually match.
fn noisy_gradient(w: usize, h: usize, seed: u64) -> Vec<u8> {
  let mut rng = ChaChaRng::seed_from_u64(seed);
  (0..w * h)
    .map(|i| {
      let (x, y) = (i % w, i / w);
      let v = (x * 7 + y * 3) as i32 + rng.gen_range(-6..=6);
      v.clamp(0, 255) as u8
    })
    .collect()
}

fn setup(
  w: usize, h: usize, p: usize, r: usize, sigma: f64,
) -> (NlMeans, NlMeansConfig) {
  let config = NlMeansConfig::new()
    .with_sigma(sigma)
    .with_patch_size(2 * p + 1)
    .with_research_size(2 * r + 1);
  let layout = FrameLayout::new(w, h, ChromaSampling::Cs400);
  (NlMeans::new(&config, layout).unwrap(), config)
}

fn run_plane(nl: &mut NlMeans, src: &[u8], w: usize, h: usize) -> Vec<u8> {
  let mut out = vec![0u8; w * h];
  nl.filter_plane(
    Slice2D::new(src, w, h, w),
    Slice2DMut::new(&mut out, w, h, w),
    PlaneKind::Luma,
  );
  out
}

/// Direct evaluation of every patch difference, reading samples through
/// clamped coordinates.
fn naive_nlmeans(
  src: &[u8], w: usize, h: usize, p: usize, r: usize, lut: &WeightLut,
) -> Vec<u8> {
  let px = |x: isize, y: isize| {
    let x = x.clamp(0, w as isize - 1) as usize;
    let y = y.clamp(0, h as isize - 1) as usize;
    src[y * w + x]
  };
  let (p, r) = (p as isize, r as isize);
  let (wi, hi) = (w as isize, h as isize);
  let mut total_weight = vec![0f32; w * h];
  let mut sum = vec![0f32; w * h];

  for offy in -r..=r {
    for offx in -r..=r {
      if offx == 0 && offy == 0 {
        continue;
      }
      for y in 0..hi {
        for x in 0..wi {
          let (nx, ny) = (x + offx, y + offy);
          if nx < 0 || ny < 0 || nx >= wi || ny >= hi {
            continue;
          }
          let mut ssd = 0u32;
          for j in -p..=p {
            for i in -p..=p {
              let d =
                i32::from(px(nx + i, ny + j)) - i32::from(px(x + i, y + j));
              ssd += (d * d) as u32;
            }
          }
          let weight = lut.weight(ssd);
          let k = (y * wi + x) as usize;
          total_weight[k] += weight;
          sum[k] += weight * f32::from(px(nx, ny));
        }
      }
    }
  }

  let mut out = vec![0u8; w * h];
  weight_averages(&mut total_weight, &mut sum, src, &mut out);
  out
}

#[interpolate_test(small, 17, 13, 1, 2)]
#[interpolate_test(wide_patch, 9, 7, 3, 3)]
#[interpolate_test(window_larger_than_plane, 4, 3, 1, 5)]
#[interpolate_test(single_row, 23, 1, 2, 3)]
#[interpolate_test(single_column, 1, 9, 1, 2)]
#[interpolate_test(mid_size, 37, 21, 2, 4)]
fn matches_naive(w: usize, h: usize, p: usize, r: usize) {
  let src = noisy_gradient(w, h, (w * 31 + h) as u64);
  let (mut nl, _) = setup(w, h, p, r, 6.0);
  let out = run_plane(&mut nl, &src, w, h);
  assert_eq!(out, naive_nlmeans(&src, w, h, p, r, nl.weight_lut()));
}

#[test]
fn unique_patches_are_left_alone() {
  let (w, h) = (16, 16);
  let src = random_plane(w, h, 3);
  let (mut nl, _) = setup(w, h, 1, 2, 1.0);
  // Only identical patches get any weight.
  nl.set_weight_lut(WeightLut::from_table(vec![1.0, 0.0]));
  assert_eq!(run_plane(&mut nl, &src, w, h), src);
}

#[test]
fn textured_plane_passes_through() {
  let (w, h) = (32, 32);
  let src = random_plane(w, h, 99);
  let (mut nl, _) = setup(w, h, 3, 7, 1.0);
  assert_eq!(nl.weight_lut().weight(u32::MAX), 0.0);
  // No two 7x7 patches of uniform noise are close enough to be averaged.
  assert_eq!(run_plane(&mut nl, &src, w, h), src);
}

#[test]
fn only_neighbours_inside_the_plane_contribute() {
  let (w, h, r) = (7, 5, 2);
  let src = random_plane(w, h, 4);
  let (mut nl, _) = setup(w, h, 1, r, 1.0);
  nl.set_weight_lut(WeightLut::from_table(vec![1.0]));
  let out = run_plane(&mut nl, &src, w, h);

  let r = r as isize;
  for y in 0..h {
    for x in 0..w {
      let count = (-r..=r)
        .flat_map(|oy| (-r..=r).map(move |ox| (ox, oy)))
        .filter(|&(ox, oy)| (ox, oy) != (0, 0))
        .filter(|&(ox, oy)| {
          let (nx, ny) = (x as isize + ox, y as isize + oy);
          nx >= 0 && ny >= 0 && nx < w as isize && ny < h as isize
        })
        .count();
      let tw = nl.total_weight[y * nl.acc_stride + x];
      // Plus the unit self weight.
      assert_eq!(tw, (count + 1) as f32, "pixel ({}, {})", x, y);
    }
  }
  assert_eq!(out, naive_nlmeans(&src, w, h, 1, 2, nl.weight_lut()));
}

#[test]
fn every_pixel_has_weight() {
  let (w, h) = (29, 11);
  let src = random_plane(w, h, 5);
  let (mut nl, _) = setup(w, h, 3, 7, 1.0);
  nl.set_weight_lut(WeightLut::from_table(vec![0.0]));
  assert_eq!(run_plane(&mut nl, &src, w, h), src);
  for y in 0..h {
    let row = &nl.total_weight[y * nl.acc_stride..][..w];
    assert!(row.iter().all(|&tw| tw >= 1.0));
  }
}

#[test]
fn flat_plane_is_unchanged() {
  let (w, h) = (20, 12);
  let src = vec![77u8; w * h];
  let (mut nl, _) = setup(w, h, 3, 7, 15.0);
  assert_eq!(run_plane(&mut nl, &src, w, h), src);
}

#[test]
fn noise_is_reduced() {
  let (w, h) = (48, 32);
  let clean: Vec<u8> = (0..w * h).map(|i| ((i % w) * 4) as u8).collect();
  let mut rng = ChaChaRng::seed_from_u64(6);
  let noisy: Vec<u8> = clean
    .iter()
    .map(|&v| (i32::from(v) + rng.gen_range(-12..=12)).clamp(0, 255) as u8)
    .collect();
  let (mut nl, _) = setup(w, h, 3, 7, 8.0);
  let out = run_plane(&mut nl, &noisy, w, h);

  let error = |plane: &[u8]| -> u64 {
    plane
      .iter()
      .zip(&clean)
      .map(|(&a, &b)| (i64::from(a) - i64::from(b)).unsigned_abs())
      .sum()
  };
  assert!(error(&out) < error(&noisy));
}

#[test]
fn output_does_not_depend_on_execution() {
  let (w, h) = (45, 19);
  let src = noisy_gradient(w, h, 8);
  let (mut reference, config) = setup(w, h, 2, 3, 4.0);
  let expected = run_plane(&mut reference, &src, w, h);
  let layout = *reference.layout();

  let variants = [
    config.clone().with_threads(1),
    config.clone().with_threads(3),
    config.clone().with_safe_alignment(1),
    config.clone().with_safe_alignment(7),
    config.clone().with_cpu_feature_level(CpuFeatureLevel::RUST),
  ];
  for variant in variants {
    let mut nl = NlMeans::new(&variant, layout).unwrap();
    assert_eq!(run_plane(&mut nl, &src, w, h), expected, "{:?}", variant);
  }
}

#[test]
fn instance_is_reusable() {
  let (w, h) = (13, 9);
  let (mut nl, _) = setup(w, h, 1, 3, 5.0);
  let first = random_plane(w, h, 9);
  let second = noisy_gradient(w, h, 10);
  let expected = run_plane(&mut nl, &first, w, h);
  run_plane(&mut nl, &second, w, h);
  assert_eq!(run_plane(&mut nl, &first, w, h), expected);
}

#[test]
fn frame_planes_use_their_parameters() {
  let (w, h) = (12, 10);
  let config = NlMeansConfig::new()
    .with_sigma(5.0)
    .with_patch_size(3)
    .with_research_size(5)
    .with_patch_size_chroma(5)
    .with_research_size_chroma(3);
  let layout = FrameLayout::new(w, h, ChromaSampling::Cs420).with_alpha(true);
  let mut nl = NlMeans::new(&config, layout).unwrap();

  let mut src = Frame::new(&layout);
  for (i, plane) in src.planes.iter_mut().enumerate() {
    let (pw, ph) = (plane.cfg.width, plane.cfg.height);
    plane.copy_from_raw_u8(&noisy_gradient(pw, ph, i as u64), pw);
  }
  let mut dst = Frame::new(&layout);
  nl.filter_frame(&src, &mut dst);

  for (i, (src, dst)) in src.planes.iter().zip(&dst.planes).enumerate() {
    let (pw, ph) = (src.cfg.width, src.cfg.height);
    let mut input = vec![0u8; pw * ph];
    let mut output = vec![0u8; pw * ph];
    src.copy_to_raw_u8(&mut input, pw);
    dst.copy_to_raw_u8(&mut output, pw);
    let (p, r) = match i {
      0 | 3 => (1, 2),
      _ => (2, 1),
    };
    assert_eq!(
      output,
      naive_nlmeans(&input, pw, ph, p, r, nl.weight_lut()),
      "plane {}",
      i
    );
  }
}

#[test]
fn invalid_layout_is_rejected() {
  let config = NlMeansConfig::default();
  let layout = FrameLayout::new(0, 8, ChromaSampling::Cs420);
  let err = NlMeans::new(&config, layout).unwrap_err();
  assert_eq!(err, NlMeansError::Config(InvalidConfig::InvalidWidth(0)));
  let layout = FrameLayout::new(8, 70000, ChromaSampling::Cs420);
  let err = NlMeans::new(&config, layout).unwrap_err();
  assert_eq!(err, NlMeansError::Config(InvalidConfig::InvalidHeight(70000)));
}

#[test]
fn invalid_config_is_rejected() {
  let config = NlMeansConfig::default().with_sigma(31.0);
  let layout = FrameLayout::new(8, 8, ChromaSampling::Cs400);
  assert_eq!(
    NlMeans::new(&config, layout).unwrap_err(),
    NlMeansError::Config(InvalidConfig::InvalidSigma(31.0))
  );
}

#[test]
#[should_panic]
fn mismatched_planes_panic() {
  let (mut nl, _) = setup(8, 8, 1, 1, 1.0);
  let src = vec![0u8; 64];
  let mut dst = vec![0u8; 56];
  nl.filter_plane(
    Slice2D::new(&src, 8, 8, 8),
    Slice2DMut::new(&mut dst, 8, 7, 8),
    PlaneKind::Luma,
  );
}

#[test]
#[should_panic]
fn plane_larger_than_layout_panics() {
  let (mut nl, _) = setup(8, 8, 1, 1, 1.0);
  let src = vec![0u8; 81];
  let mut dst = vec![0u8; 81];
  nl.filter_plane(
    Slice2D::new(&src, 9, 9, 9),
    Slice2DMut::new(&mut dst, 9, 9, 9),
    PlaneKind::Luma,
  );
}
