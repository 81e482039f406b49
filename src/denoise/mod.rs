// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::sync::Arc;

use log::{debug, info, trace};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::{FilterParams, InvalidConfig, NlMeansConfig, PlaneParams};
use crate::cpu_features::CpuFeatureLevel;
use crate::error::NlMeansError;
use crate::frame::{Frame, FrameLayout, PlaneKind};
use crate::integral::IntegralImage;
use crate::util::{AlignedBoxedSlice, Fixed, Slice2D, Slice2DMut};
use crate::weights::{compute_weights_line, weight_averages, WeightLut};

/// Non-local means denoiser.
///
/// Every output sample is the average of the samples in its research
/// window, each weighted by how closely the patch around it matches the
/// patch around the output position. Patch differences for one
/// displacement of the whole plane are read off an SSD integral image, so
/// their cost does not depend on the patch size.
///
/// Scratch buffers are allocated once for the frame layout given at
/// construction and reused for every plane; `&mut self` keeps one frame
/// in flight per instance.
pub struct NlMeans {
  params: FilterParams,
  layout: FrameLayout,
  lut: WeightLut,
  ii: IntegralImage,
  total_weight: AlignedBoxedSlice<f32>,
  sum: AlignedBoxedSlice<f32>,
  /// Row stride of the accumulators, shared by every plane.
  acc_stride: usize,
  safe_alignment: usize,
  cpu: CpuFeatureLevel,
  pool: Option<Arc<ThreadPool>>,
}

impl std::fmt::Debug for NlMeans {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NlMeans")
      .field("params", &self.params)
      .field("layout", &self.layout)
      .field("ii", &self.ii)
      .field("acc_stride", &self.acc_stride)
      .field("cpu", &self.cpu)
      .finish()
  }
}

fn validate_layout(layout: &FrameLayout) -> Result<(), InvalidConfig> {
  use InvalidConfig::*;

  if layout.width == 0 || layout.width > u16::MAX as usize {
    return Err(InvalidWidth(layout.width));
  }
  if layout.height == 0 || layout.height > u16::MAX as usize {
    return Err(InvalidHeight(layout.height));
  }
  Ok(())
}

impl NlMeans {
  /// Sets up a filter instance for frames of `layout`.
  ///
  /// # Errors
  ///
  /// - Returns `NlMeansError::Config` if the configuration or the layout
  ///   is invalid.
  /// - Returns `NlMeansError::OutOfMemory` if a scratch buffer cannot be
  ///   allocated.
  /// - Returns `NlMeansError::ThreadPool` if a dedicated pool was requested
  ///   and could not be built.
  pub fn new(
    config: &NlMeansConfig, layout: FrameLayout,
  ) -> Result<Self, NlMeansError> {
    config.validate()?;
    validate_layout(&layout)?;

    let params = config.normalize();
    info!(
      "Research window: {}x{} / {}x{}, patch size: {}x{} / {}x{}",
      params.luma.research_size(),
      params.luma.research_size(),
      params.chroma.research_size(),
      params.chroma.research_size(),
      params.luma.patch_size(),
      params.luma.patch_size(),
      params.chroma.patch_size(),
      params.chroma.patch_size()
    );

    let cpu = config.cpu();
    info!("CPU Feature Level: {}", cpu);

    let lut = WeightLut::try_new(config.sigma)?;

    let padding = params.max_padding();
    let ii = IntegralImage::try_new(layout.width, layout.height, padding)?;

    let acc_stride = layout.width.align_power_of_two(4);
    let acc_len = acc_stride * layout.height;
    let alloc_acc = || {
      AlignedBoxedSlice::try_new(acc_len, 0f32).ok_or(
        NlMeansError::OutOfMemory {
          what: "weight accumulator",
          bytes: AlignedBoxedSlice::<f32>::byte_size(acc_len),
        },
      )
    };
    let total_weight = alloc_acc()?;
    let sum = alloc_acc()?;

    debug!(
      "integral image {}x{} (stride {}), accumulators {}x{}, {} weights",
      layout.width + 2 * padding,
      layout.height + 2 * padding,
      ii.stride(),
      acc_stride,
      layout.height,
      lut.max_meaningful_diff() + 1
    );

    let pool = config.new_thread_pool()?;

    Ok(NlMeans {
      params,
      layout,
      lut,
      ii,
      total_weight,
      sum,
      acc_stride,
      safe_alignment: config.safe_alignment,
      cpu,
      pool,
    })
  }

  pub const fn params(&self) -> &FilterParams {
    &self.params
  }

  pub const fn layout(&self) -> &FrameLayout {
    &self.layout
  }

  pub const fn cpu_feature_level(&self) -> CpuFeatureLevel {
    self.cpu
  }

  pub const fn weight_lut(&self) -> &WeightLut {
    &self.lut
  }

  #[cfg(test)]
  pub(crate) fn set_weight_lut(&mut self, lut: WeightLut) {
    self.lut = lut;
  }

  /// Denoises every plane of `src` into `dst`.
  ///
  /// # Panics
  ///
  /// - If the frames do not match the layout the filter was set up for.
  pub fn filter_frame(&mut self, src: &Frame, dst: &mut Frame) {
    assert_eq!(src.planes.len(), self.layout.plane_count());
    assert_eq!(dst.planes.len(), src.planes.len());

    for (index, (src, dst)) in
      src.planes.iter().zip(dst.planes.iter_mut()).enumerate()
    {
      if !self.layout.has_plane(index) {
        continue;
      }
      self.filter_plane(
        src.as_slice2d(),
        dst.as_slice2d_mut(),
        PlaneKind::from_index(index),
      );
    }
  }

  /// Denoises one plane with the parameters of `kind`.
  ///
  /// # Panics
  ///
  /// - If `src` and `dst` differ in size.
  /// - If the plane is empty or larger than the luma plane of the layout.
  pub fn filter_plane(
    &mut self, src: Slice2D<'_, u8>, dst: Slice2DMut<'_, u8>, kind: PlaneKind,
  ) {
    assert_eq!((src.width(), src.height()), (dst.width(), dst.height()));
    assert!(src.width() > 0 && src.height() > 0);
    assert!(
      src.width() <= self.layout.width && src.height() <= self.layout.height,
      "plane {}x{} is larger than the {}x{} layout",
      src.width(),
      src.height(),
      self.layout.width,
      self.layout.height
    );

    let params = if kind.uses_luma_params() {
      self.params.luma
    } else {
      self.params.chroma
    };
    trace!(
      "{:?} plane {}x{}, patch {}, research {}",
      kind,
      src.width(),
      src.height(),
      params.patch_size(),
      params.research_size()
    );

    self.nlmeans_plane(src, dst, params);
  }

  fn nlmeans_plane(
    &mut self, src: Slice2D<'_, u8>, mut dst: Slice2DMut<'_, u8>,
    params: PlaneParams,
  ) {
    let (w, h) = (src.width(), src.height());
    let acc_stride = self.acc_stride;
    let acc_len = acc_stride * h;
    let r = params.research_hsize as isize;
    let e = params.padding();

    self.total_weight[..acc_len].fill(0.0);
    self.sum[..acc_len].fill(0.0);

    let slices = match self.pool {
      Some(ref pool) => pool.current_num_threads(),
      None => rayon::current_num_threads(),
    };

    for offy in -r..=r {
      for offx in -r..=r {
        if offx == 0 && offy == 0 {
          continue;
        }

        // Only pixels whose displaced neighbour lies inside the plane
        // take part.
        let starty = (-offy).max(0) as usize;
        let endy = (h as isize).min(h as isize - offy).max(0) as usize;
        let startx = (-offx).max(0) as usize;
        let endx = (w as isize).min(w as isize - offx).max(0) as usize;
        if starty >= endy || startx >= endx {
          continue;
        }

        self.ii.compute_ssd(
          src,
          offx,
          offy,
          e,
          self.safe_alignment,
          self.cpu,
        );

        let job = SliceJob {
          src,
          ii: &self.ii,
          lut: &self.lut,
          offx,
          offy,
          p: params.patch_hsize,
          r: params.research_hsize,
          startx,
          endx,
        };
        let rows = endy - starty;
        let rows_per_slice = (rows + slices - 1) / slices;
        let chunk = rows_per_slice * acc_stride;
        let range = starty * acc_stride..(endy * acc_stride).min(acc_len);
        let total_weight = &mut self.total_weight[range.clone()];
        let sum = &mut self.sum[range];

        let mut run = || {
          total_weight
            .par_chunks_mut(chunk)
            .zip(sum.par_chunks_mut(chunk))
            .enumerate()
            .for_each(|(i, (total_weight, sum))| {
              job.accumulate(
                starty + i * rows_per_slice,
                total_weight,
                sum,
                acc_stride,
              );
            });
        };
        match self.pool {
          Some(ref pool) => pool.install(run),
          None => run(),
        }
      }
    }

    for (y, dst_row) in dst.rows_iter_mut().enumerate() {
      let acc = y * acc_stride;
      weight_averages(
        &mut self.total_weight[acc..acc + w],
        &mut self.sum[acc..acc + w],
        &src[y],
        dst_row,
      );
    }
  }
}

/// Inputs shared by the row slices of one displacement.
struct SliceJob<'a> {
  src: Slice2D<'a, u8>,
  ii: &'a IntegralImage,
  lut: &'a WeightLut,
  offx: isize,
  offy: isize,
  p: usize,
  r: usize,
  startx: usize,
  endx: usize,
}

impl SliceJob<'_> {
  /// Accumulates the rows starting at `y0` whose accumulators make up
  /// `total_weight` and `sum`.
  fn accumulate(
    &self, y0: usize, total_weight: &mut [f32], sum: &mut [f32],
    acc_stride: usize,
  ) {
    let ii = self.ii.as_raw();
    let ii_stride = self.ii.stride();
    let dist_b = 2 * self.p + 1;
    let dist_d = dist_b * ii_stride;
    let (startx, endx) = (self.startx, self.endx);
    let n = endx - startx;
    let r = self.r as isize;

    for (i, (tw_row, sum_row)) in total_weight
      .chunks_mut(acc_stride)
      .zip(sum.chunks_mut(acc_stride))
      .enumerate()
    {
      let y = (y0 + i) as isize;
      // Above-left corner of the patch box around the displaced pixel at
      // column 0, one row and column outside the box.
      let a = (r + self.offy + y) as usize * ii_stride
        + (r + self.offx) as usize
        + startx;
      let neighbor = &self.src[(y + self.offy) as usize]
        [(startx as isize + self.offx) as usize..][..n];

      compute_weights_line(
        &ii[a..a + n],
        &ii[a + dist_b..a + dist_b + n],
        &ii[a + dist_d..a + dist_d + n],
        &ii[a + dist_d + dist_b..a + dist_d + dist_b + n],
        neighbor,
        &mut tw_row[startx..endx],
        &mut sum_row[startx..endx],
        self.lut,
      );
    }
  }
}

#[cfg(test)]
mod test;
