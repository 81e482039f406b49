use nlmeans::prelude::*;

#[test]
fn filter_frame() -> Result<(), Box<dyn std::error::Error>> {
  let layout = FrameLayout::new(40, 30, ChromaSampling::Cs420);
  let cfg = NlMeansConfig::new().with_sigma(3.0).with_patch_size(5);
  let mut filter = NlMeans::new(&cfg, layout)?;

  let mut src = Frame::new(&layout);
  for plane in src.planes.iter_mut() {
    let stride = plane.cfg.stride;
    for (i, v) in plane.data.iter_mut().enumerate() {
      *v = ((i % stride) * 5 + (i / stride) * 3) as u8;
    }
  }
  let mut dst = Frame::new(&layout);
  filter.filter_frame(&src, &mut dst);

  assert_eq!(dst.planes.len(), 3);
  assert_eq!(dst.planes[1].cfg.width, 20);
  Ok(())
}

#[test]
fn filter_plane_in_place_buffers() -> Result<(), Box<dyn std::error::Error>>
{
  // Any strided buffer can be filtered, not only `Plane`s.
  let (w, h, stride) = (24, 16, 32);
  let src: Vec<u8> = (0..stride * h).map(|i| (i * 13 % 251) as u8).collect();
  let mut dst = vec![0u8; stride * h];

  let layout = FrameLayout::new(w, h, ChromaSampling::Cs400);
  let cfg = NlMeansConfig::new().with_research_size(7).with_threads(2);
  let mut filter = NlMeans::new(&cfg, layout)?;
  filter.filter_plane(
    Slice2D::new(&src, w, h, stride),
    Slice2DMut::new(&mut dst, w, h, stride),
    PlaneKind::Luma,
  );

  // Samples past the visible width are never touched.
  assert!(dst.chunks(stride).all(|row| row[w..].iter().all(|&v| v == 0)));
  Ok(())
}

#[test]
fn rejected_configuration() {
  let layout = FrameLayout::new(16, 16, ChromaSampling::Cs444);
  let cfg = NlMeansConfig::new().with_sigma(0.5);
  match NlMeans::new(&cfg, layout) {
    Err(NlMeansError::Config(InvalidConfig::InvalidSigma(s))) => {
      assert_eq!(s, 0.5)
    }
    other => panic!("unexpected result: {:?}", other),
  }
}
