#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate nlmeans;
use nlmeans::fuzzing::*;

fuzz_target!(|data: ArbitraryDisplacement| {
  let _ = pretty_env_logger::try_init();

  fuzz_integral_image(data)
});
