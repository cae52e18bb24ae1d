
use num_complex::Complex;

pub mod filters;
pub mod gnss;
pub mod io;
pub mod pp;
pub mod resample;
pub mod scenario;
pub mod sources;
pub mod synth;

pub mod utils;

pub const C_METERS_PER_SEC:f64 = 2.99792458e8;    // [m/s] speed of light

/// A block of contiguous baseband samples tagged with the time of each sample.
/// Stages that warp time report `ended` once their time mapping runs out of
/// domain; everything produced up to that point is still valid.
#[derive(Debug, Clone)]
pub struct SampleChunk {
	pub time: Vec<f64>,
	pub val:  Vec<Complex<f64>>,
	pub ended: bool,
}

impl SampleChunk {

	pub fn len(&self) -> usize { self.val.len() }

	pub fn is_empty(&self) -> bool { self.val.is_empty() }

}
