
use std::f64::consts;

use num_complex::Complex;

pub mod filtered;
pub mod noise;

/// A pull-driven producer of baseband samples at a fixed rate.  Requests are
/// stateful: each one returns the next `n` samples of the stream and moves
/// the internal cursor, so back-to-back requests concatenate seamlessly.
/// `advance` moves the cursor without producing output.
///
/// `use_neighbor_interp` marks square-wave streams (chips) that should be
/// resampled by sample-and-hold rather than a smooth interpolant.
pub trait SampleSource {

	fn rate(&self) -> f64;
	fn request_samples(&mut self, n:usize) -> Vec<Complex<f64>>;
	fn advance(&mut self, n:usize);

	fn use_neighbor_interp(&self) -> bool { false }

}

/// Endless repetition of a fixed real-valued sample sequence, e.g. a PRN
/// spreading code.  The caller-facing start offset is 1-based.
pub struct RepeatingSource {
	pub samples: Vec<f64>,
	pub fs: f64,
	idx: usize,
}

impl RepeatingSource {

	pub fn new(samples:Vec<f64>, fs:f64, start:usize) -> Result<Self, &'static str> {
		if samples.is_empty() {
			return Err("chip sequence must not be empty");
		}
		if fs <= 0.0 {
			return Err("sample rate must be positive");
		}
		if start < 1 || start > samples.len() {
			return Err("start offset must be between 1 and the sequence length");
		}
		Ok(Self{ samples, fs, idx: start - 1 })
	}

	pub fn position(&self) -> usize { self.idx }

}

impl SampleSource for RepeatingSource {

	fn rate(&self) -> f64 { self.fs }

	fn request_samples(&mut self, n:usize) -> Vec<Complex<f64>> {
		let len = self.samples.len();
		let out:Vec<Complex<f64>> = (0..n)
			.map(|k| Complex::new(self.samples[(self.idx + k) % len], 0.0))
			.collect();
		self.idx = (self.idx + n) % len;
		out
	}

	fn advance(&mut self, n:usize) {
		self.idx = (self.idx + n) % self.samples.len();
	}

	fn use_neighbor_interp(&self) -> bool { true }

}

/// Complex tone at a fixed frequency; 0 Hz degenerates to a DC stream of
/// `amplitude + 0i`.
pub struct SineSource {
	pub fs: f64,
	pub freq_hz: f64,
	pub amplitude: f64,
	phase: f64,
}

impl SineSource {

	pub fn new(freq_hz:f64, amplitude:f64, fs:f64, phase:f64) -> Result<Self, &'static str> {
		if fs <= 0.0 {
			return Err("sample rate must be positive");
		}
		Ok(Self{ fs, freq_hz, amplitude, phase })
	}

	fn phase_step(&self) -> f64 {
		2.0 * consts::PI * self.freq_hz / self.fs
	}

}

impl SampleSource for SineSource {

	fn rate(&self) -> f64 { self.fs }

	fn request_samples(&mut self, n:usize) -> Vec<Complex<f64>> {
		let step = self.phase_step();
		let mut out:Vec<Complex<f64>> = Vec::with_capacity(n);
		for _ in 0..n {
			out.push(Complex::from_polar(self.amplitude, self.phase));
			self.phase = (self.phase + step).rem_euclid(2.0 * consts::PI);
		}
		out
	}

	fn advance(&mut self, n:usize) {
		self.phase = (self.phase + (n as f64) * self.phase_step()).rem_euclid(2.0 * consts::PI);
	}

}
