
use std::f64::consts;

use num_complex::Complex;

pub trait SampleFilter {

	fn apply(&mut self, x:Complex<f64>) -> Complex<f64>;
	fn initialize(&mut self);

}

/// Rational filter in direct-form-II-transposed shape.  The delay line holds
/// `max(len(b), len(a)) - 1` complex values and persists across calls, so a
/// sample stream can be pushed through in arbitrary chunks.  The delay line
/// is left empty until the first sample arrives.
pub struct DirectForm2Transposed {
	pub b: Vec<f64>,
	pub a: Vec<f64>,
	z: Vec<Complex<f64>>,
}

impl DirectForm2Transposed {

	pub fn new(b:Vec<f64>, a:Vec<f64>) -> Result<Self, &'static str> {
		if b.is_empty() {
			return Err("filter numerator must not be empty");
		}
		if a.is_empty() {
			return Err("filter denominator must not be empty");
		}
		if a[0] == 0.0 {
			return Err("leading denominator coefficient must be nonzero");
		}
		// Normalize so the recursion below can assume a[0] = 1
		let a0 = a[0];
		let order = b.len().max(a.len()) - 1;
		let mut bn = vec![0.0; order + 1];
		let mut an = vec![0.0; order + 1];
		for (i, v) in b.iter().enumerate() { bn[i] = v / a0; }
		for (i, v) in a.iter().enumerate() { an[i] = v / a0; }
		Ok(Self{ b: bn, a: an, z: vec![] })
	}

	pub fn fir(b:Vec<f64>) -> Result<Self, &'static str> {
		Self::new(b, vec![1.0])
	}

	pub fn order(&self) -> usize { self.b.len() - 1 }

}

impl SampleFilter for DirectForm2Transposed {

	fn apply(&mut self, x:Complex<f64>) -> Complex<f64> {
		let order = self.order();
		if order == 0 {
			return x * self.b[0];
		}
		if self.z.is_empty() {
			self.z = vec![Complex::new(0.0, 0.0); order];
		}
		let y = x * self.b[0] + self.z[0];
		for i in 0..order-1 {
			self.z[i] = x * self.b[i+1] + self.z[i+1] - y * self.a[i+1];
		}
		self.z[order-1] = x * self.b[order] - y * self.a[order];
		y
	}

	fn initialize(&mut self) {
		self.z.clear();
	}

}

/// Windowed-sinc lowpass design, `order + 1` taps, Hamming window, cutoff
/// given as a fraction of the Nyquist rate.  Taps are scaled for unit DC
/// gain.
pub fn fir_lowpass(order:usize, cutoff:f64) -> Result<Vec<f64>, &'static str> {

	if order < 2 {
		return Err("filter order must be at least 2");
	}
	if cutoff <= 0.0 || cutoff > 1.0 {
		return Err("cutoff must be a fraction of the Nyquist rate in (0, 1]");
	}

	let m = order as f64;
	let mid = m / 2.0;
	let mut taps:Vec<f64> = Vec::with_capacity(order + 1);

	for i in 0..=order {
		let n = i as f64;
		let arg = consts::PI * cutoff * (n - mid);
		let sinc = if arg.abs() < 1e-12 { 1.0 } else { arg.sin() / arg };
		let window = 0.54 - 0.46 * (2.0 * consts::PI * n / m).cos();
		taps.push(cutoff * sinc * window);
	}

	let gain:f64 = taps.iter().sum();
	for t in taps.iter_mut() { *t /= gain; }

	Ok(taps)
}
