
use std::f64::consts;
use std::sync::Arc;

use num_complex::Complex;

use crate::SampleChunk;
use crate::pp::PiecewisePolynomial;
use crate::sources::SampleSource;

use super::reference::ReferenceSignal;

/// Applies the per-signal propagation effects to a reference signal: transmit
/// power scaling, Doppler carrier rotation, and the warp from signal time
/// (the transmitter clock, where chips are evenly spaced) to true time (the
/// receiver clock).  All three profiles are optional and independent.
///
/// Requests are denominated in seconds of signal time.  Once the warp
/// profile's domain is exhausted the tail of the chunk is dropped and
/// `ended` is reported; signal time keeps advancing by the full requested
/// duration, so every later request comes back empty with `ended` set.
pub struct ModulatedSignal {
	pub reference: ReferenceSignal,
	power:     Option<Arc<PiecewisePolynomial>>,
	doppler:   Option<Arc<PiecewisePolynomial>>,
	time_warp: Option<Arc<PiecewisePolynomial>>,
	signal_time: f64,
	carrier_phase: f64,
	// True time and Doppler at the tail of the previous chunk; the phase
	// integral picks up from here so no carrier cycle is lost between chunks
	last_point: Option<(f64, f64)>,
}

impl ModulatedSignal {

	pub fn new(reference:ReferenceSignal,
	           power:Option<Arc<PiecewisePolynomial>>,
	           doppler:Option<Arc<PiecewisePolynomial>>,
	           carrier_phase:f64,
	           time_warp:Option<Arc<PiecewisePolynomial>>) -> Self {
		Self{ reference, power, doppler, time_warp,
			signal_time: 0.0, carrier_phase, last_point: None }
	}

	pub fn unmodulated(reference:ReferenceSignal) -> Self {
		Self::new(reference, None, None, 0.0, None)
	}

	pub fn rate(&self) -> f64 { self.reference.rate() }

	pub fn use_neighbor_interp(&self) -> bool { self.reference.use_neighbor_interp() }

	pub fn signal_time(&self) -> f64 { self.signal_time }

	pub fn carrier_phase(&self) -> f64 { self.carrier_phase }

	pub fn request_duration(&mut self, dur:f64) -> SampleChunk {

		let fs = self.reference.rate();
		let step = 1.0 / fs;
		let n = (dur * fs).round() as usize;
		let mut val = self.reference.request_samples(n);
		let mut time:Vec<f64> = (0..n).map(|k| self.signal_time + (k as f64) * step).collect();

		// Map the chunk onto true time, dropping whatever falls past the end
		// of the warp's domain
		let mut ended = false;
		if let Some(warp) = &self.time_warp {
			let limit = warp.last_break();
			let keep = time.iter().take_while(|&&st| st < limit).count();
			if keep < n {
				ended = true;
				val.truncate(keep);
				time.truncate(keep);
			}
			for t in time.iter_mut() {
				*t = warp.eval(*t);
			}
		}

		if val.is_empty() {
			return SampleChunk{ time, val, ended };
		}

		// Signal time moves by the full requested duration even when the
		// warp clipped the tail
		self.signal_time += (n as f64) * step;

		if let Some(power) = &self.power {
			for (s, t) in val.iter_mut().zip(time.iter()) {
				*s = *s * power.eval(*t).sqrt();
			}
		}

		if let Some(doppler) = &self.doppler {
			let freq:Vec<f64> = time.iter().map(|&t| doppler.eval(t)).collect();
			let m = val.len();
			let two_pi = 2.0 * consts::PI;

			let mut phi = self.carrier_phase;
			match self.last_point {
				Some((t_prev, f_prev)) => {
					// Trapezoid across the chunk boundary
					phi += two_pi * 0.5 * (f_prev + freq[0]) * (time[0] - t_prev);
				},
				None if m == 1 => {
					phi += two_pi * time[0] * freq[0];
				},
				None => {},
			}

			val[0] = val[0] * Complex::from_polar(1.0, phi);
			for k in 1..m {
				phi += two_pi * 0.5 * (freq[k-1] + freq[k]) * (time[k] - time[k-1]);
				val[k] = val[k] * Complex::from_polar(1.0, phi);
			}

			self.carrier_phase = phi.rem_euclid(two_pi);
			self.last_point = Some((time[m-1], freq[m-1]));
		}

		SampleChunk{ time, val, ended }
	}

}
