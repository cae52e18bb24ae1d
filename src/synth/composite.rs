
use std::collections::VecDeque;
use std::f64::consts;
use std::fmt;

use num_complex::Complex;

use crate::filters::{self, DirectForm2Transposed, SampleFilter};
use crate::resample;

use super::modulated::ModulatedSignal;

pub const DEFAULT_OVERSAMPLE:usize = 4;
pub const DEFAULT_FILTER_ORDER:usize = 60;
pub const DEFAULT_CUTOFF_SCALE:f64 = 1.0;

struct Entry {
	signal: ModulatedSignal,
	fdma_offset_hz: f64,
	fdma_phase: f64,
	// Samples produced by the signal but not yet consumed by the common
	// grid, keyed by (group-delay compensated) true time.  Trimmed from the
	// front and extended at the back, never touched in the middle.
	time_buf:   VecDeque<f64>,
	sample_buf: VecDeque<Complex<f64>>,
	ended: bool,
}

/// Aggregates several modulated signals onto one output sample stream.  Each
/// signal lives on its own true-time axis, so its samples are buffered and
/// interpolated onto a shared grid running at `oversample` times the output
/// rate; the per-signal contributions are summed, lowpass filtered, and
/// decimated back down to the output rate.  An optional per-signal carrier
/// offset supports FDMA constellations.
pub struct Composite {
	pub fs_out: f64,
	pub oversample: usize,
	filter: Option<DirectForm2Transposed>,
	group_delay_sec: f64,
	sample_counter: u64,
	entries: Vec<Entry>,
}

impl fmt::Debug for Composite {
	fn fmt(&self, f:&mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Composite")
			.field("fs_out", &self.fs_out)
			.field("oversample", &self.oversample)
			.field("group_delay_sec", &self.group_delay_sec)
			.field("sample_counter", &self.sample_counter)
			.field("entries", &self.entries.len())
			.finish()
	}
}

impl Composite {

	pub fn new(fs_out:f64, oversample:usize, filter_order:usize, cutoff_scale:f64) -> Result<Self, &'static str> {
		if fs_out <= 0.0 {
			return Err("output sample rate must be positive");
		}
		if oversample < 1 {
			return Err("oversample factor must be at least 1");
		}
		if cutoff_scale <= 0.0 || cutoff_scale > 1.0 {
			return Err("cutoff scale must be in (0, 1]");
		}

		let (filter, group_delay_sec) = if oversample != 1 {
			let taps = filters::fir_lowpass(filter_order, cutoff_scale / (oversample as f64))?;
			let delay = (filter_order as f64 / 2.0) / ((oversample as f64) * fs_out);
			(Some(DirectForm2Transposed::fir(taps)?), delay)
		} else {
			(None, 0.0)
		};

		Ok(Self{ fs_out, oversample, filter, group_delay_sec, sample_counter: 0, entries: vec![] })
	}

	pub fn with_defaults(fs_out:f64) -> Result<Self, &'static str> {
		Self::new(fs_out, DEFAULT_OVERSAMPLE, DEFAULT_FILTER_ORDER, DEFAULT_CUTOFF_SCALE)
	}

	pub fn add_signal(&mut self, signal:ModulatedSignal, fdma_offset_hz:f64) {
		self.entries.push(Entry{
			signal,
			fdma_offset_hz,
			fdma_phase: 0.0,
			time_buf:   VecDeque::new(),
			sample_buf: VecDeque::new(),
			ended: false,
		});
	}

	pub fn num_signals(&self) -> usize { self.entries.len() }

	pub fn group_delay_sec(&self) -> f64 { self.group_delay_sec }

	/// True once every added signal has reported the end of its stream.
	pub fn all_ended(&self) -> bool {
		!self.entries.is_empty() && self.entries.iter().all(|e| e.ended)
	}

	pub fn request_duration(&mut self, dur:f64) -> Result<(Vec<f64>, Vec<Complex<f64>>), &'static str> {

		let fs_hi = self.fs_out * (self.oversample as f64);
		let n_hi = (dur * fs_hi).floor() as usize;
		if n_hi < 1 {
			return Err("requested duration is shorter than one output sample");
		}

		let t_hi:Vec<f64> = (0..n_hi)
			.map(|k| ((self.sample_counter + k as u64) as f64) / fs_hi)
			.collect();
		self.sample_counter += n_hi as u64;

		let t_first = t_hi[0];
		let t_last  = t_hi[n_hi - 1];
		let time_shift = if self.oversample != 1 { self.group_delay_sec } else { 0.0 };

		let mut sum = vec![Complex::new(0.0, 0.0); n_hi];

		for entry in self.entries.iter_mut() {

			// Drop everything the grid has already passed
			while let Some(&t0) = entry.time_buf.front() {
				if t0 < t_first {
					entry.time_buf.pop_front();
					entry.sample_buf.pop_front();
				} else {
					break;
				}
			}

			// Pull from the signal until the buffer spans the grid or the
			// signal runs out
			while !entry.ended && entry.time_buf.back().map_or(true, |&tb| tb < t_last) {
				let chunk = entry.signal.request_duration(dur);
				if chunk.ended {
					entry.ended = true;
				}
				if chunk.is_empty() {
					if entry.ended { break; }
					return Err("signal produced no samples for a nonzero duration");
				}
				let mut prev = entry.time_buf.back().copied();
				for (t, v) in chunk.time.iter().zip(chunk.val.iter()) {
					let t = t - time_shift;
					if let Some(p) = prev {
						if t <= p {
							return Err("signal time axis is not strictly increasing; check the pseudorange profile");
						}
					}
					prev = Some(t);
					entry.time_buf.push_back(t);
					entry.sample_buf.push_back(*v);
				}
			}

			if entry.time_buf.is_empty() {
				// Exhausted signal with nothing buffered contributes silence
				continue;
			}

			let t_ref:Vec<f64> = entry.time_buf.iter().copied().collect();
			let x_ref:Vec<Complex<f64>> = entry.sample_buf.iter().copied().collect();
			let mut x = if entry.signal.use_neighbor_interp() {
				resample::nearest_lower(&t_ref, &x_ref, &t_hi)?
			} else {
				resample::pchip(&t_ref, &x_ref, &t_hi)?
			};

			if entry.fdma_offset_hz != 0.0 {
				let two_pi = 2.0 * consts::PI;
				let mut t_rel = 0.0;
				for (k, v) in x.iter_mut().enumerate() {
					t_rel = t_hi[k] - t_first;
					let phase = entry.fdma_phase + two_pi * entry.fdma_offset_hz * t_rel;
					*v = *v * Complex::from_polar(1.0, phase);
				}
				entry.fdma_phase = (entry.fdma_phase + two_pi * entry.fdma_offset_hz * t_rel).rem_euclid(two_pi);
			}

			for (acc, v) in sum.iter_mut().zip(x.iter()) {
				*acc += *v;
			}
		}

		match self.filter.as_mut() {
			Some(filter) => {
				let filtered:Vec<Complex<f64>> = sum.into_iter().map(|s| filter.apply(s)).collect();
				let out_t:Vec<f64> = t_hi.iter().step_by(self.oversample).copied().collect();
				let out_x:Vec<Complex<f64>> = filtered.into_iter().step_by(self.oversample).collect();
				Ok((out_t, out_x))
			},
			None => Ok((t_hi, sum)),
		}
	}

}
