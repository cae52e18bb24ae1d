
use num_complex::Complex;

use crate::sources::SampleSource;

pub const DEFAULT_SEGMENT_SEC:f64 = 0.02;

/// A finite stream of complex data symbols with a fixed symbol period.  Once
/// the list runs out it keeps yielding the unit symbol, so an unmodulated
/// tail simply carries the spreading code unchanged.
pub struct DataSequence {
	pub symbols: Vec<Complex<f64>>,
	pub period_sec: f64,
	next_idx: usize,
}

impl DataSequence {

	pub fn new(symbols:Vec<Complex<f64>>, period_sec:f64) -> Result<Self, &'static str> {
		if period_sec <= 0.0 {
			return Err("symbol period must be positive");
		}
		Ok(Self{ symbols, period_sec, next_idx: 0 })
	}

	pub fn next_symbol(&mut self) -> Complex<f64> {
		match self.symbols.get(self.next_idx) {
			Some(sym) => {
				self.next_idx += 1;
				*sym
			},
			None => Complex::new(1.0, 0.0),
		}
	}

	pub fn remaining(&self) -> usize {
		self.symbols.len().saturating_sub(self.next_idx)
	}

}

/// Wraps a sample source and multiplies it segment-by-segment with a data
/// symbol stream.  The segment length is one symbol period of samples (or
/// 20 ms when no data is attached); exactly one symbol is consumed per
/// segment no matter how the caller chunks its requests.
pub struct ReferenceSignal {
	pub source: Box<dyn SampleSource>,
	pub data: Option<DataSequence>,
	segment_len: usize,
	segment: Vec<Complex<f64>>,
	segment_idx: usize,
}

impl ReferenceSignal {

	pub fn new(source:Box<dyn SampleSource>, data:Option<DataSequence>) -> Result<Self, &'static str> {
		let period = match &data {
			Some(seq) => seq.period_sec,
			None      => DEFAULT_SEGMENT_SEC,
		};
		let segment_len = (period * source.rate()).round() as usize;
		if segment_len < 1 {
			return Err("symbol period is shorter than one source sample");
		}
		// The empty segment counts as exhausted, so the first request
		// triggers generation
		Ok(Self{ source, data, segment_len, segment: vec![], segment_idx: 0 })
	}

	pub fn segment_len(&self) -> usize { self.segment_len }

	fn refill_segment(&mut self) {
		self.segment = self.source.request_samples(self.segment_len);
		if let Some(data) = &mut self.data {
			let sym = data.next_symbol();
			for s in self.segment.iter_mut() {
				*s = *s * sym;
			}
		}
		self.segment_idx = 0;
	}

}

impl SampleSource for ReferenceSignal {

	fn rate(&self) -> f64 { self.source.rate() }

	fn request_samples(&mut self, n:usize) -> Vec<Complex<f64>> {
		let mut out:Vec<Complex<f64>> = Vec::with_capacity(n);
		while out.len() < n {
			if self.segment_idx >= self.segment.len() {
				self.refill_segment();
			}
			let take = (n - out.len()).min(self.segment.len() - self.segment_idx);
			out.extend_from_slice(&self.segment[self.segment_idx .. self.segment_idx + take]);
			self.segment_idx += take;
		}
		out
	}

	fn advance(&mut self, n:usize) {
		let mut remaining = n;
		while remaining > 0 {
			if self.segment_idx >= self.segment.len() {
				self.refill_segment();
			}
			let take = remaining.min(self.segment.len() - self.segment_idx);
			self.segment_idx += take;
			remaining -= take;
		}
	}

	fn use_neighbor_interp(&self) -> bool {
		self.source.use_neighbor_interp()
	}

}

#[cfg(test)]
mod tests {

	use num_complex::Complex;

	use crate::sources::{RepeatingSource, SampleSource};

	use super::{DataSequence, ReferenceSignal};

	fn ones(fs:f64) -> RepeatingSource {
		RepeatingSource::new(vec![1.0], fs, 1).unwrap()
	}

	#[test]
	fn one_symbol_per_segment() {
		// 100 sps, 50 ms symbols: segments of 5 samples
		let data = DataSequence::new(vec![Complex::new(2.0, 0.0), Complex::new(0.0, 3.0)], 0.05).unwrap();
		let mut sig = ReferenceSignal::new(Box::new(ones(100.0)), Some(data)).unwrap();
		assert_eq!(sig.segment_len(), 5);

		let out = sig.request_samples(12);
		for s in &out[0..5]  { assert!((s - Complex::new(2.0, 0.0)).norm() < 1e-12); }
		for s in &out[5..10] { assert!((s - Complex::new(0.0, 3.0)).norm() < 1e-12); }
		// Symbols exhausted: unit symbol from here on
		for s in &out[10..12] { assert!((s - Complex::new(1.0, 0.0)).norm() < 1e-12); }
	}

	#[test]
	fn symbol_boundaries_ignore_request_chunking() {
		let symbols:Vec<Complex<f64>> = (1..=6).map(|k| Complex::new(k as f64, 0.0)).collect();
		let mk = |syms:Vec<Complex<f64>>| ReferenceSignal::new(
			Box::new(ones(100.0)),
			Some(DataSequence::new(syms, 0.03).unwrap())).unwrap();

		let mut whole = mk(symbols.clone());
		let mut split = mk(symbols.clone());

		let a = whole.request_samples(18);
		let mut b = split.request_samples(1);
		b.extend(split.request_samples(4));
		b.extend(split.request_samples(7));
		b.extend(split.request_samples(6));
		for (u, v) in a.iter().zip(b.iter()) {
			assert!((u - v).norm() < 1e-12);
		}
	}

	#[test]
	fn default_segment_is_20_ms() {
		let sig = ReferenceSignal::new(Box::new(ones(1000.0)), None).unwrap();
		assert_eq!(sig.segment_len(), 20);
	}

	#[test]
	fn undata_passthrough() {
		let chips = vec![1.0, -1.0, -1.0, 1.0];
		let mut plain = RepeatingSource::new(chips.clone(), 200.0, 1).unwrap();
		let mut sig = ReferenceSignal::new(
			Box::new(RepeatingSource::new(chips, 200.0, 1).unwrap()), None).unwrap();
		let a = plain.request_samples(10);
		let b = sig.request_samples(10);
		assert_eq!(a, b);
		assert!(sig.use_neighbor_interp());
	}

	#[test]
	fn advance_consumes_symbols() {
		let data = DataSequence::new(vec![Complex::new(5.0, 0.0), Complex::new(7.0, 0.0)], 0.05).unwrap();
		let mut sig = ReferenceSignal::new(Box::new(ones(100.0)), Some(data)).unwrap();
		// Skip the whole first segment; the next sample carries symbol 2
		sig.advance(5);
		let out = sig.request_samples(1);
		assert!((out[0] - Complex::new(7.0, 0.0)).norm() < 1e-12);
	}

	#[test]
	fn rejects_subsample_period() {
		let data = DataSequence::new(vec![], 0.0001).unwrap();
		assert!(ReferenceSignal::new(Box::new(ones(100.0)), Some(data)).is_err());
	}

}
