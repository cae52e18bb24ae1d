
use num_complex::Complex;

use crate::filters::{DirectForm2Transposed, SampleFilter};

use super::SampleSource;

/// Runs an upstream source through a rational filter, e.g. to shape a white
/// noise floor.  The filter state rides along with the source cursor, so
/// `advance` still has to push samples through the filter.
pub struct FilteredSource {
	pub source: Box<dyn SampleSource>,
	filter: DirectForm2Transposed,
}

impl FilteredSource {

	pub fn new(source:Box<dyn SampleSource>, b:Vec<f64>, a:Vec<f64>) -> Result<Self, &'static str> {
		let filter = DirectForm2Transposed::new(b, a)?;
		Ok(Self{ source, filter })
	}

	pub fn fir(source:Box<dyn SampleSource>, b:Vec<f64>) -> Result<Self, &'static str> {
		Self::new(source, b, vec![1.0])
	}

}

impl SampleSource for FilteredSource {

	fn rate(&self) -> f64 { self.source.rate() }

	fn request_samples(&mut self, n:usize) -> Vec<Complex<f64>> {
		self.source.request_samples(n).into_iter()
			.map(|x| self.filter.apply(x))
			.collect()
	}

	fn advance(&mut self, n:usize) {
		for x in self.source.request_samples(n) {
			self.filter.apply(x);
		}
	}

}
