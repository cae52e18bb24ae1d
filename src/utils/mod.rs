
use itertools::Itertools;

use crate::C_METERS_PER_SEC;
use crate::pp::PiecewisePolynomial;

// Densification step for sampling a pseudorange profile before inversion
pub const INVERSION_STEP_SEC:f64 = 0.1;

/// Inverts a pseudorange profile (meters vs true time) into the mapping from
/// signal time to true time.  The profile is sampled at its breakpoints,
/// with long intervals filled in at `INVERSION_STEP_SEC`, each sample is
/// shifted by its propagation delay (`ts = t - p(t)/c`), and a natural cubic
/// spline is fitted through the `(ts, t)` pairs.
///
/// A profile whose delay grows as fast as true time itself leaves signal
/// time stalled and has no inverse; that case is rejected.
pub fn pseudorange_to_signal_time(p:&PiecewisePolynomial) -> Result<PiecewisePolynomial, &'static str> {

	let mut grid:Vec<f64> = vec![];
	for w in p.breaks.windows(2) {
		grid.push(w[0]);
		let gap = w[1] - w[0];
		if gap > INVERSION_STEP_SEC {
			let steps = (gap / INVERSION_STEP_SEC).ceil() as usize;
			for j in 1..steps {
				let t = w[0] + (j as f64) * INVERSION_STEP_SEC;
				if t < w[1] {
					grid.push(t);
				}
			}
		}
	}
	grid.push(p.last_break());
	let grid:Vec<f64> = grid.into_iter().dedup().collect();

	let signal_times:Vec<f64> = grid.iter()
		.map(|&t| t - p.eval(t) / C_METERS_PER_SEC)
		.collect();

	if !signal_times.windows(2).all(|w| w[0] < w[1]) {
		return Err("pseudorange profile is not invertible: signal time does not advance monotonically");
	}

	PiecewisePolynomial::natural_spline(&signal_times, &grid)
}

#[cfg(test)]
mod tests {

	use crate::C_METERS_PER_SEC;
	use crate::pp::PiecewisePolynomial;

	use super::{pseudorange_to_signal_time, INVERSION_STEP_SEC};

	#[test]
	fn constant_range_shifts_time() {
		// A fixed 300 km range delays the signal by ~1 ms everywhere
		let range_m = 3.0e5;
		let delay = range_m / C_METERS_PER_SEC;
		let p = PiecewisePolynomial::new(vec![0.0, 10.0], vec![vec![0.0, range_m]]).unwrap();
		let inv = pseudorange_to_signal_time(&p).unwrap();

		for k in 0..50 {
			let t = 0.2 * (k as f64);
			let ts = t - delay;
			assert!((inv.eval(ts) - t).abs() < 1e-9, "t={}: {}", t, inv.eval(ts));
		}
	}

	#[test]
	fn linear_range_rate_recovers_true_time() {
		// Range ramps at 1500 km/s: signal time runs slightly slow
		let rate = 1.5e6;
		let p = PiecewisePolynomial::new(vec![0.0, 10.0], vec![vec![rate, 0.0]]).unwrap();
		let inv = pseudorange_to_signal_time(&p).unwrap();

		for k in 0..90 {
			let t = 0.1 * (k as f64);
			let ts = t - rate * t / C_METERS_PER_SEC;
			assert!((inv.eval(ts) - t).abs() < 1e-6, "t={}: {}", t, inv.eval(ts));
		}
	}

	#[test]
	fn grid_densifies_long_intervals() {
		let p = PiecewisePolynomial::new(vec![0.0, 1.0], vec![vec![0.0, 0.0]]).unwrap();
		let inv = pseudorange_to_signal_time(&p).unwrap();
		// Zero range: identity mapping, sampled every INVERSION_STEP_SEC
		let expected = (1.0 / INVERSION_STEP_SEC).round() as usize + 1;
		assert_eq!(inv.breaks.len(), expected);
		assert!((inv.eval(0.55) - 0.55).abs() < 1e-9);
	}

	#[test]
	fn rejects_light_speed_pseudorange() {
		// Range growing at c: signal time never advances, no inverse exists
		let p = PiecewisePolynomial::new(vec![0.0, 10.0], vec![vec![C_METERS_PER_SEC, 0.0]]).unwrap();
		assert!(pseudorange_to_signal_time(&p).is_err());
	}

}
