
use num_complex::Complex;

/// Zero-order resampling onto a new axis: each output takes the reference
/// value at the largest reference position not beyond it, or zero when the
/// output position precedes every reference point.  Both axes are walked in
/// a single forward pass, so the targets must be nondecreasing.
pub fn nearest_lower<T: Copy + Default>(x:&[f64], y:&[T], xi:&[f64]) -> Result<Vec<T>, &'static str> {

	if x.len() != y.len() {
		return Err("reference axis and values must have equal length");
	}
	if !xi.windows(2).all(|w| w[0] <= w[1]) {
		return Err("resample targets must be nondecreasing");
	}

	let mut out:Vec<T> = Vec::with_capacity(xi.len());
	let mut ref_idx:usize = 0;

	for &target in xi {
		while ref_idx < x.len() && x[ref_idx] <= target {
			ref_idx += 1;
		}
		if ref_idx == 0 {
			out.push(T::default());
		} else {
			out.push(y[ref_idx - 1]);
		}
	}

	Ok(out)
}

/// Shape-preserving piecewise cubic (Fritsch-Carlson slopes) for smooth
/// sources.  Complex values are interpolated componentwise.  Targets beyond
/// the reference range are extrapolated with the end pieces.
pub fn pchip(x:&[f64], y:&[Complex<f64>], xi:&[f64]) -> Result<Vec<Complex<f64>>, &'static str> {

	if x.len() != y.len() {
		return Err("reference axis and values must have equal length");
	}
	if x.is_empty() {
		return Err("reference axis is empty");
	}
	if x.len() == 1 {
		return Ok(vec![y[0]; xi.len()]);
	}
	if !x.windows(2).all(|w| w[0] < w[1]) {
		return Err("reference axis must be strictly increasing");
	}

	let re:Vec<f64> = y.iter().map(|c| c.re).collect();
	let im:Vec<f64> = y.iter().map(|c| c.im).collect();
	let ri = pchip_real(x, &re, xi);
	let ii = pchip_real(x, &im, xi);

	Ok(ri.into_iter().zip(ii.into_iter()).map(|(r, i)| Complex::new(r, i)).collect())
}

fn pchip_real(x:&[f64], y:&[f64], xi:&[f64]) -> Vec<f64> {

	let n = x.len();
	let h:Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
	let delta:Vec<f64> = (0..n-1).map(|i| (y[i+1] - y[i]) / h[i]).collect();
	let d = pchip_slopes(&h, &delta);

	let mut out:Vec<f64> = Vec::with_capacity(xi.len());
	for &target in xi {
		// Piece lookup; ends extrapolate
		let mut lo:usize = 0;
		let mut hi:usize = n;
		while lo < hi {
			let mid = (lo + hi) / 2;
			if x[mid] < target { lo = mid + 1; } else { hi = mid; }
		}
		let piece = if lo == 0 { 0 } else { (lo - 1).min(n - 2) };

		let t = target - x[piece];
		let hp = h[piece];
		let c2 = (3.0*delta[piece] - 2.0*d[piece] - d[piece+1]) / hp;
		let c3 = (d[piece] + d[piece+1] - 2.0*delta[piece]) / (hp*hp);
		out.push(y[piece] + t*(d[piece] + t*(c2 + t*c3)));
	}
	out
}

// Fritsch-Carlson monotone slope selection: zero at local extrema, weighted
// harmonic mean of the neighboring secants elsewhere, one-sided three-point
// estimates at the ends.
fn pchip_slopes(h:&[f64], delta:&[f64]) -> Vec<f64> {

	let n = h.len() + 1;
	let mut d = vec![0.0; n];

	if n == 2 {
		d[0] = delta[0];
		d[1] = delta[0];
		return d;
	}

	for i in 1..n-1 {
		if delta[i-1] == 0.0 || delta[i] == 0.0 || (delta[i-1] > 0.0) != (delta[i] > 0.0) {
			d[i] = 0.0;
		} else {
			let w1 = 2.0*h[i] + h[i-1];
			let w2 = h[i] + 2.0*h[i-1];
			d[i] = (w1 + w2) / (w1/delta[i-1] + w2/delta[i]);
		}
	}

	d[0]   = end_slope(h[0], h[1], delta[0], delta[1]);
	d[n-1] = end_slope(h[n-2], h[n-3], delta[n-2], delta[n-3]);

	d
}

fn end_slope(h0:f64, h1:f64, delta0:f64, delta1:f64) -> f64 {
	let d = ((2.0*h0 + h1)*delta0 - h0*delta1) / (h0 + h1);
	if d.signum() != delta0.signum() && delta0 != 0.0 && d != 0.0 {
		0.0
	} else if delta0 == 0.0 {
		0.0
	} else if (delta0 > 0.0) != (delta1 > 0.0) && d.abs() > 3.0*delta0.abs() {
		3.0*delta0
	} else {
		d
	}
}

#[cfg(test)]
mod tests {

	use num_complex::Complex;

	use super::{nearest_lower, pchip};

	#[test]
	fn nearest_lower_holds_previous_value() {
		let x  = [0.0, 3.0, 7.0, 16.0, 24.0];
		let y  = [50.0, 51.0, 52.0, 53.0, 54.0];
		let xi = [0.0, 5.0, 10.0, 15.0, 20.0, 25.0];
		let yi = nearest_lower(&x, &y, &xi).unwrap();
		assert_eq!(yi, vec![50.0, 51.0, 52.0, 52.0, 53.0, 54.0]);
	}

	#[test]
	fn nearest_lower_boundaries() {
		let x = [1.0, 2.0];
		let y = [10.0, 20.0];
		// Before the first reference point the output is zero, at or past the
		// last it holds the last value
		assert_eq!(nearest_lower(&x, &y, &[0.0, 0.99]).unwrap(), vec![0.0, 0.0]);
		assert_eq!(nearest_lower(&x, &y, &[2.0, 5.0]).unwrap(), vec![20.0, 20.0]);
	}

	#[test]
	fn nearest_lower_empty_reference_is_all_zero() {
		let yi = nearest_lower::<f64>(&[], &[], &[0.0, 1.0]).unwrap();
		assert_eq!(yi, vec![0.0, 0.0]);
	}

	#[test]
	fn nearest_lower_rejects_decreasing_targets() {
		assert!(nearest_lower(&[0.0, 1.0], &[1.0, 2.0], &[1.0, 0.5]).is_err());
		assert!(nearest_lower(&[0.0], &[1.0, 2.0], &[0.0]).is_err());
	}

	#[test]
	fn nearest_lower_complex_values() {
		let x = [0.0, 1.0];
		let y = [Complex::new(1.0, -1.0), Complex::new(2.0, 3.0)];
		let yi = nearest_lower(&x, &y, &[-0.5, 0.5, 1.5]).unwrap();
		assert_eq!(yi[0], Complex::new(0.0, 0.0));
		assert_eq!(yi[1], Complex::new(1.0, -1.0));
		assert_eq!(yi[2], Complex::new(2.0, 3.0));
	}

	#[test]
	fn pchip_reproduces_linear_data() {
		let x:Vec<f64> = (0..10).map(|i| i as f64).collect();
		let y:Vec<Complex<f64>> = x.iter().map(|&t| Complex::new(2.0*t + 1.0, -t)).collect();
		let xi:Vec<f64> = (0..89).map(|i| 0.1 * (i as f64)).collect();
		let yi = pchip(&x, &y, &xi).unwrap();
		for (t, v) in xi.iter().zip(yi.iter()) {
			assert!((v.re - (2.0*t + 1.0)).abs() < 1e-9);
			assert!((v.im + t).abs() < 1e-9);
		}
	}

	#[test]
	fn pchip_does_not_overshoot_monotone_data() {
		let x = [0.0, 1.0, 2.0, 3.0, 4.0];
		let y:Vec<Complex<f64>> = [0.0, 0.0, 1.0, 1.0, 1.0].iter().map(|&v| Complex::new(v, 0.0)).collect();
		let xi:Vec<f64> = (0..41).map(|i| 0.1 * (i as f64)).collect();
		let yi = pchip(&x, &y, &xi).unwrap();
		for v in yi.iter() {
			assert!(v.re >= -1e-12 && v.re <= 1.0 + 1e-12, "overshoot: {}", v.re);
		}
	}

	#[test]
	fn pchip_single_point_is_constant() {
		let yi = pchip(&[5.0], &[Complex::new(2.0, 1.0)], &[0.0, 10.0]).unwrap();
		assert_eq!(yi, vec![Complex::new(2.0, 1.0); 2]);
	}

}
