
pub mod file;

/// Piecewise polynomial over contiguous intervals.  `breaks` holds the `N`
/// fencepost locations; `coefs` holds one row per interval, highest power
/// first, evaluated against the offset from the interval's lower fencepost.
/// Values outside the covered range are extrapolated with the end pieces.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePolynomial {
	pub breaks: Vec<f64>,
	pub coefs:  Vec<Vec<f64>>,
}

impl PiecewisePolynomial {

	pub fn new(breaks:Vec<f64>, coefs:Vec<Vec<f64>>) -> Result<Self, &'static str> {
		if breaks.len() < 2 {
			return Err("breaks must contain at least two points");
		}
		if !breaks.windows(2).all(|w| w[0] < w[1]) {
			return Err("breaks must be strictly increasing");
		}
		if coefs.len() != breaks.len() - 1 {
			return Err("coefs must have one row per interval between breaks");
		}
		let order:usize = coefs.iter().map(|row| row.len()).max().unwrap_or(0);
		if order == 0 {
			return Err("coefs rows must be nonempty");
		}
		if coefs.iter().any(|row| row.len() != order) {
			return Err("coefs rows must all have the same length");
		}
		Ok(Self{ breaks, coefs })
	}

	pub fn order(&self) -> usize { self.coefs[0].len() }

	pub fn first_break(&self) -> f64 { self.breaks[0] }

	pub fn last_break(&self) -> f64 { self.breaks[self.breaks.len()-1] }

	// Clamped bin lookup: everything at or below the first break lands in the
	// first piece, everything above the last break in the last piece.
	fn piece_index(&self, x:f64) -> usize {
		let n = self.breaks.len();
		if x <= self.breaks[0] {
			0
		} else if x > self.breaks[n-1] {
			n - 2
		} else {
			// Binary search for the first break at or above x; the piece
			// below it covers (breaks[i], breaks[i+1]]
			let mut lo:usize = 0;
			let mut hi:usize = n;
			while lo < hi {
				let mid = (lo + hi) / 2;
				if self.breaks[mid] < x { lo = mid + 1; } else { hi = mid; }
			}
			lo - 1
		}
	}

	pub fn eval(&self, x:f64) -> f64 {
		let piece = self.piece_index(x);
		let dx = x - self.breaks[piece];
		let row = &self.coefs[piece];
		let mut acc:f64 = row[0];
		for c in &row[1..] {
			acc = acc*dx + *c;
		}
		acc
	}

	pub fn eval_many(&self, xs:&[f64]) -> Vec<f64> {
		xs.iter().map(|&x| self.eval(x)).collect()
	}

	/// Natural cubic spline through the knots `(xs[i], ys[i])`, returned in
	/// piecewise-polynomial form.  Requires `xs` strictly increasing.
	pub fn natural_spline(xs:&[f64], ys:&[f64]) -> Result<Self, &'static str> {
		let n = xs.len();
		if n < 2 || ys.len() != n {
			return Err("spline needs at least two knots with matching values");
		}
		if !xs.windows(2).all(|w| w[0] < w[1]) {
			return Err("spline knots must be strictly increasing");
		}
		if n == 2 {
			let slope = (ys[1] - ys[0]) / (xs[1] - xs[0]);
			return Self::new(xs.to_vec(), vec![vec![slope, ys[0]]]);
		}

		let h:Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();

		// Second derivatives at the knots; natural ends pin the first and
		// last to zero, the interior comes from a tridiagonal solve
		// (Thomas algorithm).
		let m = n - 2;
		let mut diag  = vec![0.0; m];
		let mut upper = vec![0.0; m];
		let mut rhs   = vec![0.0; m];
		for i in 0..m {
			diag[i]  = 2.0 * (h[i] + h[i+1]);
			upper[i] = h[i+1];
			rhs[i]   = 6.0 * ((ys[i+2] - ys[i+1]) / h[i+1] - (ys[i+1] - ys[i]) / h[i]);
		}
		for i in 1..m {
			let w = h[i] / diag[i-1];
			diag[i] -= w * upper[i-1];
			rhs[i]  -= w * rhs[i-1];
		}
		let mut ypp = vec![0.0; n];
		ypp[n-2] = rhs[m-1] / diag[m-1];
		for i in (0..m-1).rev() {
			ypp[i+1] = (rhs[i] - upper[i] * ypp[i+2]) / diag[i];
		}

		let mut coefs:Vec<Vec<f64>> = Vec::with_capacity(n-1);
		for i in 0..n-1 {
			let c3 = (ypp[i+1] - ypp[i]) / (6.0 * h[i]);
			let c2 = ypp[i] / 2.0;
			let c1 = (ys[i+1] - ys[i]) / h[i] - h[i] * (2.0*ypp[i] + ypp[i+1]) / 6.0;
			coefs.push(vec![c3, c2, c1, ys[i]]);
		}
		Self::new(xs.to_vec(), coefs)
	}

}
