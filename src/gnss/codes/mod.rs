
use std::fs;
use std::path::Path;

use super::SignalId;

// G2 phase-select taps per PRN (IS-GPS-200, PRN 1 through 32)
const L1_CA_PHASE_TAPS:[(usize, usize); 32] = [
	(2,6), (3,7), (4,8), (5,9), (1,9), (2,10), (1,8), (2,9),
	(3,10), (2,3), (3,4), (5,6), (6,7), (7,8), (8,9), (9,10),
	(1,4), (2,5), (3,6), (4,7), (5,8), (6,9), (1,3), (4,6),
	(5,7), (6,8), (7,9), (8,10), (1,6), (2,7), (3,8), (4,9),
	];

// Neuman-Hofman overlay bit patterns
const NH10_BITS:[u8; 10] = [0, 0, 0, 0, 1, 1, 0, 1, 0, 1];
const NH20_BITS:[u8; 20] = [0, 0, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 0, 1, 0, 0, 1, 1, 1, 0];

struct ShiftRegister10 {
	state: [bool; 10],
}

impl ShiftRegister10 {

	fn all_ones() -> Self {
		Self{ state: [true; 10] }
	}

	// Stages are numbered 1 through 10, output is taken from stage 10
	fn output(&self) -> bool { self.state[9] }

	fn stage(&self, n:usize) -> bool { self.state[n-1] }

	fn shift(&mut self, feedback_taps:&[usize]) {
		let fb = feedback_taps.iter().fold(false, |acc, &t| acc ^ self.state[t-1]);
		for i in (1..10).rev() {
			self.state[i] = self.state[i-1];
		}
		self.state[0] = fb;
	}

}

/// GPS L1 C/A Gold code for PRN 1 through 32, as +/-1 chips (bit 0 maps to
/// +1.0).  G1 feeds back stages 3 and 10, G2 stages 2, 3, 6, 8, 9, and 10;
/// the PRN picks the pair of G2 stages whose sum delays the sequence.
pub fn l1_ca_code(prn:usize) -> Result<Vec<f64>, &'static str> {

	if prn < 1 || prn > 32 {
		return Err("L1 C/A PRN must be between 1 and 32");
	}
	let (t1, t2) = L1_CA_PHASE_TAPS[prn - 1];

	let mut g1 = ShiftRegister10::all_ones();
	let mut g2 = ShiftRegister10::all_ones();

	let mut chips:Vec<f64> = Vec::with_capacity(1023);
	for _ in 0..1023 {
		let bit = g1.output() ^ g2.stage(t1) ^ g2.stage(t2);
		chips.push(if bit { -1.0 } else { 1.0 });
		g1.shift(&[3, 10]);
		g2.shift(&[2, 3, 6, 8, 9, 10]);
	}
	Ok(chips)
}

/// GLONASS L1 C/A ranging code: one 511-chip m-sequence shared by all
/// satellites (FDMA separates them).  Nine-stage register, feedback from
/// stages 5 and 9, output from stage 7.
pub fn glonass_ca_code() -> Vec<f64> {

	let mut state = [true; 9];
	let mut chips:Vec<f64> = Vec::with_capacity(511);

	for _ in 0..511 {
		let bit = state[6];
		chips.push(if bit { -1.0 } else { 1.0 });
		let fb = state[4] ^ state[8];
		for i in (1..9).rev() {
			state[i] = state[i-1];
		}
		state[0] = fb;
	}
	chips
}

pub fn nh10() -> Vec<f64> {
	NH10_BITS.iter().map(|&b| if b == 1 { -1.0 } else { 1.0 }).collect()
}

pub fn nh20() -> Vec<f64> {
	NH20_BITS.iter().map(|&b| if b == 1 { -1.0 } else { 1.0 }).collect()
}

/// Expands a primary code by a secondary (overlay) code: each overlay chip
/// signs one full period of the primary.
pub fn apply_overlay(code:&[f64], overlay:&[f64]) -> Vec<f64> {
	let mut out:Vec<f64> = Vec::with_capacity(code.len() * overlay.len());
	for &ov in overlay {
		out.extend(code.iter().map(|&c| c * ov));
	}
	out
}

/// Binary-offset-carrier expansion: each chip becomes `k = 2m/n` alternating
/// samples `c, -c, ...`, i.e. the chip multiplied by one cycle of the square
/// subcarrier.  Requires `2m/n` to be a whole number.
pub fn boc_upsample(chips:&[f64], m:u32, n:u32) -> Result<Vec<f64>, &'static str> {

	if n == 0 || (2 * m) % n != 0 {
		return Err("BOC expansion requires 2m/n to be a whole number");
	}
	let k = ((2 * m) / n) as usize;
	if k < 1 {
		return Err("BOC expansion factor must be at least 1");
	}

	let mut out:Vec<f64> = Vec::with_capacity(chips.len() * k);
	for &c in chips {
		for j in 0..k {
			out.push(if j % 2 == 0 { c } else { -c });
		}
	}
	Ok(out)
}

/// Reads an opaque code table: raw signed bytes, one +/-1 value per chip.
pub fn load_code_table(path:&Path, expected_len:usize) -> Result<Vec<f64>, String> {

	let bytes = fs::read(path).map_err(|e| format!("unable to read code table {}: {}", path.display(), e))?;
	if bytes.len() != expected_len {
		return Err(format!("code table {} holds {} chips, expected {}", path.display(), bytes.len(), expected_len));
	}
	let mut chips:Vec<f64> = Vec::with_capacity(bytes.len());
	for (i, &b) in bytes.iter().enumerate() {
		match b as i8 {
			1  => chips.push(1.0),
			-1 => chips.push(-1.0),
			v  => return Err(format!("code table {} has value {} at chip {}; chips must be +/-1", path.display(), v, i)),
		}
	}
	Ok(chips)
}

fn table_stem(id:SignalId) -> &'static str {
	match id {
		SignalId::GpsL1CData  => "gps_l1c_data",
		SignalId::GpsL1CPilot => "gps_l1c_pilot",
		SignalId::GpsL5I      => "gps_l5_i",
		SignalId::GpsL5Q      => "gps_l5_q",
		SignalId::GalE1B      => "gal_e1b",
		SignalId::GalE1C      => "gal_e1c",
		SignalId::GpsL1Ca | SignalId::GloL1Ca => "",
	}
}

/// Produces the full repeating sample array for a signal: the primary code
/// from the generator or the code-table directory, the BOC(1,1) subcarrier
/// where the signal uses one, and the secondary code where the signal
/// carries one (NH10/NH20 on L5, the 25-chip pilot secondary on E1C).
pub fn spreading_code(id:SignalId, prn:usize, table_dir:Option<&Path>) -> Result<Vec<f64>, String> {

	match id {
		SignalId::GpsL1Ca => l1_ca_code(prn).map_err(|e| e.to_string()),
		SignalId::GloL1Ca => Ok(glonass_ca_code()),
		_ => {
			let dir = table_dir.ok_or_else(|| format!(
				"signal {:?} uses a memory code; a code table directory is required", id))?;
			let path = dir.join(format!("{}_prn{:02}.i8", table_stem(id), prn));
			let primary = load_code_table(&path, id.code_len_chips())?;

			let expanded = if id.uses_boc() {
				boc_upsample(&primary, 1, 1).map_err(|e| e.to_string())?
			} else {
				primary
			};

			match id {
				SignalId::GpsL5I => Ok(apply_overlay(&expanded, &nh10())),
				SignalId::GpsL5Q => Ok(apply_overlay(&expanded, &nh20())),
				SignalId::GalE1C => {
					let sec_path = dir.join(format!("gal_e1c_secondary_prn{:02}.i8", prn));
					let secondary = load_code_table(&sec_path, 25)?;
					Ok(apply_overlay(&expanded, &secondary))
				},
				_ => Ok(expanded),
			}
		},
	}
}

#[cfg(test)]
mod tests {

	use super::*;

	fn first_bits(chips:&[f64], n:usize) -> Vec<u8> {
		chips[..n].iter().map(|&c| if c < 0.0 { 1 } else { 0 }).collect()
	}

	#[test]
	fn l1_ca_prn1_preamble() {
		// First ten chips of PRN 1 are octal 1440
		let code = l1_ca_code(1).unwrap();
		assert_eq!(code.len(), 1023);
		assert_eq!(first_bits(&code, 10), vec![1, 1, 0, 0, 1, 0, 0, 0, 0, 0]);
	}

	#[test]
	fn l1_ca_prn2_preamble() {
		// First ten chips of PRN 2 are octal 1620
		let code = l1_ca_code(2).unwrap();
		assert_eq!(first_bits(&code, 10), vec![1, 1, 1, 0, 0, 1, 0, 0, 0, 0]);
	}

	#[test]
	fn l1_ca_codes_are_balanced() {
		for prn in 1..=32 {
			let code = l1_ca_code(prn).unwrap();
			let sum:f64 = code.iter().sum();
			assert_eq!(sum, -1.0, "PRN {}", prn);
			assert!(code.iter().all(|&c| c == 1.0 || c == -1.0));
		}
	}

	#[test]
	fn l1_ca_codes_differ_by_prn() {
		let a = l1_ca_code(1).unwrap();
		let b = l1_ca_code(7).unwrap();
		assert_ne!(a, b);
	}

	#[test]
	fn l1_ca_rejects_bad_prn() {
		assert!(l1_ca_code(0).is_err());
		assert!(l1_ca_code(33).is_err());
	}

	#[test]
	fn glonass_code_structure() {
		let code = glonass_ca_code();
		assert_eq!(code.len(), 511);
		let sum:f64 = code.iter().sum();
		assert_eq!(sum, -1.0);
	}

	#[test]
	fn neuman_hofman_patterns() {
		assert_eq!(nh10().len(), 10);
		assert_eq!(nh20().len(), 20);
		// NH10 is 0000110101
		assert_eq!(nh10(), vec![1.0, 1.0, 1.0, 1.0, -1.0, -1.0, 1.0, -1.0, 1.0, -1.0]);
	}

	#[test]
	fn boc_expansion() {
		assert_eq!(boc_upsample(&[1.0, -1.0], 1, 1).unwrap(), vec![1.0, -1.0, -1.0, 1.0]);
		// BOC(2,1) puts four subcarrier samples on each chip
		assert_eq!(boc_upsample(&[1.0], 2, 1).unwrap(), vec![1.0, -1.0, 1.0, -1.0]);
		// 2m/n must divide evenly
		assert!(boc_upsample(&[1.0], 1, 4).is_err());
		assert!(boc_upsample(&[1.0], 0, 1).is_err());
	}

	#[test]
	fn overlay_signs_whole_periods() {
		let out = apply_overlay(&[1.0, -1.0], &[1.0, -1.0, 1.0]);
		assert_eq!(out, vec![1.0, -1.0, -1.0, 1.0, 1.0, -1.0]);
	}

	#[test]
	fn code_table_round_trip() {
		let dir = std::env::temp_dir();
		let path = dir.join("siggen_test_code_table.i8");
		std::fs::write(&path, &[1u8, 0xFF, 0xFF, 1]).unwrap();
		let chips = load_code_table(&path, 4).unwrap();
		assert_eq!(chips, vec![1.0, -1.0, -1.0, 1.0]);
		assert!(load_code_table(&path, 5).is_err());
		std::fs::write(&path, &[1u8, 3, 1, 1]).unwrap();
		assert!(load_code_table(&path, 4).is_err());
		let _ = std::fs::remove_file(&path);
	}

	#[test]
	fn spreading_code_dispatch() {
		assert_eq!(spreading_code(crate::gnss::SignalId::GpsL1Ca, 5, None).unwrap().len(), 1023);
		assert_eq!(spreading_code(crate::gnss::SignalId::GloL1Ca, 1, None).unwrap().len(), 511);
		// Memory codes need a table directory
		assert!(spreading_code(crate::gnss::SignalId::GalE1B, 1, None).is_err());
	}

}
