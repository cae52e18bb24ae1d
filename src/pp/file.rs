
extern crate byteorder;

use std::fs::File;
use std::io::{Read, Write, BufReader, BufWriter};
use std::path::Path;

use self::byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::PiecewisePolynomial;

pub const MAGIC_WORD:u32 = 0x7053_7750;
const HEADER_RESERVED_BYTES:usize = 12;

/// Reads a piecewise polynomial from the binary profile format.  The layout
/// is: magic word, 12 reserved bytes, break count `N` (i32), `N` f64 breaks,
/// an `N-1` entry per-piece offset table (ignored), then one record per
/// piece holding a coefficient count followed by that many f64 coefficients
/// in descending-power order.  Pieces of differing order are padded to the
/// longest with leading zeros.
pub fn read_from<R: Read>(r:&mut R) -> Result<PiecewisePolynomial, String> {

	let magic = r.read_u32::<LittleEndian>().map_err(|e| format!("unable to read magic word: {}", e))?;
	if magic != MAGIC_WORD {
		return Err(format!("bad magic word: expected {:#010x}, got {:#010x}", MAGIC_WORD, magic));
	}

	let mut reserved = [0u8; HEADER_RESERVED_BYTES];
	r.read_exact(&mut reserved).map_err(|e| format!("unable to read header: {}", e))?;

	let num_breaks = r.read_i32::<LittleEndian>().map_err(|e| format!("unable to read break count: {}", e))?;
	if num_breaks < 2 {
		return Err(format!("break count must be at least 2, got {}", num_breaks));
	}
	let num_breaks = num_breaks as usize;

	let mut breaks:Vec<f64> = Vec::with_capacity(num_breaks);
	for _ in 0..num_breaks {
		breaks.push(r.read_f64::<LittleEndian>().map_err(|e| format!("unable to read breaks: {}", e))?);
	}

	// Per-piece offset table; pieces are parsed sequentially so the offsets
	// carry no information for us
	for _ in 0..num_breaks-1 {
		r.read_i32::<LittleEndian>().map_err(|e| format!("unable to read offset table: {}", e))?;
	}

	let mut rows:Vec<Vec<f64>> = Vec::with_capacity(num_breaks-1);
	for piece in 0..num_breaks-1 {
		let count = r.read_i32::<LittleEndian>().map_err(|e| format!("unable to read coefficient count of piece {}: {}", piece, e))?;
		if count < 1 {
			return Err(format!("piece {} has coefficient count {}", piece, count));
		}
		let mut row:Vec<f64> = Vec::with_capacity(count as usize);
		for _ in 0..count {
			row.push(r.read_f64::<LittleEndian>().map_err(|e| format!("unable to read coefficients of piece {}: {}", piece, e))?);
		}
		rows.push(row);
	}

	// Shorter rows get zero padding on the high-power side
	let order = rows.iter().map(|row| row.len()).max().unwrap_or(0);
	for row in rows.iter_mut() {
		while row.len() < order {
			row.insert(0, 0.0);
		}
	}

	PiecewisePolynomial::new(breaks, rows).map_err(|e| e.to_string())
}

pub fn write_to<W: Write>(w:&mut W, pp:&PiecewisePolynomial) -> Result<(), String> {

	w.write_u32::<LittleEndian>(MAGIC_WORD).map_err(|e| format!("unable to write magic word: {}", e))?;
	w.write_all(&[0u8; HEADER_RESERVED_BYTES]).map_err(|e| format!("unable to write header: {}", e))?;

	w.write_i32::<LittleEndian>(pp.breaks.len() as i32).map_err(|e| format!("unable to write break count: {}", e))?;
	for b in &pp.breaks {
		w.write_f64::<LittleEndian>(*b).map_err(|e| format!("unable to write breaks: {}", e))?;
	}

	// Offset of each piece record relative to the start of the piece section
	let mut offset:i32 = 0;
	for row in &pp.coefs {
		w.write_i32::<LittleEndian>(offset).map_err(|e| format!("unable to write offset table: {}", e))?;
		offset += 4 + 8 * (row.len() as i32);
	}

	for row in &pp.coefs {
		w.write_i32::<LittleEndian>(row.len() as i32).map_err(|e| format!("unable to write coefficient count: {}", e))?;
		for c in row {
			w.write_f64::<LittleEndian>(*c).map_err(|e| format!("unable to write coefficients: {}", e))?;
		}
	}

	Ok(())
}

pub fn load(path:&Path) -> Result<PiecewisePolynomial, String> {
	let f = File::open(path).map_err(|e| format!("unable to open {}: {}", path.display(), e))?;
	read_from(&mut BufReader::new(f)).map_err(|e| format!("{}: {}", path.display(), e))
}

pub fn save(path:&Path, pp:&PiecewisePolynomial) -> Result<(), String> {
	let f = File::create(path).map_err(|e| format!("unable to create {}: {}", path.display(), e))?;
	let mut w = BufWriter::new(f);
	write_to(&mut w, pp)?;
	w.flush().map_err(|e| format!("unable to flush {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {

	use std::io::Cursor;

	use super::{read_from, write_to, MAGIC_WORD};
	use super::super::PiecewisePolynomial;

	#[test]
	fn round_trip_is_bit_exact() {
		let pp = PiecewisePolynomial::new(
			vec![0.0, 0.25, 1.0 + 1e-15, 7.5],
			vec![
				vec![1.0, -2.0, 3.0],
				vec![0.5, 0.0, -1e-300],
				vec![std::f64::consts::PI, 1e300, 4.0],
			]).unwrap();

		let mut buf:Vec<u8> = vec![];
		write_to(&mut buf, &pp).unwrap();
		let back = read_from(&mut Cursor::new(&buf)).unwrap();

		assert_eq!(pp.breaks.len(), back.breaks.len());
		for (a, b) in pp.breaks.iter().zip(back.breaks.iter()) {
			assert_eq!(a.to_bits(), b.to_bits());
		}
		for (ra, rb) in pp.coefs.iter().zip(back.coefs.iter()) {
			assert_eq!(ra.len(), rb.len());
			for (a, b) in ra.iter().zip(rb.iter()) {
				assert_eq!(a.to_bits(), b.to_bits());
			}
		}
	}

	#[test]
	fn rejects_bad_magic() {
		let mut buf:Vec<u8> = vec![];
		write_to(&mut buf, &PiecewisePolynomial::new(vec![0.0, 1.0], vec![vec![1.0]]).unwrap()).unwrap();
		buf[0] ^= 0xFF;
		assert!(read_from(&mut Cursor::new(&buf)).is_err());
	}

	#[test]
	fn rejects_truncated_record() {
		let mut buf:Vec<u8> = vec![];
		write_to(&mut buf, &PiecewisePolynomial::new(vec![0.0, 1.0], vec![vec![1.0, 2.0]]).unwrap()).unwrap();
		buf.truncate(buf.len() - 4);
		assert!(read_from(&mut Cursor::new(&buf)).is_err());
	}

	#[test]
	fn pads_mixed_order_pieces() {
		// Hand-built stream with a linear piece followed by a cubic piece
		use super::byteorder::{LittleEndian, WriteBytesExt};
		let mut buf:Vec<u8> = vec![];
		buf.write_u32::<LittleEndian>(MAGIC_WORD).unwrap();
		buf.extend_from_slice(&[0u8; 12]);
		buf.write_i32::<LittleEndian>(3).unwrap();
		for b in &[0.0f64, 1.0, 2.0] { buf.write_f64::<LittleEndian>(*b).unwrap(); }
		buf.write_i32::<LittleEndian>(0).unwrap();
		buf.write_i32::<LittleEndian>(20).unwrap();
		buf.write_i32::<LittleEndian>(2).unwrap();
		for c in &[5.0f64, 1.0] { buf.write_f64::<LittleEndian>(*c).unwrap(); }
		buf.write_i32::<LittleEndian>(4).unwrap();
		for c in &[1.0f64, 0.0, 0.0, 2.0] { buf.write_f64::<LittleEndian>(*c).unwrap(); }

		let pp = read_from(&mut Cursor::new(&buf)).unwrap();
		assert_eq!(pp.order(), 4);
		assert_eq!(pp.coefs[0], vec![0.0, 0.0, 5.0, 1.0]);
		assert_eq!(pp.coefs[1], vec![1.0, 0.0, 0.0, 2.0]);
	}

}
