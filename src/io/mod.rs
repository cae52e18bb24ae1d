
extern crate byteorder;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use num_complex::Complex;

use self::byteorder::{LittleEndian, WriteBytesExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
	LEi16,
	LEf32,
}

impl SampleFormat {

	pub fn from_name(name:&str) -> Result<Self, String> {
		match name.to_ascii_lowercase().as_str() {
			"i16" => Ok(SampleFormat::LEi16),
			"f32" => Ok(SampleFormat::LEf32),
			_ => Err(format!("unknown sample format {:?}; expected i16 or f32", name)),
		}
	}

}

/// Scale factor that puts a signal of the given full-scale power (dB) at the
/// top of the 16-bit range.
pub fn i16_scale_for_full_scale_db(p_fs_db:f64) -> f64 {
	((1 << 15) - 1) as f64 / 10f64.powf(p_fs_db / 20.0)
}

/// Appends complex samples to a raw capture file as interleaved I/Q pairs,
/// little-endian, either 16-bit signed (with saturation) or 32-bit float.
pub struct IqFileSink {
	w: BufWriter<File>,
	pub format: SampleFormat,
	pub scale: f64,
	samples_written: usize,
}

impl IqFileSink {

	pub fn create(path:&Path, format:SampleFormat, scale:f64) -> Result<Self, String> {
		let f = File::create(path).map_err(|e| format!("unable to create {}: {}", path.display(), e))?;
		Ok(Self{ w: BufWriter::new(f), format, scale, samples_written: 0 })
	}

	pub fn samples_written(&self) -> usize { self.samples_written }

	pub fn write_chunk(&mut self, samples:&[Complex<f64>]) -> Result<(), String> {
		for s in samples {
			let i = s.re * self.scale;
			let q = s.im * self.scale;
			match self.format {
				SampleFormat::LEi16 => {
					self.w.write_i16::<LittleEndian>(saturate_i16(i)).map_err(|e| format!("write failed: {}", e))?;
					self.w.write_i16::<LittleEndian>(saturate_i16(q)).map_err(|e| format!("write failed: {}", e))?;
				},
				SampleFormat::LEf32 => {
					self.w.write_f32::<LittleEndian>(i as f32).map_err(|e| format!("write failed: {}", e))?;
					self.w.write_f32::<LittleEndian>(q as f32).map_err(|e| format!("write failed: {}", e))?;
				},
			}
		}
		self.samples_written += samples.len();
		Ok(())
	}

	pub fn flush(&mut self) -> Result<(), String> {
		self.w.flush().map_err(|e| format!("flush failed: {}", e))
	}

}

fn saturate_i16(x:f64) -> i16 {
	if x >= i16::MAX as f64 {
		i16::MAX
	} else if x <= i16::MIN as f64 {
		i16::MIN
	} else {
		x.round() as i16
	}
}
