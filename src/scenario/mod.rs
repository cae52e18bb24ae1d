
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use num_complex::Complex;
use serde::{Serialize, Deserialize};

use crate::gnss::{codes, SignalId};
use crate::pp::{self, PiecewisePolynomial};
use crate::sources::{RepeatingSource, SampleSource};
use crate::sources::filtered::FilteredSource;
use crate::sources::noise::NoiseSource;
use crate::synth::composite::{Composite, DEFAULT_CUTOFF_SCALE, DEFAULT_FILTER_ORDER, DEFAULT_OVERSAMPLE};
use crate::synth::modulated::ModulatedSignal;
use crate::synth::reference::{DataSequence, ReferenceSignal};
use crate::utils;

fn default_oversample() -> usize { DEFAULT_OVERSAMPLE }
fn default_filter_order() -> usize { DEFAULT_FILTER_ORDER }
fn default_cutoff_scale() -> f64 { DEFAULT_CUTOFF_SCALE }

/// Scenario descriptor: the output stream parameters plus one record per
/// satellite signal.  Profile entries reference piecewise-polynomial files
/// resolved relative to the scenario file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
	pub output_rate_sps: f64,
	pub duration_sec: f64,
	#[serde(default = "default_oversample")]
	pub oversample: usize,
	#[serde(default = "default_filter_order")]
	pub filter_order: usize,
	#[serde(default = "default_cutoff_scale")]
	pub cutoff_scale: f64,
	#[serde(default)]
	pub code_table_dir: Option<String>,
	pub signals: Vec<SignalEntry>,
	#[serde(default)]
	pub noise: Option<NoiseEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEntry {
	pub system: String,
	pub name: String,
	pub signal_params: SignalParams,
	#[serde(default)]
	pub carrier_phase: f64,
	#[serde(default)]
	pub pseudorange_file: Option<String>,
	#[serde(default)]
	pub doppler_file: Option<String>,
	#[serde(default)]
	pub power_file: Option<String>,
	#[serde(default)]
	pub data_real_file: Option<String>,
	#[serde(default)]
	pub data_imag_file: Option<String>,
	#[serde(default)]
	pub fdma_offset_hz: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalParams {
	pub prn: usize,
	#[serde(default)]
	pub data_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoiseEntry {
	pub power: f64,
	#[serde(default)]
	pub seed: u64,
	#[serde(default)]
	pub filter_b: Option<Vec<f64>>,
	#[serde(default)]
	pub filter_a: Option<Vec<f64>>,
}

impl Scenario {

	pub fn from_json(json:&str) -> Result<Self, String> {
		serde_json::from_str(json).map_err(|e| format!("scenario parse error: {}", e))
	}

	pub fn load(path:&Path) -> Result<Self, String> {
		let f = File::open(path).map_err(|e| format!("unable to open {}: {}", path.display(), e))?;
		serde_json::from_reader(BufReader::new(f)).map_err(|e| format!("{}: {}", path.display(), e))
	}

}

fn load_profile(base_dir:&Path, file:&Option<String>) -> Result<Option<Arc<PiecewisePolynomial>>, String> {
	match file {
		Some(name) => pp::file::load(&base_dir.join(name)).map(|p| Some(Arc::new(p))),
		None => Ok(None),
	}
}

// Data symbols ride in a pair of piecewise polynomials (real and imaginary
// parts vs true time); one symbol is sampled at the middle of each symbol
// period across the real profile's domain
fn load_data_symbols(base_dir:&Path, entry:&SignalEntry) -> Result<Option<DataSequence>, String> {

	if entry.data_real_file.is_none() && entry.data_imag_file.is_none() {
		return Ok(None);
	}
	let data_rate = entry.signal_params.data_rate
		.ok_or_else(|| "data files are present but signal_params.data_rate is missing".to_string())?;
	if data_rate <= 0.0 {
		return Err("signal_params.data_rate must be positive".to_string());
	}

	let re_pp = load_profile(base_dir, &entry.data_real_file)?;
	let im_pp = load_profile(base_dir, &entry.data_imag_file)?;
	let domain = re_pp.as_ref().or(im_pp.as_ref())
		.map(|p| (p.first_break(), p.last_break()))
		.unwrap_or((0.0, 0.0));

	let period = 1.0 / data_rate;
	let count = ((domain.1 - domain.0) / period).floor() as usize;
	let mut symbols:Vec<Complex<f64>> = Vec::with_capacity(count);
	for k in 0..count {
		let t = domain.0 + ((k as f64) + 0.5) * period;
		let re = re_pp.as_ref().map_or(0.0, |p| p.eval(t));
		let im = im_pp.as_ref().map_or(0.0, |p| p.eval(t));
		symbols.push(Complex::new(re, im));
	}

	DataSequence::new(symbols, period).map(Some).map_err(|e| e.to_string())
}

fn build_signal(entry:&SignalEntry, base_dir:&Path, code_table_dir:Option<&Path>) -> Result<ModulatedSignal, String> {

	let id = SignalId::from_names(&entry.system, &entry.name)?;
	let chips = codes::spreading_code(id, entry.signal_params.prn, code_table_dir)?;
	let source = RepeatingSource::new(chips, id.code_rate_sps(), 1).map_err(|e| e.to_string())?;

	let data = load_data_symbols(base_dir, entry)?;
	let reference = ReferenceSignal::new(Box::new(source), data).map_err(|e| e.to_string())?;

	let power   = load_profile(base_dir, &entry.power_file)?;
	let doppler = load_profile(base_dir, &entry.doppler_file)?;
	let warp = match load_profile(base_dir, &entry.pseudorange_file)? {
		Some(range) => Some(Arc::new(utils::pseudorange_to_signal_time(&range).map_err(|e| e.to_string())?)),
		None => None,
	};

	Ok(ModulatedSignal::new(reference, power, doppler, entry.carrier_phase, warp))
}

/// Assembles the full synthesis stack for a scenario.  Every error is
/// prefixed with the signal it belongs to.
pub fn build(scenario:&Scenario, base_dir:&Path) -> Result<Composite, String> {

	let mut composite = Composite::new(
		scenario.output_rate_sps,
		scenario.oversample,
		scenario.filter_order,
		scenario.cutoff_scale).map_err(|e| e.to_string())?;

	let code_table_dir = scenario.code_table_dir.as_ref().map(|d| base_dir.join(d));

	for entry in &scenario.signals {
		let signal = build_signal(entry, base_dir, code_table_dir.as_deref())
			.map_err(|e| format!("signal {} {} prn {}: {}", entry.system, entry.name, entry.signal_params.prn, e))?;
		composite.add_signal(signal, entry.fdma_offset_hz);
	}

	if let Some(noise) = &scenario.noise {
		let fs_hi = scenario.output_rate_sps * (scenario.oversample as f64);
		let white = NoiseSource::new(noise.power, fs_hi, noise.seed).map_err(|e| format!("noise: {}", e))?;
		let source:Box<dyn SampleSource> = match (&noise.filter_b, &noise.filter_a) {
			(None, None) => Box::new(white),
			(b, a) => {
				let b = b.clone().unwrap_or_else(|| vec![1.0]);
				let a = a.clone().unwrap_or_else(|| vec![1.0]);
				Box::new(FilteredSource::new(Box::new(white), b, a).map_err(|e| format!("noise: {}", e))?)
			},
		};
		let reference = ReferenceSignal::new(source, None).map_err(|e| format!("noise: {}", e))?;
		composite.add_signal(ModulatedSignal::unmodulated(reference), 0.0);
	}

	Ok(composite)
}
