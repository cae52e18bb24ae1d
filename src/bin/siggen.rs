
extern crate clap;
extern crate colored;
extern crate gnss_siggen;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, App};
use colored::*;

use gnss_siggen::io::{self, IqFileSink, SampleFormat};
use gnss_siggen::scenario::{self, Scenario};

fn main() {

	let matches = App::new("GNSS IQ Scenario Synthesizer")
		.version("0.1.0")
		.about("Synthesizes a baseband I/Q capture file from a scenario of satellite signals")
		.arg(Arg::with_name("scenario")
			.short("s").long("scenario")
			.help("Scenario descriptor (JSON)")
			.required(true).takes_value(true))
		.arg(Arg::with_name("output")
			.short("o").long("output")
			.help("Output I/Q capture file")
			.required(true).takes_value(true))
		.arg(Arg::with_name("format")
			.short("f").long("format")
			.help("Sample format, i16 or f32")
			.takes_value(true))
		.arg(Arg::with_name("full_scale_db")
			.short("p").long("full_scale_db")
			.help("Signal power that maps to digital full scale, dB")
			.takes_value(true))
		.arg(Arg::with_name("chunk_sec")
			.short("c").long("chunk_sec")
			.help("Duration synthesized per pipeline request, seconds")
			.takes_value(true))
		.arg(Arg::with_name("duration_sec")
			.short("d").long("duration_sec")
			.help("Override the scenario duration, seconds")
			.takes_value(true))
		.get_matches();

	let scenario_path = PathBuf::from(matches.value_of("scenario").unwrap());
	let output_path   = PathBuf::from(matches.value_of("output").unwrap());
	let format:SampleFormat = match SampleFormat::from_name(matches.value_of("format").unwrap_or("i16")) {
		Ok(f)  => f,
		Err(e) => fail(&e),
	};
	let full_scale_db:f64 = matches.value_of("full_scale_db").unwrap_or("0.0").parse().unwrap();
	let chunk_sec:f64     = matches.value_of("chunk_sec").unwrap_or("0.1").parse().unwrap();
	let opt_duration:Option<f64> = matches.value_of("duration_sec").map(|s| s.parse().unwrap());

	let scenario:Scenario = match Scenario::load(&scenario_path) {
		Ok(s)  => s,
		Err(e) => fail(&e),
	};
	let duration = opt_duration.unwrap_or(scenario.duration_sec);

	let base_dir:&Path = scenario_path.parent().unwrap_or_else(|| Path::new("."));
	let mut composite = match scenario::build(&scenario, base_dir) {
		Ok(c)  => c,
		Err(e) => fail(&e),
	};

	let scale = match format {
		SampleFormat::LEi16 => io::i16_scale_for_full_scale_db(full_scale_db),
		SampleFormat::LEf32 => 1.0 / 10f64.powf(full_scale_db / 20.0),
	};
	let mut sink = match IqFileSink::create(&output_path, format, scale) {
		Ok(s)  => s,
		Err(e) => fail(&e),
	};

	eprintln!("Synthesizing {} [sec] of {} signals at {} [samples/sec]",
		duration, composite.num_signals(), composite.fs_out);

	let mut synthesized:f64 = 0.0;
	let mut next_report:f64 = 1.0;
	while synthesized < duration {
		let this_chunk = chunk_sec.min(duration - synthesized);
		let fs_hi = composite.fs_out * (composite.oversample as f64);
		if (this_chunk * fs_hi).floor() < 1.0 {
			// Residual smaller than one sample
			break;
		}
		let (_, samples) = match composite.request_duration(this_chunk) {
			Ok(out) => out,
			Err(e)  => fail(e),
		};
		if let Err(e) = sink.write_chunk(&samples) {
			fail(&e);
		}
		synthesized += this_chunk;

		if synthesized >= next_report {
			let status = format!("{:8.2} [sec], {} samples", synthesized, sink.samples_written());
			if composite.all_ended() {
				eprintln!("{}", status.yellow());
			} else {
				eprintln!("{}", status.green());
			}
			next_report += 1.0;
		}
	}

	if let Err(e) = sink.flush() {
		fail(&e);
	}
	println!("{{ \"samples_written\": {}, \"duration_sec\": {} }}", sink.samples_written(), synthesized);
	eprintln!("{}", "Done".green());
}

fn fail(msg:&str) -> ! {
	eprintln!("{}", msg.red());
	process::exit(1);
}
