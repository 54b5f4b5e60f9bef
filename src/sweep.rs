/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, warn};

use kwik::{
	FileReader,
	binary_reader::{BinaryReader, SizedChunk},
	progress::{Progress, Tag},
};

use csim::{
	Access,
	Geometry,
	TraceReader,
	evaluation::{self, Evaluation},
};

/// Replays one trace against many cache geometries in parallel.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
	#[arg(short, long)]
	path: String,

	/// Geometries to evaluate, written `s-E-b` (repeatable)
	#[arg(short, long = "geometry", required = true)]
	geometries: Vec<Geometry>,

	/// CSV file to write the results to
	#[arg(short, long)]
	output: Option<String>,

	#[arg(long)]
	binary: bool,
}

fn main() -> Result<()> {
	csim::init_logging();

	let args = Args::parse();

	println!("{}", args.path);

	let accesses = match args.binary {
		true => load_binary(&args.path)?,
		false => load_text(&args.path)?,
	};

	if accesses.is_empty() {
		bail!("Trace {} contains no accesses.", args.path);
	}

	debug!("evaluating {} geometries over {} accesses", args.geometries.len(), accesses.len());

	let evaluations = evaluation::evaluate(&args.geometries, &accesses);

	for evaluation in &evaluations {
		print_evaluation(evaluation);
	}

	if let Some(output) = &args.output {
		evaluation::to_file(&evaluations, output)
			.with_context(|| format!("Could not save results to {output}."))?;
	}

	Ok(())
}

fn load_text(path: &str) -> Result<Vec<Access>> {
	let mut reader = TraceReader::open(path)
		.with_context(|| format!("Could not open trace {path}."))?;

	let accesses = reader
		.by_ref()
		.collect::<Result<Vec<Access>, _>>()
		.context("Could not read trace.")?;

	if reader.skipped() > 0 {
		warn!("skipped {} malformed trace lines", reader.skipped());
	}

	Ok(accesses)
}

fn load_binary(path: &str) -> Result<Vec<Access>> {
	let mut reader = BinaryReader::<Access>::new(path)
		.with_context(|| format!("Could not open binary trace {path}."))?;

	let mut progress = Progress::new(reader.size(), &[
		Tag::Tps,
		Tag::Eta,
		Tag::Time,
	]);

	let mut accesses = Vec::<Access>::new();

	while let Some(access) = reader.read_chunk() {
		accesses.push(access);
		progress.tick(Access::SIZE);
	}

	Ok(accesses)
}

fn print_evaluation(evaluation: &Evaluation) {
	println!(
		"{:>10}  {}  miss ratio: {:.4}",
		evaluation.geometry.to_string(),
		evaluation.performance,
		evaluation.performance.miss_ratio(),
	);
}
