/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fs;
use anyhow::{Context, Result};
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
	Simulator,
	TraceReader,
};

#[derive(Parser)]
#[command(author, version, about = "Replays a memory trace through an LRU set-associative cache", long_about = None)]
struct Args {
	/// Number of set index bits (there are 2^s sets)
	#[arg(short = 's')]
	set_bits: u32,

	/// Associativity (number of lines per set)
	#[arg(short = 'E')]
	associativity: usize,

	/// Number of block bits (blocks are 2^b bytes)
	#[arg(short = 'b')]
	block_bits: u32,

	/// Trace to replay
	#[arg(short = 't')]
	trace: String,

	/// Print the outcome of every access
	#[arg(short, long)]
	verbose: bool,

	/// Read a binary trace produced by `convert`
	#[arg(long)]
	binary: bool,

	/// Show a progress bar while replaying
	#[arg(long)]
	progress: bool,
}

fn main() -> Result<()> {
	csim::init_logging();

	let args = Args::parse();

	let geometry = Geometry::new(args.set_bits, args.associativity, args.block_bits)
		.context("Invalid cache configuration.")?;

	debug!("replaying {} with geometry {geometry}", args.trace);

	let mut simulator = Simulator::new(geometry);

	match args.binary {
		true => replay_binary(&args, &mut simulator)?,
		false => replay_text(&args, &mut simulator)?,
	}

	println!("{}", simulator.performance());

	Ok(())
}

fn replay_text(args: &Args, simulator: &mut Simulator) -> Result<()> {
	let mut reader = TraceReader::open(&args.trace)
		.with_context(|| format!("Could not open trace {}.", args.trace))?;

	let mut progress = match args.progress {
		true => {
			let metadata = fs::metadata(&args.trace)
				.with_context(|| format!("Could not read metadata of trace {}.", args.trace))?;

			Some(new_progress(metadata.len()))
		},
		false => None,
	};

	let mut bytes_read: u64 = 0;

	while let Some(access) = reader.next() {
		let access = access.context("Could not read trace.")?;

		handle(simulator, &access, args.verbose);

		if let Some(progress) = progress.as_mut() {
			progress.tick((reader.bytes_read() - bytes_read) as usize);
			bytes_read = reader.bytes_read();
		}
	}

	if reader.skipped() > 0 {
		warn!("skipped {} malformed trace lines", reader.skipped());
	}

	Ok(())
}

fn replay_binary(args: &Args, simulator: &mut Simulator) -> Result<()> {
	let mut reader = BinaryReader::<Access>::new(&args.trace)
		.with_context(|| format!("Could not open binary trace {}.", args.trace))?;

	let mut progress = match args.progress {
		true => Some(new_progress(reader.size())),
		false => None,
	};

	while let Some(access) = reader.read_chunk() {
		handle(simulator, &access, args.verbose);

		if let Some(progress) = progress.as_mut() {
			progress.tick(Access::SIZE);
		}
	}

	Ok(())
}

fn handle(simulator: &mut Simulator, access: &Access, verbose: bool) {
	let step = simulator.handle(access);

	if let (true, Some(step)) = (verbose, step) {
		println!("{access} {step}");
	}
}

fn new_progress(size: u64) -> Progress {
	Progress::new(size, &[
		Tag::Tps,
		Tag::Eta,
		Tag::Time,
	])
}
