/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fs;
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use kwik::{
	fmt,
	binary_writer::{FileWriter, BinaryWriter},
	progress::{Progress, Tag},
};

use csim::{Access, TraceReader};

/// Converts a text trace into the compact binary trace format.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
	#[arg(short, long)]
	path: String,

	#[arg(short, long)]
	output: String,

	/// Drop instruction fetches, which never reach the data cache
	#[arg(short, long)]
	data_only: bool,
}

fn main() -> Result<()> {
	csim::init_logging();

	let args = Args::parse();

	let mut reader = TraceReader::open(&args.path)
		.with_context(|| format!("Could not open trace {}.", args.path))?;

	let mut writer = BinaryWriter::<Access>::new(&args.output)
		.with_context(|| format!("Could not create {}.", args.output))?;

	println!("{}", args.path);

	let size = fs::metadata(&args.path)
		.with_context(|| format!("Could not read metadata of trace {}.", args.path))?
		.len();

	let mut progress = Progress::new(size, &[
		Tag::Tps,
		Tag::Eta,
		Tag::Time,
	]);

	let mut bytes_read: u64 = 0;
	let mut count: u64 = 0;

	while let Some(access) = reader.next() {
		let access = access.context("Could not read trace.")?;

		if access.is_data() || !args.data_only {
			writer.write_chunk(&access);
			count += 1;
		}

		progress.tick((reader.bytes_read() - bytes_read) as usize);
		bytes_read = reader.bytes_read();
	}

	if reader.skipped() > 0 {
		warn!("skipped {} malformed trace lines", reader.skipped());
	}

	info!("wrote {} accesses to {}", count, args.output);
	println!("Accesses: {}", fmt::number(count));

	Ok(())
}
