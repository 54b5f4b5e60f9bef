/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use csim::{
	Geometry,
	simulate,
	transpose::{self, Workspace, TRANSPOSES},
};

/// Evaluates the matrix transpose functions on a simulated cache.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Columns of the source matrix
	#[arg(short = 'M')]
	m: usize,

	/// Rows of the source matrix
	#[arg(short = 'N')]
	n: usize,

	/// Cache geometry, written `s-E-b`
	#[arg(short, long, default_value = "5-1-5")]
	geometry: Geometry,

	/// Print the set index of every element of an `N x M` matrix
	#[arg(long)]
	show_sets: bool,
}

fn main() -> Result<()> {
	csim::init_logging();

	let args = Args::parse();

	if args.show_sets {
		print_set_map(&args.geometry, args.n, args.m);
	}

	for (index, (description, function)) in TRANSPOSES.iter().enumerate() {
		let mut workspace = Workspace::new(args.m, args.n)
			.context("Invalid matrix dimensions.")?;

		function(&mut workspace);

		let correct = workspace.is_transpose();
		let trace = workspace.into_trace();

		debug!("transpose {index} produced {} accesses", trace.len());

		let performance = simulate(args.geometry, &trace);

		println!("Function {index} ({description}): correctness={}", correct as u8);
		println!("Function {index}: {performance}");
	}

	Ok(())
}

fn print_set_map(geometry: &Geometry, rows: usize, cols: usize) {
	for (row, sets) in transpose::set_map(geometry, rows, cols).iter().enumerate() {
		let line = sets
			.chunks(8)
			.map(|chunk| {
				chunk
					.iter()
					.map(|set| format!("{set:2}"))
					.collect::<Vec<String>>()
					.join(" ")
			})
			.collect::<Vec<String>>()
			.join("   ");

		println!("{line}");

		if (row + 1) % 8 == 0 {
			println!();
		}
	}
}
