/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::io::Error;
use rayon::prelude::*;

use kwik::csv_writer::{
	FileWriter,
	CsvWriter,
	CsvRow,
	Row,
};

use crate::{
	access::Access,
	geometry::Geometry,
	performance::CachePerformance,
	simulator::Simulator,
};

/// The result of running one trace through one cache geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
	pub geometry: Geometry,
	pub performance: CachePerformance,
}

/// Runs the trace through every geometry in parallel. Each run owns its
/// own cache, and results keep the order of `geometries`.
pub fn evaluate(geometries: &[Geometry], accesses: &[Access]) -> Vec<Evaluation> {
	geometries
		.par_iter()
		.map(|geometry| {
			let performance = Simulator::new(*geometry).run(accesses);

			Evaluation {
				geometry: *geometry,
				performance,
			}
		})
		.collect()
}

/// Writes one CSV row per evaluation.
pub fn to_file(evaluations: &[Evaluation], path: &str) -> Result<(), Error> {
	let mut writer = CsvWriter::<Evaluation>::new(path)?;

	for evaluation in evaluations {
		writer.write_row(evaluation);
	}

	Ok(())
}

impl Row for Evaluation {
	fn as_row(&self, row: &mut CsvRow) -> Result<(), Error> {
		row.push(&self.geometry.set_bits().to_string());
		row.push(&self.geometry.associativity().to_string());
		row.push(&self.geometry.block_bits().to_string());
		row.push(&self.performance.hits.to_string());
		row.push(&self.performance.misses.to_string());
		row.push(&self.performance.evictions.to_string());
		row.push(&self.performance.miss_ratio().to_string());

		Ok(())
	}
}
