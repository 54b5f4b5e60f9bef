/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt::{self, Formatter};
use crate::cache::Outcome;

/// Aggregate hit, miss and eviction counts of one simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePerformance {
	pub hits: u64,
	pub misses: u64,
	pub evictions: u64,
}

impl CachePerformance {
	pub fn new() -> Self {
		CachePerformance::default()
	}

	pub fn record(&mut self, outcome: Outcome) {
		match outcome.is_hit() {
			true => self.hits += 1,
			false => self.misses += 1,
		}

		if outcome.is_eviction() {
			self.evictions += 1;
		}
	}

	/// Number of cache lookups, which is every hit and every miss.
	pub fn count(&self) -> u64 {
		self.hits + self.misses
	}

	pub fn miss_ratio(&self) -> f64 {
		if self.count() > 0 {
			return self.misses as f64 / self.count() as f64;
		}

		0.0
	}
}

impl fmt::Display for CachePerformance {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(
			f,
			"hits:{} misses:{} evictions:{}",
			self.hits,
			self.misses,
			self.evictions,
		)
	}
}
