/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	borrow::Borrow,
	fmt::{self, Formatter},
};

use log::debug;

use crate::{
	access::{Access, Address, Operation},
	geometry::Geometry,
	cache::{Cache, Outcome},
	performance::CachePerformance,
};

/// The cache outcomes produced by one data access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
	Load(Outcome),
	Store(Outcome),

	/// A modify is a load followed by a store to the same address.
	Modify {
		load: Outcome,
		store: Outcome,
	},
}

impl Step {
	pub fn outcomes(&self) -> Vec<Outcome> {
		match self {
			Step::Load(outcome) | Step::Store(outcome) => vec![*outcome],
			Step::Modify { load, store } => vec![*load, *store],
		}
	}
}

impl fmt::Display for Step {
	/// Formats the outcomes as `miss`, `miss eviction` or `hit`, in order.
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		let words = self.outcomes()
			.iter()
			.map(|outcome| match outcome {
				Outcome::Hit => "hit",
				Outcome::ColdMiss => "miss",
				Outcome::Miss { .. } => "miss eviction",
			})
			.collect::<Vec<&str>>();

		f.write_str(&words.join(" "))
	}
}

/// Replays accesses against a cache, keeping the running counts.
pub struct Simulator {
	cache: Cache,
	performance: CachePerformance,
}

impl Simulator {
	pub fn new(geometry: Geometry) -> Self {
		debug!(
			"simulating {} sets x {} lines x {} byte blocks ({} tag bits)",
			geometry.num_sets(),
			geometry.associativity(),
			geometry.block_size(),
			geometry.tag_bits(),
		);

		Simulator {
			cache: Cache::new(geometry),
			performance: CachePerformance::default(),
		}
	}

	pub fn cache(&self) -> &Cache {
		&self.cache
	}

	pub fn performance(&self) -> CachePerformance {
		self.performance
	}

	/// Handles one trace access. Instruction fetches leave the cache and the
	/// counters untouched and return `None`.
	pub fn handle(&mut self, access: &Access) -> Option<Step> {
		let step = match access.operation {
			Operation::Instruction => return None,

			Operation::Load => Step::Load(self.lookup(access.address)),
			Operation::Store => Step::Store(self.lookup(access.address)),
			Operation::Modify => self.modify(access.address),
		};

		Some(step)
	}

	/// Handles every access in order and returns the final counts.
	pub fn run<I>(&mut self, trace: I) -> CachePerformance
	where
		I: IntoIterator,
		I::Item: Borrow<Access>,
	{
		for access in trace {
			self.handle(access.borrow());
		}

		self.performance
	}

	fn modify(&mut self, address: Address) -> Step {
		let load = self.lookup(address);
		let store = self.lookup(address);

		debug_assert!(store.is_hit(), "The store half of a modify must hit.");

		Step::Modify {
			load,
			store,
		}
	}

	fn lookup(&mut self, address: Address) -> Outcome {
		let outcome = self.cache.access(address);
		self.performance.record(outcome);

		outcome
	}
}

/// Runs a whole trace through a fresh cache.
pub fn simulate<I>(geometry: Geometry, trace: I) -> CachePerformance
where
	I: IntoIterator,
	I::Item: Borrow<Access>,
{
	Simulator::new(geometry).run(trace)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn access(operation: Operation, address: Address) -> Access {
		Access::new(operation, address, 1)
	}

	fn geometry(set_bits: u32, associativity: usize, block_bits: u32) -> Geometry {
		Geometry::new(set_bits, associativity, block_bits).unwrap()
	}

	#[test]
	fn two_sets_direct_mapped() {
		let trace = [
			access(Operation::Load, 0),
			access(Operation::Load, 2),
			access(Operation::Load, 4),
			access(Operation::Load, 0),
		];

		let mut simulator = Simulator::new(geometry(1, 1, 1));

		let steps = trace
			.iter()
			.filter_map(|access| simulator.handle(access))
			.collect::<Vec<Step>>();

		assert_eq!(steps, vec![
			Step::Load(Outcome::ColdMiss),
			Step::Load(Outcome::ColdMiss),
			Step::Load(Outcome::Miss { evicted: 0 }),
			Step::Load(Outcome::Miss { evicted: 1 }),
		]);

		assert_eq!(simulator.performance(), CachePerformance {
			hits: 0,
			misses: 4,
			evictions: 2,
		});
	}

	#[test]
	fn modify_is_load_then_store() {
		let mut simulator = Simulator::new(geometry(0, 1, 4));

		let step = simulator.handle(&access(Operation::Modify, 0x40));
		assert_eq!(step, Some(Step::Modify { load: Outcome::ColdMiss, store: Outcome::Hit }));

		let step = simulator.handle(&access(Operation::Modify, 0x80));
		assert_eq!(step, Some(Step::Modify { load: Outcome::Miss { evicted: 4 }, store: Outcome::Hit }));

		let step = simulator.handle(&access(Operation::Modify, 0x80));
		assert_eq!(step, Some(Step::Modify { load: Outcome::Hit, store: Outcome::Hit }));

		assert_eq!(simulator.performance(), CachePerformance {
			hits: 4,
			misses: 2,
			evictions: 1,
		});
	}

	#[test]
	fn store_misses_like_load() {
		let mut simulator = Simulator::new(geometry(0, 1, 0));

		assert_eq!(simulator.handle(&access(Operation::Store, 1)), Some(Step::Store(Outcome::ColdMiss)));
		assert_eq!(simulator.handle(&access(Operation::Store, 2)), Some(Step::Store(Outcome::Miss { evicted: 1 })));
		assert_eq!(simulator.handle(&access(Operation::Load, 2)), Some(Step::Load(Outcome::Hit)));
	}

	#[test]
	fn instruction_fetch_is_ignored() {
		let mut simulator = Simulator::new(geometry(0, 1, 0));

		simulator.handle(&access(Operation::Load, 1));

		assert_eq!(simulator.handle(&access(Operation::Instruction, 2)), None);
		assert!(simulator.cache().contains(1));
		assert!(!simulator.cache().contains(2));
		assert_eq!(simulator.performance().count(), 1);
	}

	#[test]
	fn counts_are_conserved() {
		let operations = [
			Operation::Load,
			Operation::Store,
			Operation::Modify,
			Operation::Instruction,
		];

		let mut state: u64 = 17;
		let mut trace = Vec::<Access>::new();

		for index in 0..500 {
			state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);

			let operation = operations[index % operations.len()];
			trace.push(access(operation, (state >> 40) & 0x3ff));
		}

		let expected = trace
			.iter()
			.map(|access| match access.operation {
				Operation::Instruction => 0,
				Operation::Modify => 2,
				_ => 1,
			})
			.sum::<u64>();

		let performance = simulate(geometry(2, 2, 3), &trace);

		assert_eq!(performance.count(), expected);
		assert!(performance.evictions <= performance.misses);
	}

	#[test]
	fn steps_display_like_verbose_output() {
		let step = Step::Modify {
			load: Outcome::Miss { evicted: 0 },
			store: Outcome::Hit,
		};

		assert_eq!(step.to_string(), "miss eviction hit");
		assert_eq!(Step::Load(Outcome::ColdMiss).to_string(), "miss");
	}
}
