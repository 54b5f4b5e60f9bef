/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

pub mod line_table;
pub mod recency_list;

use log::trace;

use crate::{
	access::Address,
	geometry::{Geometry, SetIndex, Tag},
	cache::{
		line_table::LineTable,
		recency_list::RecencyList,
	},
};

/// The result of presenting one address to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Hit,

	/// A miss filled a line that had never been used.
	ColdMiss,

	/// A miss that replaced the least recently used line of a full set.
	Miss { evicted: Tag },
}

impl Outcome {
	pub fn is_hit(&self) -> bool {
		matches!(self, Outcome::Hit)
	}

	pub fn is_eviction(&self) -> bool {
		matches!(self, Outcome::Miss { .. })
	}
}

/// A set-associative cache with per-set LRU replacement.
pub struct Cache {
	geometry: Geometry,

	lines: LineTable,
	recency: Vec<RecencyList>,
}

impl Cache {
	pub fn new(geometry: Geometry) -> Self {
		let num_sets = geometry.num_sets();
		let associativity = geometry.associativity();

		let recency = (0..num_sets)
			.map(|_| RecencyList::new(associativity))
			.collect::<Vec<RecencyList>>();

		Cache {
			geometry,

			lines: LineTable::new(num_sets, associativity),
			recency,
		}
	}

	pub fn access(&mut self, address: Address) -> Outcome {
		let (set_index, tag) = self.geometry.decode(address);
		self.access_set(set_index, tag)
	}

	/// Looks up the tag in the set, filling or replacing a line on a miss.
	/// Whatever line ends up holding the tag becomes the most recently used.
	pub fn access_set(&mut self, set_index: SetIndex, tag: Tag) -> Outcome {
		assert!(
			set_index < self.geometry.num_sets() as SetIndex,
			"Set index {set_index} is out of range for {} sets.",
			self.geometry.num_sets(),
		);

		let set_index = set_index as usize;
		let recency = &mut self.recency[set_index];

		if let Some(slot) = self.lines.find(set_index, tag) {
			recency.promote(slot);
			trace!("set {set_index}: hit on tag {tag:#x} in slot {slot}");

			return Outcome::Hit;
		}

		// Unused lines always sit behind every used line, so the back of
		// the list is an unused line whenever the set is not yet full.
		let slot = recency.evict_candidate();

		let outcome = match self.lines.fill(set_index, slot, tag) {
			Some(evicted) => Outcome::Miss { evicted },
			None => Outcome::ColdMiss,
		};

		recency.promote(slot);
		trace!("set {set_index}: {outcome:?} for tag {tag:#x} in slot {slot}");

		outcome
	}

	/// Returns `true` if the block holding the address is resident. Does not
	/// update recency.
	pub fn contains(&self, address: Address) -> bool {
		let (set_index, tag) = self.geometry.decode(address);
		self.lines.find(set_index as usize, tag).is_some()
	}

	/// Returns the tags resident in the set from most to least recently used.
	pub fn resident_tags(&self, set_index: SetIndex) -> Vec<Tag> {
		let set_index = set_index as usize;

		self.recency[set_index]
			.iter()
			.filter_map(|slot| self.lines.line(set_index, slot).tag())
			.collect()
	}

	pub fn valid_lines(&self, set_index: SetIndex) -> usize {
		self.lines.valid_count(set_index as usize)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cache(set_bits: u32, associativity: usize, block_bits: u32) -> Cache {
		Cache::new(Geometry::new(set_bits, associativity, block_bits).unwrap())
	}

	#[test]
	fn repeated_hit_changes_nothing() {
		let mut cache = cache(0, 4, 4);

		for address in [0x00, 0x10, 0x20] {
			cache.access(address);
		}

		assert_eq!(cache.access(0x10), Outcome::Hit);
		let tags = cache.resident_tags(0);

		assert_eq!(cache.access(0x10), Outcome::Hit);
		assert_eq!(cache.resident_tags(0), tags);
		assert_eq!(cache.valid_lines(0), 3);
	}

	#[test]
	fn cold_start_saturation() {
		let mut cache = cache(2, 3, 4);

		// Set 1 of 4, distinct tags.
		let addresses = [0x010, 0x050, 0x090, 0x0d0];

		for address in &addresses[..3] {
			assert_eq!(cache.access(*address), Outcome::ColdMiss);
		}

		assert_eq!(cache.valid_lines(1), 3);
		let outcome = cache.access(addresses[3]);

		assert_eq!(outcome, Outcome::Miss { evicted: 0 });
		assert!(outcome.is_eviction() && !outcome.is_hit());
		assert!(!cache.contains(addresses[0]));
		assert_eq!(cache.valid_lines(1), 3);
	}

	#[test]
	fn lru_evicts_least_recently_used() {
		let mut cache = cache(0, 2, 0);
		let (a, b, c) = (1, 2, 3);

		assert_eq!(cache.access(a), Outcome::ColdMiss);
		assert_eq!(cache.access(b), Outcome::ColdMiss);
		assert_eq!(cache.access(a), Outcome::Hit);
		assert_eq!(cache.access(c), Outcome::Miss { evicted: b });

		assert!(cache.contains(a));
		assert!(!cache.contains(b));
		assert_eq!(cache.resident_tags(0), vec![c, a]);
	}

	#[test]
	fn sets_are_independent() {
		let mut cache = cache(1, 1, 1);

		assert_eq!(cache.access(0), Outcome::ColdMiss);
		assert_eq!(cache.access(2), Outcome::ColdMiss);
		assert_eq!(cache.access(4), Outcome::Miss { evicted: 0 });
		assert_eq!(cache.access(0), Outcome::Miss { evicted: 1 });
		assert_eq!(cache.access(2), Outcome::Hit);
	}

	#[test]
	fn addresses_in_one_block_share_a_line() {
		let mut cache = cache(1, 1, 4);

		assert_eq!(cache.access(0x20), Outcome::ColdMiss);
		assert_eq!(cache.access(0x2f), Outcome::Hit);
		assert_eq!(cache.access(0x30), Outcome::ColdMiss);
	}

	#[test]
	fn cold_misses_precede_any_eviction() {
		let mut cache = cache(0, 4, 0);

		cache.access(10);
		cache.access(11);
		cache.access(10);
		cache.access(10);
		cache.access(11);

		assert_eq!(cache.access(12), Outcome::ColdMiss);
		assert_eq!(cache.access(13), Outcome::ColdMiss);
		assert_eq!(cache.access(14), Outcome::Miss { evicted: 10 });
	}

	#[test]
	#[should_panic]
	fn out_of_range_set_is_fatal() {
		let mut cache = cache(1, 1, 1);
		cache.access_set(2, 0);
	}
}
