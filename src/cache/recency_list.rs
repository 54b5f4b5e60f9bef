/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dlv_list::{VecList, Index};

pub type Slot = usize;

/// Recency order over the slots of one set. The front holds the most
/// recently used slot, the back the least recently used one.
///
/// Every slot owns exactly one node in the list for the lifetime of the
/// set, so the list is always a permutation of `0..capacity`.
pub struct RecencyList {
	list: VecList<Slot>,
	indices: Vec<Index<Slot>>,
}

impl RecencyList {
	pub fn new(capacity: usize) -> Self {
		assert!(capacity > 0, "A recency list must have at least one slot.");

		let mut list = VecList::with_capacity(capacity);

		// Slot 0 ends up at the back, so untouched slots are handed out in
		// ascending order ahead of any used slot.
		let indices = (0..capacity)
			.map(|slot| list.push_front(slot))
			.collect::<Vec<Index<Slot>>>();

		RecencyList {
			list,
			indices,
		}
	}

	pub fn len(&self) -> usize {
		self.indices.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indices.is_empty()
	}

	/// Moves the slot to the front of the list.
	pub fn promote(&mut self, slot: Slot) {
		let index = self.indices[slot];

		if self.list.front_index() == Some(index) {
			return;
		}

		self.list.remove(index);
		self.indices[slot] = self.list.push_front(slot);
	}

	/// Returns the least recently used slot. The slot stays in place until
	/// the caller promotes it.
	pub fn evict_candidate(&self) -> Slot {
		*self.list
			.back()
			.expect("Recency list cannot be empty.")
	}

	/// Iterates the slots from most to least recently used.
	pub fn iter(&self) -> impl Iterator<Item = Slot> + '_ {
		self.list.iter().copied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn order(list: &RecencyList) -> Vec<Slot> {
		list.iter().collect()
	}

	fn assert_permutation(list: &RecencyList) {
		let mut slots = order(list);
		slots.sort_unstable();

		assert_eq!(slots, (0..list.len()).collect::<Vec<Slot>>());
	}

	#[test]
	fn untouched_slots_are_handed_out_in_order() {
		let list = RecencyList::new(4);

		assert_eq!(order(&list), vec![3, 2, 1, 0]);
		assert_eq!(list.evict_candidate(), 0);
	}

	#[test]
	fn promote_from_back_middle_and_front() {
		let mut list = RecencyList::new(4);

		list.promote(0);
		assert_eq!(order(&list), vec![0, 3, 2, 1]);

		list.promote(2);
		assert_eq!(order(&list), vec![2, 0, 3, 1]);

		list.promote(2);
		assert_eq!(order(&list), vec![2, 0, 3, 1]);

		assert_eq!(list.evict_candidate(), 1);
	}

	#[test]
	fn single_slot_promote_is_noop() {
		let mut list = RecencyList::new(1);

		for _ in 0..3 {
			list.promote(0);
			assert_eq!(list.evict_candidate(), 0);
			assert_eq!(order(&list), vec![0]);
		}
	}

	#[test]
	fn stays_a_permutation() {
		let mut list = RecencyList::new(7);
		let mut state: u64 = 0x2545_f491;

		for _ in 0..1000 {
			state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
			let slot = (state >> 33) as usize % list.len();

			list.promote(slot);

			assert_eq!(order(&list)[0], slot);
			assert_permutation(&list);
		}
	}

	#[test]
	fn evicting_the_back_cycles_through_every_slot() {
		let mut list = RecencyList::new(3);
		let mut evicted = Vec::<Slot>::new();

		for _ in 0..6 {
			let slot = list.evict_candidate();

			evicted.push(slot);
			list.promote(slot);
		}

		assert_eq!(evicted, vec![0, 1, 2, 0, 1, 2]);
	}
}
