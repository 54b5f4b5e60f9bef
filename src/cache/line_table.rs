/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use crate::{
	geometry::Tag,
	cache::recency_list::Slot,
};

/// One cache line. Only the tag is modelled, never the block contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
	valid: bool,
	tag: Tag,
}

impl Line {
	pub fn is_valid(&self) -> bool {
		self.valid
	}

	pub fn tag(&self) -> Option<Tag> {
		match self.valid {
			true => Some(self.tag),
			false => None,
		}
	}

	fn holds(&self, tag: Tag) -> bool {
		self.valid && self.tag == tag
	}
}

/// Validity and tag of every line in every set, stored set-major.
pub struct LineTable {
	associativity: usize,
	lines: Vec<Line>,
}

impl LineTable {
	pub fn new(num_sets: usize, associativity: usize) -> Self {
		LineTable {
			associativity,
			lines: vec![Line::default(); num_sets * associativity],
		}
	}

	pub fn set(&self, set_index: usize) -> &[Line] {
		let start = set_index * self.associativity;
		&self.lines[start..start + self.associativity]
	}

	pub fn line(&self, set_index: usize, slot: Slot) -> &Line {
		&self.set(set_index)[slot]
	}

	/// Returns the slot in the set holding the tag, if any.
	pub fn find(&self, set_index: usize, tag: Tag) -> Option<Slot> {
		self.set(set_index)
			.iter()
			.position(|line| line.holds(tag))
	}

	/// Stores the tag in the slot, returning the tag it replaced if the line
	/// was already valid. Lines never become invalid again.
	pub fn fill(&mut self, set_index: usize, slot: Slot, tag: Tag) -> Option<Tag> {
		let line = &mut self.lines[set_index * self.associativity + slot];
		let previous = line.tag();

		line.valid = true;
		line.tag = tag;

		previous
	}

	pub fn valid_count(&self, set_index: usize) -> usize {
		self.set(set_index)
			.iter()
			.filter(|line| line.is_valid())
			.count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lines_start_invalid() {
		let table = LineTable::new(4, 2);

		for set_index in 0..4 {
			assert_eq!(table.valid_count(set_index), 0);
			assert_eq!(table.find(set_index, 0), None);
			assert_eq!(table.line(set_index, 1).tag(), None);
		}
	}

	#[test]
	fn fill_reports_replaced_tag() {
		let mut table = LineTable::new(2, 2);

		assert_eq!(table.fill(1, 0, 7), None);
		assert_eq!(table.find(1, 7), Some(0));
		assert_eq!(table.find(0, 7), None);

		assert_eq!(table.fill(1, 0, 9), Some(7));
		assert_eq!(table.find(1, 7), None);
		assert_eq!(table.find(1, 9), Some(0));
		assert_eq!(table.valid_count(1), 1);
	}

	#[test]
	fn invalid_line_never_matches_zero_tag() {
		let mut table = LineTable::new(1, 2);

		table.fill(0, 1, 0);

		assert_eq!(table.find(0, 0), Some(1));
		assert!(!table.line(0, 0).is_valid());
	}
}
