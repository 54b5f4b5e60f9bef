/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	io::{Error, ErrorKind},
	fmt::{self, Formatter},
	str::FromStr,
	mem,
};

use serde::{
	Deserialize,
	de::{self, Deserializer, Visitor},
};

use crate::{
	access::Address,
	cache::{line_table::Line, recency_list::RecencyList},
};

pub const ADDRESS_BITS: u32 = 64;

pub type SetIndex = u64;
pub type Tag = u64;

/// The shape of a set-associative cache: `2^s` sets of `E` lines, each
/// holding a `2^b` byte block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
	set_bits: u32,
	associativity: usize,
	block_bits: u32,
}

impl Geometry {
	pub fn new(
		set_bits: u32,
		associativity: usize,
		block_bits: u32,
	) -> Result<Self, Error> {
		if associativity < 1 {
			return Err(Error::new(
				ErrorKind::InvalidInput,
				"Associativity must be at least 1."
			));
		}

		if set_bits as u64 + block_bits as u64 > ADDRESS_BITS as u64 {
			return Err(Error::new(
				ErrorKind::InvalidInput,
				"Set index and block offset bits cannot exceed 64."
			));
		}

		if set_bits >= usize::BITS {
			return Err(Error::new(
				ErrorKind::InvalidInput,
				"Too many set index bits for this platform."
			));
		}

		let geometry = Geometry {
			set_bits,
			associativity,
			block_bits,
		};

		if !geometry.fits_in_memory() {
			return Err(Error::new(
				ErrorKind::InvalidInput,
				"Cache geometry is too large to simulate."
			));
		}

		Ok(geometry)
	}

	// Both the line table and the per-set recency lists must be
	// addressable allocations.
	fn fits_in_memory(&self) -> bool {
		let Some(lines) = self.num_sets().checked_mul(self.associativity) else {
			return false;
		};

		let line_bytes = lines.checked_mul(mem::size_of::<Line>());
		let list_bytes = self.num_sets().checked_mul(mem::size_of::<RecencyList>());

		matches!(
			(line_bytes, list_bytes),
			(Some(line_bytes), Some(list_bytes))
				if line_bytes <= isize::MAX as usize && list_bytes <= isize::MAX as usize
		)
	}

	pub fn set_bits(&self) -> u32 {
		self.set_bits
	}

	pub fn associativity(&self) -> usize {
		self.associativity
	}

	pub fn block_bits(&self) -> u32 {
		self.block_bits
	}

	pub fn tag_bits(&self) -> u32 {
		ADDRESS_BITS - self.set_bits - self.block_bits
	}

	pub fn num_sets(&self) -> usize {
		1 << self.set_bits
	}

	pub fn block_size(&self) -> u128 {
		1 << self.block_bits
	}

	/// Total bytes of data the cache could hold.
	pub fn capacity(&self) -> u128 {
		self.num_sets() as u128 * self.associativity as u128 * self.block_size()
	}

	pub fn decode(&self, address: Address) -> (SetIndex, Tag) {
		decode(address, self.set_bits, self.block_bits)
	}

	pub fn block_offset(&self, address: Address) -> u64 {
		address & low_mask(self.block_bits)
	}

	/// Inverse of `decode`, reassembling an address from its fields.
	pub fn compose(&self, tag: Tag, set_index: SetIndex, block_offset: u64) -> Address {
		shl(tag, self.set_bits + self.block_bits) |
			shl(set_index & low_mask(self.set_bits), self.block_bits) |
			(block_offset & low_mask(self.block_bits))
	}
}

/// Splits an address into its set index and tag. Requires `s + b <= 64`.
pub fn decode(address: Address, set_bits: u32, block_bits: u32) -> (SetIndex, Tag) {
	let tag = shr(address, set_bits + block_bits);
	let set_index = shr(address, block_bits) & low_mask(set_bits);

	(set_index, tag)
}

fn low_mask(bits: u32) -> u64 {
	match bits {
		0 => 0,
		bits => u64::MAX >> (ADDRESS_BITS - bits),
	}
}

// Shifting a u64 by 64 is an overflow in Rust, but here it means every bit
// was shifted out.
fn shr(value: u64, bits: u32) -> u64 {
	value.checked_shr(bits).unwrap_or(0)
}

fn shl(value: u64, bits: u32) -> u64 {
	value.checked_shl(bits).unwrap_or(0)
}

impl fmt::Display for Geometry {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{}-{}-{}", self.set_bits, self.associativity, self.block_bits)
	}
}

impl FromStr for Geometry {
	type Err = Error;

	/// Parses a geometry written as `s-E-b`, e.g. `5-1-5`.
	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let values = value
			.split('-')
			.collect::<Vec<&str>>();

		if values.len() != 3 {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid cache geometry config."
			));
		}

		let Ok(set_bits) = values[0].parse::<u32>() else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid cache geometry set bits."
			));
		};

		let Ok(associativity) = values[1].parse::<usize>() else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid cache geometry associativity."
			));
		};

		let Ok(block_bits) = values[2].parse::<u32>() else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid cache geometry block bits."
			));
		};

		Geometry::new(set_bits, associativity, block_bits)
	}
}

impl<'a> Deserialize<'a> for Geometry {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'a>,
	{
		deserializer.deserialize_str(GeometryVisitor)
	}
}

struct GeometryVisitor;

impl<'a> Visitor<'a> for GeometryVisitor {
	type Value = Geometry;

	fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
		formatter.write_str("a cache geometry config")
	}

	fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
	where
		E: de::Error,
	{
		Geometry::from_str(value)
			.map_err(|err| E::custom(err.to_string()))
	}
}
