/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	io::{Cursor, Error, ErrorKind},
	fmt::{self, Formatter},
	str::FromStr,
};

use byteorder::{LittleEndian, ReadBytesExt};

use kwik::{
	binary_reader::{SizedChunk, Chunk as ReadChunk},
	binary_writer::Chunk as WriteChunk,
};

pub type Address = u64;
pub type Size = u32;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operation {
	Instruction,
	Load,
	Store,
	Modify,
}

/// One decoded trace event.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Access {
	pub operation: Operation,
	pub address: Address,
	pub size: Size,
}

impl Access {
	pub fn new(operation: Operation, address: Address, size: Size) -> Self {
		Access {
			operation,
			address,
			size,
		}
	}

	/// Returns `true` if the access touches the data cache. Instruction
	/// fetches do not.
	pub fn is_data(&self) -> bool {
		self.operation != Operation::Instruction
	}
}

impl FromStr for Access {
	type Err = Error;

	/// Parses one trace line of the form `<op> <hex-address>,<size>`.
	fn from_str(line: &str) -> Result<Self, Self::Err> {
		let mut tokens = line.split_whitespace();

		let operation = match tokens.next() {
			Some(token) => Operation::from_str(token)?,

			None => return Err(Error::new(
				ErrorKind::InvalidData,
				"Empty trace line."
			)),
		};

		let Some((address, size)) = tokens.next().and_then(|token| token.split_once(',')) else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid access location."
			));
		};

		if tokens.next().is_some() {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Unexpected trailing data in trace line."
			));
		}

		let address = address
			.strip_prefix("0x")
			.or_else(|| address.strip_prefix("0X"))
			.unwrap_or(address);

		// `from_str_radix` and `parse` both accept a leading sign.
		let address = match is_digits(address, |byte| byte.is_ascii_hexdigit()) {
			true => Address::from_str_radix(address, 16).ok(),
			false => None,
		};

		let Some(address) = address else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid access address."
			));
		};

		let size = match is_digits(size, |byte| byte.is_ascii_digit()) {
			true => size.parse::<Size>().ok(),
			false => None,
		};

		let size = match size {
			Some(size) if size > 0 => size,

			_ => return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid access size."
			)),
		};

		Ok(Access::new(operation, address, size))
	}
}

fn is_digits(value: &str, is_digit: impl Fn(&u8) -> bool) -> bool {
	!value.is_empty() && value.as_bytes().iter().all(is_digit)
}

impl fmt::Display for Access {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "{} {:x},{}", self.operation.as_letter(), self.address, self.size)
	}
}

impl SizedChunk for Access {
	const SIZE: usize = 13;
}

impl ReadChunk for Access {
	fn new(buf: &[u8; Self::SIZE]) -> Result<Self, Error> where Self: Sized {
		let mut rdr = Cursor::new(buf);

		let operation = match rdr.read_u8() {
			Ok(byte) => Operation::from_byte(byte)?,

			Err(_) => return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid access operation."
			)),
		};

		let Ok(address) = rdr.read_u64::<LittleEndian>() else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid access address."
			));
		};

		let Ok(size) = rdr.read_u32::<LittleEndian>() else {
			return Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid access size."
			));
		};

		Ok(Access::new(operation, address, size))
	}
}

impl WriteChunk for Access {
	fn as_chunk(&self, buf: &mut Vec<u8>) -> Result<(), Error> {
		buf.extend_from_slice(&self.operation.as_byte().to_le_bytes());
		buf.extend_from_slice(&self.address.to_le_bytes());
		buf.extend_from_slice(&self.size.to_le_bytes());

		Ok(())
	}
}

impl Operation {
	fn from_byte(byte: u8) -> Result<Self, Error> {
		match byte {
			0 => Ok(Operation::Instruction),
			1 => Ok(Operation::Load),
			2 => Ok(Operation::Store),
			3 => Ok(Operation::Modify),

			_ => Err(Error::new(ErrorKind::InvalidData, "Invalid operation byte.")),
		}
	}

	fn as_byte(&self) -> u8 {
		match self {
			Operation::Instruction => 0,
			Operation::Load => 1,
			Operation::Store => 2,
			Operation::Modify => 3,
		}
	}

	pub fn as_letter(&self) -> char {
		match self {
			Operation::Instruction => 'I',
			Operation::Load => 'L',
			Operation::Store => 'S',
			Operation::Modify => 'M',
		}
	}
}

impl FromStr for Operation {
	type Err = Error;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value {
			"I" => Ok(Operation::Instruction),
			"L" => Ok(Operation::Load),
			"S" => Ok(Operation::Store),
			"M" => Ok(Operation::Modify),

			_ => Err(Error::new(
				ErrorKind::InvalidData,
				"Invalid trace operation.",
			)),
		}
	}
}
