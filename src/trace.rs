/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::{
	fs::File,
	io::{BufRead, BufReader, Error},
	path::Path,
	str,
};

use log::warn;
use crate::access::Access;

/// Reads accesses from a text trace, one `<op> <hex-address>,<size>` per
/// line.
///
/// Malformed lines are logged and skipped; the run carries on with the next
/// line. Only I/O failures end the iteration with an error.
pub struct TraceReader<R> {
	reader: R,
	buf: Vec<u8>,

	line_number: u64,
	bytes_read: u64,
	skipped: u64,
}

impl TraceReader<BufReader<File>> {
	pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
		let file = File::open(path)?;
		Ok(TraceReader::new(BufReader::new(file)))
	}
}

impl<R: BufRead> TraceReader<R> {
	pub fn new(reader: R) -> Self {
		TraceReader {
			reader,
			buf: Vec::new(),

			line_number: 0,
			bytes_read: 0,
			skipped: 0,
		}
	}

	/// Number of malformed lines skipped so far.
	pub fn skipped(&self) -> u64 {
		self.skipped
	}

	pub fn bytes_read(&self) -> u64 {
		self.bytes_read
	}

	fn parse_line(&mut self) -> Option<Access> {
		let line = match str::from_utf8(&self.buf) {
			Ok(line) => line.trim(),

			Err(_) => {
				self.skip("line is not valid UTF-8");
				return None;
			},
		};

		if line.is_empty() {
			return None;
		}

		match line.parse::<Access>() {
			Ok(access) => Some(access),

			Err(err) => {
				let reason = format!("{err} ({line:?})");
				self.skip(&reason);

				None
			},
		}
	}

	fn skip(&mut self, reason: &str) {
		self.skipped += 1;
		warn!("skipping trace line {}: {reason}", self.line_number);
	}
}

impl<R: BufRead> Iterator for TraceReader<R> {
	type Item = Result<Access, Error>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			self.buf.clear();

			let read = match self.reader.read_until(b'\n', &mut self.buf) {
				Ok(0) => return None,
				Ok(read) => read,
				Err(err) => return Some(Err(err)),
			};

			self.line_number += 1;
			self.bytes_read += read as u64;

			if let Some(access) = self.parse_line() {
				return Some(Ok(access));
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;
	use crate::access::Operation;
	use super::*;

	fn read(text: &str) -> (Vec<Access>, u64) {
		let mut reader = TraceReader::new(Cursor::new(text.as_bytes().to_vec()));

		let accesses = reader
			.by_ref()
			.collect::<Result<Vec<Access>, Error>>()
			.unwrap();

		(accesses, reader.skipped())
	}

	#[test]
	fn reads_every_line() {
		let (accesses, skipped) = read("I 0400d7d4,8\n L 7ff0005b8,8\n S 7ff0005a8,4\n M 0421c7f0,4");

		let operations = accesses
			.iter()
			.map(|access| access.operation)
			.collect::<Vec<Operation>>();

		assert_eq!(operations, vec![
			Operation::Instruction,
			Operation::Load,
			Operation::Store,
			Operation::Modify,
		]);

		assert_eq!(accesses[1].address, 0x7ff0005b8);
		assert_eq!(skipped, 0);
	}

	#[test]
	fn skips_malformed_and_blank_lines() {
		let (accesses, skipped) = read(" L 10,1\n\nbogus\n Q 20,1\n L 30\n S 40,1\r\n");

		assert_eq!(accesses, vec![
			Access::new(Operation::Load, 0x10, 1),
			Access::new(Operation::Store, 0x40, 1),
		]);

		assert_eq!(skipped, 3);
	}

	#[test]
	fn skips_invalid_utf8() {
		let mut bytes = b" L 10,1\n".to_vec();
		bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
		bytes.extend_from_slice(b" L 20,1\n");

		let mut reader = TraceReader::new(Cursor::new(bytes));
		let accesses = reader.by_ref().filter_map(Result::ok).count();

		assert_eq!(accesses, 2);
		assert_eq!(reader.skipped(), 1);
		assert_eq!(reader.bytes_read(), 19);
	}
}
