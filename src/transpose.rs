/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::io::{Error, ErrorKind};

use crate::{
	access::{Access, Address, Operation, Size},
	geometry::{Geometry, SetIndex},
};

/// Matrices are stored as `int` arrays.
pub const ELEMENT_SIZE: Size = 4;

/// Largest supported side length. Both matrices are laid out in arrays of
/// this size, which fixes the distance between them.
pub const MAX_DIMENSION: usize = 256;

pub const A_BASE: Address = 0x0010_c080;
pub const B_BASE: Address = A_BASE + (MAX_DIMENSION * MAX_DIMENSION) as Address * ELEMENT_SIZE as Address;

pub type TransposeFn = fn(&mut Workspace);

/// The transpose functions that can be evaluated, with their descriptions.
pub const TRANSPOSES: &[(&str, TransposeFn)] = &[
	("Transpose submission", transpose_blocked),
	("Simple row-wise scan transpose", transpose_naive),
];

/// A row-major matrix placed at a fixed address.
struct Matrix {
	base: Address,
	rows: usize,
	cols: usize,
	values: Vec<i32>,
}

impl Matrix {
	fn new(base: Address, rows: usize, cols: usize) -> Self {
		Matrix {
			base,
			rows,
			cols,
			values: vec![0; rows * cols],
		}
	}

	fn offset(&self, row: usize, col: usize) -> usize {
		assert!(row < self.rows && col < self.cols, "Matrix index out of bounds.");
		row * self.cols + col
	}

	fn address(&self, row: usize, col: usize) -> Address {
		self.base + self.offset(row, col) as Address * ELEMENT_SIZE as Address
	}
}

/// Source matrix `A` (`N x M`) and destination `B` (`M x N`). Every element
/// read from `A` and written to `B` is recorded as a trace access.
pub struct Workspace {
	a: Matrix,
	b: Matrix,

	trace: Vec<Access>,
}

impl Workspace {
	/// Creates a workspace for an `N`-row, `M`-column source matrix, filled
	/// with ascending values.
	pub fn new(m: usize, n: usize) -> Result<Self, Error> {
		if m == 0 || n == 0 || m > MAX_DIMENSION || n > MAX_DIMENSION {
			return Err(Error::new(
				ErrorKind::InvalidInput,
				"Matrix dimensions must be between 1 and 256."
			));
		}

		let mut a = Matrix::new(A_BASE, n, m);

		for (index, value) in a.values.iter_mut().enumerate() {
			*value = index as i32;
		}

		let workspace = Workspace {
			a,
			b: Matrix::new(B_BASE, m, n),

			trace: Vec::new(),
		};

		Ok(workspace)
	}

	/// Number of columns of `A`.
	pub fn m(&self) -> usize {
		self.a.cols
	}

	/// Number of rows of `A`.
	pub fn n(&self) -> usize {
		self.a.rows
	}

	pub fn trace(&self) -> &[Access] {
		&self.trace
	}

	pub fn into_trace(self) -> Vec<Access> {
		self.trace
	}

	pub fn read_a(&mut self, row: usize, col: usize) -> i32 {
		let address = self.a.address(row, col);
		self.trace.push(Access::new(Operation::Load, address, ELEMENT_SIZE));

		self.a.values[self.a.offset(row, col)]
	}

	pub fn write_b(&mut self, row: usize, col: usize, value: i32) {
		let address = self.b.address(row, col);
		self.trace.push(Access::new(Operation::Store, address, ELEMENT_SIZE));

		let offset = self.b.offset(row, col);
		self.b.values[offset] = value;
	}

	/// Returns `true` if `B` holds the transpose of `A`. Not traced.
	pub fn is_transpose(&self) -> bool {
		(0..self.n()).all(|row| {
			(0..self.m()).all(|col| {
				self.a.values[self.a.offset(row, col)] == self.b.values[self.b.offset(col, row)]
			})
		})
	}
}

/// Transposes in blocks sized to the 1KB direct-mapped cache with 32-byte
/// blocks: 8x8 for 32x32, 4x4 for 64x64 (8x8 blocks would conflict with
/// themselves there), and 8-wide blocks of varying height otherwise.
pub fn transpose_blocked(workspace: &mut Workspace) {
	let (m, n) = (workspace.m(), workspace.n());

	match (m, n) {
		(32, 32) => transpose_in_blocks(workspace, 8, 8),
		(64, 64) => transpose_in_blocks(workspace, 4, 4),
		_ => transpose_in_blocks(workspace, block_height(m), 8),
	}
}

/// Row-wise scan transpose, ignoring the cache entirely.
pub fn transpose_naive(workspace: &mut Workspace) {
	for row in 0..workspace.n() {
		for col in 0..workspace.m() {
			let value = workspace.read_a(row, col);
			workspace.write_b(col, row, value);
		}
	}
}

// Picks the height whose remainder against the row length is strictly the
// smallest, falling back to 4 when there is no clear winner.
fn block_height(m: usize) -> usize {
	if m % 8 == 0 {
		return 8;
	}

	let candidates = [7, 6, 5];

	for height in candidates {
		let strictly_smallest = [7, 6, 5, 4]
			.iter()
			.filter(|other| **other != height)
			.all(|other| m % height < m % other);

		if strictly_smallest {
			return height;
		}
	}

	4
}

fn transpose_in_blocks(workspace: &mut Workspace, block_height: usize, block_width: usize) {
	let (m, n) = (workspace.m(), workspace.n());

	let block_rows = n / block_height;
	let block_cols = m / block_width;

	for block_row in 0..block_rows {
		for block_col in 0..block_cols {
			for row in 0..block_height {
				for col in 0..block_width {
					let a_row = block_row * block_height + row;
					let a_col = block_col * block_width + col;

					let value = workspace.read_a(a_row, a_col);
					workspace.write_b(a_col, a_row, value);
				}
			}
		}
	}

	// Columns to the right of the blocks.
	for row in 0..n {
		for col in (block_cols * block_width)..m {
			let value = workspace.read_a(row, col);
			workspace.write_b(col, row, value);
		}
	}

	// Rows below the blocks.
	for row in (block_rows * block_height)..n {
		for col in 0..(block_cols * block_width) {
			let value = workspace.read_a(row, col);
			workspace.write_b(col, row, value);
		}
	}
}

/// Set index of every element of a `rows x cols` matrix of `int`s starting
/// at address 0, for inspecting which elements conflict.
pub fn set_map(geometry: &Geometry, rows: usize, cols: usize) -> Vec<Vec<SetIndex>> {
	(0..rows)
		.map(|row| {
			(0..cols)
				.map(|col| {
					let address = ((row * cols + col) * ELEMENT_SIZE as usize) as Address;
					geometry.decode(address).0
				})
				.collect()
		})
		.collect()
}
