/*
 * Copyright (c) Kia Shakiba
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A functional set-associative cache simulator with LRU replacement,
//! replaying memory traces and counting hits, misses and evictions.

pub mod access;
pub mod geometry;
pub mod cache;
pub mod performance;
pub mod simulator;
pub mod trace;
pub mod transpose;
pub mod evaluation;

pub use crate::{
	access::{Access, Operation},
	geometry::Geometry,
	cache::{Cache, Outcome},
	performance::CachePerformance,
	simulator::{Simulator, Step, simulate},
	trace::TraceReader,
};

/// Environment variable holding the `env_logger` filter for the binaries.
pub const LOG_ENV: &str = "CSIM_LOG";

/// Initializes logging for a binary, defaulting to warnings only.
pub fn init_logging() {
	let env = env_logger::Env::default()
		.filter_or(LOG_ENV, "warn");

	env_logger::init_from_env(env);
}
