//! Snowflake-style 64-bit ID generation.
//!
//! A [`SnowflakeGenerator`] packs an epoch-relative millisecond timestamp, a
//! node ID, and a per-millisecond sequence counter into a single [`u64`],
//! guaranteeing uniqueness and strict ordering on one producer and rough
//! time-ordering across producers, with no coordination on the request path.
//!
//! See the crate README for the bit layout and usage examples.

mod error;
mod generator;
mod id;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
