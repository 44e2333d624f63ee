//! Compact, roughly time-sortable primary keys without a coordinating service.
//!
//! Every key is a caller-supplied prefix, a `_` separator and the base63 form
//! of a 61-bit [`FlakeId`]:
//!
//! ```text
//!  Bit Index:  63         61 60            20 19         10 9            5 4             0
//!              +------------+----------------+-------------+--------------+---------------+
//!  Field:      | unused (3) | timestamp (41) | node ID (10) | process (5) | sequence (5)  |
//!              +------------+----------------+-------------+--------------+---------------+
//! ```
//!
//! The node and process fields together form the [`Origin`], fixed once per
//! process. A single [`LockFlakeGenerator`] per process issues at most 32
//! identifiers per millisecond; callers beyond that rate block until the clock
//! advances instead of receiving duplicates.
//!
//! ```
//! use std::sync::Arc;
//! use flakekey::{KeyMinter, LockFlakeGenerator, Origin, WallClock, FLAKEKEY_EPOCH};
//!
//! let origin = Origin::from_parts(7, 3);
//! let generator = Arc::new(LockFlakeGenerator::new(origin, WallClock::with_epoch(FLAKEKEY_EPOCH)));
//! let minter = KeyMinter::new(generator);
//!
//! let key = minter.make_key("Exp").unwrap();
//! assert!(key.starts_with("Exp_"));
//! ```

mod base63;
mod config;
mod error;
mod generator;
mod id;
mod key;
mod origin;
mod time;

pub use crate::base63::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::key::*;
pub use crate::origin::*;
pub use crate::time::*;
