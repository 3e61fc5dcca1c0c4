//! # Conveyor Testkit
//!
//! Test utilities for the conveyor durable queue.
//!
//! This crate provides:
//! - Test fixtures: temporary queue folders with reopen support
//! - Property-based test generators using proptest
//! - A crash harness that simulates process death by dropping the queue
//!   without closing it
//!
//! ## Usage
//!
//! ```rust
//! use conveyor_testkit::prelude::*;
//!
//! let folder = QueueFolder::new(4);
//! let queue = folder.open();
//! queue.enqueue("job".to_string()).unwrap();
//! assert_eq!(queue.dequeue().unwrap(), "job");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod crash;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::crash::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use crash::*;
pub use fixtures::*;
pub use generators::*;
