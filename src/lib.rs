#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]
#![deny(
    unsafe_code,
    unused_imports,
    unused_variables,
    unused_must_use,
    missing_docs,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

extern crate alloc;

mod config;
pub use config::TreeConfig;

mod error;
pub use error::{Error, Result};

mod node;
pub use node::{Color, NodeId};

mod tree;
pub use tree::{Iter, RbTree, Violation};

mod float;
pub use float::FloatTree;


#[cfg(test)]
mod testing;
