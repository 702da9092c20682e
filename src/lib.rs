//! A gym membership database built on an unbalanced binary search tree keyed by member id, with
//! a flat delimited file for persistence.

#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::all,
    missing_debug_implementations
)]
#![deny(clippy::all, missing_docs, rust_2018_idioms, rust_2021_compatibility)]

pub mod codec;
pub mod config;
mod error;
mod member;
pub mod shell;
mod tree;

pub use error::*;
pub use member::*;
pub use tree::*;
