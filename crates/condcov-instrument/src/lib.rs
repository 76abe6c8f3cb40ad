//! Branch and condition coverage instrumentation.
//!
//! This crate rewrites a package of Go-shaped source so that every
//! condition reports each of its evaluations to a small generated runtime,
//! which counts how often the condition was true and false, persists the
//! counts as JSON, and prints the coverage gaps when the test binary
//! exits.
//!
//! # Pipeline
//!
//! Each file runs through four passes over the trivia-preserving CST of
//! [`condcov_syntax`]:
//!
//! 1. **mark** — decide which expressions are conditions, keyed by node id.
//! 2. **prepare** — rewrite tagged switches and type switches into blocks
//!    whose case expressions are plain boolean conditions.
//! 3. **plan** — drain the marks in source order into substitution plans
//!    carrying the original position and normalized text.
//! 4. **replace** — wrap each planned expression in `condcovCover(k, e)`,
//!    assigning dense indices in source order.
//!
//! The [`driver`] ties the passes together per package and emits the
//! generated runtime files next to the instrumented sources.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use condcov_instrument::{instrument_package, Options};
//!
//! let summary = instrument_package(
//!     Path::new("./pkg"),
//!     Path::new("./pkg-instrumented"),
//!     &Options::default(),
//! )?;
//! println!("{} conditions", summary.conditions);
//! # Ok::<(), condcov_instrument::InstrumentError>(())
//! ```

pub mod constraints;
pub mod driver;
pub mod error;
pub mod table;

mod emitter;
mod factory;
mod mark;
mod plan;
mod prepare;
mod replace;
mod testmain;

pub use constraints::BuildEnv;
pub use driver::{instrument_package, Options, Summary};
pub use error::{InstrumentError, Result};
pub use table::{Condition, CoverageTable};
