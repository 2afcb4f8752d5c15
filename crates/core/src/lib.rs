//! # jstables core
//!
//! Calls JavaScript functions from a host query engine, as table functions
//! producing rows and as scalar functions producing one value per row.
//!
//! A single embedded QuickJS runtime ([`rt::Runtime`]) hosts the user's
//! modules. Functions are resolved with a `module:function` specifier
//! ([`fnc`]), values cross the boundary through [`conv`], and table
//! functions are driven batch by batch by [`scan::ScanState`].
//!

#[macro_use]
extern crate tracing;

#[macro_use]
mod mac;

mod str;

pub mod cnf;
pub mod conv;
pub mod err;
pub mod fnc;
pub mod host;
pub mod rt;
pub mod scan;

pub use jstables_types as types;
