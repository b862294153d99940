// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Crash-free residency probing for arbitrary addresses.
//!
//! This crate answers a single question: does a given integer, interpreted as an address in the
//! calling process, point into a page that is currently mapped? It does so *without ever touching
//! the memory in question*. The address is range checked, aligned down to its page and handed to
//! the operating system's page bookkeeping (`mincore(2)` on unix), so probing a garbage address
//! can never fault.
//!
//! ```
//! use ptr_probe::Residency;
//!
//! # #[cfg(unix)] {
//! let value = Box::new(42u64);
//! let addr = core::ptr::from_ref(&*value).addr();
//!
//! assert_eq!(ptr_probe::probe(addr).unwrap(), Residency::Resident);
//! assert_eq!(ptr_probe::probe(0u8).unwrap(), Residency::NotResident);
//! # }
//! ```
//!
//! Values wider than the native address width are rejected with [`Error::Overflow`] rather than
//! truncated, and platform failures other than "this page is unmapped" surface as
//! [`Error::Platform`] instead of being folded into a negative answer.
//!
//! On targets without a suitable primitive the crate either fails to build or, on Windows, fails
//! to initialize with [`Error::Unsupported`]. It never guesses.

mod address;
mod candidate;
mod error;
pub mod host;
mod limits;
mod prober;

pub use address::Address;
pub use candidate::{Candidate, CandidateErrorKind, InvalidCandidate};
pub use error::{Error, OverflowError, PlatformError};
pub use host::{Host, ResidencyQuery};
pub use limits::{ADDRESS_MAX, Limits, SIGNED_ADDRESS_MAX, SIGNED_ADDRESS_MIN};
pub use prober::{Prober, Residency};

/// Probes `candidate` against the address space of the calling process using the host's
/// residency query.
///
/// This is a shorthand for `Prober::host()?.probe(candidate)`.
///
/// # Errors
///
/// Returns [`Error::Overflow`] if `candidate` does not fit into a native address,
/// [`Error::Platform`] if the operating system could not answer the query and
/// [`Error::Unsupported`] if this platform has no way of answering it at all.
pub fn probe(candidate: impl Into<Candidate>) -> Result<Residency, Error> {
    Prober::host()?.probe(candidate)
}
