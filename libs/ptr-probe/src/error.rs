// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::fmt;
use std::io;

use crate::address::Address;
use crate::candidate::Candidate;

#[derive(Debug)]
pub enum Error {
    /// The candidate does not fit into a native address.
    Overflow(OverflowError),
    /// The operating system could not tell whether the page is mapped.
    Platform(PlatformError),
    /// This platform has no way of answering residency queries.
    Unsupported { platform: &'static str },
}

impl From<OverflowError> for Error {
    fn from(err: OverflowError) -> Self {
        Error::Overflow(err)
    }
}
impl From<PlatformError> for Error {
    fn from(err: PlatformError) -> Self {
        Error::Platform(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Overflow(err) => fmt::Display::fmt(err, f),
            Error::Platform(err) => fmt::Display::fmt(err, f),
            Error::Unsupported { platform } => {
                write!(f, "[{platform}]: pointer validation is not implemented")
            }
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            // both variants are transparent wrappers
            Error::Overflow(err) => core::error::Error::source(err),
            Error::Platform(err) => core::error::Error::source(err),
            Error::Unsupported { .. } => None,
        }
    }
}

/// The candidate is larger than the largest native address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverflowError {
    value: Candidate,
}

impl OverflowError {
    pub(crate) const fn new(value: Candidate) -> Self {
        Self { value }
    }

    /// The offending candidate.
    #[must_use]
    pub const fn value(&self) -> &Candidate {
        &self.value
    }

    /// The largest address on this platform.
    #[must_use]
    pub const fn max(&self) -> Address {
        Address::MAX
    }
}

impl fmt::Display for OverflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pointer value overflow: {} > {}",
            self.value,
            self.max().get()
        )
    }
}

impl core::error::Error for OverflowError {}

/// A residency query failed for a reason other than the page being unmapped.
#[derive(Debug)]
pub struct PlatformError {
    operation: &'static str,
    source: io::Error,
}

impl PlatformError {
    #[must_use]
    pub fn new(operation: &'static str, source: io::Error) -> Self {
        Self { operation, source }
    }

    /// Captures `errno` (or `GetLastError` on Windows) right after `operation` failed.
    #[must_use]
    pub fn last_os_error(operation: &'static str) -> Self {
        Self::new(operation, io::Error::last_os_error())
    }

    /// The platform call that failed, e.g. `mincore`.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unable to validate pointer value: {} failed",
            self.operation
        )
    }
}

impl core::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.source)
    }
}
