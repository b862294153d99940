// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::candidate::Candidate;
use crate::error::Error;
use crate::host::{self, Host, ResidencyQuery};

/// Whether an address lies on a mapped page.
///
/// A query the platform could not answer is reported as [`Error::Platform`], never as
/// [`Residency::NotResident`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Residency {
    /// The page is mapped in the calling process and accessing it will not fault.
    Resident,
    /// Nothing is mapped at this position of the address space.
    NotResident,
}

impl Residency {
    #[must_use]
    pub const fn is_resident(self) -> bool {
        matches!(self, Residency::Resident)
    }
}

impl From<Residency> for bool {
    fn from(residency: Residency) -> Self {
        residency.is_resident()
    }
}

/// Probes candidate addresses through a [`ResidencyQuery`].
///
/// The prober holds no mutable state, it is as thread-safe as its query and every call is
/// independent of the ones before it.
#[derive(Debug, Clone, Copy)]
pub struct Prober<Q = Host> {
    query: Q,
}

impl Prober<Host> {
    /// Creates a prober using the residency query of the host platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if the host cannot answer residency queries.
    pub fn host() -> Result<Self, Error> {
        host::init().map(Self::with_query)
    }
}

impl<Q: ResidencyQuery> Prober<Q> {
    pub const fn with_query(query: Q) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    /// The page size used to align candidates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Platform`] if the platform cannot report its page size.
    pub fn page_size(&self) -> Result<usize, Error> {
        Ok(self.query.page_size()?)
    }

    /// Determines whether `candidate` points into a mapped page of the calling process.
    ///
    /// The candidate is never dereferenced. Null is always [`Residency::NotResident`] without
    /// consulting the platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if `candidate` does not fit into a native address and
    /// [`Error::Platform`] if the platform could not answer the query.
    pub fn probe(&self, candidate: impl Into<Candidate>) -> Result<Residency, Error> {
        let addr = candidate.into().to_address()?;

        if addr.is_null() {
            log::trace!("probe({addr}): null is never resident");
            return Ok(Residency::NotResident);
        }

        let page_size = self.query.page_size()?;
        let page = addr.align_down(page_size);

        let residency = self.query.query(page, page_size)?;
        log::trace!("probe({addr}): page {page} is {residency:?}");

        Ok(residency)
    }
}
