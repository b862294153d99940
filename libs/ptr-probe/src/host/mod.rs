// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Platform residency queries.
//!
//! Exactly one implementation of [`ResidencyQuery`] is compiled in and exported as [`Host`].
//! Targets without a way to ask the kernel about page residency fail to build.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::Residency;
use crate::address::Address;
use crate::error::{Error, PlatformError};

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        mod unix;
        pub use unix::{Mincore, page_size};
        pub type Host = Mincore;
    } else if #[cfg(windows)] {
        mod windows;
        pub use windows::{VirtualQuery, page_size};
        pub type Host = VirtualQuery;
    } else {
        compile_error!("ptr-probe needs mincore(2) or VirtualQuery, this target provides neither");
    }
}

/// A way of asking the operating system whether a page is mapped in the calling process.
///
/// Implementations must never access the memory they are asked about. The whole point of a
/// residency query is that it can be pointed at garbage.
pub trait ResidencyQuery {
    /// Returns the size of a page in bytes.
    ///
    /// This must be a power of two and must not change over the lifetime of the process.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot report its page size.
    fn page_size(&self) -> Result<usize, PlatformError>;

    /// Asks whether the single page starting at `page` is mapped.
    ///
    /// `page` is aligned to `page_size`. It may be the null page when probing an address inside
    /// it, implementations must answer that like any other page.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform could not answer. An unmapped page is *not* an error.
    fn query(&self, page: Address, page_size: usize) -> Result<Residency, PlatformError>;
}

/// Initializes the host residency query.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] if the host query exists but cannot answer anything.
pub fn init() -> Result<Host, Error> {
    Host::new()
}

/// Lock-free, compute-once page size.
///
/// Racing first callers may each compute the value, they all store the same one.
pub(crate) struct PageSizeCache(AtomicUsize);

impl PageSizeCache {
    pub(crate) const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    pub(crate) fn get_or_try_init(
        &self,
        f: impl FnOnce() -> Result<usize, PlatformError>,
    ) -> Result<usize, PlatformError> {
        match self.0.load(Ordering::Relaxed) {
            0 => {
                let page_size = f()?;
                debug_assert!(page_size.is_power_of_two());
                log::debug!("page size is {page_size:#x} bytes");
                self.0.store(page_size, Ordering::Relaxed);
                Ok(page_size)
            }
            page_size => Ok(page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use std::io;

    use super::*;

    #[test_log::test]
    fn page_size_is_computed_once() {
        let cache = PageSizeCache::new();
        let calls = Cell::new(0);

        for _ in 0..3 {
            let page_size = cache
                .get_or_try_init(|| {
                    calls.set(calls.get() + 1);
                    Ok(0x4000)
                })
                .unwrap();
            assert_eq!(page_size, 0x4000);
        }

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn failed_init_is_not_cached() {
        let cache = PageSizeCache::new();

        let err = cache
            .get_or_try_init(|| Err(PlatformError::new("sysconf", io::Error::other("nope"))))
            .unwrap_err();
        assert_eq!(err.operation(), "sysconf");

        assert_eq!(cache.get_or_try_init(|| Ok(0x1000)).unwrap(), 0x1000);
    }

    #[test_log::test]
    fn host_page_size() {
        let first = page_size().unwrap();

        assert!(first.is_power_of_two());
        assert!(first >= 0x1000);
        assert_eq!(page_size().unwrap(), first);
    }

    #[cfg(unix)]
    #[test]
    fn host_query_uses_host_page_size() {
        let host = init().unwrap();
        assert_eq!(host.page_size().unwrap(), page_size().unwrap());
    }

    #[cfg(windows)]
    #[test]
    fn host_fails_closed() {
        assert!(matches!(init(), Err(Error::Unsupported { .. })));
    }
}
