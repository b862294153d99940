// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;

use crate::Residency;
use crate::address::Address;
use crate::error::{Error, PlatformError};
use crate::host::{PageSizeCache, ResidencyQuery};

static PAGE_SIZE: PageSizeCache = PageSizeCache::new();

/// Residency queries backed by `mincore(2)`.
///
/// `mincore` only consults the kernel's page tables for the given range and reports `ENOMEM` if
/// any part of it is not mapped, which is exactly the crash-free probe we want.
#[derive(Debug, Clone, Copy)]
pub struct Mincore(());

impl Mincore {
    /// # Errors
    ///
    /// Never fails, `mincore` is available on every unix target.
    pub fn new() -> Result<Self, Error> {
        Ok(Self(()))
    }
}

impl ResidencyQuery for Mincore {
    fn page_size(&self) -> Result<usize, PlatformError> {
        page_size()
    }

    fn query(&self, page: Address, page_size: usize) -> Result<Residency, PlatformError> {
        debug_assert!(page.is_aligned_to(page_size));

        // One byte per page, and we only ever ask about one page. The element type differs
        // between platforms, so let the signature pick it.
        let mut vec = [0; 1];

        // Safety: mincore never dereferences `page`, it only looks the range up in the kernel's
        // bookkeeping and reports ENOMEM if it isn't mapped. `vec` is valid for writes of the one
        // entry that covers a single `page_size` range.
        let ret = unsafe {
            libc::mincore(
                page.as_mut_ptr().cast::<libc::c_void>(),
                page_size,
                vec.as_mut_ptr(),
            )
        };

        if ret == 0 {
            log::trace!("mincore({page}): resident");
            return Ok(Residency::Resident);
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::ENOMEM) => {
                log::trace!("mincore({page}): not mapped");
                Ok(Residency::NotResident)
            }
            _ => {
                log::debug!("mincore({page}) failed: {err}");
                Err(PlatformError::new("mincore", err))
            }
        }
    }
}

/// The page size of the host, from `sysconf(_SC_PAGESIZE)`.
///
/// # Errors
///
/// Returns an error if `sysconf` fails or reports a page size that is not a power of two.
pub fn page_size() -> Result<usize, PlatformError> {
    PAGE_SIZE.get_or_try_init(sysconf_page_size)
}

fn sysconf_page_size() -> Result<usize, PlatformError> {
    // Safety: sysconf has no preconditions
    let ret = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    match usize::try_from(ret) {
        Ok(page_size) if page_size.is_power_of_two() => Ok(page_size),
        Ok(page_size) => Err(PlatformError::new(
            "sysconf(_SC_PAGESIZE)",
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("page size {page_size} is not a power of two"),
            ),
        )),
        Err(_) => Err(PlatformError::last_os_error("sysconf(_SC_PAGESIZE)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn own_stack_is_resident() {
        let mincore = Mincore::new().unwrap();
        let page_size = mincore.page_size().unwrap();

        let local = 0u64;
        let page = Address::from_ptr(&raw const local).align_down(page_size);

        assert_eq!(
            mincore.query(page, page_size).unwrap(),
            Residency::Resident
        );
    }

    #[test]
    fn page_size_matches_sysconf() {
        assert_eq!(
            Mincore::new().unwrap().page_size().unwrap(),
            sysconf_page_size().unwrap()
        );
    }
}
