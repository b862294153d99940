// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;

use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

use crate::Residency;
use crate::address::Address;
use crate::error::{Error, PlatformError};
use crate::host::{PageSizeCache, ResidencyQuery};

static PAGE_SIZE: PageSizeCache = PageSizeCache::new();

/// Residency queries on Windows.
///
/// Answering residency through `VirtualQuery` is not implemented yet. The type has no values and
/// [`VirtualQuery::new`] refuses to initialize rather than hand out guesses.
// TODO: map `MEMORY_BASIC_INFORMATION::State == MEM_COMMIT` to resident once the semantics for
//  guard pages and reserved-but-uncommitted ranges are settled.
#[derive(Debug, Clone, Copy)]
pub enum VirtualQuery {}

impl VirtualQuery {
    /// # Errors
    ///
    /// Always returns [`Error::Unsupported`].
    pub fn new() -> Result<Self, Error> {
        log::debug!("refusing to initialize residency queries on windows");
        Err(Error::Unsupported { platform: "Win32" })
    }
}

impl ResidencyQuery for VirtualQuery {
    fn page_size(&self) -> Result<usize, PlatformError> {
        match *self {}
    }

    fn query(&self, _page: Address, _page_size: usize) -> Result<Residency, PlatformError> {
        match *self {}
    }
}

/// The page size of the host, from `GetSystemInfo`.
///
/// # Errors
///
/// Returns an error if the reported page size is not a power of two.
pub fn page_size() -> Result<usize, PlatformError> {
    PAGE_SIZE.get_or_try_init(|| {
        // Safety: GetSystemInfo only writes to the out parameter
        let sysinfo = unsafe {
            let mut sysinfo: SYSTEM_INFO = core::mem::zeroed();
            GetSystemInfo(&raw mut sysinfo);
            sysinfo
        };

        usize::try_from(sysinfo.dwPageSize)
            .ok()
            .filter(|page_size| page_size.is_power_of_two())
            .ok_or_else(|| {
                PlatformError::new(
                    "GetSystemInfo",
                    io::Error::new(io::ErrorKind::InvalidData, "invalid page size"),
                )
            })
    })
}
