// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

/// The largest unsigned native address (`UINTPTR_MAX`).
pub const ADDRESS_MAX: usize = usize::MAX;
/// The largest signed native address (`INTPTR_MAX`).
pub const SIGNED_ADDRESS_MAX: isize = isize::MAX;
/// The smallest signed native address (`INTPTR_MIN`).
pub const SIGNED_ADDRESS_MIN: isize = isize::MIN;

/// The address limits of the platform, so callers can build and validate candidates without
/// hardcoding the pointer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub address_max: usize,
    pub signed_address_max: isize,
    pub signed_address_min: isize,
}

impl Limits {
    pub const HOST: Self = Self {
        address_max: ADDRESS_MAX,
        signed_address_max: SIGNED_ADDRESS_MAX,
        signed_address_min: SIGNED_ADDRESS_MIN,
    };

    /// Name/value pairs using the C spelling of each limit.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, i128); 3] {
        // every native integer fits into an i128
        [
            ("UINTPTR_MAX", i128::try_from(self.address_max).unwrap_or(i128::MAX)),
            ("INTPTR_MAX", i128::try_from(self.signed_address_max).unwrap_or(i128::MAX)),
            ("INTPTR_MIN", i128::try_from(self.signed_address_min).unwrap_or(i128::MIN)),
        ]
    }
}
