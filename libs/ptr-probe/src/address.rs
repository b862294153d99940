// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::fmt;

/// A native address in the calling process.
///
/// Unlike a raw pointer an `Address` carries no promise that anything lives at it. It is only
/// ever turned back into a pointer to hand it to the operating system's page bookkeeping.
#[repr(transparent)]
#[derive(Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Address(usize);

impl Address {
    pub const MAX: Self = Self(usize::MAX);
    pub const NULL: Self = Self(0);

    #[must_use]
    pub const fn new(n: usize) -> Self {
        Self(n)
    }

    #[must_use]
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    #[must_use]
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    #[inline]
    pub fn from_ptr<T: ?Sized>(ptr: *const T) -> Self {
        Self(ptr.expose_provenance())
    }

    /// Materializes a raw pointer for this address.
    ///
    /// The pointer picks up whatever provenance was exposed for this address, if any. It must
    /// not be dereferenced unless the caller knows the memory is live.
    #[must_use]
    #[inline]
    pub fn as_mut_ptr(self) -> *mut u8 {
        core::ptr::with_exposed_provenance_mut(self.0)
    }

    /// Returns the offset of this address into its enclosing `align` sized block.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    #[must_use]
    #[inline]
    pub const fn offset_in(self, align: usize) -> usize {
        assert!(
            align.is_power_of_two(),
            "offset_in: align is not a power-of-two"
        );

        self.0 & (align - 1)
    }

    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    #[must_use]
    #[inline]
    pub const fn is_aligned_to(self, align: usize) -> bool {
        self.offset_in(align) == 0
    }

    /// Rounds this address down to the nearest multiple of `align`.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two.
    #[must_use]
    #[inline]
    pub const fn align_down(self, align: usize) -> Self {
        assert!(
            align.is_power_of_two(),
            "align_down: align is not a power-of-two"
        );

        let aligned = Self(self.0 & 0usize.wrapping_sub(align));
        debug_assert!(aligned.is_aligned_to(align));
        debug_assert!(aligned.0 <= self.0);
        aligned
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:#x}", self.0)) // always print the 0x prefix
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Address")
            .field(&format_args!("{:#x}", self.0)) // always print the 0x prefix
            .finish()
    }
}
