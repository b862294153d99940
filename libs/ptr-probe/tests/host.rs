// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

#![cfg(unix)]

use std::ptr;

use proptest::prelude::*;
use ptr_probe::{Address, Error, Prober, Residency};

/// An anonymous private mapping that is unmapped again on drop.
struct Mapping {
    base: *mut u8,
    len: usize,
}

impl Mapping {
    fn new(pages: usize) -> Self {
        let page_size = page_size();
        let len = pages * page_size;

        // Safety: anonymous mapping at a kernel chosen address, touches nothing we own
        let base = unsafe {
            libc::mmap(
                ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_ANONYMOUS | libc::MAP_PRIVATE,
                -1,
                0,
            )
        };
        assert_ne!(base, libc::MAP_FAILED, "{}", std::io::Error::last_os_error());

        Self {
            base: base.cast(),
            len,
        }
    }

    fn page(&self, n: usize) -> Address {
        Address::new(Address::from_ptr(self.base).get() + n * page_size())
    }

    fn touch(&self) {
        for offset in (0..self.len).step_by(page_size()) {
            // Safety: in bounds of our own read/write mapping
            unsafe { self.base.add(offset).write_volatile(0xa5) };
        }
    }

    /// Unmaps the page `n`, leaving a hole in the middle of the mapping.
    fn punch_hole(&self, n: usize) {
        // Safety: the page is part of our mapping and nothing references it
        let ret = unsafe {
            libc::munmap(
                self.base.add(n * page_size()).cast(),
                page_size(),
            )
        };
        assert_eq!(ret, 0, "{}", std::io::Error::last_os_error());
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // Safety: we own the mapping, unmapping already unmapped holes is fine
        let ret = unsafe { libc::munmap(self.base.cast(), self.len) };
        debug_assert_eq!(ret, 0);
    }
}

fn page_size() -> usize {
    Prober::host().unwrap().page_size().unwrap()
}

fn probe(addr: usize) -> Residency {
    ptr_probe::probe(addr).unwrap()
}

#[test_log::test]
fn touched_pages_are_resident() {
    let mapping = Mapping::new(4);
    mapping.touch();

    for n in 0..4 {
        let page = mapping.page(n);
        assert_eq!(probe(page.get()), Residency::Resident, "page {n} at {page}");
        assert_eq!(
            probe(page.get() + page_size() - 1),
            Residency::Resident,
            "last byte of page {n}"
        );
    }
}

#[test_log::test]
fn heap_and_stack_are_resident() {
    let boxed = Box::new([0u8; 64]);
    let local = 0u32;

    assert_eq!(probe(Address::from_ptr(&raw const *boxed).get()), Residency::Resident);
    assert_eq!(probe(Address::from_ptr(&raw const local).get()), Residency::Resident);
}

#[test_log::test]
fn null_is_not_resident() {
    assert_eq!(probe(0), Residency::NotResident);
}

#[cfg(any(target_os = "linux", target_os = "android"))]
#[test_log::test]
fn holes_are_not_resident() {
    let mapping = Mapping::new(3);
    mapping.touch();
    mapping.punch_hole(1);

    assert_eq!(probe(mapping.page(0).get()), Residency::Resident);
    assert_eq!(probe(mapping.page(1).get()), Residency::NotResident);
    assert_eq!(probe(mapping.page(1).get() + 17), Residency::NotResident);
    assert_eq!(probe(mapping.page(2).get()), Residency::Resident);
}

#[cfg(all(target_pointer_width = "64", any(target_os = "linux", target_os = "android")))]
#[test_log::test]
fn top_of_address_space_is_not_resident() {
    // the upper half belongs to the kernel and is never mapped for user space
    assert_eq!(probe(usize::MAX), Residency::NotResident);
    assert_eq!(probe(0xffff_8000_0000_0000), Residency::NotResident);
}

#[test]
fn probing_is_idempotent() {
    let mapping = Mapping::new(1);
    mapping.touch();
    let addr = mapping.page(0).get() + 123;

    let first = probe(addr);
    for _ in 0..16 {
        assert_eq!(probe(addr), first);
    }
}

#[test]
fn overflow_is_reported_not_truncated() {
    // would alias the null page if truncated
    let candidate = 1u128 << usize::BITS;
    let err = ptr_probe::probe(candidate).unwrap_err();
    assert!(matches!(err, Error::Overflow(_)), "{err:?}");
}

#[test]
fn probing_from_many_threads() {
    let mapping = Mapping::new(2);
    mapping.touch();
    let addr = mapping.page(1).get();

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..64 {
                    assert_eq!(probe(addr), Residency::Resident);
                }
            });
        }
    });
}

#[cfg(any(target_os = "linux", target_os = "android"))]
proptest! {
    #[test]
    fn any_address_gets_an_answer(addr: usize) {
        // garbage in, a plain answer out, and no crash
        prop_assert!(ptr_probe::probe(addr).is_ok());
    }
}

proptest! {
    #[test]
    fn same_page_same_answer(offset_a in 0usize..4096, offset_b in 0usize..4096, page in 0usize..3) {
        let mapping = Mapping::new(3);
        mapping.touch();

        let base = mapping.page(page).get();
        let page_size = page_size();
        prop_assert_eq!(probe(base + offset_a % page_size), probe(base + offset_b % page_size));
    }
}
