// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use core::fmt;
use core::str::FromStr;

use crate::address::Address;
use crate::error::OverflowError;

/// An unsigned integer of arbitrary width that is supposed to be an address.
///
/// Candidates can be created losslessly from every unsigned integer type and parsed from text of
/// any length. Turning a candidate into an [`Address`] is the only place where the native address
/// width is enforced, see [`Candidate::to_address`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Candidate(Repr);

/// Every value has exactly one representation, so the derived comparisons are numeric.
#[derive(Clone, PartialEq, Eq, Hash)]
enum Repr {
    Int(u128),
    /// Too wide for `u128`. Little-endian 32-bit limbs, the most significant limb is never zero.
    Wide(Box<[u32]>),
}

const LIMBS_PER_U128: usize = 4;

impl Candidate {
    #[must_use]
    pub const fn new(value: u128) -> Self {
        Self(Repr::Int(value))
    }

    /// Returns the candidate as an `u128` if it fits.
    #[must_use]
    pub const fn as_u128(&self) -> Option<u128> {
        match self.0 {
            Repr::Int(value) => Some(value),
            Repr::Wide(_) => None,
        }
    }

    /// Converts the candidate into a native address.
    ///
    /// This is a pure range check: no pointer is created here.
    ///
    /// # Errors
    ///
    /// Returns an [`OverflowError`] if the candidate is larger than [`Address::MAX`].
    pub fn to_address(&self) -> Result<Address, OverflowError> {
        self.as_u128()
            .and_then(|value| usize::try_from(value).ok())
            .map(Address::new)
            .ok_or_else(|| OverflowError::new(self.clone()))
    }

    fn from_limbs(limbs: Vec<u32>) -> Self {
        if limbs.len() > LIMBS_PER_U128 {
            return Self(Repr::Wide(limbs.into_boxed_slice()));
        }

        let value = limbs
            .iter()
            .rev()
            .fold(0u128, |acc, limb| (acc << 32) | u128::from(*limb));
        Self::new(value)
    }

    fn from_be_bytes(bytes: &[u8]) -> Self {
        let mut limbs = Vec::new();
        for byte in bytes {
            mul_add(&mut limbs, 256, u32::from(*byte));
        }
        Self::from_limbs(limbs)
    }
}

/// `limbs = limbs * mul + add`
#[expect(clippy::cast_possible_truncation, reason = "keeps the low 32 bits on purpose")]
fn mul_add(limbs: &mut Vec<u32>, mul: u32, add: u32) {
    let mut carry = u64::from(add);
    for limb in &mut *limbs {
        let v = u64::from(*limb) * u64::from(mul) + carry;
        *limb = v as u32;
        carry = v >> 32;
    }
    // never pushes a zero, so the top limb stays non-zero
    if carry != 0 {
        limbs.push(carry as u32);
    }
}

/// `limbs = limbs / div`, returning the remainder. Drops limbs that became zero.
#[expect(clippy::cast_possible_truncation, reason = "quotient and remainder are below 2^32")]
fn div_rem(limbs: &mut Vec<u32>, div: u32) -> u32 {
    let mut rem = 0u64;
    for limb in limbs.iter_mut().rev() {
        let v = (rem << 32) | u64::from(*limb);
        *limb = (v / u64::from(div)) as u32;
        rem = v % u64::from(div);
    }
    while limbs.last() == Some(&0) {
        limbs.pop();
    }
    rem as u32
}

macro_rules! impl_candidate_from {
    ($($int_ty:ident),*) => {
        $(
            impl From<$int_ty> for Candidate {
                fn from(value: $int_ty) -> Self {
                    Self::new(u128::from(value))
                }
            }
        )*
    };
}

impl_candidate_from!(u8, u16, u32, u64, u128);

impl From<usize> for Candidate {
    fn from(value: usize) -> Self {
        Self::from_be_bytes(&value.to_be_bytes())
    }
}

impl From<Address> for Candidate {
    fn from(value: Address) -> Self {
        Self::from(value.get())
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use core::fmt::Write as _;

        const CHUNK: u32 = 1_000_000_000;

        let limbs = match &self.0 {
            Repr::Int(value) => return fmt::Display::fmt(value, f),
            Repr::Wide(limbs) => limbs,
        };

        // nine decimal digits at a time, least significant first
        let mut limbs = limbs.to_vec();
        let mut chunks = Vec::new();
        while !limbs.is_empty() {
            chunks.push(div_rem(&mut limbs, CHUNK));
        }

        let mut out = String::with_capacity(chunks.len() * 9);
        let mut chunks = chunks.iter().rev();
        if let Some(first) = chunks.next() {
            write!(out, "{first}")?;
        }
        for chunk in chunks {
            write!(out, "{chunk:09}")?;
        }
        f.pad(&out)
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Int(value) => f
                .debug_tuple("Candidate")
                .field(&format_args!("{value:#x}"))
                .finish(),
            Repr::Wide(limbs) => {
                f.write_str("Candidate(")?;
                let mut limbs = limbs.iter().rev();
                if let Some(top) = limbs.next() {
                    write!(f, "{top:#x}")?;
                }
                for limb in limbs {
                    write!(f, "{limb:08x}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Why a piece of text is not a candidate address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateErrorKind {
    /// No digits were given.
    Empty,
    /// The value has a minus sign.
    Negative,
    /// The value has a fractional part.
    Fractional,
    /// A character that is not a digit in the value's radix.
    InvalidDigit(char),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidCandidate {
    kind: CandidateErrorKind,
}

impl InvalidCandidate {
    const fn new(kind: CandidateErrorKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub const fn kind(&self) -> CandidateErrorKind {
        self.kind
    }
}

impl fmt::Display for InvalidCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CandidateErrorKind::Empty => f.write_str("cannot parse address from empty string"),
            CandidateErrorKind::Negative => f.write_str("address must not be negative"),
            CandidateErrorKind::Fractional => f.write_str("address must be an integer"),
            CandidateErrorKind::InvalidDigit(c) => write!(f, "invalid digit {c:?} in address"),
        }
    }
}

impl core::error::Error for InvalidCandidate {}

impl FromStr for Candidate {
    type Err = InvalidCandidate;

    /// Parses a candidate from decimal, or from hex, octal or binary with a `0x`, `0o` or `0b`
    /// prefix. Underscores may separate digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.starts_with('-') {
            return Err(InvalidCandidate::new(CandidateErrorKind::Negative));
        }

        let (radix, digits) = split_radix(s);

        let mut limbs = Vec::new();
        let mut seen_digit = false;
        let mut prev_was_sep = false;
        for c in digits.chars() {
            match c {
                '_' if seen_digit && !prev_was_sep => {
                    prev_was_sep = true;
                    continue;
                }
                '.' => return Err(InvalidCandidate::new(CandidateErrorKind::Fractional)),
                _ => {}
            }

            let digit = c
                .to_digit(radix)
                .ok_or(InvalidCandidate::new(CandidateErrorKind::InvalidDigit(c)))?;
            mul_add(&mut limbs, radix, digit);

            seen_digit = true;
            prev_was_sep = false;
        }

        // separators only go between digits
        if prev_was_sep {
            return Err(InvalidCandidate::new(CandidateErrorKind::InvalidDigit('_')));
        }
        if !seen_digit {
            return Err(InvalidCandidate::new(CandidateErrorKind::Empty));
        }

        Ok(Self::from_limbs(limbs))
    }
}

fn split_radix(s: &str) -> (u32, &str) {
    let radix = match s.as_bytes() {
        [b'0', b'x' | b'X', ..] => 16,
        [b'0', b'o' | b'O', ..] => 8,
        [b'0', b'b' | b'B', ..] => 2,
        _ => return (10, s),
    };

    (radix, &s[2..])
}
