// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Capability traits shared by TPM constant, attribute and buffer types
//!
//! Three kinds of TPM values have a symbolic text form:
//!
//! - [`FriendlyInt`]: a single integer that may be one of a set of named
//!   constants (`TPM2_ALG`, `TPM2_RH`, ...)
//! - [`FriendlyIntList`]: a bitmask whose single bits carry names
//!   (`TPMA_OBJECT`, `TPMA_NV`, ...)
//! - [`SimpleBuffer`]: a size-prefixed byte buffer (`TPM2B_DIGEST`, ...)
//!
//! Concrete types are declared with the `friendly_int!`, `friendly_intlist!`
//! and `simple_tpm2b!` macros, which also wire them into the
//! [`Encode`](crate::encoding::Encode)/[`Decode`](crate::encoding::Decode)
//! dispatch.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::encoding::{Error, Result};

/// How symbolic names are compared while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    /// The input must match the canonical name exactly
    Sensitive,
    /// ASCII case is folded before comparing
    #[default]
    Insensitive,
}

impl Case {
    pub fn from_insensitive(insensitive: bool) -> Self {
        if insensitive {
            Case::Insensitive
        } else {
            Case::Sensitive
        }
    }

    pub fn matches(self, canonical: &str, input: &str) -> bool {
        match self {
            Case::Sensitive => canonical == input,
            Case::Insensitive => canonical.eq_ignore_ascii_case(input),
        }
    }
}

/// An integer-backed value with a table of named constants
pub trait FriendlyInt: Copy + Eq + 'static {
    /// Type name used in error messages
    const KIND: &'static str;
    /// Named constants in definition order
    const CONSTANTS: &'static [(Self, &'static str)];

    fn to_u64(self) -> u64;

    /// Returns `None` if `value` does not fit the underlying integer.
    fn from_u64(value: u64) -> Option<Self>;

    fn try_from_u64(value: u64) -> Result<Self> {
        Self::from_u64(value).ok_or(Error::OutOfRange {
            kind: Self::KIND,
            value,
        })
    }

    /// Canonical name of this value, if it is one of the named constants.
    fn name(self) -> Option<&'static str> {
        Self::CONSTANTS
            .iter()
            .find(|(constant, _)| *constant == self)
            .map(|(_, name)| *name)
    }

    fn contains(self) -> bool {
        self.name().is_some()
    }

    /// Resolve a constant name.
    fn parse(name: &str, case: Case) -> Result<Self> {
        Self::CONSTANTS
            .iter()
            .find(|(_, canonical)| case.matches(canonical, name))
            .map(|(constant, _)| *constant)
            .ok_or_else(|| Error::UnknownSymbol {
                kind: Self::KIND,
                symbol: name.to_string(),
            })
    }
}

/// A bitmask whose individual bits have canonical names
///
/// The text form is the names of the set bits joined by `|`, in definition
/// order. Bits without a name are rendered as a single trailing `0x...` token
/// so that the string form is lossless.
pub trait FriendlyIntList:
    Copy + Eq + fmt::Display + BitOr<Output = Self> + BitAnd<Output = Self> + 'static
{
    const KIND: &'static str;
    /// Single-bit named flags in definition order
    const FLAGS: &'static [(Self, &'static str)];

    fn bits(self) -> u64;

    /// Returns `None` if `bits` does not fit the underlying integer.
    fn from_bits(bits: u64) -> Option<Self>;

    fn empty() -> Self;

    fn try_from_bits(bits: u64) -> Result<Self> {
        Self::from_bits(bits).ok_or(Error::OutOfRange {
            kind: Self::KIND,
            value: bits,
        })
    }

    fn iter() -> impl Iterator<Item = (Self, &'static str)> {
        Self::FLAGS.iter().copied()
    }

    fn is_empty(self) -> bool {
        self.bits() == 0
    }

    fn intersects(self, other: Self) -> bool {
        self.bits() & other.bits() != 0
    }

    /// Bits that are set but not covered by any named flag.
    fn unnamed_bits(self) -> u64 {
        let named = Self::iter().fold(0, |acc, (flag, _)| acc | flag.bits());
        self.bits() & !named
    }

    /// Parse a `|`-delimited list of flag names.
    ///
    /// Whitespace around names and empty names are ignored, so `""` is the
    /// empty mask. A `0x` token contributes raw bits.
    fn parse(text: &str, case: Case) -> Result<Self> {
        let unknown = |token: &str| Error::UnknownSymbol {
            kind: Self::KIND,
            symbol: token.to_string(),
        };
        let mut bits = 0;
        for token in text.split('|').map(str::trim).filter(|t| !t.is_empty()) {
            if let Some((flag, _)) = Self::iter().find(|(_, name)| case.matches(name, token)) {
                bits |= flag.bits();
                continue;
            }
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .ok_or_else(|| unknown(token))?;
            bits |= u64::from_str_radix(digits, 16).map_err(|_| unknown(token))?;
        }
        Self::try_from_bits(bits)
    }
}

pub(crate) fn fmt_flags<T: FriendlyIntList>(val: T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut sep = "";
    for (flag, name) in T::iter() {
        if flag.intersects(val) {
            write!(f, "{sep}{name}")?;
            sep = "|";
        }
    }
    let rest = val.unnamed_bits();
    if rest != 0 {
        write!(f, "{sep}0x{rest:x}")?;
    }
    Ok(())
}

/// A TPM2B structure holding a plain byte buffer
pub trait SimpleBuffer: Default {
    const KIND: &'static str;
    /// Largest buffer the TPM structure can carry
    const MAX_SIZE: usize;

    fn buffer(&self) -> &[u8];

    fn buffer_mut(&mut self) -> &mut Vec<u8>;

    fn len(&self) -> usize {
        self.buffer().len()
    }

    fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Replace the contents, rejecting data larger than [`Self::MAX_SIZE`].
    fn set_buffer(&mut self, data: Vec<u8>) -> Result<()> {
        if data.len() > Self::MAX_SIZE {
            return Err(Error::BufferTooLarge {
                kind: Self::KIND,
                size: data.len(),
                max: Self::MAX_SIZE,
            });
        }
        *self.buffer_mut() = data;
        Ok(())
    }
}

/// Declare a newtype over an unsigned integer with named constants.
macro_rules! friendly_int {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) as $kind:literal {
            $( $konst:ident = $value:literal => $text:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $repr);

        impl $name {
            $( pub const $konst: Self = Self($value); )*
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }

        impl $crate::friendly::FriendlyInt for $name {
            const KIND: &'static str = $kind;
            const CONSTANTS: &'static [(Self, &'static str)] = &[$( (Self::$konst, $text), )*];

            fn to_u64(self) -> u64 {
                self.0.into()
            }

            fn from_u64(value: u64) -> Option<Self> {
                <$repr>::try_from(value).ok().map(Self)
            }
        }

        impl $crate::encoding::Encode for $name {
            fn encode_with<E: $crate::encoding::EncDec>(
                &self,
                enc: &E,
            ) -> $crate::encoding::Result<::serde_json::Value> {
                enc.encode_friendly_int(self)
            }
        }

        impl $crate::encoding::Decode for $name {
            fn decode_with<E: $crate::encoding::EncDec>(
                self,
                dec: &E,
                src: &::serde_json::Value,
            ) -> $crate::encoding::Result<Self> {
                dec.decode_friendly_int(self, src)
            }
        }
    };
}

/// Declare a bitmask newtype whose single bits have names.
macro_rules! friendly_intlist {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($repr:ty) as $kind:literal {
            $( $konst:ident = $value:expr => $text:literal, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub $repr);

        impl $name {
            $( pub const $konst: Self = Self($value); )*

            /// Whether every bit of `other` is set in `self`.
            pub fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl $crate::friendly::FriendlyIntList for $name {
            const KIND: &'static str = $kind;
            const FLAGS: &'static [(Self, &'static str)] = &[$( (Self::$konst, $text), )*];

            fn bits(self) -> u64 {
                self.0.into()
            }

            fn from_bits(bits: u64) -> Option<Self> {
                <$repr>::try_from(bits).ok().map(Self)
            }

            fn empty() -> Self {
                Self(0)
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl ::std::ops::BitAnd for $name {
            type Output = Self;

            fn bitand(self, rhs: Self) -> Self {
                Self(self.0 & rhs.0)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $crate::friendly::fmt_flags(*self, f)
            }
        }

        impl $crate::encoding::Encode for $name {
            fn encode_with<E: $crate::encoding::EncDec>(
                &self,
                enc: &E,
            ) -> $crate::encoding::Result<::serde_json::Value> {
                enc.encode_friendly_intlist(self)
            }
        }

        impl $crate::encoding::Decode for $name {
            fn decode_with<E: $crate::encoding::EncDec>(
                self,
                dec: &E,
                src: &::serde_json::Value,
            ) -> $crate::encoding::Result<Self> {
                dec.decode_friendly_intlist(self, src)
            }
        }
    };
}

/// Declare a TPM2B byte buffer with a fixed maximum size.
macro_rules! simple_tpm2b {
    (
        $(#[$meta:meta])*
        pub struct $name:ident as $kind:literal, max = $max:expr;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            pub buffer: Vec<u8>,
        }

        impl $name {
            pub fn new(data: Vec<u8>) -> Self {
                Self { buffer: data }
            }

            pub fn empty() -> Self {
                Self { buffer: Vec::new() }
            }
        }

        impl $crate::friendly::SimpleBuffer for $name {
            const KIND: &'static str = $kind;
            const MAX_SIZE: usize = $max;

            fn buffer(&self) -> &[u8] {
                &self.buffer
            }

            fn buffer_mut(&mut self) -> &mut Vec<u8> {
                &mut self.buffer
            }
        }

        impl $crate::encoding::Encode for $name {
            fn encode_with<E: $crate::encoding::EncDec>(
                &self,
                enc: &E,
            ) -> $crate::encoding::Result<::serde_json::Value> {
                enc.encode_simple_tpm2b(self)
            }
        }

        impl $crate::encoding::Decode for $name {
            fn decode_with<E: $crate::encoding::EncDec>(
                self,
                dec: &E,
                src: &::serde_json::Value,
            ) -> $crate::encoding::Result<Self> {
                dec.decode_simple_tpm2b(self, src)
            }
        }
    };
}
