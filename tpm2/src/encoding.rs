// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Pluggable text encoding for TPM types
//!
//! An [`EncDec`] implementation decides how each value category is rendered.
//! Every TPM type implements [`Encode`] and [`Decode`] by forwarding to the
//! `EncDec` method for its category, so dispatch is resolved at compile time.
//! Composite structures encode as JSON objects keyed by field name and
//! recurse into their fields.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::friendly::{Case, FriendlyInt, FriendlyIntList, SimpleBuffer};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown {kind} symbol: {symbol:?}")]
    UnknownSymbol { kind: &'static str, symbol: String },
    #[error("malformed hex string: {0}")]
    MalformedHex(#[from] hex::FromHexError),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("value 0x{value:x} out of range for {kind}")]
    OutOfRange { kind: &'static str, value: u64 },
    #[error("{size} bytes exceeds the {kind} maximum of {max}")]
    BufferTooLarge {
        kind: &'static str,
        size: usize,
        max: usize,
    },
    #[error("unknown field {field:?} in {kind}")]
    UnknownField { kind: &'static str, field: String },
    #[error("invalid PCR index {pcr}")]
    InvalidPcr { pcr: u64 },
}

impl Error {
    pub fn mismatch(expected: &'static str, found: &Value) -> Self {
        let found = match found {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Error::TypeMismatch { expected, found }
    }
}

/// Read an unsigned integer, rejecting negative and fractional numbers.
pub fn unsigned(src: &Value) -> Result<u64> {
    src.as_u64()
        .ok_or_else(|| Error::mismatch("unsigned integer", src))
}

/// An encoder/decoder for the three TPM value categories
pub trait EncDec {
    /// Whether unknown fields of composite structures are an error.
    fn strict(&self) -> bool;

    /// Whether symbolic names and field names match regardless of case.
    fn case_insensitive(&self) -> bool;

    fn case(&self) -> Case {
        Case::from_insensitive(self.case_insensitive())
    }

    fn encode_friendly_int<T: FriendlyInt>(&self, val: &T) -> Result<Value>;

    fn encode_friendly_intlist<T: FriendlyIntList>(&self, val: &T) -> Result<Value>;

    fn encode_simple_tpm2b<T: SimpleBuffer>(&self, val: &T) -> Result<Value>;

    /// `dst` only selects the target type.
    fn decode_friendly_int<T: FriendlyInt>(&self, dst: T, src: &Value) -> Result<T>;

    /// `dst` only selects the target type.
    fn decode_friendly_intlist<T: FriendlyIntList>(&self, dst: T, src: &Value) -> Result<T>;

    /// Decodes into `dst` and hands it back.
    fn decode_simple_tpm2b<T: SimpleBuffer>(&self, dst: T, src: &Value) -> Result<T>;

    fn encode<T: Encode + ?Sized>(&self, val: &T) -> Result<Value>
    where
        Self: Sized,
    {
        val.encode_with(self)
    }

    fn decode<T: Decode>(&self, dst: T, src: &Value) -> Result<T>
    where
        Self: Sized,
    {
        dst.decode_with(self, src)
    }
}

/// Types that can be rendered by an [`EncDec`]
pub trait Encode {
    fn encode_with<E: EncDec>(&self, enc: &E) -> Result<Value>;
}

/// Types that can be rebuilt by an [`EncDec`]
///
/// The receiver is the destination: it fixes the type and, for buffers and
/// structures, supplies the value that decoded fields are written into.
pub trait Decode: Sized {
    fn decode_with<E: EncDec>(self, dec: &E, src: &Value) -> Result<Self>;
}

macro_rules! impl_plain_int {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn encode_with<E: EncDec>(&self, _enc: &E) -> Result<Value> {
                    Ok(Value::from(*self))
                }
            }

            impl Decode for $ty {
                fn decode_with<E: EncDec>(self, _dec: &E, src: &Value) -> Result<Self> {
                    let value = unsigned(src)?;
                    <$ty>::try_from(value).map_err(|_| Error::OutOfRange {
                        kind: stringify!($ty),
                        value,
                    })
                }
            }
        )*
    };
}

impl_plain_int!(u8, u16, u32, u64);

impl<T: Encode> Encode for [T] {
    fn encode_with<E: EncDec>(&self, enc: &E) -> Result<Value> {
        self.iter()
            .map(|item| item.encode_with(enc))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

/// Builds the object form of a composite structure.
#[derive(Debug, Default)]
pub(crate) struct FieldsEncoder {
    map: Map<String, Value>,
}

impl FieldsEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field; null encodings are left out.
    pub fn field<E: EncDec, T: Encode + ?Sized>(
        mut self,
        enc: &E,
        name: &str,
        val: &T,
    ) -> Result<Self> {
        let value = enc.encode(val)?;
        if !value.is_null() {
            self.map.insert(name.to_string(), value);
        }
        Ok(self)
    }

    pub fn raw(mut self, name: &str, value: Value) -> Self {
        self.map.insert(name.to_string(), value);
        self
    }

    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

/// Walk the keys of an object, resolving each to one of `fields`.
///
/// Unknown keys fail in strict mode and are skipped otherwise.
pub(crate) fn decode_fields<E: EncDec>(
    dec: &E,
    kind: &'static str,
    fields: &[&'static str],
    src: &Value,
    mut apply: impl FnMut(&'static str, &Value) -> Result<()>,
) -> Result<()> {
    let Value::Object(map) = src else {
        return Err(Error::mismatch("object", src));
    };
    let case = dec.case();
    for (key, value) in map {
        match fields.iter().find(|field| case.matches(field, key)) {
            Some(&field) => apply(field, value)?,
            None if dec.strict() => {
                return Err(Error::UnknownField {
                    kind,
                    field: key.clone(),
                })
            }
            None => debug!("ignoring unknown field {key:?} in {kind}"),
        }
    }
    Ok(())
}
