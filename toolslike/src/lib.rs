// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Encode TPM types in a tpm2-tools like manner
//!
//! - Constants become their lowercase name (`"sha256"`), or a plain integer
//!   when the value has no name.
//! - Attribute bitmasks become `"userwithauth|sign"`, or
//!   `["userwithauth", "sign"]` with [`Options::use_lists`].
//! - TPM2B buffers become `"0x"`-prefixed hex, or `null` when empty.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use tpm2::{TpmAlgId, TpmaObject};
//! use tpm2_toolslike::{EncDec, ToolsLike};
//!
//! let codec = ToolsLike::default();
//! let attrs = TpmaObject::USER_WITH_AUTH | TpmaObject::SIGN_ENCRYPT;
//! assert_eq!(codec.encode(&attrs)?, json!("userwithauth|sign"));
//! assert_eq!(codec.decode(TpmAlgId::default(), &json!("sha256"))?, TpmAlgId::SHA256);
//! # Ok::<(), tpm2_toolslike::Error>(())
//! ```

use serde_json::Value;
use tpm2::encoding::unsigned;
use tpm2::{FriendlyInt, FriendlyIntList, SimpleBuffer};

pub use options::Options;
pub use tpm2::{Decode, EncDec, Encode, Error, Result};

mod options;

/// tpm2-tools style encoder/decoder
///
/// The options are fixed at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolsLike {
    options: Options,
}

impl ToolsLike {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn use_lists(&self) -> bool {
        self.options.use_lists
    }
}

impl From<Options> for ToolsLike {
    fn from(options: Options) -> Self {
        Self::new(options)
    }
}

impl EncDec for ToolsLike {
    fn strict(&self) -> bool {
        self.options.strict
    }

    fn case_insensitive(&self) -> bool {
        self.options.case_insensitive
    }

    fn encode_friendly_int<T: FriendlyInt>(&self, val: &T) -> Result<Value> {
        Ok(match val.name() {
            Some(name) => Value::from(name),
            None => Value::from(val.to_u64()),
        })
    }

    fn encode_friendly_intlist<T: FriendlyIntList>(&self, val: &T) -> Result<Value> {
        if !self.use_lists() {
            return Ok(Value::String(val.to_string()));
        }
        // Bits without a name are dropped in list form
        let names = T::iter()
            .filter(|(flag, _)| flag.intersects(*val))
            .map(|(_, name)| Value::from(name))
            .collect();
        Ok(Value::Array(names))
    }

    fn encode_simple_tpm2b<T: SimpleBuffer>(&self, val: &T) -> Result<Value> {
        if val.is_empty() {
            return Ok(Value::Null);
        }
        Ok(Value::String(format!("0x{}", hex::encode(val.buffer()))))
    }

    fn decode_friendly_int<T: FriendlyInt>(&self, _dst: T, src: &Value) -> Result<T> {
        match src {
            Value::String(name) => T::parse(name, self.case()),
            Value::Number(_) => T::try_from_u64(unsigned(src)?),
            other => Err(Error::mismatch("constant name or integer", other)),
        }
    }

    fn decode_friendly_intlist<T: FriendlyIntList>(&self, _dst: T, src: &Value) -> Result<T> {
        let case = self.case();
        match src {
            Value::Array(items) => items.iter().try_fold(T::empty(), |attrs, item| match item {
                Value::String(name) => Ok(attrs | T::parse(name, case)?),
                other => Err(Error::mismatch("attribute name", other)),
            }),
            Value::String(text) => T::parse(text, case),
            Value::Number(_) => T::try_from_bits(unsigned(src)?),
            other => Err(Error::mismatch("attribute string, list or integer", other)),
        }
    }

    fn decode_simple_tpm2b<T: SimpleBuffer>(&self, mut dst: T, src: &Value) -> Result<T> {
        let data = match src {
            Value::Null => Vec::new(),
            Value::String(text) => {
                let digits = text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                    .unwrap_or(text);
                hex::decode(digits)?
            }
            other => return Err(Error::mismatch("hex string", other)),
        };
        dst.set_buffer(data)?;
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tpm2::{Tpm2bDigest, TpmAlgId, TpmRh, TpmaNv, TpmaObject};

    fn with_lists() -> ToolsLike {
        ToolsLike::new(Options {
            use_lists: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_enc_friendly_int() {
        let enc = ToolsLike::default();
        assert_eq!(enc.encode(&TpmRh::OWNER).unwrap(), json!("owner"));

        let unnamed = TpmAlgId(TpmAlgId::LAST.0 + 1);
        assert_eq!(enc.encode(&unnamed).unwrap(), json!(0x45));
    }

    #[test]
    fn test_enc_friendly_intlist() {
        let enc = ToolsLike::default();
        let attrs = TpmaObject::USER_WITH_AUTH | TpmaObject::SIGN_ENCRYPT;
        assert_eq!(enc.encode(&attrs).unwrap(), json!("userwithauth|sign"));
    }

    #[test]
    fn test_enc_friendly_intlist_lists() {
        let enc = with_lists();
        let attrs = TpmaObject::SIGN_ENCRYPT | TpmaObject::FIXED_TPM | TpmaObject::USER_WITH_AUTH;
        assert_eq!(
            enc.encode(&attrs).unwrap(),
            json!(["fixedtpm", "userwithauth", "sign"])
        );
        assert_eq!(enc.encode(&TpmaObject::default()).unwrap(), json!([]));
    }

    #[test]
    fn test_enc_lists_drops_unnamed_bits() {
        let enc = with_lists();
        let attrs = TpmaObject::DECRYPT | TpmaObject(1 << 30);
        assert_eq!(enc.encode(&attrs).unwrap(), json!(["decrypt"]));

        // The string form keeps them
        let enc = ToolsLike::default();
        assert_eq!(enc.encode(&attrs).unwrap(), json!("decrypt|0x40000000"));
    }

    #[test]
    fn test_enc_simple_tpm2b() {
        let enc = ToolsLike::default();
        let digest = Tpm2bDigest::new(vec![0x01, 0x02, 0x03, 0x04]);
        assert_eq!(enc.encode(&digest).unwrap(), json!("0x01020304"));
        assert_eq!(enc.encode(&Tpm2bDigest::empty()).unwrap(), Value::Null);
    }

    #[test]
    fn test_enc_does_not_touch_value() {
        let enc = ToolsLike::default();
        let digest = Tpm2bDigest::new(vec![0xde, 0xad]);
        let before = digest.clone();
        enc.encode(&digest).unwrap();
        assert_eq!(digest, before);
    }

    #[test]
    fn test_dec_friendly_int() {
        let dec = ToolsLike::default();
        let alg = dec.decode(TpmAlgId::default(), &json!("sha256")).unwrap();
        assert_eq!(alg, TpmAlgId::SHA256);

        let alg = dec
            .decode(TpmAlgId::default(), &json!(TpmAlgId::SHA256.0))
            .unwrap();
        assert_eq!(alg, TpmAlgId::SHA256);
    }

    #[test]
    fn test_dec_friendly_int_errors() {
        let dec = ToolsLike::default();
        assert!(matches!(
            dec.decode(TpmAlgId::default(), &json!("not_a_real_alg")),
            Err(Error::UnknownSymbol { kind: "TPM2_ALG", .. })
        ));
        assert!(matches!(
            dec.decode(TpmAlgId::default(), &json!(0x1_0000)),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            dec.decode(TpmAlgId::default(), &json!(-1)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            dec.decode(TpmAlgId::default(), &json!(true)),
            Err(Error::TypeMismatch {
                found: "boolean",
                ..
            })
        ));
    }

    #[test]
    fn test_dec_case_sensitivity() {
        let dec = ToolsLike::default();
        assert_eq!(
            dec.decode(TpmAlgId::default(), &json!("SHA256")).unwrap(),
            TpmAlgId::SHA256
        );
        assert_eq!(
            dec.decode(TpmaObject::default(), &json!("UserWithAuth|SIGN"))
                .unwrap(),
            TpmaObject::USER_WITH_AUTH | TpmaObject::SIGN_ENCRYPT
        );

        let dec = ToolsLike::new(Options {
            case_insensitive: false,
            ..Default::default()
        });
        assert!(matches!(
            dec.decode(TpmAlgId::default(), &json!("SHA256")),
            Err(Error::UnknownSymbol { .. })
        ));
        assert!(matches!(
            dec.decode(TpmaObject::default(), &json!(["Sign"])),
            Err(Error::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn test_dec_friendly_intlist() {
        let dec = ToolsLike::default();
        let expected = TpmaObject::USER_WITH_AUTH | TpmaObject::SIGN_ENCRYPT;

        let attrs = dec
            .decode(TpmaObject::default(), &json!("userwithauth|sign"))
            .unwrap();
        assert_eq!(attrs, expected);

        let attrs = dec
            .decode(TpmaObject::default(), &json!(expected.0))
            .unwrap();
        assert_eq!(attrs, expected);

        let attrs = dec
            .decode(TpmaObject::default(), &json!(["userwithauth", "sign"]))
            .unwrap();
        assert_eq!(attrs, expected);
    }

    #[test]
    fn test_dec_friendly_intlist_errors() {
        let dec = ToolsLike::default();
        assert!(matches!(
            dec.decode(TpmaObject::default(), &json!("not_a_real_flag")),
            Err(Error::UnknownSymbol { ref symbol, .. }) if symbol == "not_a_real_flag"
        ));
        assert!(matches!(
            dec.decode(TpmaObject::default(), &json!(["sign", 4])),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            dec.decode(TpmaNv::default(), &json!(null)),
            Err(Error::TypeMismatch { found: "null", .. })
        ));
    }

    #[test]
    fn test_dec_simple_tpm2b() {
        let dec = ToolsLike::default();
        let digest = dec.decode(Tpm2bDigest::empty(), &json!("ffff")).unwrap();
        assert_eq!(digest, Tpm2bDigest::new(vec![0xff, 0xff]));

        let digest = dec.decode(Tpm2bDigest::empty(), &json!("0xAAAA")).unwrap();
        assert_eq!(digest, Tpm2bDigest::new(vec![0xaa, 0xaa]));

        let digest = dec.decode(Tpm2bDigest::empty(), &json!("0Xaa")).unwrap();
        assert_eq!(digest, Tpm2bDigest::new(vec![0xaa]));

        let digest = dec
            .decode(Tpm2bDigest::new(vec![1, 2, 3]), &Value::Null)
            .unwrap();
        assert!(digest.is_empty());
    }

    #[test]
    fn test_dec_simple_tpm2b_errors() {
        let dec = ToolsLike::default();
        assert!(matches!(
            dec.decode(Tpm2bDigest::empty(), &json!("0xGG")),
            Err(Error::MalformedHex(_))
        ));
        assert!(matches!(
            dec.decode(Tpm2bDigest::empty(), &json!("abc")),
            Err(Error::MalformedHex(hex::FromHexError::OddLength))
        ));
        assert!(matches!(
            dec.decode(Tpm2bDigest::empty(), &json!("00".repeat(65))),
            Err(Error::BufferTooLarge { max: 64, .. })
        ));
        assert!(matches!(
            dec.decode(Tpm2bDigest::empty(), &json!(1234)),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
