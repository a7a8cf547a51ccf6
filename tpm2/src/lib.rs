// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! TPM 2.0 value types with a pluggable text encoding
//!
//! This crate provides the TPM constants, attribute bitmasks and TPM2B
//! buffers that configuration files and command-line tools talk about, along
//! with the [`EncDec`] seam that decides how they are rendered as text.
//!
//! ## Value categories
//!
//! - **Friendly ints** ([`FriendlyInt`]): `TpmAlgId`, `TpmRh`, `TpmEccCurve`, ...
//! - **Friendly int lists** ([`FriendlyIntList`]): `TpmaObject`, `TpmaNv`, ...
//! - **Simple buffers** ([`SimpleBuffer`]): `Tpm2bDigest`, `Tpm2bAuth`, ...
//!
//! Composite structures (`TpmsNvPublic`, `TpmsPcrSelection`, ...) encode as
//! objects keyed by field name.
//!
//! ## Example
//!
//! ```
//! use tpm2::{Case, FriendlyIntList, TpmaObject};
//!
//! let attrs = TpmaObject::parse("userwithauth|sign", Case::Insensitive)?;
//! assert_eq!(attrs, TpmaObject::USER_WITH_AUTH | TpmaObject::SIGN_ENCRYPT);
//! assert_eq!(attrs.to_string(), "userwithauth|sign");
//! # Ok::<(), tpm2::Error>(())
//! ```

#[macro_use]
mod friendly;
mod constants;
pub mod encoding;
mod types;

pub use constants::*;
pub use encoding::{Decode, EncDec, Encode, Error, Result};
pub use friendly::{Case, FriendlyInt, FriendlyIntList, SimpleBuffer};
pub use types::*;
