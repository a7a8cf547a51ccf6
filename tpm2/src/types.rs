// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! TPM 2.0 data types

use serde_json::Value;

use super::constants::*;
use super::encoding::*;

/// Number of PCRs a selection bitmap can address
pub const MAX_PCRS: u32 = 32;

simple_tpm2b! {
    /// TPM2B_DIGEST - Variable length digest
    pub struct Tpm2bDigest as "TPM2B_DIGEST", max = 64;
}

/// TPM2B_NONCE - Nonce value
pub type Tpm2bNonce = Tpm2bDigest;

simple_tpm2b! {
    /// TPM2B_DATA - Variable length data
    pub struct Tpm2bData as "TPM2B_DATA", max = 66;
}

simple_tpm2b! {
    /// TPM2B_AUTH - Authorization value
    pub struct Tpm2bAuth as "TPM2B_AUTH", max = 64;
}

simple_tpm2b! {
    /// TPM2B_SENSITIVE_DATA - Sensitive data for sealing
    pub struct Tpm2bSensitiveData as "TPM2B_SENSITIVE_DATA", max = 128;
}

simple_tpm2b! {
    /// TPM2B_MAX_NV_BUFFER - NV buffer
    pub struct Tpm2bMaxNvBuffer as "TPM2B_MAX_NV_BUFFER", max = 2048;
}

fn pcr_bitmap(pcrs: &[u32]) -> Vec<u8> {
    // At least 3 bytes for PCR 0-23
    let max_pcr = pcrs.iter().max().copied().unwrap_or(0);
    let size = ((max_pcr / 8) + 1).max(3) as usize;
    let mut pcr_select = vec![0u8; size];

    for &pcr in pcrs {
        let byte_idx = (pcr / 8) as usize;
        let bit_idx = pcr % 8;
        if byte_idx < pcr_select.len() {
            pcr_select[byte_idx] |= 1 << bit_idx;
        }
    }
    pcr_select
}

/// TPMS_PCR_SELECTION - PCR selection for a single hash algorithm
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmsPcrSelection {
    pub hash: TpmAlgId,
    pub pcr_select: Vec<u8>, // Bitmap of selected PCRs
}

impl TpmsPcrSelection {
    const KIND: &'static str = "TPMS_PCR_SELECTION";
    const FIELDS: &'static [&'static str] = &["hash", "pcrSelect"];

    pub fn new(hash: TpmAlgId, pcrs: &[u32]) -> Self {
        Self {
            hash,
            pcr_select: pcr_bitmap(pcrs),
        }
    }

    pub fn sha256(pcrs: &[u32]) -> Self {
        Self::new(TpmAlgId::SHA256, pcrs)
    }

    /// Selected PCR indices in ascending order
    pub fn pcrs(&self) -> Vec<u32> {
        self.pcr_select
            .iter()
            .enumerate()
            .flat_map(|(byte_idx, &byte)| {
                (0..8)
                    .filter(move |bit| byte & (1 << bit) != 0)
                    .map(move |bit| (byte_idx * 8 + bit) as u32)
            })
            .collect()
    }
}

impl Encode for TpmsPcrSelection {
    fn encode_with<E: EncDec>(&self, enc: &E) -> Result<Value> {
        Ok(FieldsEncoder::new()
            .field(enc, "hash", &self.hash)?
            .raw("pcrSelect", Value::from(self.pcrs()))
            .finish())
    }
}

impl Decode for TpmsPcrSelection {
    fn decode_with<E: EncDec>(mut self, dec: &E, src: &Value) -> Result<Self> {
        decode_fields(dec, Self::KIND, Self::FIELDS, src, |field, value| {
            match field {
                "hash" => self.hash = dec.decode(self.hash, value)?,
                _ => {
                    let Value::Array(items) = value else {
                        return Err(Error::mismatch("array of PCR indices", value));
                    };
                    let pcrs = items
                        .iter()
                        .map(|item| match unsigned(item)? {
                            pcr if pcr < u64::from(MAX_PCRS) => Ok(pcr as u32),
                            pcr => Err(Error::InvalidPcr { pcr }),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    self.pcr_select = pcr_bitmap(&pcrs);
                }
            }
            Ok(())
        })?;
        Ok(self)
    }
}

/// TPML_PCR_SELECTION - List of PCR selections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmlPcrSelection {
    pub pcr_selections: Vec<TpmsPcrSelection>,
}

impl TpmlPcrSelection {
    pub fn new(selections: Vec<TpmsPcrSelection>) -> Self {
        Self {
            pcr_selections: selections,
        }
    }

    pub fn single(hash: TpmAlgId, pcrs: &[u32]) -> Self {
        Self {
            pcr_selections: vec![TpmsPcrSelection::new(hash, pcrs)],
        }
    }
}

impl Encode for TpmlPcrSelection {
    fn encode_with<E: EncDec>(&self, enc: &E) -> Result<Value> {
        self.pcr_selections.encode_with(enc)
    }
}

impl Decode for TpmlPcrSelection {
    fn decode_with<E: EncDec>(self, dec: &E, src: &Value) -> Result<Self> {
        let Value::Array(items) = src else {
            return Err(Error::mismatch("array", src));
        };
        let pcr_selections = items
            .iter()
            .map(|item| dec.decode(TpmsPcrSelection::default(), item))
            .collect::<Result<_>>()?;
        Ok(Self { pcr_selections })
    }
}

/// TPMS_NV_PUBLIC - NV index public area
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpmsNvPublic {
    pub nv_index: u32,
    pub name_alg: TpmAlgId,
    pub attributes: TpmaNv,
    pub auth_policy: Tpm2bDigest,
    pub data_size: u16,
}

impl TpmsNvPublic {
    const KIND: &'static str = "TPMS_NV_PUBLIC";
    const FIELDS: &'static [&'static str] =
        &["nvIndex", "nameAlg", "attributes", "authPolicy", "dataSize"];

    pub fn new(nv_index: u32, data_size: u16, attributes: TpmaNv) -> Self {
        Self {
            nv_index,
            name_alg: TpmAlgId::SHA256,
            attributes,
            auth_policy: Tpm2bDigest::empty(),
            data_size,
        }
    }
}

impl Encode for TpmsNvPublic {
    fn encode_with<E: EncDec>(&self, enc: &E) -> Result<Value> {
        Ok(FieldsEncoder::new()
            .field(enc, "nvIndex", &self.nv_index)?
            .field(enc, "nameAlg", &self.name_alg)?
            .field(enc, "attributes", &self.attributes)?
            .field(enc, "authPolicy", &self.auth_policy)?
            .field(enc, "dataSize", &self.data_size)?
            .finish())
    }
}

impl Decode for TpmsNvPublic {
    fn decode_with<E: EncDec>(mut self, dec: &E, src: &Value) -> Result<Self> {
        decode_fields(dec, Self::KIND, Self::FIELDS, src, |field, value| {
            match field {
                "nvIndex" => self.nv_index = dec.decode(self.nv_index, value)?,
                "nameAlg" => self.name_alg = dec.decode(self.name_alg, value)?,
                "attributes" => self.attributes = dec.decode(self.attributes, value)?,
                "authPolicy" => {
                    let dst = std::mem::take(&mut self.auth_policy);
                    self.auth_policy = dec.decode(dst, value)?;
                }
                _ => self.data_size = dec.decode(self.data_size, value)?,
            }
            Ok(())
        })?;
        Ok(self)
    }
}
