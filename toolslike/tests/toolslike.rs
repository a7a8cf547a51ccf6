// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Value};
use tpm2::{
    FriendlyInt, FriendlyIntList, Tpm2bAuth, Tpm2bDigest, TpmAlgId, TpmEccCurve, TpmRh, TpmSt,
    TpmaLocality, TpmaNv, TpmaObject, TpmaSession, TpmlPcrSelection, TpmsNvPublic,
    TpmsPcrSelection,
};
use tpm2_toolslike::{EncDec, Error, Options, ToolsLike};

fn codec(use_lists: bool, strict: bool, case_insensitive: bool) -> ToolsLike {
    ToolsLike::new(Options {
        use_lists,
        strict,
        case_insensitive,
    })
}

fn roundtrip_constants<T>()
where
    T: FriendlyInt + tpm2::Encode + tpm2::Decode + Default + std::fmt::Debug,
{
    for case_insensitive in [true, false] {
        let c = codec(false, false, case_insensitive);
        for &(constant, name) in T::CONSTANTS {
            let text = c.encode(&constant).unwrap();
            assert_eq!(text, json!(name));
            assert_eq!(c.decode(T::default(), &text).unwrap(), constant);
        }
    }
}

fn roundtrip_flags<T>()
where
    T: FriendlyIntList + tpm2::Encode + tpm2::Decode + Default + std::fmt::Debug,
{
    let all = T::iter().fold(T::empty(), |acc, (flag, _)| acc | flag);
    let mut samples = vec![T::empty(), all];
    samples.extend(T::iter().map(|(flag, _)| flag));
    samples.extend(T::iter().zip(T::iter().skip(1)).map(|((a, _), (b, _))| a | b));

    for use_lists in [false, true] {
        let c = codec(use_lists, false, true);
        for &val in &samples {
            let text = c.encode(&val).unwrap();
            assert_eq!(text.is_array(), use_lists);
            assert_eq!(c.decode(T::default(), &text).unwrap(), val, "{text}");
        }
    }
}

#[test]
fn named_constants_roundtrip() {
    roundtrip_constants::<TpmAlgId>();
    roundtrip_constants::<TpmRh>();
    roundtrip_constants::<TpmEccCurve>();
    roundtrip_constants::<TpmSt>();
}

#[test]
fn unnamed_constant_roundtrip() {
    let c = ToolsLike::default();
    let val = TpmRh(0x40000100);
    let text = c.encode(&val).unwrap();
    assert_eq!(text, json!(0x40000100u32));
    assert_eq!(c.decode(TpmRh::default(), &text).unwrap(), val);
}

#[test]
fn flag_lists_roundtrip() {
    roundtrip_flags::<TpmaObject>();
    roundtrip_flags::<TpmaNv>();
    roundtrip_flags::<TpmaSession>();
    roundtrip_flags::<TpmaLocality>();
}

#[test]
fn unnamed_bits_survive_string_mode() {
    let c = ToolsLike::default();
    let val = TpmaNv::OWNER_READ | TpmaNv(0xf0);
    let text = c.encode(&val).unwrap();
    assert_eq!(text, json!("ownerread|0xf0"));
    assert_eq!(c.decode(TpmaNv::default(), &text).unwrap(), val);
}

#[test]
fn buffers_roundtrip() {
    let c = ToolsLike::default();
    let auth = Tpm2bAuth::new(b"secret".to_vec());
    let text = c.encode(&auth).unwrap();
    assert_eq!(text, json!("0x736563726574"));
    assert_eq!(c.decode(Tpm2bAuth::default(), &text).unwrap(), auth);

    let empty = c.encode(&Tpm2bAuth::empty()).unwrap();
    assert!(empty.is_null());
    assert_eq!(c.decode(Tpm2bAuth::default(), &empty).unwrap(), Tpm2bAuth::empty());
}

fn sample_nv_public() -> TpmsNvPublic {
    let mut public = TpmsNvPublic::new(
        0x01800001,
        32,
        TpmaNv::OWNER_WRITE | TpmaNv::OWNER_READ | TpmaNv::NO_DA,
    );
    public.auth_policy = Tpm2bDigest::new(vec![0x11; 32]);
    public
}

#[test]
fn nv_public_encode() {
    let c = ToolsLike::default();
    let text = c.encode(&sample_nv_public()).unwrap();
    assert_eq!(
        text,
        json!({
            "nvIndex": 0x01800001u32,
            "nameAlg": "sha256",
            "attributes": "ownerwrite|ownerread|no_da",
            "authPolicy": format!("0x{}", "11".repeat(32)),
            "dataSize": 32,
        })
    );

    let lists = codec(true, false, true);
    let text = lists.encode(&TpmsNvPublic::new(1, 8, TpmaNv::AUTH_READ)).unwrap();
    assert_eq!(text["attributes"], json!(["authread"]));
    // Empty buffers are left out
    assert!(text.get("authPolicy").is_none());
}

#[test]
fn nv_public_roundtrip() {
    for use_lists in [false, true] {
        let c = codec(use_lists, true, false);
        let public = sample_nv_public();
        let text = c.encode(&public).unwrap();
        assert_eq!(c.decode(TpmsNvPublic::default(), &text).unwrap(), public);
    }
}

#[test]
fn structure_field_case() {
    let src = json!({ "NVINDEX": 7, "namealg": "SHA1" });

    let c = ToolsLike::default();
    let public = c.decode(TpmsNvPublic::default(), &src).unwrap();
    assert_eq!(public.nv_index, 7);
    assert_eq!(public.name_alg, TpmAlgId::SHA1);

    // Case-sensitive and lenient: the keys are unknown and skipped
    let c = codec(false, false, false);
    let public = c.decode(TpmsNvPublic::default(), &src).unwrap();
    assert_eq!(public, TpmsNvPublic::default());
}

#[test]
fn structure_unknown_fields() {
    let src = json!({ "nvIndex": 7, "comment": "scratch space" });

    let lenient = ToolsLike::default();
    let public = lenient.decode(TpmsNvPublic::default(), &src).unwrap();
    assert_eq!(public.nv_index, 7);

    let strict = codec(false, true, true);
    let err = strict.decode(TpmsNvPublic::default(), &src).unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownField { kind: "TPMS_NV_PUBLIC", ref field } if field == "comment"
    ));
}

#[test]
fn structure_keeps_absent_fields() {
    let c = ToolsLike::default();
    let public = c
        .decode(sample_nv_public(), &json!({ "dataSize": 64 }))
        .unwrap();
    assert_eq!(public.data_size, 64);
    assert_eq!(public.nv_index, 0x01800001);
    assert_eq!(public.auth_policy, sample_nv_public().auth_policy);
}

#[test]
fn structure_errors_propagate() {
    let c = ToolsLike::default();
    assert!(matches!(
        c.decode(TpmsNvPublic::default(), &json!({ "authPolicy": "0xZZ" })),
        Err(Error::MalformedHex(_))
    ));
    assert!(matches!(
        c.decode(TpmsNvPublic::default(), &json!({ "attributes": "ownerread|bogus" })),
        Err(Error::UnknownSymbol { kind: "TPMA_NV", .. })
    ));
    assert!(matches!(
        c.decode(TpmsNvPublic::default(), &json!({ "dataSize": 0x10000 })),
        Err(Error::OutOfRange { .. })
    ));
    assert!(matches!(
        c.decode(TpmsNvPublic::default(), &json!(["nvIndex"])),
        Err(Error::TypeMismatch { expected: "object", .. })
    ));
}

#[test]
fn pcr_selection_roundtrip() {
    let c = ToolsLike::default();
    let list = TpmlPcrSelection::new(vec![
        TpmsPcrSelection::sha256(&[0, 1, 2, 14]),
        TpmsPcrSelection::new(TpmAlgId::SHA384, &[23]),
    ]);
    let text = c.encode(&list).unwrap();
    assert_eq!(
        text,
        json!([
            { "hash": "sha256", "pcrSelect": [0, 1, 2, 14] },
            { "hash": "sha384", "pcrSelect": [23] },
        ])
    );
    assert_eq!(c.decode(TpmlPcrSelection::default(), &text).unwrap(), list);
}

#[test]
fn pcr_selection_rejects_bad_index() {
    let c = ToolsLike::default();
    let src = json!({ "hash": "sha256", "pcrSelect": [0, 32] });
    assert!(matches!(
        c.decode(TpmsPcrSelection::default(), &src),
        Err(Error::InvalidPcr { pcr: 32 })
    ));

    let src = json!({ "hash": "sha256", "pcrSelect": "0,1" });
    assert!(matches!(
        c.decode(TpmsPcrSelection::default(), &src),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn codec_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ToolsLike>();

    let c = ToolsLike::default();
    let value: Value = std::thread::scope(|s| {
        s.spawn(|| c.encode(&TpmAlgId::SHA1).unwrap())
            .join()
            .unwrap()
    });
    assert_eq!(value, json!("sha1"));
}
