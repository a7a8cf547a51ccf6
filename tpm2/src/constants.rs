// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! TPM 2.0 constants and attribute bitmasks
//!
//! Names follow the lowercase spelling used by tpm2-tools.

friendly_int! {
    /// TPM 2.0 Algorithm IDs (TPM_ALG_ID)
    pub struct TpmAlgId(u16) as "TPM2_ALG" {
        ERROR = 0x0000 => "error",
        RSA = 0x0001 => "rsa",
        TDES = 0x0003 => "tdes",
        SHA1 = 0x0004 => "sha1",
        HMAC = 0x0005 => "hmac",
        AES = 0x0006 => "aes",
        MGF1 = 0x0007 => "mgf1",
        KEYEDHASH = 0x0008 => "keyedhash",
        XOR = 0x000A => "xor",
        SHA256 = 0x000B => "sha256",
        SHA384 = 0x000C => "sha384",
        SHA512 = 0x000D => "sha512",
        NULL = 0x0010 => "null",
        SM3_256 = 0x0012 => "sm3_256",
        SM4 = 0x0013 => "sm4",
        RSASSA = 0x0014 => "rsassa",
        RSAES = 0x0015 => "rsaes",
        RSAPSS = 0x0016 => "rsapss",
        OAEP = 0x0017 => "oaep",
        ECDSA = 0x0018 => "ecdsa",
        ECDH = 0x0019 => "ecdh",
        ECDAA = 0x001A => "ecdaa",
        SM2 = 0x001B => "sm2",
        ECSCHNORR = 0x001C => "ecschnorr",
        ECMQV = 0x001D => "ecmqv",
        KDF1_SP800_56A = 0x0020 => "kdf1_sp800_56a",
        KDF2 = 0x0021 => "kdf2",
        KDF1_SP800_108 = 0x0022 => "kdf1_sp800_108",
        ECC = 0x0023 => "ecc",
        SYMCIPHER = 0x0025 => "symcipher",
        CAMELLIA = 0x0026 => "camellia",
        SHA3_256 = 0x0027 => "sha3_256",
        SHA3_384 = 0x0028 => "sha3_384",
        SHA3_512 = 0x0029 => "sha3_512",
        CMAC = 0x003F => "cmac",
        CTR = 0x0040 => "ctr",
        OFB = 0x0041 => "ofb",
        CBC = 0x0042 => "cbc",
        CFB = 0x0043 => "cfb",
        ECB = 0x0044 => "ecb",
    }
}

impl TpmAlgId {
    pub const FIRST: Self = Self::RSA;
    pub const LAST: Self = Self::ECB;
}

friendly_int! {
    /// TPM 2.0 Permanent Handles (TPM_RH)
    pub struct TpmRh(u32) as "TPM2_RH" {
        OWNER = 0x40000001 => "owner",
        NULL = 0x40000007 => "null",
        UNASSIGNED = 0x40000008 => "unassigned",
        PW = 0x40000009 => "pw",
        LOCKOUT = 0x4000000A => "lockout",
        ENDORSEMENT = 0x4000000B => "endorsement",
        PLATFORM = 0x4000000C => "platform",
        PLATFORM_NV = 0x4000000D => "platform_nv",
    }
}

friendly_int! {
    /// ECC Curve IDs (TPM_ECC_CURVE)
    pub struct TpmEccCurve(u16) as "TPM2_ECC" {
        NONE = 0x0000 => "none",
        NIST_P192 = 0x0001 => "nist_p192",
        NIST_P224 = 0x0002 => "nist_p224",
        NIST_P256 = 0x0003 => "nist_p256",
        NIST_P384 = 0x0004 => "nist_p384",
        NIST_P521 = 0x0005 => "nist_p521",
        BN_P256 = 0x0010 => "bn_p256",
        BN_P638 = 0x0011 => "bn_p638",
        SM2_P256 = 0x0020 => "sm2_p256",
    }
}

friendly_int! {
    /// TPM 2.0 Session Types (TPM_SE)
    pub struct TpmSe(u8) as "TPM2_SE" {
        HMAC = 0x00 => "hmac",
        POLICY = 0x01 => "policy",
        TRIAL = 0x03 => "trial",
    }
}

friendly_int! {
    /// TPM 2.0 Startup Types (TPM_SU)
    pub struct TpmSu(u16) as "TPM2_SU" {
        CLEAR = 0x0000 => "clear",
        STATE = 0x0001 => "state",
    }
}

friendly_int! {
    /// TPM structure tags (TPM_ST)
    pub struct TpmSt(u16) as "TPM2_ST" {
        RSP_COMMAND = 0x00C4 => "rsp_command",
        NULL = 0x8000 => "null",
        NO_SESSIONS = 0x8001 => "no_sessions",
        SESSIONS = 0x8002 => "sessions",
        ATTEST_NV = 0x8014 => "attest_nv",
        ATTEST_COMMAND_AUDIT = 0x8015 => "attest_command_audit",
        ATTEST_SESSION_AUDIT = 0x8016 => "attest_session_audit",
        ATTEST_CERTIFY = 0x8017 => "attest_certify",
        ATTEST_QUOTE = 0x8018 => "attest_quote",
        ATTEST_TIME = 0x8019 => "attest_time",
        ATTEST_CREATION = 0x801A => "attest_creation",
        CREATION = 0x8021 => "creation",
        VERIFIED = 0x8022 => "verified",
        AUTH_SECRET = 0x8023 => "auth_secret",
        HASHCHECK = 0x8024 => "hashcheck",
        AUTH_SIGNED = 0x8025 => "auth_signed",
    }
}

friendly_int! {
    /// TPM 2.0 Capability Types (TPM_CAP)
    pub struct TpmCap(u32) as "TPM2_CAP" {
        ALGS = 0x00000000 => "algs",
        HANDLES = 0x00000001 => "handles",
        COMMANDS = 0x00000002 => "commands",
        PP_COMMANDS = 0x00000003 => "pp_commands",
        AUDIT_COMMANDS = 0x00000004 => "audit_commands",
        PCRS = 0x00000005 => "pcrs",
        TPM_PROPERTIES = 0x00000006 => "tpm_properties",
        PCR_PROPERTIES = 0x00000007 => "pcr_properties",
        ECC_CURVES = 0x00000008 => "ecc_curves",
        AUTH_POLICIES = 0x00000009 => "auth_policies",
    }
}

friendly_intlist! {
    /// TPM 2.0 Object Attributes (TPMA_OBJECT)
    pub struct TpmaObject(u32) as "TPMA_OBJECT" {
        FIXED_TPM = 1 << 1 => "fixedtpm",
        ST_CLEAR = 1 << 2 => "stclear",
        FIXED_PARENT = 1 << 4 => "fixedparent",
        SENSITIVE_DATA_ORIGIN = 1 << 5 => "sensitivedataorigin",
        USER_WITH_AUTH = 1 << 6 => "userwithauth",
        ADMIN_WITH_POLICY = 1 << 7 => "adminwithpolicy",
        NO_DA = 1 << 10 => "noda",
        ENCRYPTED_DUPLICATION = 1 << 11 => "encryptedduplication",
        RESTRICTED = 1 << 16 => "restricted",
        DECRYPT = 1 << 17 => "decrypt",
        SIGN_ENCRYPT = 1 << 18 => "sign",
        X509_SIGN = 1 << 19 => "x509sign",
    }
}

friendly_intlist! {
    /// TPM 2.0 NV Attributes (TPMA_NV)
    pub struct TpmaNv(u32) as "TPMA_NV" {
        PP_WRITE = 1 << 0 => "ppwrite",
        OWNER_WRITE = 1 << 1 => "ownerwrite",
        AUTH_WRITE = 1 << 2 => "authwrite",
        POLICY_WRITE = 1 << 3 => "policywrite",
        POLICY_DELETE = 1 << 10 => "policy_delete",
        WRITE_LOCKED = 1 << 11 => "writelocked",
        WRITE_ALL = 1 << 12 => "writeall",
        WRITE_DEFINE = 1 << 13 => "writedefine",
        WRITE_STCLEAR = 1 << 14 => "write_stclear",
        GLOBAL_LOCK = 1 << 15 => "globallock",
        PP_READ = 1 << 16 => "ppread",
        OWNER_READ = 1 << 17 => "ownerread",
        AUTH_READ = 1 << 18 => "authread",
        POLICY_READ = 1 << 19 => "policyread",
        NO_DA = 1 << 25 => "no_da",
        ORDERLY = 1 << 26 => "orderly",
        CLEAR_STCLEAR = 1 << 27 => "clear_stclear",
        READ_LOCKED = 1 << 28 => "readlocked",
        WRITTEN = 1 << 29 => "written",
        PLATFORM_CREATE = 1 << 30 => "platformcreate",
        READ_STCLEAR = 1 << 31 => "read_stclear",
    }
}

friendly_intlist! {
    /// TPM 2.0 Session Attributes (TPMA_SESSION)
    pub struct TpmaSession(u8) as "TPMA_SESSION" {
        CONTINUE_SESSION = 1 << 0 => "continuesession",
        AUDIT_EXCLUSIVE = 1 << 1 => "auditexclusive",
        AUDIT_RESET = 1 << 2 => "auditreset",
        DECRYPT = 1 << 5 => "decrypt",
        ENCRYPT = 1 << 6 => "encrypt",
        AUDIT = 1 << 7 => "audit",
    }
}

friendly_intlist! {
    /// Localities a command or object is bound to (TPMA_LOCALITY)
    pub struct TpmaLocality(u8) as "TPMA_LOCALITY" {
        ZERO = 1 << 0 => "zero",
        ONE = 1 << 1 => "one",
        TWO = 1 << 2 => "two",
        THREE = 1 << 3 => "three",
        FOUR = 1 << 4 => "four",
    }
}
