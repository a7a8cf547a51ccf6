// SPDX-FileCopyrightText: © 2025 Phala Network <dstack@phala.network>
//
// SPDX-License-Identifier: Apache-2.0

//! Convert TPM values between raw form and tpm2-tools style text.
//!
//! Usage:
//!   tpm2-toolslike encode --type object-attrs 0x40040
//!   tpm2-toolslike decode --type alg sha256
//!   tpm2-toolslike --lists encode --type nv-attrs 0x60002
//!   tpm2-toolslike --strict decode --type nv-public '{"nvIndex": 25165825}'

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use fs_err as fs;
use serde_json::Value;
use tracing::{debug, trace};

use tpm2::{
    Decode, Encode, FriendlyInt, FriendlyIntList, SimpleBuffer, Tpm2bAuth, Tpm2bData,
    Tpm2bDigest, Tpm2bMaxNvBuffer, Tpm2bSensitiveData, TpmAlgId, TpmCap, TpmEccCurve, TpmRh,
    TpmSe, TpmSt, TpmSu, TpmaLocality, TpmaNv, TpmaObject, TpmaSession, TpmlPcrSelection,
    TpmsNvPublic, TpmsPcrSelection,
};
use tpm2_toolslike::{EncDec, Options, ToolsLike};

/// tpm2-tools style TPM value converter
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// JSON file with codec options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Encode attributes as a list of names
    #[arg(long, global = true)]
    lists: bool,

    /// Reject unknown structure fields
    #[arg(long, global = true)]
    strict: bool,

    /// Match names case-sensitively
    #[arg(long, global = true)]
    case_sensitive: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a raw value (integer or hex bytes) as text
    Encode(ConvertArgs),
    /// Decode text (JSON, or a bare string) back to a raw value
    Decode(ConvertArgs),
}

#[derive(Parser)]
struct ConvertArgs {
    /// TPM type of the value
    #[arg(short = 't', long = "type", value_enum)]
    ty: TypeName,

    /// The value to convert
    input: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TypeName {
    Alg,
    Handle,
    EccCurve,
    Se,
    Su,
    St,
    Cap,
    ObjectAttrs,
    NvAttrs,
    SessionAttrs,
    Locality,
    Digest,
    Data,
    Auth,
    SensitiveData,
    NvBuffer,
    PcrSelection,
    PcrSelections,
    NvPublic,
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Encode,
    Decode,
}

fn load_options(cli: &Cli) -> Result<Options> {
    let mut opts = match &cli.config {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => Options::default(),
    };
    if cli.lists {
        opts.use_lists = true;
    }
    if cli.strict {
        opts.strict = true;
    }
    if cli.case_sensitive {
        opts.case_insensitive = false;
    }
    Ok(opts)
}

fn parse_raw_int(input: &str) -> Result<u64> {
    let input = input.trim();
    let value = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u64::from_str_radix(digits, 16),
        None => input.parse(),
    };
    value.with_context(|| format!("invalid integer: {input}"))
}

/// Interpret command-line text as JSON, falling back to a bare string.
fn text_value(input: &str) -> Value {
    serde_json::from_str(input).unwrap_or_else(|_| Value::String(input.to_string()))
}

fn int_op<T: FriendlyInt + Encode + Decode + Default>(
    codec: &ToolsLike,
    op: Op,
    input: &str,
) -> Result<String> {
    match op {
        Op::Encode => {
            let val = T::try_from_u64(parse_raw_int(input)?)?;
            Ok(codec.encode(&val)?.to_string())
        }
        Op::Decode => {
            let val = codec.decode(T::default(), &text_value(input))?;
            Ok(format!("0x{:x}", val.to_u64()))
        }
    }
}

fn flags_op<T: FriendlyIntList + Encode + Decode + Default>(
    codec: &ToolsLike,
    op: Op,
    input: &str,
) -> Result<String> {
    match op {
        Op::Encode => {
            let val = T::try_from_bits(parse_raw_int(input)?)?;
            Ok(codec.encode(&val)?.to_string())
        }
        Op::Decode => {
            let val = codec.decode(T::default(), &text_value(input))?;
            Ok(format!("0x{:x}", val.bits()))
        }
    }
}

fn buffer_op<T: SimpleBuffer + Encode + Decode>(
    codec: &ToolsLike,
    op: Op,
    input: &str,
) -> Result<String> {
    match op {
        Op::Encode => {
            let mut val = T::default();
            val.set_buffer(hex::decode(input.trim()).context("invalid hex input")?)?;
            Ok(codec.encode(&val)?.to_string())
        }
        Op::Decode => {
            // Digits like "1234" would otherwise parse as a JSON number
            let src = match text_value(input) {
                src @ (Value::String(_) | Value::Null) => src,
                _ => Value::String(input.to_string()),
            };
            let val = codec.decode(T::default(), &src)?;
            Ok(hex::encode(val.buffer()))
        }
    }
}

fn struct_op<T: Encode + Decode + Default>(
    codec: &ToolsLike,
    op: Op,
    input: &str,
) -> Result<String> {
    if let Op::Encode = op {
        bail!("structure types only support decode");
    }
    let src: Value = serde_json::from_str(input).context("structure input must be JSON")?;
    let val = codec.decode(T::default(), &src)?;
    Ok(codec.encode(&val)?.to_string())
}

fn convert(codec: &ToolsLike, op: Op, args: &ConvertArgs) -> Result<String> {
    trace!("{op:?} {:?}: {}", args.ty, args.input);
    let input = args.input.as_str();
    match args.ty {
        TypeName::Alg => int_op::<TpmAlgId>(codec, op, input),
        TypeName::Handle => int_op::<TpmRh>(codec, op, input),
        TypeName::EccCurve => int_op::<TpmEccCurve>(codec, op, input),
        TypeName::Se => int_op::<TpmSe>(codec, op, input),
        TypeName::Su => int_op::<TpmSu>(codec, op, input),
        TypeName::St => int_op::<TpmSt>(codec, op, input),
        TypeName::Cap => int_op::<TpmCap>(codec, op, input),
        TypeName::ObjectAttrs => flags_op::<TpmaObject>(codec, op, input),
        TypeName::NvAttrs => flags_op::<TpmaNv>(codec, op, input),
        TypeName::SessionAttrs => flags_op::<TpmaSession>(codec, op, input),
        TypeName::Locality => flags_op::<TpmaLocality>(codec, op, input),
        TypeName::Digest => buffer_op::<Tpm2bDigest>(codec, op, input),
        TypeName::Data => buffer_op::<Tpm2bData>(codec, op, input),
        TypeName::Auth => buffer_op::<Tpm2bAuth>(codec, op, input),
        TypeName::SensitiveData => buffer_op::<Tpm2bSensitiveData>(codec, op, input),
        TypeName::NvBuffer => buffer_op::<Tpm2bMaxNvBuffer>(codec, op, input),
        TypeName::PcrSelection => struct_op::<TpmsPcrSelection>(codec, op, input),
        TypeName::PcrSelections => struct_op::<TpmlPcrSelection>(codec, op, input),
        TypeName::NvPublic => struct_op::<TpmsNvPublic>(codec, op, input),
    }
}

fn main() -> Result<()> {
    {
        use tracing_subscriber::{fmt, EnvFilter};
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    let cli = Cli::parse();
    let opts = load_options(&cli)?;
    debug!("codec options: {opts:?}");
    let codec = ToolsLike::new(opts);

    let output = match &cli.command {
        Commands::Encode(args) => convert(&codec, Op::Encode, args),
        Commands::Decode(args) => convert(&codec, Op::Decode, args),
    }
    .context("conversion failed")?;
    println!("{output}");
    Ok(())
}
