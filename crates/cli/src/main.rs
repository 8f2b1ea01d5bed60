//! `abicodec` — encode, decode and hash Ethereum ABI data from the shell.

use abicodec::{keccak256, selector, AbiType};
use alloy_primitives::hex;
use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

mod json;

#[derive(Parser)]
#[command(name = "abicodec", version, about = "Encode, decode and hash Ethereum ABI data")]
struct Opts {
    #[command(subcommand)]
    cmd: Subcommands,
}

#[derive(Subcommand)]
enum Subcommands {
    /// ABI-encode a JSON value against a schema.
    #[command(visible_alias = "e")]
    Encode {
        /// Type string, e.g. `(uint256,bytes)[2]`.
        schema: String,
        /// JSON rendition of the value, e.g. `[[1,"0xabcd"],[2,"0x"]]`.
        value: String,
    },
    /// Decode ABI-encoded hex data against a schema.
    #[command(visible_alias = "d")]
    Decode {
        schema: String,
        /// `0x`-prefixed hex data.
        data: String,
        /// Tolerate non-canonical padding bits.
        #[arg(long)]
        lenient: bool,
    },
    /// Keccak-256 of the input: hex bytes when `0x`-prefixed, UTF-8
    /// otherwise.
    #[command(visible_alias = "k")]
    Keccak { data: String },
    /// 4-byte function selector of a canonical signature.
    Selector { signature: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Opts::parse().cmd {
        Subcommands::Encode { schema, value } => {
            let ty: AbiType = schema.parse()?;
            let json: serde_json::Value =
                serde_json::from_str(&value).wrap_err("value is not valid JSON")?;
            let value = json::value_from_json(&ty, &json)?;
            tracing::debug!(%ty, "encoding");
            println!("{}", hex::encode_prefixed(ty.encode(&value)?));
        }
        Subcommands::Decode { schema, data, lenient } => {
            let ty: AbiType = schema.parse()?;
            let raw = hex::decode(data.trim()).wrap_err("data is not valid hex")?;
            tracing::debug!(%ty, bytes = raw.len(), lenient, "decoding");
            let value = if lenient { ty.decode_lenient(&raw)? } else { ty.decode(&raw)? };
            println!("{}", json::value_to_json(&value));
        }
        Subcommands::Keccak { data } => {
            let digest = match data.strip_prefix("0x") {
                Some(rest) => keccak256(hex::decode(rest).wrap_err("data is not valid hex")?),
                None => keccak256(data.as_bytes()),
            };
            println!("{digest}");
        }
        Subcommands::Selector { signature } => {
            println!("{}", selector(&signature));
        }
    }
    Ok(())
}
