//! CLI tool to merge API keys into a single bundle
//!
//! Usage:
//!   cargo run --bin merge_keys -- --key sk-one --key sk-two
//!   cargo run --bin merge_keys -- --env-file .env --keys-file extra_keys.txt
//!   cargo run --bin merge_keys -- --decode <bundle>

use anyhow::{bail, Context, Result};
use clap::Parser;
use multi_key_proxy::services::bundle::{
    extract_env_keys, merge_unique, parse_key_lines, KeyBundle,
};
use std::path::PathBuf;

/// Merge multiple API keys into one base64 bundle
#[derive(Parser, Debug)]
#[command(name = "merge_keys")]
#[command(about = "Merge multiple API keys into one base64 bundle")]
struct Args {
    /// API key to include (repeatable)
    #[arg(short, long = "key")]
    keys: Vec<String>,

    /// File with one API key per line
    #[arg(long)]
    keys_file: Option<PathBuf>,

    /// .env file to extract *KEY* variables from
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Decode an existing bundle instead of creating one
    #[arg(long, conflicts_with_all = ["keys", "keys_file", "env_file"])]
    decode: Option<String>,

    /// Print the keys as an API_KEYS line instead of a bundle
    #[arg(long)]
    api_keys_line: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(encoded) = args.decode {
        let bundle = KeyBundle::decode(&encoded).context("Failed to decode bundle")?;
        println!("Created: {}", bundle.created);
        println!("Keys ({}):", bundle.keys.len());
        for key in &bundle.keys {
            println!("  {}", key);
        }
        return Ok(());
    }

    // Extracted .env keys come first, like the browser tool
    let mut extracted = Vec::new();
    if let Some(path) = &args.env_file {
        if path.extension().and_then(|e| e.to_str()) != Some("env")
            && path.file_name().and_then(|n| n.to_str()) != Some(".env")
        {
            bail!("Please provide a .env file: {}", path.display());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        extracted = extract_env_keys(&content);
        eprintln!("Extracted {} API keys from {}", extracted.len(), path.display());
    }

    let mut provided: Vec<String> = args
        .keys
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if let Some(path) = &args.keys_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        provided.extend(parse_key_lines(&content));
    }

    let keys = merge_unique(extracted, provided);

    if args.api_keys_line {
        if keys.is_empty() {
            bail!("Please enter at least one API key");
        }
        println!("API_KEYS={}", keys.join(","));
        return Ok(());
    }

    let bundle = KeyBundle::new(keys)?;
    println!("{}", bundle.encode()?);
    eprintln!("Successfully combined {} API keys", bundle.keys.len());

    Ok(())
}
