//! Convert images to base64 text and back.

use anyhow::Context;
use clap::{Parser, Subcommand};
use htmlshot::codec;
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "img2b64", version, about = "Convert images to base64 (or data URIs) and back")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode an image file as base64
    Encode {
        /// Image file to encode
        image: PathBuf,
        /// Prefix the output with `data:<mime>;base64,`
        #[arg(short, long)]
        data_uri: bool,
        /// Write the base64 text to this file instead of stdout
        #[arg(short, long, value_name = "FILE", conflicts_with = "data_uri")]
        output: Option<PathBuf>,
    },
    /// Decode base64 text or a data URI back into an image file
    Decode {
        /// File holding the base64 text, or `-` for stdin
        input: PathBuf,
        /// Image file to write
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_target(false)
        .init();

    // The codec has already logged the reason for any failure
    let ok = match cli.command {
        Command::Encode {
            image,
            output: Some(output),
            ..
        } => codec::save_encoded_to_file(&image, &output).is_ok(),
        Command::Encode {
            image,
            data_uri,
            output: None,
        } => {
            let encoded = if data_uri {
                codec::encode_with_data_uri_prefix(&image)
            } else {
                codec::encode(&image)
            };
            match encoded {
                Ok(s) => {
                    println!("{}", s);
                    true
                }
                Err(_) => false,
            }
        }
        Command::Decode { input, output } => {
            let text = read_input(&input)?;
            codec::decode(&text, &output).is_ok()
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
