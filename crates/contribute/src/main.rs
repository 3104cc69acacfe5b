// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use powers_of_tau::{parse_secret, Codec, JsonFile, TranscriptSource};
use tracing::info;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Config {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Contribute a secret to one transcript and write the resulting trusted setup
    Contribute {
        /// Ceremony state (JSON with a list of transcripts)
        #[arg(long, value_name = "FILE")]
        transcript: PathBuf,

        /// Transcript to update; the default is the fourth one (32768 G1 powers)
        #[arg(long, default_value_t = 3)]
        index: usize,

        /// Secret number used for powers of tau, in base 10
        #[arg(short = 'x', long = "secret", value_name = "SECRET")]
        secret: String,

        #[arg(long, value_name = "FILE", default_value = "trusted_setup.json")]
        output: PathBuf,

        /// Verify that every input point lies in the prime-order subgroup
        #[arg(long)]
        check_subgroups: bool,
    },

    /// Write each transcript of the ceremony state to its own trusted setup file
    Split {
        #[arg(long, value_name = "FILE")]
        transcript: PathBuf,

        #[arg(long, value_name = "DIR")]
        out_dir: PathBuf,
    },
}

// cargo run --release --bin contribute -- contribute --transcript transcript.json -x 123456789
// cargo run --release --bin contribute -- split --transcript transcript.json --out-dir setups

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Config::parse())
}

fn run(config: Config) -> Result<()> {
    match config.command {
        Command::Contribute {
            transcript,
            index,
            secret,
            output,
            check_subgroups,
        } => {
            let secret = Zeroizing::new(secret);
            let secret = parse_secret(&secret).context("cannot use the given secret")?;
            let codec = if check_subgroups {
                Codec::checked()
            } else {
                Codec::trusted()
            };

            let mut ceremony = JsonFile(transcript.clone())
                .load()
                .with_context(|| format!("cannot load {}", transcript.display()))?;
            let transcript = ceremony.transcript_mut(index)?;
            info!(index, digest = %transcript.digest(), "loaded transcript");

            let start = Instant::now();
            transcript
                .update_powers_of_tau(&secret, &codec)
                .context("contribution failed, nothing was written")?;
            info!(
                elapsed = ?start.elapsed(),
                digest = %transcript.digest(),
                "computed contribution"
            );

            transcript
                .to_trusted_setup()
                .write_to(&output)
                .with_context(|| format!("cannot write {}", output.display()))?;
            info!(path = %output.display(), "wrote trusted setup");
        }
        Command::Split {
            transcript,
            out_dir,
        } => {
            let ceremony = JsonFile(transcript.clone())
                .load()
                .with_context(|| format!("cannot load {}", transcript.display()))?;
            let paths = ceremony.split_into(&out_dir)?;
            info!(count = paths.len(), dir = %out_dir.display(), "split ceremony state");
        }
    }
    Ok(())
}
