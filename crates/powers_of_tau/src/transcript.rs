// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

//! Ceremony state as persisted in JSON, and the contribution entry point.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use blstrs::{G1Affine, G2Affine, Scalar};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::accumulator::apply_powers;
use crate::codec::{encode_batch, Codec, CompressedPoint};
use crate::error::{Error, Result};

/// The full ceremony state: one transcript per setup size.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ceremony {
    pub transcripts: Vec<Transcript>,
}

/// Powers of tau for one setup size, with the number of active powers in
/// each group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(rename = "numG1Powers")]
    pub num_g1_powers: usize,
    #[serde(rename = "numG2Powers")]
    pub num_g2_powers: usize,
    #[serde(rename = "powersOfTau")]
    pub powers_of_tau: PowersOfTau,
}

/// `0x`-prefixed compressed hex strings of `[tau^i]_1` and `[tau^i]_2`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowersOfTau {
    #[serde(rename = "G1Powers")]
    pub g1_powers: Vec<String>,
    #[serde(rename = "G2Powers")]
    pub g2_powers: Vec<String>,
}

/// Output format of a contribution, as consumed by KZG libraries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedSetup {
    pub g1_monomial: Vec<String>,
    pub g2_monomial: Vec<String>,
}

/// Where the ceremony state comes from.
pub trait TranscriptSource {
    fn load(&self) -> Result<Ceremony>;
}

/// Ceremony state stored in a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFile(pub PathBuf);

impl TranscriptSource for JsonFile {
    fn load(&self) -> Result<Ceremony> {
        let file = File::open(&self.0).map_err(|e| Error::io(&self.0, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

/// Ceremony state held in memory, e.g. bundled with `include_str!`.
#[derive(Clone, Copy, Debug)]
pub struct JsonStr<'a>(pub &'a str);

impl TranscriptSource for JsonStr<'_> {
    fn load(&self) -> Result<Ceremony> {
        Ok(serde_json::from_str(self.0)?)
    }
}

impl Ceremony {
    pub fn transcript(&self, index: usize) -> Result<&Transcript> {
        let len = self.transcripts.len();
        self.transcripts
            .get(index)
            .ok_or(Error::TranscriptIndex { index, len })
    }

    pub fn transcript_mut(&mut self, index: usize) -> Result<&mut Transcript> {
        let len = self.transcripts.len();
        self.transcripts
            .get_mut(index)
            .ok_or(Error::TranscriptIndex { index, len })
    }

    /// Writes every transcript to `dir` as `trusted_setup_<index>.json`.
    pub fn split_into(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        self.transcripts
            .iter()
            .enumerate()
            .map(|(index, transcript)| -> Result<PathBuf> {
                let path = dir.join(format!("trusted_setup_{index}.json"));
                transcript.to_trusted_setup().write_to(&path)?;
                info!(
                    index,
                    g1 = transcript.num_g1_powers,
                    g2 = transcript.num_g2_powers,
                    path = %path.display(),
                    "wrote transcript"
                );
                Ok(path)
            })
            .collect()
    }
}

impl Transcript {
    /// Builds a transcript whose counts cover every given point.
    pub fn new(g1_powers: Vec<String>, g2_powers: Vec<String>) -> Self {
        Transcript {
            num_g1_powers: g1_powers.len(),
            num_g2_powers: g2_powers.len(),
            powers_of_tau: PowersOfTau {
                g1_powers,
                g2_powers,
            },
        }
    }

    /// Checks that the declared counts do not exceed the stored points.
    pub fn validate_counts(&self) -> Result<()> {
        let checks = [
            (G1Affine::GROUP, self.num_g1_powers, self.powers_of_tau.g1_powers.len()),
            (G2Affine::GROUP, self.num_g2_powers, self.powers_of_tau.g2_powers.len()),
        ];
        for (group, count, len) in checks {
            if count > len {
                return Err(Error::CountOutOfRange { group, count, len });
            }
        }
        Ok(())
    }

    /// Multiplies the `i`-th active power of each group by `secret^i`.
    ///
    /// Every stored point of both groups is decoded before anything is
    /// written, so a malformed point anywhere leaves the transcript unchanged.
    /// Points past the declared counts are validated but never rewritten.
    pub fn update_powers_of_tau(&mut self, secret: &Scalar, codec: &Codec) -> Result<()> {
        let span = info_span!(
            "update_powers_of_tau",
            g1 = self.num_g1_powers,
            g2 = self.num_g2_powers
        );
        let _enter = span.enter();

        self.validate_counts()?;
        let mut g1_points = codec.decode_g1_batch(&self.powers_of_tau.g1_powers)?;
        let mut g2_points = codec.decode_g2_batch(&self.powers_of_tau.g2_powers)?;
        debug!("decoded all points");

        apply_powers(
            &mut g1_points,
            &mut g2_points,
            self.num_g1_powers,
            self.num_g2_powers,
            secret,
        )?;

        let g1_hex = encode_batch(&g1_points[..self.num_g1_powers]);
        let g2_hex = encode_batch(&g2_points[..self.num_g2_powers]);
        self.powers_of_tau.g1_powers[..self.num_g1_powers].clone_from_slice(&g1_hex);
        self.powers_of_tau.g2_powers[..self.num_g2_powers].clone_from_slice(&g2_hex);
        info!("updated powers of tau");
        Ok(())
    }

    pub fn to_trusted_setup(&self) -> TrustedSetup {
        TrustedSetup {
            g1_monomial: self.powers_of_tau.g1_powers.clone(),
            g2_monomial: self.powers_of_tau.g2_powers.clone(),
        }
    }

    /// Blake3 digest of the active powers, in hex.
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.num_g1_powers as u64).to_le_bytes());
        hasher.update(&(self.num_g2_powers as u64).to_le_bytes());
        let g1 = self.powers_of_tau.g1_powers.iter().take(self.num_g1_powers);
        let g2 = self.powers_of_tau.g2_powers.iter().take(self.num_g2_powers);
        for point in g1.chain(g2) {
            hasher.update(point.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

impl TrustedSetup {
    /// Writes the setup as JSON and marks the file read-only.
    ///
    /// The data goes to a temporary sibling first and is renamed into place,
    /// so a failed write never leaves a truncated file at `path`.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_vec(self)?;

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        if tmp.exists() {
            fs::remove_file(&tmp).map_err(|e| Error::io(&tmp, e))?;
        }
        fs::write(&tmp, data).map_err(|e| Error::io(&tmp, e))?;

        let mut permissions = fs::metadata(&tmp).map_err(|e| Error::io(&tmp, e))?.permissions();
        permissions.set_readonly(true);
        fs::set_permissions(&tmp, permissions).map_err(|e| Error::io(&tmp, e))?;

        if path.exists() {
            fs::remove_file(path).map_err(|e| Error::io(path, e))?;
        }
        fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
    }
}
