// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

//! Hex codec for compressed BLS12-381 points.
//!
//! Points travel through the ceremony files as `0x`-prefixed hex strings of
//! their compressed encoding: 48 bytes for G1 and 96 bytes for G2.

use blstrs::{G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use group::Group;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Error, Result};

const HEX_PREFIX: &str = "0x";

/// Whether decoding verifies that a point lies in the prime-order subgroup.
///
/// Decoding always checks that the bytes are a well-formed compressed point
/// on the curve; only the (expensive) subgroup check is optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubgroupCheck {
    #[default]
    Skip,
    Enforce,
}

/// A trait representing a point of one of the two pairing groups, with the
/// operations the contribution needs: compressed (de)serialization and
/// scalar multiplication.
pub trait CompressedPoint: Copy + PartialEq + Send + Sync + Sized {
    /// Group name used in errors and logs.
    const GROUP: &'static str;

    /// Length in bytes of the compressed encoding.
    const COMPRESSED_SIZE: usize;

    /// Interprets `bytes` as a compressed point.
    ///
    /// # Returns
    /// `None` if `bytes` has the wrong length, does not encode a point on the
    /// curve, or (with [`SubgroupCheck::Enforce`]) encodes a point outside
    /// the prime-order subgroup.
    fn from_compressed_bytes(bytes: &[u8], check: SubgroupCheck) -> Option<Self>;

    /// Returns the compressed encoding of the point.
    fn to_compressed_bytes(&self) -> Vec<u8>;

    /// Returns `scalar * self`.
    fn mul_scalar(&self, scalar: &Scalar) -> Self;

    /// Returns the point at infinity.
    fn identity() -> Self;

    /// Returns the fixed generator of the group.
    fn generator() -> Self;
}

impl CompressedPoint for G1Affine {
    const GROUP: &'static str = "G1";
    const COMPRESSED_SIZE: usize = 48;

    fn from_compressed_bytes(bytes: &[u8], check: SubgroupCheck) -> Option<Self> {
        let bytes: &[u8; 48] = bytes.try_into().ok()?;
        let point = match check {
            SubgroupCheck::Skip => G1Affine::from_compressed_unchecked(bytes),
            SubgroupCheck::Enforce => G1Affine::from_compressed(bytes),
        };
        point.into()
    }

    fn to_compressed_bytes(&self) -> Vec<u8> {
        self.to_compressed().to_vec()
    }

    fn mul_scalar(&self, scalar: &Scalar) -> Self {
        G1Affine::from(G1Projective::from(*self) * scalar)
    }

    fn identity() -> Self {
        G1Affine::from(<G1Projective as Group>::identity())
    }

    fn generator() -> Self {
        G1Affine::from(<G1Projective as Group>::generator())
    }
}

impl CompressedPoint for G2Affine {
    const GROUP: &'static str = "G2";
    const COMPRESSED_SIZE: usize = 96;

    fn from_compressed_bytes(bytes: &[u8], check: SubgroupCheck) -> Option<Self> {
        let bytes: &[u8; 96] = bytes.try_into().ok()?;
        let point = match check {
            SubgroupCheck::Skip => G2Affine::from_compressed_unchecked(bytes),
            SubgroupCheck::Enforce => G2Affine::from_compressed(bytes),
        };
        point.into()
    }

    fn to_compressed_bytes(&self) -> Vec<u8> {
        self.to_compressed().to_vec()
    }

    fn mul_scalar(&self, scalar: &Scalar) -> Self {
        G2Affine::from(G2Projective::from(*self) * scalar)
    }

    fn identity() -> Self {
        G2Affine::from(<G2Projective as Group>::identity())
    }

    fn generator() -> Self {
        G2Affine::from(<G2Projective as Group>::generator())
    }
}

/// Removes the `0x` prefix from a hex string.
pub fn trim_hex_prefix(hex_string: &str) -> Result<&str> {
    hex_string
        .strip_prefix(HEX_PREFIX)
        .ok_or_else(|| Error::MalformedInput(format!("missing {HEX_PREFIX} prefix")))
}

/// Decoder for `0x`-prefixed compressed point strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    subgroup_check: SubgroupCheck,
}

impl Codec {
    pub const fn new(subgroup_check: SubgroupCheck) -> Self {
        Codec { subgroup_check }
    }

    /// Codec that performs no subgroup checks.
    ///
    /// Only sound for trusted inputs: the strings must come from a ceremony
    /// state that was validated when it was produced. Points received from an
    /// untrusted peer must go through [`Codec::checked`] instead.
    pub const fn trusted() -> Self {
        Codec::new(SubgroupCheck::Skip)
    }

    /// Codec that rejects points outside the prime-order subgroup.
    pub const fn checked() -> Self {
        Codec::new(SubgroupCheck::Enforce)
    }

    pub fn subgroup_check(&self) -> SubgroupCheck {
        self.subgroup_check
    }

    /// Parses a hex string (with the `0x` prefix) into a point of group `P`.
    pub fn decode<P: CompressedPoint>(&self, hex_string: &str) -> Result<P> {
        let bytes = hex::decode(trim_hex_prefix(hex_string)?)
            .map_err(|e| Error::MalformedInput(e.to_string()))?;
        if bytes.len() != P::COMPRESSED_SIZE {
            return Err(Error::MalformedInput(format!(
                "expected {} bytes for a compressed {} point, got {}",
                P::COMPRESSED_SIZE,
                P::GROUP,
                bytes.len()
            )));
        }
        P::from_compressed_bytes(&bytes, self.subgroup_check)
            .ok_or(Error::InvalidEncoding(P::GROUP))
    }

    /// Parses every hex string of `hex_strings` in parallel.
    ///
    /// The output keeps the input order. A single malformed element fails
    /// the whole batch with an [`Error::Point`] naming its index.
    pub fn decode_batch<P, S>(&self, hex_strings: &[S]) -> Result<Vec<P>>
    where
        P: CompressedPoint,
        S: AsRef<str> + Sync,
    {
        debug!(
            group = P::GROUP,
            count = hex_strings.len(),
            subgroup_check = ?self.subgroup_check,
            "decoding points"
        );
        hex_strings
            .par_iter()
            .enumerate()
            .map(|(index, hex_string)| {
                self.decode::<P>(hex_string.as_ref())
                    .map_err(|source| Error::Point {
                        group: P::GROUP,
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }

    pub fn decode_g1(&self, hex_string: &str) -> Result<G1Affine> {
        self.decode(hex_string)
    }

    pub fn decode_g2(&self, hex_string: &str) -> Result<G2Affine> {
        self.decode(hex_string)
    }

    pub fn decode_g1_batch<S>(&self, hex_strings: &[S]) -> Result<Vec<G1Affine>>
    where
        S: AsRef<str> + Sync,
    {
        self.decode_batch(hex_strings)
    }

    pub fn decode_g2_batch<S>(&self, hex_strings: &[S]) -> Result<Vec<G2Affine>>
    where
        S: AsRef<str> + Sync,
    {
        self.decode_batch(hex_strings)
    }
}

/// Encodes a point as `0x` followed by the lowercase hex of its compressed form.
pub fn encode<P: CompressedPoint>(point: &P) -> String {
    format!("{HEX_PREFIX}{}", hex::encode(point.to_compressed_bytes()))
}

pub fn encode_g1(point: &G1Affine) -> String {
    encode(point)
}

pub fn encode_g2(point: &G2Affine) -> String {
    encode(point)
}

/// Encodes every point in parallel, keeping the input order.
pub fn encode_batch<P: CompressedPoint>(points: &[P]) -> Vec<String> {
    points.par_iter().map(encode).collect()
}
