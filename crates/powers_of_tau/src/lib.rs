// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

//! One participant step of a KZG powers-of-tau ceremony over BLS12-381.
//!
//! The ceremony state holds `[tau^i]_1` and `[tau^i]_2` for an unknown
//! `tau`. A participant picks a secret `x` and replaces every `i`-th point
//! `P_i` with `x^i * P_i`, so that the state now encodes powers of `tau * x`.
//! As long as one participant discards their secret, nobody knows the final
//! `tau`.
//!
//! Points are exchanged as `0x`-prefixed hex strings of their compressed
//! encoding. Contributions decode them without subgroup checks: the state is
//! assumed to come from an already-validated ceremony (see [`Codec::trusted`]).
//!
//! ## Usage
//!
//! ```rust
//! use blstrs::{G1Affine, G2Affine};
//! use powers_of_tau::codec::CompressedPoint;
//! use powers_of_tau::{encode_g1, encode_g2, parse_secret, Codec, Transcript};
//!
//! let mut transcript = Transcript::new(
//!     vec![encode_g1(&G1Affine::generator()); 4],
//!     vec![encode_g2(&G2Affine::generator()); 2],
//! );
//!
//! let secret = parse_secret("5").unwrap();
//! transcript.update_powers_of_tau(&secret, &Codec::trusted()).unwrap();
//!
//! let g1_25 = G1Affine::generator().mul_scalar(&blstrs::Scalar::from(25u64));
//! assert_eq!(transcript.powers_of_tau.g1_powers[2], encode_g1(&g1_25));
//! ```

pub mod accumulator;
pub mod codec;
mod error;
pub mod scalar;
pub mod transcript;

pub use crate::accumulator::{apply_powers, PowerLadder};
pub use crate::codec::{
    encode, encode_batch, encode_g1, encode_g2, trim_hex_prefix, Codec, SubgroupCheck,
};
pub use crate::error::{Error, Result};
pub use crate::scalar::parse_secret;
#[doc(inline)]
pub use crate::transcript::{
    Ceremony, JsonFile, JsonStr, PowersOfTau, Transcript, TranscriptSource, TrustedSetup,
};
