// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

use blstrs::Scalar;
use ff::{Field, PrimeField};
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::error::{Error, Result};

/// Returns the modulus of the BLS12-381 scalar field.
pub fn modulus() -> BigUint {
    // MODULUS is a 0x-prefixed big-endian hex string
    BigUint::parse_bytes(Scalar::MODULUS[2..].as_bytes(), 16)
        .unwrap_or_else(|| unreachable!("scalar field modulus is valid hex"))
}

/// Reduces `n` modulo the scalar field order and converts it to a field element.
pub fn scalar_from_biguint(n: &BigUint) -> Scalar {
    let reduced = n % modulus();
    let mut bytes = reduced.to_bytes_le();
    bytes.resize(32, 0);
    let mut repr = [0u8; 32];
    repr.copy_from_slice(&bytes);
    Option::from(Scalar::from_bytes_le(&repr))
        .unwrap_or_else(|| unreachable!("reduced value is below the modulus"))
}

/// Parses the contributed secret.
///
/// The input is a base-10 integer, possibly negative, which is reduced into
/// the scalar field with a non-negative remainder. A secret congruent to zero
/// would collapse every power past the first to the identity, so it is
/// rejected along with unparseable input.
pub fn parse_secret(input: &str) -> Result<Scalar> {
    let n = BigInt::parse_bytes(input.trim().as_bytes(), 10).ok_or(Error::ZeroOrInvalidScalar)?;
    let modulus = BigInt::from_biguint(Sign::Plus, modulus());
    let mut reduced = n % &modulus;
    if reduced.sign() == Sign::Minus {
        reduced += &modulus;
    }
    if reduced.is_zero() {
        return Err(Error::ZeroOrInvalidScalar);
    }
    let secret = scalar_from_biguint(reduced.magnitude());
    debug_assert!(!bool::from(secret.is_zero()));
    Ok(secret)
}
