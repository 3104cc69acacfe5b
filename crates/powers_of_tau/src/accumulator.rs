// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

use blstrs::{G1Affine, G2Affine, Scalar};
use ff::Field;
use tracing::debug;

use crate::codec::CompressedPoint;
use crate::error::{Error, Result};

/// Successive powers `1, x, x^2, ...` of a scalar.
///
/// Every step is a multiplication in the scalar field, so each yielded power
/// is already reduced modulo the field order.
#[derive(Clone, Debug)]
pub struct PowerLadder {
    secret: Scalar,
    current: Scalar,
}

impl PowerLadder {
    pub fn new(secret: Scalar) -> Self {
        PowerLadder {
            secret,
            current: Scalar::ONE,
        }
    }
}

impl Iterator for PowerLadder {
    type Item = Scalar;

    fn next(&mut self) -> Option<Scalar> {
        let power = self.current;
        self.current *= self.secret;
        Some(power)
    }
}

fn check_count<P: CompressedPoint>(count: usize, len: usize) -> Result<()> {
    if count > len {
        return Err(Error::CountOutOfRange {
            group: P::GROUP,
            count,
            len,
        });
    }
    Ok(())
}

/// Multiplies the `i`-th point of each group by `secret^i`, in place.
///
/// Only the first `g1_count` points of `g1_points` and the first `g2_count`
/// points of `g2_points` are updated. Both groups receive the same power at a
/// given index so that they keep encoding the same power of tau.
///
/// Counts and secret are checked before any point is touched: on error both
/// slices are left as they were.
pub fn apply_powers(
    g1_points: &mut [G1Affine],
    g2_points: &mut [G2Affine],
    g1_count: usize,
    g2_count: usize,
    secret: &Scalar,
) -> Result<()> {
    check_count::<G1Affine>(g1_count, g1_points.len())?;
    check_count::<G2Affine>(g2_count, g2_points.len())?;
    if bool::from(secret.is_zero()) {
        return Err(Error::ZeroOrInvalidScalar);
    }
    debug!(g1_count, g2_count, "applying powers");
    apply_ladder(&mut g1_points[..g1_count], &mut g2_points[..g2_count], secret);
    Ok(())
}

// The ladder is sequential: each power depends on the previous one. Only the
// two group operations at the same index run concurrently.
fn apply_ladder(g1_points: &mut [G1Affine], g2_points: &mut [G2Affine], secret: &Scalar) {
    let steps = g1_points.len().max(g2_points.len());
    for (i, power) in PowerLadder::new(*secret).take(steps).enumerate() {
        let power = &power;
        rayon::join(
            || {
                if let Some(point) = g1_points.get_mut(i) {
                    *point = point.mul_scalar(power);
                }
            },
            || {
                if let Some(point) = g2_points.get_mut(i) {
                    *point = point.mul_scalar(power);
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{modulus, scalar_from_biguint};
    use num_bigint::BigUint;
    use proptest::prelude::*;

    fn g1_points(n: u64) -> Vec<G1Affine> {
        (1..=n)
            .map(|k| G1Affine::generator().mul_scalar(&Scalar::from(k * 7 + 3)))
            .collect()
    }

    fn g2_points(n: u64) -> Vec<G2Affine> {
        (1..=n)
            .map(|k| G2Affine::generator().mul_scalar(&Scalar::from(k * 11 + 2)))
            .collect()
    }

    #[test]
    fn test_ladder_starts_at_one() {
        let powers: Vec<Scalar> = PowerLadder::new(Scalar::from(3u64)).take(5).collect();
        let expected: Vec<Scalar> = [1u64, 3, 9, 27, 81].into_iter().map(Scalar::from).collect();
        assert_eq!(powers, expected);
    }

    #[test]
    fn test_ladder_wraps_past_modulus() {
        // secret close to the modulus so that the second power already wraps
        let secret_int = modulus() - 2u32;
        let secret = scalar_from_biguint(&secret_int);
        let r = modulus();
        for (n, power) in PowerLadder::new(secret).take(40).enumerate() {
            let expected = secret_int.modpow(&BigUint::from(n), &r);
            assert_eq!(power, scalar_from_biguint(&expected), "power {n}");
        }
    }

    #[test]
    fn test_ladder_with_zero_secret() {
        let powers: Vec<Scalar> = PowerLadder::new(Scalar::ZERO).take(4).collect();
        assert_eq!(powers, vec![Scalar::ONE, Scalar::ZERO, Scalar::ZERO, Scalar::ZERO]);
    }

    #[test]
    fn test_end_to_end_scenario() {
        let original_g1 = g1_points(4);
        let original_g2 = g2_points(2);
        let mut g1 = original_g1.clone();
        let mut g2 = original_g2.clone();

        apply_powers(&mut g1, &mut g2, 4, 2, &Scalar::from(5u64)).unwrap();

        let expected_g1: Vec<G1Affine> = original_g1
            .iter()
            .zip([1u64, 5, 25, 125])
            .map(|(p, k)| p.mul_scalar(&Scalar::from(k)))
            .collect();
        let expected_g2: Vec<G2Affine> = original_g2
            .iter()
            .zip([1u64, 5])
            .map(|(p, k)| p.mul_scalar(&Scalar::from(k)))
            .collect();
        assert_eq!(g1, expected_g1);
        assert_eq!(g2, expected_g2);
        assert_eq!(g1[0], original_g1[0]);
    }

    #[test]
    fn test_counts_below_lengths() {
        let original_g1 = g1_points(6);
        let original_g2 = g2_points(5);
        let mut g1 = original_g1.clone();
        let mut g2 = original_g2.clone();

        apply_powers(&mut g1, &mut g2, 4, 2, &Scalar::from(2u64)).unwrap();

        assert_eq!(g1[3], original_g1[3].mul_scalar(&Scalar::from(8u64)));
        assert_eq!(g1[4..], original_g1[4..]);
        assert_eq!(g2[1], original_g2[1].mul_scalar(&Scalar::from(2u64)));
        assert_eq!(g2[2..], original_g2[2..]);
    }

    #[test]
    fn test_g2_count_larger_than_g1_count() {
        let original_g1 = g1_points(2);
        let original_g2 = g2_points(4);
        let mut g1 = original_g1.clone();
        let mut g2 = original_g2.clone();

        apply_powers(&mut g1, &mut g2, 2, 4, &Scalar::from(3u64)).unwrap();

        assert_eq!(g1[1], original_g1[1].mul_scalar(&Scalar::from(3u64)));
        assert_eq!(g2[3], original_g2[3].mul_scalar(&Scalar::from(27u64)));
    }

    #[test]
    fn test_zero_counts() {
        let original_g1 = g1_points(3);
        let mut g1 = original_g1.clone();
        apply_powers(&mut g1, &mut [], 0, 0, &Scalar::from(9u64)).unwrap();
        assert_eq!(g1, original_g1);
    }

    #[test]
    fn test_count_out_of_range() {
        let original_g1 = g1_points(3);
        let mut g1 = original_g1.clone();
        let mut g2 = g2_points(1);

        let err = apply_powers(&mut g1, &mut g2, 3, 2, &Scalar::from(5u64)).unwrap_err();
        assert!(matches!(
            err,
            Error::CountOutOfRange {
                group: "G2",
                count: 2,
                len: 1
            }
        ));
        assert_eq!(g1, original_g1);
    }

    #[test]
    fn test_zero_secret_is_rejected() {
        let original_g1 = g1_points(3);
        let original_g2 = g2_points(2);
        let mut g1 = original_g1.clone();
        let mut g2 = original_g2.clone();

        let err = apply_powers(&mut g1, &mut g2, 3, 2, &Scalar::ZERO).unwrap_err();
        assert!(matches!(err, Error::ZeroOrInvalidScalar));
        assert_eq!(g1, original_g1);
        assert_eq!(g2, original_g2);
    }

    #[test]
    fn test_zero_secret_collapses_higher_powers() {
        let original_g1 = g1_points(3);
        let mut g1 = original_g1.clone();
        let mut g2 = g2_points(2);

        apply_ladder(&mut g1, &mut g2, &Scalar::ZERO);

        assert_eq!(g1[0], original_g1[0]);
        assert_eq!(g1[1], G1Affine::identity());
        assert_eq!(g1[2], G1Affine::identity());
        assert_eq!(g2[1], G2Affine::identity());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_power_correctness(secret in 1u64.., g1_count in 0usize..6, g2_count in 0usize..6) {
            let original_g1 = g1_points(6);
            let original_g2 = g2_points(6);
            let mut g1 = original_g1.clone();
            let mut g2 = original_g2.clone();
            let secret = Scalar::from(secret);

            apply_powers(&mut g1, &mut g2, g1_count, g2_count, &secret).unwrap();

            for i in 0..6 {
                let power = secret.pow_vartime([i as u64]);
                if i < g1_count {
                    prop_assert_eq!(g1[i], original_g1[i].mul_scalar(&power));
                } else {
                    prop_assert_eq!(g1[i], original_g1[i]);
                }
                if i < g2_count {
                    prop_assert_eq!(g2[i], original_g2[i].mul_scalar(&power));
                } else {
                    prop_assert_eq!(g2[i], original_g2[i]);
                }
            }
        }
    }
}
