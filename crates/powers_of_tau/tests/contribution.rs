// SPDX-FileCopyrightText: 2024 Nomadic Labs <contact@nomadic-labs.com>
//
// SPDX-License-Identifier: MIT

use blstrs::{pairing, G1Affine, G2Affine, Scalar};
use ff::Field;
use powers_of_tau::codec::CompressedPoint;
use powers_of_tau::{
    encode_batch, parse_secret, Ceremony, Codec, JsonFile, Transcript, TranscriptSource,
    TrustedSetup,
};

fn setup_for_tau(tau: u64, g1_count: usize, g2_count: usize) -> Transcript {
    let tau = Scalar::from(tau);
    let g1: Vec<G1Affine> = (0..g1_count)
        .map(|i| G1Affine::generator().mul_scalar(&tau.pow_vartime([i as u64])))
        .collect();
    let g2: Vec<G2Affine> = (0..g2_count)
        .map(|i| G2Affine::generator().mul_scalar(&tau.pow_vartime([i as u64])))
        .collect();
    Transcript::new(encode_batch(&g1), encode_batch(&g2))
}

#[test]
fn test_contribution_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("transcript.json");
    let output = dir.path().join("trusted_setup.json");

    let ceremony = Ceremony {
        transcripts: vec![setup_for_tau(7, 4, 2), setup_for_tau(7, 8, 3)],
    };
    std::fs::write(&input, serde_json::to_vec(&ceremony).unwrap()).unwrap();

    let mut ceremony = JsonFile(input).load().unwrap();
    let transcript = ceremony.transcript_mut(1).unwrap();
    let secret = parse_secret("5").unwrap();
    transcript
        .update_powers_of_tau(&secret, &Codec::trusted())
        .unwrap();
    transcript.to_trusted_setup().write_to(&output).unwrap();

    let written: TrustedSetup =
        serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
    let codec = Codec::checked();
    let g1 = codec.decode_g1_batch(&written.g1_monomial).unwrap();
    let g2 = codec.decode_g2_batch(&written.g2_monomial).unwrap();

    // the new setup encodes powers of 7 * 5
    assert_eq!(g1, setup_points_g1(35, 8));
    assert_eq!(g2[2], G2Affine::generator().mul_scalar(&Scalar::from(35u64 * 35)));

    // consecutive G1 powers are consistent with the G2 power of tau
    for i in 0..g1.len() - 1 {
        assert_eq!(pairing(&g1[i + 1], &g2[0]), pairing(&g1[i], &g2[1]));
    }
}

fn setup_points_g1(tau: u64, count: usize) -> Vec<G1Affine> {
    let tau = Scalar::from(tau);
    (0..count)
        .map(|i| G1Affine::generator().mul_scalar(&tau.pow_vartime([i as u64])))
        .collect()
}

#[test]
fn test_two_contributions_compose() {
    let mut transcript = setup_for_tau(1, 5, 2);
    let codec = Codec::trusted();
    transcript
        .update_powers_of_tau(&parse_secret("3").unwrap(), &codec)
        .unwrap();
    transcript
        .update_powers_of_tau(&parse_secret("11").unwrap(), &codec)
        .unwrap();

    assert_eq!(transcript, setup_for_tau(33, 5, 2));
}
