//! SHA3-256 known-answer and differential tests.
//!
//! The `sha3` crate serves only as an oracle here; it is never linked into
//! the library.

use iso16_core::seal::keccak::{RATE, Sha3_256};
use iso16_core::seal::{SEAL_PREFIX, seal_canonical};
use proptest::prelude::*;
use sha3::Digest;

fn oracle(data: &[u8]) -> Vec<u8> {
    sha3::Sha3_256::digest(data).to_vec()
}

#[test]
fn fips_202_known_answers() {
    let cases: [(&[u8], &str); 3] = [
        (
            b"",
            "a7ffc6f8bf1ed76651c14756a061d662f580ff4de43b49fa82d80a4b80f8434a",
        ),
        (
            b"abc",
            "3a985da74fe225b2045c172d6bd390bd855f086e3e9d525b46bfe24511431532",
        ),
        (
            b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq",
            "41c0dba2a9d6240849100376a8235e2c82e1b9998a999e21db32dd97496d3376",
        ),
    ];
    for (message, digest) in cases {
        assert_eq!(hex::encode(Sha3_256::digest(message)), digest);
    }
}

#[test]
fn million_a() {
    let mut hasher = Sha3_256::new();
    let chunk = [b'a'; 1000];
    for _ in 0..1000 {
        hasher.update(&chunk);
    }
    assert_eq!(
        hex::encode(hasher.finalize()),
        "5c8875ae474a3634ba4fd55ec85bffd661f32aca75c6d699d0cdcb6c115891c1"
    );
}

#[test]
fn every_length_around_two_blocks_matches_oracle() {
    let data: Vec<u8> = (0..=255u8).cycle().take(2 * RATE + 2).collect();
    for len in 0..=data.len() {
        assert_eq!(
            Sha3_256::digest(&data[..len]).to_vec(),
            oracle(&data[..len]),
            "length {len}"
        );
    }
}

#[test]
fn seal_is_prefixed_oracle_digest() {
    let body = b"canonical body";
    let mut prefixed = SEAL_PREFIX.to_vec();
    prefixed.extend_from_slice(body);
    assert_eq!(seal_canonical(body).as_str(), hex::encode(oracle(&prefixed)));
}

proptest! {
    #[test]
    fn prop_matches_oracle(data in prop::collection::vec(any::<u8>(), 0..1024)) {
        prop_assert_eq!(Sha3_256::digest(&data).to_vec(), oracle(&data));
    }

    #[test]
    fn prop_split_updates_match_one_shot(
        data in prop::collection::vec(any::<u8>(), 0..600),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(data.len() + 1);
        let mut hasher = Sha3_256::new();
        hasher.update(&data[..at]);
        hasher.update(&data[at..]);
        prop_assert_eq!(hasher.finalize(), Sha3_256::digest(&data));
    }

    #[test]
    fn prop_single_bit_flip_changes_seal(
        data in prop::collection::vec(any::<u8>(), 1..512),
        bit in any::<prop::sample::Index>(),
    ) {
        let position = bit.index(data.len() * 8);
        let mut flipped = data.clone();
        flipped[position / 8] ^= 1 << (position % 8);
        prop_assert_ne!(seal_canonical(&data), seal_canonical(&flipped));
    }
}
