// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn generated_tokens_are_well_formed() {
    let (token, salted) = SaltedToken::generate();
    assert!(is_well_formed(&token));
    assert_eq!(salted.last_eight, &token[32..]);
    assert_ne!(salted.hash, token);
}

#[test]
fn exact_token_verifies() {
    let (token, salted) = SaltedToken::generate();
    assert!(salted.verify(&token));
}

#[test]
fn every_single_bit_flip_fails() {
    let (token, salted) = SaltedToken::generate();
    let bytes = token.as_bytes();
    for i in 0..bytes.len() {
        for bit in 0..8 {
            let mut flipped = bytes.to_vec();
            flipped[i] ^= 1 << bit;
            let Ok(candidate) = String::from_utf8(flipped) else { continue };
            assert!(!salted.verify(&candidate), "flip of byte {i} bit {bit} verified");
        }
    }
}

#[test]
fn same_token_different_salt_hashes_differently() {
    let a = SaltedToken::from_plaintext("0123456789012345678901234567890123456789", "a".into());
    let b = SaltedToken::from_plaintext("0123456789012345678901234567890123456789", "b".into());
    assert_ne!(a.hash, b.hash);
    assert!(a.verify("0123456789012345678901234567890123456789"));
}

#[test]
fn corrupted_hash_never_verifies() {
    let (token, mut salted) = SaltedToken::generate();
    salted.hash = "zz".into();
    assert!(!salted.verify(&token));
}

#[yare::parameterized(
    valid       = { "0123456789abcdef0123456789abcdef01234567", true },
    uppercase   = { "0123456789ABCDEF0123456789abcdef01234567", false },
    too_short   = { "0123456789abcdef", false },
    too_long    = { "0123456789abcdef0123456789abcdef012345678", false },
    non_hex     = { "0123456789abcdef0123456789abcdef0123456g", false },
    empty       = { "", false },
)]
fn well_formed_tokens(token: &str, expected: bool) {
    assert_eq!(is_well_formed(token), expected);
}

#[test]
fn debug_does_not_leak_hash() {
    let (_, salted) = SaltedToken::generate();
    let debug = format!("{salted:?}");
    assert!(!debug.contains(&salted.hash));
}
