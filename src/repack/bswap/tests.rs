use super::*;
use alloc::vec::Vec;
use archmage::testing::{CompileTimePolicy, for_each_token_permutation};

fn policy() -> CompileTimePolicy {
    if std::env::var_os("CI").is_some() {
        CompileTimePolicy::Fail
    } else {
        CompileTimePolicy::WarnStderr
    }
}

/// Byte counts around every vector width, including partial trailing words.
const TEST_BYTE_COUNTS: &[usize] = &[0, 1, 2, 3, 4, 7, 8, 15, 16, 17, 31, 32, 33, 63, 64, 65, 130];

fn make_bytes(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 251) as u8).collect()
}

fn ref_swap(data: &[u8], size: usize) -> Vec<u8> {
    let mut out = data.to_vec();
    for w in out.chunks_exact_mut(size) {
        w.reverse();
    }
    out
}

#[test]
fn permutation_swap16() {
    let report = for_each_token_permutation(policy(), |perm| {
        for &n in TEST_BYTE_COUNTS {
            let mut data = make_bytes(n);
            let expected = ref_swap(&data, 2);
            swap_words(&mut data, 2);
            assert_eq!(data, expected, "swap16 n={n} tier={perm}");
        }
    });
    std::eprintln!("swap16: {report}");
}

#[test]
fn permutation_swap32() {
    let report = for_each_token_permutation(policy(), |perm| {
        for &n in TEST_BYTE_COUNTS {
            let mut data = make_bytes(n);
            let expected = ref_swap(&data, 4);
            swap_words(&mut data, 4);
            assert_eq!(data, expected, "swap32 n={n} tier={perm}");
        }
    });
    std::eprintln!("swap32: {report}");
}

#[test]
fn swap_matches_word_byte_order() {
    let words = [0x1234u16, 0xABCD, 0x00FF];
    let mut buf: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
    swap_words(&mut buf, 2);
    let back: Vec<u16> = buf
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    assert_eq!(back, words);
}

#[test]
fn double_swap_is_identity() {
    let orig = make_bytes(100);
    let mut data = orig.clone();
    swap_words(&mut data, 4);
    assert_ne!(data, orig);
    swap_words(&mut data, 4);
    assert_eq!(data, orig);
}
