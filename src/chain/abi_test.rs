//! Encoding vectors for the fixed contract ABIs.

use super::abi::{
    decode_address, decode_bool, decode_u128, parse_address, parse_quantity, quantity_hex,
    word_u128, Calldata, ReturnData, SEL_BOOK_APPOINTMENT, SEL_CANCEL_APPOINTMENT,
    SEL_UPLOAD_FILE,
};
use crate::error::Error;

#[test]
fn quantity_words_are_big_endian() {
    let word = word_u128(100);
    assert_eq!(hex::encode(word), format!("{:064x}", 100));
    assert_eq!(decode_u128(&word).unwrap(), 100);
}

#[test]
fn quantity_decode_rejects_values_over_128_bits() {
    let mut word = [0u8; 32];
    word[0] = 1;
    assert!(matches!(
        decode_u128(&word),
        Err(Error::MalformedResponse(_))
    ));
}

#[test]
fn cancel_calldata_matches_hand_encoding() {
    let data = Calldata::new(SEL_CANCEL_APPOINTMENT).uint(7u64).build();
    assert_eq!(hex::encode(data), format!("a7e64405{:064x}", 7));
}

#[test]
fn booking_calldata_places_the_empty_string_tail() {
    // bookAppointment(1, 1744108200, ""), scheduled for 2025-04-08T10:30:00Z
    let data = Calldata::new(SEL_BOOK_APPOINTMENT)
        .uint(1u64)
        .uint(1_744_108_200u128)
        .string("")
        .build();
    let expected = format!(
        "5ea473d2{:064x}{:064x}{:064x}{:064x}",
        1, 1_744_108_200u64, 0x60, 0
    );
    assert_eq!(hex::encode(data), expected);
}

#[test]
fn upload_calldata_encodes_two_string_tails() {
    let data = Calldata::new(SEL_UPLOAD_FILE)
        .string("QmCid")
        .string("scan.pdf")
        .build();
    let expected = format!(
        "996d50bf{:064x}{:064x}{:064x}{}{}{:064x}{}{}",
        0x40,
        0x80,
        5,
        hex::encode("QmCid"),
        "0".repeat(54),
        8,
        hex::encode("scan.pdf"),
        "0".repeat(48),
    );
    assert_eq!(hex::encode(data), expected);
}

#[test]
fn wallet_hex_quantities_parse_and_print() {
    assert_eq!(parse_quantity("0x7f7").unwrap(), 2039);
    assert_eq!(parse_quantity("0x0").unwrap(), 0);
    assert_eq!(quantity_hex(100), "0x64");
    assert_eq!(quantity_hex(0), "0x0");
    assert!(parse_quantity("7f7").is_err());
    assert!(parse_quantity("0x").is_err());
    assert!(parse_quantity("0xzz").is_err());
}

#[test]
fn addresses_validate_and_decode_lowercase() {
    let raw = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    assert!(parse_address(raw).is_ok());
    assert!(parse_address("0x1234").is_err());
    assert!(parse_address("5fbdb2315678afecb367f032d93f642f64180aa3").is_err());

    let mut word = [0u8; 32];
    word[12..].copy_from_slice(&parse_address(raw).unwrap());
    assert_eq!(
        decode_address(&word).unwrap(),
        "0x5fbdb2315678afecb367f032d93f642f64180aa3"
    );
}

#[test]
fn bool_words_only_accept_zero_and_one() {
    assert!(!decode_bool(&word_u128(0)).unwrap());
    assert!(decode_bool(&word_u128(1)).unwrap());
    assert!(decode_bool(&word_u128(2)).is_err());
}

#[test]
fn return_data_is_word_indexed_with_bounds() {
    let ret = ReturnData::from_hex(&format!("0x{:064x}", 42)).unwrap();
    assert_eq!(decode_u128(ret.word(0).unwrap()).unwrap(), 42);
    assert!(matches!(ret.word(1), Err(Error::MalformedResponse(_))));
}
