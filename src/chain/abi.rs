//! Calldata encoding for the two deployed contracts
//!
//! The gateway talks to exactly two contracts whose ABIs are fixed at
//! deployment. Selectors and event topics are derived from the canonical
//! signatures and must match the deployed artifacts byte for byte; any
//! drift surfaces as a revert or a missing event, never as a silent
//! misinterpretation.

use crate::error::{Error, Result};

/// ABI word size in bytes
pub const WORD: usize = 32;

// AppointmentManager

/// `doctors(uint256)` registry getter
pub const SEL_DOCTORS: [u8; 4] = [0x6e, 0xfb, 0x1b, 0x84];
/// `bookAppointment(uint256,uint256,string)`, payable
pub const SEL_BOOK_APPOINTMENT: [u8; 4] = [0x5e, 0xa4, 0x73, 0xd2];
/// `cancelAppointment(uint256)`
pub const SEL_CANCEL_APPOINTMENT: [u8; 4] = [0xa7, 0xe6, 0x44, 0x05];
/// `appointments(uint256)` getter
pub const SEL_APPOINTMENTS: [u8; 4] = [0x12, 0xdc, 0x90, 0x13];

/// Topic of `AppointmentBooked(uint256 indexed appointmentId, address indexed patient, uint256 doctorId)`
pub const TOPIC_APPOINTMENT_BOOKED: &str =
    "0x82bb4fcdc78c8a61872b05f940ffc6304d86e17ded79a2c4379653191a62d224";

// MedicalFileVault

/// `uploadFile(string,string)`
pub const SEL_UPLOAD_FILE: [u8; 4] = [0x99, 0x6d, 0x50, 0xbf];

/// One ABI word holding `value` as a big-endian unsigned quantity
pub fn word_u128(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

fn check_word(word: &[u8]) -> Result<&[u8]> {
    if word.len() != WORD {
        return Err(Error::MalformedResponse(format!(
            "expected a {WORD}-byte word, got {} bytes",
            word.len()
        )));
    }
    Ok(word)
}

/// Decode an unsigned quantity that must fit in 128 bits
pub fn decode_u128(word: &[u8]) -> Result<u128> {
    let word = check_word(word)?;
    if word[..WORD - 16].iter().any(|b| *b != 0) {
        return Err(Error::MalformedResponse(
            "quantity exceeds 128 bits".to_string(),
        ));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[WORD - 16..]);
    Ok(u128::from_be_bytes(buf))
}

pub fn decode_u64(word: &[u8]) -> Result<u64> {
    u64::try_from(decode_u128(word)?)
        .map_err(|_| Error::MalformedResponse("quantity exceeds 64 bits".to_string()))
}

pub fn decode_bool(word: &[u8]) -> Result<bool> {
    match decode_u128(word)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(Error::MalformedResponse(format!(
            "boolean word holds {other}"
        ))),
    }
}

/// Decode an address word into its 0x-prefixed lowercase hex form
pub fn decode_address(word: &[u8]) -> Result<String> {
    let word = check_word(word)?;
    Ok(format!("0x{}", hex::encode(&word[WORD - 20..])))
}

/// Parse a 0x-prefixed hex quantity (`"0x7f7"` -> 2039)
pub fn parse_quantity(raw: &str) -> Result<u128> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| Error::MalformedResponse(format!("quantity {raw:?} missing 0x prefix")))?;
    if digits.is_empty() {
        return Err(Error::MalformedResponse(format!("empty quantity {raw:?}")));
    }
    u128::from_str_radix(digits, 16)
        .map_err(|_| Error::MalformedResponse(format!("invalid hex quantity {raw:?}")))
}

/// Minimal hex-quantity form used on the wire (`100` -> `"0x64"`)
pub fn quantity_hex(value: u128) -> String {
    format!("{value:#x}")
}

/// Parse a 0x-prefixed 20-byte address
pub fn parse_address(raw: &str) -> Result<[u8; 20]> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| Error::MalformedResponse(format!("address {raw:?} missing 0x prefix")))?;
    if digits.len() != 40 {
        return Err(Error::MalformedResponse(format!(
            "address {raw:?} is not 20 bytes"
        )));
    }
    let bytes = hex::decode(digits)
        .map_err(|_| Error::MalformedResponse(format!("address {raw:?} is not hex")))?;
    let mut address = [0u8; 20];
    address.copy_from_slice(&bytes);
    Ok(address)
}

/// 0x-prefixed hex for raw bytes
pub fn to_hex(data: &[u8]) -> String {
    format!("0x{}", hex::encode(data))
}

pub fn from_hex(raw: &str) -> Result<Vec<u8>> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    hex::decode(digits).map_err(|_| Error::MalformedResponse(format!("invalid hex data {raw:?}")))
}

enum Arg {
    Uint(u128),
    Str(String),
}

/// Calldata builder: a fixed selector followed by ABI-encoded arguments.
/// Dynamic strings get an offset word in the head and a length-prefixed,
/// word-padded tail; offsets are measured from the start of the argument
/// block.
pub struct Calldata {
    selector: [u8; 4],
    args: Vec<Arg>,
}

impl Calldata {
    pub fn new(selector: [u8; 4]) -> Self {
        Self {
            selector,
            args: Vec::new(),
        }
    }

    pub fn uint(mut self, value: impl Into<u128>) -> Self {
        self.args.push(Arg::Uint(value.into()));
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.args.push(Arg::Str(value.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let head_len = self.args.len() * WORD;
        let mut head = Vec::with_capacity(head_len);
        let mut tail = Vec::new();
        for arg in &self.args {
            match arg {
                Arg::Uint(value) => head.extend_from_slice(&word_u128(*value)),
                Arg::Str(value) => {
                    head.extend_from_slice(&word_u128((head_len + tail.len()) as u128));
                    tail.extend_from_slice(&word_u128(value.len() as u128));
                    tail.extend_from_slice(value.as_bytes());
                    let pad = (WORD - value.len() % WORD) % WORD;
                    tail.resize(tail.len() + pad, 0);
                }
            }
        }
        let mut data = Vec::with_capacity(4 + head_len + tail.len());
        data.extend_from_slice(&self.selector);
        data.extend_from_slice(&head);
        data.extend_from_slice(&tail);
        data
    }
}

/// Word-indexed view over `eth_call` return data
pub struct ReturnData(Vec<u8>);

impl ReturnData {
    pub fn from_hex(raw: &str) -> Result<Self> {
        Ok(Self(from_hex(raw)?))
    }

    pub fn word(&self, index: usize) -> Result<&[u8]> {
        self.0.get(index * WORD..(index + 1) * WORD).ok_or_else(|| {
            Error::MalformedResponse(format!("return data has no word {index}"))
        })
    }
}
