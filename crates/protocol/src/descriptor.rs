//! String descriptor reply decoding
//!
//! The UPS answers every request with an ASCII payload embedded in a string
//! descriptor. The payload carries framing characters (`(`, `"`, `` ` ``)
//! that are stripped here; everything outside printable ASCII is dropped.

use crate::error::{Result, UpsError};
use crate::types::{REQ_NO_RET_MAX, RESPONSE_CAPACITY, Reply, UsbError};

const ASCII_MIN: u8 = 32;
const ASCII_MAX: u8 = 126;
const CHAR_QUOTE: u8 = b'"';
const CHAR_BACKTICK: u8 = b'`';
const CHAR_PAREN: u8 = b'(';

/// True if `byte` survives reply filtering
#[inline]
pub fn is_reply_char(byte: u8) -> bool {
    (ASCII_MIN..=ASCII_MAX).contains(&byte)
        && byte != CHAR_QUOTE
        && byte != CHAR_BACKTICK
        && byte != CHAR_PAREN
}

/// Filter raw bytes down to reply text
///
/// Keeps order and stops once `RESPONSE_CAPACITY - 1` characters are kept.
pub fn filter_printable(raw: &[u8]) -> String {
    raw.iter()
        .copied()
        .filter(|&b| is_reply_char(b))
        .take(RESPONSE_CAPACITY - 1)
        .map(char::from)
        .collect()
}

/// Decode the outcome of a descriptor transfer
///
/// `transfer` is either the bytes actually read or the transport error.
pub fn decode_reply(transfer: std::result::Result<&[u8], UsbError>) -> Result<Reply> {
    match transfer {
        Ok(raw) if raw.len() >= REQ_NO_RET_MAX => Ok(Reply::Text(filter_printable(raw))),
        Ok(_) => Ok(Reply::Acknowledged),
        Err(err) => Err(UpsError::Transport(err)),
    }
}
