//! Cell codec: packs a block descriptor into 15 bits and writes it as three
//! base64 digits, most significant first.
//!
//! # Invariants
//! - `"AAA"` is the empty-cell sentinel; no real block ever encodes to it.
//! - Every encoded token is exactly three characters long.

mod token;

pub use token::{
    CodecError, EMPTY_TOKEN, TOKEN_LEN, decode, decode_cell, digit_value, encode, is_base64_symbol,
    pack, unpack,
};
