use flightlog_common::{BlockDescriptor, BlockKind};

/// Base64 digits in ascending order of value.
const DIGITS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Characters per encoded cell.
pub const TOKEN_LEN: usize = 3;

/// Token marking a cell without a block.
pub const EMPTY_TOKEN: &str = "AAA";

const PACKED_BITS: u32 = 15;
const INSET_MASK: u32 = 0b11;
const KIND_MASK: u32 = 0b111;
const KIND_SHIFT: u32 = 12;

/// Errors from packing or unpacking a cell token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("invalid base64 symbol {0:?}")]
    InvalidSymbol(char),
    #[error("token {token:?} has {len} characters, expected {TOKEN_LEN}")]
    BadLength { token: String, len: usize },
    #[error("token {token:?} decodes to {value}, wider than {PACKED_BITS} bits")]
    Overflow { token: String, value: u32 },
    #[error("an all-zero goal block would encode to the empty-cell sentinel")]
    SentinelCollision,
}

/// Whether `byte` belongs to the 64-symbol alphabet.
pub fn is_base64_symbol(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'+' || byte == b'/'
}

/// Value of a single base64 digit.
pub fn digit_value(c: char) -> Result<u32, CodecError> {
    let v = match c {
        'A'..='Z' => c as u32 - 'A' as u32,
        'a'..='z' => c as u32 - 'a' as u32 + 26,
        '0'..='9' => c as u32 - '0' as u32 + 52,
        '+' => 62,
        '/' => 63,
        _ => return Err(CodecError::InvalidSymbol(c)),
    };
    Ok(v)
}

/// Pack a descriptor into its 15-bit layout.
///
/// Bits, LSB first: pos_x(2) neg_x(2) pos_y(2) neg_y(2) pos_z(2) neg_z(2) kind(3).
pub fn pack(block: &BlockDescriptor) -> u16 {
    let mut value = 0u32;
    for axis in 0..3 {
        let shift = (axis * 4) as u32;
        value |= (block.pos[axis] as u32 & INSET_MASK) << shift;
        value |= (block.neg[axis] as u32 & INSET_MASK) << (shift + 2);
    }
    value |= (block.kind.code() as u32 & KIND_MASK) << KIND_SHIFT;
    value as u16
}

/// Inverse of [`pack`]. Bits above the 15-bit layout are ignored.
pub fn unpack(value: u16) -> BlockDescriptor {
    let value = value as u32;
    let mut pos = [0u8; 3];
    let mut neg = [0u8; 3];
    for axis in 0..3 {
        let shift = (axis * 4) as u32;
        pos[axis] = ((value >> shift) & INSET_MASK) as u8;
        neg[axis] = ((value >> (shift + 2)) & INSET_MASK) as u8;
    }
    let code = ((value >> KIND_SHIFT) & KIND_MASK) as u8;
    BlockDescriptor {
        // Masked to three bits, always a valid code.
        kind: BlockKind::ALL[code as usize],
        pos,
        neg,
    }
}

/// Encode a block as a three-character token.
pub fn encode(block: &BlockDescriptor) -> Result<String, CodecError> {
    let mut value = pack(block) as u32;
    if value == 0 {
        return Err(CodecError::SentinelCollision);
    }
    let mut out = [DIGITS[0]; TOKEN_LEN];
    for slot in out.iter_mut().rev() {
        *slot = DIGITS[(value % 64) as usize];
        value /= 64;
    }
    Ok(out.iter().map(|&b| b as char).collect())
}

/// Decode a token into a block descriptor.
///
/// The sentinel is not special-cased here; use [`decode_cell`] when reading
/// grid bodies.
pub fn decode(token: &str) -> Result<BlockDescriptor, CodecError> {
    let len = token.chars().count();
    if len != TOKEN_LEN {
        return Err(CodecError::BadLength {
            token: token.to_string(),
            len,
        });
    }
    let mut value = 0u32;
    for c in token.chars() {
        value = value * 64 + digit_value(c)?;
    }
    if value >> PACKED_BITS != 0 {
        return Err(CodecError::Overflow {
            token: token.to_string(),
            value,
        });
    }
    Ok(unpack(value as u16))
}

/// Decode a grid-body token, mapping the sentinel to `None`.
pub fn decode_cell(token: &str) -> Result<Option<BlockDescriptor>, CodecError> {
    if token == EMPTY_TOKEN {
        return Ok(None);
    }
    decode(token).map(Some)
}
