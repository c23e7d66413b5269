//! Recursive length-prefix encoding used by the host ledger
//!
//! Transactions, block headers and trie nodes all share this encoding.
//! Decoding is strict: only the canonical encoding of a value is accepted,
//! so `encode(decode(bytes)) == bytes` whenever `decode` succeeds.
//!
//! ## Layout
//!
//! | first byte    | meaning                                             |
//! |---------------|-----------------------------------------------------|
//! | `0x00..=0x7f` | the byte itself                                     |
//! | `0x80..=0xb7` | string of `prefix - 0x80` bytes                     |
//! | `0xb8..=0xbf` | string, `prefix - 0xb7` big-endian length bytes     |
//! | `0xc0..=0xf7` | list, payload of `prefix - 0xc0` bytes              |
//! | `0xf8..=0xff` | list, `prefix - 0xf7` big-endian length bytes       |

use crate::error::{Result, SubmarineError};

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_PAYLOAD_MAX: usize = 55;

/// Deepest list nesting `decode` accepts. Ledger structures nest a few
/// levels at most; anything deeper is rejected instead of recursed into.
pub const MAX_NESTING_DEPTH: usize = 256;

/// An owned, decoded item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        RlpItem::Bytes(bytes.into())
    }

    pub fn uint(value: u128) -> Self {
        RlpItem::Bytes(uint_bytes(value))
    }
}

/// Encode an item tree.
pub fn encode(item: &RlpItem) -> Vec<u8> {
    match item {
        RlpItem::Bytes(bytes) => encode_bytes(bytes),
        RlpItem::List(items) => {
            let encoded: Vec<Vec<u8>> = items.iter().map(encode).collect();
            encode_list(&encoded)
        }
    }
}

/// Decode exactly one item spanning the whole input.
pub fn decode(input: &[u8]) -> Result<RlpItem> {
    Rlp::new(input)?.to_item()
}

pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    if bytes.len() == 1 && bytes[0] < STRING_OFFSET {
        return vec![bytes[0]];
    }
    let mut out = Vec::with_capacity(bytes.len() + 9);
    push_header(&mut out, bytes.len(), STRING_OFFSET);
    out.extend_from_slice(bytes);
    out
}

/// Encode a list whose members are already encoded.
pub fn encode_list(encoded_items: &[Vec<u8>]) -> Vec<u8> {
    let payload_len: usize = encoded_items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_len + 9);
    push_header(&mut out, payload_len, LIST_OFFSET);
    for item in encoded_items {
        out.extend_from_slice(item);
    }
    out
}

pub fn encode_uint(value: u128) -> Vec<u8> {
    encode_bytes(&uint_bytes(value))
}

/// Minimal big-endian representation; zero is the empty string.
pub fn uint_bytes(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

fn push_header(out: &mut Vec<u8>, len: usize, offset: u8) {
    if len <= SHORT_PAYLOAD_MAX {
        out.push(offset + len as u8);
    } else {
        let len_bytes = uint_bytes(len as u128);
        out.push(offset + SHORT_PAYLOAD_MAX as u8 + len_bytes.len() as u8);
        out.extend_from_slice(&len_bytes);
    }
}

/// Borrowed view over one encoded item.
#[derive(Debug, Clone, Copy)]
pub struct Rlp<'a> {
    raw: &'a [u8],
    payload: &'a [u8],
    is_list: bool,
}

impl<'a> Rlp<'a> {
    /// Parse a single item; trailing bytes are rejected.
    pub fn new(input: &'a [u8]) -> Result<Self> {
        let (item, consumed) = Self::parse_prefix(input)?;
        if consumed != input.len() {
            return Err(SubmarineError::MalformedEncoding("trailing bytes after item"));
        }
        Ok(item)
    }

    fn parse_prefix(input: &'a [u8]) -> Result<(Self, usize)> {
        let prefix = *input
            .first()
            .ok_or(SubmarineError::MalformedEncoding("empty input"))?;

        let (is_list, header_len, payload_len) = match prefix {
            0x00..=0x7f => {
                let item = Rlp { raw: &input[..1], payload: &input[..1], is_list: false };
                return Ok((item, 1));
            }
            0x80..=0xb7 => (false, 1, (prefix - STRING_OFFSET) as usize),
            0xb8..=0xbf => {
                let len_of_len = (prefix - 0xb7) as usize;
                (false, 1 + len_of_len, read_long_length(input, len_of_len)?)
            }
            0xc0..=0xf7 => (true, 1, (prefix - LIST_OFFSET) as usize),
            0xf8..=0xff => {
                let len_of_len = (prefix - 0xf7) as usize;
                (true, 1 + len_of_len, read_long_length(input, len_of_len)?)
            }
        };

        let total = header_len
            .checked_add(payload_len)
            .ok_or(SubmarineError::MalformedEncoding("length overflows"))?;
        let raw = input
            .get(..total)
            .ok_or(SubmarineError::MalformedEncoding("length prefix exceeds input"))?;
        let payload = &raw[header_len..];

        if !is_list && payload.len() == 1 && payload[0] < STRING_OFFSET {
            return Err(SubmarineError::MalformedEncoding("single byte below 0x80 must encode as itself"));
        }

        Ok((Rlp { raw, payload, is_list }, total))
    }

    pub fn is_list(&self) -> bool {
        self.is_list
    }

    /// The exact encoded bytes of this item, header included.
    pub fn as_raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn as_bytes(&self) -> Result<&'a [u8]> {
        if self.is_list {
            return Err(SubmarineError::MalformedEncoding("expected a byte string, found a list"));
        }
        Ok(self.payload)
    }

    pub fn items(&self) -> Result<Vec<Rlp<'a>>> {
        if !self.is_list {
            return Err(SubmarineError::MalformedEncoding("expected a list, found a byte string"));
        }
        let mut items = Vec::new();
        let mut rest = self.payload;
        while !rest.is_empty() {
            let (item, used) = Self::parse_prefix(rest)?;
            items.push(item);
            rest = &rest[used..];
        }
        Ok(items)
    }

    pub fn as_u128(&self) -> Result<u128> {
        let bytes = self.as_bytes()?;
        if bytes.len() > 16 {
            return Err(SubmarineError::MalformedEncoding("integer wider than 128 bits"));
        }
        if bytes.first() == Some(&0) {
            return Err(SubmarineError::MalformedEncoding("integer has a leading zero byte"));
        }
        Ok(bytes.iter().fold(0u128, |acc, &b| (acc << 8) | b as u128))
    }

    pub fn as_u64(&self) -> Result<u64> {
        let value = self.as_u128()?;
        u64::try_from(value).map_err(|_| SubmarineError::MalformedEncoding("integer wider than 64 bits"))
    }

    pub fn as_fixed<const N: usize>(&self) -> Result<[u8; N]> {
        self.as_bytes()?
            .try_into()
            .map_err(|_| SubmarineError::MalformedEncoding("fixed-width field has the wrong length"))
    }

    pub fn to_item(&self) -> Result<RlpItem> {
        self.to_item_at(0)
    }

    fn to_item_at(&self, depth: usize) -> Result<RlpItem> {
        if !self.is_list {
            return Ok(RlpItem::Bytes(self.payload.to_vec()));
        }
        if depth >= MAX_NESTING_DEPTH {
            return Err(SubmarineError::MalformedEncoding("nesting too deep"));
        }
        let mut children = Vec::new();
        for child in self.items()? {
            children.push(child.to_item_at(depth + 1)?);
        }
        Ok(RlpItem::List(children))
    }
}

fn read_long_length(input: &[u8], len_of_len: usize) -> Result<usize> {
    let len_bytes = input
        .get(1..1 + len_of_len)
        .ok_or(SubmarineError::MalformedEncoding("truncated length field"))?;
    if len_bytes[0] == 0 {
        return Err(SubmarineError::MalformedEncoding("length field has a leading zero byte"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(SubmarineError::MalformedEncoding("length field too wide"));
    }
    let len = len_bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len <= SHORT_PAYLOAD_MAX {
        return Err(SubmarineError::MalformedEncoding("long form used for a short payload"));
    }
    Ok(len)
}
