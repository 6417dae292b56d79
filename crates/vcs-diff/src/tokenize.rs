//! Tokenization of raw buffers into comparable units.
//!
//! A unit is a borrowed view into the input buffer (a line, or in token
//! mode a run of one character class) carrying a packed hash+length value.
//! The low [`LENGTH_MASK_SZ`] bits of the hash hold the compared byte
//! length; a unit whose raw length does not fit is treated as binary.
//! Alongside the unit array an intra-array hash-chain index is built so
//! equal-hash units can be enumerated in expected O(1) per probe.

use crate::{DiffConfig, DiffError};
use bstr::BStr;

/// Number of low hash bits reserved for the unit byte length.
pub const LENGTH_MASK_SZ: u32 = 15;

/// Mask extracting the byte length from a packed hash.
pub const LENGTH_MASK: u64 = (1u64 << LENGTH_MASK_SZ) - 1;

/// Largest prime below 2^48; content hashes are reduced modulo this
/// before being packed above the length bits.
pub const HASH_PRIME: u64 = 281_474_976_710_597;

/// Window checked for NUL bytes when sniffing binary content.
pub const NUL_SNIFF_WINDOW: usize = 8192;

/// How two units are compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    /// Bytes must match exactly.
    Exact,
    /// Trailing whitespace is not significant.
    IgnoreEolWs,
    /// No whitespace is significant.
    IgnoreAllWs,
}

impl Compare {
    pub(crate) fn from_config(cfg: &DiffConfig) -> Self {
        if cfg.ignore_all_ws {
            Compare::IgnoreAllWs
        } else if cfg.ignore_eol_ws {
            Compare::IgnoreEolWs
        } else {
            Compare::Exact
        }
    }
}

#[inline]
pub(crate) fn is_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
}

/// One comparable unit: a borrowed slice of the input plus derived metadata.
#[derive(Debug, Clone, Copy)]
pub struct Unit<'a> {
    text: &'a [u8],
    /// `(content_hash % HASH_PRIME) << LENGTH_MASK_SZ | compared_len`.
    hash: u64,
    /// Offset of the first non-whitespace byte.
    indent: u32,
    /// Byte length after trimming surrounding whitespace.
    trim_len: u32,
    /// Whether the unit ended with a line terminator in the input. Only
    /// the final line of a buffer can lack one.
    has_eol: bool,
}

impl<'a> Unit<'a> {
    /// `bytewise` selects byte-at-a-time hashing (token mode) over the
    /// eight-bytes-per-step line hash.
    fn new(text: &'a [u8], cmp: Compare, bytewise: bool, has_eol: bool) -> Self {
        let indent = text.iter().take_while(|&&b| is_ws(b)).count();
        let trimmed = trim_end(&text[indent.min(text.len())..]);
        let hash_fn = if bytewise { hash_bytewise } else { hash_wordwise };
        let (h, eff_len) = match cmp {
            Compare::Exact => (hash_fn(text), text.len()),
            Compare::IgnoreEolWs => {
                let z = trim_end(text);
                (hash_fn(z), z.len())
            }
            Compare::IgnoreAllWs => hash_skip_ws(text),
        };
        Unit {
            text,
            hash: pack(h, eff_len),
            indent: indent as u32,
            trim_len: trimmed.len() as u32,
            has_eol,
        }
    }

    /// Raw bytes of the unit, without any line terminator.
    pub fn bytes(&self) -> &'a [u8] {
        self.text
    }

    pub fn as_bstr(&self) -> &'a BStr {
        BStr::new(self.text)
    }

    /// Packed hash+length value.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Compared byte length (the low bits of the packed hash).
    pub fn len(&self) -> usize {
        (self.hash & LENGTH_MASK) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the first non-whitespace byte.
    pub fn indent(&self) -> usize {
        self.indent as usize
    }

    /// Whether the unit carried a line terminator in the input.
    pub fn has_eol(&self) -> bool {
        self.has_eol
    }

    /// Length after trimming surrounding whitespace.
    pub fn trim_len(&self) -> usize {
        self.trim_len as usize
    }

    /// The unit's bytes with surrounding whitespace removed.
    pub fn trimmed(&self) -> &'a [u8] {
        let start = (self.indent as usize).min(self.text.len());
        &self.text[start..start + self.trim_len as usize]
    }
}

fn pack(h: u64, len: usize) -> u64 {
    ((h % HASH_PRIME) << LENGTH_MASK_SZ) | (len as u64 & LENGTH_MASK)
}

pub(crate) fn trim_end(z: &[u8]) -> &[u8] {
    let mut n = z.len();
    while n > 0 && is_ws(z[n - 1]) {
        n -= 1;
    }
    &z[..n]
}

/// DJB2a-style rolling hash, folding eight bytes per step.
fn hash_wordwise(z: &[u8]) -> u64 {
    let mut h: u64 = 5381;
    let mut chunks = z.chunks_exact(8);
    for w in chunks.by_ref() {
        let word = u64::from_le_bytes([w[0], w[1], w[2], w[3], w[4], w[5], w[6], w[7]]);
        h = h.wrapping_mul(33) ^ word;
    }
    for &b in chunks.remainder() {
        h = h.wrapping_mul(33) ^ u64::from(b);
    }
    h
}

/// Byte-at-a-time hash skipping whitespace; returns (hash, effective length).
fn hash_skip_ws(z: &[u8]) -> (u64, usize) {
    let mut h: u64 = 5381;
    let mut n = 0;
    for &b in z {
        if is_ws(b) {
            continue;
        }
        h = h.wrapping_mul(33) ^ u64::from(b);
        n += 1;
    }
    (h, n)
}

fn hash_bytewise(z: &[u8]) -> u64 {
    let mut h: u64 = 5381;
    for &b in z {
        h = h.wrapping_mul(33) ^ u64::from(b);
    }
    h
}

/// Compare two units under the given comparison mode.
///
/// The packed hash covers the compared bytes, so a hash mismatch is a
/// definitive inequality; on hash equality the bytes are still verified.
pub fn same_unit(a: &Unit<'_>, b: &Unit<'_>, cmp: Compare) -> bool {
    if a.hash != b.hash {
        return false;
    }
    // The terminator is part of the exact comparison: a final line
    // without one differs from its terminated twin, so a newline-at-eof
    // change shows up in the script. The whitespace-ignoring modes treat
    // the terminator like any other whitespace.
    if cmp == Compare::Exact && a.has_eol != b.has_eol {
        return false;
    }
    match cmp {
        Compare::Exact => a.text == b.text,
        Compare::IgnoreEolWs => trim_end(a.text) == trim_end(b.text),
        Compare::IgnoreAllWs => {
            let mut ia = a.text.iter().filter(|&&b| !is_ws(b));
            let mut ib = b.text.iter().filter(|&&b| !is_ws(b));
            loop {
                match (ia.next(), ib.next()) {
                    (None, None) => return true,
                    (Some(x), Some(y)) if x == y => {}
                    _ => return false,
                }
            }
        }
    }
}

/// A tokenized buffer: the unit array plus its hash-chain index.
///
/// The chain index maps bucket `hash % n` to the most recently added unit
/// in that bucket; each unit links to the previous occupant, so walking
/// the chain enumerates every unit whose hash lands in the same bucket.
pub struct Tokenized<'a> {
    units: Vec<Unit<'a>>,
    head: Vec<Option<u32>>,
    next: Vec<Option<u32>>,
}

impl<'a> Tokenized<'a> {
    fn from_units(units: Vec<Unit<'a>>) -> Self {
        let n = units.len();
        let mut head = vec![None; n];
        let mut next = vec![None; n];
        for (i, u) in units.iter().enumerate() {
            let bucket = (u.hash % n as u64) as usize;
            next[i] = head[bucket];
            head[bucket] = Some(i as u32);
        }
        Tokenized { units, head, next }
    }

    /// The same units rebuilt with whitespace-insensitive hashes.
    /// Used by the block aligner's whitespace-insensitive pre-split.
    pub(crate) fn rehash_ignore_ws(units: &[Unit<'a>]) -> Self {
        let rehashed = units
            .iter()
            .map(|u| Unit::new(u.text, Compare::IgnoreAllWs, false, u.has_eol))
            .collect();
        Tokenized::from_units(rehashed)
    }

    pub fn units(&self) -> &[Unit<'a>] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Walk the hash chain for `hash`, yielding candidate unit indices.
    ///
    /// Buckets can collide, so callers must verify with [`same_unit`].
    pub fn chain(&self, hash: u64) -> impl Iterator<Item = usize> + '_ {
        let mut cur = if self.units.is_empty() {
            None
        } else {
            self.head[(hash % self.units.len() as u64) as usize]
        };
        std::iter::from_fn(move || {
            let i = cur? as usize;
            cur = self.next[i];
            Some(i)
        })
    }
}

/// Quick binary sniff: NUL bytes near the start of the buffer.
pub fn looks_binary(data: &[u8]) -> bool {
    let n = data.len().min(NUL_SNIFF_WINDOW);
    data[..n].contains(&0)
}

/// Split a buffer into comparable units per the configuration.
///
/// Line mode splits on `\n` (terminator excluded); token mode splits on
/// maximal runs of one character class. Fails with [`DiffError::BinaryInput`]
/// when a unit exceeds the representable length or the buffer sniffs as
/// binary.
pub fn tokenize<'a>(data: &'a [u8], cfg: &DiffConfig) -> Result<Tokenized<'a>, DiffError> {
    if looks_binary(data) {
        return Err(DiffError::BinaryInput);
    }
    let cmp = Compare::from_config(cfg);
    let units = if cfg.by_token {
        split_tokens(data, cmp)?
    } else {
        split_lines(data, cfg, cmp)?
    };
    Ok(Tokenized::from_units(units))
}

fn split_lines<'a>(
    data: &'a [u8],
    cfg: &DiffConfig,
    cmp: Compare,
) -> Result<Vec<Unit<'a>>, DiffError> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut push = |mut line: &'a [u8], has_eol: bool| -> Result<(), DiffError> {
        if cfg.strip_cr && line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
        if line.len() > LENGTH_MASK as usize {
            return Err(DiffError::BinaryInput);
        }
        units.push(Unit::new(line, cmp, false, has_eol));
        Ok(())
    };
    for (i, &b) in data.iter().enumerate() {
        if b == b'\n' {
            push(&data[start..i], true)?;
            start = i + 1;
        }
    }
    if start < data.len() {
        push(&data[start..], false)?;
    }
    Ok(units)
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum CharClass {
    Alnum,
    Space,
    Punct,
}

fn class_of(b: u8) -> CharClass {
    if b.is_ascii_alphanumeric() || b >= 0x80 {
        CharClass::Alnum
    } else if b.is_ascii_whitespace() {
        CharClass::Space
    } else {
        CharClass::Punct
    }
}

fn split_tokens<'a>(data: &'a [u8], cmp: Compare) -> Result<Vec<Unit<'a>>, DiffError> {
    let mut units = Vec::new();
    let mut start = 0;
    while start < data.len() {
        let cls = class_of(data[start]);
        let mut end = start + 1;
        while end < data.len() && class_of(data[end]) == cls {
            end += 1;
        }
        if end - start > LENGTH_MASK as usize {
            return Err(DiffError::BinaryInput);
        }
        // Tokens have no terminator concept; mark them all alike.
        units.push(Unit::new(&data[start..end], cmp, true, true));
        start = end;
    }
    Ok(units)
}
