//! Bit-order utilities shared by the password codecs.
//!
//! Bit sequences are plain `&[bool]` slices. Storage order is lsb0: index `i`
//! is value bit `i % 8` of byte `i / 8`. Games that document their streams
//! msb0 get exactly one [`flip_bit_order`] between storage and codepoints.

/// Numbering of bits inside a byte or codepoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// First bit is the least significant.
    Lsb0,
    /// First bit is the most significant.
    Msb0,
}

/// Maps an lsb0 index to the msb0 index of the same bit, or back.
pub fn flip_index(index: usize) -> usize {
    let start_of_byte = index / 8 * 8;
    start_of_byte + (7 - index % 8)
}

/// Reverses the bit order inside every byte. `bits.len()` must be a multiple of 8.
pub fn flip_bit_order(bits: &[bool]) -> Vec<bool> {
    debug_assert_eq!(bits.len() % 8, 0, "bit order flip needs whole bytes");
    (0..bits.len()).map(|i| bits[flip_index(i)]).collect()
}

/// Rotates so that the bit at index `n` becomes index 0.
pub fn rotate_left(bits: &[bool], n: usize) -> Vec<bool> {
    if bits.is_empty() {
        return Vec::new();
    }
    let n = n % bits.len();
    let mut out = Vec::with_capacity(bits.len());
    out.extend_from_slice(&bits[n..]);
    out.extend_from_slice(&bits[..n]);
    out
}

pub fn rotate_right(bits: &[bool], n: usize) -> Vec<bool> {
    if bits.is_empty() {
        return Vec::new();
    }
    let n = n % bits.len();
    rotate_left(bits, bits.len() - n)
}

/// Splits `bits` into `width`-bit codepoints. A short final group is read as
/// if padded with zeros.
pub fn chunk(bits: &[bool], width: usize, order: BitOrder) -> Vec<u32> {
    bits.chunks(width)
        .map(|group| {
            group.iter().enumerate().fold(0u32, |acc, (k, &bit)| {
                let shift = match order {
                    BitOrder::Msb0 => width - 1 - k,
                    BitOrder::Lsb0 => k,
                };
                acc | (u32::from(bit) << shift)
            })
        })
        .collect()
}

/// Inverse of [`chunk`]: expands each codepoint into `width` bits.
pub fn unchunk(codepoints: &[u32], width: usize, order: BitOrder) -> Vec<bool> {
    let mut out = Vec::with_capacity(codepoints.len() * width);
    for &cp in codepoints {
        for k in 0..width {
            let shift = match order {
                BitOrder::Msb0 => width - 1 - k,
                BitOrder::Lsb0 => k,
            };
            out.push((cp >> shift) & 1 == 1);
        }
    }
    out
}

pub fn from_u8(byte: u8) -> [bool; 8] {
    std::array::from_fn(|k| (byte >> k) & 1 == 1)
}

pub fn to_u8(bits: &[bool]) -> u8 {
    bits.iter()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (k, &bit)| acc | (u8::from(bit) << k))
}

/// Packs lsb0 bits into bytes; a trailing partial byte is zero-padded.
pub fn to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8).map(to_u8).collect()
}
