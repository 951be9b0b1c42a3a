use ::rand::{Rng, rng};

use crate::{Error, Result, Uid};

/// The 64-symbol, URL-safe alphabet of the display form.
pub const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Shortest valid display string, the length of [`Uid::MIN_RAW`].
pub const MIN_DISPLAY_LEN: usize = 4;
/// Longest valid display string, the length of [`Uid::MAX_RAW`].
pub const MAX_DISPLAY_LEN: usize = 11;

const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: u32 = 6;
const CHAR_MASK: u64 = (1 << BITS_PER_CHAR) - 1;

/// Lookup table for display-form decoding
const LOOKUP: [u8; 256] = {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0_u8;
    while i < 64 {
        lut[ALPHABET[i as usize] as usize] = i;
        i += 1;
    }
    lut
};

/// Encodes a storage integer into its display form.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] when `raw` is not a valid storage
/// integer (see [`Uid::from_raw`]).
///
/// # Example
///
/// ```
/// assert_eq!(uexky::encode(1 << 18).unwrap(), "ABAA");
/// assert_eq!(uexky::decode("ABAA").unwrap(), 1 << 18);
/// ```
pub fn encode(raw: u64) -> Result<String> {
    Uid::from_raw(raw).map(Uid::to_display)
}

/// Decodes a display string into its storage integer.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] when `display` has the wrong length,
/// contains symbols outside [`ALPHABET`], is not in canonical form, or
/// overflows the storage range.
pub fn decode(display: &str) -> Result<u64> {
    Uid::from_display(display).map(Uid::to_raw)
}

impl Uid {
    /// Returns the display form.
    ///
    /// The storage integer is written in base 64, most significant symbol
    /// first and without leading zero symbols, and then rotated right by one
    /// symbol: the *first* display symbol carries the least-significant six
    /// bits (the random field), followed by the remaining symbols in
    /// big-endian order.
    ///
    /// Because of the rotation, lexicographic order of display strings does
    /// not follow numeric order. Sort by [`Uid`] (storage order) instead.
    pub fn to_display(self) -> String {
        let mut buf = [0_u8; MAX_DISPLAY_LEN];
        let len = self.encode_to_buf(&mut buf);
        buf[..len].iter().copied().map(char::from).collect()
    }

    /// Writes the display form into `buf` without allocating and returns the
    /// number of symbols written.
    pub fn encode_to_buf(self, buf: &mut [u8; MAX_DISPLAY_LEN]) -> usize {
        // least-significant symbol first
        let mut digits = [0_u8; MAX_DISPLAY_LEN];
        let mut len = 0;
        let mut rest = self.to_raw();
        while rest > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let digit = (rest & CHAR_MASK) as u8;
            digits[len] = digit;
            rest >>= BITS_PER_CHAR;
            len += 1;
        }

        buf[0] = ALPHABET[usize::from(digits[0])];
        for (out, digit) in buf[1..len].iter_mut().zip(digits[1..len].iter().rev()) {
            *out = ALPHABET[usize::from(*digit)];
        }
        len
    }

    /// Parses a display string.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn from_display(display: &str) -> Result<Self> {
        let bytes = display.as_bytes();
        if !(MIN_DISPLAY_LEN..=MAX_DISPLAY_LEN).contains(&bytes.len()) {
            return Err(Error::invalid_identifier(display));
        }

        let mut values = [0_u8; MAX_DISPLAY_LEN];
        for (value, &byte) in values.iter_mut().zip(bytes) {
            let v = LOOKUP[usize::from(byte)];
            if v == NO_VALUE {
                return Err(Error::invalid_identifier(display));
            }
            *value = v;
        }
        // The most significant symbol sits right after the rotated one and
        // must not be a zero symbol, otherwise two strings would share a value.
        if values[1] == 0 {
            return Err(Error::invalid_identifier(display));
        }

        let raw = values[1..bytes.len()]
            .iter()
            .chain(&values[..1])
            .try_fold(0_u64, |acc, &v| {
                acc.checked_mul(1 << BITS_PER_CHAR)
                    .map(|acc| acc | u64::from(v))
            })
            .ok_or_else(|| Error::invalid_identifier(display))?;

        Self::from_raw(raw).map_err(|_| Error::invalid_identifier(display))
    }

    /// Returns `true` if `display` is a valid display string.
    pub fn is_display(display: &str) -> bool {
        Self::from_display(display).is_ok()
    }
}

/// Returns a random string of `len` symbols drawn from [`ALPHABET`].
///
/// Used for opaque tokens (sign-in codes, session tokens) that share the
/// identifier alphabet but carry no structure.
pub fn random_token(len: usize) -> String {
    let mut rng = rng();
    (0..len)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}
