//! A null-terminated/length-restricted string based on a subset of ASCII
use std::{
    borrow::Cow,
    fmt,
    str::{self, FromStr},
};
use thiserror::Error;

/// A null-terminated/length-restricted string based on a subset of ASCII
///
/// Several LSDJ structures have names (e.g. files, instruments and speech words), which are
/// encoded as null-terminated strings with a maximal length (think [strnlen](https://en.cppreference.com/w/c/string/byte/strlen)).
///
/// The maximum length isn't the same everywhere, which is why this struct is generic over its length.
///
/// The characters LSDJ itself lets you type are (ASCII) `A-Z`, `0-9`, space and `x`. The `x` is
/// represented as a lightning glyph in the default LSDJ ROM. Names read from memory are kept
/// verbatim though, even when they contain other bytes: it's not our job to reject a song
/// because somebody patched their ROM's font.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> Name<N> {
    // The special lightning bolt character (the actual glyph depends on your ROM)
    const LIGHTNING_BOLT_CHAR: u8 = 120; // x

    /// Copy a name from raw bytes, as stored in LSDJ memory
    ///
    /// The bytes are kept as-is (including anything after a null-terminator), so that
    /// reading and writing a name is lossless. This only fails if the slice is too long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FromBytesError> {
        if bytes.len() > N {
            return Err(FromBytesError::TooLong);
        }

        let mut dest = [0; N];
        dest[..bytes.len()].copy_from_slice(bytes);

        Ok(Self { bytes: dest })
    }

    /// Try to convert a byte slice to a name, only allowing characters LSDJ can display
    ///
    /// This function fails if the bytes are longer than the allowed length, or an invalid
    /// character is found before the null-terminator.
    pub fn from_bytes_checked(bytes: &[u8]) -> Result<Self, FromBytesError> {
        let name = Self::from_bytes(bytes)?;

        match name.first_invalid_byte() {
            Some((index, byte)) => Err(FromBytesError::InvalidByte { byte, index }),
            None => Ok(name),
        }
    }

    /// Access the underlying bytes that make up the name
    ///
    /// This includes any amount of 0's used for null-termination
    pub fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// The maximal number of characters allowed in the name
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The number of characters up to the null-termination (or N)
    pub fn len(&self) -> usize {
        self.bytes.iter().position(|c| *c == 0).unwrap_or(N)
    }

    /// Are there _any_ characters in the name string?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does the name only consist of characters LSDJ can display?
    pub fn is_valid(&self) -> bool {
        self.first_invalid_byte().is_none()
    }

    /// Convert to a string
    ///
    /// Borrows when the name is valid UTF-8, which every name LSDJ writes itself is.
    pub fn as_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes[..self.len()])
    }

    /// Is a specific byte within the subset of ASCII usable for name strings?
    pub fn is_byte_allowed(byte: u8) -> bool {
        // The only allowed characters are the capitals A-Z, digits 0-9, space or the special
        // lightning bolt character
        byte.is_ascii_uppercase()
            || byte.is_ascii_digit()
            || byte == b' '
            || byte == Self::LIGHTNING_BOLT_CHAR
    }

    fn first_invalid_byte(&self) -> Option<(usize, u8)> {
        self.bytes[..self.len()]
            .iter()
            .enumerate()
            .find(|(_, byte)| !Self::is_byte_allowed(**byte))
            .map(|(index, byte)| (index, *byte))
    }
}

impl<const N: usize> Default for Name<N> {
    fn default() -> Self {
        Self { bytes: [0; N] }
    }
}

impl<const N: usize> fmt::Display for Name<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'a, const N: usize> TryFrom<&'a [u8]> for Name<N> {
    type Error = FromBytesError;

    #[inline]
    fn try_from(bytes: &'a [u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl<'a, const N: usize> TryFrom<&'a str> for Name<N> {
    type Error = FromBytesError;

    #[inline]
    fn try_from(str: &'a str) -> Result<Self, Self::Error> {
        Self::from_bytes_checked(str.as_bytes())
    }
}

impl<const N: usize> FromStr for Name<N> {
    type Err = FromBytesError;

    #[inline]
    fn from_str(str: &str) -> Result<Self, Self::Err> {
        str.try_into()
    }
}

/// Errors that can result from trying to convert a byte slice to a [`Name`]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FromBytesError {
    /// Error case for when the source slice is too big to fit in the [`Name`] string
    #[error("The slice did not fit in the name array")]
    TooLong,

    /// Only a specific subset of ASCII characters are allowed in [`Name`] strings
    ///
    /// An invalid byte was found during conversion from bytes
    #[error("Byte {byte} at position {index} is not allowed as a name character")]
    InvalidByte { byte: u8, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str() {
        const HELLO: &str = "HELLO";

        let name = Name::<8>::from_str(HELLO).expect("bytes rejected");
        assert_eq!(name.len(), 5);
        assert!(!name.is_empty());
        assert_eq!(name.as_str(), HELLO);
        assert_eq!(format!("{name}"), HELLO);

        assert_eq!(
            Name::<8>::from_str("123456789"),
            Err(FromBytesError::TooLong)
        );

        assert_eq!(
            Name::<8>::from_str("A!"),
            Err(FromBytesError::InvalidByte {
                byte: 33, // '!'
                index: 1
            })
        );
    }

    #[test]
    fn verbatim_bytes() {
        let raw = [b'a', b'!', b' ', b'B', 0, 0xFF, 0, 0];
        let name = Name::<8>::from_bytes(&raw).unwrap();

        assert_eq!(name.bytes(), &raw);
        assert_eq!(name.len(), 4);
        assert_eq!(name.as_str(), "a! B");
        assert!(!name.is_valid());

        let padded = Name::<8>::from_bytes(b"HAPPY BD").unwrap();
        assert_eq!(padded.len(), 8);
        assert!(padded.is_valid());
    }

    #[test]
    fn default() {
        let name = Name::<8>::default();
        assert_eq!(name.len(), 0);
        assert!(name.is_empty());
        assert_eq!(name.as_str(), "");
    }
}
