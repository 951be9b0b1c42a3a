use core::str::FromStr;

use crate::{Error, Result, Uid};

/// Any input accepted by [`Uid::parse`].
///
/// Callers that know which form they hold should use the explicit variants.
/// [`UidInput::Text`] is for values of unknown origin, such as a path segment
/// or a CLI argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UidInput<'a> {
    /// A storage integer.
    Storage(u64),
    /// A storage integer read from a signed `BIGINT` column.
    Signed(i64),
    /// A display string.
    Display(&'a str),
    /// Either a decimal storage integer or a display string. Digits that
    /// spell a valid storage integer are read as one; anything else must be
    /// a display string. Use [`UidInput::Display`] for display strings made
    /// only of digits, such as cursors or serialized fields.
    Text(&'a str),
    /// An identifier that has already been parsed.
    Parsed(Uid),
}

impl From<u64> for UidInput<'_> {
    fn from(raw: u64) -> Self {
        Self::Storage(raw)
    }
}

impl From<i64> for UidInput<'_> {
    fn from(raw: i64) -> Self {
        Self::Signed(raw)
    }
}

impl<'a> From<&'a str> for UidInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for UidInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

impl From<Uid> for UidInput<'_> {
    fn from(uid: Uid) -> Self {
        Self::Parsed(uid)
    }
}

impl Uid {
    /// Normalizes any supported input into a [`Uid`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] when the input matches neither a
    /// valid storage integer nor a valid display string.
    ///
    /// # Example
    ///
    /// ```
    /// use uexky::Uid;
    ///
    /// let uid = Uid::from_components(271_000_000, 4, 8, 15).unwrap();
    /// let display = uid.to_display();
    ///
    /// assert_eq!(Uid::parse(display.as_str()).unwrap(), uid);
    /// assert_eq!(Uid::parse(uid.to_raw()).unwrap(), uid);
    /// assert_eq!(Uid::parse(uid.to_raw().to_string().as_str()).unwrap(), uid);
    /// assert_eq!(Uid::parse(uid).unwrap(), uid);
    /// assert!(Uid::parse("not an id").is_err());
    /// ```
    pub fn parse<'a>(input: impl Into<UidInput<'a>>) -> Result<Self> {
        match input.into() {
            UidInput::Storage(raw) => Self::from_raw(raw),
            UidInput::Signed(raw) => Self::from_i64(raw),
            UidInput::Display(display) => Self::from_display(display),
            UidInput::Text(text) => Self::parse_text(text),
            UidInput::Parsed(uid) => Ok(uid),
        }
    }

    fn parse_text(text: &str) -> Result<Self> {
        let text = text.trim();
        if let Some(uid) = Self::parse_decimal(text) {
            return Ok(uid);
        }
        Self::from_display(text)
    }

    fn parse_decimal(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse::<u64>().ok().and_then(|raw| Self::from_raw(raw).ok())
    }
}

impl FromStr for Uid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(UidInput::Text(s))
    }
}
