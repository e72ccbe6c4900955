use core::{fmt, str::FromStr};

use crate::{Error, FlakeId, Result};

/// The external form of a generated identifier: a base-10 string.
///
/// Identifiers leave the crate as strings so they survive JSON and GraphQL
/// transport and clients limited to 53-bit integers. A `Uid` is opaque to
/// its holders; storage and API layers pass it through without reading it
/// as a number. [`Uid::to_raw`] exists for diagnostics such as
/// [`UidFacade::decompose`].
///
/// [`UidFacade::decompose`]: crate::UidFacade::decompose
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(String);

impl Uid {
    /// Formats a packed id as a `Uid`.
    pub fn from_id<ID: FlakeId>(id: ID) -> Self {
        Self(id.to_raw().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parses the string back into its integer value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUid`] if the string is not a plain base-10
    /// `u64` (signs, whitespace and empty strings are rejected).
    pub fn to_raw(&self) -> Result<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidUid(self.0.clone()));
        }
        self.0
            .parse()
            .map_err(|_| Error::InvalidUid(self.0.clone()))
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uid({})", self.0)
    }
}

impl From<String> for Uid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Uid {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<Uid> for String {
    fn from(value: Uid) -> Self {
        value.0
    }
}

impl FromStr for Uid {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
