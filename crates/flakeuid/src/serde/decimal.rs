use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serializer};

use super::SerdeError;
use crate::{FlakeId, Uid};

/// Writes an id as its base-10 string, the wire form every API payload uses.
///
/// # Example
///
/// ```
/// use flakeuid::{FlakeId, SnowflakeUid};
///
/// #[derive(serde::Serialize, serde::Deserialize)]
/// struct Row {
///     #[serde(with = "flakeuid::serde::as_decimal_str")]
///     id: SnowflakeUid,
/// }
///
/// let row = Row { id: SnowflakeUid::from_components(1000, 5, 0) };
/// let json = serde_json::to_string(&row).unwrap();
/// assert_eq!(json, r#"{"id":"4194324480"}"#);
///
/// let back: Row = serde_json::from_str(&json).unwrap();
/// assert_eq!(back.id, row.id);
/// ```
pub mod as_decimal_str {
    use super::*;

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<ID, S>(id: &ID, s: S) -> Result<S::Ok, S::Error>
    where
        ID: FlakeId,
        S: Serializer,
    {
        s.collect_str(id)
    }

    /// # Errors
    ///
    /// Fails if the input is not a base-10 string or sets the reserved bit.
    pub fn deserialize<'de, ID, D>(d: D) -> Result<ID, D::Error>
    where
        ID: FlakeId,
        D: Deserializer<'de>,
    {
        let text = Cow::<'de, str>::deserialize(d)?;
        let raw = Uid::from(&*text)
            .to_raw()
            .map_err(|_| serde::de::Error::custom(SerdeError::<ID>::NotDecimal(text.into_owned())))?;
        checked(raw)
    }
}

/// Writes an id as a plain integer, for internal stores that keep `u64`
/// columns. Avoid it on anything a 53-bit client reads.
pub mod as_native {
    use super::*;

    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<ID, S>(id: &ID, s: S) -> Result<S::Ok, S::Error>
    where
        ID: FlakeId,
        S: Serializer,
    {
        s.serialize_u64(id.to_raw())
    }

    /// # Errors
    ///
    /// Fails if the integer sets the reserved bit.
    pub fn deserialize<'de, ID, D>(d: D) -> Result<ID, D::Error>
    where
        ID: FlakeId,
        D: Deserializer<'de>,
    {
        checked(u64::deserialize(d)?)
    }
}

fn checked<ID: FlakeId, E: serde::de::Error>(raw: u64) -> Result<ID, E> {
    let id = ID::from_raw(raw);
    if !id.is_valid() {
        return Err(E::custom(SerdeError::DecodeOverflow { id }));
    }
    Ok(id)
}
