use chrono::{DateTime, Utc};

use crate::{Result, Uid, UidSource};

/// A persisted value stamped with its identifier and creation time.
///
/// The uid is drawn exactly once, when the record is first built, and is
/// never reassigned. Records loaded back from storage go through
/// [`Record::restore`] instead, which keeps the stored values.
///
/// # Example
///
/// ```
/// use flakeuid::{Algorithm, Record, UidConfig, UidFacade};
///
/// let config = UidConfig::builder()
///     .algorithm(Algorithm::Sonyflake)
///     .epoch(Algorithm::Sonyflake.default_epoch())
///     .machine_id(1)
///     .build();
/// let facade = UidFacade::from_config(&config).unwrap();
///
/// let record = Record::new(&facade, "payload").unwrap();
/// assert_eq!(*record.data(), "payload");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record<T> {
    uid: Uid,
    created_at: DateTime<Utc>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    data: T,
}

impl<T> Record<T> {
    /// Creates a record with a fresh uid from `source`.
    ///
    /// # Errors
    ///
    /// Fails if `source` cannot produce an identifier. No record exists in
    /// that case, so nothing needs rolling back.
    pub fn new<S: UidSource + ?Sized>(source: &S, data: T) -> Result<Self> {
        let uid = source.next_uid()?;
        Ok(Self {
            uid,
            created_at: Utc::now(),
            data,
        })
    }

    /// Rebuilds a record from stored values without drawing a new uid.
    pub fn restore(uid: Uid, created_at: DateTime<Utc>, data: T) -> Self {
        Self {
            uid,
            created_at,
            data,
        }
    }

    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn into_parts(self) -> (Uid, DateTime<Utc>, T) {
        (self.uid, self.created_at, self.data)
    }
}
