//! Serde adapters for packed layout ids.
//!
//! Use them with `#[serde(with = "...")]` on fields holding a [`FlakeId`].
//! [`Uid`] needs none of this: it is already a transparent string.
//!
//! [`FlakeId`]: crate::FlakeId
//! [`Uid`]: crate::Uid

mod decimal;
mod error;

pub use decimal::*;
pub use error::*;
