#![doc = include_str!("../README.md")]

pub mod config;
mod entity;
mod error;
mod facade;
pub mod generator;
pub mod id;
mod machine;
#[cfg(feature = "serde")]
pub mod serde;
pub mod time;

pub use crate::config::{Algorithm, UidConfig, UidConfigBuilder};
pub use crate::entity::*;
pub use crate::error::*;
pub use crate::facade::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::machine::*;
pub use crate::time::*;
