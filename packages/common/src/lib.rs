//! # Blocklist Common
//!
//! Data model shared by the block list editor crates: payload identifiers,
//! element types, the persisted property value and the static editor
//! configuration.

pub mod config;
pub mod element;
pub mod error;
pub mod result;
pub mod udi;
pub mod value;
pub mod visitor;

pub use config::*;
pub use element::*;
pub use error::*;
pub use result::*;
pub use udi::*;
pub use value::*;
pub use visitor::*;
