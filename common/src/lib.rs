//! fxbook Common Types
//!
//! This crate contains the types shared across fxbook: the currency kind
//! registry, the fixed-point currency value, the domain error taxonomy and
//! the state fingerprint used for change detection.

pub mod currency;
pub mod monetary;
pub mod error;
pub mod fingerprint;

pub use currency::*;
pub use monetary::*;
pub use error::*;
pub use fingerprint::Fingerprint;
