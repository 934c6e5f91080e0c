//! Error handling for the file cache
//!
//! Every variant carries a `RecoveryHint` describing what an operator could
//! do about it. The cache itself never acts on the hint: failures propagate
//! to the caller unchanged.

mod conversions;
mod display;
mod types;

pub use types::*;
