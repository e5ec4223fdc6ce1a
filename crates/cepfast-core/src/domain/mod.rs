//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PostalCode`] | Lookup key raced across sources |
//! | [`Address`] | Normalized address every source maps into |

mod address;
mod postal_code;

pub use address::Address;
pub use postal_code::PostalCode;
