//! Encryption.
//!
//! [`SecretKey`] wraps the age primitives; [`EncryptionManager`] owns one
//! vault's key lifecycle (resolution, generation, persistence) on top of it.

mod age;
mod manager;

pub use self::age::SecretKey;
pub use manager::{EncryptionManager, KeySource};
