//! Tonneau
//!
//! Leaf building blocks for a messaging endpoint library:
//! - Validated per-socket option storage (`options`)
//! - Random RFC4122 connection identifiers (`uuid`)
//! - Error types (`error`)
//!
//! Neither component performs I/O or owns a socket lifecycle. Both are meant
//! to be embedded in a socket object: the socket forwards configuration
//! calls to its `OptionStore` and applies the validated values itself, and
//! it may call `generate_uuid` when a connection needs an anonymous
//! identity.

#![cfg_attr(not(test), deny(unsafe_code))]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod options;
pub mod uuid;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::error::{OptionError, Result};
    pub use crate::options::{OptionStore, SocketOption};
    pub use crate::uuid::{generate_uuid, UUID_LEN};
}
