//! Field helpers for `#[serde(with = "...")]`.
//!
//! [`Uid`](crate::Uid) does not implement `Serialize` itself: the same
//! identifier travels as a display string through APIs and as an integer
//! through storage rows, so every field picks its form explicitly.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use uexky::Uid;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Thread {
//!     #[serde(with = "uexky::serde::as_display")]
//!     id: Uid,
//!     #[serde(with = "uexky::serde::as_storage")]
//!     parent: Uid,
//! }
//! ```

mod uid;

pub use uid::*;
