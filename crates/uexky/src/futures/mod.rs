//! Runtime glue for the async parts of the crate.
//!
//! The generator only needs one thing from a runtime: a way to suspend until
//! the next clock second when its sequence space is exhausted, and between
//! lease acquisition attempts. [`SleepProvider`] abstracts over that.

mod sleep_provider;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
mod tokio;

pub use sleep_provider::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use self::tokio::*;
