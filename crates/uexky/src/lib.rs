#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
mod futures;
mod generator;
mod lease;
mod rand;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub mod serde;
mod slice;
mod time;
mod uid;

pub use crate::error::*;
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::lease::*;
pub use crate::rand::*;
pub use crate::slice::*;
pub use crate::time::*;
pub use crate::uid::*;
