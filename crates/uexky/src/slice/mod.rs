mod engine;
mod interface;
mod memory;
mod query;
#[cfg_attr(docsrs, doc(cfg(feature = "sled")))]
#[cfg(feature = "sled")]
mod sled;

pub use engine::*;
pub use interface::*;
pub use memory::*;
pub use query::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sled")))]
#[cfg(feature = "sled")]
pub use self::sled::*;
