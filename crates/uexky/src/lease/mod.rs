mod interface;
mod memory;
#[cfg_attr(docsrs, doc(cfg(feature = "sled")))]
#[cfg(feature = "sled")]
mod sled;

pub use interface::*;
pub use memory::*;
#[cfg_attr(docsrs, doc(cfg(feature = "sled")))]
#[cfg(feature = "sled")]
pub use self::sled::*;
