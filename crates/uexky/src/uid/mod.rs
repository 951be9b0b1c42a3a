mod codec;
mod layout;
mod parse;

pub use codec::*;
pub use layout::*;
pub use parse::*;
