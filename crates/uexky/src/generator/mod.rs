mod config;
mod status;
mod uid_generator;

pub use config::*;
pub use status::*;
pub use uid_generator::*;

#[cfg(all(test, feature = "async-tokio"))]
mod tests;
