#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::return_self_not_must_use)]

pub mod config;
pub mod error;
pub mod source;
pub mod version;

pub use config::{Config, CONFIG_FILE};
pub use error::Error;
pub use source::Source;
pub use version::VERSION;
