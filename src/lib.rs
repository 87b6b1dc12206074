pub mod config;
pub mod docker;
pub mod driver;
pub mod naming;
pub mod retry;

pub use config::{Config, Instance};
pub use driver::{Driver, Error, State};
