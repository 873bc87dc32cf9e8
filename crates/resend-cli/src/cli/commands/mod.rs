//! CLI command handlers.

mod config;
mod request;

pub use config::show_config;
pub use request::run_request;

#[cfg(test)]
pub(crate) use request::build_request;
