pub mod client;
pub mod config;
pub mod http;
pub mod logging;
pub mod retry;
pub mod transport;
