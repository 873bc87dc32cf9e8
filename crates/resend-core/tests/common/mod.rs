#![allow(dead_code)]

pub mod flaky_server;
pub mod mock_transport;
