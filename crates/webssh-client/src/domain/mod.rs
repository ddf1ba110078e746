//! Domain layer for webssh-client.
//!
//! Plain configuration types.  Reading files, environment variables or CLI
//! arguments into them is the job of `infrastructure` and `main.rs`.

pub mod config;

pub use config::ClientConfig;
