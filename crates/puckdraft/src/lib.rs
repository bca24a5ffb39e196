// Library root: re-exports all modules so integration tests and the binary
// share the crate's public API.

pub mod app;
pub mod config;
pub mod console;
pub mod draft;
pub mod players;
pub mod protocol;
pub mod valuation;
