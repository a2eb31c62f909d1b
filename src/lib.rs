//! farmlog library
//!
//! Offline-first weather advice and transaction categorization for
//! smallholder farm records. The binary in `main.rs` is a thin shell over
//! these modules.

pub mod app;
pub mod cache;
pub mod cli;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod finance;
pub mod weather;
