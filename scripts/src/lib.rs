//! Scripts for deploying and upgrading the VMahout token behind a UUPS proxy.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod constants;
pub mod errors;
pub mod manifest;
pub mod solidity;
pub mod toolkit;
pub mod types;
pub mod utils;
pub mod verify;
