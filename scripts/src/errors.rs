//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A CLI argument that should be an address is malformed
    InvalidAddress {
        /// The name of the offending parameter
        param: &'static str,
        /// The value that was passed for it
        value: String,
    },
    /// Error reading the deployments manifest
    ReadDeployments(String),
    /// Error writing the deployments manifest
    WriteDeployments(String),
    /// Error locating or parsing a compilation artifact
    ArtifactParsing(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// The address does not hold an ERC-1967 proxy
    NotAProxy(String),
    /// The proxy is missing from the deployments manifest
    ProxyNotRegistered(String),
    /// Error submitting a contract for source verification
    Verification(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::InvalidAddress { param, value } => {
                write!(f, "invalid {} address: {}", param, value)
            }
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::NotAProxy(s) => write!(f, "not an ERC-1967 proxy: {}", s),
            ScriptError::ProxyNotRegistered(s) => {
                write!(f, "proxy {} is not registered, force import it first", s)
            }
            ScriptError::Verification(s) => write!(f, "error verifying contract: {}", s),
        }
    }
}

impl Error for ScriptError {}
