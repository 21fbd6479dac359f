//! Type definitions used throughout the scripts

use std::{
    fmt::{self, Display},
    time::Duration,
};

use alloy::primitives::{Address, Bytes};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::LOCAL_NETWORKS;

/// The upgradeability pattern of a proxy
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// An ERC-1967 proxy whose upgrade logic lives in the implementation (ERC-1822)
    Uups,
}

impl Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Uups => write!(f, "uups"),
        }
    }
}

/// Whether to submit deployed contracts to the block explorer
#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerifyMode {
    /// Verify unless the network is a known local network
    Auto,
    /// Always verify
    Always,
    /// Never verify
    Never,
}

/// The network the scripts run against
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// The name of the network, used for logging only
    pub name: String,
    /// Whether the network has an explorer worth verifying against
    pub has_explorer: bool,
    /// How long to wait before verifying
    pub verify_delay: Duration,
}

impl NetworkConfig {
    /// Resolve the network configuration from its name and the verification mode
    pub fn new(name: impl Into<String>, mode: VerifyMode, verify_delay: Duration) -> Self {
        let name = name.into();
        let has_explorer = match mode {
            VerifyMode::Auto => !LOCAL_NETWORKS.contains(&name.as_str()),
            VerifyMode::Always => true,
            VerifyMode::Never => false,
        };

        Self {
            name,
            has_explorer,
            verify_delay,
        }
    }
}

/// A request to verify the source of a deployed contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRequest {
    /// The address of the deployed contract
    pub address: Address,
    /// The fully qualified name of the contract, if the verifier cannot infer it
    pub contract: Option<String>,
    /// ABI-encoded constructor arguments, if any
    pub constructor_args: Option<Bytes>,
}

impl VerifyRequest {
    /// A request carrying only the address
    pub fn new(address: Address) -> Self {
        Self {
            address,
            contract: None,
            constructor_args: None,
        }
    }

    /// Set the fully qualified contract name
    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    /// Set the ABI-encoded constructor arguments
    pub fn with_constructor_args(mut self, args: Bytes) -> Self {
        self.constructor_args = Some(args);
        self
    }
}
