//! The deployments manifest, recording which proxies and implementations
//! the scripts know about

use std::{collections::BTreeMap, fs, path::Path};

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{errors::ScriptError, types::ProxyKind};

/// A proxy registered in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRecord {
    /// The address of the proxy
    pub address: Address,
    /// The upgradeability pattern of the proxy
    pub kind: ProxyKind,
    /// The implementation the proxy pointed to when last recorded
    pub implementation: Address,
}

/// An implementation deployed by the scripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationRecord {
    /// The address of the implementation
    pub address: Address,
    /// The name of the contract
    pub contract: String,
}

/// The contents of the deployments file
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Well-known addresses, keyed by role
    #[serde(default)]
    pub deployments: BTreeMap<String, Address>,
    /// Registered proxies
    #[serde(default)]
    pub proxies: Vec<ProxyRecord>,
    /// Deployed implementations, keyed by the hash of their creation bytecode
    #[serde(default)]
    pub implementations: BTreeMap<B256, ImplementationRecord>,
}

impl Manifest {
    /// Read the manifest at the given path, starting from an empty one if
    /// the file does not exist yet
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }

    /// Write the manifest to the given path, creating parent directories as needed
    pub fn save(&self, path: &Path) -> Result<(), ScriptError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }

    /// Record a well-known address under the given key
    pub fn record_deployment(&mut self, key: &str, address: Address) {
        self.deployments.insert(key.to_string(), address);
    }

    /// Look up a registered proxy
    pub fn proxy(&self, address: Address) -> Option<&ProxyRecord> {
        self.proxies.iter().find(|p| p.address == address)
    }

    /// Register a proxy, replacing any existing record for the same address
    pub fn register_proxy(&mut self, address: Address, kind: ProxyKind, implementation: Address) {
        let record = ProxyRecord {
            address,
            kind,
            implementation,
        };

        match self.proxies.iter_mut().find(|p| p.address == address) {
            Some(existing) => *existing = record,
            None => self.proxies.push(record),
        }
    }

    /// Look up the implementation deployed for the given bytecode version
    pub fn implementation_for(&self, version: B256) -> Option<Address> {
        self.implementations.get(&version).map(|r| r.address)
    }

    /// Register an implementation deployed for the given bytecode version
    pub fn register_implementation(&mut self, version: B256, address: Address, contract: &str) {
        self.implementations.insert(
            version,
            ImplementationRecord {
                address,
                contract: contract.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};
    use tempfile::tempdir;

    use super::*;

    const PROXY: Address = address!("0x1111111111111111111111111111111111111111");
    const IMPL_V1: Address = address!("0x2222222222222222222222222222222222222222");
    const IMPL_V2: Address = address!("0x3333333333333333333333333333333333333333");

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let manifest = Manifest::load(&dir.path().join("deployments.json")).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_register_proxy_replaces_existing() {
        let mut manifest = Manifest::default();
        manifest.register_proxy(PROXY, ProxyKind::Uups, IMPL_V1);
        manifest.register_proxy(PROXY, ProxyKind::Uups, IMPL_V2);

        assert_eq!(manifest.proxies.len(), 1);
        assert_eq!(manifest.proxy(PROXY).unwrap().implementation, IMPL_V2);
        assert!(manifest.proxy(IMPL_V1).is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deployments.json");
        let version = b256!("0x00000000000000000000000000000000000000000000000000000000000000aa");

        let mut manifest = Manifest::default();
        manifest.register_proxy(PROXY, ProxyKind::Uups, IMPL_V1);
        manifest.register_implementation(version, IMPL_V1, "VMahout");
        manifest.record_deployment("vmahout_proxy", PROXY);
        manifest.save(&path).unwrap();

        let reloaded = Manifest::load(&path).unwrap();
        assert_eq!(reloaded, manifest);
        assert_eq!(reloaded.implementation_for(version), Some(IMPL_V1));
        assert_eq!(reloaded.deployments["vmahout_proxy"], PROXY);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            Manifest::load(&path),
            Err(ScriptError::ReadDeployments(_))
        ));
    }
}
