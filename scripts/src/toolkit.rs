//! The chain toolkit: signer access, contract factories, and proxy lifecycle
//! management
//!
//! The workflows in [`crate::commands`] only talk to the chain through the
//! [`ChainToolkit`] trait. [`AlloyToolkit`] implements it against a live node,
//! bookkeeping deployed proxies and implementations in the deployments manifest.

use std::path::PathBuf;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, TxHash, B256},
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use tracing::{debug, info, warn};

use crate::{
    artifacts::ContractArtifact,
    constants::{
        PROXY_ARTIFACT, RECEIPT_POLL_ATTEMPTS, RECEIPT_POLL_INTERVAL, VMAHOUT_IMPLEMENTATION_KEY,
        VMAHOUT_PROXY_KEY,
    },
    errors::ScriptError,
    manifest::Manifest,
    solidity::IVMahout,
    types::ProxyKind,
    utils::{address_from_slot, implementation_slot, proxy_constructor_args, Client},
};

/// The operations the deploy and upgrade workflows need from the chain
#[allow(async_fn_in_trait)]
pub trait ChainToolkit {
    /// The identity that signs every transaction
    async fn deployer(&self) -> Result<Address, ScriptError>;

    /// Load the compiled contract with the given name
    fn contract_factory(&self, name: &str) -> Result<ContractArtifact, ScriptError>;

    /// Deploy an implementation from `factory` and a proxy in front of it,
    /// calling the implementation with `init_data` through the proxy.
    ///
    /// Returns the address of the proxy once the deployment is confirmed.
    async fn deploy_proxy(
        &self,
        factory: &ContractArtifact,
        init_data: Bytes,
        kind: ProxyKind,
    ) -> Result<Address, ScriptError>;

    /// Register an existing proxy so that it can be upgraded
    async fn force_import(
        &self,
        proxy: Address,
        factory: &ContractArtifact,
        kind: ProxyKind,
    ) -> Result<(), ScriptError>;

    /// Deploy an implementation from `factory` and point the proxy at it.
    ///
    /// Returns the address of the proxy once the upgrade is confirmed.
    async fn upgrade_proxy(
        &self,
        proxy: Address,
        factory: &ContractArtifact,
    ) -> Result<Address, ScriptError>;

    /// The implementation the proxy currently delegates to
    async fn implementation_address(&self, proxy: Address) -> Result<Address, ScriptError>;

    /// Fetch the minter role identifier from the token
    async fn minter_role(&self, token: Address) -> Result<B256, ScriptError>;

    /// Grant `role` on the token to `account`, returning the confirmed tx hash
    async fn grant_role(
        &self,
        token: Address,
        role: B256,
        account: Address,
    ) -> Result<TxHash, ScriptError>;
}

/// A [`ChainToolkit`] sending transactions through an alloy provider
pub struct AlloyToolkit {
    /// The signing client
    client: Client,
    /// The address of the signer attached to the client
    deployer: Address,
    /// The directory holding compilation artifacts
    artifacts_dir: PathBuf,
    /// The path of the deployments manifest
    deployments_path: PathBuf,
}

impl AlloyToolkit {
    /// Create a toolkit around a signing client
    pub fn new(
        client: Client,
        deployer: Address,
        artifacts_dir: PathBuf,
        deployments_path: PathBuf,
    ) -> Self {
        Self {
            client,
            deployer,
            artifacts_dir,
            deployments_path,
        }
    }

    /// Load the deployments manifest
    fn manifest(&self) -> Result<Manifest, ScriptError> {
        Manifest::load(&self.deployments_path)
    }

    /// Deploy the given creation code, returning the address of the new contract
    async fn deploy_contract(&self, code: Bytes) -> Result<Address, ScriptError> {
        let tx = TransactionRequest::default().with_deploy_code(code);
        let pending_tx = self
            .client
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

        let receipt = self
            .wait_for_receipt(*pending_tx.tx_hash(), ScriptError::ContractDeployment)
            .await?;
        if !receipt.status() {
            return Err(ScriptError::ContractDeployment(format!(
                "deployment reverted in tx {:#x}",
                receipt.transaction_hash
            )));
        }

        receipt.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment("receipt has no contract address".to_string())
        })
    }

    /// Poll for the receipt of a sent transaction, reporting failures as the
    /// given error class
    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        to_error: fn(String) -> ScriptError,
    ) -> Result<TransactionReceipt, ScriptError> {
        for _ in 0..RECEIPT_POLL_ATTEMPTS {
            let receipt = self
                .client
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| to_error(e.to_string()))?;

            match receipt {
                Some(receipt) => return Ok(receipt),
                None => tokio::time::sleep(RECEIPT_POLL_INTERVAL).await,
            }
        }

        Err(to_error(format!("no receipt for tx {tx_hash:#x}")))
    }

    /// Whether there is code deployed at the given address
    async fn has_code(&self, address: Address) -> Result<bool, ScriptError> {
        let code = self
            .client
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        Ok(!code.is_empty())
    }

    /// Reuse the implementation previously deployed for this version of the
    /// contract, or deploy a new one
    async fn fetch_or_deploy_implementation(
        &self,
        factory: &ContractArtifact,
    ) -> Result<Address, ScriptError> {
        let version = factory.version();
        let mut manifest = self.manifest()?;

        if let Some(existing) = manifest.implementation_for(version) {
            if self.has_code(existing).await? {
                info!("Reusing {} implementation at {existing:#x}", factory.name);
                return Ok(existing);
            }
            warn!(
                "Recorded {} implementation at {existing:#x} has no code, redeploying",
                factory.name
            );
        }

        info!("Deploying {} implementation", factory.name);
        let implementation = self.deploy_contract(factory.bytecode.clone()).await?;
        info!("{} implementation deployed at {implementation:#x}", factory.name);

        manifest.register_implementation(version, implementation, &factory.name);
        manifest.save(&self.deployments_path)?;
        Ok(implementation)
    }
}

/// Check that a transaction receipt reports success
fn ensure_success(receipt: &TransactionReceipt, action: &str) -> Result<(), ScriptError> {
    if receipt.status() {
        Ok(())
    } else {
        Err(ScriptError::ContractInteraction(format!(
            "{action} reverted in tx {:#x}",
            receipt.transaction_hash
        )))
    }
}

impl ChainToolkit for AlloyToolkit {
    async fn deployer(&self) -> Result<Address, ScriptError> {
        Ok(self.deployer)
    }

    fn contract_factory(&self, name: &str) -> Result<ContractArtifact, ScriptError> {
        ContractArtifact::load(&self.artifacts_dir, name)
    }

    async fn deploy_proxy(
        &self,
        factory: &ContractArtifact,
        init_data: Bytes,
        kind: ProxyKind,
    ) -> Result<Address, ScriptError> {
        let proxy_factory = self.contract_factory(PROXY_ARTIFACT)?;
        let implementation = self.fetch_or_deploy_implementation(factory).await?;

        let constructor_args = proxy_constructor_args(implementation, init_data);
        let proxy = self
            .deploy_contract(proxy_factory.creation_code(&constructor_args))
            .await?;
        debug!("{kind} proxy deployed at {proxy:#x} for {implementation:#x}");

        let mut manifest = self.manifest()?;
        manifest.register_proxy(proxy, kind, implementation);
        manifest.record_deployment(VMAHOUT_PROXY_KEY, proxy);
        manifest.record_deployment(VMAHOUT_IMPLEMENTATION_KEY, implementation);
        manifest.save(&self.deployments_path)?;

        Ok(proxy)
    }

    async fn force_import(
        &self,
        proxy: Address,
        factory: &ContractArtifact,
        kind: ProxyKind,
    ) -> Result<(), ScriptError> {
        let implementation = self.implementation_address(proxy).await?;
        debug!(
            "Importing {kind} proxy {proxy:#x} for {} at implementation {implementation:#x}",
            factory.name
        );

        let mut manifest = self.manifest()?;
        manifest.register_proxy(proxy, kind, implementation);
        manifest.record_deployment(VMAHOUT_PROXY_KEY, proxy);
        manifest.save(&self.deployments_path)
    }

    async fn upgrade_proxy(
        &self,
        proxy: Address,
        factory: &ContractArtifact,
    ) -> Result<Address, ScriptError> {
        let record = self
            .manifest()?
            .proxy(proxy)
            .cloned()
            .ok_or_else(|| ScriptError::ProxyNotRegistered(format!("{proxy:#x}")))?;

        let implementation = self.fetch_or_deploy_implementation(factory).await?;
        let current = self.implementation_address(proxy).await?;

        if current == implementation {
            info!("Proxy {proxy:#x} already points at {implementation:#x}");
        } else {
            let token = IVMahout::new(proxy, self.client.clone());
            let pending_tx = token
                .upgradeToAndCall(implementation, Bytes::new())
                .send()
                .await
                .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
            let receipt = self
                .wait_for_receipt(*pending_tx.tx_hash(), ScriptError::ContractInteraction)
                .await?;
            ensure_success(&receipt, "upgrade")?;
        }

        let mut manifest = self.manifest()?;
        manifest.register_proxy(proxy, record.kind, implementation);
        manifest.record_deployment(VMAHOUT_IMPLEMENTATION_KEY, implementation);
        manifest.save(&self.deployments_path)?;

        Ok(proxy)
    }

    async fn implementation_address(&self, proxy: Address) -> Result<Address, ScriptError> {
        let slot = self
            .client
            .get_storage_at(proxy, implementation_slot())
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        let implementation = address_from_slot(slot);
        if implementation.is_zero() {
            return Err(ScriptError::NotAProxy(format!("{proxy:#x}")));
        }
        Ok(implementation)
    }

    async fn minter_role(&self, token: Address) -> Result<B256, ScriptError> {
        IVMahout::new(token, self.client.clone())
            .MINTER_ROLE()
            .call()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn grant_role(
        &self,
        token: Address,
        role: B256,
        account: Address,
    ) -> Result<TxHash, ScriptError> {
        let pending_tx = IVMahout::new(token, self.client.clone())
            .grantRole(role, account)
            .send()
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        let receipt = self
            .wait_for_receipt(*pending_tx.tx_hash(), ScriptError::ContractInteraction)
            .await?;
        ensure_success(&receipt, "role grant")?;

        Ok(receipt.transaction_hash)
    }
}
