//! Implementations of the deploy and upgrade scripts

use alloy::primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use tracing::info;

use crate::{
    cli::{DeployVmahoutArgs, UpgradeVmahoutArgs},
    constants::{PROXY_CONTRACT_PATH, VMAHOUT_ARTIFACT},
    errors::ScriptError,
    solidity::initializeCall,
    toolkit::ChainToolkit,
    types::{NetworkConfig, ProxyKind, VerifyRequest},
    utils::proxy_constructor_args,
    verify::{verify_safe, Verifier},
};

/// Deploy the VMahout token behind a UUPS proxy, returning the proxy address.
///
/// The deployer is the token's admin and upgrader; `args.minter` receives the
/// minter role. On networks with an explorer, the implementation and proxy are
/// verified once the explorer has had time to index them.
pub async fn deploy_vmahout(
    args: DeployVmahoutArgs,
    toolkit: &impl ChainToolkit,
    verifier: &impl Verifier,
    network: &NetworkConfig,
) -> Result<Address, ScriptError> {
    let minter = args.minter_address()?;

    let deployer = toolkit.deployer().await?;

    info!("Deploying VMahout...");
    info!("  Deployer (admin & upgrader): {deployer:#x}");
    info!("  Minter:                      {minter:#x}");

    let factory = toolkit.contract_factory(VMAHOUT_ARTIFACT)?;
    let init_data = Bytes::from(
        initializeCall {
            admin: deployer,
            minter,
            upgrader: deployer,
        }
        .abi_encode(),
    );

    let proxy = toolkit
        .deploy_proxy(&factory, init_data.clone(), ProxyKind::Uups)
        .await?;
    info!("VMahout proxy deployed at: {proxy:#x}");

    if network.has_explorer {
        wait_for_explorer(network, "deployment").await;

        let implementation = toolkit.implementation_address(proxy).await?;
        info!("Verifying implementation at {implementation:#x}...");
        verify_safe(verifier, VerifyRequest::new(implementation)).await;

        info!("Verifying proxy at {proxy:#x}...");
        let proxy_request = VerifyRequest::new(proxy)
            .with_contract(PROXY_CONTRACT_PATH)
            .with_constructor_args(proxy_constructor_args(implementation, init_data));
        verify_safe(verifier, proxy_request).await;
    }

    Ok(proxy)
}

/// Upgrade an existing VMahout proxy to the current implementation, returning
/// the proxy address.
///
/// If `args.minter` is given, it is granted the minter role after the upgrade.
pub async fn upgrade_vmahout(
    args: UpgradeVmahoutArgs,
    toolkit: &impl ChainToolkit,
    verifier: &impl Verifier,
    network: &NetworkConfig,
) -> Result<Address, ScriptError> {
    let proxy = args.proxy_address()?;
    let minter = args.minter_address()?;

    let deployer = toolkit.deployer().await?;

    info!("Upgrading VMahout proxy at {proxy:#x}...");
    info!("  Upgrader (tx sender): {deployer:#x}");
    if let Some(minter) = minter {
        info!("  Minter (will receive MINTER_ROLE): {minter:#x}");
    }

    let factory = toolkit.contract_factory(VMAHOUT_ARTIFACT)?;

    // The manifest may predate this proxy, or the proxy may have been
    // deployed by other means
    toolkit.force_import(proxy, &factory, ProxyKind::Uups).await?;

    let upgraded = toolkit.upgrade_proxy(proxy, &factory).await?;
    info!("Upgrade complete. Proxy still at: {upgraded:#x}");

    if let Some(minter) = minter {
        info!("Granting MINTER_ROLE to {minter:#x}...");
        let role = toolkit.minter_role(upgraded).await?;
        let tx_hash = toolkit.grant_role(upgraded, role, minter).await?;
        info!("MINTER_ROLE granted to {minter:#x} in tx {tx_hash:#x}");
    }

    if network.has_explorer {
        wait_for_explorer(network, "upgrade").await;

        let implementation = toolkit.implementation_address(upgraded).await?;
        info!("Verifying new implementation at {implementation:#x}...");
        verify_safe(verifier, VerifyRequest::new(implementation)).await;

        // Skipped by the explorer if the proxy is already verified
        info!("Verifying proxy at {upgraded:#x}...");
        verify_safe(
            verifier,
            VerifyRequest::new(upgraded).with_contract(PROXY_CONTRACT_PATH),
        )
        .await;
    }

    Ok(upgraded)
}

/// Give the network's explorer time to index what was just sent
async fn wait_for_explorer(network: &NetworkConfig, what: &str) {
    info!(
        "Waiting {} seconds before verification so the {} explorer can index the {what}...",
        network.verify_delay.as_secs(),
        network.name,
    );
    tokio::time::sleep(network.verify_delay).await;
}
