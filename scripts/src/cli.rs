//! Definitions of CLI arguments and commands for deploy scripts

use std::{path::PathBuf, time::Duration};

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{deploy_vmahout, upgrade_vmahout},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_DEPLOYMENTS_DIR, DEFAULT_IMPLEMENTATION_CONTRACT,
        DEFAULT_NETWORK, DEFAULT_RPC_URL, DEFAULT_VERIFY_DELAY_SECS,
    },
    errors::ScriptError,
    toolkit::ChainToolkit,
    types::{NetworkConfig, VerifyMode},
    utils::parse_address,
    verify::Verifier,
};

/// Deploy and upgrade the VMahout token behind a UUPS proxy
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", hide_env_values = true)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Name of the target network
    #[arg(short, long, env = "NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: String,

    /// Whether to verify deployed contracts on the block explorer.
    /// `auto` verifies on every network except `hardhat` and `localhost`
    #[arg(long, env = "VERIFY", value_enum, default_value_t = VerifyMode::Auto)]
    pub verify: VerifyMode,

    /// Seconds to wait before verifying, so the explorer can index the deployment
    #[arg(long, default_value_t = DEFAULT_VERIFY_DELAY_SECS)]
    pub verify_delay_secs: u64,

    /// Directory containing the compilation artifacts
    #[arg(long, default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts_dir: PathBuf,

    /// Path to the deployments manifest, defaults to `deployments/<network>.json`
    #[arg(long)]
    pub deployments_path: Option<PathBuf>,

    /// Root of the Foundry project the contracts were compiled in
    #[arg(long, default_value = ".")]
    pub contracts_dir: PathBuf,

    /// Fully qualified name of the implementation contract, used for verification
    #[arg(long, default_value = DEFAULT_IMPLEMENTATION_CONTRACT)]
    pub implementation_contract: String,

    /// API key for the block explorer
    #[arg(long, env = "ETHERSCAN_API_KEY", hide_env_values = true)]
    pub etherscan_api_key: Option<String>,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// The network configuration selected by the CLI arguments
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig::new(
            self.network.clone(),
            self.verify,
            Duration::from_secs(self.verify_delay_secs),
        )
    }

    /// The path of the deployments manifest for the selected network
    pub fn deployments_path(&self) -> PathBuf {
        self.deployments_path.clone().unwrap_or_else(|| {
            PathBuf::from(DEFAULT_DEPLOYMENTS_DIR).join(format!("{}.json", self.network))
        })
    }
}

/// The scripts that can be run
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the token behind a new proxy
    DeployVmahout(DeployVmahoutArgs),
    /// Upgrade the token behind an existing proxy
    UpgradeVmahout(UpgradeVmahoutArgs),
}

impl Command {
    /// Check the command's address arguments, before any connection to the
    /// chain is made
    pub fn validate(&self) -> Result<(), ScriptError> {
        match self {
            Command::DeployVmahout(args) => args.minter_address().map(|_| ()),
            Command::UpgradeVmahout(args) => {
                args.proxy_address()?;
                args.minter_address().map(|_| ())
            }
        }
    }

    /// Run the command, returning the address of the token proxy
    pub async fn run(
        self,
        toolkit: &impl ChainToolkit,
        verifier: &impl Verifier,
        network: &NetworkConfig,
    ) -> Result<Address, ScriptError> {
        match self {
            Command::DeployVmahout(args) => deploy_vmahout(args, toolkit, verifier, network).await,
            Command::UpgradeVmahout(args) => {
                upgrade_vmahout(args, toolkit, verifier, network).await
            }
        }
    }
}

/// Deploy the VMahout token behind a UUPS proxy.
///
/// The deployer becomes both admin and upgrader of the token.
#[derive(Args, Debug, Clone)]
pub struct DeployVmahoutArgs {
    /// Address that will receive the MINTER_ROLE
    #[arg(long)]
    pub minter: String,
}

impl DeployVmahoutArgs {
    /// The parsed minter address
    pub fn minter_address(&self) -> Result<Address, ScriptError> {
        parse_address("minter", &self.minter)
    }
}

/// Upgrade an existing VMahout proxy to the latest implementation
#[derive(Args, Debug, Clone)]
pub struct UpgradeVmahoutArgs {
    /// Address of the existing proxy
    #[arg(long)]
    pub proxy: String,

    /// Address that will receive the MINTER_ROLE
    #[arg(long)]
    pub minter: Option<String>,
}

impl UpgradeVmahoutArgs {
    /// The parsed proxy address
    pub fn proxy_address(&self) -> Result<Address, ScriptError> {
        parse_address("proxy", &self.proxy)
    }

    /// The parsed minter address, if one was given. An empty string counts as
    /// no minter
    pub fn minter_address(&self) -> Result<Option<Address>, ScriptError> {
        self.minter
            .as_deref()
            .filter(|m| !m.is_empty())
            .map(|m| parse_address("minter", m))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_upgrade_with_defaults() {
        let cli = Cli::try_parse_from([
            "vmahout",
            "--priv-key",
            "0x01",
            "--network",
            "sepolia",
            "upgrade-vmahout",
            "--proxy",
            "0x1111111111111111111111111111111111111111",
        ])
        .unwrap();

        assert_eq!(
            cli.deployments_path(),
            PathBuf::from("deployments").join("sepolia.json")
        );
        let network = cli.network_config();
        assert!(network.has_explorer);
        assert_eq!(network.verify_delay, Duration::from_secs(90));

        match cli.command {
            Command::UpgradeVmahout(args) => assert!(args.minter.is_none()),
            Command::DeployVmahout(_) => panic!("expected upgrade-vmahout"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_addresses_without_a_node() {
        let deploy = Cli::try_parse_from([
            "vmahout",
            "--priv-key",
            "0x01",
            "--rpc-url",
            "http://127.0.0.1:9",
            "deploy-vmahout",
            "--minter",
            "not-an-address",
        ])
        .unwrap();
        let err = deploy.command.validate().unwrap_err();
        assert_eq!(err.to_string(), "invalid minter address: not-an-address");

        let upgrade = Cli::try_parse_from([
            "vmahout",
            "--priv-key",
            "0x01",
            "upgrade-vmahout",
            "--proxy",
            "0x1111111111111111111111111111111111111111",
            "--minter",
            "0x1234",
        ])
        .unwrap();
        assert_eq!(
            upgrade.command.validate().unwrap_err(),
            ScriptError::InvalidAddress {
                param: "minter",
                value: "0x1234".to_string(),
            }
        );

        let upgrade = Cli::try_parse_from([
            "vmahout",
            "--priv-key",
            "0x01",
            "upgrade-vmahout",
            "--proxy",
            "0xnope",
        ])
        .unwrap();
        assert!(matches!(
            upgrade.command.validate(),
            Err(ScriptError::InvalidAddress { param: "proxy", .. })
        ));
    }

    #[test]
    fn test_validate_accepts_well_formed_addresses() {
        let cli = Cli::try_parse_from([
            "vmahout",
            "--priv-key",
            "0x01",
            "upgrade-vmahout",
            "--proxy",
            "0x1111111111111111111111111111111111111111",
            "--minter",
            "",
        ])
        .unwrap();
        assert!(cli.command.validate().is_ok());
    }

    #[test]
    fn test_deploy_requires_minter() {
        let res = Cli::try_parse_from(["vmahout", "--priv-key", "0x01", "deploy-vmahout"]);
        assert!(res.is_err());
    }
}
