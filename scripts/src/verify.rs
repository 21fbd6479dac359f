//! Source verification against a block explorer

use std::{path::PathBuf, process::Stdio};

use alloy::primitives::hex;
use itertools::Itertools;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::{
    constants::{FORGE_COMMAND, VERIFY_CONTRACT_COMMAND},
    errors::ScriptError,
    types::VerifyRequest,
};

/// The name of the environment variable `forge` reads the explorer API key from
const ETHERSCAN_API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

/// A service that verifies the source of deployed contracts
#[allow(async_fn_in_trait)]
pub trait Verifier {
    /// Submit the contract for verification
    async fn verify(&self, request: &VerifyRequest) -> Result<(), ScriptError>;
}

/// Attempt to verify a contract, logging and discarding any error, including
/// the contract already being verified
pub async fn verify_safe(verifier: &impl Verifier, request: VerifyRequest) {
    let address = request.address;
    if let Err(e) = verifier.verify(&request).await {
        warn!("Verification skipped/failed for {address:#x}: {e}");
    }
}

/// A [`Verifier`] that shells out to `forge verify-contract`
pub struct ForgeVerifier {
    /// The Foundry project root the contracts were compiled in
    contracts_dir: PathBuf,
    /// The RPC url, from which `forge` infers the chain
    rpc_url: String,
    /// The contract name used when a request does not carry one
    default_contract: String,
    /// The explorer API key, if not already in the environment
    etherscan_api_key: Option<String>,
}

impl ForgeVerifier {
    /// Constructor
    pub fn new(
        contracts_dir: PathBuf,
        rpc_url: String,
        default_contract: String,
        etherscan_api_key: Option<String>,
    ) -> Self {
        Self {
            contracts_dir,
            rpc_url,
            default_contract,
            etherscan_api_key,
        }
    }

    /// The arguments passed to `forge` for the given request
    fn args(&self, request: &VerifyRequest) -> Vec<String> {
        let contract = request
            .contract
            .clone()
            .unwrap_or_else(|| self.default_contract.clone());

        let mut args = vec![
            VERIFY_CONTRACT_COMMAND.to_string(),
            format!("{:#x}", request.address),
            contract,
            "--rpc-url".to_string(),
            self.rpc_url.clone(),
            "--watch".to_string(),
        ];
        if let Some(constructor_args) = &request.constructor_args {
            args.push("--constructor-args".to_string());
            args.push(hex::encode_prefixed(constructor_args));
        }

        args
    }
}

impl Verifier for ForgeVerifier {
    async fn verify(&self, request: &VerifyRequest) -> Result<(), ScriptError> {
        let args = self.args(request);
        debug!("Running `{FORGE_COMMAND} {}`", args.iter().join(" "));

        let mut cmd = Command::new(FORGE_COMMAND);
        cmd.current_dir(&self.contracts_dir)
            .args(&args)
            .stdin(Stdio::null());
        if let Some(key) = &self.etherscan_api_key {
            cmd.env(ETHERSCAN_API_KEY_ENV_VAR, key);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("{}", stdout.trim());

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = if stderr.trim().is_empty() { stdout } else { stderr };
            return Err(ScriptError::Verification(reason.trim().to_string()));
        }

        info!("Verified {:#x}", request.address);
        Ok(())
    }
}
