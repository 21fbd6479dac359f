//! Constants used in the deploy scripts

use std::time::Duration;

/// The name of the token implementation artifact
pub const VMAHOUT_ARTIFACT: &str = "VMahout";

/// The name of the ERC-1967 proxy artifact
pub const PROXY_ARTIFACT: &str = "ERC1967Proxy";

/// The fully qualified name of the proxy contract, as understood by the verifier
pub const PROXY_CONTRACT_PATH: &str =
    "@openzeppelin/contracts/proxy/ERC1967/ERC1967Proxy.sol:ERC1967Proxy";

/// The default fully qualified name of the implementation contract
pub const DEFAULT_IMPLEMENTATION_CONTRACT: &str = "src/VMahout.sol:VMahout";

/// Network names that never have a block explorer to verify against
pub const LOCAL_NETWORKS: [&str; 2] = ["hardhat", "localhost"];

/// The default number of seconds to wait before verifying, giving the
/// explorer time to index the deployment
pub const DEFAULT_VERIFY_DELAY_SECS: u64 = 90;

/// How long to wait between polls for a transaction receipt
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How many times to poll for a transaction receipt before giving up
pub const RECEIPT_POLL_ATTEMPTS: usize = 300;

/// The default RPC URL, a local development node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default network name
pub const DEFAULT_NETWORK: &str = "localhost";

/// The default directory holding compilation artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "out";

/// The default directory holding one deployments manifest per network
pub const DEFAULT_DEPLOYMENTS_DIR: &str = "deployments";

/// The storage slot containing the implementation address in an upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The marker left in bytecode by the compiler for unlinked libraries
pub const UNLINKED_LIBRARY_MARKER: &str = "__$";

/// The extension of a compilation artifact
pub const ARTIFACT_EXTENSION: &str = "json";

/// The token proxy key in the deployments manifest
pub const VMAHOUT_PROXY_KEY: &str = "vmahout_proxy";

/// The token implementation key in the deployments manifest
pub const VMAHOUT_IMPLEMENTATION_KEY: &str = "vmahout_implementation";

/// The name of the Foundry command
pub const FORGE_COMMAND: &str = "forge";

/// The name of the verification subcommand
pub const VERIFY_CONTRACT_COMMAND: &str = "verify-contract";
