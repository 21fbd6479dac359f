//! Utilities for the deploy scripts.

use std::str::FromStr;

use alloy::{
    network::Ethereum,
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use alloy_sol_types::SolValue;
use tracing::warn;

use crate::{
    constants::{IMPLEMENTATION_STORAGE_SLOT, NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT},
    errors::ScriptError,
};

/// The provider type used by the scripts
pub type Client = DynProvider<Ethereum>;

/// Sets up the client with which to send transactions, signing with the given
/// private key against the given RPC url.
///
/// Returns the client along with the address of the signer.
pub async fn setup_client(priv_key: &str, rpc_url: &str) -> Result<(Client, Address), ScriptError> {
    let url = Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let signer = PrivateKeySigner::from_str(priv_key)
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    let deployer = signer.address();

    let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
    let client = DynProvider::new(provider);

    // Fail early on an unreachable node
    let chain_id = client
        .get_chain_id()
        .await
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
    tracing::debug!("Connected to chain {chain_id} as {deployer:#x}");

    Ok((client, deployer))
}

/// Whether the given string is a syntactically valid address: an optional
/// `0x` prefix followed by exactly 40 hex digits
pub fn is_valid_address(address: &str) -> bool {
    let digits = address.strip_prefix("0x").unwrap_or(address);
    digits.len() == 2 * NUM_BYTES_ADDRESS && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Parse an address passed in as the named parameter, failing with an error
/// naming the parameter if it is malformed.
///
/// Mixed-case input with a bad EIP-55 checksum is accepted with a warning.
pub fn parse_address(param: &'static str, value: &str) -> Result<Address, ScriptError> {
    let invalid = || ScriptError::InvalidAddress {
        param,
        value: value.to_string(),
    };

    if !is_valid_address(value) {
        return Err(invalid());
    }
    let address = Address::from_str(value).map_err(|_| invalid())?;

    let digits = value.strip_prefix("0x").unwrap_or(value);
    let mixed_case = digits.chars().any(|c| c.is_ascii_uppercase())
        && digits.chars().any(|c| c.is_ascii_lowercase());
    if mixed_case && address.to_checksum(None /* chain_id */)[2..] != *digits {
        warn!("{param} address {value} does not match its EIP-55 checksum");
    }

    Ok(address)
}

/// The storage slot holding the implementation address of an ERC-1967 proxy
pub fn implementation_slot() -> U256 {
    // Can `unwrap` here since the constant is a valid 32-byte hex string
    U256::from_be_bytes(B256::from_str(IMPLEMENTATION_STORAGE_SLOT).unwrap().0)
}

/// Extract the address right-aligned in a storage slot
pub fn address_from_slot(value: U256) -> Address {
    let word: [u8; NUM_BYTES_STORAGE_SLOT] = value.to_be_bytes();
    Address::from_slice(&word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..])
}

/// ABI-encode the `ERC1967Proxy` constructor arguments: the implementation
/// address and the calldata the proxy calls it with on construction
pub fn proxy_constructor_args(implementation: Address, init_data: Bytes) -> Bytes {
    (implementation, init_data).abi_encode_params().into()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, keccak256};

    use super::*;

    #[test]
    fn test_accepts_well_formed_addresses() {
        assert!(is_valid_address("0xAbC1230000000000000000000000000000000000"));
        assert!(is_valid_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"));
        assert!(is_valid_address("5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        assert!(!is_valid_address("not-an-address"));
        assert!(!is_valid_address(""));
        assert!(!is_valid_address("0x"));
        // One digit short
        assert!(!is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAe"));
        // Non-hex digit
        assert!(!is_valid_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeg"));
        assert!(!is_valid_address("0X5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"));
    }

    #[test]
    fn test_parse_address_names_param() {
        let err = parse_address("minter", "not-an-address").unwrap_err();
        assert_eq!(
            err,
            ScriptError::InvalidAddress {
                param: "minter",
                value: "not-an-address".to_string(),
            }
        );
        assert_eq!(err.to_string(), "invalid minter address: not-an-address");
    }

    #[test]
    fn test_parse_address_ignores_checksum_mismatch() {
        let parsed = parse_address("minter", "0xAbC1230000000000000000000000000000000000").unwrap();
        assert_eq!(parsed, address!("0xabc1230000000000000000000000000000000000"));
    }

    #[test]
    fn test_implementation_slot_matches_eip1967() {
        // bytes32(uint256(keccak256("eip1967.proxy.implementation")) - 1)
        let expected = U256::from_be_bytes(keccak256("eip1967.proxy.implementation").0)
            - U256::from(1);
        assert_eq!(implementation_slot(), expected);
    }

    #[test]
    fn test_proxy_constructor_args_layout() {
        let implementation = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        let encoded = proxy_constructor_args(implementation, Bytes::from_static(&[0xde, 0xad]));

        // Head: address word, offset word; tail: length word, padded data word
        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(&encoded[12..32], implementation.as_slice());
        assert_eq!(U256::from_be_slice(&encoded[32..64]), U256::from(64));
        assert_eq!(U256::from_be_slice(&encoded[64..96]), U256::from(2));
        assert_eq!(&encoded[96..98], &[0xde, 0xad]);
    }

    #[test]
    fn test_address_from_slot() {
        let addr = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        let slot = U256::from_be_slice(addr.as_slice());
        assert_eq!(address_from_slot(slot), addr);
    }
}
