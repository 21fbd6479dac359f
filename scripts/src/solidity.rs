//! Definitions of Solidity functions called during deployment

// Items generated by `sol!` carry no docs
#![allow(missing_docs, clippy::missing_docs_in_private_items)]

use alloy::sol;

sol! {
    /// The subset of the VMahout token interface touched by the scripts
    #[sol(rpc)]
    interface IVMahout {
        function initialize(address admin, address minter, address upgrader) external;
        function MINTER_ROLE() external view returns (bytes32);
        function grantRole(bytes32 role, address account) external;
        function upgradeToAndCall(address newImplementation, bytes memory data) external payable;
    }
}

pub use IVMahout::initializeCall;
