//! Ledger wire plumbing: calldata codec and typed JSON-RPC calls

pub mod abi;
pub mod rpc;

#[cfg(test)]
mod abi_test;
