//! Named accounts: logical roles mapped to node accounts.

use std::collections::BTreeMap;

use alloy_core::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::DeployError;

/// Name of the account that sends deployments and owns proxies.
pub const DEPLOYER: &str = "deployer";

/// How a named account is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedAccount {
    /// Index into the accounts exposed by the node (`eth_accounts`).
    Index(usize),
    /// A literal address. The node must be able to sign for it.
    Address(Address),
}

/// Table of named accounts, as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamedAccounts(BTreeMap<String, NamedAccount>);

impl Default for NamedAccounts {
    fn default() -> Self {
        Self(BTreeMap::from([(DEPLOYER.to_string(), NamedAccount::Index(0))]))
    }
}

impl NamedAccounts {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, name: impl Into<String>, account: NamedAccount) -> Self {
        self.0.insert(name.into(), account);
        self
    }

    pub fn get(&self, name: &str) -> Option<NamedAccount> {
        self.0.get(name).copied()
    }

    /// Bind the table to the accounts a node exposes.
    pub fn bind(self, available: Vec<Address>) -> Accounts {
        Accounts {
            named: self,
            available,
        }
    }
}

/// Named accounts bound to the accounts of a live node.
#[derive(Debug, Clone)]
pub struct Accounts {
    named: NamedAccounts,
    available: Vec<Address>,
}

impl Accounts {
    /// Resolve a named account to an address.
    pub fn get(&self, name: &str) -> Result<Address, DeployError> {
        match self.named.get(name) {
            Some(NamedAccount::Address(address)) => Ok(address),
            Some(NamedAccount::Index(index)) => self.available.get(index).copied().ok_or(
                DeployError::AccountIndexOutOfRange {
                    name: name.to_string(),
                    index,
                    available: self.available.len(),
                },
            ),
            None => Err(DeployError::UnknownAccount {
                name: name.to_string(),
            }),
        }
    }

    pub fn deployer(&self) -> Result<Address, DeployError> {
        self.get(DEPLOYER)
    }
}
