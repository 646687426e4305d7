//! Core type definitions

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use crate::errors::BundleError;
use crate::networks;

/// A signed transaction as it will be submitted inside a bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub nonce: u64,
    pub input: Bytes,
    /// EIP-2718 encoding sent to the relay
    pub raw: Bytes,
}

impl Transaction {
    /// Worst-case gas fee: every unit of gas paid at the fee cap
    pub fn max_fee(&self) -> U256 {
        U256::from(self.gas_limit) * U256::from(self.max_fee_per_gas)
    }

    /// Worst-case balance requirement, fee plus transferred value
    pub fn max_cost(&self) -> U256 {
        self.max_fee() + self.value
    }
}

/// An ordered, non-empty set of transactions submitted atomically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BundleRepr")]
pub struct Bundle {
    transactions: Vec<Transaction>,
    target_block: Option<u64>,
    builders: Vec<String>,
}

/// Unchecked wire form; deserialization goes through `Bundle::new`
#[derive(Deserialize)]
struct BundleRepr {
    transactions: Vec<Transaction>,
    #[serde(default)]
    target_block: Option<u64>,
    #[serde(default)]
    builders: Vec<String>,
}

impl TryFrom<BundleRepr> for Bundle {
    type Error = BundleError;

    fn try_from(repr: BundleRepr) -> Result<Self, Self::Error> {
        let mut bundle = Bundle::new(repr.transactions)?;
        bundle.target_block = repr.target_block;
        bundle.builders = repr.builders;
        Ok(bundle)
    }
}

impl Bundle {
    pub fn new(transactions: Vec<Transaction>) -> Result<Self, BundleError> {
        if transactions.is_empty() {
            return Err(BundleError::Empty);
        }

        Ok(Self {
            transactions,
            target_block: None,
            builders: Vec::new(),
        })
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Always false, construction rejects empty bundles
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The arbitrage settlement transaction
    pub fn last(&self) -> &Transaction {
        // non-empty by construction
        &self.transactions[self.transactions.len() - 1]
    }

    pub fn target_block(&self) -> Option<u64> {
        self.target_block
    }

    pub fn set_target_block(&mut self, block: u64) {
        self.target_block = Some(block);
    }

    pub fn builders(&self) -> &[String] {
        &self.builders
    }

    /// Route the bundle to every builder known for the network
    pub fn use_all_builders(&mut self, chain_id: u64) {
        self.builders = networks::known_builders(chain_id)
            .iter()
            .map(|b| b.to_string())
            .collect();
    }

    /// Sum of every transaction's worst-case gas fee
    pub fn maximum_gas_fee(&self) -> U256 {
        self.transactions
            .iter()
            .fold(U256::ZERO, |acc, tx| acc + tx.max_fee())
    }

    /// Raw encodings in execution order
    pub fn raw_transactions(&self) -> Vec<Bytes> {
        self.transactions.iter().map(|tx| tx.raw.clone()).collect()
    }
}
