use async_trait::async_trait;
use ethers::core::types::{Address, TransactionReceipt, H256};

use crate::{ContentPayload, PublishError, StagedError};

/// The result of a confirmed transaction
#[derive(Debug, Clone, Copy)]
pub struct TxOutcome {
    /// The txid
    pub txid: H256,
    /// True if executed, false otherwise (reverted, etc.)
    pub executed: bool,
    /// Block the transaction landed in, if the node reported one
    pub block_number: Option<u64>,
}

impl From<TransactionReceipt> for TxOutcome {
    fn from(t: TransactionReceipt) -> Self {
        Self {
            txid: t.transaction_hash,
            executed: t.status.map_or(false, |s| s.low_u32() == 1),
            block_number: t.block_number.map(|b| b.as_u64()),
        }
    }
}

/// Interface for a content registry deployment on some chain. Drives a
/// payload through build, sign, and submit, strictly in that order.
#[async_trait]
pub trait ContentStore: Send + Sync + std::fmt::Debug {
    /// Return an identifier for the chain this registry is deployed on
    fn name(&self) -> &str;

    /// The address transactions are published from
    fn publisher(&self) -> Address;

    /// Build, sign, broadcast, and confirm a registry call for the payload.
    /// Errors carry the stage at which the payload was lost.
    async fn publish(&self, payload: &ContentPayload) -> Result<TxOutcome, StagedError>;

    /// Get the outcome of a previously submitted transaction, if it has
    /// landed. The escape hatch for `ConfirmationTimeout`: re-query instead
    /// of resubmitting.
    async fn status(&self, txid: H256) -> Result<Option<TxOutcome>, PublishError>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_projects_receipts() {
        let receipt = TransactionReceipt {
            transaction_hash: H256::repeat_byte(1),
            status: Some(1u64.into()),
            block_number: Some(42u64.into()),
            ..Default::default()
        };
        let outcome: TxOutcome = receipt.into();
        assert_eq!(outcome.txid, H256::repeat_byte(1));
        assert!(outcome.executed);
        assert_eq!(outcome.block_number, Some(42));

        let reverted = TransactionReceipt {
            transaction_hash: H256::repeat_byte(2),
            status: Some(0u64.into()),
            block_number: None,
            ..Default::default()
        };
        let outcome: TxOutcome = reverted.into();
        assert!(!outcome.executed);
        assert_eq!(outcome.block_number, None);
    }
}
