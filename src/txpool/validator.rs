//! `acceptTxValid` / `acceptTxPending` (§4.4).

use crate::error::ValidationError;
use crate::external::AccountState;
use crate::types::{estimated_gas_tip, ChainHead, Fork, Transaction};
use ethereum_types::U256;

/// Basic validity: fork-supported type, monotone nonce, enough gas limit
/// to cover intrinsic gas.
pub fn basic_valid(
    tx: &Transaction,
    fork: Fork,
    account_nonce: u64,
    accounts: &dyn AccountState,
) -> Result<(), ValidationError> {
    if !fork.supports_tx_type(tx.type_id()) {
        return Err(ValidationError::BasicValidatorFailed(format!(
            "tx type {} unsupported on {:?}",
            tx.type_id(),
            fork
        )));
    }
    if tx.nonce() < account_nonce {
        return Err(ValidationError::BasicValidatorFailed(format!(
            "nonce {} below account nonce {}",
            tx.nonce(),
            account_nonce
        )));
    }
    let intrinsic = accounts.intrinsic_gas(tx, fork);
    if tx.gas_limit() < intrinsic {
        return Err(ValidationError::BasicValidatorFailed(format!(
            "gas limit {} below intrinsic gas {}",
            tx.gas_limit(),
            intrinsic
        )));
    }
    Ok(())
}

/// Pending eligibility: positive effective tip, fee clause satisfied for
/// the tx's type, and gas limit within the chain head's target.
pub fn pending_eligible(tx: &Transaction, effective_gas_tip: i128, chain_head: &ChainHead) -> bool {
    if effective_gas_tip <= 0 {
        return false;
    }
    let fees_ok = match tx {
        Transaction::Legacy { gas_price, .. } => *gas_price >= chain_head.base_fee_per_gas,
        Transaction::Eip1559 {
            max_fee_per_gas,
            max_priority_fee_per_gas,
            ..
        } => *max_fee_per_gas >= chain_head.base_fee_per_gas && max_fee_per_gas >= max_priority_fee_per_gas,
    };
    fees_ok && tx.gas_limit() <= chain_head.target_gas_limit
}

/// The balance clause: `balance(sender) >= gasLimit * gasPrice + value`.
/// A `false` result reclassifies the item to `queued`, it is not a
/// rejection.
pub fn has_sufficient_balance(tx: &Transaction, balance: U256) -> bool {
    let price = match tx {
        Transaction::Legacy { gas_price, .. } => *gas_price,
        Transaction::Eip1559 { max_fee_per_gas, .. } => *max_fee_per_gas,
    };
    let Some(gas_cost) = price.checked_mul(U256::from(tx.gas_limit())) else {
        return false;
    };
    let Some(total) = gas_cost.checked_add(tx.value()) else {
        return false;
    };
    balance >= total
}

/// Recomputes `pending_eligible` directly from a tx and base fee,
/// without requiring a precomputed tip — convenience for callers that
/// only have the raw transaction.
pub fn recheck_pending(tx: &Transaction, chain_head: &ChainHead) -> bool {
    let tip = estimated_gas_tip(tx, chain_head.base_fee_per_gas);
    pending_eligible(tx, tip, chain_head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Signature};

    fn legacy(nonce: u64, gas_price: u64, gas_limit: u64, value: u64) -> Transaction {
        Transaction::Legacy {
            nonce,
            gas_price: U256::from(gas_price),
            gas_limit,
            to: Some(Address::zero()),
            value: U256::from(value),
            data: vec![],
            sig: Signature { r: [0; 32], s: [0; 32], recovery_id: 0 },
        }
    }

    struct FixedAccounts {
        intrinsic: u64,
    }
    impl AccountState for FixedAccounts {
        fn balance(&self, _address: Address) -> U256 {
            U256::zero()
        }
        fn nonce(&self, _address: Address) -> u64 {
            0
        }
        fn intrinsic_gas(&self, _tx: &Transaction, _fork: Fork) -> u64 {
            self.intrinsic
        }
        fn to_fork(&self, _block_number: u64) -> Fork {
            Fork::London
        }
    }

    #[test]
    fn basic_valid_rejects_stale_nonce() {
        let tx = legacy(1, 10, 21_000, 0);
        let accounts = FixedAccounts { intrinsic: 21_000 };
        let err = basic_valid(&tx, Fork::London, 5, &accounts).unwrap_err();
        assert!(matches!(err, ValidationError::BasicValidatorFailed(_)));
    }

    #[test]
    fn pending_eligible_requires_positive_tip_and_fee_clause() {
        let tx = legacy(0, 15, 21_000, 0);
        let head = ChainHead { number: 1, base_fee_per_gas: U256::from(10u64), target_gas_limit: 30_000_000 };
        assert!(recheck_pending(&tx, &head));

        let underpriced = legacy(0, 5, 21_000, 0);
        assert!(!recheck_pending(&underpriced, &head));
    }

    #[test]
    fn balance_check_covers_gas_cost_and_value() {
        let tx = legacy(0, 10, 21_000, 100);
        assert!(has_sufficient_balance(&tx, U256::from(21_000 * 10 + 100)));
        assert!(!has_sufficient_balance(&tx, U256::from(21_000 * 10 + 99)));
    }
}
