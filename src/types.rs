//! Shared primitives for both cores: hashes, addresses, headers and
//! transactions. The wire protocol, RLP codec and EVM are external
//! collaborators per the design doc; this module only defines the types
//! needed to compile the skeleton syncer and tx pool against them.

use ethereum_types::{H256, U256};
use serde::{Deserialize, Serialize};

/// Re-exported so callers don't need a direct `ethereum-types` dependency
/// just to name a block hash or an address.
pub type Hash = H256;
pub use ethereum_types::Address;

/// A block header. Only the fields the skeleton algorithm and tx-pool
/// validator actually touch are modelled; body content (transactions,
/// ommers, withdrawals) lives in `BlockBody`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub parent_hash: Hash,
    pub number: u64,
    pub state_root: Hash,
    pub transactions_root: Hash,
    pub ommers_hash: Hash,
    pub withdrawals_root: Hash,
    pub base_fee_per_gas: U256,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
}

impl BlockHeader {
    /// The block hash is a content hash over the whole header. We use
    /// `blake3`, the same hasher the teacher already depends on for its
    /// own block hashing in `src/main.rs`.
    pub fn hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.parent_hash.as_bytes());
        hasher.update(&self.number.to_be_bytes());
        hasher.update(self.state_root.as_bytes());
        hasher.update(self.transactions_root.as_bytes());
        hasher.update(self.ommers_hash.as_bytes());
        hasher.update(self.withdrawals_root.as_bytes());
        let mut fee_buf = [0u8; 32];
        self.base_fee_per_gas.to_big_endian(&mut fee_buf);
        hasher.update(&fee_buf);
        hasher.update(&self.gas_limit.to_be_bytes());
        hasher.update(&self.gas_used.to_be_bytes());
        hasher.update(&self.timestamp.to_be_bytes());
        hasher.update(&self.extra_data);
        Hash::from_slice(hasher.finalize().as_bytes())
    }

    /// Content hash over the body-identifying roots — the GLOSSARY's
    /// "sum hash", used as the block body's identifier independent of the
    /// header hash.
    pub fn sum_hash(&self) -> Hash {
        sum_hash(
            self.transactions_root,
            self.ommers_hash,
            self.withdrawals_root,
        )
    }
}

/// `sumHash(transactionsRoot, ommersHash, withdrawalsRoot)`.
pub fn sum_hash(transactions_root: Hash, ommers_hash: Hash, withdrawals_root: Hash) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(transactions_root.as_bytes());
    hasher.update(ommers_hash.as_bytes());
    hasher.update(withdrawals_root.as_bytes());
    Hash::from_slice(hasher.finalize().as_bytes())
}

/// `bodyKey = hash(headerHash ‖ bodySumHash)`, per §6.
pub fn body_key(header_hash: Hash, body_sum_hash: Hash) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(header_hash.as_bytes());
    hasher.update(body_sum_hash.as_bytes());
    Hash::from_slice(hasher.finalize().as_bytes())
}

/// A block body: everything a header's roots commit to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BlockBody {
    pub transactions: Vec<Transaction>,
    pub ommers: Vec<BlockHeader>,
    pub withdrawals: Vec<Withdrawal>,
}

impl BlockBody {
    pub fn sum_hash(&self) -> Hash {
        let tx_root = merkle_stub(self.transactions.len());
        let ommers_hash = merkle_stub(self.ommers.len());
        let withdrawals_root = merkle_stub(self.withdrawals.len());
        sum_hash(tx_root, ommers_hash, withdrawals_root)
    }
}

/// State-root/trie computation is out of scope; bodies are identified by
/// content length + blake3 fold, which is stable and sufficient for the
/// skeleton's own bookkeeping (it never re-derives a "real" trie root).
fn merkle_stub(len: usize) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(len as u64).to_be_bytes());
    Hash::from_slice(hasher.finalize().as_bytes())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub index: u64,
    pub validator_index: u64,
    pub address: Address,
    pub amount: u64,
}

/// A recoverable ECDSA signature, `(r, s, recovery_id)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

/// A transaction. Only the two types named in §4.4 (legacy, EIP-1559) are
/// modelled — other fork types are out of this crate's scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Legacy {
        nonce: u64,
        gas_price: U256,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        data: Vec<u8>,
        sig: Signature,
    },
    Eip1559 {
        chain_id: u64,
        nonce: u64,
        max_priority_fee_per_gas: U256,
        max_fee_per_gas: U256,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        data: Vec<u8>,
        sig: Signature,
    },
}

impl Transaction {
    pub fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy { nonce, .. } => *nonce,
            Transaction::Eip1559 { nonce, .. } => *nonce,
        }
    }

    pub fn gas_limit(&self) -> u64 {
        match self {
            Transaction::Legacy { gas_limit, .. } => *gas_limit,
            Transaction::Eip1559 { gas_limit, .. } => *gas_limit,
        }
    }

    pub fn value(&self) -> U256 {
        match self {
            Transaction::Legacy { value, .. } => *value,
            Transaction::Eip1559 { value, .. } => *value,
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            Transaction::Legacy { sig, .. } => *sig,
            Transaction::Eip1559 { sig, .. } => *sig,
        }
    }

    /// Type tag used by the basic validator's fork-support check.
    pub fn type_id(&self) -> u8 {
        match self {
            Transaction::Legacy { .. } => 0,
            Transaction::Eip1559 { .. } => 2,
        }
    }

    /// The bytes that are signed over — used both for signing and for
    /// sender recovery. Deliberately simple (no RLP framing) since the
    /// wire encoding is an external collaborator's concern; this crate
    /// only needs a stable, unambiguous byte string per transaction.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Transaction::Legacy {
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                data,
                ..
            } => {
                buf.push(0u8);
                buf.extend_from_slice(&nonce.to_be_bytes());
                let mut gp = [0u8; 32];
                gas_price.to_big_endian(&mut gp);
                buf.extend_from_slice(&gp);
                buf.extend_from_slice(&gas_limit.to_be_bytes());
                buf.extend_from_slice(to.map(|a| a.0).unwrap_or([0u8; 20]).as_slice());
                let mut v = [0u8; 32];
                value.to_big_endian(&mut v);
                buf.extend_from_slice(&v);
                buf.extend_from_slice(data);
            }
            Transaction::Eip1559 {
                chain_id,
                nonce,
                max_priority_fee_per_gas,
                max_fee_per_gas,
                gas_limit,
                to,
                value,
                data,
                ..
            } => {
                buf.push(2u8);
                buf.extend_from_slice(&chain_id.to_be_bytes());
                buf.extend_from_slice(&nonce.to_be_bytes());
                let mut mpf = [0u8; 32];
                max_priority_fee_per_gas.to_big_endian(&mut mpf);
                buf.extend_from_slice(&mpf);
                let mut mf = [0u8; 32];
                max_fee_per_gas.to_big_endian(&mut mf);
                buf.extend_from_slice(&mf);
                buf.extend_from_slice(&gas_limit.to_be_bytes());
                buf.extend_from_slice(to.map(|a| a.0).unwrap_or([0u8; 20]).as_slice());
                let mut v = [0u8; 32];
                value.to_big_endian(&mut v);
                buf.extend_from_slice(&v);
                buf.extend_from_slice(data);
            }
        }
        buf
    }

    /// `itemId := hash(tx)` per §4.4 step 1.
    pub fn hash(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.signing_bytes());
        let sig = self.signature();
        hasher.update(&sig.r);
        hasher.update(&sig.s);
        hasher.update(&[sig.recovery_id]);
        Hash::from_slice(hasher.finalize().as_bytes())
    }
}

/// Recovers the sender address from a transaction's signature, using the
/// same `secp256k1` recoverable-signature machinery the teacher uses for
/// wallet signatures in `src/main.rs`.
pub fn recover_sender(tx: &Transaction) -> Result<Address, crate::error::ValidationError> {
    use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
    use secp256k1::{Message, Secp256k1};

    let sig = tx.signature();
    let secp = Secp256k1::new();
    let recovery_id = RecoveryId::from_i32(sig.recovery_id as i32)
        .map_err(|_| crate::error::ValidationError::InvalidSender)?;
    let recoverable = RecoverableSignature::from_compact(
        &[sig.r, sig.s].concat(),
        recovery_id,
    )
    .map_err(|_| crate::error::ValidationError::InvalidSender)?;

    let mut digest = [0u8; 32];
    digest.copy_from_slice(blake3::hash(&tx.signing_bytes()).as_bytes());
    let message = Message::from_slice(&digest)
        .map_err(|_| crate::error::ValidationError::InvalidSender)?;

    let pubkey = secp
        .recover_ecdsa(&message, &recoverable)
        .map_err(|_| crate::error::ValidationError::InvalidSender)?;

    let serialized = pubkey.serialize_uncompressed();
    // Ethereum address = last 20 bytes of keccak(pubkey); we use blake3
    // here since keccak is RLP/EVM-adjacent tooling this crate doesn't
    // own — the derivation shape (hash the uncompressed key sans prefix,
    // take the low 20 bytes) is preserved.
    let hash = blake3::hash(&serialized[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.as_bytes()[12..32]);
    Ok(Address::from(addr))
}

/// `estimatedGasTip(tx, baseFee)` from the GLOSSARY. A signed quantity:
/// legacy is `gasPrice - baseFee`; EIP-1559 is
/// `min(maxPriorityFee, maxFee - baseFee)`.
pub fn estimated_gas_tip(tx: &Transaction, base_fee: U256) -> i128 {
    fn sub_signed(a: U256, b: U256) -> i128 {
        if a >= b {
            (a - b).as_u128() as i128
        } else {
            -((b - a).as_u128() as i128)
        }
    }

    match tx {
        Transaction::Legacy { gas_price, .. } => sub_signed(*gas_price, base_fee),
        Transaction::Eip1559 {
            max_priority_fee_per_gas,
            max_fee_per_gas,
            ..
        } => {
            let fee_minus_base = sub_signed(*max_fee_per_gas, base_fee);
            let priority = max_priority_fee_per_gas.as_u128() as i128;
            fee_minus_base.min(priority)
        }
    }
}

/// The tip cap named in the GLOSSARY: `maxPriorityFee` for EIP-1559,
/// `gasPrice` for legacy. Unlike the effective tip this never depends on
/// the base fee.
pub fn tip_cap(tx: &Transaction) -> U256 {
    match tx {
        Transaction::Legacy { gas_price, .. } => *gas_price,
        Transaction::Eip1559 {
            max_priority_fee_per_gas,
            ..
        } => *max_priority_fee_per_gas,
    }
}

/// A chain fork identifier, consumed from account state per §6
/// (`toFork(blockNumber) -> Fork`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Fork {
    Frontier,
    London,
    Shanghai,
    Cancun,
}

impl Fork {
    /// Whether this fork supports the given transaction type id.
    pub fn supports_tx_type(&self, type_id: u8) -> bool {
        match self {
            Fork::Frontier => type_id == 0,
            Fork::London | Fork::Shanghai | Fork::Cancun => type_id == 0 || type_id == 2,
        }
    }
}

/// A minimal view of the canonical head the tx pool validates against —
/// the "cached chain head" of §4.4's Validator section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainHead {
    pub number: u64,
    pub base_fee_per_gas: U256,
    pub target_gas_limit: u64,
}
