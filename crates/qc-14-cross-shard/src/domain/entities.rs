//! # Domain Entities
//!
//! Transactions, their output effects, and the blocks exchanged between a
//! sending and a receiving shard.
//!
//! Only the parts of a transaction this subsystem reads are modelled: output
//! coins and token vouts (for routing and commitment), input coins (for stake
//! keys), and the metadata kind.

use super::errors::{CrossShardError, Result, ShardId};
use super::value_objects::{ChainRole, Hash, Instruction, ShardCount};
use serde::{Deserialize, Serialize};

fn push_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u32).to_be_bytes());
    out.extend_from_slice(field);
}

/// Last byte of a public key, the address fragment used for routing.
fn last_byte(key: &[u8]) -> u8 {
    key.last().copied().unwrap_or(0)
}

/// Payment address: spending public key and transmission key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAddress {
    /// Public key.
    pub pk: Vec<u8>,
    /// Transmission key.
    pub tk: Vec<u8>,
}

impl PaymentAddress {
    /// Routing fragment.
    pub fn last_byte(&self) -> u8 {
        last_byte(&self.pk)
    }
}

/// A transaction output coin (opaque to this subsystem beyond its bytes).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCoin {
    /// Receiver's compressed public key.
    pub public_key: Vec<u8>,
    /// Coin value.
    pub value: u64,
    /// Serial number derivator.
    pub snd: Vec<u8>,
    /// Commitment randomness.
    pub randomness: Vec<u8>,
    /// Encrypted note.
    pub info: Vec<u8>,
}

impl OutputCoin {
    /// Canonical serialization, length-prefixed fields in declaration order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            16 + self.public_key.len() + self.snd.len() + self.randomness.len() + self.info.len(),
        );
        push_field(&mut out, &self.public_key);
        push_field(&mut out, &self.value.to_be_bytes());
        push_field(&mut out, &self.snd);
        push_field(&mut out, &self.randomness);
        push_field(&mut out, &self.info);
        out
    }

    /// Routing fragment.
    pub fn pub_key_last_byte(&self) -> u8 {
        last_byte(&self.public_key)
    }
}

/// A spent input coin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCoin {
    /// Owner's compressed public key.
    pub public_key: Vec<u8>,
    /// Serial number.
    pub serial_number: Vec<u8>,
}

/// Input and output coins of a transaction's proof.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProof {
    /// Spent coins.
    pub input_coins: Vec<InputCoin>,
    /// Produced coins.
    pub output_coins: Vec<OutputCoin>,
}

/// Custom-token lifecycle type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    /// Token creation.
    Init,
    /// Ordinary transfer.
    #[default]
    Transfer,
    /// Aggregated view sent to another shard.
    CrossShard,
}

impl TokenType {
    fn code(&self) -> u8 {
        match self {
            Self::Init => 0,
            Self::Transfer => 1,
            Self::CrossShard => 2,
        }
    }
}

/// Custom-token input.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTokenVin {
    /// Transaction holding the spent vout.
    pub tx_custom_token_id: Hash,
    /// Index of the spent vout.
    pub vout_index: u32,
    /// Owner signature.
    pub signature: String,
    /// Owner address.
    pub payment_address: PaymentAddress,
}

impl TxTokenVin {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.tx_custom_token_id.as_bytes());
        out.extend_from_slice(&self.vout_index.to_be_bytes());
        push_field(&mut out, self.signature.as_bytes());
        push_field(&mut out, &self.payment_address.pk);
        push_field(&mut out, &self.payment_address.tk);
        out
    }
}

/// Custom-token output.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTokenVout {
    /// Receiver address; its last public-key byte routes the vout.
    pub payment_address: PaymentAddress,
    /// Token amount.
    pub value: u64,
}

impl TxTokenVout {
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        push_field(&mut out, &self.payment_address.pk);
        push_field(&mut out, &self.payment_address.tk);
        out.extend_from_slice(&self.value.to_be_bytes());
        out
    }
}

/// Custom-token transfer data. One bucket per token id and shard when aggregated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTokenData {
    /// Token identifier.
    pub property_id: Hash,
    /// Token name.
    pub property_name: String,
    /// Token symbol.
    pub property_symbol: String,
    /// Whether new supply may be minted.
    pub mintable: bool,
    /// Total supply.
    pub amount: u64,
    /// Lifecycle type.
    pub token_type: TokenType,
    /// Inputs.
    pub vins: Vec<TxTokenVin>,
    /// Outputs.
    pub vouts: Vec<TxTokenVout>,
}

impl TxTokenData {
    /// Commitment metadata only: no spend history, no outputs.
    pub fn clone_for_cross_shard(&self) -> Self {
        Self {
            property_id: self.property_id,
            property_name: self.property_name.clone(),
            property_symbol: self.property_symbol.clone(),
            mintable: self.mintable,
            amount: self.amount,
            token_type: TokenType::CrossShard,
            vins: Vec::new(),
            vouts: Vec::new(),
        }
    }

    /// Canonical serialization.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(self.property_id.as_bytes());
        push_field(&mut out, self.property_name.as_bytes());
        push_field(&mut out, self.property_symbol.as_bytes());
        out.push(self.mintable as u8);
        out.extend_from_slice(&self.amount.to_be_bytes());
        out.push(self.token_type.code());
        out.extend_from_slice(&(self.vins.len() as u32).to_be_bytes());
        for vin in &self.vins {
            push_field(&mut out, &vin.to_bytes());
        }
        out.extend_from_slice(&(self.vouts.len() as u32).to_be_bytes());
        for vout in &self.vouts {
            push_field(&mut out, &vout.to_bytes());
        }
        out
    }

    /// `H(serialize(self))`.
    pub fn hash(&self) -> Hash {
        Hash::digest(&self.to_bytes())
    }
}

/// Declared metadata kind of a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataKind {
    /// Plain transaction.
    #[default]
    None,
    /// Stake to join a shard committee.
    ShardStaking,
    /// Stake to join the beacon committee.
    BeaconStaking,
    /// Any other metadata (governance, stability); handled elsewhere.
    Other(u16),
}

impl MetadataKind {
    /// Staking role, if any.
    pub fn stake_role(&self) -> Option<ChainRole> {
        match self {
            Self::ShardStaking => Some(ChainRole::Shard),
            Self::BeaconStaking => Some(ChainRole::Beacon),
            _ => None,
        }
    }
}

/// Fields shared by every transaction kind.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBase {
    /// Transaction hash.
    pub tx_id: Hash,
    /// Native-coin proof; absent for proofless transactions.
    pub proof: Option<TransactionProof>,
    /// Metadata kind.
    pub metadata: MetadataKind,
}

/// Native transfer carrying a custom-token transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCustomToken {
    /// Native part.
    pub base: TxBase,
    /// Token part.
    pub token_data: TxTokenData,
}

/// Native transfer carrying a privacy-token transfer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxCustomTokenPrivacy {
    /// Native part.
    pub base: TxBase,
    /// Token identifier.
    pub property_id: Hash,
    /// Inner proof of the private token transfer.
    pub token_proof: Option<TransactionProof>,
}

/// Transaction kinds this subsystem distinguishes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    /// Plain native transfer.
    Normal(TxBase),
    /// Block reward.
    Salary(TxBase),
    /// Custom-token transfer.
    CustomToken(TxCustomToken),
    /// Privacy-token transfer.
    CustomTokenPrivacy(TxCustomTokenPrivacy),
}

impl Transaction {
    /// Shared fields.
    pub fn base(&self) -> &TxBase {
        match self {
            Self::Normal(base) | Self::Salary(base) => base,
            Self::CustomToken(tx) => &tx.base,
            Self::CustomTokenPrivacy(tx) => &tx.base,
        }
    }

    /// Native-coin proof.
    pub fn proof(&self) -> Option<&TransactionProof> {
        self.base().proof.as_ref()
    }

    /// Declared metadata kind.
    pub fn metadata_kind(&self) -> MetadataKind {
        self.base().metadata
    }

    /// Transaction hash.
    pub fn tx_id(&self) -> Hash {
        self.base().tx_id
    }
}

/// One digest per destination shard, in shard-index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardDigestRow {
    digests: Vec<Hash>,
    shard_count: ShardCount,
}

impl ShardDigestRow {
    /// Wrap digests; the length must equal the shard count.
    pub fn new(digests: Vec<Hash>, shard_count: ShardCount) -> Result<Self> {
        if digests.len() != shard_count.get() {
            return Err(CrossShardError::RowLength {
                expected: shard_count.get(),
                got: digests.len(),
            });
        }
        Ok(Self {
            digests,
            shard_count,
        })
    }

    /// Caller guarantees one digest per shard.
    pub(crate) fn from_validated(digests: Vec<Hash>, shard_count: ShardCount) -> Self {
        debug_assert_eq!(digests.len(), shard_count.get());
        Self {
            digests,
            shard_count,
        }
    }

    /// Digest of one shard.
    pub fn get(&self, shard_id: ShardId) -> Option<&Hash> {
        self.digests.get(shard_id as usize)
    }

    /// All digests.
    pub fn as_slice(&self) -> &[Hash] {
        &self.digests
    }

    /// Shard count the row was built for.
    pub fn shard_count(&self) -> ShardCount {
        self.shard_count
    }
}

/// Header of a cross-shard block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossShardHeader {
    /// Sending shard.
    pub from_shard: ShardId,
    /// Receiving shard.
    pub to_shard: ShardId,
    /// Height of the sending shard block.
    pub height: u64,
    /// Merkle root committed in the sending shard block header.
    pub shard_tx_root: Hash,
}

/// Cross-shard payload received from a sending shard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossShardBlock {
    /// Routing and commitment header.
    pub header: CrossShardHeader,
    /// Output coins destined for the receiver.
    pub cross_output_coins: Vec<OutputCoin>,
    /// Aggregated token data, one bucket per token id.
    pub cross_tx_token_data: Vec<TxTokenData>,
}

/// Output coins a shard block received from one sending shard block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossOutputCoin {
    /// Sending shard.
    pub from_shard: ShardId,
    /// Sending block height.
    pub block_height: u64,
    /// Sending block hash.
    pub block_hash: Hash,
    /// Coins delivered.
    pub output_coins: Vec<OutputCoin>,
}

impl CrossOutputCoin {
    /// Digest over sender, height, block hash, then every coin.
    pub fn hash(&self) -> Hash {
        let mut data = Vec::new();
        data.push(self.from_shard);
        data.extend_from_slice(&self.block_height.to_be_bytes());
        data.extend_from_slice(self.block_hash.as_bytes());
        for coin in &self.output_coins {
            data.extend_from_slice(&coin.to_bytes());
        }
        Hash::digest(&data)
    }
}

/// Beacon block header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconHeader {
    /// Height.
    pub height: u64,
    /// Block hash.
    pub hash: Hash,
}

/// Beacon block body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBody {
    /// Control instructions in emission order.
    pub instructions: Vec<Instruction>,
}

/// Beacon block, as read back from storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlock {
    /// Header.
    pub header: BeaconHeader,
    /// Body.
    pub body: BeaconBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin(last: u8) -> OutputCoin {
        OutputCoin {
            public_key: vec![2, 9, last],
            value: 10,
            snd: vec![1, 2],
            randomness: vec![3],
            info: vec![],
        }
    }

    #[test]
    fn test_output_coin_routing_fragment() {
        assert_eq!(coin(7).pub_key_last_byte(), 7);
        assert_eq!(OutputCoin::default().pub_key_last_byte(), 0);
    }

    #[test]
    fn test_output_coin_bytes_change_with_value() {
        let a = coin(1);
        let mut b = coin(1);
        b.value = 11;
        assert_ne!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn test_clone_for_cross_shard_drops_history() {
        let data = TxTokenData {
            property_id: Hash::digest(b"token"),
            property_name: "Token".to_string(),
            property_symbol: "TKN".to_string(),
            mintable: true,
            amount: 1_000,
            token_type: TokenType::Transfer,
            vins: vec![TxTokenVin::default()],
            vouts: vec![TxTokenVout::default()],
        };
        let cloned = data.clone_for_cross_shard();
        assert_eq!(cloned.property_id, data.property_id);
        assert_eq!(cloned.amount, 1_000);
        assert_eq!(cloned.token_type, TokenType::CrossShard);
        assert!(cloned.vins.is_empty());
        assert!(cloned.vouts.is_empty());
    }

    #[test]
    fn test_token_hash_depends_on_vouts() {
        let mut data = TxTokenData::default();
        let before = data.hash();
        data.vouts.push(TxTokenVout {
            payment_address: PaymentAddress::default(),
            value: 1,
        });
        assert_ne!(before, data.hash());
    }

    #[test]
    fn test_digest_row_length_enforced() {
        let count = ShardCount::new(4).unwrap();
        assert!(ShardDigestRow::new(vec![Hash::empty(); 4], count).is_ok());
        assert!(matches!(
            ShardDigestRow::new(vec![Hash::empty(); 3], count),
            Err(CrossShardError::RowLength {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn test_beacon_block_json_round_trip() {
        let block = BeaconBlock {
            header: BeaconHeader {
                height: 5,
                hash: Hash::digest(b"b5"),
            },
            body: BeaconBody {
                instructions: vec![Instruction::new(vec!["assign".to_string()])],
            },
        };
        let bytes = serde_json::to_vec(&block).unwrap();
        let back: BeaconBlock = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, block);
    }
}
