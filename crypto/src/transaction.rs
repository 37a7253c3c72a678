//! Chain-id-bound (EIP-155) signing of legacy transactions.
//!
//! The signing payload is `rlp([nonce, gas_price, gas, to, value, data,
//! chain_id, 0, 0])`; the signed encoding replaces the last three fields with
//! `v = recovery_id + chain_id * 2 + 35`, `r` and `s`.

use rlp::RlpStream;
use vigil_types::{PrivateKey, SignedTransaction, Transaction, TxHash};

use crate::address::address_from_node_id;
use crate::error::CryptoError;
use crate::hash::{hash_transaction, keccak256};
use crate::keys::node_id_from_private;
use crate::sign::sign_hash;

/// Big-endian bytes with leading zeros removed: RLP's integer encoding.
fn trimmed(bytes: &[u8]) -> Vec<u8> {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn append_body(stream: &mut RlpStream, tx: &Transaction) {
    stream.append(&tx.nonce);
    stream.append(&trimmed(&tx.gas_price.to_be_bytes()));
    stream.append(&tx.gas);
    match tx.to {
        Some(to) => stream.append(&to.as_bytes().to_vec()),
        None => stream.append(&Vec::<u8>::new()),
    };
    stream.append(&trimmed(&tx.value.to_be_bytes()));
    stream.append(&tx.data);
}

/// The hash a chain-id-bound signature commits to.
pub fn signing_hash(tx: &Transaction, chain_id: u64) -> TxHash {
    let mut stream = RlpStream::new_list(9);
    append_body(&mut stream, tx);
    stream.append(&chain_id);
    stream.append(&0u8);
    stream.append(&0u8);
    TxHash::new(keccak256(&stream.out()))
}

/// RLP encoding of a signed transaction, as relayed to peers.
pub fn encode_signed(signed: &SignedTransaction) -> Vec<u8> {
    let mut stream = RlpStream::new_list(9);
    append_body(&mut stream, &signed.tx);
    stream.append(&signed.v);
    stream.append(&trimmed(&signed.r));
    stream.append(&trimmed(&signed.s));
    stream.out().to_vec()
}

/// Sign `tx` for `chain_id` with `private`.
pub fn sign_transaction(
    tx: Transaction,
    chain_id: u64,
    private: &PrivateKey,
) -> Result<SignedTransaction, CryptoError> {
    let hash = signing_hash(&tx, chain_id);
    let sig = sign_hash(hash.as_bytes(), private)?;
    let from = address_from_node_id(&node_id_from_private(private)?);

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(sig.r());
    s.copy_from_slice(sig.s());
    let v = sig.recovery_id() as u64 + chain_id.saturating_mul(2) + 35;

    let mut signed = SignedTransaction {
        tx,
        v,
        r,
        s,
        hash: TxHash::ZERO,
        from,
    };
    signed.hash = hash_transaction(&encode_signed(&signed));
    Ok(signed)
}
