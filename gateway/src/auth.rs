//! Withdrawal authorization: canonical message encoding and ECDSA recovery.
//!
//! External-signer withdrawals are sanctioned by a secp256k1 signature over
//! a canonical byte message. The message embeds the chain id and a strictly
//! increasing nonce; the nonce is the sole replay defense because the
//! authorizing chain shares no clock or ordering with this one.
//!
//! # Message layout
//! - prefix `"UNIVERSAL_GATEWAY_WASM"` (22 bytes)
//! - instruction kind (1 byte)
//! - chain id (u64, big-endian)
//! - nonce (u64, big-endian)
//! - amount (u128, big-endian)
//! - recipient address bytes (native kinds) or token contract bytes (token
//!   kinds)

use cosmwasm_std::Api;
use tiny_keccak::{Hasher, Keccak};

use crate::error::ContractError;
use crate::msg::{TssAuth, WithdrawKindMsg};
use crate::state::TssState;

/// Domain separation prefix for signed withdrawal messages.
pub const MESSAGE_PREFIX: &[u8] = b"UNIVERSAL_GATEWAY_WASM";

/// Withdrawal instruction kinds. The discriminant is the byte embedded in
/// the signed message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WithdrawKind {
    Native = 1,
    Token = 2,
    RevertNative = 3,
    RevertToken = 4,
}

impl From<WithdrawKindMsg> for WithdrawKind {
    fn from(kind: WithdrawKindMsg) -> Self {
        match kind {
            WithdrawKindMsg::Native => WithdrawKind::Native,
            WithdrawKindMsg::Token => WithdrawKind::Token,
            WithdrawKindMsg::RevertNative => WithdrawKind::RevertNative,
            WithdrawKindMsg::RevertToken => WithdrawKind::RevertToken,
        }
    }
}

/// Compute keccak256 hash of arbitrary data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Build the canonical withdrawal message bytes.
pub fn encode_withdraw_message(
    kind: WithdrawKind,
    chain_id: u64,
    nonce: u64,
    amount: u128,
    tail: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(MESSAGE_PREFIX.len() + 1 + 8 + 8 + 16 + tail.len());
    buf.extend_from_slice(MESSAGE_PREFIX);
    buf.push(kind as u8);
    buf.extend_from_slice(&chain_id.to_be_bytes());
    buf.extend_from_slice(&nonce.to_be_bytes());
    buf.extend_from_slice(&amount.to_be_bytes());
    buf.extend_from_slice(tail);
    buf
}

/// Hash the canonical withdrawal message.
pub fn withdraw_message_hash(
    kind: WithdrawKind,
    chain_id: u64,
    nonce: u64,
    amount: u128,
    tail: &[u8],
) -> [u8; 32] {
    keccak256(&encode_withdraw_message(kind, chain_id, nonce, amount, tail))
}

/// Derive an Ethereum address from a 65-byte uncompressed secp256k1 pubkey.
pub fn eth_address_from_pubkey(pubkey: &[u8]) -> Result<[u8; 20], ContractError> {
    // Skip the 0x04 uncompressed-point prefix
    let raw = match pubkey.len() {
        65 => &pubkey[1..],
        64 => pubkey,
        got => {
            return Err(ContractError::InvalidLength {
                field: "pubkey".to_string(),
                expected: 65,
                got,
            })
        }
    };
    let hash = keccak256(raw);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    Ok(address)
}

/// Parse a 0x-prefixed (or bare) hex Ethereum address.
pub fn parse_eth_address(input: &str) -> Result<[u8; 20], ContractError> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(stripped).map_err(|_| ContractError::InvalidAddress {
        reason: format!("invalid hex address: {input}"),
    })?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidLength {
            field: "eth_address".to_string(),
            expected: 20,
            got: bytes.len(),
        })
}

/// Render an Ethereum address as 0x-prefixed hex.
pub fn eth_address_to_hex(address: &[u8; 20]) -> String {
    format!("0x{}", hex::encode(address))
}

/// Verify a signature-authorized withdrawal message.
///
/// Rebuilds the canonical message from trusted state and the call's own
/// parameters, then checks in order: declared chain id, declared nonce,
/// message hash, and signature recovery against the stored signer address.
/// The caller must persist the nonce increment before dispatching any asset
/// transfer.
pub fn verify_tss(
    api: &dyn Api,
    tss: &TssState,
    kind: WithdrawKind,
    amount: u128,
    tail: &[u8],
    auth: &TssAuth,
) -> Result<(), ContractError> {
    if auth.chain_id != tss.chain_id {
        return Err(ContractError::ChainIdMismatch {
            expected: tss.chain_id,
            got: auth.chain_id,
        });
    }
    if auth.nonce != tss.nonce {
        return Err(ContractError::NonceMismatch {
            expected: tss.nonce,
            got: auth.nonce,
        });
    }

    let signature: [u8; 64] =
        auth.signature
            .as_slice()
            .try_into()
            .map_err(|_| ContractError::InvalidLength {
                field: "signature".to_string(),
                expected: 64,
                got: auth.signature.len(),
            })?;
    let declared_hash: [u8; 32] =
        auth.message_hash
            .as_slice()
            .try_into()
            .map_err(|_| ContractError::InvalidLength {
                field: "message_hash".to_string(),
                expected: 32,
                got: auth.message_hash.len(),
            })?;

    let computed = withdraw_message_hash(kind, tss.chain_id, auth.nonce, amount, tail);
    if computed != declared_hash {
        return Err(ContractError::MessageHashMismatch);
    }

    let pubkey = api
        .secp256k1_recover_pubkey(&computed, &signature, auth.recovery_id)
        .map_err(|_| ContractError::InvalidSignature)?;
    let recovered = eth_address_from_pubkey(&pubkey)?;
    if recovered != tss.eth_address {
        return Err(ContractError::InvalidSignature);
    }

    Ok(())
}
