// ============================================================================
// Request Validator
// ============================================================================
//
// Structural and bounds checks on an inbound sponsorship request:
// - requester and asset address format
// - asset list non-empty, capped, zero-address-free and duplicate-free
// - amounts aligned with assets, positive, and bounded
// - target chain matches the chain this relayer sponsors on
//
// Purely local: never touches chain state. The signature is carried through
// untouched; decoding it is the authenticator's job.
// ============================================================================

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::AppError;

/// Upper bound for a single amount. Anything larger is an overflow probe,
/// not a balance.
pub const MAX_AMOUNT: u128 = u128::MAX;

/// Amount as sent by clients: JSON string (preferred for big values) or number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(u64),
}

impl AmountInput {
    fn as_decimal_string(&self) -> String {
        match self {
            AmountInput::Text(s) => s.trim().to_string(),
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

/// `POST /purge` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurgeRequestBody {
    #[serde(alias = "userAddress")]
    pub requester_address: String,
    pub assets: Vec<String>,
    pub amounts: Vec<AmountInput>,
    pub signature: String,
    #[serde(alias = "chainId")]
    pub target_chain_id: u64,
}

/// A request that passed validation. Raw address strings are kept because
/// the signed message is built from exactly what the client sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeRequest {
    pub requester: Address,
    pub requester_raw: String,
    pub assets: Vec<Address>,
    pub assets_raw: Vec<String>,
    pub amounts: Vec<U256>,
    pub signature: String,
    pub target_chain_id: u64,
}

pub struct PurgeRequestValidator {
    max_assets: usize,
    destination_chain_id: u64,
}

impl PurgeRequestValidator {
    pub fn new(max_assets: usize, destination_chain_id: u64) -> Self {
        Self {
            max_assets,
            destination_chain_id,
        }
    }

    pub fn validate(&self, body: PurgeRequestBody) -> Result<PurgeRequest, AppError> {
        let requester = parse_address(&body.requester_address).ok_or_else(|| {
            AppError::validation("requesterAddress is not a valid 0x-prefixed 20-byte address")
        })?;

        if body.assets.is_empty() {
            return Err(AppError::validation("assets must not be empty"));
        }
        if body.assets.len() > self.max_assets {
            return Err(AppError::validation(format!(
                "too many assets: {} (maximum {})",
                body.assets.len(),
                self.max_assets
            )));
        }

        let mut assets = Vec::with_capacity(body.assets.len());
        let mut seen = HashSet::with_capacity(body.assets.len());
        for (index, raw) in body.assets.iter().enumerate() {
            let asset = parse_address(raw).ok_or_else(|| {
                AppError::validation(format!("assets[{}] is not a valid address", index))
            })?;
            if asset.is_zero() {
                return Err(AppError::validation(format!(
                    "assets[{}] is the zero address",
                    index
                )));
            }
            if !seen.insert(asset) {
                return Err(AppError::validation(format!(
                    "assets[{}] is a duplicate entry",
                    index
                )));
            }
            assets.push(asset);
        }

        if body.amounts.len() != body.assets.len() {
            return Err(AppError::validation(format!(
                "amounts length {} does not match assets length {}",
                body.amounts.len(),
                body.assets.len()
            )));
        }

        let amounts = body
            .amounts
            .iter()
            .enumerate()
            .map(|(index, amount)| parse_amount(index, amount))
            .collect::<Result<Vec<_>, _>>()?;

        if body.target_chain_id != self.destination_chain_id {
            return Err(AppError::validation(format!(
                "targetChainId {} is not served by this relayer (expected {})",
                body.target_chain_id, self.destination_chain_id
            )));
        }

        Ok(PurgeRequest {
            requester,
            requester_raw: body.requester_address,
            assets,
            assets_raw: body.assets,
            amounts,
            signature: body.signature,
            target_chain_id: body.target_chain_id,
        })
    }
}

/// Strict address format: `0x` followed by exactly 40 hex digits, any case
pub fn parse_address(raw: &str) -> Option<Address> {
    let hex_part = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))?;
    if hex_part.len() != 40 || !hex_part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let bytes = hex::decode(hex_part).ok()?;
    Some(Address::from_slice(&bytes))
}

fn parse_amount(index: usize, amount: &AmountInput) -> Result<U256, AppError> {
    let text = amount.as_decimal_string();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::validation(format!(
            "amounts[{}] is not a non-negative integer",
            index
        )));
    }

    let value = U256::from_str_radix(&text, 10).map_err(|_| {
        AppError::validation(format!("amounts[{}] exceeds the maximum amount", index))
    })?;

    if value.is_zero() {
        return Err(AppError::validation(format!(
            "amounts[{}] must be positive",
            index
        )));
    }
    if value > U256::from(MAX_AMOUNT) {
        return Err(AppError::validation(format!(
            "amounts[{}] exceeds the maximum amount",
            index
        )));
    }

    Ok(value)
}
