// ============================================================================
// Request Authentication
// ============================================================================
//
// The requester signs a canonical message with their EVM key (EIP-191
// personal_sign). We recover the signer from the detached signature and
// require it to be the claimed requester.
//
// Canonical message: "Authorize dotdotdust: {requester} {asset1,asset2,...}"
// built from the strings exactly as the client sent them.
// ============================================================================

use alloy::primitives::{Address, Signature};

use crate::error::AppError;
use crate::validation::PurgeRequest;

const MESSAGE_PREFIX: &str = "Authorize dotdotdust:";

/// Message the requester must sign to authorize a sweep of `assets`
pub fn canonical_message(requester: &str, assets: &[String]) -> String {
    format!("{} {} {}", MESSAGE_PREFIX, requester, assets.join(","))
}

/// Decode a hex-encoded 65-byte `r || s || v` signature
pub fn decode_signature(signature_hex: &str) -> Result<Vec<u8>, AppError> {
    let hex_part = signature_hex
        .strip_prefix("0x")
        .unwrap_or(signature_hex);
    let bytes = hex::decode(hex_part)
        .map_err(|_| AppError::auth("signature is not valid hex"))?;
    if bytes.len() != 65 {
        return Err(AppError::auth(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Recover the signer of `message` from a hex-encoded 65-byte signature
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<Address, AppError> {
    let bytes = decode_signature(signature_hex)?;

    let signature = Signature::try_from(bytes.as_slice())
        .map_err(|e| AppError::auth(format!("malformed signature: {}", e)))?;

    signature
        .recover_address_from_msg(message.as_bytes())
        .map_err(|e| AppError::auth(format!("signature recovery failed: {}", e)))
}

/// Verify that the request's signature was produced by its requester
pub fn authenticate(request: &PurgeRequest) -> Result<(), AppError> {
    let message = canonical_message(&request.requester_raw, &request.assets_raw);
    let recovered = recover_signer(&message, &request.signature)?;

    // Checksummed and lowercase renderings of the same address must match
    if !recovered
        .to_string()
        .eq_ignore_ascii_case(&request.requester_raw)
    {
        return Err(AppError::auth("signature does not match requester"));
    }

    Ok(())
}
