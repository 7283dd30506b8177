use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Checks an `X-Hub-Signature-256` header against the raw request body.
///
/// An empty secret disables the check. A missing header, a header without
/// the `sha256=` prefix or a digest that is not valid hex all fail.
pub fn verify_signature(app_secret: &str, body: &[u8], header: Option<&str>) -> bool {
    if app_secret.is_empty() {
        return true;
    }

    let Some(header) = header else {
        debug!("Signature header missing");
        return false;
    };

    let Some(hex_digest) = header.strip_prefix(SIGNATURE_PREFIX) else {
        debug!("Signature header has no sha256= prefix");
        return false;
    };

    let expected = match hex::decode(hex_digest) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Failed to decode signature: {}", e);
            return false;
        }
    };

    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body);

    // verify_slice compares in constant time
    mac.verify_slice(&expected).is_ok()
}

/// Compares a presented secret with the configured one in constant time.
///
/// Both values are MACed under the configured secret so the final
/// comparison runs over equal-length tags whatever the input lengths.
pub fn tokens_match(expected: &str, presented: &str) -> bool {
    if expected.is_empty() {
        return false;
    }

    let tag = |value: &str| {
        HmacSha256::new_from_slice(expected.as_bytes()).map(|mut mac| {
            mac.update(value.as_bytes());
            mac
        })
    };

    match (tag(expected), tag(presented)) {
        (Ok(reference), Ok(candidate)) => candidate
            .verify_slice(&reference.finalize().into_bytes())
            .is_ok(),
        _ => false,
    }
}
