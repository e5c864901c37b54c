//! HMAC-SHA1 request signing for the LiblibAI open API.
//!
//! The vendor expects the signature as URL-safe base64 with padding stripped,
//! over the string `{uri}&{timestamp_ms}&{nonce}`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// URL-safe base64 (no padding) HMAC-SHA1 of `message` under `secret`.
pub fn sign(secret: &str, message: &str) -> String {
    // HMAC accepts keys of any length; new_from_slice cannot fail here.
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes()).expect("hmac accepts any key length");
    mac.update(message.as_bytes());
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// The header set LiblibAI expects on every API call.
pub struct SignedHeaders {
    pub access_key: String,
    pub timestamp: String,
    pub nonce: String,
    pub signature: String,
}

/// Build the signed header set for a request to `uri` (path only, no host).
pub fn sign_request(access_key: &str, secret_key: &str, uri: &str) -> SignedHeaders {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
        .to_string();
    let nonce = random_nonce();
    let message = format!("{uri}&{timestamp}&{nonce}");
    SignedHeaders {
        access_key: access_key.to_string(),
        signature: sign(secret_key, &message),
        timestamp,
        nonce,
    }
}

fn random_nonce() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..13)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_matches_known_vector() {
        // RFC 2202 test case 2: key "Jefe", data "what do ya want for nothing?"
        // HMAC-SHA1 = effcdf6ae5eb2fa2d27416d5f184df9c259a7c79
        let sig = sign("Jefe", "what do ya want for nothing?");
        let raw = hex::decode("effcdf6ae5eb2fa2d27416d5f184df9c259a7c79").unwrap();
        assert_eq!(
            sig,
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
        );
    }

    #[test]
    fn sign_is_url_safe_without_padding() {
        for i in 0..32 {
            let sig = sign("secret", &format!("message-{i}"));
            assert!(!sig.contains('+') && !sig.contains('/') && !sig.contains('='));
        }
    }

    #[test]
    fn sign_is_deterministic_per_input() {
        assert_eq!(sign("k", "m"), sign("k", "m"));
        assert_ne!(sign("k", "m"), sign("k", "n"));
        assert_ne!(sign("k", "m"), sign("j", "m"));
    }

    #[test]
    fn sign_request_signs_uri_timestamp_nonce() {
        let headers = sign_request("ak", "sk", "/api/generate/webui/text2img");
        assert_eq!(headers.access_key, "ak");
        assert_eq!(headers.nonce.len(), 13);
        let message = format!(
            "/api/generate/webui/text2img&{}&{}",
            headers.timestamp, headers.nonce
        );
        assert_eq!(headers.signature, sign("sk", &message));
    }
}
