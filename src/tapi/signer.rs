//! HMAC-SHA512 request signing for the Mercado Bitcoin trade API.
//!
//! TAPI signing scheme:
//! 1. Form-urlencode the request parameters in the order they were built
//! 2. HMAC-SHA512(`{path}?{encoded_params}`, secret)
//! 3. Hex encode the result (lowercase, 128 chars)
//!
//! The signature covers the literal encoded string that is later sent as
//! the POST body, so the encoder must preserve parameter order and the
//! path must match the request path byte for byte, trailing slash
//! included. A mismatch on either produces a syntactically valid MAC the
//! server rejects.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ApiError, ApiResult};

type HmacSha512 = Hmac<Sha512>;

/// HMAC-SHA512 request signer for the TAPI.
///
/// Pure function of (secret, path, params): holds no mutable state, safe
/// to share across concurrently used clients.
#[derive(Clone)]
pub struct TapiHmacSigner {
    tapi_id: String,
    tapi_secret: Vec<u8>,
}

impl Debug for TapiHmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapiHmacSigner")
            .field("tapi_id", &self.tapi_id)
            .field("tapi_secret", &"<redacted>")
            .finish()
    }
}

impl TapiHmacSigner {
    /// Create a new TAPI signer.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the identifier or the secret is
    /// empty, before any network call is attempted.
    pub fn new(tapi_id: impl Into<String>, tapi_secret: impl Into<String>) -> ApiResult<Self> {
        let tapi_id = tapi_id.into();
        let tapi_secret = tapi_secret.into();

        if tapi_id.is_empty() {
            return Err(ApiError::Configuration(
                "TAPI identifier must not be empty".to_string(),
            ));
        }
        if tapi_secret.is_empty() {
            return Err(ApiError::Configuration(
                "TAPI secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            tapi_id,
            tapi_secret: tapi_secret.into_bytes(),
        })
    }

    /// Create a signer from environment variables.
    ///
    /// Returns None if either variable is unset or invalid.
    pub fn from_env(tapi_id_env: &str, tapi_secret_env: &str) -> Option<Self> {
        let tapi_id = std::env::var(tapi_id_env).ok()?;
        let tapi_secret = std::env::var(tapi_secret_env).ok()?;
        Self::new(tapi_id, tapi_secret).ok()
    }

    /// Generate a nonce for request signing.
    ///
    /// Wall-clock seconds since epoch, the resolution the TAPI expects.
    /// Two calls within the same clock second return the same value and
    /// the server rejects the second request; callers issuing rapid
    /// successive operations must pace them across second boundaries.
    pub fn tapi_nonce() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    /// Sign a request for the TAPI.
    ///
    /// # Arguments
    ///
    /// * `path` - The API path (always `/tapi/v3/`), exactly as requested
    /// * `encoded_params` - The form-urlencoded parameters, exactly as sent
    ///   in the POST body
    ///
    /// # Returns
    ///
    /// The lowercase hex digest for the `TAPI-MAC` header.
    pub fn sign(&self, path: &str, encoded_params: &str) -> String {
        let mut mac = HmacSha512::new_from_slice(&self.tapi_secret)
            .expect("HMAC can take key of any size");
        mac.update(path.as_bytes());
        mac.update(b"?");
        mac.update(encoded_params.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Get the TAPI identifier.
    pub fn tapi_id(&self) -> &str {
        &self.tapi_id
    }

    /// Get the identifier header name.
    pub fn id_header(&self) -> &str {
        "TAPI-ID"
    }

    /// Get the signature header name.
    pub fn mac_header(&self) -> &str {
        "TAPI-MAC"
    }
}

/// Form-urlencode wire parameters, preserving the caller-supplied order.
///
/// The output doubles as the signing input and the POST body; it is never
/// re-sorted.
pub fn build_tapi_query(params: &[(String, String)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_TAPI_ID: &str = "test_tapi_id";
    const TEST_TAPI_SECRET: &str = "test_tapi_secret";

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_signer_creation() {
        let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
        assert_eq!(signer.tapi_id(), TEST_TAPI_ID);
    }

    #[test]
    fn test_empty_credentials_fail_fast() {
        assert!(TapiHmacSigner::new("", TEST_TAPI_SECRET).is_err());
        assert!(TapiHmacSigner::new(TEST_TAPI_ID, "").is_err());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
        let rendered = format!("{:?}", signer);
        assert!(rendered.contains(TEST_TAPI_ID));
        assert!(!rendered.contains(TEST_TAPI_SECRET));
    }

    #[test]
    fn test_signature_determinism() {
        let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
        let query = build_tapi_query(&params(&[
            ("tapi_method", "get_account_info"),
            ("tapi_nonce", "1609459200"),
        ]));

        let sig1 = signer.sign("/tapi/v3/", &query);
        let sig2 = signer.sign("/tapi/v3/", &query);

        assert_eq!(sig1, sig2);
    }

    #[test]
    fn test_signature_is_lowercase_hex_of_sha512_width() {
        let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
        let signature = signer.sign("/tapi/v3/", "tapi_method=get_account_info&tapi_nonce=1");

        // HMAC-SHA512 digest is 64 bytes, hex encoded to 128 chars
        assert_eq!(signature.len(), 128);
        assert!(signature
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_signature_changes_with_params() {
        let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();

        let sig1 = signer.sign("/tapi/v3/", "tapi_method=get_account_info&tapi_nonce=1");
        let sig2 = signer.sign("/tapi/v3/", "tapi_method=get_account_info&tapi_nonce=2");

        assert_ne!(sig1, sig2);
    }

    #[test]
    fn test_signature_changes_with_path() {
        let signer = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
        let query = "tapi_method=get_account_info&tapi_nonce=1";

        // A trailing-slash divergence alone must change the MAC
        let sig1 = signer.sign("/tapi/v3/", query);
        let sig2 = signer.sign("/tapi/v3", query);

        assert_ne!(sig1, sig2);
    }

    #[test]
    fn test_signature_changes_with_secret() {
        let signer1 = TapiHmacSigner::new(TEST_TAPI_ID, TEST_TAPI_SECRET).unwrap();
        let signer2 = TapiHmacSigner::new(TEST_TAPI_ID, "another_secret").unwrap();
        let query = "tapi_method=get_account_info&tapi_nonce=1";

        assert_ne!(signer1.sign("/tapi/v3/", query), signer2.sign("/tapi/v3/", query));
    }

    #[test]
    fn test_query_preserves_caller_order() {
        let query = build_tapi_query(&params(&[
            ("tapi_method", "list_orders"),
            ("tapi_nonce", "1609459200"),
            ("coin_pair", "BRLBTC"),
        ]));

        assert_eq!(
            query,
            "tapi_method=list_orders&tapi_nonce=1609459200&coin_pair=BRLBTC"
        );
    }

    #[test]
    fn test_query_percent_encodes_json_array_values() {
        let query = build_tapi_query(&params(&[("status_list", "[1,3]")]));
        assert_eq!(query, "status_list=%5B1%2C3%5D");
    }

    #[test]
    fn test_nonce_has_second_resolution() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let nonce = TapiHmacSigner::tapi_nonce();
        let after = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        assert!(nonce >= before && nonce <= after);
    }

    #[test]
    fn test_nonce_collides_within_one_second() {
        // Documents the known limitation: back-to-back calls in the same
        // clock second yield the same nonce and the server would reject
        // the second request.
        for _ in 0..5 {
            let first = TapiHmacSigner::tapi_nonce();
            let second = TapiHmacSigner::tapi_nonce();
            if first == second {
                return;
            }
        }
        panic!("expected at least one same-second nonce pair in five tries");
    }
}
