use axum::http::{header, HeaderMap};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::{AppError, Result};

// =============================================================================
// Password Digests
// =============================================================================

/// Generate a fresh random salt, hex-encoded
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Digest a password with its salt
///
/// `digest = SHA256(salt || password)`, hex-encoded. Salts are per-user,
/// so equal passwords never share a digest.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a candidate password against a stored salt and digest
pub fn verify_password(salt: &str, digest: &str, candidate: &str) -> bool {
    hash_password(salt, candidate) == digest
}

// =============================================================================
// Request Credentials
// =============================================================================

/// Extract the token from a standard `Authorization: Bearer <token>` header
///
/// Proxy-renamed header variants (`X-Authorization` and friends) are
/// deliberately not honored.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Require the voice-assistant bearer secret on a request
///
/// An unconfigured secret is a server fault, never reported as an auth
/// failure; a missing, malformed or mismatched token collapses into one
/// generic 401.
pub fn require_assistant_token(config: &Config, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = config.assistant_token.as_deref() else {
        return Err(AppError::Misconfigured("assistant token not set"));
    };

    match bearer_token(headers) {
        Some(token) if token == expected => Ok(()),
        Some(_) => {
            tracing::warn!("Bearer token mismatch");
            Err(AppError::Unauthorized)
        }
        None => {
            tracing::warn!("Missing or malformed Authorization header");
            Err(AppError::Unauthorized)
        }
    }
}

/// Extract username and password from an `Authorization: Basic` header
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let encoded = headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Basic ")?;

    let decoded = base64_decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

// =============================================================================
// Base64
// =============================================================================

/// Simple base64 encoder
///
/// Encodes binary data to standard base64 (with + and /).
/// This is public for use in tests.
pub fn base64_encode(data: &[u8]) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
    let mut result = String::new();

    for chunk in data.chunks(3) {
        let b0 = chunk[0] as usize;
        let b1 = chunk.get(1).copied().unwrap_or(0) as usize;
        let b2 = chunk.get(2).copied().unwrap_or(0) as usize;

        result.push(ALPHABET[b0 >> 2] as char);
        result.push(ALPHABET[((b0 & 0x03) << 4) | (b1 >> 4)] as char);

        if chunk.len() > 1 {
            result.push(ALPHABET[((b1 & 0x0f) << 2) | (b2 >> 6)] as char);
        } else {
            result.push('=');
        }

        if chunk.len() > 2 {
            result.push(ALPHABET[b2 & 0x3f] as char);
        } else {
            result.push('=');
        }
    }

    result
}

/// Simple base64 decoder
///
/// Decodes standard base64 (with + and /) as well as URL-safe base64.
fn base64_decode(input: &str) -> std::result::Result<Vec<u8>, String> {
    let input = input.trim();

    // Convert URL-safe to standard base64
    let standard: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    let clean: String = standard.chars().filter(|c| !c.is_whitespace()).collect();

    // Add padding if needed
    let padded = match clean.len() % 4 {
        2 => format!("{}==", clean),
        3 => format!("{}=", clean),
        _ => clean,
    };

    let mut result = Vec::with_capacity(padded.len() * 3 / 4);
    let chars: Vec<char> = padded.chars().collect();

    for chunk in chars.chunks(4) {
        if chunk.len() != 4 {
            return Err("Invalid base64 length".to_string());
        }

        let values: std::result::Result<Vec<u8>, String> =
            chunk.iter().map(|&c| decode_base64_char(c)).collect();
        let values = values?;

        result.push((values[0] << 2) | (values[1] >> 4));
        if chunk[2] != '=' {
            result.push((values[1] << 4) | (values[2] >> 2));
        }
        if chunk[3] != '=' {
            result.push((values[2] << 6) | values[3]);
        }
    }

    Ok(result)
}

fn decode_base64_char(c: char) -> std::result::Result<u8, String> {
    match c {
        'A'..='Z' => Ok(c as u8 - b'A'),
        'a'..='z' => Ok(c as u8 - b'a' + 26),
        '0'..='9' => Ok(c as u8 - b'0' + 52),
        '+' => Ok(62),
        '/' => Ok(63),
        '=' => Ok(0), // Padding
        _ => Err(format!("Invalid base64 character: {}", c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn config_with_token(token: Option<&str>) -> Config {
        Config {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            database_url: "sqlite::memory:".to_string(),
            allowed_origins: vec![],
            environment: "test".to_string(),
            assistant_token: token.map(str::to_string),
        }
    }

    // =========================================================================
    // Password Digest Tests
    // =========================================================================

    #[test]
    fn test_hash_password_deterministic() {
        let a = hash_password("salt", "hunter22");
        let b = hash_password("salt", "hunter22");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_password_salt_changes_digest() {
        assert_ne!(
            hash_password("salt-a", "hunter22"),
            hash_password("salt-b", "hunter22")
        );
    }

    #[test]
    fn test_verify_password() {
        let salt = generate_salt();
        let digest = hash_password(&salt, "correct-horse");

        assert!(verify_password(&salt, &digest, "correct-horse"));
        assert!(!verify_password(&salt, &digest, "wrong-horse"));
    }

    #[test]
    fn test_generate_salt_unique() {
        assert_ne!(generate_salt(), generate_salt());
    }

    // =========================================================================
    // Bearer Token Tests
    // =========================================================================

    #[test]
    fn test_bearer_token_extraction() {
        let headers = headers_with_auth("Bearer secret-token");
        assert_eq!(bearer_token(&headers), Some("secret-token"));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let headers = headers_with_auth("Token secret-token");
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_bearer_token_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_require_assistant_token_match() {
        let config = config_with_token(Some("secret-token"));
        let headers = headers_with_auth("Bearer secret-token");
        assert!(require_assistant_token(&config, &headers).is_ok());
    }

    #[test]
    fn test_require_assistant_token_mismatch() {
        let config = config_with_token(Some("secret-token"));
        let headers = headers_with_auth("Bearer other-token");
        assert!(matches!(
            require_assistant_token(&config, &headers),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_require_assistant_token_unconfigured() {
        let config = config_with_token(None);
        let headers = headers_with_auth("Bearer secret-token");
        assert!(matches!(
            require_assistant_token(&config, &headers),
            Err(AppError::Misconfigured(_))
        ));
    }

    // =========================================================================
    // Basic Credentials Tests
    // =========================================================================

    #[test]
    fn test_basic_credentials_roundtrip() {
        let encoded = base64_encode(b"alice:hunter22");
        let headers = headers_with_auth(&format!("Basic {}", encoded));

        let (username, password) = basic_credentials(&headers).unwrap();
        assert_eq!(username, "alice");
        assert_eq!(password, "hunter22");
    }

    #[test]
    fn test_basic_credentials_password_may_contain_colon() {
        let encoded = base64_encode(b"alice:pa:ss");
        let headers = headers_with_auth(&format!("Basic {}", encoded));

        let (username, password) = basic_credentials(&headers).unwrap();
        assert_eq!(username, "alice");
        assert_eq!(password, "pa:ss");
    }

    #[test]
    fn test_basic_credentials_rejects_garbage() {
        let headers = headers_with_auth("Basic !!!not-base64!!!");
        assert!(basic_credentials(&headers).is_none());

        let headers = headers_with_auth("Bearer something");
        assert!(basic_credentials(&headers).is_none());
    }

    // =========================================================================
    // Base64 Tests
    // =========================================================================

    #[test]
    fn test_base64_roundtrip() {
        let data = b"Hello, world";
        assert_eq!(base64_decode(&base64_encode(data)).unwrap(), data);
    }

    #[test]
    fn test_base64_decode_simple() {
        // "Hello" in base64 is "SGVsbG8="
        let decoded = base64_decode("SGVsbG8=").unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_base64_decode_no_padding() {
        let decoded = base64_decode("SGVsbG8").unwrap();
        assert_eq!(decoded, b"Hello");
    }

    #[test]
    fn test_base64_decode_invalid_char() {
        assert!(base64_decode("SGVs@G8!").is_err());
    }
}
