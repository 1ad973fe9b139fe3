//! SASL XOAUTH2 payload construction
//!
//! The mechanism carries an OAuth2 bearer token in place of a password:
//! `user={user}\x01auth=Bearer {token}\x01\x01`, base64-encoded, submitted
//! as the argument of the AUTH XOAUTH2 command.

use base64::prelude::*;

/// Build the base64-encoded XOAUTH2 response for the given user and token.
pub fn xoauth2_payload(user: &str, access_token: &str) -> String {
    BASE64_STANDARD.encode(xoauth2_response(user, access_token))
}

fn xoauth2_response(user: &str, access_token: &str) -> String {
    format!("user={}\x01auth=Bearer {}\x01\x01", user, access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_format() {
        assert_eq!(
            xoauth2_response("admin@example.com", "T123"),
            "user=admin@example.com\x01auth=Bearer T123\x01\x01"
        );
    }

    #[test]
    fn test_payload_exact_encoding() {
        assert_eq!(
            xoauth2_payload("admin@example.com", "T123"),
            "dXNlcj1hZG1pbkBleGFtcGxlLmNvbQFhdXRoPUJlYXJlciBUMTIzAQE="
        );
    }

    #[test]
    fn test_payload_round_trips() {
        let payload = xoauth2_payload("user@example.com", "opaque-token");
        let decoded = String::from_utf8(BASE64_STANDARD.decode(&payload).unwrap()).unwrap();
        assert_eq!(decoded, xoauth2_response("user@example.com", "opaque-token"));
    }
}
