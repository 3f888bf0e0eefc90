//! Launch payload verification.
//!
//! The host platform hands the client a URL-encoded payload signed with a
//! key derived from the bot token. The payload proves the caller's platform
//! identity without any session state on our side.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;
use zeroize::Zeroizing;

use super::identity::LaunchIdentity;

type HmacSha256 = Hmac<Sha256>;

/// Key used to derive the signing secret from the bot token.
const SECRET_DERIVATION_KEY: &[u8] = b"WebAppData";
/// `query_id` value that marks an unsigned local development payload.
pub const MOCK_QUERY_ID: &str = "MOCK_FOR_LOCAL_DEV";

/// Why a launch payload was rejected.
///
/// Callers must not surface the variant to clients.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LaunchError {
    #[error("launch payload has no hash field")]
    MissingHash,
    #[error("launch payload hash is not valid hex")]
    MalformedHash,
    #[error("launch payload signature does not match")]
    SignatureMismatch,
    #[error("launch payload has no user field")]
    MissingUser,
    #[error("launch payload user field is invalid: {0}")]
    InvalidUser(String),
    #[error("signing key rejected: {0}")]
    Key(String),
}

/// Verifies signed launch payloads and extracts the caller identity.
pub struct LaunchVerifier {
    secret: Zeroizing<Vec<u8>>,
    allow_mock: bool,
}

impl LaunchVerifier {
    /// Derive the signing secret from `bot_token`.
    ///
    /// `allow_mock` accepts unsigned payloads carrying [`MOCK_QUERY_ID`];
    /// configuration only enables it for debug builds.
    pub fn new(bot_token: &str, allow_mock: bool) -> Result<Self, LaunchError> {
        Ok(Self {
            secret: derive_secret(bot_token)?,
            allow_mock,
        })
    }

    pub fn allows_mock(&self) -> bool {
        self.allow_mock
    }

    /// Verify `raw` and return the identity it vouches for.
    pub fn verify(&self, raw: &str) -> Result<LaunchIdentity, LaunchError> {
        let mut fields: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();

        if self.allow_mock && field(&fields, "query_id") == Some(MOCK_QUERY_ID) {
            warn!("launch verification bypassed for a mock payload");
            return parse_user(&fields);
        }

        let position = fields
            .iter()
            .position(|(key, _)| key == "hash")
            .ok_or(LaunchError::MissingHash)?;
        let (_, hash) = fields.remove(position);
        let expected = hex::decode(hash.trim()).map_err(|_| LaunchError::MalformedHash)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|err| LaunchError::Key(err.to_string()))?;
        mac.update(data_check_string(&mut fields).as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| LaunchError::SignatureMismatch)?;

        parse_user(&fields)
    }
}

impl std::fmt::Debug for LaunchVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchVerifier")
            .field("allow_mock", &self.allow_mock)
            .finish_non_exhaustive()
    }
}

pub(crate) fn derive_secret(bot_token: &str) -> Result<Zeroizing<Vec<u8>>, LaunchError> {
    let mut mac = HmacSha256::new_from_slice(SECRET_DERIVATION_KEY)
        .map_err(|err| LaunchError::Key(err.to_string()))?;
    mac.update(bot_token.as_bytes());
    Ok(Zeroizing::new(mac.finalize().into_bytes().to_vec()))
}

/// Sort the fields by key and join them as `key=value` lines.
pub(crate) fn data_check_string(fields: &mut [(String, String)]) -> String {
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn parse_user(fields: &[(String, String)]) -> Result<LaunchIdentity, LaunchError> {
    let user = field(fields, "user").ok_or(LaunchError::MissingUser)?;
    serde_json::from_str(user).map_err(|err| LaunchError::InvalidUser(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlatformId;
    use crate::test_support::signed_launch_payload;
    use rstest::{fixture, rstest};

    const TOKEN: &str = "123456:TEST-TOKEN";
    const USER: &str = r#"{"id":4242,"first_name":"Ada","username":"ada_l"}"#;

    #[fixture]
    fn verifier() -> LaunchVerifier {
        LaunchVerifier::new(TOKEN, false).expect("hmac accepts any key")
    }

    #[rstest]
    fn accepts_correctly_signed_payload(verifier: LaunchVerifier) {
        let raw = signed_launch_payload(TOKEN, &[("auth_date", "1700000000"), ("user", USER)]);
        let identity = verifier.verify(&raw).expect("valid signature");
        assert_eq!(identity.platform_id, PlatformId::new(4242));
        assert_eq!(identity.display_name(), "ada_l");
    }

    #[rstest]
    fn field_order_does_not_matter(verifier: LaunchVerifier) {
        let raw = signed_launch_payload(TOKEN, &[("user", USER), ("auth_date", "1700000000")]);
        assert!(verifier.verify(&raw).is_ok());
    }

    #[rstest]
    fn rejects_payload_signed_with_other_token(verifier: LaunchVerifier) {
        let raw = signed_launch_payload("999:OTHER", &[("user", USER)]);
        assert_eq!(verifier.verify(&raw), Err(LaunchError::SignatureMismatch));
    }

    #[rstest]
    fn rejects_tampered_field(verifier: LaunchVerifier) {
        let raw = signed_launch_payload(TOKEN, &[("auth_date", "1700000000"), ("user", USER)])
            .replace("1700000000", "1700000001");
        assert_eq!(verifier.verify(&raw), Err(LaunchError::SignatureMismatch));
    }

    #[rstest]
    #[case("user=%7B%7D", LaunchError::MissingHash)]
    #[case("user=%7B%7D&hash=zz", LaunchError::MalformedHash)]
    #[case("", LaunchError::MissingHash)]
    fn rejects_malformed_payloads(
        verifier: LaunchVerifier,
        #[case] raw: &str,
        #[case] expected: LaunchError,
    ) {
        assert_eq!(verifier.verify(raw), Err(expected));
    }

    #[rstest]
    fn signed_payload_without_user_is_rejected(verifier: LaunchVerifier) {
        let raw = signed_launch_payload(TOKEN, &[("auth_date", "1")]);
        assert_eq!(verifier.verify(&raw), Err(LaunchError::MissingUser));
    }

    #[rstest]
    fn signed_payload_with_bad_user_is_rejected(verifier: LaunchVerifier) {
        let raw = signed_launch_payload(TOKEN, &[("user", r#"{"first_name":"x"}"#)]);
        assert!(matches!(
            verifier.verify(&raw),
            Err(LaunchError::InvalidUser(_))
        ));
    }

    fn mock_payload() -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("query_id", MOCK_QUERY_ID)
            .append_pair("user", USER)
            .finish()
    }

    #[rstest]
    fn mock_payload_rejected_when_disabled(verifier: LaunchVerifier) {
        assert_eq!(
            verifier.verify(&mock_payload()),
            Err(LaunchError::MissingHash)
        );
    }

    #[rstest]
    fn mock_payload_accepted_when_enabled() {
        let verifier = LaunchVerifier::new(TOKEN, true).expect("hmac accepts any key");
        let identity = verifier.verify(&mock_payload()).expect("mock accepted");
        assert_eq!(identity.platform_id, PlatformId::new(4242));
    }

    #[rstest]
    fn data_check_string_sorts_by_key() {
        let mut fields = vec![
            ("user".to_owned(), "{}".to_owned()),
            ("auth_date".to_owned(), "1".to_owned()),
            ("query_id".to_owned(), "q".to_owned()),
        ];
        assert_eq!(
            data_check_string(&mut fields),
            "auth_date=1\nquery_id=q\nuser={}"
        );
    }

    #[rstest]
    fn debug_output_hides_secret(verifier: LaunchVerifier) {
        let rendered = format!("{verifier:?}");
        assert!(!rendered.contains("secret"));
    }
}
