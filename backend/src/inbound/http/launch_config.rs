//! Launch verification settings parsing and validation.
//!
//! The bot token signs every launch payload, so it is mandatory in all
//! builds. The unsigned mock bypass is a local development aid: it needs an
//! explicit opt-in and is refused outright by release builds.

use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::{LaunchError, LaunchVerifier};

pub(crate) const BOT_TOKEN_ENV: &str = "BOT_TOKEN";
pub(crate) const ALLOW_MOCK_ENV: &str = "LAUNCH_ALLOW_MOCK";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Build mode for launch configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds may enable the mock bypass.
    Debug,
    /// Release builds reject it.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use companion::inbound::http::launch_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// if cfg!(debug_assertions) {
    ///     assert_eq!(mode, BuildMode::Debug);
    /// } else {
    ///     assert_eq!(mode, BuildMode::Release);
    /// }
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Settings needed to verify launch payloads.
pub struct LaunchSettings {
    /// Bot token the payload signatures are derived from.
    pub bot_token: Zeroizing<String>,
    /// Whether unsigned mock payloads are accepted.
    pub allow_mock: bool,
}

impl LaunchSettings {
    /// Build the verifier these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::Key`] when the signing key cannot be derived.
    pub fn verifier(&self) -> Result<LaunchVerifier, LaunchError> {
        LaunchVerifier::new(&self.bot_token, self.allow_mock)
    }
}

impl std::fmt::Debug for LaunchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchSettings")
            .field("bot_token", &"<redacted>")
            .field("allow_mock", &self.allow_mock)
            .finish()
    }
}

/// Errors raised while validating launch configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LaunchConfigError {
    /// A required environment variable is missing or blank.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Release builds must not accept unsigned payloads.
    #[error("LAUNCH_ALLOW_MOCK must be 0 in release builds")]
    MockNotAllowed,
}

/// Build launch settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use companion::inbound::http::launch_config::{BuildMode, launch_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "BOT_TOKEN" => Some("123456:ABC".to_string()),
///     _ => None,
/// });
///
/// let settings = launch_settings_from_env(&env, BuildMode::Release).expect("valid settings");
/// assert!(!settings.allow_mock);
/// ```
pub fn launch_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<LaunchSettings, LaunchConfigError> {
    let bot_token = bot_token_from_env(env)?;
    let allow_mock = allow_mock_from_env(env, mode)?;
    if allow_mock {
        warn!("unsigned mock launch payloads are accepted (dev only)");
    }
    Ok(LaunchSettings {
        bot_token,
        allow_mock,
    })
}

fn bot_token_from_env<E: Env>(env: &E) -> Result<Zeroizing<String>, LaunchConfigError> {
    let token = Zeroizing::new(env.string(BOT_TOKEN_ENV).unwrap_or_default());
    if token.trim().is_empty() {
        return Err(LaunchConfigError::MissingEnv {
            name: BOT_TOKEN_ENV,
        });
    }
    Ok(token)
}

fn allow_mock_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<bool, LaunchConfigError> {
    let Some(value) = env.string(ALLOW_MOCK_ENV) else {
        return Ok(false);
    };
    match parse_bool(&value) {
        Some(true) if mode.is_debug() => Ok(true),
        Some(true) => Err(LaunchConfigError::MockNotAllowed),
        Some(false) => Ok(false),
        None if mode.is_debug() => {
            warn!(value = %value, "invalid LAUNCH_ALLOW_MOCK; defaulting to disabled");
            Ok(false)
        }
        None => Err(LaunchConfigError::InvalidEnv {
            name: ALLOW_MOCK_ENV,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
