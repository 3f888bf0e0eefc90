//! Identity primitives: platform ids, public ids, and the caller identity
//! carried by a verified launch payload.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Smallest public id that can be minted.
pub const PUBLIC_ID_MIN: u32 = 10_000_000;
/// Largest public id that can be minted.
pub const PUBLIC_ID_MAX: u32 = 99_999_999;

/// Validation errors for identity primitives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    #[error("public id must be exactly eight decimal digits")]
    MalformedPublicId,
    #[error("public id must be between {min} and {max}")]
    PublicIdOutOfRange { min: u32, max: u32 },
}

/// Numeric identity assigned by the host chat platform.
///
/// Stable and unique per person; the primary key of every on-disk record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct PlatformId(i64);

impl PlatformId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque eight-digit identifier shown to other users.
///
/// Public ids are never reused and order numerically, which gives pair
/// operations a canonical lock order.
///
/// # Examples
/// ```
/// use companion::domain::PublicId;
///
/// let id: PublicId = "12345678".parse().expect("eight digits");
/// assert_eq!(id.to_string(), "12345678");
/// assert!("1234".parse::<PublicId>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "48151623")]
pub struct PublicId(u32);

impl PublicId {
    /// Construct from a number inside the mintable range.
    pub fn new(raw: u32) -> Result<Self, IdentityValidationError> {
        if !(PUBLIC_ID_MIN..=PUBLIC_ID_MAX).contains(&raw) {
            return Err(IdentityValidationError::PublicIdOutOfRange {
                min: PUBLIC_ID_MIN,
                max: PUBLIC_ID_MAX,
            });
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl std::str::FromStr for PublicId {
    type Err = IdentityValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentityValidationError::MalformedPublicId);
        }
        let raw = s
            .parse::<u32>()
            .map_err(|_| IdentityValidationError::MalformedPublicId)?;
        Self::new(raw)
    }
}

impl TryFrom<String> for PublicId {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PublicId> for String {
    fn from(value: PublicId) -> Self {
        value.to_string()
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller identity extracted from a verified launch payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LaunchIdentity {
    #[serde(rename = "id")]
    pub platform_id: PlatformId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl LaunchIdentity {
    pub fn new(platform_id: PlatformId) -> Self {
        Self {
            platform_id,
            first_name: None,
            last_name: None,
            username: None,
        }
    }

    /// Name recorded on first contact: the platform username, else the
    /// first name, else `User_<platformId>`.
    ///
    /// # Examples
    /// ```
    /// use companion::domain::{LaunchIdentity, PlatformId};
    ///
    /// let mut identity = LaunchIdentity::new(PlatformId::new(42));
    /// assert_eq!(identity.display_name(), "User_42");
    /// identity.first_name = Some("Ada".into());
    /// assert_eq!(identity.display_name(), "Ada");
    /// ```
    pub fn display_name(&self) -> String {
        non_blank(self.username.as_deref())
            .or_else(|| non_blank(self.first_name.as_deref()))
            .map(str::to_owned)
            .unwrap_or_else(|| format!("User_{}", self.platform_id))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
