//! User data model.
//!
//! Accounts are provisioned by the external identity collaborator; this
//! module owns the profile fields, the ban and visibility flags, and the
//! rating aggregate maintained by the swap workflow.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::UserId;
use super::rating::RatingAggregate;

/// Minimum allowed length for a display name.
pub const NAME_MIN: usize = 2;
/// Maximum allowed length for a display name.
pub const NAME_MAX: usize = 100;
/// Maximum allowed length for a location.
pub const LOCATION_MAX: usize = 200;
/// Maximum allowed length for a ban reason.
pub const BAN_REASON_MAX: usize = 200;
/// Maximum allowed length of one availability tag.
pub const AVAILABILITY_TAG_MAX: usize = 50;

/// Validation errors for user fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    #[error("name must be between {min} and {max} characters")]
    NameLength { min: usize, max: usize },
    #[error("email must be a valid address")]
    InvalidEmail,
    #[error("location must be at most {max} characters")]
    LocationTooLong { max: usize },
    #[error("availability tags must be between 1 and {max} characters")]
    AvailabilityTag { max: usize },
    #[error("ban reason must be at most {max} characters")]
    BanReasonTooLong { max: usize },
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

impl UserValidationError {
    /// Name of the field that failed validation.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NameLength { .. } => "name",
            Self::InvalidEmail => "email",
            Self::LocationTooLong { .. } => "location",
            Self::AvailabilityTag { .. } => "availability",
            Self::BanReasonTooLong { .. } => "reason",
            Self::UnknownRole(_) => "role",
        }
    }
}

/// Human readable name for the user, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into().trim().to_owned();
        let length = name.chars().count();
        if !(NAME_MIN..=NAME_MAX).contains(&length) {
            return Err(UserValidationError::NameLength {
                min: NAME_MIN,
                max: NAME_MAX,
            });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique, lower-cased email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalise and validate an email address.
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into().trim().to_lowercase();
        if !email_regex().is_match(&email) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(email))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Opaque credential hash issued by the identity collaborator.
///
/// Never serialised; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole(other.to_owned())),
        }
    }
}

/// Validate an optional location, trimming whitespace. Blank becomes `None`.
pub fn normalise_location(location: Option<String>) -> Result<Option<String>, UserValidationError> {
    let location = location
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty());
    if location
        .as_deref()
        .is_some_and(|value| value.chars().count() > LOCATION_MAX)
    {
        return Err(UserValidationError::LocationTooLong { max: LOCATION_MAX });
    }
    Ok(location)
}

/// Validate availability tags, trimming each and dropping duplicates.
pub fn normalise_availability(tags: Vec<String>) -> Result<Vec<String>, UserValidationError> {
    let mut normalised: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_owned();
        let length = tag.chars().count();
        if length == 0 || length > AVAILABILITY_TAG_MAX {
            return Err(UserValidationError::AvailabilityTag {
                max: AVAILABILITY_TAG_MAX,
            });
        }
        if !normalised.contains(&tag) {
            normalised.push(tag);
        }
    }
    Ok(normalised)
}

/// Application user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: DisplayName,
    pub email: EmailAddress,
    pub credential_hash: CredentialHash,
    pub location: Option<String>,
    pub is_public: bool,
    pub is_banned: bool,
    pub ban_reason: Option<String>,
    pub role: UserRole,
    pub availability: Vec<String>,
    pub rating: RatingAggregate,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a fresh public, unbanned account with an empty rating.
    pub fn register(
        id: UserId,
        name: DisplayName,
        email: EmailAddress,
        credential_hash: CredentialHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            credential_hash,
            location: None,
            is_public: true,
            is_banned: false,
            ban_reason: None,
            role: UserRole::User,
            availability: Vec::new(),
            rating: RatingAggregate::default(),
            last_active: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    /// Apply a validated profile update.
    pub fn apply_profile(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        let ProfileUpdate {
            name,
            location,
            is_public,
            availability,
        } = update;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(is_public) = is_public {
            self.is_public = is_public;
        }
        if let Some(availability) = availability {
            self.availability = availability;
        }
        self.updated_at = now;
    }

    /// Set or clear the ban flag.
    ///
    /// Lifting a ban also clears the stored reason.
    pub fn set_ban(&mut self, banned: bool, reason: Option<String>, now: DateTime<Utc>) {
        self.is_banned = banned;
        self.ban_reason = if banned { reason } else { None };
        self.updated_at = now;
    }
}

/// Validated partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<DisplayName>,
    /// `Some(None)` clears the location.
    pub location: Option<Option<String>>,
    pub is_public: Option<bool>,
    pub availability: Option<Vec<String>>,
}

/// Validated ban request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanRequest {
    banned: bool,
    reason: Option<String>,
}

impl BanRequest {
    pub fn new(banned: bool, reason: Option<String>) -> Result<Self, UserValidationError> {
        let reason = reason
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());
        if reason
            .as_deref()
            .is_some_and(|value| value.chars().count() > BAN_REASON_MAX)
        {
            return Err(UserValidationError::BanReasonTooLong {
                max: BAN_REASON_MAX,
            });
        }
        Ok(Self { banned, reason })
    }

    pub const fn banned(&self) -> bool {
        self.banned
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn into_parts(self) -> (bool, Option<String>) {
        (self.banned, self.reason)
    }
}
