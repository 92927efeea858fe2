//! User record model.
//!
//! Field newtypes validate on construction so a [`User`] can only hold values
//! that satisfy the record invariants. Raw JSON input is turned into these
//! types by [`crate::domain::validation`], which reports every violation at
//! once.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, SubsecRound, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length of a user name, in characters.
pub const NAME_MAX: usize = 100;
/// Maximum length of an email address, in characters.
pub const EMAIL_MAX: usize = 320;
/// Lowest accepted score.
pub const SCORE_MIN: u8 = 0;
/// Highest accepted score.
pub const SCORE_MAX: u8 = 100;

/// Validation errors raised by the user field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    InvalidId,
    BlankName,
    NameTooLong { max: usize },
    InvalidEmail,
    EmailTooLong { max: usize },
    ScoreOutOfRange { min: u8, max: u8 },
    NoChanges,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "Invalid UUID format"),
            Self::BlankName => write!(f, "Name is required"),
            Self::NameTooLong { max } => write!(f, "Name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "Invalid email format"),
            Self::EmailTooLong { max } => write!(f, "Email must be at most {max} characters"),
            Self::ScoreOutOfRange { min, max } => {
                write!(f, "Score must be between {min} and {max}")
            }
            Self::NoChanges => write!(f, "At least one field must be provided for update"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
///
/// Only the canonical hyphenated form is accepted; surrounding whitespace is
/// rejected rather than trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from text.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.len() != 36 || id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::try_parse(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Name shown for a user. Stored exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate and construct a [`UserName`].
    pub fn new(name: impl Into<String>) -> Result<Self, UserValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserValidationError::BlankName);
        }
        if name.chars().count() > NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: NAME_MAX });
        }
        Ok(Self(name))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // One `@`, no whitespace, and a dot somewhere in the domain part.
        let pattern = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address with a `local@domain.tld` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
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

/// Score in `SCORE_MIN..=SCORE_MAX`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Validate and construct a [`Score`].
    pub fn new(value: i64) -> Result<Self, UserValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|score| (SCORE_MIN..=SCORE_MAX).contains(score))
            .map(Self)
            .ok_or(UserValidationError::ScoreOutOfRange {
                min: SCORE_MIN,
                max: SCORE_MAX,
            })
    }

    /// Numeric value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Score {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Persisted user record.
///
/// ## Invariants
/// - `id` never changes once assigned.
/// - `created_at <= updated_at`.
/// - Timestamps carry microsecond precision so values read back from
///   PostgreSQL compare equal to the ones written.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use user_api::domain::{NewUser, User, UserId};
///
/// let input = NewUser::try_from_strings("Ada", "ada@example.com", None).expect("valid input");
/// let user = User::create(UserId::random(), input, Utc::now());
/// assert_eq!(user.score().value(), 0);
/// assert_eq!(user.created_at(), user.updated_at());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UserDto", into = "UserDto")]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    score: Score,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Rebuild a record from validated components, e.g. a storage row.
    pub fn from_parts(
        id: UserId,
        name: UserName,
        email: EmailAddress,
        score: Score,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            score,
            created_at: created_at.trunc_subsecs(6),
            updated_at: updated_at.trunc_subsecs(6),
        }
    }

    /// Build a fresh record created at `now`. A missing score becomes zero.
    pub fn create(id: UserId, input: NewUser, now: DateTime<Utc>) -> Self {
        let NewUser { name, email, score } = input;
        Self::from_parts(id, name, email, score.unwrap_or_default(), now, now)
    }

    /// Apply `changes` and refresh `updated_at`.
    #[must_use]
    pub fn apply(mut self, changes: &UserChanges, now: DateTime<Utc>) -> Self {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(score) = changes.score {
            self.score = score;
        }
        self.updated_at = now.trunc_subsecs(6);
        self
    }

    /// Stable identifier.
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Unique email address.
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Current score.
    pub const fn score(&self) -> Score {
        self.score
    }

    /// Creation instant.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Instant of the last successful mutation.
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    score: Score,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            name,
            email,
            score,
            created_at,
            updated_at,
        } = value;
        Self {
            id,
            name,
            email,
            score,
            created_at,
            updated_at,
        }
    }
}

impl From<UserDto> for User {
    fn from(value: UserDto) -> Self {
        Self::from_parts(
            value.id,
            value.name,
            value.email,
            value.score,
            value.created_at,
            value.updated_at,
        )
    }
}

/// Validated creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: UserName,
    pub email: EmailAddress,
    pub score: Option<Score>,
}

impl NewUser {
    /// Validate raw components into a [`NewUser`], stopping at the first
    /// failure. Use [`crate::domain::validation::parse_new_user`] to collect
    /// every violation from a request body.
    pub fn try_from_strings(
        name: impl Into<String>,
        email: impl Into<String>,
        score: Option<i64>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            email: EmailAddress::new(email)?,
            score: score.map(Score::new).transpose()?,
        })
    }
}

/// Validated partial update carrying at least one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    name: Option<UserName>,
    email: Option<EmailAddress>,
    score: Option<Score>,
}

impl UserChanges {
    /// Bundle the provided fields, rejecting an empty change set.
    pub fn try_new(
        name: Option<UserName>,
        email: Option<EmailAddress>,
        score: Option<Score>,
    ) -> Result<Self, UserValidationError> {
        if name.is_none() && email.is_none() && score.is_none() {
            return Err(UserValidationError::NoChanges);
        }
        Ok(Self { name, email, score })
    }

    /// Replacement name, if any.
    pub const fn name(&self) -> Option<&UserName> {
        self.name.as_ref()
    }

    /// Replacement email, if any.
    pub const fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Replacement score, if any.
    pub const fn score(&self) -> Option<Score> {
        self.score
    }
}
