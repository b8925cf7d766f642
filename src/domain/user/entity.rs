//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// User identifier issued by the identity gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Access role carried in user metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Parse an exact role name; anything else is not a role
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Open metadata map with the keys this service understands lifted out
///
/// `role` is read leniently: a missing, null, non-string or unknown value
/// deserializes as `None` and callers fall back to [`Role::User`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_role"
    )]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserMetadata {
    /// Metadata written at sign-up
    pub fn profile(full_name: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            company: Some(company.into()),
            ..Self::default()
        }
    }
}

fn lenient_role<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_str).and_then(Role::parse))
}

/// User account owned by the identity gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    metadata: UserMetadata,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user; the email is stored lower-cased
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        metadata: UserMetadata,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a user loaded from storage
    pub fn reconstruct(
        id: UserId,
        email: String,
        password_hash: String,
        metadata: UserMetadata,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            password_hash,
            metadata,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn metadata(&self) -> &UserMetadata {
        &self.metadata
    }

    pub fn full_name(&self) -> Option<&str> {
        self.metadata.full_name.as_deref()
    }

    pub fn company(&self) -> Option<&str> {
        self.metadata.company.as_deref()
    }

    /// Effective role, defaulting to [`Role::User`]
    pub fn role(&self) -> Role {
        self.metadata.role.unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Change the role (identity administration only)
    pub fn set_role(&mut self, role: Role) {
        self.metadata.role = Some(role);
        self.updated_at = Utc::now();
    }
}
