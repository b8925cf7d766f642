//! Registration entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::UserId;

/// Registration identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
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

impl std::fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Event t-shirt sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TshirtSize {
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
    #[serde(rename = "XL")]
    ExtraLarge,
}

impl TshirtSize {
    pub const ALL: [TshirtSize; 4] = [Self::Small, Self::Medium, Self::Large, Self::ExtraLarge];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "S" => Some(Self::Small),
            "M" => Some(Self::Medium),
            "L" => Some(Self::Large),
            "XL" => Some(Self::ExtraLarge),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
            Self::ExtraLarge => "XL",
        }
    }
}

impl std::fmt::Display for TshirtSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    #[default]
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated participant details collected by the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDetails {
    pub full_name: String,
    pub corporate_email: String,
    pub employee_id: String,
    pub company_name: String,
    pub tshirt_size: TshirtSize,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

/// A registration about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub user_id: UserId,
    pub details: RegistrationDetails,
    pub registration_date: DateTime<Utc>,
    pub status: RegistrationStatus,
}

impl NewRegistration {
    /// A confirmed registration stamped with the given time
    pub fn confirmed(user_id: UserId, details: RegistrationDetails, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            details,
            registration_date: now,
            status: RegistrationStatus::Confirmed,
        }
    }
}

/// A persisted registration row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    id: RegistrationId,
    user_id: UserId,
    #[serde(flatten)]
    details: RegistrationDetails,
    registration_date: DateTime<Utc>,
    status: RegistrationStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Registration {
    /// Materialize a new row the way the store does on insert
    pub fn from_new(id: RegistrationId, new: NewRegistration, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            details: new.details,
            registration_date: new.registration_date,
            status: new.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a row loaded from storage
    pub fn reconstruct(
        id: RegistrationId,
        user_id: UserId,
        details: RegistrationDetails,
        registration_date: DateTime<Utc>,
        status: RegistrationStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            details,
            registration_date,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &RegistrationId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn details(&self) -> &RegistrationDetails {
        &self.details
    }

    pub fn full_name(&self) -> &str {
        &self.details.full_name
    }

    pub fn company_name(&self) -> &str {
        &self.details.company_name
    }

    pub fn registration_date(&self) -> DateTime<Utc> {
        self.registration_date
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
