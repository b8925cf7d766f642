//! Registration form state and per-step validation rules

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{RegistrationDetails, TshirtSize};
use crate::domain::validation::{has_min_chars, is_valid_email};

const MIN_NAME_LENGTH: usize = 2;
const MIN_PHONE_LENGTH: usize = 10;

/// The three ordered steps of the registration form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    PersonalInfo,
    CompanyDetails,
    AdditionalInfo,
}

impl FormStep {
    /// 1-based position shown to the user
    pub fn number(&self) -> u8 {
        match self {
            Self::PersonalInfo => 1,
            Self::CompanyDetails => 2,
            Self::AdditionalInfo => 3,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::PersonalInfo => Some(Self::CompanyDetails),
            Self::CompanyDetails => Some(Self::AdditionalInfo),
            Self::AdditionalInfo => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::PersonalInfo => None,
            Self::CompanyDetails => Some(Self::PersonalInfo),
            Self::AdditionalInfo => Some(Self::CompanyDetails),
        }
    }

    pub fn is_final(&self) -> bool {
        self.next().is_none()
    }

    /// Fields collected on this step
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Self::PersonalInfo => &[Field::FullName, Field::CorporateEmail, Field::EmployeeId],
            Self::CompanyDetails => &[Field::CompanyName],
            Self::AdditionalInfo => &[
                Field::TshirtSize,
                Field::EmergencyContact,
                Field::EmergencyPhone,
            ],
        }
    }
}

/// Form fields, named as they appear on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    FullName,
    CorporateEmail,
    EmployeeId,
    CompanyName,
    TshirtSize,
    EmergencyContact,
    EmergencyPhone,
}

/// Field-level validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }
}

/// Raw values as typed into the form; empty until filled in
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub full_name: String,
    pub corporate_email: String,
    pub employee_id: String,
    pub company_name: String,
    pub tshirt_size: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
}

impl RegistrationForm {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::CorporateEmail => &self.corporate_email,
            Field::EmployeeId => &self.employee_id,
            Field::CompanyName => &self.company_name,
            Field::TshirtSize => &self.tshirt_size,
            Field::EmergencyContact => &self.emergency_contact,
            Field::EmergencyPhone => &self.emergency_phone,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::CorporateEmail => &mut self.corporate_email,
            Field::EmployeeId => &mut self.employee_id,
            Field::CompanyName => &mut self.company_name,
            Field::TshirtSize => &mut self.tshirt_size,
            Field::EmergencyContact => &mut self.emergency_contact,
            Field::EmergencyPhone => &mut self.emergency_phone,
        }
    }

    /// Copy the submitted values that belong to `step`; other fields are ignored
    pub fn merge_step(&mut self, step: FormStep, input: &StepInput) {
        for field in step.fields() {
            if let Some(value) = input.value(*field) {
                *self.value_mut(*field) = value.to_string();
            }
        }
    }

    /// Validate only the fields of one step
    pub fn validate_step(&self, step: FormStep) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        for field in step.fields() {
            if let Some(message) = check_field(*field, self.value(*field)) {
                errors.insert(*field, message);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate every step and produce the typed details
    pub fn to_details(&self) -> Result<RegistrationDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        for step in [
            FormStep::PersonalInfo,
            FormStep::CompanyDetails,
            FormStep::AdditionalInfo,
        ] {
            if let Err(step_errors) = self.validate_step(step) {
                errors.0.extend(step_errors.0);
            }
        }

        let tshirt_size = match TshirtSize::parse(&self.tshirt_size) {
            Some(size) if errors.is_empty() => size,
            _ => return Err(errors),
        };

        Ok(RegistrationDetails {
            full_name: self.full_name.clone(),
            corporate_email: self.corporate_email.clone(),
            employee_id: self.employee_id.clone(),
            company_name: self.company_name.clone(),
            tshirt_size,
            emergency_contact: self.emergency_contact.clone(),
            emergency_phone: self.emergency_phone.clone(),
        })
    }
}

/// Values posted for a step; absent fields keep their previous value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub corporate_email: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub tshirt_size: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub emergency_phone: Option<String>,
}

impl StepInput {
    pub fn value(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::FullName => &self.full_name,
            Field::CorporateEmail => &self.corporate_email,
            Field::EmployeeId => &self.employee_id,
            Field::CompanyName => &self.company_name,
            Field::TshirtSize => &self.tshirt_size,
            Field::EmergencyContact => &self.emergency_contact,
            Field::EmergencyPhone => &self.emergency_phone,
        };
        value.as_deref()
    }
}

fn check_field(field: Field, value: &str) -> Option<&'static str> {
    match field {
        Field::FullName if !has_min_chars(value, MIN_NAME_LENGTH) => {
            Some("Full name must be at least 2 characters")
        }
        Field::CorporateEmail if !is_valid_email(value) => {
            Some("Please enter a valid email address")
        }
        Field::EmployeeId if value.is_empty() => Some("Employee ID is required"),
        Field::CompanyName if !has_min_chars(value, MIN_NAME_LENGTH) => {
            Some("Company name must be at least 2 characters")
        }
        Field::TshirtSize if TshirtSize::parse(value).is_none() => {
            Some("Please select a t-shirt size")
        }
        Field::EmergencyContact if !has_min_chars(value, MIN_NAME_LENGTH) => {
            Some("Emergency contact name must be at least 2 characters")
        }
        Field::EmergencyPhone if !has_min_chars(value, MIN_PHONE_LENGTH) => {
            Some("Phone number must be at least 10 characters")
        }
        _ => None,
    }
}
