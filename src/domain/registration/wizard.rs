//! Multi-step registration wizard
//!
//! `PersonalInfo -> CompanyDetails -> AdditionalInfo`, forward only through
//! validation, backwards freely. Submission is split in two halves so the
//! store call can run without holding the wizard: [`RegistrationWizard::begin_submit`]
//! marks the wizard in flight and hands out the row to insert, and
//! [`RegistrationWizard::finish_submit`] applies the store's answer. While in
//! flight, further submits are ignored and `next` is refused; `back` still works.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::entity::{NewRegistration, Registration};
use super::validation::{FieldErrors, FormStep, RegistrationForm, StepInput};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Transitions that are not allowed in the current state
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("The form can only be submitted from the final step")]
    NotOnFinalStep,

    #[error("Already on the final step")]
    NoNextStep,

    #[error("Registration already submitted")]
    Completed,

    #[error("Submission in progress")]
    SubmissionInProgress,
}

/// Result of `next`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(FormStep),
    Blocked(FieldErrors),
}

/// Result of `begin_submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    /// Insert this row, then call `finish_submit`
    Ready(NewRegistration),
    /// Step validation failed; errors are on the wizard
    Blocked(FieldErrors),
    /// Another submission is in flight; nothing to do
    Ignored,
}

/// Result of `finish_submit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Confirmed(Registration),
    Rejected(String),
}

/// Server-held state of one user's registration form
#[derive(Debug, Clone, Default)]
pub struct RegistrationWizard {
    step: Step,
    form: RegistrationForm,
    errors: FieldErrors,
    form_error: Option<String>,
    in_flight: bool,
    confirmation: Option<Registration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Step(FormStep);

impl Default for Step {
    fn default() -> Self {
        Self(FormStep::PersonalInfo)
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> FormStep {
        self.step.0
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn confirmation(&self) -> Option<&Registration> {
        self.confirmation.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.confirmation.is_some()
    }

    fn ensure_editable(&self) -> Result<(), WizardError> {
        if self.is_complete() {
            return Err(WizardError::Completed);
        }
        if self.in_flight {
            return Err(WizardError::SubmissionInProgress);
        }
        Ok(())
    }

    /// Validate the current step and advance on success
    pub fn next(&mut self, input: &StepInput) -> Result<StepOutcome, WizardError> {
        self.ensure_editable()?;

        let current = self.step();
        let Some(following) = current.next() else {
            return Err(WizardError::NoNextStep);
        };

        self.form.merge_step(current, input);
        self.form_error = None;

        match self.form.validate_step(current) {
            Ok(()) => {
                self.errors.clear();
                self.step = Step(following);
                Ok(StepOutcome::Advanced(following))
            }
            Err(errors) => {
                self.errors = errors.clone();
                Ok(StepOutcome::Blocked(errors))
            }
        }
    }

    /// Go back one step without validation; a no-op on the first step
    pub fn back(&mut self) -> Result<FormStep, WizardError> {
        if self.is_complete() {
            return Err(WizardError::Completed);
        }

        if let Some(previous) = self.step().previous() {
            self.step = Step(previous);
            self.errors.clear();
            self.form_error = None;
        }

        Ok(self.step())
    }

    /// First half of submission: validate the final step and mark in flight
    pub fn begin_submit(
        &mut self,
        input: &StepInput,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<SubmitStart, WizardError> {
        if self.is_complete() {
            return Err(WizardError::Completed);
        }
        if self.in_flight {
            return Ok(SubmitStart::Ignored);
        }
        if !self.step().is_final() {
            return Err(WizardError::NotOnFinalStep);
        }

        self.form.merge_step(self.step(), input);
        self.form_error = None;

        if let Err(errors) = self.form.validate_step(self.step()) {
            self.errors = errors.clone();
            return Ok(SubmitStart::Blocked(errors));
        }

        let details = match self.form.to_details() {
            Ok(details) => details,
            Err(errors) => {
                self.errors = errors.clone();
                return Ok(SubmitStart::Blocked(errors));
            }
        };

        self.errors.clear();
        self.in_flight = true;

        Ok(SubmitStart::Ready(NewRegistration::confirmed(user_id, details, now)))
    }

    /// Second half of submission: apply the store's answer
    ///
    /// A rejection leaves the wizard on its current step with the store's
    /// message as the form-level error.
    pub fn finish_submit(&mut self, result: Result<Registration, DomainError>) -> SubmitOutcome {
        self.in_flight = false;

        match result {
            Ok(registration) => {
                self.confirmation = Some(registration.clone());
                SubmitOutcome::Confirmed(registration)
            }
            Err(err) => {
                let message = err.message().to_string();
                self.form_error = Some(message.clone());
                SubmitOutcome::Rejected(message)
            }
        }
    }

    /// Snapshot for rendering
    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.step(),
            step_number: self.step().number(),
            values: self.form.clone(),
            errors: self.errors.clone(),
            form_error: self.form_error.clone(),
            submitting: self.in_flight,
            confirmation: self.confirmation.clone(),
        }
    }
}

/// Serializable view of the wizard
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WizardView {
    pub step: FormStep,
    pub step_number: u8,
    pub values: RegistrationForm,
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_error: Option<String>,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Registration>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registration::entity::{RegistrationId, RegistrationStatus, TshirtSize};
    use crate::domain::registration::validation::Field;

    fn step_one() -> StepInput {
        StepInput {
            full_name: Some("Jane Doe".to_string()),
            corporate_email: Some("jane@acme.com".to_string()),
            employee_id: Some("E-1".to_string()),
            ..StepInput::default()
        }
    }

    fn step_two() -> StepInput {
        StepInput {
            company_name: Some("Acme".to_string()),
            ..StepInput::default()
        }
    }

    fn step_three(size: &str) -> StepInput {
        StepInput {
            tshirt_size: Some(size.to_string()),
            emergency_contact: Some("John Doe".to_string()),
            emergency_phone: Some("5551234567".to_string()),
            ..StepInput::default()
        }
    }

    fn wizard_on_final_step() -> RegistrationWizard {
        let mut wizard = RegistrationWizard::new();
        wizard.next(&step_one()).unwrap();
        wizard.next(&step_two()).unwrap();
        assert_eq!(wizard.step(), FormStep::AdditionalInfo);
        wizard
    }

    fn ready_row(wizard: &mut RegistrationWizard) -> NewRegistration {
        match wizard
            .begin_submit(&step_three("M"), UserId::generate(), Utc::now())
            .unwrap()
        {
            SubmitStart::Ready(row) => row,
            other => panic!("expected ready, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_state() {
        let wizard = RegistrationWizard::new();

        assert_eq!(wizard.step(), FormStep::PersonalInfo);
        assert_eq!(wizard.form(), &RegistrationForm::default());
        assert!(wizard.errors().is_empty());
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn test_next_boundary_name_advances() {
        let mut wizard = RegistrationWizard::new();
        let input = StepInput {
            full_name: Some("Al".to_string()),
            ..step_one()
        };

        let outcome = wizard.next(&input).unwrap();
        assert_eq!(outcome, StepOutcome::Advanced(FormStep::CompanyDetails));
    }

    #[test]
    fn test_next_short_name_blocks() {
        let mut wizard = RegistrationWizard::new();
        let input = StepInput {
            full_name: Some("A".to_string()),
            ..step_one()
        };

        let outcome = wizard.next(&input).unwrap();

        assert!(matches!(outcome, StepOutcome::Blocked(_)));
        assert_eq!(wizard.step(), FormStep::PersonalInfo);
        assert!(wizard
            .errors()
            .get(Field::FullName)
            .unwrap()
            .contains("at least 2 characters"));
    }

    #[test]
    fn test_next_cannot_skip_steps() {
        let mut wizard = RegistrationWizard::new();
        let mut input = step_one();
        input.company_name = Some("Acme".to_string());

        wizard.next(&input).unwrap();
        assert_eq!(wizard.step(), FormStep::CompanyDetails);
        assert_eq!(wizard.form().company_name, "");
    }

    #[test]
    fn test_next_from_final_step_rejected() {
        let mut wizard = wizard_on_final_step();
        assert_eq!(wizard.next(&step_three("M")), Err(WizardError::NoNextStep));
    }

    #[test]
    fn test_back_keeps_values() {
        let mut wizard = wizard_on_final_step();

        assert_eq!(wizard.back().unwrap(), FormStep::CompanyDetails);
        assert_eq!(wizard.back().unwrap(), FormStep::PersonalInfo);
        assert_eq!(wizard.back().unwrap(), FormStep::PersonalInfo);

        assert_eq!(wizard.form().full_name, "Jane Doe");
        assert_eq!(wizard.form().company_name, "Acme");
    }

    #[test]
    fn test_submit_only_from_final_step() {
        let mut wizard = RegistrationWizard::new();
        let result = wizard.begin_submit(&step_three("M"), UserId::generate(), Utc::now());

        assert_eq!(result, Err(WizardError::NotOnFinalStep));
    }

    #[test]
    fn test_submit_revalidates_final_step() {
        let mut wizard = wizard_on_final_step();
        let result = wizard
            .begin_submit(&step_three("XXL"), UserId::generate(), Utc::now())
            .unwrap();

        assert!(matches!(result, SubmitStart::Blocked(_)));
        assert!(!wizard.is_submitting());
        assert!(wizard.errors().get(Field::TshirtSize).is_some());
    }

    #[test]
    fn test_submit_builds_confirmed_row() {
        let mut wizard = wizard_on_final_step();
        let user_id = UserId::generate();
        let now = Utc::now();

        let start = wizard.begin_submit(&step_three("M"), user_id, now).unwrap();
        let SubmitStart::Ready(row) = start else {
            panic!("expected ready");
        };

        assert_eq!(row.user_id, user_id);
        assert_eq!(row.registration_date, now);
        assert_eq!(row.status, RegistrationStatus::Confirmed);
        assert_eq!(row.details.tshirt_size, TshirtSize::Medium);
        assert_eq!(row.details.full_name, "Jane Doe");
        assert!(wizard.is_submitting());
    }

    #[test]
    fn test_reentrant_submit_is_ignored() {
        let mut wizard = wizard_on_final_step();
        ready_row(&mut wizard);

        let again = wizard
            .begin_submit(&step_three("L"), UserId::generate(), Utc::now())
            .unwrap();

        assert_eq!(again, SubmitStart::Ignored);
        assert_eq!(wizard.form().tshirt_size, "M");
        assert_eq!(wizard.next(&step_one()), Err(WizardError::SubmissionInProgress));
    }

    #[test]
    fn test_back_allowed_while_in_flight() {
        let mut wizard = wizard_on_final_step();
        ready_row(&mut wizard);

        assert_eq!(wizard.back(), Ok(FormStep::CompanyDetails));
        assert!(wizard.is_submitting());

        let outcome = wizard.finish_submit(Err(DomainError::conflict("already registered")));
        assert_eq!(outcome, SubmitOutcome::Rejected("already registered".to_string()));
        assert_eq!(wizard.step(), FormStep::CompanyDetails);
        assert_eq!(wizard.form_error(), Some("already registered"));
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn test_rejection_stays_on_final_step() {
        let mut wizard = wizard_on_final_step();
        ready_row(&mut wizard);

        let outcome = wizard.finish_submit(Err(DomainError::conflict(
            "duplicate key value violates unique constraint",
        )));

        assert_eq!(
            outcome,
            SubmitOutcome::Rejected("duplicate key value violates unique constraint".to_string())
        );
        assert_eq!(wizard.step(), FormStep::AdditionalInfo);
        assert!(!wizard.is_submitting());
        assert!(!wizard.is_complete());
        assert_eq!(
            wizard.form_error(),
            Some("duplicate key value violates unique constraint")
        );

        // The user can try again
        assert!(matches!(
            wizard.begin_submit(&StepInput::default(), UserId::generate(), Utc::now()),
            Ok(SubmitStart::Ready(_))
        ));
    }

    #[test]
    fn test_confirmation_is_terminal() {
        let mut wizard = wizard_on_final_step();
        let row = ready_row(&mut wizard);
        let now = row.registration_date;
        let registration = Registration::from_new(RegistrationId::generate(), row, now);

        let outcome = wizard.finish_submit(Ok(registration.clone()));

        assert_eq!(outcome, SubmitOutcome::Confirmed(registration.clone()));
        assert_eq!(wizard.confirmation(), Some(&registration));
        assert_eq!(wizard.back(), Err(WizardError::Completed));
        assert_eq!(
            wizard.begin_submit(&StepInput::default(), UserId::generate(), Utc::now()),
            Err(WizardError::Completed)
        );
    }

    #[test]
    fn test_view_reflects_state() {
        let mut wizard = RegistrationWizard::new();
        wizard.next(&StepInput::default()).unwrap();

        let view = wizard.view();
        assert_eq!(view.step_number, 1);
        assert_eq!(view.errors.len(), 3);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["step"], "personal_info");
        assert!(json["errors"]["full_name"].is_string());
        assert!(json.get("form_error").is_none());
    }
}
