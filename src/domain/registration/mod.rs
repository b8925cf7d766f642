//! Registration domain
//!
//! The registration entity, the row policy stores enforce, the multi-step
//! form wizard and the admin report helpers.

mod entity;
mod policy;
pub mod report;
mod repository;
mod validation;
mod wizard;

pub use entity::{
    NewRegistration, Registration, RegistrationDetails, RegistrationId, RegistrationStatus,
    TshirtSize,
};
pub use policy::Caller;
pub use repository::RegistrationRepository;
pub use validation::{Field, FieldErrors, FormStep, RegistrationForm, StepInput};
pub use wizard::{
    RegistrationWizard, StepOutcome, SubmitOutcome, SubmitStart, WizardError, WizardView,
};

#[cfg(test)]
pub use repository::mock::{sample_details, MockRegistrationRepository};
