//! Server-held registration wizard drafts
//!
//! One wizard per signed-in user, kept in a moka cache with an idle TTL so
//! abandoned drafts simply expire. The wizard mutex is never held across the
//! store call; the wizard's own in-flight flag covers re-entrant submits.

use chrono::Utc;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::registration::{
    Caller, NewRegistration, Registration, RegistrationRepository, RegistrationWizard, StepInput,
    StepOutcome, SubmitOutcome, SubmitStart, WizardView,
};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

/// Maximum number of live drafts
const MAX_DRAFTS: u64 = 10_000;

/// Result of a wizard action
#[derive(Debug, Clone)]
pub enum FormReply {
    /// State changed (or was just read)
    Updated(WizardView),
    /// Field validation failed; the view carries the messages
    Invalid(WizardView),
    /// The store refused the insert; the view carries its message
    Rejected(WizardView),
    /// A submission for this draft is already running
    InProgress(WizardView),
    /// Inserted; the draft is gone
    Confirmed(Registration),
}

/// Registration form service
#[derive(Debug, Clone)]
pub struct RegistrationFormService {
    drafts: Cache<UserId, Arc<Mutex<RegistrationWizard>>>,
    repository: Arc<dyn RegistrationRepository>,
}

impl RegistrationFormService {
    pub fn new(repository: Arc<dyn RegistrationRepository>, draft_ttl: Duration) -> Self {
        let drafts = Cache::builder()
            .max_capacity(MAX_DRAFTS)
            .time_to_idle(draft_ttl)
            .build();

        Self { drafts, repository }
    }

    async fn draft(&self, user_id: &UserId) -> Arc<Mutex<RegistrationWizard>> {
        self.drafts
            .get_with(*user_id, async { Arc::new(Mutex::new(RegistrationWizard::new())) })
            .await
    }

    /// Current wizard state, starting a fresh draft if there is none
    pub async fn view(&self, user: &User) -> WizardView {
        self.draft(user.id()).await.lock().await.view()
    }

    /// Validate the current step and move forward
    pub async fn next(&self, user: &User, input: &StepInput) -> Result<FormReply, DomainError> {
        let draft = self.draft(user.id()).await;
        let mut wizard = draft.lock().await;

        let outcome = wizard
            .next(input)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(match outcome {
            StepOutcome::Advanced(step) => {
                debug!(user_id = %user.id(), step = step.number(), "Registration step advanced");
                FormReply::Updated(wizard.view())
            }
            StepOutcome::Blocked(errors) => {
                debug!(user_id = %user.id(), fields = errors.len(), "Registration step invalid");
                FormReply::Invalid(wizard.view())
            }
        })
    }

    /// Step back without validation
    pub async fn back(&self, user: &User) -> Result<FormReply, DomainError> {
        let draft = self.draft(user.id()).await;
        let mut wizard = draft.lock().await;

        wizard
            .back()
            .map_err(|e| DomainError::validation(e.to_string()))?;

        Ok(FormReply::Updated(wizard.view()))
    }

    /// Validate the final step and insert the registration
    ///
    /// The insert runs on its own task: a caller that goes away mid-insert
    /// does not leave the draft in flight.
    pub async fn submit(&self, user: &User, input: &StepInput) -> Result<FormReply, DomainError> {
        let draft = self.draft(user.id()).await;

        let row = {
            let mut wizard = draft.lock().await;
            let start = wizard
                .begin_submit(input, *user.id(), Utc::now())
                .map_err(|e| DomainError::validation(e.to_string()))?;

            match start {
                SubmitStart::Ready(row) => row,
                SubmitStart::Blocked(_) => {
                    record_submission("invalid");
                    return Ok(FormReply::Invalid(wizard.view()));
                }
                SubmitStart::Ignored => {
                    debug!(user_id = %user.id(), "Submission already in flight");
                    return Ok(FormReply::InProgress(wizard.view()));
                }
            }
        };

        let service = self.clone();
        let caller = Caller::from(user);
        let task_draft = draft.clone();
        let task =
            tokio::spawn(async move { service.complete_submit(caller, task_draft, row).await });

        match task.await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                let mut wizard = draft.lock().await;
                if wizard.is_submitting() {
                    wizard.finish_submit(Err(DomainError::internal(
                        "Registration could not be saved",
                    )));
                }
                Err(DomainError::internal(format!("Registration submission failed: {}", e)))
            }
        }
    }

    async fn complete_submit(
        &self,
        caller: Caller,
        draft: Arc<Mutex<RegistrationWizard>>,
        row: NewRegistration,
    ) -> FormReply {
        let user_id = row.user_id;
        let result = self.repository.insert(&caller, row).await;

        let mut wizard = draft.lock().await;
        match wizard.finish_submit(result) {
            SubmitOutcome::Confirmed(registration) => {
                drop(wizard);
                self.drafts.invalidate(&user_id).await;

                info!(
                    user_id = %user_id,
                    registration_id = %registration.id(),
                    "Registration confirmed"
                );
                record_submission("confirmed");
                FormReply::Confirmed(registration)
            }
            SubmitOutcome::Rejected(message) => {
                warn!(user_id = %user_id, error = %message, "Registration rejected by store");
                record_submission("rejected");
                FormReply::Rejected(wizard.view())
            }
        }
    }

    /// Throw the draft away
    pub async fn abandon(&self, user: &User) {
        self.drafts.invalidate(user.id()).await;
        debug!(user_id = %user.id(), "Registration draft discarded");
    }
}

fn record_submission(outcome: &'static str) {
    metrics::counter!("registration_submissions_total", "outcome" => outcome).increment(1);
}
