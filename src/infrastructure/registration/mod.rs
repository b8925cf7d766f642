//! Registration infrastructure: stores, read paths and wizard drafts

mod form_service;
pub(crate) mod in_memory;
mod postgres;
mod service;

pub use form_service::{FormReply, RegistrationFormService};
pub use in_memory::InMemoryRegistrationRepository;
pub use postgres::PostgresRegistrationRepository;
pub use service::RegistrationService;
