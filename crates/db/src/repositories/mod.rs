pub mod availability_repo;
pub mod patient_repo;
pub mod payment_intent_repo;
pub mod provider_repo;
pub mod reconciliation_repo;
pub mod token_repo;

pub use availability_repo::AvailabilityRepo;
pub use patient_repo::PatientRepo;
pub use payment_intent_repo::PaymentIntentRepo;
pub use provider_repo::ProviderRepo;
pub use reconciliation_repo::ReconciliationRepo;
pub use token_repo::TokenRepo;
