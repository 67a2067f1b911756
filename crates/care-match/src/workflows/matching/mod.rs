//! Engagement-to-therapist matching: domain records, the scoring engine,
//! and the service facade that owns lead lifecycle mutations.

pub mod domain;
pub(crate) mod engine;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CertificationLevel, Engagement, EngagementId, EngagementStatus, InstitutionType, Lead, LeadId,
    LeadTier, ReviewStatus, ScoreBreakdown, Therapist, TherapistId, TherapistResponse,
};
pub use engine::{MatchConfig, MatchEngine, MatchError, ScoreWeights};
pub use repository::{
    AlertError, EngagementStatusView, LeadAlert, LeadNotifier, LeadView, MatchingRepository,
    RepositoryError,
};
pub use router::matching_router;
pub use service::{
    EngagementDraft, EngagementValidationError, LeadResponseAction, MatchingService,
    MatchingServiceError,
};
