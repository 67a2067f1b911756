use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{
    Engagement, EngagementId, EngagementStatus, InstitutionType, Lead, LeadId, ReviewStatus,
    TherapistId, TherapistResponse,
};
use super::engine::{MatchEngine, MatchError};
use super::repository::{
    AlertError, LeadAlert, LeadNotifier, MatchingRepository, RepositoryError,
};

/// Service composing the match engine with the repository and notifier ports.
/// Owns every status mutation on engagements and leads; the engine itself
/// never writes.
pub struct MatchingService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    engine: Arc<MatchEngine>,
}

static ENGAGEMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_engagement_id() -> EngagementId {
    let id = ENGAGEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    EngagementId(format!("eng-{id:06}"))
}

/// Operator-submitted definition of a new engagement, validated before an id
/// is assigned and the record is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementDraft {
    pub institution_name: String,
    pub institution_type: InstitutionType,
    pub engagement_type: String,
    pub title: String,
    pub description: String,
    pub certifications_required: Vec<String>,
    #[serde(default)]
    pub specializations_required: Vec<String>,
    #[serde(default)]
    pub languages_required: Vec<String>,
    pub location_city: String,
    pub location_state: String,
    #[serde(default)]
    pub is_onsite: bool,
    pub start_date: NaiveDate,
    pub sessions_per_month: u32,
    pub session_rate_min: u32,
    pub session_rate_max: u32,
    pub therapists_needed: u32,
}

impl EngagementDraft {
    fn validate(&self) -> Result<(), EngagementValidationError> {
        if self.certifications_required.is_empty() {
            return Err(EngagementValidationError::MissingCertifications);
        }
        if self.therapists_needed == 0 {
            return Err(EngagementValidationError::ZeroStaffingTarget);
        }
        if self.session_rate_min > self.session_rate_max {
            return Err(EngagementValidationError::InvertedRateBand {
                min: self.session_rate_min,
                max: self.session_rate_max,
            });
        }
        Ok(())
    }
}

/// Validation errors raised while opening an engagement.
#[derive(Debug, thiserror::Error)]
pub enum EngagementValidationError {
    #[error("an engagement must declare at least one required certification")]
    MissingCertifications,
    #[error("therapists_needed must be at least 1")]
    ZeroStaffingTarget,
    #[error("session rate band is inverted (min {min} > max {max})")]
    InvertedRateBand { min: u32, max: u32 },
}

/// Therapist-side action on a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadResponseAction {
    Accept,
    Decline,
}

impl<R, N> MatchingService<R, N>
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, engine: MatchEngine) -> Self {
        Self {
            repository,
            notifier,
            engine: Arc::new(engine),
        }
    }

    /// Validate and store a new engagement with status `open`.
    pub fn open_engagement(
        &self,
        draft: EngagementDraft,
    ) -> Result<Engagement, MatchingServiceError> {
        draft.validate()?;

        let engagement = Engagement {
            engagement_id: next_engagement_id(),
            institution_name: draft.institution_name,
            institution_type: draft.institution_type,
            engagement_type: draft.engagement_type,
            title: draft.title,
            description: draft.description,
            certifications_required: draft.certifications_required,
            specializations_required: draft.specializations_required,
            languages_required: draft.languages_required,
            location_city: draft.location_city,
            location_state: draft.location_state,
            is_onsite: draft.is_onsite,
            start_date: draft.start_date,
            sessions_per_month: draft.sessions_per_month,
            session_rate_min: draft.session_rate_min,
            session_rate_max: draft.session_rate_max,
            therapists_needed: draft.therapists_needed,
            therapists_matched: 0,
            status: EngagementStatus::Open,
        };

        let stored = self.repository.insert_engagement(engagement)?;
        info!(engagement_id = %stored.engagement_id, "engagement opened");
        Ok(stored)
    }

    /// Run the match engine over the full roster for one open engagement,
    /// append the lead batch, and move the engagement to `matching`.
    pub fn run_matching(
        &self,
        engagement_id: &EngagementId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Lead>, MatchingServiceError> {
        let mut engagement = self
            .repository
            .fetch_engagement(engagement_id)?
            .ok_or(RepositoryError::NotFound)?;

        if engagement.status != EngagementStatus::Open {
            return Err(MatchingServiceError::EngagementNotOpen(
                engagement_id.clone(),
            ));
        }

        let roster = self.repository.roster()?;
        let leads = self.engine.run(&engagement, &roster, now)?;

        self.repository.append_leads(leads.clone())?;

        engagement.status = EngagementStatus::Matching;
        self.repository.update_engagement(engagement)?;

        info!(
            engagement_id = %engagement_id,
            candidates = roster.len(),
            leads = leads.len(),
            "match run completed"
        );

        Ok(leads)
    }

    /// Therapist-side accept/decline toggle. Only leads still open on the
    /// therapist side may respond; accepting notifies the reviewer.
    pub fn record_response(
        &self,
        lead_id: &LeadId,
        action: LeadResponseAction,
    ) -> Result<Lead, MatchingServiceError> {
        let mut lead = self
            .repository
            .fetch_lead(lead_id)?
            .ok_or(RepositoryError::NotFound)?;

        if !lead.therapist_status.is_open() {
            return Err(MatchingServiceError::LeadAlreadyResolved(lead_id.clone()));
        }

        lead.therapist_status = match action {
            LeadResponseAction::Accept => TherapistResponse::Accepted,
            LeadResponseAction::Decline => TherapistResponse::Declined,
        };
        self.repository.update_lead(lead.clone())?;

        if action == LeadResponseAction::Accept {
            let mut details = BTreeMap::new();
            details.insert("therapist_id".to_string(), lead.therapist_id.0.clone());
            self.notifier.publish(LeadAlert {
                template: "lead_accepted".to_string(),
                lead_id: lead.lead_id.clone(),
                details,
            })?;
        }

        Ok(lead)
    }

    /// Reviewer-side approval: marks the lead assigned, increments the
    /// engagement's matched count, and advances its status. Enforces the
    /// matched-count invariant: approving against a filled engagement fails.
    pub fn approve_lead(&self, lead_id: &LeadId) -> Result<Lead, MatchingServiceError> {
        let mut lead = self
            .repository
            .fetch_lead(lead_id)?
            .ok_or(RepositoryError::NotFound)?;

        if lead.review_status == ReviewStatus::Approved {
            return Err(MatchingServiceError::LeadAlreadyResolved(lead_id.clone()));
        }

        let mut engagement = self
            .repository
            .fetch_engagement(&lead.engagement_id)?
            .ok_or(RepositoryError::NotFound)?;

        if engagement.is_filled() {
            return Err(MatchingServiceError::EngagementFilled(
                engagement.engagement_id.clone(),
            ));
        }

        lead.review_status = ReviewStatus::Approved;
        lead.assigned = true;

        engagement.therapists_matched += 1;
        engagement.status = if engagement.is_filled() {
            EngagementStatus::Filled
        } else {
            EngagementStatus::PartiallyFilled
        };

        self.repository.update_lead(lead.clone())?;
        self.repository.update_engagement(engagement.clone())?;

        if engagement.is_filled() {
            let mut details = BTreeMap::new();
            details.insert(
                "engagement_id".to_string(),
                engagement.engagement_id.0.clone(),
            );
            self.notifier.publish(LeadAlert {
                template: "engagement_filled".to_string(),
                lead_id: lead.lead_id.clone(),
                details,
            })?;
        }

        Ok(lead)
    }

    /// The leads whose visibility window contains `at`, for one therapist's
    /// dashboard.
    pub fn visible_leads(
        &self,
        therapist_id: &TherapistId,
        at: DateTime<Utc>,
    ) -> Result<Vec<Lead>, MatchingServiceError> {
        let mut leads = self.repository.leads_for_therapist(therapist_id)?;
        leads.retain(|lead| lead.visible_at(at));
        Ok(leads)
    }

    /// Fetch an engagement for API status views.
    pub fn engagement(&self, id: &EngagementId) -> Result<Engagement, MatchingServiceError> {
        let engagement = self
            .repository
            .fetch_engagement(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(engagement)
    }

    /// Fetch a lead for API status views.
    pub fn lead(&self, id: &LeadId) -> Result<Lead, MatchingServiceError> {
        let lead = self
            .repository
            .fetch_lead(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(lead)
    }
}

/// Error raised by the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error(transparent)]
    Validation(#[from] EngagementValidationError),
    #[error(transparent)]
    Match(#[from] MatchError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error("engagement {0} is not open for matching")]
    EngagementNotOpen(EngagementId),
    #[error("engagement {0} already has its full staffing target")]
    EngagementFilled(EngagementId),
    #[error("lead {0} has already been resolved")]
    LeadAlreadyResolved(LeadId),
}
