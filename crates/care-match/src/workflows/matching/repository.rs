use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Engagement, EngagementId, Lead, LeadId, ScoreBreakdown, Therapist, TherapistId,
};

/// Storage abstraction over the caller-owned collections of engagements,
/// therapists, and leads, so the service module can be exercised in isolation.
pub trait MatchingRepository: Send + Sync {
    fn insert_engagement(&self, engagement: Engagement) -> Result<Engagement, RepositoryError>;
    fn update_engagement(&self, engagement: Engagement) -> Result<(), RepositoryError>;
    fn fetch_engagement(&self, id: &EngagementId) -> Result<Option<Engagement>, RepositoryError>;

    fn upsert_therapist(&self, therapist: Therapist) -> Result<(), RepositoryError>;
    fn roster(&self) -> Result<Vec<Therapist>, RepositoryError>;

    /// Append a match run's lead batch. Leads are never deleted afterwards.
    fn append_leads(&self, leads: Vec<Lead>) -> Result<(), RepositoryError>;
    fn update_lead(&self, lead: Lead) -> Result<(), RepositoryError>;
    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    fn leads_for_engagement(&self, id: &EngagementId) -> Result<Vec<Lead>, RepositoryError>;
    fn leads_for_therapist(&self, id: &TherapistId) -> Result<Vec<Lead>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Trait describing outbound notification hooks (e-mail or dashboard push
/// adapters in a full deployment; delivery itself is out of scope).
pub trait LeadNotifier: Send + Sync {
    fn publish(&self, alert: LeadAlert) -> Result<(), AlertError>;
}

/// Notification payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadAlert {
    pub template: String,
    pub lead_id: LeadId,
    pub details: BTreeMap<String, String>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an engagement's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementStatusView {
    pub engagement_id: EngagementId,
    pub title: String,
    pub status: &'static str,
    pub therapists_needed: u32,
    pub therapists_matched: u32,
}

impl EngagementStatusView {
    pub fn from_engagement(engagement: &Engagement) -> Self {
        Self {
            engagement_id: engagement.engagement_id.clone(),
            title: engagement.title.clone(),
            status: engagement.status.label(),
            therapists_needed: engagement.therapists_needed,
            therapists_matched: engagement.therapists_matched,
        }
    }
}

/// Lead representation returned by the API, statuses flattened to labels.
#[derive(Debug, Clone, Serialize)]
pub struct LeadView {
    pub lead_id: LeadId,
    pub engagement_id: EngagementId,
    pub therapist_id: TherapistId,
    pub match_score: u8,
    pub breakdown: ScoreBreakdown,
    pub tier: &'static str,
    pub visible_from: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_until: Option<DateTime<Utc>>,
    pub therapist_status: &'static str,
    pub review_status: &'static str,
    pub assigned: bool,
}

impl LeadView {
    pub fn from_lead(lead: &Lead) -> Self {
        Self {
            lead_id: lead.lead_id.clone(),
            engagement_id: lead.engagement_id.clone(),
            therapist_id: lead.therapist_id.clone(),
            match_score: lead.match_score,
            breakdown: lead.breakdown,
            tier: lead.tier.label(),
            visible_from: lead.visible_from,
            visible_until: lead.visible_until,
            therapist_status: lead.therapist_status.label(),
            review_status: lead.review_status.label(),
            assigned: lead.assigned,
        }
    }
}
