use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for institutional engagements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngagementId(pub String);

impl fmt::Display for EngagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for therapist profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TherapistId(pub String);

impl fmt::Display for TherapistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for leads, derived from the engagement/therapist pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn for_pair(engagement: &EngagementId, therapist: &TherapistId) -> Self {
        Self(format!("lead_{}_{}", engagement.0, therapist.0))
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    Corporate,
    Education,
    Healthcare,
}

impl InstitutionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Corporate => "corporate",
            Self::Education => "education",
            Self::Healthcare => "healthcare",
        }
    }
}

/// Lifecycle of an engagement. Transitions are monotonic: an engagement moves
/// forward through draft -> open -> matching -> {partially_filled|filled} and
/// never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementStatus {
    Draft,
    Open,
    Matching,
    PartiallyFilled,
    Filled,
    Active,
    Completed,
    Cancelled,
}

impl EngagementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Matching => "matching",
            Self::PartiallyFilled => "partially_filled",
            Self::Filled => "filled",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    const fn rank(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Open => 1,
            Self::Matching => 2,
            Self::PartiallyFilled => 3,
            Self::Filled => 4,
            Self::Active => 5,
            Self::Completed => 6,
            Self::Cancelled => 7,
        }
    }

    /// Whether `next` is a legal forward transition from this status.
    pub fn allows(self, next: EngagementStatus) -> bool {
        self.rank() < next.rank()
    }
}

/// An institutional request for one or more therapists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub engagement_id: EngagementId,
    pub institution_name: String,
    pub institution_type: InstitutionType,
    pub engagement_type: String,
    pub title: String,
    pub description: String,
    pub certifications_required: Vec<String>,
    pub specializations_required: Vec<String>,
    pub languages_required: Vec<String>,
    pub location_city: String,
    pub location_state: String,
    pub is_onsite: bool,
    pub start_date: NaiveDate,
    pub sessions_per_month: u32,
    pub session_rate_min: u32,
    pub session_rate_max: u32,
    pub therapists_needed: u32,
    pub therapists_matched: u32,
    pub status: EngagementStatus,
}

impl Engagement {
    pub fn is_filled(&self) -> bool {
        self.therapists_matched >= self.therapists_needed
    }
}

/// Credential depth of a therapist, ordered standard < advanced < expert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationLevel {
    Standard,
    Advanced,
    Expert,
}

impl CertificationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "advanced" => Some(Self::Advanced),
            "expert" => Some(Self::Expert),
            _ => None,
        }
    }
}

/// A service-provider profile eligible for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Therapist {
    pub therapist_id: TherapistId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avg_rating: f32,
    pub total_sessions: u32,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub location_city: String,
    pub location_state: String,
    pub location_lat: f64,
    pub location_lng: f64,
    pub certification_level: CertificationLevel,
}

/// Priority class governing when a lead becomes visible to its therapist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTier {
    Exclusive,
    Priority,
    Standard,
}

impl LeadTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Priority => "priority",
            Self::Standard => "standard",
        }
    }
}

/// Therapist-side response state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TherapistResponse {
    Pending,
    Viewed,
    Interested,
    Accepted,
    Declined,
    Expired,
}

impl TherapistResponse {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Viewed => "viewed",
            Self::Interested => "interested",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }

    /// A lead can still be accepted or declined while in these states.
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Viewed | Self::Interested)
    }
}

/// Reviewer-side approval state of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Waitlisted,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Waitlisted => "waitlisted",
        }
    }
}

/// Per-dimension sub-scores backing a lead's composite score, kept so
/// reviewers can audit why a lead ranked where it did. Each value is 0-100;
/// `rating` is rounded at computation time, the others are stored as computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub certification: f32,
    pub language: f32,
    pub proximity: f32,
    pub rating: f32,
    pub availability: f32,
}

/// A proposed pairing of one therapist to one engagement.
///
/// Leads reference their engagement and therapist by id only; the
/// presentation layer joins the records when it needs denormalized detail.
/// After creation only the two status fields and the assignment flag change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: LeadId,
    pub engagement_id: EngagementId,
    pub therapist_id: TherapistId,
    pub match_score: u8,
    pub breakdown: ScoreBreakdown,
    pub tier: LeadTier,
    pub visible_from: DateTime<Utc>,
    pub visible_until: Option<DateTime<Utc>>,
    pub therapist_status: TherapistResponse,
    pub review_status: ReviewStatus,
    pub assigned: bool,
}

impl Lead {
    /// Whether the lead's visibility window contains `at`.
    pub fn visible_at(&self, at: DateTime<Utc>) -> bool {
        if at < self.visible_from {
            return false;
        }
        match self.visible_until {
            Some(until) => at < until,
            None => true,
        }
    }
}
