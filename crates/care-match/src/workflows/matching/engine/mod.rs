mod config;
pub(crate) mod scoring;
pub(crate) mod tier;

pub use config::{MatchConfig, ScoreWeights};

use super::domain::{
    Engagement, EngagementId, Lead, LeadId, ReviewStatus, ScoreBreakdown, Therapist,
    TherapistResponse,
};
use chrono::{DateTime, Utc};
use tier::{determine_tier, visibility_window};

/// Stateless engine that scores a therapist roster against one engagement and
/// produces the ranked lead batch.
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Score every candidate against the engagement at the given reference
    /// time. Inputs are not mutated; `now` is explicit so runs are
    /// deterministic under test.
    ///
    /// Candidates are dropped when their certification score misses the floor
    /// or when they share no required language. The surviving leads are sorted
    /// by rounded composite score descending, ties broken by therapist id
    /// ascending.
    pub fn run(
        &self,
        engagement: &Engagement,
        roster: &[Therapist],
        now: DateTime<Utc>,
    ) -> Result<Vec<Lead>, MatchError> {
        if engagement.certifications_required.is_empty() {
            return Err(MatchError::NoCertificationRequirements(
                engagement.engagement_id.clone(),
            ));
        }

        if engagement.languages_required.is_empty() {
            // Valid input, but the language gate excludes every candidate.
            tracing::warn!(
                engagement_id = %engagement.engagement_id,
                "engagement has no required languages; match run will produce no leads"
            );
        }

        let mut leads: Vec<Lead> = roster
            .iter()
            .filter_map(|therapist| self.score_candidate(engagement, therapist, now))
            .collect();

        leads.sort_by(|a, b| {
            b.match_score
                .cmp(&a.match_score)
                .then_with(|| a.therapist_id.cmp(&b.therapist_id))
        });

        Ok(leads)
    }

    fn score_candidate(
        &self,
        engagement: &Engagement,
        therapist: &Therapist,
        now: DateTime<Utc>,
    ) -> Option<Lead> {
        let certification = scoring::certification_score(
            &engagement.certifications_required,
            &therapist.certifications,
            therapist.certification_level,
            &self.config,
        );
        if certification < self.config.certification_floor {
            return None;
        }

        let language =
            scoring::language_score(&engagement.languages_required, &therapist.languages);
        if language == 0.0 {
            return None;
        }

        let breakdown = ScoreBreakdown {
            certification,
            language,
            proximity: scoring::PROXIMITY_PLACEHOLDER,
            rating: scoring::rating_score(
                therapist.avg_rating,
                therapist.total_sessions,
                &self.config,
            ),
            availability: scoring::AVAILABILITY_PLACEHOLDER,
        };

        let composite = scoring::composite_score(&breakdown, &self.config);
        let tier = determine_tier(therapist.avg_rating, composite, &self.config);
        let (visible_from, visible_until) = visibility_window(tier, now, &self.config);

        Some(Lead {
            lead_id: LeadId::for_pair(&engagement.engagement_id, &therapist.therapist_id),
            engagement_id: engagement.engagement_id.clone(),
            therapist_id: therapist.therapist_id.clone(),
            match_score: composite.round() as u8,
            breakdown,
            tier,
            visible_from,
            visible_until,
            therapist_status: TherapistResponse::Pending,
            review_status: ReviewStatus::Pending,
            assigned: false,
        })
    }
}

/// Error raised when an engagement is malformed for matching purposes.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("engagement {0} declares no required certifications")]
    NoCertificationRequirements(EngagementId),
}
