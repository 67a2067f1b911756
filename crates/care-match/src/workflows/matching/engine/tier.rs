use super::super::domain::LeadTier;
use super::config::MatchConfig;
use chrono::{DateTime, Duration, Utc};

/// Tier classification over the *unrounded* composite. The rating gate is
/// evaluated first: a candidate failing it at composite 85 falls through to
/// the plain priority threshold and lands on priority, not exclusive.
pub(crate) fn determine_tier(avg_rating: f32, composite: f32, config: &MatchConfig) -> LeadTier {
    if avg_rating >= config.exclusive_rating_floor && composite >= config.exclusive_score_floor {
        return LeadTier::Exclusive;
    }
    if composite >= config.priority_score_floor {
        return LeadTier::Priority;
    }
    LeadTier::Standard
}

/// Staged-release visibility windows relative to the match run: exclusive
/// leads get the first day, priority leads the second, standard leads see the
/// opportunity afterwards with no end bound.
pub(crate) fn visibility_window(
    tier: LeadTier,
    now: DateTime<Utc>,
    config: &MatchConfig,
) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
    let exclusive_end = now + Duration::hours(config.exclusive_window_hours);
    let priority_end = now + Duration::hours(config.priority_window_hours);

    match tier {
        LeadTier::Exclusive => (now, Some(exclusive_end)),
        LeadTier::Priority => (exclusive_end, Some(priority_end)),
        LeadTier::Standard => (priority_end, None),
    }
}
