use super::super::domain::{CertificationLevel, ScoreBreakdown};
use super::config::MatchConfig;

/// No real geolocation lookup is wired in; distance is simulated as a perfect
/// score until a distance function replaces this sub-score.
pub(crate) const PROXIMITY_PLACEHOLDER: f32 = 100.0;

/// Same placeholder treatment as proximity, pending schedule-conflict checks.
pub(crate) const AVAILABILITY_PLACEHOLDER: f32 = 100.0;

/// An engagement with no required certifications divides by this instead of
/// zero. The candidate then earns base 0 plus the level bonus, which can never
/// reach the certification floor, so such engagements match nobody.
pub(crate) const EMPTY_REQUIREMENT_DIVISOR: usize = 1;

const NEUTRAL_RATING_SCORE: f32 = 50.0;
const RATING_PORTION_CAP: f32 = 80.0;
const EXPERIENCE_BONUS_CAP: f32 = 20.0;
const SESSIONS_PER_FULL_BONUS: f32 = 50.0;

pub(crate) fn certification_score(
    required: &[String],
    held: &[String],
    level: CertificationLevel,
    config: &MatchConfig,
) -> f32 {
    let overlap = required.iter().filter(|cert| held.contains(cert)).count();
    let divisor = required.len().max(EMPTY_REQUIREMENT_DIVISOR);
    let base = (overlap as f32 / divisor as f32) * 80.0;

    let bonus = match level {
        CertificationLevel::Advanced | CertificationLevel::Expert => config.advanced_level_bonus,
        CertificationLevel::Standard => config.standard_level_bonus,
    };

    (base + bonus).min(100.0)
}

pub(crate) fn language_score(required: &[String], spoken: &[String]) -> f32 {
    if required.is_empty() || spoken.is_empty() {
        return 0.0;
    }

    let matches = required.iter().filter(|lang| spoken.contains(lang)).count();
    if matches == 0 {
        return 0.0;
    }

    (matches as f32 / required.len() as f32) * 100.0
}

/// Candidates without a rating or with fewer than `cold_start_sessions`
/// completed sessions score a flat neutral value: insufficient history is
/// neither penalized nor rewarded.
pub(crate) fn rating_score(avg_rating: f32, total_sessions: u32, config: &MatchConfig) -> f32 {
    if avg_rating <= 0.0 || total_sessions < config.cold_start_sessions {
        return NEUTRAL_RATING_SCORE;
    }

    let rating_portion = (avg_rating / 5.0) * RATING_PORTION_CAP;
    let experience_bonus = EXPERIENCE_BONUS_CAP
        .min((total_sessions as f32 / SESSIONS_PER_FULL_BONUS) * EXPERIENCE_BONUS_CAP);

    (rating_portion + experience_bonus).round()
}

/// Weighted sum of the five sub-scores. Unrounded; rounding happens once when
/// the value is stored on the lead.
pub(crate) fn composite_score(breakdown: &ScoreBreakdown, config: &MatchConfig) -> f32 {
    let weights = config.weights;
    breakdown.certification * weights.certification as f32 / 100.0
        + breakdown.language * weights.language as f32 / 100.0
        + breakdown.proximity * weights.proximity as f32 / 100.0
        + breakdown.rating * weights.rating as f32 / 100.0
        + breakdown.availability * weights.availability as f32 / 100.0
}
