use serde::{Deserialize, Serialize};

/// Fixed weights combining the five sub-scores into a composite. Expressed in
/// whole percent; the canonical set sums to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub certification: u8,
    pub language: u8,
    pub proximity: u8,
    pub rating: u8,
    pub availability: u8,
}

impl ScoreWeights {
    pub const fn total(self) -> u16 {
        self.certification as u16
            + self.language as u16
            + self.proximity as u16
            + self.rating as u16
            + self.availability as u16
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            certification: 35,
            language: 25,
            proximity: 20,
            rating: 15,
            availability: 5,
        }
    }
}

/// Tunable thresholds for the matching pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub weights: ScoreWeights,
    /// Candidates scoring below this on certification produce no lead.
    pub certification_floor: f32,
    pub advanced_level_bonus: f32,
    pub standard_level_bonus: f32,
    /// Below this many completed sessions a candidate is treated as cold-start
    /// and receives the neutral rating score.
    pub cold_start_sessions: u32,
    pub exclusive_rating_floor: f32,
    pub exclusive_score_floor: f32,
    pub priority_score_floor: f32,
    pub exclusive_window_hours: i64,
    pub priority_window_hours: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            certification_floor: 40.0,
            advanced_level_bonus: 20.0,
            standard_level_bonus: 10.0,
            cold_start_sessions: 10,
            exclusive_rating_floor: 4.5,
            exclusive_score_floor: 80.0,
            priority_score_floor: 70.0,
            exclusive_window_hours: 24,
            priority_window_hours: 48,
        }
    }
}
