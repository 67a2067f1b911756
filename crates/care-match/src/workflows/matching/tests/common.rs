use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::workflows::matching::domain::{
    CertificationLevel, Engagement, EngagementId, EngagementStatus, InstitutionType, Lead, LeadId,
    Therapist, TherapistId,
};
use crate::workflows::matching::engine::{MatchConfig, MatchEngine};
use crate::workflows::matching::repository::{
    AlertError, LeadAlert, LeadNotifier, MatchingRepository, RepositoryError,
};
use crate::workflows::matching::router::matching_router;
use crate::workflows::matching::service::{EngagementDraft, MatchingService};

pub(super) fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn match_config() -> MatchConfig {
    MatchConfig::default()
}

pub(super) fn engine() -> MatchEngine {
    MatchEngine::new(match_config())
}

pub(super) fn therapist(
    id: &str,
    level: CertificationLevel,
    certifications: &[&str],
    languages: &[&str],
    avg_rating: f32,
    total_sessions: u32,
) -> Therapist {
    Therapist {
        therapist_id: TherapistId(id.to_string()),
        name: format!("Therapist {id}"),
        email: format!("{id}@example.com"),
        phone: "+91 9876543210".to_string(),
        avg_rating,
        total_sessions,
        certifications: certifications.iter().map(|c| c.to_string()).collect(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        location_city: "Bangalore".to_string(),
        location_state: "Karnataka".to_string(),
        location_lat: 12.9716,
        location_lng: 77.5946,
        certification_level: level,
    }
}

pub(super) fn sarah() -> Therapist {
    therapist(
        "t1",
        CertificationLevel::Expert,
        &["CBT", "DBT", "Corporate Wellness Coach"],
        &["en", "hi"],
        4.8,
        120,
    )
}

pub(super) fn amit() -> Therapist {
    therapist(
        "t2",
        CertificationLevel::Standard,
        &["Child/Adolescent Certified", "CBT"],
        &["hi", "gu"],
        4.2,
        45,
    )
}

pub(super) fn jane() -> Therapist {
    therapist(
        "t3",
        CertificationLevel::Advanced,
        &["Executive Therapist", "NLP", "CBT"],
        &["en", "kn"],
        4.6,
        80,
    )
}

/// Executive coaching engagement: only Jane clears both filters.
pub(super) fn executive_engagement() -> Engagement {
    Engagement {
        engagement_id: EngagementId("e1".to_string()),
        institution_name: "Global Corp Tech".to_string(),
        institution_type: InstitutionType::Corporate,
        engagement_type: "Executive Coaching".to_string(),
        title: "Leadership Wellness Program".to_string(),
        description: "C-suite mental fitness sessions for the leadership team.".to_string(),
        certifications_required: vec!["Executive Therapist".to_string(), "NLP".to_string()],
        specializations_required: vec!["Leadership".to_string(), "Stress".to_string()],
        languages_required: vec!["en".to_string()],
        location_city: "Bangalore".to_string(),
        location_state: "Karnataka".to_string(),
        is_onsite: true,
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        sessions_per_month: 4,
        session_rate_min: 5000,
        session_rate_max: 8000,
        therapists_needed: 1,
        therapists_matched: 0,
        status: EngagementStatus::Open,
    }
}

/// Engagement whose requirements spread a three-person roster across all
/// three tiers (see `tiered_roster`).
pub(super) fn staged_engagement() -> Engagement {
    let mut engagement = executive_engagement();
    engagement.engagement_id = EngagementId("e-staged".to_string());
    engagement.title = "Campus Counselling Rollout".to_string();
    engagement.certifications_required = vec!["CBT".to_string(), "DBT".to_string()];
    engagement.languages_required = vec!["en".to_string(), "hi".to_string()];
    engagement.therapists_needed = 2;
    engagement
}

/// One candidate per tier against `staged_engagement`: t-a lands exclusive,
/// t-b priority (rating gate), t-c standard.
pub(super) fn tiered_roster() -> Vec<Therapist> {
    vec![
        therapist(
            "t-a",
            CertificationLevel::Expert,
            &["CBT", "DBT"],
            &["en", "hi"],
            4.8,
            100,
        ),
        therapist(
            "t-b",
            CertificationLevel::Standard,
            &["CBT", "DBT"],
            &["en", "hi"],
            4.0,
            50,
        ),
        therapist(
            "t-c",
            CertificationLevel::Standard,
            &["CBT"],
            &["en"],
            4.9,
            5,
        ),
    ]
}

pub(super) fn wellness_draft() -> EngagementDraft {
    EngagementDraft {
        institution_name: "Global Corp Tech".to_string(),
        institution_type: InstitutionType::Corporate,
        engagement_type: "Executive Coaching".to_string(),
        title: "Leadership Wellness Program".to_string(),
        description: "C-suite mental fitness sessions for the leadership team.".to_string(),
        certifications_required: vec!["Executive Therapist".to_string(), "NLP".to_string()],
        specializations_required: vec!["Leadership".to_string()],
        languages_required: vec!["en".to_string()],
        location_city: "Bangalore".to_string(),
        location_state: "Karnataka".to_string(),
        is_onsite: true,
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        sessions_per_month: 4,
        session_rate_min: 5000,
        session_rate_max: 8000,
        therapists_needed: 1,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    engagements: Arc<Mutex<HashMap<EngagementId, Engagement>>>,
    therapists: Arc<Mutex<Vec<Therapist>>>,
    leads: Arc<Mutex<Vec<Lead>>>,
}

impl MatchingRepository for MemoryRepository {
    fn insert_engagement(&self, engagement: Engagement) -> Result<Engagement, RepositoryError> {
        let mut guard = self.engagements.lock().expect("engagement mutex poisoned");
        if guard.contains_key(&engagement.engagement_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(engagement.engagement_id.clone(), engagement.clone());
        Ok(engagement)
    }

    fn update_engagement(&self, engagement: Engagement) -> Result<(), RepositoryError> {
        let mut guard = self.engagements.lock().expect("engagement mutex poisoned");
        guard.insert(engagement.engagement_id.clone(), engagement);
        Ok(())
    }

    fn fetch_engagement(&self, id: &EngagementId) -> Result<Option<Engagement>, RepositoryError> {
        let guard = self.engagements.lock().expect("engagement mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn upsert_therapist(&self, therapist: Therapist) -> Result<(), RepositoryError> {
        let mut guard = self.therapists.lock().expect("roster mutex poisoned");
        guard.retain(|existing| existing.therapist_id != therapist.therapist_id);
        guard.push(therapist);
        Ok(())
    }

    fn roster(&self) -> Result<Vec<Therapist>, RepositoryError> {
        Ok(self.therapists.lock().expect("roster mutex poisoned").clone())
    }

    fn append_leads(&self, leads: Vec<Lead>) -> Result<(), RepositoryError> {
        self.leads
            .lock()
            .expect("lead mutex poisoned")
            .extend(leads);
        Ok(())
    }

    fn update_lead(&self, lead: Lead) -> Result<(), RepositoryError> {
        let mut guard = self.leads.lock().expect("lead mutex poisoned");
        match guard.iter_mut().find(|stored| stored.lead_id == lead.lead_id) {
            Some(stored) => {
                *stored = lead;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_lead(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let guard = self.leads.lock().expect("lead mutex poisoned");
        Ok(guard.iter().find(|lead| &lead.lead_id == id).cloned())
    }

    fn leads_for_engagement(&self, id: &EngagementId) -> Result<Vec<Lead>, RepositoryError> {
        let guard = self.leads.lock().expect("lead mutex poisoned");
        Ok(guard
            .iter()
            .filter(|lead| &lead.engagement_id == id)
            .cloned()
            .collect())
    }

    fn leads_for_therapist(&self, id: &TherapistId) -> Result<Vec<Lead>, RepositoryError> {
        let guard = self.leads.lock().expect("lead mutex poisoned");
        Ok(guard
            .iter()
            .filter(|lead| &lead.therapist_id == id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<LeadAlert>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<LeadAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl LeadNotifier for MemoryNotifier {
    fn publish(&self, alert: LeadAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) fn build_service() -> (
    MatchingService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = MatchingService::new(repository.clone(), notifier.clone(), engine());
    (service, repository, notifier)
}

pub(super) fn build_router() -> (Arc<MemoryRepository>, Arc<MemoryNotifier>, axum::Router) {
    let (service, repository, notifier) = build_service();
    (repository, notifier, matching_router(Arc::new(service)))
}
