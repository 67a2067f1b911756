use care_match::workflows::matching::{
    AlertError, Engagement, EngagementId, Lead, LeadAlert, LeadId, LeadNotifier, MatchConfig,
    MatchingRepository, RepositoryError, Therapist, TherapistId,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn default_match_config() -> MatchConfig {
    MatchConfig::default()
}

/// Accepts either an RFC 3339 timestamp or a bare date (midnight UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    Err(format!(
        "failed to parse '{raw}' as RFC 3339 or YYYY-MM-DD"
    ))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMatchingRepository {
    engagements: Arc<Mutex<HashMap<EngagementId, Engagement>>>,
    therapists: Arc<Mutex<Vec<Therapist>>>,
    leads: Arc<Mutex<Vec<Lead>>>,
}

impl MatchingRepository for InMemoryMatchingRepository {
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
        if guard.contains_key(&engagement.engagement_id) {
            guard.insert(engagement.engagement_id.clone(), engagement);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryLeadNotifier {
    events: Arc<Mutex<Vec<LeadAlert>>>,
}

impl InMemoryLeadNotifier {
    pub(crate) fn events(&self) -> Vec<LeadAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl LeadNotifier for InMemoryLeadNotifier {
    fn publish(&self, alert: LeadAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timestamp_supports_rfc3339_and_dates() {
        let rfc = parse_timestamp("2024-05-20T12:00:00Z").expect("parse rfc");
        assert_eq!(
            rfc,
            Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0)
                .single()
                .expect("valid")
        );

        let date = parse_timestamp("2024-05-20").expect("parse date");
        assert_eq!(
            date,
            Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0)
                .single()
                .expect("valid")
        );

        assert!(parse_timestamp("not-a-date").is_err());
    }
}
