use crate::infra::{default_match_config, InMemoryLeadNotifier, InMemoryMatchingRepository};
use care_match::error::AppError;
use care_match::workflows::matching::{
    CertificationLevel, Engagement, EngagementDraft, EngagementId, EngagementStatus,
    InstitutionType, Lead, LeadResponseAction, MatchEngine, MatchingRepository, MatchingService,
    Therapist, TherapistId,
};
use care_match::workflows::roster::RosterImporter;
use chrono::{DateTime, Utc};
use clap::Args;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference time for the match run (defaults to now)
    #[arg(long, value_parser = crate::infra::parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Stop after the match run, skipping the response/approval walkthrough
    #[arg(long)]
    pub(crate) skip_review: bool,
}

#[derive(Args, Debug)]
pub(crate) struct MatchRunArgs {
    /// Roster CSV export to score
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Required certifications (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    pub(crate) certifications: Vec<String>,
    /// Required languages (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub(crate) languages: Vec<String>,
    /// Engagement title used in the report header
    #[arg(long, default_value = "Ad-hoc engagement")]
    pub(crate) title: String,
    /// Staffing target reported alongside the leads
    #[arg(long, default_value_t = 1)]
    pub(crate) needed: u32,
    /// Reference time for visibility windows (defaults to now)
    #[arg(long, value_parser = crate::infra::parse_timestamp)]
    pub(crate) now: Option<DateTime<Utc>>,
}

pub(crate) fn run_match_report(args: MatchRunArgs) -> Result<(), AppError> {
    let MatchRunArgs {
        roster,
        certifications,
        languages,
        title,
        needed,
        now,
    } = args;

    let now = now.unwrap_or_else(Utc::now);
    let candidates = RosterImporter::from_path(&roster)?;

    let engagement = Engagement {
        engagement_id: EngagementId("adhoc".to_string()),
        institution_name: "Ad-hoc report".to_string(),
        institution_type: InstitutionType::Corporate,
        engagement_type: "Report".to_string(),
        title: title.clone(),
        description: String::new(),
        certifications_required: certifications,
        specializations_required: Vec::new(),
        languages_required: languages,
        location_city: String::new(),
        location_state: String::new(),
        is_onsite: false,
        start_date: now.date_naive(),
        sessions_per_month: 0,
        session_rate_min: 0,
        session_rate_max: 0,
        therapists_needed: needed,
        therapists_matched: 0,
        status: EngagementStatus::Open,
    };

    let engine = MatchEngine::new(default_match_config());
    let leads = engine.run(&engagement, &candidates, now)?;

    println!("Match report: {title}");
    println!(
        "Requirements: certifications {:?}, languages {:?}",
        engagement.certifications_required, engagement.languages_required
    );
    println!(
        "Roster: {} candidates from {} | reference time {}",
        candidates.len(),
        roster.display(),
        now.to_rfc3339()
    );

    let names = name_index(&candidates);
    render_leads(&leads, &names);

    let excluded = candidates.len() - leads.len();
    if excluded > 0 {
        println!("{excluded} candidate(s) excluded by the certification or language filters");
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { now, skip_review } = args;
    let now = now.unwrap_or_else(Utc::now);

    println!("Therapist matching demo");

    let repository = Arc::new(InMemoryMatchingRepository::default());
    let notifier = Arc::new(InMemoryLeadNotifier::default());
    let roster = demo_roster();
    let names = name_index(&roster);
    for therapist in roster {
        if let Err(err) = repository.upsert_therapist(therapist) {
            println!("  Roster seeding failed: {err}");
            return Ok(());
        }
    }

    let service = MatchingService::new(
        repository,
        notifier.clone(),
        MatchEngine::new(default_match_config()),
    );

    let engagement = match service.open_engagement(demo_draft()) {
        Ok(engagement) => engagement,
        Err(err) => {
            println!("  Engagement rejected: {err}");
            return Ok(());
        }
    };
    println!(
        "- Opened engagement {} ({}) -> status {}",
        engagement.engagement_id,
        engagement.title,
        engagement.status.label()
    );

    let leads = match service.run_matching(&engagement.engagement_id, now) {
        Ok(leads) => leads,
        Err(err) => {
            println!("  Match run unavailable: {err}");
            return Ok(());
        }
    };
    println!("- Match run at {} produced {} lead(s)", now.to_rfc3339(), leads.len());
    render_leads(&leads, &names);

    if skip_review || leads.is_empty() {
        return Ok(());
    }

    let top = &leads[0];
    match service.record_response(&top.lead_id, LeadResponseAction::Accept) {
        Ok(lead) => println!(
            "- {} accepted lead {} -> therapist status {}",
            names
                .get(&lead.therapist_id)
                .map(String::as_str)
                .unwrap_or("therapist"),
            lead.lead_id,
            lead.therapist_status.label()
        ),
        Err(err) => {
            println!("  Response unavailable: {err}");
            return Ok(());
        }
    }

    match service.approve_lead(&top.lead_id) {
        Ok(lead) => println!(
            "- Reviewer approved lead {} -> assigned {}",
            lead.lead_id, lead.assigned
        ),
        Err(err) => {
            println!("  Approval unavailable: {err}");
            return Ok(());
        }
    }

    match service.engagement(&engagement.engagement_id) {
        Ok(filled) => println!(
            "- Engagement {} -> status {} ({}/{} matched)",
            filled.engagement_id,
            filled.status.label(),
            filled.therapists_matched,
            filled.therapists_needed
        ),
        Err(err) => println!("  Engagement lookup unavailable: {err}"),
    }

    let events = notifier.events();
    if events.is_empty() {
        println!("- Alerts: none dispatched");
    } else {
        println!("- Alerts:");
        for alert in events {
            println!("    - template={} -> {}", alert.template, alert.lead_id);
        }
    }

    Ok(())
}

fn render_leads(leads: &[Lead], names: &HashMap<TherapistId, String>) {
    if leads.is_empty() {
        println!("Leads: none");
        return;
    }

    println!("Leads (ranked)");
    for lead in leads {
        let name = names
            .get(&lead.therapist_id)
            .map(String::as_str)
            .unwrap_or("unknown");
        let until = match lead.visible_until {
            Some(until) => until.to_rfc3339(),
            None => "open-ended".to_string(),
        };
        println!(
            "- {} ({name}) | score {} | tier {} | visible {} -> {}",
            lead.therapist_id,
            lead.match_score,
            lead.tier.label(),
            lead.visible_from.to_rfc3339(),
            until
        );
        println!(
            "    certification {:.1} | language {:.1} | proximity {:.1} | rating {:.0} | availability {:.1}",
            lead.breakdown.certification,
            lead.breakdown.language,
            lead.breakdown.proximity,
            lead.breakdown.rating,
            lead.breakdown.availability
        );
    }
}

fn name_index(roster: &[Therapist]) -> HashMap<TherapistId, String> {
    roster
        .iter()
        .map(|therapist| (therapist.therapist_id.clone(), therapist.name.clone()))
        .collect()
}

fn demo_draft() -> EngagementDraft {
    EngagementDraft {
        institution_name: "Global Corp Tech".to_string(),
        institution_type: InstitutionType::Corporate,
        engagement_type: "Executive Coaching".to_string(),
        title: "Leadership Wellness Program".to_string(),
        description: "C-suite mental fitness sessions for the executive leadership team."
            .to_string(),
        certifications_required: vec!["Executive Therapist".to_string(), "NLP".to_string()],
        specializations_required: vec!["Leadership".to_string(), "Stress".to_string()],
        languages_required: vec!["en".to_string()],
        location_city: "Bangalore".to_string(),
        location_state: "Karnataka".to_string(),
        is_onsite: true,
        start_date: chrono::NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        sessions_per_month: 4,
        session_rate_min: 5000,
        session_rate_max: 8000,
        therapists_needed: 1,
    }
}

fn demo_therapist(
    id: &str,
    name: &str,
    email: &str,
    level: CertificationLevel,
    certifications: &[&str],
    languages: &[&str],
    avg_rating: f32,
    total_sessions: u32,
    city: &str,
    state: &str,
    lat: f64,
    lng: f64,
) -> Therapist {
    Therapist {
        therapist_id: TherapistId(id.to_string()),
        name: name.to_string(),
        email: email.to_string(),
        phone: "+91 9876543210".to_string(),
        avg_rating,
        total_sessions,
        certifications: certifications.iter().map(|c| c.to_string()).collect(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        location_city: city.to_string(),
        location_state: state.to_string(),
        location_lat: lat,
        location_lng: lng,
        certification_level: level,
    }
}

fn demo_roster() -> Vec<Therapist> {
    vec![
        demo_therapist(
            "t1",
            "Dr. Sarah Wilson",
            "sarah.w@example.com",
            CertificationLevel::Expert,
            &["CBT", "DBT", "Corporate Wellness Coach"],
            &["en", "hi"],
            4.8,
            120,
            "Mumbai",
            "Maharashtra",
            19.076,
            72.8777,
        ),
        demo_therapist(
            "t2",
            "Amit Patel",
            "amit.p@example.com",
            CertificationLevel::Standard,
            &["Child/Adolescent Certified", "CBT"],
            &["hi", "gu"],
            4.2,
            45,
            "Ahmedabad",
            "Gujarat",
            23.0225,
            72.5714,
        ),
        demo_therapist(
            "t3",
            "Jane Doe",
            "jane.d@example.com",
            CertificationLevel::Advanced,
            &["Executive Therapist", "NLP", "CBT"],
            &["en", "kn"],
            4.6,
            80,
            "Bangalore",
            "Karnataka",
            12.9716,
            77.5946,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn demo_runs_to_completion() {
        let now = Utc
            .with_ymd_and_hms(2024, 5, 20, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        run_demo(DemoArgs {
            now: Some(now),
            skip_review: false,
        })
        .expect("demo succeeds");
    }
}
