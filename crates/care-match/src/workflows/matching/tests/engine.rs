use super::common::*;
use crate::workflows::matching::domain::{
    CertificationLevel, LeadTier, ReviewStatus, TherapistResponse,
};
use crate::workflows::matching::engine::MatchError;

#[test]
fn only_candidates_clearing_both_filters_produce_leads() {
    let engagement = executive_engagement();
    let roster = vec![sarah(), amit(), jane()];

    let leads = engine()
        .run(&engagement, &roster, fixed_now())
        .expect("match run succeeds");

    // Sarah and Amit hold none of the required certifications; only Jane
    // clears the certification floor and shares a required language.
    assert_eq!(leads.len(), 1);
    let lead = &leads[0];
    assert_eq!(lead.therapist_id.0, "t3");
    assert_eq!(lead.lead_id.0, "lead_e1_t3");
    assert_eq!(lead.match_score, 99);
    assert_eq!(lead.tier, LeadTier::Exclusive);
    assert_eq!(lead.breakdown.certification, 100.0);
    assert_eq!(lead.breakdown.language, 100.0);
    assert_eq!(lead.breakdown.rating, 94.0);
    assert_eq!(lead.therapist_status, TherapistResponse::Pending);
    assert_eq!(lead.review_status, ReviewStatus::Pending);
    assert!(!lead.assigned);
}

#[test]
fn leads_sort_by_score_descending_then_therapist_id() {
    let engagement = staged_engagement();
    let leads = engine()
        .run(&engagement, &tiered_roster(), fixed_now())
        .expect("match run succeeds");

    assert_eq!(leads.len(), 3);
    let ids: Vec<&str> = leads.iter().map(|lead| lead.therapist_id.0.as_str()).collect();
    assert_eq!(ids, vec!["t-a", "t-b", "t-c"]);
    for pair in leads.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score);
    }

    // Equal scores fall back to therapist id ascending.
    let twin_a = therapist(
        "twin-a",
        CertificationLevel::Standard,
        &["CBT", "DBT"],
        &["en", "hi"],
        4.0,
        50,
    );
    let twin_b = therapist(
        "twin-b",
        CertificationLevel::Standard,
        &["CBT", "DBT"],
        &["en", "hi"],
        4.0,
        50,
    );
    let leads = engine()
        .run(&engagement, &[twin_b, twin_a], fixed_now())
        .expect("match run succeeds");
    assert_eq!(leads[0].therapist_id.0, "twin-a");
    assert_eq!(leads[1].therapist_id.0, "twin-b");
    assert_eq!(leads[0].match_score, leads[1].match_score);
}

#[test]
fn tiers_and_windows_follow_the_staged_release_policy() {
    let now = fixed_now();
    let leads = engine()
        .run(&staged_engagement(), &tiered_roster(), now)
        .expect("match run succeeds");

    let tiers: Vec<LeadTier> = leads.iter().map(|lead| lead.tier).collect();
    assert_eq!(
        tiers,
        vec![LeadTier::Exclusive, LeadTier::Priority, LeadTier::Standard]
    );

    let exclusive = &leads[0];
    let priority = &leads[1];
    let standard = &leads[2];

    assert!(exclusive.visible_at(now));
    assert!(!priority.visible_at(now));
    assert!(!standard.visible_at(now));
    assert_eq!(exclusive.visible_until, Some(priority.visible_from));
    assert!(standard.visible_until.is_none());

    // t-b carries a 94 composite but a 4.0 rating: the rating gate keeps it
    // out of the exclusive tier.
    assert!(priority.match_score >= 80);
}

#[test]
fn missing_certification_requirements_are_rejected() {
    let mut engagement = executive_engagement();
    engagement.certifications_required.clear();

    let error = engine()
        .run(&engagement, &[jane()], fixed_now())
        .expect_err("empty requirement set is malformed");

    assert!(matches!(error, MatchError::NoCertificationRequirements(_)));
}

#[test]
fn missing_language_requirements_match_nobody() {
    let mut engagement = executive_engagement();
    engagement.languages_required.clear();

    let leads = engine()
        .run(&engagement, &[sarah(), amit(), jane()], fixed_now())
        .expect("valid input, empty result");

    assert!(leads.is_empty());
}

#[test]
fn empty_roster_yields_an_empty_batch() {
    let leads = engine()
        .run(&executive_engagement(), &[], fixed_now())
        .expect("match run succeeds");
    assert!(leads.is_empty());
}
