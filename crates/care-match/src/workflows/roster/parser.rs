use super::RosterImportError;
use crate::workflows::matching::domain::{CertificationLevel, Therapist, TherapistId};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_roster<R: Read>(reader: R) -> Result<Vec<Therapist>, RosterImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut therapists = Vec::new();

    for (index, record) in csv_reader.deserialize::<RosterRow>().enumerate() {
        // Header occupies line 1.
        let line = (index + 2) as u64;
        let row = record?;

        let Some(therapist_id) = row.therapist_id.clone() else {
            continue;
        };

        therapists.push(row.into_therapist(therapist_id, line)?);
    }

    Ok(therapists)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(
        rename = "Therapist ID",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    therapist_id: Option<String>,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Email", default)]
    email: String,
    #[serde(rename = "Phone", default)]
    phone: String,
    #[serde(rename = "Avg Rating", default)]
    avg_rating: Option<f32>,
    #[serde(rename = "Total Sessions", default)]
    total_sessions: Option<u32>,
    #[serde(rename = "Certifications", default)]
    certifications: String,
    #[serde(rename = "Languages", default)]
    languages: String,
    #[serde(rename = "City", default)]
    city: String,
    #[serde(rename = "State", default)]
    state: String,
    #[serde(rename = "Latitude", default)]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<f64>,
    #[serde(rename = "Level", default, deserialize_with = "empty_string_as_none")]
    level: Option<String>,
}

impl RosterRow {
    fn into_therapist(
        self,
        therapist_id: String,
        line: u64,
    ) -> Result<Therapist, RosterImportError> {
        let certification_level = match self.level.as_deref() {
            None => CertificationLevel::Standard,
            Some(raw) => CertificationLevel::parse(raw).ok_or_else(|| RosterImportError::Row {
                line,
                message: format!("unknown certification level '{raw}'"),
            })?,
        };

        let avg_rating = self.avg_rating.unwrap_or(0.0);
        if !(0.0..=5.0).contains(&avg_rating) {
            return Err(RosterImportError::Row {
                line,
                message: format!("average rating {avg_rating} outside 0-5"),
            });
        }

        Ok(Therapist {
            therapist_id: TherapistId(therapist_id),
            name: self.name,
            email: self.email,
            phone: self.phone,
            avg_rating,
            total_sessions: self.total_sessions.unwrap_or(0),
            certifications: split_multi(&self.certifications),
            languages: split_multi(&self.languages),
            location_city: self.city,
            location_state: self.state,
            location_lat: self.latitude.unwrap_or(0.0),
            location_lng: self.longitude.unwrap_or(0.0),
            certification_level,
        })
    }
}

/// Multi-valued roster cells are pipe-separated, e.g. `CBT|DBT|NLP`.
fn split_multi(value: &str) -> Vec<String> {
    value
        .split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
pub(crate) fn split_multi_for_tests(value: &str) -> Vec<String> {
    split_multi(value)
}
