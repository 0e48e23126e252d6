use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Runtime settings for talking to the analysis backend.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

/// Treat a JSON `null` the same as a missing field.
fn nullable<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Situation tag assigned by the backend triage step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SituationType {
    ActiveViolence,
    MentalHealthCrisis,
    PastViolence,
    #[default]
    LegalDispute,
    /// Any tag this client does not act on (e.g. `wage_dispute`).
    Other(String),
}

impl SituationType {
    pub fn as_str(&self) -> &str {
        match self {
            SituationType::ActiveViolence => "active_violence",
            SituationType::MentalHealthCrisis => "mental_health_crisis",
            SituationType::PastViolence => "past_violence",
            SituationType::LegalDispute => "legal_dispute",
            SituationType::Other(s) => s,
        }
    }
}

impl From<String> for SituationType {
    fn from(s: String) -> Self {
        match s.trim() {
            "active_violence" => SituationType::ActiveViolence,
            "mental_health_crisis" => SituationType::MentalHealthCrisis,
            "past_violence" => SituationType::PastViolence,
            "" | "legal_dispute" => SituationType::LegalDispute,
            _ => SituationType::Other(s),
        }
    }
}

impl Serialize for SituationType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SituationType {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(d)?
            .map(SituationType::from)
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Case-insensitive parse; anything unrecognised is `Medium`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Urgency::Low,
            "high" => Urgency::High,
            "critical" => Urgency::Critical,
            _ => Urgency::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }

    /// Traffic-light marker shown next to the urgency label.
    pub fn marker(self) -> &'static str {
        match self {
            Urgency::Low => "🟢",
            Urgency::Medium => "🟡",
            Urgency::High => "🟠",
            Urgency::Critical => "🔴",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Urgency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(d)?
            .map(|s| Urgency::parse(&s))
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jurisdiction {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageClassification {
    #[serde(default)]
    pub situation_type: SituationType,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub requires_lawyer: bool,
    #[serde(default)]
    pub jurisdiction: Option<Jurisdiction>,
    #[serde(default, deserialize_with = "nullable")]
    pub key_issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegalSource {
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RightsSection {
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub sources: Vec<LegalSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionsSection {
    #[serde(default)]
    pub action_plan: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub services: Vec<String>,
    #[serde(default)]
    pub eligibility: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcesSection {
    #[serde(default, deserialize_with = "nullable")]
    pub resources: Vec<ResourceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSection {
    #[serde(default)]
    pub query_used: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub articles: Vec<Article>,
}

/// Complete response of one successful `POST /query`.
///
/// Every section is optional; presentation code supplies fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultModel {
    #[serde(default)]
    pub triage: Option<TriageClassification>,
    #[serde(default)]
    pub rights: Option<RightsSection>,
    #[serde(default)]
    pub actions: Option<ActionsSection>,
    #[serde(default)]
    pub document: Option<String>,
    #[serde(default)]
    pub resources: Option<ResourcesSection>,
    #[serde(default)]
    pub news: Option<NewsSection>,
    #[serde(default, rename = "query")]
    pub echoed_query: Option<String>,
    #[serde(default, rename = "location")]
    pub echoed_location: Option<String>,
}

/// Request body for `POST /query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    #[serde(rename = "query")]
    pub text: String,
    pub location: String,
}
