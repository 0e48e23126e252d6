//! Emergency triage: picks the single safety alert shown ahead of normal content.

use crate::model::{SituationType, TriageClassification, Urgency};

pub const EMERGENCY_NUMBER: &str = "911";
pub const CRISIS_LIFELINE: &str = "988";
pub const CRISIS_TEXT_KEYWORD: &str = "HOME";
pub const CRISIS_TEXT_NUMBER: &str = "741741";
pub const DV_HOTLINE: &str = "1-800-799-7233";
pub const NON_EMERGENCY_NUMBER: &str = "311";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighPriorityReason {
    PastViolence,
    HighUrgency,
}

impl HighPriorityReason {
    pub fn as_str(self) -> &'static str {
        match self {
            HighPriorityReason::PastViolence => "past_violence",
            HighPriorityReason::HighUrgency => "high urgency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertVariant {
    None,
    ActiveViolence,
    MentalHealthCrisis,
    HighPriority { reason: HighPriorityReason },
}

/// First matching rule wins; active violence must preempt an urgency-only match.
pub fn decide(triage: Option<&TriageClassification>) -> AlertVariant {
    let Some(triage) = triage else {
        return AlertVariant::None;
    };
    match triage.situation_type {
        SituationType::ActiveViolence => AlertVariant::ActiveViolence,
        SituationType::MentalHealthCrisis => AlertVariant::MentalHealthCrisis,
        SituationType::PastViolence => AlertVariant::HighPriority {
            reason: HighPriorityReason::PastViolence,
        },
        _ if triage.urgency == Urgency::High => AlertVariant::HighPriority {
            reason: HighPriorityReason::HighUrgency,
        },
        _ => AlertVariant::None,
    }
}

/// Fixed text for one alert. Contact literals are not configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertCopy {
    pub title: &'static str,
    pub body: Vec<String>,
    pub contacts: Vec<String>,
}

impl AlertVariant {
    pub fn is_emergency(self) -> bool {
        matches!(
            self,
            AlertVariant::ActiveViolence | AlertVariant::MentalHealthCrisis
        )
    }

    pub fn copy(self) -> Option<AlertCopy> {
        match self {
            AlertVariant::None => None,
            AlertVariant::ActiveViolence => Some(AlertCopy {
                title: "🚨 EMERGENCY - CALL 911 IMMEDIATELY",
                body: vec![
                    "If you are in immediate physical danger, call 911 now.".into(),
                    "Get to a safe location if possible.".into(),
                ],
                contacts: vec![format!("Police/Fire/Medical: {EMERGENCY_NUMBER}")],
            }),
            AlertVariant::MentalHealthCrisis => Some(AlertCopy {
                title: "💜 YOU ARE NOT ALONE - HELP IS AVAILABLE",
                body: vec![
                    "If you're thinking about suicide or need someone to talk to right now:".into(),
                ],
                contacts: vec![
                    format!(
                        "{CRISIS_LIFELINE} Suicide & Crisis Lifeline: call or text {CRISIS_LIFELINE} anytime, 24/7 (free, confidential)"
                    ),
                    format!(
                        "Crisis Text Line: text {CRISIS_TEXT_KEYWORD} to {CRISIS_TEXT_NUMBER} (trained crisis counselors)"
                    ),
                ],
            }),
            AlertVariant::HighPriority { .. } => Some(AlertCopy {
                title: "⚠️ HIGH PRIORITY SITUATION",
                body: vec!["This situation requires prompt attention. Consider:".into()],
                contacts: vec![
                    format!(
                        "Filing a police report (non-emergency: {NON_EMERGENCY_NUMBER} or local police non-emergency number)"
                    ),
                    "Consulting with a lawyer about protective orders".into(),
                    format!("Contacting a domestic violence hotline for guidance: {DV_HOTLINE}"),
                ],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triage(situation: &str, urgency: &str) -> TriageClassification {
        TriageClassification {
            situation_type: SituationType::from(situation.to_string()),
            urgency: Urgency::parse(urgency),
            ..Default::default()
        }
    }

    #[test]
    fn absent_triage_has_no_alert() {
        assert_eq!(decide(None), AlertVariant::None);
    }

    #[test]
    fn active_violence_preempts_urgency() {
        assert_eq!(
            decide(Some(&triage("active_violence", "low"))),
            AlertVariant::ActiveViolence
        );
        assert_eq!(
            decide(Some(&triage("active_violence", "high"))),
            AlertVariant::ActiveViolence
        );
    }

    #[test]
    fn mental_health_crisis_regardless_of_urgency() {
        for u in ["low", "medium", "high", "critical", ""] {
            assert_eq!(
                decide(Some(&triage("mental_health_crisis", u))),
                AlertVariant::MentalHealthCrisis,
                "urgency {u:?}"
            );
        }
    }

    #[test]
    fn past_violence_is_high_priority_even_when_low() {
        assert_eq!(
            decide(Some(&triage("past_violence", "low"))),
            AlertVariant::HighPriority {
                reason: HighPriorityReason::PastViolence
            }
        );
    }

    #[test]
    fn high_urgency_dispute_is_high_priority() {
        assert_eq!(
            decide(Some(&triage("other_legal_dispute", "high"))),
            AlertVariant::HighPriority {
                reason: HighPriorityReason::HighUrgency
            }
        );
        assert_eq!(
            decide(Some(&triage("other_legal_dispute", "High"))),
            AlertVariant::HighPriority {
                reason: HighPriorityReason::HighUrgency
            }
        );
    }

    #[test]
    fn ordinary_disputes_have_no_alert() {
        assert_eq!(
            decide(Some(&triage("other_legal_dispute", "medium"))),
            AlertVariant::None
        );
        // critical alone is not in the table
        assert_eq!(
            decide(Some(&triage("legal_dispute", "critical"))),
            AlertVariant::None
        );
        // unknown urgency falls back to medium
        assert_eq!(
            decide(Some(&triage("wage_dispute", "urgent!!"))),
            AlertVariant::None
        );
    }

    #[test]
    fn decide_is_total_and_idempotent() {
        let situations = [
            "active_violence",
            "mental_health_crisis",
            "past_violence",
            "legal_dispute",
            "other_legal_dispute",
            "",
            "ACTIVE_VIOLENCE",
        ];
        let urgencies = ["low", "medium", "high", "critical", "", "nonsense"];
        for s in situations {
            for u in urgencies {
                let t = triage(s, u);
                let first = decide(Some(&t));
                assert_eq!(first, decide(Some(&t)));
                assert_eq!(first.copy().is_none(), first == AlertVariant::None);
            }
        }
    }

    #[test]
    fn alert_copy_carries_fixed_contacts() {
        let joined = |v: AlertVariant| {
            let c = v.copy().unwrap();
            format!("{} {} {}", c.title, c.body.join(" "), c.contacts.join(" "))
        };
        assert!(joined(AlertVariant::ActiveViolence).contains("911"));
        let mh = joined(AlertVariant::MentalHealthCrisis);
        assert!(mh.contains("988"));
        assert!(mh.contains("text HOME to 741741"));
        let hp = joined(AlertVariant::HighPriority {
            reason: HighPriorityReason::PastViolence,
        });
        assert!(hp.contains("1-800-799-7233"));
        assert!(hp.contains("311"));
    }
}
