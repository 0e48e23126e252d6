//! Text summary builder for CLI output.
//!
//! Lays out a completed result as plain lines: alert, tab strip, then every tab in order.

use crate::presenter::{tab_strip, Block, ResultPresenter, Tab};

pub(crate) const DISCLAIMER: &str = "⚠️ Disclaimer: This is legal information, not legal advice. For serious legal matters, consult a licensed attorney.";

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

fn push_block(lines: &mut Vec<String>, block: &Block) {
    match block {
        Block::Heading(t) => {
            lines.push(t.clone());
            lines.push("-".repeat(t.chars().count().max(3)));
        }
        Block::Subheading(t) => lines.push(format!("* {t}")),
        Block::Paragraph(t) => lines.extend(t.lines().map(str::to_string)),
        Block::Bullet(_) | Block::Field { .. } | Block::Link { .. } | Block::Note(_) => {
            lines.push(format!("  {}", block.text()))
        }
        Block::Blank => lines.push(String::new()),
    }
}

/// Build a text summary covering every tab of the presenter's result.
pub(crate) fn build_text_summary(presenter: &ResultPresenter) -> TextSummary {
    let mut lines = Vec::new();
    let composition = presenter.compose();

    if let Some(copy) = composition.alert_copy.as_ref() {
        let bar = "!".repeat(60);
        lines.push(bar.clone());
        lines.push(copy.title.to_string());
        lines.extend(copy.body.iter().cloned());
        for c in &copy.contacts {
            lines.push(format!("  - {c}"));
        }
        lines.push(bar);
        lines.push(String::new());
    }

    lines.push(tab_strip(&composition.tabs));
    lines.push(String::new());

    for tab in Tab::ALL {
        lines.push(format!("== {} ==", tab.label()));
        for block in presenter.content(tab) {
            push_block(&mut lines, &block);
        }
        lines.push(String::new());
    }

    lines.push("✅ Analysis complete! Review all tabs for comprehensive guidance.".into());
    lines.push(DISCLAIMER.into());
    TextSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResultModel, SituationType, TriageClassification, Urgency};
    use std::sync::Arc;

    #[test]
    fn mental_health_alert_leads_the_summary() {
        let r = ResultModel {
            triage: Some(TriageClassification {
                situation_type: SituationType::MentalHealthCrisis,
                urgency: Urgency::High,
                ..Default::default()
            }),
            ..Default::default()
        };
        let summary = build_text_summary(&ResultPresenter::new(Arc::new(r), "Boston, MA"));
        let first_tab = summary
            .lines
            .iter()
            .position(|l| l.starts_with("== "))
            .unwrap();
        let crisis = summary
            .lines
            .iter()
            .position(|l| l.contains("988"))
            .unwrap();
        assert!(crisis < first_tab);
        assert!(summary.lines.iter().any(|l| l.contains("HOME to 741741")));
    }

    #[test]
    fn every_tab_is_present_without_alert() {
        let summary = build_text_summary(&ResultPresenter::new(
            Arc::new(ResultModel::default()),
            "Boston, MA",
        ));
        for tab in Tab::ALL {
            assert!(summary.lines.contains(&format!("== {} ==", tab.label())));
        }
        assert!(!summary.lines.iter().any(|l| l.contains("!!!!")));
        assert_eq!(summary.lines.last().map(String::as_str), Some(DISCLAIMER));
    }
}
