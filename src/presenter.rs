//! Result presentation: alert first, then the tab strip, then the active tab.
//!
//! Everything here is a pure projection of an immutable [`ResultModel`]; switching tabs
//! only changes which projection is used.

use crate::model::{Article, ResourceEntry, ResultModel, Urgency};
use crate::triage::{self, AlertCopy, AlertVariant};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

pub const DOCUMENT_FILE_NAME: &str = "legal_document.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Rights,
    Actions,
    Document,
    Resources,
    News,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Rights,
        Tab::Actions,
        Tab::Document,
        Tab::Resources,
        Tab::News,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Rights => "📜 Your Rights",
            Tab::Actions => "🎯 Action Plan",
            Tab::Document => "📄 Document",
            Tab::Resources => "🤝 Resources",
            Tab::News => "📰 Recent News",
        }
    }

    pub fn index(self) -> usize {
        Tab::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Tab> {
        Tab::ALL.get(i).copied()
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Project the result into this tab's content.
    pub fn project(self, r: &ResultModel, location: &str) -> Vec<Block> {
        match self {
            Tab::Rights => rights_content(r),
            Tab::Actions => actions_content(r),
            Tab::Document => document_content(r),
            Tab::Resources => resources_content(r),
            Tab::News => news_content(r, location),
        }
    }
}

/// Display-neutral content unit. The TUI and text mode each decide how to draw these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Field { label: &'static str, value: String },
    Bullet(String),
    /// Only ever holds an absolute http(s) URL.
    Link { label: &'static str, url: String },
    Note(String),
    Blank,
}

impl Block {
    pub fn text(&self) -> String {
        match self {
            Block::Heading(t) | Block::Subheading(t) | Block::Paragraph(t) | Block::Note(t) => {
                t.clone()
            }
            Block::Field { label, value } => format!("{label}: {value}"),
            Block::Bullet(t) => format!("• {t}"),
            Block::Link { label, url } => format!("{label}: {url}"),
            Block::Blank => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub alert: AlertVariant,
    pub alert_copy: Option<AlertCopy>,
    pub tabs: Vec<(Tab, bool)>,
    pub content: Vec<Block>,
}

impl Composition {
    /// Flattened reading order: alert, tab strip, content.
    pub fn reading_order(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(copy) = &self.alert_copy {
            out.push(copy.title.to_string());
            out.extend(copy.body.iter().cloned());
            out.extend(copy.contacts.iter().cloned());
        }
        out.push(tab_strip(&self.tabs));
        out.extend(self.content.iter().map(Block::text));
        out
    }
}

pub fn tab_strip(tabs: &[(Tab, bool)]) -> String {
    tabs.iter()
        .map(|(t, active)| {
            if *active {
                format!("[{}]", t.label())
            } else {
                t.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Debug, Clone)]
pub struct ResultPresenter {
    result: Arc<ResultModel>,
    location: String,
    active: Tab,
}

impl ResultPresenter {
    /// `location` is what was submitted; used where the backend did not echo one.
    pub fn new(result: Arc<ResultModel>, location: &str) -> Self {
        Self {
            result,
            location: location.to_string(),
            active: Tab::Rights,
        }
    }

    pub fn result(&self) -> &ResultModel {
        &self.result
    }

    pub fn active(&self) -> Tab {
        self.active
    }

    pub fn select(&mut self, tab: Tab) {
        self.active = tab;
    }

    pub fn next_tab(&mut self) {
        self.active = self.active.next();
    }

    pub fn prev_tab(&mut self) {
        self.active = self.active.prev();
    }

    /// Recomputed on every call; never cached.
    pub fn alert(&self) -> AlertVariant {
        triage::decide(self.result.triage.as_ref())
    }

    fn location(&self) -> &str {
        self.result
            .echoed_location
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&self.location)
    }

    pub fn content(&self, tab: Tab) -> Vec<Block> {
        tab.project(&self.result, self.location())
    }

    pub fn compose(&self) -> Composition {
        let alert = self.alert();
        Composition {
            alert,
            alert_copy: alert.copy(),
            tabs: Tab::ALL.iter().map(|t| (*t, *t == self.active)).collect(),
            content: self.content(self.active),
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.result
            .document
            .as_deref()
            .filter(|d| !d.trim().is_empty())
    }
}

/// Strip terminal control sequences from backend-supplied text.
pub fn clean(s: &str) -> String {
    s.chars()
        .filter_map(|c| match c {
            '\n' => Some('\n'),
            '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

/// Accept only absolute http(s) URLs with a host.
pub fn safe_link(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Some(parsed.to_string()),
        _ => None,
    }
}

fn link_or_text(label: &'static str, raw: &str) -> Block {
    match safe_link(raw) {
        Some(url) => Block::Link { label, url },
        None => Block::Field {
            label,
            value: format!("{} (not a web link)", clean(raw)),
        },
    }
}

fn non_empty(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(clean)
        .filter(|s| !s.trim().is_empty())
}

/// `Month D, YYYY`, or `None` when the timestamp can't be read.
pub fn format_date(raw: &str) -> Option<String> {
    let out = format_description!("[month repr:long] [day padding:none], [year]");
    let raw = raw.trim();
    let date = OffsetDateTime::parse(raw, &Rfc3339)
        .map(|d| d.date())
        .or_else(|_| {
            let naive = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
            PrimitiveDateTime::parse(raw.get(..19).unwrap_or(raw), naive).map(|d| d.date())
        })
        .ok()?;
    date.format(out).ok()
}

fn rights_content(r: &ResultModel) -> Vec<Block> {
    let triage = r.triage.clone().unwrap_or_default();
    let urgency: Urgency = triage.urgency;
    let mut out = vec![
        Block::Heading("Your Legal Rights".into()),
        Block::Field {
            label: "Category",
            value: non_empty(&triage.category)
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| "N/A".into()),
        },
        Block::Field {
            label: "Urgency",
            value: format!("{} {}", urgency.marker(), urgency.as_str().to_uppercase()),
        },
        Block::Field {
            label: "Need Lawyer?",
            value: if triage.requires_lawyer {
                "Yes ⚠️".into()
            } else {
                "Not Required".into()
            },
        },
    ];
    if let Some(j) = &triage.jurisdiction {
        let parts: Vec<String> = [non_empty(&j.city), non_empty(&j.state)]
            .into_iter()
            .flatten()
            .collect();
        if !parts.is_empty() {
            out.push(Block::Field {
                label: "Jurisdiction",
                value: parts.join(", "),
            });
        }
    }
    if !triage.key_issues.is_empty() {
        out.push(Block::Field {
            label: "Key issues",
            value: triage
                .key_issues
                .iter()
                .map(|s| clean(s))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    out.push(Block::Blank);

    let rights = r.rights.clone().unwrap_or_default();
    out.push(Block::Paragraph(
        non_empty(&rights.explanation).unwrap_or_else(|| "No rights information available".into()),
    ));
    if !rights.sources.is_empty() {
        out.push(Block::Blank);
        out.push(Block::Subheading("📚 Legal Sources".into()));
        for s in &rights.sources {
            out.push(Block::Bullet(
                non_empty(&s.source).unwrap_or_else(|| "Unknown".into()),
            ));
        }
    }
    out
}

fn actions_content(r: &ResultModel) -> Vec<Block> {
    let plan = r.actions.as_ref().and_then(|a| non_empty(&a.action_plan));
    vec![
        Block::Heading("What You Should Do Next".into()),
        Block::Paragraph(plan.unwrap_or_else(|| "No action plan available".into())),
    ]
}

fn document_content(r: &ResultModel) -> Vec<Block> {
    let mut out = vec![Block::Heading("Generated Legal Document".into())];
    match non_empty(&r.document) {
        Some(doc) => {
            out.push(Block::Paragraph(doc));
            out.push(Block::Blank);
            out.push(Block::Note(format!("Exportable as {DOCUMENT_FILE_NAME}")));
        }
        None => out.push(Block::Paragraph("No document generated".into())),
    }
    out
}

fn resource_blocks(entry: &ResourceEntry, out: &mut Vec<Block>) {
    out.push(Block::Subheading(
        non_empty(&entry.name).unwrap_or_else(|| "Unknown".into()),
    ));
    if let Some(phone) = non_empty(&entry.phone) {
        out.push(Block::Field {
            label: "📞 Phone",
            value: phone,
        });
    }
    if let Some(site) = entry.website.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push(link_or_text("🌐 Website", site));
    }
    if !entry.services.is_empty() {
        out.push(Block::Field {
            label: "Services",
            value: entry
                .services
                .iter()
                .map(|s| clean(s))
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    if let Some(e) = non_empty(&entry.eligibility) {
        out.push(Block::Note(format!("ℹ️ {e}")));
    }
    out.push(Block::Blank);
}

fn resources_content(r: &ResultModel) -> Vec<Block> {
    let mut out = vec![Block::Heading("Free Legal Resources".into())];
    let entries = r
        .resources
        .as_ref()
        .map(|s| s.resources.as_slice())
        .unwrap_or_default();
    if entries.is_empty() {
        out.push(Block::Note(
            "⚠️ No specific resources found for your location/category.".into(),
        ));
        out.push(Block::Note(
            "💡 Try contacting your state's Attorney General office or local legal aid society."
                .into(),
        ));
        return out;
    }
    for e in entries {
        resource_blocks(e, &mut out);
    }
    out
}

fn article_blocks(a: &Article, out: &mut Vec<Block>) {
    out.push(Block::Subheading(
        non_empty(&a.title).unwrap_or_else(|| "No title".into()),
    ));
    if let Some(url) = a.url.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push(link_or_text("Link", url));
    }
    if let Some(d) = non_empty(&a.description) {
        out.push(Block::Paragraph(d));
    }
    if let Some(s) = non_empty(&a.source) {
        out.push(Block::Field {
            label: "Source",
            value: s,
        });
    }
    if let Some(date) = a.published_at.as_deref().and_then(format_date) {
        out.push(Block::Field {
            label: "Date",
            value: date,
        });
    }
    out.push(Block::Blank);
}

fn news_content(r: &ResultModel, location: &str) -> Vec<Block> {
    let mut out = vec![Block::Heading("📰 Recent News & Developments".into())];
    let news = r.news.clone().unwrap_or_default();
    if let Some(q) = non_empty(&news.query_used) {
        out.push(Block::Note(format!("🔍 Search: {q}")));
    }
    if news.articles.is_empty() {
        let category = r
            .triage
            .as_ref()
            .and_then(|t| non_empty(&t.category))
            .unwrap_or_else(|| "legal".into());
        out.push(Block::Note(
            "⚠️ No recent news articles found for this topic.".into(),
        ));
        out.push(Block::Note(
            format!("💡 Try searching Google News for: {category} news {}", clean(location))
                .trim_end()
                .to_string(),
        ));
        return out;
    }
    out.push(Block::Note(format!(
        "Found {} recent articles related to your issue",
        news.articles.len()
    )));
    out.push(Block::Blank);
    for a in &news.articles {
        article_blocks(a, &mut out);
    }
    out.push(Block::Note(
        "💡 Note: These articles are related to your issue but may not directly apply to your specific situation. Use them for general awareness."
            .into(),
    ));
    out
}
