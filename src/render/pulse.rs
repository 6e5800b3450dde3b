// Daily Pulse: plain-text export and archive grouping
use crate::model::{ArchiveEntry, Newsletter};
use crate::utils::{format_long_date, parse_date};
use chrono::NaiveDate;
use std::fmt::Write;

const RULE_WIDTH: usize = 60;
const UNDATED: &str = "Undated";

/// "November 5, 2025" when the publish date parses, the raw value otherwise.
pub fn display_date(publish_date: &str) -> String {
    parse_date(publish_date)
        .map(format_long_date)
        .unwrap_or_else(|| publish_date.to_string())
}

pub fn audio_filename(publish_date: &str) -> String {
    format!("daily-pulse-{}.wav", publish_date)
}

pub fn text_filename(publish_date: &str) -> String {
    format!("daily-pulse-{}.txt", publish_date)
}

/// Plain-text export of a newsletter.
pub fn newsletter_to_text(newsletter: &Newsletter) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = write!(
        out,
        "DAILY MARKET PULSE\n{}\n{}\n\n{}\n\n{}\n\n",
        display_date(&newsletter.publish_date),
        heavy,
        newsletter.title,
        newsletter.hook
    );

    for section in &newsletter.sections {
        let _ = write!(
            out,
            "\n{}\n{}\n\n{}\n\n",
            section.heading.to_uppercase(),
            light,
            section.content
        );
    }

    let _ = write!(out, "\nLOOKING AHEAD\n{}\n\n{}\n\n", light, newsletter.conclusion);

    if !newsletter.sources.is_empty() {
        let _ = write!(out, "\nSOURCES\n{}\n\n", light);
        for (i, source) in newsletter.sources.iter().enumerate() {
            let title = if source.title.trim().is_empty() {
                "Source"
            } else {
                source.title.as_str()
            };
            let _ = write!(out, "{}. {}\n   {}\n\n", i + 1, title, source.url);
        }
    }

    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveGroup {
    /// "November 2025", or "Undated".
    pub label: String,
    pub entries: Vec<ArchiveEntry>,
}

/// Groups archive entries by month, newest month first and newest entry
/// first within a month. Entries without a parseable date go last.
pub fn group_archive_by_month(entries: &[ArchiveEntry]) -> Vec<ArchiveGroup> {
    let mut dated: Vec<(NaiveDate, &ArchiveEntry)> = Vec::new();
    let mut undated: Vec<ArchiveEntry> = Vec::new();
    for entry in entries {
        match parse_date(&entry.publish_date) {
            Some(date) => dated.push((date, entry)),
            None => undated.push(entry.clone()),
        }
    }
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut groups: Vec<ArchiveGroup> = Vec::new();
    for (date, entry) in dated {
        let label = date.format("%B %Y").to_string();
        match groups.last_mut() {
            Some(group) if group.label == label => group.entries.push(entry.clone()),
            _ => groups.push(ArchiveGroup {
                label,
                entries: vec![entry.clone()],
            }),
        }
    }
    if !undated.is_empty() {
        groups.push(ArchiveGroup {
            label: UNDATED.to_string(),
            entries: undated,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewsletterSection, NewsletterSource};

    fn entry(date: &str, title: &str) -> ArchiveEntry {
        ArchiveEntry {
            publish_date: date.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn text_export_layout() {
        let newsletter = Newsletter {
            publish_date: "2025-11-05".to_string(),
            title: "Risk Wobbles".to_string(),
            hook: "Tech led the dip.".to_string(),
            sections: vec![NewsletterSection {
                heading: "Market Overview".to_string(),
                content: "Stocks fell.".to_string(),
            }],
            conclusion: "Watch CPI.".to_string(),
            sources: vec![NewsletterSource {
                title: String::new(),
                url: "https://example.com/a".to_string(),
            }],
            audio_url: None,
        };
        let text = newsletter_to_text(&newsletter);
        let rule = "=".repeat(60);
        let dash = "-".repeat(60);
        assert!(text.starts_with(&format!(
            "DAILY MARKET PULSE\nNovember 5, 2025\n{rule}\n\nRisk Wobbles\n\nTech led the dip.\n\n"
        )));
        assert!(text.contains(&format!("\nMARKET OVERVIEW\n{dash}\n\nStocks fell.\n\n")));
        assert!(text.contains(&format!("\nLOOKING AHEAD\n{dash}\n\nWatch CPI.\n\n")));
        assert!(text.ends_with(&format!(
            "\nSOURCES\n{dash}\n\n1. Source\n   https://example.com/a\n\n"
        )));
    }

    #[test]
    fn no_sources_section_without_sources() {
        let text = newsletter_to_text(&Newsletter::default());
        assert!(!text.contains("SOURCES"));
        assert!(text.contains("LOOKING AHEAD"));
    }

    #[test]
    fn archive_groups_newest_month_first() {
        let groups = group_archive_by_month(&[
            entry("2025-10-30", "Oct B"),
            entry("2025-11-03", "Nov A"),
            entry("someday", "Mystery"),
            entry("2025-11-05", "Nov B"),
            entry("2025-10-01", "Oct A"),
        ]);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["November 2025", "October 2025", "Undated"]);
        assert_eq!(groups[0].entries[0].title, "Nov B");
        assert_eq!(groups[1].entries[1].title, "Oct A");
        assert_eq!(groups[2].entries[0].title, "Mystery");
    }

    #[test]
    fn download_filenames() {
        assert_eq!(audio_filename("2025-11-05"), "daily-pulse-2025-11-05.wav");
        assert_eq!(text_filename("2025-11-05"), "daily-pulse-2025-11-05.txt");
    }
}
