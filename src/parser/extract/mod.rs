pub mod fields;
pub mod transcript;
pub mod vocab;

use chrono::NaiveDate;
use scraper::Html;
use serde::{Deserialize, Serialize};

use super::nodes::classify_children;
use super::sections::Sections;
use vocab::VocabEntry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    pub url: String,
    pub title: String,
    /// Free text as printed on the page, possibly empty.
    pub date: String,
    pub image_url: String,
    pub intro: String,
    pub audio_url: String,
    pub transcript: String,
    pub vocabulary: Vec<VocabEntry>,
}

impl LessonRecord {
    /// The printed date as a calendar date, when it reads like `4 Dec 2025`.
    pub fn published_on(&self) -> Option<NaiveDate> {
        parse_lesson_date(&self.date)
    }
}

/// Accepts day, month name or abbreviation, and four-digit year.
pub fn parse_lesson_date(text: &str) -> Option<NaiveDate> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    ["%d %B %Y", "%d %b %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&text, fmt).ok())
}

pub fn extract_all(url: &str, doc: &Html, sections: &Sections) -> LessonRecord {
    let vocabulary = sections
        .vocabulary
        .map(|p| vocab::parse_vocabulary(&classify_children(p)))
        .unwrap_or_default();

    let paragraphs: Vec<_> = sections
        .transcript
        .iter()
        .map(|p| classify_children(*p))
        .collect();

    LessonRecord {
        url: url.to_string(),
        title: fields::title(doc),
        date: fields::date(doc),
        image_url: fields::image_url(doc),
        intro: fields::intro(sections.intro),
        audio_url: fields::audio_url(doc),
        transcript: transcript::encode_transcript(&paragraphs),
        vocabulary,
    }
}
