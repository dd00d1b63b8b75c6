use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::parser::sections::text_of;

pub const DEFAULT_TITLE: &str = "Unknown Title";

/// Headings in the title widget that label page furniture rather than the episode.
const NON_TITLE_HEADINGS: &[&str] = &[
    "6 Minute English",
    "Intermediate level",
    "Introduction",
    "Vocabulary",
    "TRANSCRIPT",
    "This week's question",
    "Next",
];
const PLACEHOLDER_OG_TITLE: &str = "Learning English";

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.widget-heading h3").unwrap());
static OG_TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static DATE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.widget-bbcle-featuresubheader .details h3").unwrap());
static VIDEO_IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.widget-video img").unwrap());
static OG_IMAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static AUDIO_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.download.bbcle-download-extension-mp3").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\s*(\d{1,2}\s+\w+\s+\d{4})").unwrap());

pub fn title(doc: &Html) -> String {
    doc.select(&TITLE_SEL)
        .map(|h| text_of(&h).trim().to_string())
        .find(|t| is_episode_title(t))
        .or_else(|| {
            meta_content(doc, &OG_TITLE_SEL)
                .filter(|t| t != PLACEHOLDER_OG_TITLE)
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn is_episode_title(text: &str) -> bool {
    !text.is_empty()
        && !NON_TITLE_HEADINGS.contains(&text)
        && (text.contains('?') || text.chars().count() > 10)
}

/// Free-text date such as `04 Dec 2025`, taken from "Episode 251204 / 04 Dec 2025".
pub fn date(doc: &Html) -> String {
    let details: String = doc.select(&DATE_SEL).map(|h| text_of(&h)).collect();
    DATE_RE
        .captures(&details)
        .map(|c| c[1].trim().to_string())
        .unwrap_or_default()
}

pub fn image_url(doc: &Html) -> String {
    doc.select(&VIDEO_IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
        .filter(|src| !src.is_empty())
        .or_else(|| meta_content(doc, &OG_IMAGE_SEL))
        .unwrap_or_default()
}

pub fn intro(paragraph: Option<ElementRef>) -> String {
    paragraph
        .map(|p| text_of(&p).trim().to_string())
        .unwrap_or_default()
}

pub fn audio_url(doc: &Html) -> String {
    doc.select(&AUDIO_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .filter(|href| !href.is_empty())
        .or_else(|| {
            doc.select(&ANCHOR_SEL)
                .filter_map(|a| a.value().attr("href"))
                .find(|href| href.to_ascii_lowercase().ends_with(".mp3"))
        })
        .map(str::to_string)
        .unwrap_or_default()
}

fn meta_content(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(head: &str, body: &str) -> Html {
        Html::parse_document(&format!(
            "<html><head>{}</head><body>{}</body></html>",
            head, body
        ))
    }

    #[test]
    fn title_skips_furniture_headings() {
        let d = doc(
            "",
            r#"<div class="widget-heading"><h3>6 Minute English</h3></div>
               <div class="widget-heading"><h3>Intermediate level</h3></div>
               <div class="widget-heading"><h3>Short</h3></div>
               <div class="widget-heading"><h3> Why do we dream? </h3></div>"#,
        );
        assert_eq!(title(&d), "Why do we dream?");
    }

    #[test]
    fn short_question_is_a_title() {
        let d = doc("", r#"<div class="widget-heading"><h3>Why?</h3></div>"#);
        assert_eq!(title(&d), "Why?");
    }

    #[test]
    fn title_falls_back_to_og_title() {
        let d = doc(
            r#"<meta property="og:title" content="The joy of walking">"#,
            r#"<div class="widget-heading"><h3>Vocabulary</h3></div>"#,
        );
        assert_eq!(title(&d), "The joy of walking");
    }

    #[test]
    fn placeholder_og_title_ignored() {
        let d = doc(r#"<meta property="og:title" content="Learning English">"#, "");
        assert_eq!(title(&d), DEFAULT_TITLE);
    }

    #[test]
    fn date_from_details() {
        let d = doc(
            "",
            r#"<div class="widget-bbcle-featuresubheader"><div class="details">
               <h3><b>Episode 251204</b> / 04 Dec 2025</h3></div></div>"#,
        );
        assert_eq!(date(&d), "04 Dec 2025");
    }

    #[test]
    fn date_missing() {
        let d = doc("", "<h3>Episode 1</h3>");
        assert_eq!(date(&d), "");
    }

    #[test]
    fn image_prefers_video_widget() {
        let d = doc(
            r#"<meta property="og:image" content="https://x/og.jpg">"#,
            r#"<div class="widget-video"><img src="https://x/video.jpg"></div>"#,
        );
        assert_eq!(image_url(&d), "https://x/video.jpg");

        let d = doc(r#"<meta property="og:image" content="https://x/og.jpg">"#, "");
        assert_eq!(image_url(&d), "https://x/og.jpg");

        assert_eq!(image_url(&doc("", "")), "");
    }

    #[test]
    fn audio_link() {
        let d = doc(
            "",
            r#"<a class="download bbcle-download-extension-mp3" href="https://x/ep.mp3">Download</a>"#,
        );
        assert_eq!(audio_url(&d), "https://x/ep.mp3");

        let d = doc("", r#"<a href="/a.html">a</a><a href="https://x/other.MP3">b</a>"#);
        assert_eq!(audio_url(&d), "https://x/other.MP3");

        assert_eq!(audio_url(&doc("", r#"<a href="/a.pdf">a</a>"#)), "");
    }
}
