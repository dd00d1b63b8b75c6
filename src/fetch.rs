use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::Settings;
use crate::db;
use crate::error::ScrapeError;
use crate::parser::{self, extract::LessonRecord};

/// Scrape stats returned after completion.
pub struct ScrapeStats {
    pub total: usize,
    pub ok: usize,
    pub errors: usize,
}

pub fn client(settings: &Settings) -> Result<reqwest::Client, ScrapeError> {
    let client = reqwest::Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()?;
    Ok(client)
}

/// One GET; transport errors and non-success statuses are failures.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, ScrapeError> {
    let start = Instant::now();
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let body = response.text().await?;
    info!(
        "Fetched {} ({} bytes in {}ms)",
        url,
        body.len(),
        start.elapsed().as_millis()
    );
    Ok(body)
}

/// Fetch a lesson page and extract it.
pub async fn scrape_lesson(client: &reqwest::Client, url: &str) -> Result<LessonRecord, ScrapeError> {
    let html = fetch_page(client, url).await?;
    parser::process_page(&html, url)
}

/// Scrape lessons concurrently, saving each record to DB as it arrives.
pub async fn scrape_lessons_streaming(
    conn: &Connection,
    settings: &Settings,
    urls: Vec<String>,
) -> Result<ScrapeStats> {
    let http = client(settings)?;
    let semaphore = Arc::new(Semaphore::new(settings.concurrency));
    let total = urls.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")?
            .progress_chars("=> "),
    );

    // Channel: workers send results, main loop saves to DB
    let (tx, mut rx) =
        tokio::sync::mpsc::channel::<(String, Result<LessonRecord, ScrapeError>)>(settings.concurrency * 2);

    for url in urls {
        let client = http.clone();
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let result = scrape_lesson(&client, &url).await;
            let _ = tx.send((url, result)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut ok = 0usize;
    let mut errors = 0usize;

    while let Some((url, result)) = rx.recv().await {
        match result {
            Ok(record) => {
                let id = db::save_lesson(conn, &record)?;
                info!(
                    "Saved lesson {} \"{}\" ({} vocab)",
                    id,
                    record.title,
                    record.vocabulary.len()
                );
                ok += 1;
            }
            Err(e) => {
                warn!("Failed to scrape {}: {}", url, e);
                errors += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Scraped {} lessons ({} ok, {} errors)", total, ok, errors);

    Ok(ScrapeStats { total, ok, errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        let http = client(&Settings::default()).unwrap();
        let err = fetch_page(&http, "http://127.0.0.1:9/lesson").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Http(_)));
    }

    #[tokio::test]
    async fn empty_batch_reports_zero() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        let stats = scrape_lessons_streaming(&conn, &Settings::default(), Vec::new())
            .await
            .unwrap();
        assert_eq!((stats.total, stats.ok, stats.errors), (0, 0, 0));
    }
}
