use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use lesson_scraper::config::Settings;
use lesson_scraper::markup::editor::TranscriptEditor;
use lesson_scraper::markup::decode;
use lesson_scraper::markup::inline::bold_phrases;
use lesson_scraper::{db, fetch, parser, LessonRecord};

#[derive(Parser)]
#[command(name = "lesson_scraper", about = "Lesson page scraper and transcript markup tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the lesson database
    Init,
    /// Fetch lesson pages, extract them and store the results
    Scrape {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Extract lessons from saved HTML files and print them as JSON
    Extract {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Source URL recorded in the output (default: the file path)
        #[arg(long)]
        url: Option<String>,
    },
    /// List stored lessons
    List {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
    /// Print a stored transcript as speaker turns
    Show { id: i64 },
    /// Re-serialize a stored transcript through the editor and save it
    Normalize { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command {
        Commands::Init => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Database ready at {:?}", settings.db_path);
        }
        Commands::Scrape { urls } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            println!("Scraping {} lessons...", urls.len());
            let stats = fetch::scrape_lessons_streaming(&conn, &settings, urls).await?;
            println!(
                "Done: {} scraped ({} ok, {} errors).",
                stats.total, stats.ok, stats.errors
            );
        }
        Commands::Extract { files, url } => {
            let results: Vec<_> = files
                .par_iter()
                .map(|path| -> anyhow::Result<LessonRecord> {
                    let html = std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {:?}", path))?;
                    let source = url.clone().unwrap_or_else(|| path.display().to_string());
                    Ok(parser::process_page(&html, &source)?)
                })
                .collect();

            for result in results {
                println!("{}", serde_json::to_string_pretty(&result?)?);
            }
        }
        Commands::List { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let rows = db::list_lessons(&conn, limit)?;
            if rows.is_empty() {
                println!("No lessons. Run 'scrape' first.");
                return Ok(());
            }

            println!("{:>4} | {:<40} | {:<12} | {:>5}", "ID", "Title", "Date", "Vocab");
            println!("{}", "-".repeat(70));
            for r in &rows {
                println!(
                    "{:>4} | {:<40} | {:<12} | {:>5}",
                    r.id,
                    truncate(&r.title, 40),
                    r.date,
                    r.vocab_count
                );
            }
            println!("\n{} lessons", rows.len());
        }
        Commands::Show { id } => {
            let conn = db::connect(&settings.db_path)?;
            let Some(lesson) = db::fetch_lesson(&conn, id)? else {
                bail!("No lesson with id {}", id);
            };
            println!("{}\n", lesson.title);
            let mut phrases = Vec::new();
            for turn in decode(&lesson.transcript).turns() {
                if let Some(speaker) = &turn.speaker {
                    println!("{}:", speaker);
                }
                for line in &turn.lines {
                    println!("  {}", line);
                    phrases.extend(bold_phrases(line));
                }
            }
            if !phrases.is_empty() {
                println!("\n--- Highlighted ---\n  {}", phrases.join(", "));
            }
        }
        Commands::Normalize { id } => {
            let conn = db::connect(&settings.db_path)?;
            let Some(lesson) = db::fetch_lesson(&conn, id)? else {
                bail!("No lesson with id {}", id);
            };
            let editor = TranscriptEditor::open(&lesson.transcript);
            let markup = editor.save();
            db::update_transcript(&conn, id, &markup)?;
            println!(
                "Saved {} blocks ({} speakers) for lesson {}.",
                editor.blocks().len(),
                editor.speakers().len(),
                id
            );
        }
    }

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
