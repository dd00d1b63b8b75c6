use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

use crate::parser::extract::vocab::VocabEntry;
use crate::parser::extract::LessonRecord;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS lessons (
            id           INTEGER PRIMARY KEY,
            url          TEXT UNIQUE NOT NULL,
            title        TEXT NOT NULL,
            date         TEXT NOT NULL DEFAULT '',
            published_on TEXT,
            image_url    TEXT NOT NULL DEFAULT '',
            intro        TEXT NOT NULL DEFAULT '',
            audio_url    TEXT NOT NULL DEFAULT '',
            transcript   TEXT NOT NULL DEFAULT '',
            scraped_at   TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS lesson_vocab (
            id          INTEGER PRIMARY KEY,
            lesson_id   INTEGER NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
            position    INTEGER NOT NULL,
            term        TEXT NOT NULL,
            definition  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_vocab_lesson ON lesson_vocab(lesson_id, position);
        ",
    )?;
    Ok(())
}

/// Insert or refresh a lesson by URL; its vocabulary is replaced. Returns the lesson id.
pub fn save_lesson(conn: &Connection, lesson: &LessonRecord) -> Result<i64> {
    let tx = conn.unchecked_transaction()?;
    let id: i64 = tx.query_row(
        "INSERT INTO lessons (url, title, date, published_on, image_url, intro, audio_url, transcript)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(url) DO UPDATE SET
            title = excluded.title,
            date = excluded.date,
            published_on = excluded.published_on,
            image_url = excluded.image_url,
            intro = excluded.intro,
            audio_url = excluded.audio_url,
            transcript = excluded.transcript,
            updated_at = datetime('now')
         RETURNING id",
        params![
            lesson.url,
            lesson.title,
            lesson.date,
            lesson.published_on().map(|d| d.to_string()),
            lesson.image_url,
            lesson.intro,
            lesson.audio_url,
            lesson.transcript,
        ],
        |row| row.get(0),
    )?;
    write_vocabulary(&tx, id, &lesson.vocabulary)?;
    tx.commit()?;
    Ok(id)
}

pub fn fetch_lesson(conn: &Connection, id: i64) -> Result<Option<LessonRecord>> {
    let lesson = conn
        .query_row(
            "SELECT url, title, date, image_url, intro, audio_url, transcript
             FROM lessons WHERE id = ?1",
            params![id],
            |row| {
                Ok(LessonRecord {
                    url: row.get(0)?,
                    title: row.get(1)?,
                    date: row.get(2)?,
                    image_url: row.get(3)?,
                    intro: row.get(4)?,
                    audio_url: row.get(5)?,
                    transcript: row.get(6)?,
                    vocabulary: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut lesson) = lesson else {
        return Ok(None);
    };
    lesson.vocabulary = fetch_vocabulary(conn, id)?;
    Ok(Some(lesson))
}

pub fn fetch_vocabulary(conn: &Connection, lesson_id: i64) -> Result<Vec<VocabEntry>> {
    let mut stmt = conn.prepare(
        "SELECT term, definition FROM lesson_vocab WHERE lesson_id = ?1 ORDER BY position",
    )?;
    let rows = stmt
        .query_map(params![lesson_id], |row| {
            Ok(VocabEntry {
                term: row.get(0)?,
                definition: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Store an edited transcript. Returns false if the lesson does not exist.
pub fn update_transcript(conn: &Connection, id: i64, transcript: &str) -> Result<bool> {
    let n = conn.execute(
        "UPDATE lessons SET transcript = ?2, updated_at = datetime('now') WHERE id = ?1",
        params![id, transcript],
    )?;
    Ok(n > 0)
}

pub fn replace_vocabulary(conn: &Connection, id: i64, vocabulary: &[VocabEntry]) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    write_vocabulary(&tx, id, vocabulary)?;
    tx.commit()?;
    Ok(())
}

fn write_vocabulary(conn: &Connection, lesson_id: i64, vocabulary: &[VocabEntry]) -> Result<()> {
    conn.execute("DELETE FROM lesson_vocab WHERE lesson_id = ?1", params![lesson_id])?;
    let mut stmt = conn.prepare(
        "INSERT INTO lesson_vocab (lesson_id, position, term, definition) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (pos, v) in vocabulary.iter().enumerate() {
        stmt.execute(params![lesson_id, pos as i64, v.term, v.definition])?;
    }
    Ok(())
}

// ── Listing ──

pub struct LessonSummary {
    pub id: i64,
    pub title: String,
    pub date: String,
    pub vocab_count: i64,
    pub url: String,
}

pub fn list_lessons(conn: &Connection, limit: usize) -> Result<Vec<LessonSummary>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.title, l.date, COUNT(v.id), l.url
         FROM lessons l
         LEFT JOIN lesson_vocab v ON v.lesson_id = l.id
         GROUP BY l.id
         ORDER BY l.published_on DESC, l.id DESC
         LIMIT ?1",
    )?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(LessonSummary {
                id: row.get(0)?,
                title: row.get(1)?,
                date: row.get(2)?,
                vocab_count: row.get(3)?,
                url: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn lesson(url: &str) -> LessonRecord {
        LessonRecord {
            url: url.into(),
            title: "Why do we love walking?".into(),
            date: "04 Dec 2025".into(),
            image_url: String::new(),
            intro: "Intro".into(),
            audio_url: String::new(),
            transcript: "[SPEAKER]Neil[/SPEAKER]\nHello.".into(),
            vocabulary: vec![
                VocabEntry { term: "stroll".into(), definition: "a slow walk".into() },
                VocabEntry { term: "pace".into(), definition: "speed".into() },
            ],
        }
    }

    #[test]
    fn save_and_fetch() {
        let conn = memory();
        let id = save_lesson(&conn, &lesson("https://x/1")).unwrap();
        let back = fetch_lesson(&conn, id).unwrap().unwrap();
        assert_eq!(back, lesson("https://x/1"));
        assert!(fetch_lesson(&conn, id + 100).unwrap().is_none());
    }

    #[test]
    fn resave_same_url_replaces() {
        let conn = memory();
        let id = save_lesson(&conn, &lesson("https://x/1")).unwrap();
        let mut changed = lesson("https://x/1");
        changed.title = "New title".into();
        changed.vocabulary.truncate(1);
        assert_eq!(save_lesson(&conn, &changed).unwrap(), id);
        let back = fetch_lesson(&conn, id).unwrap().unwrap();
        assert_eq!(back.title, "New title");
        assert_eq!(back.vocabulary.len(), 1);
    }

    #[test]
    fn edit_transcript_and_vocab() {
        let conn = memory();
        let id = save_lesson(&conn, &lesson("https://x/1")).unwrap();
        assert!(update_transcript(&conn, id, "Edited.").unwrap());
        assert!(!update_transcript(&conn, id + 1, "Nope.").unwrap());
        replace_vocabulary(&conn, id, &[VocabEntry { term: "a".into(), definition: "b".into() }]).unwrap();
        let back = fetch_lesson(&conn, id).unwrap().unwrap();
        assert_eq!(back.transcript, "Edited.");
        assert_eq!(back.vocabulary, vec![VocabEntry { term: "a".into(), definition: "b".into() }]);
    }

    #[test]
    fn listing() {
        let conn = memory();
        save_lesson(&conn, &lesson("https://x/1")).unwrap();
        let mut undated = lesson("https://x/2");
        undated.date = String::new();
        undated.vocabulary.clear();
        save_lesson(&conn, &undated).unwrap();
        let rows = list_lessons(&conn, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].url, "https://x/1");
        assert_eq!(rows[0].vocab_count, 2);
        assert_eq!(rows[1].vocab_count, 0);
    }
}
