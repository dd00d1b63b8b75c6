//! Lesson page extraction and the transcript markup it produces.
//!
//! [`parser::process_page`] turns one lesson page into a [`LessonRecord`]
//! whose transcript is written in the markup handled by [`markup`].

pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod markup;
pub mod parser;

pub use error::ScrapeError;
pub use parser::extract::vocab::VocabEntry;
pub use parser::extract::LessonRecord;
pub use parser::process_page;
