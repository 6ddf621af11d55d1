/// Integration tests for the retrieve-then-answer pipeline with a real data
/// file and a deterministic stub answerer.
///
/// These tests verify end-to-end behavior including:
/// - File-backed record database (not just in-memory fixtures)
/// - Keyword retrieval against realistic record lines
/// - The fixed not-found reply and both degraded answer paths
/// - Cache invalidation when the data file changes on disk
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use factline::answerer::Answerer;
use factline::ollama::OllamaError;
use factline::retriever::{KeywordPolicy, RetrievalConfig};
use factline::{AssistantService, Database, NOT_FOUND_MESSAGE};
use tempfile::tempdir;

const SAMPLE_DATA: &str = "\
USER (Bob Smith) | Currency: EUR
USER (Bob Smith) | Plan: Premium
USER (Alice Chen) | Currency: USD
NODE (Ana Ruiz) | Status: Online
PRODUCT (Widget) | Price: 9.99
";

struct FixedAnswerer(&'static str);

impl Answerer for FixedAnswerer {
    fn answer(&self, _question: &str, _context: &str) -> Result<String, OllamaError> {
        Ok(self.0.to_string())
    }
}

struct CountingAnswerer {
    calls: AtomicUsize,
    response: &'static str,
}

impl Answerer for CountingAnswerer {
    fn answer(&self, _question: &str, _context: &str) -> Result<String, OllamaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.to_string())
    }
}

fn write_data_file(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("flattened_notes.txt");
    std::fs::write(&path, SAMPLE_DATA).expect("failed to write data file");
    path
}

#[test]
fn question_about_bob_is_answered_from_his_record() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    let service = AssistantService::new(
        Database::open(&path),
        Arc::new(FixedAnswerer("EUR")),
        RetrievalConfig::default(),
    );

    let answer = service.ask("What currency does Bob use?")?;
    assert_eq!(answer.text, "EUR");
    assert_eq!(
        answer.source,
        Some("USER (Bob Smith) | Currency: EUR".to_string())
    );

    Ok(())
}

#[test]
fn unmatched_question_gets_fixed_reply_and_no_model_call() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    let answerer = Arc::new(CountingAnswerer {
        calls: AtomicUsize::new(0),
        response: "should never appear",
    });
    let service = AssistantService::new(
        Database::open(&path),
        answerer.clone(),
        RetrievalConfig::default(),
    );

    let answer = service.ask("completely unrelated zebras")?;
    assert_eq!(answer.text, NOT_FOUND_MESSAGE);
    assert_eq!(answer.source, None);
    assert_eq!(answerer.calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[test]
fn missing_data_file_behaves_like_empty_database() -> Result<()> {
    let dir = tempdir()?;

    let service = AssistantService::new(
        Database::open(dir.path().join("does_not_exist.txt")),
        Arc::new(FixedAnswerer("never")),
        RetrievalConfig::default(),
    );

    let answer = service.ask("What currency does Bob use?")?;
    assert_eq!(answer.text, NOT_FOUND_MESSAGE);

    Ok(())
}

#[test]
fn echoed_question_is_replaced_by_the_raw_fact_value() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    struct Echo;
    impl Answerer for Echo {
        fn answer(&self, question: &str, _context: &str) -> Result<String, OllamaError> {
            Ok(question.to_string())
        }
    }

    let service = AssistantService::new(
        Database::open(&path),
        Arc::new(Echo),
        RetrievalConfig::default(),
    );

    let answer = service.ask("What currency does Bob use?")?;
    assert_eq!(answer.text, "EUR");

    Ok(())
}

#[test]
fn answerer_failure_degrades_to_the_matched_line() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    struct Failing;
    impl Answerer for Failing {
        fn answer(&self, _question: &str, _context: &str) -> Result<String, OllamaError> {
            Err(OllamaError::Http { status: 503 })
        }
    }

    let service = AssistantService::new(
        Database::open(&path),
        Arc::new(Failing),
        RetrievalConfig::default(),
    );

    let answer = service.ask("What currency does Bob use?")?;
    assert_eq!(answer.text, "USER (Bob Smith) | Currency: EUR");

    Ok(())
}

#[test]
fn repeated_questions_are_deterministic() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    let service = AssistantService::new(
        Database::open(&path),
        Arc::new(FixedAnswerer("EUR")),
        RetrievalConfig::default(),
    );

    let first = service.ask("What currency does Bob use?")?;
    let second = service.ask("What currency does Bob use?")?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn top_k_widens_the_context_handed_to_the_answerer() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    struct ContextLines(AtomicUsize);
    impl Answerer for ContextLines {
        fn answer(&self, _question: &str, context: &str) -> Result<String, OllamaError> {
            self.0.store(context.lines().count(), Ordering::SeqCst);
            Ok("two".to_string())
        }
    }

    let answerer = Arc::new(ContextLines(AtomicUsize::new(0)));
    let service = AssistantService::new(
        Database::open(&path),
        answerer.clone(),
        RetrievalConfig {
            policy: KeywordPolicy::MinLength,
            top_k: 2,
        },
    );

    service.ask("currency")?;
    assert_eq!(answerer.0.load(Ordering::SeqCst), 2);

    Ok(())
}

#[test]
fn new_records_are_picked_up_after_the_file_changes() -> Result<()> {
    let dir = tempdir()?;
    let path = write_data_file(dir.path());

    let db = Database::open(&path);
    let service = AssistantService::new(
        db,
        Arc::new(FixedAnswerer("answered")),
        RetrievalConfig::default(),
    );

    // Warm the cache, then wait for the filesystem clock to tick so the
    // rewrite gets a distinct mtime.
    assert_eq!(service.ask("xylophone lessons")?.text, NOT_FOUND_MESSAGE);
    std::thread::sleep(std::time::Duration::from_millis(1100));

    let mut file = std::fs::OpenOptions::new().append(true).open(&path)?;
    writeln!(file, "COURSE (Xylophone) | Lessons: Tuesday")?;
    drop(file);

    let answer = service.ask("xylophone lessons")?;
    assert_eq!(answer.text, "answered");
    assert_eq!(
        answer.source,
        Some("COURSE (Xylophone) | Lessons: Tuesday".to_string())
    );

    Ok(())
}
