//! Health check utilities for factline.
//!
//! Provides the `doctor` command functionality:
//! - Data file health (present, readable, record count)
//! - Ollama connectivity and installed models

use anyhow::Result;

use crate::database::{Database, DbStatus};
use crate::ollama::OllamaClientBuilder;

// ANSI color codes for terminal output
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Health status for a component.
#[derive(Debug, Clone)]
pub enum HealthStatus {
    /// Component is healthy
    Ok,
    /// Component has a warning but is functional
    Warning(String),
    /// Component is not functional
    Error(String),
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, HealthStatus::Ok)
    }
}

/// Data file health information.
#[derive(Debug)]
pub struct DataHealth {
    pub status: HealthStatus,
    pub file_path: String,
    pub records: usize,
}

/// Ollama connectivity information.
#[derive(Debug)]
pub struct OllamaHealth {
    pub status: HealthStatus,
    pub base_url: String,
    pub models: Vec<String>,
}

// ============================================================================
// Health Check Functions
// ============================================================================

/// Performs all health checks and prints results.
pub fn run_health_checks(db: &Database) -> Result<()> {
    let data_health = check_data_health(db);
    let ollama_health = check_ollama_health();

    print_health_report(&data_health, &ollama_health);

    Ok(())
}

fn check_data_health(db: &Database) -> DataHealth {
    let file_path = db
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<in-memory>".to_string());

    match db.status() {
        DbStatus::Loaded { records } => DataHealth {
            status: HealthStatus::Ok,
            file_path,
            records,
        },
        DbStatus::Missing => DataHealth {
            status: HealthStatus::Warning(
                "No data file found. Run `factline flatten` to build one.".to_string(),
            ),
            file_path,
            records: 0,
        },
    }
}

fn check_ollama_health() -> OllamaHealth {
    let client = match OllamaClientBuilder::new().build() {
        Ok(c) => c,
        Err(e) => {
            return OllamaHealth {
                status: HealthStatus::Error(format!("Failed to build client: {}", e)),
                base_url: String::new(),
                models: Vec::new(),
            };
        }
    };

    let base_url = client.base_url().to_string();

    match client.list_models() {
        Ok(models) => OllamaHealth {
            status: if models.is_empty() {
                HealthStatus::Warning("No models installed".to_string())
            } else {
                HealthStatus::Ok
            },
            base_url,
            models,
        },
        Err(e) => OllamaHealth {
            status: HealthStatus::Error(format!("Connection failed: {}", e)),
            base_url,
            models: Vec::new(),
        },
    }
}

// ============================================================================
// Pretty Printing
// ============================================================================

fn status_symbol(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => "\u{2713}",
        HealthStatus::Warning(_) => "!",
        HealthStatus::Error(_) => "\u{2717}",
    }
}

fn status_color(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Ok => GREEN,
        HealthStatus::Warning(_) => YELLOW,
        HealthStatus::Error(_) => RED,
    }
}

fn print_health_report(data: &DataHealth, ollama: &OllamaHealth) {
    println!("{}factline doctor{}", BOLD, RESET);
    println!();

    // Data file section
    println!("{}Data{}", BOLD, RESET);
    let data_text = match &data.status {
        HealthStatus::Ok => format!("{} records", data.records),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    };
    println!(
        "  {}{}{} Records: {}",
        status_color(&data.status),
        status_symbol(&data.status),
        RESET,
        data_text
    );
    println!("    {}Path: {}{}", DIM, data.file_path, RESET);
    println!();

    // Ollama section
    println!("{}Ollama{}", BOLD, RESET);
    let status_text = match &ollama.status {
        HealthStatus::Ok => "Connected".to_string(),
        HealthStatus::Warning(w) => w.clone(),
        HealthStatus::Error(e) => e.clone(),
    };
    println!(
        "  {}{}{} Status: {}",
        status_color(&ollama.status),
        status_symbol(&ollama.status),
        RESET,
        status_text
    );
    if !ollama.base_url.is_empty() {
        println!("    {}URL: {}{}", DIM, ollama.base_url, RESET);
    }
    if !ollama.models.is_empty() {
        let models_display = if ollama.models.len() > 3 {
            format!(
                "{}, ... ({} more)",
                ollama.models[..3].join(", "),
                ollama.models.len() - 3
            )
        } else {
            ollama.models.join(", ")
        };
        println!("    {}Models: {}{}", DIM, models_display, RESET);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_is_ok() {
        assert!(HealthStatus::Ok.is_ok());
        assert!(!HealthStatus::Warning("test".into()).is_ok());
        assert!(!HealthStatus::Error("test".into()).is_ok());
    }

    #[test]
    fn test_check_data_health_with_records() {
        let db = Database::from_lines(vec!["USER (Bob) | Currency: EUR".to_string()]);
        let health = check_data_health(&db);

        assert!(health.status.is_ok());
        assert_eq!(health.records, 1);
        assert_eq!(health.file_path, "<in-memory>");
    }

    #[test]
    fn test_check_data_health_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("nope.txt"));
        let health = check_data_health(&db);

        assert!(matches!(health.status, HealthStatus::Warning(_)));
        assert_eq!(health.records, 0);
        assert!(health.file_path.contains("nope.txt"));
    }
}
