use std::io::Write;
use std::path::Path;

use serde::Serialize;

/// One JSON line on stdout.
#[derive(Debug, Serialize)]
pub struct LogEntry<'a> {
    pub level: &'static str,
    pub msg: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<'a> LogEntry<'a> {
    fn new(level: &'static str, msg: &'a str) -> Self {
        Self {
            level,
            msg,
            operation: None,
            batch: None,
            index: None,
            address: None,
            nonce: None,
            value: None,
            success: None,
            fail: None,
            ignored: None,
            error: None,
        }
    }

    pub fn info(msg: &'a str) -> Self {
        Self::new("INFO", msg)
    }

    pub fn warn(msg: &'a str, err: impl std::fmt::Display) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::new("WARN", msg)
        }
    }

    pub fn error(msg: &'a str, err: impl std::fmt::Display) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::new("ERROR", msg)
        }
    }

    pub fn batch(operation: &'a str, batch: usize) -> Self {
        Self {
            operation: Some(operation),
            batch: Some(batch),
            ..Self::new("BATCH", "Building tx batch")
        }
    }

    pub fn tx(operation: &'a str, index: u32, address: impl std::fmt::Display, nonce: Option<u64>) -> Self {
        Self {
            operation: Some(operation),
            index: Some(index),
            address: Some(address.to_string()),
            nonce,
            ..Self::new("TX", "Submitting")
        }
    }

    pub fn summary(operation: &'a str, success: usize, fail: usize) -> Self {
        Self {
            operation: Some(operation),
            success: Some(success),
            fail: Some(fail),
            ..Self::new("SUMMARY", "Run complete")
        }
    }

    pub fn with_value(mut self, value: String) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_ignored(mut self, ignored: usize) -> Self {
        self.ignored = Some(ignored);
        self
    }
}

pub fn log_json(entry: LogEntry) {
    if let Ok(json) = serde_json::to_string(&entry) {
        println!("{}", json);
    }
}

/// Logs to stdout and appends the same line to `journal` when given.
pub fn log_json_with_file(entry: &LogEntry, journal: Option<&Path>) {
    if let Ok(json) = serde_json::to_string(entry) {
        println!("{}", json);

        let Some(path) = journal else { return };
        if let Ok(mut file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            if let Err(e) = writeln!(file, "{}", json) {
                eprintln!("Failed to write to journal {}: {}", path.display(), e);
            }
        }
    }
}
