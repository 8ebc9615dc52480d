use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes one pretty-printed JSON file per successful submission.
#[derive(Debug, Clone)]
pub struct TransactionRecorder {
    dir: PathBuf,
}

impl TransactionRecorder {
    pub const DEFAULT_DIR: &'static str = "transactions";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{epoch_ms}_{first 8 chars of address}_{label}.json`
    pub fn file_name(epoch_ms: i64, wallet_address: &str, label: &str) -> String {
        let prefix: String = wallet_address.chars().take(8).collect();
        format!("{}_{}_{}.json", epoch_ms, prefix, sanitize_label(label))
    }

    pub fn record(&self, wallet_address: &str, label: &str, payload: &Value) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let name = Self::file_name(Utc::now().timestamp_millis(), wallet_address, label);
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(payload)?;
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Value> {
        let content = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Collapses whitespace runs to `_` and drops path separators.
fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_space = false;
    for ch in label.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match ch {
            '/' | '\\' | ':' => out.push('-'),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_name_format() {
        let name = TransactionRecorder::file_name(
            1_700_000_000_000,
            "0xabcdef0123456789",
            "wSUI → wDUBHE  Swap",
        );
        assert_eq!(name, "1700000000000_0xabcdef_wSUI_→_wDUBHE_Swap.json");
    }

    #[test]
    fn test_record_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = TransactionRecorder::new(dir.path().join("tx"));
        let payload = json!({
            "digest": "9xYz",
            "effects": { "status": { "status": "success" }, "gasUsed": { "computationCost": "1000" } },
            "events": []
        });

        let path = recorder.record("0x1234567890", "SUI Wrapping", &payload).unwrap();

        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("_0x123456_SUI_Wrapping.json"));
        assert_eq!(TransactionRecorder::read(&path).unwrap(), payload);
    }
}
