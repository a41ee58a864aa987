use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{PainelError, Result};
use crate::fetcher::HttpSource;
use crate::goals::GoalThresholds;
use crate::logging;
use crate::models::{DocKind, LabelPolicy, Vocabulary};

/// Keys accepted by `painel config set`.
pub const KEYS: &[&str] = &[
    "orders_api_url",
    "revenue_api_url",
    "monthly_goal",
    "business_days",
    "unknown_labels",
    "extra_labels",
    "request_timeout_secs",
    "log_level",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host serving `/api/pedidos` and `/api/produtos_clientes`.
    pub orders_api_url: String,
    /// Host serving `/api/faturado`, `/api/pedidos_grafico` and `/api/teste2`.
    pub revenue_api_url: String,
    pub monthly_goal: f64,
    pub business_days: u32,
    pub unknown_labels: LabelPolicy,
    pub extra_labels: BTreeMap<String, DocKind>,
    pub request_timeout_secs: u64,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            orders_api_url: "http://localhost:8003".to_string(),
            revenue_api_url: "http://localhost:3001".to_string(),
            monthly_goal: 3_500_000.0,
            business_days: 22,
            unknown_labels: LabelPolicy::Drop,
            extra_labels: BTreeMap::new(),
            request_timeout_secs: 30,
            log_level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Label table shared by every revenue view.
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::standard(self.unknown_labels).extend(&self.extra_labels)
    }

    pub fn goals(&self) -> Result<GoalThresholds> {
        GoalThresholds::compute(self.monthly_goal, self.business_days)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn orders_source(&self) -> Result<HttpSource> {
        HttpSource::new(&self.orders_api_url, self.timeout())
    }

    pub fn revenue_source(&self) -> Result<HttpSource> {
        HttpSource::new(&self.revenue_api_url, self.timeout())
    }

    /// Validate and store one key as typed on the command line.
    ///
    /// `extra_labels` takes `LABEL=KIND`; an empty kind removes the label.
    pub fn set_key(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |why: &str| PainelError::Settings(format!("{key}: {why}"));
        match key {
            "orders_api_url" | "revenue_api_url" => {
                let url = value.trim();
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(invalid("expected an http:// or https:// URL"));
                }
                if key == "orders_api_url" {
                    self.orders_api_url = url.to_string();
                } else {
                    self.revenue_api_url = url.to_string();
                }
            }
            "monthly_goal" => {
                let goal: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected an amount"))?;
                if !goal.is_finite() || goal < 0.0 {
                    return Err(invalid("must be zero or more"));
                }
                self.monthly_goal = goal;
            }
            "business_days" => {
                let days: u32 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if days == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.business_days = days;
            }
            "unknown_labels" => {
                self.unknown_labels = LabelPolicy::parse(value.trim())
                    .ok_or_else(|| invalid("expected drop or reject"))?;
            }
            "extra_labels" => {
                let (label, kind) = value
                    .split_once('=')
                    .ok_or_else(|| invalid("expected LABEL=order|invoice|return"))?;
                if label.is_empty() {
                    return Err(invalid("label is empty"));
                }
                if kind.trim().is_empty() {
                    self.extra_labels.remove(label);
                } else {
                    let kind = DocKind::parse(kind.trim())
                        .ok_or_else(|| invalid("kind must be order, invoice or return"))?;
                    self.extra_labels.insert(label.to_string(), kind);
                }
            }
            "request_timeout_secs" => {
                let secs: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1"));
                }
                self.request_timeout_secs = secs;
            }
            "log_level" => {
                if !logging::is_valid_filter(value) {
                    return Err(invalid("not a valid log filter"));
                }
                self.log_level = value.to_string();
            }
            _ => {
                return Err(PainelError::Settings(format!(
                    "unknown key {key:?} (expected one of: {})",
                    KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("painel")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("painel.log")
}

/// A missing file yields defaults and missing fields are filled in. A file
/// that exists but does not parse is an error.
pub fn read_from(path: &Path) -> Result<Settings> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&content)
        .map_err(|e| PainelError::Settings(format!("{} is not valid: {e}", path.display())))
}

/// Like [`read_from`], but falls back to defaults with a warning.
pub fn load_from(path: &Path) -> Settings {
    read_from(path).unwrap_or_else(|e| {
        warn!("{e}; using default settings");
        Settings::default()
    })
}

pub fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PainelError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn load_settings() -> Settings {
    load_from(&settings_path())
}

/// Settings for a read-modify-write; a broken file is reported, not replaced.
pub fn read_settings() -> Result<Settings> {
    read_from(&settings_path())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_to(&settings_path(), settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("settings.json");
        let mut settings = Settings::default();
        settings.set_key("monthly_goal", "4000000").unwrap();
        settings.set_key("extra_labels", "Orçamento=order").unwrap();
        save_to(&path, &settings).unwrap();

        let loaded = load_from(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.extra_labels.get("Orçamento"), Some(&DocKind::Order));
    }

    #[test]
    fn test_load_returns_defaults_when_missing_or_broken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_from(&path), Settings::default());

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_from(&path), Settings::default());
    }

    #[test]
    fn test_read_reports_broken_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(read_from(&path).unwrap(), Settings::default());

        std::fs::write(&path, "{ not json").unwrap();
        let err = read_from(&path).unwrap_err();
        assert!(matches!(err, PainelError::Settings(_)));
        assert!(err.to_string().contains("settings.json is not valid"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"monthly_goal": 1000000, "unknown_labels": "reject"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.monthly_goal, 1_000_000.0);
        assert_eq!(s.unknown_labels, LabelPolicy::Reject);
        assert_eq!(s.business_days, 22);
        assert_eq!(s.orders_api_url, "http://localhost:8003");
        assert_eq!(s.revenue_api_url, "http://localhost:3001");
    }

    #[test]
    fn test_set_key_validation() {
        let mut s = Settings::default();
        assert!(s.set_key("business_days", "0").is_err());
        assert!(s.set_key("business_days", "abc").is_err());
        assert!(s.set_key("monthly_goal", "-5").is_err());
        assert!(s.set_key("unknown_labels", "ignore").is_err());
        assert!(s.set_key("orders_api_url", "localhost:8003").is_err());
        assert!(s.set_key("extra_labels", "Orçamento=quote").is_err());
        assert!(s.set_key("request_timeout_secs", "0").is_err());
        assert!(s.set_key("colour", "blue").is_err());
        assert_eq!(s, Settings::default());

        s.set_key("business_days", "20").unwrap();
        s.set_key("revenue_api_url", "https://erp.example.com/").unwrap();
        s.set_key("log_level", "painel=debug").unwrap();
        assert_eq!(s.business_days, 20);
        assert_eq!(s.revenue_api_url, "https://erp.example.com/");
        assert_eq!(s.log_level, "painel=debug");
    }

    #[test]
    fn test_extra_labels_add_and_remove() {
        let mut s = Settings::default();
        s.set_key("extra_labels", "Bonificação=invoice").unwrap();
        assert_eq!(
            s.vocabulary().classify("Bonificação").unwrap(),
            Some(DocKind::Invoice)
        );
        s.set_key("extra_labels", "Bonificação=").unwrap();
        assert!(s.extra_labels.is_empty());
        assert_eq!(s.vocabulary().classify("Bonificação").unwrap(), None);
    }

    #[test]
    fn test_goals_from_settings() {
        let g = Settings::default().goals().unwrap();
        assert_eq!(g.business_days, 22);
        assert_eq!(g.monthly, 3_500_000.0);
    }
}
