use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Run configuration. Every key is optional in the TOML file; omitted keys
/// fall back to the compiled defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_dir: PathBuf,
    pub input_file: String,
    pub input_template: String,
    pub worktray_template: String,
    pub process_dir: PathBuf,
    pub worktray_file: String,
    pub form_url: String,
    pub success_marker: String,
    pub request_timeout_secs: u64,
    pub submission_delay_ms: u64,
    pub form_fields: FormFields,
}

/// Identifiers of the remote form's four entry fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub name: String,
    pub product: String,
    pub amount: String,
    pub request_date: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            input_dir: PathBuf::from("input"),
            input_file: "input_file.csv".to_string(),
            input_template: "input_template.csv".to_string(),
            worktray_template: "worktray_template.csv".to_string(),
            process_dir: PathBuf::from("process_data"),
            worktray_file: "worktray.csv".to_string(),
            form_url: "https://docs.google.com/forms/d/e/1FAIpQLSf_5o0pOYiDzAJp2uRdSfoj5xxIfzFs0M9beiaXTsdFgeAcrw/formResponse".to_string(),
            success_marker: "Gracias".to_string(),
            request_timeout_secs: 10,
            submission_delay_ms: 1000,
            form_fields: FormFields::default(),
        }
    }
}

impl Default for FormFields {
    fn default() -> FormFields {
        FormFields {
            name: "entry.274949855".to_string(),
            product: "entry.1623880646".to_string(),
            amount: "entry.1721353382".to_string(),
            request_date: "entry.1896335859".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(&self.input_file)
    }

    pub fn input_template_path(&self) -> PathBuf {
        self.input_dir.join(&self.input_template)
    }

    pub fn worktray_template_path(&self) -> PathBuf {
        self.input_dir.join(&self.worktray_template)
    }

    pub fn worktray_path(&self) -> PathBuf {
        self.process_dir.join(&self.worktray_file)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            "submission_delay_ms = 0\n\
             [form_fields]\n\
             name = \"entry.1\"\n",
        )
        .expect("config should parse");

        assert_eq!(config.submission_delay(), Duration::ZERO);
        assert_eq!(config.form_fields.name, "entry.1");
        // untouched keys stay at their defaults
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.form_fields.product, "entry.1623880646");
        assert_eq!(config.worktray_path(), PathBuf::from("process_data/worktray.csv"));
    }
}
