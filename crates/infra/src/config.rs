//! Configuration loading and representation.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use registrar_records::SalaryPolicy;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Outgoing mail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub sender_name: String,
    pub sender_email: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            sender_name: "Registrar".to_string(),
            sender_email: "no-reply@registrar.local".to_string(),
            smtp_server: DEFAULT_SMTP_SERVER.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrarConfig {
    pub salary_policy: SalaryPolicy,
    pub notifications: NotificationSettings,
    /// Base of the link mailed to new accounts; the token is appended as a query.
    pub confirmation_base_url: String,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            salary_policy: SalaryPolicy::default(),
            notifications: NotificationSettings::default(),
            confirmation_base_url: "http://localhost:8080/account/confirm".to_string(),
        }
    }
}

impl RegistrarConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid registrar configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Load from `REGISTRAR_CONFIG` (a JSON file path) when set, then apply
    /// the `REGISTRAR_SMTP_SERVER`, `REGISTRAR_SMTP_PORT` and
    /// `REGISTRAR_SENDER_EMAIL` overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match var("REGISTRAR_CONFIG") {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(server) = var("REGISTRAR_SMTP_SERVER").filter(|s| !s.trim().is_empty()) {
            config.notifications.smtp_server = server;
        }
        if let Some(port) = var("REGISTRAR_SMTP_PORT") {
            config.notifications.smtp_port = port
                .trim()
                .parse()
                .with_context(|| format!("REGISTRAR_SMTP_PORT is not a port number: {port}"))?;
        }
        if let Some(email) = var("REGISTRAR_SENDER_EMAIL").filter(|s| !s.trim().is_empty()) {
            config.notifications.sender_email = email;
        }
        Ok(config)
    }

    /// Confirmation link for an account token.
    pub fn confirmation_link(&self, account_id: impl core::fmt::Display, token: impl core::fmt::Display) -> String {
        let sep = if self.confirmation_base_url.contains('?') { '&' } else { '?' };
        format!("{}{sep}user_id={account_id}&token={token}", self.confirmation_base_url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_mail_conventions() {
        let c = RegistrarConfig::default();
        assert_eq!(c.notifications.smtp_server, "smtp.gmail.com");
        assert_eq!(c.notifications.smtp_port, 587);
        assert_eq!(c.salary_policy, SalaryPolicy::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = RegistrarConfig::from_json(r#"{"notifications":{"sender_name":"Admissions"}}"#).unwrap();
        assert_eq!(c.notifications.sender_name, "Admissions");
        assert_eq!(c.notifications.smtp_port, 587);
        assert_eq!(c.salary_policy.rules().len(), 2);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"salary_policy":[{{"department":"Research","min":20000}}],"confirmation_base_url":"https://uni.example/confirm"}}"#
        )
        .unwrap();

        let c = RegistrarConfig::from_file(file.path()).unwrap();
        assert_eq!(c.salary_policy.rules().len(), 1);
        assert_eq!(
            c.confirmation_link("abc", "t0k"),
            "https://uni.example/confirm?user_id=abc&token=t0k"
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RegistrarConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.json"));
    }

    #[test]
    fn environment_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("REGISTRAR_SMTP_SERVER", "mail.example.org"),
            ("REGISTRAR_SMTP_PORT", "2525"),
            ("REGISTRAR_SENDER_EMAIL", "registrar@example.org"),
        ]);
        let c = RegistrarConfig::from_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(c.notifications.smtp_server, "mail.example.org");
        assert_eq!(c.notifications.smtp_port, 2525);
        assert_eq!(c.notifications.sender_email, "registrar@example.org");
    }

    #[test]
    fn bad_port_is_an_error() {
        let result = RegistrarConfig::from_vars(|k| (k == "REGISTRAR_SMTP_PORT").then(|| "smtp".to_string()));
        assert!(result.is_err());
    }
}
