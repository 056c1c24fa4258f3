//! Per-platform integration settings.
//!
//! These describe the webhook integrations an operator can configure. The
//! core never reads them; they are surfaced by `leadsai backend` and the
//! health endpoint so operators can see what is configured.

use serde::Serialize;

#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformSettings {
    pub enabled: bool,
    pub app_id: String,
    #[serde(skip_serializing)]
    pub app_secret: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub webhook_token: Option<String>,
    /// Page or account id; the channel id for YouTube.
    pub page_id: Option<String>,
}

impl PlatformSettings {
    /// An access token shorter than six characters is treated as a placeholder.
    #[must_use]
    pub fn looks_connected(&self) -> bool {
        self.enabled && self.access_token.len() > 5
    }
}

impl std::fmt::Debug for PlatformSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |s: &str| if s.is_empty() { "" } else { "[redacted]" };
        f.debug_struct("PlatformSettings")
            .field("enabled", &self.enabled)
            .field("app_id", &self.app_id)
            .field("app_secret", &redact(&self.app_secret))
            .field("access_token", &redact(&self.access_token))
            .field(
                "webhook_token",
                &self.webhook_token.as_ref().map(|_| "[redacted]"),
            )
            .field("page_id", &self.page_id)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrationSettings {
    pub instagram: PlatformSettings,
    pub facebook: PlatformSettings,
    pub linkedin: PlatformSettings,
    pub youtube: PlatformSettings,
}

impl IntegrationSettings {
    /// `(name, settings)` pairs in display order.
    #[must_use]
    pub fn iter(&self) -> [(&'static str, &PlatformSettings); 4] {
        [
            ("instagram", &self.instagram),
            ("facebook", &self.facebook),
            ("linkedin", &self.linkedin),
            ("youtube", &self.youtube),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let settings = PlatformSettings {
            enabled: true,
            app_id: "app-1".to_string(),
            app_secret: "very-secret".to_string(),
            access_token: "token-123456".to_string(),
            webhook_token: Some("hook".to_string()),
            page_id: None,
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("token-123456"));
        assert!(!debug.contains("\"hook\""));
        assert!(debug.contains("app-1"));
    }

    #[test]
    fn serialization_skips_secrets() {
        let settings = PlatformSettings {
            access_token: "token-123456".to_string(),
            ..PlatformSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("token-123456"));
    }

    #[test]
    fn short_token_is_not_connected() {
        let mut settings = PlatformSettings {
            enabled: true,
            access_token: "abc".to_string(),
            ..PlatformSettings::default()
        };
        assert!(!settings.looks_connected());
        settings.access_token = "abcdef".to_string();
        assert!(settings.looks_connected());
    }
}
