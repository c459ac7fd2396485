pub mod attachment;
pub mod locale;
pub mod models;

pub mod settings {
    use serde::{Deserialize, Serialize};
    use std::env;
    use std::fs;
    use std::path::{Path, PathBuf};

    pub const DEFAULT_MODEL: &str = "qwen3:4b";

    fn default_backend_url() -> String {
        "http://127.0.0.1:8765".into()
    }

    fn default_model() -> String {
        DEFAULT_MODEL.into()
    }

    fn default_locale() -> String {
        "en".into()
    }

    fn default_timeout() -> u64 {
        600
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ClientSettings {
        /// Companion chat server, e.g. "http://127.0.0.1:8765"
        #[serde(default = "default_backend_url")]
        pub backend_url: String,
        /// Model used until the catalog says otherwise
        #[serde(default = "default_model")]
        pub default_model: String,
        /// Locale tag, e.g. "en" or "ru-RU"
        #[serde(default = "default_locale")]
        pub locale: String,
        #[serde(default = "default_timeout")]
        pub request_timeout_secs: u64,
    }

    impl Default for ClientSettings {
        fn default() -> Self {
            Self {
                backend_url: default_backend_url(),
                default_model: default_model(),
                locale: default_locale(),
                request_timeout_secs: default_timeout(),
            }
        }
    }

    impl ClientSettings {
        /// Default location of the settings file.
        pub fn config_path() -> Option<PathBuf> {
            directories::ProjectDirs::from("com.local", "Lets Talk", "LetsTalk")
                .map(|p| p.config_dir().join("settings.json"))
        }

        /// Read settings from `path`, falling back to defaults when the file
        /// is missing or malformed.
        pub fn load_from(path: &Path) -> Self {
            if let Ok(bytes) = fs::read(path) {
                match serde_json::from_slice::<ClientSettings>(&bytes) {
                    Ok(s) => return s,
                    Err(e) => {
                        tracing::warn!("ignoring malformed settings at {}: {}", path.display(), e)
                    }
                }
            }
            Self::default()
        }

        /// Settings file (if any) plus `CHAT_*` environment overrides.
        pub fn load() -> Self {
            let mut settings = Self::config_path()
                .map(|p| Self::load_from(&p))
                .unwrap_or_default();
            settings.apply_env(|key| env::var(key).ok());
            settings
        }

        pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
            if let Some(url) = lookup("CHAT_BACKEND_URL").filter(|v| !v.trim().is_empty()) {
                self.backend_url = url.trim().to_string();
            }
            if let Some(model) = lookup("CHAT_MODEL").filter(|v| !v.trim().is_empty()) {
                self.default_model = model.trim().to_string();
            }
            if let Some(locale) = lookup("CHAT_LOCALE").filter(|v| !v.trim().is_empty()) {
                self.locale = locale.trim().to_string();
            }
        }

        pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, serde_json::to_vec_pretty(self)?)?;
            Ok(())
        }
    }
}

pub mod agent_api {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Role {
        System,
        User,
        Assistant,
    }

    /// One conversation turn, serialized exactly as the chat server expects.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ChatMessage {
        pub role: Role,
        pub content: String,
    }

    impl ChatMessage {
        pub fn system(content: impl Into<String>) -> Self {
            Self {
                role: Role::System,
                content: content.into(),
            }
        }

        pub fn user(content: impl Into<String>) -> Self {
            Self {
                role: Role::User,
                content: content.into(),
            }
        }

        pub fn assistant(content: impl Into<String>) -> Self {
            Self {
                role: Role::Assistant,
                content: content.into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::agent_api::{ChatMessage, Role};
    use super::settings::ClientSettings;
    use std::collections::HashMap;

    #[test]
    fn test_partial_settings_file_keeps_defaults() {
        let s: ClientSettings = serde_json::from_str(r#"{"locale":"de"}"#).unwrap();
        assert_eq!(s.locale, "de");
        assert_eq!(s.default_model, "qwen3:4b");
        assert_eq!(s.request_timeout_secs, 600);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("CHAT_BACKEND_URL", "http://10.0.0.2:9000 "),
            ("CHAT_MODEL", "llama3:70b"),
            ("CHAT_LOCALE", ""),
        ]
        .into_iter()
        .collect();

        let mut s = ClientSettings::default();
        s.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(s.backend_url, "http://10.0.0.2:9000");
        assert_eq!(s.default_model, "llama3:70b");
        assert_eq!(s.locale, "en");
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut s = ClientSettings::default();
        s.locale = "fr".into();
        s.save_to(&path).unwrap();

        assert_eq!(ClientSettings::load_from(&path), s);
        assert_eq!(
            ClientSettings::load_from(&dir.path().join("missing.json")),
            ClientSettings::default()
        );
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::system("hi")).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"hi"}"#);
        assert_eq!(ChatMessage::assistant("x").role, Role::Assistant);
    }
}
