//! Persisted account settings.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Account settings that persist across runs.
///
/// The password is stored base64-encoded. That only keeps it from being
/// read at a glance; the file should be readable by its owner only.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    /// Login name, usually the email address.
    pub email: String,
    /// Login password.
    #[serde(with = "base64_password")]
    pub password: String,
    /// IMAP server host.
    pub imap_server: String,
    /// IMAP server port.
    pub imap_port: u16,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            imap_server: "imap.gmx.net".to_string(),
            imap_port: 993,
        }
    }
}

impl std::fmt::Debug for AccountSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountSettings")
            .field("email", &self.email)
            .field("password", &"***")
            .field("imap_server", &self.imap_server)
            .field("imap_port", &self.imap_port)
            .finish()
    }
}

impl AccountSettings {
    /// Loads settings from `path`, or the defaults if the file does not exist.
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "no saved account settings");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Writes settings to `path`, creating its directory.
    pub async fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, contents)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        tracing::info!("Settings saved to {:?}", path);
        Ok(())
    }
}

/// Default location of the settings file.
#[must_use]
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailadler")
        .join("account.json")
}

/// Serde helpers storing a string as base64.
mod base64_password {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ptr_arg)] // Required by serde with= signature
    pub fn serialize<S>(password: &String, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(password.as_bytes()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)?;
        String::from_utf8(bytes).map_err(serde::de::Error::custom)
    }
}
