use crate::settings::Settings;
use eyre::Result;
use serde_json::{Map, Value};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    filepath: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let prefix = get_app_data_prefix()?;
        let filepath = prefix.join("configuration.json");

        if !filepath.exists() {
            // Save initial config if it doesn't exist
            let config = Self {
                settings: Settings::default(),
                filepath,
            };
            config.save()?;
            return Ok(config);
        }

        Self::load_from(filepath)
    }

    /// Get the configuration file path
    pub fn filepath(&self) -> &PathBuf {
        &self.filepath
    }

    /// Create a config with custom settings for testing
    #[cfg(test)]
    pub fn with_settings(settings: Settings) -> Result<Self> {
        let prefix = get_app_data_prefix()?;
        let filepath = prefix.join("test_configuration.json");

        Ok(Self { settings, filepath })
    }

    /// Save current configuration to file
    pub fn save(&self) -> Result<()> {
        let config_json = serde_json::json!({
            "Setting": self.settings,
        });

        let config_str = serde_json::to_string_pretty(&config_json)?;

        if let Some(parent) = self.filepath.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.filepath, config_str)?;
        Ok(())
    }

    /// Load configuration from a custom path. Unknown or mistyped fields keep their defaults.
    pub fn load_from(filepath: PathBuf) -> Result<Self> {
        let mut settings = Settings::default();

        if filepath.exists() {
            let config_str = fs::read_to_string(&filepath)?;
            if let Ok(user_config) = serde_json::from_str::<Value>(&config_str) {
                if let Some(user_settings_map) =
                    user_config.get("Setting").and_then(|v| v.as_object())
                {
                    apply_settings_map(user_settings_map, &mut settings);
                }
            } else {
                tracing::warn!(path = %filepath.display(), "configuration is not valid JSON, using defaults");
            }
        }

        Ok(Self { settings, filepath })
    }

    /// Directory receiving exported bookmarks and downloaded recitations.
    pub fn download_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.settings.download_dir {
            return Ok(PathBuf::from(dir));
        }
        if let Some(home) = std::env::var_os("HOME") {
            let downloads = PathBuf::from(home).join("Downloads");
            if downloads.is_dir() {
                return Ok(downloads);
            }
        }
        Ok(get_app_data_prefix()?.join("downloads"))
    }
}

fn apply_settings_map(map: &Map<String, Value>, settings: &mut Settings) {
    if let Some(val) = map.get("api_base").and_then(|v| v.as_str()) {
        settings.api_base = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = map.get("audio_cdn").and_then(|v| v.as_str()) {
        settings.audio_cdn = val.trim_end_matches('/').to_string();
    }
    if let Some(val) = map.get("player").and_then(|v| v.as_str()) {
        settings.player = val.to_string();
    }
    if let Some(val) = map.get("player_args").and_then(|v| v.as_array()) {
        settings.player_args = val
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect();
    }
    if let Some(val) = map.get("verses_per_page").and_then(|v| v.as_u64()) {
        if val > 0 {
            settings.verses_per_page = val as u32;
        }
    }
    if let Some(val) = map.get("search_size").and_then(|v| v.as_u64()) {
        if val > 0 {
            settings.search_size = val as u32;
        }
    }
    if let Some(val) = map.get("request_timeout_secs").and_then(|v| v.as_u64()) {
        if val > 0 {
            settings.request_timeout_secs = val;
        }
    }
    if let Some(val) = map.get("download_dir").and_then(|v| v.as_str()) {
        settings.download_dir = Some(val.to_string());
    }
    if let Some(val) = map.get("show_translation").and_then(|v| v.as_bool()) {
        settings.show_translation = val;
    }
}

pub fn get_app_data_prefix() -> Result<PathBuf> {
    if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
        let path = PathBuf::from(config_home).join("tilawa");
        return Ok(path);
    } else if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home.clone()).join(".config").join("tilawa");
        if path.exists() {
            return Ok(path);
        } else {
            return Ok(PathBuf::from(home).join(".tilawa"));
        }
    } else if let Some(user_profile) = std::env::var_os("USERPROFILE") {
        return Ok(PathBuf::from(user_profile).join(".tilawa"));
    }

    Err(eyre::eyre!(
        "Could not determine application data directory"
    ))
}
