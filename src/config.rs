use crate::settings::Settings;
use eyre::Result;
use std::{fs, path::PathBuf};

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: Settings,
    filepath: PathBuf,
}

impl Config {
    pub fn new() -> Result<Self> {
        let prefix = get_app_data_prefix()?;
        Self::load_from(prefix.join("configuration.json"))
    }

    /// Load configuration from a custom path. A missing, empty or invalid file
    /// yields the defaults.
    pub fn load_from(filepath: PathBuf) -> Result<Self> {
        let mut settings = Settings::default();

        if filepath.exists() {
            let config_str = fs::read_to_string(&filepath)?;
            if let Ok(user_config) = serde_json::from_str::<serde_json::Value>(&config_str) {
                if let Some(user_settings) = user_config.get("Setting") {
                    match serde_json::from_value::<Settings>(user_settings.clone()) {
                        Ok(user_settings) => settings.merge(user_settings),
                        Err(err) => log::warn!(
                            "Ignoring invalid settings in {}: {}",
                            filepath.display(),
                            err
                        ),
                    }
                }
            } else {
                log::warn!("Configuration {} is not valid JSON", filepath.display());
            }
        }

        Ok(Self { settings, filepath })
    }

    pub fn with_settings(settings: Settings, filepath: PathBuf) -> Self {
        Self { settings, filepath }
    }

    /// Get the configuration file path
    pub fn filepath(&self) -> &PathBuf {
        &self.filepath
    }

    /// Where the highlight database lives.
    pub fn state_db_path(&self) -> Result<PathBuf> {
        match &self.settings.state_db {
            Some(path) => Ok(path.clone()),
            None => Ok(get_app_data_prefix()?.join("states.db")),
        }
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
}

pub fn get_app_data_prefix() -> Result<PathBuf> {
    if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(config_home).join("lectern"));
    } else if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home.clone()).join(".config").join("lectern");
        if path.exists() {
            return Ok(path);
        } else {
            return Ok(PathBuf::from(home).join(".lectern"));
        }
    } else if let Some(user_profile) = std::env::var_os("USERPROFILE") {
        return Ok(PathBuf::from(user_profile).join(".lectern"));
    }

    Err(eyre::eyre!(
        "Could not determine application data directory"
    ))
}
