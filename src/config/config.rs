use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::DEFAULT_HOSPITAL_RADIUS_METERS;
use crate::location::{Coordinates, DisabledLocation, FixedLocation, LocationProvider, NoLocation};
use crate::utils::app_paths::AppPaths;

pub const DEFAULT_API_BASE_URL: &str = "https://safelink-ai-epgg.onrender.com";

/// Environment variable overriding `api.base_url`
pub const API_BASE_URL_ENV: &str = "SAFELINK_API_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub location: LocationConfig,
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,

    /// Search radius for the hospital finder
    pub hospital_radius_meters: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Allow the hospital finder to use the position below
    pub share_location: bool,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for icons
    pub use_glyphs: bool,

    /// Icons for different states (can be overridden)
    pub icons: IconConfig,

    /// Show the key hint line at the bottom of the screen
    pub show_key_hints: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub user: String,
    pub assistant: String,
    pub hospital: String,
    pub symptoms: String,
    pub history: String,
    pub warning: String,
    pub error: String,
    pub info: String,
    pub success: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Keep the login between runs
    pub remember_session: bool,

    /// Load chat history automatically when opening the History view
    pub auto_load_history: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            hospital_radius_meters: DEFAULT_HOSPITAL_RADIUS_METERS,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            share_location: true,
            latitude: None,
            longitude: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            icons: IconConfig::default(),
            show_key_hints: true,
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            user: "🧑".to_string(),
            assistant: "🤖".to_string(),
            hospital: "🏥".to_string(),
            symptoms: "🩺".to_string(),
            history: "⏱️".to_string(),
            warning: "⚠️".to_string(),
            error: "❌".to_string(),
            info: "ℹ️".to_string(),
            success: "✅".to_string(),
        }
    }
}

impl DisplayConfig {
    /// Icons to draw with, honoring `use_glyphs`
    pub fn active_icons(&self) -> IconConfig {
        if self.use_glyphs {
            self.icons.clone()
        } else {
            IconConfig::simple()
        }
    }
}

impl IconConfig {
    /// Get simple ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            user: "[you]".to_string(),
            assistant: "[ai]".to_string(),
            hospital: "[H]".to_string(),
            symptoms: "[+]".to_string(),
            history: "[h]".to_string(),
            warning: "[!]".to_string(),
            error: "[X]".to_string(),
            info: "[i]".to_string(),
            success: "[OK]".to_string(),
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            remember_session: true,
            auto_load_history: false,
        }
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        // Apply simple mode if glyphs are disabled
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        AppPaths::config_file()
    }

    /// Base URL after applying overrides: command line, then the
    /// environment, then the config file.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> String {
        let env_value = std::env::var(API_BASE_URL_ENV).ok();
        Self::pick_base_url(cli_override, env_value.as_deref(), &self.api.base_url)
    }

    fn pick_base_url(cli: Option<&str>, env: Option<&str>, configured: &str) -> String {
        cli.or(env)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(configured)
            .trim_end_matches('/')
            .to_string()
    }

    /// Build the location provider; a command line position wins over
    /// the configured one.
    pub fn location_provider(&self, cli_override: Option<Coordinates>) -> Arc<dyn LocationProvider> {
        if !self.location.share_location {
            return Arc::new(DisabledLocation);
        }

        let configured = match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        };

        match cli_override.or(configured) {
            Some(coords) => Arc::new(FixedLocation::new(coords)),
            None => Arc::new(NoLocation),
        }
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        format!(
            r#"# SafeLink Configuration File
# Location: ~/.config/safelink/config.toml (Linux)
#           ~/Library/Application Support/safelink/config.toml (macOS)
#           %APPDATA%\safelink\config.toml (Windows)

[api]
# Backend base URL. SAFELINK_API_BASE_URL and --api override this.
base_url = "{base_url}"

# Radius used by the hospital finder, in meters
hospital_radius_meters = {radius}

[location]
# Allow the hospital finder to use your position
share_location = true

# Your position. Leave commented if unknown; --location lat,lon also works.
# latitude = 51.5074
# longitude = -0.1278

[display]
# Use Unicode glyphs for icons
# Set to false for ASCII-only mode (better compatibility)
use_glyphs = true

# Show key hints at the bottom of the screen
show_key_hints = true

[behavior]
# Keep your login between runs
remember_session = true

# Load chat history automatically when opening the History view
auto_load_history = false
"#,
            base_url = DEFAULT_API_BASE_URL,
            radius = DEFAULT_HOSPITAL_RADIUS_METERS,
        )
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("SafeLink Configuration Setup");
        println!("============================");

        let mut config = Config::default();

        print!("Backend URL [{}]: ", DEFAULT_API_BASE_URL);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.api.base_url = input.trim().trim_end_matches('/').to_string();
        }

        // Ask about glyph support
        print!("Does your terminal support Unicode icons? (y/n) [y]: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        config.display.use_glyphs = !input.trim().eq_ignore_ascii_case("n");
        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        print!("Your position for the hospital finder, as lat,lon (blank to skip): ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        if let Some(coords) = Coordinates::parse(input.trim()) {
            config.location.latitude = Some(coords.latitude);
            config.location.longitude = Some(coords.longitude);
        }

        config.save()?;

        println!("\nConfiguration saved to: {:?}", Config::get_config_path()?);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}
