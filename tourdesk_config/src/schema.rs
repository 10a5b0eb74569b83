use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Component config types live with the components to avoid duplication
use tourdesk_booking::SmtpConfig;
use tourdesk_hotels::HotelApiConfig;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub agent: AgentDefaults,
    pub providers: ProvidersConfig,
    pub hotels: HotelApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Confirmation emails are skipped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub openai: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    /// Read-only tour package dataset
    #[serde(default = "DatabaseConfig::default_packages_url")]
    pub packages_url: String,
    /// Append-only booking records
    #[serde(default = "DatabaseConfig::default_bookings_url")]
    pub bookings_url: String,
    /// Conversation checkpoints
    #[serde(default = "DatabaseConfig::default_sessions_url")]
    pub sessions_url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            packages_url: Self::default_packages_url(),
            bookings_url: Self::default_bookings_url(),
            sessions_url: Self::default_sessions_url(),
        }
    }
}

impl DatabaseConfig {
    fn default_packages_url() -> String {
        "sqlite:tour_packages.db".to_string()
    }

    fn default_bookings_url() -> String {
        "sqlite:bookings.db".to_string()
    }

    fn default_sessions_url() -> String {
        "sqlite:sessions.db".to_string()
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("tourdesk");

        let config_path = config_dir.join("config.json");

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'tourdesk init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("tourdesk");

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = config_dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "agent": {
    "model": "gpt-4o-mini",
    "temperature": 0.1,
    "max_tokens": 4096
  },
  "providers": {
    "openai": {
      "api_key": "your-openai-api-key-here"
    }
  },
  "hotels": {
    "api_key": "your-rapidapi-key-here",
    "host": "booking-com15.p.rapidapi.com",
    "currency": "AED",
    "timeout": 20
  },
  "database": {
    "packages_url": "sqlite:tour_packages.db",
    "bookings_url": "sqlite:bookings.db",
    "sessions_url": "sqlite:sessions.db"
  },
  "smtp": {
    "email": "your-sender-address@example.com",
    "password": "your-smtp-app-password",
    "relay": "smtp.gmail.com"
  }
}"#;

        std::fs::write(&config_path, config_template)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your OpenAI and RapidAPI keys");
        println!("   2. Point packages_url at the tour package database");
        println!("   3. Run 'tourdesk chat' to start planning a trip");
        println!();
        println!("🔧 Configuration options:");
        println!("   - agent.model: chat model to use (gpt-4o-mini by default)");
        println!("   - hotels.currency: currency code for hotel prices");
        println!("   - smtp: remove this section to disable confirmation emails");
        println!();
        Ok(())
    }
}
