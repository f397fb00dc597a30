//! Command-line interface for Vitals.
//!
//! Run `vitals` to start collecting with sensible defaults; everything is
//! overridable via flags, environment variables, or a YAML config file.

use crate::core::config::ConfigBuilder;
use crate::core::{Config, Result, VitalsError};
use crate::Application;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Self-hosted real-user-monitoring collector.
#[derive(Parser, Debug)]
#[command(name = "vitals")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// HTTP port for the beacon and summary endpoints
    #[arg(short, long, env = "VITALS_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long, env = "VITALS_BIND")]
    pub bind: Option<IpAddr>,

    /// Maximum number of events held in memory
    #[arg(long, env = "VITALS_CAPACITY")]
    pub capacity: Option<usize>,

    /// Event retention window in seconds
    #[arg(long, env = "VITALS_RETENTION_SECS")]
    pub retention_secs: Option<u64>,

    /// Probability that a beacon request is accepted (0.0 to 1.0)
    #[arg(long, env = "VITALS_SAMPLE_RATE")]
    pub sample_rate: Option<f64>,

    /// Bearer token for the summary endpoint
    #[arg(long, env = "VITALS_ADMIN_TOKEN", hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Configuration file path (default: ~/.config/vitals/config.yaml)
    #[arg(short, long, env = "VITALS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, env = "VITALS_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables
    /// 3. Config file
    /// 4. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let default_path = dirs::config_dir().map(|d| d.join("vitals").join("config.yaml"));
        self.load_config_from(default_path).await
    }

    /// Load configuration, using `default_path` as the fallback config file
    /// when no `--config` was given. Tests inject a temp path here so they
    /// never read the ambient user config.
    pub async fn load_config_from(&self, default_path: Option<PathBuf>) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = if let Some(path) = &self.config {
            path.clone()
        } else {
            match default_path {
                Some(path) if path.exists() => path,
                _ => return self.build_config_from_args(builder),
            }
        };

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                builder = builder.from_yaml(&content)?;
                tracing::info!("Loaded configuration from: {:?}", config_path);
            },
            Err(e) if self.config.is_some() => {
                // User explicitly specified a config file that doesn't exist
                return Err(VitalsError::config(format!(
                    "Failed to read config file {:?}: {}",
                    config_path, e
                )));
            },
            Err(_) => {
                tracing::debug!("No config file found at {:?}, using defaults", config_path);
            },
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        // CLI arguments override everything
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(bind) = self.bind {
            builder = builder.bind_address(bind);
        }
        if let Some(capacity) = self.capacity {
            builder = builder.capacity(capacity);
        }
        if let Some(secs) = self.retention_secs {
            builder = builder.retention(Duration::from_secs(secs));
        }
        if let Some(rate) = self.sample_rate {
            builder = builder.sampling_rate(rate);
        }
        if let Some(token) = &self.admin_token {
            builder = builder.admin_token(Some(token.clone()));
        }

        builder.debug(self.debug).build()
    }

    /// Initialize logging based on configuration.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let log_level = if self.debug {
            "debug"
        } else {
            config.logging.level.as_str()
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer().with_target(false).compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| VitalsError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the CLI command.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;
    cli.init_logging(&config)?;

    if cli.check_config {
        println!("Configuration OK");
        println!("{}", serde_yaml::to_string(&config).unwrap_or_default());
        return Ok(());
    }

    let app = Application::new(config)?;
    app.run().await
}
