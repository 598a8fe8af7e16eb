use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub mail: MailConfig,
    pub admission: AdmissionConfig,
    pub admin: AdminConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            mail: MailConfig::load()?,
            admission: AdmissionConfig::load()?,
            admin: AdminConfig::load()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Outbound SMTP settings and the staff recipient list.
///
/// An incomplete mail configuration does not abort startup: the server still
/// binds so operators can reach `/health`, but readiness stays false and
/// submissions fail the recipient check with a 5xx.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_sender: Option<String>,
    pub notification_recipients: Vec<String>,
}

impl MailConfig {
    fn load() -> Result<Self, ConfigError> {
        let server = env::var("MAIL_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string());
        let port = env::var("MAIL_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidMailPort)?;
        let use_tls = env::var("MAIL_USE_TLS")
            .map(|raw| parse_bool(&raw))
            .unwrap_or(true);

        let username = env::var("MAIL_USERNAME")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let password = env::var("MAIL_PASSWORD")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let default_sender = env::var("MAIL_DEFAULT_SENDER")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let notification_recipients = env::var("NOTIFICATION_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(|addr| addr.trim().to_string())
                    .filter(|addr| !addr.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server,
            port,
            use_tls,
            username,
            password,
            default_sender,
            notification_recipients,
        })
    }

    /// Whether every value required for outbound delivery is present.
    pub fn is_complete(&self) -> bool {
        self.default_sender.is_some() && !self.notification_recipients.is_empty()
    }
}

/// Knobs for the contact-form admission pipeline.
///
/// The canonical policy is the strict contact-endpoint variant: 3 submissions
/// per minute per client address, phone required, 1 KiB body cap.
#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    pub contact_rate_limit: u32,
    pub rate_window: Duration,
    pub max_body_bytes: u64,
    pub require_phone: bool,
}

impl AdmissionConfig {
    fn load() -> Result<Self, ConfigError> {
        let contact_rate_limit = env::var("CONTACT_RATE_LIMIT")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidRateLimit)?;
        let window_secs = env::var("RATE_WINDOW_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidRateWindow)?;
        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "1024".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidBodyCap)?;
        let require_phone = env::var("CONTACT_REQUIRE_PHONE")
            .map(|raw| parse_bool(&raw))
            .unwrap_or(true);

        Ok(Self {
            contact_rate_limit,
            rate_window: Duration::from_secs(window_secs),
            max_body_bytes,
            require_phone,
        })
    }
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            contact_rate_limit: 3,
            rate_window: Duration::from_secs(60),
            max_body_bytes: 1024,
            require_phone: true,
        }
    }
}

/// Admin session settings. Login is disabled entirely when no password is set.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub password: Option<String>,
    pub session_ttl: Duration,
}

impl AdminConfig {
    fn load() -> Result<Self, ConfigError> {
        let password = env::var("ADMIN_PASSWORD")
            .ok()
            .filter(|value| !value.is_empty());
        let ttl_secs = env::var("ADMIN_SESSION_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSessionTtl)?;

        Ok(Self {
            password,
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidMailPort,
    InvalidRateLimit,
    InvalidRateWindow,
    InvalidBodyCap,
    InvalidSessionTtl,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidMailPort => write!(f, "MAIL_PORT must be a valid u16"),
            ConfigError::InvalidRateLimit => write!(f, "CONTACT_RATE_LIMIT must be a valid u32"),
            ConfigError::InvalidRateWindow => {
                write!(f, "RATE_WINDOW_SECS must be a whole number of seconds")
            }
            ConfigError::InvalidBodyCap => write!(f, "MAX_BODY_BYTES must be a valid byte count"),
            ConfigError::InvalidSessionTtl => {
                write!(f, "ADMIN_SESSION_TTL_SECS must be a whole number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
