use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub queue_name: String,
    pub topic_name: Option<String>,
    pub polling_period: Duration,
    pub max_messages: i32,
    pub customers_table: String,
    pub orders_table: String,
    pub email_index: String,
    pub images_bucket: String,
    pub github_api_base_url: String,
    pub bind_addr: String,
    pub environment: String,
    pub app_name: String,
    pub secrets_enabled: bool,
    pub secrets_polling_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let max_messages: i32 = parse_var("QUEUE_MAX_MESSAGES", 3)?;
        if !(1..=10).contains(&max_messages) {
            return Err(format!(
                "QUEUE_MAX_MESSAGES: must be between 1 and 10, got {max_messages}"
            ));
        }

        Ok(Self {
            queue_name: var_or("QUEUE_NAME", "customers"),
            topic_name: env::var("TOPIC_NAME").ok().filter(|t| !t.trim().is_empty()),
            polling_period: parse_period("QUEUE_POLLING_PERIOD_SECS", 3)?,
            max_messages,
            customers_table: var_or("CUSTOMERS_TABLE", "customers"),
            orders_table: var_or("ORDERS_TABLE", "orders"),
            email_index: var_or("CUSTOMERS_EMAIL_INDEX", "email-id-index"),
            images_bucket: var_or("IMAGES_BUCKET", "customers-images"),
            github_api_base_url: var_or("GITHUB_API_BASE_URL", "https://api.github.com"),
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:8080"),
            environment: var_or("APP_ENVIRONMENT", "Development"),
            app_name: var_or("APP_NAME", "Customers.Api"),
            secrets_enabled: parse_var("SECRETS_ENABLED", false)?,
            secrets_polling_interval: parse_period("SECRETS_POLLING_INTERVAL_SECS", 36_000)?,
        })
    }

    /// Prefix that config secrets must carry, e.g. `Development_Customers.Api`.
    pub fn secrets_prefix(&self) -> String {
        format!("{}_{}", self.environment, self.app_name)
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("{name}: {e}")),
        Err(_) => Ok(default),
    }
}

fn parse_period(name: &str, default_secs: u64) -> Result<Duration, String> {
    positive_secs(name, parse_var(name, default_secs)?)
}

fn positive_secs(name: &str, secs: u64) -> Result<Duration, String> {
    if secs == 0 {
        return Err(format!("{name}: must be at least 1 second, got 0"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_falls_back_to_default() {
        let value: u64 = parse_var("CUSTOMERS_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_zero_period_is_rejected() {
        assert_eq!(
            positive_secs("QUEUE_POLLING_PERIOD_SECS", 0),
            Err("QUEUE_POLLING_PERIOD_SECS: must be at least 1 second, got 0".to_string())
        );
        assert_eq!(
            positive_secs("SECRETS_POLLING_INTERVAL_SECS", 5),
            Ok(Duration::from_secs(5))
        );
    }

    #[test]
    fn test_unset_period_uses_default() {
        assert_eq!(
            parse_period("CUSTOMERS_TEST_UNSET_PERIOD", 3),
            Ok(Duration::from_secs(3))
        );
    }

    #[test]
    fn test_secrets_prefix_joins_environment_and_app() {
        let config = AppConfig {
            queue_name: "customers".into(),
            topic_name: None,
            polling_period: Duration::from_secs(3),
            max_messages: 3,
            customers_table: "customers".into(),
            orders_table: "orders".into(),
            email_index: "email-id-index".into(),
            images_bucket: "bucket".into(),
            github_api_base_url: "https://api.github.com".into(),
            bind_addr: "127.0.0.1:0".into(),
            environment: "Production".into(),
            app_name: "Customers.Api".into(),
            secrets_enabled: false,
            secrets_polling_interval: Duration::from_secs(60),
        };
        assert_eq!(config.secrets_prefix(), "Production_Customers.Api");
    }
}
