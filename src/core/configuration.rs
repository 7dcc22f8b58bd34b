use actix_errorpage::Urls;
use actix_sanitize::SanitizeOptions;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Configuration {
    pub network: Option<NetworkConfiguration>,
    pub logging: Option<LoggingConfiguration>,
    pub error_pages: Option<ErrorPagesConfiguration>,
    pub sanitize: Option<SanitizeConfiguration>,
    pub cookies: Option<CookiesConfiguration>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct NetworkConfiguration {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct LoggingConfiguration {
    pub level: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ErrorPagesConfiguration {
    pub show_error_details: Option<bool>,
    /// Directory holding `layout.html` and `500.html` overrides
    pub templates: Option<PathBuf>,
    pub urls: Option<Urls>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct SanitizeConfiguration {
    pub query: Option<bool>,
    pub body: Option<bool>,
    pub body_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CookiesConfiguration {
    /// Cookie name patterns made transient
    pub transient: Option<Vec<String>>,
}

impl SanitizeConfiguration {
    /// Build sanitizer options, overriding only the configured values.
    pub fn options(&self) -> SanitizeOptions {
        let mut options = SanitizeOptions::new();
        if let Some(query) = self.query {
            options = options.sanitize_query(query);
        }
        if let Some(body) = self.body {
            options = options.sanitize_body(body);
        }
        if let Some(limit) = self.body_limit {
            options = options.body_limit(limit);
        }
        options
    }
}

impl CookiesConfiguration {
    /// Returns the configured transient cookie patterns.
    pub fn patterns(&self) -> &[String] {
        self.transient.as_deref().unwrap_or_default()
    }
}

pub async fn load_configuration(
    path: &str,
) -> Result<Configuration, Box<dyn std::error::Error + Send + Sync>> {
    let res = tokio::fs::read_to_string(path)
        .await
        .inspect_err(|err| tracing::error!("failed to read configuration file {path}: {err}"))?;

    let config = serde_yaml::from_str::<Configuration>(&res)?;
    Ok(config)
}
