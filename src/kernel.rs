use crate::{
    core::{
        cli,
        configuration::{self, Configuration},
        logging,
    },
    net::http_adapter::HttpAdapter,
};
use clap::Parser;

const DEFAULT_CONFIGURATION_PATH: &str = "guardhub.yaml";

/// boot up the application kernel
/// ``` rust,ignore
/// let krn = kernel::boot().await?;
/// ```
pub async fn boot() -> std::io::Result<Kernel> {
    let cli = cli::Cli::parse();

    let path = cli
        .configuration_path
        .unwrap_or_else(|| DEFAULT_CONFIGURATION_PATH.to_string());
    let conf = configuration::load_configuration(&path)
        .await
        .map_err(std::io::Error::other)?;

    logging::init(conf.logging.as_ref());
    tracing::debug!("loaded configuration from {path}");

    Ok(Kernel::new(conf))
}

/// The application kernel, responsible for managing the application's lifecycle and providing access to its core components.
pub struct Kernel {
    configuration: Configuration,
}

impl Kernel {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    pub fn setup_http_adapter(&self) -> HttpAdapter<'_> {
        HttpAdapter::new(&self.configuration)
    }
}
