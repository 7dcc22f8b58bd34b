use clap::{Parser, command};

#[derive(Parser)]
#[command(version, about = "Error, sanitization and cookie guarding http hub", long_about = None)]
pub struct Cli {
    /// Path of the YAML configuration file
    #[arg(short, long)]
    pub configuration_path: Option<String>,
}
