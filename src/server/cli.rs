//! OtaServe CLI Module
//! Command-line surface for the server binary

use clap::Parser;
use std::path::PathBuf;

use crate::server::config::Config;

#[derive(Parser, Debug)]
#[command(name = "otaserve")]
#[command(author = "OtaServe Team")]
#[command(version)]
#[command(about = "Firmware OTA delivery and device log ingestion server", long_about = None)]
pub struct Cli {
    /// Config file (defaults to ./otaserve.config.json when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Directory holding <name>.bin firmware artifacts
    #[arg(long, value_name = "DIR")]
    pub firmware_dir: Option<PathBuf>,

    /// Directory receiving <device>.log files
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(Config::FILE_NAME))
    }

    /// Flags win over whatever the config file said.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(dir) = &self.firmware_dir {
            config.paths.firmware_dir = dir.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.paths.log_dir = dir.clone();
        }
    }
}
