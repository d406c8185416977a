use std::path::PathBuf;

use anyhow::{bail, Result};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_file: PathBuf,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("CURATOR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let data_file = std::env::var("CURATOR_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/dataset.json"));
        let static_dir = std::env::var("CURATOR_STATIC_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        // fail fast, fail loud
        if data_file.as_os_str().is_empty() || data_file.is_dir() {
            bail!("CURATOR_DATA_FILE must point to a file, got {}", data_file.display());
        }
        if let Some(dir) = &static_dir {
            if !dir.is_dir() {
                bail!("CURATOR_STATIC_DIR is not a directory: {}", dir.display());
            }
        }

        Ok(Self {
            bind_addr,
            data_file,
            static_dir,
        })
    }
}
