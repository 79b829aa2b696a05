use serde::Deserialize;
use std::path::PathBuf;
use strata_world::{AttentionConfig, DecodeConfig};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Directory holding the `r.{x}.{z}.mca` region files.
    pub region_path: PathBuf,
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub attention: AttentionConfig,
}

impl Config {
    pub fn read_file(path: &str) -> Result<Self, ron::Error> {
        let reader = std::fs::File::open(path)?;

        ron::de::from_reader(reader)
    }
}
