use anyhow::Result;
use serde::Deserialize;
use slog::{Logger, error, info};
use std::fs;

/// One X2 link between two stations, as listed in the topology file.
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct X2Link {
    pub a: u32,
    pub b: u32,
}

#[derive(Deserialize, Debug)]
struct TopologyFile {
    #[serde(default)]
    x2_links: Vec<X2Link>,
}

/// Load the X2 neighbor links from file into memory.
pub fn load_topology_file(filename: &str, logger: &Logger) -> Result<Vec<X2Link>> {
    let path = std::env::current_dir()?;
    let contents = fs::read_to_string(filename).inspect_err(|e| {
        error!(
            logger,
            "Failed to load topology file {filename} (current directory {}) with error code {e}",
            path.display()
        )
    })?;
    let parsed: TopologyFile = toml::from_str(&contents)?;
    for link in &parsed.x2_links {
        info!(logger, "Loaded X2 link {}-{} from {filename}", link.a, link.b);
    }
    Ok(parsed.x2_links)
}
