// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_ASSET_PATH, DEFAULT_STATE_FILE};

#[derive(Parser, Debug, Clone)]
#[command(name = "book-viewer")]
#[command(about = "Interactive 3D book viewer", long_about = None)]
pub struct Cli {
    /// Disable the overlay (navigation bar, loading indicator)
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Initial route, e.g. "/scene", "#/about"
    #[arg(long, default_value = "/")]
    pub route: String,

    /// Path to the glTF/GLB scene asset
    #[arg(long, default_value = DEFAULT_ASSET_PATH)]
    pub asset: PathBuf,

    /// File holding the persisted camera transform
    #[arg(long = "state-file", default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Keep camera state in memory only
    #[arg(long = "no-persist", default_value = "false")]
    pub no_persist: bool,
}
