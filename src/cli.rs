use std::path::PathBuf;

use clap::Parser;

/// Lawn-care business manager: clients, jobs, and income reports.
#[derive(Debug, Parser)]
#[command(name = "lawncare-manager", version)]
pub struct Args {
    /// Data directory override; takes precedence over LAWNCARE_DATA_DIR.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}
