//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;
use slngen::core::LibVariant;
use slngen::util::config::DEFAULT_VS_VERSION;

/// slngen - Visual Studio solution and project generator for FLINT
#[derive(Parser)]
#[command(name = "slngen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Visual Studio toolset selector (17, 19, 22)
    #[arg(value_name = "VERSION", default_value_t = DEFAULT_VS_VERSION)]
    pub vs_version: u32,

    /// Source root (defaults to the current directory)
    #[arg(long, default_value = ".", env = "SLNGEN_ROOT")]
    pub root: PathBuf,

    /// Generate one project per test program
    #[arg(long)]
    pub tests: bool,

    /// Generate one project per profiling program
    #[arg(long)]
    pub profiles: bool,

    /// Memory-management variant (gc, single, reentrant)
    #[arg(long)]
    pub variant: Option<LibVariant>,

    /// Print the classified source inventory as JSON and exit
    #[arg(long)]
    pub list: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
