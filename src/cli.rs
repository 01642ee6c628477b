use std::path::PathBuf;

use clap::Parser;

use crate::config::AtlasConfig;

#[derive(Parser, Debug)]
#[command(name = "fontman")]
#[command(version)]
#[command(about = "Rasterize text into a paged glyph atlas", long_about = None)]
#[command(after_help = "\
CONFIG:
    Atlas defaults are read from $XDG_CONFIG_HOME/fontman/config.toml:

        [atlas]
        page_size = 512
        max_pages = 64
        padding = 1

    --page-size and --max-pages override the file.")]
pub struct Cli {
    /// TrueType/OpenType font file or collection
    pub font_path: PathBuf,

    /// Text to lay out
    pub text: String,

    /// Face index inside a font collection
    #[arg(long, default_value_t = 0)]
    pub face: u32,

    /// Font size in points
    #[arg(long, default_value_t = 12)]
    pub size: u32,

    /// Output resolution, 0 for 72
    #[arg(long, default_value_t = 0)]
    pub dpi: u16,

    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Applies command-line overrides on top of `base`.
    pub fn atlas_config(&self, base: AtlasConfig) -> AtlasConfig {
        AtlasConfig {
            page_size: self.page_size.unwrap_or(base.page_size),
            max_pages: self.max_pages.unwrap_or(base.max_pages),
            ..base
        }
    }
}
