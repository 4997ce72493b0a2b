use std::path::PathBuf;

use clap::Parser;
use vitrine_engine::device::GpuInit;
use vitrine_engine::logging::{init_logging, LoggingConfig};
use vitrine_engine::scene::label::load_font;
use vitrine_engine::window::{Runtime, RuntimeConfig};

mod app;
mod demos;
mod error;
mod switcher;

use app::Gallery;
use demos::DEMOS;
use error::GalleryError;

/// Real-time 3D demo gallery.
///
/// Left/Right arrows switch demos by relaunching the process; Escape quits.
/// Drag to orbit, scroll to zoom, `h` toggles the grid and axes.
#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about)]
struct Cli {
    /// Demo to open, counted from 0.
    #[arg(long = "demo-index", default_value_t = 0, allow_negative_numbers = true)]
    demo_index: i64,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,

    /// Font for text labels. Demos that need one show a notice without it.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print the demo table and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.log {
        Some(filter) => LoggingConfig::with_filter(filter),
        None => LoggingConfig::default(),
    });

    if cli.list {
        for (i, demo) in DEMOS.iter().enumerate() {
            println!("{i:>3}  {}  {}", demo.name, demo.description);
        }
        return Ok(());
    }

    let index = demos::resolve(cli.demo_index)?;
    let font = match &cli.font {
        Some(path) => Some(load_font(path).map_err(|e| GalleryError::Font {
            path: path.clone(),
            reason: format!("{e:#}"),
        })?),
        None => None,
    };

    let config = RuntimeConfig {
        title: format!("vitrine · {}", DEMOS[index].name),
        ..RuntimeConfig::default()
    };
    Runtime::run(config, GpuInit::default(), Gallery::new(index, font))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_index_parses() {
        let cli = Cli::try_parse_from(["vitrine", "--demo-index", "-1"]).unwrap();
        assert_eq!(cli.demo_index, -1);
        assert!(demos::resolve(cli.demo_index).is_err());
    }

    #[test]
    fn defaults_open_the_first_demo() {
        let cli = Cli::try_parse_from(["vitrine"]).unwrap();
        assert_eq!(cli.demo_index, 0);
        assert!(!cli.list);
        assert!(cli.font.is_none());
    }
}
