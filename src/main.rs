mod app;
mod cast;
mod util;

use std::path::PathBuf;

use clap::Parser;

use app::{AppConfig, PhysicsConfig, clamp_to};
use cast::EntitySource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Character file (JSON array, single object, or `{"characters": [...]}`).
    /// Shows the bundled sample cast when omitted.
    path: Option<PathBuf>,

    /// Default log filter; `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Width of the hover detail panel in pixels.
    #[arg(long, default_value_t = 300.0)]
    overlay_width: f32,

    #[arg(long)]
    rest_length: Option<f32>,

    #[arg(long)]
    repulsion: Option<f32>,

    /// Fraction of velocity kept per step, below 1.
    #[arg(long)]
    damping: Option<f32>,
}

impl Args {
    /// Flags are clamped to the same bounds the tuning sliders use, so the
    /// first frame never snaps a value back.
    fn app_config(&self) -> AppConfig {
        let defaults = PhysicsConfig::default();
        AppConfig {
            physics: PhysicsConfig {
                rest_length: self.rest_length.unwrap_or(defaults.rest_length),
                repulsion: self.repulsion.unwrap_or(defaults.repulsion),
                damping: self.damping.unwrap_or(defaults.damping),
                ..defaults
            }
            .clamped(),
            overlay_width: clamp_to(self.overlay_width, AppConfig::OVERLAY_WIDTH_RANGE),
            ..AppConfig::default()
        }
    }

    fn source(&self) -> EntitySource {
        match &self.path {
            Some(path) => EntitySource::File(path.clone()),
            None => EntitySource::Sample,
        }
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp_secs()
        .init();

    let config = args.app_config();
    let source = args.source();
    log::info!("starting with {}", source.describe());

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "cast-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::CastGraphApp::new(cc, source, config)))),
    )
}
