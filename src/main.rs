mod app;
mod cmdb;
mod util;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cmdb::TraversalMode;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// CMDB export to visualize (JSON with `items` and `relationships`).
    #[arg(long)]
    snapshot: String,

    /// Root configuration item; defaults to the busiest parent in the file.
    #[arg(long)]
    root: Option<String>,

    #[arg(long, value_enum, default_value_t = TraversalMode::Forward)]
    mode: TraversalMode,

    #[arg(long, default_value_t = 3)]
    max_depth: u32,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ci-atlas",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::CiAtlasApp::new(
                cc,
                args.snapshot.clone(),
                app::GraphQuery {
                    root_id: args.root.clone(),
                    mode: args.mode,
                    max_depth: args.max_depth,
                },
            )))
        }),
    )
}
