/// trirast - software triangle rasterizer
///
/// `trirast -r <angle> [file]` renders one frame to a PNG (default
/// `output.png`). Without `-r` or a file it opens an interactive view:
///   - a / d: rotate by ±10°
///   - x / y / z: rotation axis
///   - Esc / q: quit
use anyhow::Context;
use tracing::info;
use trirast_terminal::cli::{self, USAGE};
use trirast_terminal::{run_single_frame, AppConfig, TerminalApp};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = cli::parse_args(&args)?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }

    let mut config = match &cli.config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);

    if cli.single_frame() {
        info!(output = %config.output, "rendering single frame");
        run_single_frame(&config)?;
        return Ok(());
    }

    let mut app = TerminalApp::new(&config).context("starting interactive mode")?;
    app.run()
}
