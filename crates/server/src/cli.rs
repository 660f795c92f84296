use crate::config::AppConfig;
use crate::state::AppState;
use crate::{server, telemetry};
use anyhow::Context;
use application_form::parse_application_id;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "form-server",
    about = "Serve or render filled job application forms",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Render one application from the seed data to a file
    Render(RenderArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Application to render
    #[arg(long)]
    application_id: String,
    /// Output file (defaults to application_<id>.pdf)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Render(args) => render(&config, args),
    }
}

fn render(config: &AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    let id = parse_application_id(&args.application_id)?;
    let state = AppState::from_config(&config.forms)?;
    let pdf = state.generator.generate(id)?;

    let output = args.output.unwrap_or_else(|| PathBuf::from(&pdf.filename));
    std::fs::write(&output, &pdf.bytes).with_context(|| format!("failed to write {}", output.display()))?;

    println!("Wrote {} ({} bytes)", output.display(), pdf.bytes.len());
    Ok(())
}
