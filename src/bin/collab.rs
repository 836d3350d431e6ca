use clap::Parser;
use collab_api_rust::cli::{utils::report_error, Cli, OutputFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_format = OutputFormat::from_cli(&cli);

    if let Err(e) = collab_api_rust::cli::run(cli).await {
        let verbose = matches!(std::env::var("CLI_VERBOSE").as_deref(), Ok("true") | Ok("1"));
        report_error(&output_format, &e, verbose)?;
        std::process::exit(1);
    }

    Ok(())
}
