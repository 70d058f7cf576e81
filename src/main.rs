use anyhow::Result;
use clap::Parser;

use genui_rs::cli;
use genui_rs::server::serve;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = cli::Args::parse();
    let config = args.into_config()?;

    serve(config).await
}
