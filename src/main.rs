mod api;
mod catalog;
mod llm;
mod reply;
mod session;
mod settings;
mod upload;
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use crate::{
    catalog::Catalog,
    llm::GeminiClient,
    settings::{Args, Settings},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let settings = Settings::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    if settings.llm.api_key().is_none() {
        warn!("No API key configured; chat questions will be answered with a configuration notice");
    }
    let client = GeminiClient::new(&settings.llm).context("failed to build model client")?;
    let catalog = Arc::new(Catalog::with_sample_data());
    let schema = api::schema(Arc::new(client), catalog, settings.upload.stage_delay());

    info!(address = %settings.web.address, model = %settings.llm.model, "Compliance dashboard server starting");
    let tls = args.cert.as_deref().zip(args.key.as_deref());
    web::serve(schema, settings.web.address, tls).await;
    Ok(())
}
