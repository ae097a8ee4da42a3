use crate::modules::{config::Config, models::request::WrappedRequest, state::AppState};
use anyhow::{Context, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct WrappedArgs {
    /// Codeforces handle to summarize
    handle: String,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

pub async fn run(args: WrappedArgs) -> Result<()> {
    let handle = WrappedRequest::new(&args.handle).into_handle()?;

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    let stats = state.generator.generate(&handle).await.with_context(|| {
        let message = format!("couldn't generate wrapped statistics of {}", handle);
        tracing::error!(message);
        message
    })?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&stats)?
    } else {
        serde_json::to_string(&stats)?
    };
    println!("{}", output);

    Ok(())
}
