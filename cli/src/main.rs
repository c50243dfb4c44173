use clap::Parser;
use std::path::MAIN_SEPARATOR;

mod agent;
mod cli;
mod config;
mod console;
mod error;
mod llm;
mod prompt;
mod step;

#[tokio::main]
async fn main() {
    let f_appender =
        tracing_appender::rolling::hourly(format!(".{}", MAIN_SEPARATOR), "siteclone.log");
    let (non_blk, _guard) = tracing_appender::non_blocking(f_appender);
    tracing_subscriber::fmt()
        .with_env_filter("libsiteclone=debug,siteclone=debug")
        .event_format(tracing_subscriber::fmt::format().pretty())
        .with_writer(non_blk)
        .init();
    let cli = cli::Cli::parse();
    if let Err(e) = cli.run().await {
        tracing::error!("{}", e);
        eprintln!("{}", e);
        drop(_guard);
        std::process::exit(1);
    }
}
