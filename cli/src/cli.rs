use crate::agent::Agent;
use crate::config::ModelConfig;
use crate::console::ReadlineConsole;
use crate::error::Result;
use crate::llm::OpenAiCompatClient;
use clap::{Args, Parser, Subcommand};
use libsiteclone::{capture, CaptureRule, ToolRegistry};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A website cloning agent",
    long_about = "Clones web pages for offline viewing, either directly or through a model \
    driven agent that can scrape pages, download assets and write files."
)]
pub struct Cli {
    #[command(flatten)]
    capture: CaptureArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Clone one page and its assets without involving a model.
    Clone {
        url: Url,
        output_directory: PathBuf,
    },
    /// Chat with the agent (default).
    Agent {
        /// First request; prompted for when omitted.
        query: Option<String>,
    },
}

#[derive(Args, Debug)]
struct CaptureArgs {
    #[arg(long, global = true, help = "Chrome/Chromium executable to use.")]
    chrome_path: Option<PathBuf>,
    #[arg(long, global = true, help = "Show the browser window.")]
    headful: bool,
    #[arg(
        long,
        global = true,
        default_value = "0",
        help = "Connections allowed to stay open while the page counts as loaded."
    )]
    idle_connections: usize,
    #[arg(
        long,
        global = true,
        default_value = "500",
        help = "Milliseconds the network has to stay idle before capture."
    )]
    idle_ms: u64,
    #[arg(
        long,
        global = true,
        help = "Give up navigation after this many seconds. Unbounded by default."
    )]
    navigation_timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        default_value = "1",
        help = "Asset downloads to run at once."
    )]
    max_concurrent_downloads: usize,
}

impl CaptureArgs {
    fn rule(&self) -> CaptureRule {
        CaptureRule {
            chrome_executable: self.chrome_path.clone(),
            headless: !self.headful,
            idle_connections: self.idle_connections,
            idle_period: Duration::from_millis(self.idle_ms),
            navigation_timeout: self.navigation_timeout.map(Duration::from_secs),
            max_concurrent_downloads: self.max_concurrent_downloads,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let rule = self.capture.rule();
        match self.command {
            Some(Command::Clone {
                url,
                output_directory,
            }) => {
                println!("Cloning {} ....", url);
                let outcome = capture(url.as_str(), &output_directory, &rule).await;
                if outcome.success {
                    println!("{}", outcome.message.bright_green());
                } else {
                    println!("Clone wasn't able to complete");
                    println!("{}", outcome.message.bright_red());
                }
                Ok(())
            }
            Some(Command::Agent { query }) => run_agent(rule, query).await,
            None => run_agent(rule, None).await,
        }
    }
}

async fn run_agent(rule: CaptureRule, query: Option<String>) -> Result<()> {
    let model = OpenAiCompatClient::new(ModelConfig::from_env()?)?;
    let console = ReadlineConsole::new()?;
    println!("Welcome to siteclone!");
    let mut agent = Agent::new(model, console, ToolRegistry::with_builtin_tools(rule));
    agent.run(query).await?;
    println!("Thanks for stopping by!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_subcommand_with_capture_options() {
        let cli = Cli::parse_from([
            "siteclone",
            "clone",
            "https://example.test/",
            "out",
            "--idle-connections",
            "2",
            "--max-concurrent-downloads",
            "4",
        ]);
        let rule = cli.capture.rule();
        assert_eq!(rule.idle_connections, 2);
        assert_eq!(rule.max_concurrent_downloads, 4);
        assert!(rule.headless);
        assert!(rule.navigation_timeout.is_none());
        assert!(matches!(cli.command, Some(Command::Clone { .. })));
    }

    #[test]
    fn test_agent_is_default() {
        let cli = Cli::parse_from(["siteclone"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.capture.rule().idle_period, Duration::from_millis(500));
    }
}
