mod args;
mod assistant;
mod prompts;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use logtriage_providers::DatadogClient;
use logtriage_runtime::{
    Config, GitlabClient, Outcome, Prompt, SourceControl, Turn, Workflow, WorkflowOptions,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

pub use args::Cli;
pub use assistant::ChatAssistant;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(&cli.log_level);

    let config = Config::from_env()?;
    let backend = DatadogClient::for_site(
        &config.datadog.site,
        config.datadog.api_key.clone(),
        config.datadog.app_key.clone(),
        config.reference_tz.to_string(),
    )?;
    let assistant = ChatAssistant::from_env()?;

    let source: Option<Arc<dyn SourceControl>> = match &config.gitlab {
        Some(gitlab) => Some(Arc::new(GitlabClient::new(
            gitlab.base_url.clone(),
            gitlab.token.clone(),
            config.fallback_branch.clone(),
        )?)),
        None => {
            warn!("GITLAB_TOKEN is not set, code resolution and issue filing are disabled");
            None
        }
    };

    let workflow = Workflow::new(
        Arc::new(backend),
        Arc::new(assistant),
        source,
        WorkflowOptions::from_config(&config),
    );

    let mut turn = workflow.start(&cli.request_text()).await?;
    loop {
        match turn {
            Turn::Suspended { state, prompt } => {
                let text = match &prompt {
                    Prompt::Clarify(question) => question,
                    Prompt::SelectRecord(listing) => listing,
                    Prompt::ConfirmIssue(confirmation) => confirmation,
                };
                println!("{}", text);
                let reply = read_reply()?;
                turn = workflow.resume(state, &reply).await?;
            }
            Turn::Finished { outcome, .. } => {
                match outcome {
                    Outcome::Empty => println!("No logs matched the criteria."),
                    Outcome::GaveUp => {
                        println!("Could not pin down filter criteria, giving up.")
                    }
                    Outcome::Report {
                        analysis,
                        issue_filed,
                    } => {
                        println!("{}", analysis);
                        if issue_filed {
                            println!("\nGitLab issue created.");
                        }
                    }
                }
                return Ok(());
            }
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_reply() -> anyhow::Result<String> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    // Zero bytes read means stdin closed mid-session.
    if io::stdin().lock().read_line(&mut line)? == 0 {
        anyhow::bail!("stdin closed while waiting for a reply");
    }
    Ok(line.trim().to_string())
}
