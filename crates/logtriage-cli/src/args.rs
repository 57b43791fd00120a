use clap::Parser;

/// A flat CLI: one tool, one job. Credentials and tuning come from the
/// environment (see `Config::from_env`), not from flags.
#[derive(Parser)]
#[command(name = "logtriage")]
#[command(about = "Triage production error logs: filter, rank, locate code, analyze", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Natural-language request, e.g. "errors in the document service on prod, last 24 hours"
    #[arg(required = true, num_args = 1..)]
    pub request: Vec<String>,

    /// Log verbosity (overridden by RUST_LOG when set)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// The request words joined back into one sentence.
    pub fn request_text(&self) -> String {
        self.request.join(" ")
    }
}
