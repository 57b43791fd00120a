use chrono::FixedOffset;

use crate::{Error, Result};

/// Runtime configuration, sourced from the environment at startup.
///
/// Datadog credentials are required; everything else has a default. A
/// missing GitLab token disables code resolution and issue filing instead
/// of failing: `gitlab` is simply `None`.
#[derive(Debug, Clone)]
pub struct Config {
    pub datadog: DatadogConfig,
    pub gitlab: Option<GitlabConfig>,
    /// Fixed reference timezone for query windows, independent of the
    /// host's local clock.
    pub reference_tz: FixedOffset,
    /// Package marker identifying application frames in stack traces.
    pub package_marker: String,
    /// How many ranked records to surface for review.
    pub top_n: usize,
    /// Alternate branch tried when a coordinate's branch yields 404.
    pub fallback_branch: String,
    /// Cap on criteria-extraction attempts before giving up.
    pub max_extract_attempts: u32,
}

#[derive(Debug, Clone)]
pub struct DatadogConfig {
    pub api_key: String,
    pub app_key: String,
    pub site: String,
}

#[derive(Debug, Clone)]
pub struct GitlabConfig {
    pub token: String,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_key = require_env("DD_API_KEY")?;
        let app_key = require_env("DD_APP_KEY")?;
        let site = env_or("DD_SITE", "datadoghq.eu");

        let gitlab = match std::env::var("GITLAB_TOKEN") {
            Ok(token) if !token.is_empty() => Some(GitlabConfig {
                token,
                base_url: env_or("GITLAB_API_URL", "https://git.cardev.de/api/v4"),
            }),
            _ => None,
        };

        let tz_raw = env_or("LOGTRIAGE_TZ_OFFSET", "+01:00");
        let reference_tz = parse_offset(&tz_raw)
            .ok_or_else(|| Error::Config(format!("invalid LOGTRIAGE_TZ_OFFSET {:?}", tz_raw)))?;

        let top_n = parse_positive("LOGTRIAGE_TOP_N", &env_or("LOGTRIAGE_TOP_N", "15"))?;
        let max_extract_attempts = env_or("LOGTRIAGE_MAX_EXTRACT_ATTEMPTS", "5")
            .parse()
            .map_err(|_| {
                Error::Config("LOGTRIAGE_MAX_EXTRACT_ATTEMPTS must be an integer".to_string())
            })?;

        Ok(Self {
            datadog: DatadogConfig {
                api_key,
                app_key,
                site,
            },
            gitlab,
            reference_tz,
            package_marker: env_or("LOGTRIAGE_PACKAGE_MARKER", "de.carsync."),
            top_n,
            fallback_branch: env_or("LOGTRIAGE_FALLBACK_BRANCH", "master"),
            max_extract_attempts,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Config(format!("{} is not set", name))),
    }
}

/// Parse a strictly positive integer setting. Zero is rejected: a top-N of
/// zero would silently end every session empty.
fn parse_positive(name: &str, value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Config(format!(
            "{} must be a positive integer, got {:?}",
            name, value
        ))),
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).ok().filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
}

/// Parse a `+HH:MM` / `-HH:MM` offset string.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => (1, raw),
    };
    let (hours, minutes) = rest.split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
