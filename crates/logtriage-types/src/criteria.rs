use serde::{Deserialize, Serialize};

/// Filter criteria extracted from the operator's request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub project_name: String,
    pub log_level: String,
    pub time_period_hours: i64,
    pub environment: String,
}

/// Widest accepted query window: one year of hours.
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

impl FilterCriteria {
    /// Validate and canonicalize extracted criteria.
    ///
    /// Returns a human-readable reason on rejection so the workflow can
    /// relay it to the operator at the clarification suspension point.
    pub fn validated(mut self) -> Result<Self, String> {
        if self.project_name.trim().is_empty() {
            return Err("project name is missing".to_string());
        }
        if self.log_level.trim().is_empty() {
            return Err("log level is missing".to_string());
        }
        if self.time_period_hours <= 0 {
            return Err(format!(
                "time period must be a positive number of hours, got {}",
                self.time_period_hours
            ));
        }
        if self.time_period_hours > MAX_WINDOW_HOURS {
            return Err(format!(
                "time period must be at most {} hours, got {}",
                MAX_WINDOW_HOURS, self.time_period_hours
            ));
        }
        self.environment = normalize_environment(&self.environment);
        Ok(self)
    }
}

/// Normalize an environment name into one of `prod`, `staging`, `dev`.
///
/// Matching is case-insensitive over a fixed synonym table. Unrecognized
/// values pass through unchanged (lowercased, trimmed); the backend query
/// will simply match nothing for them.
pub fn normalize_environment(env: &str) -> String {
    let env = env.trim().to_lowercase();
    match env.as_str() {
        "prod" | "production" | "real" | "main" | "master" | "live" => "prod".to_string(),
        "stag" | "stage" | "staging" => "staging".to_string(),
        "dev" | "development" => "dev".to_string(),
        _ => env,
    }
}
