use logtriage_types::{CodeCoordinate, LogRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::gitlab::FetchError;
use crate::traits::SourceControl;

/// A coordinate confirmed to exist, together with the content that proved
/// it. Resolution and existence-check are coupled on purpose: the resolver
/// never hands out a dead link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedCode {
    pub coordinate: CodeCoordinate,
    pub url: String,
    pub content: String,
}

/// Derives source-repository coordinates from a record's trace lines (or an
/// explicit hint) and confirms each against the source-control API.
pub struct Resolver<'a> {
    source: &'a dyn SourceControl,
    default_branch: String,
}

impl<'a> Resolver<'a> {
    pub fn new(source: &'a dyn SourceControl, default_branch: impl Into<String>) -> Self {
        Self {
            source,
            default_branch: default_branch.into(),
        }
    }

    /// Resolve candidate coordinates for a record, most-likely-first.
    ///
    /// For every mined file path, project candidates are tried in a fixed
    /// order (literal appname, then its `eco/` namespace form); the first
    /// confirmed hit wins for that path and the ordering of confirmed
    /// results is never rearranged afterwards. Both candidates missing is
    /// not an error: the path just yields nothing.
    pub async fn resolve(
        &self,
        record: &LogRecord,
        hint: Option<&CodeCoordinate>,
    ) -> Vec<ResolvedCode> {
        let branch = hint
            .map(|h| h.branch.clone())
            .or_else(|| record.branch.clone())
            .unwrap_or_else(|| self.default_branch.clone());

        let (paths, projects) = match hint {
            Some(hint) => (
                vec![source_root_path(&normalize_dotted_path(&hint.file_path))],
                project_candidates(&hint.project),
            ),
            None => {
                let Some(appname) = record.appname.as_deref() else {
                    debug!("record has no appname, skipping code resolution");
                    return Vec::new();
                };
                let paths = mine_paths(&record.trace_lines())
                    .into_iter()
                    .map(|p| source_root_path(&p))
                    .collect();
                (paths, project_candidates(appname))
            }
        };

        let mut resolved: Vec<ResolvedCode> = Vec::new();
        for path in paths {
            for project in &projects {
                let coordinate = CodeCoordinate::new(project.clone(), path.clone(), branch.clone());
                match self.source.fetch_raw(&coordinate).await {
                    Ok(success) => {
                        if resolved.iter().any(|r| r.url == success.url) {
                            break;
                        }
                        resolved.push(ResolvedCode {
                            coordinate: CodeCoordinate {
                                branch: success.branch.clone(),
                                ..coordinate
                            },
                            url: success.url,
                            content: success.content,
                        });
                        break;
                    }
                    Err(FetchError::NotFound) => continue,
                    Err(err) => {
                        warn!(%coordinate, %err, "skipping candidate");
                        continue;
                    }
                }
            }
        }
        resolved
    }
}

/// Project candidates in resolution order: the literal name first, then
/// exactly one `eco/` namespace form (`eco-foo` rewrites to `eco/foo`,
/// anything else gets the `eco/` prefix).
fn project_candidates(appname: &str) -> Vec<String> {
    let eco_form = match appname.strip_prefix("eco-") {
        Some(rest) => format!("eco/{}", rest),
        None if appname.starts_with("eco/") => appname.to_string(),
        None => format!("eco/{}", appname),
    };
    let mut candidates = vec![appname.to_string()];
    if eco_form != appname {
        candidates.push(eco_form);
    }
    candidates
}

/// Convert a class-style dotted path ending in `.java`/`.py` to a
/// slash-separated path; anything else passes through unchanged.
fn normalize_dotted_path(path: &str) -> String {
    if path.contains('/') {
        return path.to_string();
    }
    match path.rsplit_once('.') {
        Some((base, ext @ ("java" | "py"))) => format!("{}.{}", base.replace('.', "/"), ext),
        _ => path.to_string(),
    }
}

/// Apply the multi-module Java source-root heuristic: with at least four
/// path segments, the 4th token names the module, and sources live under
/// `<module>/src/main/java/`. Assumes the fixed repository layout used by
/// the monitored services; callers targeting other layouts pass explicit
/// hints instead.
fn source_root_path(path: &str) -> String {
    if !path.ends_with(".java") {
        return path.to_string();
    }
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() >= 4 {
        format!("{}/src/main/java/{}", segments[3], path)
    } else {
        path.to_string()
    }
}

// `at de.app.core.Listener.onEvent(Listener.java:42)`
static JAVA_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"at\s+([A-Za-z_$][\w$.]*)\.[\w$<>]+\(([A-Za-z_$][\w$]*\.java):\d+\)")
        .expect("static regex")
});
// `File "/app/worker/consume.py", line 12`
static PY_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"File "([^"]+\.py)""#).expect("static regex"));

/// Extract repo-relative file paths from condensed trace lines, preserving
/// order and dropping duplicates.
fn mine_paths(lines: &[&str]) -> Vec<String> {
    let mut paths = Vec::new();
    let mut push = |path: String| {
        if !paths.contains(&path) {
            paths.push(path);
        }
    };

    for line in lines {
        if let Some(caps) = JAVA_FRAME.captures(line) {
            let qualified = &caps[1];
            let file = &caps[2];
            let path = match qualified.rsplit_once('.') {
                Some((package, _class)) => format!("{}/{}", package.replace('.', "/"), file),
                None => file.to_string(),
            };
            push(path);
        } else if let Some(caps) = PY_FRAME.captures(line) {
            push(caps[1].trim_start_matches('/').to_string());
        } else {
            // Condensed traces sometimes carry bare dotted paths.
            for token in line.split_whitespace() {
                let token = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '.' && c != '_');
                if (token.ends_with(".java") || token.ends_with(".py"))
                    && !token.contains('/')
                    && token.matches('.').count() > 1
                {
                    push(normalize_dotted_path(token));
                }
            }
        }
    }
    paths
}
