//! `mlg verify`: check the static tree the dev server maps.
//!
//! Each URL expectation is resolved the way the server would resolve it,
//! so a mapping that points somewhere else is reported too.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use super::serve::{Resolution, resolve};
use crate::config::SiteConfig;
use crate::log;

/// URL, the file it must be served from, label.
pub const URL_EXPECTATIONS: [(&str, &str, &str); 4] = [
    ("/assets/css/main.css", "src/assets/css/main.css", "CSS file mapping"),
    ("/assets/js/main.js", "src/assets/js/main.js", "JS file mapping"),
    (
        "/data/categories/basic_sciences.json",
        "public/data/categories/basic_sciences.json",
        "data file mapping",
    ),
    ("/", "src/pages/index.html", "root mapping"),
];

pub const CRITICAL_DIRS: [&str; 4] = [
    "src/assets/css",
    "src/assets/js",
    "src/pages",
    "public/data/categories",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Mapping { url: String, label: String },
    Directory,
}

/// One verification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub subject: Subject,
    /// Expected file or directory, relative to the project root.
    pub target: PathBuf,
    /// Why the check failed.
    pub problem: Option<String>,
}

impl Check {
    pub fn passed(&self) -> bool {
        self.problem.is_none()
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.passed() {
            "✓".green().to_string()
        } else {
            "✗".red().to_string()
        };
        match &self.subject {
            Subject::Mapping { url, label } => {
                write!(f, "{mark} {label}: {url} → {}", self.target.display())?
            }
            Subject::Directory => write!(f, "{mark} {}", self.target.display())?,
        }
        if let Some(problem) = &self.problem {
            write!(f, " ({})", problem.dimmed())?;
        }
        Ok(())
    }
}

/// Run every mapping and directory check.
pub fn run_checks(config: &SiteConfig) -> Vec<Check> {
    let mappings = URL_EXPECTATIONS
        .iter()
        .map(|(url, expected, label)| check_mapping(config, url, expected, label));
    let dirs = CRITICAL_DIRS.iter().map(|dir| check_dir(config, dir));
    mappings.chain(dirs).collect()
}

fn check_mapping(config: &SiteConfig, url: &str, expected: &str, label: &str) -> Check {
    let expected_path = config.root_join(expected);
    let problem = match resolve(url, &config.serve) {
        Resolution::File(served) if served == expected_path => None,
        Resolution::File(served) => Some(format!(
            "served from {} instead",
            config.root_relative(&served).display()
        )),
        Resolution::Forbidden => Some("request rejected".to_string()),
        Resolution::NotFound(_) if expected_path.exists() => {
            Some("file exists but no mapping reaches it".to_string())
        }
        Resolution::NotFound(_) => Some(format!("missing, create {}", expected_path.display())),
    };

    Check {
        subject: Subject::Mapping {
            url: url.to_string(),
            label: label.to_string(),
        },
        target: PathBuf::from(expected),
        problem,
    }
}

fn check_dir(config: &SiteConfig, dir: &str) -> Check {
    let problem = (!config.root_join(dir).is_dir()).then(|| "missing directory".to_string());
    Check {
        subject: Subject::Directory,
        target: PathBuf::from(dir),
        problem,
    }
}

/// Print every check; fail when any did.
pub fn verify_site(config: &SiteConfig) -> Result<()> {
    log!("verify"; "project root: {}", config.get_root().display());

    let checks = run_checks(config);
    for check in &checks {
        log!("verify"; "{}", check);
    }

    let failed = checks.iter().filter(|c| !c.passed()).count();
    if failed > 0 {
        bail!("{} of {} path checks failed", failed, checks.len());
    }
    log!("verify"; "all {} checks passed", checks.len());
    Ok(())
}
