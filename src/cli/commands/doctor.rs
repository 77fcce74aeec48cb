//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{LlmEndpointSettings, Settings, StorageProvider};
use crate::error::FocusTubeError;
use crate::transcript::SubprocessFetcher;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("FocusTube Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Transcript Fetcher").bold());
    let interpreter = check_interpreter(settings).await;
    interpreter.print();
    checks.push(interpreter);

    println!();

    // Missing keys only disable features, so they are warnings.
    println!("{}", style("API Keys").bold());
    let key_checks = vec![
        check_youtube_key(settings),
        check_endpoint_key("Curator", &settings.curator),
        check_endpoint_key("Transcript analysis", &settings.transcript.llm),
    ];
    for check in &key_checks {
        check.print();
    }
    checks.extend(key_checks);

    println!();

    println!("{}", style("Storage").bold());
    let dir_checks = check_storage(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file(config_path);
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using FocusTube.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!(
            "All checks passed with {} warning(s).",
            warnings
        ));
    } else {
        Output::success("All checks passed! FocusTube is ready to use.");
    }

    Ok(())
}

/// Check the Python interpreter and its transcript package.
async fn check_interpreter(settings: &Settings) -> CheckResult {
    let python = &settings.transcript.python;
    let name = format!("{} + youtube_transcript_api", python);

    match SubprocessFetcher::from_settings(&settings.transcript).check().await {
        Ok(()) => CheckResult::ok(&name, "available"),
        Err(FocusTubeError::ToolNotFound(_)) => CheckResult::error(
            &name,
            "interpreter not found",
            "Install Python 3 or set transcript.python in the config file",
        ),
        Err(e) => CheckResult::error(
            &name,
            &e.to_string(),
            "Install with: pip install youtube-transcript-api",
        ),
    }
}

fn check_youtube_key(settings: &Settings) -> CheckResult {
    match settings.youtube.resolve_api_key() {
        Some(key) => CheckResult::ok("YOUTUBE_API_KEY", &format!("configured ({})", mask(&key))),
        None => CheckResult::warning(
            "YOUTUBE_API_KEY",
            "not set, video search disabled",
            "Set with: export YOUTUBE_API_KEY='...'",
        ),
    }
}

fn check_endpoint_key(feature: &str, endpoint: &LlmEndpointSettings) -> CheckResult {
    let name = format!("{} ({})", endpoint.api_key_env, feature);
    match endpoint.api_key() {
        Some(key) => CheckResult::ok(
            &name,
            &format!("configured ({}, model {})", mask(&key), endpoint.model),
        ),
        None => CheckResult::warning(
            &name,
            "not set, feature disabled",
            &format!("Set with: export {}='...'", endpoint.api_key_env),
        ),
    }
}

/// Show only the ends of a secret.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let data_dir = settings.data_dir();
    if data_dir.exists() {
        results.push(CheckResult::ok(
            "Data directory",
            &format!("{}", data_dir.display()),
        ));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
    }

    match settings.storage.provider {
        StorageProvider::Memory => results.push(CheckResult::warning(
            "Database",
            "in-memory, records are lost on restart",
            "Set storage.provider = \"sqlite\" to keep study records",
        )),
        StorageProvider::Sqlite => {
            let db_path = settings.sqlite_path();
            if db_path.exists() {
                let size = std::fs::metadata(&db_path)
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                results.push(CheckResult::ok(
                    "Database",
                    &format!("{} ({})", db_path.display(), size),
                ));
            } else {
                results.push(CheckResult::warning(
                    "Database",
                    &format!("{} (not created yet)", db_path.display()),
                    "Database will be created when the server starts",
                ));
            }
        }
    }

    results
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: focustube config init",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
