use std::{collections::HashSet, path::Path};

use regex::Regex;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::CompilerSettings;

#[derive(Debug, Error)]
pub enum CompilerError {
    #[error("failed to run {clang}: {source}")]
    Spawn {
        clang: String,
        source: std::io::Error,
    },
    #[error("{clang} produced no AST for {file} ({status})")]
    NoOutput {
        clang: String,
        file: String,
        status: String,
    },
    #[error("AST dump is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// One `error:` or `fatal error:` line of clang's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerDiagnostic {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Errors reported in clang's stderr.
///
/// Expected format: `filename:line:column: error: message`. Warnings, notes
/// and the source excerpts clang prints below a diagnostic are skipped even
/// when they quote `error:`.
pub fn compiler_errors(stderr: &str) -> Vec<CompilerDiagnostic> {
    let Ok(diagnostic_re) = Regex::new(r"^(.*?):(\d+):(\d+):\s*(?:fatal\s+)?error:\s*(.*)$") else {
        return Vec::new();
    };
    stderr
        .lines()
        .filter_map(|line| {
            let caps = diagnostic_re.captures(line)?;
            Some(CompilerDiagnostic {
                file: caps.get(1)?.as_str().to_owned(),
                line: caps.get(2)?.as_str().parse().ok()?,
                column: caps.get(3)?.as_str().parse().ok()?,
                message: caps.get(4)?.as_str().to_owned(),
            })
        })
        .collect()
}

/// Arguments for a JSON AST dump of `source`.
pub fn ast_dump_args(
    source: &Path,
    settings: &CompilerSettings,
) -> Vec<String> {
    let mut args = vec![
        "-Xclang".to_string(),
        "-ast-dump=json".to_string(),
        "-fsyntax-only".to_string(),
        "-fno-color-diagnostics".to_string(),
    ];

    let mut seen_includes = HashSet::with_capacity(settings.include_paths.len() + 1);
    let local = source.parent().filter(|dir| !dir.as_os_str().is_empty()).map(|dir| dir.display().to_string());
    for path in settings.include_paths.iter().cloned().chain(local) {
        if seen_includes.insert(path.clone()) {
            args.push("-I".to_string());
            args.push(path);
        }
    }

    args.extend(settings.extra_flags.iter().cloned());
    args.push(source.display().to_string());
    args
}

/// Run clang's AST dump on `source` and return the raw JSON.
///
/// Compile errors do not fail the dump: clang still emits the AST of
/// everything it could parse, and resolution may well succeed on it.
pub async fn run_ast_dump(
    source: &Path,
    settings: &CompilerSettings,
) -> Result<String, CompilerError> {
    let args = ast_dump_args(source, settings);
    debug!("[ast-dump] {} {}", settings.clang, args.join(" "));

    let output = Command::new(&settings.clang).kill_on_drop(true).args(&args).output().await.map_err(|source| {
        CompilerError::Spawn {
            clang: settings.clang.clone(),
            source,
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        for error in compiler_errors(&stderr) {
            warn!("[ast-dump] compiler error: {}:{}:{}: {}", error.file, error.line, error.column, error.message);
        }
        debug!("[ast-dump] exited with {} (partial AST may still be usable)", output.status);
    }

    let stdout = String::from_utf8(output.stdout)?;
    if !stdout.trim_start().starts_with('{') {
        return Err(CompilerError::NoOutput {
            clang: settings.clang.clone(),
            file: source.display().to_string(),
            status: output.status.to_string(),
        });
    }

    debug!("[ast-dump] produced {} bytes of JSON for {}", stdout.len(), source.display());
    Ok(stdout)
}

#[cfg(test)]
#[path = "../tests/src/compiler_tests.rs"]
mod tests;
