use crate::command_runner::Buck2CommandRunner;
use crate::types::{ProvidersResult, TargetQuery};
use crate::Buck2CliOpsError;
use std::path::Path;

/// `buck2 status`.
///
/// Returns the parsed JSON document when buck2 prints one, otherwise the raw
/// text wrapped as `{"output": ...}`.
pub async fn status(
    runner: &Buck2CommandRunner,
    working_dir: &Path,
) -> Result<serde_json::Value, Buck2CliOpsError> {
    let args = vec!["status".to_string()];
    let output = runner.run(&args, Some(working_dir)).await?;

    Ok(serde_json::from_str(&output.stdout)
        .unwrap_or_else(|_| serde_json::json!({ "output": output.stdout })))
}

/// `buck2 targets <target>`, one label per output line.
pub async fn targets(
    runner: &Buck2CommandRunner,
    working_dir: &Path,
    query: &TargetQuery,
) -> Result<Vec<String>, Buck2CliOpsError> {
    let args = query_args(&["targets"], query, &[])?;
    let output = runner.run(&args, Some(working_dir)).await?;

    Ok(output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// `buck2 cquery <target> --output-all-attributes --json`.
pub async fn attributes(
    runner: &Buck2CommandRunner,
    working_dir: &Path,
    query: &TargetQuery,
) -> Result<serde_json::Value, Buck2CliOpsError> {
    let args = query_args(&["cquery"], query, &["--output-all-attributes", "--json"])?;
    let output = runner.run(&args, Some(working_dir)).await?;

    serde_json::from_str(&output.stdout).map_err(|err| Buck2CliOpsError::ParseError {
        message: format!("failed to parse buck2 cquery output: {err}"),
    })
}

/// `buck2 audit providers <target>`.
pub async fn providers(
    runner: &Buck2CommandRunner,
    working_dir: &Path,
    query: &TargetQuery,
) -> Result<ProvidersResult, Buck2CliOpsError> {
    let args = query_args(&["audit", "providers"], query, &[])?;
    let output = runner.run(&args, Some(working_dir)).await?;

    Ok(ProvidersResult {
        target: query.target.clone(),
        output: output.stdout,
    })
}

/// Build `<subcommand...> [@mode] <target> [flags...] [--fake-host host]`.
///
/// Blank host and mode values count as absent.
fn query_args(
    subcommand: &[&str],
    query: &TargetQuery,
    flags: &[&str],
) -> Result<Vec<String>, Buck2CliOpsError> {
    let target = query.target.trim();
    if target.is_empty() {
        return Err(Buck2CliOpsError::InvalidParams {
            message: "target must not be empty".to_string(),
        });
    }

    let mut args: Vec<String> = subcommand.iter().map(|s| s.to_string()).collect();

    if let Some(mode) = non_blank(query.mode.as_deref()) {
        if mode.starts_with('@') {
            args.push(mode.to_string());
        } else {
            args.push(format!("@{mode}"));
        }
    }

    args.push(target.to_string());
    args.extend(flags.iter().map(|s| s.to_string()));

    if let Some(host) = non_blank(query.host.as_deref()) {
        args.push("--fake-host".to_string());
        args.push(host.to_string());
    }

    Ok(args)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
