//! Run outputs: CI output values, the step summary, and the stdout fallback.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use artifact_downloader_core::{DeploymentTarget, DownloadResult};

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Formats a byte count with base-1024 units and up to two decimals.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{value:.2}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

/// Output entries for the CI output file.
pub fn render_outputs(result: &DownloadResult) -> Result<String> {
    let files = serde_json::to_string(&result.files).context("failed to encode file list")?;
    Ok([
        output_entry("file-count", &result.file_count.to_string()),
        output_entry("total-size", &result.total_size.to_string()),
        output_entry("commit-sha", &result.commit_sha),
        output_entry("files", &files),
    ]
    .concat())
}

/// One output entry: `key=value`, or the `key<<DELIM` block form when the
/// value spans lines. The delimiter never occurs inside the value.
fn output_entry(key: &str, value: &str) -> String {
    if !value.contains(['\n', '\r']) {
        return format!("{key}={value}\n");
    }

    let mut delimiter = String::from("ghadelimiter");
    while value.contains(delimiter.as_str()) {
        delimiter.push('_');
    }
    format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Markdown table describing a finished run.
pub fn render_step_summary(
    target: &DeploymentTarget,
    output_path: &Path,
    result: &DownloadResult,
) -> String {
    let mut rows = vec![
        ("Repository", target.repository.clone()),
        ("Source Path", target.source_path.clone()),
        ("Output Path", output_path.display().to_string()),
        ("Commit SHA", format!("`{}`", result.commit_sha)),
    ];
    if let Some(alias) = target.reference.alias() {
        rows.push(("Alias", alias.to_string()));
    }
    if let Some(branch) = target.reference.branch() {
        rows.push(("Branch", branch.to_string()));
    }
    rows.push(("Files", result.file_count.to_string()));
    rows.push(("Total Size", format_bytes(result.total_size)));

    let mut summary = String::from("## Download Summary\n\n| Property | Value |\n| --- | --- |\n");
    for (name, value) in rows {
        summary.push_str(&format!("| {name} | {value} |\n"));
    }
    summary
}

/// Writes outputs to `GITHUB_OUTPUT` (or stdout) and the optional step summary.
pub fn publish(
    target: &DeploymentTarget,
    output_path: &Path,
    result: &DownloadResult,
    summary: bool,
) -> Result<()> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => append(Path::new(&path), &render_outputs(result)?)?,
        None => {
            let json =
                serde_json::to_string_pretty(result).context("failed to encode download result")?;
            println!("{json}");
        }
    }

    if summary && let Some(path) = std::env::var_os("GITHUB_STEP_SUMMARY") {
        append(
            Path::new(&path),
            &render_step_summary(target, output_path, result),
        )?;
    }

    Ok(())
}

fn append(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifact_downloader_core::DeploymentRef;

    fn result() -> DownloadResult {
        DownloadResult {
            commit_sha: "abc123".into(),
            file_count: 2,
            total_size: 1536,
            files: vec!["index.html".into(), "assets/app.js".into()],
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_bytes(1_288_490_189), "1.2 GB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_render_outputs_lines() {
        let text = render_outputs(&result()).unwrap();
        assert_eq!(
            text,
            "file-count=2\ntotal-size=1536\ncommit-sha=abc123\nfiles=[\"index.html\",\"assets/app.js\"]\n"
        );
    }

    #[test]
    fn test_render_outputs_multiline_value_cannot_inject_entries() {
        let mut result = result();
        result.commit_sha = "abc\nfile-count=999".into();

        let text = render_outputs(&result).unwrap();

        assert!(text.contains("commit-sha<<ghadelimiter\nabc\nfile-count=999\nghadelimiter\n"));
        assert!(text.starts_with("file-count=2\n"));
        assert_eq!(text.matches("file-count=").count(), 2);
    }

    #[test]
    fn test_output_entry_delimiter_avoids_collision() {
        let entry = output_entry("k", "line\nghadelimiter");
        assert_eq!(entry, "k<<ghadelimiter_\nline\nghadelimiter\nghadelimiter_\n");
    }

    #[test]
    fn test_step_summary_includes_alias_row_only_for_alias() {
        let target = DeploymentTarget::new("acme/site", "dist", DeploymentRef::Alias("production".into()));
        let summary = render_step_summary(&target, Path::new("out"), &result());

        assert!(summary.starts_with("## Download Summary"));
        assert!(summary.contains("| Repository | acme/site |"));
        assert!(summary.contains("| Output Path | out |"));
        assert!(summary.contains("| Commit SHA | `abc123` |"));
        assert!(summary.contains("| Alias | production |"));
        assert!(!summary.contains("| Branch |"));
        assert!(summary.contains("| Files | 2 |"));
        assert!(summary.contains("| Total Size | 1.5 KB |"));
    }

    #[test]
    fn test_step_summary_for_commit_sha_has_no_resolver_row() {
        let target = DeploymentTarget::new("acme/site", "dist", DeploymentRef::CommitSha("abc123".into()));
        let summary = render_step_summary(&target, Path::new("dist"), &result());

        assert!(!summary.contains("| Alias |"));
        assert!(!summary.contains("| Branch |"));
    }

    #[test]
    fn test_append_accumulates() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("output");

        append(&path, "a=1\n").unwrap();
        append(&path, "b=2\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a=1\nb=2\n");
    }
}
