//! `iso16 suite` - run every vector in a directory.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use clap::Args;
use iso16_core::conformance::{self, SuiteOptions, SuiteReport};
use iso16_core::seal::SealMetadata;
use serde::Serialize;

use super::{exit_codes, output_error, print_json};

/// Arguments for `iso16 suite`.
#[derive(Debug, Args)]
pub struct SuiteArgs {
    /// Directory containing `V*.json` vectors
    pub vectors_dir: PathBuf,

    /// Directory containing `<stem>_expected.json` files (defaults to the
    /// vectors directory)
    pub expected_dir: Option<PathBuf>,

    /// Stop at the first failing vector
    #[arg(long)]
    pub strict: bool,

    /// Output format (text or json)
    #[arg(long, default_value = "false")]
    pub json: bool,
}

/// JSON response for `iso16 suite`.
#[derive(Debug, Serialize)]
struct SuiteResponse<'a> {
    generated_at: String,
    all_passed: bool,
    #[serde(flatten)]
    report: &'a SuiteReport,
}

/// Executes `iso16 suite` and returns the exit code.
pub fn run_suite(args: &SuiteArgs, defaults: &SealMetadata) -> u8 {
    let expected_dir = args.expected_dir.as_ref().unwrap_or(&args.vectors_dir);
    let options = SuiteOptions {
        strict: args.strict,
        metadata: defaults.clone(),
    };

    let report = match conformance::run_suite(&args.vectors_dir, expected_dir, &options) {
        Ok(report) => report,
        Err(err) => {
            return output_error(args.json, "load_error", &err.to_string(), exit_codes::FAILURE);
        },
    };

    if args.json {
        print_json(&SuiteResponse {
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            all_passed: report.all_passed(),
            report: &report,
        });
    } else {
        print!("{}", render_table(&report));
    }

    if report.all_passed() {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}

fn render_table(report: &SuiteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<15} | {:<6} | {:<16} | Detail", "Vector", "Result", "Reason");
    let _ = writeln!(out, "{}", "-".repeat(60));
    for vector in &report.vectors {
        let result = if vector.passed { "PASS" } else { "FAIL" };
        let reason = vector.reason.map_or("-", |r| r.as_str());
        let detail = if vector.mismatches.is_empty() {
            vector.detail.clone().unwrap_or_default()
        } else {
            vector
                .mismatches
                .iter()
                .map(|m| m.field.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(
            out,
            "{:<15} | {:<6} | {:<16} | {detail}",
            vector.vector_id, result, reason
        );
    }
    let _ = writeln!(
        out,
        "\n{} passed, {} failed, {} total{}",
        report.passed,
        report.failed,
        report.total,
        if report.stopped_early {
            " (stopped early)"
        } else {
            ""
        }
    );
    out
}
