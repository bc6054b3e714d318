//! `iso16 run` - check one vector against its expected output.

use std::path::PathBuf;

use clap::Args;
use iso16_core::conformance::{self, ConformanceError, Mismatch, Verdict};
use iso16_core::seal::SealMetadata;
use serde::Serialize;

use super::{exit_codes, output_error, print_json};

/// Arguments for `iso16 run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Conformance vector file
    pub vector: PathBuf,

    /// Expected output file
    pub expected: PathBuf,

    /// Output format (text or json)
    #[arg(long, default_value = "false")]
    pub json: bool,
}

/// JSON response for `iso16 run`.
#[derive(Debug, Serialize)]
#[serde(deny_unknown_fields)]
struct RunResponse<'a> {
    vector_id: &'a str,
    passed: bool,
    seal: &'a str,
    true_delivery: bool,
    mismatches: &'a [Mismatch],
}

/// Executes `iso16 run` and returns the exit code.
pub fn run_check(args: &RunArgs, defaults: &SealMetadata) -> u8 {
    match conformance::check(&args.vector, &args.expected, defaults) {
        Ok(verdict) => {
            if args.json {
                print_json(&response(&verdict));
            } else {
                print!("{}", render_text(&verdict));
            }
            if verdict.passed() {
                exit_codes::SUCCESS
            } else {
                exit_codes::FAILURE
            }
        },
        Err(err) => {
            let code = match err {
                ConformanceError::Load(_) => "load_error",
                ConformanceError::Encoding { .. } => "encoding_error",
            };
            output_error(args.json, code, &err.to_string(), exit_codes::FAILURE)
        },
    }
}

fn response(verdict: &Verdict) -> RunResponse<'_> {
    RunResponse {
        vector_id: &verdict.vector_id,
        passed: verdict.passed(),
        seal: verdict.run.seal.as_str(),
        true_delivery: verdict.run.outcome.decision.true_delivery(),
        mismatches: verdict.comparison.mismatches(),
    }
}

fn render_text(verdict: &Verdict) -> String {
    let mut out = format!("=== ISO-16 Conformance Result: {} ===\n", verdict.vector_id);
    if verdict.passed() {
        out.push_str("PASS\n");
    } else {
        out.push_str("FAIL\n");
        for mismatch in verdict.comparison.mismatches() {
            out.push_str(&format!("  {mismatch}\n"));
        }
    }
    out.push_str(&format!("seal: {}\n", verdict.run.seal));
    out
}

#[cfg(test)]
mod tests {
    use iso16_core::conformance::{ConformanceVector, ExpectedOutput, compare};
    use iso16_core::fixed_point::Q16;

    use super::*;

    fn verdict(tamper: bool) -> Verdict {
        let text = format!(
            r#"{{"vector_id":"V042","initial_phase_state":{}}}"#,
            serde_json::json!(vec![[0, 0, 0]; 16])
        );
        let vector = ConformanceVector::from_json_str(&text).unwrap();
        let run = vector.run(&SealMetadata::default()).unwrap();
        let mut expected = ExpectedOutput::from_run("V042", &run);
        if tamper {
            expected.error_total = Q16::from_raw(5);
        }
        let comparison = compare("V042", &run, &expected);
        Verdict {
            vector_id: "V042".to_string(),
            run,
            comparison,
        }
    }

    #[test]
    fn test_text_pass() {
        let text = render_text(&verdict(false));
        assert!(text.starts_with("=== ISO-16 Conformance Result: V042 ===\nPASS\n"));
        assert!(text.contains("seal: "));
    }

    #[test]
    fn test_text_fail_lists_fields() {
        let text = render_text(&verdict(true));
        assert!(text.contains("FAIL"));
        assert!(text.contains("error_total: expected 5, got 0"));
    }

    #[test]
    fn test_json_response_shape() {
        let verdict = verdict(true);
        let value = serde_json::to_value(response(&verdict)).unwrap();
        assert_eq!(value["passed"], false);
        assert_eq!(value["mismatches"][0]["field"], "error_total");
    }
}
