//! `iso16 seal` - run a vector without comparing it.
//!
//! With `--json` the output is a complete expected-output document for the
//! vector, suitable for saving as `<stem>_expected.json`.

use std::path::PathBuf;

use clap::Args;
use iso16_core::conformance::{self, ExpectedOutput, load_vector};
use iso16_core::engine::DeliveryRun;
use iso16_core::seal::SealMetadata;

use super::{exit_codes, output_error, print_json};

/// Arguments for `iso16 seal`.
#[derive(Debug, Args)]
pub struct SealArgs {
    /// Conformance vector file
    pub vector: PathBuf,

    /// Output format (text or json)
    #[arg(long, default_value = "false")]
    pub json: bool,
}

/// Executes `iso16 seal` and returns the exit code.
pub fn run_seal(args: &SealArgs, defaults: &SealMetadata) -> u8 {
    let vector = match load_vector(&args.vector) {
        Ok(vector) => vector,
        Err(err) => {
            return output_error(args.json, "load_error", &err.to_string(), exit_codes::FAILURE);
        },
    };
    let run = match conformance::seal_vector(&vector, defaults) {
        Ok(run) => run,
        Err(err) => {
            return output_error(
                args.json,
                "encoding_error",
                &err.to_string(),
                exit_codes::FAILURE,
            );
        },
    };

    if args.json {
        print_json(&ExpectedOutput::from_run(&vector.vector_id, &run));
    } else {
        print!("{}", render_text(&vector.vector_id, &run));
    }
    exit_codes::SUCCESS
}

fn render_text(vector_id: &str, run: &DeliveryRun) -> String {
    let outcome = &run.outcome;
    let decision = outcome.decision;
    let mut out = format!("vector:        {vector_id}\n");
    out.push_str(&format!("warp_total:    {}\n", outcome.totals.warp));
    out.push_str(&format!("error_total:   {}\n", outcome.totals.error));
    out.push_str(&format!("symmetry_ok:   {}\n", decision.symmetry_ok()));
    if let Some(asymmetry) = outcome.asymmetry {
        out.push_str(&format!(
            "  first asymmetry: entries {} and {}, axis {}, delta {}\n",
            asymmetry.index,
            asymmetry.index + 1,
            asymmetry.axis,
            asymmetry.delta
        ));
    }
    out.push_str(&format!("error_ok:      {}\n", decision.error_ok()));
    out.push_str(&format!("true_delivery: {}\n", decision.true_delivery()));
    out.push_str(&format!("tetra_seal:    {}\n", run.seal));
    out
}
