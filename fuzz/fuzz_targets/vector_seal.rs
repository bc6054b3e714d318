//! Fuzz harness for conformance vector parsing and sealing.
//!
//! Arbitrary bytes are parsed as a vector and, when they parse, run through
//! the full delivery loop. Neither step may panic, and a successful run must
//! yield a seal that survives its own expected-output round trip.

#![no_main]
use iso16_core::conformance::{ConformanceVector, ExpectedOutput, compare};
use iso16_core::seal::{Seal, SealMetadata};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Seal::parse(&String::from_utf8_lossy(data));

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = ExpectedOutput::from_json_str(text);
    let Ok(vector) = ConformanceVector::from_json_str(text) else {
        return;
    };
    if let Ok(run) = vector.run(&SealMetadata::default()) {
        let expected = ExpectedOutput::from_run(&vector.vector_id, &run);
        assert!(compare(&vector.vector_id, &run, &expected).is_match());
    }
});
