//! Normalization conformance suite.
//!
//! Runs every vector in `vectors/normalize.json`.  Each vector gives an
//! arbitrary input, whether it is shallow-valid as given, and the expected
//! serialized form after normalization.  Expected values are written
//! compactly: the always-present `extraResponseFields` and
//! `extraErrorIdentifiers` maps are filled in before comparing.

use serde::Deserialize;
use serde_json::{Map, Value};

use faultline::{deep_check, normalize, shallow_check};

// ── Load conformance data ────────────────────────────────────

#[derive(Deserialize, Debug)]
struct VectorsFile {
    vectors: Vec<Vector>,
}

#[derive(Deserialize, Debug, Clone)]
struct Vector {
    test_id: String,
    input: Value,
    shallow_valid: bool,
    expected: Value,
}

#[derive(Debug, PartialEq)]
struct Outcome {
    shallow_valid: bool,
    normalized: Value,
}

fn load_vectors() -> Vec<Vector> {
    let raw = include_str!("vectors/normalize.json");
    let file: VectorsFile = serde_json::from_str(raw).expect("failed to parse vectors");
    file.vectors
}

fn run_vector(vec: &Vector) -> Outcome {
    let normalized = normalize(vec.input.clone()).to_value();
    assert!(
        deep_check(&normalized),
        "{}: normalized output fails deep_check: {}",
        vec.test_id,
        normalized
    );
    Outcome {
        shallow_valid: shallow_check(&vec.input),
        normalized,
    }
}

fn expected_outcome(vec: &Vector) -> Outcome {
    Outcome {
        shallow_valid: vec.shallow_valid,
        normalized: with_default_maps(vec.expected.clone()),
    }
}

/// Add empty field maps at every level of the expected chain.
fn with_default_maps(mut value: Value) -> Value {
    if let Value::Object(obj) = &mut value {
        for key in ["extraResponseFields", "extraErrorIdentifiers"] {
            obj.entry(key).or_insert_with(|| Value::Object(Map::new()));
        }
        if let Some(cause) = obj.remove("cause") {
            obj.insert("cause".into(), with_default_maps(cause));
        }
    }
    value
}

// ── Test runner ──────────────────────────────────────────────

#[test]
fn conformance_all_vectors() {
    let vectors = load_vectors();

    let mut failures: Vec<(String, Outcome, Outcome)> = Vec::new();
    for vec in &vectors {
        let got = run_vector(vec);
        let want = expected_outcome(vec);
        if got != want {
            failures.push((vec.test_id.clone(), got, want));
        }
    }

    eprintln!(
        "NORMALIZE CONFORMANCE: {}/{} PASS",
        vectors.len() - failures.len(),
        vectors.len()
    );
    for (tid, got, want) in &failures {
        eprintln!("  FAIL {}: got={:?} expected={:?}", tid, got, want);
    }

    assert!(failures.is_empty(), "{} conformance tests failed", failures.len());
}

// ── Individual vector tests (for granular CI reporting) ──────

macro_rules! conformance_test {
    ($name:ident) => {
        #[test]
        #[allow(non_snake_case)]
        fn $name() {
            let vectors = load_vectors();
            let test_id = stringify!($name)
                .strip_prefix("test_")
                .unwrap_or(stringify!($name));

            let vec = vectors
                .iter()
                .find(|v| v.test_id == test_id)
                .unwrap_or_else(|| panic!("vector {} not found", test_id));

            let got = run_vector(vec);
            let want = expected_outcome(vec);
            assert_eq!(got, want, "{}", test_id);
        }
    };
}

conformance_test!(test_N001_string);
conformance_test!(test_N002_number);
conformance_test!(test_N003_null);
conformance_test!(test_N004_array);
conformance_test!(test_N005_minimal_object);
conformance_test!(test_N006_full_valid_object);
conformance_test!(test_N007_missing_message);
conformance_test!(test_N008_wrong_types_dropped);
conformance_test!(test_N009_issue_coercion);
conformance_test!(test_N010_reserved_response_field);
conformance_test!(test_N011_reserved_identifier);
conformance_test!(test_N012_null_cause_removed);
conformance_test!(test_N013_invalid_cause_under_valid_top);
conformance_test!(test_N014_scalar_cause);
conformance_test!(test_N015_three_deep);
conformance_test!(test_N016_messages_not_array);
conformance_test!(test_N017_integral_float_status);
