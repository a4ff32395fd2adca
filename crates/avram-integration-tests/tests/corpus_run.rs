//! # Shipped Corpus
//!
//! Every schema fixture, Avram test case and draft-06 instance suite in
//! `corpus/` passes, through both the harness API and the `check` command.

use std::path::PathBuf;

use avram_cli::check::{render_summary, run_check, CheckArgs};
use avram_cli::EXIT_OK;
use avram_corpus::{schema_fixtures, test_sets, CorpusConfig, Harness};

fn corpus_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates
    dir.pop(); // workspace root
    dir.join("corpus")
}

fn harness() -> Harness {
    Harness::new(CorpusConfig::from_root(corpus_root())).unwrap()
}

#[test]
fn shipped_corpus_passes() {
    let summary = harness().run().unwrap();
    assert!(
        summary.is_success(),
        "corpus failures:\n{}",
        render_summary(&summary)
    );
    assert!(summary.schemas.total > 0);
    assert!(summary.cases.total > 0);
    assert!(summary.instances.total > 0);
}

#[test]
fn fixtures_cover_both_outcomes() {
    let fixtures = schema_fixtures(&corpus_root().join("schema")).unwrap();
    assert!(fixtures.iter().any(|f| f.expected_valid));
    assert!(fixtures.iter().any(|f| !f.expected_valid));
}

#[test]
fn every_invalid_fixture_is_rejected_with_violations() {
    let harness = harness();
    for fixture in schema_fixtures(&corpus_root().join("schema")).unwrap() {
        let result = harness.format().validate(&fixture.document);
        assert_eq!(result.valid, fixture.expected_valid, "{}", fixture.name);
        if !fixture.expected_valid {
            assert!(!result.violations.is_empty(), "{}", fixture.name);
        }
    }
}

#[test]
fn avram_test_cases_are_valid_avram() {
    let harness = harness();
    for set in test_sets(&corpus_root().join("tests")).unwrap() {
        for (index, case) in set.cases.iter().enumerate() {
            assert!(harness.case_format().is_valid(case), "{}", set.case_name(index));
            assert!(
                harness.format().is_valid(&case["schema"]),
                "{}",
                set.case_name(index)
            );
        }
    }
}

#[test]
fn format_schemas_are_themselves_draft06() {
    for name in ["schema.yaml", "case.yaml"] {
        let document = avram_corpus::load_document(&corpus_root().join(name)).unwrap();
        avram_schema::compile(&document).unwrap();
    }
}

#[test]
fn check_command_passes_on_shipped_corpus() {
    let args = CheckArgs {
        root: Some(corpus_root()),
    };
    assert_eq!(run_check(&args, None).unwrap(), EXIT_OK);
}
