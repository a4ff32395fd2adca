//! # Corpus Harness
//!
//! Checks a corpus against the Avram format and the test-case format.
//!
//! - **Schema fixtures** pass when the format schema's verdict matches the
//!   `valid`/`invalid` file-name prefix.
//! - **Test cases** pass when the case has the test-case shape, its `schema`
//!   is valid Avram, and every embedded instance yields its declared outcome.
//! - **Instance suites** are test cases whose `schema` is plain draft-06
//!   JSON Schema. They get the shape and instance checks only.
//!
//! A [`CheckFailure`] marks one entry as failed and the run continues. A
//! [`CorpusError`] aborts the run.

use std::path::Path;
use std::sync::Arc;

use avram_schema::{CompiledSchema, Compiler, SchemaCache};
use serde_json::Value;

use crate::case::{test_sets, TestCase, TestSet};
use crate::config::CorpusConfig;
use crate::document::load_document;
use crate::error::{CheckFailure, CorpusError};
use crate::fixture::{schema_fixtures, SchemaFixture};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// A corpus entry that did not pass.
#[derive(Debug)]
pub struct Failure {
    /// Fixture file name or test-case name.
    pub name: String,
    pub reason: CheckFailure,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

/// Outcome of checking one section of the corpus.
#[derive(Debug, Default)]
pub struct CorpusReport {
    /// Total number of entries checked.
    pub total: usize,
    /// Number that passed.
    pub passed: usize,
    /// Number that failed.
    pub failed: usize,
    /// Details for each failure.
    pub failures: Vec<Failure>,
}

impl CorpusReport {
    fn record(&mut self, name: impl FnOnce() -> String, outcome: Result<(), CheckFailure>) {
        self.total += 1;
        match outcome {
            Ok(()) => self.passed += 1,
            Err(reason) => {
                self.failed += 1;
                let name = name();
                tracing::debug!(%name, "corpus entry failed");
                self.failures.push(Failure { name, reason });
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Reports for every section of a corpus run.
#[derive(Debug, Default)]
pub struct CorpusSummary {
    pub schemas: CorpusReport,
    pub cases: CorpusReport,
    pub instances: CorpusReport,
}

impl CorpusSummary {
    pub fn total(&self) -> usize {
        self.sections().map(|report| report.total).sum()
    }

    pub fn passed(&self) -> usize {
        self.sections().map(|report| report.passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.sections().map(|report| report.failed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Every failure, in section order.
    pub fn failures(&self) -> impl Iterator<Item = &Failure> {
        self.sections().flat_map(|report| report.failures.iter())
    }

    fn sections(&self) -> impl Iterator<Item = &CorpusReport> {
        [&self.schemas, &self.cases, &self.instances].into_iter()
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Compiled formats plus the cache used for test-case schemas.
pub struct Harness {
    config: CorpusConfig,
    cache: SchemaCache,
    format: Arc<CompiledSchema>,
    case_format: Arc<CompiledSchema>,
}

impl std::fmt::Debug for Harness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("cached_schemas", &self.cache.len())
            .finish()
    }
}

impl Harness {
    /// Load and compile the Avram format and the test-case format.
    pub fn new(config: CorpusConfig) -> Result<Self, CorpusError> {
        let cache = SchemaCache::new(Compiler::new().max_depth(config.max_depth));
        let format = compile_format(&cache, &config.format_schema)?;
        let case_format = compile_format(&cache, &config.case_schema)?;
        Ok(Self {
            config,
            cache,
            format,
            case_format,
        })
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// The compiled Avram format.
    pub fn format(&self) -> &CompiledSchema {
        &self.format
    }

    /// The compiled test-case format.
    pub fn case_format(&self) -> &CompiledSchema {
        &self.case_format
    }

    /// Check one schema fixture against the Avram format.
    pub fn check_schema_fixture(&self, fixture: &SchemaFixture) -> Result<(), CheckFailure> {
        let result = self.format.validate(&fixture.document);
        match (fixture.expected_valid, result.valid) {
            (true, true) | (false, false) => Ok(()),
            (true, false) => Err(CheckFailure::Rejected {
                violations: result.into_violations(),
            }),
            (false, true) => Err(CheckFailure::Accepted),
        }
    }

    /// Check one Avram test case: shape, Avram conformance, instances.
    pub fn check_test_case(&self, raw: &Value) -> Result<(), CheckFailure> {
        let case = self.parse_case(raw)?;
        let avram = self.format.validate(&case.schema);
        if !avram.valid {
            return Err(CheckFailure::NotAvram(avram.into_violations()));
        }
        self.check_instances(&case)
    }

    /// Check one instance-suite case: shape and instances.
    pub fn check_suite_case(&self, raw: &Value) -> Result<(), CheckFailure> {
        let case = self.parse_case(raw)?;
        // A suite case without instances still has to compile.
        if case.instances.is_empty() {
            self.cache.get_or_compile(&case.schema)?;
        }
        self.check_instances(&case)
    }

    fn parse_case(&self, raw: &Value) -> Result<TestCase, CheckFailure> {
        let shape = self.case_format.validate(raw);
        if !shape.valid {
            return Err(CheckFailure::CaseShape(shape.into_violations()));
        }
        // A custom case format may be looser than what the harness reads.
        TestCase::from_value(raw).map_err(CheckFailure::CaseFields)
    }

    fn check_instances(&self, case: &TestCase) -> Result<(), CheckFailure> {
        if case.instances.is_empty() {
            return Ok(());
        }
        let compiled = self.cache.get_or_compile(&case.schema)?;
        for (i, instance) in case.instances.iter().enumerate() {
            let result = compiled.validate(&instance.data);
            if result.valid != instance.valid {
                return Err(CheckFailure::InstanceOutcome {
                    index: i + 1,
                    description: instance
                        .description
                        .clone()
                        .unwrap_or_else(|| instance.data.to_string()),
                    expected_valid: instance.valid,
                    violations: result.into_violations(),
                });
            }
        }
        Ok(())
    }

    /// Check every schema fixture.
    pub fn check_schemas(&self) -> Result<CorpusReport, CorpusError> {
        let mut report = CorpusReport::default();
        for fixture in schema_fixtures(&self.config.schema_fixtures)? {
            report.record(|| fixture.name.clone(), self.check_schema_fixture(&fixture));
        }
        tracing::info!(passed = report.passed, total = report.total, "checked schema fixtures");
        Ok(report)
    }

    /// Check every Avram test case.
    pub fn check_cases(&self) -> Result<CorpusReport, CorpusError> {
        let sets = test_sets(&self.config.test_cases)?;
        let report = self.check_sets(&sets, |raw| self.check_test_case(raw));
        tracing::info!(passed = report.passed, total = report.total, "checked test cases");
        Ok(report)
    }

    /// Check every instance suite. A missing suite directory is an empty
    /// report.
    pub fn check_suites(&self) -> Result<CorpusReport, CorpusError> {
        if !self.config.instance_suites.is_dir() {
            tracing::debug!(
                dir = %self.config.instance_suites.display(),
                "no instance suites"
            );
            return Ok(CorpusReport::default());
        }
        let sets = test_sets(&self.config.instance_suites)?;
        let report = self.check_sets(&sets, |raw| self.check_suite_case(raw));
        tracing::info!(passed = report.passed, total = report.total, "checked instance suites");
        Ok(report)
    }

    fn check_sets(
        &self,
        sets: &[TestSet],
        check: impl Fn(&Value) -> Result<(), CheckFailure>,
    ) -> CorpusReport {
        let mut report = CorpusReport::default();
        for set in sets {
            for (index, raw) in set.cases.iter().enumerate() {
                report.record(|| set.case_name(index), check(raw));
            }
        }
        report
    }

    /// Check the whole corpus.
    pub fn run(&self) -> Result<CorpusSummary, CorpusError> {
        Ok(CorpusSummary {
            schemas: self.check_schemas()?,
            cases: self.check_cases()?,
            instances: self.check_suites()?,
        })
    }
}

fn compile_format(cache: &SchemaCache, path: &Path) -> Result<Arc<CompiledSchema>, CorpusError> {
    let document = load_document(path)?;
    let compiled = cache
        .get_or_compile(&document)
        .map_err(|source| CorpusError::FormatSchema {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!(path = %path.display(), nodes = compiled.node_count(), "loaded format schema");
    Ok(compiled)
}
