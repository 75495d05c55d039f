//! Running registered model tests against every model, condition and design of a project
use std::fmt::{Display, Formatter};

use log::{info, warn};

use crate::metabolic_model::model::Model;
use crate::project::{Project, ProjectError};
use crate::testing::checks;
use crate::testing::result_log::ResultLog;
use crate::testing::selector::{Selection, TestSelector, TestTarget};
use crate::testing::TestError;

/// Function implementing a model test
pub type CheckFn =
    Box<dyn Fn(&mut Model, &Project, &mut ResultLog) -> Result<(), TestError> + Send + Sync>;

/// A named test and the targets it runs against
pub struct ModelTest {
    pub name: String,
    pub description: String,
    pub selector: TestSelector,
    check: CheckFn,
}

impl ModelTest {
    pub fn new<F>(name: &str, description: &str, selector: TestSelector, check: F) -> Self
    where
        F: Fn(&mut Model, &Project, &mut ResultLog) -> Result<(), TestError>
            + Send
            + Sync
            + 'static,
    {
        ModelTest {
            name: name.to_string(),
            description: description.to_string(),
            selector,
            check: Box::new(check),
        }
    }

    /// Run the test, turning an error into an error entry of the log
    pub fn run(&self, model: &mut Model, project: &Project, log: &mut ResultLog) {
        if let Err(err) = (self.check)(model, project, log) {
            warn!("Test {} stopped early: {}", self.name, err);
            log.error(&err.to_string(), Some("test stopped early"));
        }
    }
}

/// Outcome of one test against one target
#[derive(Clone, Debug, PartialEq)]
pub struct TestResult {
    pub model: String,
    pub target: TestTarget,
    pub test: String,
    pub log: ResultLog,
}

/// Every result of a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TestReport {
    pub results: Vec<TestResult>,
}

impl TestReport {
    pub fn passed(&self) -> usize {
        self.results.iter().map(|r| r.log.passed()).sum()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().map(|r| r.log.failed()).sum()
    }

    pub fn warnings(&self) -> usize {
        self.results.iter().map(|r| r.log.warnings()).sum()
    }

    pub fn errors(&self) -> usize {
        self.results.iter().map(|r| r.log.errors()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(|r| r.log.is_success())
    }

    /// Results for one test against one target
    pub fn find(&self, model: &str, target: &TestTarget, test: &str) -> Option<&TestResult> {
        self.results
            .iter()
            .find(|r| r.model == model && &r.target == target && r.test == test)
    }
}

impl Display for TestReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for result in &self.results {
            writeln!(f, "{} [{}] {}", result.model, result.target, result.test)?;
            for entry in result.log.entries() {
                writeln!(f, "    {}", entry)?;
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} warnings, {} errors",
            self.passed(),
            self.failed(),
            self.warnings(),
            self.errors()
        )
    }
}

/// Registered tests
#[derive(Default)]
pub struct TestRunner {
    tests: Vec<ModelTest>,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner with the tests shipped with the crate
    pub fn with_default_tests() -> Self {
        let mut runner = Self::new();
        runner.add_test(ModelTest::new(
            "atpase_validity",
            "The model can't produce ATP without uptake",
            TestSelector::all(),
            checks::atpase_validity,
        ));
        runner.add_test(ModelTest::new(
            "acetate_range",
            "Acetate production hasn't changed significantly",
            TestSelector::all(),
            checks::acetate_range,
        ));
        runner.add_test(ModelTest::new(
            "min_reactions_present",
            "Reactions to minimise are in the model",
            TestSelector::all(),
            checks::min_reactions_present,
        ));
        runner.add_test(ModelTest::new(
            "h2_restriction_sweep",
            "Hydrogen restriction over a range of carbon monoxide uptake rates",
            TestSelector::all()
                .designs(Selection::only([checks::UNRESTRICTED_DESIGN]))
                .conditions(Selection::none()),
            checks::h2_restriction_sweep,
        ));
        runner.add_test(ModelTest::new(
            "essential_reactions",
            "Knocking out an essential reaction stops growth",
            TestSelector::all(),
            checks::essential_reactions,
        ));
        runner
    }

    pub fn add_test(&mut self, test: ModelTest) {
        self.tests.push(test);
    }

    pub fn tests(&self) -> &[ModelTest] {
        &self.tests
    }

    /// Run every test against each target it selects
    ///
    /// Each test gets its own copy of the target model. A target which can't be loaded gives
    /// an error entry for every test selecting it.
    pub fn run(&self, project: &Project) -> TestReport {
        let mut report = TestReport::default();
        for model_name in project.model_names() {
            let mut targets = vec![TestTarget::Base];
            targets.extend(
                project
                    .conditions()
                    .keys()
                    .map(|c| TestTarget::Condition(c.clone())),
            );
            targets.extend(project.designs().ids().map(|d| TestTarget::Design(d.to_string())));

            for target in targets {
                let selected: Vec<&ModelTest> = self
                    .tests
                    .iter()
                    .filter(|t| t.selector.selects(&model_name, &target))
                    .collect();
                if selected.is_empty() {
                    continue;
                }
                info!("Testing {} [{}]", model_name, target);
                let loaded = load_target(project, &model_name, &target);
                for test in selected {
                    let mut log = ResultLog::new(&format!("{}:{}:{}", model_name, target, test.name));
                    match &loaded {
                        Ok(model) => {
                            let mut model = model.clone();
                            test.run(&mut model, project, &mut log);
                        }
                        Err(err) => log.error(&format!("Unable to load {}: {}", target, err), None),
                    }
                    report.results.push(TestResult {
                        model: model_name.clone(),
                        target: target.clone(),
                        test: test.name.clone(),
                        log,
                    });
                }
            }
        }
        info!(
            "{} passed, {} failed, {} warnings, {} errors",
            report.passed(),
            report.failed(),
            report.warnings(),
            report.errors()
        );
        report
    }
}

fn load_target(project: &Project, model: &str, target: &TestTarget) -> Result<Model, ProjectError> {
    match target {
        TestTarget::Base => project.load_model(Some(model)),
        TestTarget::Condition(name) => project.load_condition(Some(model), name),
        TestTarget::Design(id) => project.load_design(id, Some(model)),
    }
}
