//! Test report model (§3, §6): `TestStep` / `TestCase` / `TestSuite`,
//! with the status-monotonicity rule and the JSON shape the CLI emits.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Success = 1,
    Warning = 2,
    Error = 3,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Warning => "WARNING",
            Status::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestStep {
    pub description: String,
    pub result: String,
    pub status: Status,
}

impl TestStep {
    pub fn new(description: impl Into<String>, result: impl Into<String>, status: Status) -> Self {
        Self {
            description: description.into(),
            result: result.into(),
            status,
        }
    }

    pub fn success(description: impl Into<String>, result: impl Into<String>) -> Self {
        Self::new(description, result, Status::Success)
    }

    pub fn warning(description: impl Into<String>, result: impl Into<String>) -> Self {
        Self::new(description, result, Status::Warning)
    }

    pub fn error(description: impl Into<String>, result: impl Into<String>) -> Self {
        Self::new(description, result, Status::Error)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TestCase {
    pub description: String,
    pub status: Status,
    pub steps: Vec<TestStep>,
}

impl TestCase {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            status: Status::Success,
            steps: Vec::new(),
        }
    }

    /// Appends a step; the case's status rises to the max of its current
    /// status and the step's, and never falls (§8 State monotonicity).
    pub fn push(&mut self, step: TestStep) {
        if step.status > self.status {
            self.status = step.status;
        }
        self.steps.push(step);
    }

    /// Only ERROR counts as a failure: a WARNING case (e.g. an
    /// authoritative "zone is not signed" answer) still belongs in the
    /// success bucket.
    pub fn is_failure(&self) -> bool {
        self.status == Status::Error
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct TestSuite {
    cases: Vec<TestCase>,
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    pub fn success_count(&self) -> usize {
        self.cases.iter().filter(|c| !c.is_failure()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.cases.iter().filter(|c| c.is_failure()).count()
    }

    /// Serializes per §6: `{success, failures, testcases: {failures,
    /// success?}}`. `include_success` controls whether the `success`
    /// array under `testcases` is populated (`--all`) or omitted
    /// (`--failures`, the default).
    pub fn to_json(&self, include_success: bool) -> serde_json::Value {
        let failures: Vec<&TestCase> = self.cases.iter().filter(|c| c.is_failure()).collect();
        let mut testcases = serde_json::json!({ "failures": failures });
        if include_success {
            let success: Vec<&TestCase> = self.cases.iter().filter(|c| !c.is_failure()).collect();
            testcases["success"] = serde_json::to_value(success).unwrap();
        }
        serde_json::json!({
            "success": self.success_count(),
            "failures": self.failure_count(),
            "testcases": testcases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_status_is_max_of_steps() {
        let mut case = TestCase::new("probe");
        case.push(TestStep::success("a", "ok"));
        assert_eq!(case.status, Status::Success);
        case.push(TestStep::warning("b", "meh"));
        assert_eq!(case.status, Status::Warning);
        case.push(TestStep::success("c", "ok"));
        assert_eq!(case.status, Status::Warning, "status must not fall back down");
        case.push(TestStep::error("d", "boom"));
        assert_eq!(case.status, Status::Error);
    }

    #[test]
    fn suite_json_omits_success_cases_by_default() {
        let mut suite = TestSuite::new();
        let mut ok = TestCase::new("ok-case");
        ok.push(TestStep::success("s", "ok"));
        suite.push(ok);

        let mut bad = TestCase::new("bad-case");
        bad.push(TestStep::error("s", "boom"));
        suite.push(bad);

        let json = suite.to_json(false);
        assert_eq!(json["success"], 1);
        assert_eq!(json["failures"], 1);
        assert!(json["testcases"].get("success").is_none());
        assert_eq!(json["testcases"]["failures"].as_array().unwrap().len(), 1);

        let json_all = suite.to_json(true);
        assert_eq!(json_all["testcases"]["success"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn warning_case_counts_as_success_not_failure() {
        let mut suite = TestSuite::new();
        let mut unsigned = TestCase::new("unsigned-zone-case");
        unsigned.push(TestStep::warning("fetch DS", "zone is not signed"));
        suite.push(unsigned);

        assert!(!suite.cases()[0].is_failure());
        assert_eq!(suite.success_count(), 1);
        assert_eq!(suite.failure_count(), 0);

        let json = suite.to_json(false);
        assert_eq!(json["success"], 1);
        assert_eq!(json["failures"], 0);
        assert_eq!(json["testcases"]["failures"].as_array().unwrap().len(), 0);
    }
}
