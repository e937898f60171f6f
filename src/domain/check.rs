// Heuristic check results

/// Outcome of a single heuristic check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckResult {
    /// No verdict: preconditions unmet or the check failed.
    #[default]
    Empty,
    Informational(String),
    Warning(String),
}

impl CheckResult {
    pub fn informational(text: impl Into<String>) -> Self {
        CheckResult::Informational(text.into())
    }

    pub fn warning(text: impl Into<String>) -> Self {
        CheckResult::Warning(format!("Warning: {}", text.into()))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CheckResult::Empty)
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            CheckResult::Empty => None,
            CheckResult::Informational(text) | CheckResult::Warning(text) => Some(text.as_str()),
        }
    }
}

/// Both check results for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InitialChecks {
    pub axis: CheckResult,
    pub cherry_pick: CheckResult,
}

impl InitialChecks {
    pub fn is_empty(&self) -> bool {
        self.axis.is_empty() && self.cherry_pick.is_empty()
    }
}
