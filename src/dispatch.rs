use crate::findings::{CheckerResult, Finding, Severity};
use crate::verdict::CheckerDiagnostic;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Result slot for one dispatched checker, keyed positionally by the order
/// checkers were registered.
#[derive(Debug)]
pub struct CheckerOutcome {
    pub name: String,
    pub result: Result<CheckerResult, String>,
    pub duration_ms: u64,
}

impl CheckerOutcome {
    pub fn success(name: &str, result: CheckerResult, duration_ms: u64) -> Self {
        CheckerOutcome {
            name: name.to_string(),
            result: Ok(result),
            duration_ms,
        }
    }

    pub fn diagnostic(&self) -> CheckerDiagnostic {
        CheckerDiagnostic {
            name: self.name.clone(),
            succeeded: self.result.is_ok(),
            duration_ms: self.duration_ms,
            error: self.result.as_ref().err().cloned(),
        }
    }

    /// Findings this slot contributes to the verdict. A failed checker
    /// contributes exactly one synthetic low-severity warning.
    pub fn findings(&self) -> Vec<Finding> {
        match &self.result {
            Ok(result) => result.findings.clone(),
            Err(reason) => vec![Finding::warning(
                "checker_failed",
                Severity::Low,
                format!("Checker {} failed", self.name),
                reason.clone(),
            )
            .with_qualifier(self.name.clone())],
        }
    }
}

/// Await every spawned checker to completion with all-settle semantics.
///
/// Each task gets its own timeout; a task that exceeds it is aborted and its
/// slot records `timeout`. Panics and errors are captured per slot. Nothing
/// here cancels a sibling. Results come back in registration order, never as
/// a completion race.
pub async fn settle(
    tasks: Vec<(String, JoinHandle<anyhow::Result<CheckerResult>>)>,
    timeout: Duration,
) -> Vec<CheckerOutcome> {
    let mut outcomes = Vec::with_capacity(tasks.len());
    for (name, mut handle) in tasks {
        let started = Instant::now();
        let result = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(join_error)) => Err(format!("checker panicked: {join_error}")),
            Err(_) => {
                // Abandon the task; a result arriving later is discarded.
                handle.abort();
                Err("timeout".to_string())
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        if let Err(reason) = &result {
            log::warn!("Checker {name} failed after {duration_ms}ms: {reason}");
        } else {
            log::debug!("Checker {name} completed in {duration_ms}ms");
        }
        outcomes.push(CheckerOutcome {
            name,
            result,
            duration_ms,
        });
    }
    outcomes
}
