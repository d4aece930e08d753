//! Case registry and sequential execution.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{Result, SmokeError};

use super::category::Category;
use super::outcome::{Check, TestOutcome};
use super::result_set::ResultSet;

/// Boxed future returned by a test body.
pub type CaseFuture = Pin<Box<dyn Future<Output = Result<Check>> + Send + 'static>>;

type CaseFn = Arc<dyn Fn() -> CaseFuture + Send + Sync>;

type Observer = Box<dyn FnMut(&CaseEvent<'_>) + Send>;

/// A registered unit of verification.
pub struct TestCase {
    category: Category,
    name: String,
    timeout: Option<Duration>,
    body: CaseFn,
}

impl TestCase {
    /// Create a case from an async body
    pub fn new<F, Fut>(category: impl Into<Category>, name: impl Into<String>, body: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Check>> + Send + 'static,
    {
        Self {
            category: category.into(),
            name: name.into(),
            timeout: None,
            body: Arc::new(move || Box::pin(body())),
        }
    }

    /// Override the harness default timeout for this case
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Category
    pub fn category(&self) -> &Category {
        &self.category
    }

    /// Name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Explicit timeout, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Progress notification emitted while running.
#[derive(Debug)]
pub enum CaseEvent<'a> {
    /// A case moved from pending to running
    Started {
        /// 1-based position in the run
        index: usize,
        /// Number of registered cases
        total: usize,
        /// Case category
        category: &'a Category,
        /// Case name
        name: &'a str,
    },
    /// A case reached a terminal state
    Finished {
        /// 1-based position in the run
        index: usize,
        /// Number of registered cases
        total: usize,
        /// Case category
        category: &'a Category,
        /// Recorded outcome
        outcome: &'a TestOutcome,
    },
}

/// Ordered registry of test cases.
pub struct Harness {
    cases: Vec<TestCase>,
    default_timeout: Duration,
    observers: Vec<Observer>,
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

impl Harness {
    /// Timeout applied to cases without their own
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Empty harness with the default timeout
    pub fn new() -> Self {
        Self {
            cases: Vec::new(),
            default_timeout: Self::DEFAULT_TIMEOUT,
            observers: Vec::new(),
        }
    }

    /// Set the default per-case timeout
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Register an async body under `category`/`name`
    pub fn register<F, Fut>(
        &mut self,
        category: impl Into<Category>,
        name: impl Into<String>,
        body: F,
    ) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Check>> + Send + 'static,
    {
        self.register_case(TestCase::new(category, name, body))
    }

    /// Register a prepared case; names are unique within a category
    pub fn register_case(&mut self, case: TestCase) -> Result<()> {
        let duplicate = self
            .cases
            .iter()
            .any(|c| c.category == case.category && c.name == case.name);
        if duplicate {
            return Err(SmokeError::DuplicateCase {
                category: case.category.to_string(),
                name: case.name,
            });
        }

        self.cases.push(case);
        Ok(())
    }

    /// Register an observer of case transitions
    pub fn on_event(&mut self, observer: impl FnMut(&CaseEvent<'_>) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Registered cases, in order
    pub fn cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Number of registered cases
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// No cases registered
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Run every case in registration order and collect the results.
    ///
    /// Never fails: every problem inside a case becomes a failing outcome.
    /// Must be called within a Tokio runtime.
    pub async fn run_all(mut self) -> ResultSet {
        let total = self.cases.len();
        let mut results = ResultSet::new();

        tracing::info!("running {} test cases", total);

        let cases = std::mem::take(&mut self.cases);
        for (i, case) in cases.iter().enumerate() {
            let index = i + 1;
            self.emit(&CaseEvent::Started {
                index,
                total,
                category: &case.category,
                name: &case.name,
            });

            let timeout = case.timeout.unwrap_or(self.default_timeout);
            let start = Instant::now();
            let check = execute(case, timeout).await;
            let outcome = TestOutcome::from_check(&case.name, check, start.elapsed());

            if outcome.success {
                tracing::debug!("[{}/{}] {} passed", index, total, case.name);
            } else {
                tracing::warn!("[{}/{}] {} failed: {}", index, total, case.name, outcome.message);
            }

            self.emit(&CaseEvent::Finished {
                index,
                total,
                category: &case.category,
                outcome: &outcome,
            });
            results.push(&case.category, outcome);
        }

        results
    }

    fn emit(&mut self, event: &CaseEvent<'_>) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

/// Run one body in its own task so panics and timeouts stay contained.
async fn execute(case: &TestCase, timeout: Duration) -> Check {
    let handle = tokio::spawn((case.body)());
    let abort = handle.abort_handle();

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(check))) => check,
        Ok(Ok(Err(err))) => Check::fail(format!("Exception: {err}")),
        Ok(Err(join_err)) if join_err.is_panic() => {
            let message = panic_message(join_err.into_panic());
            tracing::error!("test case '{}' panicked: {}", case.name, message);
            Check::fail(format!("Panicked: {message}"))
        },
        Ok(Err(join_err)) => Check::fail(format!("Cancelled: {join_err}")),
        Err(_) => {
            abort.abort();
            Check::fail(format!("Timed out after {}s", format_secs(timeout)))
        },
    }
}

/// Seconds with at most millisecond precision and no trailing zeros.
fn format_secs(duration: Duration) -> String {
    let text = format!("{:.3}", duration.as_secs_f64());
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::harness::{CaseState, Grade};
    use crate::probe::ProbeError;

    #[tokio::test]
    async fn test_single_passing_case() {
        let mut harness = Harness::new();
        harness
            .register("infra", "ok", || async { Ok(Check::pass("ok")) })
            .unwrap();

        let results = harness.run_all().await;
        let summary = results.summary();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.success_rate, 100.0);
        assert_eq!(summary.grade, Grade::Excellent);
        assert_eq!(summary.grade.label(), "excellent");
    }

    #[test]
    fn test_duplicate_name_rejected_within_category() {
        let mut harness = Harness::new();
        harness
            .register("infra", "ping", || async { Ok(Check::pass("")) })
            .unwrap();

        let err = harness
            .register("infra", "ping", || async { Ok(Check::pass("")) })
            .unwrap_err();
        assert!(matches!(err, SmokeError::DuplicateCase { .. }));

        // Same name in another category is fine
        harness
            .register("security", "ping", || async { Ok(Check::pass("")) })
            .unwrap();
        assert_eq!(harness.len(), 2);
    }

    #[tokio::test]
    async fn test_error_panic_and_timeout_do_not_halt_run() {
        let mut harness = Harness::new();
        harness
            .register("c", "error", || async {
                Err(ProbeError::Connect("refused".into()).into())
            })
            .unwrap();
        harness
            .register("c", "panic", || async {
                if std::hint::black_box(true) {
                    panic!("boom");
                }
                Ok(Check::pass("unreachable"))
            })
            .unwrap();
        harness
            .register_case(
                TestCase::new("c", "slow", || async {
                    tokio::time::sleep(Duration::from_secs(10)).await;
                    Ok(Check::pass("too late"))
                })
                .with_timeout(Duration::from_millis(50)),
            )
            .unwrap();
        harness
            .register("c", "after", || async { Ok(Check::pass("still ran")) })
            .unwrap();

        let results = harness.run_all().await;
        let outcomes = results.get(&Category::new("c")).unwrap();

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].message.starts_with("Exception: "));
        assert!(outcomes[0].message.contains("refused"));
        assert_eq!(outcomes[1].message, "Panicked: boom");
        assert!(outcomes[2].message.starts_with("Timed out after"));
        assert!(outcomes[2].duration < Duration::from_secs(5));
        assert!(outcomes[3].success);
        assert_eq!(results.summary().passed, 1);
    }

    #[tokio::test]
    async fn test_registration_order_is_execution_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut harness = Harness::new();

        for (category, name) in [("b", "1"), ("a", "2"), ("b", "3")] {
            let order = Arc::clone(&order);
            harness
                .register(category, name, move || {
                    let order = Arc::clone(&order);
                    async move {
                        order.lock().unwrap().push(name);
                        Ok(Check::pass(name))
                    }
                })
                .unwrap();
        }

        let results = harness.run_all().await;
        assert_eq!(*order.lock().unwrap(), ["1", "2", "3"]);

        let categories: Vec<_> = results.categories().map(|(c, _)| c.to_string()).collect();
        assert_eq!(categories, ["b", "a"]);
    }

    #[tokio::test]
    async fn test_events_follow_state_machine() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let started = Arc::new(AtomicUsize::new(0));

        let mut harness = Harness::new();
        harness
            .register("x", "pass", || async { Ok(Check::pass("")) })
            .unwrap();
        harness
            .register("x", "fail", || async { Ok(Check::fail("")) })
            .unwrap();

        let sink = Arc::clone(&events);
        let counter = Arc::clone(&started);
        harness.on_event(move |event| match event {
            CaseEvent::Started { index, total, .. } => {
                counter.fetch_add(1, Ordering::SeqCst);
                sink.lock().unwrap().push((*index, *total, CaseState::Running));
            },
            CaseEvent::Finished { index, total, outcome, .. } => {
                sink.lock().unwrap().push((*index, *total, outcome.state()));
            },
        });

        harness.run_all().await;

        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(
            *events.lock().unwrap(),
            [
                (1, 2, CaseState::Running),
                (1, 2, CaseState::Passed),
                (2, 2, CaseState::Running),
                (2, 2, CaseState::Failed),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_timeout_applies() {
        let mut harness = Harness::new().with_default_timeout(Duration::from_millis(20));
        harness
            .register("t", "hang", || async {
                std::future::pending::<()>().await;
                Ok(Check::pass(""))
            })
            .unwrap();

        let results = harness.run_all().await;
        let outcome = results.outcomes().next().unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Timed out after 0.02s");
    }

    #[test]
    fn test_format_secs_keeps_sub_second_precision() {
        assert_eq!(format_secs(Duration::from_millis(20)), "0.02");
        assert_eq!(format_secs(Duration::from_millis(300)), "0.3");
        assert_eq!(format_secs(Duration::from_millis(1)), "0.001");
        assert_eq!(format_secs(Duration::from_secs(30)), "30");
        assert_eq!(format_secs(Duration::from_millis(1500)), "1.5");
    }
}
