//! Test harness: registry, execution and aggregation.
//!
//! # Lifecycle
//!
//! ```text
//!   register()            run_all()                       summary()
//! [TestCase] ──────> [Harness] ──────> [ResultSet] ──────> [Summary]
//!                        │
//!                        │ per case:  pending → running → {passed, failed}
//!                        v
//!                  CaseEvent observers (console progress, logging)
//! ```
//!
//! Cases run strictly in registration order. Each body runs in its own task
//! with a wall-clock timeout; an `Err`, a panic or a timeout becomes a
//! failing [`TestOutcome`] and the run continues with the next case.
//!
//! # Example
//!
//! ```rust,ignore
//! use chirai::harness::{Category, Check, Harness};
//!
//! let mut harness = Harness::new();
//! harness.register("infra", "ok", || async { Ok(Check::pass("ok")) })?;
//!
//! let results = harness.run_all().await;
//! let summary = results.summary();
//! assert_eq!(summary.total, 1);
//! assert_eq!(summary.grade.label(), "excellent");
//! ```

mod category;
pub mod load;
mod outcome;
mod result_set;
mod runner;

pub use category::Category;
pub use outcome::{CaseState, Check, TestOutcome};
pub use result_set::{CategorySummary, Grade, ResultSet, Summary};
pub use runner::{CaseEvent, CaseFuture, Harness, TestCase};

pub(crate) use result_set::success_rate;
