//! Default battery of checks against the inference server.
//!
//! | Category       | Checks                                                                 |
//! |----------------|------------------------------------------------------------------------|
//! | infrastructure | connectivity, API endpoints, required models                           |
//! | functionality  | English, Japanese, math, code, emoji, multilingual chat                |
//! | performance    | average response time, parallel requests, process memory              |
//! | security       | hostile prompts, request bursts                                        |
//! | usability      | unknown model, empty input, oversized input                            |
//! | reliability    | reconnect, repeated question                                           |
//! | compatibility  | native generate API, tight network timeouts, unreachable endpoint      |

pub mod checks;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SuiteConfig;
use crate::error::Result;
use crate::harness::{Category, Check, Harness, TestCase};
use crate::probe::ProbeClient;

/// Shared state handed to every check.
#[derive(Debug, Clone)]
pub struct SuiteContext {
    /// Probe against the server under test
    pub probe: ProbeClient,
    /// Battery settings
    pub config: SuiteConfig,
}

impl SuiteContext {
    /// Bundle a probe with battery settings
    pub fn new(probe: ProbeClient, config: SuiteConfig) -> Self {
        Self { probe, config }
    }
}

/// Build the full battery, in execution order.
pub fn build_suite(ctx: Arc<SuiteContext>) -> Result<Harness> {
    let cfg = &ctx.config;
    let mut harness = Harness::new().with_default_timeout(cfg.test_timeout());

    let samples = scale_of(cfg.response_time_samples);
    let bursts = scale_of(cfg.burst_attempts);
    let waves = scale_of(cfg.concurrent_requests.div_ceil(cfg.concurrency_workers.max(1)));

    let mut add = |category: Category, name: &'static str, scale: u32, check: CheckFn| {
        add_check(&mut harness, &ctx, category, name, scale, check)
    };

    add(Category::INFRASTRUCTURE, "Ollama Connectivity", 1, |c| Box::pin(checks::ollama_connectivity(c)))?;
    add(Category::INFRASTRUCTURE, "API Endpoints", 1, |c| Box::pin(checks::api_endpoints(c)))?;
    add(Category::INFRASTRUCTURE, "Model Availability", 1, |c| Box::pin(checks::model_availability(c)))?;

    add(Category::FUNCTIONALITY, "English Chat", 1, |c| Box::pin(checks::english_chat(c)))?;
    add(Category::FUNCTIONALITY, "Japanese Chat", 1, |c| Box::pin(checks::japanese_chat(c)))?;
    add(Category::FUNCTIONALITY, "Mathematical Reasoning", 1, |c| Box::pin(checks::mathematical_reasoning(c)))?;
    add(Category::FUNCTIONALITY, "Code Generation", 1, |c| Box::pin(checks::code_generation(c)))?;
    add(Category::FUNCTIONALITY, "Emoji Support", 1, |c| Box::pin(checks::emoji_support(c)))?;
    add(Category::FUNCTIONALITY, "Multilingual Support", 3, |c| Box::pin(checks::multilingual_support(c)))?;

    add(Category::PERFORMANCE, "Response Time", samples, |c| Box::pin(checks::response_time(c)))?;
    add(Category::PERFORMANCE, "Concurrent Requests", waves, |c| Box::pin(checks::concurrent_requests(c)))?;
    add(Category::PERFORMANCE, "Memory Usage", 1, |c| Box::pin(checks::memory_usage(c)))?;

    add(Category::SECURITY, "Input Sanitization", scale_of(checks::HOSTILE_INPUTS.len()), |c| {
        Box::pin(checks::input_sanitization(c))
    })?;
    add(Category::SECURITY, "Rate Limiting", bursts, |c| Box::pin(checks::rate_limiting(c)))?;

    add(Category::USABILITY, "Error Handling", 1, |c| Box::pin(checks::error_handling(c)))?;
    add(Category::USABILITY, "Empty Input Handling", 1, |c| Box::pin(checks::empty_input_handling(c)))?;
    add(Category::USABILITY, "Long Input Handling", 1, |c| Box::pin(checks::long_input_handling(c)))?;

    add(Category::RELIABILITY, "Service Recovery", 1, |c| Box::pin(checks::service_recovery(c)))?;
    add(Category::RELIABILITY, "Data Consistency", 3, |c| Box::pin(checks::data_consistency(c)))?;

    add(Category::COMPATIBILITY, "Native Generate API", 1, |c| Box::pin(checks::native_generate(c)))?;
    add(Category::COMPATIBILITY, "Network Conditions", 1, |c| Box::pin(checks::network_conditions(c)))?;
    add(Category::COMPATIBILITY, "Unreachable Endpoint", 1, |c| Box::pin(checks::unreachable_endpoint(c)))?;

    Ok(harness)
}

fn scale_of(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

type CheckFuture = std::pin::Pin<Box<dyn Future<Output = Result<Check>> + Send>>;
type CheckFn = fn(Arc<SuiteContext>) -> CheckFuture;

fn add_check(
    harness: &mut Harness,
    ctx: &Arc<SuiteContext>,
    category: Category,
    name: &'static str,
    scale: u32,
    check: CheckFn,
) -> Result<()> {
    let ctx = Arc::clone(ctx);
    let timeout = ctx
        .config
        .test_timeout()
        .checked_mul(scale.max(1))
        .unwrap_or(Duration::MAX);
    harness.register_case(
        TestCase::new(category, name, move || check(Arc::clone(&ctx))).with_timeout(timeout),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn context() -> Arc<SuiteContext> {
        let probe = ProbeClient::new(&ServerConfig::default()).unwrap();
        Arc::new(SuiteContext::new(probe, SuiteConfig::default()))
    }

    #[test]
    fn test_suite_layout() {
        let harness = build_suite(context()).unwrap();
        assert_eq!(harness.len(), 22);

        let first = &harness.cases()[0];
        assert_eq!(first.category(), &Category::INFRASTRUCTURE);
        assert_eq!(first.name(), "Ollama Connectivity");

        let last = harness.cases().last().unwrap();
        assert_eq!(last.category(), &Category::COMPATIBILITY);
    }

    #[test]
    fn test_long_running_checks_get_scaled_timeouts() {
        let harness = build_suite(context()).unwrap();
        let base = SuiteConfig::default().test_timeout();

        let timeout_of = |name: &str| {
            harness
                .cases()
                .iter()
                .find(|c| c.name() == name)
                .and_then(|c| c.timeout())
                .unwrap()
        };

        assert_eq!(timeout_of("English Chat"), base);
        assert_eq!(timeout_of("Rate Limiting"), base * 10);
        assert_eq!(timeout_of("Response Time"), base * 5);
        assert_eq!(timeout_of("Concurrent Requests"), base);
    }

    #[test]
    fn test_oversized_timeout_saturates_instead_of_panicking() {
        let probe = ProbeClient::new(&ServerConfig::default()).unwrap();
        let config = SuiteConfig {
            test_timeout_secs: u64::MAX / 4,
            ..SuiteConfig::default()
        };
        let harness = build_suite(Arc::new(SuiteContext::new(probe, config))).unwrap();

        let rate_limiting = harness
            .cases()
            .iter()
            .find(|c| c.name() == "Rate Limiting")
            .and_then(|c| c.timeout())
            .unwrap();
        assert_eq!(rate_limiting, Duration::MAX);
    }
}
