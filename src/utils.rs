use std::{fmt::Display, future::Future, time::Duration};

use chrono::{Days, NaiveDate};

use crate::{error::ScrapeError, warning};

/// Bounded retry with exponential backoff and no jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub tries: u32,
    pub delay: Duration,
    pub backoff: f64,
}

impl RetryPolicy {
    pub fn new(tries: u32, delay: Duration, backoff: f64) -> Self {
        Self {
            tries,
            delay,
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), 2.0)
    }
}

/// Runs `operation` under `policy`, sleeping with tokio between attempts.
///
/// See [`with_retry_using`] for the exact semantics.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_using(policy, label, operation, tokio::time::sleep).await
}

/// Runs `operation` up to `policy.tries` times.
///
/// After every failed attempt but the last, a warning is logged, `sleep` is
/// awaited with the current delay and the delay is multiplied by
/// `policy.backoff`. The error of the final attempt is returned unchanged.
/// A policy with zero tries still makes one attempt.
///
/// # Arguments
///
/// * `policy` - Number of tries, initial delay and backoff multiplier
/// * `label` - Describes the operation in the retry warning, e.g. the URL
/// * `operation` - Produces a fresh future for every attempt
/// * `sleep` - Waits between attempts
pub async fn with_retry_using<T, E, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
    mut sleep: S,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let tries = policy.tries.max(1);
    let mut delay = policy.delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= tries => return Err(err),
            Err(err) => {
                warning!(
                    "Attempt {}/{} for {} failed: {}. Retrying in {:.1}s",
                    attempt,
                    tries,
                    label,
                    err,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
                delay = delay.mul_f64(policy.backoff);
                attempt += 1;
            }
        }
    }
}

/// Joins a base title with its mix qualifier.
///
/// The qualifier is kept only when it mentions a remix; anything else
/// ("Radio Edit", "Extended Mix", ..) is dropped.
pub fn compose_title(base: &str, qualifier: Option<&str>) -> String {
    let base = base.trim();
    match qualifier.map(str::trim) {
        Some(q) if q.to_lowercase().contains("remix") => format!("{base} {q}"),
        _ => base.to_string(),
    }
}

/// Parses a date scraped from a source page.
pub fn parse_source_date(value: &str, format: &'static str) -> Result<NaiveDate, ScrapeError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, format).map_err(|source| ScrapeError::InvalidDate {
        value: value.to_string(),
        format,
        source,
    })
}

/// Parses a day-precision release date reported by the playlist service.
///
/// Returns `None` for year or month precision dates (`2024`, `2024-03`).
pub fn parse_service_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// First release date inside a window of the last `days` days.
///
/// Release dates are midnight timestamps, so once `today` has started a
/// release dated exactly `days` days ago is already older than
/// `now - days`. The window therefore starts the day after. `None` when
/// the date falls outside the calendar range.
pub fn window_start(today: NaiveDate, days: u32) -> Option<NaiveDate> {
    today
        .checked_sub_days(Days::new(u64::from(days)))?
        .checked_add_days(Days::new(1))
}
