// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry backoff between attempts within a window (§4.8): exponential,
//! starting at 30s, doubling, capped at 5 min, with small jitter.

use std::time::Duration;

/// Starting delay before the second attempt.
pub const MIN_BACKOFF: Duration = Duration::from_secs(30);
/// Delay never grows past this, however many attempts have failed.
pub const MAX_BACKOFF: Duration = Duration::from_secs(5 * 60);

/// Base delay (no jitter) before the attempt numbered `attempts_so_far + 1`.
/// `attempts_so_far` is the number of attempts already made this window
/// (i.e. `StepState::attempts_today` at the moment of failure). Pure and
/// deterministic so it is exhaustively testable without a clock or RNG.
pub fn backoff_delay(attempts_so_far: u32) -> Duration {
    let exponent = attempts_so_far.saturating_sub(1).min(10);
    let scaled = MIN_BACKOFF.saturating_mul(1u32 << exponent);
    scaled.min(MAX_BACKOFF)
}

/// Apply up to ±20% jitter to `delay`, so a fleet of steps retrying at
/// once doesn't hammer the legacy app in lockstep.
pub fn jittered(delay: Duration) -> Duration {
    use rand::Rng;
    let jitter_frac = rand::thread_rng().gen_range(-0.2..=0.2);
    let millis = delay.as_millis() as f64 * (1.0 + jitter_frac);
    Duration::from_millis(millis.max(0.0) as u64)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
