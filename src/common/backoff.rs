use aws_sdk_dynamodb::{Client, config::AsyncSleep};
use std::time;

/// Maximum number of requests sent for one batch chunk, the first one included.
///
/// Entries DynamoDB still reports as unprocessed after the last attempt are
/// handed back to the caller.
pub const MAX_ATTEMPTS: u32 = 5;

const BASE_DELAY: time::Duration = time::Duration::from_millis(50);
const MAX_DELAY: time::Duration = time::Duration::from_secs(1);

/// Delay before the retry following `attempt` (zero-based), doubling up to a cap.
pub(crate) fn delay(attempt: u32) -> time::Duration {
    BASE_DELAY
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_DELAY)
}

/// Wait before the next attempt, using the sleep implementation of the client.
pub(crate) async fn wait(client: &Client, attempt: u32) {
    if let Some(sleep) = client.config().sleep_impl() {
        sleep.sleep(delay(attempt)).await;
    }
}
