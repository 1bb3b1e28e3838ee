//! Fail-open helper for work that must never abort a test step
//!
//! Model backend requests and diagnostics writes go through [`fail_open`]:
//! a failure is logged and turned into `None` so the caller carries on.
//!
//! Element lookups are NOT fail-open. A lookup collaborator error has to
//! reach the caller unchanged.

use std::future::Future;
use tracing::warn;

use crate::Result;

/// Run `f`, logging and discarding its error
///
/// # Usage
///
/// ```no_run
/// use medic_core::fail_open::fail_open;
/// use medic_core::Result;
///
/// async fn ask_backend() -> Result<String> {
///     Ok("#search".to_string())
/// }
///
/// async fn example() {
///     let suggestion = fail_open("model_client[local]", || ask_backend())
///         .await
///         .unwrap_or_default();
///     // suggestion is empty if the backend failed
/// }
/// ```
pub async fn fail_open<F, Fut, T>(operation_name: &str, f: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match f().await {
        Ok(val) => Some(val),
        Err(e) => {
            warn!("{} failed (fail-open): {}", operation_name, e);
            None
        }
    }
}
