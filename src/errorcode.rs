//! Splits failures into the ones a caller has to fix and the ones worth retrying.

use crate::error::Error;

/// Codes with this prefix mean the caller's credentials or permissions are wrong.
pub const AUTH_FAILURE_PREFIX: &str = "AuthFailure.";
/// The resource has data-flow authentication switched off.
pub const DATA_FLOW_AUTH_CLOSE: &str = "ResourceNotFound.DataFlowAuthClose";

/// Returns true when the error needs attention from the caller and must not be
/// retried or papered over with a cached or fallback token.
///
/// Only errors returned by the issuance service are inspected. Everything else,
/// including `None`, counts as transient.
pub fn is_user_actionable(error: Option<&Error>) -> bool {
    let Some(Error::Remote(remote)) = error else {
        return false;
    };

    let code = remote.code.as_str();
    if code.is_empty() {
        return false;
    }

    starts_with_ignore_case(code, AUTH_FAILURE_PREFIX) || code.eq_ignore_ascii_case(DATA_FLOW_AUTH_CLOSE)
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
