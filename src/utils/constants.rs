//! Shared constants and invariants

/// Joins identity fields in cache keys, key derivation and fallback file names.
pub const DELIMITER: &str = "_";

pub const CAM_ENDPOINT: &str = "cam.tencentcloudapi.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Escrowed fallback passwords live here, relative to the base directory.
pub const FALLBACK_INPUT_DIR: &str = ".com.tencentcloudapi/tencentcloud-dbauth-sdk-rust/input";
pub const FALLBACK_FILE_EXTENSION: &str = "pwd";
pub const MAX_FALLBACK_FILE_SIZE: u64 = 200;

/// Upper bound for a renewal delay, and the lifetime given to a fallback token.
pub const MAX_DELAY_MS: i64 = 24 * 60 * 60 * 1000;
/// Renewal always happens at least this often; also the backoff after a failed renewal.
pub const TOKEN_UPDATE_INTERVAL_MS: i64 = 5000;

pub const ISSUE_ATTEMPTS: u32 = 3;
