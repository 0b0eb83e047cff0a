pub mod common;

mod retry_policy;
mod token_cache_and_fallback;
