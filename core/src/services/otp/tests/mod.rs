mod backoff_tests;
mod rate_limit_tests;
