//! Integration tests for Shelfscan
//!
//! These tests serve a small catalog site from wiremock and run the full
//! crawl, CSV writing and query cycle end-to-end.

mod crawl_tests;
mod fixture;
mod query_tests;
