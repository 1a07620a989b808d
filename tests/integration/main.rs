//! Integration tests for the harvester
//!
//! Partitioning and pagination run against a scripted in-memory fetcher;
//! the HTTP fetcher is exercised end-to-end against wiremock servers.

mod common;
mod harvest_tests;
