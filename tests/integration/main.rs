//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to stand in for the decisions search site and
//! run full harvests end-to-end against it.

mod harvest_tests;
