//! Integration tests for the DealRoom HTTP API.
//!
//! The real router runs over in-memory store fakes, a temp-dir local
//! storage provider, and a scripted calendar provider, so the suite is
//! hermetic.

mod helpers;

mod meeting_test;
