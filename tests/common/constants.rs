//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When fixture data changes (users, lessons, reports), update only this file.
#![allow(dead_code)]

// ============================================================================
// Admin
// ============================================================================

/// Admin identity sent in the X-Admin-Email header
pub const ADMIN_EMAIL: &str = "admin@lifenotes.test";

// ============================================================================
// Fixture Users
// ============================================================================

/// Created at the start of today
pub const ALICE_EMAIL: &str = "alice@lifenotes.test";

/// Created two days ago
pub const BOB_EMAIL: &str = "bob@lifenotes.test";

/// Created forty days ago, outside the default growth window
pub const CAROL_EMAIL: &str = "carol@lifenotes.test";

pub const FIXTURE_USER_COUNT: u64 = 3;

// ============================================================================
// Fixture Lessons
// ============================================================================

/// "Letting go" by Alice: grief, Public, featured, 10 likes, 2 favorites, today
pub const LESSON_LETTING_GO: &str = "lesson-letting-go";

/// "Morning pages" by Bob: growth, Public, 3 likes, 1 favorite, two days ago.
/// Has 5 pending reports.
pub const LESSON_MORNING_PAGES: &str = "lesson-morning-pages";

/// "Quiet grief" by Bob: grief, Private, no engagement, five days ago.
/// Has 2 pending reports.
pub const LESSON_QUIET_GRIEF: &str = "lesson-quiet-grief";

/// "Career pivots" by Carol: career, Public, featured, 5 likes, 5 favorites,
/// forty days ago. Has 1 ignored report.
pub const LESSON_CAREER_PIVOTS: &str = "lesson-career-pivots";

pub const FIXTURE_LESSON_COUNT: u64 = 4;

/// Sum of likes and favorites across fixture lessons
pub const FIXTURE_TOTAL_ENGAGEMENT: i64 = 26;

/// Lessons with at least one pending report
pub const FIXTURE_REPORTED_LESSONS: u64 = 2;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Default timeout for HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Servers are not spawned this close to UTC midnight, so that fixtures seeded
/// relative to "today" and the server's own clock agree on the day
pub const MIDNIGHT_GUARD_SECS: i64 = 60;
