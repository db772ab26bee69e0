//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, fake upstream answers, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Regular test user email, used to log in
pub const TEST_EMAIL: &str = "testuser@example.com";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Regular test user full name
pub const TEST_FULL_NAME: &str = "Test User";

/// Second user, for isolation checks
pub const OTHER_USER: &str = "otheruser";

/// Second user email
pub const OTHER_EMAIL: &str = "other@example.com";

/// Second user password
pub const OTHER_PASS: &str = "otherpass123";

// ============================================================================
// Collaborators
// ============================================================================

/// Band powers reported by the fixed EEG feed, Alpha dominant
pub const FEED_SAMPLE: [f64; 5] = [30.0, 10.0, 5.0, 2.0, 1.0];

/// Text the fake chat completion API answers with
pub const LLM_REPLY: &str = "I'm here for you. What's on your mind?";

/// Base64 payload the fake classifier recognizes as a happy face
pub const HAPPY_FACE_B64: &str = "aGFwcHk=";

/// Base64 payload the fake classifier fails to run its model on
pub const BROKEN_FACE_B64: &str = "YnJva2Vu";

/// Base64 payload the fake classifier rejects as not an image
pub const NOT_A_FACE_B64: &str = "bm9wZQ==";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout for individual HTTP requests in tests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
