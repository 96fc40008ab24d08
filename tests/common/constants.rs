//! Shared constants for end-to-end tests

// ============================================================================
// Request payloads
// ============================================================================

/// Smallest base64 payload the server accepts as a JPEG.
pub const TEST_IMAGE_B64: &str = "/9j/4AAQSkZJRgBtb29kc3luYy10ZXN0LWltYWdl/9k=";

/// Same image as a browser `FileReader` data URL.
pub const TEST_IMAGE_DATA_URL: &str =
    "data:image/jpeg;base64,/9j/4AAQSkZJRgBtb29kc3luYy10ZXN0LWltYWdl/9k=";

pub const TEST_GENRE: &str = "jazz";

// ============================================================================
// Expected responses
// ============================================================================

pub const REQUIRED_FIELDS_ERROR: &str = "Image and genre are required";
pub const GENERATION_FAILED_ERROR: &str = "Failed to analyze mood and generate playlist";
pub const METHOD_NOT_ALLOWED_ERROR: &str = "Method not allowed";

// ============================================================================
// Timing
// ============================================================================

/// Maximum time to wait for the server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout for individual test requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
