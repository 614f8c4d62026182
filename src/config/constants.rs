// Project-wide constants
//
// Centralised here so ports, caps and timeouts have one source of truth.

/// Default bind address for the HTTP server.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default number of refinement-loop iterations per run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Maximum jobs held in the store before eviction kicks in.
pub const MAX_SESSIONS: usize = 1000;

/// Minutes after creation at which a non-running job expires.
pub const JOB_TTL_MINUTES: i64 = 30;

/// Wall-clock deadline for a single LLM call, in seconds.
pub const LLM_CALL_DEADLINE_SECS: u64 = 120;

/// Bounded buffer size per progress subscriber; overflow drops the
/// subscriber rather than stalling the broadcast.
pub const SUBSCRIBER_CHANNEL_CAPACITY: usize = 64;

/// Request body limit. 4MB is generous for a project configuration while
/// blocking obvious oversized payloads.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Maximum orchestrations running concurrently across all users.
pub const MAX_CONCURRENT_JOBS: usize = 8;

/// Maximum orchestrations running concurrently for a single user.
pub const MAX_CONCURRENT_JOBS_PER_USER: usize = 2;
