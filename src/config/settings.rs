// Configuration structs

use super::constants;

#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key (required; startup fails without it)
    pub api_key: String,

    /// Iteration cap for the refinement loop
    pub max_iterations: u32,

    /// Convergence threshold the weighted score must reach
    pub score_threshold: f64,

    /// Server configuration
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    pub bind_address: String,
    /// Maximum number of jobs held in memory
    pub max_sessions: usize,
    /// Minutes after which finished jobs expire
    pub job_ttl_minutes: i64,
    /// Global cap on concurrently running orchestrations
    pub max_concurrent_jobs: usize,
    /// Per-user cap on concurrently running orchestrations
    pub max_concurrent_jobs_per_user: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: constants::DEFAULT_BIND_ADDR.to_string(),
            max_sessions: constants::MAX_SESSIONS,
            job_ttl_minutes: constants::JOB_TTL_MINUTES,
            max_concurrent_jobs: constants::MAX_CONCURRENT_JOBS,
            max_concurrent_jobs_per_user: constants::MAX_CONCURRENT_JOBS_PER_USER,
        }
    }
}

impl Config {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            max_iterations: constants::DEFAULT_MAX_ITERATIONS,
            score_threshold: crate::scoring::DEFAULT_THRESHOLD,
            server: ServerConfig::default(),
        }
    }
}
