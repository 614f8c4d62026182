// Configuration loader
// Reads the API key and tunables from the environment

use anyhow::{bail, Result};

use super::settings::Config;

/// Load configuration from the environment.
///
/// `GEMINI_API_KEY` is mandatory; the service fails fast without it rather
/// than failing the first generation request.
pub fn load_config() -> Result<Config> {
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => key,
        _ => bail!(
            "Gemini API key not found\n\n\
             Set the environment variable before starting the server:\n\
             export GEMINI_API_KEY=\"...\"\n\n\
             Keys are issued at https://aistudio.google.com/apikey"
        ),
    };

    let mut config = Config::new(api_key);

    if let Ok(bind) = std::env::var("PLANFORGE_BIND") {
        if !bind.trim().is_empty() {
            config.server.bind_address = bind;
        }
    }
    if let Ok(iterations) = std::env::var("PLANFORGE_MAX_ITERATIONS") {
        match iterations.parse::<u32>() {
            Ok(n) if n >= 1 => config.max_iterations = n,
            _ => tracing::warn!("Ignoring invalid PLANFORGE_MAX_ITERATIONS={iterations}"),
        }
    }
    if let Ok(threshold) = std::env::var("PLANFORGE_SCORE_THRESHOLD") {
        match threshold.parse::<f64>() {
            Ok(t) if (0.0..=1.0).contains(&t) => config.score_threshold = t,
            _ => tracing::warn!("Ignoring invalid PLANFORGE_SCORE_THRESHOLD={threshold}"),
        }
    }

    Ok(config)
}
