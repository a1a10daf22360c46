//! Wires CLI flags and environment variables onto [`gce_core::GceConfig`].

use gce_core::GceConfig;

fn env_f32(name: &str) -> Option<f32> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// `--threshold` wins over `GCE_SIMILARITY_THRESHOLD`, which wins over the
/// config default.
pub fn resolve_config(threshold_flag: Option<f32>) -> GceConfig {
    let mut config = GceConfig::default();
    if let Some(t) = threshold_flag.or_else(|| env_f32("GCE_SIMILARITY_THRESHOLD")) {
        config.similarity_threshold = t;
    }
    if let Some(enabled) = std::env::var("GCE_POINCARE").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
        config.poincare_enabled = enabled;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_overrides_default() {
        let config = resolve_config(Some(0.7));
        assert_eq!(config.similarity_threshold, 0.7);
    }

    #[test]
    fn no_flag_keeps_default() {
        std::env::remove_var("GCE_SIMILARITY_THRESHOLD");
        let config = resolve_config(None);
        assert_eq!(config.similarity_threshold, GceConfig::default().similarity_threshold);
    }
}
