//! Configuration for the OCR gateway

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub queue: QueueConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Uploads larger than this are rejected before queueing.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Concurrency limiter capacity: simultaneous OCR invocations.
    pub concurrency: usize,
    /// Maximum queue length; `None` disables backpressure.
    pub max_depth: Option<usize>,
    /// Disabling the reaper recovers the unreaped variant of the gateway.
    pub reaper_enabled: bool,
    pub reaper_interval: Duration,
    /// Records younger than this are never reaped, so a fresh upload
    /// survives until its client has had a chance to open a position feed.
    pub reaper_grace: Duration,
    /// Cadence of the queue position push stream.
    pub notifier_poll: Duration,
}

#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Detections with confidence at or below this are discarded.
    pub confidence_threshold: f32,
    /// Reduce to a single luma channel before detection to save memory.
    pub grayscale: bool,
    /// Explicit model directory; when unset, well-known locations are probed.
    pub models_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                max_upload_bytes: 5 * 1024 * 1024,
            },
            queue: QueueConfig {
                concurrency: 2,
                max_depth: None,
                reaper_enabled: true,
                reaper_interval: Duration::from_secs(30),
                reaper_grace: Duration::from_secs(30),
                notifier_poll: Duration::from_secs(1),
            },
            ocr: OcrConfig {
                confidence_threshold: 0.1,
                grayscale: true,
                models_dir: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port),
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes),
            },
            queue: QueueConfig {
                concurrency: parse_var("OCR_CONCURRENCY", defaults.queue.concurrency).max(1),
                max_depth: match parse_var("QUEUE_MAX_DEPTH", 0usize) {
                    0 => None,
                    depth => Some(depth),
                },
                reaper_enabled: parse_var("REAPER_ENABLED", defaults.queue.reaper_enabled),
                reaper_interval: Duration::from_secs(parse_var("REAPER_INTERVAL_SECS", 30)),
                reaper_grace: Duration::from_secs(parse_var("REAPER_GRACE_SECS", 30)),
                notifier_poll: Duration::from_millis(parse_var("NOTIFIER_POLL_MS", 1000)),
            },
            ocr: OcrConfig {
                confidence_threshold: parse_var(
                    "OCR_CONFIDENCE_THRESHOLD",
                    defaults.ocr.confidence_threshold,
                ),
                grayscale: parse_var("OCR_GRAYSCALE", defaults.ocr.grayscale),
                models_dir: env::var("OCRS_MODELS_DIR").ok().map(PathBuf::from),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_knobs() {
        let config = Config::default();

        assert_eq!(config.queue.concurrency, 2);
        assert_eq!(config.server.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.queue.reaper_interval, Duration::from_secs(30));
        assert_eq!(config.queue.notifier_poll, Duration::from_secs(1));
        assert_eq!(config.ocr.confidence_threshold, 0.1);
        assert!(config.queue.max_depth.is_none());
    }
}
