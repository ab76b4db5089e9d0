//! Configuration integration tests
//!
//! Loading from files and overlaying environment variables.

#[cfg(test)]
mod tests {
    use mailpurge_rs::config::Config;
    use mailpurge_rs::utils::error::PurgeError;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // ==================== Files ====================

    /// A full file round-trips into every section
    #[tokio::test]
    async fn test_load_full_file() {
        let file = write_config(
            r#"
engine:
  batch_size: 10
  max_workers: 3
  min_workers: 1
  min_batch_size: 2
  max_waves: 4
  base_backoff: 2.5
  backoff_jitter: 0
  throttle_pause: 1
  submit_delay: 0.2
  adaptive_throttle: true
  hard_delete: true
http:
  timeout: 12
  max_retries: 3
  backoff_cap: 8
graph:
  base_url: "https://graph.example.com/v1.0/"
  folder: "Receipts"
  page_size: 50
"#,
        );

        let config = Config::from_file(file.path()).await.unwrap();

        assert_eq!(config.engine.batch_size, 10);
        assert_eq!(config.engine.max_workers, 3);
        assert_eq!(config.engine.max_waves, 4);
        assert_eq!(config.engine.base_backoff, Duration::from_millis(2500));
        assert_eq!(config.engine.submit_delay, Duration::from_millis(200));
        assert!(config.engine.adaptive_throttle);
        assert!(config.engine.hard_delete);
        assert_eq!(config.http.timeout, Duration::from_secs(12));
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.backoff_cap, Duration::from_secs(8));
        assert_eq!(config.graph.base_url, "https://graph.example.com/v1.0");
        assert_eq!(config.graph.folder, "Receipts");
        assert_eq!(config.graph.page_size, 50);
    }

    /// An empty document gives the defaults
    #[tokio::test]
    async fn test_empty_file_uses_defaults() {
        let file = write_config("{}\n");
        let config = Config::from_file(file.path()).await.unwrap();
        assert_eq!(config, Config::default().normalize());
    }

    /// Missing files are configuration errors
    #[tokio::test]
    async fn test_missing_file() {
        let err = Config::from_file("/nonexistent/mailpurge.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, PurgeError::Config(_)));
    }

    /// Invalid combinations are rejected after loading
    #[tokio::test]
    async fn test_invalid_file_is_rejected() {
        let file = write_config("engine:\n  max_workers: 1\n  min_workers: 3\n");
        let err = Config::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, PurgeError::Config(_)));
    }

    // ==================== Environment ====================

    /// Environment variables overlay the loaded values, legacy names included
    #[test]
    fn test_environment_overlay() {
        // SAFETY: no other test in this binary reads or writes these variables
        unsafe {
            std::env::set_var("OUTLOOK_MAX_WORKERS", "9");
            std::env::set_var("MAILPURGE_BATCH_SIZE", "15");
            std::env::set_var("MAILPURGE_ADAPTIVE_THROTTLE", "yes");
            std::env::set_var("OUTLOOK_TIMEOUT", "45");
            std::env::set_var("OUTLOOK_FOLDER", "Archive");
        }

        let config = Config::default().apply_env().unwrap();

        unsafe {
            for key in [
                "OUTLOOK_MAX_WORKERS",
                "MAILPURGE_BATCH_SIZE",
                "MAILPURGE_ADAPTIVE_THROTTLE",
                "OUTLOOK_TIMEOUT",
                "OUTLOOK_FOLDER",
            ] {
                std::env::remove_var(key);
            }
        }

        assert_eq!(config.engine.max_workers, 9);
        assert_eq!(config.engine.batch_size, 15);
        assert!(config.engine.adaptive_throttle);
        assert_eq!(config.http.timeout, Duration::from_secs(45));
        assert_eq!(config.graph.folder, "Archive");
    }
}
