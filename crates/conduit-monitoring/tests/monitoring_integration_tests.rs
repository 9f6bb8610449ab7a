use conduit_monitoring::{init_logging, LogExt, MonitoringConfig};

#[test]
fn test_init_logging_once_per_process() {
    let config = MonitoringConfig {
        enable_json_logging: true,
        log_filter: "debug".to_string(),
        ..MonitoringConfig::default()
    };

    init_logging(&config).expect("first initialization succeeds");
    tracing::debug!(position = 1, "event after init");

    let second = init_logging(&MonitoringConfig::default());
    assert!(second.is_err());

    let result: Result<(), String> = Err("persistence unavailable".to_string());
    assert!(result.log_err("save failed").is_err());
}
