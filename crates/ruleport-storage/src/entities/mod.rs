pub mod alert_config;
pub mod anomaly_function;
pub mod dataset_config;
pub mod detection_alert_config;
pub mod detection_config;
pub mod merged_anomaly;
pub mod metric_config;
