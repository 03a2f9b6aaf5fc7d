use rowforge::telemetry::{init_json_tracing, init_tracing};

#[test]
fn subscriber_is_installed_only_once() {
    assert!(init_tracing("rowforge=debug"));
    tracing::info!(table = "orders", "subscriber installed");

    assert!(!init_tracing("rowforge=debug"));
    assert!(!init_json_tracing("info"));
}
