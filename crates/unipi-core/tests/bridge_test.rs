#![allow(clippy::unwrap_used)]
// Integration tests for `Bridge` and `Runtime` against a mocked controller.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unipi_api::TransportConfig;
use unipi_core::{
    Bridge, BridgeConfig, CommandOutcome, DeviceKind, DeviceRepository, DeviceSpec, DeviceTable,
    EvokClient, HubEvent, KindClass, RelayCommand, Runtime, kinds::classify,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Bridge<DeviceTable>) {
    setup_with(TransportConfig::default()).await
}

async fn setup_with(transport: TransportConfig) -> (MockServer, Bridge<DeviceTable>) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = EvokClient::new(base_url, &transport).unwrap();
    let config = BridgeConfig {
        heartbeat: Duration::from_millis(50),
        ..BridgeConfig::default()
    };
    (server, Bridge::with_client(config, client, DeviceTable::new()))
}

fn seed(bridge: &Bridge<DeviceTable>, unit: u32, kind: &DeviceKind, circuit: &str) {
    let class: KindClass = classify(kind);
    bridge
        .devices()
        .create(DeviceSpec::from_class(unit, format!("{} {circuit}", class.prefix), class, circuit))
        .unwrap();
}

async fn mount_all(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ── Start ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_creates_supported_devices_in_order() {
    let (server, bridge) = setup().await;
    mount_all(
        &server,
        json!([
            { "circuit": "1_01", "dev": "input", "value": 0 },
            { "circuit": "2_01", "dev": "relay", "value": 0 },
            { "circuit": "x", "dev": "wd", "value": 0 }
        ]),
    )
    .await;

    let report = bridge.on_start().await.unwrap();

    assert_eq!(report.created, vec![1, 2]);
    assert_eq!(report.units_consumed, 3);
    let records = bridge.devices().all();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Input 1_01");
    assert_eq!(records[1].name, "Relay 2_01");
    assert!(bridge.devices().get(3).is_none());
}

#[tokio::test]
async fn test_start_with_populated_table_does_nothing() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");

    Mock::given(method("GET"))
        .and(path("/rest/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    assert!(bridge.on_start().await.is_none());
    assert_eq!(bridge.devices().len(), 1);
}

#[tokio::test]
async fn test_start_with_unreachable_controller_creates_nothing() {
    let (server, bridge) = setup().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = bridge.on_start().await.unwrap();
    assert!(report.created.is_empty());
    assert!(bridge.devices().is_empty());
}

// ── Heartbeat ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_heartbeat_is_idempotent() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");
    seed(&bridge, 2, &DeviceKind::Temp, "28A");
    mount_all(
        &server,
        json!([
            { "circuit": "1_01", "dev": "input", "value": 1 },
            { "circuit": "28A", "dev": "temp", "value": 21.0 }
        ]),
    )
    .await;

    let first = bridge.on_heartbeat().await;
    assert_eq!(first.updated, vec![1, 2]);
    let version = bridge.devices().version();

    let second = bridge.on_heartbeat().await;
    assert!(!second.wrote());
    assert_eq!(bridge.devices().version(), version);

    let temp = bridge.devices().get(2).unwrap();
    assert_eq!((temp.n_value, temp.s_value.as_str()), (21, "21.0"));
}

#[tokio::test]
async fn test_heartbeat_updates_changed_input_once() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");
    bridge.devices().update(1, 0, "0").unwrap();
    mount_all(&server, json!([{ "circuit": "1_01", "dev": "input", "value": 1 }])).await;

    let before = bridge.devices().version();
    let report = bridge.on_heartbeat().await;

    assert_eq!(report.updated, vec![1]);
    assert_eq!(bridge.devices().version(), before + 1);
    let input = bridge.devices().get(1).unwrap();
    assert_eq!((input.n_value, input.s_value.as_str()), (1, "1"));
}

#[tokio::test]
async fn test_heartbeat_skips_ambiguous_and_missing_circuits() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");
    seed(&bridge, 2, &DeviceKind::Input, "1_01");
    mount_all(
        &server,
        json!([
            { "circuit": "1_01", "dev": "input", "value": 1 },
            { "circuit": "1_02", "dev": "input", "value": 1 }
        ]),
    )
    .await;

    let before = bridge.devices().version();
    let report = bridge.on_heartbeat().await;

    assert_eq!(report.ambiguous, vec!["1_01".to_string()]);
    assert_eq!(report.missing, vec!["1_02".to_string()]);
    assert_eq!(bridge.devices().version(), before);
}

#[tokio::test]
async fn test_heartbeat_ignores_null_values() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Temp, "28A");
    bridge.devices().update(1, 20, "20.0").unwrap();
    mount_all(&server, json!([{ "circuit": "28A", "dev": "temp", "value": null }])).await;

    let before = bridge.devices().version();
    let report = bridge.on_heartbeat().await;

    assert_eq!(report.no_value, vec!["28A".to_string()]);
    assert_eq!(bridge.devices().version(), before);
    assert_eq!(bridge.devices().get(1).unwrap().s_value, "20.0");
}

#[tokio::test]
async fn test_heartbeat_creates_unseen_temperature_sensor() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");
    mount_all(&server, json!([{ "circuit": "28FF01", "dev": "temp", "value": 22.5 }])).await;

    let report = bridge.on_heartbeat().await;

    assert_eq!(report.created, vec![2]);
    let sensor = bridge.devices().get(2).unwrap();
    assert_eq!(sensor.name, "Temp 2");
    assert_eq!(sensor.device_id, "28FF01");
    assert_eq!((sensor.n_value, sensor.s_value.as_str()), (22, "22.5"));
}

#[tokio::test]
async fn test_heartbeat_timeout_changes_nothing() {
    let (server, bridge) =
        setup_with(TransportConfig::default().with_timeout(Duration::from_millis(50))).await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");

    Mock::given(method("GET"))
        .and(path("/rest/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "circuit": "1_01", "dev": "input", "value": 1 }]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let before = bridge.devices().version();
    let report = bridge.on_heartbeat().await;

    assert!(!report.wrote());
    assert_eq!(bridge.devices().version(), before);
}

#[tokio::test]
async fn test_heartbeat_non_success_status_changes_nothing() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Input, "1_01");

    Mock::given(method("GET"))
        .and(path("/rest/all"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let before = bridge.devices().version();
    bridge.on_heartbeat().await;
    assert_eq!(bridge.devices().version(), before);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_off_command_success_updates_record() {
    let (server, bridge) = setup().await;
    seed(&bridge, 3, &DeviceKind::Relay, "1_01");
    bridge.devices().update(3, 1, "On").unwrap();

    Mock::given(method("POST"))
        .and(path("/rest/relay/1_01"))
        .and(body_json(json!({ "value": "0" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = bridge.on_command(3, "Off", 0).await;

    assert_eq!(outcome, CommandOutcome::Applied(RelayCommand::Off));
    let relay = bridge.devices().get(3).unwrap();
    assert_eq!((relay.n_value, relay.s_value.as_str()), (0, "Off"));
}

#[tokio::test]
async fn test_off_command_failure_keeps_record() {
    let (server, bridge) = setup().await;
    seed(&bridge, 3, &DeviceKind::Relay, "1_01");
    bridge.devices().update(3, 1, "On").unwrap();

    Mock::given(method("POST"))
        .and(path("/rest/relay/1_01"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let before = bridge.devices().version();
    let outcome = bridge.on_command(3, "Off", 0).await;

    assert_eq!(outcome, CommandOutcome::Rejected(RelayCommand::Off));
    assert_eq!(bridge.devices().version(), before);
    let relay = bridge.devices().get(3).unwrap();
    assert_eq!((relay.n_value, relay.s_value.as_str()), (1, "On"));
}

#[tokio::test]
async fn test_empty_controller_answer_is_rejected() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Relay, "2_01");

    Mock::given(method("POST"))
        .and(path("/rest/relay/2_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert_eq!(
        bridge.on_command(1, "On", 0).await,
        CommandOutcome::Rejected(RelayCommand::On)
    );
}

#[tokio::test]
async fn test_other_command_literals_switch_on() {
    let (server, bridge) = setup().await;
    seed(&bridge, 1, &DeviceKind::Relay, "2_01");

    Mock::given(method("POST"))
        .and(path("/rest/relay/2_01"))
        .and(body_json(json!({ "value": "1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = bridge.on_command(1, "Set Level", 40).await;

    assert_eq!(outcome, CommandOutcome::Applied(RelayCommand::On));
    assert_eq!(bridge.devices().get(1).unwrap().s_value, "On");
}

#[tokio::test]
async fn test_command_for_unknown_unit_sends_nothing() {
    let (server, bridge) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert_eq!(bridge.on_command(9, "On", 0).await, CommandOutcome::UnknownUnit);
}

// ── Runtime ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_runtime_starts_dispatches_and_stops() {
    let (server, bridge) = setup().await;
    mount_all(
        &server,
        json!([
            { "circuit": "1_01", "dev": "input", "value": 1 },
            { "circuit": "2_01", "dev": "relay", "value": 0 }
        ]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/rest/relay/2_01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, rx) = mpsc::channel(8);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(Runtime::new(bridge).run(rx, cancel.clone()));

    tx.send(HubEvent::Command {
        unit: 2,
        command: "On".into(),
        level: 0,
    })
    .await
    .unwrap();
    tx.send(HubEvent::Message("hello".into())).await.unwrap();
    drop(tx);

    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();
    let bridge = handle.await.unwrap();

    let input = bridge.devices().get(1).unwrap();
    assert_eq!((input.n_value, input.s_value.as_str()), (1, "1"));
    let relay = bridge.devices().get(2).unwrap();
    assert_eq!((relay.n_value, relay.s_value.as_str()), (1, "On"));
}
