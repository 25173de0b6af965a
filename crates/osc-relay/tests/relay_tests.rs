//! Client Broadcast Relay Tests
//!
//! Covers:
//! - Registry bookkeeping across connect/disconnect sequences
//! - Rebroadcast targets (sender excluded, unknown sender)
//! - Pass-through of the filtered message
//! - Controller handshake and client-count notifications
//! - Init failures on missing or malformed configuration

use osc_relay::{
    ClientBroadcastRelay, ClientId, ControllerEndpoint, CustomModule, HostAction, OscType,
    RelayConfig, RelayError, Settings, GUI_CLIENTS_ADDRESS, SERVER_READY_ADDRESS,
};
use osc_relay_test_utils::{
    init_tracing, message_from, ready_relay, RecordingHost, GUI_HOST, GUI_PORT,
};

fn quiet() -> RelayConfig {
    RelayConfig {
        notify_controller: false,
        ..Default::default()
    }
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_registry_tracks_distinct_clients() {
    init_tracing();
    let (mut relay, _host) = ready_relay(quiet());

    relay.connect("a".into());
    relay.connect("b".into());
    relay.connect("a".into());
    assert_eq!(relay.client_count(), 2);

    relay.disconnect(&"a".into());
    assert_eq!(relay.client_count(), 1);
    assert!(!relay.is_connected(&"a".into()));
    assert!(relay.is_connected(&"b".into()));

    relay.disconnect(&"a".into());
    relay.disconnect(&"b".into());
    assert_eq!(relay.client_count(), 0);
    assert!(relay.clients().is_empty());
}

#[test]
fn test_disconnect_unknown_client_is_noop() {
    let (mut relay, host) = ready_relay(quiet());
    relay.connect("a".into());

    relay.disconnect(&"ghost".into());

    assert_eq!(relay.clients(), vec![ClientId::from("a")]);
    assert!(host.actions().is_empty());
}

// ============================================================================
// Rebroadcast Tests
// ============================================================================

#[test]
fn test_rebroadcast_to_every_other_client() {
    let (mut relay, host) = ready_relay(quiet());
    for id in ["A", "B", "C"] {
        relay.connect(id.into());
    }

    let message = message_from("A", "/x", vec![OscType::Int(1), OscType::Int(2)]);
    relay.filter_outbound(message);

    assert_eq!(host.relayed_to(), vec!["B", "C"]);
    for action in host.actions() {
        match action {
            HostAction::Receive {
                host,
                port,
                address,
                args,
                ..
            } => {
                assert_eq!(host, GUI_HOST);
                assert_eq!(port, GUI_PORT);
                assert_eq!(address, "/x");
                assert_eq!(args, vec![OscType::Int(1), OscType::Int(2)]);
            }
            other => panic!("Unexpected host action: {:?}", other),
        }
    }
}

#[test]
fn test_sole_client_gets_no_rebroadcast() {
    let (mut relay, host) = ready_relay(quiet());
    relay.connect("A".into());

    relay.filter_outbound(message_from("A", "/fader", vec![OscType::Float(0.5)]));

    assert!(host.relayed().is_empty());
}

#[test]
fn test_unregistered_sender_reaches_all_clients() {
    let (mut relay, host) = ready_relay(quiet());
    relay.connect("A".into());
    relay.connect("B".into());

    relay.filter_outbound(message_from("server", "/meter", vec![]));

    assert_eq!(host.relayed_to(), vec!["A", "B"]);
}

#[test]
fn test_rebroadcast_count_matches_registry() {
    let (mut relay, host) = ready_relay(quiet());
    let ids: Vec<String> = (0..6).map(|i| format!("client-{}", i)).collect();
    for id in &ids {
        relay.connect(id.as_str().into());
    }

    for sender in &ids {
        host.clear();
        relay.filter_outbound(message_from(sender.as_str(), "/x", vec![]));
        let recipients = host.relayed_to();
        assert_eq!(recipients.len(), ids.len() - 1);
        assert!(!recipients.contains(sender), "{} received its own message", sender);
    }
}

#[test]
fn test_numeric_sender_id_is_excluded() {
    let (mut relay, host) = ready_relay(quiet());
    relay.connect(ClientId::from("1"));
    relay.connect(ClientId::from("2"));

    relay.filter_outbound(message_from(1u64, "/x", vec![]));

    assert_eq!(host.relayed_to(), vec!["2"]);
}

#[test]
fn test_filter_returns_message_unchanged() {
    let (mut relay, _host) = ready_relay(quiet());
    relay.connect("A".into());
    relay.connect("B".into());

    let message = message_from(
        "A",
        "/eq/gain",
        vec![OscType::String("low".to_string()), OscType::Double(-3.5)],
    );
    let filtered = relay.filter_outbound(message.clone());

    assert_eq!(filtered, message);
}

#[test]
fn test_receive_failure_does_not_stop_rebroadcast() {
    let (mut relay, host) = ready_relay(quiet());
    relay.connect("A".into());
    relay.connect("B".into());
    host.fail_receives(true);

    let message = message_from("A", "/x", vec![]);
    let filtered = relay.filter_outbound(message.clone());

    assert_eq!(filtered, message);
    assert!(host.relayed().is_empty());
}

// ============================================================================
// Controller Notification Tests
// ============================================================================

#[test]
fn test_init_announces_server_ready() {
    init_tracing();
    let host = RecordingHost::with_controller();
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    relay.init().expect("init failed");

    assert_eq!(
        relay.controller(),
        Some(&ControllerEndpoint::new("127.0.0.1", 5555))
    );
    assert_eq!(
        host.actions(),
        vec![HostAction::Send {
            host: "127.0.0.1".to_string(),
            port: 5555,
            address: SERVER_READY_ADDRESS.to_string(),
            args: vec![],
        }]
    );
}

#[test]
fn test_init_uses_first_send_target() {
    let host = RecordingHost::new(Settings::with_send(["10.0.0.2:9000", "10.0.0.3:9001"]));
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    relay.init().expect("init failed");

    assert_eq!(
        relay.controller(),
        Some(&ControllerEndpoint::new("10.0.0.2", 9000))
    );
}

#[test]
fn test_init_without_notifications_still_announces() {
    let host = RecordingHost::with_controller();
    let mut relay = ClientBroadcastRelay::new(quiet(), host.capabilities());

    relay.init().expect("init failed");
    relay.connect("A".into());
    relay.disconnect(&"A".into());

    assert_eq!(
        host.sent(),
        vec![(SERVER_READY_ADDRESS.to_string(), vec![])]
    );
}

#[test]
fn test_client_count_notifications() {
    let (mut relay, host) = ready_relay(RelayConfig::default());

    relay.connect("A".into());
    relay.connect("B".into());
    relay.disconnect(&"A".into());

    assert_eq!(host.client_counts(), vec![1, 2, 1]);
    assert!(host
        .sent()
        .iter()
        .all(|(address, _)| address == GUI_CLIENTS_ADDRESS));
}

#[test]
fn test_unknown_disconnect_reports_unchanged_count() {
    let (mut relay, host) = ready_relay(RelayConfig::default());
    relay.connect("A".into());

    relay.disconnect(&"ghost".into());

    assert_eq!(host.client_counts(), vec![1, 1]);
}

#[test]
fn test_counts_skipped_before_init() {
    let host = RecordingHost::with_controller();
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    relay.connect("A".into());
    assert!(host.actions().is_empty());

    relay.init().expect("init failed");
    relay.connect("B".into());
    assert_eq!(host.client_counts(), vec![2]);
}

#[test]
fn test_send_failure_does_not_affect_registry() {
    let (mut relay, host) = ready_relay(RelayConfig::default());
    host.fail_sends(true);

    relay.connect("A".into());

    assert!(relay.is_connected(&"A".into()));
    assert!(host.sent().is_empty());
}

// ============================================================================
// Init Failure Tests
// ============================================================================

#[test]
fn test_init_fails_without_send_setting() {
    let host = RecordingHost::new(Settings::new());
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    let err = relay.init().unwrap_err();

    assert!(matches!(err, RelayError::Config(_)), "got {:?}", err);
    assert!(relay.controller().is_none());
    assert!(host.actions().is_empty());
}

#[test]
fn test_init_fails_with_empty_send_list() {
    let host = RecordingHost::new(Settings::with_send(Vec::<String>::new()));
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    assert!(matches!(relay.init(), Err(RelayError::Config(_))));
    assert!(host.actions().is_empty());
}

#[test]
fn test_init_fails_with_malformed_target() {
    let host = RecordingHost::new(Settings::with_send(["no-port-here"]));
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    assert!(matches!(
        relay.init(),
        Err(RelayError::InvalidEndpoint { .. })
    ));
    assert!(host.actions().is_empty());
}

#[test]
fn test_init_reports_mistyped_send_setting() {
    let settings = Settings::from_json_str(r#"{"send": [5555]}"#).unwrap();
    let host = RecordingHost::new(settings);
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    let err = relay.init().unwrap_err();

    assert!(matches!(err, RelayError::Settings(_)), "got {:?}", err);
    assert!(relay.controller().is_none());
    assert!(host.actions().is_empty());
}

#[test]
fn test_init_propagates_send_failure() {
    let host = RecordingHost::with_controller();
    host.fail_sends(true);
    let mut relay = ClientBroadcastRelay::new(RelayConfig::default(), host.capabilities());

    assert!(matches!(relay.init(), Err(RelayError::Host(_))));
    assert!(relay.controller().is_none());
}

#[test]
fn test_custom_controller_key() {
    let mut settings = Settings::new();
    settings.set("mentat", serde_json::json!("192.168.1.4:7000"));
    let host = RecordingHost::new(settings);
    let config = RelayConfig {
        controller_key: "mentat".to_string(),
        ..Default::default()
    };
    let mut relay = ClientBroadcastRelay::new(config, host.capabilities());
    assert_eq!(relay.config().controller_key, "mentat");

    relay.init().expect("init failed");

    assert_eq!(
        relay.controller(),
        Some(&ControllerEndpoint::new("192.168.1.4", 7000))
    );
}

// ============================================================================
// Plugin Contract Tests
// ============================================================================

#[test]
fn test_hooks_through_custom_module_trait() {
    let host = RecordingHost::with_controller();
    let mut module: Box<dyn CustomModule> = Box::new(ClientBroadcastRelay::new(
        RelayConfig::default(),
        host.capabilities(),
    ));

    module.init().expect("init failed");
    module.on_connect("A".into());
    module.on_connect("B".into());
    let message = message_from("B", "/mute", vec![OscType::Bool(true)]);
    assert_eq!(module.filter_outbound(message.clone()), message);
    module.on_disconnect(&"B".into());

    assert_eq!(host.client_counts(), vec![1, 2, 1]);
    assert_eq!(host.relayed_to(), vec!["A"]);
}
