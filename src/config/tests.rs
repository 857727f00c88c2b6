//! Tests for config parsing and validation.

use super::*;

fn minimal_yaml() -> &'static str {
    r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: ["203.0.113.1"]
"#
}

#[test]
fn parses_minimal_config_with_defaults() {
    let config = GlobalConfig::from_yaml(minimal_yaml()).unwrap();

    assert_eq!(config.asn, 64496);
    assert_eq!(config.router_id, "192.0.2.1");
    assert_eq!(config.bird_directory, std::path::Path::new("/etc/bird"));
    assert_eq!(config.bird_socket, std::path::Path::new("/run/bird/bird.ctl"));
    assert_eq!(config.irr_server, "rr.ntt.net:43");
    assert_eq!(config.registry_timeout_secs, 10);
    assert!(config.event_log.is_none());
    assert!(config.vrrp.is_none());
    assert!(config.ui_file.is_none());
    assert_eq!(config.peers.len(), 1);
}

#[test]
fn peer_defaults_are_unset() {
    let config = GlobalConfig::from_yaml(minimal_yaml()).unwrap();
    let peer = &config.peers["example"];

    assert_eq!(peer.session_type, SessionType::Peer);
    assert!(peer.as_set.is_none());
    assert!(peer.import_limit4.is_none());
    assert!(peer.import_limit6.is_none());
    assert!(!peer.no_enrich);
}

#[test]
fn derived_fields_are_empty_after_parse() {
    let config = GlobalConfig::from_yaml(minimal_yaml()).unwrap();
    let peer = &config.peers["example"];

    assert!(peer.protocol_name.is_empty());
    assert!(peer.prefix_set4.is_empty());
    assert!(peer.prefix_set6.is_empty());
    assert!(peer.query_time.is_none());
}

#[test]
fn derived_fields_are_never_serialized() {
    let mut config = GlobalConfig::from_yaml(minimal_yaml()).unwrap();
    let peer = config.peers.get_mut("example").unwrap();
    peer.protocol_name = "example".to_string();
    peer.prefix_set4 = vec!["203.0.113.0/24".to_string()];
    peer.query_time = Some("now".to_string());

    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(!yaml.contains("protocol_name"));
    assert!(!yaml.contains("prefix_set4"));
    assert!(!yaml.contains("query_time"));
}

#[test]
fn parses_session_types() {
    for (text, expected) in [
        ("peer", SessionType::Peer),
        ("downstream", SessionType::Downstream),
        ("upstream", SessionType::Upstream),
    ] {
        let yaml = format!(
            r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    type: {}
    neighbors: ["203.0.113.1"]
"#,
            text
        );
        let config = GlobalConfig::from_yaml(&yaml).unwrap();
        assert_eq!(config.peers["example"].session_type, expected);
    }
}

#[test]
fn rejects_unknown_session_type() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    type: sideways
    neighbors: ["203.0.113.1"]
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn filtering_requirement_by_session_type() {
    assert!(SessionType::Peer.requires_filtering());
    assert!(SessionType::Downstream.requires_filtering());
    assert!(!SessionType::Upstream.requires_filtering());
}

#[test]
fn rejects_zero_asn() {
    let yaml = r#"
asn: 0
router_id: 192.0.2.1
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn rejects_bad_router_id() {
    let yaml = r#"
asn: 64496
router_id: not-an-address
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn rejects_peer_without_neighbors() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: []
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn rejects_invalid_neighbor_address() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: ["not.an.ip"]
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn accepts_ipv6_neighbors() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: ["2001:db8::1", "203.0.113.1"]
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_ok());
}

#[test]
fn accepts_valid_as_set_names() {
    for as_set in ["AS64511", "AS-EXAMPLE", "as-example", "AS64511:AS-CUSTOMERS"] {
        let yaml = format!(
            r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: ["203.0.113.1"]
    as_set: "{}"
"#,
            as_set
        );
        assert!(
            GlobalConfig::from_yaml(&yaml).is_ok(),
            "expected '{}' to validate",
            as_set
        );
    }
}

#[test]
fn rejects_malformed_as_set() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: ["203.0.113.1"]
    as_set: "RIPE::AS-EXAMPLE AS-OTHER"
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn explicit_import_limits_survive_parse() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
    asn: 64511
    neighbors: ["203.0.113.1"]
    import_limit4: 200
"#;
    let config = GlobalConfig::from_yaml(yaml).unwrap();
    let peer = &config.peers["example"];
    assert_eq!(peer.import_limit4, Some(200));
    assert_eq!(peer.import_limit6, None);
}

#[test]
fn vrrp_requires_vips() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
vrrp:
  interface: eth0
  router_id: 10
  vips: []
"#;
    assert!(GlobalConfig::from_yaml(yaml).is_err());
}

#[test]
fn parses_vrrp_section() {
    let yaml = r#"
asn: 64496
router_id: 192.0.2.1
vrrp:
  interface: eth0
  state: backup
  router_id: 10
  priority: 90
  vips: ["192.0.2.10/24"]
"#;
    let config = GlobalConfig::from_yaml(yaml).unwrap();
    let vrrp = config.vrrp.unwrap();
    assert_eq!(vrrp.interface, "eth0");
    assert_eq!(vrrp.state, VrrpState::Backup);
    assert_eq!(vrrp.priority, 90);
    assert_eq!(
        vrrp.config_path,
        std::path::Path::new("/etc/keepalived/keepalived.conf")
    );
}

#[test]
fn summary_fields_exclude_derived_attributes() {
    let config = GlobalConfig::from_yaml(minimal_yaml()).unwrap();
    let peer = &config.peers["example"];

    let names: Vec<&str> = peer.summary_fields().iter().map(|(n, _)| *n).collect();
    assert!(names.contains(&"asn"));
    assert!(names.contains(&"type"));
    assert!(!names.contains(&"protocol_name"));
    assert!(!names.contains(&"prefix_set4"));
    assert!(!names.contains(&"query_time"));
}
