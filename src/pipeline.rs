//! Run orchestration.
//!
//! One pass, sequential stages, no concurrency: load the declaration, then
//! per peer sanitize the name, enrich from the registry, and build prefix
//! filters; then reconcile the output directory and reconfigure the daemon.
//! The config graph is built once, mutated in place, and discarded at exit.

use crate::bird;
use crate::cli::Cli;
use crate::config::GlobalConfig;
use crate::enrich;
use crate::error::Result;
use crate::events::{Event, EventAction, EventLog};
use crate::filter;
use crate::naming::normalize;
use crate::registry::{Registry, RegistryClient};
use crate::render::TemplateSet;
use crate::tree;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

/// Timeout for the control-channel exchange with BIRD.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Execute one full generation pass.
pub fn run(cli: &Cli) -> Result<()> {
    debug!("loading config from {}", cli.config.display());
    let mut config = GlobalConfig::load(&cli.config)?;

    let templates = TemplateSet::embedded();
    let events = if cli.dry_run {
        // Dry run must leave no trace on disk, the audit log included.
        EventLog::disabled()
    } else {
        EventLog::new(config.event_log.clone())
    };
    let registry = RegistryClient::from_config(&config)?;

    run_with_registry(
        &mut config,
        &templates,
        &registry,
        &events,
        cli.dry_run,
        cli.no_configure,
    )
}

/// The pipeline behind `run`, with the registry injected so tests can
/// substitute an in-memory implementation.
pub fn run_with_registry(
    config: &mut GlobalConfig,
    templates: &TemplateSet,
    registry: &dyn Registry,
    events: &EventLog,
    dry_run: bool,
    no_configure: bool,
) -> Result<()> {
    for (name, peer) in config.peers.iter_mut() {
        peer.protocol_name = normalize(name);
        info!("checking config for {} AS{}", name, peer.asn);

        enrich::enrich_peer(name, peer, registry, events)?;
        filter::build_prefix_filters(name, peer, registry, events)?;

        for (field, value) in peer.summary_fields() {
            info!("[{}] attribute {} = {}", name, field, value);
        }
    }

    tree::reconcile(config, templates, dry_run, events)?;

    if dry_run {
        info!("dry run complete, skipped auxiliary artifacts and reconfiguration");
        return Ok(());
    }

    bird::write_vrrp_config(config, templates)?;
    bird::write_ui_file(config, templates)?;

    if no_configure {
        info!("--no-configure is set, not reconfiguring BIRD");
    } else {
        info!("reconfiguring BIRD");
        bird::configure(&config.bird_socket, CONTROL_TIMEOUT)?;
        events.append(&Event::new(EventAction::Reconfigured).with_details(json!({
            "socket": config.bird_socket.display().to_string(),
        })))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryData, RegistryError, RegistryResult};
    use std::fs;
    use tempfile::TempDir;

    struct FakeRegistry;

    impl Registry for FakeRegistry {
        fn lookup(&self, _asn: u32) -> RegistryResult<RegistryData> {
            Ok(RegistryData {
                max_prefix4: Some(500),
                max_prefix6: Some(100),
                as_set: "AS-EXAMPLE".to_string(),
            })
        }

        fn expand(&self, _as_set: &str) -> RegistryResult<(Vec<String>, Vec<String>)> {
            Ok((
                vec!["203.0.113.0/24".to_string()],
                vec!["2001:db8::/32".to_string()],
            ))
        }
    }

    struct BrokenRegistry;

    impl Registry for BrokenRegistry {
        fn lookup(&self, _asn: u32) -> RegistryResult<RegistryData> {
            Err(RegistryError("timed out".to_string()))
        }

        fn expand(&self, _as_set: &str) -> RegistryResult<(Vec<String>, Vec<String>)> {
            Err(RegistryError("timed out".to_string()))
        }
    }

    fn config_with_peer(dir: &TempDir, peer_yaml: &str) -> GlobalConfig {
        let mut config = GlobalConfig::from_yaml(&format!(
            r#"
asn: 64496
router_id: 192.0.2.1
peers:
  example:
{}
"#,
            peer_yaml
        ))
        .unwrap();
        config.bird_directory = dir.path().to_path_buf();
        config
    }

    fn run_pipeline(config: &mut GlobalConfig, registry: &dyn Registry, dry_run: bool) -> Result<()> {
        run_with_registry(
            config,
            &TemplateSet::embedded(),
            registry,
            &EventLog::disabled(),
            dry_run,
            true, // never talk to a daemon in tests
        )
    }

    #[test]
    fn full_run_produces_global_and_peer_artifacts() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]"#,
        );

        run_pipeline(&mut config, &FakeRegistry, false).unwrap();

        assert!(dir.path().join("bird.conf").exists());
        let peer_file = fs::read_to_string(dir.path().join("AS64511_example.conf")).unwrap();
        assert!(peer_file.contains("# AS-SET: AS-EXAMPLE"));
        assert!(peer_file.contains("203.0.113.0/24"));
        assert!(peer_file.contains("import limit 500"));
    }

    #[test]
    fn enrichment_fills_peer_in_place() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]"#,
        );

        run_pipeline(&mut config, &FakeRegistry, false).unwrap();

        let peer = &config.peers["example"];
        assert_eq!(peer.protocol_name, "example");
        assert_eq!(peer.as_set.as_deref(), Some("AS-EXAMPLE"));
        assert_eq!(peer.import_limit4, Some(500));
        assert!(peer.query_time.is_some());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]"#,
        );

        run_pipeline(&mut config, &FakeRegistry, true).unwrap();

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn filtered_peer_without_as_set_fails_before_any_write() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    type: downstream
    no_enrich: true
    neighbors: ["203.0.113.1"]"#,
        );

        let err = run_pipeline(&mut config, &FakeRegistry, false).unwrap_err();
        assert!(err.to_string().contains("requires filtering"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn broken_registry_fails_filtered_peer_at_expansion() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]"#,
        );

        // Lookup failure is recoverable (falls back to AS64511), but the
        // filter for a `peer` session cannot be built, which is fatal.
        let err = run_pipeline(&mut config, &BrokenRegistry, false).unwrap_err();
        assert!(err.to_string().contains("requires a filter"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn broken_registry_is_survivable_for_upstream_peers() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    type: upstream
    neighbors: ["203.0.113.1"]"#,
        );

        run_pipeline(&mut config, &BrokenRegistry, false).unwrap();

        let peer_file = fs::read_to_string(dir.path().join("AS64511_example.conf")).unwrap();
        assert!(peer_file.contains("import all;"));
    }

    #[test]
    fn removed_peer_loses_its_file_on_the_next_run() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]"#,
        );
        run_pipeline(&mut config, &FakeRegistry, false).unwrap();
        assert!(dir.path().join("AS64511_example.conf").exists());

        let mut without_peer = GlobalConfig::from_yaml(
            r#"
asn: 64496
router_id: 192.0.2.1
"#,
        )
        .unwrap();
        without_peer.bird_directory = dir.path().to_path_buf();
        run_pipeline(&mut without_peer, &FakeRegistry, false).unwrap();

        assert!(!dir.path().join("AS64511_example.conf").exists());
        assert!(dir.path().join("bird.conf").exists());
    }

    #[test]
    fn digit_leading_peer_name_gets_prefixed_file() {
        let dir = TempDir::new().unwrap();
        let mut config = GlobalConfig::from_yaml(
            r#"
asn: 64496
router_id: 192.0.2.1
peers:
  100fastnet:
    asn: 64512
    neighbors: ["203.0.113.2"]
"#,
        )
        .unwrap();
        config.bird_directory = dir.path().to_path_buf();

        run_pipeline(&mut config, &FakeRegistry, false).unwrap();

        assert!(dir.path().join("AS64512_PEER_100fastnet.conf").exists());
    }

    #[test]
    fn manual_values_survive_a_full_run() {
        let dir = TempDir::new().unwrap();
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]
    as_set: "AS-MANUAL"
    import_limit4: 200"#,
        );

        run_pipeline(&mut config, &FakeRegistry, false).unwrap();

        let peer = &config.peers["example"];
        assert_eq!(peer.as_set.as_deref(), Some("AS-MANUAL"));
        assert_eq!(peer.import_limit4, Some(200));
        // Unset v6 limit still filled from the registry
        assert_eq!(peer.import_limit6, Some(100));
    }

    #[test]
    fn event_log_records_a_full_run() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("events.ndjson");
        let mut config = config_with_peer(
            &dir,
            r#"    asn: 64511
    neighbors: ["203.0.113.1"]"#,
        );

        run_with_registry(
            &mut config,
            &TemplateSet::embedded(),
            &FakeRegistry,
            &EventLog::new(Some(log_path.clone())),
            false,
            true,
        )
        .unwrap();

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("as_set_applied"));
        assert!(content.contains("limit_applied"));
        assert!(content.contains("filter_expanded"));
        assert!(content.contains("tree_reconciled"));
    }
}
