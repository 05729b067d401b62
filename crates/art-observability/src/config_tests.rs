// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;

fn verbose_config() -> DebugConfig {
    DebugConfig { log_level: DebugLevel::Verbose, ..DebugConfig::default() }
}

#[test]
#[serial]
fn resolve_falls_back_to_default_when_unset() {
    let config = ObservabilityConfig::new();
    assert_eq!(config.resolve(Some("agent-1"), None), DebugConfig::default());
}

#[test]
#[serial]
fn resolve_prefers_runtime_override_over_everything() {
    let config = ObservabilityConfig::new();
    config.set_global(verbose_config());
    config.set_instance("agent-1", DebugConfig::default());

    let runtime_override = DebugConfig { log_level: DebugLevel::Off, ring_buffer_size: 7, ..DebugConfig::default() };
    let resolved = config.resolve(Some("agent-1"), Some(runtime_override.clone()));
    assert_eq!(resolved, runtime_override);
}

#[test]
#[serial]
fn resolve_prefers_instance_over_global() {
    let config = ObservabilityConfig::new();
    config.set_global(DebugConfig::default());
    config.set_instance("agent-1", verbose_config());

    assert_eq!(config.resolve(Some("agent-1"), None).log_level, DebugLevel::Verbose);
    assert_eq!(config.resolve(Some("agent-2"), None).log_level, DebugLevel::Off);
}

#[test]
#[serial]
fn reset_instance_clears_only_that_instance() {
    let config = ObservabilityConfig::new();
    config.set_instance("agent-1", verbose_config());
    config.set_instance("agent-2", verbose_config());

    config.reset(Some("agent-1"));

    assert_eq!(config.resolve(Some("agent-1"), None).log_level, DebugLevel::Off);
    assert_eq!(config.resolve(Some("agent-2"), None).log_level, DebugLevel::Verbose);
}

#[test]
#[serial]
fn reset_all_clears_global_and_every_instance() {
    let config = ObservabilityConfig::new();
    config.set_global(verbose_config());
    config.set_instance("agent-1", verbose_config());

    config.reset(None);

    assert_eq!(config.resolve(Some("agent-1"), None), DebugConfig::default());
}
