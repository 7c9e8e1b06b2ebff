//! Simulation engine
//!
//! The orchestrator that validates front-end inputs, schedules phase scripts
//! and applies each phase to the cache, the registry and the activity log.
//!
//! The engine is synchronous and clock-driven: every time-dependent operation
//! takes `now`, and [`SimulationEngine::advance`] applies whatever phases are
//! due. Notifications accumulate in an internal buffer and are collected
//! with [`SimulationEngine::drain_events`].

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use arp_proto::{AddressPair, PacketDraft, PacketId, PacketKind, ProtocolMode, PLACEHOLDER_ADDRESS};
use arp_topology::{AddressPool, Device, DeviceId, DeviceKind, DeviceRegistry};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::activity::{ActivityKind, ActivityRecorder};
use crate::cache::AddressCache;
use crate::error::SimError;
use crate::events::{Guidance, SimEvent, SimInput};
use crate::guidance;
use crate::lifecycle::{FiredPhase, PacketLifecycleManager};
use crate::script::{arp_script, rarp_script, Participant, PhaseEffect};
use crate::state::{EnginePhase, SimulationSnapshot, SimulationState};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between consecutive phases (ms); also the packet travel time
    pub phase_delay_ms: u64,
    /// Activity entries included in snapshots
    pub recent_activity_limit: usize,
    /// First address handed out by the RARP server
    pub address_pool_base: Ipv4Addr,
    /// Source address of a RARP client that has no address yet
    pub placeholder_address: Ipv4Addr,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            phase_delay_ms: 2000,
            recent_activity_limit: 10,
            address_pool_base: Ipv4Addr::new(192, 168, 1, 100),
            placeholder_address: PLACEHOLDER_ADDRESS,
        }
    }
}

impl EngineConfig {
    /// Get the phase delay
    pub fn phase_delay(&self) -> Duration {
        Duration::from_millis(self.phase_delay_ms)
    }
}

/// The simulation orchestrator
pub struct SimulationEngine {
    config: EngineConfig,
    registry: DeviceRegistry,
    state: SimulationState,
    lifecycle: PacketLifecycleManager<PhaseEffect>,
    cache: AddressCache,
    activity: ActivityRecorder,
    pool: AddressPool,
    /// Address picked by the RARP server for the current run
    assigned_address: Option<Ipv4Addr>,
    event_buffer: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create an idle engine over `registry`
    pub fn new(registry: DeviceRegistry, config: EngineConfig) -> Self {
        let pool = AddressPool::new(config.address_pool_base)
            .with_placeholder(config.placeholder_address);
        Self {
            config,
            registry,
            state: SimulationState::default(),
            lifecycle: PacketLifecycleManager::new(),
            cache: AddressCache::new(),
            activity: ActivityRecorder::new(),
            pool,
            assigned_address: None,
            event_buffer: Vec::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Get the current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn phase(&self) -> EnginePhase {
        self.state.phase()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &AddressCache {
        &self.cache
    }

    pub fn activity(&self) -> &ActivityRecorder {
        &self.activity
    }

    pub fn lifecycle(&self) -> &PacketLifecycleManager<PhaseEffect> {
        &self.lifecycle
    }

    /// When [`advance`](Self::advance) next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        self.lifecycle.next_deadline()
    }

    /// Build a presentation snapshot of the current state
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            state: self.state.clone(),
            phase: self.state.phase(),
            packets: self.lifecycle.packets().cloned().collect(),
            recent_activity: self
                .activity
                .recent(self.config.recent_activity_limit)
                .cloned()
                .collect(),
            cache: self.cache.entries().to_vec(),
            devices: self.registry.devices().to_vec(),
        }
    }

    /// Take all buffered events
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.event_buffer)
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// Apply one front-end input
    pub fn handle(&mut self, input: SimInput, now: Instant) -> Result<(), SimError> {
        match input {
            SimInput::ModeSelect(mode) => self.select_mode(mode),
            SimInput::DeviceSelect(id) => self.select_device(&id),
            SimInput::StartSimulation => self.start(now),
            SimInput::Reset => {
                self.reset();
                Ok(())
            }
            SimInput::GenerateRandomTopology => {
                self.generate_random_topology();
                Ok(())
            }
            SimInput::BulkUpdateDevices(devices) => self.bulk_update_devices(devices),
            SimInput::PacketAnimationComplete(id) => {
                self.packet_animation_complete(id);
                Ok(())
            }
        }
    }

    /// Pick a protocol and start a fresh walkthrough
    ///
    /// Clears the selection, cache and packets and invalidates pending
    /// phases. Ignored while a run is in progress.
    pub fn select_mode(&mut self, mode: ProtocolMode) -> Result<(), SimError> {
        if self.state.running {
            debug!("Ignoring {} mode selection while running", mode);
            return Err(SimError::SimulationRunning);
        }

        self.cancel_run();
        self.cache.clear();
        self.state = SimulationState::for_mode(mode);

        info!("Selected {} mode", mode);
        self.push_guidance(guidance::mode_selected(mode));
        self.emit_state();
        Ok(())
    }

    /// Choose the device that starts the exchange
    pub fn select_device(&mut self, id: &DeviceId) -> Result<(), SimError> {
        let Some(mode) = self.state.mode else {
            return self.reject(SimError::NoModeSelected);
        };
        if self.state.running {
            return self.reject(SimError::SimulationRunning);
        }
        if self.state.complete {
            return self.reject(SimError::SimulationComplete);
        }
        if self.state.current_step != 0 {
            return self.reject(SimError::NotSelectingDevice);
        }

        let Some(device) = self.registry.get(id) else {
            return self.reject(SimError::UnknownDevice(id.clone()));
        };
        if !device.online {
            return self.reject(SimError::DeviceOffline(id.clone()));
        }
        let message = guidance::device_selected(mode, device);

        self.state.selected_device = Some(id.clone());
        self.complete_step();

        info!("Selected device {}", id);
        self.push_guidance(message);
        self.emit_state();
        Ok(())
    }

    /// Schedule the selected mode's phase script starting at `now`
    pub fn start(&mut self, now: Instant) -> Result<(), SimError> {
        let Some(mode) = self.state.mode else {
            return self.reject(SimError::NoModeSelected);
        };
        if self.state.running {
            return self.reject(SimError::SimulationRunning);
        }
        if self.state.complete {
            return self.reject(SimError::SimulationComplete);
        }
        let Some(id) = self.state.selected_device.clone() else {
            return self.reject(SimError::NoDeviceSelected);
        };

        let Some(device) = self.registry.get(&id) else {
            return self.reject(SimError::UnknownDevice(id));
        };
        if !device.online {
            return self.reject(SimError::DeviceOffline(id));
        }
        let initiator = Participant::from(device);

        let delay = self.config.phase_delay();
        let script = match mode {
            ProtocolMode::Arp => {
                let Some(target) = self.resolution_target(&id) else {
                    return self.reject(SimError::NoResolutionTarget(id));
                };
                debug!("Resolving {} from {}", target.address, initiator.name);
                arp_script(initiator.clone(), target, delay)
            }
            ProtocolMode::Rarp => rarp_script(initiator.clone(), delay),
        };

        let generation = self.lifecycle.schedule(script, now);
        self.assigned_address = None;
        self.state.running = true;

        info!(
            "Started {} simulation with {} (generation {})",
            mode, initiator.name, generation.0
        );
        self.push_guidance(guidance::started(mode, &initiator));
        self.emit_state();
        Ok(())
    }

    /// Return to idle from any phase
    ///
    /// No phase scheduled before the reset can change state afterwards.
    pub fn reset(&mut self) {
        self.cancel_run();
        self.cache.clear();
        self.activity.clear();
        self.state = SimulationState::default();

        info!("Simulation reset");
        self.push_guidance(guidance::reset());
        self.emit_state();
    }

    /// Apply every phase due at or before `now`
    pub fn advance(&mut self, now: Instant) {
        let fired = self.lifecycle.poll_due(now);
        let applied = !fired.is_empty();

        for phase in fired {
            if !self.lifecycle.is_current(phase.generation) {
                trace!(
                    "Discarding stale {} phase from generation {}",
                    phase.effect.name(),
                    phase.generation.0
                );
                continue;
            }
            self.apply_phase(phase);
        }

        self.lifecycle.refresh_progress(now);
        if applied {
            self.emit_state();
        }
    }

    /// Replace the topology with random endpoints
    pub fn generate_random_topology(&mut self) {
        self.generate_random_topology_with(&mut rand::thread_rng());
    }

    /// Replace the topology with random endpoints drawn from `rng`
    pub fn generate_random_topology_with<R: Rng>(&mut self, rng: &mut R) {
        self.registry.randomize_with(rng);
        self.devices_changed();
        self.push_guidance(guidance::topology_randomized());
        self.emit_state();
    }

    /// Replace the topology with `devices`
    pub fn bulk_update_devices(&mut self, devices: Vec<Device>) -> Result<(), SimError> {
        if let Err(e) = self.registry.replace_all(devices) {
            return self.reject(e.into());
        }

        self.devices_changed();
        self.push_guidance(guidance::devices_updated());
        self.emit_state();
        Ok(())
    }

    /// The renderer finished a packet's animation
    pub fn packet_animation_complete(&mut self, id: PacketId) {
        match self.lifecycle.retire(id) {
            Some(packet) => {
                debug!("{} finished animating", packet.id);
                self.event_buffer.push(SimEvent::PacketRetired(packet.id));
                self.emit_state();
            }
            None => trace!("Ignoring completion for unknown packet {}", id),
        }
    }

    // -------------------------------------------------------------------------
    // Phase effects
    // -------------------------------------------------------------------------

    fn apply_phase(&mut self, phase: FiredPhase<PhaseEffect>) {
        debug!("Applying {} phase {}", phase.effect.name(), phase.index + 1);
        let at = phase.due;

        match phase.effect {
            PhaseEffect::ArpRequest { sender, target } => {
                let kind = self.launch(
                    PacketDraft::arp_request(sender.address, sender.hardware_id, target.address),
                    at,
                );
                self.record(
                    kind.into(),
                    format!("{} broadcasting ARP request for {}", sender.name, target.address),
                    Some(sender.address_pair()),
                    Some(AddressPair::address_only(target.address)),
                );
                self.complete_step();
            }

            PhaseEffect::ArpReply { sender, target } => {
                self.retire_packets();
                let kind = self.launch(
                    PacketDraft::arp_reply(
                        target.address,
                        target.hardware_id,
                        sender.address,
                        sender.hardware_id,
                    ),
                    at,
                );
                self.record(
                    kind.into(),
                    format!("{} responding with MAC address {}", target.name, target.hardware_id),
                    Some(target.address_pair()),
                    Some(sender.address_pair()),
                );
                self.complete_step();
            }

            PhaseEffect::ArpCacheUpdate { sender, target } => {
                self.retire_packets();
                let previous =
                    self.cache
                        .upsert(target.address, target.hardware_id, Some(target.name.clone()));
                if let Some(previous) = previous {
                    debug!(
                        "Cache entry for {} replaced (was {})",
                        previous.address, previous.hardware_id
                    );
                }
                if let Some(entry) = self.cache.latest() {
                    self.event_buffer.push(SimEvent::CacheUpdated(entry.clone()));
                }
                self.record(
                    ActivityKind::CacheUpdate,
                    format!("ARP cache updated: {} -> {}", target.address, target.hardware_id),
                    Some(target.address_pair()),
                    None,
                );
                self.complete_step();
                self.finish_run(guidance::arp_complete(&sender, &target));
            }

            PhaseEffect::RarpRequest { client } => {
                let placeholder = self.config.placeholder_address;
                let draft = PacketDraft::rarp_request(client.hardware_id, placeholder);
                let kind = self.launch(draft, at);
                self.record(
                    kind.into(),
                    format!("{} requesting IP address assignment", client.name),
                    Some(AddressPair::new(placeholder, client.hardware_id)),
                    None,
                );
                self.complete_step();
            }

            PhaseEffect::RarpReply { client } => {
                self.retire_packets();
                let Some(assigned) = self.pool.next_free(self.registry.devices()) else {
                    warn!("Address pool exhausted, aborting RARP run for {}", client.name);
                    self.abort_run(guidance::pool_exhausted(&client));
                    return;
                };
                self.assigned_address = Some(assigned);

                let kind = self.launch(PacketDraft::rarp_reply(client.hardware_id, assigned), at);
                self.record(
                    kind.into(),
                    format!("RARP server assigned IP {} to {}", assigned, client.name),
                    Some(AddressPair::new(assigned, client.hardware_id)),
                    Some(AddressPair::new(self.config.placeholder_address, client.hardware_id)),
                );
                self.complete_step();
            }

            PhaseEffect::RarpAssign { client } => {
                self.retire_packets();
                let Some(reserved) = self.assigned_address.take() else {
                    warn!("No address was assigned to {}, aborting RARP run", client.name);
                    self.abort_run(guidance::pool_exhausted(&client));
                    return;
                };
                let Some(assigned) = self.confirm_assignment(&client, reserved) else {
                    warn!("Address pool exhausted, aborting RARP run for {}", client.name);
                    self.abort_run(guidance::pool_exhausted(&client));
                    return;
                };

                match self.registry.update_address(&client.id, assigned) {
                    Ok(previous) => {
                        debug!("{} address {} -> {}", client.id, previous, assigned);
                        self.devices_changed();
                    }
                    Err(e) => {
                        warn!("Assigned address not stored: {}", e);
                        self.push_guidance(guidance::assignment_not_applied(&client));
                    }
                }
                self.record(
                    ActivityKind::DeviceUpdate,
                    format!("Device {} updated with IP {}", client.name, assigned),
                    Some(AddressPair::new(assigned, client.hardware_id)),
                    None,
                );
                self.complete_step();
                self.finish_run(guidance::rarp_complete(&client, assigned));
            }
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// First other endpoint in registry order, else the first other device
    fn resolution_target(&self, sender: &DeviceId) -> Option<Participant> {
        let others = || self.registry.devices().iter().filter(|d| &d.id != sender);
        others()
            .find(|d| d.kind == DeviceKind::Endpoint)
            .or_else(|| others().next())
            .map(Participant::from)
    }

    /// Keep the reserved address unless another device took it since the
    /// reply phase, in which case pick the next free one
    fn confirm_assignment(&self, client: &Participant, reserved: Ipv4Addr) -> Option<Ipv4Addr> {
        let held_by_client = self
            .registry
            .get(&client.id)
            .is_some_and(|d| d.address == reserved);
        if held_by_client || !self.registry.contains_address(reserved) {
            return Some(reserved);
        }

        let fresh = self.pool.next_free(self.registry.devices())?;
        warn!(
            "{} was taken during the run, assigning {} to {} instead",
            reserved, fresh, client.name
        );
        Some(fresh)
    }

    fn launch(&mut self, draft: PacketDraft, at: Instant) -> PacketKind {
        let packet = self.lifecycle.launch(draft, self.config.phase_delay(), at);
        debug!("Launched {} {}: {}", packet.kind, packet.id, packet.describe());
        let kind = packet.kind;
        self.event_buffer.push(SimEvent::PacketLaunched(packet));
        kind
    }

    fn retire_packets(&mut self) {
        for packet in self.lifecycle.retire_all() {
            self.event_buffer.push(SimEvent::PacketRetired(packet.id));
        }
    }

    fn record(
        &mut self,
        kind: ActivityKind,
        message: String,
        source: Option<AddressPair>,
        target: Option<AddressPair>,
    ) {
        let entry = self.activity.append(kind, message, source, target).clone();
        self.event_buffer.push(SimEvent::ActivityRecorded(entry));
    }

    fn complete_step(&mut self) {
        if let Some(step) = self.state.advance_step() {
            debug!("Completed step {}", step.id);
        }
    }

    fn finish_run(&mut self, message: Guidance) {
        self.state.running = false;
        self.state.complete = true;
        if let Some(mode) = self.state.mode {
            info!("{} simulation complete", mode);
        }
        self.push_guidance(message);
    }

    fn abort_run(&mut self, message: Guidance) {
        self.cancel_run();
        self.state.rewind_to_selection();
        self.push_guidance(message);
    }

    fn cancel_run(&mut self) {
        for packet in self.lifecycle.cancel_all() {
            self.event_buffer.push(SimEvent::PacketRetired(packet.id));
        }
        self.assigned_address = None;
    }

    /// Clear a selection that no longer resolves while it is still unused
    fn devices_changed(&mut self) {
        self.event_buffer
            .push(SimEvent::DevicesChanged(self.registry.devices().to_vec()));

        if self.state.phase() != EnginePhase::DeviceSelected {
            return;
        }
        let Some(id) = self.state.selected_device.clone() else {
            return;
        };
        let still_usable = self.registry.get(&id).is_some_and(|d| d.online);
        if !still_usable {
            info!("Selected device {} no longer available, clearing selection", id);
            self.state.reopen_selection();
            self.push_guidance(guidance::selection_cleared(id.as_str()));
        }
    }

    fn reject(&mut self, err: SimError) -> Result<(), SimError> {
        debug!("Rejected: {}", err);
        self.push_guidance(guidance::rejected(&err));
        Err(err)
    }

    fn push_guidance(&mut self, message: Guidance) {
        self.event_buffer.push(SimEvent::Guidance(message));
    }

    fn emit_state(&mut self) {
        let snapshot = self.snapshot();
        self.event_buffer
            .push(SimEvent::StateChanged(Box::new(snapshot)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Severity;
    use arp_proto::MacAddr;
    use arp_topology::MemoryStore;

    fn engine_with(devices: Vec<Device>) -> SimulationEngine {
        let json = serde_json::to_string(&devices).unwrap();
        let store = MemoryStore::with_value(arp_topology::DEVICES_KEY, json);
        let registry = DeviceRegistry::load(Box::new(store), arp_topology::DEVICES_KEY);
        SimulationEngine::new(registry, EngineConfig::default())
    }

    fn endpoint(id: &str, host: u8) -> Device {
        Device::endpoint(
            id,
            format!("Host {}", host),
            Ipv4Addr::new(192, 168, 1, host),
            MacAddr::new([0x02, 0, 0, 0, 0, host]),
        )
    }

    fn last_guidance(engine: &mut SimulationEngine) -> Option<Guidance> {
        engine
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                SimEvent::Guidance(g) => Some(g),
                _ => None,
            })
            .last()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.phase_delay(), Duration::from_secs(2));
        assert_eq!(config.recent_activity_limit, 10);
        assert_eq!(config.address_pool_base, Ipv4Addr::new(192, 168, 1, 100));
        assert_eq!(config.placeholder_address, Ipv4Addr::UNSPECIFIED);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"phase_delay_ms": 250}"#).unwrap();
        assert_eq!(config.phase_delay_ms, 250);
        assert_eq!(config.recent_activity_limit, 10);
    }

    #[test]
    fn test_select_device_requires_mode() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        let err = engine.select_device(&DeviceId::new("a")).unwrap_err();
        assert_eq!(err, SimError::NoModeSelected);
        assert_eq!(last_guidance(&mut engine).unwrap().severity, Severity::Warning);
        assert_eq!(engine.phase(), EnginePhase::Idle);
    }

    #[test]
    fn test_select_unknown_and_offline_devices() {
        let mut engine = engine_with(vec![
            endpoint("a", 10),
            endpoint("b", 20).with_online(false),
        ]);
        engine.select_mode(ProtocolMode::Arp).unwrap();

        assert_eq!(
            engine.select_device(&DeviceId::new("ghost")),
            Err(SimError::UnknownDevice(DeviceId::new("ghost")))
        );
        assert_eq!(
            engine.select_device(&DeviceId::new("b")),
            Err(SimError::DeviceOffline(DeviceId::new("b")))
        );
        assert_eq!(engine.phase(), EnginePhase::ModeSelected);
        assert_eq!(engine.state().current_step, 0);
    }

    #[test]
    fn test_select_device_only_on_first_step() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        engine.select_mode(ProtocolMode::Arp).unwrap();
        engine.select_device(&DeviceId::new("a")).unwrap();
        engine.drain_events();

        let err = engine.select_device(&DeviceId::new("b")).unwrap_err();
        assert_eq!(err, SimError::NotSelectingDevice);
        assert_eq!(
            engine.state().selected_device,
            Some(DeviceId::new("a"))
        );
        assert!(last_guidance(&mut engine).is_some());
    }

    #[test]
    fn test_start_without_device() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        engine.select_mode(ProtocolMode::Arp).unwrap();
        engine.drain_events();

        let err = engine.start(Instant::now()).unwrap_err();
        assert_eq!(err, SimError::NoDeviceSelected);

        let guidance = last_guidance(&mut engine).unwrap();
        assert_eq!(guidance.title, "Selection Required");
        assert_eq!(guidance.severity, Severity::Warning);
        assert!(engine.next_deadline().is_none());
    }

    #[test]
    fn test_start_without_target() {
        let mut engine = engine_with(vec![endpoint("a", 10)]);
        engine.select_mode(ProtocolMode::Arp).unwrap();
        engine.select_device(&DeviceId::new("a")).unwrap();

        let err = engine.start(Instant::now()).unwrap_err();
        assert_eq!(err, SimError::NoResolutionTarget(DeviceId::new("a")));
        assert_eq!(engine.phase(), EnginePhase::DeviceSelected);
    }

    #[test]
    fn test_target_prefers_endpoints() {
        let relay = Device::relay(
            "hub",
            "Hub",
            Ipv4Addr::new(192, 168, 1, 1),
            MacAddr::new([0x02, 0, 0, 0, 0, 1]),
        );
        let engine = engine_with(vec![endpoint("a", 10), relay, endpoint("b", 20)]);
        let target = engine.resolution_target(&DeviceId::new("a")).unwrap();
        assert_eq!(target.id, DeviceId::new("b"));

        let target = engine.resolution_target(&DeviceId::new("b")).unwrap();
        assert_eq!(target.id, DeviceId::new("a"));
    }

    #[test]
    fn test_target_falls_back_to_relay() {
        let relay = Device::relay(
            "hub",
            "Hub",
            Ipv4Addr::new(192, 168, 1, 1),
            MacAddr::new([0x02, 0, 0, 0, 0, 1]),
        );
        let engine = engine_with(vec![endpoint("a", 10), relay]);
        let target = engine.resolution_target(&DeviceId::new("a")).unwrap();
        assert_eq!(target.id, DeviceId::new("hub"));
    }

    #[test]
    fn test_mode_change_ignored_while_running() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        engine.select_mode(ProtocolMode::Arp).unwrap();
        engine.select_device(&DeviceId::new("a")).unwrap();
        engine.start(Instant::now()).unwrap();
        engine.drain_events();

        assert_eq!(
            engine.select_mode(ProtocolMode::Rarp),
            Err(SimError::SimulationRunning)
        );
        assert!(engine.drain_events().is_empty());
        assert_eq!(engine.state().mode, Some(ProtocolMode::Arp));
    }

    #[test]
    fn test_complete_run_rejects_restart() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        let start = Instant::now();
        engine.select_mode(ProtocolMode::Arp).unwrap();
        engine.select_device(&DeviceId::new("a")).unwrap();
        engine.start(start).unwrap();
        engine.advance(start + Duration::from_secs(6));

        assert_eq!(engine.phase(), EnginePhase::Complete);
        assert_eq!(
            engine.start(start + Duration::from_secs(7)),
            Err(SimError::SimulationComplete)
        );
        assert_eq!(
            engine.select_device(&DeviceId::new("b")),
            Err(SimError::SimulationComplete)
        );

        // A new mode selection opens a fresh walkthrough
        engine.select_mode(ProtocolMode::Arp).unwrap();
        assert_eq!(engine.phase(), EnginePhase::ModeSelected);
    }

    #[test]
    fn test_bulk_update_rejects_duplicates() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        let err = engine
            .bulk_update_devices(vec![endpoint("x", 1), endpoint("x", 2)])
            .unwrap_err();

        assert!(matches!(err, SimError::InvalidTopology(_)));
        assert_eq!(last_guidance(&mut engine).unwrap().severity, Severity::Error);
        assert_eq!(engine.registry().len(), 2);
    }

    #[test]
    fn test_removed_selection_reopens_first_step() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        engine.select_mode(ProtocolMode::Rarp).unwrap();
        engine.select_device(&DeviceId::new("a")).unwrap();

        engine
            .bulk_update_devices(vec![endpoint("b", 20), endpoint("c", 30)])
            .unwrap();

        assert_eq!(engine.phase(), EnginePhase::ModeSelected);
        assert_eq!(engine.state().current_step, 0);
        assert_eq!(engine.state().completed_steps(), 0);
        engine.select_device(&DeviceId::new("c")).unwrap();
    }

    #[test]
    fn test_unknown_packet_completion_is_ignored() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        engine.packet_animation_complete(PacketId(99));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_snapshot_is_serializable() {
        let mut engine = engine_with(vec![endpoint("a", 10), endpoint("b", 20)]);
        let start = Instant::now();
        engine.select_mode(ProtocolMode::Arp).unwrap();
        engine.select_device(&DeviceId::new("a")).unwrap();
        engine.start(start).unwrap();
        engine.advance(start + Duration::from_secs(2));

        let json = serde_json::to_value(engine.snapshot()).unwrap();
        assert_eq!(json["phase"], "running");
        assert_eq!(json["state"]["mode"], "arp");
        assert_eq!(json["packets"][0]["kind"], "arp_request");
        assert_eq!(json["recent_activity"][0]["kind"], "arp_request");
    }
}
