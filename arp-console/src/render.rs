//! Plain-text rendering of engine events and state

use std::fmt::Write;

use arp_engine::{SimEvent, SimulationSnapshot};
use arp_topology::Device;

/// Render one event as terminal lines, or `None` for events with no text form
pub fn render_event(event: &SimEvent) -> Option<String> {
    match event {
        SimEvent::Guidance(g) => {
            let mut out = format!("[{}] {}", g.severity, g.title);
            for line in g.body.lines() {
                out.push_str("\n    ");
                out.push_str(line);
            }
            Some(out.trim_end().to_string())
        }
        SimEvent::PacketLaunched(packet) => Some(format!(
            "  >> {} {}: {}",
            packet.id,
            packet.kind,
            packet.describe()
        )),
        SimEvent::ActivityRecorded(entry) => {
            Some(format!("  * {:<14} {}", entry.kind.to_string(), entry.message))
        }
        SimEvent::CacheUpdated(entry) => Some(format!(
            "  cache {} -> {}",
            entry.address, entry.hardware_id
        )),
        SimEvent::StateChanged(_) | SimEvent::PacketRetired(_) | SimEvent::DevicesChanged(_) => {
            None
        }
    }
}

/// Render the device list as a table
pub fn render_devices(devices: &[Device]) -> String {
    let mut out = format!(
        "{:<12} {:<18} {:<9} {:<16} {:<18} {}\n",
        "ID", "NAME", "KIND", "ADDRESS", "HARDWARE ID", "STATUS"
    );
    for device in devices {
        let _ = writeln!(
            out,
            "{:<12} {:<18} {:<9} {:<16} {:<18} {}",
            device.id.as_str(),
            device.name,
            device.kind.name(),
            device.address.to_string(),
            device.hardware_id.to_string(),
            if device.online { "online" } else { "offline" }
        );
    }
    out
}

/// Render the step list, cache and recent activity of a snapshot
pub fn render_summary(snapshot: &SimulationSnapshot) -> String {
    let mut out = String::new();

    let mode = snapshot.state.mode.map_or("none", |m| m.name());
    let _ = writeln!(out, "Mode: {}  Phase: {}", mode, snapshot.phase.name());

    for step in &snapshot.state.steps {
        let mark = if step.completed { "x" } else { " " };
        let _ = writeln!(out, "  [{}] {}", mark, step.title);
    }

    if snapshot.cache.is_empty() {
        out.push_str("ARP cache: empty\n");
    } else {
        out.push_str("ARP cache:\n");
        for entry in &snapshot.cache {
            let _ = writeln!(
                out,
                "  {:<16} {:<18} {}",
                entry.address.to_string(),
                entry.hardware_id.to_string(),
                entry.display_name.as_deref().unwrap_or("")
            );
        }
    }

    if !snapshot.recent_activity.is_empty() {
        out.push_str("Recent activity:\n");
        for entry in &snapshot.recent_activity {
            let _ = writeln!(out, "  {} {}", entry.id, entry.message);
        }
    }

    out
}
