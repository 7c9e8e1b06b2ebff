//! Packet lifecycle and phase scheduling
//!
//! A run is a script of [`Phase`]s whose delays are cumulative from the
//! moment the script is scheduled. The manager never sleeps: the owner asks
//! for due phases with [`PacketLifecycleManager::poll_due`] and uses
//! [`PacketLifecycleManager::next_deadline`] to know when to ask again.
//!
//! # Cancellation
//!
//! Every scheduled phase carries the [`Generation`] that was current when the
//! script was scheduled. [`PacketLifecycleManager::cancel_all`] bumps the
//! generation, so a phase that was already handed out but not yet applied can
//! be recognised as stale with [`PacketLifecycleManager::is_current`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use arp_proto::{Packet, PacketDraft, PacketId};
use tracing::trace;

/// Run generation token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

/// One step of a script: wait `delay` after the previous phase, then apply
/// `effect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase<E> {
    pub delay: Duration,
    pub effect: E,
}

impl<E> Phase<E> {
    pub fn new(delay: Duration, effect: E) -> Self {
        Self { delay, effect }
    }
}

/// A phase whose due time has passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredPhase<E> {
    /// Generation the phase was scheduled under
    pub generation: Generation,
    /// Position in the script, starting at 0
    pub index: usize,
    /// When the phase was due (not when it was polled)
    pub due: Instant,
    pub effect: E,
}

#[derive(Debug)]
struct InFlight {
    packet: Packet,
    launched_at: Instant,
    travel: Duration,
}

/// Owns the phase queue and the set of live packets
#[derive(Debug)]
pub struct PacketLifecycleManager<E> {
    generation: Generation,
    queue: VecDeque<FiredPhase<E>>,
    packets: Vec<InFlight>,
    next_packet_id: u64,
}

impl<E> Default for PacketLifecycleManager<E> {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            queue: VecDeque::new(),
            packets: Vec::new(),
            next_packet_id: 1,
        }
    }
}

impl<E> PacketLifecycleManager<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current generation
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Check whether a phase scheduled under `generation` may still apply
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    /// Schedule a script starting at `now`
    ///
    /// Starts a new generation; any phases still queued from an earlier
    /// script are dropped. Live packets are left alone.
    pub fn schedule(&mut self, phases: Vec<Phase<E>>, now: Instant) -> Generation {
        self.bump_generation();
        let generation = self.generation;

        let mut due = now;
        self.queue = phases
            .into_iter()
            .enumerate()
            .map(|(index, phase)| {
                due += phase.delay;
                FiredPhase {
                    generation,
                    index,
                    due,
                    effect: phase.effect,
                }
            })
            .collect();

        generation
    }

    /// Release every queued phase due at or before `now`, in script order
    pub fn poll_due(&mut self, now: Instant) -> Vec<FiredPhase<E>> {
        let mut fired = Vec::new();
        while self.queue.front().is_some_and(|p| p.due <= now) {
            if let Some(phase) = self.queue.pop_front() {
                fired.push(phase);
            }
        }
        fired
    }

    /// Due time of the next queued phase
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.front().map(|p| p.due)
    }

    /// Number of phases still queued
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// True when no phase is queued and no packet is live
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.packets.is_empty()
    }

    /// Invalidate the current run
    ///
    /// Drops queued phases and live packets and returns the packets.
    pub fn cancel_all(&mut self) -> Vec<Packet> {
        self.bump_generation();
        self.queue.clear();
        self.retire_all()
    }

    /// Create a packet that starts travelling at `at`
    pub fn launch(&mut self, draft: PacketDraft, travel: Duration, at: Instant) -> Packet {
        let id = PacketId(self.next_packet_id);
        self.next_packet_id += 1;

        let packet = Packet::from_draft(id, draft);
        self.packets.push(InFlight {
            packet: packet.clone(),
            launched_at: at,
            travel,
        });
        packet
    }

    /// Remove one packet; unknown ids return `None`
    pub fn retire(&mut self, id: PacketId) -> Option<Packet> {
        let index = self.packets.iter().position(|p| p.packet.id == id)?;
        Some(self.packets.remove(index).packet)
    }

    /// Remove every live packet
    pub fn retire_all(&mut self) -> Vec<Packet> {
        self.packets.drain(..).map(|p| p.packet).collect()
    }

    /// Recompute animation progress of every live packet at `now`
    pub fn refresh_progress(&mut self, now: Instant) {
        for in_flight in &mut self.packets {
            let elapsed = now.saturating_duration_since(in_flight.launched_at);
            let travel = in_flight.travel.as_millis().max(1);
            let progress = (elapsed.as_millis() * 100 / travel).min(100) as u8;

            if progress != in_flight.packet.progress {
                trace!("{} progress {}%", in_flight.packet.id, progress);
            }
            in_flight.packet.progress = progress;
            in_flight.packet.active = progress < 100;
        }
    }

    /// Live packets in launch order
    pub fn packets(&self) -> impl Iterator<Item = &Packet> + '_ {
        self.packets.iter().map(|p| &p.packet)
    }

    /// Look up a live packet
    pub fn get(&self, id: PacketId) -> Option<&Packet> {
        self.packets().find(|p| p.id == id)
    }

    fn bump_generation(&mut self) {
        self.generation = Generation(self.generation.0 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arp_proto::{MacAddr, PacketKind};
    use std::net::Ipv4Addr;

    const D: Duration = Duration::from_millis(2000);

    fn script() -> Vec<Phase<&'static str>> {
        vec![Phase::new(D, "one"), Phase::new(D, "two"), Phase::new(D, "three")]
    }

    fn draft() -> PacketDraft {
        PacketDraft::arp_request(
            Ipv4Addr::new(192, 168, 1, 10),
            MacAddr::new([0x00, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E]),
            Ipv4Addr::new(192, 168, 1, 20),
        )
    }

    #[test]
    fn test_due_times_are_cumulative() {
        let mut lifecycle = PacketLifecycleManager::new();
        let start = Instant::now();
        lifecycle.schedule(script(), start);

        assert_eq!(lifecycle.next_deadline(), Some(start + D));
        assert!(lifecycle.poll_due(start + D - Duration::from_millis(1)).is_empty());

        let fired = lifecycle.poll_due(start + D);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].effect, "one");
        assert_eq!(lifecycle.next_deadline(), Some(start + D * 2));
    }

    #[test]
    fn test_poll_releases_in_order() {
        let mut lifecycle = PacketLifecycleManager::new();
        let start = Instant::now();
        lifecycle.schedule(script(), start);

        let fired = lifecycle.poll_due(start + D * 10);
        let effects: Vec<_> = fired.iter().map(|p| p.effect).collect();
        assert_eq!(effects, vec!["one", "two", "three"]);

        let indices: Vec<_> = fired.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(fired[2].due, start + D * 3);
        assert_eq!(lifecycle.next_deadline(), None);
    }

    #[test]
    fn test_cancel_invalidates_fired_phases() {
        let mut lifecycle = PacketLifecycleManager::new();
        let start = Instant::now();
        lifecycle.schedule(script(), start);

        let fired = lifecycle.poll_due(start + D);
        assert!(lifecycle.is_current(fired[0].generation));

        lifecycle.cancel_all();
        assert!(!lifecycle.is_current(fired[0].generation));
        assert_eq!(lifecycle.pending(), 0);
        assert!(lifecycle.poll_due(start + D * 10).is_empty());
    }

    #[test]
    fn test_schedule_starts_new_generation() {
        let mut lifecycle = PacketLifecycleManager::new();
        let start = Instant::now();
        let first = lifecycle.schedule(script(), start);
        let second = lifecycle.schedule(vec![Phase::new(D, "only")], start);

        assert!(second > first);
        assert_eq!(lifecycle.pending(), 1);
    }

    #[test]
    fn test_launch_and_retire() {
        let mut lifecycle: PacketLifecycleManager<()> = PacketLifecycleManager::new();
        let now = Instant::now();

        let a = lifecycle.launch(draft(), D, now);
        let b = lifecycle.launch(draft(), D, now);
        assert_ne!(a.id, b.id);
        assert_eq!(a.kind, PacketKind::ArpRequest);
        assert!(a.active);

        assert_eq!(lifecycle.retire(a.id).map(|p| p.id), Some(a.id));
        assert!(lifecycle.retire(a.id).is_none());
        assert_eq!(lifecycle.packets().count(), 1);

        let rest = lifecycle.retire_all();
        assert_eq!(rest.len(), 1);
        assert!(lifecycle.is_idle());
    }

    #[test]
    fn test_progress() {
        let mut lifecycle: PacketLifecycleManager<()> = PacketLifecycleManager::new();
        let now = Instant::now();
        let packet = lifecycle.launch(draft(), D, now);

        lifecycle.refresh_progress(now + D / 2);
        let p = lifecycle.get(packet.id).unwrap();
        assert_eq!(p.progress, 50);
        assert!(p.active);

        lifecycle.refresh_progress(now + D * 3);
        let p = lifecycle.get(packet.id).unwrap();
        assert_eq!(p.progress, 100);
        assert!(!p.active);
    }

    #[test]
    fn test_cancel_all_returns_packets() {
        let mut lifecycle = PacketLifecycleManager::new();
        let now = Instant::now();
        lifecycle.schedule(script(), now);
        lifecycle.launch(draft(), D, now);

        let dropped = lifecycle.cancel_all();
        assert_eq!(dropped.len(), 1);
        assert!(lifecycle.is_idle());
    }
}
