//! ARP/RARP Simulation Engine
//!
//! This crate provides the orchestration core of the ARP/RARP teaching
//! simulator: it tracks the protocol mode, walks a fixed four-step script,
//! schedules timed packet phases and applies their effects to the address
//! cache, the device registry and the activity log.
//!
//! # Architecture
//!
//! - **SimulationEngine**: validates inputs and applies phase effects
//! - **PacketLifecycleManager**: phase queue, generation token, live packets
//! - **AddressCache**: address to hardware id mappings learned by ARP runs
//! - **ActivityRecorder**: append-only log of protocol events
//!
//! The engine is synchronous. Time only moves when the caller passes a later
//! `now` to [`SimulationEngine::advance`]; the async
//! [`run_simulation_actor`] does that from a tokio timer.
//!
//! # Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//!
//! use arp_engine::{EngineConfig, EnginePhase, SimulationEngine};
//! use arp_proto::ProtocolMode;
//! use arp_topology::{DeviceId, DeviceRegistry, MemoryStore, DEVICES_KEY};
//!
//! let registry = DeviceRegistry::load(Box::new(MemoryStore::new()), DEVICES_KEY);
//! let mut engine = SimulationEngine::new(registry, EngineConfig::default());
//!
//! let start = Instant::now();
//! engine.select_mode(ProtocolMode::Arp).unwrap();
//! engine.select_device(&DeviceId::new("device-1")).unwrap();
//! engine.start(start).unwrap();
//!
//! engine.advance(start + Duration::from_secs(6));
//! assert_eq!(engine.phase(), EnginePhase::Complete);
//! assert_eq!(engine.cache().len(), 1);
//! ```

pub mod activity;
pub mod actor;
pub mod cache;
pub mod engine;
pub mod error;
pub mod events;
mod guidance;
pub mod lifecycle;
pub mod script;
pub mod state;

// Re-export actor types
pub use actor::{run_simulation_actor, SimActorCommand};

// Re-export event types
pub use events::{Guidance, Severity, SimEvent, SimInput};

// Re-export engine types
pub use activity::{ActivityEntry, ActivityId, ActivityKind, ActivityRecorder};
pub use cache::{AddressCache, CacheEntry};
pub use engine::{EngineConfig, SimulationEngine};
pub use error::SimError;
pub use lifecycle::{FiredPhase, Generation, PacketLifecycleManager, Phase};
pub use script::{arp_script, rarp_script, Participant, PhaseEffect};
pub use state::{EnginePhase, SimulationSnapshot, SimulationState, SimulationStep};
