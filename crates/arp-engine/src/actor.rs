//! Simulation Actor
//!
//! Async driver that owns a [`SimulationEngine`] and feeds it wall-clock time.
//! Front ends send [`SimActorCommand`]s through one channel and receive every
//! [`SimEvent`] through another, in the order the engine produced them.
//!
//! The actor sleeps until the engine's next phase deadline, so the engine
//! itself never needs a timer.
//!
//! # Example
//!
//! ```rust,ignore
//! use arp_engine::{run_simulation_actor, SimActorCommand, SimInput};
//! use tokio::sync::mpsc;
//!
//! let (cmd_tx, cmd_rx) = mpsc::channel(64);
//! let (event_tx, mut event_rx) = mpsc::channel(256);
//!
//! // Spawn the actor
//! tokio::spawn(run_simulation_actor(engine, cmd_rx, event_tx));
//!
//! cmd_tx.send(SimActorCommand::Input(SimInput::Reset)).await?;
//! ```

use std::future;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::engine::SimulationEngine;
use crate::error::SimError;
use crate::events::{SimEvent, SimInput};
use crate::state::SimulationSnapshot;

/// Commands sent to the simulation actor
#[derive(Debug)]
pub enum SimActorCommand {
    /// Apply an input; rejections surface as guidance events only
    Input(SimInput),

    /// Apply an input and report whether it was accepted
    Submit {
        /// The input to apply
        input: SimInput,
        /// Channel to send back the outcome
        response: oneshot::Sender<Result<(), SimError>>,
    },

    /// Query the current presentation state
    QuerySnapshot {
        /// Channel to send back the snapshot
        response: oneshot::Sender<SimulationSnapshot>,
    },

    /// Shutdown the actor
    Shutdown,
}

/// Run the simulation actor until shutdown or until every command sender is
/// dropped. Returns the engine so the caller can inspect the final state.
pub async fn run_simulation_actor(
    mut engine: SimulationEngine,
    mut cmd_rx: mpsc::Receiver<SimActorCommand>,
    event_tx: mpsc::Sender<SimEvent>,
) -> SimulationEngine {
    info!("Simulation actor started");

    loop {
        let deadline = engine.next_deadline();

        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break; };
                let now = Instant::now().into_std();

                // Phases due before the command was received apply first
                engine.advance(now);

                match cmd {
                    SimActorCommand::Input(input) => {
                        let _ = engine.handle(input, now);
                    }
                    SimActorCommand::Submit { input, response } => {
                        let _ = response.send(engine.handle(input, now));
                    }
                    SimActorCommand::QuerySnapshot { response } => {
                        let _ = response.send(engine.snapshot());
                    }
                    SimActorCommand::Shutdown => {
                        info!("Simulation actor shutting down");
                        forward_events(&mut engine, &event_tx).await;
                        break;
                    }
                }
            }

            _ = wait_for(deadline) => {
                engine.advance(Instant::now().into_std());
            }
        }

        forward_events(&mut engine, &event_tx).await;
    }

    debug!("Simulation actor stopped");
    engine
}

async fn wait_for(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => sleep_until(Instant::from_std(deadline)).await,
        None => future::pending().await,
    }
}

async fn forward_events(engine: &mut SimulationEngine, event_tx: &mpsc::Sender<SimEvent>) {
    for event in engine.drain_events() {
        let _ = event_tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineConfig;
    use crate::state::EnginePhase;
    use arp_proto::ProtocolMode;
    use arp_topology::{DeviceId, DeviceRegistry, MemoryStore, DEVICES_KEY};
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn engine() -> SimulationEngine {
        let registry = DeviceRegistry::load(Box::new(MemoryStore::new()), DEVICES_KEY);
        SimulationEngine::new(registry, EngineConfig::default())
    }

    async fn submit(
        cmd_tx: &mpsc::Sender<SimActorCommand>,
        input: SimInput,
    ) -> Result<(), SimError> {
        let (resp_tx, resp_rx) = oneshot::channel();
        cmd_tx
            .send(SimActorCommand::Submit {
                input,
                response: resp_tx,
            })
            .await
            .unwrap();
        resp_rx.await.unwrap()
    }

    async fn snapshot(cmd_tx: &mpsc::Sender<SimActorCommand>) -> SimulationSnapshot {
        let (resp_tx, resp_rx) = oneshot::channel();
        cmd_tx
            .send(SimActorCommand::QuerySnapshot { response: resp_tx })
            .await
            .unwrap();
        resp_rx.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_arp_run_completes_on_its_own() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::channel(256);
        let actor_handle = tokio::spawn(run_simulation_actor(engine(), cmd_rx, event_tx));

        submit(&cmd_tx, SimInput::ModeSelect(ProtocolMode::Arp))
            .await
            .unwrap();
        submit(&cmd_tx, SimInput::DeviceSelect(DeviceId::new("device-1")))
            .await
            .unwrap();
        submit(&cmd_tx, SimInput::StartSimulation).await.unwrap();

        assert_eq!(snapshot(&cmd_tx).await.phase, EnginePhase::Running);

        tokio::time::sleep(Duration::from_millis(6500)).await;

        let snap = snapshot(&cmd_tx).await;
        assert_eq!(snap.phase, EnginePhase::Complete);
        assert_eq!(snap.cache.len(), 1);
        assert_eq!(snap.cache[0].address, Ipv4Addr::new(192, 168, 1, 20));
        assert!(snap.packets.is_empty());

        cmd_tx.send(SimActorCommand::Shutdown).await.unwrap();
        let engine = actor_handle.await.unwrap();
        assert!(engine.state().complete);

        let mut titles = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            if let Some(g) = event.as_guidance() {
                titles.push(g.title.clone());
            }
        }
        assert_eq!(titles.last().map(String::as_str), Some("ARP Resolution Complete"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_phases_fire_on_schedule() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, _event_rx) = mpsc::channel(256);
        let actor_handle = tokio::spawn(run_simulation_actor(engine(), cmd_rx, event_tx));

        submit(&cmd_tx, SimInput::ModeSelect(ProtocolMode::Rarp))
            .await
            .unwrap();
        submit(&cmd_tx, SimInput::DeviceSelect(DeviceId::new("device-3")))
            .await
            .unwrap();
        submit(&cmd_tx, SimInput::StartSimulation).await.unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let snap = snapshot(&cmd_tx).await;
        assert_eq!(snap.state.current_step, 2);
        assert_eq!(snap.packets.len(), 1);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(snapshot(&cmd_tx).await.state.current_step, 3);

        cmd_tx.send(SimActorCommand::Shutdown).await.unwrap();
        actor_handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_pending_phases() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, _event_rx) = mpsc::channel(256);
        let actor_handle = tokio::spawn(run_simulation_actor(engine(), cmd_rx, event_tx));

        submit(&cmd_tx, SimInput::ModeSelect(ProtocolMode::Arp))
            .await
            .unwrap();
        submit(&cmd_tx, SimInput::DeviceSelect(DeviceId::new("device-1")))
            .await
            .unwrap();
        submit(&cmd_tx, SimInput::StartSimulation).await.unwrap();

        tokio::time::sleep(Duration::from_millis(3000)).await;
        submit(&cmd_tx, SimInput::Reset).await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let snap = snapshot(&cmd_tx).await;
        assert_eq!(snap.phase, EnginePhase::Idle);
        assert!(snap.cache.is_empty());
        assert!(snap.recent_activity.is_empty());

        cmd_tx.send(SimActorCommand::Shutdown).await.unwrap();
        actor_handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_is_reported() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = mpsc::channel(256);
        let actor_handle = tokio::spawn(run_simulation_actor(engine(), cmd_rx, event_tx));

        submit(&cmd_tx, SimInput::ModeSelect(ProtocolMode::Arp))
            .await
            .unwrap();
        let result = submit(&cmd_tx, SimInput::StartSimulation).await;
        assert_eq!(result, Err(SimError::NoDeviceSelected));

        cmd_tx.send(SimActorCommand::Shutdown).await.unwrap();
        actor_handle.await.unwrap();

        let mut warned = false;
        while let Ok(event) = event_rx.try_recv() {
            if let SimEvent::Guidance(g) = event {
                warned |= g.title == "Selection Required";
            }
        }
        assert!(warned);
    }

    #[tokio::test]
    async fn test_actor_stops_when_senders_drop() {
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (event_tx, _event_rx) = mpsc::channel(256);
        let actor_handle = tokio::spawn(run_simulation_actor(engine(), cmd_rx, event_tx));

        drop(cmd_tx);
        let engine = actor_handle.await.unwrap();
        assert_eq!(engine.phase(), EnginePhase::Idle);
    }
}
