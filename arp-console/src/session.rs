//! Console session
//!
//! Spawns the simulation actor, submits inputs and prints every event until
//! the requested runs have finished.

use anyhow::{anyhow, Context, Result};
use arp_engine::{
    run_simulation_actor, SimActorCommand, SimEvent, SimInput, SimulationEngine,
    SimulationSnapshot,
};
use arp_proto::ProtocolMode;
use arp_topology::DeviceId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::render::render_event;

/// Handle to a running simulation actor
pub struct Session {
    cmd_tx: mpsc::Sender<SimActorCommand>,
    event_rx: mpsc::Receiver<SimEvent>,
    actor: JoinHandle<SimulationEngine>,
    output: Vec<String>,
    echo: bool,
}

impl Session {
    /// Spawn the actor for `engine`; `echo` prints rendered events to stdout
    pub fn spawn(engine: SimulationEngine, echo: bool) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(256);
        let actor = tokio::spawn(run_simulation_actor(engine, cmd_rx, event_tx));

        Self {
            cmd_tx,
            event_rx,
            actor,
            output: Vec::new(),
            echo,
        }
    }

    /// Rendered lines seen so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Apply an input and fail if the engine rejected it
    pub async fn submit(&mut self, input: SimInput) -> Result<()> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.cmd_tx
            .send(SimActorCommand::Submit {
                input,
                response: resp_tx,
            })
            .await
            .map_err(|_| anyhow!("simulation actor stopped"))?;

        let result = resp_rx
            .await
            .map_err(|_| anyhow!("simulation actor dropped the request"))?;

        if result.is_err() {
            // The snapshot round trip flushes the rejection guidance
            self.snapshot().await?;
            self.drain_ready();
        }
        result.map_err(Into::into)
    }

    /// Get the current snapshot
    pub async fn snapshot(&mut self) -> Result<SimulationSnapshot> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.cmd_tx
            .send(SimActorCommand::QuerySnapshot { response: resp_tx })
            .await
            .map_err(|_| anyhow!("simulation actor stopped"))?;
        resp_rx
            .await
            .map_err(|_| anyhow!("simulation actor dropped the request"))
    }

    /// Select `mode` and `device`, start, and wait until the run finishes
    ///
    /// Returns the snapshot taken when the run stopped; its phase tells
    /// whether it completed or was aborted.
    pub async fn run(
        &mut self,
        mode: ProtocolMode,
        device: &DeviceId,
    ) -> Result<SimulationSnapshot> {
        info!("Running {} from {}", mode, device);

        self.submit(SimInput::ModeSelect(mode))
            .await
            .with_context(|| format!("could not select {} mode", mode))?;
        self.submit(SimInput::DeviceSelect(device.clone()))
            .await
            .with_context(|| format!("could not select device {}", device))?;
        self.submit(SimInput::StartSimulation)
            .await
            .context("could not start the simulation")?;

        let mut seen_running = false;
        while let Some(event) = self.event_rx.recv().await {
            let finished = match &event {
                SimEvent::StateChanged(snapshot) => {
                    seen_running |= snapshot.state.running;
                    seen_running && !snapshot.state.running
                }
                _ => false,
            };
            self.emit(&event);

            if finished {
                let snapshot = self.snapshot().await?;
                self.drain_ready();
                return Ok(snapshot);
            }
        }

        Err(anyhow!("simulation actor stopped before the run finished"))
    }

    /// Stop the actor and return the engine
    pub async fn shutdown(mut self) -> Result<SimulationEngine> {
        // The actor may already be gone, in which case joining is enough
        let _ = self.cmd_tx.send(SimActorCommand::Shutdown).await;

        while let Some(event) = self.event_rx.recv().await {
            self.emit(&event);
        }

        let engine = self.actor.await.context("simulation actor panicked")?;
        debug!("Session closed");
        Ok(engine)
    }

    fn drain_ready(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.emit(&event);
        }
    }

    fn emit(&mut self, event: &SimEvent) {
        if let Some(line) = render_event(event) {
            if self.echo {
                println!("{}", line);
            }
            self.output.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arp_engine::{EngineConfig, EnginePhase, SimError};
    use arp_topology::{DeviceRegistry, MemoryStore, DEVICES_KEY};
    use std::net::Ipv4Addr;

    fn engine() -> SimulationEngine {
        let registry = DeviceRegistry::load(Box::new(MemoryStore::new()), DEVICES_KEY);
        SimulationEngine::new(registry, EngineConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_arp_run_finishes() {
        let mut session = Session::spawn(engine(), false);

        let snap = session
            .run(ProtocolMode::Arp, &DeviceId::new("device-1"))
            .await
            .unwrap();
        assert_eq!(snap.phase, EnginePhase::Complete);
        assert_eq!(snap.cache.len(), 1);

        let engine = session.shutdown().await.unwrap();
        assert!(engine.state().complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_sequence_reuses_the_engine() {
        let mut session = Session::spawn(engine(), false);

        session
            .run(ProtocolMode::Arp, &DeviceId::new("device-1"))
            .await
            .unwrap();
        let snap = session
            .run(ProtocolMode::Rarp, &DeviceId::new("device-3"))
            .await
            .unwrap();

        assert_eq!(snap.phase, EnginePhase::Complete);
        let client = snap
            .devices
            .iter()
            .find(|d| d.id.as_str() == "device-3")
            .unwrap();
        assert_eq!(client.address, Ipv4Addr::new(192, 168, 1, 100));

        let output = session.output().to_vec();
        assert!(output.iter().any(|l| l.contains("ARP Resolution Complete")));
        assert!(output.iter().any(|l| l.contains("RARP Assignment Complete")));

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_input_is_an_error() {
        let mut session = Session::spawn(engine(), false);

        let err = session
            .run(ProtocolMode::Arp, &DeviceId::new("no-such-device"))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<SimError>(),
            Some(&SimError::UnknownDevice(DeviceId::new("no-such-device")))
        );
        assert!(session.output().iter().any(|l| l.contains("Unknown Device")));

        let engine = session.shutdown().await.unwrap();
        assert_eq!(engine.phase(), EnginePhase::ModeSelected);
    }
}
