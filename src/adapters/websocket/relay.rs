//! Telemetry relay between machine reporters and dashboards.
//!
//! Reporters (agent role) log in with their machine access token and stream
//! `staticData` and `dynamicData`. Dashboards log in with a user session
//! token and receive `machineData` for the machines their user owns.
//!
//! Listeners are synchronous, so each connection gets a worker task fed
//! through a bounded queue (the hub's outbound capacity). Work for one
//! connection stays in arrival order; events arriving while the queue is
//! full are dropped with a warning.
//!
//! A machine may have several reporter connections at once. It is marked
//! `Offline` only when the last of them ends.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::domain::foundation::{ConnectionId, MachineId, UserId};
use crate::domain::machine::{AccessToken, DynamicData, MachineSnapshot, MachineStatus, StaticData};
use crate::domain::realtime::{AgentEvent, DashboardEvent, ServerEvent};
use crate::ports::{MachineRepository, SessionValidator};

use super::connection::Connection;
use super::hub::RealtimeHub;

#[derive(Debug, Deserialize)]
struct LoginPayload {
    auth_token: String,
}

enum AgentWork {
    Login(Value),
    StaticData(Value),
    DynamicData(Value),
    Disconnected,
}

enum DashboardWork {
    Login(Value),
    Disconnected,
}

/// A logged-in reporter.
#[derive(Debug, Clone)]
struct Reporter {
    machine_id: MachineId,
    owner_id: UserId,
}

struct Subscriber {
    user_id: UserId,
    connection: Weak<Connection<DashboardEvent>>,
}

/// Wires the agent and dashboard hubs to the machine repository.
pub struct TelemetryRelay {
    dashboards: Arc<RealtimeHub<DashboardEvent>>,
    machines: Arc<dyn MachineRepository>,
    sessions: Arc<dyn SessionValidator>,
    subscribers: RwLock<HashMap<ConnectionId, Subscriber>>,
    /// Live reporter connections per machine. Held across the status write
    /// so logins and logouts of one machine apply in order.
    reporters: Mutex<HashMap<MachineId, usize>>,
    work_buffer: usize,
}

/// Queues work for a connection's worker without blocking the listener.
fn enqueue<W>(queue: &mpsc::Sender<W>, work: W, connection_id: ConnectionId, event: &'static str) {
    if let Err(TrySendError::Full(_)) = queue.try_send(work) {
        tracing::warn!(%connection_id, event, "Work queue full, event dropped");
    }
}

impl TelemetryRelay {
    /// Builds the relay and registers it on both hubs.
    pub fn install(
        agents: &RealtimeHub<AgentEvent>,
        dashboards: Arc<RealtimeHub<DashboardEvent>>,
        machines: Arc<dyn MachineRepository>,
        sessions: Arc<dyn SessionValidator>,
    ) -> Arc<Self> {
        let relay = Arc::new(Self {
            dashboards: Arc::clone(&dashboards),
            machines,
            sessions,
            subscribers: RwLock::new(HashMap::new()),
            reporters: Mutex::new(HashMap::new()),
            work_buffer: agents.outbound_buffer(),
        });

        let weak = Arc::downgrade(&relay);
        agents.on_connection(move |conn| {
            if let Some(relay) = weak.upgrade() {
                relay.attach_agent(conn);
            }
        });

        let weak = Arc::downgrade(&relay);
        dashboards.on_connection(move |conn| {
            if let Some(relay) = weak.upgrade() {
                relay.attach_dashboard(conn);
            }
        });

        relay
    }

    /// Dashboards currently logged in.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sends `{"e":"heartbeat","d":{}}` to every dashboard every `every`.
    pub fn spawn_heartbeat(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let dashboards = Arc::clone(&self.dashboards);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let reached = dashboards.broadcast(ServerEvent::Heartbeat.name(), &json!({}));
                tracing::trace!(reached, "Heartbeat sent");
            }
        })
    }

    // ════════════════════════════════════════════════════════════════════
    // Agents
    // ════════════════════════════════════════════════════════════════════

    fn attach_agent(self: &Arc<Self>, conn: &Arc<Connection<AgentEvent>>) {
        let (tx, rx) = mpsc::channel(self.work_buffer);
        let id = conn.id();

        let queue = tx.clone();
        conn.on(AgentEvent::Login, move |d| {
            enqueue(&queue, AgentWork::Login(d.clone()), id, "login");
        });
        let queue = tx.clone();
        conn.on(AgentEvent::StaticData, move |d| {
            enqueue(&queue, AgentWork::StaticData(d.clone()), id, "staticData");
        });
        let queue = tx.clone();
        conn.on(AgentEvent::DynamicData, move |d| {
            enqueue(&queue, AgentWork::DynamicData(d.clone()), id, "dynamicData");
        });
        // If the queue is full the worker still stops: every sender is
        // dropped with the listener table.
        conn.on_close(move || {
            let _ = tx.try_send(AgentWork::Disconnected);
        });

        tokio::spawn(Arc::clone(self).agent_worker(Arc::clone(conn), rx));
    }

    async fn agent_worker(
        self: Arc<Self>,
        conn: Arc<Connection<AgentEvent>>,
        mut queue: mpsc::Receiver<AgentWork>,
    ) {
        let mut reporter: Option<Reporter> = None;

        while let Some(work) = queue.recv().await {
            match work {
                AgentWork::Login(data) => {
                    if reporter.is_some() {
                        tracing::debug!(connection_id = %conn.id(), "Ignoring repeated reporter login");
                        continue;
                    }
                    reporter = self.login_agent(&conn, data).await;
                }
                AgentWork::StaticData(data) => {
                    let Some(r) = reporter.as_ref() else {
                        tracing::warn!(connection_id = %conn.id(), "staticData before login dropped");
                        continue;
                    };
                    match serde_json::from_value::<StaticData>(data) {
                        Ok(static_data) => {
                            if let Err(e) = self.machines.update_static_data(&r.machine_id, static_data).await {
                                tracing::warn!(machine_id = %r.machine_id, error = %e, "Failed to store static data");
                            }
                        }
                        Err(e) => {
                            tracing::debug!(machine_id = %r.machine_id, error = %e, "Malformed staticData dropped")
                        }
                    }
                }
                AgentWork::DynamicData(data) => {
                    let Some(r) = reporter.as_ref() else {
                        tracing::warn!(connection_id = %conn.id(), "dynamicData before login dropped");
                        continue;
                    };
                    match serde_json::from_value::<DynamicData>(data) {
                        Ok(sample) => {
                            let snapshot = MachineSnapshot::summarise(r.machine_id, sample);
                            self.publish(&r.owner_id, &snapshot);
                        }
                        Err(e) => {
                            tracing::debug!(machine_id = %r.machine_id, error = %e, "Malformed dynamicData dropped")
                        }
                    }
                }
                AgentWork::Disconnected => break,
            }
        }

        if let Some(r) = reporter {
            self.logout_agent(&r.machine_id).await;
        }
    }

    async fn logout_agent(&self, machine_id: &MachineId) {
        let mut reporters = self.reporters.lock().await;
        let remaining = match reporters.get_mut(machine_id) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };

        if remaining > 0 {
            tracing::info!(%machine_id, remaining, "Reporter disconnected, machine still reporting");
            return;
        }
        reporters.remove(machine_id);
        if let Err(e) = self.machines.set_status(machine_id, MachineStatus::Offline).await {
            tracing::warn!(%machine_id, error = %e, "Failed to mark machine offline");
        }
        tracing::info!(%machine_id, "Reporter disconnected");
    }

    async fn login_agent(&self, conn: &Connection<AgentEvent>, data: Value) -> Option<Reporter> {
        let token = serde_json::from_value::<LoginPayload>(data)
            .ok()
            .and_then(|p| AccessToken::parse(p.auth_token).ok());

        let machine = match token {
            Some(token) => match self.machines.find_by_access_token(&token).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::error!(connection_id = %conn.id(), error = %e, "Machine lookup failed");
                    None
                }
            },
            None => None,
        };

        let Some(machine) = machine else {
            tracing::info!(connection_id = %conn.id(), "Reporter login rejected");
            let _ = conn.send_event(ServerEvent::Unauthorized, &json!({}));
            conn.close();
            return None;
        };

        {
            let mut reporters = self.reporters.lock().await;
            *reporters.entry(machine.id()).or_insert(0) += 1;
            if let Err(e) = self.machines.set_status(&machine.id(), MachineStatus::Online).await {
                tracing::warn!(machine_id = %machine.id(), error = %e, "Failed to mark machine online");
            }
        }
        let _ = conn.send_event(ServerEvent::Authenticated, &json!({ "uuid": machine.id() }));
        tracing::info!(connection_id = %conn.id(), machine_id = %machine.id(), "Reporter logged in");

        Some(Reporter {
            machine_id: machine.id(),
            owner_id: machine.owner_id().clone(),
        })
    }

    /// Sends a snapshot to every dashboard of `owner`.
    fn publish(&self, owner: &UserId, snapshot: &MachineSnapshot) {
        let targets: Vec<Arc<Connection<DashboardEvent>>> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|s| &s.user_id == owner)
            .filter_map(|s| s.connection.upgrade())
            .collect();

        for conn in targets {
            if let Err(e) = conn.send_event(ServerEvent::MachineData, snapshot) {
                tracing::debug!(connection_id = %conn.id(), error = %e, "machineData not delivered");
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════
    // Dashboards
    // ════════════════════════════════════════════════════════════════════

    fn attach_dashboard(self: &Arc<Self>, conn: &Arc<Connection<DashboardEvent>>) {
        let (tx, rx) = mpsc::channel(self.work_buffer);
        let id = conn.id();

        let queue = tx.clone();
        conn.on(DashboardEvent::Login, move |d| {
            enqueue(&queue, DashboardWork::Login(d.clone()), id, "login");
        });
        conn.on_close(move || {
            let _ = tx.try_send(DashboardWork::Disconnected);
        });

        tokio::spawn(Arc::clone(self).dashboard_worker(Arc::clone(conn), rx));
    }

    async fn dashboard_worker(
        self: Arc<Self>,
        conn: Arc<Connection<DashboardEvent>>,
        mut queue: mpsc::Receiver<DashboardWork>,
    ) {
        let id = conn.id();
        let weak = Arc::downgrade(&conn);
        drop(conn);

        while let Some(work) = queue.recv().await {
            match work {
                DashboardWork::Login(data) => {
                    let Some(conn) = weak.upgrade() else { break };
                    self.login_dashboard(&conn, data).await;
                }
                DashboardWork::Disconnected => break,
            }
        }

        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    async fn login_dashboard(&self, conn: &Arc<Connection<DashboardEvent>>, data: Value) {
        let token = match serde_json::from_value::<LoginPayload>(data) {
            Ok(payload) => payload.auth_token,
            Err(_) => String::new(),
        };

        match self.sessions.validate(&token).await {
            Ok(user) => {
                self.subscribers
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(
                        conn.id(),
                        Subscriber {
                            user_id: user.id.clone(),
                            connection: Arc::downgrade(conn),
                        },
                    );
                let _ = conn.send_event(ServerEvent::Authenticated, &json!({ "user": user.id }));
                tracing::info!(connection_id = %conn.id(), owner_id = %user.id, "Dashboard subscribed");
            }
            Err(e) => {
                tracing::info!(connection_id = %conn.id(), error = %e, "Dashboard login rejected");
                let _ = conn.send_event(ServerEvent::Unauthorized, &json!({}));
                conn.close();
            }
        }
    }
}
