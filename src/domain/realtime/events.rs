//! Closed event vocabularies per connection role.
//!
//! Every connection role has its own enum of inbound events. Names that are
//! not in the enum are rejected while decoding the envelope, so business
//! listeners only ever see known events.

use std::fmt;
use std::hash::Hash;

/// A closed set of inbound event names for one connection role.
pub trait EventKind: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Resolves a wire name, `None` for names outside the set.
    fn from_name(name: &str) -> Option<Self>;

    /// The wire name of this event.
    fn name(&self) -> &'static str;
}

/// Events a machine reporter sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentEvent {
    /// `{ auth_token }` carrying the machine access token.
    Login,
    StaticData,
    DynamicData,
}

impl EventKind for AgentEvent {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "login" => Some(AgentEvent::Login),
            "staticData" => Some(AgentEvent::StaticData),
            "dynamicData" => Some(AgentEvent::DynamicData),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AgentEvent::Login => "login",
            AgentEvent::StaticData => "staticData",
            AgentEvent::DynamicData => "dynamicData",
        }
    }
}

/// Events a dashboard subscriber sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardEvent {
    /// `{ auth_token }` carrying the user's session token.
    Login,
}

impl EventKind for DashboardEvent {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "login" => Some(DashboardEvent::Login),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            DashboardEvent::Login => "login",
        }
    }
}

/// Events the server pushes to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerEvent {
    Authenticated,
    Unauthorized,
    Heartbeat,
    MachineData,
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Authenticated => "authenticated",
            ServerEvent::Unauthorized => "unauthorized",
            ServerEvent::Heartbeat => "heartbeat",
            ServerEvent::MachineData => "machineData",
        }
    }
}
