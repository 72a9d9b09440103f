use std::fmt;

use serde::Deserialize;

/// Portainer's numeric id for a managed container host.
pub type EndpointId = i64;

/// Endpoint id used when the endpoints listing comes back empty.
pub const FALLBACK_ENDPOINT_ID: EndpointId = 1;

/// Stack status discriminant Portainer uses for an active stack.
pub const STACK_STATUS_ACTIVE: i64 = 1;

/// A host entry from `GET /api/endpoints`. Only the id is used.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "Id")]
    pub id: EndpointId,
    #[serde(rename = "Name")]
    #[serde(default)]
    pub name: String,
}

/// A stack as listed by `GET /api/stacks`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Stack {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    /// 1 = Swarm, 2 = Compose (3 = Kubernetes, unsupported).
    #[serde(rename = "Type")]
    pub kind: i64,
    /// 1 = active, 2 = inactive.
    #[serde(rename = "Status")]
    #[serde(default)]
    pub status: i64,
}

impl Stack {
    /// The stack's own running flag. Independent of its members' state.
    pub fn is_running(&self) -> bool {
        self.status == STACK_STATUS_ACTIVE
    }

    pub fn orchestration(&self) -> Result<Orchestration, UnknownOrchestration> {
        Orchestration::try_from(self.kind)
    }
}

/// How the members of a stack are deployed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orchestration {
    Swarm,
    Compose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownOrchestration(pub i64);

impl TryFrom<i64> for Orchestration {
    type Error = UnknownOrchestration;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Orchestration::Swarm),
            2 => Ok(Orchestration::Compose),
            other => Err(UnknownOrchestration(other)),
        }
    }
}

impl Orchestration {
    pub fn label(self) -> &'static str {
        match self {
            Orchestration::Swarm => "Docker Swarm",
            Orchestration::Compose => "Docker Compose",
        }
    }

    /// Heading used above the member list.
    pub fn member_noun(self) -> &'static str {
        match self {
            Orchestration::Swarm => "Services",
            Orchestration::Compose => "Containers",
        }
    }
}

impl fmt::Display for Orchestration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Desired lifecycle state for a stack action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DesiredState {
    Running,
    Stopped,
}

impl DesiredState {
    /// Verb used in routes, logs and toasts.
    pub fn verb(self) -> &'static str {
        match self {
            DesiredState::Running => "start",
            DesiredState::Stopped => "stop",
        }
    }

    /// Replica count a Swarm service is scaled to.
    pub fn replicas(self) -> u64 {
        match self {
            DesiredState::Running => 1,
            DesiredState::Stopped => 0,
        }
    }
}
