use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

pub const COMPOSE_PROJECT_LABEL: &str = "com.docker.compose.project";
pub const STACK_NAMESPACE_LABEL: &str = "com.docker.stack.namespace";

/// A container from `docker/containers/json?all=true`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContainerSummary {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Names")]
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(rename = "Image")]
    #[serde(default)]
    pub image: String,
    /// "running", "exited", "paused", ...
    #[serde(rename = "State")]
    #[serde(default)]
    pub state: String,
    /// Human status, e.g. "Up 2 hours".
    #[serde(rename = "Status")]
    #[serde(default)]
    pub status: String,
    #[serde(rename = "Labels")]
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl ContainerSummary {
    /// Compose project OR stack namespace label equal to `stack`.
    pub fn belongs_to(&self, stack: &str) -> bool {
        self.labels.get(COMPOSE_PROJECT_LABEL).map(String::as_str) == Some(stack)
            || self.labels.get(STACK_NAMESPACE_LABEL).map(String::as_str) == Some(stack)
    }

    pub fn display_name(&self) -> String {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/').to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| short_id(&self.id))
    }

    pub fn is_running(&self) -> bool {
        self.state == "running"
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ObjectVersion {
    #[serde(rename = "Index")]
    #[serde(default)]
    pub index: u64,
}

/// A Swarm service from `docker/services`.
///
/// The spec is kept as raw JSON so a replica update can send back every
/// field the daemon returned, including ones this crate does not model.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServiceSummary {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Version")]
    #[serde(default)]
    pub version: ObjectVersion,
    #[serde(rename = "Spec")]
    #[serde(default)]
    pub spec: Value,
}

impl ServiceSummary {
    pub fn name(&self) -> Option<&str> {
        self.spec.get("Name").and_then(Value::as_str)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.spec.get("Labels")?.get(key)?.as_str()
    }

    pub fn belongs_to(&self, stack: &str) -> bool {
        self.label(STACK_NAMESPACE_LABEL) == Some(stack)
    }

    /// Scheduling mode, read from the single key under `Spec.Mode`.
    pub fn mode(&self) -> ServiceMode {
        let Some(mode) = self.spec.get("Mode").and_then(Value::as_object) else {
            return ServiceMode::Other(String::new());
        };
        if let Some(replicated) = mode.get("Replicated") {
            return ServiceMode::Replicated(replicated.get("Replicas").and_then(Value::as_u64).unwrap_or(0));
        }
        if mode.contains_key("Global") {
            return ServiceMode::Global;
        }
        ServiceMode::Other(mode.keys().next().cloned().unwrap_or_default())
    }

    /// Desired replica count, or None when the service is not replicated.
    pub fn replicas(&self) -> Option<u64> {
        match self.mode() {
            ServiceMode::Replicated(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.mode() == ServiceMode::Global
    }

    pub fn display_name(&self) -> String {
        self.name()
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| short_id(&self.id))
    }

    /// Global services have no replica count and are always scheduled.
    /// Job services run to completion and never count as running.
    pub fn is_running(&self) -> bool {
        match self.mode() {
            ServiceMode::Replicated(n) => n > 0,
            ServiceMode::Global => true,
            ServiceMode::Other(_) => false,
        }
    }

    /// Copy of the spec with the replicated mode set to `replicas`.
    pub fn spec_with_replicas(&self, replicas: u64) -> Value {
        let mut spec = self.spec.clone();
        if !spec.is_object() {
            spec = Value::Object(Default::default());
        }
        spec["Mode"] = serde_json::json!({ "Replicated": { "Replicas": replicas } });
        spec
    }
}

/// How Swarm schedules a service's tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceMode {
    Replicated(u64),
    Global,
    /// Job modes and anything newer; holds the mode key as listed.
    Other(String),
}

/// First 12 characters of a Docker id.
pub fn short_id(id: &str) -> String {
    id.chars().take(12).collect()
}

/// A Swarm service or Compose container belonging to a stack.
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub running: bool,
    pub detail: MemberDetail,
}

#[derive(Clone, Debug, PartialEq)]
pub enum MemberDetail {
    Compose { state: String, status: String, image: String },
    Swarm { mode: ServiceMode },
}

impl Member {
    pub fn from_container(c: &ContainerSummary) -> Self {
        Self {
            id: c.id.clone(),
            name: c.display_name(),
            running: c.is_running(),
            detail: MemberDetail::Compose {
                state: if c.state.is_empty() { "unknown".to_string() } else { c.state.clone() },
                status: c.status.clone(),
                image: c.image.clone(),
            },
        }
    }

    pub fn from_service(s: &ServiceSummary) -> Self {
        Self {
            id: s.id.clone(),
            name: s.display_name(),
            running: s.is_running(),
            detail: MemberDetail::Swarm { mode: s.mode() },
        }
    }

    /// Container-level actions (logs, restart) only exist for Compose members.
    pub fn is_container(&self) -> bool {
        matches!(self.detail, MemberDetail::Compose { .. })
    }

    /// Only replicated services take part in a stack start/stop.
    pub fn is_scalable(&self) -> bool {
        matches!(self.detail, MemberDetail::Swarm { mode: ServiceMode::Replicated(_) })
    }

    /// Text for the state column.
    pub fn state_text(&self) -> String {
        match &self.detail {
            MemberDetail::Compose { state, .. } => state.clone(),
            MemberDetail::Swarm { mode: ServiceMode::Replicated(n) } => format!("{} replicas", n),
            MemberDetail::Swarm { mode: ServiceMode::Global } => "Global".to_string(),
            MemberDetail::Swarm { mode: ServiceMode::Other(name) } if !name.is_empty() => name.clone(),
            MemberDetail::Swarm { .. } => "unknown mode".to_string(),
        }
    }
}
