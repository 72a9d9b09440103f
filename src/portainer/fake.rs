//! In-memory `StackApi` used by unit tests. Records every call and applies
//! lifecycle/scale updates to its own state so follow-up listings see them.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::model::{
    ContainerSummary, DesiredState, Endpoint, EndpointId, ObjectVersion, ServiceSummary, Stack,
    COMPOSE_PROJECT_LABEL, STACK_NAMESPACE_LABEL,
};

use super::StackApi;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Endpoints,
    Stacks,
    Containers,
    Services,
    Lifecycle { stack_id: i64, desired: DesiredState },
    UpdateService { id: String, version: u64, replicas: u64 },
    Logs(String),
    Restart(String),
}

impl Call {
    /// Calls that change the state of a stack.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::Lifecycle { .. } | Call::UpdateService { .. } | Call::Restart(_)
        )
    }
}

#[derive(Default)]
struct State {
    endpoints: Vec<EndpointId>,
    stacks: Vec<Stack>,
    containers: Vec<ContainerSummary>,
    services: Vec<ServiceSummary>,
    logs: Vec<u8>,
    calls: Vec<Call>,
    /// When set, lifecycle calls succeed without changing stack state.
    ignore_lifecycle: bool,
    fail_endpoints: Option<u16>,
    fail_stacks: Option<u16>,
    fail_containers: Option<u16>,
    fail_services: Option<u16>,
    fail_lifecycle: HashMap<DesiredState, (u16, String)>,
    fail_updates: HashMap<String, u16>,
    fail_restart: Option<(u16, String)>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

fn status(code: u16, body: &str) -> ApiError {
    ApiError::Status {
        status: code,
        body: body.to_string(),
    }
}

impl FakeApi {
    pub fn with_endpoints(self, ids: Vec<EndpointId>) -> Self {
        self.state.lock().unwrap().endpoints = ids;
        self
    }

    pub fn with_stacks(self, stacks: Vec<Stack>) -> Self {
        self.state.lock().unwrap().stacks = stacks;
        self
    }

    pub fn with_containers(self, containers: Vec<ContainerSummary>) -> Self {
        self.state.lock().unwrap().containers = containers;
        self
    }

    pub fn with_services(self, services: Vec<ServiceSummary>) -> Self {
        self.state.lock().unwrap().services = services;
        self
    }

    pub fn stack(id: i64, name: &str, kind: i64, status: i64) -> Stack {
        Stack {
            id,
            name: name.to_string(),
            kind,
            status,
        }
    }

    pub fn container(id: &str, name: &str, project: &str, state: &str) -> ContainerSummary {
        let mut labels = HashMap::new();
        labels.insert(COMPOSE_PROJECT_LABEL.to_string(), project.to_string());
        ContainerSummary {
            id: id.to_string(),
            names: vec![format!("/{}", name)],
            state: state.to_string(),
            labels,
            ..Default::default()
        }
    }

    pub fn service(id: &str, name: &str, namespace: &str, replicas: u64, version: u64) -> ServiceSummary {
        ServiceSummary {
            id: id.to_string(),
            version: ObjectVersion { index: version },
            spec: serde_json::json!({
                "Name": name,
                "Labels": { STACK_NAMESPACE_LABEL: namespace },
                "Mode": { "Replicated": { "Replicas": replicas } },
            }),
        }
    }

    pub fn ignore_lifecycle(&self) {
        self.state.lock().unwrap().ignore_lifecycle = true;
    }

    pub fn set_logs(&self, bytes: Vec<u8>) {
        self.state.lock().unwrap().logs = bytes;
    }

    pub fn fail_endpoints(&self, code: u16) {
        self.state.lock().unwrap().fail_endpoints = Some(code);
    }

    pub fn fail_stacks(&self, code: u16) {
        self.state.lock().unwrap().fail_stacks = Some(code);
    }

    pub fn fail_containers(&self, code: u16) {
        self.state.lock().unwrap().fail_containers = Some(code);
    }

    pub fn fail_services(&self, code: u16) {
        self.state.lock().unwrap().fail_services = Some(code);
    }

    /// Fail both start and stop.
    pub fn fail_lifecycle(&self, code: u16, body: &str) {
        self.fail_lifecycle_for(DesiredState::Running, code, body);
        self.fail_lifecycle_for(DesiredState::Stopped, code, body);
    }

    pub fn fail_lifecycle_for(&self, desired: DesiredState, code: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .fail_lifecycle
            .insert(desired, (code, body.to_string()));
    }

    pub fn fail_update(&self, service_id: &str, code: u16) {
        self.state
            .lock()
            .unwrap()
            .fail_updates
            .insert(service_id.to_string(), code);
    }

    pub fn fail_restart(&self, code: u16, body: &str) {
        self.state.lock().unwrap().fail_restart = Some((code, body.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    /// (service id, version, replicas) of every update call.
    pub fn updates(&self) -> Vec<(String, u64, u64)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::UpdateService { id, version, replicas } => Some((id, version, replicas)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl StackApi for FakeApi {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, ApiError> {
        self.record(Call::Endpoints);
        let state = self.state.lock().unwrap();
        if let Some(code) = state.fail_endpoints {
            return Err(status(code, "Unauthorized"));
        }
        Ok(state
            .endpoints
            .iter()
            .map(|&id| Endpoint { id, name: format!("host-{}", id) })
            .collect())
    }

    async fn stacks(&self) -> Result<Vec<Stack>, ApiError> {
        self.record(Call::Stacks);
        let state = self.state.lock().unwrap();
        if let Some(code) = state.fail_stacks {
            return Err(status(code, "stacks unavailable"));
        }
        Ok(state.stacks.clone())
    }

    async fn containers(&self, _endpoint: EndpointId) -> Result<Vec<ContainerSummary>, ApiError> {
        self.record(Call::Containers);
        let state = self.state.lock().unwrap();
        if let Some(code) = state.fail_containers {
            return Err(status(code, "containers unavailable"));
        }
        Ok(state.containers.clone())
    }

    async fn services(&self, _endpoint: EndpointId) -> Result<Vec<ServiceSummary>, ApiError> {
        self.record(Call::Services);
        let state = self.state.lock().unwrap();
        if let Some(code) = state.fail_services {
            return Err(status(code, "This node is not a swarm manager."));
        }
        Ok(state.services.clone())
    }

    async fn stack_lifecycle(
        &self,
        stack_id: i64,
        _endpoint: EndpointId,
        desired: DesiredState,
    ) -> Result<(), ApiError> {
        self.record(Call::Lifecycle { stack_id, desired });
        let mut state = self.state.lock().unwrap();
        if let Some((code, body)) = state.fail_lifecycle.get(&desired) {
            return Err(status(*code, body));
        }
        if state.ignore_lifecycle {
            return Ok(());
        }
        let Some(name) = state.stacks.iter().find(|s| s.id == stack_id).map(|s| s.name.clone()) else {
            return Err(status(404, "stack not found"));
        };
        for stack in state.stacks.iter_mut().filter(|s| s.id == stack_id) {
            stack.status = if desired == DesiredState::Running { 1 } else { 2 };
        }
        for c in state.containers.iter_mut().filter(|c| c.belongs_to(&name)) {
            c.state = if desired == DesiredState::Running { "running" } else { "exited" }.to_string();
        }
        Ok(())
    }

    async fn update_service(
        &self,
        _endpoint: EndpointId,
        service_id: &str,
        version: u64,
        spec: &Value,
    ) -> Result<(), ApiError> {
        let replicas = spec["Mode"]["Replicated"]["Replicas"].as_u64().unwrap_or(0);
        self.record(Call::UpdateService {
            id: service_id.to_string(),
            version,
            replicas,
        });
        let mut state = self.state.lock().unwrap();
        if let Some(code) = state.fail_updates.get(service_id) {
            return Err(status(*code, "update out of sequence"));
        }
        for s in state.services.iter_mut().filter(|s| s.id == service_id) {
            s.spec = spec.clone();
            s.version.index += 1;
        }
        Ok(())
    }

    async fn container_logs(
        &self,
        _endpoint: EndpointId,
        container_id: &str,
        _tail: u32,
    ) -> Result<Vec<u8>, ApiError> {
        self.record(Call::Logs(container_id.to_string()));
        Ok(self.state.lock().unwrap().logs.clone())
    }

    async fn restart_container(&self, _endpoint: EndpointId, container_id: &str) -> Result<(), ApiError> {
        self.record(Call::Restart(container_id.to_string()));
        let state = self.state.lock().unwrap();
        if let Some((code, body)) = &state.fail_restart {
            return Err(status(*code, body));
        }
        Ok(())
    }
}
