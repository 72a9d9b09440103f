mod client;
mod logs;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::ScalePolicy;
use crate::error::{ApiError, PanelError};
use crate::model::{
    ContainerSummary, DesiredState, Endpoint, EndpointId, Orchestration, ServiceSummary, Stack,
    FALLBACK_ENDPOINT_ID,
};

pub use client::{PortainerClient, API_KEY_HEADER};
pub use logs::clean_log_output;

/// Raw calls against the management API. Implemented over HTTP by
/// [`PortainerClient`]; tests substitute an in-memory fake.
#[async_trait]
pub trait StackApi: Send + Sync {
    async fn endpoints(&self) -> Result<Vec<Endpoint>, ApiError>;

    async fn stacks(&self) -> Result<Vec<Stack>, ApiError>;

    async fn containers(&self, endpoint: EndpointId) -> Result<Vec<ContainerSummary>, ApiError>;

    async fn services(&self, endpoint: EndpointId) -> Result<Vec<ServiceSummary>, ApiError>;

    /// Start or stop a Compose stack.
    async fn stack_lifecycle(
        &self,
        stack_id: i64,
        endpoint: EndpointId,
        desired: DesiredState,
    ) -> Result<(), ApiError>;

    /// Replace a service spec, guarded by the service's version index.
    async fn update_service(
        &self,
        endpoint: EndpointId,
        service_id: &str,
        version: u64,
        spec: &Value,
    ) -> Result<(), ApiError>;

    async fn container_logs(
        &self,
        endpoint: EndpointId,
        container_id: &str,
        tail: u32,
    ) -> Result<Vec<u8>, ApiError>;

    async fn restart_container(&self, endpoint: EndpointId, container_id: &str) -> Result<(), ApiError>;
}

/// What happened to one service during a Swarm start/stop.
#[derive(Debug)]
pub enum ScaleResult {
    Updated,
    /// Global and job services have no replica count to change.
    Skipped,
    Failed(ApiError),
}

#[derive(Debug)]
pub struct ServiceOutcome {
    pub service_name: String,
    pub result: ScaleResult,
}

/// Per-service results of a Swarm start/stop.
#[derive(Debug, Default)]
pub struct ScaleReport {
    pub replicas: u64,
    pub outcomes: Vec<ServiceOutcome>,
}

impl ScaleReport {
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, ScaleResult::Failed(_)))
            .count()
    }

    pub fn updated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, ScaleResult::Updated))
            .count()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, ScaleResult::Failed(_)))
            .map(|o| o.service_name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Result of a successful stack start/stop.
#[derive(Debug)]
pub enum ActionReport {
    Compose,
    Swarm(ScaleReport),
}

impl ActionReport {
    /// Services that could not be updated, empty for Compose.
    pub fn failed_services(&self) -> Vec<&str> {
        match self {
            ActionReport::Compose => Vec::new(),
            ActionReport::Swarm(report) => report.failed_names(),
        }
    }
}

/// Session-scoped wrapper over a [`StackApi`]: caches the endpoint id and
/// maps raw API failures onto the panel's error kinds.
pub struct Remote {
    api: Arc<dyn StackApi>,
    endpoint: OnceCell<EndpointId>,
}

impl Remote {
    pub fn new(api: Arc<dyn StackApi>) -> Self {
        Self {
            api,
            endpoint: OnceCell::new(),
        }
    }

    /// Endpoint id of the first listed host, resolved once per session.
    /// An empty listing falls back to id 1.
    pub async fn resolve_endpoint(&self) -> Result<EndpointId, PanelError> {
        let id = self
            .endpoint
            .get_or_try_init(|| async {
                let endpoints = self.api.endpoints().await.map_err(PanelError::Auth)?;
                let id = match endpoints.first() {
                    Some(e) => {
                        info!(endpoint = e.id, name = %e.name, "endpoint resolved");
                        e.id
                    }
                    None => {
                        warn!("no endpoints listed, using fallback id {}", FALLBACK_ENDPOINT_ID);
                        FALLBACK_ENDPOINT_ID
                    }
                };
                Ok::<_, PanelError>(id)
            })
            .await?;
        Ok(*id)
    }

    pub async fn list_stacks(&self) -> Result<Vec<Stack>, PanelError> {
        self.api.stacks().await.map_err(|source| PanelError::Fetch {
            what: "stacks",
            source,
        })
    }

    /// Container listing; a failed call degrades to an empty list.
    pub async fn list_containers(&self, endpoint: EndpointId) -> Vec<ContainerSummary> {
        match self.api.containers(endpoint).await {
            Ok(containers) => containers,
            Err(e) => {
                warn!(endpoint, error = %e, "container listing failed, showing no containers");
                Vec::new()
            }
        }
    }

    /// Service listing; a failed call degrades to an empty list.
    pub async fn list_services(&self, endpoint: EndpointId) -> Vec<ServiceSummary> {
        match self.api.services(endpoint).await {
            Ok(services) => services,
            Err(e) => {
                warn!(endpoint, error = %e, "service listing failed, showing no services");
                Vec::new()
            }
        }
    }

    /// Start or stop a stack. Compose stacks use the stack lifecycle route;
    /// Swarm stacks scale each of their services to 1 or 0 replicas.
    pub async fn set_stack_running(
        &self,
        stack: &Stack,
        orchestration: Orchestration,
        desired: DesiredState,
        policy: ScalePolicy,
    ) -> Result<ActionReport, PanelError> {
        let endpoint = self.resolve_endpoint().await?;
        info!(stack = %stack.name, action = desired.verb(), %orchestration, "stack action");

        match orchestration {
            Orchestration::Compose => {
                self.api
                    .stack_lifecycle(stack.id, endpoint, desired)
                    .await
                    .map_err(|source| PanelError::Action {
                        action: format!("{} stack", desired.verb()),
                        source,
                    })?;
                Ok(ActionReport::Compose)
            }
            Orchestration::Swarm => {
                let services = self.api.services(endpoint).await.map_err(|source| PanelError::Fetch {
                    what: "services",
                    source,
                })?;
                let report = self
                    .scale_services(endpoint, &stack.name, &services, desired, policy)
                    .await;
                match report {
                    Ok(report) => Ok(ActionReport::Swarm(report)),
                    Err(report) => Err(PanelError::PartialScale {
                        action: desired.verb().to_string(),
                        report,
                    }),
                }
            }
        }
    }

    /// Scale every service of `stack_name`. `Err` only under
    /// [`ScalePolicy::AllOrNothing`], after the first failure.
    async fn scale_services(
        &self,
        endpoint: EndpointId,
        stack_name: &str,
        services: &[ServiceSummary],
        desired: DesiredState,
        policy: ScalePolicy,
    ) -> Result<ScaleReport, ScaleReport> {
        let replicas = desired.replicas();
        let mut report = ScaleReport {
            replicas,
            outcomes: Vec::new(),
        };

        for service in services.iter().filter(|s| s.belongs_to(stack_name)) {
            let service_name = service.display_name();
            let result = if service.replicas().is_none() {
                debug!(service = %service_name, mode = ?service.mode(), "skipping non-replicated service");
                ScaleResult::Skipped
            } else {
                let spec = service.spec_with_replicas(replicas);
                match self
                    .api
                    .update_service(endpoint, &service.id, service.version.index, &spec)
                    .await
                {
                    Ok(()) => ScaleResult::Updated,
                    Err(e) => {
                        warn!(service = %service_name, error = %e, "failed to {} service", desired.verb());
                        ScaleResult::Failed(e)
                    }
                }
            };

            let failed = matches!(result, ScaleResult::Failed(_));
            report.outcomes.push(ServiceOutcome {
                service_name,
                result,
            });
            if failed && policy == ScalePolicy::AllOrNothing {
                return Err(report);
            }
        }

        info!(
            stack = stack_name,
            replicas = report.replicas,
            updated = report.updated_count(),
            failed = report.failed_count(),
            "swarm scale finished"
        );
        Ok(report)
    }

    /// Tail of a container's logs as clean text.
    pub async fn fetch_logs(&self, container_id: &str, tail: u32) -> Result<String, PanelError> {
        let endpoint = self.resolve_endpoint().await?;
        let raw = self
            .api
            .container_logs(endpoint, container_id, tail)
            .await
            .map_err(|source| PanelError::Fetch {
                what: "container logs",
                source,
            })?;
        Ok(clean_log_output(&raw))
    }

    pub async fn restart_container(&self, container_id: &str) -> Result<(), PanelError> {
        let endpoint = self.resolve_endpoint().await?;
        info!(container = container_id, "restarting container");
        self.api
            .restart_container(endpoint, container_id)
            .await
            .map_err(|source| PanelError::Action {
                action: "restart container".to_string(),
                source,
            })
    }
}

#[cfg(test)]
pub(crate) mod fake;
