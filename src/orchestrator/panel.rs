use std::sync::Arc;

use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::{Config, Target};
use crate::error::PanelError;
use crate::model::{DesiredState, EndpointId, Orchestration, Stack};
use crate::portainer::{ActionReport, Remote, StackApi};
use crate::reconcile::{self, StackView, StatusReport};

/// Sequences the remote calls behind every panel operation.
///
/// Every operation first checks the session configuration, so a session
/// that failed to load never reaches the network.
pub struct Panel {
    config: Config,
    remote: Remote,
}

impl Panel {
    pub fn new(config: Config, api: Arc<dyn StackApi>) -> Self {
        Self {
            config,
            remote: Remote::new(api),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current state of the configured target: one stack, or every stack.
    pub async fn status(&self) -> Result<StatusReport, PanelError> {
        self.config.ensure_usable()?;
        let endpoint = self.remote.resolve_endpoint().await?;
        let stacks = self.remote.list_stacks().await?;

        match &self.config.target {
            Target::All => {
                let containers = self.remote.list_containers(endpoint).await;
                let services = self.remote.list_services(endpoint).await;
                let cards = reconcile::grid(&stacks, &containers, &services);
                debug!(stacks = cards.len(), "grid refreshed");
                Ok(StatusReport::Grid(cards))
            }
            Target::Stack(name) => {
                let stack = reconcile::find_stack(&stacks, name)?;
                Ok(StatusReport::Single(self.reconcile_one(endpoint, stack).await?))
            }
        }
    }

    /// Reconciled view of a single named stack, regardless of the target.
    pub async fn stack_view(&self, name: &str) -> Result<StackView, PanelError> {
        self.config.ensure_usable()?;
        let endpoint = self.remote.resolve_endpoint().await?;
        let stacks = self.remote.list_stacks().await?;
        let stack = reconcile::find_stack(&stacks, name)?;
        self.reconcile_one(endpoint, stack).await
    }

    /// Only the listing relevant to the stack's orchestration is fetched.
    async fn reconcile_one(&self, endpoint: EndpointId, stack: &Stack) -> Result<StackView, PanelError> {
        let orchestration = reconcile::orchestration_of(stack)?;
        let (containers, services) = match orchestration {
            Orchestration::Compose => (self.remote.list_containers(endpoint).await, Vec::new()),
            Orchestration::Swarm => (Vec::new(), self.remote.list_services(endpoint).await),
        };
        reconcile::stack_view(stack, &containers, &services)
    }

    /// Start or stop the named stack.
    pub async fn set_running(&self, name: &str, desired: DesiredState) -> Result<ActionReport, PanelError> {
        self.config.ensure_usable()?;
        let stacks = self.remote.list_stacks().await?;
        let stack = reconcile::find_stack(&stacks, name)?;
        let orchestration = reconcile::orchestration_of(stack)?;
        self.remote
            .set_stack_running(stack, orchestration, desired, self.config.tuning.scale_policy)
            .await
    }

    /// Stop, wait until the stop is observed, then start. A failed stop
    /// or a stack that never reports stopped leaves it stopped.
    ///
    /// Services that could not be scaled down would keep the wait from ever
    /// finishing, so a partial Swarm stop fails the restart straight away.
    pub async fn restart_stack(&self, name: &str) -> Result<ActionReport, PanelError> {
        if let ActionReport::Swarm(report) = self.set_running(name, DesiredState::Stopped).await? {
            if !report.is_complete() {
                warn!(stack = name, services = ?report.failed_names(), "restart aborted, services did not stop");
                return Err(PanelError::PartialScale {
                    action: DesiredState::Stopped.verb().to_string(),
                    report,
                });
            }
        }
        self.wait_until_stopped(name).await?;
        self.set_running(name, DesiredState::Running).await
    }

    async fn wait_until_stopped(&self, name: &str) -> Result<(), PanelError> {
        let tuning = &self.config.tuning;
        let started = Instant::now();
        loop {
            let view = self.stack_view(name).await?;
            if view.is_stopped() {
                debug!(stack = name, waited_ms = started.elapsed().as_millis() as u64, "stack stopped");
                return Ok(());
            }
            if started.elapsed() >= tuning.restart_timeout {
                return Err(PanelError::Timeout {
                    stack: name.to_string(),
                    waited: started.elapsed(),
                });
            }
            sleep(tuning.restart_poll).await;
        }
    }

    pub async fn restart_member(&self, container_id: &str) -> Result<(), PanelError> {
        self.config.ensure_usable()?;
        self.remote.restart_container(container_id).await
    }

    /// Recent log tail of a container, cleaned for display.
    pub async fn member_logs(&self, container_id: &str) -> Result<String, PanelError> {
        self.config.ensure_usable()?;
        self.remote
            .fetch_logs(container_id, self.config.tuning.log_tail)
            .await
    }
}
