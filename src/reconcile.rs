//! Turns raw stack/container/service listings into the display model.
//!
//! A Compose stack's members are the containers labelled with its project
//! or namespace; a Swarm stack's members are the services labelled with its
//! namespace. The two sources are never mixed for one stack.

use std::cmp::Ordering;

use crate::error::PanelError;
use crate::model::{ContainerSummary, Member, Orchestration, ServiceSummary, Stack, UnknownOrchestration};

/// Reconciled state of one stack.
#[derive(Clone, Debug, PartialEq)]
pub struct StackView {
    pub stack: Stack,
    pub orchestration: Orchestration,
    pub members: Vec<Member>,
}

/// Which stack-level controls apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub stop: bool,
    pub restart: bool,
}

impl StackView {
    /// The stack's own flag; member state is not folded in.
    pub fn running(&self) -> bool {
        self.stack.is_running()
    }

    pub fn running_members(&self) -> usize {
        self.members.iter().filter(|m| m.running).count()
    }

    pub fn total_members(&self) -> usize {
        self.members.len()
    }

    /// e.g. "Running (Docker Compose)".
    pub fn status_text(&self) -> String {
        let state = if self.running() { "Running" } else { "Stopped" };
        format!("{} ({})", state, self.orchestration.label())
    }

    /// Running stack: stop and restart. Stopped stack: start.
    pub fn controls(&self) -> Controls {
        let running = self.running();
        Controls {
            start: !running,
            stop: running,
            restart: running,
        }
    }

    /// Whether a stop has taken effect. Compose stacks report their own flag;
    /// scaled-down Swarm stacks keep theirs, so only members count there.
    /// Global and job services are never scaled and do not hold a stop up.
    pub fn is_stopped(&self) -> bool {
        match self.orchestration {
            Orchestration::Compose => !self.running() && self.running_members() == 0,
            Orchestration::Swarm => !self.members.iter().any(|m| m.running && m.is_scalable()),
        }
    }
}

/// One card in the all-stacks grid.
#[derive(Clone, Debug, PartialEq)]
pub struct StackCard {
    pub stack: Stack,
    pub orchestration: Result<Orchestration, UnknownOrchestration>,
    pub members: Vec<Member>,
}

impl StackCard {
    pub fn name(&self) -> &str {
        &self.stack.name
    }

    pub fn running(&self) -> bool {
        self.stack.is_running()
    }

    pub fn running_members(&self) -> usize {
        self.members.iter().filter(|m| m.running).count()
    }

    pub fn total_members(&self) -> usize {
        self.members.len()
    }

    /// Full view for a card whose type is known.
    pub fn view(&self) -> Option<StackView> {
        let orchestration = self.orchestration.ok()?;
        Some(StackView {
            stack: self.stack.clone(),
            orchestration,
            members: self.members.clone(),
        })
    }
}

/// Result of a status query: one view, or a grid when the target is `ALL`.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusReport {
    Single(StackView),
    Grid(Vec<StackCard>),
}

/// Exact, case-sensitive name match.
pub fn find_stack<'a>(stacks: &'a [Stack], name: &str) -> Result<&'a Stack, PanelError> {
    stacks
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| PanelError::NotFound(name.to_string()))
}

pub fn orchestration_of(stack: &Stack) -> Result<Orchestration, PanelError> {
    stack
        .orchestration()
        .map_err(|UnknownOrchestration(value)| PanelError::UnknownOrchestration {
            stack: stack.name.clone(),
            value,
        })
}

/// Alphabetical, case-insensitive first; ties broken by exact bytes.
fn by_display_name(a: &Member, b: &Member) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
}

/// Members of `stack_name`, sorted by display name.
pub fn select_members(
    orchestration: Orchestration,
    stack_name: &str,
    containers: &[ContainerSummary],
    services: &[ServiceSummary],
) -> Vec<Member> {
    let mut members: Vec<Member> = match orchestration {
        Orchestration::Compose => containers
            .iter()
            .filter(|c| c.belongs_to(stack_name))
            .map(Member::from_container)
            .collect(),
        Orchestration::Swarm => services
            .iter()
            .filter(|s| s.belongs_to(stack_name))
            .map(Member::from_service)
            .collect(),
    };
    members.sort_by(by_display_name);
    members
}

pub fn stack_view(
    stack: &Stack,
    containers: &[ContainerSummary],
    services: &[ServiceSummary],
) -> Result<StackView, PanelError> {
    let orchestration = orchestration_of(stack)?;
    Ok(StackView {
        stack: stack.clone(),
        orchestration,
        members: select_members(orchestration, &stack.name, containers, services),
    })
}

/// One card per listed stack, each reconciled independently. An unknown
/// type leaves the card without members instead of failing the grid.
pub fn grid(stacks: &[Stack], containers: &[ContainerSummary], services: &[ServiceSummary]) -> Vec<StackCard> {
    stacks
        .iter()
        .map(|stack| {
            let orchestration = stack.orchestration();
            let members = match orchestration {
                Ok(o) => select_members(o, &stack.name, containers, services),
                Err(_) => Vec::new(),
            };
            StackCard {
                stack: stack.clone(),
                orchestration,
                members,
            }
        })
        .collect()
}
