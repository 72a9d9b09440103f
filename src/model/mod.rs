// Re-export all model types from submodules.

pub use app::{AppView, SelectionState};
pub use logs::{LogViewState, NO_LOGS};
pub use member::{
    short_id, ContainerSummary, Member, MemberDetail, ObjectVersion, ServiceMode, ServiceSummary,
    COMPOSE_PROJECT_LABEL, STACK_NAMESPACE_LABEL,
};
pub use stack::{
    DesiredState, Endpoint, EndpointId, Orchestration, Stack, UnknownOrchestration,
    FALLBACK_ENDPOINT_ID, STACK_STATUS_ACTIVE,
};

mod app;
mod logs;
mod member;
mod stack;
