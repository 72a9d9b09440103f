use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::Target;
use crate::error::PanelError;
use crate::model::{DesiredState, LogViewState, Member, SelectionState};
use crate::orchestrator::{Button, ButtonLock, LogAutoStream, Panel, RefreshCountdown, ToastQueue};
use crate::portainer::ActionReport;
use crate::reconcile::{StackCard, StackView, StatusReport};

/// A user-triggered operation run in the background.
#[derive(Clone, Debug, PartialEq)]
pub enum StackAction {
    Start(String),
    Stop(String),
    Restart(String),
    RestartMember { id: String, name: String },
}

impl StackAction {
    pub fn button(&self) -> Button {
        match self {
            StackAction::Start(_) => Button::Start,
            StackAction::Stop(_) => Button::Stop,
            StackAction::Restart(_) => Button::Restart,
            StackAction::RestartMember { .. } => Button::MemberRestart,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            StackAction::Start(_) => "start",
            StackAction::Stop(_) => "stop",
            StackAction::Restart(_) | StackAction::RestartMember { .. } => "restart",
        }
    }

    fn progress(&self) -> String {
        match self {
            StackAction::Start(name) => format!("Starting stack {}...", name),
            StackAction::Stop(name) => format!("Stopping stack {}...", name),
            StackAction::Restart(name) => format!("Restarting stack {}...", name),
            StackAction::RestartMember { name, .. } => format!("Restarting container {}...", name),
        }
    }
}

/// Successful outcome of a [`StackAction`].
#[derive(Debug)]
enum ActionDone {
    Stack(ActionReport),
    Member,
}

/// Whether a status refresh reports itself through the refresh button and a toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshKind {
    Manual,
    Silent,
}

type StatusReceiver = Receiver<Result<StatusReport, PanelError>>;
type ActionReceiver = Receiver<Result<ActionDone, PanelError>>;
type LogReceiver = Receiver<Result<String, PanelError>>;

/// Owns the displayed stack state and every background task that feeds it.
pub struct StackMonitor {
    panel: Arc<Panel>,
    rt: Arc<tokio::runtime::Runtime>,
    pub report: Option<StatusReport>,
    /// Last status failure; cleared by the next successful fetch.
    pub fetch_error: Option<String>,
    pub updated_at: Option<String>,
    pub lock: ButtonLock,
    pub countdown: RefreshCountdown,
    pub toasts: ToastQueue,
    pub selection: SelectionState,
    pub log_state: Option<LogViewState>,
    pub log_stream: LogAutoStream,
    pub status_message: Option<String>,
    status_receiver: Option<(RefreshKind, StatusReceiver)>,
    action_receiver: Option<(StackAction, ActionReceiver)>,
    log_receiver: Option<LogReceiver>,
    refresh_at: Option<Instant>,
}

impl StackMonitor {
    pub fn new(panel: Arc<Panel>, rt: Arc<tokio::runtime::Runtime>) -> Self {
        let config = panel.config();
        let mut toasts = ToastQueue::default();
        if let Some(msg) = &config.error {
            toasts.error(format!("Configuration error: {}", msg));
        }

        Self {
            lock: ButtonLock::new(config.has_error()),
            countdown: RefreshCountdown::new(config.tuning.refresh_period),
            log_stream: LogAutoStream::new(config.tuning.log_poll),
            fetch_error: config.error.clone(),
            panel,
            rt,
            report: None,
            updated_at: None,
            toasts,
            selection: SelectionState::default(),
            log_state: None,
            status_message: None,
            status_receiver: None,
            action_receiver: None,
            log_receiver: None,
            refresh_at: None,
        }
    }

    pub fn is_errored(&self) -> bool {
        self.lock.is_errored()
    }

    pub fn target(&self) -> &Target {
        &self.panel.config().target
    }

    pub fn is_grid(&self) -> bool {
        self.target().is_all()
    }

    /// The single-stack view, if that is what was last fetched.
    pub fn view(&self) -> Option<&StackView> {
        match &self.report {
            Some(StatusReport::Single(view)) => Some(view),
            _ => None,
        }
    }

    pub fn cards(&self) -> &[StackCard] {
        match &self.report {
            Some(StatusReport::Grid(cards)) => cards,
            _ => &[],
        }
    }

    /// Stack the stack-level keys act on: the viewed stack, or the selected card.
    pub fn target_view(&self) -> Option<StackView> {
        match &self.report {
            Some(StatusReport::Single(view)) => Some(view.clone()),
            Some(StatusReport::Grid(cards)) => cards.get(self.selection.selected_index)?.view(),
            None => None,
        }
    }

    pub fn selected_member(&self) -> Option<&Member> {
        self.view()?.members.get(self.selection.selected_index)
    }

    /// Initial fetch at startup. Skipped for an errored session.
    pub fn initial_load(&mut self) {
        if !self.is_errored() {
            self.refresh(RefreshKind::Manual);
        }
    }

    /// Start a status fetch. A manual refresh takes the button lock; a
    /// silent one only runs when no other fetch is in flight.
    pub fn refresh(&mut self, kind: RefreshKind) -> bool {
        if self.is_errored() || self.status_receiver.is_some() {
            return false;
        }
        if kind == RefreshKind::Manual && !self.lock.begin(Button::Refresh) {
            return false;
        }
        self.countdown.begin_manual();

        let (tx, rx) = mpsc::channel();
        self.status_receiver = Some((kind, rx));
        let panel = Arc::clone(&self.panel);
        self.rt.spawn(async move {
            let _ = tx.send(panel.status().await);
        });
        true
    }

    /// Advance the auto-refresh countdown by one second.
    pub fn tick_second(&mut self) -> bool {
        if self.is_errored() {
            return false;
        }
        if self.countdown.tick() && !self.refresh(RefreshKind::Silent) {
            // Another fetch is already running; its result stands in.
            self.countdown.settle();
        }
        true
    }

    /// Fire the refresh scheduled after a completed action.
    pub fn poll_scheduled_refresh(&mut self, now: Instant) -> bool {
        let Some(at) = self.refresh_at else { return false };
        if now < at {
            return false;
        }
        self.refresh_at = None;
        let kind = if self.lock.is_busy() { RefreshKind::Silent } else { RefreshKind::Manual };
        self.refresh(kind)
    }

    /// Poll for a finished status fetch. Returns true if state changed.
    pub fn poll_status(&mut self) -> bool {
        let Some((kind, ref rx)) = self.status_receiver else { return false };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.settle_status(kind);
                self.toasts.error("Status refresh failed unexpectedly");
                return true;
            }
        };
        self.settle_status(kind);

        match result {
            Ok(report) => {
                let total = match &report {
                    StatusReport::Single(view) => view.members.len(),
                    StatusReport::Grid(cards) => cards.len(),
                };
                self.selection.set_total(total);
                self.report = Some(report);
                self.fetch_error = None;
                self.updated_at = Some(chrono::Local::now().format("%H:%M:%S").to_string());
                if kind == RefreshKind::Manual {
                    self.toasts.success("Stack status updated successfully");
                }
            }
            Err(e) => {
                warn!(error = %e, "status refresh failed");
                // A failed fetch hides the controls until the next success.
                self.report = None;
                self.selection.set_total(0);
                self.fetch_error = Some(e.to_string());
                if kind == RefreshKind::Manual {
                    self.toasts.error(format!("Error: {}", e));
                }
            }
        }
        true
    }

    fn settle_status(&mut self, kind: RefreshKind) {
        self.status_receiver = None;
        self.countdown.settle();
        if kind == RefreshKind::Manual {
            self.lock.settle();
        }
    }

    /// Run an action in the background. Refused while anything else holds the lock.
    pub fn run_action(&mut self, action: StackAction) -> bool {
        if !self.lock.begin(action.button()) {
            if !self.is_errored() {
                self.status_message = Some("An action is already in progress...".to_string());
            }
            return false;
        }
        info!(?action, "running action");
        self.status_message = Some(action.progress());

        let (tx, rx) = mpsc::channel();
        self.action_receiver = Some((action.clone(), rx));
        let panel = Arc::clone(&self.panel);
        self.rt.spawn(async move {
            let result = match &action {
                StackAction::Start(name) => panel
                    .set_running(name, DesiredState::Running)
                    .await
                    .map(ActionDone::Stack),
                StackAction::Stop(name) => panel
                    .set_running(name, DesiredState::Stopped)
                    .await
                    .map(ActionDone::Stack),
                StackAction::Restart(name) => panel.restart_stack(name).await.map(ActionDone::Stack),
                StackAction::RestartMember { id, .. } => {
                    panel.restart_member(id).await.map(|_| ActionDone::Member)
                }
            };
            let _ = tx.send(result);
        });
        true
    }

    pub fn action_in_progress(&self) -> bool {
        self.action_receiver.is_some()
    }

    /// Poll for background action completion. The lock is settled on every
    /// outcome, including a task that vanished.
    pub fn poll_action(&mut self) -> bool {
        let Some((_, ref rx)) = self.action_receiver else { return false };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                self.action_receiver = None;
                self.lock.settle();
                self.status_message = None;
                self.toasts.error("Action failed unexpectedly");
                return true;
            }
        };
        let Some((action, _)) = self.action_receiver.take() else { return false };
        self.lock.settle();
        self.status_message = None;

        match result {
            Ok(ActionDone::Stack(report)) => {
                let failed = report.failed_services();
                if failed.is_empty() {
                    self.toasts
                        .success(format!("Stack {} operation completed successfully", action.verb()));
                } else {
                    self.toasts.warning(format!(
                        "Stack {} finished, but these services failed: {}",
                        action.verb(),
                        failed.join(", ")
                    ));
                }
                self.schedule_refresh();
            }
            Ok(ActionDone::Member) => {
                if let StackAction::RestartMember { name, .. } = &action {
                    self.toasts.success(format!("Container {} restarted", name));
                }
                self.schedule_refresh();
            }
            Err(e) => {
                error!(?action, error = %e, "action failed");
                self.toasts.error(format!("Error: {}", e));
            }
        }
        true
    }

    fn schedule_refresh(&mut self) {
        self.refresh_at = Some(Instant::now() + self.panel.config().tuning.post_action_refresh);
    }

    /// Open the log view for a container and fetch its tail.
    pub fn open_logs(&mut self, container_id: &str, container_name: &str) {
        self.close_logs();
        self.log_state = Some(LogViewState::new(
            container_id.to_string(),
            container_name.to_string(),
        ));
        self.fetch_logs();
    }

    /// Leave the log view. Fetches still in flight are discarded.
    pub fn close_logs(&mut self) {
        self.log_state = None;
        self.log_receiver = None;
        self.log_stream.close();
    }

    /// Manual log refresh; ignored while auto-streaming.
    pub fn refresh_logs(&mut self) -> bool {
        if !self.log_stream.manual_refresh_enabled() {
            return false;
        }
        self.fetch_logs()
    }

    pub fn toggle_log_stream(&mut self) {
        self.log_stream.toggle(Instant::now());
    }

    fn fetch_logs(&mut self) -> bool {
        if self.is_errored() {
            return false;
        }
        let Some(ref state) = self.log_state else { return false };
        if !self.log_stream.begin_fetch() {
            return false;
        }
        let id = state.container_id.clone();
        let (tx, rx) = mpsc::channel();
        self.log_receiver = Some(rx);
        let panel = Arc::clone(&self.panel);
        self.rt.spawn(async move {
            let _ = tx.send(panel.member_logs(&id).await);
        });
        true
    }

    /// Drive the auto-stream and collect a finished fetch.
    pub fn poll_logs(&mut self, now: Instant) -> bool {
        if self.log_state.is_some() && self.log_stream.is_due(now) {
            self.fetch_logs();
        }

        let Some(ref rx) = self.log_receiver else { return false };
        let result = match rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => None,
        };
        self.log_receiver = None;
        self.log_stream.finish_fetch(Instant::now());

        match result {
            Some(Ok(text)) => {
                if let Some(ref mut state) = self.log_state {
                    state.replace(&text, chrono::Local::now().format("%H:%M:%S").to_string());
                }
            }
            Some(Err(e)) => self.toasts.error(format!("Error: {}", e)),
            None => self.toasts.error("Log fetch failed unexpectedly"),
        }
        true
    }

    /// Drop expired toasts.
    pub fn expire_toasts(&mut self, now: Instant) -> bool {
        self.toasts.expire(now)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{Config, ConfigError, Tuning, URL_KEY};
    use crate::orchestrator::ToastKind;
    use crate::portainer::fake::{Call, FakeApi};

    fn runtime() -> Arc<tokio::runtime::Runtime> {
        Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap(),
        )
    }

    fn monitor(api: Arc<FakeApi>, target: Target) -> StackMonitor {
        let config = Config {
            base_url: "http://portainer:9000".into(),
            token: "t".into(),
            target,
            error: None,
            tuning: Tuning::default(),
        };
        StackMonitor::new(Arc::new(Panel::new(config, api)), runtime())
    }

    fn wait_for(mut poll: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if poll() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("background task did not finish");
    }

    fn demo() -> Arc<FakeApi> {
        Arc::new(
            FakeApi::default()
                .with_stacks(vec![FakeApi::stack(1, "demo-compose", 2, 1)])
                .with_containers(vec![
                    FakeApi::container("aaa", "demo-compose-api-1", "demo-compose", "running"),
                    FakeApi::container("bbb", "demo-compose-worker-1", "demo-compose", "running"),
                ]),
        )
    }

    #[test]
    fn initial_load_spins_refresh_then_settles() {
        let mut m = monitor(demo(), Target::Stack("demo-compose".into()));
        m.initial_load();
        assert!(m.lock.is_spinning(Button::Refresh));
        assert!(m.lock.is_disabled());
        wait_for(|| m.poll_status());
        assert!(!m.lock.is_busy());
        let view = m.view().unwrap();
        assert_eq!(view.status_text(), "Running (Docker Compose)");
        assert_eq!(m.selection.total_rows, 2);
        assert_eq!(m.toasts.iter().last().map(|t| t.kind), Some(ToastKind::Success));
    }

    #[test]
    fn failed_action_settles_lock_and_toasts_error() {
        let api = demo();
        api.fail_lifecycle(500, "boom");
        let mut m = monitor(api, Target::Stack("demo-compose".into()));
        assert!(m.run_action(StackAction::Stop("demo-compose".into())));
        assert!(!m.run_action(StackAction::Start("demo-compose".into())));
        wait_for(|| m.poll_action());
        assert!(!m.lock.is_busy());
        let last = m.toasts.iter().last().unwrap();
        assert_eq!(last.kind, ToastKind::Error);
        assert!(last.message.contains("500"));
        assert!(last.message.contains("boom"));
        assert!(m.refresh_at.is_none());
    }

    #[test]
    fn successful_action_schedules_refresh() {
        let api = demo();
        let mut m = monitor(api.clone(), Target::Stack("demo-compose".into()));
        m.run_action(StackAction::Stop("demo-compose".into()));
        wait_for(|| m.poll_action());
        assert_eq!(
            m.toasts.iter().last().map(|t| t.message.as_str()),
            Some("Stack stop operation completed successfully")
        );
        assert!(!m.poll_scheduled_refresh(Instant::now()));
        assert!(m.poll_scheduled_refresh(Instant::now() + Duration::from_secs(4)));
        wait_for(|| m.poll_status());
        assert!(!m.view().unwrap().running());
    }

    #[test]
    fn partial_swarm_scale_is_a_warning() {
        let api = Arc::new(
            FakeApi::default()
                .with_stacks(vec![FakeApi::stack(4, "ops", 1, 1)])
                .with_services(vec![
                    FakeApi::service("s1", "ops_api", "ops", 1, 1),
                    FakeApi::service("s2", "ops_worker", "ops", 1, 1),
                ]),
        );
        api.fail_update("s2", 500);
        let mut m = monitor(api, Target::Stack("ops".into()));
        m.run_action(StackAction::Stop("ops".into()));
        wait_for(|| m.poll_action());
        let last = m.toasts.iter().last().unwrap();
        assert_eq!(last.kind, ToastKind::Warning);
        assert!(last.message.contains("ops_worker"));
    }

    #[test]
    fn errored_session_never_calls_out() {
        let api = demo();
        let config = Config::errored(&ConfigError::Missing(vec![URL_KEY]), Tuning::default());
        let mut m = StackMonitor::new(Arc::new(Panel::new(config, api.clone())), runtime());
        m.initial_load();
        assert!(!m.refresh(RefreshKind::Manual));
        assert!(!m.run_action(StackAction::Start("demo-compose".into())));
        for _ in 0..40 {
            m.tick_second();
        }
        assert!(api.calls().is_empty());
        assert!(m.fetch_error.as_deref().unwrap_or_default().contains(URL_KEY));
        assert_eq!(m.toasts.iter().next().map(|t| t.kind), Some(ToastKind::Error));
    }

    #[test]
    fn countdown_triggers_silent_refresh() {
        let api = demo();
        let mut m = monitor(api.clone(), Target::All);
        for _ in 0..29 {
            m.tick_second();
        }
        assert_eq!(api.count(|c| matches!(c, Call::Stacks)), 0);
        m.tick_second();
        assert!(!m.lock.is_busy());
        wait_for(|| m.poll_status());
        assert_eq!(m.cards().len(), 1);
        assert!(m.toasts.is_empty());
    }

    #[test]
    fn log_view_fetches_and_discards_after_close() {
        let api = demo();
        api.set_logs(b"line one\nline two\n".to_vec());
        let mut m = monitor(api.clone(), Target::Stack("demo-compose".into()));
        m.open_logs("aaa", "demo-compose-api-1");
        assert!(!m.refresh_logs());
        wait_for(|| m.poll_logs(Instant::now()));
        assert_eq!(m.log_state.as_ref().unwrap().lines, vec!["line one", "line two"]);

        m.toggle_log_stream();
        assert!(!m.refresh_logs());
        m.close_logs();
        assert!(!m.log_stream.is_on());
        assert!(!m.poll_logs(Instant::now() + Duration::from_secs(10)));
        assert_eq!(api.count(|c| matches!(c, Call::Logs(_))), 1);
    }
}
