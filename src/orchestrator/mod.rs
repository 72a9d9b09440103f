//! UI-independent state machines driving the panel, plus the [`Panel`]
//! facade that sequences remote calls for each user action.

mod button;
mod confirm;
mod countdown;
mod log_stream;
mod panel;
mod toast;

pub use button::{Button, ButtonLock};
pub use confirm::ConfirmationGate;
pub use countdown::{CountdownState, RefreshCountdown};
pub use log_stream::LogAutoStream;
pub use panel::Panel;
pub use toast::{Toast, ToastKind, ToastQueue, TOAST_LIFETIME};
