//! Broker session lifecycle
//!
//! ```text
//! Disconnected ─connect─► Connected ─auth ack─► Authenticated ─login ack─► LoggedIn ─settlement ack─► Ready
//!       ▲                                                                                               │
//!       └──────────────────────────── disconnect / logout (from any state) ─────────────────────────────┘
//! ```
//!
//! Each transition returns the next command the gateway must send to the
//! broker; the machine itself performs no I/O.

use super::wire::{RspInfo, RspUserLogin};
use crate::error::{GatewayError, Result};
use log::{info, warn};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// Front connected, not yet authenticated
    Connected,
    Authenticated,
    LoggedIn,
    /// Settlement confirmed; orders may be sent
    Ready,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connected => "connected",
            Self::Authenticated => "authenticated",
            Self::LoggedIn => "logged_in",
            Self::Ready => "ready",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Login-scoped identity of the broker session
///
/// Replaced wholesale on login, zeroed on disconnect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionContext {
    pub trading_day: String,
    pub login_time: String,
    pub front_id: i32,
    pub session_id: i32,
    pub ready: bool,
}

/// Command the gateway owes the broker after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Authenticate,
    Login,
    ConfirmSettlement,
}

#[derive(Debug, Default)]
struct Inner {
    state: SessionState,
    context: ConnectionContext,
}

/// Thread-safe session state machine
#[derive(Debug, Default)]
pub struct SessionStateMachine {
    inner: Mutex<Inner>,
}

impl SessionStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().state == SessionState::Ready
    }

    /// Copy of the current connection context
    pub fn context(&self) -> ConnectionContext {
        self.inner.lock().context.clone()
    }

    /// Context of a ready session, `NotReady` otherwise
    pub fn ready_context(&self) -> Result<ConnectionContext> {
        let inner = self.inner.lock();
        if inner.state != SessionState::Ready {
            return Err(GatewayError::NotReady);
        }
        Ok(inner.context.clone())
    }

    /// Front connected: authenticate next
    pub fn on_connected(&self) -> Option<SessionCommand> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Disconnected {
            warn!("Front connected while {}, restarting handshake", inner.state);
            inner.context = ConnectionContext::default();
        }
        inner.state = SessionState::Connected;
        Some(SessionCommand::Authenticate)
    }

    /// Authentication answered: log in next, unless the broker refused
    pub fn on_authenticated(&self, rsp: Option<&RspInfo>) -> Option<SessionCommand> {
        let mut inner = self.inner.lock();
        if let Some(rsp) = rsp.filter(|rsp| rsp.is_error()) {
            warn!(
                "Authentication refused ({}): {}",
                rsp.error_id, rsp.error_msg
            );
            return None;
        }
        if inner.state != SessionState::Connected {
            warn!("Unexpected authentication ack while {}", inner.state);
            return None;
        }
        inner.state = SessionState::Authenticated;
        Some(SessionCommand::Login)
    }

    /// Login answered: capture the context and confirm settlement next
    pub fn on_logged_in(
        &self,
        login: &RspUserLogin,
        rsp: Option<&RspInfo>,
    ) -> Option<SessionCommand> {
        let mut inner = self.inner.lock();
        if let Some(rsp) = rsp.filter(|rsp| rsp.is_error()) {
            warn!("Login refused ({}): {}", rsp.error_id, rsp.error_msg);
            return None;
        }
        if inner.state != SessionState::Authenticated {
            warn!("Unexpected login ack while {}", inner.state);
            return None;
        }
        inner.context = ConnectionContext {
            trading_day: login.trading_day.clone(),
            login_time: login.login_time.clone(),
            front_id: login.front_id,
            session_id: login.session_id,
            ready: false,
        };
        inner.state = SessionState::LoggedIn;
        info!(
            "Logged in: trading day {}, front {}, session {}",
            login.trading_day, login.front_id, login.session_id
        );
        Some(SessionCommand::ConfirmSettlement)
    }

    /// Settlement confirmed: the session is ready. Returns false if the ack
    /// arrived outside a login.
    pub fn on_settlement_confirmed(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::LoggedIn {
            warn!("Settlement ack ignored while {}", inner.state);
            return false;
        }
        inner.state = SessionState::Ready;
        inner.context.ready = true;
        true
    }

    /// Session lost. Returns the state it was in; repeat calls are harmless.
    pub fn on_disconnected(&self) -> SessionState {
        let mut inner = self.inner.lock();
        let previous = inner.state;
        inner.state = SessionState::Disconnected;
        inner.context = ConnectionContext::default();
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login() -> RspUserLogin {
        RspUserLogin {
            trading_day: "20240105".to_string(),
            login_time: "08:55:01".to_string(),
            front_id: 3,
            session_id: 77,
            ..Default::default()
        }
    }

    fn ready_machine() -> SessionStateMachine {
        let machine = SessionStateMachine::new();
        machine.on_connected();
        machine.on_authenticated(None);
        machine.on_logged_in(&login(), None);
        machine.on_settlement_confirmed();
        machine
    }

    #[test]
    fn test_handshake_sequence() {
        let machine = SessionStateMachine::new();
        assert_eq!(machine.state(), SessionState::Disconnected);

        assert_eq!(machine.on_connected(), Some(SessionCommand::Authenticate));
        assert_eq!(machine.state(), SessionState::Connected);

        let ok = RspInfo::default();
        assert_eq!(machine.on_authenticated(Some(&ok)), Some(SessionCommand::Login));
        assert_eq!(machine.state(), SessionState::Authenticated);

        assert_eq!(
            machine.on_logged_in(&login(), Some(&ok)),
            Some(SessionCommand::ConfirmSettlement)
        );
        assert_eq!(machine.state(), SessionState::LoggedIn);
        assert!(!machine.is_ready());
        assert!(matches!(machine.ready_context(), Err(GatewayError::NotReady)));

        assert!(machine.on_settlement_confirmed());
        assert!(machine.is_ready());
        let ctx = machine.ready_context().unwrap();
        assert_eq!(ctx.front_id, 3);
        assert_eq!(ctx.session_id, 77);
        assert_eq!(ctx.trading_day, "20240105");
        assert!(ctx.ready);
    }

    #[test]
    fn test_refused_auth_does_not_advance() {
        let machine = SessionStateMachine::new();
        machine.on_connected();

        let refused = RspInfo {
            error_id: 63,
            error_msg: "invalid auth code".to_string(),
        };
        assert_eq!(machine.on_authenticated(Some(&refused)), None);
        assert_eq!(machine.state(), SessionState::Connected);
    }

    #[test]
    fn test_refused_login_does_not_advance() {
        let machine = SessionStateMachine::new();
        machine.on_connected();
        machine.on_authenticated(None);

        let refused = RspInfo {
            error_id: 3,
            error_msg: "bad password".to_string(),
        };
        assert_eq!(machine.on_logged_in(&login(), Some(&refused)), None);
        assert_eq!(machine.state(), SessionState::Authenticated);
        assert_eq!(machine.context(), ConnectionContext::default());
    }

    #[test]
    fn test_out_of_order_acks_ignored() {
        let machine = SessionStateMachine::new();
        assert_eq!(machine.on_authenticated(None), None);
        assert_eq!(machine.on_logged_in(&login(), None), None);
        assert!(!machine.on_settlement_confirmed());
        assert_eq!(machine.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_disconnect_while_logged_in() {
        let machine = SessionStateMachine::new();
        machine.on_connected();
        machine.on_authenticated(None);
        machine.on_logged_in(&login(), None);

        assert_eq!(machine.on_disconnected(), SessionState::LoggedIn);
        assert_eq!(machine.state(), SessionState::Disconnected);
        assert!(!machine.is_ready());
        assert_eq!(machine.context(), ConnectionContext::default());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let machine = ready_machine();
        assert_eq!(machine.on_disconnected(), SessionState::Ready);
        assert_eq!(machine.on_disconnected(), SessionState::Disconnected);
        assert_eq!(machine.context(), ConnectionContext::default());
    }

    #[test]
    fn test_reconnect_restarts_handshake() {
        let machine = ready_machine();
        assert_eq!(machine.on_connected(), Some(SessionCommand::Authenticate));
        assert_eq!(machine.state(), SessionState::Connected);
        assert!(!machine.context().ready);
    }
}
