//! Pokec client — the four service operations over one session.
//!
//! DESIGN
//! ======
//! `PokecClient` owns its `Session` outright. Operations that rewrite the
//! session (`login`, `logout`) take `&mut self`; the rest take `&self`, so
//! the borrow checker serializes session mutation against every other call.
//!
//! Each operation issues at most one request. Argument and token checks run
//! first and short-circuit: a rejected call never reaches the transport.
//! Nothing is retried and no timeout is imposed here; bound latency through
//! the transport (see `HttpTimeouts`).

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::diagnostics::{Diagnostic, Diagnostics, NoopDiagnostics, TracingDiagnostics};
use crate::error::{Operation, PokecError};
use crate::session::{Session, SessionSnapshot, parse_set_cookies};
use crate::transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
use crate::wire::{self, RoomGroup, SendOutcome};

/// Recipient used by [`PokecClient::send_message`].
pub const DEFAULT_RECIPIENT: &str = "all";

/// Result envelope, serialized as `{ "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload<T> {
    pub data: T,
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct PokecClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn Diagnostics>,
    session: Session,
}

impl PokecClient {
    /// Build a client backed by [`ReqwestTransport`] with no timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        Ok(Self::with_transport(config, Arc::new(ReqwestTransport::new()?)))
    }

    /// Build a client over any transport. Diagnostics follow `config.verbose`.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let diagnostics: Arc<dyn Diagnostics> =
            if config.verbose { Arc::new(TracingDiagnostics) } else { Arc::new(NoopDiagnostics) };
        Self { config, transport, diagnostics, session: Session::default() }
    }

    /// Replace the diagnostics sink chosen from the config.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Fetch the room listing, keeping only rooms with chatters.
    ///
    /// # Errors
    ///
    /// [`PokecError::Request`] on transport failure, [`PokecError::Parse`] if
    /// the body is not the expected JSON.
    pub async fn list_rooms(&self) -> Result<Payload<Vec<RoomGroup>>, PokecError> {
        let op = Operation::ListRooms;
        self.record_call(op, String::new());

        let request = self.build_request(Method::Get, wire::CHAT_HOST, wire::ROOMS_PATH.to_string(), None);
        let response = self.exchange(op, request).await?;

        let groups = wire::parse_rooms(&response.body).map_err(|e| self.fail(op, parse_error(op, e)))?;
        Ok(Payload { data: groups })
    }

    /// Authenticate and store the returned token and cookies.
    ///
    /// Any existing session is cleared first, so a failed login leaves the
    /// client logged out.
    ///
    /// # Errors
    ///
    /// [`PokecError::Validation`] for empty credentials (session untouched),
    /// [`PokecError::Request`] on transport failure, and
    /// [`PokecError::Authentication`] when no token is found in the response.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Payload<SessionSnapshot>, PokecError> {
        let op = Operation::Login;
        self.record_call(op, format!("username={username} password=***"));

        if username.is_empty() {
            return Err(self.fail(op, PokecError::Validation("username".into())));
        }
        if password.is_empty() {
            return Err(self.fail(op, PokecError::Validation("password".into())));
        }

        self.logout();

        let form = wire::encode_form(&[("form[username]", username), ("form[password]", password)]);
        let request = self.build_request(Method::Post, wire::AUTH_HOST, wire::LOGIN_PATH.to_string(), Some(form));
        let response = self.exchange(op, request).await?;

        self.session.merge_cookies(parse_set_cookies(&response.set_cookies));

        match wire::extract_token(&response.body) {
            Some(token) => {
                self.session.set_token(token);
                Ok(Payload { data: self.session.snapshot() })
            }
            None => Err(self.fail(op, PokecError::login_failed())),
        }
    }

    /// Reset to an anonymous session and return it.
    pub fn logout(&mut self) -> SessionSnapshot {
        self.record_call(Operation::Logout, String::new());
        self.session.reset();
        self.session.snapshot()
    }

    /// Send `message` to everyone in `room_id`.
    ///
    /// # Errors
    ///
    /// See [`PokecClient::send_message_to`].
    pub async fn send_message(&self, message: &str, room_id: i64) -> Result<(), PokecError> {
        self.send_message_to(message, room_id, DEFAULT_RECIPIENT).await
    }

    /// Send `message` in `room_id`, addressed to `to`.
    ///
    /// # Errors
    ///
    /// [`PokecError::Authentication`] without a token,
    /// [`PokecError::Validation`] for an empty message or recipient or a zero
    /// room id, [`PokecError::Request`] on transport failure,
    /// [`PokecError::Parse`] for a non-JSON reply, and [`PokecError::Send`]
    /// when the service rejects the message.
    pub async fn send_message_to(&self, message: &str, room_id: i64, to: &str) -> Result<(), PokecError> {
        let op = Operation::SendMessage;
        self.record_call(op, format!("message={message} room_id={room_id} to={to}"));

        if !self.session.is_authenticated() {
            return Err(self.fail(op, PokecError::login_required()));
        }
        if message.is_empty() {
            return Err(self.fail(op, PokecError::Validation("message".into())));
        }
        if room_id == 0 {
            return Err(self.fail(op, PokecError::Validation("room_id".into())));
        }
        if to.is_empty() {
            return Err(self.fail(op, PokecError::Validation("to".into())));
        }

        let id_room = coerce_room_id(room_id).to_string();
        let form = wire::encode_form(&[("idRoom", id_room.as_str()), ("message", message), ("to", to)]);
        let path = wire::send_message_path(self.session.token());
        let request = self.build_request(Method::Post, wire::CHAT_HOST, path, Some(form));
        let response = self.exchange(op, request).await?;

        match wire::parse_send_result(&response.body).map_err(|e| self.fail(op, parse_error(op, e)))? {
            SendOutcome::Accepted => Ok(()),
            SendOutcome::Rejected { reason } => Err(self.fail(op, PokecError::Send { reason })),
        }
    }

    /// Poll the status endpoint and return its decoded JSONP payload.
    ///
    /// # Errors
    ///
    /// [`PokecError::Authentication`] without a token,
    /// [`PokecError::Request`] on transport failure, and
    /// [`PokecError::Parse`] if the unwrapped body is not JSON.
    pub async fn ping(&self) -> Result<Payload<Value>, PokecError> {
        let op = Operation::Ping;
        self.record_call(op, String::new());

        if !self.session.is_authenticated() {
            return Err(self.fail(op, PokecError::login_required()));
        }

        let path = wire::ping_path(self.session.token(), now_millis());
        let request = self.build_request(Method::Get, wire::STATUS_HOST, path, None);
        let response = self.exchange(op, request).await?;

        let data = wire::parse_ping(&response.body).map_err(|e| self.fail(op, parse_error(op, e)))?;
        Ok(Payload { data })
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn build_request(&self, method: Method, host: &'static str, path: String, body: Option<String>) -> HttpRequest {
        let mut headers = vec![
            ("Content-Type", wire::FORM_CONTENT_TYPE.to_string()),
            ("Cookie", self.session.cookie_header()),
        ];
        if let Some(body) = &body {
            headers.push(("Content-Length", body.len().to_string()));
        }
        HttpRequest { method, host, path, headers, body }
    }

    async fn exchange(&self, op: Operation, request: HttpRequest) -> Result<HttpResponse, PokecError> {
        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| self.fail(op, PokecError::Request { operation: op, message: e.to_string() }))?;
        tracing::debug!(operation = %op, status = response.status, bytes = response.body.len(), "pokec response");
        Ok(response)
    }

    fn record_call(&self, operation: Operation, detail: String) {
        self.diagnostics.record(&Diagnostic::Call { operation, detail });
    }

    fn fail(&self, operation: Operation, error: PokecError) -> PokecError {
        self.diagnostics.record(&Diagnostic::Failure { operation, error: &error });
        error
    }
}

fn parse_error(operation: Operation, message: String) -> PokecError {
    PokecError::Parse { operation, message }
}

/// Room ids travel as 32-bit integers; wider values wrap.
#[allow(clippy::cast_possible_truncation)]
fn coerce_room_id(room_id: i64) -> i32 {
    room_id as i32
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
