//! Pokec — session client for the Pokec chat web service.
//!
//! DESIGN
//! ======
//! One `PokecClient` holds one session (cookie jar + `i9` token) and exposes
//! the service's operations: list rooms, log in, log out, send a chat
//! message, and ping the status endpoint. HTTP goes through the `Transport`
//! trait so the session logic can be exercised without a network.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod session;
pub mod transport;
pub mod wire;

pub use client::{DEFAULT_RECIPIENT, Payload, PokecClient};
pub use config::{ClientConfig, HttpTimeouts};
pub use diagnostics::{Diagnostic, Diagnostics, NoopDiagnostics, TracingDiagnostics};
pub use error::{Operation, PokecError};
pub use session::{Cookie, Session, SessionSnapshot};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError};
pub use wire::{Room, RoomGroup};
