// ABOUTME: Client factory for connecting and binding SMPP sessions in one step
// ABOUTME: Provides role-specific constructors returning bound sessions, plus session options

use crate::client::error::SmppResult;
use crate::client::session::Session;
use crate::client::types::{BindCredentials, SessionOptions, SubmitMode};
use crate::datatypes::BindType;
use tokio::net::ToSocketAddrs;

/// Factory for creating bound sessions
///
/// Connects over TCP and binds with the given credentials. Each constructor
/// binds in the role it is named after, whatever `bind_type` the credentials
/// carry. Use [`ClientOptions::bind`] to bind with the credentials' own role.
pub struct ClientBuilder;

impl ClientBuilder {
    /// Connect and bind as a transmitter (can send SMS)
    pub async fn transmitter<T: ToSocketAddrs>(
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<Session> {
        Self::bind_as(BindType::Transmitter, addr, credentials).await
    }

    /// Connect and bind as a receiver (gets deliver_sm)
    pub async fn receiver<T: ToSocketAddrs>(
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<Session> {
        Self::bind_as(BindType::Receiver, addr, credentials).await
    }

    /// Connect and bind as a transceiver (both directions)
    pub async fn transceiver<T: ToSocketAddrs>(
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<Session> {
        Self::bind_as(BindType::Transceiver, addr, credentials).await
    }

    async fn bind_as<T: ToSocketAddrs>(
        bind_type: BindType,
        addr: T,
        mut credentials: BindCredentials,
    ) -> SmppResult<Session> {
        credentials.bind_type = bind_type;
        ClientOptions::new().bind(addr, credentials).await
    }

    /// Just establish the TCP connection; call `bind` separately.
    pub async fn connection<T: ToSocketAddrs>(addr: T) -> SmppResult<Session> {
        Session::connect(addr).await
    }

    /// Quick transmitter creation with minimal parameters
    ///
    /// Equivalent to `transmitter(addr, BindCredentials::transmitter(system_id, password))`.
    pub async fn quick_transmitter<T: ToSocketAddrs>(
        addr: T,
        system_id: impl Into<String>,
        password: impl Into<String>,
    ) -> SmppResult<Session> {
        let credentials = BindCredentials::transmitter(system_id, password);
        Self::transmitter(addr, credentials).await
    }
}

/// Session settings applied before binding.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientOptions {
    session: SessionOptions,
}

impl ClientOptions {
    /// Create new client options with defaults (synchronous submission)
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose how submissions wait for their responses.
    pub fn submit_mode(mut self, mode: SubmitMode) -> Self {
        self.session.mode = mode;
        self
    }

    pub fn session_options(&self) -> SessionOptions {
        self.session
    }

    /// Connect with these options and bind.
    pub async fn bind<T: ToSocketAddrs>(
        self,
        addr: T,
        credentials: BindCredentials,
    ) -> SmppResult<Session> {
        let mut session = Session::connect_with_options(addr, self.session).await?;
        session.bind(&credentials).await?;
        Ok(session)
    }
}
