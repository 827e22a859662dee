// ABOUTME: SMPP v3.4 ESME session owning one connection, one sequence counter and the state machine
// ABOUTME: Implements bind/unbind, submission, delivery and response correlation for every role

use crate::client::correlator::{Correlator, correlate};
use crate::client::error::{ConfigError, ProtocolError, SmppError, SmppResult, StateError};
use crate::client::types::{
    BindCredentials, SessionOptions, SmsMessage, SubmitMode, SubmitMultiOutcome, SubmitOutcome,
    SubmitParams,
};
use crate::codec::{Encodable, Frame, RawPdu};
use crate::connection::Connection;
use crate::datatypes::{
    BindResponse, BindType, CommandId, CommandStatus, DeliverSm, DeliverSmResponse, EnquireLink,
    EnquireLinkResponse, GenericNack, SubmitMultiResponse, SubmitSm, SubmitSmResponse, Tlv,
    Unbind, UnbindResponse,
};
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, warn};

/// Highest sequence number an ESME may issue.
pub const MAX_SEQUENCE_NUMBER: u32 = 0x7FFF_FFFF;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Transport open, not yet bound.
    Connected,
    Bound,
}

/// An ESME session with an SMSC.
///
/// ```text
/// Disconnected --connect--> Connected --bind--> Bound --unbind--> Disconnected
/// ```
///
/// The role chosen at bind time decides which operations are allowed:
/// transmitters submit, receivers receive, transceivers do both. Every
/// operation takes `&mut self`, so at most one request is being written and
/// one response read at a time.
///
/// Operations invalid for the current state or role fail with
/// [`StateError`] without writing anything. Transport failures close the
/// session.
#[derive(Debug)]
pub struct Session<S = TcpStream> {
    connection: Option<Connection<S>>,
    state: SessionState,
    role: Option<BindType>,

    // Last sequence number issued; 0 before the first request.
    sequence_number: u32,

    options: SessionOptions,
    correlator: Correlator,
}

impl Session<TcpStream> {
    /// Open a TCP connection to the SMSC.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> SmppResult<Self> {
        Self::connect_with_options(addr, SessionOptions::default()).await
    }

    pub async fn connect_with_options<A: ToSocketAddrs>(
        addr: A,
        options: SessionOptions,
    ) -> SmppResult<Self> {
        let connection = Connection::connect(addr).await?;
        debug!("connected to SMSC");
        Ok(Self::from_connection(connection, options))
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// A session over an already open stream, in the Connected state.
    pub fn new(stream: S) -> Self {
        Self::with_options(stream, SessionOptions::default())
    }

    pub fn with_options(stream: S, options: SessionOptions) -> Self {
        Self::from_connection(Connection::new(stream), options)
    }

    fn from_connection(connection: Connection<S>, options: SessionOptions) -> Self {
        Session {
            connection: Some(connection),
            state: SessionState::Connected,
            role: None,
            sequence_number: 0,
            options,
            correlator: Correlator::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The bound role, if bound.
    pub fn role(&self) -> Option<BindType> {
        self.role
    }

    pub fn mode(&self) -> SubmitMode {
        self.options.mode
    }

    /// The last sequence number issued by this session.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn is_connected(&self) -> bool {
        self.state != SessionState::Disconnected
    }

    pub fn is_bound(&self) -> bool {
        self.state == SessionState::Bound
    }

    /// Sequence numbers of async submissions still awaiting a response.
    pub fn outstanding(&self) -> Vec<u32> {
        self.correlator.outstanding()
    }

    /// Stop tracking an async submission. A response that arrives for it
    /// later is treated as unsolicited.
    pub fn forget(&mut self, sequence: u32) -> bool {
        self.correlator.forget(sequence)
    }

    /// Bind to the SMSC with the role and credentials given.
    ///
    /// Only valid from Connected. On any failure the session stays
    /// Connected; closing it is left to the caller.
    pub async fn bind(&mut self, credentials: &BindCredentials) -> SmppResult<BindResponse> {
        match self.state {
            SessionState::Disconnected => return Err(StateError::NotConnected.into()),
            SessionState::Bound => return Err(StateError::AlreadyBound.into()),
            SessionState::Connected => {}
        }
        credentials.validate()?;

        let bind_type = credentials.bind_type;
        let sequence = self.next_sequence_number();
        self.send(&credentials.to_pdu(sequence)).await?;

        let expected = bind_type.response_id();
        match self.await_response(expected, sequence).await? {
            Frame::BindResp(response) => {
                self.state = SessionState::Bound;
                self.role = Some(bind_type);
                debug!(
                    "bound as {bind_type} to SMSC system_id={:?}",
                    response.system_id
                );
                Ok(response)
            }
            other => Err(unexpected(expected, &other)),
        }
    }

    /// Unbind and close the transport. The session ends Disconnected.
    pub async fn unbind(&mut self) -> SmppResult<()> {
        match self.state {
            SessionState::Disconnected => return Err(StateError::NotConnected.into()),
            SessionState::Connected => return Err(StateError::NotBound.into()),
            SessionState::Bound => {}
        }

        let sequence = self.next_sequence_number();
        self.send(&Unbind::new(sequence)).await?;

        match self.await_response(CommandId::UnbindResp, sequence).await? {
            Frame::UnbindResp(_) => {
                self.close().await;
                Ok(())
            }
            other => Err(unexpected(CommandId::UnbindResp, &other)),
        }
    }

    /// Send enquire_link and wait for its response.
    pub async fn enquire_link(&mut self) -> SmppResult<()> {
        if self.state == SessionState::Disconnected {
            return Err(StateError::NotConnected.into());
        }

        let sequence = self.next_sequence_number();
        self.send(&EnquireLink::new(sequence)).await?;

        match self.await_response(CommandId::EnquireLinkResp, sequence).await? {
            Frame::EnquireLinkResp(_) => Ok(()),
            other => Err(unexpected(CommandId::EnquireLinkResp, &other)),
        }
    }

    /// Close the transport without unbinding. Valid in any state.
    pub async fn disconnect(&mut self) -> SmppResult<()> {
        let connection = self.connection.take();
        self.reset();

        if let Some(mut connection) = connection {
            connection.shutdown().await?;
        }
        Ok(())
    }

    /// Submit a message to one destination.
    ///
    /// In sync mode this waits for the submit_sm_resp. In async mode the
    /// sequence number is returned at once and the response is picked up
    /// with [`Session::collect_submit_response`].
    pub async fn submit_sm(
        &mut self,
        destination: &str,
        message: &[u8],
        params: &SubmitParams,
        optional: Vec<Tlv>,
    ) -> SmppResult<SubmitOutcome> {
        self.ensure_permitted(CommandId::SubmitSm)?;
        if destination.is_empty() {
            return Err(ConfigError::MissingField("destination_addr").into());
        }

        let body = params.message_body(destination, message);
        body.validate()?;

        let sequence = self.next_sequence_number();
        self.send(&SubmitSm::new(sequence, body, optional)).await?;

        match self.options.mode {
            SubmitMode::Sync => {
                let response = self.expect_submit_sm_response(sequence).await?;
                Ok(SubmitOutcome::Accepted {
                    sequence,
                    message_id: response.message_id,
                })
            }
            SubmitMode::Async => {
                self.correlator.track(sequence, CommandId::SubmitSmResp);
                Ok(SubmitOutcome::Pending { sequence })
            }
        }
    }

    /// Submit a message to several SME addresses and/or distribution lists.
    pub async fn submit_multi(
        &mut self,
        numbers: &[&str],
        lists: &[&str],
        message: &[u8],
        params: &SubmitParams,
        optional: Vec<Tlv>,
    ) -> SmppResult<SubmitMultiOutcome> {
        self.ensure_permitted(CommandId::SubmitMulti)?;

        let mut pdu = params.submit_multi(0, numbers, lists, message, optional);
        pdu.validate()?;
        let sequence = self.next_sequence_number();
        pdu.sequence_number = sequence;
        self.send(&pdu).await?;

        match self.options.mode {
            SubmitMode::Sync => {
                let response = self.expect_submit_multi_response(sequence).await?;
                Ok(SubmitMultiOutcome::Accepted {
                    sequence,
                    message_id: response.message_id,
                    unsuccessful: response.unsuccess_sme,
                })
            }
            SubmitMode::Async => {
                self.correlator.track(sequence, CommandId::SubmitMultiResp);
                Ok(SubmitMultiOutcome::Pending { sequence })
            }
        }
    }

    /// Send a simple text message.
    pub async fn send_sms(&mut self, message: &SmsMessage) -> SmppResult<SubmitOutcome> {
        let params = message.submit_params();
        self.submit_sm(&message.to, message.text.as_bytes(), &params, Vec::new())
            .await
    }

    /// Wait for the response to an async submit_sm.
    ///
    /// Responses to other outstanding submissions read along the way are
    /// parked for their own collectors.
    pub async fn collect_submit_response(&mut self, sequence: u32) -> SmppResult<SubmitSmResponse> {
        self.ensure_permitted(CommandId::SubmitSm)?;
        self.ensure_outstanding(sequence, CommandId::SubmitSmResp)?;
        self.expect_submit_sm_response(sequence).await
    }

    /// Wait for the response to an async submit_multi.
    pub async fn collect_submit_multi_response(
        &mut self,
        sequence: u32,
    ) -> SmppResult<SubmitMultiResponse> {
        self.ensure_permitted(CommandId::SubmitMulti)?;
        self.ensure_outstanding(sequence, CommandId::SubmitMultiResp)?;
        self.expect_submit_multi_response(sequence).await
    }

    /// Wait for the next deliver_sm. It has already been acknowledged when
    /// this returns.
    ///
    /// enquire_link from the SMSC is answered along the way. An unbind from
    /// the SMSC is answered, the session closed, and
    /// [`ProtocolError::PeerUnbound`] returned.
    pub async fn receive_message(&mut self) -> SmppResult<DeliverSm> {
        self.ensure_permitted(CommandId::DeliverSm)?;

        loop {
            if let Some(deliver) = self.correlator.next_delivery() {
                return Ok(deliver);
            }

            let pdu = self.read_pdu().await?;
            if !pdu.header.command_id.is_response() {
                self.handle_inbound(pdu).await?;
                continue;
            }

            let sequence = pdu.header.sequence_number;
            if let Err(pdu) = self.correlator.park(pdu) {
                return Err(ProtocolError::UnexpectedCommand {
                    expected: CommandId::DeliverSm,
                    actual: pdu.header.command_id,
                }
                .into());
            }
            debug!("parked response seq={sequence} while receiving");
        }
    }

    async fn expect_submit_sm_response(&mut self, sequence: u32) -> SmppResult<SubmitSmResponse> {
        match self.await_response(CommandId::SubmitSmResp, sequence).await? {
            Frame::SubmitSmResp(response) => Ok(response),
            other => Err(unexpected(CommandId::SubmitSmResp, &other)),
        }
    }

    async fn expect_submit_multi_response(
        &mut self,
        sequence: u32,
    ) -> SmppResult<SubmitMultiResponse> {
        match self.await_response(CommandId::SubmitMultiResp, sequence).await? {
            Frame::SubmitMultiResp(response) => Ok(response),
            other => Err(unexpected(CommandId::SubmitMultiResp, &other)),
        }
    }

    /// Read until the response for `sequence` arrives, then validate it.
    ///
    /// SMSC-initiated requests are served in between, and one that fails to
    /// decode is nacked and skipped. A response for a different outstanding
    /// sequence is parked; any other response goes through [`correlate`] and
    /// fails there.
    async fn await_response(&mut self, expected: CommandId, sequence: u32) -> SmppResult<Frame> {
        loop {
            let pdu = match self.correlator.take_parked(sequence) {
                Some(pdu) => pdu,
                None => self.read_pdu().await?,
            };

            if !pdu.header.command_id.is_response() {
                match self.handle_inbound(pdu).await {
                    // Already nacked; the response being awaited is still due.
                    Err(SmppError::Protocol(ProtocolError::Codec(e))) => {
                        debug!("dropped malformed request while waiting for seq={sequence}: {e}");
                    }
                    result => result?,
                }
                continue;
            }

            let actual = pdu.header.sequence_number;
            let pdu = if actual == sequence {
                self.correlator.complete(sequence);
                pdu
            } else {
                match self.correlator.park(pdu) {
                    Ok(()) => {
                        warn!("response seq={actual} arrived while waiting for seq={sequence}, parked");
                        continue;
                    }
                    Err(pdu) => pdu,
                }
            };

            return Ok(correlate(&pdu, Some(expected), sequence)?);
        }
    }

    /// Serve a request initiated by the SMSC.
    async fn handle_inbound(&mut self, pdu: RawPdu) -> SmppResult<()> {
        let sequence = pdu.header.sequence_number;

        match pdu.header.command_id {
            CommandId::EnquireLink => self.send(&EnquireLinkResponse::new(sequence)).await,
            CommandId::DeliverSm => self.handle_deliver_sm(pdu).await,
            CommandId::Unbind => {
                debug!("SMSC requested unbind seq={sequence}");
                self.send(&UnbindResponse::new(sequence)).await?;
                self.close().await;
                Err(ProtocolError::PeerUnbound.into())
            }
            command_id => {
                warn!("rejecting unsupported request {command_id:?} seq={sequence}");
                self.send(&GenericNack::invalid_command_id(sequence)).await
            }
        }
    }

    async fn handle_deliver_sm(&mut self, pdu: RawPdu) -> SmppResult<()> {
        let sequence = pdu.header.sequence_number;

        if !self
            .role
            .is_some_and(|role| role.allows(CommandId::DeliverSm))
        {
            warn!("deliver_sm seq={sequence} on a session that cannot receive");
            let mut response = DeliverSmResponse::new(sequence);
            response.command_status = CommandStatus::IncorrectBindStatus;
            return self.send(&response).await;
        }

        match pdu.decode() {
            Ok(Frame::DeliverSm(deliver)) => {
                self.send(&DeliverSmResponse::new(sequence)).await?;
                self.correlator.queue_delivery(*deliver);
                Ok(())
            }
            Ok(other) => {
                self.send(&GenericNack::invalid_command_id(sequence)).await?;
                Err(unexpected(CommandId::DeliverSm, &other))
            }
            Err(e) => {
                warn!("malformed deliver_sm seq={sequence}: {e}");
                self.send(&GenericNack::new(e.to_command_status(), sequence))
                    .await?;
                Err(e.into())
            }
        }
    }

    fn ensure_permitted(&self, command: CommandId) -> Result<(), StateError> {
        match (self.state, self.role) {
            (SessionState::Disconnected, _) => Err(StateError::NotConnected),
            (SessionState::Bound, Some(role)) if role.allows(command) => Ok(()),
            (SessionState::Bound, Some(role)) => Err(StateError::NotPermitted { role, command }),
            _ => Err(StateError::NotBound),
        }
    }

    /// Nothing is read unless `sequence` is waiting for a `response`.
    fn ensure_outstanding(&self, sequence: u32, response: CommandId) -> Result<(), StateError> {
        match self.correlator.expected(sequence) {
            Some(expected) if expected == response => Ok(()),
            Some(expected) => Err(StateError::ResponseMismatch {
                sequence,
                expected,
                requested: response,
            }),
            None => Err(StateError::NotOutstanding { sequence }),
        }
    }

    /// Issue the next sequence number: 1, 2, ... wrapping back to 1 after
    /// [`MAX_SEQUENCE_NUMBER`].
    fn next_sequence_number(&mut self) -> u32 {
        self.sequence_number = if self.sequence_number >= MAX_SEQUENCE_NUMBER {
            1
        } else {
            self.sequence_number + 1
        };
        self.sequence_number
    }

    fn connection(&mut self) -> Result<&mut Connection<S>, StateError> {
        self.connection.as_mut().ok_or(StateError::NotConnected)
    }

    async fn send<E>(&mut self, pdu: &E) -> SmppResult<()>
    where
        E: Encodable + ?Sized,
    {
        debug!(
            "=> {:?} seq={} status={}",
            pdu.command_id(),
            pdu.sequence_number(),
            pdu.command_status()
        );
        let result = self.connection()?.write_frame(pdu).await;
        self.check(result)
    }

    async fn read_pdu(&mut self) -> SmppResult<RawPdu> {
        let result = match self.connection()?.read_pdu().await {
            Ok(Some(pdu)) => Ok(pdu),
            Ok(None) => Err(SmppError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "SMSC closed the connection",
            ))),
            Err(e) => Err(e),
        };
        let pdu = self.check(result)?;

        debug!(
            "<= {:?} seq={} status={}",
            pdu.header.command_id, pdu.header.sequence_number, pdu.header.command_status
        );
        Ok(pdu)
    }

    /// Drop the connection when `result` is an error the stream cannot
    /// recover from.
    fn check<T>(&mut self, result: SmppResult<T>) -> SmppResult<T> {
        if let Err(e) = &result {
            if e.is_fatal() && self.connection.is_some() {
                warn!("closing session: {e}");
                self.connection = None;
                self.reset();
            }
        }
        result
    }

    async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.shutdown().await {
                debug!("shutdown failed: {e}");
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SessionState::Disconnected;
        self.role = None;
        self.correlator.clear();
    }
}

fn unexpected(expected: CommandId, frame: &Frame) -> SmppError {
    ProtocolError::UnexpectedCommand {
        expected,
        actual: frame.command_id(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::datatypes::{
        NumericPlanIndicator, TlvTag, TlvValue, TypeOfNumber, UnsuccessSmeAddress,
    };
    use bytes::{BufMut, BytesMut};
    use tokio::io::{DuplexStream, duplex};

    type Smsc = Connection<DuplexStream>;

    fn sample_body(destination: &str, text: &str) -> crate::datatypes::MessageBody {
        SubmitParams::default().message_body(destination, text.as_bytes())
    }

    fn pair(options: SessionOptions) -> (Session<DuplexStream>, Smsc) {
        let (client, server) = duplex(64 * 1024);
        (Session::with_options(client, options), Connection::new(server))
    }

    async fn next_frame(smsc: &mut Smsc) -> Frame {
        smsc.read_frame().await.unwrap().unwrap()
    }

    async fn bound(bind_type: BindType, options: SessionOptions) -> (Session<DuplexStream>, Smsc) {
        let (mut session, mut smsc) = pair(options);
        let credentials = BindCredentials::new(bind_type, "esme", "secret");

        let (result, ()) = tokio::join!(session.bind(&credentials), async {
            let Frame::Bind(bind) = next_frame(&mut smsc).await else {
                panic!("expected bind");
            };
            smsc.write_frame(&BindResponse::new(bind.bind_type, bind.sequence_number, "SMSC"))
                .await
                .unwrap();
        });
        result.unwrap();
        (session, smsc)
    }

    /// A PDU whose first C-octet string field has no terminator.
    struct Unterminated(CommandId, u32);

    impl Encodable for Unterminated {
        fn command_id(&self) -> CommandId {
            self.0
        }

        fn sequence_number(&self) -> u32 {
            self.1
        }

        fn body_size(&self) -> usize {
            3
        }

        fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
            buf.put_slice(b"abc");
            Ok(())
        }
    }

    #[tokio::test]
    async fn bind_transmitter() {
        let (mut session, mut smsc) = pair(SessionOptions::default());
        let credentials = BindCredentials::transmitter("test", "pwd");

        let (result, bind) = tokio::join!(session.bind(&credentials), async {
            let frame = next_frame(&mut smsc).await;
            smsc.write_frame(&BindResponse::new(BindType::Transmitter, 1, "SMSC"))
                .await
                .unwrap();
            frame
        });

        assert_eq!(bind, Frame::Bind(credentials.to_pdu(1)));
        assert_eq!(result.unwrap().system_id, "SMSC");
        assert_eq!(session.state(), SessionState::Bound);
        assert_eq!(session.role(), Some(BindType::Transmitter));
        assert_eq!(session.sequence_number(), 1);
    }

    #[tokio::test]
    async fn bind_sequence_mismatch_leaves_session_unbound() {
        let (mut session, mut smsc) = pair(SessionOptions::default());
        let credentials = BindCredentials::transceiver("test", "pwd");

        let (result, ()) = tokio::join!(session.bind(&credentials), async {
            next_frame(&mut smsc).await;
            smsc.write_frame(&BindResponse::new(BindType::Transceiver, 2, "SMSC"))
                .await
                .unwrap();
        });

        let err = result.unwrap_err();
        assert!(matches!(
            err,
            SmppError::Protocol(ProtocolError::SequenceMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(session.role(), None);
    }

    #[tokio::test]
    async fn bind_rejected_by_status() {
        let (mut session, mut smsc) = pair(SessionOptions::default());
        let credentials = BindCredentials::receiver("test", "bad");

        let (result, ()) = tokio::join!(session.bind(&credentials), async {
            next_frame(&mut smsc).await;
            let mut response = BindResponse::new(BindType::Receiver, 1, "");
            response.command_status = CommandStatus::SystemError;
            smsc.write_frame(&response).await.unwrap();
        });

        let err = result.unwrap_err();
        assert_eq!(err.command_status(), Some(CommandStatus::SystemError));
        assert!(!session.is_bound());
    }

    #[tokio::test]
    async fn generic_nack_in_place_of_response() {
        let (mut session, mut smsc) = pair(SessionOptions::default());
        let credentials = BindCredentials::transmitter("test", "pwd");

        let (result, ()) = tokio::join!(session.bind(&credentials), async {
            next_frame(&mut smsc).await;
            smsc.write_frame(&GenericNack::invalid_command_id(1))
                .await
                .unwrap();
        });

        assert!(matches!(
            result.unwrap_err(),
            SmppError::Protocol(ProtocolError::UnexpectedCommand {
                expected: CommandId::BindTransmitterResp,
                actual: CommandId::GenericNack
            })
        ));
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn state_errors_touch_no_wire() {
        let (mut session, mut smsc) = pair(SessionOptions::default());
        let params = SubmitParams::default();

        let err = session
            .submit_sm("447700900123", b"hi", &params, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SmppError::State(StateError::NotBound)));
        assert!(matches!(
            session.unbind().await.unwrap_err(),
            SmppError::State(StateError::NotBound)
        ));
        assert!(matches!(
            session.receive_message().await.unwrap_err(),
            SmppError::State(StateError::NotBound)
        ));
        assert_eq!(session.sequence_number(), 0);

        drop(session);
        assert!(smsc.read_pdu().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn role_and_bound_state_checks() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;

        let err = session
            .bind(&BindCredentials::transmitter("esme", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, SmppError::State(StateError::AlreadyBound)));

        let err = session.receive_message().await.unwrap_err();
        assert!(matches!(
            err,
            SmppError::State(StateError::NotPermitted {
                role: BindType::Transmitter,
                command: CommandId::DeliverSm
            })
        ));

        let err = session
            .submit_sm("", b"hi", &SubmitParams::default(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SmppError::Config(ConfigError::MissingField("destination_addr"))
        ));

        let err = session.collect_submit_response(9).await.unwrap_err();
        assert!(matches!(
            err,
            SmppError::State(StateError::NotOutstanding { sequence: 9 })
        ));

        // Only the bind went out.
        assert_eq!(session.sequence_number(), 1);
        drop(session);
        assert!(smsc.read_pdu().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn receiver_cannot_submit() {
        let (mut session, _smsc) = bound(BindType::Receiver, SessionOptions::default()).await;
        let err = session
            .submit_multi(&["1"], &[], b"hi", &SubmitParams::default(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SmppError::State(StateError::NotPermitted {
                role: BindType::Receiver,
                command: CommandId::SubmitMulti
            })
        ));
    }

    #[tokio::test]
    async fn sync_submit_returns_message_id() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;
        let params = SubmitParams::builder()
            .source_addr("Acme")
            .registered_delivery(1)
            .build()
            .unwrap();

        let (outcome, submit) = tokio::join!(
            session.submit_sm("447700900123", b"Hello", &params, Vec::new()),
            async {
                let Frame::SubmitSm(submit) = next_frame(&mut smsc).await else {
                    panic!("expected submit_sm");
                };
                smsc.write_frame(&SubmitSmResponse::new(submit.sequence_number, "msg-1"))
                    .await
                    .unwrap();
                submit
            }
        );

        assert_eq!(
            outcome.unwrap(),
            SubmitOutcome::Accepted {
                sequence: 2,
                message_id: "msg-1".to_string()
            }
        );
        assert_eq!(submit.body.source_addr, "Acme");
        assert_eq!(submit.body.destination_addr, "447700900123");
        assert_eq!(&submit.body.short_message[..], b"Hello");
    }

    #[tokio::test]
    async fn submit_rejected_by_smsc() {
        let (mut session, mut smsc) = bound(BindType::Transceiver, SessionOptions::default()).await;

        let params = SubmitParams::default();

        let (result, ()) = tokio::join!(
            session.submit_sm("1234", b"x", &params, Vec::new()),
            async {
                next_frame(&mut smsc).await;
                let mut response = SubmitSmResponse::new(2, "");
                response.command_status = CommandStatus::ThrottlingError;
                smsc.write_frame(&response).await.unwrap();
            }
        );

        let err = result.unwrap_err();
        assert_eq!(err.command_status(), Some(CommandStatus::ThrottlingError));
        assert!(session.is_bound());
    }

    #[tokio::test]
    async fn one_octet_tlv_adds_five_to_command_length() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::asynchronous()).await;
        let params = SubmitParams::default();
        let tlv = Tlv::new(TlvTag::PrivacyIndicator, TlvValue::U8(1)).unwrap();

        session
            .submit_sm("1234", b"hi", &params, Vec::new())
            .await
            .unwrap();
        session
            .submit_sm("1234", b"hi", &params, vec![tlv])
            .await
            .unwrap();

        let plain = smsc.read_pdu().await.unwrap().unwrap();
        let with_tlv = smsc.read_pdu().await.unwrap().unwrap();
        assert_eq!(
            with_tlv.header.command_length,
            plain.header.command_length + 5
        );
    }

    #[tokio::test]
    async fn async_submissions_correlate_out_of_order() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::asynchronous()).await;
        let params = SubmitParams::default();

        let mut sequences = Vec::new();
        for text in ["one", "two", "three"] {
            let outcome = session
                .submit_sm("1234", text.as_bytes(), &params, Vec::new())
                .await
                .unwrap();
            assert_eq!(outcome.message_id(), None);
            sequences.push(outcome.sequence());
        }
        assert_eq!(sequences, vec![2, 3, 4]);
        assert_eq!(session.outstanding(), vec![2, 3, 4]);

        for _ in 0..3 {
            next_frame(&mut smsc).await;
        }
        for sequence in [4, 2, 3] {
            smsc.write_frame(&SubmitSmResponse::new(sequence, &format!("id-{sequence}")))
                .await
                .unwrap();
        }

        let third = session.collect_submit_response(3).await.unwrap();
        assert_eq!(third.message_id, "id-3");
        assert_eq!(session.outstanding(), vec![2, 4]);

        let first = session.collect_submit_response(2).await.unwrap();
        assert_eq!(first.message_id, "id-2");
        let second = session.collect_submit_response(4).await.unwrap();
        assert_eq!(second.message_id, "id-4");
        assert!(session.outstanding().is_empty());
    }

    #[tokio::test]
    async fn unsolicited_response_is_sequence_mismatch() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::asynchronous()).await;
        session
            .submit_sm("1234", b"x", &SubmitParams::default(), Vec::new())
            .await
            .unwrap();
        next_frame(&mut smsc).await;
        smsc.write_frame(&SubmitSmResponse::new(77, "stray"))
            .await
            .unwrap();

        let err = session.collect_submit_response(2).await.unwrap_err();
        assert!(matches!(
            err,
            SmppError::Protocol(ProtocolError::SequenceMismatch {
                expected: 2,
                actual: 77
            })
        ));
        assert_eq!(session.outstanding(), vec![2]);
        assert!(session.forget(2));
    }

    #[tokio::test]
    async fn body_decode_failure_keeps_stream_framed() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;
        let params = SubmitParams::default();

        let (result, ()) = tokio::join!(
            session.submit_sm("1234", b"x", &params, Vec::new()),
            async {
                next_frame(&mut smsc).await;
                smsc.write_frame(&Unterminated(CommandId::SubmitSmResp, 2)).await.unwrap();
            }
        );
        assert!(matches!(
            result.unwrap_err(),
            SmppError::Protocol(ProtocolError::Codec(CodecError::UnterminatedString { .. }))
        ));

        let (result, ()) = tokio::join!(
            session.submit_sm("1234", b"y", &params, Vec::new()),
            async {
                next_frame(&mut smsc).await;
                smsc.write_frame(&SubmitSmResponse::new(3, "ok"))
                    .await
                    .unwrap();
            }
        );
        assert_eq!(result.unwrap().message_id(), Some("ok"));
    }

    #[tokio::test]
    async fn submit_multi_reports_unsuccessful_destinations() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;
        let params = SubmitParams::default();

        let (outcome, submit) = tokio::join!(
            session.submit_multi(&["111", "222"], &["staff"], b"hi", &params, Vec::new()),
            async {
                let Frame::SubmitMulti(submit) = next_frame(&mut smsc).await else {
                    panic!("expected submit_multi");
                };
                let mut response = SubmitMultiResponse::success(submit.sequence_number, "multi-1");
                response.unsuccess_sme.push(UnsuccessSmeAddress::new(
                    TypeOfNumber::Unknown,
                    NumericPlanIndicator::Unknown,
                    "222",
                    CommandStatus::InvalidDestinationAddress,
                ));
                smsc.write_frame(&response).await.unwrap();
                submit
            }
        );

        let SubmitMultiOutcome::Accepted {
            sequence,
            message_id,
            unsuccessful,
        } = outcome.unwrap()
        else {
            panic!("expected accepted outcome");
        };
        assert_eq!(sequence, 2);
        assert_eq!(message_id, "multi-1");
        assert_eq!(unsuccessful.len(), 1);
        assert_eq!(submit.destination_count(), 3);
    }

    #[tokio::test]
    async fn submit_multi_without_destinations_is_config_error() {
        let (mut session, _smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;
        let err = session
            .submit_multi(&[], &[], b"hi", &SubmitParams::default(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SmppError::Config(ConfigError::DestinationCount { count: 0, .. })
        ));
        assert_eq!(session.sequence_number(), 1);
    }

    #[tokio::test]
    async fn nul_in_destination_is_config_error() {
        let (mut session, _smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;
        let params = SubmitParams::default();

        let err = session
            .submit_sm("4477\0123", b"hi", &params, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SmppError::Config(ConfigError::EmbeddedNul {
                field: "destination_addr"
            })
        ));
        let err = session
            .submit_multi(&["111"], &["st\0aff"], b"hi", &params, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SmppError::Config(ConfigError::EmbeddedNul { field: "dl_name" })
        ));
        assert_eq!(session.sequence_number(), 1);
    }

    #[tokio::test]
    async fn receive_answers_enquire_link_and_acks_delivery() {
        let (mut session, mut smsc) = bound(BindType::Receiver, SessionOptions::default()).await;

        smsc.write_frame(&EnquireLink::new(100)).await.unwrap();
        smsc.write_frame(&DeliverSm::new(101, sample_body("1234", "MO"), Vec::new()))
            .await
            .unwrap();

        let deliver = session.receive_message().await.unwrap();
        assert_eq!(deliver.payload(), b"MO");

        assert_eq!(
            next_frame(&mut smsc).await,
            Frame::EnquireLinkResp(EnquireLinkResponse::new(100))
        );
        assert_eq!(
            next_frame(&mut smsc).await,
            Frame::DeliverSmResp(DeliverSmResponse::new(101))
        );
    }

    #[tokio::test]
    async fn delivery_during_submit_is_queued() {
        let (mut session, mut smsc) = bound(BindType::Transceiver, SessionOptions::default()).await;

        let params = SubmitParams::default();

        let (outcome, ()) = tokio::join!(
            session.submit_sm("1234", b"MT", &params, Vec::new()),
            async {
                next_frame(&mut smsc).await;
                smsc.write_frame(&DeliverSm::new(40, sample_body("5678", "MO"), Vec::new()))
                    .await
                    .unwrap();
                smsc.write_frame(&SubmitSmResponse::new(2, "mt-1"))
                    .await
                    .unwrap();
            }
        );
        assert_eq!(outcome.unwrap().message_id(), Some("mt-1"));
        assert_eq!(
            next_frame(&mut smsc).await,
            Frame::DeliverSmResp(DeliverSmResponse::new(40))
        );

        let deliver = session.receive_message().await.unwrap();
        assert_eq!(deliver.sequence_number, 40);
        assert_eq!(deliver.body.destination_addr, "5678");
    }

    #[tokio::test]
    async fn malformed_delivery_during_submit_is_nacked_and_skipped() {
        let (mut session, mut smsc) = bound(BindType::Transceiver, SessionOptions::default()).await;
        let params = SubmitParams::default();

        let (outcome, ()) = tokio::join!(
            session.submit_sm("1234", b"MT", &params, Vec::new()),
            async {
                next_frame(&mut smsc).await;
                smsc.write_frame(&Unterminated(CommandId::DeliverSm, 41))
                    .await
                    .unwrap();
                smsc.write_frame(&SubmitSmResponse::new(2, "mt-1"))
                    .await
                    .unwrap();
            }
        );
        assert_eq!(outcome.unwrap().message_id(), Some("mt-1"));
        assert!(session.outstanding().is_empty());

        let Frame::GenericNack(nack) = next_frame(&mut smsc).await else {
            panic!("expected generic_nack");
        };
        assert_eq!(nack.sequence_number, 41);
        assert_eq!(nack.command_status, CommandStatus::SystemError);

        let (outcome, ()) = tokio::join!(
            session.submit_sm("1234", b"MT", &params, Vec::new()),
            async {
                next_frame(&mut smsc).await;
                smsc.write_frame(&SubmitSmResponse::new(3, "mt-2"))
                    .await
                    .unwrap();
            }
        );
        assert_eq!(outcome.unwrap().message_id(), Some("mt-2"));
    }

    #[tokio::test]
    async fn malformed_delivery_fails_receive() {
        let (mut session, mut smsc) = bound(BindType::Receiver, SessionOptions::default()).await;
        smsc.write_frame(&Unterminated(CommandId::DeliverSm, 42))
            .await
            .unwrap();

        assert!(matches!(
            session.receive_message().await.unwrap_err(),
            SmppError::Protocol(ProtocolError::Codec(CodecError::UnterminatedString { .. }))
        ));
        assert!(session.is_bound());
        assert!(matches!(
            next_frame(&mut smsc).await,
            Frame::GenericNack(GenericNack { sequence_number: 42, .. })
        ));
    }

    #[tokio::test]
    async fn collecting_with_the_wrong_response_kind_reads_nothing() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::asynchronous()).await;
        let params = SubmitParams::default();

        let SubmitMultiOutcome::Pending { sequence } = session
            .submit_multi(&["111"], &[], b"hi", &params, Vec::new())
            .await
            .unwrap()
        else {
            panic!("expected pending outcome");
        };
        next_frame(&mut smsc).await;
        smsc.write_frame(&SubmitMultiResponse::success(sequence, "multi-2"))
            .await
            .unwrap();

        assert!(matches!(
            session.collect_submit_response(sequence).await.unwrap_err(),
            SmppError::State(StateError::ResponseMismatch {
                expected: CommandId::SubmitMultiResp,
                requested: CommandId::SubmitSmResp,
                ..
            })
        ));
        assert_eq!(session.outstanding(), vec![sequence]);

        let response = session.collect_submit_multi_response(sequence).await.unwrap();
        assert_eq!(response.message_id, "multi-2");
        assert!(session.outstanding().is_empty());
    }

    #[tokio::test]
    async fn peer_unbind_closes_session() {
        let (mut session, mut smsc) = bound(BindType::Transceiver, SessionOptions::default()).await;
        smsc.write_frame(&Unbind::new(50)).await.unwrap();

        let err = session.receive_message().await.unwrap_err();
        assert!(matches!(err, SmppError::Protocol(ProtocolError::PeerUnbound)));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(
            next_frame(&mut smsc).await,
            Frame::UnbindResp(UnbindResponse::new(50))
        );

        assert!(matches!(
            session.enquire_link().await.unwrap_err(),
            SmppError::State(StateError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn unsupported_request_gets_generic_nack() {
        let (mut session, mut smsc) = bound(BindType::Receiver, SessionOptions::default()).await;
        smsc.write_frame(&SubmitSm::new(60, sample_body("1", "x"), Vec::new()))
            .await
            .unwrap();
        smsc.write_frame(&DeliverSm::new(61, sample_body("1", "y"), Vec::new()))
            .await
            .unwrap();

        session.receive_message().await.unwrap();
        assert_eq!(
            next_frame(&mut smsc).await,
            Frame::GenericNack(GenericNack::invalid_command_id(60))
        );
    }

    #[tokio::test]
    async fn unbind_closes_transport() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;

        let (result, ()) = tokio::join!(session.unbind(), async {
            assert_eq!(next_frame(&mut smsc).await, Frame::Unbind(Unbind::new(2)));
            smsc.write_frame(&UnbindResponse::new(2)).await.unwrap();
        });
        result.unwrap();

        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.role(), None);
        assert!(smsc.read_pdu().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn enquire_link_while_connected() {
        let (mut session, mut smsc) = pair(SessionOptions::default());

        let (result, ()) = tokio::join!(session.enquire_link(), async {
            assert_eq!(next_frame(&mut smsc).await, Frame::EnquireLink(EnquireLink::new(1)));
            smsc.write_frame(&EnquireLinkResponse::new(1)).await.unwrap();
        });
        result.unwrap();
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn transport_failure_disconnects() {
        let (mut session, smsc) = bound(BindType::Transmitter, SessionOptions::default()).await;
        drop(smsc);

        let err = session.enquire_link().await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn sequence_numbers_wrap_to_one() {
        let (mut session, _smsc) = pair(SessionOptions::default());
        assert_eq!(session.next_sequence_number(), 1);
        assert_eq!(session.next_sequence_number(), 2);

        session.sequence_number = MAX_SEQUENCE_NUMBER;
        assert_eq!(session.next_sequence_number(), 1);
    }

    #[tokio::test]
    async fn send_sms_uses_message_fields() {
        let (mut session, mut smsc) = bound(BindType::Transmitter, SessionOptions::asynchronous()).await;
        let message = SmsMessage::new("447700900123", "Acme", "Hello");

        let outcome = session.send_sms(&message).await.unwrap();
        assert_eq!(outcome, SubmitOutcome::Pending { sequence: 2 });

        let Frame::SubmitSm(submit) = next_frame(&mut smsc).await else {
            panic!("expected submit_sm");
        };
        assert_eq!(submit.body.source_addr, "Acme");
        assert_eq!(&submit.body.short_message[..], b"Hello");
    }
}
