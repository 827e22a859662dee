// ABOUTME: SMPP session error types, split into transport, protocol, config and state failures
// ABOUTME: Config and state errors are raised before any byte is written to the wire

use crate::codec::CodecError;
use crate::datatypes::{BindType, CommandId, CommandStatus, TlvError};
use std::io;
use thiserror::Error;

/// Error type for every session operation.
///
/// `Transport` is fatal: the session has moved to Disconnected. `Protocol`
/// leaves the stream framed, so the caller may carry on or unbind. `Config`
/// and `State` never touch the wire.
#[derive(Debug, Error)]
pub enum SmppError {
    /// I/O failure on the underlying stream (connect, read, write, EOF)
    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl SmppError {
    /// True when the connection can no longer be used.
    ///
    /// A command_length outside the framing limits leaves no way to find
    /// the next PDU boundary, so it is fatal like an I/O failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SmppError::Transport(_)
                | SmppError::Protocol(ProtocolError::Codec(CodecError::InvalidPduLength { .. }))
                | SmppError::Protocol(ProtocolError::PeerUnbound)
        )
    }

    /// The SMSC command_status, if this is a non-ESME_ROK response.
    pub fn command_status(&self) -> Option<CommandStatus> {
        match self {
            SmppError::Protocol(ProtocolError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl From<CodecError> for SmppError {
    fn from(err: CodecError) -> Self {
        SmppError::Protocol(ProtocolError::Codec(err))
    }
}

/// A response or inbound PDU that does not fit the exchange in progress.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unexpected command: expected {expected:?}, got {actual:?}")]
    UnexpectedCommand {
        expected: CommandId,
        actual: CommandId,
    },

    #[error("sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch { expected: u32, actual: u32 },

    /// The SMSC answered with a non-ESME_ROK command_status.
    #[error("{command:?} failed with status {status}")]
    Status {
        command: CommandId,
        status: CommandStatus,
    },

    #[error("malformed PDU: {0}")]
    Codec(#[from] CodecError),

    /// The SMSC sent unbind; it has been acknowledged and the connection closed.
    #[error("SMSC unbound the session")]
    PeerUnbound,
}

/// Caller supplied configuration that cannot be put on the wire.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),

    #[error("field '{field}' is {actual} octets, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// C-octet strings end at their first NUL, so one inside the value
    /// would split the field on the wire.
    #[error("field '{field}' contains a NUL octet")]
    EmbeddedNul { field: &'static str },

    #[error("field '{field}' must be empty or {expected} octets, got {actual}")]
    InvalidFieldLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("optional parameter: {0}")]
    Tlv(#[from] TlvError),

    #[error("submit_multi needs 1 to {max} destinations, got {count}")]
    DestinationCount { count: usize, max: usize },

    /// A PDU failed to encode. Nothing was written.
    #[error("encoding failed: {0}")]
    Encoding(#[source] CodecError),
}

/// Operation not valid in the session's current state or role.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("session is not connected")]
    NotConnected,

    #[error("session is already bound")]
    AlreadyBound,

    #[error("session is not bound")]
    NotBound,

    #[error("{command:?} is not permitted for a {role} session")]
    NotPermitted { role: BindType, command: CommandId },

    /// Nothing is waiting on a response with this sequence number.
    #[error("no outstanding request with sequence {sequence}")]
    NotOutstanding { sequence: u32 },

    #[error("sequence {sequence} is waiting for {expected:?}, not {requested:?}")]
    ResponseMismatch {
        sequence: u32,
        expected: CommandId,
        requested: CommandId,
    },
}

/// Result type alias for SMPP operations
pub type SmppResult<T> = Result<T, SmppError>;
