// SMPP v3.4 Codec - Separates parsing/encoding logic from domain models
//
// This module owns the wire format: the 16 byte header, big-endian integer
// packing, C-octet strings and the command_id keyed decoder table. Each PDU
// implements Encodable/Decodable for its body only; header plumbing and
// command_length accounting live here once.

use crate::datatypes::{
    Bind, BindResponse, CommandId, CommandStatus, DeliverSm, DeliverSmResponse, EnquireLink,
    EnquireLinkResponse, GenericNack, SubmitMulti, SubmitMultiResponse, SubmitSm,
    SubmitSmResponse, TlvError, Unbind, UnbindResponse,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::LazyLock;
use thiserror::Error;

/// Maximum accepted command_length. message_payload alone may carry 64K
/// octets, so the limit leaves room for the mandatory fields around it.
pub const MAX_PDU_SIZE: u32 = 70_000;

/// SMPP v3.4 PDU Header (16 bytes, common to all PDUs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    /// Decode a header. Every 16 byte input decodes; framing limits are
    /// checked separately by [`PduHeader::validate_length`].
    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        if buf.remaining() < Self::SIZE {
            return Err(CodecError::Incomplete);
        }

        Ok(PduHeader {
            command_length: buf.get_u32(),
            command_id: CommandId::from(buf.get_u32()),
            command_status: CommandStatus::from(buf.get_u32()),
            sequence_number: buf.get_u32(),
        })
    }

    /// Encode PDU header to buffer
    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u32(buf, self.command_length);
        encode_u32(buf, u32::from(self.command_id));
        encode_u32(buf, self.command_status.code());
        encode_u32(buf, self.sequence_number);
    }

    /// Reject lengths that cannot frame a PDU.
    pub fn validate_length(&self) -> Result<(), CodecError> {
        if self.command_length < Self::SIZE as u32 || self.command_length > MAX_PDU_SIZE {
            return Err(CodecError::InvalidPduLength {
                length: self.command_length,
                min: Self::SIZE as u32,
                max: MAX_PDU_SIZE,
            });
        }
        Ok(())
    }

    /// Number of body octets that follow this header.
    pub fn body_len(&self) -> usize {
        (self.command_length as usize).saturating_sub(Self::SIZE)
    }
}

/// Trait for PDUs that can be written to the wire.
///
/// Implementors describe their header fields and body; the provided
/// `encode` computes command_length up front from `body_size` and checks
/// that the body actually written matches it.
pub trait Encodable {
    fn command_id(&self) -> CommandId;

    fn sequence_number(&self) -> u32;

    /// Requests always carry ESME_ROK; responses override this.
    fn command_status(&self) -> CommandStatus {
        CommandStatus::Ok
    }

    /// Encoded size of the body, optional parameters included.
    fn body_size(&self) -> usize;

    /// Write the body (mandatory fields, then optional parameters).
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    fn encoded_size(&self) -> usize {
        PduHeader::SIZE + self.body_size()
    }

    /// Encode header and body. On error nothing is left in `buf`.
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let header = PduHeader {
            command_length: self.encoded_size() as u32,
            command_id: self.command_id(),
            command_status: self.command_status(),
            sequence_number: self.sequence_number(),
        };

        let start = buf.len();
        header.encode(buf);

        if let Err(e) = self.encode_body(buf) {
            buf.truncate(start);
            return Err(e);
        }

        let written = buf.len() - start;
        if written != header.command_length as usize {
            buf.truncate(start);
            return Err(CodecError::BodyLength {
                declared: header.body_len(),
                actual: written - PduHeader::SIZE,
            });
        }

        Ok(())
    }

    /// Convert this PDU to bytes (convenience method)
    fn to_bytes(&self) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Trait for PDUs that can be decoded from a body slice
pub trait Decodable: Sized {
    /// Command ids sharing this body layout.
    const COMMAND_IDS: &'static [CommandId];

    /// Decode this PDU from the buffer after header. `buf` spans exactly the
    /// body declared by `header.command_length`.
    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError>;

    /// Validate the header is appropriate for this PDU type
    fn validate_header(header: &PduHeader) -> Result<(), CodecError> {
        if !Self::COMMAND_IDS.contains(&header.command_id) {
            return Err(CodecError::UnexpectedCommandId {
                expected: Self::COMMAND_IDS[0],
                actual: header.command_id,
            });
        }
        Ok(())
    }
}

/// Codec errors with detailed context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Incomplete PDU: need more data")]
    Incomplete,

    #[error("Invalid PDU length: {length}, must be {min}-{max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("Unexpected command_id: expected {expected:?}, got {actual:?}")]
    UnexpectedCommandId {
        expected: CommandId,
        actual: CommandId,
    },

    #[error("Body length mismatch: header declares {declared} octets, body has {actual}")]
    BodyLength { declared: usize, actual: usize },

    #[error("Field '{field}' has no NUL terminator within {max_len} octets")]
    UnterminatedString { field: &'static str, max_len: usize },

    #[error("Field '{field}' validation failed: {reason}")]
    FieldValidation { field: &'static str, reason: String },

    #[error("TLV error: {0}")]
    Tlv(#[from] TlvError),

    #[error("UTF-8 decoding error in field '{field}': {source}")]
    Utf8Error {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Convert codec errors to appropriate SMPP command_status codes
impl CodecError {
    pub fn to_command_status(&self) -> CommandStatus {
        match self {
            CodecError::InvalidPduLength { .. } | CodecError::BodyLength { .. } => {
                CommandStatus::InvalidCommandLength
            }
            CodecError::UnexpectedCommandId { .. } => CommandStatus::InvalidCommandId,
            CodecError::FieldValidation { field, .. }
            | CodecError::UnterminatedString { field, .. }
            | CodecError::Utf8Error { field, .. } => match *field {
                "source_addr" => CommandStatus::InvalidSourceAddress,
                "destination_addr" => CommandStatus::InvalidDestinationAddress,
                "short_message" => CommandStatus::InvalidMsgLength,
                "priority_flag" => CommandStatus::InvalidPriorityFlag,
                _ => CommandStatus::SystemError,
            },
            CodecError::Tlv(TlvError::LengthMismatch { .. }) => {
                CommandStatus::InvalidParameterLength
            }
            CodecError::Tlv(_) => CommandStatus::ErrorInOptionalPartofPduBody,
            CodecError::Incomplete => CommandStatus::InvalidMsgLength,
        }
    }
}

/// Write the low `width` octets (1, 2 or 4) of `value`, most significant
/// first. Bits above the width are dropped.
pub fn pack_uint(buf: &mut BytesMut, value: u32, width: usize) {
    debug_assert!(matches!(width, 1 | 2 | 4), "unsupported integer width {width}");
    buf.put_uint(u64::from(value), width);
}

/// Read a big-endian unsigned integer of up to 4 octets.
pub fn unpack_uint(bytes: &[u8]) -> u32 {
    debug_assert!(bytes.len() <= 4, "integer wider than 4 octets");
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Decode a NUL terminated C-octet string of at most `max_len` octets
/// (terminator included). The terminator is consumed.
pub fn decode_cstring(
    buf: &mut Cursor<&[u8]>,
    max_len: usize,
    field_name: &'static str,
) -> Result<String, CodecError> {
    let window = buf.remaining().min(max_len);
    let end = buf.chunk()[..window]
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::UnterminatedString {
            field: field_name,
            max_len,
        })?;

    let value = buf.chunk()[..end].to_vec();
    buf.advance(end + 1);

    String::from_utf8(value).map_err(|e| CodecError::Utf8Error {
        field: field_name,
        source: e,
    })
}

/// Encode a C-octet string: raw bytes then one NUL. An empty string is just
/// the terminator.
pub fn encode_cstring(buf: &mut BytesMut, value: &str) {
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
}

/// Encoded size of a C-octet string, terminator included.
pub fn cstring_size(value: &str) -> usize {
    value.len() + 1
}

/// Decode a single byte
pub fn decode_u8(buf: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u8())
}

/// Decode a 16-bit big-endian integer
pub fn decode_u16(buf: &mut Cursor<&[u8]>) -> Result<u16, CodecError> {
    if buf.remaining() < 2 {
        return Err(CodecError::Incomplete);
    }
    Ok(unpack_uint(&buf.copy_to_bytes(2)) as u16)
}

/// Decode a 32-bit big-endian integer
pub fn decode_u32(buf: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Incomplete);
    }
    Ok(unpack_uint(&buf.copy_to_bytes(4)))
}

/// Encode a single byte
pub fn encode_u8(buf: &mut BytesMut, value: u8) {
    pack_uint(buf, u32::from(value), 1);
}

/// Encode a 16-bit big-endian integer
pub fn encode_u16(buf: &mut BytesMut, value: u16) {
    pack_uint(buf, u32::from(value), 2);
}

/// Encode a 32-bit big-endian integer
pub fn encode_u32(buf: &mut BytesMut, value: u32) {
    pack_uint(buf, value, 4);
}

/// Generic frame type that can hold any PDU
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    // Session management PDUs
    Bind(Bind),
    BindResp(BindResponse),
    Unbind(Unbind),
    UnbindResp(UnbindResponse),
    EnquireLink(EnquireLink),
    EnquireLinkResp(EnquireLinkResponse),

    // Message PDUs
    SubmitSm(Box<SubmitSm>),
    SubmitSmResp(SubmitSmResponse),
    SubmitMulti(Box<SubmitMulti>),
    SubmitMultiResp(SubmitMultiResponse),
    DeliverSm(Box<DeliverSm>),
    DeliverSmResp(DeliverSmResponse),

    // Special PDUs
    GenericNack(GenericNack),

    // For unknown PDUs (forward compatibility)
    Unknown { header: PduHeader, body: Bytes },
}

/// A whole PDU read off the wire whose body has not been decoded yet.
///
/// The correlator inspects the header before paying for body decode; the
/// body bytes are already out of the stream either way.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPdu {
    pub header: PduHeader,
    pub body: Bytes,
}

impl RawPdu {
    /// Decode the body through the global registry.
    pub fn decode(&self) -> Result<Frame, CodecError> {
        PduRegistry::global().decode_pdu(self.header, &self.body)
    }
}

/// Registry of PDU decoders for extensible parsing
type DecoderFn = Box<dyn Fn(PduHeader, &mut Cursor<&[u8]>) -> Result<Frame, CodecError> + Send + Sync>;

pub struct PduRegistry {
    decoders: HashMap<CommandId, DecoderFn>,
}

static REGISTRY: LazyLock<PduRegistry> = LazyLock::new(PduRegistry::new);

impl PduRegistry {
    /// Create a new registry with the supported SMPP v3.4 PDUs registered
    pub fn new() -> Self {
        let mut registry = Self {
            decoders: HashMap::new(),
        };

        // Session management
        registry.register_pdu::<Bind, _>(Frame::Bind);
        registry.register_pdu::<BindResponse, _>(Frame::BindResp);
        registry.register_pdu::<Unbind, _>(Frame::Unbind);
        registry.register_pdu::<UnbindResponse, _>(Frame::UnbindResp);
        registry.register_pdu::<EnquireLink, _>(Frame::EnquireLink);
        registry.register_pdu::<EnquireLinkResponse, _>(Frame::EnquireLinkResp);
        registry.register_pdu::<GenericNack, _>(Frame::GenericNack);

        // Message PDUs (boxed for large structs)
        registry.register_pdu::<SubmitSm, _>(|pdu| Frame::SubmitSm(Box::new(pdu)));
        registry.register_pdu::<SubmitSmResponse, _>(Frame::SubmitSmResp);
        registry.register_pdu::<SubmitMulti, _>(|pdu| Frame::SubmitMulti(Box::new(pdu)));
        registry.register_pdu::<SubmitMultiResponse, _>(Frame::SubmitMultiResp);
        registry.register_pdu::<DeliverSm, _>(|pdu| Frame::DeliverSm(Box::new(pdu)));
        registry.register_pdu::<DeliverSmResponse, _>(Frame::DeliverSmResp);

        registry
    }

    /// The process-wide registry, built on first use.
    pub fn global() -> &'static PduRegistry {
        &REGISTRY
    }

    /// Register a PDU type under every command id it decodes
    fn register_pdu<T, F>(&mut self, frame_constructor: F)
    where
        T: Decodable + 'static,
        F: Fn(T) -> Frame + Send + Sync + Clone + 'static,
    {
        for &command_id in T::COMMAND_IDS {
            let constructor = frame_constructor.clone();
            let decoder = Box::new(move |header: PduHeader, buf: &mut Cursor<&[u8]>| {
                let pdu = T::decode(header, buf)?;
                Ok(constructor(pdu))
            });
            self.decoders.insert(command_id, decoder);
        }
    }

    /// Decode a PDU given its header and exactly `header.body_len()` body
    /// octets. A decoder that leaves octets behind is a framing error.
    pub fn decode_pdu(&self, header: PduHeader, body: &[u8]) -> Result<Frame, CodecError> {
        if body.len() != header.body_len() {
            return Err(CodecError::BodyLength {
                declared: header.body_len(),
                actual: body.len(),
            });
        }

        let Some(decoder) = self.decoders.get(&header.command_id) else {
            // Handle unknown PDU gracefully for forward compatibility
            tracing::warn!(
                "Unknown PDU command_id: {:#x}, treating as opaque data",
                u32::from(header.command_id)
            );
            return Ok(Frame::Unknown {
                header,
                body: Bytes::copy_from_slice(body),
            });
        };

        let mut cursor = Cursor::new(body);
        let frame = decoder(header, &mut cursor)?;

        if cursor.has_remaining() {
            return Err(CodecError::BodyLength {
                declared: header.body_len(),
                actual: header.body_len() - cursor.remaining(),
            });
        }

        Ok(frame)
    }

    /// Check if a command_id is registered
    pub fn is_registered(&self, command_id: CommandId) -> bool {
        self.decoders.contains_key(&command_id)
    }

    /// Get all registered command_ids
    pub fn registered_commands(&self) -> Vec<CommandId> {
        self.decoders.keys().copied().collect()
    }
}

impl Default for PduRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Get the command_id for this frame
    pub fn command_id(&self) -> CommandId {
        match self {
            Frame::Bind(pdu) => pdu.command_id(),
            Frame::BindResp(pdu) => pdu.command_id(),
            Frame::Unbind(pdu) => pdu.command_id(),
            Frame::UnbindResp(pdu) => pdu.command_id(),
            Frame::EnquireLink(pdu) => pdu.command_id(),
            Frame::EnquireLinkResp(pdu) => pdu.command_id(),
            Frame::SubmitSm(pdu) => pdu.command_id(),
            Frame::SubmitSmResp(pdu) => pdu.command_id(),
            Frame::SubmitMulti(pdu) => pdu.command_id(),
            Frame::SubmitMultiResp(pdu) => pdu.command_id(),
            Frame::DeliverSm(pdu) => pdu.command_id(),
            Frame::DeliverSmResp(pdu) => pdu.command_id(),
            Frame::GenericNack(pdu) => pdu.command_id(),
            Frame::Unknown { header, .. } => header.command_id,
        }
    }

    /// Get the sequence number for this frame
    pub fn sequence_number(&self) -> u32 {
        match self {
            Frame::Bind(pdu) => pdu.sequence_number,
            Frame::BindResp(pdu) => pdu.sequence_number,
            Frame::Unbind(pdu) => pdu.sequence_number,
            Frame::UnbindResp(pdu) => pdu.sequence_number,
            Frame::EnquireLink(pdu) => pdu.sequence_number,
            Frame::EnquireLinkResp(pdu) => pdu.sequence_number,
            Frame::SubmitSm(pdu) => pdu.sequence_number,
            Frame::SubmitSmResp(pdu) => pdu.sequence_number,
            Frame::SubmitMulti(pdu) => pdu.sequence_number,
            Frame::SubmitMultiResp(pdu) => pdu.sequence_number,
            Frame::DeliverSm(pdu) => pdu.sequence_number,
            Frame::DeliverSmResp(pdu) => pdu.sequence_number,
            Frame::GenericNack(pdu) => pdu.sequence_number,
            Frame::Unknown { header, .. } => header.sequence_number,
        }
    }

    /// Check if this frame is a response PDU
    pub fn is_response(&self) -> bool {
        self.command_id().is_response()
    }

    /// Encode any known frame. Unknown frames are written back verbatim.
    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        match self {
            Frame::Bind(pdu) => pdu.encode(buf),
            Frame::BindResp(pdu) => pdu.encode(buf),
            Frame::Unbind(pdu) => pdu.encode(buf),
            Frame::UnbindResp(pdu) => pdu.encode(buf),
            Frame::EnquireLink(pdu) => pdu.encode(buf),
            Frame::EnquireLinkResp(pdu) => pdu.encode(buf),
            Frame::SubmitSm(pdu) => pdu.encode(buf),
            Frame::SubmitSmResp(pdu) => pdu.encode(buf),
            Frame::SubmitMulti(pdu) => pdu.encode(buf),
            Frame::SubmitMultiResp(pdu) => pdu.encode(buf),
            Frame::DeliverSm(pdu) => pdu.encode(buf),
            Frame::DeliverSmResp(pdu) => pdu.encode(buf),
            Frame::GenericNack(pdu) => pdu.encode(buf),
            Frame::Unknown { header, body } => {
                let header = PduHeader {
                    command_length: (PduHeader::SIZE + body.len()) as u32,
                    ..*header
                };
                header.encode(buf);
                buf.put_slice(body);
                Ok(())
            }
        }
    }

    /// Check whether `buf` holds a complete PDU. Returns its command_length
    /// without advancing the cursor.
    pub fn check(buf: &mut Cursor<&[u8]>) -> Result<usize, CodecError> {
        // Check if we have enough bytes for a header
        if buf.remaining() < PduHeader::SIZE {
            return Err(CodecError::Incomplete);
        }

        let pos = buf.position();
        let header = PduHeader::decode(buf)?;
        buf.set_position(pos);

        header.validate_length()?;

        // Check if we have the complete PDU
        if buf.remaining() < header.command_length as usize {
            return Err(CodecError::Incomplete);
        }

        Ok(header.command_length as usize)
    }

    /// Split one complete PDU off the cursor without decoding its body.
    pub fn parse_raw(buf: &mut Cursor<&[u8]>) -> Result<RawPdu, CodecError> {
        Self::check(buf)?;

        let header = PduHeader::decode(buf)?;
        let body = buf.copy_to_bytes(header.body_len());

        Ok(RawPdu { header, body })
    }

    /// Parse and decode one complete PDU from the cursor.
    pub fn parse(buf: &mut Cursor<&[u8]>) -> Result<Frame, CodecError> {
        Self::parse_raw(buf)?.decode()
    }
}
