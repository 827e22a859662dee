use crate::codec::{
    CodecError, Decodable, Encodable, PduHeader, cstring_size, decode_cstring, encode_cstring,
};
use crate::datatypes::tlv::{Tlv, decode_tlvs, encode_tlvs, find_tlv, tlvs_size};
use crate::datatypes::{
    CommandId, CommandStatus, MAX_MESSAGE_ID_LENGTH, MessageBody, TlvTag,
};
use bytes::{Buf, BytesMut};
use std::io::Cursor;

/// deliver_sm is issued by the SMSC to send a message to an ESME: either a
/// mobile originated message or a delivery receipt (esm_class bit 2).
#[derive(Clone, Debug, PartialEq)]
pub struct DeliverSm {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    pub body: MessageBody,

    pub tlvs: Vec<Tlv>,
}

/// esm_class message type: SMSC delivery receipt
const ESM_CLASS_DELIVERY_RECEIPT: u8 = 0x04;

impl DeliverSm {
    pub fn new(sequence_number: u32, body: MessageBody, tlvs: Vec<Tlv>) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
            body,
            tlvs,
        }
    }

    pub fn is_delivery_receipt(&self) -> bool {
        self.body.esm_class & 0x3C == ESM_CLASS_DELIVERY_RECEIPT
    }

    /// The optional parameter with this tag, if present.
    pub fn tlv(&self, tag: TlvTag) -> Option<&Tlv> {
        find_tlv(&self.tlvs, tag)
    }

    /// Message content: message_payload when present, otherwise
    /// short_message.
    pub fn payload(&self) -> &[u8] {
        self.tlv(TlvTag::MessagePayload)
            .and_then(|tlv| tlv.value().as_bytes())
            .unwrap_or(&self.body.short_message[..])
    }
}

impl Encodable for DeliverSm {
    fn command_id(&self) -> CommandId {
        CommandId::DeliverSm
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn body_size(&self) -> usize {
        self.body.encoded_size() + tlvs_size(&self.tlvs)
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        self.body.encode(buf)?;
        encode_tlvs(buf, &self.tlvs);
        Ok(())
    }
}

impl Decodable for DeliverSm {
    const COMMAND_IDS: &'static [CommandId] = &[CommandId::DeliverSm];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        Ok(DeliverSm {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            body: MessageBody::decode(buf)?,
            tlvs: decode_tlvs(buf)?,
        })
    }
}

/// Acknowledges a deliver_sm. message_id is unused and sent empty.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliverSmResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
    pub message_id: String,
}

impl DeliverSmResponse {
    pub fn new(sequence_number: u32) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
            message_id: String::new(),
        }
    }
}

impl Encodable for DeliverSmResponse {
    fn command_id(&self) -> CommandId {
        CommandId::DeliverSmResp
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn command_status(&self) -> CommandStatus {
        self.command_status
    }

    fn body_size(&self) -> usize {
        cstring_size(&self.message_id)
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id);
        Ok(())
    }
}

impl Decodable for DeliverSmResponse {
    const COMMAND_IDS: &'static [CommandId] = &[CommandId::DeliverSmResp];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let message_id = if buf.has_remaining() {
            decode_cstring(buf, MAX_MESSAGE_ID_LENGTH + 1, "message_id")?
        } else {
            String::new()
        };

        Ok(DeliverSmResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            message_id,
        })
    }
}
