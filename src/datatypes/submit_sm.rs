use crate::client::error::ConfigError;
use crate::codec::{
    CodecError, Decodable, Encodable, PduHeader, cstring_size, decode_cstring, decode_u8,
    encode_cstring, encode_u8,
};
use crate::datatypes::tlv::{Tlv, decode_tlvs, encode_tlvs, tlvs_size};
use crate::datatypes::{
    CommandId, CommandStatus, DataCoding, MAX_ADDRESS_LENGTH, MAX_MESSAGE_ID_LENGTH,
    MAX_SERVICE_TYPE_LENGTH, MAX_SHORT_MESSAGE_LENGTH, NumericPlanIndicator, PriorityFlag,
    TIME_LENGTH, TypeOfNumber, check_length, check_time, sm_length,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

/// Mandatory body shared by submit_sm and deliver_sm (sections 4.4.1 and
/// 4.6.1); both PDUs lay these fields out identically.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageBody {
    /// service_type: SMS application service associated with the message.
    ///       Empty for the SMSC default. Max 5 octets.
    pub service_type: String,

    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,

    /// source_addr: address of the originating SME. Max 20 octets.
    pub source_addr: String,

    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,

    /// destination_addr: for mobile terminated messages, the directory
    ///       number of the recipient MS. Max 20 octets.
    pub destination_addr: String,

    /// esm_class: message mode and message type bits.
    pub esm_class: u8,

    /// protocol_id: network specific protocol identifier.
    pub protocol_id: u8,

    pub priority_flag: PriorityFlag,

    /// schedule_delivery_time: empty for immediate delivery, otherwise
    ///       16 octets in "YYMMDDhhmmsstnnp" format.
    pub schedule_delivery_time: String,

    /// validity_period: empty for the SMSC default, otherwise 16 octets.
    pub validity_period: String,

    /// registered_delivery: receipt and acknowledgement request bits.
    pub registered_delivery: u8,

    pub replace_if_present_flag: u8,

    pub data_coding: DataCoding,

    /// sm_default_msg_id: index of a canned message, 0 if unused.
    pub sm_default_msg_id: u8,

    /// short_message: up to 254 octets of user data; sm_length is derived.
    pub short_message: Bytes,
}

impl MessageBody {
    /// Check field lengths against their wire limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_length("service_type", &self.service_type, MAX_SERVICE_TYPE_LENGTH)?;
        check_length("source_addr", &self.source_addr, MAX_ADDRESS_LENGTH)?;
        check_length("destination_addr", &self.destination_addr, MAX_ADDRESS_LENGTH)?;
        check_time("schedule_delivery_time", &self.schedule_delivery_time)?;
        check_time("validity_period", &self.validity_period)?;

        if self.short_message.len() > MAX_SHORT_MESSAGE_LENGTH {
            return Err(ConfigError::FieldTooLong {
                field: "short_message",
                max: MAX_SHORT_MESSAGE_LENGTH,
                actual: self.short_message.len(),
            });
        }
        Ok(())
    }

    pub fn encoded_size(&self) -> usize {
        cstring_size(&self.service_type)
            + 2 // source_addr_ton, source_addr_npi
            + cstring_size(&self.source_addr)
            + 2 // dest_addr_ton, dest_addr_npi
            + cstring_size(&self.destination_addr)
            + 3 // esm_class, protocol_id, priority_flag
            + cstring_size(&self.schedule_delivery_time)
            + cstring_size(&self.validity_period)
            + 5 // registered_delivery .. sm_length
            + self.short_message.len()
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let sm_length = sm_length(&self.short_message)?;

        encode_cstring(buf, &self.service_type);
        encode_u8(buf, self.source_addr_ton.into());
        encode_u8(buf, self.source_addr_npi.into());
        encode_cstring(buf, &self.source_addr);
        encode_u8(buf, self.dest_addr_ton.into());
        encode_u8(buf, self.dest_addr_npi.into());
        encode_cstring(buf, &self.destination_addr);
        encode_u8(buf, self.esm_class);
        encode_u8(buf, self.protocol_id);
        encode_u8(buf, self.priority_flag.into());
        encode_cstring(buf, &self.schedule_delivery_time);
        encode_cstring(buf, &self.validity_period);
        encode_u8(buf, self.registered_delivery);
        encode_u8(buf, self.replace_if_present_flag);
        encode_u8(buf, self.data_coding.into());
        encode_u8(buf, self.sm_default_msg_id);
        encode_u8(buf, sm_length);
        buf.put_slice(&self.short_message);
        Ok(())
    }

    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let service_type = decode_cstring(buf, MAX_SERVICE_TYPE_LENGTH + 1, "service_type")?;
        let source_addr_ton = TypeOfNumber::from(decode_u8(buf)?);
        let source_addr_npi = NumericPlanIndicator::from(decode_u8(buf)?);
        let source_addr = decode_cstring(buf, MAX_ADDRESS_LENGTH + 1, "source_addr")?;
        let dest_addr_ton = TypeOfNumber::from(decode_u8(buf)?);
        let dest_addr_npi = NumericPlanIndicator::from(decode_u8(buf)?);
        let destination_addr = decode_cstring(buf, MAX_ADDRESS_LENGTH + 1, "destination_addr")?;
        let esm_class = decode_u8(buf)?;
        let protocol_id = decode_u8(buf)?;
        let priority = decode_u8(buf)?;
        let priority_flag =
            PriorityFlag::try_from(priority).map_err(|_| CodecError::FieldValidation {
                field: "priority_flag",
                reason: format!("reserved priority level {priority}"),
            })?;
        let schedule_delivery_time =
            decode_cstring(buf, TIME_LENGTH + 1, "schedule_delivery_time")?;
        let validity_period = decode_cstring(buf, TIME_LENGTH + 1, "validity_period")?;
        let registered_delivery = decode_u8(buf)?;
        let replace_if_present_flag = decode_u8(buf)?;
        let data_coding = DataCoding::from(decode_u8(buf)?);
        let sm_default_msg_id = decode_u8(buf)?;
        let sm_length = usize::from(decode_u8(buf)?);

        if buf.remaining() < sm_length {
            return Err(CodecError::FieldValidation {
                field: "short_message",
                reason: format!(
                    "sm_length is {sm_length} but only {} octets remain",
                    buf.remaining()
                ),
            });
        }
        let short_message = buf.copy_to_bytes(sm_length);

        Ok(MessageBody {
            service_type,
            source_addr_ton,
            source_addr_npi,
            source_addr,
            dest_addr_ton,
            dest_addr_npi,
            destination_addr,
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present_flag,
            data_coding,
            sm_default_msg_id,
            short_message,
        })
    }
}

/// This operation is used by an ESME to submit a short message to the SMSC for onward transmission
/// to a specified short message entity (SME). The submit_sm PDU does not support the transaction
/// message mode.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitSm {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    pub body: MessageBody,

    /// Optional parameters, written after the mandatory body in order.
    pub tlvs: Vec<Tlv>,
}

impl SubmitSm {
    pub fn new(sequence_number: u32, body: MessageBody, tlvs: Vec<Tlv>) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
            body,
            tlvs,
        }
    }
}

impl Encodable for SubmitSm {
    fn command_id(&self) -> CommandId {
        CommandId::SubmitSm
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

impl Decodable for SubmitSm {
    const COMMAND_IDS: &'static [CommandId] = &[CommandId::SubmitSm];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        Ok(SubmitSm {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            body: MessageBody::decode(buf)?,
            tlvs: decode_tlvs(buf)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitSmResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    /// SMSC assigned identifier of the submitted message. Empty when the
    /// submission was rejected.
    pub message_id: String,
}

impl SubmitSmResponse {
    pub fn new(sequence_number: u32, message_id: &str) -> Self {
        Self {
            command_status: CommandStatus::Ok,
            sequence_number,
            message_id: message_id.to_string(),
        }
    }
}

impl Encodable for SubmitSmResponse {
    fn command_id(&self) -> CommandId {
        CommandId::SubmitSmResp
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

impl Decodable for SubmitSmResponse {
    const COMMAND_IDS: &'static [CommandId] = &[CommandId::SubmitSmResp];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        // Body is omitted on error status.
        let message_id = if buf.has_remaining() {
            decode_cstring(buf, MAX_MESSAGE_ID_LENGTH + 1, "message_id")?
        } else {
            String::new()
        };

        Ok(SubmitSmResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            message_id,
        })
    }
}
