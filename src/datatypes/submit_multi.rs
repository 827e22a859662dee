// ABOUTME: Implements SMPP v3.4 submit_multi and submit_multi_resp PDUs for multi-destination messaging
// ABOUTME: Destinations mix SME addresses (flag 1) and distribution lists (flag 2)

use crate::client::error::ConfigError;
use crate::codec::{
    CodecError, Decodable, Encodable, PduHeader, cstring_size, decode_cstring, decode_u8,
    decode_u32, encode_cstring, encode_u8, encode_u32,
};
use crate::datatypes::tlv::{Tlv, decode_tlvs, encode_tlvs, tlvs_size};
use crate::datatypes::{
    CommandId, CommandStatus, DataCoding, MAX_ADDRESS_LENGTH, MAX_DL_NAME_LENGTH,
    MAX_MESSAGE_ID_LENGTH, MAX_SERVICE_TYPE_LENGTH, MAX_SHORT_MESSAGE_LENGTH,
    NumericPlanIndicator, PriorityFlag, TIME_LENGTH, TypeOfNumber, check_length, check_time,
    sm_length,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;

/// Upper bound on destinations in one submit_multi.
pub const MAX_DESTINATIONS: usize = 254;

const DEST_FLAG_SME_ADDRESS: u8 = 1;
const DEST_FLAG_DISTRIBUTION_LIST: u8 = 2;

/// SMPP v3.4 destination address types for submit_multi
#[derive(Clone, Debug, PartialEq)]
pub enum DestinationAddress {
    /// Standard destination address (SME address)
    SmeAddress {
        dest_addr_ton: TypeOfNumber,
        dest_addr_npi: NumericPlanIndicator,
        destination_addr: String,
    },
    /// Distribution list held on the SMSC
    DistributionList { dl_name: String },
}

impl DestinationAddress {
    pub fn sme_address(
        dest_addr_ton: TypeOfNumber,
        dest_addr_npi: NumericPlanIndicator,
        destination_addr: &str,
    ) -> Self {
        DestinationAddress::SmeAddress {
            dest_addr_ton,
            dest_addr_npi,
            destination_addr: destination_addr.to_string(),
        }
    }

    pub fn distribution_list(dl_name: &str) -> Self {
        DestinationAddress::DistributionList {
            dl_name: dl_name.to_string(),
        }
    }

    /// Get the destination flag value
    pub fn dest_flag(&self) -> u8 {
        match self {
            DestinationAddress::SmeAddress { .. } => DEST_FLAG_SME_ADDRESS,
            DestinationAddress::DistributionList { .. } => DEST_FLAG_DISTRIBUTION_LIST,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            DestinationAddress::SmeAddress {
                destination_addr, ..
            } => check_length("destination_addr", destination_addr, MAX_ADDRESS_LENGTH),
            DestinationAddress::DistributionList { dl_name } => {
                check_length("dl_name", dl_name, MAX_DL_NAME_LENGTH)
            }
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u8(buf, self.dest_flag());
        match self {
            DestinationAddress::SmeAddress {
                dest_addr_ton,
                dest_addr_npi,
                destination_addr,
            } => {
                encode_u8(buf, (*dest_addr_ton).into());
                encode_u8(buf, (*dest_addr_npi).into());
                encode_cstring(buf, destination_addr);
            }
            DestinationAddress::DistributionList { dl_name } => {
                encode_cstring(buf, dl_name);
            }
        }
    }

    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let dest_flag = decode_u8(buf)?;

        match dest_flag {
            DEST_FLAG_SME_ADDRESS => {
                let dest_addr_ton = TypeOfNumber::from(decode_u8(buf)?);
                let dest_addr_npi = NumericPlanIndicator::from(decode_u8(buf)?);
                let destination_addr =
                    decode_cstring(buf, MAX_ADDRESS_LENGTH + 1, "destination_addr")?;

                Ok(DestinationAddress::SmeAddress {
                    dest_addr_ton,
                    dest_addr_npi,
                    destination_addr,
                })
            }
            DEST_FLAG_DISTRIBUTION_LIST => {
                let dl_name = decode_cstring(buf, MAX_DL_NAME_LENGTH + 1, "dl_name")?;
                Ok(DestinationAddress::DistributionList { dl_name })
            }
            _ => Err(CodecError::FieldValidation {
                field: "dest_flag",
                reason: format!("Invalid destination flag: {dest_flag}, expected 1 or 2"),
            }),
        }
    }

    /// SME entries take len+4 octets, distribution lists len+2.
    pub fn encoded_size(&self) -> usize {
        match self {
            DestinationAddress::SmeAddress {
                destination_addr, ..
            } => 3 + cstring_size(destination_addr),
            DestinationAddress::DistributionList { dl_name } => 1 + cstring_size(dl_name),
        }
    }
}

/// SMPP v3.4 submit_multi PDU (Section 4.5.1): one message to up to 254
/// destinations.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitMulti {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    pub service_type: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: String,

    /// number_of_dests is derived from this list.
    pub destinations: Vec<DestinationAddress>,

    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: PriorityFlag,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
    pub short_message: Bytes,

    pub tlvs: Vec<Tlv>,
}

impl SubmitMulti {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destinations.is_empty() || self.destinations.len() > MAX_DESTINATIONS {
            return Err(ConfigError::DestinationCount {
                count: self.destinations.len(),
                max: MAX_DESTINATIONS,
            });
        }
        for destination in &self.destinations {
            destination.validate()?;
        }

        check_length("service_type", &self.service_type, MAX_SERVICE_TYPE_LENGTH)?;
        check_length("source_addr", &self.source_addr, MAX_ADDRESS_LENGTH)?;
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

    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }
}

impl Encodable for SubmitMulti {
    fn command_id(&self) -> CommandId {
        CommandId::SubmitMulti
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn body_size(&self) -> usize {
        cstring_size(&self.service_type)
            + 2 // source_addr_ton, source_addr_npi
            + cstring_size(&self.source_addr)
            + 1 // number_of_dests
            + self.destinations.iter().map(DestinationAddress::encoded_size).sum::<usize>()
            + 3 // esm_class, protocol_id, priority_flag
            + cstring_size(&self.schedule_delivery_time)
            + cstring_size(&self.validity_period)
            + 5 // registered_delivery .. sm_length
            + self.short_message.len()
            + tlvs_size(&self.tlvs)
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let number_of_dests =
            u8::try_from(self.destinations.len()).map_err(|_| CodecError::FieldValidation {
                field: "number_of_dests",
                reason: format!("{} destinations", self.destinations.len()),
            })?;
        let sm_length = sm_length(&self.short_message)?;

        encode_cstring(buf, &self.service_type);
        encode_u8(buf, self.source_addr_ton.into());
        encode_u8(buf, self.source_addr_npi.into());
        encode_cstring(buf, &self.source_addr);

        encode_u8(buf, number_of_dests);
        for destination in &self.destinations {
            destination.encode(buf);
        }

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

        encode_tlvs(buf, &self.tlvs);
        Ok(())
    }
}

impl Decodable for SubmitMulti {
    const COMMAND_IDS: &'static [CommandId] = &[CommandId::SubmitMulti];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let service_type = decode_cstring(buf, MAX_SERVICE_TYPE_LENGTH + 1, "service_type")?;
        let source_addr_ton = TypeOfNumber::from(decode_u8(buf)?);
        let source_addr_npi = NumericPlanIndicator::from(decode_u8(buf)?);
        let source_addr = decode_cstring(buf, MAX_ADDRESS_LENGTH + 1, "source_addr")?;

        let number_of_dests = decode_u8(buf)?;
        let destinations = (0..number_of_dests)
            .map(|_| DestinationAddress::decode(buf))
            .collect::<Result<Vec<_>, _>>()?;

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
        let tlvs = decode_tlvs(buf)?;

        Ok(SubmitMulti {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            service_type,
            source_addr_ton,
            source_addr_npi,
            source_addr,
            destinations,
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
            tlvs,
        })
    }
}

/// A destination the SMSC refused, with the reason.
#[derive(Clone, Debug, PartialEq)]
pub struct UnsuccessSmeAddress {
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    pub destination_addr: String,
    pub error_status_code: CommandStatus,
}

impl UnsuccessSmeAddress {
    pub fn new(
        dest_addr_ton: TypeOfNumber,
        dest_addr_npi: NumericPlanIndicator,
        destination_addr: &str,
        error_status_code: CommandStatus,
    ) -> Self {
        UnsuccessSmeAddress {
            dest_addr_ton,
            dest_addr_npi,
            destination_addr: destination_addr.to_string(),
            error_status_code,
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u8(buf, self.dest_addr_ton.into());
        encode_u8(buf, self.dest_addr_npi.into());
        encode_cstring(buf, &self.destination_addr);
        encode_u32(buf, self.error_status_code.code());
    }

    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let dest_addr_ton = TypeOfNumber::from(decode_u8(buf)?);
        let dest_addr_npi = NumericPlanIndicator::from(decode_u8(buf)?);
        let destination_addr = decode_cstring(buf, MAX_ADDRESS_LENGTH + 1, "destination_addr")?;
        let error_status_code = CommandStatus::from(decode_u32(buf)?);

        Ok(UnsuccessSmeAddress {
            dest_addr_ton,
            dest_addr_npi,
            destination_addr,
            error_status_code,
        })
    }

    pub fn encoded_size(&self) -> usize {
        2 + cstring_size(&self.destination_addr) + 4
    }
}

/// SMPP v3.4 submit_multi_resp PDU (Section 4.5.2)
///
/// If the message was accepted for every destination only the message_id
/// is returned; otherwise each refused destination is listed with its
/// error code.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmitMultiResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    /// Message ID assigned by the SMSC. Empty if all destinations failed.
    pub message_id: String,

    /// no_unsuccess is derived from this list.
    pub unsuccess_sme: Vec<UnsuccessSmeAddress>,
}

impl SubmitMultiResponse {
    /// Create a successful SubmitMultiResponse (all destinations succeeded)
    pub fn success(sequence_number: u32, message_id: &str) -> Self {
        SubmitMultiResponse {
            command_status: CommandStatus::Ok,
            sequence_number,
            message_id: message_id.to_string(),
            unsuccess_sme: Vec::new(),
        }
    }

    pub fn is_complete_success(&self) -> bool {
        self.command_status.is_ok() && self.unsuccess_sme.is_empty()
    }
}

impl Encodable for SubmitMultiResponse {
    fn command_id(&self) -> CommandId {
        CommandId::SubmitMultiResp
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn command_status(&self) -> CommandStatus {
        self.command_status
    }

    fn body_size(&self) -> usize {
        cstring_size(&self.message_id)
            + 1
            + self
                .unsuccess_sme
                .iter()
                .map(UnsuccessSmeAddress::encoded_size)
                .sum::<usize>()
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        let no_unsuccess =
            u8::try_from(self.unsuccess_sme.len()).map_err(|_| CodecError::FieldValidation {
                field: "no_unsuccess",
                reason: format!("{} unsuccessful addresses", self.unsuccess_sme.len()),
            })?;

        encode_cstring(buf, &self.message_id);
        encode_u8(buf, no_unsuccess);
        for address in &self.unsuccess_sme {
            address.encode(buf);
        }
        Ok(())
    }
}

impl Decodable for SubmitMultiResponse {
    const COMMAND_IDS: &'static [CommandId] = &[CommandId::SubmitMultiResp];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        if !buf.has_remaining() {
            return Ok(SubmitMultiResponse {
                command_status: header.command_status,
                sequence_number: header.sequence_number,
                message_id: String::new(),
                unsuccess_sme: Vec::new(),
            });
        }

        let message_id = decode_cstring(buf, MAX_MESSAGE_ID_LENGTH + 1, "message_id")?;
        let no_unsuccess = decode_u8(buf)?;
        let unsuccess_sme = (0..no_unsuccess)
            .map(|_| UnsuccessSmeAddress::decode(buf))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubmitMultiResponse {
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            message_id,
            unsuccess_sme,
        })
    }
}
