use crate::client::error::ConfigError;
use crate::codec::{
    CodecError, Decodable, Encodable, PduHeader, cstring_size, decode_cstring, decode_u8,
    encode_cstring, encode_u8,
};
use crate::datatypes::tlv::{Tlv, decode_tlvs, encode_tlvs, tlvs_size};
use crate::datatypes::{
    CommandId, CommandStatus, InterfaceVersion, MAX_ADDRESS_RANGE_LENGTH, MAX_PASSWORD_LENGTH,
    MAX_SYSTEM_ID_LENGTH, MAX_SYSTEM_TYPE_LENGTH, NumericPlanIndicator, TypeOfNumber,
    check_length,
};
use bytes::{Buf, BytesMut};
use std::fmt;
use std::io::Cursor;

/// The role an ESME binds as. It picks the bind command id and decides
/// which operations the bound session may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindType {
    /// Submit messages only
    Transmitter,
    /// Receive deliveries only
    Receiver,
    /// Both directions over one connection
    Transceiver,
}

impl BindType {
    /// Command id of the bind request for this role.
    pub fn command_id(&self) -> CommandId {
        match self {
            BindType::Transmitter => CommandId::BindTransmitter,
            BindType::Receiver => CommandId::BindReceiver,
            BindType::Transceiver => CommandId::BindTransceiver,
        }
    }

    /// Command id of the matching bind response.
    pub fn response_id(&self) -> CommandId {
        self.command_id().response()
    }

    /// Recover the role from a bind request or response command id.
    pub fn from_command_id(command_id: CommandId) -> Option<Self> {
        match command_id {
            CommandId::BindTransmitter | CommandId::BindTransmitterResp => {
                Some(BindType::Transmitter)
            }
            CommandId::BindReceiver | CommandId::BindReceiverResp => Some(BindType::Receiver),
            CommandId::BindTransceiver | CommandId::BindTransceiverResp => {
                Some(BindType::Transceiver)
            }
            _ => None,
        }
    }

    /// Whether a session bound in this role may perform `command`.
    pub fn allows(&self, command: CommandId) -> bool {
        match command {
            CommandId::SubmitSm | CommandId::SubmitMulti => {
                matches!(self, BindType::Transmitter | BindType::Transceiver)
            }
            CommandId::DeliverSm => matches!(self, BindType::Receiver | BindType::Transceiver),
            CommandId::Unbind | CommandId::EnquireLink | CommandId::GenericNack => true,
            _ => false,
        }
    }
}

impl fmt::Display for BindType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindType::Transmitter => "transmitter",
            BindType::Receiver => "receiver",
            BindType::Transceiver => "transceiver",
        };
        f.write_str(name)
    }
}

/// bind_transmitter, bind_receiver and bind_transceiver share one body.
#[derive(Clone, Debug, PartialEq)]
pub struct Bind {
    pub bind_type: BindType,
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    // Body
    /// 5.2.1 system_id: identifies the ESME requesting to bind.
    pub system_id: String,

    /// 5.2.2 password: used by the SMSC to authenticate the ESME. Empty
    ///       when no password is required.
    pub password: String,

    /// 5.2.3 system_type: categorises the ESME, e.g. "VMS" or "OTA".
    pub system_type: String,

    /// 5.2.4 interface_version: SMPP version supported by the ESME.
    pub interface_version: InterfaceVersion,

    /// 5.2.5 addr_ton: Type of Number of the ESME address(es) served via
    ///       this session.
    pub addr_ton: TypeOfNumber,

    /// 5.2.6 addr_npi: Numbering Plan Indicator of the ESME address(es).
    pub addr_npi: NumericPlanIndicator,

    /// 5.2.7 address_range: SME address range serviced by the ESME.
    pub address_range: String,
}

impl Bind {
    /// Check field lengths against their wire limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_length("system_id", &self.system_id, MAX_SYSTEM_ID_LENGTH)?;
        check_length("password", &self.password, MAX_PASSWORD_LENGTH)?;
        check_length("system_type", &self.system_type, MAX_SYSTEM_TYPE_LENGTH)?;
        check_length("address_range", &self.address_range, MAX_ADDRESS_RANGE_LENGTH)?;
        Ok(())
    }
}

impl Encodable for Bind {
    fn command_id(&self) -> CommandId {
        self.bind_type.command_id()
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn command_status(&self) -> CommandStatus {
        self.command_status
    }

    fn body_size(&self) -> usize {
        cstring_size(&self.system_id)
            + cstring_size(&self.password)
            + cstring_size(&self.system_type)
            + 3 // interface_version, addr_ton, addr_npi
            + cstring_size(&self.address_range)
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.system_id);
        encode_cstring(buf, &self.password);
        encode_cstring(buf, &self.system_type);
        encode_u8(buf, self.interface_version.into());
        encode_u8(buf, self.addr_ton.into());
        encode_u8(buf, self.addr_npi.into());
        encode_cstring(buf, &self.address_range);
        Ok(())
    }
}

impl Decodable for Bind {
    const COMMAND_IDS: &'static [CommandId] = &[
        CommandId::BindTransmitter,
        CommandId::BindReceiver,
        CommandId::BindTransceiver,
    ];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let bind_type = BindType::from_command_id(header.command_id).ok_or(
            CodecError::UnexpectedCommandId {
                expected: CommandId::BindTransmitter,
                actual: header.command_id,
            },
        )?;

        let system_id = decode_cstring(buf, MAX_SYSTEM_ID_LENGTH + 1, "system_id")?;
        let password = decode_cstring(buf, MAX_PASSWORD_LENGTH + 1, "password")?;
        let system_type = decode_cstring(buf, MAX_SYSTEM_TYPE_LENGTH + 1, "system_type")?;
        let version = decode_u8(buf)?;
        let interface_version =
            InterfaceVersion::try_from(version).map_err(|_| CodecError::FieldValidation {
                field: "interface_version",
                reason: format!("unsupported interface version {version:#04x}"),
            })?;
        let addr_ton = TypeOfNumber::from(decode_u8(buf)?);
        let addr_npi = NumericPlanIndicator::from(decode_u8(buf)?);
        let address_range = decode_cstring(buf, MAX_ADDRESS_RANGE_LENGTH + 1, "address_range")?;

        Ok(Bind {
            bind_type,
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            system_id,
            password,
            system_type,
            interface_version,
            addr_ton,
            addr_npi,
            address_range,
        })
    }
}

/// Response to any of the three bind requests.
#[derive(Clone, Debug, PartialEq)]
pub struct BindResponse {
    pub bind_type: BindType,
    pub command_status: CommandStatus,
    pub sequence_number: u32,

    // Body
    /// Identifies the SMSC. Absent when the bind was refused.
    pub system_id: String,

    /// Optional parameters, normally just sc_interface_version.
    pub tlvs: Vec<Tlv>,
}

impl BindResponse {
    pub fn new(bind_type: BindType, sequence_number: u32, system_id: &str) -> Self {
        Self {
            bind_type,
            command_status: CommandStatus::Ok,
            sequence_number,
            system_id: system_id.to_string(),
            tlvs: Vec::new(),
        }
    }
}

impl Encodable for BindResponse {
    fn command_id(&self) -> CommandId {
        self.bind_type.response_id()
    }

    fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    fn command_status(&self) -> CommandStatus {
        self.command_status
    }

    fn body_size(&self) -> usize {
        cstring_size(&self.system_id) + tlvs_size(&self.tlvs)
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.system_id);
        encode_tlvs(buf, &self.tlvs);
        Ok(())
    }
}

impl Decodable for BindResponse {
    const COMMAND_IDS: &'static [CommandId] = &[
        CommandId::BindTransmitterResp,
        CommandId::BindReceiverResp,
        CommandId::BindTransceiverResp,
    ];

    fn decode(header: PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Self::validate_header(&header)?;

        let bind_type = BindType::from_command_id(header.command_id).ok_or(
            CodecError::UnexpectedCommandId {
                expected: CommandId::BindTransmitterResp,
                actual: header.command_id,
            },
        )?;

        // A refused bind may come back header only.
        let system_id = if buf.has_remaining() {
            decode_cstring(buf, MAX_SYSTEM_ID_LENGTH + 1, "system_id")?
        } else {
            String::new()
        };
        let tlvs = decode_tlvs(buf)?;

        Ok(BindResponse {
            bind_type,
            command_status: header.command_status,
            sequence_number: header.sequence_number,
            system_id,
            tlvs,
        })
    }
}
