// ABOUTME: Configuration and result types for SMPP sessions
// ABOUTME: Bind credentials, submission parameters with documented defaults, and submit outcomes

use crate::client::error::ConfigError;
use crate::datatypes::{
    Bind, BindType, CommandStatus, DataCoding, DestinationAddress, InterfaceVersion,
    MAX_SHORT_MESSAGE_LENGTH, MessageBody, NumericPlanIndicator, PriorityFlag, SubmitMulti, Tlv,
    TypeOfNumber, UnsuccessSmeAddress,
};
use crate::macros::builder_setters;
use bytes::Bytes;

/// Credentials and addressing sent in a bind request.
#[derive(Debug, Clone, PartialEq)]
pub struct BindCredentials {
    /// System identifier for authentication
    pub system_id: String,
    /// Password for authentication
    pub password: String,
    /// ESME category, empty when not required
    pub system_type: String,
    /// Type of bind operation
    pub bind_type: BindType,
    pub addr_ton: TypeOfNumber,
    pub addr_npi: NumericPlanIndicator,
    /// Range of SME addresses served, empty for none
    pub address_range: String,
}

impl BindCredentials {
    pub fn new(
        bind_type: BindType,
        system_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            system_id: system_id.into(),
            password: password.into(),
            system_type: String::new(),
            bind_type,
            addr_ton: TypeOfNumber::Unknown,
            addr_npi: NumericPlanIndicator::Unknown,
            address_range: String::new(),
        }
    }

    /// Create new bind credentials for transmitter session
    pub fn transmitter(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(BindType::Transmitter, system_id, password)
    }

    /// Create new bind credentials for receiver session
    pub fn receiver(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(BindType::Receiver, system_id, password)
    }

    /// Create new bind credentials for transceiver session
    pub fn transceiver(system_id: impl Into<String>, password: impl Into<String>) -> Self {
        Self::new(BindType::Transceiver, system_id, password)
    }

    /// Set system type
    pub fn with_system_type(mut self, system_type: impl Into<String>) -> Self {
        self.system_type = system_type.into();
        self
    }

    /// Set the address range served by this ESME
    pub fn with_address_range(
        mut self,
        ton: TypeOfNumber,
        npi: NumericPlanIndicator,
        range: impl Into<String>,
    ) -> Self {
        self.addr_ton = ton;
        self.addr_npi = npi;
        self.address_range = range.into();
        self
    }

    /// The bind request for these credentials. Interface version is always 3.4.
    pub fn to_pdu(&self, sequence_number: u32) -> Bind {
        Bind {
            bind_type: self.bind_type,
            command_status: CommandStatus::Ok,
            sequence_number,
            system_id: self.system_id.clone(),
            password: self.password.clone(),
            system_type: self.system_type.clone(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: self.addr_ton,
            addr_npi: self.addr_npi,
            address_range: self.address_range.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.system_id.is_empty() {
            return Err(ConfigError::MissingField("system_id"));
        }
        self.to_pdu(0).validate()
    }
}

/// Mandatory submit_sm / submit_multi fields other than addresses and
/// message content.
///
/// Unset fields take the values in [`SubmitParams::DEFAULT`]. Every
/// builder produces a fresh struct; the defaults themselves are a constant
/// and cannot be modified.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitParams {
    pub service_type: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: String,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: PriorityFlag,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: DataCoding,
    pub sm_default_msg_id: u8,
}

impl SubmitParams {
    /// Submission defaults: empty strings, unknown TON/NPI, zero flags,
    /// priority level 0 and Latin-1 data coding.
    pub const DEFAULT: SubmitParams = SubmitParams {
        service_type: String::new(),
        source_addr_ton: TypeOfNumber::Unknown,
        source_addr_npi: NumericPlanIndicator::Unknown,
        source_addr: String::new(),
        dest_addr_ton: TypeOfNumber::Unknown,
        dest_addr_npi: NumericPlanIndicator::Unknown,
        esm_class: 0,
        protocol_id: 0,
        priority_flag: PriorityFlag::Level0,
        schedule_delivery_time: String::new(),
        validity_period: String::new(),
        registered_delivery: 0,
        replace_if_present_flag: 0,
        data_coding: DataCoding::Latin1,
        sm_default_msg_id: 0,
    };

    pub fn builder() -> SubmitParamsBuilder {
        SubmitParamsBuilder::default()
    }

    /// The submit_sm / deliver_sm body for one destination.
    pub fn message_body(&self, destination: &str, message: &[u8]) -> MessageBody {
        MessageBody {
            service_type: self.service_type.clone(),
            source_addr_ton: self.source_addr_ton,
            source_addr_npi: self.source_addr_npi,
            source_addr: self.source_addr.clone(),
            dest_addr_ton: self.dest_addr_ton,
            dest_addr_npi: self.dest_addr_npi,
            destination_addr: destination.to_string(),
            esm_class: self.esm_class,
            protocol_id: self.protocol_id,
            priority_flag: self.priority_flag,
            schedule_delivery_time: self.schedule_delivery_time.clone(),
            validity_period: self.validity_period.clone(),
            registered_delivery: self.registered_delivery,
            replace_if_present_flag: self.replace_if_present_flag,
            data_coding: self.data_coding,
            sm_default_msg_id: self.sm_default_msg_id,
            short_message: Bytes::copy_from_slice(message),
        }
    }

    /// A submit_multi carrying these parameters. SME destinations use
    /// `dest_addr_ton` / `dest_addr_npi`.
    pub fn submit_multi(
        &self,
        sequence_number: u32,
        numbers: &[&str],
        lists: &[&str],
        message: &[u8],
        tlvs: Vec<Tlv>,
    ) -> SubmitMulti {
        let destinations = numbers
            .iter()
            .map(|number| {
                DestinationAddress::sme_address(self.dest_addr_ton, self.dest_addr_npi, number)
            })
            .chain(lists.iter().map(|name| DestinationAddress::distribution_list(name)))
            .collect();

        SubmitMulti {
            command_status: CommandStatus::Ok,
            sequence_number,
            service_type: self.service_type.clone(),
            source_addr_ton: self.source_addr_ton,
            source_addr_npi: self.source_addr_npi,
            source_addr: self.source_addr.clone(),
            destinations,
            esm_class: self.esm_class,
            protocol_id: self.protocol_id,
            priority_flag: self.priority_flag,
            schedule_delivery_time: self.schedule_delivery_time.clone(),
            validity_period: self.validity_period.clone(),
            registered_delivery: self.registered_delivery,
            replace_if_present_flag: self.replace_if_present_flag,
            data_coding: self.data_coding,
            sm_default_msg_id: self.sm_default_msg_id,
            short_message: Bytes::copy_from_slice(message),
            tlvs,
        }
    }
}

impl Default for SubmitParams {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Builder over [`SubmitParams::DEFAULT`].
#[derive(Debug, Clone)]
pub struct SubmitParamsBuilder {
    params: SubmitParams,
}

impl Default for SubmitParamsBuilder {
    fn default() -> Self {
        Self {
            params: SubmitParams::DEFAULT,
        }
    }
}

impl SubmitParamsBuilder {
    builder_setters!(params;
        source_addr_ton: TypeOfNumber,
        source_addr_npi: NumericPlanIndicator,
        dest_addr_ton: TypeOfNumber,
        dest_addr_npi: NumericPlanIndicator,
        esm_class: u8,
        protocol_id: u8,
        priority_flag: PriorityFlag,
        registered_delivery: u8,
        replace_if_present_flag: u8,
        data_coding: DataCoding,
        sm_default_msg_id: u8,
    );

    pub fn service_type(mut self, service_type: impl Into<String>) -> Self {
        self.params.service_type = service_type.into();
        self
    }

    pub fn source_addr(mut self, source_addr: impl Into<String>) -> Self {
        self.params.source_addr = source_addr.into();
        self
    }

    pub fn schedule_delivery_time(mut self, time: impl Into<String>) -> Self {
        self.params.schedule_delivery_time = time.into();
        self
    }

    pub fn validity_period(mut self, period: impl Into<String>) -> Self {
        self.params.validity_period = period.into();
        self
    }

    /// Build the parameters, checking field lengths.
    pub fn build(self) -> Result<SubmitParams, ConfigError> {
        self.params.message_body("", &[]).validate()?;
        Ok(self.params)
    }
}

/// Simplified SMS message for easy client usage
///
/// Provides a high-level interface over submit_sm with the submission
/// defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct SmsMessage {
    /// Destination phone number
    pub to: String,
    /// Source phone number
    pub from: String,
    /// Message text content
    pub text: String,
    /// Remaining submit_sm fields
    pub params: SubmitParams,
}

impl SmsMessage {
    /// Create a new SMS message with default options
    pub fn new(to: impl Into<String>, from: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
            text: text.into(),
            params: SubmitParams::DEFAULT,
        }
    }

    /// Create a builder for constructing SMS messages
    pub fn builder() -> SmsMessageBuilder {
        SmsMessageBuilder::default()
    }

    /// Submission parameters with the source address applied.
    pub fn submit_params(&self) -> SubmitParams {
        SubmitParams {
            source_addr: self.from.clone(),
            ..self.params.clone()
        }
    }
}

/// Builder for constructing SMS messages with fluent API
#[derive(Debug, Default)]
pub struct SmsMessageBuilder {
    to: Option<String>,
    from: Option<String>,
    text: Option<String>,
    params: SubmitParams,
}

impl SmsMessageBuilder {
    /// Set destination phone number
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Set source phone number
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set message text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set message priority
    pub fn priority(mut self, priority: PriorityFlag) -> Self {
        self.params.priority_flag = priority;
        self
    }

    /// Set data coding scheme
    pub fn data_coding(mut self, data_coding: DataCoding) -> Self {
        self.params.data_coding = data_coding;
        self
    }

    /// Request delivery receipt
    pub fn with_delivery_receipt(mut self) -> Self {
        self.params.registered_delivery = 1;
        self
    }

    /// Set source address numbering
    pub fn source_numbering(mut self, ton: TypeOfNumber, npi: NumericPlanIndicator) -> Self {
        self.params.source_addr_ton = ton;
        self.params.source_addr_npi = npi;
        self
    }

    /// Set destination address numbering
    pub fn dest_numbering(mut self, ton: TypeOfNumber, npi: NumericPlanIndicator) -> Self {
        self.params.dest_addr_ton = ton;
        self.params.dest_addr_npi = npi;
        self
    }

    /// Build the SMS message
    pub fn build(self) -> Result<SmsMessage, ConfigError> {
        let to = self.to.ok_or(ConfigError::MissingField("to"))?;
        let text = self.text.ok_or(ConfigError::MissingField("text"))?;

        if text.len() > MAX_SHORT_MESSAGE_LENGTH {
            return Err(ConfigError::FieldTooLong {
                field: "short_message",
                max: MAX_SHORT_MESSAGE_LENGTH,
                actual: text.len(),
            });
        }

        Ok(SmsMessage {
            to,
            from: self.from.unwrap_or_default(),
            text,
            params: self.params,
        })
    }
}

/// How submissions wait for their responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitMode {
    /// Each submit waits for its response before returning.
    #[default]
    Sync,
    /// Submits return the sequence number at once; responses are collected
    /// later by sequence.
    Async,
}

/// Per-session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    pub mode: SubmitMode,
}

impl SessionOptions {
    pub fn asynchronous() -> Self {
        Self {
            mode: SubmitMode::Async,
        }
    }
}

/// Result of a submit_sm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The SMSC accepted the message.
    Accepted { sequence: u32, message_id: String },
    /// Sent in async mode; the response is still outstanding.
    Pending { sequence: u32 },
}

impl SubmitOutcome {
    pub fn sequence(&self) -> u32 {
        match self {
            SubmitOutcome::Accepted { sequence, .. } | SubmitOutcome::Pending { sequence } => {
                *sequence
            }
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Accepted { message_id, .. } => Some(message_id),
            SubmitOutcome::Pending { .. } => None,
        }
    }
}

/// Result of a submit_multi.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitMultiOutcome {
    /// Accepted for at least some destinations; refused ones are listed.
    Accepted {
        sequence: u32,
        message_id: String,
        unsuccessful: Vec<UnsuccessSmeAddress>,
    },
    Pending { sequence: u32 },
}

impl SubmitMultiOutcome {
    pub fn sequence(&self) -> u32 {
        match self {
            SubmitMultiOutcome::Accepted { sequence, .. }
            | SubmitMultiOutcome::Pending { sequence } => *sequence,
        }
    }
}
