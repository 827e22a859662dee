mod bind;
mod command_id;
mod command_status;
mod data_coding;
mod deliver_sm;
mod enquire_link;
mod generic_nack;
mod interface_version;
mod numeric_plan_indicator;
mod priority_flag;
mod submit_multi;
mod submit_sm;
pub mod tlv;
mod type_of_number;
mod unbind;

use crate::client::error::ConfigError;
use crate::codec::CodecError;

pub use bind::{Bind, BindResponse, BindType};
pub use command_id::{CommandId, RESPONSE_MASK};
pub use command_status::CommandStatus;
pub use data_coding::DataCoding;
pub use deliver_sm::{DeliverSm, DeliverSmResponse};
pub use enquire_link::{EnquireLink, EnquireLinkResponse};
pub use generic_nack::GenericNack;
pub use interface_version::InterfaceVersion;
pub use numeric_plan_indicator::NumericPlanIndicator;
pub use priority_flag::PriorityFlag;
pub use submit_multi::{
    DestinationAddress, MAX_DESTINATIONS, SubmitMulti, SubmitMultiResponse, UnsuccessSmeAddress,
};
pub use submit_sm::{MessageBody, SubmitSm, SubmitSmResponse};
pub use tlv::{Tlv, TlvError, TlvTag, TlvValue, TlvWireType};
pub use type_of_number::TypeOfNumber;
pub use unbind::{Unbind, UnbindResponse};

// SMPP v3.4 field length limits (section 5.2), excluding the NUL terminator
pub const MAX_SYSTEM_ID_LENGTH: usize = 15;
pub const MAX_PASSWORD_LENGTH: usize = 8;
pub const MAX_SYSTEM_TYPE_LENGTH: usize = 12;
pub const MAX_ADDRESS_RANGE_LENGTH: usize = 40;
pub const MAX_SERVICE_TYPE_LENGTH: usize = 5;
pub const MAX_ADDRESS_LENGTH: usize = 20;
pub const MAX_DL_NAME_LENGTH: usize = 20;
pub const MAX_MESSAGE_ID_LENGTH: usize = 64;
pub const MAX_SHORT_MESSAGE_LENGTH: usize = 254;
/// schedule_delivery_time and validity_period are either empty or exactly
/// this long ("YYMMDDhhmmsstnnp").
pub const TIME_LENGTH: usize = 16;

pub(crate) fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ConfigError> {
    if value.as_bytes().contains(&0) {
        return Err(ConfigError::EmbeddedNul { field });
    }
    if value.len() > max {
        return Err(ConfigError::FieldTooLong {
            field,
            max,
            actual: value.len(),
        });
    }
    Ok(())
}

/// The sm_length octet for `message`. Anything over
/// [`MAX_SHORT_MESSAGE_LENGTH`] belongs in message_payload.
pub(crate) fn sm_length(message: &[u8]) -> Result<u8, CodecError> {
    match u8::try_from(message.len()) {
        Ok(length) if message.len() <= MAX_SHORT_MESSAGE_LENGTH => Ok(length),
        _ => Err(CodecError::FieldValidation {
            field: "short_message",
            reason: format!(
                "{} octets exceed the {MAX_SHORT_MESSAGE_LENGTH} octet limit, use message_payload",
                message.len()
            ),
        }),
    }
}

pub(crate) fn check_time(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.as_bytes().contains(&0) {
        return Err(ConfigError::EmbeddedNul { field });
    }
    if !value.is_empty() && value.len() != TIME_LENGTH {
        return Err(ConfigError::InvalidFieldLength {
            field,
            expected: TIME_LENGTH,
            actual: value.len(),
        });
    }
    Ok(())
}
