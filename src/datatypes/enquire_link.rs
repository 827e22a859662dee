use crate::datatypes::{CommandId, CommandStatus};
use crate::macros::impl_complete_header_only_pdu;

/// enquire_link probes the peer at application level. Either side may send
/// it at any time after bind; the receiver answers with enquire_link_resp.
#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLink {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnquireLinkResponse {
    pub command_status: CommandStatus,
    pub sequence_number: u32,
}

impl_complete_header_only_pdu!(EnquireLink, CommandId::EnquireLink);
impl_complete_header_only_pdu!(EnquireLinkResponse, CommandId::EnquireLinkResp);
