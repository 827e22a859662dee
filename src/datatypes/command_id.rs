use num_enum::{FromPrimitive, IntoPrimitive};

/// Bit set on the command_id of every response PDU.
pub const RESPONSE_MASK: u32 = 0x8000_0000;

/// The command_id field identifies the SMPP PDU. Identifiers outside the
/// table below are carried through as `Other` so a header always survives a
/// decode/encode round trip.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandId {
    GenericNack = 0x8000_0000,
    BindReceiver = 0x0000_0001,
    BindReceiverResp = 0x8000_0001,
    BindTransmitter = 0x0000_0002,
    BindTransmitterResp = 0x8000_0002,
    QuerySm = 0x0000_0003,
    QuerySmResp = 0x8000_0003,
    SubmitSm = 0x0000_0004,
    SubmitSmResp = 0x8000_0004,
    DeliverSm = 0x0000_0005,
    DeliverSmResp = 0x8000_0005,
    Unbind = 0x0000_0006,
    UnbindResp = 0x8000_0006,
    ReplaceSm = 0x0000_0007,
    ReplaceSmResp = 0x8000_0007,
    CancelSm = 0x0000_0008,
    CancelSmResp = 0x8000_0008,
    BindTransceiver = 0x0000_0009,
    BindTransceiverResp = 0x8000_0009,
    // Reserved 0x0000000A - 0x8000000A
    Outbind = 0x0000_000B,
    // Reserved 0x0000000C - 0x00000014
    //          0x8000000B - 0x80000014
    EnquireLink = 0x0000_0015,
    EnquireLinkResp = 0x8000_0015,
    // Reserved 0x00000016 - 0x00000020
    //          0x80000016 - 0x80000020
    SubmitMulti = 0x0000_0021,
    SubmitMultiResp = 0x8000_0021,
    // Reserved 0x00000022 - 0x000000FF
    //          0x80000022 - 0x800000FF
    AlertNotification = 0x0000_0102,
    DataSm = 0x0000_0103,
    DataSmResp = 0x8000_0103,
    /// Reserved, vendor specific or otherwise unrecognised identifier.
    #[num_enum(catch_all)]
    Other(u32),
}

impl CommandId {
    /// Check if this command_id represents a response PDU
    pub fn is_response(&self) -> bool {
        u32::from(*self) & RESPONSE_MASK != 0
    }

    /// The command_id of the response that answers this request.
    pub fn response(&self) -> CommandId {
        CommandId::from(u32::from(*self) | RESPONSE_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_ids() {
        assert_eq!(CommandId::BindTransmitter.response(), CommandId::BindTransmitterResp);
        assert_eq!(CommandId::SubmitMulti.response(), CommandId::SubmitMultiResp);
        assert_eq!(CommandId::Unbind.response(), CommandId::UnbindResp);
        assert!(CommandId::GenericNack.is_response());
        assert!(!CommandId::DeliverSm.is_response());
    }

    #[test]
    fn unknown_ids_are_preserved() {
        let id = CommandId::from(0x0000_000A);
        assert_eq!(id, CommandId::Other(0x0000_000A));
        assert_eq!(u32::from(id), 0x0000_000A);
        assert_eq!(u32::from(CommandId::SubmitSm), 0x0000_0004);
    }
}
