use num_enum::{FromPrimitive, IntoPrimitive};

/// Type of Number (TON) of an SME address.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOfNumber {
    Unknown = 0b0000_0000,
    International = 0b0000_0001,
    National = 0b0000_0010,
    NetworkSpecific = 0b0000_0011,
    SubscriberNumber = 0b0000_0100,
    Alphanumeric = 0b0000_0101,
    Abbreviated = 0b0000_0110,
    #[num_enum(catch_all)]
    Other(u8),
}
