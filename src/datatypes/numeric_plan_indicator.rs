use num_enum::{FromPrimitive, IntoPrimitive};

/// Numbering Plan Indicator (NPI) of an SME address.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NumericPlanIndicator {
    Unknown = 0b0000_0000,
    Isdn = 0b0000_0001,
    Data = 0b0000_0011,
    Telex = 0b0000_0100,
    LandMobile = 0b0000_0110,
    National = 0b0000_1000,
    Private = 0b0000_1001,
    Ermes = 0b0000_1010,
    Internet = 0b0000_1110,
    WapClientId = 0b0001_0010,
    #[num_enum(catch_all)]
    Other(u8),
}
