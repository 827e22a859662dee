// ABOUTME: SMPP v3.4 priority_flag values used by submit_sm, submit_multi and deliver_sm
// ABOUTME: Levels 4-255 are reserved and rejected on decode

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Priority level assigned to a short message by the originating SME.
///
/// The mapping onto network priorities is SMSC specific: GSM treats any
/// non-zero level as "priority", ANSI-136 distinguishes bulk, normal, urgent
/// and very urgent, IS-95 normal, interactive, urgent and emergency.
#[derive(TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PriorityFlag {
    /// Lowest priority, the submission default.
    #[default]
    Level0 = 0,
    Level1 = 1,
    Level2 = 2,
    /// Highest priority.
    Level3 = 3,
}
