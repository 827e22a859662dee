// ABOUTME: This module provides macros to reduce boilerplate in SMPP PDU implementations
// ABOUTME: Includes macros for header-only PDUs and builder setters

/// Macro for implementing codec traits on header-only PDUs (no body)
///
/// # Arguments
/// * `$pdu_type` - The PDU struct name (e.g., EnquireLink)
/// * `$command_id` - The CommandId variant (e.g., CommandId::EnquireLink)
///
/// # Generated code
/// - Decodable with header validation; stray body octets are rejected by
///   the registry's length check
/// - Encodable with an empty body
macro_rules! impl_header_only_pdu {
    ($pdu_type:ident, $command_id:expr) => {
        impl $crate::codec::Decodable for $pdu_type {
            const COMMAND_IDS: &'static [$crate::datatypes::CommandId] = &[$command_id];

            fn decode(
                header: $crate::codec::PduHeader,
                _buf: &mut std::io::Cursor<&[u8]>,
            ) -> Result<Self, $crate::codec::CodecError> {
                Self::validate_header(&header)?;

                Ok($pdu_type {
                    command_status: header.command_status,
                    sequence_number: header.sequence_number,
                })
            }
        }

        impl $crate::codec::Encodable for $pdu_type {
            fn command_id(&self) -> $crate::datatypes::CommandId {
                $command_id
            }

            fn sequence_number(&self) -> u32 {
                self.sequence_number
            }

            fn command_status(&self) -> $crate::datatypes::CommandStatus {
                self.command_status
            }

            fn body_size(&self) -> usize {
                0
            }

            fn encode_body(
                &self,
                _buf: &mut bytes::BytesMut,
            ) -> Result<(), $crate::codec::CodecError> {
                Ok(())
            }
        }
    };
}

/// Macro for generating builder setter methods
///
/// For each `field: Type` pair, generates a fluent setter that stores the
/// value on `self.$target.$field` and returns the builder.
macro_rules! builder_setters {
    ($target:ident; $($field:ident: $type:ty),* $(,)?) => {
        $(
            pub fn $field(mut self, $field: $type) -> Self {
                self.$target.$field = $field;
                self
            }
        )*
    };
}

/// Macro for generating constructor methods for header-only PDUs
///
/// # Generated code
/// - `new(sequence_number: u32)` - Creates PDU with Ok status
/// - `error(sequence_number: u32, status: CommandStatus)` - Creates PDU with error status
macro_rules! impl_header_only_constructors {
    ($pdu_type:ident) => {
        impl $pdu_type {
            /// Create a new PDU with Ok status
            pub fn new(sequence_number: u32) -> Self {
                Self {
                    command_status: $crate::datatypes::CommandStatus::Ok,
                    sequence_number,
                }
            }

            /// Create a PDU with error status
            pub fn error(sequence_number: u32, status: $crate::datatypes::CommandStatus) -> Self {
                Self {
                    command_status: status,
                    sequence_number,
                }
            }
        }
    };
}

/// Codec implementation plus constructors for a header-only PDU.
macro_rules! impl_complete_header_only_pdu {
    ($pdu_type:ident, $command_id:expr) => {
        $crate::macros::impl_header_only_pdu!($pdu_type, $command_id);
        $crate::macros::impl_header_only_constructors!($pdu_type);
    };
}

// Make macros available to the rest of the crate
pub(crate) use {
    builder_setters, impl_complete_header_only_pdu, impl_header_only_constructors,
    impl_header_only_pdu,
};
