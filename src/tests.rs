//! Integration tests for SMPP PDU encoding and decoding

use crate::codec::{CodecError, Decodable, Encodable, Frame, MAX_PDU_SIZE, PduHeader};
use crate::datatypes::*;
use bytes::{BufMut, Bytes, BytesMut};
use std::io::Cursor;

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn body(destination: &str, text: &[u8]) -> MessageBody {
        MessageBody {
            service_type: String::new(),
            source_addr_ton: TypeOfNumber::Unknown,
            source_addr_npi: NumericPlanIndicator::Unknown,
            source_addr: "12345".to_string(),
            dest_addr_ton: TypeOfNumber::International,
            dest_addr_npi: NumericPlanIndicator::Isdn,
            destination_addr: destination.to_string(),
            esm_class: 0,
            protocol_id: 0,
            priority_flag: PriorityFlag::Level0,
            schedule_delivery_time: String::new(),
            validity_period: String::new(),
            registered_delivery: 0,
            replace_if_present_flag: 0,
            data_coding: DataCoding::Latin1,
            sm_default_msg_id: 0,
            short_message: Bytes::copy_from_slice(text),
        }
    }

    #[test]
    fn test_frame_check_insufficient_data() {
        let data = vec![0x00, 0x00]; // Only 2 bytes
        let mut cursor = Cursor::new(data.as_slice());

        let result = Frame::check(&mut cursor);
        assert!(matches!(result, Err(CodecError::Incomplete)));
    }

    #[test]
    fn test_frame_check_invalid_length() {
        let data = vec![
            0x00, 0x00, 0x00, 0x05, // command_length = 5 (too small)
            0x00, 0x00, 0x00, 0x15, // command_id
            0x00, 0x00, 0x00, 0x00, // command_status
            0x00, 0x00, 0x00, 0x01, // sequence_number
        ];
        let mut cursor = Cursor::new(data.as_slice());

        let result = Frame::check(&mut cursor);
        assert!(matches!(
            result,
            Err(CodecError::InvalidPduLength { length: 5, .. })
        ));
    }

    #[test]
    fn test_frame_check_length_too_large() {
        let data = vec![
            0xFF, 0xFF, 0xFF, 0xFF, // command_length = max u32
            0x00, 0x00, 0x00, 0x15, // command_id
            0x00, 0x00, 0x00, 0x00, // command_status
            0x00, 0x00, 0x00, 0x01, // sequence_number
        ];
        let mut cursor = Cursor::new(data.as_slice());

        let result = Frame::check(&mut cursor);
        assert!(matches!(
            result,
            Err(CodecError::InvalidPduLength {
                length: u32::MAX,
                max: MAX_PDU_SIZE,
                ..
            })
        ));
    }

    #[test]
    fn test_header_round_trip_at_boundaries() {
        for value in [0, 1, 0x7FFF_FFFF, 0x8000_0000, u32::MAX] {
            let header = PduHeader {
                command_length: value,
                command_id: CommandId::from(value),
                command_status: CommandStatus::from(value),
                sequence_number: value,
            };
            let mut buf = BytesMut::new();
            header.encode(&mut buf);
            assert_eq!(buf.len(), PduHeader::SIZE);

            let mut cursor = Cursor::new(buf.as_ref());
            assert_eq!(PduHeader::decode(&mut cursor).unwrap(), header);
        }
    }

    #[test]
    fn test_unbind_wire_bytes() {
        let bytes = Unbind::new(1).to_bytes().unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[
                0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x01,
            ]
        );
    }

    #[test]
    fn test_bind_transmitter_wire_bytes() {
        let bind = Bind {
            bind_type: BindType::Transmitter,
            command_status: CommandStatus::Ok,
            sequence_number: 1,
            system_id: "test".to_string(),
            password: "pwd".to_string(),
            system_type: String::new(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: TypeOfNumber::Unknown,
            addr_npi: NumericPlanIndicator::Unknown,
            address_range: String::new(),
        };

        let mut expected = vec![
            0x00, 0x00, 0x00, 0x1E, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01,
        ];
        expected.extend_from_slice(b"test\0pwd\0\0\x34\0\0\0");

        assert_eq!(bind.to_bytes().unwrap().as_ref(), expected.as_slice());
    }

    #[test]
    fn test_bind_max_field_lengths() {
        let bind = Bind {
            bind_type: BindType::Transceiver,
            command_status: CommandStatus::Ok,
            sequence_number: 1,
            system_id: "A".repeat(MAX_SYSTEM_ID_LENGTH),
            password: "B".repeat(MAX_PASSWORD_LENGTH),
            system_type: "C".repeat(MAX_SYSTEM_TYPE_LENGTH),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: TypeOfNumber::International,
            addr_npi: NumericPlanIndicator::Isdn,
            address_range: "D".repeat(MAX_ADDRESS_RANGE_LENGTH),
        };
        assert!(bind.validate().is_ok());

        let bytes = bind.to_bytes().unwrap();
        let mut cursor = Cursor::new(bytes.as_ref());
        assert_eq!(Frame::parse(&mut cursor).unwrap(), Frame::Bind(bind.clone()));

        let too_long = Bind {
            system_id: "A".repeat(MAX_SYSTEM_ID_LENGTH + 1),
            ..bind
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_submit_sm_zero_length_message() {
        let submit = SubmitSm::new(1, body("67890", b""), Vec::new());
        let bytes = submit.to_bytes().unwrap();

        let mut cursor = Cursor::new(bytes.as_ref());
        let Frame::SubmitSm(decoded) = Frame::parse(&mut cursor).unwrap() else {
            panic!("expected submit_sm");
        };
        assert!(decoded.body.short_message.is_empty());
        assert_eq!(*decoded, submit);
    }

    #[test]
    fn test_submit_sm_with_tlvs_round_trip() {
        let tlvs = vec![
            Tlv::new(TlvTag::UserMessageReference, TlvValue::U16(0x1234)).unwrap(),
            Tlv::new(TlvTag::QosTimeToLive, TlvValue::U32(3600)).unwrap(),
            Tlv::new(TlvTag::ReceiptedMessageId, TlvValue::CString("abc".into())).unwrap(),
            Tlv::new(
                TlvTag::MessagePayload,
                TlvValue::Octets(Bytes::from_static(b"payload")),
            )
            .unwrap(),
        ];
        let submit = SubmitSm::new(9, body("67890", b""), tlvs);
        let bytes = submit.to_bytes().unwrap();

        let without = SubmitSm::new(9, body("67890", b""), Vec::new())
            .to_bytes()
            .unwrap();
        // 4 + 2, 4 + 4, 4 + 4 ("abc\0"), 4 + 7
        assert_eq!(bytes.len(), without.len() + 6 + 8 + 8 + 11);

        let mut cursor = Cursor::new(bytes.as_ref());
        assert_eq!(
            Frame::parse(&mut cursor).unwrap(),
            Frame::SubmitSm(Box::new(submit))
        );
    }

    #[test]
    fn test_unknown_tlv_does_not_abort_pdu() {
        let deliver = DeliverSm::new(3, body("67890", b"hi"), Vec::new());
        let mut bytes = BytesMut::from(deliver.to_bytes().unwrap().as_ref());

        // Append a vendor TLV and patch command_length.
        bytes.put_u16(0x1400);
        bytes.put_u16(2);
        bytes.put_slice(&[0xAB, 0xCD]);
        let length = bytes.len() as u32;
        bytes[..4].copy_from_slice(&length.to_be_bytes());

        let mut cursor = Cursor::new(bytes.as_ref());
        let Frame::DeliverSm(decoded) = Frame::parse(&mut cursor).unwrap() else {
            panic!("expected deliver_sm");
        };
        assert_eq!(decoded.body, deliver.body);
        assert_eq!(decoded.tlvs.len(), 1);
        assert_eq!(decoded.tlvs[0].tag(), TlvTag::Other(0x1400));
        assert_eq!(decoded.tlvs[0].value().as_bytes(), Some(&[0xAB, 0xCD][..]));
    }

    #[test]
    fn test_fixed_width_tlv_length_mismatch_is_rejected() {
        let mut bytes = BytesMut::from(
            SubmitSm::new(3, body("1", b""), Vec::new())
                .to_bytes()
                .unwrap()
                .as_ref(),
        );
        bytes.put_u16(u16::from(TlvTag::PrivacyIndicator));
        bytes.put_u16(2);
        bytes.put_slice(&[0, 1]);
        let length = bytes.len() as u32;
        bytes[..4].copy_from_slice(&length.to_be_bytes());

        let mut cursor = Cursor::new(bytes.as_ref());
        let err = Frame::parse(&mut cursor).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Tlv(TlvError::LengthMismatch {
                tag: TlvTag::PrivacyIndicator,
                expected: 1,
                actual: 2
            })
        ));
        // The whole PDU was consumed regardless.
        assert_eq!(cursor.position() as usize, bytes.len());
    }

    #[test]
    fn test_submit_multi_round_trip() {
        let submit = SubmitMulti {
            command_status: CommandStatus::Ok,
            sequence_number: 21,
            service_type: String::new(),
            source_addr_ton: TypeOfNumber::Alphanumeric,
            source_addr_npi: NumericPlanIndicator::Unknown,
            source_addr: "Acme".to_string(),
            destinations: vec![
                DestinationAddress::sme_address(
                    TypeOfNumber::International,
                    NumericPlanIndicator::Isdn,
                    "447700900001",
                ),
                DestinationAddress::distribution_list("staff"),
            ],
            esm_class: 0,
            protocol_id: 0,
            priority_flag: PriorityFlag::Level1,
            schedule_delivery_time: String::new(),
            validity_period: String::new(),
            registered_delivery: 1,
            replace_if_present_flag: 0,
            data_coding: DataCoding::Latin1,
            sm_default_msg_id: 0,
            short_message: Bytes::from_static(b"Meeting at 3"),
            tlvs: Vec::new(),
        };
        assert!(submit.validate().is_ok());

        let bytes = submit.to_bytes().unwrap();
        let mut cursor = Cursor::new(bytes.as_ref());
        assert_eq!(
            Frame::parse(&mut cursor).unwrap(),
            Frame::SubmitMulti(Box::new(submit))
        );
    }

    #[test]
    fn test_response_with_error_status_and_empty_body() {
        let data = [
            0x00, 0x00, 0x00, 0x10, // command_length
            0x80, 0x00, 0x00, 0x04, // submit_sm_resp
            0x00, 0x00, 0x00, 0x58, // ESME_RTHROTTLED
            0x00, 0x00, 0x00, 0x07,
        ];
        let mut cursor = Cursor::new(&data[..]);
        let Frame::SubmitSmResp(response) = Frame::parse(&mut cursor).unwrap() else {
            panic!("expected submit_sm_resp");
        };
        assert_eq!(response.command_status, CommandStatus::ThrottlingError);
        assert_eq!(response.message_id, "");
    }

    #[test]
    fn test_unicode_string_handling() {
        // UCS-2 content travels as raw octets in short_message.
        let text: Vec<u8> = "héllo"
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect();
        let mut message = body("67890", &text);
        message.data_coding = DataCoding::Ucs2;
        let submit = SubmitSm::new(2, message, Vec::new());

        let bytes = submit.to_bytes().unwrap();
        let mut cursor = Cursor::new(bytes.as_ref());
        let Frame::SubmitSm(decoded) = Frame::parse(&mut cursor).unwrap() else {
            panic!("expected submit_sm");
        };
        assert_eq!(&decoded.body.short_message[..], text.as_slice());

        // C-octet strings must be valid UTF-8.
        let data = [
            0x00, 0x00, 0x00, 0x12, 0x80, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0xFF, 0x00,
        ];
        let mut cursor = Cursor::new(&data[..]);
        assert!(matches!(
            Frame::parse(&mut cursor),
            Err(CodecError::Utf8Error {
                field: "message_id",
                ..
            })
        ));
    }

    #[test]
    fn test_short_message_over_254_octets_is_rejected() {
        let submit = SubmitSm::new(1, body("1", &[b'x'; 255]), Vec::new());
        assert!(submit.body.validate().is_err());
        assert!(matches!(
            submit.to_bytes(),
            Err(CodecError::FieldValidation {
                field: "short_message",
                ..
            })
        ));
    }

    #[test]
    fn test_boundary_sequence_numbers() {
        for sequence in [1, 0x7FFF_FFFF] {
            let bytes = EnquireLink::new(sequence).to_bytes().unwrap();
            let mut cursor = Cursor::new(bytes.as_ref());
            let frame = Frame::parse(&mut cursor).unwrap();
            assert_eq!(frame.sequence_number(), sequence);
        }
    }

    #[test]
    fn test_back_to_back_pdus_in_one_buffer() {
        let mut buf = BytesMut::new();
        EnquireLink::new(1).encode(&mut buf).unwrap();
        SubmitSmResponse::new(2, "id").encode(&mut buf).unwrap();
        GenericNack::invalid_command_id(3).encode(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf.as_ref());
        let commands: Vec<CommandId> = (0..3)
            .map(|_| Frame::parse(&mut cursor).unwrap().command_id())
            .collect();
        assert_eq!(
            commands,
            vec![
                CommandId::EnquireLink,
                CommandId::SubmitSmResp,
                CommandId::GenericNack
            ]
        );
        assert!(matches!(
            Frame::check(&mut cursor),
            Err(CodecError::Incomplete)
        ));
    }

    #[test]
    fn test_deliver_sm_decodes_through_trait() {
        let deliver = DeliverSm::new(5, body("67890", b"MO"), Vec::new());
        let bytes = deliver.to_bytes().unwrap();

        let mut cursor = Cursor::new(bytes.as_ref());
        let header = PduHeader::decode(&mut cursor).unwrap();
        assert_eq!(header.command_length as usize, bytes.len());
        assert_eq!(DeliverSm::decode(header, &mut cursor).unwrap(), deliver);
    }
}
