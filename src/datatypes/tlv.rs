use crate::codec::{CodecError, decode_u16, encode_u16, pack_uint, unpack_uint};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use std::fmt;
use std::io::Cursor;
use thiserror::Error;

/// Size of the tag and length fields that precede every TLV value.
pub const TLV_HEADER_SIZE: usize = 4;

/// Optional parameter tags defined by SMPP v3.4 (section 5.3.2).
///
/// Tags that are not listed here (vendor specific or later protocol
/// versions) are kept as `Other` and carried as raw octets.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TlvTag {
    DestAddrSubunit = 0x0005,
    DestNetworkType = 0x0006,
    DestBearerType = 0x0007,
    DestTelematicsId = 0x0008,
    SourceAddrSubunit = 0x000D,
    SourceNetworkType = 0x000E,
    SourceBearerType = 0x000F,
    SourceTelematicsId = 0x0010,
    QosTimeToLive = 0x0017,
    PayloadType = 0x0019,
    AdditionalStatusInfoText = 0x001D,
    ReceiptedMessageId = 0x001E,
    MsMsgWaitFacilities = 0x0030,
    PrivacyIndicator = 0x0201,
    SourceSubaddress = 0x0202,
    DestSubaddress = 0x0203,
    UserMessageReference = 0x0204,
    UserResponseCode = 0x0205,
    SourcePort = 0x020A,
    DestinationPort = 0x020B,
    SarMsgRefNum = 0x020C,
    LanguageIndicator = 0x020D,
    SarTotalSegments = 0x020E,
    SarSegmentSeqnum = 0x020F,
    ScInterfaceVersion = 0x0210,
    CallbackNumPresInd = 0x0302,
    CallbackNumAtag = 0x0303,
    NumberOfMessages = 0x0304,
    CallbackNum = 0x0381,
    DpfResult = 0x0420,
    SetDpf = 0x0421,
    MsAvailabilityStatus = 0x0422,
    NetworkErrorCode = 0x0423,
    MessagePayload = 0x0424,
    DeliveryFailureReason = 0x0425,
    MoreMessagesToSend = 0x0426,
    MessageState = 0x0427,
    UssdServiceOp = 0x0501,
    DisplayTime = 0x1201,
    SmsSignal = 0x1203,
    MsValidity = 0x1204,
    AlertOnMessageDelivery = 0x130C,
    ItsReplyType = 0x1380,
    ItsSessionInfo = 0x1383,
    #[num_enum(catch_all)]
    Other(u16),
}

/// How a TLV value is laid out on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TlvWireType {
    U8,
    U16,
    U32,
    /// NUL terminated; the terminator counts towards the length.
    CString,
    Octets,
}

impl TlvWireType {
    /// Exact value width for integer types.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            TlvWireType::U8 => Some(1),
            TlvWireType::U16 => Some(2),
            TlvWireType::U32 => Some(4),
            TlvWireType::CString | TlvWireType::Octets => None,
        }
    }
}

impl fmt::Display for TlvWireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TlvWireType::U8 => "uint8",
            TlvWireType::U16 => "uint16",
            TlvWireType::U32 => "uint32",
            TlvWireType::CString => "c-octet string",
            TlvWireType::Octets => "octet string",
        };
        f.write_str(name)
    }
}

impl TlvTag {
    /// Registry lookup: the declared wire type of this tag.
    ///
    /// Adding support for a new parameter means adding a variant above and
    /// an arm here.
    pub fn wire_type(&self) -> TlvWireType {
        use TlvTag::*;

        match self {
            DestAddrSubunit | DestNetworkType | DestBearerType | SourceAddrSubunit
            | SourceNetworkType | SourceBearerType | SourceTelematicsId | PayloadType
            | MsMsgWaitFacilities | PrivacyIndicator | UserResponseCode | LanguageIndicator
            | SarTotalSegments | SarSegmentSeqnum | ScInterfaceVersion | CallbackNumPresInd
            | NumberOfMessages | DpfResult | SetDpf | MsAvailabilityStatus
            | DeliveryFailureReason | MoreMessagesToSend | MessageState | UssdServiceOp
            | DisplayTime | MsValidity | ItsReplyType => TlvWireType::U8,

            DestTelematicsId | UserMessageReference | SourcePort | DestinationPort
            | SarMsgRefNum | SmsSignal => TlvWireType::U16,

            QosTimeToLive => TlvWireType::U32,

            AdditionalStatusInfoText | ReceiptedMessageId => TlvWireType::CString,

            SourceSubaddress | DestSubaddress | CallbackNumAtag | CallbackNum
            | NetworkErrorCode | MessagePayload | AlertOnMessageDelivery | ItsSessionInfo
            | Other(_) => TlvWireType::Octets,
        }
    }

    pub fn is_registered(&self) -> bool {
        !matches!(self, TlvTag::Other(_))
    }
}

/// A typed optional parameter value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TlvValue {
    U8(u8),
    U16(u16),
    U32(u32),
    CString(String),
    Octets(Bytes),
}

impl TlvValue {
    pub fn wire_type(&self) -> TlvWireType {
        match self {
            TlvValue::U8(_) => TlvWireType::U8,
            TlvValue::U16(_) => TlvWireType::U16,
            TlvValue::U32(_) => TlvWireType::U32,
            TlvValue::CString(_) => TlvWireType::CString,
            TlvValue::Octets(_) => TlvWireType::Octets,
        }
    }

    /// Size of the encoded value in octets.
    pub fn size(&self) -> usize {
        match self {
            TlvValue::U8(_) => 1,
            TlvValue::U16(_) => 2,
            TlvValue::U32(_) => 4,
            TlvValue::CString(s) => s.len() + 1,
            TlvValue::Octets(b) => b.len(),
        }
    }

    /// Integer view of U8/U16/U32 values.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            TlvValue::U8(v) => Some(u32::from(*v)),
            TlvValue::U16(v) => Some(u32::from(*v)),
            TlvValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TlvValue::CString(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TlvValue::Octets(b) => Some(b),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TlvError {
    #[error("TLV {tag:?} is declared as {expected}, got a {actual} value")]
    TypeMismatch {
        tag: TlvTag,
        expected: TlvWireType,
        actual: TlvWireType,
    },

    #[error("TLV {tag:?} value is {length} octets, limit is 65535")]
    ValueTooLong { tag: TlvTag, length: usize },

    #[error("TLV {tag:?} has length {actual}, expected {expected}")]
    LengthMismatch {
        tag: TlvTag,
        expected: usize,
        actual: usize,
    },

    #[error("TLV {tag:?} declares {declared} octets but only {available} remain")]
    Truncated {
        tag: TlvTag,
        declared: usize,
        available: usize,
    },

    #[error("TLV {tag:?} is not a valid NUL terminated string")]
    InvalidString { tag: TlvTag },
}

/// An optional parameter: tag, derived length and typed value.
///
/// Fields are private so a `Tlv` always agrees with the registry; build one
/// with [`Tlv::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    tag: TlvTag,
    value: TlvValue,
}

impl Tlv {
    /// Create a TLV, checking the value against the tag's declared type.
    /// Unregistered tags only accept octet strings.
    pub fn new(tag: TlvTag, value: TlvValue) -> Result<Self, TlvError> {
        let expected = tag.wire_type();
        if value.wire_type() != expected {
            return Err(TlvError::TypeMismatch {
                tag,
                expected,
                actual: value.wire_type(),
            });
        }

        let length = value.size();
        if length > usize::from(u16::MAX) {
            return Err(TlvError::ValueTooLong { tag, length });
        }

        Ok(Self { tag, value })
    }

    pub fn tag(&self) -> TlvTag {
        self.tag
    }

    pub fn value(&self) -> &TlvValue {
        &self.value
    }

    /// The Length field: value octets only, tag and length excluded.
    pub fn length(&self) -> u16 {
        // Bounded by Tlv::new.
        self.value.size() as u16
    }

    pub fn encoded_size(&self) -> usize {
        TLV_HEADER_SIZE + self.value.size()
    }

    pub fn encode(&self, buf: &mut BytesMut) {
        encode_u16(buf, u16::from(self.tag));
        encode_u16(buf, self.length());

        match &self.value {
            TlvValue::U8(v) => pack_uint(buf, u32::from(*v), 1),
            TlvValue::U16(v) => pack_uint(buf, u32::from(*v), 2),
            TlvValue::U32(v) => pack_uint(buf, *v, 4),
            TlvValue::CString(s) => {
                buf.put_slice(s.as_bytes());
                buf.put_u8(0);
            }
            TlvValue::Octets(b) => buf.put_slice(b),
        }
    }

    /// Decode one TLV. Registered integer tags must carry exactly their
    /// width; unknown tags come back as `Octets`.
    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let tag = TlvTag::from(decode_u16(buf)?);
        let declared = usize::from(decode_u16(buf)?);

        if buf.remaining() < declared {
            return Err(TlvError::Truncated {
                tag,
                declared,
                available: buf.remaining(),
            }
            .into());
        }

        let raw = buf.copy_to_bytes(declared);
        let wire_type = tag.wire_type();

        if let Some(width) = wire_type.fixed_width() {
            if declared != width {
                return Err(TlvError::LengthMismatch {
                    tag,
                    expected: width,
                    actual: declared,
                }
                .into());
            }
        }

        let value = match wire_type {
            TlvWireType::U8 => TlvValue::U8(raw[0]),
            TlvWireType::U16 => TlvValue::U16(unpack_uint(&raw) as u16),
            TlvWireType::U32 => TlvValue::U32(unpack_uint(&raw)),
            TlvWireType::CString => {
                let Some((&0, text)) = raw.split_last() else {
                    return Err(TlvError::InvalidString { tag }.into());
                };
                let text = String::from_utf8(text.to_vec())
                    .map_err(|_| TlvError::InvalidString { tag })?;
                TlvValue::CString(text)
            }
            TlvWireType::Octets => {
                if !tag.is_registered() {
                    tracing::warn!(
                        "Unknown TLV tag {:#06x} ({} octets), keeping raw value",
                        u16::from(tag),
                        declared
                    );
                }
                TlvValue::Octets(raw)
            }
        };

        Ok(Self { tag, value })
    }
}

/// Decode TLVs until the body is exhausted.
pub fn decode_tlvs(buf: &mut Cursor<&[u8]>) -> Result<Vec<Tlv>, CodecError> {
    let mut tlvs = Vec::new();
    while buf.has_remaining() {
        tlvs.push(Tlv::decode(buf)?);
    }
    Ok(tlvs)
}

pub fn encode_tlvs(buf: &mut BytesMut, tlvs: &[Tlv]) {
    for tlv in tlvs {
        tlv.encode(buf);
    }
}

/// Total encoded size of a TLV list, 4 octet headers included.
pub fn tlvs_size(tlvs: &[Tlv]) -> usize {
    tlvs.iter().map(Tlv::encoded_size).sum()
}

/// First TLV carrying `tag`, if any.
pub fn find_tlv(tlvs: &[Tlv], tag: TlvTag) -> Option<&Tlv> {
    tlvs.iter().find(|tlv| tlv.tag == tag)
}
