// ABOUTME: SMPP v3.4 data_coding field values (Section 5.2.19)
// ABOUTME: Unlisted or message-class codings are preserved as raw values

use num_enum::{FromPrimitive, IntoPrimitive};

/// Data coding scheme of the short message user data.
#[derive(FromPrimitive, IntoPrimitive)]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataCoding {
    /// SMSC Default Alphabet
    SmscDefault = 0x00,
    /// IA5 (CCITT T.50)/ASCII
    Ascii = 0x01,
    /// Octet unspecified (8-bit binary)
    Binary = 0x02,
    /// Latin 1 (ISO-8859-1)
    Latin1 = 0x03,
    /// Octet unspecified (8-bit binary), alternate code
    BinaryAlt = 0x04,
    /// JIS (X 0208-1990)
    Jis = 0x05,
    /// Cyrillic (ISO-8859-5)
    Cyrillic = 0x06,
    /// Latin/Hebrew (ISO-8859-8)
    LatinHebrew = 0x07,
    /// UCS2 (ISO/IEC-10646)
    Ucs2 = 0x08,
    /// Pictogram Encoding
    Pictogram = 0x09,
    /// ISO-2022-JP (Music Codes)
    MusicCodes = 0x0A,
    /// Extended Kanji JIS (X 0212-1990)
    ExtendedKanji = 0x0D,
    /// KS C 5601
    Ksc5601 = 0x0E,
    #[num_enum(catch_all)]
    Other(u8),
}
