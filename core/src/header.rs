//! Basic types for interpreting DICOM data elements:
//! the attribute tag, the value representation enumeration
//! and its encoding properties, value lengths,
//! and the element and sequence item headers.

use snafu::{ensure, Backtrace, ResultExt, Snafu};
use std::cmp::Ordering;
use std::fmt;
use std::str::{from_utf8, FromStr};

/// Error type for issues constructing a sequence item header.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum SequenceItemHeaderError {
    /// Unexpected header tag.
    /// Only Item (FFFE,E000),
    /// Item Delimitation (FFFE,E00D),
    /// or Sequence Delimitation (FFFE,E0DD)
    /// are admitted.
    #[snafu(display("Unexpected tag {}", tag))]
    UnexpectedTag { tag: Tag, backtrace: Backtrace },
    /// Unexpected delimiter value length.
    /// Must be zero for delimiters.
    #[snafu(display("Unexpected delimiter length {}", len))]
    UnexpectedDelimiterLength { len: Length, backtrace: Backtrace },
}

/// An error parsing a text representation of a DICOM tag.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum TagParseError {
    #[snafu(display("tag must be 8 hexadecimal digits, got {} characters", got))]
    InvalidTagLength { got: usize, backtrace: Backtrace },
    #[snafu(display("invalid hexadecimal digits in tag"))]
    InvalidTagDigits {
        backtrace: Backtrace,
        source: std::num::ParseIntError,
    },
}

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags,
/// comprising a group number and an element number.
///
/// Both `(u16, u16)` and `[u16; 2]` can be efficiently converted
/// to this type.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// The tag of an encapsulated or sequence item: (FFFE,E000).
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    /// The tag of an item delimiter: (FFFE,E00D).
    pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
    /// The tag of a sequence delimiter: (FFFE,E0DD).
    pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);
    /// The tag of the main _Pixel Data_ attribute: (7FE0,0010).
    pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Check whether this is the _Pixel Data_ tag.
    #[inline]
    pub fn is_pixel_data(self) -> bool {
        self == Tag::PIXEL_DATA
    }

    /// Check whether this is the tag of an item marker.
    #[inline]
    pub fn is_item(self) -> bool {
        self == Tag::ITEM
    }

    /// Check whether this is the tag of an item delimiter.
    #[inline]
    pub fn is_item_delimiter(self) -> bool {
        self == Tag::ITEM_DELIMITER
    }

    /// Check whether this is the tag of a sequence delimiter.
    #[inline]
    pub fn is_sequence_delimiter(self) -> bool {
        self == Tag::SEQUENCE_DELIMITER
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

/// Parse a tag from its condensed text form:
/// exactly 8 hexadecimal digits, group first (`"00100010"`).
impl FromStr for Tag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ensure!(s.len() == 8, InvalidTagLengthSnafu { got: s.len() });
        let group = u16::from_str_radix(&s[0..4], 16).context(InvalidTagDigitsSnafu)?;
        let element = u16::from_str_radix(&s[4..8], 16).context(InvalidTagDigitsSnafu)?;
        Ok(Tag(group, element))
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl PartialEq<[u16; 2]> for Tag {
    fn eq(&self, other: &[u16; 2]) -> bool {
        self.0 == other[0] && self.1 == other[1]
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// A type for representing data set content length, in bytes.
/// An internal value of `0xFFFF_FFFF` represents an undefined
/// (unspecified) length, which would have to be determined
/// with a traversal based on the content's encoding.
///
/// This also means that numeric comparisons
/// do not function the same way as primitive number types:
/// two undefined lengths are not equal,
/// and comparing with at least one undefined length is always `false`.
///
/// ```
/// # use dcmio_core::Length;
/// assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
/// assert!(Length(16) < Length(64));
/// assert!(!(Length::UNDEFINED < Length(64)));
/// assert!(!(Length::UNDEFINED > Length(64)));
/// ```
#[derive(Clone, Copy)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// A length that is undefined.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Create a new length value from its internal representation.
    /// This is equivalent to `Length(len)`.
    #[inline]
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// Create a new length value with the given number of bytes.
    ///
    /// # Panic
    ///
    /// This function will panic if `len` represents an undefined length.
    #[inline]
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    /// Check whether this length is undefined (unknown).
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    /// Returns `None` if it represents an undefined length.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }

    /// Check whether the length is equally specified as another length.
    /// Unlike the implemented `PartialEq`, two undefined lengths are
    /// considered equivalent by this method.
    #[inline]
    pub fn inner_eq(self, other: Length) -> bool {
        self.0 == other.0
    }
}

impl From<u32> for Length {
    #[inline]
    fn from(o: u32) -> Self {
        Length(o)
    }
}

impl PartialEq<Length> for Length {
    fn eq(&self, rhs: &Length) -> bool {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => false,
            (l1, l2) => l1 == l2,
        }
    }
}

impl PartialOrd<Length> for Length {
    fn partial_cmp(&self, rhs: &Length) -> Option<Ordering> {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => None,
            (l1, l2) => Some(l1.cmp(&l2)),
        }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", &l),
        }
    }
}

/// An enum type for a DICOM value representation.
///
/// In addition to identity and text conversions,
/// this type exposes the encoding properties of each VR:
/// whether it holds text or binary content,
/// its fixed value width (for binary numeric VRs),
/// the maximum encoded length per value,
/// the padding byte used to keep encodings even-sized,
/// and whether multiple values are admitted.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Very Long
    OV,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Signed Very Long
    SV,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
    /// Unsigned Very Long
    UV,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_str(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OV => "OV",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            SV => "SV",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
            UV => "UV",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    /// The function returns two alphabetic characters in upper case.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_str().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Check whether this VR holds textual content.
    pub fn is_string(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | LT | PN | SH | ST | TM | UC | UI | UR | UT
        )
    }

    /// Check whether this VR holds bulk binary content
    /// with no inner numeric structure
    /// (the "other" VRs plus the unknown VR).
    pub fn is_bytes(self) -> bool {
        use VR::*;
        matches!(self, OB | OD | OF | OL | OV | OW | UN)
    }

    /// Check whether this VR holds binary content,
    /// either fixed-width numeric values or a bulk byte blob.
    pub fn is_binary(self) -> bool {
        self.fixed_width().is_some() || self.is_bytes()
    }

    /// The fixed encoded width of a single value in bytes,
    /// or `None` if values of this VR are variable-sized.
    pub fn fixed_width(self) -> Option<usize> {
        use VR::*;
        match self {
            SS | US => Some(2),
            AT | FL | SL | UL => Some(4),
            FD | SV | UV => Some(8),
            _ => None,
        }
    }

    /// Whether this VR admits more than one value per element.
    ///
    /// Text VRs with multiplicity are split and joined on `'\\'`;
    /// fixed-width VRs repeat their value width.
    /// The large text VRs (LT, ST, UT, UR), sequences,
    /// and bulk binary VRs always hold a single value.
    pub fn allow_multiple(self) -> bool {
        use VR::*;
        if self.fixed_width().is_some() {
            return true;
        }
        matches!(
            self,
            AE | AS | CS | DA | DS | DT | IS | LO | PN | SH | TM | UC | UI
        )
    }

    /// The maximum number of bytes admitted
    /// for a single encoded value of this VR,
    /// or `None` when the standard imposes no bound.
    pub fn max_length(self) -> Option<u32> {
        use VR::*;
        match self {
            AS => Some(4),
            DA => Some(8),
            IS => Some(12),
            TM => Some(14),
            AE | CS | DS | SH => Some(16),
            DT => Some(26),
            LO | PN | UI => Some(64),
            ST => Some(1024),
            LT => Some(10240),
            _ => None,
        }
    }

    /// The byte used to pad an odd-sized encoding to even length.
    ///
    /// Text VRs pad with a trailing space,
    /// except for UI which pads with a NUL byte,
    /// as do all binary VRs.
    pub fn pad_byte(self) -> u8 {
        if self.is_string() && self != VR::UI {
            b' '
        } else {
            0x00
        }
    }

    /// Whether this VR uses the "long" explicit header form:
    /// two reserved bytes followed by a 4-byte length field,
    /// rather than a bare 2-byte length field.
    pub fn is_long_form(self) -> bool {
        use VR::*;
        matches!(
            self,
            OB | OD | OF | OL | OV | OW | SQ | SV | UC | UN | UR | UT | UV
        )
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two UTF-8 encoded alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> std::result::Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OV" => Ok(OV),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "SV" => Ok(SV),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            "UV" => Ok(UV),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A data structure for a data element header, containing
/// a tag, value representation and specified length.
///
/// This is the transient form produced while decoding a stream;
/// in-memory elements do not retain a length
/// (see [`DataElement`](crate::value::DataElement)).
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct DataElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value Representation
    pub vr: VR,
    /// Element length
    pub len: Length,
}

impl DataElementHeader {
    /// Create a new data element header with the given properties.
    /// This is just a trivial constructor.
    #[inline]
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, len: Length) -> DataElementHeader {
        DataElementHeader {
            tag: tag.into(),
            vr,
            len,
        }
    }

    /// Retrieve the element's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Retrieve the element's value representation.
    #[inline]
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// Retrieve the element's specified value length.
    #[inline]
    pub fn length(&self) -> Length {
        self.len
    }

    /// Check whether the header suggests the value to be a sequence value:
    /// if the value representation is SQ or the length is undefined.
    #[inline]
    pub fn is_non_primitive(&self) -> bool {
        self.vr == VR::SQ || self.len.is_undefined()
    }

    /// Check whether this is the header of an encapsulated pixel data element.
    #[inline]
    pub fn is_encapsulated_pixeldata(&self) -> bool {
        self.tag.is_pixel_data() && self.len.is_undefined()
    }
}

/// Data type for describing a sequence item data element.
/// If the element represents an item, it will also contain
/// the specified length.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SequenceItemHeader {
    /// The cursor contains an item.
    Item {
        /// the length of the item in bytes (can be 0xFFFFFFFF if undefined)
        len: Length,
    },
    /// The cursor read an item delimiter.
    /// The element ends here and should not be read any further.
    ItemDelimiter,
    /// The cursor read a sequence delimiter.
    /// The element ends here and should not be read any further.
    SequenceDelimiter,
}

impl SequenceItemHeader {
    /// Create a sequence item header using the element's raw properties.
    /// An error can be raised if the given properties do not relate to a
    /// sequence item, an item delimiter or a sequence delimiter.
    pub fn new<T: Into<Tag>>(
        tag: T,
        len: Length,
    ) -> Result<SequenceItemHeader, SequenceItemHeaderError> {
        match tag.into() {
            Tag::ITEM => Ok(SequenceItemHeader::Item { len }),
            Tag::ITEM_DELIMITER => {
                // delimiters should not have a positive length
                if len != Length(0) {
                    UnexpectedDelimiterLengthSnafu { len }.fail()
                } else {
                    Ok(SequenceItemHeader::ItemDelimiter)
                }
            }
            Tag::SEQUENCE_DELIMITER => Ok(SequenceItemHeader::SequenceDelimiter),
            tag => UnexpectedTagSnafu { tag }.fail(),
        }
    }

    /// Retrieve the tag of this item header.
    #[inline]
    pub fn tag(&self) -> Tag {
        match *self {
            SequenceItemHeader::Item { .. } => Tag::ITEM,
            SequenceItemHeader::ItemDelimiter => Tag::ITEM_DELIMITER,
            SequenceItemHeader::SequenceDelimiter => Tag::SEQUENCE_DELIMITER,
        }
    }

    /// Retrieve the length of this item's content.
    /// Delimiters always report zero.
    #[inline]
    pub fn length(&self) -> Length {
        match *self {
            SequenceItemHeader::Item { len } => len,
            SequenceItemHeader::ItemDelimiter | SequenceItemHeader::SequenceDelimiter => Length(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_from_u16_pair() {
        let t = Tag::from((0x0010u16, 0x0020u16));
        assert_eq!(0x0010u16, t.group());
        assert_eq!(0x0020u16, t.element());
    }

    #[test]
    fn tag_format() {
        assert_eq!(Tag(0x0010, 0x0010).to_string(), "(0010,0010)");
        assert_eq!(Tag(0x7FE0, 0x0010).to_string(), "(7FE0,0010)");
        assert!(Tag(0x7FE0, 0x0010).is_pixel_data());
        assert!(!Tag(0x7FE0, 0x0011).is_pixel_data());
    }

    #[test]
    fn tag_from_str() {
        let tag: Tag = "00100010".parse().unwrap();
        assert_eq!(tag, Tag(0x0010, 0x0010));
        let tag: Tag = "7FE00010".parse().unwrap();
        assert_eq!(tag, Tag(0x7FE0, 0x0010));

        assert!("0010,0010".parse::<Tag>().is_err());
        assert!("0010001".parse::<Tag>().is_err());
        assert!("0010001G".parse::<Tag>().is_err());
    }

    #[test]
    fn length_undefined_is_never_equal() {
        assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
        assert_eq!(Length(8), Length(8));
        assert!(Length::UNDEFINED.is_undefined());
        assert_eq!(Length::UNDEFINED.get(), None);
        assert!(Length::UNDEFINED.inner_eq(Length::UNDEFINED));
    }

    #[test]
    fn vr_properties() {
        assert_eq!(VR::US.fixed_width(), Some(2));
        assert_eq!(VR::AT.fixed_width(), Some(4));
        assert_eq!(VR::FD.fixed_width(), Some(8));
        assert_eq!(VR::DS.fixed_width(), None);

        assert!(VR::UI.is_string());
        assert!(VR::UI.allow_multiple());
        assert_eq!(VR::UI.pad_byte(), 0x00);
        assert_eq!(VR::PN.pad_byte(), b' ');
        assert_eq!(VR::OB.pad_byte(), 0x00);

        assert!(!VR::LT.allow_multiple());
        assert!(!VR::UT.allow_multiple());
        assert!(!VR::UR.allow_multiple());
        assert!(VR::CS.allow_multiple());
        assert!(VR::US.allow_multiple());

        assert_eq!(VR::AE.max_length(), Some(16));
        assert_eq!(VR::UI.max_length(), Some(64));
        assert_eq!(VR::UC.max_length(), None);

        for vr in [
            VR::OB,
            VR::OD,
            VR::OF,
            VR::OL,
            VR::OV,
            VR::OW,
            VR::SQ,
            VR::SV,
            VR::UC,
            VR::UN,
            VR::UR,
            VR::UT,
            VR::UV,
        ] {
            assert!(vr.is_long_form(), "{} should be long form", vr);
        }
        for vr in [VR::AE, VR::CS, VR::DS, VR::FL, VR::PN, VR::UI, VR::US] {
            assert!(!vr.is_long_form(), "{} should be short form", vr);
        }
    }

    #[test]
    fn vr_binary_round_trip() {
        for code in ["AE", "SQ", "OB", "UN", "UV"] {
            let vr: VR = code.parse().unwrap();
            assert_eq!(vr.to_str(), code);
            assert_eq!(VR::from_binary(vr.to_bytes()), Some(vr));
        }
        assert_eq!(VR::from_binary([b'Z', b'Z']), None);
    }

    #[test]
    fn sequence_item_headers() {
        let item = SequenceItemHeader::new(Tag(0xFFFE, 0xE000), Length::UNDEFINED).unwrap();
        assert!(matches!(item, SequenceItemHeader::Item { len } if len.is_undefined()));
        assert!(item.length().is_undefined());

        let delim = SequenceItemHeader::new(Tag(0xFFFE, 0xE00D), Length(0)).unwrap();
        assert_eq!(delim, SequenceItemHeader::ItemDelimiter);

        // delimiters must carry a zero length
        assert!(SequenceItemHeader::new(Tag(0xFFFE, 0xE00D), Length(4)).is_err());

        // not an item tag
        assert!(SequenceItemHeader::new(Tag(0x0010, 0x0010), Length(0)).is_err());
    }
}
