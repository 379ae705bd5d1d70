//! Decoding and encoding of data element and sequence item headers,
//! under any of the supported transfer syntaxes.

use crate::cursor::{Sink, Source};
use crate::transfer_syntax::TransferSyntax;
use dcmio_core::dictionary::DataDictionary;
use dcmio_core::header::SequenceItemHeaderError;
use dcmio_core::{DataElementHeader, Length, SequenceItemHeader, Tag, VR};
use snafu::Snafu;
use tracing::{debug, warn};

/// Error type for header decoding.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The header could not be read from the source.
    #[snafu(display("failed to read header bytes"), context(false))]
    ReadHeader { source: crate::cursor::Error },
    /// The tag read was not an item or delimiter.
    #[snafu(display("invalid sequence item header"), context(false))]
    InvalidItemHeader { source: SequenceItemHeaderError },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Decode a data element header from the source,
/// under the given transfer syntax.
///
/// Tags in the delimitation group (FFFE) never carry a VR
/// and are reported with [`VR::UN`].
/// In explicit VR syntaxes an unknown VR code is logged
/// and demoted to [`VR::UN`];
/// in the implicit VR syntax the VR is resolved
/// through the dictionary (see [`implicit_vr_of`]).
pub fn decode_header<D>(
    src: &mut Source<'_>,
    ts: TransferSyntax,
    dict: &D,
) -> Result<DataElementHeader>
where
    D: DataDictionary + ?Sized,
{
    let tag = src.read_tag()?;
    if tag.group() == 0xFFFE {
        let len = Length(src.read_u32()?);
        return Ok(DataElementHeader::new(tag, VR::UN, len));
    }

    if ts.explicit_vr() {
        let code = src.read_bytes(2)?;
        let vr = VR::from_binary([code[0], code[1]]).unwrap_or_else(|| {
            warn!(
                "unknown VR code {:?} in element {}, treating as UN",
                String::from_utf8_lossy(code),
                tag
            );
            VR::UN
        });
        let len = if vr.is_long_form() {
            // two reserved bytes, then a 4-byte length
            src.skip(2)?;
            Length(src.read_u32()?)
        } else {
            Length(u32::from(src.read_u16()?))
        };
        Ok(DataElementHeader::new(tag, vr, len))
    } else {
        let len = Length(src.read_u32()?);
        let vr = implicit_vr_of(tag, len, dict);
        Ok(DataElementHeader::new(tag, vr, len))
    }
}

/// Resolve the VR of an element in an implicit VR stream:
/// Pixel Data and Overlay Data map to OW,
/// other attributes consult the dictionary
/// (context-dependent VRs are relaxed),
/// and an unlisted tag falls back to SQ when the length is undefined,
/// or UN otherwise.
pub fn implicit_vr_of<D>(tag: Tag, len: Length, dict: &D) -> VR
where
    D: DataDictionary + ?Sized,
{
    if tag.is_pixel_data() || (tag.group() & 0xFF00 == 0x6000 && tag.element() == 0x3000) {
        return VR::OW;
    }
    if let Some(entry) = dict.by_tag(tag) {
        return entry.vr.relaxed();
    }
    debug!("no dictionary entry for {}", tag);
    if len.is_undefined() {
        VR::SQ
    } else {
        VR::UN
    }
}

/// Encode a data element header under the given transfer syntax.
/// Returns the number of bytes written.
pub fn encode_header(
    sink: &mut Sink,
    tag: Tag,
    vr: VR,
    len: Length,
    ts: TransferSyntax,
) -> usize {
    sink.write_tag(tag);
    if !ts.explicit_vr() {
        sink.write_u32(len.0);
        8
    } else if vr.is_long_form() {
        sink.write_bytes(&vr.to_bytes());
        sink.write_u16(0);
        sink.write_u32(len.0);
        12
    } else {
        sink.write_bytes(&vr.to_bytes());
        sink.write_u16(len.0 as u16);
        8
    }
}

/// Decode a sequence item header (item or delimiter).
pub fn decode_item_header(src: &mut Source<'_>) -> Result<SequenceItemHeader> {
    let tag = src.read_tag()?;
    let len = Length(src.read_u32()?);
    Ok(SequenceItemHeader::new(tag, len)?)
}

/// Encode a sequence item header (item or delimiter).
/// Always 8 bytes.
pub fn encode_item_header(sink: &mut Sink, header: SequenceItemHeader) {
    sink.write_tag(header.tag());
    let len = match header {
        SequenceItemHeader::Item { len } => len.0,
        _ => 0,
    };
    sink.write_u32(len);
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;
    use dcmio_core::dictionary::StubDataDictionary;
    use dcmio_dictionary::StandardDataDictionary;

    // manually crafting some explicit VR LE data element headers
    //  Tag: (0002,0002) Media Storage SOP Class UID
    //  VR: UI
    //  Length: 26
    // --
    //  Tag: (7FE0,0010) Pixel Data
    //  VR: OB
    //  Reserved: 2 bytes
    //  Length: 4
    #[rustfmt::skip]
    const RAW_EXPLICIT: &[u8; 20] = &[
        0x02, 0x00, 0x02, 0x00, // tag (0002,0002)
        b'U', b'I',             // VR
        0x1A, 0x00,             // length: 26
        0xE0, 0x7F, 0x10, 0x00, // tag (7FE0,0010)
        b'O', b'B',             // VR
        0x00, 0x00,             // reserved
        0x04, 0x00, 0x00, 0x00, // length: 4
    ];

    #[test]
    fn decode_explicit_headers_short_and_long_form() {
        let ts = TransferSyntax::ExplicitVrLittleEndian;
        let mut src = Source::new(RAW_EXPLICIT, Endianness::Little);

        let header = decode_header(&mut src, ts, &StubDataDictionary).unwrap();
        assert_eq!(
            header,
            DataElementHeader::new(Tag(0x0002, 0x0002), VR::UI, Length(26))
        );
        assert_eq!(src.position(), 8);

        let header = decode_header(&mut src, ts, &StubDataDictionary).unwrap();
        assert_eq!(
            header,
            DataElementHeader::new(Tag(0x7FE0, 0x0010), VR::OB, Length(4))
        );
        assert!(src.is_at_end());
    }

    #[test]
    fn encode_explicit_headers_short_and_long_form() {
        let ts = TransferSyntax::ExplicitVrLittleEndian;
        let mut sink = Sink::new(Endianness::Little);

        let n = encode_header(&mut sink, Tag(0x0002, 0x0002), VR::UI, Length(26), ts);
        assert_eq!(n, 8);
        let n = encode_header(&mut sink, Tag(0x7FE0, 0x0010), VR::OB, Length(4), ts);
        assert_eq!(n, 12);

        assert_eq!(sink.as_bytes(), RAW_EXPLICIT);
    }

    #[test]
    fn decode_explicit_header_big_endian() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x00, 0x28, 0x00, 0x10, // tag (0028,0010)
            b'U', b'S',             // VR
            0x00, 0x02,             // length: 2
        ];
        let mut src = Source::new(raw, Endianness::Big);
        let header = decode_header(
            &mut src,
            TransferSyntax::ExplicitVrBigEndian,
            &StubDataDictionary,
        )
        .unwrap();
        assert_eq!(
            header,
            DataElementHeader::new(Tag(0x0028, 0x0010), VR::US, Length(2))
        );
    }

    #[test]
    fn unknown_explicit_vr_code_becomes_un() {
        // bogus VR code "ZZ", then a long form length (UN is long form)
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0x09, 0x00, 0x01, 0x00, // tag (0009,0001)
            b'Z', b'Z',             // VR
            0x00, 0x00,             // reserved
            0x02, 0x00, 0x00, 0x00, // length: 2
        ];
        let mut src = Source::new(raw, Endianness::Little);
        let header = decode_header(
            &mut src,
            TransferSyntax::ExplicitVrLittleEndian,
            &StubDataDictionary,
        )
        .unwrap();
        assert_eq!(header.vr, VR::UN);
        assert_eq!(header.len, Length(2));
    }

    #[test]
    fn implicit_vr_resolution() {
        let dict = StandardDataDictionary;

        // dictionary hit
        let mut src = Source::new(
            &[0x10, 0x00, 0x10, 0x00, 0x08, 0x00, 0x00, 0x00],
            Endianness::Little,
        );
        let header =
            decode_header(&mut src, TransferSyntax::ImplicitVrLittleEndian, &dict).unwrap();
        assert_eq!(
            header,
            DataElementHeader::new(Tag(0x0010, 0x0010), VR::PN, Length(8))
        );

        // private tag miss with a defined length: UN
        let mut src = Source::new(
            &[0x09, 0x00, 0x01, 0x00, 0x06, 0x00, 0x00, 0x00],
            Endianness::Little,
        );
        let header =
            decode_header(&mut src, TransferSyntax::ImplicitVrLittleEndian, &dict).unwrap();
        assert_eq!(header.vr, VR::UN);
        assert_eq!(header.len, Length(6));

        // miss with an undefined length: SQ
        let mut src = Source::new(
            &[0x09, 0x00, 0x01, 0x10, 0xFF, 0xFF, 0xFF, 0xFF],
            Endianness::Little,
        );
        let header =
            decode_header(&mut src, TransferSyntax::ImplicitVrLittleEndian, &dict).unwrap();
        assert_eq!(header.vr, VR::SQ);
        assert!(header.len.is_undefined());

        // pixel data and overlay data always resolve to OW
        assert_eq!(
            implicit_vr_of(Tag(0x7FE0, 0x0010), Length(4), &StubDataDictionary),
            VR::OW
        );
        assert_eq!(
            implicit_vr_of(Tag(0x6002, 0x3000), Length(4), &StubDataDictionary),
            VR::OW
        );
    }

    #[test]
    fn delimitation_tags_never_carry_a_vr() {
        #[rustfmt::skip]
        let raw: &[u8] = &[
            0xFE, 0xFF, 0x00, 0xE0, // tag (FFFE,E000)
            0xFF, 0xFF, 0xFF, 0xFF, // undefined length
        ];
        let mut src = Source::new(raw, Endianness::Little);
        let header = decode_header(
            &mut src,
            TransferSyntax::ExplicitVrLittleEndian,
            &StubDataDictionary,
        )
        .unwrap();
        assert_eq!(header.tag, Tag::ITEM);
        assert!(header.len.is_undefined());
    }

    #[test]
    fn item_header_round_trip() {
        let mut sink = Sink::new(Endianness::Little);
        encode_item_header(
            &mut sink,
            SequenceItemHeader::Item {
                len: Length::UNDEFINED,
            },
        );
        encode_item_header(&mut sink, SequenceItemHeader::ItemDelimiter);
        encode_item_header(&mut sink, SequenceItemHeader::SequenceDelimiter);

        let bytes = sink.into_vec();
        let mut src = Source::new(&bytes, Endianness::Little);
        assert!(matches!(
            decode_item_header(&mut src).unwrap(),
            SequenceItemHeader::Item { len } if len.is_undefined()
        ));
        assert_eq!(
            decode_item_header(&mut src).unwrap(),
            SequenceItemHeader::ItemDelimiter
        );
        assert_eq!(
            decode_item_header(&mut src).unwrap(),
            SequenceItemHeader::SequenceDelimiter
        );
    }

    #[test]
    fn non_item_tag_is_an_item_header_error() {
        let mut src = Source::new(
            &[0x10, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00],
            Endianness::Little,
        );
        assert!(decode_item_header(&mut src).is_err());
    }
}
