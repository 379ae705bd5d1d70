//! The Part 10 file container:
//! the 128-byte preamble, the "DICM" magic code,
//! the file meta group and the main data set.

use crate::cursor::{Sink, Source};
use crate::dataset::{self, Dataset, ReadOptions, WriteOptions};
use crate::element::encode_header;
use crate::transfer_syntax::TransferSyntax;
use byteordered::Endianness;
use dcmio_core::{CastValueError, DataElement, Length, PrimitiveValue, Tag, Value, VR};
use dcmio_dictionary::{tags, StandardDataDictionary};
use smallvec::smallvec;
use snafu::{ensure, Backtrace, OptionExt, ResultExt, Snafu};

/// The implementation class UID of this library,
/// written to new file meta groups by default.
pub const IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.10.1102.1";

/// The implementation version name of this library,
/// written to new file meta groups by default.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DCMIO_0_1";

/// Error type for reading and writing Part 10 files.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The file preamble or magic code could not be read.
    #[snafu(display("failed to read the file preamble"))]
    ReadPrefix {
        source: crate::cursor::Error,
        backtrace: Backtrace,
    },
    /// The magic code after the preamble was not "DICM".
    #[snafu(display("invalid DICOM file magic code"))]
    InvalidMagic { backtrace: Backtrace },
    /// The element after the magic code was not
    /// _File Meta Information Group Length_ (0002,0000).
    #[snafu(display("expected the meta group length element, found {}", tag))]
    UnexpectedElement { tag: Tag, backtrace: Backtrace },
    /// The file meta group could not be decoded.
    #[snafu(display("failed to decode the file meta group"))]
    ReadMeta { source: dataset::Error },
    /// The main data set could not be decoded.
    #[snafu(display("failed to decode the main data set"))]
    ReadDataset { source: dataset::Error },
    /// The file meta group has no _Transfer Syntax UID_ attribute.
    #[snafu(display("missing the transfer syntax UID attribute"))]
    MissingTransferSyntax { backtrace: Backtrace },
    /// The _Transfer Syntax UID_ attribute does not hold text.
    #[snafu(display("transfer syntax UID attribute is not textual"))]
    NonTextualTransferSyntax {
        source: CastValueError,
        backtrace: Backtrace,
    },
    /// The declared transfer syntax is not supported.
    #[snafu(display("unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
    /// A required file meta attribute was not provided to the builder.
    #[snafu(display("missing file meta attribute {}", tag))]
    MissingMetaAttribute { tag: Tag, backtrace: Backtrace },
    /// The underlying reader or writer failed.
    #[snafu(display("I/O failure"))]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A DICOM Part 10 file:
/// the file meta group and the main data set.
///
/// The _File Meta Information Group Length_ (0002,0000) attribute
/// is consumed on read and recomputed on write;
/// it is never kept in [`meta`](DicomFile::meta).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DicomFile {
    /// The file meta group,
    /// always encoded in Explicit VR Little Endian.
    pub meta: Dataset,
    /// The main data set,
    /// encoded in the transfer syntax declared by the meta group.
    pub dataset: Dataset,
}

impl DicomFile {
    /// Create a file from its two data sets.
    pub fn new(meta: Dataset, dataset: Dataset) -> Self {
        DicomFile { meta, dataset }
    }

    /// Read a file with default options.
    pub fn read(src: &mut Source<'_>) -> Result<DicomFile> {
        DicomFile::read_with(src, &ReadOptions::default())
    }

    /// Read a file:
    /// skip the preamble, check the magic code,
    /// read the meta group over exactly its declared group length,
    /// then read the main data set
    /// in the transfer syntax the meta group declares.
    pub fn read_with(src: &mut Source<'_>, options: &ReadOptions) -> Result<DicomFile> {
        let meta = src.with_endianness(Endianness::Little, |src| -> Result<Dataset> {
            src.skip(128).context(ReadPrefixSnafu)?;
            let magic = src.read_bytes(4).context(ReadPrefixSnafu)?;
            ensure!(magic == b"DICM", InvalidMagicSnafu);

            // (0002,0000) UL, 4 bytes: the byte length of the rest of the group
            let tag = src.read_tag().context(ReadPrefixSnafu)?;
            ensure!(
                tag == tags::FILE_META_INFORMATION_GROUP_LENGTH,
                UnexpectedElementSnafu { tag }
            );
            src.skip(4).context(ReadPrefixSnafu)?;
            let group_len = src.read_u32().context(ReadPrefixSnafu)?;

            let mut group = src
                .take(group_len as usize)
                .context(ReadPrefixSnafu)?;
            Dataset::read(&mut group, TransferSyntax::ExplicitVrLittleEndian)
                .context(ReadMetaSnafu)
        })?;

        let ts = transfer_syntax_of(&meta)?;
        let dataset = Dataset::read_with(src, ts, &StandardDataDictionary, options)
            .context(ReadDatasetSnafu)?;
        Ok(DicomFile { meta, dataset })
    }

    /// Read a file from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<DicomFile> {
        let mut src = Source::new(bytes, Endianness::Little);
        DicomFile::read(&mut src)
    }

    /// Read a file from the given reader, buffering its whole content.
    pub fn read_from<R: std::io::Read>(mut reader: R) -> Result<DicomFile> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).context(IoSnafu)?;
        DicomFile::from_bytes(&bytes)
    }

    /// The transfer syntax of the main data set,
    /// as declared by the meta group.
    pub fn transfer_syntax(&self) -> Result<TransferSyntax> {
        transfer_syntax_of(&self.meta)
    }

    /// Write the file with default options.
    /// Returns the number of bytes written.
    pub fn write(&self, sink: &mut Sink) -> Result<usize> {
        self.write_with(sink, &WriteOptions::default())
    }

    /// Write the file:
    /// 128 zero bytes, "DICM",
    /// the meta group in Explicit VR Little Endian
    /// with a recomputed group length,
    /// then the main data set in the declared transfer syntax.
    pub fn write_with(&self, sink: &mut Sink, options: &WriteOptions) -> Result<usize> {
        let ts = self.transfer_syntax()?;

        let n = sink.with_endianness(Endianness::Little, |sink| {
            sink.write_bytes(&[0u8; 128]);
            sink.write_str("DICM");

            // encode the group after (0002,0000) to learn its length;
            // any stored group length is discarded
            let explicit_le = TransferSyntax::ExplicitVrLittleEndian;
            let mut body = Sink::new(Endianness::Little);
            let group_len: usize = self
                .meta
                .iter()
                .filter(|e| e.tag() != tags::FILE_META_INFORMATION_GROUP_LENGTH)
                .map(|e| dataset::write_element(&mut body, e, explicit_le, options))
                .sum();

            encode_header(
                sink,
                tags::FILE_META_INFORMATION_GROUP_LENGTH,
                VR::UL,
                Length(4),
                explicit_le,
            );
            sink.write_u32(group_len as u32);
            sink.append(body);
            132 + 12 + group_len
        });

        Ok(n + self.dataset.write_with(sink, ts, options))
    }

    /// Write the file into a new byte vector.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut sink = Sink::new(Endianness::Little);
        self.write(&mut sink)?;
        Ok(sink.into_vec())
    }

    /// Write the file to the given writer.
    /// Returns the number of bytes written.
    pub fn write_to<W: std::io::Write>(&self, mut writer: W) -> Result<usize> {
        let bytes = self.to_vec()?;
        writer.write_all(&bytes).context(IoSnafu)?;
        Ok(bytes.len())
    }
}

fn transfer_syntax_of(meta: &Dataset) -> Result<TransferSyntax> {
    let uid = meta
        .get(tags::TRANSFER_SYNTAX_UID)
        .context(MissingTransferSyntaxSnafu)?
        .to_str()
        .context(NonTextualTransferSyntaxSnafu)?;
    TransferSyntax::from_uid(&uid).context(UnsupportedTransferSyntaxSnafu {
        uid: uid.trim_end_matches(['\0', ' ']),
    })
}

/// A builder for a well-formed file meta group.
///
/// The media storage SOP class and instance UIDs
/// and the transfer syntax are required;
/// the implementation identifiers default to this library's.
#[derive(Debug, Default, Clone)]
pub struct MetaBuilder {
    media_storage_sop_class_uid: Option<String>,
    media_storage_sop_instance_uid: Option<String>,
    transfer_syntax: Option<TransferSyntax>,
    implementation_class_uid: Option<String>,
    implementation_version_name: Option<String>,
    source_application_entity_title: Option<String>,
}

impl MetaBuilder {
    pub fn new() -> Self {
        MetaBuilder::default()
    }

    pub fn media_storage_sop_class_uid(mut self, uid: impl Into<String>) -> Self {
        self.media_storage_sop_class_uid = Some(uid.into());
        self
    }

    pub fn media_storage_sop_instance_uid(mut self, uid: impl Into<String>) -> Self {
        self.media_storage_sop_instance_uid = Some(uid.into());
        self
    }

    pub fn transfer_syntax(mut self, ts: TransferSyntax) -> Self {
        self.transfer_syntax = Some(ts);
        self
    }

    pub fn implementation_class_uid(mut self, uid: impl Into<String>) -> Self {
        self.implementation_class_uid = Some(uid.into());
        self
    }

    pub fn implementation_version_name(mut self, name: impl Into<String>) -> Self {
        self.implementation_version_name = Some(name.into());
        self
    }

    pub fn source_application_entity_title(mut self, title: impl Into<String>) -> Self {
        self.source_application_entity_title = Some(title.into());
        self
    }

    /// Build the file meta group.
    ///
    /// Fails if the media storage SOP class UID,
    /// the media storage SOP instance UID
    /// or the transfer syntax was not provided.
    pub fn build(self) -> Result<Dataset> {
        let sop_class = self
            .media_storage_sop_class_uid
            .context(MissingMetaAttributeSnafu {
                tag: tags::MEDIA_STORAGE_SOP_CLASS_UID,
            })?;
        let sop_instance = self
            .media_storage_sop_instance_uid
            .context(MissingMetaAttributeSnafu {
                tag: tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            })?;
        let ts = self.transfer_syntax.context(MissingMetaAttributeSnafu {
            tag: tags::TRANSFER_SYNTAX_UID,
        })?;

        let mut meta = Dataset::new();
        meta.put(DataElement::new(
            tags::FILE_META_INFORMATION_VERSION,
            VR::OB,
            Value::Primitive(PrimitiveValue::U8(smallvec![0x00, 0x01])),
        ));
        meta.put(DataElement::new(
            tags::MEDIA_STORAGE_SOP_CLASS_UID,
            VR::UI,
            sop_class,
        ));
        meta.put(DataElement::new(
            tags::MEDIA_STORAGE_SOP_INSTANCE_UID,
            VR::UI,
            sop_instance,
        ));
        meta.put(DataElement::new(tags::TRANSFER_SYNTAX_UID, VR::UI, ts.uid()));
        meta.put(DataElement::new(
            tags::IMPLEMENTATION_CLASS_UID,
            VR::UI,
            self.implementation_class_uid
                .unwrap_or_else(|| IMPLEMENTATION_CLASS_UID.to_owned()),
        ));
        meta.put(DataElement::new(
            tags::IMPLEMENTATION_VERSION_NAME,
            VR::SH,
            self.implementation_version_name
                .unwrap_or_else(|| IMPLEMENTATION_VERSION_NAME.to_owned()),
        ));
        if let Some(title) = self.source_application_entity_title {
            meta.put(DataElement::new(
                tags::SOURCE_APPLICATION_ENTITY_TITLE,
                VR::AE,
                title,
            ));
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer_syntax::Encapsulation;
    use dcmio_core::C;

    const CT_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";

    fn sample_meta(ts: TransferSyntax) -> Dataset {
        MetaBuilder::new()
            .media_storage_sop_class_uid(CT_STORAGE)
            .media_storage_sop_instance_uid("1.2.3.4.5.6")
            .transfer_syntax(ts)
            .build()
            .unwrap()
    }

    fn sample_dataset() -> Dataset {
        let mut obj = Dataset::new();
        obj.put(DataElement::new(tags::SOP_CLASS_UID, VR::UI, CT_STORAGE));
        obj.put(DataElement::new(tags::SOP_INSTANCE_UID, VR::UI, "1.2.3.4.5.6"));
        obj.put(DataElement::new(tags::PATIENT_NAME, VR::PN, "Doe^John"));
        obj.put(DataElement::new(
            tags::ROWS,
            VR::US,
            Value::Primitive(PrimitiveValue::U16(smallvec![2])),
        ));
        obj
    }

    #[test]
    fn meta_builder_requires_the_storage_attributes() {
        assert!(matches!(
            MetaBuilder::new().build(),
            Err(Error::MissingMetaAttribute { .. })
        ));
        assert!(matches!(
            MetaBuilder::new()
                .media_storage_sop_class_uid(CT_STORAGE)
                .media_storage_sop_instance_uid("1.2.3.4.5.6")
                .build(),
            Err(Error::MissingMetaAttribute { .. })
        ));
    }

    #[test]
    fn meta_builder_fills_in_defaults() {
        let meta = sample_meta(TransferSyntax::ExplicitVrLittleEndian);
        assert_eq!(
            meta.get(tags::FILE_META_INFORMATION_VERSION)
                .unwrap()
                .value()
                .primitive(),
            Some(&PrimitiveValue::U8(smallvec![0x00, 0x01]))
        );
        assert_eq!(
            meta.get(tags::TRANSFER_SYNTAX_UID).unwrap().to_str().unwrap(),
            "1.2.840.10008.1.2.1"
        );
        assert_eq!(
            meta.get(tags::IMPLEMENTATION_CLASS_UID)
                .unwrap()
                .to_str()
                .unwrap(),
            IMPLEMENTATION_CLASS_UID
        );
        assert!(meta.get(tags::SOURCE_APPLICATION_ENTITY_TITLE).is_none());
    }

    #[test]
    fn file_layout_and_group_length() {
        let file = DicomFile::new(
            sample_meta(TransferSyntax::ExplicitVrLittleEndian),
            Dataset::new(),
        );
        let bytes = file.to_vec().unwrap();

        assert!(bytes[..128].iter().all(|&b| b == 0));
        assert_eq!(&bytes[128..132], b"DICM");
        // (0002,0000) UL 4
        assert_eq!(
            &bytes[132..140],
            &[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00]
        );
        let group_len = u32::from_le_bytes([bytes[140], bytes[141], bytes[142], bytes[143]]);
        // with an empty main data set, the group spans the rest of the file
        assert_eq!(group_len as usize, bytes.len() - 144);
    }

    #[test]
    fn stored_group_length_is_never_trusted() {
        let mut meta = sample_meta(TransferSyntax::ExplicitVrLittleEndian);
        meta.put(DataElement::new(
            tags::FILE_META_INFORMATION_GROUP_LENGTH,
            VR::UL,
            Value::Primitive(PrimitiveValue::U32(smallvec![0xDEAD])),
        ));
        let file = DicomFile::new(meta, Dataset::new());
        let bytes = file.to_vec().unwrap();

        let group_len = u32::from_le_bytes([bytes[140], bytes[141], bytes[142], bytes[143]]);
        assert_eq!(group_len as usize, bytes.len() - 144);

        // the read side does not retain (0002,0000)
        let read_back = DicomFile::from_bytes(&bytes).unwrap();
        assert!(read_back
            .meta
            .get(tags::FILE_META_INFORMATION_GROUP_LENGTH)
            .is_none());
    }

    #[test]
    fn round_trip_in_plain_transfer_syntaxes() {
        for ts in [
            TransferSyntax::ImplicitVrLittleEndian,
            TransferSyntax::ExplicitVrLittleEndian,
            TransferSyntax::ExplicitVrBigEndian,
        ] {
            let file = DicomFile::new(sample_meta(ts), sample_dataset());
            let bytes = file.to_vec().unwrap();
            let read_back = DicomFile::from_bytes(&bytes).unwrap();
            assert_eq!(read_back.transfer_syntax().unwrap(), ts);
            assert_eq!(read_back, file);
        }
    }

    #[test]
    fn round_trip_encapsulated() {
        let ts = TransferSyntax::Encapsulated(Encapsulation::JpegBaseline);
        let mut dataset = sample_dataset();
        let frames: C<Vec<u8>> = smallvec![vec![0xA0; 6], vec![0xB0; 4]];
        dataset.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OB,
            Value::Frames(frames),
        ));

        let file = DicomFile::new(sample_meta(ts), dataset);
        let bytes = file.to_vec().unwrap();
        let read_back = DicomFile::from_bytes(&bytes).unwrap();
        assert_eq!(read_back.transfer_syntax().unwrap(), ts);
        assert_eq!(read_back, file);
    }

    #[test]
    fn invalid_magic_is_an_error() {
        let mut bytes = vec![0u8; 132];
        bytes[128..132].copy_from_slice(b"DACM");
        assert!(matches!(
            DicomFile::from_bytes(&bytes),
            Err(Error::InvalidMagic { .. })
        ));
    }

    #[test]
    fn missing_transfer_syntax_is_an_error() {
        let mut meta = sample_meta(TransferSyntax::ExplicitVrLittleEndian);
        meta.remove(tags::TRANSFER_SYNTAX_UID);
        let file = DicomFile::new(meta, Dataset::new());
        assert!(matches!(
            file.to_vec(),
            Err(Error::MissingTransferSyntax { .. })
        ));
    }

    #[test]
    fn unknown_transfer_syntax_is_an_error() {
        let mut meta = sample_meta(TransferSyntax::ExplicitVrLittleEndian);
        meta.put(DataElement::new(
            tags::TRANSFER_SYNTAX_UID,
            VR::UI,
            "1.2.840.10008.1.20.1",
        ));
        let file = DicomFile::new(meta, Dataset::new());
        assert!(matches!(
            file.to_vec(),
            Err(Error::UnsupportedTransferSyntax { .. })
        ));
    }

    #[test]
    fn io_adapters_round_trip() {
        let file = DicomFile::new(
            sample_meta(TransferSyntax::ExplicitVrLittleEndian),
            sample_dataset(),
        );
        let mut buffer = Vec::new();
        let n = file.write_to(&mut buffer).unwrap();
        assert_eq!(n, buffer.len());

        let read_back = DicomFile::read_from(&buffer[..]).unwrap();
        assert_eq!(read_back, file);
    }
}
