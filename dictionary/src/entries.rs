//! The attribute table behind the standard dictionary.
//!
//! A curated selection of the standard attributes:
//! the whole file meta group,
//! the common patient/study/series/instance module attributes,
//! the image pixel module (with its context-dependent VRs),
//! the repeating overlay group,
//! and the pixel data attributes.

use dcmio_core::dictionary::TagRange::*;
use dcmio_core::dictionary::VirtualVr::{Exact, Ox, Xs};
use dcmio_core::dictionary::DictionaryEntry;
use dcmio_core::{Tag, VR};

type E = DictionaryEntry;

const fn single(group: u16, elem: u16, alias: &'static str, vr: VR) -> E {
    E {
        tag: Single(Tag(group, elem)),
        alias,
        vr: Exact(vr),
    }
}

#[rustfmt::skip]
pub const ENTRIES: &[E] = &[
    single(0x0000, 0x0000, "CommandGroupLength", VR::UL),
    single(0x0002, 0x0000, "FileMetaInformationGroupLength", VR::UL),
    single(0x0002, 0x0001, "FileMetaInformationVersion", VR::OB),
    single(0x0002, 0x0002, "MediaStorageSOPClassUID", VR::UI),
    single(0x0002, 0x0003, "MediaStorageSOPInstanceUID", VR::UI),
    single(0x0002, 0x0010, "TransferSyntaxUID", VR::UI),
    single(0x0002, 0x0012, "ImplementationClassUID", VR::UI),
    single(0x0002, 0x0013, "ImplementationVersionName", VR::SH),
    single(0x0002, 0x0016, "SourceApplicationEntityTitle", VR::AE),
    single(0x0002, 0x0100, "PrivateInformationCreatorUID", VR::UI),
    single(0x0002, 0x0102, "PrivateInformation", VR::OB),
    single(0x0008, 0x0005, "SpecificCharacterSet", VR::CS),
    single(0x0008, 0x0008, "ImageType", VR::CS),
    single(0x0008, 0x0012, "InstanceCreationDate", VR::DA),
    single(0x0008, 0x0013, "InstanceCreationTime", VR::TM),
    single(0x0008, 0x0016, "SOPClassUID", VR::UI),
    single(0x0008, 0x0018, "SOPInstanceUID", VR::UI),
    single(0x0008, 0x0020, "StudyDate", VR::DA),
    single(0x0008, 0x0021, "SeriesDate", VR::DA),
    single(0x0008, 0x0022, "AcquisitionDate", VR::DA),
    single(0x0008, 0x0023, "ContentDate", VR::DA),
    single(0x0008, 0x002A, "AcquisitionDateTime", VR::DT),
    single(0x0008, 0x0030, "StudyTime", VR::TM),
    single(0x0008, 0x0031, "SeriesTime", VR::TM),
    single(0x0008, 0x0032, "AcquisitionTime", VR::TM),
    single(0x0008, 0x0033, "ContentTime", VR::TM),
    single(0x0008, 0x0050, "AccessionNumber", VR::SH),
    single(0x0008, 0x0060, "Modality", VR::CS),
    single(0x0008, 0x0064, "ConversionType", VR::CS),
    single(0x0008, 0x0070, "Manufacturer", VR::LO),
    single(0x0008, 0x0080, "InstitutionName", VR::LO),
    single(0x0008, 0x0081, "InstitutionAddress", VR::ST),
    single(0x0008, 0x0090, "ReferringPhysicianName", VR::PN),
    single(0x0008, 0x1010, "StationName", VR::SH),
    single(0x0008, 0x1030, "StudyDescription", VR::LO),
    single(0x0008, 0x1032, "ProcedureCodeSequence", VR::SQ),
    single(0x0008, 0x103E, "SeriesDescription", VR::LO),
    single(0x0008, 0x1040, "InstitutionalDepartmentName", VR::LO),
    single(0x0008, 0x1050, "PerformingPhysicianName", VR::PN),
    single(0x0008, 0x1070, "OperatorsName", VR::PN),
    single(0x0008, 0x1090, "ManufacturerModelName", VR::LO),
    single(0x0008, 0x1110, "ReferencedStudySequence", VR::SQ),
    single(0x0008, 0x1115, "ReferencedSeriesSequence", VR::SQ),
    single(0x0008, 0x1140, "ReferencedImageSequence", VR::SQ),
    single(0x0008, 0x1150, "ReferencedSOPClassUID", VR::UI),
    single(0x0008, 0x1155, "ReferencedSOPInstanceUID", VR::UI),
    single(0x0008, 0x2111, "DerivationDescription", VR::ST),
    single(0x0008, 0x2112, "SourceImageSequence", VR::SQ),
    single(0x0008, 0x2218, "AnatomicRegionSequence", VR::SQ),
    single(0x0008, 0x9215, "DerivationCodeSequence", VR::SQ),
    single(0x0010, 0x0010, "PatientName", VR::PN),
    single(0x0010, 0x0020, "PatientID", VR::LO),
    single(0x0010, 0x0021, "IssuerOfPatientID", VR::LO),
    single(0x0010, 0x0030, "PatientBirthDate", VR::DA),
    single(0x0010, 0x0032, "PatientBirthTime", VR::TM),
    single(0x0010, 0x0040, "PatientSex", VR::CS),
    single(0x0010, 0x1010, "PatientAge", VR::AS),
    single(0x0010, 0x1020, "PatientSize", VR::DS),
    single(0x0010, 0x1030, "PatientWeight", VR::DS),
    single(0x0010, 0x2160, "EthnicGroup", VR::SH),
    single(0x0010, 0x21B0, "AdditionalPatientHistory", VR::LT),
    single(0x0010, 0x4000, "PatientComments", VR::LT),
    single(0x0018, 0x0015, "BodyPartExamined", VR::CS),
    single(0x0018, 0x0020, "ScanningSequence", VR::CS),
    single(0x0018, 0x0021, "SequenceVariant", VR::CS),
    single(0x0018, 0x0022, "ScanOptions", VR::CS),
    single(0x0018, 0x0050, "SliceThickness", VR::DS),
    single(0x0018, 0x0060, "KVP", VR::DS),
    single(0x0018, 0x0080, "RepetitionTime", VR::DS),
    single(0x0018, 0x0081, "EchoTime", VR::DS),
    single(0x0018, 0x0082, "InversionTime", VR::DS),
    single(0x0018, 0x0083, "NumberOfAverages", VR::DS),
    single(0x0018, 0x0086, "EchoNumbers", VR::IS),
    single(0x0018, 0x0087, "MagneticFieldStrength", VR::DS),
    single(0x0018, 0x0088, "SpacingBetweenSlices", VR::DS),
    single(0x0018, 0x1000, "DeviceSerialNumber", VR::LO),
    single(0x0018, 0x1020, "SoftwareVersions", VR::LO),
    single(0x0018, 0x1030, "ProtocolName", VR::LO),
    single(0x0018, 0x1063, "FrameTime", VR::DS),
    single(0x0018, 0x1151, "XRayTubeCurrent", VR::IS),
    single(0x0018, 0x1152, "Exposure", VR::IS),
    single(0x0018, 0x5100, "PatientPosition", VR::CS),
    single(0x0020, 0x000D, "StudyInstanceUID", VR::UI),
    single(0x0020, 0x000E, "SeriesInstanceUID", VR::UI),
    single(0x0020, 0x0010, "StudyID", VR::SH),
    single(0x0020, 0x0011, "SeriesNumber", VR::IS),
    single(0x0020, 0x0012, "AcquisitionNumber", VR::IS),
    single(0x0020, 0x0013, "InstanceNumber", VR::IS),
    single(0x0020, 0x0032, "ImagePositionPatient", VR::DS),
    single(0x0020, 0x0037, "ImageOrientationPatient", VR::DS),
    single(0x0020, 0x0052, "FrameOfReferenceUID", VR::UI),
    single(0x0020, 0x0060, "Laterality", VR::CS),
    single(0x0020, 0x1040, "PositionReferenceIndicator", VR::LO),
    single(0x0020, 0x1041, "SliceLocation", VR::DS),
    single(0x0020, 0x4000, "ImageComments", VR::LT),
    single(0x0028, 0x0002, "SamplesPerPixel", VR::US),
    single(0x0028, 0x0004, "PhotometricInterpretation", VR::CS),
    single(0x0028, 0x0006, "PlanarConfiguration", VR::US),
    single(0x0028, 0x0008, "NumberOfFrames", VR::IS),
    single(0x0028, 0x0009, "FrameIncrementPointer", VR::AT),
    single(0x0028, 0x0010, "Rows", VR::US),
    single(0x0028, 0x0011, "Columns", VR::US),
    single(0x0028, 0x0030, "PixelSpacing", VR::DS),
    single(0x0028, 0x0034, "PixelAspectRatio", VR::IS),
    single(0x0028, 0x0100, "BitsAllocated", VR::US),
    single(0x0028, 0x0101, "BitsStored", VR::US),
    single(0x0028, 0x0102, "HighBit", VR::US),
    single(0x0028, 0x0103, "PixelRepresentation", VR::US),
    E { tag: Single(Tag(0x0028, 0x0106)), alias: "SmallestImagePixelValue", vr: Xs },
    E { tag: Single(Tag(0x0028, 0x0107)), alias: "LargestImagePixelValue", vr: Xs },
    E { tag: Single(Tag(0x0028, 0x0120)), alias: "PixelPaddingValue", vr: Xs },
    single(0x0028, 0x1050, "WindowCenter", VR::DS),
    single(0x0028, 0x1051, "WindowWidth", VR::DS),
    single(0x0028, 0x1052, "RescaleIntercept", VR::DS),
    single(0x0028, 0x1053, "RescaleSlope", VR::DS),
    single(0x0028, 0x1054, "RescaleType", VR::LO),
    single(0x0028, 0x1055, "WindowCenterWidthExplanation", VR::LO),
    E { tag: Single(Tag(0x0028, 0x1101)), alias: "RedPaletteColorLookupTableDescriptor", vr: Xs },
    E { tag: Single(Tag(0x0028, 0x1102)), alias: "GreenPaletteColorLookupTableDescriptor", vr: Xs },
    E { tag: Single(Tag(0x0028, 0x1103)), alias: "BluePaletteColorLookupTableDescriptor", vr: Xs },
    single(0x0028, 0x1201, "RedPaletteColorLookupTableData", VR::OW),
    single(0x0028, 0x1202, "GreenPaletteColorLookupTableData", VR::OW),
    single(0x0028, 0x1203, "BluePaletteColorLookupTableData", VR::OW),
    single(0x0028, 0x2110, "LossyImageCompression", VR::CS),
    single(0x0028, 0x2112, "LossyImageCompressionRatio", VR::DS),
    single(0x0032, 0x1060, "RequestedProcedureDescription", VR::LO),
    single(0x0040, 0x0244, "PerformedProcedureStepStartDate", VR::DA),
    single(0x0040, 0x0245, "PerformedProcedureStepStartTime", VR::TM),
    single(0x0040, 0x0253, "PerformedProcedureStepID", VR::SH),
    single(0x0040, 0x0254, "PerformedProcedureStepDescription", VR::LO),
    single(0x0040, 0x0275, "RequestAttributesSequence", VR::SQ),
    single(0x0040, 0xA730, "ContentSequence", VR::SQ),
    single(0x5200, 0x9229, "SharedFunctionalGroupsSequence", VR::SQ),
    single(0x5200, 0x9230, "PerFrameFunctionalGroupsSequence", VR::SQ),
    E { tag: Group100(Tag(0x6000, 0x0010)), alias: "OverlayRows", vr: Exact(VR::US) },
    E { tag: Group100(Tag(0x6000, 0x0011)), alias: "OverlayColumns", vr: Exact(VR::US) },
    E { tag: Group100(Tag(0x6000, 0x0040)), alias: "OverlayType", vr: Exact(VR::CS) },
    E { tag: Group100(Tag(0x6000, 0x0050)), alias: "OverlayOrigin", vr: Exact(VR::SS) },
    E { tag: Group100(Tag(0x6000, 0x0100)), alias: "OverlayBitsAllocated", vr: Exact(VR::US) },
    E { tag: Group100(Tag(0x6000, 0x0102)), alias: "OverlayBitPosition", vr: Exact(VR::US) },
    E { tag: Group100(Tag(0x6000, 0x3000)), alias: "OverlayData", vr: Ox },
    single(0x7FE0, 0x0008, "FloatPixelData", VR::OF),
    single(0x7FE0, 0x0009, "DoubleFloatPixelData", VR::OD),
    E { tag: Single(Tag(0x7FE0, 0x0010)), alias: "PixelData", vr: Ox },
    single(0xFFFC, 0xFFFC, "DataSetTrailingPadding", VR::OB),
];
