//! The transfer syntax repertoire:
//! how a data set's elements are laid out on the wire.

use byteordered::Endianness;

/// A DICOM transfer syntax supported by this crate.
///
/// The encapsulated syntaxes identify a compressed pixel data format;
/// this crate handles their fragment framing only,
/// never the compressed payloads themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TransferSyntax {
    /// Implicit VR Little Endian, the default transfer syntax.
    ImplicitVrLittleEndian,
    /// Explicit VR Little Endian.
    ExplicitVrLittleEndian,
    /// Explicit VR Big Endian (retired, still found in the wild).
    ExplicitVrBigEndian,
    /// An encapsulated pixel data syntax.
    /// Always explicit VR little endian.
    Encapsulated(Encapsulation),
}

/// The encapsulated pixel data formats known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Encapsulation {
    /// JPEG Baseline (Process 1)
    JpegBaseline,
    /// JPEG Extended (Process 2 & 4)
    JpegExtended,
    /// JPEG Lossless, Non-Hierarchical (Process 14)
    JpegLossless,
    /// JPEG Lossless, Non-Hierarchical, First-Order Prediction
    /// (Process 14, Selection Value 1)
    JpegLosslessSv1,
    /// JPEG-LS Lossless
    JpegLsLossless,
    /// JPEG-LS Lossy (Near-Lossless)
    JpegLsNearLossless,
    /// JPEG 2000 (Lossless Only)
    Jpeg2000Lossless,
    /// JPEG 2000
    Jpeg2000,
    /// RLE Lossless
    RleLossless,
}

impl TransferSyntax {
    /// The unique identifier of this transfer syntax.
    pub fn uid(self) -> &'static str {
        use Encapsulation::*;
        match self {
            TransferSyntax::ImplicitVrLittleEndian => "1.2.840.10008.1.2",
            TransferSyntax::ExplicitVrLittleEndian => "1.2.840.10008.1.2.1",
            TransferSyntax::ExplicitVrBigEndian => "1.2.840.10008.1.2.2",
            TransferSyntax::Encapsulated(JpegBaseline) => "1.2.840.10008.1.2.4.50",
            TransferSyntax::Encapsulated(JpegExtended) => "1.2.840.10008.1.2.4.51",
            TransferSyntax::Encapsulated(JpegLossless) => "1.2.840.10008.1.2.4.57",
            TransferSyntax::Encapsulated(JpegLosslessSv1) => "1.2.840.10008.1.2.4.70",
            TransferSyntax::Encapsulated(JpegLsLossless) => "1.2.840.10008.1.2.4.80",
            TransferSyntax::Encapsulated(JpegLsNearLossless) => "1.2.840.10008.1.2.4.81",
            TransferSyntax::Encapsulated(Jpeg2000Lossless) => "1.2.840.10008.1.2.4.90",
            TransferSyntax::Encapsulated(Jpeg2000) => "1.2.840.10008.1.2.4.91",
            TransferSyntax::Encapsulated(RleLossless) => "1.2.840.10008.1.2.5",
        }
    }

    /// Look up a transfer syntax by its unique identifier.
    ///
    /// Trailing NUL and space padding is ignored,
    /// as UI values are padded to even length on the wire.
    pub fn from_uid(uid: &str) -> Option<Self> {
        use Encapsulation::*;
        match uid.trim_end_matches(|c| c == '\0' || c == ' ') {
            "1.2.840.10008.1.2" => Some(TransferSyntax::ImplicitVrLittleEndian),
            "1.2.840.10008.1.2.1" => Some(TransferSyntax::ExplicitVrLittleEndian),
            "1.2.840.10008.1.2.2" => Some(TransferSyntax::ExplicitVrBigEndian),
            "1.2.840.10008.1.2.4.50" => Some(TransferSyntax::Encapsulated(JpegBaseline)),
            "1.2.840.10008.1.2.4.51" => Some(TransferSyntax::Encapsulated(JpegExtended)),
            "1.2.840.10008.1.2.4.57" => Some(TransferSyntax::Encapsulated(JpegLossless)),
            "1.2.840.10008.1.2.4.70" => Some(TransferSyntax::Encapsulated(JpegLosslessSv1)),
            "1.2.840.10008.1.2.4.80" => Some(TransferSyntax::Encapsulated(JpegLsLossless)),
            "1.2.840.10008.1.2.4.81" => Some(TransferSyntax::Encapsulated(JpegLsNearLossless)),
            "1.2.840.10008.1.2.4.90" => Some(TransferSyntax::Encapsulated(Jpeg2000Lossless)),
            "1.2.840.10008.1.2.4.91" => Some(TransferSyntax::Encapsulated(Jpeg2000)),
            "1.2.840.10008.1.2.5" => Some(TransferSyntax::Encapsulated(RleLossless)),
            _ => None,
        }
    }

    /// The byte order of the data set's multi-byte values.
    pub fn endianness(self) -> Endianness {
        match self {
            TransferSyntax::ExplicitVrBigEndian => Endianness::Big,
            _ => Endianness::Little,
        }
    }

    /// Whether element headers carry an explicit VR code.
    pub fn explicit_vr(self) -> bool {
        !matches!(self, TransferSyntax::ImplicitVrLittleEndian)
    }

    /// Whether pixel data is stored in encapsulated fragments.
    pub fn is_encapsulated(self) -> bool {
        matches!(self, TransferSyntax::Encapsulated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_round_trip() {
        for ts in [
            TransferSyntax::ImplicitVrLittleEndian,
            TransferSyntax::ExplicitVrLittleEndian,
            TransferSyntax::ExplicitVrBigEndian,
            TransferSyntax::Encapsulated(Encapsulation::JpegBaseline),
            TransferSyntax::Encapsulated(Encapsulation::Jpeg2000),
            TransferSyntax::Encapsulated(Encapsulation::RleLossless),
        ] {
            assert_eq!(TransferSyntax::from_uid(ts.uid()), Some(ts));
        }
        assert_eq!(TransferSyntax::from_uid("1.2.840.10008.1.1"), None);
    }

    #[test]
    fn from_uid_tolerates_padding() {
        assert_eq!(
            TransferSyntax::from_uid("1.2.840.10008.1.2.1\0"),
            Some(TransferSyntax::ExplicitVrLittleEndian)
        );
        assert_eq!(
            TransferSyntax::from_uid("1.2.840.10008.1.2 "),
            Some(TransferSyntax::ImplicitVrLittleEndian)
        );
    }

    #[test]
    fn properties() {
        assert!(!TransferSyntax::ImplicitVrLittleEndian.explicit_vr());
        assert!(TransferSyntax::ExplicitVrBigEndian.explicit_vr());
        assert_eq!(
            TransferSyntax::ExplicitVrBigEndian.endianness(),
            Endianness::Big
        );
        let rle = TransferSyntax::Encapsulated(Encapsulation::RleLossless);
        assert!(rle.is_encapsulated());
        assert!(rle.explicit_vr());
        assert_eq!(rle.endianness(), Endianness::Little);
    }
}
