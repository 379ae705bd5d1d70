//! DICOM JSON serialization module

use std::io::Write;

use crate::DicomJson;
use dcmio_codec::{Dataset, DicomFile};
use dcmio_core::{DataElement, PrimitiveValue, Tag, Value, VR};
use serde::{ser::SerializeMap, Serialize, Serializer};

use self::value::{AsNumbers, AsPersonNames, AsStrings, AsTags, InlineBinary, InlineFrames};
mod value;

/// Serialize a piece of DICOM data as a string of JSON.
pub fn to_string<T>(data: T) -> Result<String, serde_json::Error>
where
    DicomJson<T>: From<T> + Serialize,
{
    serde_json::to_string(&DicomJson::from(data))
}

/// Serialize a piece of DICOM data as a pretty-printed string of JSON.
pub fn to_string_pretty<T>(data: T) -> Result<String, serde_json::Error>
where
    DicomJson<T>: From<T> + Serialize,
{
    serde_json::to_string_pretty(&DicomJson::from(data))
}

/// Serialize a piece of DICOM data as a serde JSON value.
pub fn to_value<T>(data: T) -> Result<serde_json::Value, serde_json::Error>
where
    DicomJson<T>: From<T> + Serialize,
{
    serde_json::to_value(DicomJson::from(data))
}

/// Serialize a piece of DICOM data to a vector of bytes.
pub fn to_vec<T>(data: T) -> Result<Vec<u8>, serde_json::Error>
where
    DicomJson<T>: From<T> + Serialize,
{
    serde_json::to_vec(&DicomJson::from(data))
}

/// Serialize a piece of DICOM data to a byte writer.
pub fn to_writer<W, T>(writer: W, data: T) -> Result<(), serde_json::Error>
where
    DicomJson<T>: From<T> + Serialize,
    W: Write,
{
    serde_json::to_writer(writer, &DicomJson::from(data))
}

impl<'a> From<&'a DicomFile> for DicomJson<&'a DicomFile> {
    fn from(value: &'a DicomFile) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<&'_ DicomFile> {
    /// Serializes the DICOM file as a JSON map
    /// containing one entry per data element (indexed by tag),
    /// _plus_ the data elements of its file meta group.
    ///
    /// To exclude the file meta group data instead,
    /// serialize the file's main data set (`&file.dataset`).
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_map(None)?;

        for e in self.0.meta.iter().chain(self.0.dataset.iter()) {
            ser.serialize_entry(&DicomJson(e.tag()), &DicomJson(e))?;
        }

        ser.end()
    }
}

impl From<DicomFile> for DicomJson<DicomFile> {
    fn from(value: DicomFile) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<DicomFile> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        DicomJson(&self.0).serialize(serializer)
    }
}

impl<'a> From<&'a Dataset> for DicomJson<&'a Dataset> {
    fn from(value: &'a Dataset) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<&'_ Dataset> {
    /// Serializes the data set as a JSON map
    /// containing one entry per data element,
    /// indexed by tag.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|e| (DicomJson(e.tag()), DicomJson(e))))
    }
}

impl From<Dataset> for DicomJson<Dataset> {
    fn from(value: Dataset) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<Dataset> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        DicomJson(&self.0).serialize(serializer)
    }
}

impl<'a> From<&'a [Dataset]> for DicomJson<&'a [Dataset]> {
    fn from(value: &'a [Dataset]) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<&'_ [Dataset]> {
    /// Serializes the sequence of data sets into a JSON array.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter().map(DicomJson::from))
    }
}

impl<'a> From<&'a DataElement<Dataset>> for DicomJson<&'a DataElement<Dataset>> {
    fn from(value: &'a DataElement<Dataset>) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<&'_ DataElement<Dataset>> {
    /// Serializes the data element as a single JSON map.
    ///
    /// The fields present will be:
    /// - `"vr"`, containing the value representation;
    /// - Either `"Value"` (as an array of values)
    ///   or `"InlineBinary"` (binary data in base64),
    ///   if the value is not empty.
    ///   Encapsulated pixel data frames become
    ///   an `"InlineBinary"` array with one base64 string per frame.
    ///
    /// The DICOM tag is not encoded,
    /// as it is typically serialized as the entry key within a data set.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut serializer = serializer.serialize_map(None)?;
        let vr = self.0.vr();
        serializer.serialize_entry("vr", vr.to_str())?;

        match self.0.value() {
            Value::Sequence(items) => {
                serializer.serialize_entry("Value", &DicomJson(&items[..]))?;
            }
            Value::Frames(frames) => {
                serializer.serialize_entry("InlineBinary", &InlineFrames::from(&frames[..]))?;
            }
            Value::Primitive(PrimitiveValue::Empty) => {
                // no-op
            }
            Value::Primitive(v) => match vr {
                VR::AE
                | VR::AS
                | VR::CS
                | VR::DA
                | VR::DT
                | VR::LO
                | VR::LT
                | VR::SH
                | VR::UC
                | VR::UI
                | VR::UR
                | VR::TM
                | VR::ST
                | VR::UT => {
                    serializer.serialize_entry("Value", &AsStrings::from(v))?;
                }
                VR::AT => {
                    serializer.serialize_entry("Value", &AsTags::from(v))?;
                }
                VR::PN => {
                    serializer.serialize_entry("Value", &AsPersonNames::from(v))?;
                }
                VR::FD
                | VR::IS
                | VR::FL
                | VR::DS
                | VR::SL
                | VR::SS
                | VR::SV
                | VR::UL
                | VR::US
                | VR::UV => {
                    serializer.serialize_entry("Value", &AsNumbers::from(v))?;
                }
                VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN => {
                    serializer.serialize_entry("InlineBinary", &InlineBinary::from(v))?;
                }
                VR::SQ => unreachable!("unexpected VR SQ in primitive value"),
            },
        }

        serializer.end()
    }
}

impl From<Tag> for DicomJson<Tag> {
    fn from(value: Tag) -> Self {
        Self(value)
    }
}

impl Serialize for DicomJson<Tag> {
    /// Serializes the DICOM tag as a single string in uppercase hexadecimal,
    /// with no separators or delimiters (`"GGGGEEEE"`).
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Tag(g, e) = self.0;
        serializer.serialize_str(&format!("{:04X}{:04X}", g, e))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use dcmio_core::value::C;
    use dcmio_dictionary::tags;
    use serde_json::json;

    use super::*;

    #[test]
    fn serialize_simple_data_elements() {
        let obj: Dataset = [
            DataElement::new(
                Tag(0x0008, 0x0005),
                VR::CS,
                PrimitiveValue::from("ISO_IR 192"),
            ),
            DataElement::new(Tag(0x0008, 0x0020), VR::DA, PrimitiveValue::from("20130409")),
            DataElement::new(
                Tag(0x0008, 0x0061),
                VR::CS,
                PrimitiveValue::Strs(vec!["CT".to_owned(), "PET".to_owned()].into()),
            ),
            DataElement::new(
                Tag(0x0008, 0x0090),
                VR::PN,
                PrimitiveValue::from("^Bob^^Dr."),
            ),
            DataElement::new(
                Tag(0x0009, 0x1002),
                VR::UN,
                PrimitiveValue::from(vec![0xcf_u8, 0x4c, 0x7d, 0x73, 0xcb, 0xfb]),
            ),
            DataElement::new(tags::PATIENT_AGE, VR::AS, PrimitiveValue::from("30Y")),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            to_value(&obj).unwrap(),
            json!({
                "00080005": {
                    "vr": "CS",
                    "Value": [ "ISO_IR 192" ]
                },
                "00080020": {
                    "vr": "DA",
                    "Value": [ "20130409" ]
                },
                "00080061": {
                    "vr": "CS",
                    "Value": [
                        "CT",
                        "PET"
                    ]
                },
                "00080090": {
                    "vr": "PN",
                    "Value": [
                      {
                        "Alphabetic": "^Bob^^Dr."
                      }
                    ]
                },
                "00091002": {
                    "vr": "UN",
                    "InlineBinary": "z0x9c8v7"
                },
                "00101010": {
                    "vr": "AS",
                    "Value": [ "30Y" ]
                }
            }),
        );
    }

    #[test]
    fn serialize_numbers_and_tags() {
        let obj: Dataset = [
            DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(512_u16)),
            DataElement::new(
                tags::WINDOW_CENTER,
                VR::DS,
                PrimitiveValue::from("40.0"),
            ),
            DataElement::new(
                tags::FRAME_INCREMENT_POINTER,
                VR::AT,
                PrimitiveValue::from(Tag(0x0018, 0x1063)),
            ),
            DataElement::empty(tags::ACCESSION_NUMBER, VR::SH),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            to_value(&obj).unwrap(),
            json!({
                "00080050": {
                    "vr": "SH"
                },
                "00280009": {
                    "vr": "AT",
                    "Value": [ "00181063" ]
                },
                "00280010": {
                    "vr": "US",
                    "Value": [ 512 ]
                },
                "00281050": {
                    "vr": "DS",
                    "Value": [ "40.0" ]
                },
            }),
        );
    }

    #[test]
    fn serialize_sequence_elements() {
        let item0: Dataset = [
            DataElement::new(Tag(0x0018, 0x9302), VR::CS, "SEQUENCED"),
            DataElement::new(Tag(0x0018, 0x9333), VR::CS, "NO"),
        ]
        .into_iter()
        .collect();
        let item1: Dataset = [DataElement::new(Tag(0x0018, 0x1140), VR::CS, "CW")]
            .into_iter()
            .collect();
        let items: C<Dataset> = vec![item0, item1].into();
        let obj: Dataset = [DataElement::new(
            Tag(0x5200, 0x9229),
            VR::SQ,
            Value::Sequence(items),
        )]
        .into_iter()
        .collect();

        assert_eq!(
            to_value(&obj).unwrap(),
            json!({
                "52009229": {
                    "vr": "SQ",
                    "Value": [
                        {
                            "00189302": {
                                "vr": "CS",
                                "Value": ["SEQUENCED"]
                            },
                            "00189333": {
                                "vr": "CS",
                                "Value": ["NO"]
                            }
                        },
                        {
                            "00181140": {
                                "vr": "CS",
                                "Value": ["CW"]
                            }
                        }
                    ]
                }
            }),
        );
    }

    #[test]
    fn serialize_encapsulated_frames_as_binary_array() {
        let frames: C<Vec<u8>> = vec![vec![0x01, 0x02], vec![0x03, 0x04]].into();
        let obj: Dataset = [DataElement::new(
            tags::PIXEL_DATA,
            VR::OB,
            Value::Frames(frames),
        )]
        .into_iter()
        .collect();

        assert_eq!(
            to_value(&obj).unwrap(),
            json!({
                "7FE00010": {
                    "vr": "OB",
                    "InlineBinary": [ "AQI=", "AwQ=" ]
                }
            }),
        );
    }

    #[test]
    fn serialize_file_with_meta_group() {
        use dcmio_codec::{MetaBuilder, TransferSyntax};

        let meta = MetaBuilder::default()
            .media_storage_sop_class_uid("1.2.840.10008.5.1.4.1.1.7")
            .media_storage_sop_instance_uid("2.25.145")
            .transfer_syntax(TransferSyntax::ExplicitVrLittleEndian)
            .implementation_class_uid("1.2.3.4")
            .implementation_version_name("TEST_01")
            .build()
            .unwrap();
        let dataset: Dataset = [DataElement::new(tags::MODALITY, VR::CS, "OT")]
            .into_iter()
            .collect();
        let file = DicomFile::new(meta, dataset);

        assert_eq!(
            to_value(&file).unwrap(),
            json!({
                "00020001": {
                    "vr": "OB",
                    "InlineBinary": "AAE="
                },
                "00020002": {
                    "vr": "UI",
                    "Value": ["1.2.840.10008.5.1.4.1.1.7"]
                },
                "00020003": {
                    "vr": "UI",
                    "Value": ["2.25.145"]
                },
                "00020010": {
                    "vr": "UI",
                    "Value": ["1.2.840.10008.1.2.1"]
                },
                "00020012": {
                    "vr": "UI",
                    "Value": ["1.2.3.4"]
                },
                "00020013": {
                    "vr": "SH",
                    "Value": ["TEST_01"]
                },
                "00080060": {
                    "vr": "CS",
                    "Value": ["OT"]
                }
            }),
        );
    }
}
