//! DICOM JSON deserialization module

use std::str::FromStr;

use crate::DicomJson;
use base64::Engine;
use dcmio_codec::Dataset;
use dcmio_core::value::C;
use dcmio_core::{DataElement, PrimitiveValue, Tag, Value, VR};
use serde::de::{Deserialize, DeserializeOwned, Error as _, Visitor};

use self::value::{BulkDataUri, DicomJsonPerson, InlineBinaryData, NumberOrText};

mod value;

/// Deserialize a piece of DICOM data from a string of JSON.
pub fn from_str<'a, T>(string: &'a str) -> Result<T, serde_json::Error>
where
    DicomJson<T>: Deserialize<'a>,
{
    serde_json::from_str::<DicomJson<T>>(string).map(DicomJson::into_inner)
}

/// Deserialize a piece of DICOM data from a byte slice.
pub fn from_slice<'a, T>(slice: &'a [u8]) -> Result<T, serde_json::Error>
where
    DicomJson<T>: Deserialize<'a>,
{
    serde_json::from_slice::<DicomJson<T>>(slice).map(DicomJson::into_inner)
}

/// Deserialize a piece of DICOM data from a standard byte reader.
pub fn from_reader<R, T>(reader: R) -> Result<T, serde_json::Error>
where
    R: std::io::Read,
    DicomJson<T>: DeserializeOwned,
{
    serde_json::from_reader::<_, DicomJson<T>>(reader).map(DicomJson::into_inner)
}

/// Deserialize a piece of DICOM data from a serde JSON value.
pub fn from_value<T>(value: serde_json::Value) -> Result<T, serde_json::Error>
where
    DicomJson<T>: DeserializeOwned,
{
    serde_json::from_value::<DicomJson<T>>(value).map(DicomJson::into_inner)
}

#[derive(Debug, Default)]
struct DatasetVisitor;

impl<'de> Visitor<'de> for DatasetVisitor {
    type Value = Dataset;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a DICOM data set map")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut obj = Dataset::new();
        while let Some(e) = map.next_entry::<DicomJson<Tag>, JsonDataElement>()? {
            let (
                DicomJson(tag),
                JsonDataElement {
                    vr,
                    value,
                    bulk_data_uri,
                },
            ) = e;
            if bulk_data_uri.is_some() {
                tracing::warn!("bulk data URI is not supported; skipping {}", tag);
            } else {
                obj.put(DataElement::new(tag, vr, value));
            }
        }
        Ok(obj)
    }
}

impl<'de> Deserialize<'de> for DicomJson<Dataset> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(DatasetVisitor).map(DicomJson)
    }
}

#[derive(Debug)]
struct JsonDataElement {
    vr: VR,
    value: Value<Dataset>,
    bulk_data_uri: Option<BulkDataUri>,
}

#[derive(Debug, Default)]
struct DataElementVisitor;

impl<'de> Visitor<'de> for DataElementVisitor {
    type Value = JsonDataElement;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a data element object")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut vr = None;
        let mut value: Option<serde_json::Value> = None;
        let mut inline_binary = None;
        let mut bulk_data_uri = None;

        while let Some(key) = map.next_key::<String>()? {
            match &*key {
                "vr" => {
                    if vr.is_some() {
                        return Err(A::Error::custom("\"vr\" should only be set once"));
                    }

                    let val: String = map.next_value()?;
                    vr = Some(VR::from_str(&val).unwrap_or(VR::UN));
                }
                "Value" => {
                    if inline_binary.is_some() {
                        return Err(A::Error::custom(
                            "\"Value\" conflicts with \"InlineBinary\"",
                        ));
                    }

                    if bulk_data_uri.is_some() {
                        return Err(A::Error::custom("\"Value\" conflicts with \"BulkDataURI\""));
                    }

                    value = Some(map.next_value()?);
                }
                "InlineBinary" => {
                    if value.is_some() {
                        return Err(A::Error::custom(
                            "\"InlineBinary\" conflicts with \"Value\"",
                        ));
                    }

                    if bulk_data_uri.is_some() {
                        return Err(A::Error::custom(
                            "\"InlineBinary\" conflicts with \"BulkDataURI\"",
                        ));
                    }

                    let val: InlineBinaryData = map.next_value()?;
                    inline_binary = Some(val);
                }
                "BulkDataURI" => {
                    if value.is_some() {
                        return Err(A::Error::custom("\"BulkDataURI\" conflicts with \"Value\""));
                    }

                    if inline_binary.is_some() {
                        return Err(A::Error::custom(
                            "\"BulkDataURI\" conflicts with \"InlineBinary\"",
                        ));
                    }

                    let val: BulkDataUri = map.next_value()?;
                    bulk_data_uri = Some(val);
                }
                _ => {
                    return Err(A::Error::custom("Unrecognized data element field"));
                }
            }
        }

        // ensure that VR is present
        let Some(vr) = vr else {
            return Err(A::Error::custom("missing VR field"));
        };

        let mut values = None;
        if let Some(value) = value {
            // deserialize value in different ways
            // depending on VR
            match vr {
                // sequence
                VR::SQ => {
                    let items: Vec<DicomJson<Dataset>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<Dataset> =
                        items.into_iter().map(DicomJson::into_inner).collect();
                    values = Some(Value::Sequence(items));
                }
                // always text
                VR::AE
                | VR::AS
                | VR::CS
                | VR::DA
                | VR::DT
                | VR::LO
                | VR::LT
                | VR::SH
                | VR::ST
                | VR::UT
                | VR::UR
                | VR::TM
                | VR::UC
                | VR::UI => {
                    let items: Vec<Option<String>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<String> =
                        items.into_iter().map(|v| v.unwrap_or_default()).collect();
                    values = Some(PrimitiveValue::Strs(items).into());
                }

                // should always be signed 16-bit integers
                VR::SS => {
                    let items: Vec<i16> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::I16(items.into()).into());
                }
                // should always be unsigned 16-bit integers
                VR::US | VR::OW => {
                    let items: Vec<u16> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::U16(items.into()).into());
                }
                // should always be signed 32-bit integers
                VR::SL => {
                    let items: Vec<i32> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::I32(items.into()).into());
                }
                VR::OB => {
                    let items: Vec<u8> = serde_json::from_value(value).map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::U8(items.into()).into());
                }
                // sometimes numbers, sometimes text,
                // should parse on the spot
                VR::FL | VR::OF => {
                    let items: Vec<NumberOrText<f32>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<f32> = items
                        .into_iter()
                        .map(|v| v.to_num())
                        .collect::<Result<C<f32>, _>>()
                        .map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::F32(items).into());
                }
                VR::FD | VR::OD => {
                    let items: Vec<NumberOrText<f64>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<f64> = items
                        .into_iter()
                        .map(|v| v.to_num())
                        .collect::<Result<C<f64>, _>>()
                        .map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::F64(items).into());
                }
                VR::SV => {
                    let items: Vec<NumberOrText<i64>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<i64> = items
                        .into_iter()
                        .map(|v| v.to_num())
                        .collect::<Result<C<i64>, _>>()
                        .map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::I64(items).into());
                }
                VR::UL | VR::OL => {
                    let items: Vec<NumberOrText<u32>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<u32> = items
                        .into_iter()
                        .map(|v| v.to_num())
                        .collect::<Result<C<u32>, _>>()
                        .map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::U32(items).into());
                }
                VR::UV | VR::OV => {
                    let items: Vec<NumberOrText<u64>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<u64> = items
                        .into_iter()
                        .map(|v| v.to_num())
                        .collect::<Result<C<u64>, _>>()
                        .map_err(A::Error::custom)?;
                    values = Some(PrimitiveValue::U64(items).into());
                }
                // sometimes numbers, sometimes text,
                // but retain string form
                VR::DS | VR::IS => {
                    let items: Vec<NumberOrText<f64>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<String> = items.into_iter().map(|v| v.to_string()).collect();
                    values = Some(PrimitiveValue::Strs(items).into());
                }
                // person names
                VR::PN => {
                    let items: Vec<DicomJsonPerson> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<String> = items.into_iter().map(|v| v.to_string()).collect();
                    values = Some(PrimitiveValue::Strs(items).into());
                }
                // tags
                VR::AT => {
                    let items: Vec<DicomJson<Tag>> =
                        serde_json::from_value(value).map_err(A::Error::custom)?;
                    let items: C<Tag> = items.into_iter().map(DicomJson::into_inner).collect();
                    values = Some(PrimitiveValue::Tags(items).into());
                }
                // unknown
                VR::UN => return Err(A::Error::custom("can't parse JSON Value in UN")),
            }
        }

        let value = match (values, inline_binary) {
            (None, None) => PrimitiveValue::Empty.into(),
            (None, Some(InlineBinaryData::Single(data))) => {
                let data = base64::engine::general_purpose::STANDARD
                    .decode(data)
                    .map_err(|_| A::Error::custom("inline binary data is not valid base64"))?;
                PrimitiveValue::from(data).into()
            }
            (None, Some(InlineBinaryData::Frames(frames))) => {
                let frames: C<Vec<u8>> = frames
                    .into_iter()
                    .map(|frame| {
                        base64::engine::general_purpose::STANDARD
                            .decode(frame)
                            .map_err(|_| {
                                A::Error::custom("inline binary frame is not valid base64")
                            })
                    })
                    .collect::<Result<_, _>>()?;
                Value::Frames(frames)
            }
            (Some(values), None) => values,
            _ => unreachable!(),
        };

        Ok(JsonDataElement {
            vr,
            value,
            bulk_data_uri,
        })
    }
}

impl<'de> Deserialize<'de> for JsonDataElement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_struct(
            "DataElement",
            &["vr", "Value", "InlineBinary", "BulkDataURI"],
            DataElementVisitor,
        )
    }
}

#[derive(Debug)]
struct TagVisitor;

impl Visitor<'_> for TagVisitor {
    type Value = Tag;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a DICOM tag string in the form \"GGGGEEEE\"")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for DicomJson<Tag> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(TagVisitor).map(DicomJson)
    }
}

#[cfg(test)]
mod tests {
    use super::from_str;
    use dcmio_codec::Dataset;
    use dcmio_core::{DataElement, PrimitiveValue, Tag, Value, VR};

    #[test]
    fn can_parse_tags() {
        let serialized = "\"00080010\"";
        let tag: Tag = from_str(serialized).unwrap();
        assert_eq!(tag, Tag(0x0008, 0x0010));

        let serialized = "\"00200013\"";
        let tag: Tag = from_str(serialized).unwrap();
        assert_eq!(tag, Tag(0x0020, 0x0013));
    }

    #[test]
    fn can_parse_simple_data_sets() {
        let serialized = serde_json::json!({
            "00080005": {
                "Value": [ "ISO_IR 192" ],
                "vr": "CS"
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
        });

        let obj: Dataset = super::from_value(serialized).unwrap();

        let tag = Tag(0x0008, 0x0005);
        assert_eq!(
            obj.get(tag),
            Some(&DataElement::new(tag, VR::CS, "ISO_IR 192")),
        );

        let tag = Tag(0x0009, 0x1002);
        assert_eq!(
            obj.get(tag),
            Some(&DataElement::new(
                tag,
                VR::UN,
                PrimitiveValue::from(vec![0xcf_u8, 0x4c, 0x7d, 0x73, 0xcb, 0xfb]),
            )),
        );
    }

    #[test]
    fn can_parse_null_values() {
        let serialized = serde_json::json!({
            "00080008": {
                "Value": [
                  "DERIVED",
                  "PRIMARY",
                  null,
                  "100000"
                ],
                "vr": "CS"
              }
        });

        let obj: Dataset = super::from_value(serialized).unwrap();

        let tag = Tag(0x0008, 0x0008);
        let strings: Vec<String> = ["DERIVED", "PRIMARY", "", "100000"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            obj.get(tag),
            Some(&DataElement::new(
                tag,
                VR::CS,
                PrimitiveValue::Strs(strings.into())
            )),
        );
    }

    #[test]
    fn ignores_bulk_data_elements() {
        let serialized = serde_json::json!({
            "7FE00010": {
                "vr": "OW",
                "BulkDataURI": "http://localhost:8042/studies/2.25.1/instances/2.25.2/bulk/7fe00010"
            },
            "00080060": {
                "vr": "CS",
                "Value": [ "MR" ]
            }
        });

        let obj: Dataset = super::from_value(serialized).unwrap();
        assert!(obj.get(Tag(0x7FE0, 0x0010)).is_none());
        assert!(obj.get(Tag(0x0008, 0x0060)).is_some());
    }

    #[test]
    fn rejects_conflicting_fields_and_missing_vr() {
        let conflicting = serde_json::json!({
            "7FE00010": {
                "vr": "OB",
                "Value": [1, 2],
                "InlineBinary": "AQI="
            }
        });
        assert!(super::from_value::<Dataset>(conflicting).is_err());

        let conflicting = serde_json::json!({
            "7FE00010": {
                "vr": "OB",
                "InlineBinary": "AQI=",
                "BulkDataURI": "http://localhost/bulk"
            }
        });
        assert!(super::from_value::<Dataset>(conflicting).is_err());

        let missing_vr = serde_json::json!({
            "00080060": {
                "Value": [ "MR" ]
            }
        });
        assert!(super::from_value::<Dataset>(missing_vr).is_err());
    }

    #[test]
    fn can_parse_inline_binary_frames() {
        let serialized = serde_json::json!({
            "7FE00010": {
                "vr": "OB",
                "InlineBinary": [ "AQI=", "AwQ=" ]
            }
        });

        let obj: Dataset = super::from_value(serialized).unwrap();
        let e = obj.get(Tag(0x7FE0, 0x0010)).unwrap();
        assert_eq!(
            e.value(),
            &Value::Frames(vec![vec![0x01, 0x02], vec![0x03, 0x04]].into()),
        );
    }

    #[test]
    fn can_parse_nan_and_inf_float() {
        let serialized = serde_json::json!({
            "0018605A": {
                "vr": "FL",
                "Value": [
                    5492.8545,
                    5462.5205,
                    "NaN",
                    "-inf",
                    "inf"
                ]
            }
        });

        let obj: Dataset = super::from_value(serialized).unwrap();
        let tag = Tag(0x0018, 0x605A);
        let element = obj.get(tag).unwrap();

        let Some(PrimitiveValue::F32(values)) = element.value().primitive() else {
            panic!("expected a 32-bit float value");
        };
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], 5492.8545);
        assert_eq!(values[1], 5462.5205);
        assert!(values[2].is_nan());
        assert_eq!(values[3], f32::NEG_INFINITY);
        assert_eq!(values[4], f32::INFINITY);
    }

    #[test]
    fn can_parse_sequences() {
        let serialized = serde_json::json!({
            "00081115": {
                "vr": "SQ",
                "Value": [
                    {
                        "0020000E": {
                            "vr": "UI",
                            "Value": [ "2.25.42" ]
                        }
                    }
                ]
            }
        });

        let obj: Dataset = super::from_value(serialized).unwrap();
        let e = obj.get(Tag(0x0008, 0x1115)).unwrap();
        let items = e.items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].get(Tag(0x0020, 0x000E)),
            Some(&DataElement::new(Tag(0x0020, 0x000E), VR::UI, "2.25.42")),
        );
    }
}
