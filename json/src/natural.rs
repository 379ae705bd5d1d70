//! A "natural" JSON mapping for DICOM data sets,
//! where attributes are keyed by their dictionary keyword
//! and single values collapse to plain JSON scalars.
//!
//! This form is friendlier to hand editing than standard DICOM JSON,
//! but it is lossy with respect to the wire VR:
//! attributes whose dictionary VR is context dependent (or absent)
//! have their actual VR recorded in a side table
//! ([`NaturalDataset::vr_overrides`])
//! so that [`denaturalize`] can reconstruct the same element.
//!
//! ```
//! use dcmio_codec::Dataset;
//! use dcmio_core::{DataElement, VR};
//! use dcmio_dictionary::{tags, StandardDataDictionary};
//!
//! let obj: Dataset = [
//!     DataElement::new(tags::PATIENT_NAME, VR::PN, "Doe^John"),
//!     DataElement::new(tags::MODALITY, VR::CS, "MR"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let natural = dcmio_json::naturalize(&obj, &StandardDataDictionary);
//! assert_eq!(natural.attrs["PatientName"], "Doe^John");
//! assert_eq!(natural.attrs["Modality"], "MR");
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dcmio_codec::Dataset;
use dcmio_core::dictionary::{DataDictionary, VirtualVr};
use dcmio_core::value::C;
use dcmio_core::{DataElement, PrimitiveValue, Tag, Value, VR};
use serde_json::{Map, Value as Json};
use snafu::{Backtrace, OptionExt, ResultExt, Snafu};
use tracing::warn;

use crate::{INFINITY, NAN, NEG_INFINITY};

/// Error type for the natural-to-DICOM conversion.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// A string value was longer than its VR allows
    /// and the options reject overlong values.
    #[snafu(display("value of `{}` exceeds the {} byte maximum of {}", name, max, vr))]
    ValueTooLong {
        name: String,
        vr: VR,
        max: u32,
        backtrace: Backtrace,
    },
    /// A binary attribute did not hold valid base64 data.
    #[snafu(display("invalid base64 data in `{}`", name))]
    InvalidBase64 {
        name: String,
        source: base64::DecodeError,
        backtrace: Backtrace,
    },
    /// An AT attribute held a string which is not a tag.
    #[snafu(display("invalid attribute tag in `{}`", name))]
    InvalidTagValue { name: String, backtrace: Backtrace },
    /// A numeric attribute held a value which could not be
    /// represented in the VR's binary type.
    #[snafu(display("invalid number for `{}` ({})", name, vr))]
    InvalidNumber {
        name: String,
        vr: VR,
        backtrace: Backtrace,
    },
    /// The JSON value's shape does not fit the attribute's VR.
    #[snafu(display("unsupported JSON value for `{}` ({})", name, vr))]
    UnsupportedValue {
        name: String,
        vr: VR,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Policy for natural string values
/// which exceed the maximum length of their VR.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub enum OverlongStrings {
    /// Fail the conversion.
    Reject,
    /// Truncate to the maximum length silently.
    Truncate,
    /// Truncate to the maximum length and log a warning.
    #[default]
    WarnAndTruncate,
}

/// Options for [`denaturalize`].
#[derive(Debug, Default, Clone)]
#[non_exhaustive]
pub struct DenaturalizeOptions {
    /// What to do with string values longer than their VR allows.
    pub overlong_strings: OverlongStrings,
}

/// A DICOM data set in its natural JSON form.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NaturalDataset {
    /// The attributes, keyed by dictionary keyword
    /// (or by `"GGGGEEEE"` for attributes unknown to the dictionary).
    pub attrs: Map<String, Json>,
    /// The wire VR of every attribute, at any nesting level,
    /// whose VR could not be recovered from the dictionary alone.
    ///
    /// The table is flat: an attribute occurring at several nesting
    /// levels shares a single entry, and the last occurrence wins.
    pub vr_overrides: BTreeMap<String, VR>,
}

/// Convert a data set into its natural JSON form.
///
/// Attribute keywords come from the given dictionary;
/// attributes unknown to it are keyed by `"GGGGEEEE"` instead.
/// Single values collapse to scalars,
/// a sequence with a single item collapses to a plain object,
/// binary values become base64 strings,
/// and encapsulated frames become an array of base64 strings
/// (one per frame, never collapsed).
pub fn naturalize<D>(dataset: &Dataset, dict: &D) -> NaturalDataset
where
    D: DataDictionary + ?Sized,
{
    let mut vr_overrides = BTreeMap::new();
    let attrs = naturalize_into(dataset, dict, &mut vr_overrides);
    NaturalDataset {
        attrs,
        vr_overrides,
    }
}

fn naturalize_into<D>(
    dataset: &Dataset,
    dict: &D,
    overrides: &mut BTreeMap<String, VR>,
) -> Map<String, Json>
where
    D: DataDictionary + ?Sized,
{
    let mut attrs = Map::new();
    for e in dataset.iter() {
        let tag = e.tag();
        let (key, exact_vr) = match dict.by_tag(tag) {
            Some(entry) => (entry.alias().to_owned(), entry.vr().exact().is_some()),
            None => (tag_key(tag), false),
        };
        if !exact_vr {
            overrides.insert(key.clone(), e.vr());
        }
        attrs.insert(key, natural_value(e, dict, overrides));
    }
    attrs
}

fn natural_value<D>(
    e: &DataElement<Dataset>,
    dict: &D,
    overrides: &mut BTreeMap<String, VR>,
) -> Json
where
    D: DataDictionary + ?Sized,
{
    match e.value() {
        Value::Sequence(items) => collapse(
            items
                .iter()
                .map(|item| Json::Object(naturalize_into(item, dict, overrides)))
                .collect(),
        ),
        // one base64 string per frame, never collapsed
        Value::Frames(frames) => Json::Array(
            frames
                .iter()
                .map(|frame| Json::String(BASE64.encode(frame)))
                .collect(),
        ),
        Value::Primitive(v) => natural_primitive(v),
    }
}

fn natural_primitive(v: &PrimitiveValue) -> Json {
    use PrimitiveValue::*;
    match v {
        Empty => Json::Null,
        Str(s) => Json::String(s.clone()),
        Strs(c) => collapse(c.iter().cloned().map(Json::String).collect()),
        Tags(c) => collapse(c.iter().map(|&tag| Json::String(tag_key(tag))).collect()),
        U8(c) => Json::String(BASE64.encode(&c[..])),
        I16(c) => collapse(c.iter().map(|&n| Json::from(n)).collect()),
        U16(c) => collapse(c.iter().map(|&n| Json::from(n)).collect()),
        I32(c) => collapse(c.iter().map(|&n| Json::from(n)).collect()),
        U32(c) => collapse(c.iter().map(|&n| Json::from(n)).collect()),
        I64(c) => collapse(c.iter().map(|&n| Json::from(n)).collect()),
        U64(c) => collapse(c.iter().map(|&n| Json::from(n)).collect()),
        F32(c) => collapse(c.iter().map(|&n| float_json(f64::from(n))).collect()),
        F64(c) => collapse(c.iter().map(|&n| float_json(n)).collect()),
    }
}

fn collapse(mut values: Vec<Json>) -> Json {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Json::Array(values)
    }
}

fn float_json(n: f64) -> Json {
    if n.is_nan() {
        Json::String(NAN.to_owned())
    } else if n == f64::INFINITY {
        Json::String(INFINITY.to_owned())
    } else if n == f64::NEG_INFINITY {
        Json::String(NEG_INFINITY.to_owned())
    } else {
        serde_json::Number::from_f64(n)
            .map(Json::Number)
            .unwrap_or(Json::Null)
    }
}

fn tag_key(tag: Tag) -> String {
    format!("{:04X}{:04X}", tag.group(), tag.element())
}

/// Convert a natural JSON data set back into a DICOM data set.
///
/// Attribute keywords are resolved through the given dictionary;
/// keys of the form `"GGGGEEEE"` are parsed as tags directly,
/// and any other unknown key is logged and skipped.
/// The VR of each attribute comes from the dictionary when it is exact,
/// or from the side table ([`NaturalDataset::vr_overrides`]) otherwise;
/// a missing override is logged and a VR is assumed
/// from the dictionary entry and the value's sign.
pub fn denaturalize<D>(
    natural: &NaturalDataset,
    dict: &D,
    options: &DenaturalizeOptions,
) -> Result<Dataset>
where
    D: DataDictionary + ?Sized,
{
    denaturalize_map(&natural.attrs, &natural.vr_overrides, dict, options)
}

fn denaturalize_map<D>(
    attrs: &Map<String, Json>,
    overrides: &BTreeMap<String, VR>,
    dict: &D,
    options: &DenaturalizeOptions,
) -> Result<Dataset>
where
    D: DataDictionary + ?Sized,
{
    let mut out = Dataset::new();
    for (name, value) in attrs {
        let (tag, vr) = match dict.by_name(name) {
            Some(entry) => {
                let vr = match entry.vr() {
                    VirtualVr::Exact(vr) => vr,
                    virtual_vr => overrides.get(name).copied().unwrap_or_else(|| {
                        let vr = assumed_vr(virtual_vr, value);
                        warn!("no recorded VR for `{}`, assuming {}", name, vr);
                        vr
                    }),
                };
                (entry.tag(), vr)
            }
            None => match Tag::from_str(name) {
                Ok(tag) => {
                    let vr = overrides
                        .get(name)
                        .copied()
                        .or_else(|| dict.by_tag(tag).map(|entry| assumed_vr(entry.vr(), value)))
                        .unwrap_or(VR::UN);
                    (tag, vr)
                }
                Err(_) => {
                    warn!("unknown attribute `{}`, skipping", name);
                    continue;
                }
            },
        };
        let value = denaturalize_value(name, vr, value, overrides, dict, options)?;
        out.put(DataElement::new(tag, vr, value));
    }
    Ok(out)
}

/// Pick a concrete VR for an attribute whose wire VR was not recorded.
/// `Xs` resolves to US, or to SS when any component is negative,
/// so that the value stays representable.
fn assumed_vr(virtual_vr: VirtualVr, value: &Json) -> VR {
    match virtual_vr {
        VirtualVr::Xs if has_negative(value) => VR::SS,
        other => other.relaxed(),
    }
}

fn has_negative(value: &Json) -> bool {
    components(value).into_iter().any(|v| match v {
        Json::Number(n) => n.as_f64().is_some_and(|f| f < 0.0),
        Json::String(s) => s.trim_start().starts_with('-'),
        _ => false,
    })
}

fn denaturalize_value<D>(
    name: &str,
    vr: VR,
    value: &Json,
    overrides: &BTreeMap<String, VR>,
    dict: &D,
    options: &DenaturalizeOptions,
) -> Result<Value<Dataset>>
where
    D: DataDictionary + ?Sized,
{
    if value.is_null() {
        return Ok(Value::Primitive(PrimitiveValue::Empty));
    }
    if vr == VR::SQ {
        let items = sequence_items(name, value)?
            .into_iter()
            .map(|item| denaturalize_map(item, overrides, dict, options))
            .collect::<Result<C<Dataset>>>()?;
        return Ok(Value::Sequence(items));
    }
    if vr.is_bytes() {
        return match value {
            Json::String(data) => {
                let data = BASE64
                    .decode(data)
                    .context(InvalidBase64Snafu { name })?;
                Ok(Value::Primitive(PrimitiveValue::U8(data.into())))
            }
            Json::Array(parts) => {
                let frames = parts
                    .iter()
                    .map(|part| match part {
                        Json::String(data) => {
                            BASE64.decode(data).context(InvalidBase64Snafu { name })
                        }
                        _ => UnsupportedValueSnafu { name, vr }.fail(),
                    })
                    .collect::<Result<C<Vec<u8>>>>()?;
                Ok(Value::Frames(frames))
            }
            _ => UnsupportedValueSnafu { name, vr }.fail(),
        };
    }
    if vr == VR::AT {
        let tags = components(value)
            .into_iter()
            .map(|v| match v {
                Json::String(s) => {
                    Tag::from_str(s).ok().context(InvalidTagValueSnafu { name })
                }
                _ => UnsupportedValueSnafu { name, vr }.fail(),
            })
            .collect::<Result<C<Tag>>>()?;
        return Ok(Value::Primitive(PrimitiveValue::Tags(tags)));
    }
    if vr.is_string() {
        return if vr.allow_multiple() {
            let strings = components(value)
                .into_iter()
                .map(|v| bounded(name, vr, component_string(name, vr, v)?, options))
                .collect::<Result<C<String>>>()?;
            Ok(Value::Primitive(PrimitiveValue::Strs(strings)))
        } else {
            let s = bounded(name, vr, component_string(name, vr, value)?, options)?;
            Ok(Value::Primitive(PrimitiveValue::Str(s)))
        };
    }
    let numbers = match vr {
        VR::SS => PrimitiveValue::I16(numbers(name, vr, value)?),
        VR::US => PrimitiveValue::U16(numbers(name, vr, value)?),
        VR::SL => PrimitiveValue::I32(numbers(name, vr, value)?),
        VR::UL => PrimitiveValue::U32(numbers(name, vr, value)?),
        VR::SV => PrimitiveValue::I64(numbers(name, vr, value)?),
        VR::UV => PrimitiveValue::U64(numbers(name, vr, value)?),
        VR::FL => PrimitiveValue::F32(numbers(name, vr, value)?),
        VR::FD => PrimitiveValue::F64(numbers(name, vr, value)?),
        _ => return UnsupportedValueSnafu { name, vr }.fail(),
    };
    Ok(Value::Primitive(numbers))
}

fn sequence_items<'a>(name: &str, value: &'a Json) -> Result<Vec<&'a Map<String, Json>>> {
    match value {
        // a collapsed single item
        Json::Object(item) => Ok(vec![item]),
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::Object(item) => Ok(item),
                _ => UnsupportedValueSnafu { name, vr: VR::SQ }.fail(),
            })
            .collect(),
        _ => UnsupportedValueSnafu { name, vr: VR::SQ }.fail(),
    }
}

fn components(value: &Json) -> Vec<&Json> {
    match value {
        Json::Array(values) => values.iter().collect(),
        other => vec![other],
    }
}

fn component_string(name: &str, vr: VR, value: &Json) -> Result<String> {
    match value {
        Json::String(s) => Ok(s.clone()),
        Json::Number(n) => Ok(n.to_string()),
        Json::Null => Ok(String::new()),
        _ => UnsupportedValueSnafu { name, vr }.fail(),
    }
}

fn bounded(name: &str, vr: VR, s: String, options: &DenaturalizeOptions) -> Result<String> {
    let Some(max) = vr.max_length() else {
        return Ok(s);
    };
    if s.len() <= max as usize {
        return Ok(s);
    }
    match options.overlong_strings {
        OverlongStrings::Reject => ValueTooLongSnafu { name, vr, max }.fail(),
        OverlongStrings::Truncate => Ok(truncated(s, max as usize)),
        OverlongStrings::WarnAndTruncate => {
            warn!(
                "value of `{}` exceeds the {} byte maximum of {}, truncating",
                name, max, vr
            );
            Ok(truncated(s, max as usize))
        }
    }
}

fn truncated(mut s: String, max: usize) -> String {
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    s
}

fn numbers<T>(name: &str, vr: VR, value: &Json) -> Result<C<T>>
where
    T: num_traits::NumCast + FromStr,
{
    components(value)
        .into_iter()
        .map(|v| match v {
            Json::Number(n) => {
                let narrowed = if let Some(i) = n.as_i64() {
                    num_traits::NumCast::from(i)
                } else if let Some(u) = n.as_u64() {
                    num_traits::NumCast::from(u)
                } else {
                    n.as_f64().and_then(num_traits::NumCast::from)
                };
                narrowed.context(InvalidNumberSnafu { name, vr })
            }
            // accepts the non-finite float tokens as well
            Json::String(s) => s.parse().ok().context(InvalidNumberSnafu { name, vr }),
            _ => UnsupportedValueSnafu { name, vr }.fail(),
        })
        .collect()
}
