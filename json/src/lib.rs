//! DICOM JSON module
//!
//! This crate provides serialization of DICOM data sets to JSON
//! and deserialization of JSON to DICOM data sets,
//! as per the [DICOM standard part 18 chapter F][1].
//!
//! [1]: https://dicom.nema.org/medical/dicom/current/output/chtml/part18/chapter_F.html
//!
//! The easiest path to serialization is through
//! the functions readily available, such as [`to_string`] and [`to_value`].
//! Alternatively, DICOM data can be enclosed by a [`DicomJson`] value,
//! which implements serialization and deserialization via [Serde](serde).
//!
//! The [`natural`] module provides an additional, non-standard mapping
//! where attributes are keyed by their dictionary keyword
//! and single values collapse to plain JSON scalars.
//!
//! # Example
//!
//! ```
//! use dcmio_codec::Dataset;
//! use dcmio_core::{DataElement, VR};
//! use dcmio_dictionary::tags;
//!
//! let obj: Dataset = [
//!     DataElement::new(tags::STUDY_DATE, VR::DA, "20230610"),
//!     DataElement::new(tags::INSTANCE_NUMBER, VR::IS, "5"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let json = dcmio_json::to_string(&obj)?;
//!
//! assert_eq!(
//!     json,
//!     r#"{"00080020":{"vr":"DA","Value":["20230610"]},"00200013":{"vr":"IS","Value":["5"]}}"#
//! );
//!
//! Ok::<(), serde_json::Error>(())
//! ```

mod de;
pub mod natural;
mod ser;

pub use crate::de::{from_reader, from_slice, from_str, from_value};
pub use crate::natural::{
    denaturalize, naturalize, DenaturalizeOptions, NaturalDataset, OverlongStrings,
};
pub use crate::ser::{to_string, to_string_pretty, to_value, to_vec, to_writer};

/// Token for non-finite "not a number" float values.
const NAN: &str = "NaN";
/// Token for positive infinity float values.
const INFINITY: &str = "inf";
/// Token for negative infinity float values.
const NEG_INFINITY: &str = "-inf";

/// A wrapper type for DICOM JSON serialization.
///
/// Enclosing a supported DICOM data type in `DicomJson`
/// provides an implementation of the respective
/// [`Serialize`](serde::Serialize) and/or [`Deserialize`](serde::Deserialize)
/// traits.
#[derive(Debug, Clone, PartialEq)]
pub struct DicomJson<T>(T);

impl<T> DicomJson<T> {
    /// Unwrap the DICOM JSON wrapper,
    /// returning the underlying value.
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Obtain a reference to the underlying value.
    pub fn inner(&self) -> &T {
        &self.0
    }
}
