//! This crate implements a standard DICOM attribute dictionary.
//!
//! - [`data_element`] contains the run-time dictionary:
//!   a registry of the attributes covered by this library,
//!   provided as a singleton behind the unit type
//!   [`StandardDataDictionary`].
//! - [`tags`] contains the same attributes as compile-time constants,
//!   which perform an equivalent mapping without a look-up cost.

pub mod data_element;
pub mod tags;

mod entries;

pub use data_element::{StandardDataDictionary, StandardDataDictionaryRegistry};
