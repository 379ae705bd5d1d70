//! This crate contains the base data types for the `dcmio` ecosystem:
//! the attribute [tag](Tag), the [value representation](VR) enumeration
//! and its per-VR encoding properties, data element and sequence item
//! headers, the in-memory [value](crate::value::Value) model,
//! and the [attribute dictionary](crate::dictionary) interface.
//!
//! No encoding or decoding logic lives here;
//! see the `dcmio-codec` crate for the data set codec.
pub mod dictionary;
pub mod header;
pub mod value;

pub use crate::dictionary::{DataDictionary, DictionaryEntry, TagRange, VirtualVr};
pub use crate::header::{DataElementHeader, Length, SequenceItemHeader, Tag, VR};
pub use crate::value::{C, CastValueError, DataElement, PrimitiveValue, Value, ValueType};
