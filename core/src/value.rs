//! A high level abstraction over a DICOM data element's value,
//! plus the data element type tying a tag and VR to a value.
//!
//! Values are either primitive (text, numbers or raw bytes),
//! a sequence of nested items,
//! or a list of reassembled pixel data frames.
//! Element lengths are not retained in memory;
//! they are wire artifacts recomputed on every write.

use crate::header::{Tag, VR};
use smallvec::{smallvec, SmallVec};
use snafu::Snafu;
use std::borrow::Cow;
use std::fmt;

/// An aggregation of one or more elements in a value.
pub type C<T> = SmallVec<[T; 2]>;

/// An error indicating that a value cast failed
/// because the value's actual type did not match the request.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(display("bad value cast: requested {} but value is {}", requested, got))]
pub struct CastValueError {
    /// the requested type
    pub requested: &'static str,
    /// the value's actual type
    pub got: ValueType,
}

/// An enum representing an abstraction of a DICOM value's actual type.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ValueType {
    /// No value.
    Empty,
    /// A single string.
    Str,
    /// A sequence of strings.
    Strs,
    /// A sequence of attribute tags.
    Tags,
    /// The value is a sequence of unsigned 8-bit integers.
    U8,
    /// The value is a sequence of signed 16-bit integers.
    I16,
    /// The value is a sequence of unsigned 16-bit integers.
    U16,
    /// The value is a sequence of signed 32-bit integers.
    I32,
    /// The value is a sequence of unsigned 32-bit integers.
    U32,
    /// The value is a sequence of signed 64-bit integers.
    I64,
    /// The value is a sequence of unsigned 64-bit integers.
    U64,
    /// The value is a sequence of 32-bit floating point numbers.
    F32,
    /// The value is a sequence of 64-bit floating point numbers.
    F64,
    /// A sequence of nested data set items.
    Sequence,
    /// A list of pixel data frames.
    Frames,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// An enum representing a primitive value from a DICOM element.
///
/// Multiple elements of the same type are flattened into
/// a single container ([`C`]).
/// Dates and times stay in their string form.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    /// No data. Usually an escape hatch for a zero-length element.
    Empty,
    /// A sequence of strings.
    /// Used for AE, AS, CS, DA, DS, DT, IS, LO, PN, SH, TM, UC, UI.
    Strs(C<String>),
    /// A single string.
    /// Used for LT, ST, UR and UT, which are never multi-valued.
    Str(String),
    /// A sequence of attribute tags. Used for AT.
    Tags(C<Tag>),
    /// The value is a sequence of unsigned 8-bit integers.
    /// Used for OB, UN and the other raw byte VRs.
    U8(C<u8>),
    /// The value is a sequence of signed 16-bit integers. Used for SS.
    I16(C<i16>),
    /// The value is a sequence of unsigned 16-bit integers. Used for US.
    U16(C<u16>),
    /// The value is a sequence of signed 32-bit integers. Used for SL.
    I32(C<i32>),
    /// The value is a sequence of unsigned 32-bit integers. Used for UL.
    U32(C<u32>),
    /// The value is a sequence of signed 64-bit integers. Used for SV.
    I64(C<i64>),
    /// The value is a sequence of unsigned 64-bit integers. Used for UV.
    U64(C<u64>),
    /// The value is a sequence of 32-bit floating point numbers. Used for FL.
    F32(C<f32>),
    /// The value is a sequence of 64-bit floating point numbers. Used for FD.
    F64(C<f64>),
}

impl PrimitiveValue {
    /// Create a primitive value holding a single string.
    pub fn new_str(value: impl Into<String>) -> Self {
        PrimitiveValue::Str(value.into())
    }

    /// Retrieve the specific type of this value.
    pub fn value_type(&self) -> ValueType {
        use PrimitiveValue::*;
        match self {
            Empty => ValueType::Empty,
            Str(_) => ValueType::Str,
            Strs(_) => ValueType::Strs,
            Tags(_) => ValueType::Tags,
            U8(_) => ValueType::U8,
            I16(_) => ValueType::I16,
            U16(_) => ValueType::U16,
            I32(_) => ValueType::I32,
            U32(_) => ValueType::U32,
            I64(_) => ValueType::I64,
            U64(_) => ValueType::U64,
            F32(_) => ValueType::F32,
            F64(_) => ValueType::F64,
        }
    }

    /// Obtain the number of individual values.
    pub fn multiplicity(&self) -> usize {
        use PrimitiveValue::*;
        match self {
            Empty => 0,
            Str(_) => 1,
            Strs(c) => c.len(),
            Tags(c) => c.len(),
            U8(c) => c.len(),
            I16(c) => c.len(),
            U16(c) => c.len(),
            I32(c) => c.len(),
            U32(c) => c.len(),
            I64(c) => c.len(),
            U64(c) => c.len(),
            F32(c) => c.len(),
            F64(c) => c.len(),
        }
    }

    /// Check whether the value is empty (zero values).
    pub fn is_empty(&self) -> bool {
        self.multiplicity() == 0
    }

    /// Convert the primitive value into a single string,
    /// joining multiple values with a backslash.
    /// Numbers are formatted in their decimal form.
    pub fn to_str(&self) -> Cow<'_, str> {
        use PrimitiveValue::*;
        fn join<T: ToString>(values: &[T]) -> String {
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("\\")
        }
        match self {
            Empty => Cow::from(""),
            Str(s) => Cow::from(s.as_str()),
            Strs(c) if c.len() == 1 => Cow::from(c[0].as_str()),
            Strs(c) => Cow::from(c.join("\\")),
            Tags(c) => Cow::from(join(c)),
            U8(c) => Cow::from(join(c)),
            I16(c) => Cow::from(join(c)),
            U16(c) => Cow::from(join(c)),
            I32(c) => Cow::from(join(c)),
            U32(c) => Cow::from(join(c)),
            I64(c) => Cow::from(join(c)),
            U64(c) => Cow::from(join(c)),
            F32(c) => Cow::from(join(c)),
            F64(c) => Cow::from(join(c)),
        }
    }

    /// Convert the primitive value into a sequence of strings.
    /// If the value is a string, it is split at each backslash
    /// into its individual components.
    /// Numbers are formatted one string per value.
    pub fn to_multi_str(&self) -> Cow<'_, [String]> {
        use PrimitiveValue::*;
        fn seq<T: ToString>(values: &[T]) -> Cow<'static, [String]> {
            Cow::Owned(values.iter().map(|v| v.to_string()).collect())
        }
        match self {
            Empty => Cow::Owned(vec![]),
            Strs(c) => Cow::Borrowed(&c[..]),
            Str(s) => Cow::Owned(s.split('\\').map(str::to_owned).collect()),
            Tags(c) => seq(c),
            U8(c) => seq(c),
            I16(c) => seq(c),
            U16(c) => seq(c),
            I32(c) => seq(c),
            U32(c) => seq(c),
            I64(c) => seq(c),
            U64(c) => seq(c),
            F32(c) => seq(c),
            F64(c) => seq(c),
        }
    }

    /// Get a single string value,
    /// or an error if the value is not a string.
    pub fn string(&self) -> Result<&str, CastValueError> {
        use PrimitiveValue::*;
        match self {
            Strs(c) if c.len() == 1 => Ok(&c[0]),
            Str(s) => Ok(s),
            value => Err(CastValueError {
                requested: "string",
                got: value.value_type(),
            }),
        }
    }

    /// Get the value as a slice of strings,
    /// or an error if the value is not a string sequence.
    pub fn strings(&self) -> Result<&[String], CastValueError> {
        use PrimitiveValue::*;
        match self {
            Strs(c) => Ok(c),
            value => Err(CastValueError {
                requested: "strings",
                got: value.value_type(),
            }),
        }
    }

    /// Get the value as a byte slice,
    /// or an error if the value does not hold raw bytes.
    pub fn bytes(&self) -> Result<&[u8], CastValueError> {
        match self {
            PrimitiveValue::U8(c) => Ok(c),
            value => Err(CastValueError {
                requested: "bytes",
                got: value.value_type(),
            }),
        }
    }

    /// Get a single unsigned 16-bit value,
    /// or an error if the value does not hold exactly one.
    pub fn uint16(&self) -> Result<u16, CastValueError> {
        match self {
            PrimitiveValue::U16(c) if c.len() == 1 => Ok(c[0]),
            value => Err(CastValueError {
                requested: "uint16",
                got: value.value_type(),
            }),
        }
    }

    /// Get a single unsigned 32-bit value,
    /// or an error if the value does not hold exactly one.
    pub fn uint32(&self) -> Result<u32, CastValueError> {
        match self {
            PrimitiveValue::U32(c) if c.len() == 1 => Ok(c[0]),
            value => Err(CastValueError {
                requested: "uint32",
                got: value.value_type(),
            }),
        }
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::Strs(smallvec![value.to_owned()])
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::Strs(smallvec![value])
    }
}

impl From<Vec<u8>> for PrimitiveValue {
    fn from(value: Vec<u8>) -> Self {
        PrimitiveValue::U8(value.into())
    }
}

impl From<&[u8]> for PrimitiveValue {
    fn from(value: &[u8]) -> Self {
        PrimitiveValue::U8(value.into())
    }
}

impl From<Tag> for PrimitiveValue {
    fn from(value: Tag) -> Self {
        PrimitiveValue::Tags(smallvec![value])
    }
}

macro_rules! impl_from_number_for_primitive {
    ($typ: ty, $variant: ident) => {
        impl From<$typ> for PrimitiveValue {
            fn from(value: $typ) -> Self {
                PrimitiveValue::$variant(smallvec![value])
            }
        }

        impl From<Vec<$typ>> for PrimitiveValue {
            fn from(value: Vec<$typ>) -> Self {
                PrimitiveValue::$variant(value.into())
            }
        }
    };
}

impl_from_number_for_primitive!(i16, I16);
impl_from_number_for_primitive!(u16, U16);
impl_from_number_for_primitive!(i32, I32);
impl_from_number_for_primitive!(u32, U32);
impl_from_number_for_primitive!(i64, I64);
impl_from_number_for_primitive!(u64, U64);
impl_from_number_for_primitive!(f32, F32);
impl_from_number_for_primitive!(f64, F64);

/// Representation of a full DICOM value, which may be primitive,
/// a sequence of nested data set items,
/// or a list of encapsulated pixel data frames.
///
/// `I` is the type of the nested data set items.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<I> {
    /// Primitive value.
    Primitive(PrimitiveValue),
    /// A complex sequence of items.
    Sequence(C<I>),
    /// Reassembled encapsulated pixel data, one buffer per frame.
    /// The basic offset table is consumed on read
    /// and recomputed on write, never stored.
    Frames(C<Vec<u8>>),
}

impl<I> Value<I> {
    /// Retrieve the specific type of this value.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Primitive(v) => v.value_type(),
            Value::Sequence(_) => ValueType::Sequence,
            Value::Frames(_) => ValueType::Frames,
        }
    }

    /// Gets a reference to the primitive value.
    pub fn primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Value::Primitive(v) => Some(v),
            _ => None,
        }
    }

    /// Gets a reference to the items of a sequence.
    ///
    /// Returns `None` if the value is not a data set sequence.
    pub fn items(&self) -> Option<&[I]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Gets a reference to the frames of an encapsulated pixel data value.
    ///
    /// Returns `None` if the value is not a frame list.
    pub fn frames(&self) -> Option<&[Vec<u8>]> {
        match self {
            Value::Frames(frames) => Some(frames),
            _ => None,
        }
    }

    /// Convert the value into a single string,
    /// delegating to [`PrimitiveValue::to_str`].
    pub fn to_str(&self) -> Result<Cow<'_, str>, CastValueError> {
        match self {
            Value::Primitive(prim) => Ok(prim.to_str()),
            value => Err(CastValueError {
                requested: "string",
                got: value.value_type(),
            }),
        }
    }

    /// Convert the value into a sequence of strings,
    /// delegating to [`PrimitiveValue::to_multi_str`].
    pub fn to_multi_str(&self) -> Result<Cow<'_, [String]>, CastValueError> {
        match self {
            Value::Primitive(prim) => Ok(prim.to_multi_str()),
            value => Err(CastValueError {
                requested: "strings",
                got: value.value_type(),
            }),
        }
    }
}

impl<I> From<PrimitiveValue> for Value<I> {
    fn from(v: PrimitiveValue) -> Self {
        Value::Primitive(v)
    }
}

impl<I> From<&str> for Value<I> {
    fn from(v: &str) -> Self {
        Value::Primitive(v.into())
    }
}

impl<I> From<String> for Value<I> {
    fn from(v: String) -> Self {
        Value::Primitive(v.into())
    }
}

/// A data element in memory: a tag, a value representation and a value.
///
/// `I` is the type of the nested data set items
/// (usually the containing data set type itself).
#[derive(Debug, Clone, PartialEq)]
pub struct DataElement<I> {
    tag: Tag,
    vr: VR,
    value: Value<I>,
}

impl<I> DataElement<I> {
    /// Create a new element with the given properties.
    pub fn new<T: Into<Tag>, V: Into<Value<I>>>(tag: T, vr: VR, value: V) -> Self {
        DataElement {
            tag: tag.into(),
            vr,
            value: value.into(),
        }
    }

    /// Create a new element with no value.
    pub fn empty<T: Into<Tag>>(tag: T, vr: VR) -> Self {
        DataElement {
            tag: tag.into(),
            vr,
            value: Value::Primitive(PrimitiveValue::Empty),
        }
    }

    /// Retrieve the element's tag.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Retrieve the element's value representation.
    #[inline]
    pub fn vr(&self) -> VR {
        self.vr
    }

    /// Retrieve the element's value.
    #[inline]
    pub fn value(&self) -> &Value<I> {
        &self.value
    }

    /// Move the value out of the element.
    #[inline]
    pub fn into_value(self) -> Value<I> {
        self.value
    }

    /// Gets a reference to the items of a sequence value.
    pub fn items(&self) -> Option<&[I]> {
        self.value.items()
    }

    /// Gets a reference to the frames of an encapsulated pixel data value.
    pub fn frames(&self) -> Option<&[Vec<u8>]> {
        self.value.frames()
    }

    /// Convert the value into a single string.
    pub fn to_str(&self) -> Result<Cow<'_, str>, CastValueError> {
        self.value.to_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn primitive_to_str_joins_with_backslash() {
        let v = PrimitiveValue::Strs(smallvec!["DERIVED".to_owned(), "PRIMARY".to_owned()]);
        assert_eq!(v.to_str(), "DERIVED\\PRIMARY");
        assert_eq!(v.multiplicity(), 2);

        let v = PrimitiveValue::U16(smallvec![8, 16]);
        assert_eq!(v.to_str(), "8\\16");
    }

    #[test]
    fn primitive_to_multi_str_splits_text() {
        let v = PrimitiveValue::Str("one\\two".to_owned());
        assert_eq!(
            &*v.to_multi_str(),
            &["one".to_owned(), "two".to_owned()][..]
        );

        assert!(PrimitiveValue::Empty.to_multi_str().is_empty());
    }

    #[test]
    fn casts_report_the_actual_type() {
        let v = PrimitiveValue::from(5_u16);
        assert_eq!(v.uint16(), Ok(5));
        assert_eq!(
            v.string(),
            Err(CastValueError {
                requested: "string",
                got: ValueType::U16,
            })
        );
    }

    #[test]
    fn element_accessors() {
        let e: DataElement<()> = DataElement::new(Tag(0x0010, 0x0010), VR::PN, "Doe^John");
        assert_eq!(e.tag(), Tag(0x0010, 0x0010));
        assert_eq!(e.vr(), VR::PN);
        assert_eq!(e.to_str().unwrap(), "Doe^John");
        assert!(e.items().is_none());

        let e: DataElement<()> = DataElement::empty(Tag(0x0008, 0x0008), VR::CS);
        assert_eq!(e.value(), &Value::Primitive(PrimitiveValue::Empty));
    }
}
