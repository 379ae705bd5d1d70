//! Core attribute dictionary types:
//! the [`DataDictionary`] look-up interface,
//! the dictionary entry record,
//! tag ranges for repeating groups,
//! and the virtual (context-dependent) value representation.

use crate::header::{Tag, VR};

/// Specification of a range of tags pertaining to an attribute.
/// Very often, the dictionary of attributes indicates a unique
/// group part and element part `(group,elem)`,
/// but occasionally an attribute may cover
/// a range of groups instead.
/// For example,
/// _Overlay Data_ (60xx,3000) has more than one possible tag,
/// since it is part of a repeating group.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TagRange {
    /// Only a specific tag
    Single(Tag),
    /// The two rightmost digits of the _group_ portion are open:
    /// `(GGxx,EEEE)`
    Group100(Tag),
}

impl TagRange {
    /// Retrieve the inner tag representation of this range.
    /// Open components are zeroed out.
    pub fn inner(self) -> Tag {
        match self {
            TagRange::Single(tag) => tag,
            TagRange::Group100(tag) => tag,
        }
    }
}

/// A "virtual" value representation (VR) descriptor
/// which extends the standard enumeration with context-dependent VRs.
///
/// It is used by element dictionary entries to describe circumstances
/// in which the real VR may depend on context.
/// As an example, the _Pixel Data_ attribute
/// can have a value representation of either [`OB`](VR::OB) or [`OW`](VR::OW).
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum VirtualVr {
    /// The value representation is exactly known
    /// and does not depend on context.
    Exact(VR),
    /// Represents a sample value with a short magnitude.
    /// The real value representation is
    /// either [`US`](VR::US) or [`SS`](VR::SS),
    /// depending on the sample representation in context.
    Xs,
    /// Represents bulk data which can be
    /// either [`OB`](VR::OB) or [`OW`](VR::OW),
    /// depending on the stream's encoding.
    Ox,
}

impl From<VR> for VirtualVr {
    fn from(value: VR) -> Self {
        VirtualVr::Exact(value)
    }
}

impl VirtualVr {
    /// Return the underlying value representation
    /// in the case where it can be determined without context.
    pub fn exact(self) -> Option<VR> {
        match self {
            VirtualVr::Exact(vr) => Some(vr),
            _ => None,
        }
    }

    /// Return the underlying value representation,
    /// making a relaxed conversion if it cannot be
    /// determined without context:
    ///
    /// - [`Xs`](VirtualVr::Xs) is relaxed to [`US`](VR::US)
    /// - [`Ox`](VirtualVr::Ox) is relaxed to [`OW`](VR::OW)
    ///
    /// This method is ill-advised for uses where
    /// the real transfer syntax of the data set is known.
    pub fn relaxed(self) -> VR {
        match self {
            VirtualVr::Exact(vr) => vr,
            VirtualVr::Xs => VR::US,
            VirtualVr::Ox => VR::OW,
        }
    }
}

/// A data element dictionary entry:
/// the tag (or tag range), the attribute's keyword alias,
/// and its value representation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DictionaryEntry {
    /// The attribute tag or tag range.
    pub tag: TagRange,
    /// The alias of the attribute, with no spaces, usually in UpperCamelCase.
    pub alias: &'static str,
    /// The _typical_ value representation of the attribute.
    pub vr: VirtualVr,
}

impl DictionaryEntry {
    /// Retrieve the attribute's tag range.
    #[inline]
    pub fn tag_range(&self) -> TagRange {
        self.tag
    }

    /// Retrieve a representative tag of the attribute.
    #[inline]
    pub fn tag(&self) -> Tag {
        self.tag.inner()
    }

    /// Retrieve the attribute's keyword alias.
    #[inline]
    pub fn alias(&self) -> &'static str {
        self.alias
    }

    /// Retrieve the attribute's typical value representation.
    #[inline]
    pub fn vr(&self) -> VirtualVr {
        self.vr
    }
}

/// Type trait for a dictionary of DICOM attributes.
///
/// Attribute dictionaries provide the means to convert a tag to an alias and
/// vice versa, as well as a form of retrieving additional information about
/// the attribute, namely its typical value representation.
pub trait DataDictionary {
    /// Fetch an entry by its usual alias (e.g. "PatientName").
    /// Aliases (or keyword)
    /// are usually in UpperCamelCase,
    /// not separated by spaces,
    /// and are case sensitive.
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry>;

    /// Fetch an entry by its tag.
    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry>;
}

impl<T> DataDictionary for &T
where
    T: DataDictionary,
{
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry> {
        (**self).by_name(name)
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        (**self).by_tag(tag)
    }
}

/// An empty attribute dictionary.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubDataDictionary;

impl DataDictionary for StubDataDictionary {
    fn by_name(&self, _: &str) -> Option<&DictionaryEntry> {
        None
    }

    fn by_tag(&self, _: Tag) -> Option<&DictionaryEntry> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_vr_relaxing() {
        assert_eq!(VirtualVr::Exact(VR::PN).relaxed(), VR::PN);
        assert_eq!(VirtualVr::Xs.relaxed(), VR::US);
        assert_eq!(VirtualVr::Ox.relaxed(), VR::OW);
        assert_eq!(VirtualVr::Xs.exact(), None);
        assert_eq!(VirtualVr::Exact(VR::UI).exact(), Some(VR::UI));
    }

    #[test]
    fn tag_range_inner() {
        assert_eq!(
            TagRange::Single(Tag(0x0010, 0x0010)).inner(),
            Tag(0x0010, 0x0010)
        );
        assert_eq!(
            TagRange::Group100(Tag(0x6000, 0x3000)).inner(),
            Tag(0x6000, 0x3000)
        );
    }

    #[test]
    fn stub_dictionary_is_empty() {
        let dict = StubDataDictionary;
        assert!(dict.by_tag(Tag(0x0010, 0x0010)).is_none());
        assert!(dict.by_name("PatientName").is_none());
    }
}
