//! The run-time standard attribute dictionary.

use crate::entries::ENTRIES;
use dcmio_core::dictionary::{DataDictionary, DictionaryEntry, TagRange, VirtualVr};
use dcmio_core::{Tag, VR};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::{Display, Formatter};

static DICT: Lazy<StandardDataDictionaryRegistry> = Lazy::new(init_dictionary);

/// Retrieve a singleton instance of the standard dictionary registry.
///
/// Note that one does not generally have to call this
/// unless when retrieving the underlying registry is important.
/// The unit type [`StandardDataDictionary`]
/// already provides a lazy loaded singleton implementing the necessary traits.
#[inline]
pub fn registry() -> &'static StandardDataDictionaryRegistry {
    &DICT
}

/// The data struct actually containing the standard dictionary.
///
/// This structure is made opaque via the unit type [`StandardDataDictionary`],
/// which provides a lazy loaded singleton.
#[derive(Debug)]
pub struct StandardDataDictionaryRegistry {
    /// mapping: name → entry
    by_name: HashMap<&'static str, &'static DictionaryEntry>,
    /// mapping: tag → entry
    by_tag: HashMap<Tag, &'static DictionaryEntry>,
    /// repeating elements of the form (ggxx, eeee). The `xx` portion is zeroed.
    repeating_ggxx: HashSet<Tag>,
}

impl StandardDataDictionaryRegistry {
    fn new() -> StandardDataDictionaryRegistry {
        StandardDataDictionaryRegistry {
            by_name: HashMap::with_capacity(ENTRIES.len()),
            by_tag: HashMap::with_capacity(ENTRIES.len()),
            repeating_ggxx: HashSet::new(),
        }
    }

    /// record the given dictionary entry reference
    fn index(&mut self, entry: &'static DictionaryEntry) -> &mut Self {
        self.by_name.insert(entry.alias, entry);
        self.by_tag.insert(entry.tag.inner(), entry);
        if let TagRange::Group100(tag) = entry.tag {
            self.repeating_ggxx.insert(tag);
        }
        self
    }
}

/// Generic Group Length dictionary entry,
/// for any attribute of the form (GGGG,0000)
/// without a single tag record of its own.
static GROUP_LENGTH_ENTRY: DictionaryEntry = DictionaryEntry {
    tag: TagRange::Single(Tag(0x0000, 0x0000)),
    alias: "GenericGroupLength",
    vr: VirtualVr::Exact(VR::UL),
};

/// Generic Private Creator dictionary entry,
/// for any tag from (GGGG,0010) to (GGGG,00FF)
/// where `GGGG` is an odd number.
static PRIVATE_CREATOR_ENTRY: DictionaryEntry = DictionaryEntry {
    tag: TagRange::Single(Tag(0x0009, 0x0010)),
    alias: "PrivateCreator",
    vr: VirtualVr::Exact(VR::LO),
};

/// A data element dictionary which consults
/// the library's global DICOM attribute registry.
///
/// This is the type which would generally be used
/// whenever a data element dictionary is needed,
/// such as when reading DICOM objects.
///
/// The dictionary index is automatically initialized upon the first use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardDataDictionary;

impl StandardDataDictionary {
    fn indexed_tag(tag: Tag) -> Option<&'static DictionaryEntry> {
        let r = registry();

        r.by_tag
            .get(&tag)
            .or_else(|| {
                // check tags repeating in different groups
                let group_trimmed = Tag(tag.0 & 0xFF00, tag.1);
                if r.repeating_ggxx.contains(&group_trimmed) {
                    return r.by_tag.get(&group_trimmed);
                }
                None
            })
            .cloned()
            .or_else(|| {
                // check for private creator
                if tag.0 & 1 == 1 && (0x0010..=0x00FF).contains(&tag.1) {
                    return Some(&PRIVATE_CREATOR_ENTRY);
                }
                // check for group length
                if tag.element() == 0x0000 {
                    return Some(&GROUP_LENGTH_ENTRY);
                }

                None
            })
    }
}

impl DataDictionary for StandardDataDictionary {
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry> {
        registry().by_name.get(name).cloned()
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        StandardDataDictionary::indexed_tag(tag)
    }
}

impl Display for StandardDataDictionary {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str("Standard DICOM Data Dictionary")
    }
}

fn init_dictionary() -> StandardDataDictionaryRegistry {
    let mut d = StandardDataDictionaryRegistry::new();
    for entry in ENTRIES {
        d.index(entry);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::StandardDataDictionary;
    use dcmio_core::dictionary::{DataDictionary, DictionaryEntry, TagRange::*, VirtualVr};
    use dcmio_core::{Tag, VR};

    // tests for just a few attributes to make sure that the entries
    // were well installed into the registry
    #[test]
    fn smoke_test() {
        let dict = StandardDataDictionary;

        assert_eq!(
            dict.by_name("PatientName"),
            Some(&DictionaryEntry {
                tag: Single(Tag(0x0010, 0x0010)),
                alias: "PatientName",
                vr: VirtualVr::Exact(VR::PN),
            })
        );

        assert_eq!(
            dict.by_name("Modality"),
            Some(&DictionaryEntry {
                tag: Single(Tag(0x0008, 0x0060)),
                alias: "Modality",
                vr: VirtualVr::Exact(VR::CS),
            })
        );

        let pixel_data = dict
            .by_tag(Tag(0x7FE0, 0x0010))
            .expect("Pixel Data attribute should exist");
        assert_eq!(pixel_data.alias, "PixelData");
        assert_eq!(pixel_data.vr, VirtualVr::Ox);
        assert_eq!(pixel_data.vr.relaxed(), VR::OW);
    }

    #[test]
    fn overlay_group_repeats() {
        let dict = StandardDataDictionary;

        for group in [0x6000u16, 0x6002, 0x60EE] {
            let entry = dict
                .by_tag(Tag(group, 0x3000))
                .expect("Overlay Data attribute should exist");
            assert_eq!(entry.alias, "OverlayData");
            assert_eq!(entry.vr, VirtualVr::Ox);
        }

        // outside the 60xx repeating range
        assert!(dict.by_tag(Tag(0x6100, 0x3000)).is_none());
    }

    #[test]
    fn group_length_and_private_creator_fallbacks() {
        let dict = StandardDataDictionary;

        let entry = dict.by_tag(Tag(0x0010, 0x0000)).unwrap();
        assert_eq!(entry.alias, "GenericGroupLength");
        assert_eq!(entry.vr.relaxed(), VR::UL);

        // (0002,0000) has its own record
        let entry = dict.by_tag(Tag(0x0002, 0x0000)).unwrap();
        assert_eq!(entry.alias, "FileMetaInformationGroupLength");

        let entry = dict.by_tag(Tag(0x0009, 0x0010)).unwrap();
        assert_eq!(entry.alias, "PrivateCreator");
        assert_eq!(entry.vr.relaxed(), VR::LO);
        let entry = dict.by_tag(Tag(0x000B, 0x00FF)).unwrap();
        assert_eq!(entry.alias, "PrivateCreator");

        // even group, not a private creator
        assert!(dict.by_tag(Tag(0x000A, 0x0010)).is_none());
    }
}
