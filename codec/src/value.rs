//! Reading and writing of primitive values,
//! dispatching on the element's value representation.
//!
//! Reads always consume the element's entire byte span;
//! callers hand in a sub-cursor covering exactly that span.
//! Writes produce the encoded value without its header,
//! padded to even length with the VR's padding byte.

use crate::cursor::{Result, Sink, Source};
use dcmio_core::{PrimitiveValue, C, VR};
use tracing::warn;

/// Read a primitive value of the given VR
/// from the source's entire remaining span.
///
/// A zero-length span yields [`PrimitiveValue::Empty`] for every VR.
/// A span which is not a multiple of a fixed-width VR's value size
/// is logged and read to the largest whole number of values.
pub fn read_value(src: &mut Source<'_>, vr: VR) -> Result<PrimitiveValue> {
    if src.remaining() == 0 {
        return Ok(PrimitiveValue::Empty);
    }
    match vr {
        VR::AT => {
            let n = element_count(src, 4, vr);
            let mut values = C::with_capacity(n);
            for _ in 0..n {
                values.push(src.read_tag()?);
            }
            Ok(PrimitiveValue::Tags(values))
        }
        VR::FL => read_fixed(src, vr, |s| s.read_f32(), PrimitiveValue::F32),
        VR::FD => read_fixed(src, vr, |s| s.read_f64(), PrimitiveValue::F64),
        VR::SL => read_fixed(src, vr, |s| s.read_i32(), PrimitiveValue::I32),
        VR::SS => read_fixed(src, vr, |s| s.read_i16(), PrimitiveValue::I16),
        VR::SV => read_fixed(src, vr, |s| s.read_i64(), PrimitiveValue::I64),
        VR::UL => read_fixed(src, vr, |s| s.read_u32(), PrimitiveValue::U32),
        VR::US => read_fixed(src, vr, |s| s.read_u16(), PrimitiveValue::U16),
        VR::UV => read_fixed(src, vr, |s| s.read_u64(), PrimitiveValue::U64),
        vr if vr.is_string() => read_text(src, vr),
        // OB, OD, OF, OL, OV, OW, UN and anything else: raw bytes
        _ => {
            let bytes = src.read_bytes(src.remaining())?;
            Ok(PrimitiveValue::U8(bytes.into()))
        }
    }
}

/// Write a primitive value's encoded form,
/// padding to even length with the VR's padding byte.
/// Returns the number of bytes written, including padding.
pub fn write_value(sink: &mut Sink, vr: VR, value: &PrimitiveValue) -> usize {
    let start = sink.position();
    match value {
        PrimitiveValue::Empty => {}
        PrimitiveValue::Str(s) => {
            let text = bounded(vr, s);
            sink.write_str(&text);
        }
        PrimitiveValue::Strs(list) => {
            let text = list
                .iter()
                .map(|s| bounded(vr, s))
                .collect::<Vec<_>>()
                .join("\\");
            sink.write_str(&text);
        }
        PrimitiveValue::Tags(tags) => {
            for tag in tags {
                sink.write_tag(*tag);
            }
        }
        PrimitiveValue::U8(bytes) => sink.write_bytes(bytes),
        PrimitiveValue::I16(values) => {
            for v in values {
                sink.write_i16(*v);
            }
        }
        PrimitiveValue::U16(values) => {
            for v in values {
                sink.write_u16(*v);
            }
        }
        PrimitiveValue::I32(values) => {
            for v in values {
                sink.write_i32(*v);
            }
        }
        PrimitiveValue::U32(values) => {
            for v in values {
                sink.write_u32(*v);
            }
        }
        PrimitiveValue::I64(values) => {
            for v in values {
                sink.write_i64(*v);
            }
        }
        PrimitiveValue::U64(values) => {
            for v in values {
                sink.write_u64(*v);
            }
        }
        PrimitiveValue::F32(values) => {
            for v in values {
                sink.write_f32(*v);
            }
        }
        PrimitiveValue::F64(values) => {
            for v in values {
                sink.write_f64(*v);
            }
        }
    }
    let mut written = sink.position() - start;
    if written % 2 != 0 {
        sink.write_u8(vr.pad_byte());
        written += 1;
    }
    written
}

fn read_fixed<'s, T>(
    src: &mut Source<'s>,
    vr: VR,
    read_one: impl Fn(&mut Source<'s>) -> Result<T>,
    wrap: impl FnOnce(C<T>) -> PrimitiveValue,
) -> Result<PrimitiveValue> {
    // fixed_width is defined for every VR dispatched here
    let width = vr.fixed_width().unwrap_or(1);
    let n = element_count(src, width, vr);
    let mut values = C::with_capacity(n);
    for _ in 0..n {
        values.push(read_one(src)?);
    }
    // drop any trailing remainder of a malformed length
    src.skip(src.remaining())?;
    Ok(wrap(values))
}

fn element_count(src: &Source<'_>, width: usize, vr: VR) -> usize {
    let len = src.remaining();
    if len % width != 0 {
        warn!(
            "length {} of {} value is not a multiple of {}, trailing bytes ignored",
            len, vr, width
        );
    }
    len / width
}

fn read_text(src: &mut Source<'_>, vr: VR) -> Result<PrimitiveValue> {
    let text = src.read_str(src.remaining())?;
    let text = text.trim_end_matches(['\0', ' ']);
    if vr.allow_multiple() {
        let values = text
            .split('\\')
            .map(|component| filtered(vr, component))
            .collect();
        Ok(PrimitiveValue::Strs(values))
    } else {
        Ok(PrimitiveValue::Str(filtered(vr, text)))
    }
}

/// Strip characters outside the VR's admitted repertoire.
/// Only UI, DS and IS have an active filter.
fn filtered(vr: VR, component: &str) -> String {
    let keep: fn(char) -> bool = match vr {
        VR::UI => |c| c.is_ascii_digit() || c == '.',
        VR::DS => |c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'),
        VR::IS => |c| c.is_ascii_digit() || matches!(c, '+' | '-'),
        _ => return component.to_owned(),
    };
    component.chars().filter(|&c| keep(c)).collect()
}

/// Enforce the VR's maximum value length,
/// truncating (with a warning) when exceeded.
fn bounded(vr: VR, component: &str) -> String {
    match vr.max_length() {
        Some(max) if component.len() > max as usize => {
            warn!(
                "{} value of {} bytes exceeds the maximum of {}, truncating",
                vr,
                component.len(),
                max
            );
            let mut end = max as usize;
            while !component.is_char_boundary(end) {
                end -= 1;
            }
            component[..end].to_owned()
        }
        _ => component.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;
    use dcmio_core::Tag;
    use smallvec::smallvec;

    fn src(data: &[u8]) -> Source<'_> {
        Source::new(data, Endianness::Little)
    }

    #[test]
    fn zero_length_is_empty_for_every_vr() {
        for vr in [VR::US, VR::PN, VR::OB, VR::UI, VR::AT] {
            assert_eq!(read_value(&mut src(&[]), vr).unwrap(), PrimitiveValue::Empty);
        }
    }

    #[test]
    fn reads_multi_valued_strings() {
        let mut src = src(b"DERIVED\\PRIMARY ");
        assert_eq!(
            read_value(&mut src, VR::CS).unwrap(),
            PrimitiveValue::Strs(smallvec!["DERIVED".to_owned(), "PRIMARY".to_owned()])
        );
    }

    #[test]
    fn reads_single_valued_text() {
        // LT never splits on backslash
        let mut src = src(b"one\\two ");
        assert_eq!(
            read_value(&mut src, VR::LT).unwrap(),
            PrimitiveValue::Str("one\\two".to_owned())
        );
    }

    #[test]
    fn trims_trailing_nul_padding() {
        let mut src = src(b"SMITH^J\0");
        assert_eq!(
            read_value(&mut src, VR::PN).unwrap(),
            PrimitiveValue::Strs(smallvec!["SMITH^J".to_owned()])
        );
    }

    #[test]
    fn character_filters() {
        assert_eq!(
            read_value(&mut src(b"1.2.840 \0"), VR::UI).unwrap(),
            PrimitiveValue::Strs(smallvec!["1.2.840".to_owned()])
        );
        assert_eq!(
            read_value(&mut src(b" -1.5e3 A"), VR::DS).unwrap(),
            PrimitiveValue::Strs(smallvec!["-1.5e3".to_owned()])
        );
        assert_eq!(
            read_value(&mut src(b"+12 three"), VR::IS).unwrap(),
            PrimitiveValue::Strs(smallvec!["+12".to_owned()])
        );
    }

    #[test]
    fn reads_fixed_width_numbers() {
        let mut src = src(&[0x08, 0x00, 0x10, 0x00]);
        assert_eq!(
            read_value(&mut src, VR::US).unwrap(),
            PrimitiveValue::U16(smallvec![8, 16])
        );

        let mut src = Source::new(&[0x00, 0x08], Endianness::Big);
        assert_eq!(
            read_value(&mut src, VR::US).unwrap(),
            PrimitiveValue::U16(smallvec![8])
        );
    }

    #[test]
    fn fixed_width_mismatch_reads_the_floor() {
        let mut src = src(&[0x01, 0x00, 0x02, 0x00, 0x03]);
        assert_eq!(
            read_value(&mut src, VR::US).unwrap(),
            PrimitiveValue::U16(smallvec![1, 2])
        );
        assert!(src.is_at_end());
    }

    #[test]
    fn reads_attribute_tags() {
        let mut src = src(&[0x28, 0x00, 0x08, 0x00]);
        assert_eq!(
            read_value(&mut src, VR::AT).unwrap(),
            PrimitiveValue::Tags(smallvec![Tag(0x0028, 0x0008)])
        );
    }

    #[test]
    fn reads_blobs_as_raw_bytes() {
        let mut src = src(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(
            read_value(&mut src, VR::OW).unwrap(),
            PrimitiveValue::U8(smallvec![0xDE, 0xAD, 0xBE, 0xEF])
        );
    }

    #[test]
    fn writes_are_padded_to_even_length() {
        let mut sink = Sink::new(Endianness::Little);
        let n = write_value(&mut sink, VR::PN, &PrimitiveValue::from("SMITH^J"));
        assert_eq!(n, 8);
        assert_eq!(sink.as_bytes(), b"SMITH^J ");

        let mut sink = Sink::new(Endianness::Little);
        let n = write_value(&mut sink, VR::UI, &PrimitiveValue::from("1.2.840"));
        assert_eq!(n, 8);
        assert_eq!(sink.as_bytes(), b"1.2.840\0");

        let mut sink = Sink::new(Endianness::Little);
        let n = write_value(&mut sink, VR::OB, &PrimitiveValue::from(vec![0x01u8]));
        assert_eq!(n, 2);
        assert_eq!(sink.as_bytes(), &[0x01, 0x00]);
    }

    #[test]
    fn writes_join_multiple_values() {
        let mut sink = Sink::new(Endianness::Little);
        let value = PrimitiveValue::Strs(smallvec!["DERIVED".to_owned(), "PRIMARY".to_owned()]);
        let n = write_value(&mut sink, VR::CS, &value);
        assert_eq!(n, 16);
        assert_eq!(sink.as_bytes(), b"DERIVED\\PRIMARY ");
    }

    #[test]
    fn writes_numbers_in_stream_byte_order() {
        let mut sink = Sink::new(Endianness::Big);
        let n = write_value(&mut sink, VR::US, &PrimitiveValue::U16(smallvec![0x0102]));
        assert_eq!(n, 2);
        assert_eq!(sink.as_bytes(), &[0x01, 0x02]);

        let mut sink = Sink::new(Endianness::Little);
        write_value(&mut sink, VR::AT, &PrimitiveValue::from(Tag(0x7FE0, 0x0010)));
        assert_eq!(sink.as_bytes(), &[0xE0, 0x7F, 0x10, 0x00]);
    }

    #[test]
    fn overlong_strings_are_truncated_on_write() {
        let mut sink = Sink::new(Endianness::Little);
        let long = "X".repeat(20);
        let n = write_value(&mut sink, VR::SH, &PrimitiveValue::from(long));
        assert_eq!(n, 16);
        assert_eq!(sink.as_bytes(), "X".repeat(16).as_bytes());
    }

    #[test]
    fn string_round_trip() {
        let value = PrimitiveValue::Strs(smallvec!["ORIGINAL".to_owned(), "PRIMARY".to_owned()]);
        let mut sink = Sink::new(Endianness::Little);
        write_value(&mut sink, VR::CS, &value);
        let bytes = sink.into_vec();
        let mut src = src(&bytes);
        assert_eq!(read_value(&mut src, VR::CS).unwrap(), value);
    }
}
