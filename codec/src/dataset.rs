//! The in-memory data set and its recursive codec:
//! reading and writing whole data sets,
//! nested sequences and encapsulated pixel data framing.

use crate::cursor::{Sink, Source};
use crate::element::{self, decode_item_header, encode_header, encode_item_header};
use crate::transfer_syntax::TransferSyntax;
use crate::value::{read_value, write_value};
use dcmio_core::dictionary::DataDictionary;
use dcmio_core::{DataElement, Length, SequenceItemHeader, Tag, Value, C, VR};
use dcmio_dictionary::StandardDataDictionary;
use smallvec::smallvec;
use snafu::{Backtrace, ResultExt, Snafu};
use std::collections::btree_map::Values;
use std::collections::BTreeMap;
use tracing::warn;

/// Error type for data set decoding.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// An element header could not be decoded.
    #[snafu(display("failed to decode element header"), context(false))]
    DecodeHeader { source: element::Error },
    /// An element's value span could not be read.
    #[snafu(display("failed to read value of element {}", tag))]
    ReadValue {
        tag: Tag,
        source: crate::cursor::Error,
    },
    /// A delimiter appeared where an item marker was required.
    #[snafu(display("unexpected delimiter in element {}", tag))]
    UnexpectedDelimiter { tag: Tag, backtrace: Backtrace },
    /// An undefined-length item was not closed by an item delimiter.
    #[snafu(display("undefined-length item of element {} has no matching delimiter", tag))]
    UnterminatedItem {
        tag: Tag,
        source: crate::cursor::Error,
    },
    /// The basic offset table of an encapsulated element
    /// declared an undefined length.
    #[snafu(display("basic offset table of element {} has an undefined length", tag))]
    UndefinedOffsetTableLength { tag: Tag, backtrace: Backtrace },
    /// A pixel data fragment declared an undefined length.
    #[snafu(display("fragment of element {} has an undefined length", tag))]
    UndefinedFragmentLength { tag: Tag, backtrace: Backtrace },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Options for reading a data set.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ReadOptions {
    /// Keep the elements decoded so far
    /// when an element fails to decode,
    /// instead of failing the whole read.
    pub ignore_errors: bool,
}

/// Options for writing a data set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteOptions {
    /// The maximum fragment size in bytes
    /// when writing encapsulated pixel data frames.
    /// Zero disables frame splitting.
    /// Odd values are rounded down to the nearest even number.
    pub fragment_size: u32,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            fragment_size: 20 * 1024 * 1024,
        }
    }
}

/// A DICOM data set:
/// data elements unique by tag, ordered by tag.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    entries: BTreeMap<Tag, DataElement<Dataset>>,
}

impl Dataset {
    /// Create an empty data set.
    pub fn new() -> Self {
        Dataset::default()
    }

    /// Retrieve the element with the given tag.
    pub fn get(&self, tag: Tag) -> Option<&DataElement<Dataset>> {
        self.entries.get(&tag)
    }

    /// Retrieve the element with the given attribute name,
    /// resolved through the given dictionary.
    pub fn element_by_name<D>(&self, name: &str, dict: &D) -> Option<&DataElement<Dataset>>
    where
        D: DataDictionary + ?Sized,
    {
        let tag = dict.by_name(name)?.tag.inner();
        self.get(tag)
    }

    /// Insert an element, replacing any element with the same tag.
    /// Returns the replaced element, if any.
    pub fn put(&mut self, element: DataElement<Dataset>) -> Option<DataElement<Dataset>> {
        self.entries.insert(element.tag(), element)
    }

    /// Remove and return the element with the given tag.
    pub fn remove(&mut self, tag: Tag) -> Option<DataElement<Dataset>> {
        self.entries.remove(&tag)
    }

    /// Iterate over the elements in ascending tag order.
    pub fn iter(&self) -> Values<'_, Tag, DataElement<Dataset>> {
        self.entries.values()
    }

    /// The number of elements in the data set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the data set has no elements.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a data set from the source's entire remaining span,
    /// using the standard dictionary and default options.
    pub fn read(src: &mut Source<'_>, ts: TransferSyntax) -> Result<Dataset> {
        Dataset::read_with(src, ts, &StandardDataDictionary, &ReadOptions::default())
    }

    /// Read a data set from the source's entire remaining span.
    ///
    /// With [`ReadOptions::ignore_errors`],
    /// the first element-level failure is logged
    /// and the elements decoded so far are returned.
    pub fn read_with<D>(
        src: &mut Source<'_>,
        ts: TransferSyntax,
        dict: &D,
        options: &ReadOptions,
    ) -> Result<Dataset>
    where
        D: DataDictionary + ?Sized,
    {
        src.with_endianness(ts.endianness(), |src| {
            let mut obj = Dataset::new();
            while !src.is_at_end() {
                match read_element(src, ts, dict) {
                    Ok(element) => {
                        obj.put(element);
                    }
                    Err(e) if options.ignore_errors => {
                        warn!("partial read: {}", e);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(obj)
        })
    }

    /// Write the data set with default options.
    /// Returns the number of bytes written.
    pub fn write(&self, sink: &mut Sink, ts: TransferSyntax) -> usize {
        self.write_with(sink, ts, &WriteOptions::default())
    }

    /// Write the data set's elements in ascending tag order.
    /// Returns the number of bytes written.
    pub fn write_with(&self, sink: &mut Sink, ts: TransferSyntax, options: &WriteOptions) -> usize {
        sink.with_endianness(ts.endianness(), |sink| {
            self.iter()
                .map(|element| write_element(sink, element, ts, options))
                .sum()
        })
    }
}

impl FromIterator<DataElement<Dataset>> for Dataset {
    fn from_iter<T: IntoIterator<Item = DataElement<Dataset>>>(iter: T) -> Self {
        let mut obj = Dataset::new();
        for element in iter {
            obj.put(element);
        }
        obj
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a DataElement<Dataset>;
    type IntoIter = Values<'a, Tag, DataElement<Dataset>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// strict inner loop, without partial recovery
fn read_all<D>(src: &mut Source<'_>, ts: TransferSyntax, dict: &D) -> Result<Dataset>
where
    D: DataDictionary + ?Sized,
{
    let mut obj = Dataset::new();
    while !src.is_at_end() {
        obj.put(read_element(src, ts, dict)?);
    }
    Ok(obj)
}

fn read_element<D>(
    src: &mut Source<'_>,
    ts: TransferSyntax,
    dict: &D,
) -> Result<DataElement<Dataset>>
where
    D: DataDictionary + ?Sized,
{
    let header = element::decode_header(src, ts, dict)?;
    let tag = header.tag;

    if header.vr == VR::SQ {
        let items = read_sequence_items(src, ts, dict, header.len, tag)?;
        return Ok(DataElement::new(tag, VR::SQ, Value::Sequence(items)));
    }
    if header.len.is_undefined() {
        let frames = read_encapsulated(src, tag)?;
        return Ok(DataElement::new(tag, header.vr, Value::Frames(frames)));
    }

    let mut span = src
        .take(header.len.0 as usize)
        .context(ReadValueSnafu { tag })?;
    let value = read_value(&mut span, header.vr).context(ReadValueSnafu { tag })?;
    Ok(DataElement::new(tag, header.vr, Value::Primitive(value)))
}

fn read_sequence_items<D>(
    src: &mut Source<'_>,
    ts: TransferSyntax,
    dict: &D,
    len: Length,
    tag: Tag,
) -> Result<C<Dataset>>
where
    D: DataDictionary + ?Sized,
{
    let mut items = C::new();
    if let Some(len) = len.get() {
        let mut region = src.take(len as usize).context(ReadValueSnafu { tag })?;
        while !region.is_at_end() {
            match decode_item_header(&mut region)? {
                SequenceItemHeader::Item { len } => {
                    items.push(read_item(&mut region, ts, dict, len, tag)?);
                }
                SequenceItemHeader::SequenceDelimiter => break,
                SequenceItemHeader::ItemDelimiter => {
                    return UnexpectedDelimiterSnafu { tag }.fail();
                }
            }
        }
    } else {
        loop {
            match decode_item_header(src)? {
                SequenceItemHeader::Item { len } => {
                    items.push(read_item(src, ts, dict, len, tag)?);
                }
                SequenceItemHeader::SequenceDelimiter => break,
                SequenceItemHeader::ItemDelimiter => {
                    return UnexpectedDelimiterSnafu { tag }.fail();
                }
            }
        }
    }
    Ok(items)
}

fn read_item<D>(
    src: &mut Source<'_>,
    ts: TransferSyntax,
    dict: &D,
    len: Length,
    tag: Tag,
) -> Result<Dataset>
where
    D: DataDictionary + ?Sized,
{
    if let Some(len) = len.get() {
        let mut region = src.take(len as usize).context(ReadValueSnafu { tag })?;
        read_all(&mut region, ts, dict)
    } else {
        let span = delimited_item_span(src, ts, tag)?;
        let mut region = src.take(span).context(ReadValueSnafu { tag })?;
        let item = read_all(&mut region, ts, dict)?;
        // consume the item delimiter located by the scan
        match decode_item_header(src)? {
            SequenceItemHeader::ItemDelimiter => Ok(item),
            _ => UnexpectedDelimiterSnafu { tag }.fail(),
        }
    }
}

/// Locate the item delimiter matching an undefined-length item,
/// returning the byte span of the item's content.
///
/// The scan walks forward over element and item headers,
/// skipping defined-length payloads wholesale
/// (so stray FFFE bytes inside a payload cannot confuse it)
/// and tracking the nesting depth of undefined-length constructs.
fn delimited_item_span(src: &Source<'_>, ts: TransferSyntax, tag: Tag) -> Result<usize> {
    let mut scan = src.clone();
    let start = scan.position();
    let mut depth = 1usize;
    loop {
        let header_start = scan.position();
        let t = scan.read_tag().context(UnterminatedItemSnafu { tag })?;
        if t.group() == 0xFFFE {
            let len = Length(scan.read_u32().context(UnterminatedItemSnafu { tag })?);
            match t {
                Tag::ITEM => {
                    if let Some(len) = len.get() {
                        scan.skip(len as usize)
                            .context(UnterminatedItemSnafu { tag })?;
                    } else {
                        depth += 1;
                    }
                }
                Tag::ITEM_DELIMITER => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(header_start - start);
                    }
                }
                Tag::SEQUENCE_DELIMITER => {
                    if depth == 1 {
                        // our item may only be closed by an item delimiter
                        return UnexpectedDelimiterSnafu { tag }.fail();
                    }
                    depth -= 1;
                }
                _ => return UnexpectedDelimiterSnafu { tag }.fail(),
            }
        } else {
            let len = if ts.explicit_vr() {
                let code = scan.read_bytes(2).context(UnterminatedItemSnafu { tag })?;
                let vr = VR::from_binary([code[0], code[1]]).unwrap_or(VR::UN);
                if vr.is_long_form() {
                    scan.skip(2).context(UnterminatedItemSnafu { tag })?;
                    Length(scan.read_u32().context(UnterminatedItemSnafu { tag })?)
                } else {
                    Length(u32::from(
                        scan.read_u16().context(UnterminatedItemSnafu { tag })?,
                    ))
                }
            } else {
                Length(scan.read_u32().context(UnterminatedItemSnafu { tag })?)
            };
            if let Some(len) = len.get() {
                scan.skip(len as usize)
                    .context(UnterminatedItemSnafu { tag })?;
            } else {
                depth += 1;
            }
        }
    }
}

/// Read encapsulated content:
/// the basic offset table item, then the fragment items,
/// reassembled into per-frame buffers.
fn read_encapsulated(src: &mut Source<'_>, tag: Tag) -> Result<C<Vec<u8>>> {
    // the first item is the basic offset table
    let bot_len = match decode_item_header(src)? {
        SequenceItemHeader::Item { len } => len
            .get()
            .ok_or(())
            .or_else(|_| UndefinedOffsetTableLengthSnafu { tag }.fail())?,
        _ => return UnexpectedDelimiterSnafu { tag }.fail(),
    };
    let mut bot = src
        .take(bot_len as usize)
        .context(ReadValueSnafu { tag })?;
    let mut offsets = Vec::with_capacity(bot_len as usize / 4);
    while bot.remaining() >= 4 {
        offsets.push(bot.read_u32().context(ReadValueSnafu { tag })?);
    }

    let mut frames: C<Vec<u8>> = smallvec![];
    let mut current = Vec::new();
    // byte position of the next fragment header,
    // counted from the end of the offset table item
    let mut pos = 0u32;
    loop {
        match decode_item_header(src)? {
            SequenceItemHeader::SequenceDelimiter => break,
            SequenceItemHeader::ItemDelimiter => {
                return UnexpectedDelimiterSnafu { tag }.fail();
            }
            SequenceItemHeader::Item { len } => {
                let len = len
                    .get()
                    .ok_or(())
                    .or_else(|_| UndefinedFragmentLengthSnafu { tag }.fail())?;
                // a fragment on a declared frame boundary starts a new frame
                if offsets.len() > 1 && offsets[1..].contains(&pos) {
                    frames.push(std::mem::take(&mut current));
                }
                let data = src.read_bytes(len as usize).context(ReadValueSnafu { tag })?;
                current.extend_from_slice(data);
                pos += 8 + len;
            }
        }
    }
    // the last frame; an empty offset table means exactly one frame
    frames.push(current);
    Ok(frames)
}

pub(crate) fn write_element(
    sink: &mut Sink,
    element: &DataElement<Dataset>,
    ts: TransferSyntax,
    options: &WriteOptions,
) -> usize {
    let tag = element.tag();
    match element.value() {
        Value::Primitive(value) => {
            // encode the value first to learn its length
            let mut body = Sink::new(sink.endianness());
            let len = write_value(&mut body, element.vr(), value);
            let n = encode_header(sink, tag, element.vr(), Length(len as u32), ts);
            sink.append(body);
            n + len
        }
        Value::Sequence(items) => {
            // sequences are always written with undefined-length framing
            let mut n = encode_header(sink, tag, VR::SQ, Length::UNDEFINED, ts);
            for item in items {
                encode_item_header(
                    sink,
                    SequenceItemHeader::Item {
                        len: Length::UNDEFINED,
                    },
                );
                n += 8;
                n += item.write_with(sink, ts, options);
                encode_item_header(sink, SequenceItemHeader::ItemDelimiter);
                n += 8;
            }
            encode_item_header(sink, SequenceItemHeader::SequenceDelimiter);
            n + 8
        }
        Value::Frames(frames) => {
            let mut n = encode_header(sink, tag, element.vr(), Length::UNDEFINED, ts);
            n += write_encapsulated(sink, tag, frames, options);
            n
        }
    }
}

/// Write encapsulated content:
/// a basic offset table with one cumulative offset per frame,
/// then each frame as one or more even-length fragment items,
/// then a sequence delimiter.
fn write_encapsulated(
    sink: &mut Sink,
    tag: Tag,
    frames: &[Vec<u8>],
    options: &WriteOptions,
) -> usize {
    // only the pixel data element is split into bounded fragments
    let fragment_size = if tag.is_pixel_data() && options.fragment_size > 0 {
        Some((options.fragment_size & !1).max(2) as usize)
    } else {
        None
    };

    let frame_fragments: Vec<Vec<&[u8]>> = frames
        .iter()
        .map(|frame| match fragment_size {
            Some(size) if frame.len() > size => frame.chunks(size).collect(),
            _ => vec![frame.as_slice()],
        })
        .collect();

    // cumulative offsets, one per frame
    let mut offsets = Vec::with_capacity(frames.len());
    let mut pos = 0u32;
    for fragments in &frame_fragments {
        offsets.push(pos);
        for fragment in fragments {
            pos += 8 + ((fragment.len() as u32 + 1) & !1);
        }
    }

    let mut n = 0;
    encode_item_header(
        sink,
        SequenceItemHeader::Item {
            len: Length(offsets.len() as u32 * 4),
        },
    );
    n += 8;
    for offset in &offsets {
        sink.write_u32(*offset);
        n += 4;
    }

    for fragments in &frame_fragments {
        for fragment in fragments {
            let padded = (fragment.len() + 1) & !1;
            encode_item_header(
                sink,
                SequenceItemHeader::Item {
                    len: Length(padded as u32),
                },
            );
            sink.write_bytes(fragment);
            if padded > fragment.len() {
                sink.write_u8(0x00);
            }
            n += 8 + padded;
        }
    }

    encode_item_header(sink, SequenceItemHeader::SequenceDelimiter);
    n + 8
}
