//! This crate implements the binary codec for DICOM data sets
//! and Part 10 files:
//!
//! - [`cursor`]: endian-aware byte cursors over in-memory data;
//! - [`transfer_syntax`]: the supported transfer syntaxes;
//! - [`value`]: reading and writing of primitive values per VR;
//! - [`element`]: data element and sequence item header codecs;
//! - [`dataset`]: the [`Dataset`] type and its recursive codec,
//!   including encapsulated pixel data framing;
//! - [`file`]: the Part 10 file container and file meta builder.
//!
//! # Example
//!
//! ```no_run
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use dcmio_codec::DicomFile;
//!
//! let bytes = std::fs::read("image.dcm")?;
//! let file = DicomFile::from_bytes(&bytes)?;
//! let name = file
//!     .dataset
//!     .element_by_name("PatientName", &dcmio_dictionary::StandardDataDictionary);
//! # Ok(())
//! # }
//! ```

pub mod cursor;
pub mod dataset;
pub mod element;
pub mod file;
pub mod transfer_syntax;
pub mod value;

pub use crate::cursor::{Sink, Source};
pub use crate::dataset::{Dataset, ReadOptions, WriteOptions};
pub use crate::file::{DicomFile, MetaBuilder};
pub use crate::transfer_syntax::{Encapsulation, TransferSyntax};
