/*!
# Surerip: Library
*/

#![deny(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]

mod abort;
mod cache;
mod cdio;
mod chk;
mod disc;
mod drive;
mod error;
mod offset;
mod report;
mod rip;
mod sink;
mod toc;
mod verify;

pub use abort::KillSwitch;
pub(crate) use cache::{
	out_path,
	out_read,
	CacheWriter,
};
pub use cdio::LibcdioDrive;
pub use chk::ChecksumRecord;
pub use disc::Disc;
pub use drive::{
	Drive,
	RawToc,
	RawTocEntry,
};
pub use error::RipError;
pub use offset::ReadOffset;
pub use report::{
	ExtractionReport,
	TrackReport,
	TrackStatus,
};
pub use rip::opts::RipOptions;
pub use rip::quality::TrackQuality;
pub(crate) use rip::Ripper;
pub use sink::{
	TrackSink,
	WavSink,
};
pub use toc::{
	DiscLayout,
	TrackEntry,
};
pub use verify::{
	AccurateRipService,
	Confidence,
	Verifier,
};



/// # 16-bit Stereo Sample (raw PCM bytes).
pub(crate) type Sample = [u8; 4];

/// # Bytes Per Sample.
pub const BYTES_PER_SAMPLE: u16 = 4;

/// # Bytes Per Sector.
///
/// This is the number of bytes per sector of _audio_ data; no drive
/// metadata ever lands in our buffers.
pub const BYTES_PER_SECTOR: u16 = SAMPLES_PER_SECTOR * BYTES_PER_SAMPLE;

/// # Samples per sector.
pub const SAMPLES_PER_SECTOR: u16 = 588;

/// # Number of lead-in sectors.
///
/// All discs have a 2-second region at the start before any data.
/// Addresses throughout this crate are absolute LBAs that _include_ this
/// amount; drive implementations subtract it when talking to hardware.
pub const CD_LEADIN: u16 = 150;

/// # Lead-out Label.
///
/// This is used solely for the table of contents printout; e.g. 01 02 03 AA.
pub const CD_LEADOUT_LABEL: &str = "AA";

/// # Null sample.
///
/// Audio CD silence is typically literally nothing.
pub const NULL_SAMPLE: Sample = [0, 0, 0, 0];

/// # Output Base.
///
/// Extracted tracks, cue sheets, and cached verification data all land
/// in `CWD/OUT_BASE`.
pub const OUT_BASE: &str = "_surerip";
