/*!
# Surerip: Drive Abstraction
*/

use crate::{
	BYTES_PER_SECTOR,
	RipError,
};



/// # An Optical Drive (or Something Pretending To Be One).
///
/// This trait is the only place hardware enters the picture; everything
/// above it — TOC parsing, sector verification, checksumming — works the
/// same whether the bytes come from `libcdio` or a scripted test double.
pub trait Drive {
	/// # Raw Table of Contents.
	///
	/// Pull the disc's raw session/track layout. This is called exactly once
	/// per rip, before any audio is read.
	///
	/// ## Errors
	///
	/// This should return an error if the disc is missing or its table of
	/// contents cannot be read.
	fn raw_toc(&self) -> Result<RawToc, RipError>;

	/// # Read Audio Sectors.
	///
	/// Fill `buf` with the audio data starting at the absolute `lba` (which
	/// includes the standard 150-sector lead-in). The buffer length implies
	/// the sector count and must be an even multiple of [`BYTES_PER_SECTOR`].
	///
	/// Margin windows routinely poke at addresses before the first track or
	/// after the lead-out; implementations must quietly zero-fill any
	/// portion of the request falling outside the readable range rather
	/// than erroring out.
	///
	/// ## Errors
	///
	/// This should return [`RipError::CdRead`] for transient read failures
	/// (the caller will retry), or [`RipError::CdReadUnsupported`] if the
	/// drive flat out cannot service requests of this shape.
	fn read_sectors(&self, lba: i32, buf: &mut [u8]) -> Result<(), RipError>;

	/// # Drive Description.
	///
	/// The vendor/model string, if known. Purely cosmetic.
	fn description(&self) -> Option<String> { None }
}



#[derive(Debug, Clone)]
/// # Raw Table of Contents.
///
/// The unvalidated track layout as reported by a [`Drive`]. Everything in
/// here is suspect until [`DiscLayout`](crate::DiscLayout) has had a look
/// at it.
pub struct RawToc {
	/// # First Track Number.
	pub first: u8,

	/// # Track Entries (in reported order).
	pub entries: Vec<RawTocEntry>,

	/// # Lead-out Start (absolute LBA).
	pub leadout: u32,

	/// # Session Count.
	pub sessions: u8,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Raw Track Entry.
pub struct RawTocEntry {
	/// # Track Number.
	pub number: u8,

	/// # Start (absolute LBA, including the 150-sector lead-in).
	pub start: u32,

	/// # Pregap Length (sectors).
	pub pregap: u32,

	/// # Audio Track?
	pub audio: bool,

	/// # Pre-emphasis?
	pub preemphasis: bool,
}



/// # Sector Count For Buffer.
///
/// Shared sanity-check for `read_sectors` implementations: the number of
/// whole sectors `buf` can hold, or `None` if it isn't sector-aligned.
pub(crate) fn buf_sectors(buf: &[u8]) -> Option<u32> {
	let size = usize::from(BYTES_PER_SECTOR);
	if buf.is_empty() || buf.len() % size != 0 { None }
	else { u32::try_from(buf.len().wrapping_div(size)).ok() }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_buf_sectors() {
		assert_eq!(buf_sectors(&[]), None);
		assert_eq!(buf_sectors(&[0; 100]), None);
		assert_eq!(buf_sectors(&[0; 2352]), Some(1));
		assert_eq!(buf_sectors(&[0; 2352 * 5]), Some(5));
	}
}
