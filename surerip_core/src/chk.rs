/*!
# Surerip: Checksums
*/

use crate::{
	BYTES_PER_SAMPLE,
	rip::quality::TrackQuality,
	SAMPLES_PER_SECTOR,
};



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Checksum Record.
///
/// The per-track output of an extraction: the integrity/identity sums
/// plus the read-quality counters that accumulated along the way.
///
/// Records are computed exactly once per track per rip; re-ripping a
/// track replaces its record wholesale.
pub struct ChecksumRecord {
	/// # Track Number.
	track: u8,

	/// # Standard CRC32 (whole track).
	crc32: u32,

	/// # AccurateRip v1 Checksum.
	ar_v1: u32,

	/// # AccurateRip v2 Checksum.
	ar_v2: u32,

	/// # Peak Sample Magnitude.
	peak: u16,

	/// # Read Quality.
	quality: TrackQuality,
}

impl ChecksumRecord {
	#[must_use]
	/// # New.
	///
	/// Crunch the checksums for a finished track. The `data` is the final
	/// PCM byte stream (pregap handling already applied); `is_first` and
	/// `is_last` refer to the disc's nominal first/last audio tracks,
	/// which get special exclusion treatment from AccurateRip.
	pub(crate) fn new(
		track: u8,
		data: &[u8],
		is_first: bool,
		is_last: bool,
		quality: TrackQuality,
	) -> Self {
		let (ar_v1, ar_v2) = chk_accuraterip(data, is_first, is_last);
		Self {
			track,
			crc32: crc32fast::hash(data),
			ar_v1,
			ar_v2,
			peak: chk_peak(data),
			quality,
		}
	}

	#[must_use]
	/// # Track Number.
	pub const fn track(&self) -> u8 { self.track }

	#[must_use]
	/// # CRC32.
	pub const fn crc32(&self) -> u32 { self.crc32 }

	#[must_use]
	/// # AccurateRip v1.
	pub const fn ar_v1(&self) -> u32 { self.ar_v1 }

	#[must_use]
	/// # AccurateRip v2.
	pub const fn ar_v2(&self) -> u32 { self.ar_v2 }

	#[must_use]
	/// # Peak Sample Magnitude.
	///
	/// The largest absolute 16-bit sample value across both channels,
	/// `0..=32_768`.
	pub const fn peak(&self) -> u16 { self.peak }

	#[must_use]
	/// # Read Quality.
	pub const fn quality(&self) -> TrackQuality { self.quality }

	#[must_use]
	/// # Degraded?
	///
	/// `true` if any sector exhausted its retries and fell back to
	/// best-effort data.
	pub const fn degraded(&self) -> bool { self.quality.failed() != 0 }
}



/// # AccurateRip Checksums (v1 and v2).
///
/// AccurateRip switched up checksum formats somewhere along the way, but
/// both provide statistical confidence, so both get computed.
///
/// The computations are non-standard, but are more or less the sum of the
/// product of each sample pair (in byte form) and its relative index. All
/// data is factored, except the first `2939` samples of the first track,
/// and last `2941` samples of the last track — independent rips commonly
/// disagree there thanks to drive-dependent pregap handling, so the
/// database simply leaves those regions out.
///
/// The arithmetic has to match the database bit-for-bit or verification
/// quietly becomes noise; don't get clever here.
pub(crate) fn chk_accuraterip(data: &[u8], is_first: bool, is_last: bool)
-> (u32, u32) {
	let len = data.len().wrapping_div(usize::from(BYTES_PER_SAMPLE));
	let start =
		if is_first { usize::from(SAMPLES_PER_SECTOR) * 5 - 1 }
		else { 0 };
	let end =
		if is_last { len.saturating_sub(usize::from(SAMPLES_PER_SECTOR) * 5 + 1) }
		else { len };
	if end <= start { return (0, 0); }

	let mut crc1 = 0_u64; // Version #1.
	let mut crc2 = 0_u64; // Version #2.
	let mut idx = 0;

	for sample in data.chunks_exact(usize::from(BYTES_PER_SAMPLE)) {
		if start <= idx && idx <= end {
			let v = u64::from_le_bytes([
				sample[0], sample[1], sample[2], sample[3], 0, 0, 0, 0,
			]);

			let k = idx as u64 + 1;
			let kv = k * v;

			crc1 += kv;
			crc2 += (kv >> 32) + (kv & 0xFFFF_FFFF);
		}

		idx += 1;
		if idx > end { break; }
	}

	// Sixty-four bits were only used to help with overflow; the final
	// checksums only use half that much.
	(
		(crc1 & 0xFFFF_FFFF) as u32,
		(crc2 & 0xFFFF_FFFF) as u32,
	)
}

/// # Peak Sample Magnitude.
///
/// The loudest moment of the track, in absolute 16-bit terms.
fn chk_peak(data: &[u8]) -> u16 {
	let mut peak = 0_u16;
	for pair in data.chunks_exact(2) {
		let v = i16::from_le_bytes([pair[0], pair[1]]).unsigned_abs();
		if peak < v { peak = v; }
	}
	peak
}
