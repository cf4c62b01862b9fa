/*!
# Surerip: Disc Layout
*/

use cdtoc::Toc;
use crate::{
	CD_LEADIN,
	drive::{
		RawToc,
		RawTocEntry,
	},
	RipError,
	SAMPLES_PER_SECTOR,
};
use std::ops::Range;



/// # Session Gap (sectors).
///
/// The audio session of an Enhanced CD ends this far before the data
/// session's first sector.
const SESSION_GAP: u32 = 11_400;



#[derive(Debug, Clone)]
/// # Disc Layout.
///
/// A validated table of contents: the ordered audio tracks (with a
/// pseudo-track `0` for any hidden audio before track one), plus the
/// derived [`cdtoc::Toc`] used for disc identity and verification.
///
/// Everything in here is immutable once built; the rest of the library
/// treats it as gospel.
pub struct DiscLayout {
	/// # Disc Identity.
	toc: Toc,

	/// # Audio Tracks (in play order, HTOA first if present).
	tracks: Vec<TrackEntry>,

	/// # First Audio Track Number.
	first_audio: u8,

	/// # Last Audio Track Number.
	last_audio: u8,

	/// # Lead-out Start (absolute LBA).
	leadout: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
/// # Track Entry.
///
/// One audio track's worth of layout: its absolute sector range (pregap
/// sectors, if any, sit at the head of the range), and its flags.
pub struct TrackEntry {
	/// # Track Number (zero for HTOA).
	number: u8,

	/// # Sector Range (absolute LBAs).
	rng: Range<i32>,

	/// # Pregap (sectors at the head of the range).
	pregap: u32,

	/// # Pre-emphasis?
	preemphasis: bool,
}

impl DiscLayout {
	/// # From Raw.
	///
	/// Validate a drive-reported [`RawToc`] and carve it into addressable
	/// audio tracks.
	///
	/// Data tracks are tolerated in the first or last position only —
	/// mixed-mode and Enhanced CD conventions respectively — and are
	/// excluded from the track list. Anything weirder gets rejected.
	///
	/// ## Errors
	///
	/// This will return an error if the disc has multiple sessions, no
	/// audio, out-of-order or overlapping sector addresses, or a data
	/// track someplace unexpected.
	pub fn from_raw(raw: &RawToc) -> Result<Self, RipError> {
		if 1 < raw.sessions { return Err(RipError::DiscLayout("multi-session")); }
		if raw.entries.is_empty() { return Err(RipError::DiscLayout("no tracks")); }

		// Starts must climb, and everything must land inside the program
		// area.
		let mut last_start = u32::from(CD_LEADIN) - 1;
		for e in &raw.entries {
			if e.start <= last_start { return Err(RipError::DiscLayout("malformed lead-in")); }
			last_start = e.start;
		}
		if raw.leadout <= last_start { return Err(RipError::Leadout); }

		// Separate the audio from the data.
		let mut audio: Vec<&RawTocEntry> = Vec::with_capacity(raw.entries.len());
		let mut data = None;
		let last_idx = raw.entries.len() - 1;
		for (k, e) in raw.entries.iter().enumerate() {
			if e.audio { audio.push(e); }
			else {
				if data.is_some() || (k != 0 && k != last_idx) {
					return Err(RipError::TrackFormat(e.number));
				}
				data.replace((k, e.start));
			}
		}
		if audio.is_empty() { return Err(RipError::DiscLayout("no audio tracks")); }

		// The audio program ends at the lead-out, unless a trailing data
		// session cuts it short.
		let audio_end = match data {
			Some((k, start)) if k == last_idx && 0 < k =>
				start.checked_sub(SESSION_GAP)
					.filter(|end| audio.last().map_or(false, |e| e.start < *end))
					.ok_or(RipError::DiscLayout("malformed lead-in"))?,
			_ => raw.leadout,
		};

		// Identity comes straight from cdtoc so our IDs always agree with
		// the databases they're submitted to.
		let toc = Toc::from_parts(
			audio.iter().map(|e| e.start).collect(),
			data.map(|(_, start)| start),
			raw.leadout,
		)?;

		// Carve the audio span into per-track ranges. Pregaps stay glued
		// to the head of the track they announce.
		let mut tracks = Vec::with_capacity(audio.len() + 1);
		let leading_data = data.is_some_and(|(k, _)| k == 0);

		// Hidden track one audio: a gap between the lead-in and the first
		// audio track's nominal start, addressable as track zero.
		if ! leading_data && u32::from(CD_LEADIN) < audio[0].start {
			tracks.push(TrackEntry {
				number: 0,
				rng: i32::from(CD_LEADIN)..lba_i32(audio[0].start)?,
				pregap: 0,
				preemphasis: false,
			});
		}

		for (k, e) in audio.iter().enumerate() {
			// A pregap claim only counts if it fits between this track's
			// start and the previous one's; drives report garbage often
			// enough that bad claims are dropped rather than fatal.
			let head =
				if k == 0 { e.start }
				else {
					let floor = audio[k - 1].start;
					let head = e.start.saturating_sub(e.pregap);
					if head <= floor { e.start } else { head }
				};
			let end =
				if k + 1 < audio.len() {
					let next = audio[k + 1];
					let next_head = next.start.saturating_sub(next.pregap);
					if next_head <= e.start { next.start } else { next_head }
				}
				else { audio_end };
			if end <= head { return Err(RipError::DiscLayout("malformed lead-in")); }

			tracks.push(TrackEntry {
				number: e.number,
				rng: lba_i32(head)?..lba_i32(end)?,
				pregap: e.start - head,
				preemphasis: e.preemphasis,
			});
		}

		let first_audio = audio[0].number;
		let last_audio = audio[audio.len() - 1].number;
		Ok(Self {
			toc,
			tracks,
			first_audio,
			last_audio,
			leadout: raw.leadout,
		})
	}
}

impl DiscLayout {
	#[must_use]
	/// # Disc Identity.
	pub const fn toc(&self) -> &Toc { &self.toc }

	#[must_use]
	/// # Audio Tracks.
	///
	/// The HTOA pseudo-track, if any, comes first.
	pub fn tracks(&self) -> &[TrackEntry] { &self.tracks }

	#[must_use]
	/// # A Specific Track.
	pub fn track(&self, number: u8) -> Option<&TrackEntry> {
		self.tracks.iter().find(|t| t.number == number)
	}

	#[must_use]
	/// # Has a Hidden Track?
	pub fn has_htoa(&self) -> bool {
		self.tracks.first().is_some_and(TrackEntry::is_htoa)
	}

	#[must_use]
	/// # First Audio Track Number.
	///
	/// The HTOA doesn't count; database exclusion windows key off the
	/// nominal first/last tracks.
	pub const fn first_audio(&self) -> u8 { self.first_audio }

	#[must_use]
	/// # Last Audio Track Number.
	pub const fn last_audio(&self) -> u8 { self.last_audio }

	#[must_use]
	/// # Lead-out Start (absolute LBA).
	pub const fn leadout(&self) -> u32 { self.leadout }

	#[must_use]
	/// # Total Audio Span (sectors).
	///
	/// The combined track ranges always tile this exactly.
	pub fn span(&self) -> u32 {
		let Some(first) = self.tracks.first() else { return 0; };
		let Some(last) = self.tracks.last() else { return 0; };
		last.rng.end.abs_diff(first.rng.start)
	}
}

impl TrackEntry {
	#[must_use]
	/// # Track Number.
	pub const fn number(&self) -> u8 { self.number }

	#[must_use]
	/// # Hidden Track?
	pub const fn is_htoa(&self) -> bool { self.number == 0 }

	#[must_use]
	/// # Sector Range (absolute LBAs).
	pub const fn range(&self) -> &Range<i32> { &self.rng }

	#[must_use]
	/// # Pregap (sectors).
	pub const fn pregap(&self) -> u32 { self.pregap }

	#[must_use]
	/// # Pre-emphasis?
	pub const fn preemphasis(&self) -> bool { self.preemphasis }

	#[must_use]
	/// # Length (sectors).
	pub fn sectors(&self) -> u32 { self.rng.end.abs_diff(self.rng.start) }

	#[must_use]
	/// # Length (samples).
	pub fn samples(&self) -> u64 {
		u64::from(self.sectors()) * u64::from(SAMPLES_PER_SECTOR)
	}
}



/// # LBA to Signed.
///
/// Sector math downstream mixes in negative margins, so ranges are kept
/// signed.
fn lba_i32(src: u32) -> Result<i32, RipError> {
	i32::try_from(src).map_err(|_| RipError::RipOverflow)
}
