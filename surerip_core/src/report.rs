/*!
# Surerip: Extraction Report
*/

use crate::{
	ChecksumRecord,
	Confidence,
	TrackEntry,
	TrackQuality,
};
use cdtoc::Toc;
use dactyl::NiceElapsed;
use std::fmt;
use utc2k::FmtUtc2k;



#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
/// # Track Verdict.
///
/// Ordered worst-to-best so the disc verdict is a simple `min()`.
pub enum TrackStatus {
	/// # Best-Effort Data Made It Into the Output.
	Degraded,

	/// # Internally Consistent, Externally Unconfirmed.
	Clean,

	/// # Independently Confirmed.
	Accurate,
}

impl TrackStatus {
	#[must_use]
	/// # As String Slice.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Degraded => "DEGRADED",
			Self::Clean => "CLEAN",
			Self::Accurate => "ACCURATE",
		}
	}
}



#[derive(Debug, Clone)]
/// # Per-Track Report Line.
pub struct TrackReport {
	/// # First LBA (inclusive).
	first: i32,

	/// # Last LBA (inclusive).
	last: i32,

	/// # Pregap (sectors).
	pregap: u32,

	/// # Checksums and Quality.
	record: ChecksumRecord,

	/// # Verification Outcome.
	confidence: Confidence,
}

impl TrackReport {
	#[must_use]
	/// # New.
	pub(crate) fn new(
		track: &TrackEntry,
		record: ChecksumRecord,
		confidence: Confidence,
	) -> Self {
		Self {
			first: track.range().start,
			last: track.range().end - 1,
			pregap: track.pregap(),
			record,
			confidence,
		}
	}

	#[must_use]
	/// # Track Number.
	pub const fn track(&self) -> u8 { self.record.track() }

	#[must_use]
	/// # Checksums and Quality.
	pub const fn record(&self) -> &ChecksumRecord { &self.record }

	#[must_use]
	/// # Verification Outcome.
	pub const fn confidence(&self) -> Confidence { self.confidence }

	#[must_use]
	/// # Verdict.
	pub const fn status(&self) -> TrackStatus {
		if self.record.degraded() { TrackStatus::Degraded }
		else if self.confidence.confirmed() { TrackStatus::Accurate }
		else { TrackStatus::Clean }
	}
}



#[derive(Debug, Clone)]
/// # Extraction Report.
///
/// Everything worth keeping from one extraction run, renderable as a
/// stable plain-text log. All the variable bits — including the start
/// time — are captured as data, so rendering the same report twice
/// always produces the same bytes.
pub struct ExtractionReport {
	/// # Disc Identity.
	toc: Toc,

	/// # Start Time (captured once).
	started: FmtUtc2k,

	/// # Total Run Time (seconds).
	elapsed: u32,

	/// # Per-Track Lines.
	tracks: Vec<TrackReport>,
}

impl ExtractionReport {
	#[must_use]
	/// # New (Empty).
	pub(crate) fn new(toc: Toc) -> Self {
		Self {
			toc,
			started: FmtUtc2k::now(),
			elapsed: 0,
			tracks: Vec::new(),
		}
	}

	/// # Add a Track Line.
	pub(crate) fn push(&mut self, line: TrackReport) { self.tracks.push(line); }

	/// # Record the Total Run Time.
	pub(crate) fn set_elapsed(&mut self, elapsed: u32) { self.elapsed = elapsed; }
}

impl ExtractionReport {
	#[must_use]
	/// # Disc Identity.
	pub const fn toc(&self) -> &Toc { &self.toc }

	#[must_use]
	/// # Per-Track Lines.
	pub fn tracks(&self) -> &[TrackReport] { &self.tracks }

	#[must_use]
	/// # Combined Read Quality.
	///
	/// The per-track counters rolled up into one disc-wide total.
	pub fn quality(&self) -> TrackQuality {
		let mut out = TrackQuality::default();
		for t in &self.tracks { out += t.record.quality(); }
		out
	}

	#[must_use]
	/// # Total Transient Read Errors.
	pub fn read_errors(&self) -> u32 { self.quality().read_errors() }

	#[must_use]
	/// # Disc Verdict (worst track wins).
	pub fn status(&self) -> Option<TrackStatus> {
		self.tracks.iter().map(TrackReport::status).min()
	}
}

impl fmt::Display for ExtractionReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		// The preamble.
		writeln!(
			f,
			r"##
## Surerip v{}
## Started: {}
## Finished in: {}
##
## CDTOC:       {}
## AccurateRip: {}
## CDDB:        {}
##",
			env!("CARGO_PKG_VERSION"),
			self.started,
			NiceElapsed::from(self.elapsed),
			self.toc,
			self.toc.accuraterip_id(),
			self.toc.cddb_id(),
		)?;

		// The track table.
		f.write_str("##   FIRST    LAST  GAP  READS  SUSP  FAIL   PEAK     CRC32      ARv1      ARv2   CONF    STATUS\n")?;
		for t in &self.tracks {
			let q = t.record.quality();
			let conf = match t.confidence {
				Confidence::Unverified => "   --".to_owned(),
				Confidence::Matched { v1, v2 } => format!("{:02}+{:02}", v1.min(99), v2.min(99)),
			};
			writeln!(
				f,
				"{:02}  {:06}  {:06}  {:03}  {:05}  {:04}  {:04}  {:>5.1}  {:08x}  {:08x}  {:08x}  {conf}  {}",
				t.track(),
				t.first,
				t.last,
				t.pregap,
				q.reads(),
				q.suspect(),
				q.failed(),
				f64::from(t.record.peak()) / 32_768.0 * 100.0,
				t.record.crc32(),
				t.record.ar_v1(),
				t.record.ar_v2(),
				t.status().as_str(),
			)?;
		}

		// The summary.
		writeln!(
			f,
			r"##
## Tracks: {}
## Read Errors: {}
## Result: {}",
			self.tracks.len(),
			self.read_errors(),
			self.status().map_or("NOOP", TrackStatus::as_str),
		)
	}
}
