/*!
# Surerip: Ripping
*/

pub(crate) mod opts;
pub(crate) mod quality;
pub(crate) mod sector;

use crate::{
	BYTES_PER_SECTOR,
	ChecksumRecord,
	Confidence,
	DiscLayout,
	Drive,
	ExtractionReport,
	KillSwitch,
	RipError,
	RipOptions,
	TrackEntry,
	TrackReport,
	TrackSink,
	Verifier,
};
use fyi_msg::{
	Msg,
	Progless,
};
use quality::TrackQuality;
use sector::{
	SectorIter,
	SectorStatus,
};
use std::{
	collections::BTreeMap,
	time::Instant,
};



/// # Rip Manager.
///
/// This holds the disc layout, ripping options, etc., and coordinates the
/// track-by-track extraction, checksumming, verification, and output.
pub(crate) struct Ripper<'a, D: Drive> {
	/// # Start of the Run.
	now: Instant,

	/// # The Drive.
	drive: &'a D,

	/// # The Disc.
	layout: &'a DiscLayout,

	/// # Options.
	opts: RipOptions,

	/// # The Tracks Being Ripped (in disc order).
	tracks: Vec<TrackEntry>,
}

impl<'a, D: Drive> Ripper<'a, D> {
	/// # New!
	///
	/// Initialize from a layout and options, weeding out requests for
	/// tracks the disc doesn't have.
	///
	/// ## Errors
	///
	/// This will return an error if a requested track doesn't exist, or
	/// no tracks are left to rip.
	pub(crate) fn new(drive: &'a D, layout: &'a DiscLayout, opts: &RipOptions)
	-> Result<Self, RipError> {
		let tracks: Vec<TrackEntry> =
			if opts.has_tracks() {
				let mut out = Vec::new();
				for idx in opts.tracks() {
					out.push(layout.track(idx).ok_or(RipError::NoTrack(idx))?.clone());
				}
				out
			}
			else { layout.tracks().to_vec() };

		if tracks.is_empty() { return Err(RipError::Noop); }

		Ok(Self {
			now: Instant::now(),
			drive,
			layout,
			opts: *opts,
			tracks,
		})
	}

	/// # Rip!
	///
	/// Extract, checksum, verify, and save each track in order, returning
	/// the full report.
	///
	/// A thrown kill switch stops the rip at the next sector boundary;
	/// tracks already finished stay finished, and the report covers
	/// exactly those.
	///
	/// ## Errors
	///
	/// This will bubble up terminal drive and I/O errors; verification
	/// trouble only ever downgrades confidence.
	pub(crate) fn rip(
		&self,
		verifier: Option<&dyn Verifier>,
		sink: &mut dyn TrackSink,
		progress: Option<&Progless>,
		killed: KillSwitch,
	) -> Result<ExtractionReport, RipError> {
		let mut done: Vec<(TrackEntry, ChecksumRecord)> = Vec::with_capacity(self.tracks.len());
		let mut saved: BTreeMap<u8, std::path::PathBuf> = BTreeMap::default();
		let mut aborted = false;

		for track in &self.tracks {
			if killed.killed() { aborted = true; break; }

			if let Some(p) = progress {
				let _res = p.reset(track.sectors());
				p.set_title(Some(Msg::custom(
					"Ripping",
					199,
					&format!("Track #{}\u{2026}", track.number()),
				)));
			}

			// Pull the data. A mid-track abort drops the partial track
			// entirely; half a track is worse than none.
			let Some((data, quality)) = self.rip_track(track, progress, killed)? else {
				aborted = true;
				break;
			};

			let record = ChecksumRecord::new(
				track.number(),
				&data,
				track.number() == self.layout.first_audio(),
				track.number() == self.layout.last_audio(),
				quality,
			);

			if self.opts.save() {
				let dst = sink.save_track(self.layout.toc(), track, &data)?;
				saved.insert(track.number(), dst);
			}

			done.push((track.clone(), record));
		}

		if let Some(p) = progress { p.finish(); }

		// Verification is all-or-nothing per run: one fetch covers the
		// whole disc, and a dead service downgrades everything to
		// unverified rather than failing the rip.
		let records: Vec<ChecksumRecord> = done.iter().map(|(_, r)| *r).collect();
		let confidences = verifier
			.filter(|_| ! records.is_empty())
			.map_or_else(
				|| vec![Confidence::Unverified; records.len()],
				|v| match v.verify(self.layout.toc(), &records) {
					Ok(c) if c.len() == records.len() => c,
					_ => {
						Msg::warning("The verification service could not be reached; accuracy is unconfirmed.").eprint();
						vec![Confidence::Unverified; records.len()]
					},
				},
			);

		// A cue sheet only makes sense when the whole disc made it to
		// disk.
		if ! aborted && self.opts.save() &&
			self.layout.tracks().iter().all(|t| saved.contains_key(&t.number())) {
			let _res = sink.save_cuesheet(self.layout, &saved);
		}

		// Assemble the report.
		let mut report = ExtractionReport::new(self.layout.toc().clone());
		for ((track, record), confidence) in done.into_iter().zip(confidences) {
			report.push(TrackReport::new(&track, record, confidence));
		}
		report.set_elapsed(
			u32::try_from(self.now.elapsed().as_secs()).unwrap_or(u32::MAX)
		);
		Ok(report)
	}

	/// # Rip One Track.
	///
	/// Stream the track's sectors through the verification loop, applying
	/// the pregap policy as the data lands, and tallying quality as it
	/// goes.
	///
	/// Returns `None` if the kill switch was thrown partway.
	///
	/// ## Errors
	///
	/// Terminal drive errors bubble up.
	fn rip_track(
		&self,
		track: &TrackEntry,
		progress: Option<&Progless>,
		killed: KillSwitch,
	) -> Result<Option<(Vec<u8>, TrackQuality)>, RipError> {
		let mut quality = TrackQuality::default();
		let mut data: Vec<u8> = Vec::with_capacity(
			track.sectors() as usize * usize::from(BYTES_PER_SECTOR)
		);
		let gap_end = track.range().start.saturating_add_unsigned(track.pregap());

		for sector in SectorIter::new(self.drive, &self.opts, track.range().clone()) {
			if killed.killed() { return Ok(None); }
			let sector = sector?;

			match sector.status {
				SectorStatus::Verified => quality.add_verified(sector.reads, sector.read_errors),
				SectorStatus::Suspect => quality.add_suspect(sector.reads, sector.read_errors),
				SectorStatus::Failed => quality.add_failed(sector.reads, sector.read_errors),
			}

			// Pregap sectors are silence by definition; depending on
			// policy they're either skipped or zeroed in place.
			if sector.lba < gap_end {
				if ! self.opts.trim_pregap() {
					data.resize(data.len() + usize::from(BYTES_PER_SECTOR), 0);
				}
			}
			else { data.extend_from_slice(&sector.data); }

			if let Some(p) = progress { p.increment(); }
		}

		Ok(Some((data, quality)))
	}
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::drive::RawToc;

	/// # A Layout For Option Pruning Tests.
	fn layout() -> DiscLayout {
		DiscLayout::from_raw(&RawToc {
			first: 1,
			entries: vec![
				crate::RawTocEntry { number: 1, start: 150, pregap: 0, audio: true, preemphasis: false },
				crate::RawTocEntry { number: 2, start: 10_000, pregap: 0, audio: true, preemphasis: false },
			],
			leadout: 20_000,
			sessions: 1,
		}).expect("Layout failed.")
	}

	/// # A Drive That Never Gets Used.
	struct DeadDrive;
	impl Drive for DeadDrive {
		fn raw_toc(&self) -> Result<RawToc, RipError> { Err(RipError::Bug("unused")) }
		fn read_sectors(&self, _lba: i32, _buf: &mut [u8]) -> Result<(), RipError> {
			Err(RipError::CdReadUnsupported)
		}
	}

	#[test]
	fn t_track_pruning() {
		let layout = layout();
		let drive = DeadDrive;

		// Default: everything.
		let ripper = Ripper::new(&drive, &layout, &RipOptions::default())
			.expect("Ripper failed.");
		assert_eq!(ripper.tracks.len(), 2);

		// A subset.
		let opts = RipOptions::default().with_track(2);
		let ripper = Ripper::new(&drive, &layout, &opts).expect("Ripper failed.");
		assert_eq!(ripper.tracks.len(), 1);
		assert_eq!(ripper.tracks[0].number(), 2);

		// A bogus track.
		let opts = RipOptions::default().with_track(9);
		assert!(matches!(
			Ripper::new(&drive, &layout, &opts),
			Err(RipError::NoTrack(9)),
		));

		// No HTOA on this disc, so track zero is bogus too.
		let opts = RipOptions::default().with_track(0);
		assert!(matches!(
			Ripper::new(&drive, &layout, &opts),
			Err(RipError::NoTrack(0)),
		));
	}
}
