/*!
# Surerip: Sector Reader
*/

use crate::{
	BYTES_PER_SAMPLE,
	BYTES_PER_SECTOR,
	Drive,
	NULL_SAMPLE,
	RipError,
	RipOptions,
	Sample,
	SAMPLES_PER_SECTOR,
};
use std::ops::Range;



/// # Sector Size (bytes), usize-flavored.
const SECTOR_BYTES: usize = BYTES_PER_SECTOR as usize;

/// # Sample Size (bytes), usize-flavored.
const SAMPLE_BYTES: usize = BYTES_PER_SAMPLE as usize;



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Final Sector Status.
///
/// Every sector starts out unread, passes through however many reads it
/// takes, and lands on exactly one of these.
pub(crate) enum SectorStatus {
	/// # Two Reads Agreed on the First Try.
	Verified,

	/// # Agreement Took Retries.
	Suspect,

	/// # Agreement Never Came; Data is Best-Effort.
	Failed,
}

#[derive(Debug, Clone)]
/// # A Finished Sector.
pub(crate) struct SectorBuffer {
	/// # Absolute LBA.
	pub(crate) lba: i32,

	/// # Audio Data (one sector's worth).
	pub(crate) data: Vec<u8>,

	/// # Paired-Read Attempts Used.
	pub(crate) attempts: u8,

	/// # Raw Drive Reads Issued.
	pub(crate) reads: u32,

	/// # Transient Read Errors Along the Way.
	pub(crate) read_errors: u32,

	/// # Outcome.
	pub(crate) status: SectorStatus,
}



#[derive(Debug)]
/// # Sector Reader.
///
/// This drives the per-sector verification loop: read the sector with a
/// margin of neighbors on either side, read it again from a slightly
/// different starting position, and see whether the two copies agree
/// (allowing the data to have drifted a few samples between reads).
///
/// Consecutive reads are compared until two agree or the retry cap is
/// hit, at which point the most frequently observed value of each sample
/// is kept as a best-effort stand-in.
pub(crate) struct SectorReader<'a, D: Drive> {
	/// # The Drive.
	drive: &'a D,

	/// # Margin (sectors per side).
	///
	/// Padded beyond the configured value when the read offset needs
	/// more room than the margin would otherwise provide.
	margin: i32,

	/// # Drift Window (samples).
	drift: usize,

	/// # Retry Cap.
	retries: u8,

	/// # Read Offset (bytes, signed).
	offset: isize,
}

impl<'a, D: Drive> SectorReader<'a, D> {
	/// # New.
	pub(crate) fn new(drive: &'a D, opts: &RipOptions) -> Self {
		// The offset shifts the target region within the window; the
		// margin has to be big enough to absorb that shift plus a full
		// sector of drift slack on either side.
		let margin = i32::from(opts.margin())
			.max(i32::from(opts.offset().sectors_abs()) + 2);

		Self {
			drive,
			margin,
			drift: usize::from(opts.drift()),
			retries: opts.retries(),
			offset: isize::from(opts.offset().samples()) * SAMPLE_BYTES as isize,
		}
	}

	/// # Rip One Sector.
	///
	/// Run the full read/compare/retry routine for a single sector.
	///
	/// ## Errors
	///
	/// Transient read errors are counted and absorbed; only terminal
	/// drive problems bubble up.
	pub(crate) fn rip_sector(&self, lba: i32) -> Result<SectorBuffer, RipError> {
		let mut tally = SampleTally::new();
		let mut window = Vec::new();
		let mut prev: Option<Vec<u8>> = None;
		let mut attempts = 0_u8;
		let mut reads = 0_u32;
		let mut read_errors = 0_u32;

		while attempts < self.retries {
			attempts += 1;

			// Each comparison needs a baseline; normally that's the
			// previous read, but the first attempt (or one following a
			// read error) has to fetch its own.
			if prev.is_none() {
				reads += 1;
				match self.read_window(lba, reads, &mut window)? {
					Some(start) => {
						let slice = window[start..start + SECTOR_BYTES].to_vec();
						tally.add(&slice);
						prev.replace(slice);
					},
					// The attempt is spent either way; a drive that
					// errors forever shouldn't hold the rip hostage.
					None => {
						read_errors += 1;
						continue;
					},
				}
			}

			// The comparison read.
			reads += 1;
			let Some(start) = self.read_window(lba, reads, &mut window)? else {
				read_errors += 1;
				continue;
			};
			let slice = window[start..start + SECTOR_BYTES].to_vec();
			tally.add(&slice);

			// Agreement! The confirmed content is whatever the baseline
			// held; the new read merely vouched for it.
			if let Some(baseline) = prev.take() {
				if self.drifted_match(&baseline, &window, start) {
					return Ok(SectorBuffer {
						lba,
						data: baseline,
						attempts,
						reads,
						read_errors,
						status:
							if attempts == 1 { SectorStatus::Verified }
							else { SectorStatus::Suspect },
					});
				}
			}

			// No agreement; the new read becomes the next baseline.
			prev.replace(slice);
		}

		// Out of patience. Keep the most popular version of each sample.
		Ok(SectorBuffer {
			lba,
			data: tally.resolve(),
			attempts,
			reads,
			read_errors,
			status: SectorStatus::Failed,
		})
	}

	/// # Read a Window Around a Sector.
	///
	/// Issue one drive read covering `lba` plus the margin on either
	/// side, with a few extra leading sectors (varying read-to-read) so
	/// consecutive requests never start from the same position — a cheap
	/// way to keep the drive's cache from answering for the laser.
	///
	/// Returns the starting index of the offset-corrected target region
	/// within `buf` on success, `None` on a transient read error.
	///
	/// ## Errors
	///
	/// Terminal drive problems bubble up.
	#[allow(clippy::cast_possible_wrap)]
	fn read_window(&self, lba: i32, read: u32, buf: &mut Vec<u8>)
	-> Result<Option<usize>, RipError> {
		// Jostle the starting position a little.
		let jostle = (read % self.margin.unsigned_abs()) as i32;
		let start = lba - self.margin - jostle;
		let sectors = 2 * self.margin + 1 + jostle;
		let len = usize::try_from(sectors).map_err(|_| RipError::RipOverflow)? * SECTOR_BYTES;
		buf.resize(len, 0);

		match self.drive.read_sectors(start, buf) {
			Ok(()) => Ok(Some(self.target_start(lba, start))),
			Err(RipError::CdRead(_)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	#[allow(clippy::cast_sign_loss)]
	/// # Target Region Start (bytes, within window).
	///
	/// The margin guarantees this lands at least a drift-window's worth
	/// of bytes from either edge.
	fn target_start(&self, lba: i32, window_start: i32) -> usize {
		let sectors = (lba - window_start) as usize;
		(sectors * SECTOR_BYTES).wrapping_add_signed(self.offset)
	}

	/// # Does the New Read Agree With the Baseline?
	///
	/// Check the nominal position first, then walk outward a sample at a
	/// time (in both directions) up to the drift window. Drives don't
	/// always deliver data from quite the address they were asked for;
	/// as long as the same bytes show up _somewhere_ nearby, the content
	/// is confirmed.
	fn drifted_match(&self, baseline: &[u8], window: &[u8], start: usize) -> bool {
		if baseline.len() != SECTOR_BYTES { return false; }
		if baseline == &window[start..start + SECTOR_BYTES] { return true; }

		for shift in 1..=self.drift {
			let b = shift * SAMPLE_BYTES;
			if baseline == &window[start - b..start - b + SECTOR_BYTES] { return true; }
			if baseline == &window[start + b..start + b + SECTOR_BYTES] { return true; }
		}

		false
	}
}



#[derive(Debug)]
/// # Per-Position Sample Tally.
///
/// Every read's version of the sector gets recorded here, one entry per
/// sample position. When a sector fails outright, the most frequently
/// observed value at each position wins (ties go to the earliest).
struct SampleTally(Vec<Vec<(Sample, u16)>>);

impl SampleTally {
	/// # New (Empty).
	fn new() -> Self {
		Self(vec![Vec::new(); usize::from(SAMPLES_PER_SECTOR)])
	}

	/// # Record One Read's Worth of Samples.
	fn add(&mut self, slice: &[u8]) {
		for (pos, chunk) in slice.chunks_exact(SAMPLE_BYTES).enumerate() {
			let sample: Sample = [chunk[0], chunk[1], chunk[2], chunk[3]];
			let list = &mut self.0[pos];
			if let Some(entry) = list.iter_mut().find(|(s, _)| s.eq(&sample)) {
				entry.1 += 1;
			}
			else { list.push((sample, 1)); }
		}
	}

	/// # Most Popular Value Per Position.
	fn resolve(self) -> Vec<u8> {
		let mut out = Vec::with_capacity(SECTOR_BYTES);
		for list in self.0 {
			let mut best: (Sample, u16) = (NULL_SAMPLE, 0);
			for (sample, count) in list {
				if best.1 < count { best = (sample, count); }
			}
			out.extend_from_slice(best.0.as_slice());
		}
		out
	}
}



#[derive(Debug)]
/// # Lazy Sector Stream.
///
/// Yields one finished [`SectorBuffer`] per LBA of the requested range,
/// in order, performing the reads as it goes. Like the underlying disc
/// spiral, it only moves forward; there is no rewinding a half-consumed
/// stream.
pub(crate) struct SectorIter<'a, D: Drive> {
	/// # The Reader.
	reader: SectorReader<'a, D>,

	/// # Remaining Range.
	rng: Range<i32>,
}

impl<'a, D: Drive> SectorIter<'a, D> {
	/// # New.
	pub(crate) fn new(drive: &'a D, opts: &RipOptions, rng: Range<i32>) -> Self {
		Self {
			reader: SectorReader::new(drive, opts),
			rng,
		}
	}
}

impl<'a, D: Drive> Iterator for SectorIter<'a, D> {
	type Item = Result<SectorBuffer, RipError>;

	fn next(&mut self) -> Option<Self::Item> {
		let lba = self.rng.next()?;
		Some(self.reader.rip_sector(lba))
	}

	fn size_hint(&self) -> (usize, Option<usize>) { self.rng.size_hint() }
}



#[cfg(test)]
mod test {
	use super::*;
	use crate::drive::RawToc;
	use std::cell::Cell;

	/// # Deterministic "Audio" Byte.
	///
	/// Position-unique enough that misaligned slices never accidentally
	/// match.
	fn tone(p: i64) -> u8 { ((p * 31 + (p >> 7)) % 251) as u8 }

	/// # A Scriptable Drive.
	///
	/// Returns position-derived data, optionally shifted by a per-read
	/// sample drift and/or scrambled entirely for the first N reads.
	struct SimDrive {
		/// # Per-Read Sample Shifts (cycled).
		shifts: Vec<i64>,

		/// # Return Garbage For This Many Reads.
		garbage: u32,

		/// # Error Out For This Many Reads.
		errors: u32,

		/// # Reads Issued.
		count: Cell<u32>,
	}

	impl SimDrive {
		fn quiet(shifts: Vec<i64>) -> Self {
			Self { shifts, garbage: 0, errors: 0, count: Cell::new(0) }
		}
	}

	impl Drive for SimDrive {
		fn raw_toc(&self) -> Result<RawToc, RipError> {
			Err(RipError::Bug("not needed here"))
		}

		fn read_sectors(&self, lba: i32, buf: &mut [u8]) -> Result<(), RipError> {
			let read = self.count.get();
			self.count.set(read + 1);

			if read < self.errors { return Err(RipError::CdRead(lba)); }

			if read < self.errors + self.garbage {
				// Scramble: derive from the read counter so no two
				// garbage reads ever agree.
				for (i, b) in buf.iter_mut().enumerate() {
					*b = tone(i64::from(read) * 7_919 + i as i64 + 13);
				}
				return Ok(());
			}

			let shift = self.shifts[read as usize % self.shifts.len()];
			let base = i64::from(lba) * i64::from(BYTES_PER_SECTOR);
			for (i, b) in buf.iter_mut().enumerate() {
				*b = tone(base + i as i64 - shift * SAMPLE_BYTES as i64);
			}
			Ok(())
		}
	}

	/// # Expected Bytes For a Sector.
	fn expected(lba: i32) -> Vec<u8> {
		let base = i64::from(lba) * i64::from(BYTES_PER_SECTOR);
		(0..i64::from(BYTES_PER_SECTOR)).map(|i| tone(base + i)).collect()
	}

	#[test]
	fn t_verified_first_attempt() {
		let drive = SimDrive::quiet(vec![0]);
		let reader = SectorReader::new(&drive, &RipOptions::default());
		let out = reader.rip_sector(1000).expect("Rip failed.");

		assert_eq!(out.status, SectorStatus::Verified);
		assert_eq!(out.attempts, 1);
		assert_eq!(out.reads, 2);
		assert_eq!(out.read_errors, 0);
		assert_eq!(out.data, expected(1000));
	}

	#[test]
	fn t_drift_alignment() {
		// Every other read arrives two samples late; the drift window
		// should absorb it.
		let drive = SimDrive::quiet(vec![0, 2]);
		let reader = SectorReader::new(&drive, &RipOptions::default());
		let out = reader.rip_sector(1000).expect("Rip failed.");
		assert_eq!(out.status, SectorStatus::Verified);
		assert_eq!(out.data, expected(1000));

		// With no drift allowance, the same drive can never verify.
		let drive = SimDrive::quiet(vec![0, 2]);
		let reader = SectorReader::new(
			&drive,
			&RipOptions::default().with_drift(0).with_retries(5),
		);
		let out = reader.rip_sector(1000).expect("Rip failed.");
		assert_eq!(out.status, SectorStatus::Failed);
		assert_eq!(out.attempts, 5);
	}

	#[test]
	fn t_suspect_after_retries() {
		// Three garbage reads, then consistency: baseline (read 1) is
		// garbage, read 2 is garbage, read 3 is garbage, read 4 + 5
		// agree. Attempts: 1 (r1+r2), 2 (r3), 3 (r4), 4 (r5).
		let mut drive = SimDrive::quiet(vec![0]);
		drive.garbage = 3;
		let reader = SectorReader::new(&drive, &RipOptions::default());
		let out = reader.rip_sector(1000).expect("Rip failed.");

		assert_eq!(out.status, SectorStatus::Suspect);
		assert_eq!(out.attempts, 4);
		assert_eq!(out.reads, 5);
		assert_eq!(out.data, expected(1000));
	}

	#[test]
	fn t_failed_majority() {
		// Nothing but unique garbage: the cap is spent and the majority
		// fallback kicks in. With every read unique, "majority" is the
		// earliest version, but the sector must still be full-size.
		let mut drive = SimDrive::quiet(vec![0]);
		drive.garbage = u32::MAX;
		let opts = RipOptions::default().with_retries(10);
		let reader = SectorReader::new(&drive, &opts);
		let out = reader.rip_sector(1000).expect("Rip failed.");

		assert_eq!(out.status, SectorStatus::Failed);
		assert_eq!(out.attempts, 10);
		assert_eq!(out.reads, 11);
		assert_eq!(out.data.len(), usize::from(BYTES_PER_SECTOR));
	}

	#[test]
	fn t_read_errors_counted() {
		// Two transient errors, then smooth sailing.
		let mut drive = SimDrive::quiet(vec![0]);
		drive.errors = 2;
		let reader = SectorReader::new(&drive, &RipOptions::default());
		let out = reader.rip_sector(1000).expect("Rip failed.");

		assert_eq!(out.read_errors, 2);
		assert_eq!(out.data, expected(1000));
	}

	#[test]
	fn t_offset_shift() {
		// A read offset moves the window slice without changing the
		// output address; a +4 offset means the data we want actually
		// lives four samples later in the stream.
		let drive = SimDrive::quiet(vec![0]);
		let opts = RipOptions::default()
			.with_offset(crate::ReadOffset::try_from("4").expect("Bad offset."));
		let reader = SectorReader::new(&drive, &opts);
		let out = reader.rip_sector(1000).expect("Rip failed.");

		assert_eq!(out.status, SectorStatus::Verified);
		let base = i64::from(1000) * i64::from(BYTES_PER_SECTOR) + 4 * 4;
		let want: Vec<u8> = (0..i64::from(BYTES_PER_SECTOR)).map(|i| tone(base + i)).collect();
		assert_eq!(out.data, want);
	}

	#[test]
	fn t_iter_is_sequential() {
		let drive = SimDrive::quiet(vec![0]);
		let iter = SectorIter::new(&drive, &RipOptions::default(), 100..104);
		let lbas: Vec<i32> = iter.map(|s| s.expect("Rip failed.").lba).collect();
		assert_eq!(lbas, &[100, 101, 102, 103]);
	}
}
