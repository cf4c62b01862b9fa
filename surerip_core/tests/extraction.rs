/*!
# Surerip: End-to-End Extraction

These tests run whole rips against a scriptable in-memory drive, from
raw TOC to finished report, exercising the same public surface the
binary uses.
*/

use cdtoc::Toc;
use std::{
	cell::Cell,
	collections::BTreeMap,
	path::PathBuf,
	sync::atomic::{
		AtomicBool,
		Ordering::Release,
	},
};
use surerip_core::{
	ChecksumRecord,
	Confidence,
	Disc,
	Drive,
	KillSwitch,
	RawToc,
	RawTocEntry,
	RipError,
	RipOptions,
	TrackEntry,
	TrackSink,
	TrackStatus,
	Verifier,
};



/// # Sector Size (bytes).
const SECTOR: usize = 2352;

/// # Kill Switch Backing (left alone).
static IDLE: AtomicBool = AtomicBool::new(false);

/// # Kill Switch Backing (thrown).
static THROWN: AtomicBool = AtomicBool::new(false);

/// # A Switch Nobody Throws.
fn idle_switch() -> KillSwitch { KillSwitch::from(&IDLE) }



/// # Deterministic "Audio" Byte.
fn tone(p: i64) -> u8 { ((p * 31 + (p >> 7)) % 251) as u8 }

/// # The Bytes a Clean Rip Should Produce For an LBA Range.
fn expected(rng: std::ops::Range<i32>) -> Vec<u8> {
	let mut out = Vec::with_capacity(rng.len() * SECTOR);
	for lba in rng {
		let base = i64::from(lba) * SECTOR as i64;
		out.extend((0..SECTOR as i64).map(|i| tone(base + i)));
	}
	out
}



/// # A Scriptable Drive.
///
/// Data is derived from absolute disc position, so every read of a given
/// sector returns the same bytes — except for `bad` sectors, which return
/// fresh garbage every time, and the first `errors` reads, which fail.
struct SimDrive {
	/// # Track Starts (two audio tracks).
	split: u32,

	/// # Leadout.
	leadout: u32,

	/// # Sectors That Never Read the Same Twice.
	bad: Vec<i32>,

	/// # Error Out For This Many Reads.
	errors: u32,

	/// # Reads Issued.
	count: Cell<u32>,
}

impl SimDrive {
	/// # A Quiet Two-Track Disc.
	fn quiet() -> Self {
		Self {
			split: 160,
			leadout: 170,
			bad: Vec::new(),
			errors: 0,
			count: Cell::new(0),
		}
	}
}

impl Drive for SimDrive {
	fn raw_toc(&self) -> Result<RawToc, RipError> {
		Ok(RawToc {
			first: 1,
			entries: vec![
				RawTocEntry { number: 1, start: 150, pregap: 0, audio: true, preemphasis: false },
				RawTocEntry { number: 2, start: self.split, pregap: 0, audio: true, preemphasis: false },
			],
			leadout: self.leadout,
			sessions: 1,
		})
	}

	fn read_sectors(&self, lba: i32, buf: &mut [u8]) -> Result<(), RipError> {
		let read = self.count.get();
		self.count.set(read + 1);
		if read < self.errors { return Err(RipError::CdRead(lba)); }

		let base = i64::from(lba) * SECTOR as i64;
		for (i, b) in buf.iter_mut().enumerate() {
			*b = tone(base + i as i64);
		}

		// Scramble any "bad" sectors falling within the window so no two
		// reads of them ever agree.
		let sectors = buf.len() / SECTOR;
		for &bad in &self.bad {
			if lba <= bad && bad < lba + sectors as i32 {
				let start = (bad - lba) as usize * SECTOR;
				for (i, b) in buf[start..start + SECTOR].iter_mut().enumerate() {
					*b = tone(i64::from(read) * 7_919 + i as i64 + 29);
				}
			}
		}

		Ok(())
	}

	fn description(&self) -> Option<String> { Some("FAKE DRIVE-3000".to_owned()) }
}



/// # A Verifier With Canned Answers.
enum SimVerifier {
	/// # Pretend the Service Is Down.
	Down,

	/// # The Same Answer For Every Track.
	Uniform(Confidence),

	/// # One Answer Per Track, In Order.
	PerTrack(Vec<Confidence>),
}

impl Verifier for SimVerifier {
	fn verify(&self, _toc: &Toc, checksums: &[ChecksumRecord])
	-> Result<Vec<Confidence>, RipError> {
		match self {
			Self::Down => Err(RipError::Verification),
			Self::Uniform(c) => Ok(vec![*c; checksums.len()]),
			Self::PerTrack(answers) => {
				assert_eq!(answers.len(), checksums.len(), "Wrong checksum count.");
				Ok(answers.clone())
			},
		}
	}
}



/// # A Sink That Keeps Everything In Memory.
#[derive(Default)]
struct MemSink(BTreeMap<u8, Vec<u8>>);

impl TrackSink for MemSink {
	fn save_track(&mut self, _toc: &Toc, track: &TrackEntry, data: &[u8])
	-> Result<PathBuf, RipError> {
		self.0.insert(track.number(), data.to_vec());
		Ok(PathBuf::from(format!("{:02}.wav", track.number())))
	}
}



#[test]
fn t_clean_rip() {
	let disc = Disc::new(SimDrive::quiet()).expect("Disc failed.");

	// The layout should tile the audio span exactly.
	let span: u32 = disc.layout().tracks().iter().map(TrackEntry::sectors).sum();
	assert_eq!(span, 170 - 150);

	let mut sink = MemSink::default();
	let verifier = SimVerifier::Uniform(Confidence::Matched { v1: 2, v2: 3 });
	let report = disc.rip(
		&RipOptions::default(),
		Some(&verifier),
		&mut sink,
		None,
		idle_switch(),
	).expect("Rip failed.");

	// Two tracks, all verified, all confirmed.
	assert_eq!(report.tracks().len(), 2);
	assert_eq!(report.read_errors(), 0);
	assert_eq!(report.status(), Some(TrackStatus::Accurate));
	for t in report.tracks() {
		assert_eq!(t.status(), TrackStatus::Accurate);
		assert_eq!(t.confidence(), Confidence::Matched { v1: 2, v2: 3 });

		let q = t.record().quality();
		assert_eq!(q.verified(), q.sectors());
		assert_eq!(q.suspect(), 0);
		assert_eq!(q.failed(), 0);
		// One paired read per sector on a clean disc.
		assert_eq!(q.reads(), q.sectors() * 2);
	}

	// The sink should hold the exact disc bytes.
	assert_eq!(sink.0.len(), 2);
	assert_eq!(sink.0.get(&1), Some(&expected(150..160)));
	assert_eq!(sink.0.get(&2), Some(&expected(160..170)));

	// And the log must render deterministically.
	assert_eq!(report.to_string(), report.to_string());
}

#[test]
fn t_degraded_sector() {
	// One sector in track two never reads consistently.
	let mut drive = SimDrive::quiet();
	drive.bad.push(165);
	let disc = Disc::new(drive).expect("Disc failed.");

	let mut sink = MemSink::default();
	let verifier = SimVerifier::Uniform(Confidence::Matched { v1: 2, v2: 3 });
	let opts = RipOptions::default().with_retries(3);
	let report = disc.rip(&opts, Some(&verifier), &mut sink, None, idle_switch())
		.expect("Rip failed.");

	// Track one is untouched; track two is degraded; the disc verdict
	// follows the worst track.
	assert_eq!(report.tracks()[0].status(), TrackStatus::Accurate);
	assert_eq!(report.tracks()[1].status(), TrackStatus::Degraded);
	assert_eq!(report.status(), Some(TrackStatus::Degraded));

	let q = report.tracks()[1].record().quality();
	assert_eq!(q.failed(), 1);
	assert_eq!(q.verified(), q.sectors() - 1);

	// The bad sector costs the retry cap's worth of reads; its neighbors
	// cost the usual two.
	assert_eq!(q.reads(), (q.sectors() - 1) * 2 + 4);

	// The track still made it to the sink, full-length.
	assert_eq!(sink.0.get(&2).map(Vec::len), Some(10 * SECTOR));
}

#[test]
fn t_verifier_down() {
	let disc = Disc::new(SimDrive::quiet()).expect("Disc failed.");

	let mut sink = MemSink::default();
	let verifier = SimVerifier::Down;
	let report = disc.rip(
		&RipOptions::default(),
		Some(&verifier),
		&mut sink,
		None,
		idle_switch(),
	).expect("Rip failed.");

	// A dead service downgrades, never fails.
	assert_eq!(report.status(), Some(TrackStatus::Clean));
	for t in report.tracks() {
		assert_eq!(t.confidence(), Confidence::Unverified);
	}
}

#[test]
fn t_mixed_confidence() {
	// The database knows track one but not track two; the rip succeeds
	// with a split verdict.
	let disc = Disc::new(SimDrive::quiet()).expect("Disc failed.");

	let mut sink = MemSink::default();
	let verifier = SimVerifier::PerTrack(vec![
		Confidence::Matched { v1: 4, v2: 1 },
		Confidence::Unverified,
	]);
	let report = disc.rip(
		&RipOptions::default(),
		Some(&verifier),
		&mut sink,
		None,
		idle_switch(),
	).expect("Rip failed.");

	assert_eq!(report.tracks().len(), 2);
	assert_eq!(report.tracks()[0].status(), TrackStatus::Accurate);
	assert_eq!(report.tracks()[0].confidence(), Confidence::Matched { v1: 4, v2: 1 });
	assert_eq!(report.tracks()[1].status(), TrackStatus::Clean);
	assert_eq!(report.tracks()[1].confidence(), Confidence::Unverified);

	// The disc verdict tracks the weaker of the two, and both tracks
	// still land in the sink.
	assert_eq!(report.status(), Some(TrackStatus::Clean));
	assert_eq!(sink.0.len(), 2);
}

#[test]
fn t_no_verifier() {
	let disc = Disc::new(SimDrive::quiet()).expect("Disc failed.");

	let mut sink = MemSink::default();
	let report = disc.rip(
		&RipOptions::default(),
		None,
		&mut sink,
		None,
		idle_switch(),
	).expect("Rip failed.");

	assert_eq!(report.status(), Some(TrackStatus::Clean));
	assert!(report.tracks().iter().all(|t| t.confidence() == Confidence::Unverified));
}

#[test]
fn t_transient_errors() {
	// The first three reads fail outright; the rip should absorb them,
	// count them, and still come out clean.
	let mut drive = SimDrive::quiet();
	drive.errors = 3;
	let disc = Disc::new(drive).expect("Disc failed.");

	let mut sink = MemSink::default();
	let report = disc.rip(
		&RipOptions::default(),
		None,
		&mut sink,
		None,
		idle_switch(),
	).expect("Rip failed.");

	assert_eq!(report.read_errors(), 3);
	assert_eq!(report.status(), Some(TrackStatus::Clean));
	assert_eq!(sink.0.get(&1), Some(&expected(150..160)));
}

#[test]
fn t_kill_switch() {
	// A pre-thrown switch means nothing gets ripped, but the run still
	// ends gracefully with an (empty) report.
	THROWN.store(true, Release);

	let disc = Disc::new(SimDrive::quiet()).expect("Disc failed.");
	let mut sink = MemSink::default();
	let report = disc.rip(
		&RipOptions::default(),
		None,
		&mut sink,
		None,
		KillSwitch::from(&THROWN),
	).expect("Rip failed.");

	assert!(report.tracks().is_empty());
	assert_eq!(report.status(), None);
	assert!(sink.0.is_empty());
}

#[test]
fn t_track_subset() {
	let disc = Disc::new(SimDrive::quiet()).expect("Disc failed.");

	let mut sink = MemSink::default();
	let opts = RipOptions::default().with_track(2);
	let report = disc.rip(&opts, None, &mut sink, None, idle_switch())
		.expect("Rip failed.");

	assert_eq!(report.tracks().len(), 1);
	assert_eq!(report.tracks()[0].track(), 2);
	assert_eq!(sink.0.len(), 1);
	assert_eq!(sink.0.get(&2), Some(&expected(160..170)));

	// And asking for a track the disc doesn't have is an error.
	let opts = RipOptions::default().with_track(7);
	assert!(matches!(
		disc.rip(&opts, None, &mut sink, None, idle_switch()),
		Err(RipError::NoTrack(7)),
	));
}
