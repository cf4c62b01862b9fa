/*!
# Surerip: Rip Quality
*/

use std::ops::{
	Add,
	AddAssign,
};



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Track Quality.
///
/// Per-track read statistics, accumulated sector-by-sector as the rip
/// progresses. These wind up in the [`ChecksumRecord`](crate::ChecksumRecord)
/// and, from there, the extraction report.
pub struct TrackQuality {
	/// # Sectors Verified on the First Attempt.
	verified: u32,

	/// # Sectors Verified Only After Retries.
	suspect: u32,

	/// # Sectors That Never Verified (best-effort data).
	failed: u32,

	/// # Total Drive Reads.
	reads: u32,

	/// # Transient Read Errors.
	read_errors: u32,
}

impl Add for TrackQuality {
	type Output = Self;
	fn add(self, other: Self) -> Self {
		Self {
			verified: self.verified + other.verified,
			suspect: self.suspect + other.suspect,
			failed: self.failed + other.failed,
			reads: self.reads + other.reads,
			read_errors: self.read_errors + other.read_errors,
		}
	}
}

impl AddAssign for TrackQuality {
	fn add_assign(&mut self, other: Self) { *self = *self + other; }
}

impl TrackQuality {
	#[must_use]
	/// # Sectors Verified on the First Attempt.
	pub const fn verified(&self) -> u32 { self.verified }

	#[must_use]
	/// # Sectors Verified Only After Retries.
	pub const fn suspect(&self) -> u32 { self.suspect }

	#[must_use]
	/// # Sectors That Never Verified.
	pub const fn failed(&self) -> u32 { self.failed }

	#[must_use]
	/// # Total Drive Reads.
	pub const fn reads(&self) -> u32 { self.reads }

	#[must_use]
	/// # Transient Read Errors.
	pub const fn read_errors(&self) -> u32 { self.read_errors }

	#[must_use]
	/// # Total Sectors.
	pub const fn sectors(&self) -> u32 {
		self.verified + self.suspect + self.failed
	}

	#[must_use]
	/// # Everything Agreed Immediately?
	pub const fn is_clean(&self) -> bool {
		self.suspect == 0 && self.failed == 0
	}
}

impl TrackQuality {
	/// # Record a Sector Verified on the First Attempt.
	pub(crate) fn add_verified(&mut self, reads: u32, errors: u32) {
		self.verified += 1;
		self.reads += reads;
		self.read_errors += errors;
	}

	/// # Record a Sector That Needed Retries.
	pub(crate) fn add_suspect(&mut self, reads: u32, errors: u32) {
		self.suspect += 1;
		self.reads += reads;
		self.read_errors += errors;
	}

	/// # Record a Sector That Never Agreed.
	pub(crate) fn add_failed(&mut self, reads: u32, errors: u32) {
		self.failed += 1;
		self.reads += reads;
		self.read_errors += errors;
	}
}
