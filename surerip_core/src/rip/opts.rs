/*!
# Surerip: Ripping Options
*/

use crate::ReadOffset;



/// # FLAG: Trim Pregaps.
const FLAG_TRIM_PREGAP: u8 = 0b0000_0001;

/// # FLAG: Verify Online.
const FLAG_VERIFY: u8 =      0b0000_0010;

/// # FLAG: Save Tracks.
const FLAG_SAVE: u8 =        0b0000_0100;

/// # FLAG: Default.
const FLAG_DEFAULT: u8 = FLAG_VERIFY | FLAG_SAVE;

/// # Minimum Retries.
const RETRIES_MIN: u8 = 1;

/// # Maximum Retries.
const RETRIES_MAX: u8 = 64;

/// # Minimum Margin.
const MARGIN_MIN: u8 = 1;

/// # Maximum Margin.
const MARGIN_MAX: u8 = 10;

/// # Maximum Drift (samples).
const DRIFT_MAX: u16 = 588;

/// # Minimum Timeout (seconds).
const TIMEOUT_MIN: u8 = 1;

/// # Maximum Timeout (seconds).
const TIMEOUT_MAX: u8 = 60;



#[derive(Debug, Clone, Copy)]
/// # Rip Options.
///
/// This struct holds the rip-related options like read offset, track
/// numbers, retry caps, etc.
///
/// Options are set using builder-style methods, like:
///
/// ```
/// use surerip_core::RipOptions;
///
/// let opts = RipOptions::default()
///     .with_retries(30)
///     .with_track(3) // Order doesn't matter.
///     .with_track(2)
///     .with_track(15);
///
/// assert_eq!(opts.retries(), 30);
/// assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[2, 3, 15]);
/// ```
pub struct RipOptions {
	/// # Read Offset.
	offset: ReadOffset,

	/// # Retry Cap (paired-read attempts per sector).
	retries: u8,

	/// # Read Margin (sectors per side).
	margin: u8,

	/// # Drift Window (samples).
	drift: u16,

	/// # Verification Timeout (seconds).
	timeout: u8,

	/// # Flags.
	flags: u8,

	/// # Tracks (one bit per number, `0..=99`).
	tracks: u128,
}

impl Default for RipOptions {
	fn default() -> Self {
		Self {
			offset: ReadOffset::default(),
			retries: 20,
			margin: 2,
			drift: 8,
			timeout: 15,
			flags: FLAG_DEFAULT,
			tracks: 0,
		}
	}
}

macro_rules! with_flag {
	($fn:ident, $flag:ident, $($doc:literal),+ $(,)?) => (
		#[must_use]
		$(
			#[doc = $doc]
		)+
		pub const fn $fn(self, v: bool) -> Self {
			let flags =
				if v { self.flags | $flag }
				else { self.flags & ! $flag };

			Self {
				flags,
				..self
			}
		}
	)
}

/// ## Setters.
impl RipOptions {
	#[must_use]
	/// # Drift Window.
	///
	/// When comparing two overlapping reads, allow their contents to be
	/// shifted up to this many samples in either direction before
	/// declaring them divergent. Drives with sloppy positioning need a
	/// few samples of slack; anything past a full sector is beyond what
	/// the margin reads can cover anyway.
	///
	/// Values are capped to `0..=588`, with a default of `8`.
	pub const fn with_drift(self, mut drift: u16) -> Self {
		if DRIFT_MAX < drift { drift = DRIFT_MAX; }
		Self {
			drift,
			..self
		}
	}

	#[must_use]
	/// # Read Margin.
	///
	/// Pad each sector read with this many neighboring sectors on either
	/// side. The extra context is what makes drift detection possible.
	///
	/// Values are capped to `1..=10`, with a default of `2`.
	pub const fn with_margin(self, mut margin: u8) -> Self {
		if margin < MARGIN_MIN { margin = MARGIN_MIN; }
		else if MARGIN_MAX < margin { margin = MARGIN_MAX; }
		Self {
			margin,
			..self
		}
	}

	#[must_use]
	/// # Read Offset.
	///
	/// Optical drives have weirdly arbitrary precision problems, causing
	/// them to read data a little earlier or later than another drive
	/// might.
	///
	/// To normalize the data obtained across different drives, it is
	/// critical to set the appropriate count-offset. See [here](http://www.accuraterip.com/driveoffsets.htm) if you're not sure
	/// what your drive's offset is.
	pub const fn with_offset(self, offset: ReadOffset) -> Self {
		Self {
			offset,
			..self
		}
	}

	#[must_use]
	/// # Retry Cap.
	///
	/// Give up on a sector after this many paired-read attempts fail to
	/// produce agreement, keeping the most frequently observed values
	/// instead.
	///
	/// Values are capped to `1..=64`, with a default of `20`.
	pub const fn with_retries(self, mut retries: u8) -> Self {
		if retries < RETRIES_MIN { retries = RETRIES_MIN; }
		else if RETRIES_MAX < retries { retries = RETRIES_MAX; }
		Self {
			retries,
			..self
		}
	}

	with_flag!(
		with_save,
		FLAG_SAVE,
		"# Save Tracks.",
		"",
		"When `true`, write each extracted track to disk as a WAV file",
		"(along with a cue sheet when the whole disc was ripped).",
		"",
		"The default is `true`.",
	);

	#[must_use]
	/// # Verification Timeout.
	///
	/// The network timeout, in seconds, for verification lookups.
	///
	/// Values are capped to `1..=60`, with a default of `15`.
	pub const fn with_timeout(self, mut timeout: u8) -> Self {
		if timeout < TIMEOUT_MIN { timeout = TIMEOUT_MIN; }
		else if TIMEOUT_MAX < timeout { timeout = TIMEOUT_MAX; }
		Self {
			timeout,
			..self
		}
	}

	#[must_use]
	/// # Include Track.
	///
	/// Add a track number to the to-rip list. Zero is the HTOA; numbers
	/// past `99` don't exist on a Redbook disc and are quietly ignored.
	/// Duplicates and ordering wash out in the bitset.
	pub const fn with_track(self, track: u8) -> Self {
		if 99 < track { self }
		else {
			Self {
				tracks: self.tracks | (1 << track),
				..self
			}
		}
	}

	with_flag!(
		with_trim_pregap,
		FLAG_TRIM_PREGAP,
		"# Trim Pregaps.",
		"",
		"When `true`, pregap sectors are dropped from the track output",
		"entirely; when `false`, they're kept in place but zeroed out,",
		"preserving nominal track lengths.",
		"",
		"The default is `false`.",
	);

	with_flag!(
		with_verify,
		FLAG_VERIFY,
		"# Verify Online.",
		"",
		"When `true`, look up each track's checksums against the",
		"AccurateRip database for independent confirmation. A dead or",
		"unreachable service downgrades tracks to \"unverified\" without",
		"otherwise affecting the rip.",
		"",
		"The default is `true`.",
	);
}



macro_rules! get_flag {
	($fn:ident, $flag:ident, $title:literal) => (
		#[must_use]
		#[doc = concat!("# ", $title, "?")]
		pub const fn $fn(&self) -> bool { $flag == self.flags & $flag }
	);
}

/// # Getters.
impl RipOptions {
	get_flag!(save, FLAG_SAVE, "Save Tracks");
	get_flag!(trim_pregap, FLAG_TRIM_PREGAP, "Trim Pregaps");
	get_flag!(verify, FLAG_VERIFY, "Verify Online");

	#[must_use]
	/// # Drift Window (samples).
	pub const fn drift(&self) -> u16 { self.drift }

	#[must_use]
	/// # Has Any Tracks?
	pub const fn has_tracks(&self) -> bool { self.tracks != 0 }

	#[must_use]
	/// # Read Margin (sectors per side).
	pub const fn margin(&self) -> u8 { self.margin }

	#[must_use]
	/// # Read Offset.
	pub const fn offset(&self) -> ReadOffset { self.offset }

	#[must_use]
	/// # Retry Cap.
	pub const fn retries(&self) -> u8 { self.retries }

	#[must_use]
	/// # Verification Timeout (seconds).
	pub const fn timeout(&self) -> u8 { self.timeout }

	#[must_use]
	/// # Tracks.
	///
	/// Return an iterator over the included track numbers, lowest first.
	pub const fn tracks(&self) -> RipOptionsTracks {
		RipOptionsTracks(self.tracks)
	}
}



#[derive(Debug, Clone)]
/// # Selected Track Numbers.
///
/// Drains a copy of the options' track bitset, yielding each set number
/// exactly once, in disc order.
pub struct RipOptionsTracks(u128);

impl Iterator for RipOptionsTracks {
	type Item = u8;

	#[allow(clippy::cast_possible_truncation)] // 127 at most.
	fn next(&mut self) -> Option<Self::Item> {
		if self.0 == 0 { None }
		else {
			let next = self.0.trailing_zeros() as u8;
			self.0 &= self.0 - 1; // Clear the bit we're yielding.
			Some(next)
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let len = self.len();
		(len, Some(len))
	}
}

impl ExactSizeIterator for RipOptionsTracks {
	#[inline]
	fn len(&self) -> usize { self.0.count_ones() as usize }
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_rip_flags() {
		// Make sure our flags are unique.
		let mut all = vec![
			FLAG_SAVE,
			FLAG_TRIM_PREGAP,
			FLAG_VERIFY,
		];
		all.sort_unstable();
		all.dedup();
		assert_eq!(all.len(), 3);
	}

	#[test]
	fn t_rip_options_clamps() {
		for v in [1, 20, 64] {
			let opts = RipOptions::default().with_retries(v);
			assert_eq!(opts.retries(), v);
		}
		assert_eq!(RipOptions::default().with_retries(0).retries(), RETRIES_MIN);
		assert_eq!(RipOptions::default().with_retries(200).retries(), RETRIES_MAX);

		assert_eq!(RipOptions::default().with_margin(0).margin(), MARGIN_MIN);
		assert_eq!(RipOptions::default().with_margin(50).margin(), MARGIN_MAX);

		assert_eq!(RipOptions::default().with_drift(0).drift(), 0);
		assert_eq!(RipOptions::default().with_drift(9999).drift(), DRIFT_MAX);

		assert_eq!(RipOptions::default().with_timeout(0).timeout(), TIMEOUT_MIN);
		assert_eq!(RipOptions::default().with_timeout(99).timeout(), TIMEOUT_MAX);
	}

	#[test]
	fn t_rip_options_flags() {
		macro_rules! t_flags {
			($name:literal, $set:ident, $get:ident) => (
				let mut opts = RipOptions::default();
				for v in [false, true, false, true] {
					opts = opts.$set(v);
					assert_eq!(
						opts.$get(),
						v,
						concat!("Setting ", $name, " to {} failed."),
						v
					);
				}
			);
		}

		t_flags!("save", with_save, save);
		t_flags!("trim_pregap", with_trim_pregap, trim_pregap);
		t_flags!("verify", with_verify, verify);
	}

	#[test]
	fn t_rip_options_tracks() {
		let mut opts = RipOptions::default();
		assert!(! opts.has_tracks());
		assert_eq!(opts.tracks().len(), 0);

		// The HTOA (zero) is a legitimate selection.
		opts = opts.with_track(0);
		assert!(opts.has_tracks());

		// Insertion order and duplicates wash out.
		opts = opts.with_track(15).with_track(5).with_track(15);
		assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[0, 5, 15]);
		assert_eq!(opts.tracks().len(), 3);

		// Numbers past the Redbook maximum fall on the floor.
		opts = opts.with_track(100).with_track(u8::MAX);
		assert_eq!(opts.tracks().collect::<Vec<u8>>(), &[0, 5, 15]);

		// And a full disc comes back complete and in order.
		let mut opts = RipOptions::default();
		for idx in 0..=99 { opts = opts.with_track(idx); }
		assert_eq!(opts.tracks().len(), 100);
		assert!(opts.tracks().eq(0..=99_u8));
	}
}
