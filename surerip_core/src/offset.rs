/*!
# Surerip: Read Offset
*/

use crate::{
	RipError,
	SAMPLES_PER_SECTOR,
};
use dactyl::traits::BytesToSigned;



/// # Offset Limit (samples, either direction).
///
/// AccurateRip's published drive offsets all land within ten sectors of
/// zero; anything bigger is presumed to be a typo.
const LIMIT: u16 = SAMPLES_PER_SECTOR * 10;



#[derive(Debug, Clone, Copy, Default, Eq, Ord, PartialEq, PartialOrd)]
/// # Read Offset.
///
/// A drive's sample read offset, `-5880..=5880`. The stored unit is
/// samples; the sector-granular views are derived on demand for the
/// window margin math.
pub struct ReadOffset(i16);

impl TryFrom<i16> for ReadOffset {
	type Error = RipError;

	fn try_from(src: i16) -> Result<Self, Self::Error> {
		if src.unsigned_abs() <= LIMIT { Ok(Self(src)) }
		else { Err(RipError::ReadOffset) }
	}
}

impl TryFrom<&[u8]> for ReadOffset {
	type Error = RipError;

	fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
		i16::btoi(src)
			.ok_or(RipError::ReadOffset)
			.and_then(Self::try_from)
	}
}

impl TryFrom<&str> for ReadOffset {
	type Error = RipError;

	#[inline]
	fn try_from(src: &str) -> Result<Self, Self::Error> {
		Self::try_from(src.as_bytes())
	}
}

impl ReadOffset {
	#[must_use]
	/// # Is Negative?
	pub const fn is_negative(self) -> bool { self.0 < 0 }

	#[must_use]
	/// # Samples.
	pub const fn samples(self) -> i16 { self.0 }

	#[must_use]
	/// # Samples (Absolute).
	pub const fn samples_abs(self) -> u16 { self.0.unsigned_abs() }

	#[must_use]
	/// # Sectors (Absolute).
	///
	/// The number of whole sectors needed to contain the offset; partial
	/// sectors round up.
	pub const fn sectors_abs(self) -> u16 {
		self.0.unsigned_abs().div_ceil(SAMPLES_PER_SECTOR)
	}

	#[must_use]
	#[allow(clippy::cast_possible_wrap)] // Ten, tops.
	/// # Sectors.
	///
	/// Same as [`ReadOffset::sectors_abs`], but signed to match the
	/// direction of the offset.
	pub const fn sectors(self) -> i16 {
		let abs = self.sectors_abs() as i16;
		if self.is_negative() { -abs } else { abs }
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_offset_sectors() {
		// Sector counts always round away from zero.
		for (samples, sectors) in [
			(0_i16, 0_i16),
			(6, 1),
			(-6, -1),
			(588, 1),
			(589, 2),
			(667, 2),
			(-667, -2),
			(5880, 10),
			(-5880, -10),
		] {
			let offset = ReadOffset::try_from(samples)
				.expect("Offset refused a valid value.");
			assert_eq!(offset.samples(), samples);
			assert_eq!(offset.samples_abs(), samples.unsigned_abs());
			assert_eq!(offset.sectors(), sectors);
			assert_eq!(offset.sectors_abs(), sectors.unsigned_abs());
			assert_eq!(offset.is_negative(), samples < 0);
		}
	}

	#[test]
	fn t_offset_limits() {
		// String parsing lands on the same values.
		assert_eq!(
			ReadOffset::try_from("-588").map(ReadOffset::samples),
			Ok(-588),
		);

		// Ten sectors is the ceiling in both directions, and garbage is
		// garbage.
		assert!(ReadOffset::try_from(5881_i16).is_err());
		assert!(ReadOffset::try_from(-5881_i16).is_err());
		assert!(ReadOffset::try_from("bananas").is_err());
		assert!(ReadOffset::try_from("").is_err());
	}
}
