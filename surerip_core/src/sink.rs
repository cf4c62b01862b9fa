/*!
# Surerip: Track Output
*/

use cdtoc::Toc;
use crate::{
	BYTES_PER_SECTOR,
	CacheWriter,
	DiscLayout,
	out_path,
	RipError,
	TrackEntry,
};
use std::{
	collections::BTreeMap,
	ffi::OsStr,
	io::BufWriter,
	path::PathBuf,
};



/// # Write Buffer Size.
const BUFFER_SIZE: usize = 16 * 1024;

/// # Wave Header.
///
/// Every header is the same, except for two four-byte blocks specifying
/// the file and data sizes.
const WAVE_HEADER: [u8; 44] = [
	82, 73, 70, 70,    // "RIFF"
	0, 0, 0, 0,        // Total file size, minus RIFF and these four bytes
	87, 65, 86, 69,    // "WAVE"
	102, 109, 116, 32, // "fmt "
	16, 0, 0, 0,       // 16: length of the above.
	1, 0,              // 1: PCM format.
	2, 0,              // 2: Number of channels.
	68, 172, 0, 0,     // 44,100: Sample rate.
	16, 177, 2, 0,     // 176,400: Sample rate * bps * channels / 8.
	4, 0,              // 4: bps * channels / 8.
	16, 0,             // 16: Bits per sample.
	100, 97, 116, 97,  // "data"
	0, 0, 0, 0,        // Size of the data portion (all that comes next).
];



/// # Somewhere For Finished Tracks To Go.
///
/// The extraction controller hands each finished track's PCM here; what
/// happens next — WAV files, a test buffer, `/dev/null` — is the sink's
/// business.
pub trait TrackSink {
	/// # Save a Track.
	///
	/// Returns the path the track was written to, for reporting.
	///
	/// ## Errors
	///
	/// This should return an error if the write fails.
	fn save_track(&mut self, toc: &Toc, track: &TrackEntry, data: &[u8])
	-> Result<PathBuf, RipError>;

	/// # Save a Cue Sheet.
	///
	/// Called once at the end when every track on the disc was ripped
	/// and saved. Optional; the default does nothing.
	fn save_cuesheet(&mut self, _layout: &DiscLayout, _saved: &BTreeMap<u8, PathBuf>)
	-> Option<PathBuf> { None }
}



#[derive(Debug, Clone, Copy, Default)]
/// # WAV Files On Disk.
///
/// Tracks land in the output directory as `<cddb-id>_<nn>.wav`, written
/// atomically so an interrupted rip never leaves a plausible-looking
/// half-track behind.
pub struct WavSink;

impl TrackSink for WavSink {
	fn save_track(&mut self, toc: &Toc, track: &TrackEntry, data: &[u8])
	-> Result<PathBuf, RipError> {
		use std::io::Write;

		let dst = out_path(format!("{}_{:02}.wav", toc.cddb_id(), track.number()))?;

		// The data length is easy; the file length excludes "RIFF" and
		// the four bytes specifying the file length.
		let data_len = u32::try_from(data.len())
			.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;
		let file_len = 44 - 8 + data_len;

		// Write the data!
		let mut writer = CacheWriter::new(&dst)?;
		{
			let mut buf = BufWriter::with_capacity(BUFFER_SIZE, writer.writer());

			// The header comes first; we just need to fill out the
			// size-related blocks before pushing it.
			let mut header = WAVE_HEADER;
			header[4..8].copy_from_slice(file_len.to_le_bytes().as_slice());
			header[40..].copy_from_slice(data_len.to_le_bytes().as_slice());
			buf.write_all(header.as_slice())
				.and_then(|()| buf.write_all(data))
				.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;
		}
		writer.finish()?;
		Ok(dst)
	}

	fn save_cuesheet(&mut self, layout: &DiscLayout, saved: &BTreeMap<u8, PathBuf>)
	-> Option<PathBuf> {
		use std::fmt::Write;

		// Make sure all tracks on the disc have been ripped, and pair
		// their file names with the corresponding layout entry.
		let mut all = Vec::with_capacity(saved.len());
		for track in layout.tracks() {
			let dst = saved.get(&track.number())?;
			let dst = dst.file_name().and_then(OsStr::to_str)?;
			all.push((track, dst));
		}

		let mut cue = String::new();
		let mut rest = all.as_slice();

		// If there's an HTOA, it needs to be grouped with the first
		// (nominal) track.
		if rest.first().is_some_and(|(t, _)| t.is_htoa()) {
			let (_, src0) = rest.first()?;
			let (_, src1) = rest.get(1)?;
			writeln!(&mut cue, "FILE \"{src0}\" WAVE").ok()?;
			cue.push_str("  TRACK 01 AUDIO\n");
			cue.push_str("    INDEX 00 00:00:00\n");
			writeln!(&mut cue, "FILE \"{src1}\" WAVE").ok()?;
			cue.push_str("    INDEX 01 00:00:00\n");
			rest = &rest[2..];
		}

		// All other tracks are just file/track/index.
		for (track, src) in rest {
			writeln!(&mut cue, "FILE \"{src}\" WAVE").ok()?;
			writeln!(&mut cue, "  TRACK {:02} AUDIO", track.number()).ok()?;
			cue.push_str("    INDEX 01 00:00:00\n");
		}

		// Save it!
		let dst = out_path(format!("{}.cue", layout.toc().cddb_id())).ok()?;
		{
			use std::io::Write;
			let mut writer = CacheWriter::new(&dst).ok()?;
			writer.writer().write_all(cue.as_bytes()).ok()?;
			writer.finish().ok()?;
		}

		Some(dst)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_wave_header() {
		// The static parts should describe 16-bit stereo 44.1k PCM.
		assert_eq!(&WAVE_HEADER[..4], b"RIFF");
		assert_eq!(&WAVE_HEADER[8..12], b"WAVE");
		assert_eq!(u16::from_le_bytes([WAVE_HEADER[22], WAVE_HEADER[23]]), 2);
		assert_eq!(
			u32::from_le_bytes([WAVE_HEADER[24], WAVE_HEADER[25], WAVE_HEADER[26], WAVE_HEADER[27]]),
			44_100,
		);
		assert_eq!(u16::from_le_bytes([WAVE_HEADER[34], WAVE_HEADER[35]]), 16);

		// And a sector's worth of audio should size cleanly.
		let data_len = u32::from(BYTES_PER_SECTOR);
		assert_eq!(44 - 8 + data_len, 2388);
	}
}
