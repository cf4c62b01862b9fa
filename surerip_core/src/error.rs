/*!
# Surerip: Errors
*/

use cdtoc::TocError;
use fyi_msg::Msg;
use std::{
	error::Error,
	fmt,
};



#[cfg(feature = "bin")]
/// # Help Text.
const HELP: &str = concat!(r"
Surerip v", env!("CARGO_PKG_VERSION"), r"
Secure, self-verifying audio CD extraction.

USAGE:
    surerip [OPTIONS]

BASIC SETTINGS:
    -t, --tracks <NUM(s),RNG>
                      Rip one or more specific tracks (rather than the whole
                      disc). Multiple tracks can be separated by commas (2,3),
                      specified as an inclusive range (2-3), and/or given their
                      own -t/--track (-t 2 -t 3). Track 0 can be used to rip
                      the HTOA, if any. [default: the whole disc]
    -r, --retries <NUM>
                      Give up on a sector after this many paired-read attempts
                      fail to agree, keeping the most frequently observed
                      values instead. [default: 20; range: 1..=64]

DRIVE SETTINGS:
    -d, --dev <PATH>  The device path for the optical drive containing the CD
                      of interest, like /dev/cdrom. [default: auto]
    -m, --margin <NUM>
                      Pad each sector read with this many neighboring sectors
                      on either side to absorb drive positioning drift.
                      [default: 2; range: 1..=10]
        --drift <SAMPLES>
                      The maximum per-read sample drift to search when
                      aligning overlapping reads. [default: 8; range: 0..=588]
    -o, --offset <SAMPLES>
                      The AccurateRip, et al, sample read offset to apply to
                      data retrieved from the drive. [default: 0; range: ±5880]

VERIFICATION:
        --no-verify   Skip the AccurateRip confidence lookup; all tracks will
                      be reported as unverified.
        --timeout <SECONDS>
                      The network timeout for verification lookups.
                      [default: 15; range: 1..=60]

OUTPUT:
        --trim-pregap Drop (rather than silence) pregap sectors when writing
                      track data.
        --no-save     Extract and verify without writing any WAV files.
        --no-summary  Skip the drive and disc summary and jump straight to
                      ripping.
        --no-rip      Print the basic disc information to STDERR and exit
                      (without ripping anything).

MISCELLANEOUS:
    -h, --help        Print help information to STDOUT and exit.
    -V, --version     Print version information to STDOUT and exit.
");



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Errors.
///
/// Only the device- and layout-related variants abort a rip; everything
/// else is either handled internally or recorded as report data.
pub enum RipError {
	/// # Bug!
	Bug(&'static str),

	/// # CD read error (transient; retried internally).
	CdRead(i32),

	/// # CD read operation terminal failure.
	CdReadUnsupported,

	/// # CDTOC passthrough.
	Cdtoc(TocError),

	/// # Invalid device.
	Device(String),

	/// # Unable to open device.
	DeviceOpen(Option<String>),

	/// # Unsupported Disc Layout.
	DiscLayout(&'static str),

	/// # Unable to get first track number.
	FirstTrackNum,

	/// # User Abort.
	Killed,

	/// # Unable to get leadout.
	Leadout,

	/// # Noop.
	Noop,

	/// # No Track.
	NoTrack(u8),

	/// # Unable to obtain the number of tracks.
	NumTracks,

	/// # Read Offset.
	ReadOffset,

	/// # Output directory.
	OutDir,

	/// # Numbers can't be converted to the necessary types.
	RipOverflow,

	/// # Invalid/unsupported track format.
	TrackFormat(u8),

	/// # Invalid track LBA.
	TrackLba(u8),

	/// # Invalid track number.
	TrackNumber(u8),

	/// # Verification service unreachable (recovered as "unverified").
	Verification,

	/// # Writing to disk.
	Write(String),

	#[cfg(feature = "bin")]
	/// # CLI Parsing failure.
	CliParse(&'static str),

	#[cfg(feature = "bin")]
	/// # Print Help (Not an Error).
	PrintHelp,

	#[cfg(feature = "bin")]
	/// # Print Version (Not an Error).
	PrintVersion,
}

impl Error for RipError {}

impl From<TocError> for RipError {
	#[inline]
	fn from(err: TocError) -> Self { Self::Cdtoc(err) }
}

impl From<RipError> for Msg {
	#[inline]
	fn from(src: RipError) -> Self { Self::error(src.to_string()) }
}

impl fmt::Display for RipError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Bug(s) => write!(f, "Bug: {s}."),
			Self::CdRead(lba) => write!(f, "Read error at sector {lba}."),
			Self::CdReadUnsupported => f.write_str("Unable to read CD; settings are probably wrong."),
			Self::Cdtoc(s) => write!(f, "{s}"),
			Self::Device(s) => write!(f, "Invalid device path {s}."),
			Self::DeviceOpen(s) =>
				if let Some(s) = s { write!(f, "Unable to open connection with {s}.") }
				else {
					f.write_str("Unable to open connection with default optical drive.")
				},
			Self::DiscLayout(s) => write!(f, "Unsupported disc layout: {s}."),
			Self::FirstTrackNum => f.write_str("Unable to obtain the first track index."),
			Self::Killed => f.write_str("User abort."),
			Self::Leadout => f.write_str("Unable to obtain leadout."),
			Self::Noop => f.write_str("There's nothing to do!"),
			Self::NoTrack(n) =>
				if *n == 0 { f.write_str("There is no HTOA on this disc.") }
				else { write!(f, "There is no track #{n} on this disc.") },
			Self::NumTracks => f.write_str("Unable to obtain the track total."),
			Self::OutDir => f.write_str("Unable to establish an output directory."),
			Self::ReadOffset => f.write_str("Invalid read offset."),
			Self::RipOverflow => f.write_str("The numbers are too big for this system architecture."),
			Self::TrackFormat(n) => write!(f, "Unsupported track type ({n})."),
			Self::TrackLba(n) => write!(f, "Unable to obtain LBA ({n})."),
			Self::TrackNumber(n) => write!(f, "Invalid track number ({n})."),
			Self::Verification => f.write_str("Verification service unreachable."),
			Self::Write(s) => write!(f, "Unable to write to {s}."),

			#[cfg(feature = "bin")]
			Self::CliParse(s) => write!(f, "Unable to parse {s}."),

			#[cfg(feature = "bin")]
			Self::PrintHelp => f.write_str(HELP),

			#[cfg(feature = "bin")]
			Self::PrintVersion => f.write_str(concat!("Surerip v", env!("CARGO_PKG_VERSION"))),
		}
	}
}

impl RipError {
	#[must_use]
	/// # Aborts the Rip?
	///
	/// Device- and layout-class failures take the whole operation down;
	/// everything else is captured as report data instead.
	pub const fn is_fatal(&self) -> bool {
		matches!(
			self,
			Self::Bug(_) |
			Self::CdReadUnsupported |
			Self::Cdtoc(_) |
			Self::Device(_) |
			Self::DeviceOpen(_) |
			Self::DiscLayout(_) |
			Self::FirstTrackNum |
			Self::Killed |
			Self::Leadout |
			Self::NumTracks |
			Self::RipOverflow |
			Self::TrackFormat(_) |
			Self::TrackLba(_) |
			Self::TrackNumber(_)
		)
	}
}
