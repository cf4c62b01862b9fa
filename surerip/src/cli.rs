/*!
# Surerip: CLI
*/

use argyle::Argument;
use dactyl::traits::BytesToUnsigned;
use surerip_core::{
	Disc,
	LibcdioDrive,
	ReadOffset,
	RipError,
	RipOptions,
};



/// # Options Return Type.
///
/// Options, disc, --no-rip, --no-summary.
pub(super) type Parsed = (RipOptions, Disc<LibcdioDrive>, bool, bool);



/// # Parse Options.
pub(super) fn parse() -> Result<Parsed, RipError> {
	let args = argyle::args()
		.with_keywords(include!(concat!(env!("OUT_DIR"), "/argyle.rs")));

	let mut opts = RipOptions::default();
	let mut no_rip = false;
	let mut no_summary = false;
	let mut dev = None;
	let mut tracks = String::new();
	for arg in args {
		match arg {
			Argument::Key("-h" | "--help") => return Err(RipError::PrintHelp),
			Argument::Key("--no-rip") => { no_rip = true; },
			Argument::Key("--no-save") => { opts = opts.with_save(false); },
			Argument::Key("--no-summary") => { no_summary = true; },
			Argument::Key("--no-verify") => { opts = opts.with_verify(false); },
			Argument::Key("--trim-pregap") => { opts = opts.with_trim_pregap(true); },
			Argument::Key("-V" | "--version") => return Err(RipError::PrintVersion),

			Argument::KeyWithValue("-d" | "--dev", s) => { dev.replace(s); },
			Argument::KeyWithValue("--drift", s) => {
				let s = u16::btou(s.trim().as_bytes())
					.ok_or(RipError::CliParse("--drift"))?;
				opts = opts.with_drift(s);
			},
			Argument::KeyWithValue("-m" | "--margin", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(RipError::CliParse("-m/--margin"))?;
				opts = opts.with_margin(s);
			},
			Argument::KeyWithValue("-o" | "--offset", s) => {
				let s = ReadOffset::try_from(s.trim().as_bytes())
					.map_err(|_| RipError::CliParse("-o/--offset"))?;
				opts = opts.with_offset(s);
			},
			Argument::KeyWithValue("-r" | "--retry" | "--retries", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(RipError::CliParse("-r/--retries"))?;
				opts = opts.with_retries(s);
			},
			Argument::KeyWithValue("-t" | "--track" | "--tracks", s) => {
				if ! tracks.is_empty() { tracks.push(','); }
				tracks.push_str(&s);
			},
			Argument::KeyWithValue("--timeout", s) => {
				let s = u8::btou(s.trim().as_bytes())
					.ok_or(RipError::CliParse("--timeout"))?;
				opts = opts.with_timeout(s);
			},

			_ => {},
		}
	}

	// Figure out the disc. (Bogus track requests are caught at rip time,
	// so the list only needs decoding here.)
	let disc = Disc::new(LibcdioDrive::new(dev.as_deref())?)?;
	if ! tracks.is_empty() { opts = parse_rip_option_tracks(opts, &tracks)?; }

	Ok((opts, disc, no_rip, no_summary))
}



/// # Parse Rip Tracks.
///
/// Track selections can be single indices, comma-separated lists, and/or
/// inclusive ranges like `2-5`.
fn parse_rip_option_tracks(mut opts: RipOptions, tracks: &str)
-> Result<RipOptions, RipError> {
	for v in tracks.split(',') {
		let v = v.trim();
		if v.is_empty() { continue; }

		// It might be a range.
		if let Some((a, b)) = v.split_once('-') {
			let a = u8::btou(a.trim().as_bytes())
				.ok_or(RipError::CliParse("-t/--tracks"))?;
			let b = u8::btou(b.trim().as_bytes())
				.ok_or(RipError::CliParse("-t/--tracks"))?;

			// Add them all!
			if a <= b {
				for idx in a..=b { opts = opts.with_track(idx); }
			}
			else { return Err(RipError::CliParse("-t/--tracks")); }
		}
		// Otherwise it should be a single index.
		else {
			let v = u8::btou(v.as_bytes())
				.ok_or(RipError::CliParse("-t/--tracks"))?;
			opts = opts.with_track(v);
		}
	}

	Ok(opts)
}
