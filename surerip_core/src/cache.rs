/*!
# Surerip: Output Cache
*/

use crate::{
	OUT_BASE,
	RipError,
};
use fyi_msg::Msg;
use std::{
	fs::File,
	path::{
		Path,
		PathBuf,
	},
	sync::OnceLock,
};
use tempfile::NamedTempFile;



/// # Output Root.
///
/// This will ultimately hold `CWD/OUT_BASE`.
static OUT_ROOT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// # Output Path.
///
/// Glue `src` onto the output root and return it.
///
/// ## Errors
///
/// This will return an error if the output root cannot be established.
pub(super) fn out_path<P>(src: P) -> Result<PathBuf, RipError>
where P: AsRef<Path> {
	out_root().map(|root| root.join(src))
}

/// # Read From the Output Directory.
///
/// Read a file previously written under the output root, if it exists.
///
/// Note: the path should be _relative_ to the root.
///
/// ## Errors
///
/// This will return an error if the output root cannot be established, but
/// will otherwise simply return `None` if there are problems with the file.
pub(super) fn out_read<P>(src: P) -> Result<Option<Vec<u8>>, RipError>
where P: AsRef<Path> {
	let src = out_path(src)?;
	Ok(std::fs::read(src).ok().filter(|v| ! v.is_empty()))
}

/// # Output Root.
///
/// Return the canonical output root for the program, creating it if it
/// doesn't already exist.
///
/// ## Errors
///
/// This will return an error if the path cannot be determined or the current
/// working directory does not exist.
fn out_root() -> Result<&'static Path, RipError> {
	let out = OUT_ROOT.get_or_init(|| {
		// The base must already exist.
		let dir = std::env::current_dir().ok()?;
		if ! dir.is_dir() { return None; }

		// Our root.
		let dir = dir.join(OUT_BASE);

		// Make it if necessary.
		if ! dir.is_dir() {
			std::fs::create_dir_all(&dir).ok()?;
		}

		// Make sure it is really there.
		std::fs::canonicalize(dir).ok()
	})
		.as_deref()
		.ok_or(RipError::OutDir)?;

	if out.is_dir() { Ok(out) }
	// It seems to have vanished… try to recreate it.
	else {
		Msg::warning(format!("The {OUT_BASE} output directory has vanished!")).eprint();
		std::fs::create_dir_all(out).map_err(|_| RipError::OutDir)?;
		if out.is_dir() { Ok(out) }
		else { Err(RipError::OutDir) }
	}
}



#[derive(Debug)]
/// # Atomic File Writer.
///
/// Content is streamed to a temporary file in the destination's directory,
/// then moved into place all at once, ensuring partial writes never
/// masquerade as finished tracks.
pub(crate) struct CacheWriter {
	/// # Final Destination.
	dst: PathBuf,

	/// # Scratch File.
	tmp: NamedTempFile,
}

impl CacheWriter {
	/// # New Writer.
	///
	/// ## Errors
	///
	/// This will return an error if the temporary file cannot be created.
	pub(crate) fn new(dst: &Path) -> Result<Self, RipError> {
		let parent = dst.parent()
			.ok_or_else(|| RipError::Write(dst.to_string_lossy().into_owned()))?;
		let tmp = NamedTempFile::new_in(parent)
			.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))?;
		Ok(Self { dst: dst.to_path_buf(), tmp })
	}

	/// # Writer.
	///
	/// Return a mutable reference to the underlying (temporary) file.
	pub(crate) fn writer(&mut self) -> &mut File { self.tmp.as_file_mut() }

	/// # Finish.
	///
	/// Move the temporary file to its final destination.
	///
	/// ## Errors
	///
	/// This will return an error if the rename fails.
	pub(crate) fn finish(self) -> Result<(), RipError> {
		let Self { dst, tmp } = self;
		tmp.persist(&dst)
			.map(|_| ())
			.map_err(|_| RipError::Write(dst.to_string_lossy().into_owned()))
	}
}
