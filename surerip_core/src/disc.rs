/*!
# Surerip: Disc
*/

use cdtoc::Toc;
use crate::{
	CD_LEADOUT_LABEL,
	DiscLayout,
	Drive,
	ExtractionReport,
	KillSwitch,
	RipError,
	RipOptions,
	Ripper,
	TrackSink,
	Verifier,
};
use fyi_msg::Progless;
use std::fmt;



#[derive(Debug)]
/// # Disc.
///
/// A loaded and validated compact disc: the drive it lives in, plus its
/// parsed table of contents. This is the crate's front door; build one,
/// print it if you like, then [`rip`](Disc::rip) it.
pub struct Disc<D: Drive> {
	/// # The Drive.
	drive: D,

	/// # The Layout.
	layout: DiscLayout,
}

impl<D: Drive> Disc<D> {
	/// # New.
	///
	/// Pull and validate the disc structure from the drive.
	///
	/// ## Errors
	///
	/// This will return an error if there's a problem communicating with
	/// the drive, the disc is unsupported, etc.
	pub fn new(drive: D) -> Result<Self, RipError> {
		let raw = drive.raw_toc()?;
		let layout = DiscLayout::from_raw(&raw)?;
		Ok(Self { drive, layout })
	}

	#[must_use]
	/// # Layout.
	pub const fn layout(&self) -> &DiscLayout { &self.layout }

	#[must_use]
	/// # Table of Contents.
	pub const fn toc(&self) -> &Toc { self.layout.toc() }

	#[must_use]
	/// # Drive Description.
	pub fn drive_description(&self) -> Option<String> { self.drive.description() }
}

impl<D: Drive> Disc<D> {
	/// # Rip!
	///
	/// Extract the selected tracks (or the whole disc), verify them, and
	/// push the results through `sink`, returning the extraction report.
	///
	/// ## Errors
	///
	/// This will bubble up terminal drive/IO errors, or complaints about
	/// nonexistent tracks; read problems and verification trouble are
	/// recorded in the report instead.
	pub fn rip(
		&self,
		opts: &RipOptions,
		verifier: Option<&dyn Verifier>,
		sink: &mut dyn TrackSink,
		progress: Option<&Progless>,
		killed: KillSwitch,
	) -> Result<ExtractionReport, RipError> {
		Ripper::new(&self.drive, &self.layout, opts)?
			.rip(verifier, sink, progress, killed)
	}
}

impl<D: Drive> fmt::Display for Disc<D> {
	/// # Summarize the Disc.
	///
	/// This prints the disc identifiers and table of contents in a nice
	/// little table.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		/// # Divider.
		const DIVIDER: &str = "----------------------------------------\n";

		let toc = self.layout.toc();
		writeln!(f, "CDTOC:       {toc}")?;
		writeln!(f, "AccurateRip: {}", toc.accuraterip_id())?;
		writeln!(f, "CDDB:        {}", toc.cddb_id())?;

		// Start the table of contents.
		f.write_str("\n##   FIRST    LAST  LENGTH\n")?;
		f.write_str(DIVIDER)?;

		for t in self.layout.tracks() {
			let rng = t.range();
			writeln!(
				f,
				"{:02}  {:>6}  {:>6}  {:>6}{}",
				t.number(),
				rng.start,
				rng.end - 1,
				t.sectors(),
				if t.is_htoa() { "  HTOA" } else { "" },
			)?;
		}

		// The leadout.
		writeln!(
			f,
			"{}  {:>6}                LEAD-OUT",
			CD_LEADOUT_LABEL,
			self.layout.leadout(),
		)?;

		// Close it off!
		f.write_str(DIVIDER)?;
		writeln!(f)
	}
}
