/*!
# Surerip
*/

#![forbid(unsafe_code)]

#![warn(
	clippy::filetype_is_file,
	clippy::integer_division,
	clippy::needless_borrow,
	clippy::nursery,
	clippy::pedantic,
	clippy::perf,
	clippy::suboptimal_flops,
	clippy::unneeded_field_pattern,
	macro_use_extern_crate,
	missing_copy_implementations,
	missing_debug_implementations,
	missing_docs,
	non_ascii_idents,
	trivial_casts,
	trivial_numeric_casts,
	unreachable_pub,
	unused_crate_dependencies,
	unused_extern_crates,
	unused_import_braces,
)]

#![allow(
	clippy::doc_markdown,
	clippy::module_name_repetitions,
	clippy::redundant_pub_crate,
)]



mod cli;

use fyi_msg::{
	Msg,
	Progless,
};
use oxford_join::OxfordJoin;
use surerip_core::{
	AccurateRipService,
	Disc,
	Drive,
	KillSwitch,
	OUT_BASE,
	RipError,
	RipOptions,
	Verifier,
	WavSink,
};
use std::{
	process::ExitCode,
	sync::atomic::{
		AtomicBool,
		Ordering::Release,
	},
	time::Duration,
};



/// # A Divider Line.
///
/// This is used to encase the drive vendor/model during summary. We'll
/// slice it to match the length rather than `"-".repeat()` or whatever.
const DIVIDER: &str = "------------------------";

/// # Kill Switch Backing.
static KILLED: AtomicBool = AtomicBool::new(false);



/// # Main.
///
/// This lets us bubble up startup errors so they can be pretty-printed.
fn main() -> ExitCode {
	match main__() {
		Ok(()) => ExitCode::SUCCESS,
		Err(e @ (RipError::PrintHelp | RipError::PrintVersion)) => {
			println!("{e}");
			ExitCode::SUCCESS
		},
		Err(e) => {
			Msg::from(e).eprint();
			ExitCode::FAILURE
		},
	}
}

#[inline]
/// # Actual Main.
///
/// This does all the stuff.
fn main__() -> Result<(), RipError> {
	let (opts, disc, no_rip, no_summary) = cli::parse()?;

	// Quiet?
	if ! no_summary {
		if let Some(vm) = disc.drive_description() {
			eprintln!(
				"{}\n{vm}\n{}\n",
				&DIVIDER[..vm.len().min(DIVIDER.len())],
				&DIVIDER[..vm.len().min(DIVIDER.len())],
			);
		}

		eprintln!("{disc}");
	}

	// Go ahead and leave if there's no ripping to do.
	if no_rip { return Ok(()); }

	// Set up the progress bar and kill switch.
	let killed = kill_switch();
	let progress = Progless::default();

	rip_summary(&disc, &opts);

	// Rip!
	let verifier = opts.verify()
		.then(|| AccurateRipService::new(Duration::from_secs(u64::from(opts.timeout()))));
	let mut sink = WavSink;
	let report = disc.rip(
		&opts,
		verifier.as_ref().map(|v| v as &dyn Verifier),
		&mut sink,
		Some(&progress),
		killed,
	)?;

	// The log goes to STDOUT so it can be piped somewhere useful, like:
	// surerip > rip.log
	print!("{report}");

	if killed.killed() { Err(RipError::Killed) }
	else { Ok(()) }
}

/// # Kill Switch.
///
/// Hook the shared abort flag up to CTRL-C and return the view the rip
/// run will watch.
fn kill_switch() -> KillSwitch {
	let _res = ctrlc::set_handler(|| KILLED.store(true, Release));
	KillSwitch::from(&KILLED)
}

/// # Rip Summary.
///
/// Note the chosen settings on STDERR before proceeding so surprises can
/// be caught early.
fn rip_summary<D: Drive>(disc: &Disc<D>, opts: &RipOptions) {
	let nice_tracks =
		if opts.has_tracks() {
			opts.tracks()
				.map(|n| n.to_string())
				.collect::<Vec<String>>()
				.oxford_and()
				.into_owned()
		}
		else { "All".to_owned() };
	let nice_verify =
		if opts.verify() { format!("AccurateRip ({}s timeout)", opts.timeout()) }
		else { "Disabled".to_owned() };
	let nice_output =
		if opts.save() {
			format!("./{}/{}_##.wav", OUT_BASE, disc.toc().cddb_id())
		}
		else { "None (checksum only)".to_owned() };

	eprintln!("Tracks:       {nice_tracks}");
	if 0 != opts.offset().samples_abs() {
		eprintln!("Read Offset:  {}", opts.offset().samples());
	}
	eprintln!("Retries:      {}", opts.retries());
	eprintln!("Verification: {nice_verify}");
	eprintln!("Destination:  {nice_output}");
	eprintln!();
}
