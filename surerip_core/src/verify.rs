/*!
# Surerip: Verification
*/

use cdtoc::Toc;
use crate::{
	CacheWriter,
	ChecksumRecord,
	out_path,
	out_read,
	RipError,
};
use std::{
	path::Path,
	time::Duration,
};
use ureq::{
	Agent,
	AgentBuilder,
};



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Track Confidence.
///
/// The outcome of a database lookup for one track.
pub enum Confidence {
	#[default]
	/// # No Lookup Happened.
	///
	/// Verification was disabled, the service was unreachable, or the
	/// track (HTOA) has no database presence to begin with.
	Unverified,

	/// # Lookup Happened.
	///
	/// The counts are the number of independent rips sharing our v1/v2
	/// checksums. Zeroes mean the disc is known but our data isn't,
	/// which is worth knowing too.
	Matched {
		/// # V1 Submission Count.
		v1: u8,

		/// # V2 Submission Count.
		v2: u8,
	},
}

impl Confidence {
	#[must_use]
	/// # Lookup Happened?
	pub const fn is_matched(&self) -> bool { matches!(self, Self::Matched { .. }) }

	#[must_use]
	/// # Confirmed By Anyone?
	pub const fn confirmed(&self) -> bool {
		matches!(self, Self::Matched { v1, v2 } if 0 < *v1 || 0 < *v2)
	}
}



/// # A Checksum Verification Service.
///
/// Given a disc identity and the per-track checksum records, report how
/// much independent agreement exists for each track, in record order.
pub trait Verifier {
	/// # Verify.
	///
	/// ## Errors
	///
	/// Implementations should return [`RipError::Verification`] if the
	/// backing service cannot be reached; callers treat that as
	/// all-tracks-unverified, never as a rip failure.
	fn verify(&self, toc: &Toc, checksums: &[ChecksumRecord])
	-> Result<Vec<Confidence>, RipError>;
}



#[derive(Debug)]
/// # AccurateRip.
///
/// Fetches (and locally caches) the published checksum lists for the
/// disc, then counts matches for each track's v1/v2 values.
///
/// AccurateRip only publishes checksums after they have been confirmed,
/// so even a count of one provides reasonable statistical certainty of
/// correctness.
pub struct AccurateRipService {
	/// # Connection Agent.
	agent: Agent,
}

impl AccurateRipService {
	#[must_use]
	/// # New.
	pub fn new(timeout: Duration) -> Self {
		Self {
			agent: AgentBuilder::new()
				.timeout(timeout)
				.user_agent(concat!(
					"Mozilla/5.0 (X11; Linux x86_64; rv:",
					env!("CARGO_PKG_VERSION"),
					") Surerip/",
					env!("CARGO_PKG_VERSION"),
				))
				.max_idle_connections(0)
				.build(),
		}
	}

	/// # Download.
	///
	/// Download and return the data, caching a copy for next time.
	fn download(&self, url: &str, dst: &Path) -> Option<Vec<u8>> {
		use std::io::{
			Read,
			Write,
		};

		// Download the data into a vector.
		let res = self.agent.get(url).call().ok()?;
		let mut out = Vec::new();
		res.into_reader().read_to_end(&mut out).ok()?;

		if out.is_empty() { None }
		else {
			// Cache the contents for next time. A failure here only
			// costs a re-download.
			let _res = CacheWriter::new(dst).ok()
				.and_then(|mut writer| {
					writer.writer().write_all(&out).ok()?;
					writer.finish().ok()
				});

			Some(out)
		}
	}
}

impl Verifier for AccurateRipService {
	fn verify(&self, toc: &Toc, checksums: &[ChecksumRecord])
	-> Result<Vec<Confidence>, RipError> {
		// Fetch/cache/parse the published checksums for this disc.
		let ar = toc.accuraterip_id();
		let rel = format!("{}__chk-ar.bin", ar.cddb_id());
		let raw = out_read(&rel)?
			.or_else(|| {
				let dst = out_path(&rel).ok()?;
				self.download(&ar.checksum_url(), &dst)
			})
			.ok_or(RipError::Verification)?;
		let published = ar.parse_checksums(&raw)
			.map_err(|_| RipError::Verification)?;

		// Match each record against its track's published list.
		Ok(checksums.iter()
			.map(|rec| {
				// Hidden tracks have no database presence.
				if rec.track() == 0 { return Confidence::Unverified; }

				let idx = usize::from(rec.track() - 1);
				published.get(idx).map_or(
					Confidence::Unverified,
					|chk| Confidence::Matched {
						v1: chk.get(&rec.ar_v1()).copied().unwrap_or(0),
						v2: chk.get(&rec.ar_v2()).copied().unwrap_or(0),
					},
				)
			})
			.collect()
		)
	}
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_confidence() {
		assert!(! Confidence::Unverified.is_matched());
		assert!(! Confidence::Unverified.confirmed());

		let none = Confidence::Matched { v1: 0, v2: 0 };
		assert!(none.is_matched());
		assert!(! none.confirmed());

		let some = Confidence::Matched { v1: 0, v2: 3 };
		assert!(some.confirmed());
	}
}
