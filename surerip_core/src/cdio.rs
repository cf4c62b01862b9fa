/*!
# Surerip: `libcdio` Drive
*/

use crate::{
	CD_LEADIN,
	drive::{
		buf_sectors,
		Drive,
		RawToc,
		RawTocEntry,
	},
	BYTES_PER_SECTOR,
	RipError,
};
use libcdio_sys::{
	cdio_hwinfo,
	cdio_track_enums_CDIO_CDROM_LEADOUT_TRACK,
	discmode_t_CDIO_DISC_MODE_CD_DA,
	discmode_t_CDIO_DISC_MODE_CD_MIXED,
	driver_id_t_DRIVER_DEVICE, // The equivalent of "use whatever's best".
	driver_return_code_t_DRIVER_OP_NOT_PERMITTED,
	driver_return_code_t_DRIVER_OP_SUCCESS,
	track_flag_t_CDIO_TRACK_FLAG_TRUE,
	track_format_t_TRACK_FORMAT_AUDIO,
	track_format_t_TRACK_FORMAT_ERROR,
	track_format_t_TRACK_FORMAT_PSX,
};
use std::{
	ffi::{
		CStr,
		CString,
	},
	os::unix::ffi::OsStrExt,
	path::Path,
	sync::Once,
};



static LIBCDIO_INIT: Once = Once::new();



#[derive(Debug)]
#[allow(dead_code)] // We just want to make sure dev lives as long as the ptr.
/// # A Real Optical Drive.
///
/// The production [`Drive`] implementation, wrapping a `libcdio` handle.
pub struct LibcdioDrive {
	/// # Device Path (if explicit).
	dev: Option<CString>,

	/// # CDIO Handle.
	ptr: *mut libcdio_sys::CdIo_t,

	/// # Last Readable LSN (exclusive).
	max_lsn: i32,
}

impl Drop for LibcdioDrive {
	#[allow(unsafe_code)]
	fn drop(&mut self) {
		// Release the C memory!
		if ! self.ptr.is_null() {
			unsafe { libcdio_sys::cdio_destroy(self.as_mut_ptr()); }
		}
	}
}

impl LibcdioDrive {
	#[allow(unsafe_code)]
	/// # New!
	///
	/// Initialize a new instance, optionally connecting to a specific
	/// device.
	///
	/// ## Errors
	///
	/// This will return an error if initialization fails, the provided
	/// device path is obviously wrong, or the loaded disc isn't audio.
	pub fn new<P>(dev: Option<P>) -> Result<Self, RipError>
	where P: AsRef<Path> {
		// Make sure the library has been initialized.
		init();

		// Take a look at the desired device.
		let dev = {
			if let Some(dev) = dev {
				let dev = dev.as_ref();
				let original: String = dev.to_string_lossy().into_owned();
				if ! dev.exists() {
					return Err(RipError::Device(original));
				}
				let dev = CString::new(dev.as_os_str().as_bytes())
					.map_err(|_| RipError::Device(original))?;
				Some(dev)
			}
			else { None }
		};

		// Connect to it.
		let ptr = unsafe {
			libcdio_sys::cdio_open(
				dev.as_ref().map_or_else(std::ptr::null, |v| v.as_ptr()),
				driver_id_t_DRIVER_DEVICE,
			)
		};

		// NULL is bad.
		if ptr.is_null() {
			Err(RipError::DeviceOpen(dev.map(|v| v.to_string_lossy().into_owned())))
		}
		// Otherwise maybe!
		else {
			let mut out = Self {
				dev,
				ptr,
				max_lsn: 0,
			};

			out.check_disc_mode()?;
			out.max_lsn = out.leadout_lba()?
				.checked_sub(u32::from(CD_LEADIN))
				.and_then(|n| i32::try_from(n).ok())
				.ok_or(RipError::Leadout)?;

			Ok(out)
		}
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // These aren't our globals.
	/// # Check Disc Mode.
	///
	/// This makes sure an audio CD is actually present in the drive.
	///
	/// ## Errors
	///
	/// Returns an error if the disc is missing or unsupported.
	fn check_disc_mode(&self) -> Result<(), RipError> {
		let discmode = unsafe {
			libcdio_sys::cdio_get_discmode(self.as_mut_ptr())
		};
		if matches!(
			discmode,
			discmode_t_CDIO_DISC_MODE_CD_DA | discmode_t_CDIO_DISC_MODE_CD_MIXED
		) {
			Ok(())
		}
		else { Err(RipError::DiscLayout("no audio session")) }
	}
}

impl LibcdioDrive {
	/// # As Ptr.
	const fn as_ptr(&self) -> *const libcdio_sys::CdIo_t { self.ptr.cast() }

	/// # As Mut Ptr.
	const fn as_mut_ptr(&self) -> *mut libcdio_sys::CdIo_t { self.ptr }
}

impl LibcdioDrive {
	#[allow(unsafe_code)]
	/// # First Track Number.
	fn first_track_num(&self) -> Result<u8, RipError> {
		let raw = unsafe {
			libcdio_sys::cdio_get_first_track_num(self.as_ptr())
		};

		if raw == 0 { Err(RipError::FirstTrackNum) }
		else { Ok(raw) }
	}

	/// # Leadout.
	fn leadout_lba(&self) -> Result<u32, RipError> {
		let idx = u8::try_from(cdio_track_enums_CDIO_CDROM_LEADOUT_TRACK)
			.unwrap_or(170);
		self.track_lba_start(idx)
	}

	#[allow(unsafe_code)]
	/// # Get the Number of Tracks.
	fn num_tracks(&self) -> Result<u8, RipError> {
		let raw = unsafe {
			libcdio_sys::cdio_get_num_tracks(self.as_ptr())
		};

		if raw == 0 { Err(RipError::NumTracks) }
		else { Ok(raw) }
	}

	#[allow(unsafe_code)]
	/// # Session Count (of a sort).
	///
	/// `libcdio` doesn't enumerate sessions directly, but it can tell us
	/// where the last one starts; anything other than zero means there's
	/// more than one.
	fn sessions(&self) -> u8 {
		let mut lsn: i32 = 0;
		let res = unsafe {
			libcdio_sys::cdio_get_last_session(self.as_mut_ptr(), &mut lsn)
		};
		if res == driver_return_code_t_DRIVER_OP_SUCCESS && 0 < lsn { 2 }
		else { 1 }
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // Not our globals.
	/// # Track Format.
	///
	/// Returns `true` for audio, `false` for data, and an error for
	/// anything else.
	fn track_format(&self, idx: u8) -> Result<bool, RipError> {
		let kind = unsafe {
			libcdio_sys::cdio_get_track_format(self.as_ptr(), idx)
		};

		match kind {
			track_format_t_TRACK_FORMAT_AUDIO => Ok(true),
			track_format_t_TRACK_FORMAT_PSX |
			track_format_t_TRACK_FORMAT_ERROR => Err(RipError::TrackFormat(idx)),
			_ => Ok(false),
		}
	}

	#[allow(unsafe_code)]
	/// # Track LBA Start.
	fn track_lba_start(&self, idx: u8) -> Result<u32, RipError> {
		if idx == 0 { Err(RipError::TrackNumber(0)) }
		else {
			let raw = unsafe {
				libcdio_sys::cdio_get_track_lsn(self.as_ptr(), idx)
			};
			if raw < 0 { Err(RipError::TrackLba(idx)) }
			else { Ok(raw.abs_diff(0) + u32::from(CD_LEADIN)) }
		}
	}

	#[allow(unsafe_code)]
	/// # Track Pre-emphasis?
	fn track_preemphasis(&self, idx: u8) -> bool {
		let flag = unsafe {
			libcdio_sys::cdio_get_track_preemphasis(self.as_ptr(), idx)
		};
		flag == track_flag_t_CDIO_TRACK_FLAG_TRUE
	}
}

impl Drive for LibcdioDrive {
	fn raw_toc(&self) -> Result<RawToc, RipError> {
		// The inclusive range to search.
		let first = self.first_track_num()?;
		let to = self.num_tracks()?;
		if to < first { return Err(RipError::NumTracks); }

		// Grab the position and type for each track. Pregaps aren't
		// knowable without subchannel digging, so they come through as
		// zero; the layout treats the lead-in gap separately anyway.
		let mut entries = Vec::with_capacity(usize::from(to - first) + 1);
		for idx in first..=to {
			let start = self.track_lba_start(idx)?;
			let audio = self.track_format(idx)?;
			entries.push(RawTocEntry {
				number: idx,
				start,
				pregap: 0,
				audio,
				preemphasis: audio && self.track_preemphasis(idx),
			});
		}

		Ok(RawToc {
			first,
			entries,
			leadout: self.leadout_lba()?,
			sessions: self.sessions(),
		})
	}

	#[allow(unsafe_code)]
	#[allow(non_upper_case_globals)] // Not our globals.
	fn read_sectors(&self, lba: i32, buf: &mut [u8]) -> Result<(), RipError> {
		let sectors = buf_sectors(buf)
			.and_then(|n| i32::try_from(n).ok())
			.ok_or(RipError::Bug("Unaligned read buffer."))?;

		// Reset the buffer before beginning.
		for v in &mut *buf { *v = 0; }

		// Clamp the request to the disc's readable range; anything
		// outside it stays zeroed.
		let first = lba - i32::from(CD_LEADIN);
		let read_first = first.max(0);
		let read_end = (first + sectors).min(self.max_lsn);
		if read_end <= read_first { return Ok(()); }

		let skip = usize::try_from(read_first - first)
			.map_err(|_| RipError::RipOverflow)? * usize::from(BYTES_PER_SECTOR);
		let blocks = u32::try_from(read_end - read_first)
			.map_err(|_| RipError::RipOverflow)?;
		let len = blocks as usize * usize::from(BYTES_PER_SECTOR);

		let res = unsafe {
			libcdio_sys::mmc_read_cd(
				self.as_ptr(),
				buf[skip..skip + len].as_mut_ptr().cast(),
				read_first,
				1,      // Sector type: CDDA.
				0,      // No random data manipulation thank you kindly.
				0,      // No header syncing.
				0,      // No headers.
				1,      // YES audio block!
				0,      // No EDC.
				0,      // No C2 error pointers.
				0,      // No subchannel.
				BYTES_PER_SECTOR,
				blocks,
			)
		};
		match res {
			driver_return_code_t_DRIVER_OP_NOT_PERMITTED => Err(RipError::CdReadUnsupported),
			driver_return_code_t_DRIVER_OP_SUCCESS => Ok(()),
			_ => Err(RipError::CdRead(lba)),
		}
	}

	#[allow(unsafe_code)]
	#[allow(clippy::cast_sign_loss)]
	/// # Drive Vendor/Model.
	fn description(&self) -> Option<String> {
		let mut raw = cdio_hwinfo {
			psz_vendor: [0; 9],
			psz_model: [0; 17],
			psz_revision: [0; 5],
		};

		// The return code is a bool, true for good, instead of the usual
		// 0 for good.
		if 1 == unsafe { libcdio_sys::cdio_get_hwinfo(self.as_ptr(), &mut raw) } {
			// Rather than deal with the uncertainty of pointers, let's
			// recast the signs since we have everything right here.
			let vendor_u8 = raw.psz_vendor.map(|b| b as u8);
			let model_u8 = raw.psz_model.map(|b| b as u8);

			// Vendor might be empty.
			let vendor =
				if vendor_u8[0] == 0 { "" }
				else {
					CStr::from_bytes_until_nul(vendor_u8.as_slice())
					.ok()
					.and_then(|v| v.to_str().ok())?
				};

			// But model is required.
			let model =
				if model_u8[0] == 0 { None }
				else {
					CStr::from_bytes_until_nul(model_u8.as_slice())
					.ok()
					.and_then(|v| v.to_str().ok())
				}?;

			let out = format!("{} {}", vendor.trim(), model.trim());
			let out = out.trim().to_owned();
			if out.is_empty() { None } else { Some(out) }
		}
		else { None }
	}
}



#[allow(unsafe_code)]
/// # Initialize `libcdio`.
fn init() {
	LIBCDIO_INIT.call_once(|| unsafe { libcdio_sys::cdio_init(); });
}
