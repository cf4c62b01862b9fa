/*!
# Surerip: Kill Switch
*/

use std::sync::atomic::{
	AtomicBool,
	Ordering::Acquire,
};



#[derive(Debug, Clone, Copy)]
/// # Kill Switch.
///
/// A read-only view of an abort flag, typically raised by the binary's
/// CTRL-C handler. The rip loop polls it at sector and track boundaries
/// so an abort lands cleanly: finished tracks stay finished, the one in
/// hand gets dropped.
pub struct KillSwitch(&'static AtomicBool);

impl From<&'static AtomicBool> for KillSwitch {
	#[inline]
	fn from(src: &'static AtomicBool) -> Self { Self(src) }
}

impl KillSwitch {
	#[must_use]
	/// # Time to Stop?
	pub fn killed(&self) -> bool { self.0.load(Acquire) }
}



#[cfg(test)]
mod test {
	use super::*;
	use std::sync::atomic::Ordering::Release;

	#[test]
	fn t_kill_switch() {
		static FLAG: AtomicBool = AtomicBool::new(false);

		let switch = KillSwitch::from(&FLAG);
		assert!(! switch.killed());

		// Copies watch the same flag.
		let twin = switch;
		FLAG.store(true, Release);
		assert!(switch.killed());
		assert!(twin.killed());
	}
}
