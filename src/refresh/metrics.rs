// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Events counted over the lifetime of one coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshEvent {
	/// A request claimed the in-flight flag and started a refresh exchange.
	Episode,
	/// The refresh stored a rotated token pair.
	Rotated,
	/// The refresh failed and the credentials were cleared.
	Rejected,
	/// The owning request was dropped before the refresh settled.
	Abandoned,
	/// A request waited on another request's refresh.
	Queued,
	/// A request was re-issued after a successful refresh.
	Replayed,
}
impl RefreshEvent {
	const ALL: [Self; 6] = [
		Self::Episode,
		Self::Rotated,
		Self::Rejected,
		Self::Abandoned,
		Self::Queued,
		Self::Replayed,
	];

	const fn slot(self) -> usize {
		self as usize
	}
}

/// Point-in-time copy of [`RefreshMetrics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefreshStats {
	/// Refresh exchanges started.
	pub episodes: u64,
	/// Episodes that stored a rotated pair.
	pub rotated: u64,
	/// Episodes that cleared credentials.
	pub rejected: u64,
	/// Episodes whose owner went away mid-flight.
	pub abandoned: u64,
	/// Requests that joined an in-flight episode.
	pub queued: u64,
	/// Requests replayed after a rotation.
	pub replayed: u64,
}

/// Lock-free refresh counters, always compiled in.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	counters: [AtomicU64; RefreshEvent::ALL.len()],
}
impl RefreshMetrics {
	/// Current value of one counter.
	pub fn count(&self, event: RefreshEvent) -> u64 {
		self.counters[event.slot()].load(Ordering::Relaxed)
	}

	/// Copies every counter.
	pub fn snapshot(&self) -> RefreshStats {
		RefreshStats {
			episodes: self.count(RefreshEvent::Episode),
			rotated: self.count(RefreshEvent::Rotated),
			rejected: self.count(RefreshEvent::Rejected),
			abandoned: self.count(RefreshEvent::Abandoned),
			queued: self.count(RefreshEvent::Queued),
			replayed: self.count(RefreshEvent::Replayed),
		}
	}

	pub(crate) fn record(&self, event: RefreshEvent) {
		self.counters[event.slot()].fetch_add(1, Ordering::Relaxed);
	}
}
