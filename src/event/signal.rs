use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Edge-triggered flag raised by the event channel and taken by the frame
/// output path.
///
/// At most one signal is pending: raising an already raised flag coalesces.
/// Clones share the same flag.
///
/// # Examples
///
/// ```
/// use scopeview::event::EventSignal;
///
/// let signal = EventSignal::new();
/// signal.raise();
/// signal.raise();
/// assert!(signal.take());
/// assert!(!signal.take());
/// ```
#[derive(Clone, Debug, Default)]
pub struct EventSignal(Arc<AtomicBool>);

impl EventSignal {
    /// Create a lowered signal.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Raise the signal.
    pub fn raise(&self) { self.0.store(true, Ordering::Release); }

    /// Lower the signal, returning whether it was raised.
    pub fn take(&self) -> bool { self.0.swap(false, Ordering::AcqRel) }

    /// Whether the signal is raised, without consuming it.
    #[must_use]
    pub fn is_raised(&self) -> bool { self.0.load(Ordering::Acquire) }
}
