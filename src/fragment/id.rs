use derive_more::{Display, From, Into};

/// Device-assigned frame identifier carried in byte 3 of every fragment.
///
/// The identifier wraps quickly and is not globally unique; the re-assembler
/// only records it for diagnostics.
///
/// # Examples
///
/// ```
/// use scopeview::fragment::FrameId;
/// let id = FrameId::new(42);
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct FrameId(u8);

impl FrameId {
    /// Create a new identifier.
    #[must_use]
    pub const fn new(value: u8) -> Self { Self(value) }

    /// Return the inner numeric identifier.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }
}
