//! Arena configuration parameters.

/// Configuration for an [`Arena`](crate::Arena).
///
/// Read once at construction; the arena copies what it needs.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Zero-fill the whole block once when the arena is created.
    ///
    /// Default: `true`. Individual allocations are never zeroed; regions
    /// choose per open whether to zero their reservation.
    pub zero_on_create: bool,

    /// Maximum number of simultaneously open scoped regions.
    ///
    /// Default: 64. Opening one more fails with
    /// [`ArenaError::RegionDepthExceeded`](crate::ArenaError::RegionDepthExceeded).
    pub max_open_regions: usize,
}

impl ArenaConfig {
    /// Default for [`zero_on_create`](Self::zero_on_create).
    pub const DEFAULT_ZERO_ON_CREATE: bool = true;

    /// Default for [`max_open_regions`](Self::max_open_regions).
    pub const DEFAULT_MAX_OPEN_REGIONS: usize = 64;

    /// Config that leaves the block contents untouched at creation.
    pub fn uninitialised() -> Self {
        Self {
            zero_on_create: false,
            ..Self::default()
        }
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            zero_on_create: Self::DEFAULT_ZERO_ON_CREATE,
            max_open_regions: Self::DEFAULT_MAX_OPEN_REGIONS,
        }
    }
}
