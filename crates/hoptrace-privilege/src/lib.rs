//! Discover platform privileges.
//!
//! `hoptrace` sends and receives `ICMPv4` packets over raw sockets, which
//! requires elevated privileges on every supported platform.
//!
//! [`Privilege::acquire_privileges`]:
//!
//! - On Linux we check if `CAP_NET_RAW` is in the permitted set and if so raise it to the effective
//!   set
//! - On other Unix platforms this is a no-op
//!
//! [`Privilege::has_privileges`] (obtained via [`Privilege::discover`]):
//!
//! - On Linux we check if `CAP_NET_RAW` is in the effective set
//! - On other Unix platforms we check that the effective user is root
//!
//! # Examples
//!
//! Acquire the required privileges if we can and fail otherwise:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! # use hoptrace_privilege::Privilege;
//! let privilege = Privilege::acquire_privileges()?;
//! match privilege.ensure() {
//!     Ok(()) => println!("raw sockets are available"),
//!     Err(err) => println!("{err}"),
//! }
//! # Ok(())
//! # }
//! ```

/// A privilege error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A privilege error.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[cfg(target_os = "linux")]
    #[error("caps error: {0}")]
    CapsError(#[from] caps::errors::CapsError),
    #[error("privileges are required to open raw ICMP sockets ({0})")]
    InsufficientPrivileges(&'static str),
}

/// Run-time platform privilege information.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Privilege {
    has_privileges: bool,
}

impl Privilege {
    /// Discover information about the platform privileges.
    pub fn discover() -> Result<Self> {
        let has_privileges = Self::check_has_privileges()?;
        Ok(Self { has_privileges })
    }

    /// Create a new Privilege instance.
    #[must_use]
    pub const fn new(has_privileges: bool) -> Self {
        Self { has_privileges }
    }

    /// Are we running with the privileges required for raw sockets?
    #[must_use]
    pub const fn has_privileges(&self) -> bool {
        self.has_privileges
    }

    /// Fail with [`Error::InsufficientPrivileges`] unless raw sockets may be opened.
    pub fn ensure(&self) -> Result<()> {
        if self.has_privileges {
            Ok(())
        } else {
            Err(Error::InsufficientPrivileges(Self::HINT))
        }
    }

    // Linux

    #[cfg(target_os = "linux")]
    const HINT: &'static str = "run as root or grant CAP_NET_RAW";

    #[cfg(target_os = "linux")]
    /// Acquire privileges, if possible.
    ///
    /// Check if `CAP_NET_RAW` is in the permitted set and if so raise it to the effective set.
    pub fn acquire_privileges() -> Result<Self> {
        if caps::has_cap(None, caps::CapSet::Permitted, caps::Capability::CAP_NET_RAW)? {
            caps::raise(None, caps::CapSet::Effective, caps::Capability::CAP_NET_RAW)?;
        }
        Self::discover()
    }

    #[cfg(target_os = "linux")]
    /// Do we have the required privileges?
    ///
    /// Check if `CAP_NET_RAW` is in the effective set.
    fn check_has_privileges() -> Result<bool> {
        Ok(caps::has_cap(
            None,
            caps::CapSet::Effective,
            caps::Capability::CAP_NET_RAW,
        )?)
    }

    // Unix (excl. Linux)

    #[cfg(all(unix, not(target_os = "linux")))]
    const HINT: &'static str = "run as root";

    #[cfg(all(unix, not(target_os = "linux")))]
    /// Acquire privileges, if possible.
    ///
    /// This is a no-op on non-Linux unix systems.
    pub fn acquire_privileges() -> Result<Self> {
        Self::discover()
    }

    #[cfg(all(unix, not(target_os = "linux")))]
    #[expect(clippy::unnecessary_wraps)]
    /// Do we have the required privileges?
    ///
    /// Checks if the effective user is root.
    fn check_has_privileges() -> Result<bool> {
        Ok(nix::unistd::Uid::effective().is_root())
    }
}
