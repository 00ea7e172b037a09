/// Platform specific network code.
mod platform;

/// A network socket.
pub mod socket;

/// The send and receive socket pair of a single probe attempt.
pub mod channel;

/// The platform specific socket type.
pub use platform::SocketImpl;
