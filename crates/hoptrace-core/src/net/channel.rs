use crate::error::{Error, IoError, Result};
use crate::net::socket::Socket;
use crate::types::TimeToLive;
use hoptrace_packet::probe::ProbePacket;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::instrument;

/// The send and receive sockets of a single probe attempt.
///
/// A fresh pair is opened for every attempt so that a late reply to an
/// earlier probe can never be read by a later one. Both sockets are closed
/// when the channel is dropped.
pub struct ProbeChannel<S: Socket> {
    ttl: TimeToLive,
    send_socket: S,
    recv_socket: S,
}

impl<S: Socket> ProbeChannel<S> {
    /// Open the socket pair, with the hop-limit of the send socket set to `ttl`.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    #[instrument(level = "trace")]
    pub fn open(ttl: TimeToLive) -> Result<Self> {
        let mut send_socket = S::new_icmp_send_socket_ipv4().map_err(new_socket_error)?;
        send_socket.set_ttl(u32::from(ttl.0))?;
        let mut recv_socket = S::new_icmp_recv_socket_ipv4().map_err(new_socket_error)?;
        recv_socket.bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))?;
        Ok(Self {
            ttl,
            send_socket,
            recv_socket,
        })
    }

    /// Send a probe to `target`.
    #[instrument(skip(self, probe), level = "trace")]
    pub fn send(&mut self, probe: &ProbePacket, target: Ipv4Addr) -> Result<()> {
        let remote_addr = SocketAddr::new(IpAddr::V4(target), 0);
        self.send_socket
            .send_to(probe.as_bytes(), remote_addr)
            .map_err(Error::ProbeFailed)
    }

    /// Wait up to `timeout` for the next packet and read it into `buf`.
    ///
    /// Returns `None` if nothing could be read before the timeout expired. A
    /// wakeup which yields no data re-arms the wait with the time remaining.
    #[instrument(skip(self, buf), level = "trace")]
    pub fn recv(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<(usize, Option<SocketAddr>)>> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if !self.recv_socket.is_readable(remaining)? {
                continue;
            }
            match self.recv_socket.recv_from(buf) {
                Ok(received) => return Ok(Some(received)),
                Err(err)
                    if matches!(
                        err.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                    ) =>
                {
                    tracing::trace!(%err, "spurious wakeup");
                }
                Err(err) => return Err(Error::IoError(err)),
            }
        }
    }
}

impl<S: Socket> Drop for ProbeChannel<S> {
    fn drop(&mut self) {
        tracing::trace!(ttl = self.ttl.0, "closing probe channel");
    }
}

/// Socket creation is refused without raw socket privileges.
fn new_socket_error(err: IoError) -> Error {
    if err.kind() == io::ErrorKind::PermissionDenied {
        Error::PrivilegeError(hoptrace_privilege::Error::InsufficientPrivileges(
            "permission denied opening a raw socket",
        ))
    } else {
        Error::IoError(err)
    }
}
