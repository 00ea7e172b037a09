/// The maximum time-to-live value allowed.
pub const MAX_TTL: u8 = 254;

/// The number of probes sent for every hop.
pub const PROBES_PER_HOP: usize = 3;

/// The size of the buffer used to receive replies.
pub const MAX_PACKET_SIZE: usize = 1024;

/// The size of the IPv4 header which precedes every received `ICMP` reply.
///
/// This assumes the header carries no options.
pub const IPV4_HEADER_SIZE: usize = 20;
