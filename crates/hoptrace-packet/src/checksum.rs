//! Checksum implementations for `ICMPv4` probes.
//!
//! The probe checksum sums the packet as little-endian 16-bit words and swaps
//! the bytes of the folded result, which yields the same value as the
//! conventional big-endian Internet checksum (RFC 1071) once the field is
//! written to the wire in network byte order.

/// Calculate the checksum for an `ICMPv4` probe packet.
///
/// The input is summed as little-endian 16-bit words (a trailing odd byte is
/// added as a low byte), folded to 16 bits, complemented and finally byte
/// swapped so the result can be written to the header in network byte order.
///
/// The checksum field of `data` must be zero when computing a checksum for
/// transmission.
#[must_use]
pub fn icmp_probe_checksum(data: &[u8]) -> u16 {
    finalize_checksum(sum_le_words(data)).swap_bytes()
}

/// Calculate the conventional big-endian Internet checksum for an `ICMPv4` packet.
///
/// The checksum field at word 1 is skipped.
#[must_use]
pub fn icmp_ipv4_checksum(data: &[u8]) -> u16 {
    if data.is_empty() {
        return 0;
    }
    finalize_checksum(sum_be_words(data, 1))
}

/// Check the checksum of a packet which already carries its checksum.
///
/// Re-summing a correctly checksummed packet, checksum field included, folds
/// to zero.
#[must_use]
pub fn verify(data: &[u8]) -> bool {
    !data.is_empty() && icmp_probe_checksum(data) == 0
}

fn sum_le_words(data: &[u8]) -> u32 {
    let mut words = data.chunks_exact(2);
    let sum = words.by_ref().fold(0_u32, |sum, word| {
        sum.wrapping_add(u32::from(u16::from_le_bytes([word[0], word[1]])))
    });
    match words.remainder() {
        [last] => sum.wrapping_add(u32::from(*last)),
        _ => sum,
    }
}

fn sum_be_words(data: &[u8], ignore_word: usize) -> u32 {
    let mut words = data.chunks_exact(2);
    let sum = words
        .by_ref()
        .enumerate()
        .filter(|(i, _)| *i != ignore_word)
        .fold(0_u32, |sum, (_, word)| {
            sum.wrapping_add(u32::from(u16::from_be_bytes([word[0], word[1]])))
        });
    match words.remainder() {
        [last] => sum.wrapping_add(u32::from(*last) << 8),
        _ => sum,
    }
}

const fn finalize_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xFFFF);
    }
    !sum as u16
}
