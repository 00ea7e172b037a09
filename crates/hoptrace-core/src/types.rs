use derive_more::{Add, AddAssign};

/// `TimeToLive` (ttl) newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd, Hash, Add, AddAssign)]
pub struct TimeToLive(pub u8);

/// `Sequence` number newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct Sequence(pub u16);

/// `TraceId` newtype.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct TraceId(pub u16);

/// `MaxHops` newtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Ord, PartialOrd)]
pub struct MaxHops(pub u8);

/// The hop-limit is reused as the probe sequence number.
impl From<TimeToLive> for Sequence {
    fn from(ttl: TimeToLive) -> Self {
        Self(u16::from(ttl.0))
    }
}

impl From<MaxHops> for TimeToLive {
    fn from(max_hops: MaxHops) -> Self {
        Self(max_hops.0)
    }
}
