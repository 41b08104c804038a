/// Track state enumeration for the identity lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Identity assigned this frame
    #[default]
    New,
    /// Matched in the most recent frame
    Tracked,
    /// Missed one or more consecutive frames, still matchable
    Lost,
    /// Retired, never matched again
    Removed,
}
