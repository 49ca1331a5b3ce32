
/// An amount of cycles.
pub type Time = u64;
