
/// The synthesis pipeline: chip streams are segmented and multiplied by data
/// symbols (`reference`), carried onto a per-signal true-time axis with power
/// and Doppler applied (`modulated`), then aggregated, filtered, and
/// decimated onto the common output grid (`composite`).

pub mod composite;
pub mod modulated;
pub mod reference;
