
/// This module identifies the supported GNSS signals and supplies their
/// spreading codes, either generated from the published shift registers or
/// loaded from opaque code tables.
pub mod codes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalId {
	GpsL1Ca,
	GpsL1CData,
	GpsL1CPilot,
	GpsL5I,
	GpsL5Q,
	GalE1B,
	GalE1C,
	GloL1Ca,
}

impl SignalId {

	pub fn from_names(system:&str, name:&str) -> Result<Self, String> {
		match (system.to_ascii_uppercase().as_str(), name.to_ascii_uppercase().as_str()) {
			("GPS",     "L1CA") => Ok(SignalId::GpsL1Ca),
			("GPS",     "L1CD") => Ok(SignalId::GpsL1CData),
			("GPS",     "L1CP") => Ok(SignalId::GpsL1CPilot),
			("GPS",     "L5I")  => Ok(SignalId::GpsL5I),
			("GPS",     "L5Q")  => Ok(SignalId::GpsL5Q),
			("GALILEO", "E1B")  => Ok(SignalId::GalE1B),
			("GALILEO", "E1C")  => Ok(SignalId::GalE1C),
			("GLONASS", "L1CA") => Ok(SignalId::GloL1Ca),
			_ => Err(format!("unsupported signal: system={:?} name={:?}", system, name)),
		}
	}

	/// Length of the primary spreading code in chips, before any subcarrier
	/// expansion or overlay
	pub fn code_len_chips(&self) -> usize {
		match self {
			SignalId::GpsL1Ca                            => 1023,
			SignalId::GpsL1CData | SignalId::GpsL1CPilot => 10230,
			SignalId::GpsL5I     | SignalId::GpsL5Q      => 10230,
			SignalId::GalE1B     | SignalId::GalE1C      => 4092,
			SignalId::GloL1Ca                            => 511,
		}
	}

	/// Sample rate of the stored code array, after the BOC subcarrier where
	/// the signal carries one
	pub fn code_rate_sps(&self) -> f64 {
		match self {
			SignalId::GpsL1Ca                            => 1.023e6,
			SignalId::GpsL1CData | SignalId::GpsL1CPilot => 2.046e6,
			SignalId::GpsL5I     | SignalId::GpsL5Q      => 10.23e6,
			SignalId::GalE1B     | SignalId::GalE1C      => 2.046e6,
			SignalId::GloL1Ca                            => 0.511e6,
		}
	}

	/// BOC(1,1) signals store two subcarrier samples per chip
	pub fn uses_boc(&self) -> bool {
		matches!(self,
			SignalId::GpsL1CData | SignalId::GpsL1CPilot |
			SignalId::GalE1B     | SignalId::GalE1C)
	}

}

#[cfg(test)]
mod tests {

	use super::SignalId;

	#[test]
	fn name_lookup() {
		assert_eq!(SignalId::from_names("GPS", "L1CA").unwrap(), SignalId::GpsL1Ca);
		assert_eq!(SignalId::from_names("gps", "l5i").unwrap(), SignalId::GpsL5I);
		assert_eq!(SignalId::from_names("Galileo", "E1C").unwrap(), SignalId::GalE1C);
		assert_eq!(SignalId::from_names("GLONASS", "L1CA").unwrap(), SignalId::GloL1Ca);
		assert!(SignalId::from_names("GPS", "L2CM").is_err());
		assert!(SignalId::from_names("BEIDOU", "B1I").is_err());
	}

	#[test]
	fn code_parameters() {
		assert_eq!(SignalId::GpsL1Ca.code_len_chips(), 1023);
		assert_eq!(SignalId::GloL1Ca.code_len_chips(), 511);
		assert!((SignalId::GalE1B.code_rate_sps() - 2.046e6).abs() < 1.0);
		assert!(SignalId::GpsL1CPilot.uses_boc());
		assert!(!SignalId::GpsL5Q.uses_boc());
	}

}
