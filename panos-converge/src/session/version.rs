use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

/// Device software version, `major.minor.patch`.
///
/// Build suffixes such as `-h3` are ignored when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SoftwareVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl SoftwareVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Display for SoftwareVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SoftwareVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let core = s.trim().split(['-', ' ']).next().unwrap_or_default();
        let mut parts = core.split('.');
        let mut next = |required: bool| -> Result<u32, String> {
            match parts.next() {
                Some(part) => part
                    .parse::<u32>()
                    .map_err(|_| format!("invalid version component {part:?} in {s:?}")),
                None if required => Err(format!("invalid version {s:?}")),
                None => Ok(0),
            }
        };
        let major = next(true)?;
        let minor = next(true)?;
        let patch = next(false)?;
        Ok(Self::new(major, minor, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::SoftwareVersion;

    #[test]
    fn parses_release_strings() {
        assert_eq!("10.1.0".parse(), Ok(SoftwareVersion::new(10, 1, 0)));
        assert_eq!("9.1.3-h3".parse(), Ok(SoftwareVersion::new(9, 1, 3)));
        assert_eq!("8.1".parse(), Ok(SoftwareVersion::new(8, 1, 0)));
        assert!("ten".parse::<SoftwareVersion>().is_err());
    }

    #[test]
    fn orders_numerically() {
        assert!(SoftwareVersion::new(10, 0, 0) > SoftwareVersion::new(9, 1, 12));
        assert!(SoftwareVersion::new(8, 1, 0) < SoftwareVersion::new(9, 0, 0));
    }
}
