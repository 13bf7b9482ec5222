//! Defines the time at which a candidate certification path is verified

use core::{fmt, time::Duration};

use serde::{
    de::{self, Deserializer, Visitor},
    ser::Serializer,
    Deserialize, Serialize,
};

use crate::PathValidationStatus;

/// Time of interest for the validation of a candidate certification path. A value at the Unix
/// epoch disables validity period checks.
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub struct TimeOfInterest(pub der::DateTime);

impl fmt::Display for TimeOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TimeOfInterest {
    /// Make [`TimeOfInterest`] where checks are disabled
    pub fn disabled() -> Self {
        TimeOfInterest(
            der::DateTime::from_unix_duration(Duration::ZERO)
                // only values before 1970 or after 9999 are rejected
                .expect("Could not create a DateTime from Unix Epoch"),
        )
    }

    /// Should time checks be disabled?
    pub fn is_disabled(&self) -> bool {
        self.0.unix_duration() == Duration::ZERO
    }

    /// Create a [`TimeOfInterest`] from Unix epoch
    pub fn from_unix_secs(v: u64) -> der::Result<Self> {
        Ok(Self(der::DateTime::from_unix_duration(
            Duration::from_secs(v),
        )?))
    }

    /// Return Unix epoch (in seconds) for this value
    pub fn as_unix_secs(&self) -> u64 {
        self.0.unix_duration().as_secs()
    }

    /// Creates a [`TimeOfInterest`] for the current time, falling back to a disabled value if the
    /// system clock cannot be represented.
    pub fn now() -> Self {
        match der::DateTime::from_system_time(std::time::SystemTime::now()) {
            Ok(dt) => Self(dt),
            Err(_) => Self::disabled(),
        }
    }

    /// `check_validity` compares this time of interest with a validity period expressed as seconds
    /// since Unix epoch. Disabled values accept any period.
    pub fn check_validity(
        &self,
        not_before: u64,
        not_after: u64,
    ) -> core::result::Result<(), PathValidationStatus> {
        if self.is_disabled() {
            return Ok(());
        }
        let toi = self.as_unix_secs();
        if toi < not_before {
            return Err(PathValidationStatus::InvalidNotBeforeDate);
        }
        if toi > not_after {
            return Err(PathValidationStatus::InvalidNotAfterDate);
        }
        Ok(())
    }
}

impl Default for TimeOfInterest {
    fn default() -> Self {
        Self::now()
    }
}

impl Serialize for TimeOfInterest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(self.as_unix_secs())
    }
}

impl<'de> Deserialize<'de> for TimeOfInterest {
    fn deserialize<D>(deserializer: D) -> Result<TimeOfInterest, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ToiVisitor;

        impl<'de> Visitor<'de> for ToiVisitor {
            type Value = TimeOfInterest;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("an integer between 0 and 2^64")
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                TimeOfInterest::from_unix_secs(value)
                    .map_err(|_| E::custom(format!("time of interest out of range: {value}")))
            }
        }

        deserializer.deserialize_u64(ToiVisitor)
    }
}

#[test]
fn time_of_interest_validity_test() {
    let toi = TimeOfInterest::from_unix_secs(1_500_000_000).unwrap();
    assert!(!toi.is_disabled());
    assert_eq!(1_500_000_000, toi.as_unix_secs());
    assert_eq!(Ok(()), toi.check_validity(1_400_000_000, 1_600_000_000));
    assert_eq!(
        Err(PathValidationStatus::InvalidNotBeforeDate),
        toi.check_validity(1_500_000_001, 1_600_000_000)
    );
    assert_eq!(
        Err(PathValidationStatus::InvalidNotAfterDate),
        toi.check_validity(1_400_000_000, 1_499_999_999)
    );

    let disabled = TimeOfInterest::disabled();
    assert!(disabled.is_disabled());
    assert_eq!(0, disabled.as_unix_secs());
    assert_eq!(disabled, TimeOfInterest::from_unix_secs(0).unwrap());
    assert_eq!(Ok(()), disabled.check_validity(1, 2));
}

#[test]
fn time_of_interest_serde_test() {
    let toi = TimeOfInterest::from_unix_secs(1_647_258_133).unwrap();
    let json = serde_json::to_string(&toi).unwrap();
    assert_eq!("1647258133", json);
    let toi2: TimeOfInterest = serde_json::from_str(&json).unwrap();
    assert_eq!(toi, toi2);
}
