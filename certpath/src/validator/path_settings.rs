//! Structures and functions related to configuring certification path building operations

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::{vec, vec::Vec};
use core::time::Duration;
use std::path::Path;

use serde::{Deserialize, Serialize};

use const_oid::db::rfc5280::ANY_POLICY;

use pkiprocmacros::*;

use crate::{Error, Result, TimeOfInterest};

//-----------------------------------------------------------------------------------------------
// Type definitions used in the definition of path settings
//-----------------------------------------------------------------------------------------------
/// `Strings` is a typedef for a vector of String values.
pub type Strings = Vec<String>;

/// `CertificationPathSettings` is a typedef for a `BTreeMap` that maps arbitrary string values to a
/// variant map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationPathSettings(pub BTreeMap<String, CertificationPathProcessingTypes>);

impl CertificationPathSettings {
    /// Creates a new empty [`CertificationPathSettings`]
    pub fn new() -> Self {
        Self::default()
    }
}

/// `CertificationPathProcessingTypes` is used to define a variant map with types associated with
/// performing certification path building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificationPathProcessingTypes {
    /// Represents bool values
    Bool(bool),
    /// Represents u32 values
    U32(u32),
    /// Represents u64 values
    U64(u64),
    /// Represents vectors of Strings
    Strings(Strings),
    /// Represents duration or a timeout
    Duration(Duration),
}

/// [`PolicyConstraints`] carries the RFC 5280 section 6.1.1 inputs that are passed through to a
/// [`ChainValidator`](crate::ChainValidator). The path builder does not interpret them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PolicyConstraints {
    /// initial-explicit-policy
    pub initial_explicit_policy: bool,
    /// initial-policy-mapping-inhibit
    pub initial_policy_mapping_inhibit: bool,
    /// initial-any-policy-inhibit
    pub initial_inhibit_any_policy: bool,
    /// user-initial-policy-set, as dotted decimal object identifier strings
    pub initial_policy_set: Strings,
}

impl Default for PolicyConstraints {
    fn default() -> Self {
        PolicyConstraints {
            initial_explicit_policy: false,
            initial_policy_mapping_inhibit: false,
            initial_inhibit_any_policy: false,
            initial_policy_set: vec![ANY_POLICY.to_string()],
        }
    }
}

//-----------------------------------------------------------------------------------------------
// Types of path settings
//-----------------------------------------------------------------------------------------------
/// `PS_INITIAL_EXPLICIT_POLICY_INDICATOR` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-explicit-policy value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// this setting is set to false.
pub static PS_INITIAL_EXPLICIT_POLICY_INDICATOR: &str = "psInitialExplicitPolicyIndicator";

/// `PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-policy-mapping-inhibit value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// this setting is set to false.
pub static PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR: &str =
    "psInitialPolicyMappingInhibitIndicator";

/// `PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-any-policy-inhibit value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// this setting is set to false.
pub static PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR: &str = "psInitialInhibitAnyPolicyIndicator";

/// `PS_INITIAL_POLICY_SET` is used to retrieve a list of object identifier strings from a [`CertificationPathSettings`]
/// object. This corresponds to the user-initial-policy-set value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// a set containing anyPolicy is used.
pub static PS_INITIAL_POLICY_SET: &str = "psInitialPolicySet";

/// `PS_TIME_OF_INTEREST` is used to retrieve the time at which candidate paths are verified. The
/// value is expressed as a u64 containing seconds since Unix epoch (i.e., 1970-01-01T00:00:00Z).
/// Zero disables validity period checks. By default, the current time is used.
pub static PS_TIME_OF_INTEREST: &str = "psTimeOfInterest";

/// `PS_ITERATION_LIMIT` is used to retrieve the maximum number of node expansions performed by the
/// path builder. Zero (the default) means unlimited.
pub static PS_ITERATION_LIMIT: &str = "psIterationLimit";

/// `PS_EXPLORE_ALL_PATHS` is used to retrieve a boolean that indicates whether the path builder
/// should continue after finding a valid path. By default, this setting is set to false.
pub static PS_EXPLORE_ALL_PATHS: &str = "psExploreAllPaths";

/// `PS_BUILD_TIMEOUT` is used to retrieve the wall clock budget for a path building operation. The
/// deadline is computed when the builder is created. By default, no deadline applies.
pub static PS_BUILD_TIMEOUT: &str = "psBuildTimeout";

/// `PS_IGNORE_EXPIRED` is used to retrieve a boolean that indicates whether expired (or not yet
/// valid) certificates are tolerated by [`BasicChainValidator`](crate::BasicChainValidator). By
/// default, this setting is set to false.
pub static PS_IGNORE_EXPIRED: &str = "psIgnoreExpired";

//-----------------------------------------------------------------------------------------------
// Getters/setters for settings
//-----------------------------------------------------------------------------------------------
cps_gets_and_sets_with_default!(PS_INITIAL_EXPLICIT_POLICY_INDICATOR, bool, false);
cps_gets_and_sets_with_default!(PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR, bool, false);
cps_gets_and_sets_with_default!(PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR, bool, false);
cps_gets_and_sets_with_default!(PS_INITIAL_POLICY_SET, Strings, {
    vec![ANY_POLICY.to_string()]
});
cps_gets_and_sets_with_default!(PS_TIME_OF_INTEREST, u64, {
    TimeOfInterest::now().as_unix_secs()
});
cps_gets_and_sets_with_default!(PS_ITERATION_LIMIT, u32, 0);
cps_gets_and_sets_with_default!(PS_EXPLORE_ALL_PATHS, bool, false);
cps_gets_and_sets!(PS_BUILD_TIMEOUT, Duration);
cps_gets_and_sets_with_default!(PS_IGNORE_EXPIRED, bool, false);

impl CertificationPathSettings {
    /// `get_policy_constraints` gathers the initial policy inputs into a [`PolicyConstraints`].
    pub fn get_policy_constraints(&self) -> PolicyConstraints {
        PolicyConstraints {
            initial_explicit_policy: self.get_initial_explicit_policy_indicator(),
            initial_policy_mapping_inhibit: self.get_initial_policy_mapping_inhibit_indicator(),
            initial_inhibit_any_policy: self.get_initial_inhibit_any_policy_indicator(),
            initial_policy_set: self.get_initial_policy_set(),
        }
    }

    /// `get_time_of_interest_value` returns the configured time of interest as a [`TimeOfInterest`].
    pub fn get_time_of_interest_value(&self) -> Result<TimeOfInterest> {
        Ok(TimeOfInterest::from_unix_secs(self.get_time_of_interest())?)
    }
}

/// `read_settings` attempts to deserialize a JSON file containing a [`CertificationPathSettings`]
/// instance. A missing file name or a file that does not exist yields default settings. A file
/// that cannot be parsed yields [`Error::ParseError`].
pub fn read_settings(fname: &Option<String>) -> Result<CertificationPathSettings> {
    if let Some(fname) = fname {
        let p = Path::new(fname.as_str());
        if Path::exists(p) {
            let json = std::fs::read(p)?;
            return match serde_json::from_slice::<CertificationPathSettings>(&json) {
                Ok(cps) => Ok(cps),
                Err(_e) => Err(Error::ParseError),
            };
        }
    }
    Ok(CertificationPathSettings::new())
}

#[test]
fn test_default_gets_cps() {
    let cps = CertificationPathSettings::default();

    assert!(!cps.get_initial_explicit_policy_indicator());
    assert!(!cps.get_initial_policy_mapping_inhibit_indicator());
    assert!(!cps.get_initial_inhibit_any_policy_indicator());
    assert_eq!(vec![ANY_POLICY.to_string()], cps.get_initial_policy_set());
    assert_eq!(0, cps.get_iteration_limit());
    assert!(!cps.get_explore_all_paths());
    assert!(cps.get_build_timeout().is_none());
    assert!(!cps.get_ignore_expired());
    assert!(cps.get_time_of_interest() > 0);
    assert_eq!(PolicyConstraints::default(), cps.get_policy_constraints());
}

#[test]
fn test_set_gets_cps() {
    let mut cps = CertificationPathSettings::default();
    cps.set_iteration_limit(20);
    cps.set_explore_all_paths(true);
    cps.set_build_timeout(Duration::from_millis(1500));
    cps.set_time_of_interest(0);
    cps.set_initial_explicit_policy_indicator(true);
    cps.set_initial_policy_set(vec!["2.16.840.1.101.3.2.1.48.1".to_string()]);

    assert_eq!(20, cps.get_iteration_limit());
    assert!(cps.get_explore_all_paths());
    assert_eq!(Some(Duration::from_millis(1500)), cps.get_build_timeout());
    assert!(cps.get_time_of_interest_value().unwrap().is_disabled());

    let pc = cps.get_policy_constraints();
    assert!(pc.initial_explicit_policy);
    assert!(!pc.initial_policy_mapping_inhibit);
    assert_eq!(vec!["2.16.840.1.101.3.2.1.48.1".to_string()], pc.initial_policy_set);

    // a value of the wrong type is treated as absent
    cps.0.insert(
        PS_ITERATION_LIMIT.to_string(),
        CertificationPathProcessingTypes::Bool(true),
    );
    assert_eq!(0, cps.get_iteration_limit());
}
