//! Wire model: the JSON request, response and error report.
//!
//! # Examples
//!
//! ```
//! use planar_truss::TrussRequest;
//!
//! let request = TrussRequest::from_json(
//!     r#"{
//!         "dimensions": {"a": 4, "b": 4, "c": 2, "d": 2, "h": 3},
//!         "loads": {"p1": 10, "p2": 0, "p3": 5},
//!         "properties": {"area": 0.01, "elasticity": 200e9}
//!     }"#,
//! )
//! .unwrap();
//! assert_eq!(request.dimensions["h"], 3.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::recovery::MemberForce;

/// Input model: named dimensions, named loads and default material properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrussRequest {
    /// Named geometric offsets used by the layout's coordinate expressions.
    pub dimensions: BTreeMap<String, f64>,
    /// Named applied force magnitudes bound to joints by the layout.
    pub loads: BTreeMap<String, f64>,
    /// Material properties for members that do not override them.
    pub properties: MaterialProperties,
}

/// Cross-sectional area and elastic modulus.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
    /// Cross-sectional area.
    pub area: f64,
    /// Elastic (Young's) modulus.
    pub elasticity: f64,
}

impl TrussRequest {
    /// Parse a request from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] when the payload is not valid JSON or a
    /// field is missing or not numeric.
    pub fn from_json(payload: &str) -> Result<Self, AnalysisError> {
        serde_json::from_str(payload)
            .map_err(|error| AnalysisError::invalid_input("request", error.to_string()))
    }

    /// Look up a dimension, rejecting missing or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] naming `dimensions.<name>`.
    pub fn dimension(&self, name: &str) -> Result<f64, AnalysisError> {
        finite_entry(&self.dimensions, "dimensions", name)
    }

    /// Look up a load magnitude, rejecting missing or non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] naming `loads.<name>`.
    pub fn load(&self, name: &str) -> Result<f64, AnalysisError> {
        finite_entry(&self.loads, "loads", name)
    }
}

/// Fetch `group.name` from `values` if present and finite.
fn finite_entry(
    values: &BTreeMap<String, f64>,
    group: &str,
    name: &str,
) -> Result<f64, AnalysisError> {
    let field = || format!("{group}.{name}");
    let value = *values
        .get(name)
        .ok_or_else(|| AnalysisError::invalid_input(field(), "value is required"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::invalid_input(field(), "value must be finite"))
    }
}

/// Support reaction of one joint, rounded for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component.
    pub y: f64,
}

/// Result of a successful computation.
///
/// Both maps serialize as JSON objects whose keys keep layout order. Values are
/// JSON numbers already rounded to the layout's `decimals` (3 by default), not
/// fixed-width strings, so `10.000` is written as `10.0` and zero as `0.0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrussResponse {
    /// Reaction per supported joint.
    #[serde(with = "ordered_map")]
    pub reactions: Vec<(String, Reaction)>,
    /// Force per member.
    #[serde(with = "ordered_map")]
    pub forces: Vec<(String, MemberForce)>,
}

impl TrussResponse {
    /// Reaction reported for joint `id`.
    #[must_use]
    pub fn reaction(&self, id: &str) -> Option<&Reaction> {
        lookup(&self.reactions, id)
    }

    /// Force reported for member `id`.
    #[must_use]
    pub fn force(&self, id: &str) -> Option<&MemberForce> {
        lookup(&self.forces, id)
    }
}

/// Find the value stored under `id`.
fn lookup<'a, T>(entries: &'a [(String, T)], id: &str) -> Option<&'a T> {
    entries
        .iter()
        .find(|(key, _)| key == id)
        .map(|(_, value)| value)
}

/// Distinguishable failure result handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// `InvalidInput`, `DegenerateGeometry` or `UnstableStructure`.
    pub kind: String,
    /// Human readable description.
    pub message: String,
    /// Offending field or member, when known.
    pub entity: Option<String>,
}

impl From<&AnalysisError> for ErrorReport {
    fn from(error: &AnalysisError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
            entity: error.entity().map(str::to_string),
        }
    }
}

/// (De)serialize `Vec<(String, T)>` as a JSON object without reordering keys.
mod ordered_map {
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{MapAccess, Visitor};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Write the entries as a map in their stored order.
    pub fn serialize<S, T>(entries: &[(String, T)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        serializer.collect_map(entries.iter().map(|(key, value)| (key, value)))
    }

    /// Read a map into entries, keeping document order.
    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        /// Collects map entries in the order they are read.
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Vec<(String, T)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map keyed by identifier")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recovery::Condition;

    const PAYLOAD: &str = r#"{
        "dimensions": {"a": 4.0, "b": 4.0, "c": 2.0, "d": 2.0, "h": 3.0},
        "loads": {"p1": 10.0, "p2": 0.0, "p3": 5.0},
        "properties": {"area": 1.0, "elasticity": 1.0}
    }"#;

    #[test]
    fn parses_wire_request() {
        let request = TrussRequest::from_json(PAYLOAD).expect("valid payload");
        assert_eq!(request.dimension("a"), Ok(4.0));
        assert_eq!(request.load("p3"), Ok(5.0));
        assert_eq!(request.properties.elasticity, 1.0);
    }

    #[test]
    fn malformed_requests_are_invalid_input() {
        let missing = TrussRequest::from_json(r#"{"dimensions": {}, "loads": {}}"#)
            .expect_err("properties are required");
        assert_eq!(missing.kind(), "InvalidInput");

        let non_numeric = TrussRequest::from_json(
            r#"{"dimensions": {"a": "four"}, "loads": {}, "properties": {"area": 1, "elasticity": 1}}"#,
        )
        .expect_err("dimension must be numeric");
        assert_eq!(non_numeric.kind(), "InvalidInput");
    }

    #[test]
    fn missing_entries_name_the_field() {
        let request = TrussRequest::from_json(PAYLOAD).expect("valid payload");
        assert_eq!(
            request.dimension("z"),
            Err(AnalysisError::invalid_input("dimensions.z", "value is required"))
        );
    }

    #[test]
    fn response_keeps_layout_order() {
        let response = TrussResponse {
            reactions: vec![
                ("3".to_string(), Reaction { x: 0.0, y: 7.5 }),
                ("1".to_string(), Reaction { x: -2.0, y: 7.5 }),
            ],
            forces: vec![(
                "10".to_string(),
                MemberForce {
                    value: 12.25,
                    condition: Condition::Tension,
                },
            )],
        };
        let json = serde_json::to_string(&response).expect("serializable");
        assert_eq!(
            json,
            r#"{"reactions":{"3":{"x":0.0,"y":7.5},"1":{"x":-2.0,"y":7.5}},"forces":{"10":{"value":12.25,"condition":"T"}}}"#
        );

        let parsed: TrussResponse = serde_json::from_str(&json).expect("round trip");
        assert_eq!(parsed, response);
        assert_eq!(parsed.reaction("1"), Some(&Reaction { x: -2.0, y: 7.5 }));
        assert_eq!(parsed.force("7"), None);
    }

    #[test]
    fn error_report_carries_kind_and_entity() {
        let error = AnalysisError::DegenerateGeometry {
            member: "4".to_string(),
            length: 0.0,
        };
        let report = ErrorReport::from(&error);
        assert_eq!(report.kind, "DegenerateGeometry");
        assert_eq!(report.entity.as_deref(), Some("4"));
        assert!(report.message.contains("member 4"));
    }
}
