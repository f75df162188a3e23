//! IO
//!
//! Versioned JSON serialization of a [`DecisionTreePath`].
//!
//! A serialized path is an object holding a `version` tag followed by the
//! edge table and the split rule coordinates. Reading dispatches on the tag,
//! unknown versions are rejected and never migrated.
use crate::coordinate::CoordinateList;
use crate::errors::PathError;
use crate::path::DecisionTreePath;
use log::{debug, warn};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Version written by this crate.
pub const CURRENT_VERSION: i64 = 1;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathRecordRef<'a> {
    version: i64,
    edge_to_interior_node: &'a [usize],
    split_rule_coordinates: &'a CoordinateList,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathRecordV1 {
    edge_to_interior_node: Vec<usize>,
    split_rule_coordinates: CoordinateList,
}

impl DecisionTreePath {
    /// Decode a path from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, PathError> {
        let version = match value.get("version") {
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.clone(),
            _ => {
                return Err(PathError::UnableToRead(String::from(
                    "missing or non-integer version tag",
                )))
            }
        };
        match version.as_i64() {
            Some(1) => {
                let record: PathRecordV1 =
                    serde_json::from_value(value).map_err(|e| PathError::UnableToRead(e.to_string()))?;
                Ok(DecisionTreePath::new(
                    record.edge_to_interior_node,
                    record.split_rule_coordinates,
                ))
            }
            _ => {
                warn!("Unable to read decision tree path with version {}.", version);
                Err(PathError::UnsupportedVersion(version.to_string()))
            }
        }
    }
}

impl Serialize for DecisionTreePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PathRecordRef {
            version: CURRENT_VERSION,
            edge_to_interior_node: &self.edge_to_interior_node,
            split_rule_coordinates: &self.split_rule_coordinates,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DecisionTreePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DecisionTreePath::from_value(value).map_err(de::Error::custom)
    }
}

/// IO
pub trait PathIO: Serialize + Sized {
    /// Save a path as a json object to a file.
    ///
    /// * `path` - Path to save to.
    fn save_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PathError> {
        fs::write(path, self.json_dump()?).map_err(|e| PathError::UnableToWrite(e.to_string()))
    }

    /// Dump as a json object.
    fn json_dump(&self) -> Result<String, PathError> {
        serde_json::to_string(self).map_err(|e| PathError::UnableToWrite(e.to_string()))
    }

    /// Load from a json string.
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, PathError>;

    /// Load from a path to a json object.
    ///
    /// * `path` - Path to load from.
    fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, PathError> {
        let json_str = fs::read_to_string(path).map_err(|e| PathError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl PathIO for DecisionTreePath {
    fn from_json(json_str: &str) -> Result<Self, PathError> {
        let value: Value = serde_json::from_str(json_str).map_err(|e| PathError::UnableToRead(e.to_string()))?;
        let path = DecisionTreePath::from_value(value)?;
        debug!(
            "Loaded decision tree path with {} interior nodes.",
            path.num_interior_nodes()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;
    use tempfile::tempdir;

    fn three_node() -> DecisionTreePath {
        DecisionTreePath::new(
            vec![1, 2, 0, 0, 0, 0],
            vec![Coordinate::new(0, 0), Coordinate::new(1, 1), Coordinate::new(0, 2)].into(),
        )
    }

    #[test]
    fn test_json_layout() {
        let path = DecisionTreePath::new(vec![0, 0], vec![Coordinate::new(0, 0)].into());
        let json = path.json_dump().unwrap();
        assert_eq!(
            json,
            r#"{"version":1,"edgeToInteriorNode":[0,0],"splitRuleCoordinates":[{"layerIndex":0,"elementIndex":0}]}"#
        );
    }

    #[test]
    fn test_path_io_json() {
        let path = three_node();
        let json = path.json_dump().unwrap();
        let path2 = DecisionTreePath::from_json(&json).unwrap();
        assert_eq!(path.edge_to_interior_node(), path2.edge_to_interior_node());
        assert_eq!(path.split_rule_coordinates(), path2.split_rule_coordinates());
    }

    #[test]
    fn test_path_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("path.json");
        let path = three_node();
        path.save_path(&file_path).unwrap();
        let path2 = DecisionTreePath::load_path(&file_path).unwrap();
        assert_eq!(path, path2);
    }

    #[test]
    fn test_empty_path_round_trip() {
        let path = DecisionTreePath::default();
        let path2 = DecisionTreePath::from_json(&path.json_dump().unwrap()).unwrap();
        assert_eq!(path2.num_interior_nodes(), 0);
        assert!(path2.edge_to_interior_node().is_empty());
    }

    #[test]
    fn test_unsupported_version() {
        let json = r#"{"version": 2, "edgeToInteriorNode": [0, 0], "splitRuleCoordinates": [{"layerIndex": 0, "elementIndex": 0}]}"#;
        let err = DecisionTreePath::from_json(json).unwrap_err();
        assert!(matches!(err, PathError::UnsupportedVersion(ref v) if v == "2"));
        assert!(err.to_string().contains('2'));

        let json = r#"{"version": 0}"#;
        assert!(matches!(
            DecisionTreePath::from_json(json),
            Err(PathError::UnsupportedVersion(ref v)) if v == "0"
        ));

        let json = r#"{"version": 18446744073709551615, "edgeToInteriorNode": [], "splitRuleCoordinates": []}"#;
        assert!(matches!(
            DecisionTreePath::from_json(json),
            Err(PathError::UnsupportedVersion(ref v)) if v == "18446744073709551615"
        ));

        let json = r#"{"version": -7}"#;
        assert!(matches!(
            DecisionTreePath::from_json(json),
            Err(PathError::UnsupportedVersion(ref v)) if v == "-7"
        ));
    }

    #[test]
    fn test_missing_version() {
        let json = r#"{"edgeToInteriorNode": [0, 0], "splitRuleCoordinates": []}"#;
        assert!(matches!(DecisionTreePath::from_json(json), Err(PathError::UnableToRead(_))));

        let json = r#"{"version": "1", "edgeToInteriorNode": [], "splitRuleCoordinates": []}"#;
        assert!(matches!(DecisionTreePath::from_json(json), Err(PathError::UnableToRead(_))));

        let json = r#"{"version": 2.0, "edgeToInteriorNode": [], "splitRuleCoordinates": []}"#;
        assert!(matches!(DecisionTreePath::from_json(json), Err(PathError::UnableToRead(_))));
    }

    #[test]
    fn test_malformed_tables() {
        let json = r#"{"version": 1, "edgeToInteriorNode": [0, -1], "splitRuleCoordinates": []}"#;
        assert!(matches!(DecisionTreePath::from_json(json), Err(PathError::UnableToRead(_))));

        assert!(matches!(DecisionTreePath::from_json("not json"), Err(PathError::UnableToRead(_))));
    }

    #[test]
    fn test_nested_in_layer() {
        #[derive(Serialize, Deserialize)]
        struct Layer {
            name: String,
            path: DecisionTreePath,
        }
        let layer = Layer {
            name: String::from("tree"),
            path: three_node(),
        };
        let json = serde_json::to_string(&layer).unwrap();
        let layer2: Layer = serde_json::from_str(&json).unwrap();
        assert_eq!(layer2.name, "tree");
        assert_eq!(layer2.path, three_node());

        let bad = r#"{"name": "tree", "path": {"version": 3}}"#;
        let err = serde_json::from_str::<Layer>(bad).err().unwrap();
        assert!(err.to_string().contains("version: 3"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.json");
        assert!(matches!(
            DecisionTreePath::load_path(&file_path),
            Err(PathError::UnableToRead(_))
        ));
    }
}
