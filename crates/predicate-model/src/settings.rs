use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL engine flavour targeted by the SQL compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialectKind {
    #[default]
    Hive,
    Spark,
}

impl fmt::Display for SqlDialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialectKind::Hive => write!(f, "hive"),
            SqlDialectKind::Spark => write!(f, "spark"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Per-ring bounding boxes per OR batch.
    pub bbox_batch_size: usize,

    /// Multipolygons with more parts than this get per-ring boxes.
    pub per_ring_bbox_threshold: usize,

    pub max_depth: usize,

    /// Reject invalid WKT when building `Within` predicates.
    pub strict_geometry: bool,

    pub sql_dialect: SqlDialectKind,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            bbox_batch_size: 500,
            per_ring_bbox_threshold: 2,
            max_depth: 256,
            strict_geometry: false,
            sql_dialect: SqlDialectKind::Hive,
        }
    }
}

impl CompilerSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: CompilerSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.bbox_batch_size == 0 {
            return Err(SettingsError::Invalid(
                "bbox_batch_size must be positive".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(SettingsError::Invalid("max_depth must be positive".into()));
        }
        Ok(())
    }
}
