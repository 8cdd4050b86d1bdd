use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::diagnostics::Diagnostics;
use crate::error::{Result, ScoutError};
use crate::schema::{ClassMetadata, DataType, PropertyType};

/// A writable property of the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WritablePropertyRecord {
    pub class_name: String,
    pub property_name: String,
    pub property_type: DataType,
}

/// Non-fatal signal that a filter pass matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoMatchWarning {
    pub data_type: DataType,
    pub classes_scanned: usize,
}

impl std::fmt::Display for NoMatchWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "No writable properties of type {} found in {} class(es)",
            self.data_type, self.classes_scanned
        )
    }
}

/// Result of a filter pass: matches in discovery order, plus the
/// no-match warning when there are none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOutcome {
    pub records: Vec<WritablePropertyRecord>,
    pub warning: Option<NoMatchWarning>,
}

/// Finds properties carrying the `write` qualifier whose declared type is
/// exactly the requested one.
///
/// Stateless and single-pass. Classes are scanned in input order and
/// properties in provider order. If inspecting any class fails, the whole
/// batch is aborted with a `Retrieval` error naming that class; records
/// gathered from earlier classes are discarded.
pub struct WritablePropertyFilter<'a> {
    data_type: DataType,
    diagnostics: &'a dyn Diagnostics,
}

impl<'a> WritablePropertyFilter<'a> {
    pub fn new(data_type: DataType, diagnostics: &'a dyn Diagnostics) -> Self {
        Self {
            data_type,
            diagnostics,
        }
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn run<C: ClassMetadata>(&self, classes: &[C]) -> Result<FilterOutcome> {
        let wanted = PropertyType::Data(self.data_type);
        let mut records = Vec::new();

        for class in classes {
            let properties = class
                .properties()
                .map_err(|e| ScoutError::retrieval(Some(class.name()), e))?;

            for property in properties {
                if !property.is_writable() || *property.property_type() != wanted {
                    continue;
                }
                self.diagnostics.emit(
                    Level::DEBUG,
                    &format!(
                        "Writable {} property {}.{}",
                        self.data_type,
                        class.name(),
                        property.name()
                    ),
                );
                records.push(WritablePropertyRecord {
                    class_name: class.name().to_string(),
                    property_name: property.name().to_string(),
                    property_type: self.data_type,
                });
            }
        }

        let warning = records.is_empty().then(|| NoMatchWarning {
            data_type: self.data_type,
            classes_scanned: classes.len(),
        });
        if let Some(w) = &warning {
            self.diagnostics.emit(Level::WARN, &w.to_string());
        }

        Ok(FilterOutcome { records, warning })
    }
}
