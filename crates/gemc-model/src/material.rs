//! User-defined material descriptions.
//!
//! Most detector media are predefined by the simulation toolkit; records
//! only name them. Materials added here cover the rest: a density plus a
//! weighted element list, serialized to the pipe-delimited materials
//! table alongside the geometry.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Number of columns in a materials table row. The five optical columns
/// and the seven scintillation columns are written as `none`.
const MATERIAL_FIELDS: usize = 17;

/// A material definition for the materials table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    /// Material name, referenced by records' `material` field.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Density in g/cm3.
    pub density: f64,
    /// Element symbol and weight fraction, in order.
    pub components: Vec<(String, f64)>,
}

impl MaterialSpec {
    /// Create a material from an explicit component list.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        density: f64,
        components: Vec<(String, f64)>,
    ) -> Self {
        MaterialSpec {
            name: name.into(),
            description: description.into(),
            density,
            components,
        }
    }

    /// Parse a component list written as alternating symbols and
    /// fractions, e.g. `"H 0.1 C 0.4"`.
    pub fn components_from_str(text: &str) -> Result<Vec<(String, f64)>, ModelError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() % 2 != 0 {
            return Err(ModelError::parse(
                "components",
                format!("expected symbol/fraction pairs, got {} tokens", tokens.len()),
            ));
        }
        let mut components = Vec::with_capacity(tokens.len() / 2);
        for pair in tokens.chunks(2) {
            let fraction: f64 = pair[1].parse().map_err(|_| {
                ModelError::parse(
                    "components",
                    format!("bad fraction {:?} for element {:?}", pair[1], pair[0]),
                )
            })?;
            components.push((pair[0].to_string(), fraction));
        }
        Ok(components)
    }

    fn components_text(&self) -> String {
        self.components
            .iter()
            .map(|(symbol, fraction)| format!("{symbol} {fraction}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the full materials table row.
    pub fn serialize(&self) -> String {
        let mut fields = vec![
            self.name.clone(),
            self.description.clone(),
            format!("{}", self.density),
            format!("{}", self.components.len()),
            self.components_text(),
        ];
        while fields.len() < MATERIAL_FIELDS {
            fields.push("none".to_string());
        }
        fields.join(" | ")
    }

    /// Parse a materials table row. Trailing optical columns are
    /// accepted and ignored.
    pub fn parse(line: &str) -> Result<Self, ModelError> {
        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 5 {
            return Err(ModelError::parse(
                "material",
                format!("expected at least 5 fields, got {}", fields.len()),
            ));
        }
        let density: f64 = fields[2].parse().map_err(|_| {
            ModelError::parse("density", format!("bad density {:?}", fields[2]))
        })?;
        let declared: usize = fields[3].parse().map_err(|_| {
            ModelError::parse("ncomponents", format!("bad count {:?}", fields[3]))
        })?;
        let components = Self::components_from_str(fields[4])?;
        if components.len() != declared {
            tracing::warn!(
                material = fields[0],
                declared,
                found = components.len(),
                "component count mismatch in materials row"
            );
        }
        Ok(MaterialSpec {
            name: fields[0].to_string(),
            description: fields[1].to_string(),
            density,
            components,
        })
    }
}
