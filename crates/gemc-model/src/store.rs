//! Ordered in-memory store for one detector's volumes and materials.
//!
//! Insertion order is meaningful: text export replays it, and builders
//! rely on it when several records share a mother. File names follow the
//! GEMC convention `{detector}__geometry_{variation}.txt`.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ModelError;
use crate::material::MaterialSpec;
use crate::record::{GeometryRecord, ParseOptions};

/// Container for the records and materials of one detector variation.
#[derive(Debug, Clone)]
pub struct VolumeStore {
    detector: String,
    variation: String,
    options: ParseOptions,
    records: Vec<GeometryRecord>,
    materials: Vec<MaterialSpec>,
}

impl VolumeStore {
    /// Create an empty store for `detector` with the default variation
    /// `original` and default parse options.
    pub fn new(detector: impl Into<String>) -> Self {
        Self::with_options(detector, ParseOptions::default())
    }

    /// Create an empty store with explicit parse options.
    pub fn with_options(detector: impl Into<String>, options: ParseOptions) -> Self {
        VolumeStore {
            detector: detector.into(),
            variation: "original".to_string(),
            options,
            records: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// Detector name.
    pub fn detector(&self) -> &str {
        &self.detector
    }

    /// Variation name, `original` unless changed.
    pub fn variation(&self) -> &str {
        &self.variation
    }

    /// Change the variation used in file names and descriptions.
    pub fn set_variation(&mut self, variation: impl Into<String>) {
        self.variation = variation.into();
    }

    /// The parse options applied to imported text.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[GeometryRecord] {
        &self.records
    }

    /// All user-defined materials, in insertion order.
    pub fn materials(&self) -> &[MaterialSpec] {
        &self.materials
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are held.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One-line description of what the store holds.
    pub fn description(&self) -> String {
        format!(
            "Geometry for {} variation: {}",
            self.detector, self.variation
        )
    }

    /// Append a record. Names must be unique on this path.
    pub fn add(&mut self, record: GeometryRecord) -> Result<(), ModelError> {
        if self.contains(&record.name) {
            return Err(ModelError::DuplicateName(record.name));
        }
        self.records.push(record);
        Ok(())
    }

    /// Mutable access to the records, for bulk edits like recoloring.
    pub fn records_mut(&mut self) -> &mut [GeometryRecord] {
        &mut self.records
    }

    /// Append a material definition.
    pub fn add_material(&mut self, material: MaterialSpec) {
        self.materials.push(material);
    }

    /// Look up a user-defined material by name.
    pub fn find_material(&self, name: &str) -> Option<&MaterialSpec> {
        self.materials.iter().find(|m| m.name == name)
    }

    fn contains(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    /// First record with the given name. Warns if the lenient import
    /// path ever let in duplicates.
    pub fn find_by_name(&self, name: &str) -> Option<&GeometryRecord> {
        let mut matches = self.records.iter().filter(|r| r.name == name);
        let first = matches.next();
        if first.is_some() && matches.next().is_some() {
            tracing::warn!(name, "more than one volume with this name in the store");
        }
        first
    }

    /// Records whose name matches the pattern, in insertion order.
    /// Anchor with `^` to match from the start.
    pub fn find_by_name_regex(&self, pattern: &Regex) -> Vec<&GeometryRecord> {
        self.records
            .iter()
            .filter(|r| pattern.is_match(&r.name))
            .collect()
    }

    /// Records placed directly inside `mother`, in insertion order.
    pub fn find_by_mother(&self, mother: &str) -> Vec<&GeometryRecord> {
        self.records
            .iter()
            .filter(|r| r.mother == mother)
            .collect()
    }

    /// Records whose mother matches the pattern, in insertion order.
    pub fn find_by_mother_regex(&self, pattern: &Regex) -> Vec<&GeometryRecord> {
        self.records
            .iter()
            .filter(|r| pattern.is_match(&r.mother))
            .collect()
    }

    /// Read pipe-delimited geometry text. Lines with fewer than two
    /// fields are skipped; everything else is kept, with warnings for
    /// records that fail validation or reuse a name. Returns the number
    /// of records imported.
    pub fn import_text<R: BufRead>(&mut self, reader: R) -> Result<usize, ModelError> {
        let mut imported = 0;
        for line in reader.lines() {
            let line = line?;
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() < 2 {
                continue;
            }
            let record = GeometryRecord::from_fields_lossy(&fields, &self.options);
            if let Err(err) = record.validate() {
                tracing::warn!(name = %record.name, %err, "imported record failed validation");
            }
            if self.contains(&record.name) {
                tracing::warn!(name = %record.name, "duplicate volume name kept on import");
            }
            self.records.push(record);
            imported += 1;
        }
        Ok(imported)
    }

    /// Write every record in insertion order as geometry text.
    pub fn export_text<W: Write>(&self, mut writer: W) -> Result<(), ModelError> {
        for record in &self.records {
            writeln!(writer, "{}", record.serialize())?;
        }
        Ok(())
    }

    /// Conventional geometry file name for this store.
    pub fn geometry_file_name(&self) -> String {
        format!("{}__geometry_{}.txt", self.detector, self.variation)
    }

    /// Conventional materials file name for this store.
    pub fn materials_file_name(&self) -> String {
        format!("{}__materials_{}.txt", self.detector, self.variation)
    }

    /// Import records from a geometry text file.
    pub fn import_geometry_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ModelError> {
        let file = File::open(path)?;
        self.import_text(BufReader::new(file))
    }

    /// Write the geometry file under `dir` using the conventional name.
    /// Returns the path written.
    pub fn export_geometry_file(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ModelError> {
        let path = dir.as_ref().join(self.geometry_file_name());
        let file = File::create(&path)?;
        self.export_text(BufWriter::new(file))?;
        Ok(path)
    }

    /// Write the materials file under `dir` using the conventional name.
    /// Nothing is written when no materials are defined.
    pub fn export_materials_file(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<Option<PathBuf>, ModelError> {
        if self.materials.is_empty() {
            return Ok(None);
        }
        let path = dir.as_ref().join(self.materials_file_name());
        let mut writer = BufWriter::new(File::create(&path)?);
        for material in &self.materials {
            writeln!(writer, "{}", material.serialize())?;
        }
        Ok(Some(path))
    }
}
