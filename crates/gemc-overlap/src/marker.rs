//! Marker-volume generation.
//!
//! Each overlap becomes a small box record named `Overlap{i}` directly
//! under `root`, so the points can be drawn on top of the geometry
//! they were found in.

use gemc_model::{GeometryRecord, ModelError, UnitList, VolumeStore};

use crate::scan::Overlap;

/// How marker volumes are generated.
#[derive(Debug, Clone)]
pub struct MarkerOptions {
    /// Box half-length in millimeters.
    pub size: f64,
    /// Marker color as a hex string.
    pub color: String,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            size: 10.0,
            color: "ff0000".to_string(),
        }
    }
}

/// Append one marker record per overlap, numbered after the records
/// already in the store. Returns how many were added.
pub fn add_markers(
    store: &mut VolumeStore,
    overlaps: &[Overlap],
    options: &MarkerOptions,
) -> Result<usize, ModelError> {
    let offset = store.len();
    for (i, overlap) in overlaps.iter().enumerate() {
        let mut record = GeometryRecord::new(format!("Overlap{}", offset + i + 1));
        record.mother = "root".to_string();
        record.description = "Overlap point".to_string();
        record.position = UnitList::uniform(overlap.position.to_vec(), "mm");
        record.rotation = UnitList::zeros3("deg");
        record.color = options.color.clone();
        record.shape_type = "Box".to_string();
        record.dimensions = UnitList::uniform(vec![options.size; 3], "mm");
        record.material = "Vacuum".to_string();
        store.add(record)?;
    }
    Ok(overlaps.len())
}

/// A fresh `overlaps` store holding one marker per overlap.
pub fn marker_store(
    overlaps: &[Overlap],
    options: &MarkerOptions,
) -> Result<VolumeStore, ModelError> {
    let mut store = VolumeStore::new("overlaps");
    add_markers(&mut store, overlaps, options)?;
    Ok(store)
}
