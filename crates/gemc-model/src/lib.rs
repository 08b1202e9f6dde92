#![warn(missing_docs)]

//! Data model for GEMC detector geometry.
//!
//! A detector is a flat table of volume records: pipe-delimited rows
//! naming a shape, its dimensions with per-component units, a placement
//! inside a mother volume, and display and simulation attributes. This
//! crate parses and serializes those rows, normalizes units, and holds
//! them in an ordered [`VolumeStore`] together with user-defined
//! materials. Building a placed hierarchy out of a store is the scene
//! crate's job.
//!
//! # Example
//!
//! ```no_run
//! use gemc_model::VolumeStore;
//!
//! let mut store = VolumeStore::new("hodo");
//! store.import_geometry_file("hodo__geometry_original.txt").unwrap();
//! for record in store.find_by_mother("root") {
//!     println!("{} is a {}", record.name, record.shape_type);
//! }
//! ```

pub mod color;
pub mod error;
pub mod material;
pub mod record;
pub mod shape;
pub mod sql;
pub mod store;
pub mod units;

pub use color::Color;
pub use error::ModelError;
pub use material::MaterialSpec;
pub use record::{
    parse_rotation, trapezoid_from_survey, DrawStyle, GeometryRecord, ParseOptions,
    SurveyTrapezoid, UnitList, FIELD_NAMES,
};
pub use shape::{BooleanOp, OperationSpec, ShapeType, SolidKind};
pub use store::VolumeStore;
pub use units::{AngleUnit, LengthUnit, UnitKind, UnitSystem, COUNTS};
