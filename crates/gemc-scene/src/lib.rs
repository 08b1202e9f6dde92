#![warn(missing_docs)]

//! Scene building for GEMC detector geometry.
//!
//! This crate turns the flat record table of a
//! [`VolumeStore`](gemc_model::VolumeStore) into a placed volume
//! hierarchy. [`HierarchyBuilder`] resolves per-record transforms,
//! dispatches every supported shape into a [`GeometryToolkit`]
//! implementation and attaches nodes mother by mother. The bundled
//! [`SceneRecorder`] toolkit keeps everything in plain inspectable
//! structs; a rendering or simulation backend implements the same
//! trait against its own solid and node types.
//!
//! # Example
//!
//! ```
//! use gemc_model::{GeometryRecord, ParseOptions, UnitKind, UnitList, VolumeStore};
//! use gemc_scene::{HierarchyBuilder, SceneRecorder};
//!
//! let options = ParseOptions::default();
//! let mut record = GeometryRecord::new("Box1");
//! record.shape_type = "Box".to_string();
//! record.dimensions =
//!     UnitList::parse("10*cm 10*cm 10*cm", UnitKind::Length, &options, "dimensions").unwrap();
//! record.material = "Aluminum".to_string();
//!
//! let mut store = VolumeStore::new("demo");
//! store.add(record).unwrap();
//!
//! let mut builder = HierarchyBuilder::new(SceneRecorder::new());
//! let report = builder.build(&store, "root").unwrap();
//! assert_eq!(report.placed, 1);
//! ```

pub mod builder;
pub mod error;
pub mod recording;
pub mod toolkit;
pub mod transform;

pub use builder::{BuildFailure, BuildReport, HierarchyBuilder, RecordState, WORLD};
pub use error::BuildError;
pub use recording::{
    MaterialId, MaterialSource, NodeId, Placement, RecordedMaterial, RecordedNode, RecordedSolid,
    SceneRecorder, SceneSummary, SolidId, SolidParams,
};
pub use toolkit::{GeometryToolkit, TrapParams, ZPlane};
pub use transform::{compose_rotation, Axis, ResolvedTransform, RotationOrder};
