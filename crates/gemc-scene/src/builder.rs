//! Depth-first construction of a volume hierarchy.
//!
//! [`HierarchyBuilder`] walks a [`VolumeStore`] mother tree, builds a
//! solid for every record it reaches and places the existing ones as
//! nodes through a [`GeometryToolkit`]. Orphans (records whose mother
//! chain never reaches the requested root) are simply never visited.
//! A record that cannot be built is reported and its subtree is
//! abandoned; the rest of the tree still builds. Only a cyclic operand
//! reference aborts the whole build.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use gemc_model::{
    Color, DrawStyle, GeometryRecord, ParseOptions, ShapeType, SolidKind, VolumeStore,
};

use crate::error::BuildError;
use crate::toolkit::{GeometryToolkit, TrapParams, ZPlane};
use crate::transform::ResolvedTransform;

/// Name of the implicit top volume.
pub const WORLD: &str = "root";

/// Half-extent of the implicit world box, in the base length unit.
const WORLD_HALF_EXTENT: f64 = 1000.0;

// ===== Build outcome =====

/// How far a record got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordState {
    /// Solid built and transform resolved; no node was placed. This is
    /// where `exist == 0` records and components stop.
    ShapeBuilt,
    /// Node created and attached inside its mother.
    Placed,
    /// Building failed; the record's subtree was abandoned.
    Failed,
}

/// One record that could not be built.
#[derive(Debug, Clone, Serialize)]
pub struct BuildFailure {
    /// Record name.
    pub name: String,
    /// What went wrong.
    pub reason: String,
}

/// Tally of one [`HierarchyBuilder::build`] call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Records visited by the mother-tree traversal.
    pub processed: usize,
    /// Nodes attached, operand placements included.
    pub placed: usize,
    /// Failed records in traversal order.
    pub failures: Vec<BuildFailure>,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "visited {} records, placed {} volumes",
            self.processed, self.placed
        )?;
        if !self.failures.is_empty() {
            write!(f, ", {} failed", self.failures.len())?;
        }
        Ok(())
    }
}

/// What placing a single record did.
enum PlaceOutcome {
    /// Node attached inside the mother.
    Placed,
    /// Solid built but no node: `exist == 0` or a component.
    ShapeOnly,
    /// Already handled by an earlier visit.
    Skipped,
}

// ===== Builder =====

/// Walks stores and drives a toolkit.
///
/// Solids, transforms and nodes are memoized by volume name, so
/// several stores can be built into the same scene and operation
/// operands are only ever built once. Recover the toolkit with
/// [`into_toolkit`](Self::into_toolkit) when done.
pub struct HierarchyBuilder<T: GeometryToolkit> {
    toolkit: T,
    options: ParseOptions,
    solids: HashMap<String, T::Solid>,
    transforms: HashMap<String, ResolvedTransform>,
    nodes: HashMap<String, T::Node>,
    states: HashMap<String, RecordState>,
    in_progress: HashSet<String>,
}

impl<T: GeometryToolkit> HierarchyBuilder<T> {
    /// A builder driving `toolkit`.
    pub fn new(toolkit: T) -> Self {
        Self {
            toolkit,
            options: ParseOptions::default(),
            solids: HashMap::new(),
            transforms: HashMap::new(),
            nodes: HashMap::new(),
            states: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    /// The wrapped toolkit.
    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    /// The wrapped toolkit, mutably.
    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    /// Consume the builder and return the toolkit.
    pub fn into_toolkit(self) -> T {
        self.toolkit
    }

    /// How far the named record got, if it was visited at all.
    pub fn state(&self, name: &str) -> Option<RecordState> {
        self.states.get(name).copied()
    }

    /// The resolved placement of a built record.
    pub fn transform(&self, name: &str) -> Option<&ResolvedTransform> {
        self.transforms.get(name)
    }

    /// Build the subtree of `store` rooted at `root`.
    ///
    /// `"root"` stands for the implicit world volume, created on first
    /// use as an invisible vacuum box. Any other name must match a
    /// record in the store, which is then placed directly under the
    /// world. Per-record failures land in the report; a cyclic operand
    /// reference is fatal and returns an error.
    pub fn build(
        &mut self,
        store: &VolumeStore,
        root: &str,
    ) -> Result<BuildReport, BuildError> {
        self.options = *store.options();
        let mut report = BuildReport::default();

        if !self.nodes.contains_key(root) {
            if root == WORLD {
                self.ensure_world()?;
            } else {
                let record = store
                    .find_by_name(root)
                    .ok_or_else(|| BuildError::MissingWorld(root.to_string()))?
                    .clone();
                self.ensure_world()?;
                if !self.visit(store, &record, WORLD, &mut report)? {
                    return Ok(report);
                }
            }
        }
        self.descend(store, root, &mut report)?;
        Ok(report)
    }

    /// Create the world node on first use.
    fn ensure_world(&mut self) -> Result<(), BuildError> {
        if self.nodes.contains_key(WORLD) {
            return Ok(());
        }
        let world = self.toolkit.world_volume(WORLD, [WORLD_HALF_EXTENT; 3])?;
        self.nodes.insert(WORLD.to_string(), world);
        Ok(())
    }

    /// Place every record mothered by `mother`, then recurse.
    fn descend(
        &mut self,
        store: &VolumeStore,
        mother: &str,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        let daughters: Vec<GeometryRecord> = store
            .find_by_mother(mother)
            .into_iter()
            .cloned()
            .collect();
        for daughter in daughters {
            if self.visit(store, &daughter, mother, report)? {
                self.descend(store, &daughter.name, report)?;
            }
        }
        Ok(())
    }

    /// Place one record during traversal, converting non-fatal errors
    /// into report entries. Returns whether to recurse into daughters.
    fn visit(
        &mut self,
        store: &VolumeStore,
        record: &GeometryRecord,
        mother: &str,
        report: &mut BuildReport,
    ) -> Result<bool, BuildError> {
        report.processed += 1;
        match self.place(store, record, mother, report) {
            Ok(_) => Ok(true),
            Err(err @ BuildError::CyclicGeometry(_)) => Err(err),
            Err(err) => {
                tracing::warn!(volume = %record.name, error = %err, "abandoning subtree");
                self.states.insert(record.name.clone(), RecordState::Failed);
                report.failures.push(BuildFailure {
                    name: record.name.clone(),
                    reason: err.to_string(),
                });
                Ok(false)
            }
        }
    }

    /// Place one record inside `mother`, with cycle protection.
    fn place(
        &mut self,
        store: &VolumeStore,
        record: &GeometryRecord,
        mother: &str,
        report: &mut BuildReport,
    ) -> Result<PlaceOutcome, BuildError> {
        if self.states.contains_key(&record.name) {
            return Ok(PlaceOutcome::Skipped);
        }
        if !self.in_progress.insert(record.name.clone()) {
            return Err(BuildError::CyclicGeometry(record.name.clone()));
        }
        let outcome = self.place_inner(store, record, mother, report);
        self.in_progress.remove(&record.name);
        outcome
    }

    fn place_inner(
        &mut self,
        store: &VolumeStore,
        record: &GeometryRecord,
        mother: &str,
        report: &mut BuildReport,
    ) -> Result<PlaceOutcome, BuildError> {
        let shape = ShapeType::parse(&record.shape_type);

        let color = Color::parse(&record.color)?;
        let mut transparency = color.transparency_percent();
        if record.style == DrawStyle::Wireframe && transparency < 70 {
            transparency = 70;
        }

        // Component records resolve to no material and stay solid-only.
        let material = if matches!(shape, ShapeType::Component) {
            None
        } else {
            self.toolkit.resolve_material(
                &record.material,
                transparency,
                store.find_material(&record.material),
            )?
        };

        // A component's mother may be absent; anything that will
        // become a node needs its mother placed first.
        let mother_node = self.nodes.get(mother).copied();
        if material.is_some() && record.exists && mother_node.is_none() {
            return Err(BuildError::MissingMother {
                volume: record.name.clone(),
                mother: mother.to_string(),
            });
        }

        // The transform is memoized before anything can fail below, so
        // operation operands always find it.
        let transform = ResolvedTransform::resolve(record, &self.options.system)?;
        self.transforms.insert(record.name.clone(), transform);

        let solid = self.build_solid(store, record, &shape, report)?;
        if let Some(solid) = &solid {
            self.solids.insert(record.name.clone(), solid.clone());
        }
        self.states
            .insert(record.name.clone(), RecordState::ShapeBuilt);

        // Non-existing records keep their solid available as an
        // operand but never become nodes.
        if !record.exists {
            return Ok(PlaceOutcome::ShapeOnly);
        }
        if let (Some(solid), Some(material), Some(mother_node)) =
            (solid, material, mother_node)
        {
            let node = self.toolkit.volume_node(
                &record.name,
                &solid,
                &material,
                color,
                record.visible,
                record.style,
            )?;
            self.nodes.insert(record.name.clone(), node);
            self.toolkit
                .attach(mother_node, node, record.copy_number, &transform)?;
            self.states.insert(record.name.clone(), RecordState::Placed);
            report.placed += 1;
            return Ok(PlaceOutcome::Placed);
        }
        Ok(PlaceOutcome::ShapeOnly)
    }

    // ===== Solids =====

    /// Build the record's solid. Components have none.
    fn build_solid(
        &mut self,
        store: &VolumeStore,
        record: &GeometryRecord,
        shape: &ShapeType,
        report: &mut BuildReport,
    ) -> Result<Option<T::Solid>, BuildError> {
        match shape {
            ShapeType::Component => Ok(None),
            ShapeType::Primitive(kind) => self.build_primitive(record, *kind).map(Some),
            ShapeType::CopyOf(source) => {
                let solid = self.solids.get(source).cloned().ok_or_else(|| {
                    BuildError::UnresolvedOperand {
                        operation: record.name.clone(),
                        operand: source.clone(),
                    }
                })?;
                Ok(Some(solid))
            }
            ShapeType::Operation(spec) => {
                self.resolve_operand(store, &record.name, &spec.first, report)?;
                self.resolve_operand(store, &record.name, &spec.second, report)?;
                let (first, first_transform) = self.operand_parts(&record.name, &spec.first)?;
                let (second, second_transform) = self.operand_parts(&record.name, &spec.second)?;
                let placement = if spec.relative {
                    second_transform.relative_to(&first_transform)
                } else {
                    second_transform
                };
                self.toolkit
                    .combine(&record.name, spec.op, &first, &second, &placement)
                    .map(Some)
            }
            ShapeType::Unknown(text) => Err(BuildError::UnsupportedShape {
                name: record.name.clone(),
                shape: text.clone(),
            }),
        }
    }

    /// Make sure an operand's solid and transform are memoized,
    /// placing the operand in its own mother on demand.
    fn resolve_operand(
        &mut self,
        store: &VolumeStore,
        operation: &str,
        operand: &str,
        report: &mut BuildReport,
    ) -> Result<(), BuildError> {
        if self.solids.contains_key(operand) {
            return Ok(());
        }
        let record = store
            .find_by_name(operand)
            .ok_or_else(|| BuildError::UnresolvedOperand {
                operation: operation.to_string(),
                operand: operand.to_string(),
            })?
            .clone();
        let mother = record.mother.clone();
        self.place(store, &record, &mother, report)?;
        if self.solids.contains_key(operand) {
            Ok(())
        } else {
            Err(BuildError::UnresolvedOperand {
                operation: operation.to_string(),
                operand: operand.to_string(),
            })
        }
    }

    fn operand_parts(
        &self,
        operation: &str,
        operand: &str,
    ) -> Result<(T::Solid, ResolvedTransform), BuildError> {
        match (
            self.solids.get(operand).cloned(),
            self.transforms.get(operand).copied(),
        ) {
            (Some(solid), Some(transform)) => Ok((solid, transform)),
            _ => Err(BuildError::UnresolvedOperand {
                operation: operation.to_string(),
                operand: operand.to_string(),
            }),
        }
    }

    /// Dispatch on the solid kind and unpack the dimension layout.
    fn build_primitive(
        &mut self,
        record: &GeometryRecord,
        kind: SolidKind,
    ) -> Result<T::Solid, BuildError> {
        let name = record.name.as_str();
        match kind {
            SolidKind::Box => {
                self.need(record, kind, 3)?;
                let dx = self.length(record, 0)?;
                let dy = self.length(record, 1)?;
                let dz = self.length(record, 2)?;
                self.toolkit.box_solid(name, dx, dy, dz)
            }
            SolidKind::Tube => {
                let rmin = self.length(record, 0)?;
                let rmax = self.length(record, 1)?;
                let dz = self.length(record, 2)?;
                if record.dimensions.len() == 3 {
                    return self.toolkit.tube(name, rmin, rmax, dz, None);
                }
                self.need(record, kind, 5)?;
                // A non-positive start with a full sweep is a plain tube.
                let delta = self.angle(record, 4)?;
                if record.dimensions.values[3] <= 0.0 && delta >= 360.0 {
                    self.toolkit.tube(name, rmin, rmax, dz, None)
                } else {
                    let start = self.angle(record, 3)?;
                    self.toolkit
                        .tube(name, rmin, rmax, dz, Some((start, start + delta)))
                }
            }
            SolidKind::Sphere => {
                self.need(record, kind, 6)?;
                let rmin = self.length(record, 0)?;
                let rmax = self.length(record, 1)?;
                let phi_start = self.angle(record, 2)?;
                let phi_end = phi_start + self.angle(record, 3)?;
                let theta_start = self.angle(record, 4)?;
                let theta_end = theta_start + self.angle(record, 5)?;
                self.toolkit
                    .sphere(name, rmin, rmax, (phi_start, phi_end), (theta_start, theta_end))
            }
            SolidKind::Cons => {
                self.need(record, kind, 7)?;
                let rmin1 = self.length(record, 0)?;
                let rmax1 = self.length(record, 1)?;
                let rmin2 = self.length(record, 2)?;
                let rmax2 = self.length(record, 3)?;
                let dz = self.length(record, 4)?;
                let phi_start = self.angle(record, 5)?;
                let phi_end = phi_start + self.angle(record, 6)?;
                self.toolkit
                    .cone(name, dz, rmin1, rmax1, rmin2, rmax2, (phi_start, phi_end))
            }
            SolidKind::Trd => {
                self.need(record, kind, 5)?;
                let dx1 = self.length(record, 0)?;
                let dx2 = self.length(record, 1)?;
                let dy1 = self.length(record, 2)?;
                let dy2 = self.length(record, 3)?;
                let dz = self.length(record, 4)?;
                self.toolkit.trd(name, dx1, dx2, dy1, dy2, dz)
            }
            SolidKind::Trap => {
                self.need(record, kind, 11)?;
                let params = TrapParams {
                    dz: self.length(record, 0)?,
                    theta: self.angle(record, 1)?,
                    phi: self.angle(record, 2)?,
                    h1: self.length(record, 3)?,
                    bl1: self.length(record, 4)?,
                    tl1: self.length(record, 5)?,
                    alpha1: self.angle(record, 6)?,
                    h2: self.length(record, 7)?,
                    bl2: self.length(record, 8)?,
                    tl2: self.length(record, 9)?,
                    alpha2: self.angle(record, 10)?,
                };
                self.toolkit.trap(name, &params)
            }
            SolidKind::GenericTrap => {
                self.need(record, kind, 17)?;
                let dz = self.length(record, 0)?;
                let mut vertices = [(0.0, 0.0); 8];
                for (i, vertex) in vertices.iter_mut().enumerate() {
                    *vertex = (
                        self.length(record, 2 * i + 1)?,
                        self.length(record, 2 * i + 2)?,
                    );
                }
                self.toolkit.generic_trap(name, dz, &vertices)
            }
            SolidKind::Parallelepiped => {
                self.need(record, kind, 6)?;
                let dx = self.length(record, 0)?;
                let dy = self.length(record, 1)?;
                let dz = self.length(record, 2)?;
                let alpha = self.angle(record, 3)?;
                let theta = self.angle(record, 4)?;
                let phi = self.angle(record, 5)?;
                self.toolkit
                    .parallelepiped(name, dx, dy, dz, alpha, theta, phi)
            }
            SolidKind::Polycone => {
                self.need(record, kind, 3)?;
                let phi_start = self.angle(record, 0)?;
                let phi_delta = self.angle(record, 1)?;
                // The plane count is a bare number, read without
                // conversion.
                let nplanes = record.dimensions.values[2] as usize;
                self.need(record, kind, 3 + 3 * nplanes)?;
                let mut planes = Vec::with_capacity(nplanes);
                for i in 0..nplanes {
                    planes.push(ZPlane {
                        rmin: self.length(record, 3 + i)?,
                        rmax: self.length(record, 3 + nplanes + i)?,
                        z: self.length(record, 3 + 2 * nplanes + i)?,
                    });
                }
                self.toolkit.polycone(name, phi_start, phi_delta, &planes)
            }
            SolidKind::Polyhedra => {
                self.need(record, kind, 4)?;
                let phi_start = self.angle(record, 0)?;
                let phi_delta = self.angle(record, 1)?;
                let nsides = record.dimensions.values[2] as u32;
                let nplanes = record.dimensions.values[3] as usize;
                self.need(record, kind, 4 + 3 * nplanes)?;
                let mut planes = Vec::with_capacity(nplanes);
                for i in 0..nplanes {
                    planes.push(ZPlane {
                        rmin: self.length(record, 4 + i)?,
                        rmax: self.length(record, 4 + nplanes + i)?,
                        z: self.length(record, 4 + 2 * nplanes + i)?,
                    });
                }
                self.toolkit
                    .polyhedra(name, phi_start, phi_delta, nsides, &planes)
            }
            SolidKind::EllipticalTube => {
                self.need(record, kind, 3)?;
                let a = self.length(record, 0)?;
                let b = self.length(record, 1)?;
                let dz = self.length(record, 2)?;
                self.toolkit.elliptical_tube(name, a, b, dz)
            }
            SolidKind::Paraboloid => {
                self.need(record, kind, 3)?;
                let dz = self.length(record, 0)?;
                let rlo = self.length(record, 1)?;
                let rhi = self.length(record, 2)?;
                self.toolkit.paraboloid(name, rlo, rhi, dz)
            }
            SolidKind::Ellipsoid => {
                self.need(record, kind, 5)?;
                let dx = self.length(record, 0)?;
                let dy = self.length(record, 1)?;
                let radius = self.length(record, 2)?;
                let mut z1 = self.length(record, 3)?;
                let mut z2 = self.length(record, 4)?;
                // Degenerate cuts mean the full ellipsoid.
                if (z1 == 0.0 && z2 == 0.0) || z1 >= z2 {
                    z1 = -radius;
                    z2 = radius;
                }
                self.toolkit.ellipsoid(name, dx, dy, radius, z1, z2)
            }
        }
    }

    fn need(
        &self,
        record: &GeometryRecord,
        kind: SolidKind,
        count: usize,
    ) -> Result<(), BuildError> {
        if record.dimensions.len() < count {
            return Err(BuildError::Dimensions {
                shape: kind.gemc_name().to_string(),
                expected: count.to_string(),
                got: record.dimensions.len(),
            });
        }
        Ok(())
    }

    /// Dimension at `index` in the base length unit.
    fn length(&self, record: &GeometryRecord, index: usize) -> Result<f64, BuildError> {
        Ok(record.dimensions.converted(
            index,
            self.options.system.length.symbol(),
            &self.options.system,
        )?)
    }

    /// Dimension at `index` in degrees.
    fn angle(&self, record: &GeometryRecord, index: usize) -> Result<f64, BuildError> {
        Ok(record
            .dimensions
            .converted(index, "deg", &self.options.system)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{MaterialSource, SceneRecorder, SolidParams};
    use gemc_model::{BooleanOp, UnitKind, UnitList};

    fn record(name: &str, mother: &str, shape: &str, dims: &str, pos: &str) -> GeometryRecord {
        let options = ParseOptions::default();
        let mut rec = GeometryRecord::new(name);
        rec.mother = mother.to_string();
        rec.shape_type = shape.to_string();
        rec.dimensions = UnitList::parse(dims, UnitKind::Length, &options, "dimensions").unwrap();
        rec.position = UnitList::parse(pos, UnitKind::Length, &options, "pos").unwrap();
        rec.color = "ff0000".to_string();
        rec.material = "Aluminum".to_string();
        rec
    }

    fn builder() -> HierarchyBuilder<SceneRecorder> {
        HierarchyBuilder::new(SceneRecorder::new())
    }

    #[test]
    fn places_nested_volumes() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Box1", "root", "Box", "10*cm 10*cm 10*cm", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record(
                "Sphere1",
                "Box1",
                "Sphere",
                "0*cm 2*cm 0*deg 360*deg 0*deg 180*deg",
                "0*cm 0*cm 5*cm",
            ))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.placed, 2);
        assert!(report.failures.is_empty());
        assert_eq!(builder.state("Sphere1"), Some(RecordState::Placed));

        let scene = builder.into_toolkit();
        assert_eq!(scene.children_of("Box1"), vec!["Sphere1"]);
        let id = scene.node_by_name("Sphere1").unwrap();
        let placement = scene.node(id).placement.unwrap();
        assert_eq!(placement.translation, [0.0, 0.0, 5.0]);
    }

    #[test]
    fn orphan_records_are_never_visited() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Box1", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("lost", "nowhere", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.placed, 1);
        assert!(builder.state("lost").is_none());
    }

    #[test]
    fn non_existing_record_builds_solid_but_no_node() {
        let mut store = VolumeStore::new("demo");
        let mut ghost = record("Ghost", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm");
        ghost.exists = false;
        store.add(ghost).unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.placed, 0);
        assert!(report.failures.is_empty());
        assert_eq!(builder.state("Ghost"), Some(RecordState::ShapeBuilt));

        let scene = builder.into_toolkit();
        assert!(scene.solid_by_name("Ghost").is_some());
        assert!(scene.node_by_name("Ghost").is_none());
    }

    #[test]
    fn daughter_of_shape_only_record_is_reported() {
        let mut store = VolumeStore::new("demo");
        let mut ghost = record("Ghost", "root", "Box", "5*cm 5*cm 5*cm", "0*cm 0*cm 0*cm");
        ghost.exists = false;
        store.add(ghost).unwrap();
        store
            .add(record("Inner", "Ghost", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "Inner");
        assert!(report.failures[0].reason.contains("Ghost"));
        assert_eq!(builder.state("Inner"), Some(RecordState::Failed));
    }

    #[test]
    fn component_needs_no_placed_mother() {
        // A component still gets its shape built when its mother never
        // became a node; an ordinary record in the same spot fails.
        let mut store = VolumeStore::new("demo");
        let mut ghost = record("Ghost", "root", "Box", "5*cm 5*cm 5*cm", "0*cm 0*cm 0*cm");
        ghost.exists = false;
        store.add(ghost).unwrap();
        let mut part = record("Part", "Ghost", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm");
        part.material = "Component".to_string();
        store.add(part).unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(builder.state("Part"), Some(RecordState::ShapeBuilt));
        assert!(builder.into_toolkit().solid_by_name("Part").is_some());
    }

    #[test]
    fn unknown_shape_fails_without_stopping_siblings() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Blob", "root", "Torus", "1*cm 2*cm 3*cm", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("Box1", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.placed, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "Blob");
        assert!(report.failures[0].reason.contains("Torus"));
    }

    #[test]
    fn relative_operation_places_second_operand_near_first() {
        let mut store = VolumeStore::new("demo");
        let mut a = record("Box1", "root", "Box", "3*cm 3*cm 3*cm", "2*cm 0*cm 0*cm");
        a.material = "Component".to_string();
        store.add(a).unwrap();
        let mut b = record("Box2", "root", "Box", "1*cm 1*cm 1*cm", "5*cm 0*cm 0*cm");
        b.material = "Component".to_string();
        store.add(b).unwrap();
        store
            .add(record(
                "Combo",
                "root",
                "Operation:@ Box1 - Box2",
                "0",
                "0*cm 0*cm 0*cm",
            ))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.placed, 1);
        assert!(report.failures.is_empty());

        let scene = builder.into_toolkit();
        let combo = scene.solid(scene.solid_by_name("Combo").unwrap());
        match &combo.params {
            SolidParams::Composite { op, placement, .. } => {
                assert_eq!(*op, BooleanOp::Subtraction);
                assert_eq!(placement.translation, [3.0, 0.0, 0.0]);
            }
            other => panic!("expected a composite, got {other:?}"),
        }
    }

    #[test]
    fn operation_operands_resolve_forward_references() {
        // The operation comes first in the store; operands are placed
        // on demand from the store.
        let mut store = VolumeStore::new("demo");
        store
            .add(record(
                "Combo",
                "root",
                "Operation: Tube1 + Box2",
                "0",
                "0*cm 0*cm 0*cm",
            ))
            .unwrap();
        store
            .add(record("Tube1", "root", "Tube", "0*cm 2*cm 5*cm", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("Box2", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 4*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        // Operands get real nodes of their own plus the combined one.
        assert_eq!(report.placed, 3);
        assert!(report.failures.is_empty());

        let scene = builder.into_toolkit();
        assert!(scene.solid_by_name("Combo").is_some());
        assert_eq!(scene.node_count(), 4);
    }

    #[test]
    fn cyclic_operands_abort_the_build() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("A", "root", "Operation: B + B", "0", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("B", "root", "Operation: A + A", "0", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let err = builder.build(&store, "root").unwrap_err();
        assert!(matches!(err, BuildError::CyclicGeometry(_)));
    }

    #[test]
    fn missing_operand_is_reported() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record(
                "Combo",
                "root",
                "Operation: Box1 + Nope",
                "0",
                "0*cm 0*cm 0*cm",
            ))
            .unwrap();
        store
            .add(record("Box1", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "Combo");
        assert!(report.failures[0].reason.contains("Nope"));
    }

    #[test]
    fn copy_of_shares_the_source_solid() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("base", "root", "Box", "2*cm 2*cm 2*cm", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("twin", "root", "CopyOf base", "0", "6*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.placed, 2);

        let scene = builder.into_toolkit();
        let base = scene.node(scene.node_by_name("base").unwrap());
        let twin = scene.node(scene.node_by_name("twin").unwrap());
        assert_eq!(base.solid, twin.solid);
    }

    #[test]
    fn copy_of_unbuilt_source_is_an_error() {
        // CopyOf does not pull its source out of the store.
        let mut store = VolumeStore::new("demo");
        store
            .add(record("twin", "root", "CopyOf base", "0", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("base", "root", "Box", "2*cm 2*cm 2*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].name, "twin");
    }

    #[test]
    fn wireframe_bumps_low_transparency() {
        let mut store = VolumeStore::new("demo");
        let mut rec = record("Frame", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm");
        rec.color = "0000ff3".to_string();
        rec.style = DrawStyle::Wireframe;
        store.add(rec).unwrap();

        let mut builder = builder();
        builder.build(&store, "root").unwrap();
        let scene = builder.into_toolkit();
        let node = scene.node(scene.node_by_name("Frame").unwrap());
        assert_eq!(scene.material(node.material).transparency, 70);
    }

    #[test]
    fn unknown_material_falls_back() {
        let mut store = VolumeStore::new("demo");
        let mut rec = record("Odd", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm");
        rec.material = "Unobtainium".to_string();
        store.add(rec).unwrap();

        let mut builder = builder();
        builder.build(&store, "root").unwrap();
        let scene = builder.into_toolkit();
        let node = scene.node(scene.node_by_name("Odd").unwrap());
        assert_eq!(scene.material(node.material).source, MaterialSource::Fallback);
    }

    #[test]
    fn build_rooted_at_named_volume() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Hall", "ignored", "Box", "50*cm 50*cm 50*cm", "0*cm 0*cm 0*cm"))
            .unwrap();
        store
            .add(record("Target", "Hall", "Tube", "0*cm 1*cm 5*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "Hall").unwrap();
        assert_eq!(report.placed, 2);

        let scene = builder.into_toolkit();
        assert_eq!(scene.children_of("Hall"), vec!["Target"]);

        let mut other = self::builder();
        assert!(matches!(
            other.build(&store, "Nope"),
            Err(BuildError::MissingWorld(_))
        ));
    }

    #[test]
    fn rebuilding_the_same_store_places_nothing_new() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Box1", "root", "Box", "1*cm 1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let first = builder.build(&store, "root").unwrap();
        assert_eq!(first.placed, 1);
        let second = builder.build(&store, "root").unwrap();
        assert_eq!(second.placed, 0);
        assert_eq!(second.processed, 1);
    }

    #[test]
    fn polycone_planes_follow_the_array_layout() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record(
                "Cone",
                "root",
                "Polycone",
                "0*deg 360*deg 3 \
                 0*cm 0*cm 0*cm \
                 5*cm 6*cm 7*cm \
                 0*cm 10*cm 20*cm",
                "0*cm 0*cm 0*cm",
            ))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert!(report.failures.is_empty());

        let scene = builder.into_toolkit();
        let solid = scene.solid(scene.solid_by_name("Cone").unwrap());
        match &solid.params {
            SolidParams::Polycone { planes, .. } => {
                assert_eq!(planes.len(), 3);
                assert_eq!(planes[1].rmax, 6.0);
                assert_eq!(planes[2].z, 20.0);
            }
            other => panic!("expected a polycone, got {other:?}"),
        }
    }

    #[test]
    fn tube_with_full_sweep_collapses_to_plain_tube() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record(
                "T1",
                "root",
                "Tube",
                "1*cm 2*cm 5*cm 0*deg 360*deg",
                "0*cm 0*cm 0*cm",
            ))
            .unwrap();
        store
            .add(record(
                "T2",
                "root",
                "Tube",
                "1*cm 2*cm 5*cm 10*deg 90*deg",
                "0*cm 0*cm 5*cm",
            ))
            .unwrap();

        let mut builder = builder();
        builder.build(&store, "root").unwrap();
        let scene = builder.into_toolkit();
        match &scene.solid(scene.solid_by_name("T1").unwrap()).params {
            SolidParams::Tube { phi, .. } => assert!(phi.is_none()),
            other => panic!("expected a tube, got {other:?}"),
        }
        match &scene.solid(scene.solid_by_name("T2").unwrap()).params {
            SolidParams::Tube { phi, .. } => assert_eq!(*phi, Some((10.0, 100.0))),
            other => panic!("expected a tube, got {other:?}"),
        }
    }

    #[test]
    fn short_dimension_list_is_a_dimensions_error() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Box1", "root", "Box", "1*cm 1*cm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        let report = builder.build(&store, "root").unwrap();
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].reason.contains("Box"));
    }

    #[test]
    fn millimeter_dimensions_arrive_in_base_units() {
        let mut store = VolumeStore::new("demo");
        store
            .add(record("Box1", "root", "Box", "10*mm 20*mm 30*mm", "0*cm 0*cm 0*cm"))
            .unwrap();

        let mut builder = builder();
        builder.build(&store, "root").unwrap();
        let scene = builder.into_toolkit();
        match &scene.solid(scene.solid_by_name("Box1").unwrap()).params {
            SolidParams::Box { dx, dy, dz } => {
                assert!((dx - 1.0).abs() < 1e-12);
                assert!((dy - 2.0).abs() < 1e-12);
                assert!((dz - 3.0).abs() < 1e-12);
            }
            other => panic!("expected a box, got {other:?}"),
        }
    }
}
