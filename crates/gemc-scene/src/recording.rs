//! An in-memory recording implementation of the toolkit seam.
//!
//! The recorder stores every solid, node, and material as plain data so
//! tests and the CLI can inspect what a build produced without any
//! rendering library present. The whole scene serializes to JSON.

use std::collections::HashMap;

use serde::Serialize;

use gemc_model::{BooleanOp, Color, DrawStyle, MaterialSpec};

use crate::error::BuildError;
use crate::toolkit::{GeometryToolkit, TrapParams, ZPlane};
use crate::transform::ResolvedTransform;

/// Handle to a recorded solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SolidId(usize);

/// Handle to a recorded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NodeId(usize);

/// Handle to a recorded material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaterialId(usize);

/// A placement flattened to plain arrays for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Translation components.
    pub translation: [f64; 3],
    /// Rotation matrix, row major.
    pub rotation: [[f64; 3]; 3],
}

impl From<&ResolvedTransform> for Placement {
    fn from(transform: &ResolvedTransform) -> Self {
        let m = transform.rotation.matrix();
        Placement {
            translation: [
                transform.translation.x,
                transform.translation.y,
                transform.translation.z,
            ],
            rotation: [
                [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
                [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
                [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
            ],
        }
    }
}

/// Parameters of one recorded solid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub enum SolidParams {
    Box {
        dx: f64,
        dy: f64,
        dz: f64,
    },
    Tube {
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi: Option<(f64, f64)>,
    },
    Sphere {
        rmin: f64,
        rmax: f64,
        phi: (f64, f64),
        theta: (f64, f64),
    },
    Cone {
        dz: f64,
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        phi: (f64, f64),
    },
    Trd {
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    },
    Trap(TrapParams),
    GenericTrap {
        dz: f64,
        vertices: Vec<(f64, f64)>,
    },
    Parallelepiped {
        dx: f64,
        dy: f64,
        dz: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    },
    Polycone {
        phi_start: f64,
        phi_delta: f64,
        planes: Vec<ZPlane>,
    },
    Polyhedra {
        phi_start: f64,
        phi_delta: f64,
        nsides: u32,
        planes: Vec<ZPlane>,
    },
    EllipticalTube {
        a: f64,
        b: f64,
        dz: f64,
    },
    Paraboloid {
        rlo: f64,
        rhi: f64,
        dz: f64,
    },
    Ellipsoid {
        dx: f64,
        dy: f64,
        radius: f64,
        z1: f64,
        z2: f64,
    },
    Composite {
        op: BooleanOp,
        first: SolidId,
        second: SolidId,
        placement: Placement,
    },
}

/// A solid as recorded.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedSolid {
    /// The volume name the solid was built for.
    pub name: String,
    /// Its construction parameters.
    pub params: SolidParams,
}

/// Where a recorded material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MaterialSource {
    /// Defined in the store's materials table.
    UserDefined,
    /// One of the names every backend knows.
    Builtin,
    /// Unknown name, substituted with a default medium.
    Fallback,
}

/// A material as recorded, one entry per (name, transparency) pair.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedMaterial {
    /// Requested material name.
    pub name: String,
    /// Transparency percentage baked into the medium.
    pub transparency: u8,
    /// How the name was resolved.
    pub source: MaterialSource,
    /// Density from the user definition, when one was given.
    pub density: Option<f64>,
}

/// A placed volume as recorded.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedNode {
    /// Volume name.
    pub name: String,
    /// The solid rendered by this node.
    pub solid: SolidId,
    /// The resolved medium.
    pub material: MaterialId,
    /// Display color.
    pub color: Color,
    /// Visibility flag.
    pub visible: bool,
    /// Render style.
    pub style: DrawStyle,
    /// Parent node, `None` until attached (the top stays detached).
    pub parent: Option<NodeId>,
    /// Children in attachment order.
    pub children: Vec<NodeId>,
    /// Copy number given at attachment.
    pub copy_number: i32,
    /// Placement inside the parent, set at attachment.
    pub placement: Option<Placement>,
}

/// Everything a build produced, in one serializable bundle.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    /// All solids in creation order.
    pub solids: Vec<RecordedSolid>,
    /// All nodes in creation order.
    pub nodes: Vec<RecordedNode>,
    /// All materials in creation order.
    pub materials: Vec<RecordedMaterial>,
    /// The top (world) node.
    pub top: Option<NodeId>,
}

const BUILTIN_MATERIALS: &[&str] = &[
    "Vacuum",
    "Air",
    "Fe",
    "Iron",
    "Cu",
    "Copper",
    "Quartz",
    "Silicon",
    "Si",
    "StainlessSteel",
    "Tungsten",
    "LeadTungsten",
    "Scintillator",
    "ScintillatorB",
    "scintillator",
    "Aluminum",
];

/// Records toolkit calls as plain data.
#[derive(Debug, Default)]
pub struct SceneRecorder {
    solids: Vec<RecordedSolid>,
    nodes: Vec<RecordedNode>,
    materials: Vec<RecordedMaterial>,
    material_index: HashMap<(String, u8), MaterialId>,
    node_index: HashMap<String, NodeId>,
    top: Option<NodeId>,
}

impl SceneRecorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_solid(&mut self, name: &str, params: SolidParams) -> SolidId {
        let id = SolidId(self.solids.len());
        self.solids.push(RecordedSolid {
            name: name.to_string(),
            params,
        });
        id
    }

    /// Number of solids recorded.
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Number of nodes recorded.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct materials recorded.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// The world node, once created.
    pub fn top(&self) -> Option<NodeId> {
        self.top
    }

    /// A recorded solid by handle.
    pub fn solid(&self, id: SolidId) -> &RecordedSolid {
        &self.solids[id.0]
    }

    /// A recorded node by handle.
    pub fn node(&self, id: NodeId) -> &RecordedNode {
        &self.nodes[id.0]
    }

    /// A recorded material by handle.
    pub fn material(&self, id: MaterialId) -> &RecordedMaterial {
        &self.materials[id.0]
    }

    /// Find a node by volume name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Find a solid by the volume name it was built for.
    pub fn solid_by_name(&self, name: &str) -> Option<SolidId> {
        self.solids
            .iter()
            .position(|s| s.name == name)
            .map(SolidId)
    }

    /// Names of the children attached under the named node.
    pub fn children_of(&self, name: &str) -> Vec<&str> {
        let Some(id) = self.node_by_name(name) else {
            return Vec::new();
        };
        self.nodes[id.0]
            .children
            .iter()
            .map(|child| self.nodes[child.0].name.as_str())
            .collect()
    }

    /// Names of every node in creation order.
    pub fn placed_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    /// Clone the scene into a serializable bundle.
    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            solids: self.solids.clone(),
            nodes: self.nodes.clone(),
            materials: self.materials.clone(),
            top: self.top,
        }
    }
}

impl GeometryToolkit for SceneRecorder {
    type Solid = SolidId;
    type Node = NodeId;
    type Material = MaterialId;

    fn box_solid(
        &mut self,
        name: &str,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(name, SolidParams::Box { dx, dy, dz }))
    }

    fn tube(
        &mut self,
        name: &str,
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi: Option<(f64, f64)>,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(name, SolidParams::Tube { rmin, rmax, dz, phi }))
    }

    fn sphere(
        &mut self,
        name: &str,
        rmin: f64,
        rmax: f64,
        phi: (f64, f64),
        theta: (f64, f64),
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Sphere {
                rmin,
                rmax,
                phi,
                theta,
            },
        ))
    }

    fn cone(
        &mut self,
        name: &str,
        dz: f64,
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        phi: (f64, f64),
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Cone {
                dz,
                rmin1,
                rmax1,
                rmin2,
                rmax2,
                phi,
            },
        ))
    }

    fn trd(
        &mut self,
        name: &str,
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Trd {
                dx1,
                dx2,
                dy1,
                dy2,
                dz,
            },
        ))
    }

    fn trap(&mut self, name: &str, params: &TrapParams) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(name, SolidParams::Trap(*params)))
    }

    fn generic_trap(
        &mut self,
        name: &str,
        dz: f64,
        vertices: &[(f64, f64); 8],
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::GenericTrap {
                dz,
                vertices: vertices.to_vec(),
            },
        ))
    }

    fn parallelepiped(
        &mut self,
        name: &str,
        dx: f64,
        dy: f64,
        dz: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Parallelepiped {
                dx,
                dy,
                dz,
                alpha,
                theta,
                phi,
            },
        ))
    }

    fn polycone(
        &mut self,
        name: &str,
        phi_start: f64,
        phi_delta: f64,
        planes: &[ZPlane],
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Polycone {
                phi_start,
                phi_delta,
                planes: planes.to_vec(),
            },
        ))
    }

    fn polyhedra(
        &mut self,
        name: &str,
        phi_start: f64,
        phi_delta: f64,
        nsides: u32,
        planes: &[ZPlane],
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Polyhedra {
                phi_start,
                phi_delta,
                nsides,
                planes: planes.to_vec(),
            },
        ))
    }

    fn elliptical_tube(
        &mut self,
        name: &str,
        a: f64,
        b: f64,
        dz: f64,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(name, SolidParams::EllipticalTube { a, b, dz }))
    }

    fn paraboloid(
        &mut self,
        name: &str,
        rlo: f64,
        rhi: f64,
        dz: f64,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(name, SolidParams::Paraboloid { rlo, rhi, dz }))
    }

    fn ellipsoid(
        &mut self,
        name: &str,
        dx: f64,
        dy: f64,
        radius: f64,
        z1: f64,
        z2: f64,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Ellipsoid {
                dx,
                dy,
                radius,
                z1,
                z2,
            },
        ))
    }

    fn combine(
        &mut self,
        name: &str,
        op: BooleanOp,
        first: &SolidId,
        second: &SolidId,
        second_transform: &ResolvedTransform,
    ) -> Result<SolidId, BuildError> {
        Ok(self.record_solid(
            name,
            SolidParams::Composite {
                op,
                first: *first,
                second: *second,
                placement: Placement::from(second_transform),
            },
        ))
    }

    fn resolve_material(
        &mut self,
        name: &str,
        transparency: u8,
        definition: Option<&MaterialSpec>,
    ) -> Result<Option<MaterialId>, BuildError> {
        if name == "Component" {
            return Ok(None);
        }
        let key = (name.to_string(), transparency);
        if let Some(&id) = self.material_index.get(&key) {
            return Ok(Some(id));
        }
        let source = if definition.is_some() {
            MaterialSource::UserDefined
        } else if BUILTIN_MATERIALS.contains(&name) || name.starts_with("G4_") {
            MaterialSource::Builtin
        } else {
            tracing::warn!(material = name, "unknown material, substituting a default medium");
            MaterialSource::Fallback
        };
        let id = MaterialId(self.materials.len());
        self.materials.push(RecordedMaterial {
            name: name.to_string(),
            transparency,
            source,
            density: definition.map(|d| d.density),
        });
        self.material_index.insert(key, id);
        Ok(Some(id))
    }

    fn volume_node(
        &mut self,
        name: &str,
        solid: &SolidId,
        material: &MaterialId,
        color: Color,
        visible: bool,
        style: DrawStyle,
    ) -> Result<NodeId, BuildError> {
        let id = NodeId(self.nodes.len());
        self.nodes.push(RecordedNode {
            name: name.to_string(),
            solid: *solid,
            material: *material,
            color,
            visible,
            style,
            parent: None,
            children: Vec::new(),
            copy_number: 1,
            placement: None,
        });
        self.node_index.insert(name.to_string(), id);
        Ok(id)
    }

    fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        copy_number: i32,
        transform: &ResolvedTransform,
    ) -> Result<(), BuildError> {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return Err(BuildError::Toolkit("unknown node handle".to_string()));
        }
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.copy_number = copy_number;
            node.placement = Some(Placement::from(transform));
        }
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    fn world_volume(
        &mut self,
        name: &str,
        half_extents: [f64; 3],
    ) -> Result<NodeId, BuildError> {
        let solid = self.box_solid(name, half_extents[0], half_extents[1], half_extents[2])?;
        let material = self
            .resolve_material("Vacuum", 0, None)?
            .ok_or_else(|| BuildError::Toolkit("vacuum medium unavailable".to_string()))?;
        let gray = Color {
            r: 0xcc,
            g: 0xcc,
            b: 0xcc,
            transparency: 0,
        };
        let node = self.volume_node(name, &solid, &material, gray, false, DrawStyle::Solid)?;
        self.top = Some(node);
        Ok(node)
    }
}
