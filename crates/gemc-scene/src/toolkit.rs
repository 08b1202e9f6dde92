//! The modeling-toolkit seam.
//!
//! The hierarchy builder never talks to a rendering or simulation
//! library directly; it drives this trait. Lengths arrive in the
//! builder's base length unit, angles in degrees. The in-memory
//! [`SceneRecorder`](crate::recording::SceneRecorder) implementation
//! covers tests and inspection; a production backend wraps the real
//! toolkit behind the same calls.

use serde::{Deserialize, Serialize};

use gemc_model::{BooleanOp, Color, DrawStyle, MaterialSpec};

use crate::error::BuildError;
use crate::transform::ResolvedTransform;

/// One z plane of a polycone or polyhedra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZPlane {
    /// Inner radius at this plane.
    pub rmin: f64,
    /// Outer radius at this plane.
    pub rmax: f64,
    /// The plane's z position.
    pub z: f64,
}

/// The eleven general-trapezoid parameters, in GEANT4 order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapParams {
    /// Half-length along z.
    pub dz: f64,
    /// Polar angle of the line joining face centers, degrees.
    pub theta: f64,
    /// Azimuthal angle of that line, degrees.
    pub phi: f64,
    /// Half-length along y at the lower face.
    pub h1: f64,
    /// Half-length along x at the lower face, smaller y edge.
    pub bl1: f64,
    /// Half-length along x at the lower face, larger y edge.
    pub tl1: f64,
    /// Tilt angle of the lower face, degrees.
    pub alpha1: f64,
    /// Half-length along y at the upper face.
    pub h2: f64,
    /// Half-length along x at the upper face, smaller y edge.
    pub bl2: f64,
    /// Half-length along x at the upper face, larger y edge.
    pub tl2: f64,
    /// Tilt angle of the upper face, degrees.
    pub alpha2: f64,
}

/// Capability interface over a 3-D modeling toolkit.
///
/// Implementations hand out opaque handles: solids are cloneable (a
/// `CopyOf` record reuses one), nodes are plain copyable ids. All
/// methods may fail with [`BuildError::Toolkit`] when the backend
/// rejects the request.
pub trait GeometryToolkit {
    /// Handle for a built solid.
    type Solid: Clone;
    /// Handle for a placed volume node.
    type Node: Copy;
    /// Handle for a resolved material.
    type Material;

    /// Box from three half-lengths.
    fn box_solid(&mut self, name: &str, dx: f64, dy: f64, dz: f64)
        -> Result<Self::Solid, BuildError>;

    /// Tube or, with a `(phi_start, phi_end)` range in degrees, a tube
    /// segment.
    fn tube(
        &mut self,
        name: &str,
        rmin: f64,
        rmax: f64,
        dz: f64,
        phi: Option<(f64, f64)>,
    ) -> Result<Self::Solid, BuildError>;

    /// Spherical shell sector; both ranges are `(start, end)` degrees.
    fn sphere(
        &mut self,
        name: &str,
        rmin: f64,
        rmax: f64,
        phi: (f64, f64),
        theta: (f64, f64),
    ) -> Result<Self::Solid, BuildError>;

    /// Cone segment. `dz` comes first, matching the toolkit-side
    /// argument order rather than the record layout.
    #[allow(clippy::too_many_arguments)]
    fn cone(
        &mut self,
        name: &str,
        dz: f64,
        rmin1: f64,
        rmax1: f64,
        rmin2: f64,
        rmax2: f64,
        phi: (f64, f64),
    ) -> Result<Self::Solid, BuildError>;

    /// Simple trapezoid with two x and two y half-lengths.
    fn trd(
        &mut self,
        name: &str,
        dx1: f64,
        dx2: f64,
        dy1: f64,
        dy2: f64,
        dz: f64,
    ) -> Result<Self::Solid, BuildError>;

    /// General trapezoid.
    fn trap(&mut self, name: &str, params: &TrapParams) -> Result<Self::Solid, BuildError>;

    /// Arbitrary eight-vertex solid: half-length in z plus the eight
    /// `(x, y)` vertices, four per z face.
    fn generic_trap(
        &mut self,
        name: &str,
        dz: f64,
        vertices: &[(f64, f64); 8],
    ) -> Result<Self::Solid, BuildError>;

    /// Parallelepiped from three half-lengths and three angles (degrees).
    #[allow(clippy::too_many_arguments)]
    fn parallelepiped(
        &mut self,
        name: &str,
        dx: f64,
        dy: f64,
        dz: f64,
        alpha: f64,
        theta: f64,
        phi: f64,
    ) -> Result<Self::Solid, BuildError>;

    /// Polycone over z planes; phi range given as start and delta degrees.
    fn polycone(
        &mut self,
        name: &str,
        phi_start: f64,
        phi_delta: f64,
        planes: &[ZPlane],
    ) -> Result<Self::Solid, BuildError>;

    /// Polyhedra over z planes with `nsides` flat sides.
    fn polyhedra(
        &mut self,
        name: &str,
        phi_start: f64,
        phi_delta: f64,
        nsides: u32,
        planes: &[ZPlane],
    ) -> Result<Self::Solid, BuildError>;

    /// Elliptical tube with semi-axes `a`, `b` and half-length `dz`.
    fn elliptical_tube(
        &mut self,
        name: &str,
        a: f64,
        b: f64,
        dz: f64,
    ) -> Result<Self::Solid, BuildError>;

    /// Paraboloid of revolution between radii `rlo` and `rhi`.
    fn paraboloid(
        &mut self,
        name: &str,
        rlo: f64,
        rhi: f64,
        dz: f64,
    ) -> Result<Self::Solid, BuildError>;

    /// Ellipsoid with semi-axes `dx`, `dy`, `radius` cut at `z1` and
    /// `z2`. Callers normalize degenerate cuts to the full range first.
    fn ellipsoid(
        &mut self,
        name: &str,
        dx: f64,
        dy: f64,
        radius: f64,
        z1: f64,
        z2: f64,
    ) -> Result<Self::Solid, BuildError>;

    /// Boolean combination. The first operand sits at the identity; the
    /// second is placed by `second_transform` before combining.
    fn combine(
        &mut self,
        name: &str,
        op: BooleanOp,
        first: &Self::Solid,
        second: &Self::Solid,
        second_transform: &ResolvedTransform,
    ) -> Result<Self::Solid, BuildError>;

    /// Resolve a material name at a transparency percentage, honoring a
    /// user definition when one exists. Returns `None` for the
    /// `Component` marker material.
    fn resolve_material(
        &mut self,
        name: &str,
        transparency: u8,
        definition: Option<&MaterialSpec>,
    ) -> Result<Option<Self::Material>, BuildError>;

    /// Create a renderable volume from a solid and a material.
    fn volume_node(
        &mut self,
        name: &str,
        solid: &Self::Solid,
        material: &Self::Material,
        color: Color,
        visible: bool,
        style: DrawStyle,
    ) -> Result<Self::Node, BuildError>;

    /// Attach `child` inside `parent` at the given placement.
    fn attach(
        &mut self,
        parent: Self::Node,
        child: Self::Node,
        copy_number: i32,
        transform: &ResolvedTransform,
    ) -> Result<(), BuildError>;

    /// Create the implicit top volume: an invisible vacuum box.
    fn world_volume(
        &mut self,
        name: &str,
        half_extents: [f64; 3],
    ) -> Result<Self::Node, BuildError>;
}
