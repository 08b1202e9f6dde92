//! Shape-type descriptors.
//!
//! The `type` field of a record is kept verbatim and parsed on demand:
//! a primitive solid kind, a boolean `Operation:`, a `CopyOf`, or the
//! `Component` marker for operand-only records.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static OPERATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Operation:([~@])?\s*(\w+)\s*([-+*])\s*(\w+)\s*$").unwrap());

static COPY_OF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^CopyOf (.+)$").unwrap());

/// The primitive solid kinds a record can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolidKind {
    /// Box with three half-lengths.
    Box,
    /// Tube or tube segment.
    Tube,
    /// Sphere shell sector.
    Sphere,
    /// Cone segment (GEANT4 `Cons`).
    Cons,
    /// Simple trapezoid (GEANT4 `Trd`).
    Trd,
    /// General trapezoid (GEANT4 `G4Trap`, eleven parameters).
    Trap,
    /// Arbitrary eight-vertex solid (GEANT4 `G4GenericTrap`).
    GenericTrap,
    /// Parallelepiped.
    Parallelepiped,
    /// Polycone built from z planes.
    Polycone,
    /// Polyhedra built from z planes (`Pgon`).
    Polyhedra,
    /// Elliptical tube (`Eltu`).
    EllipticalTube,
    /// Paraboloid of revolution.
    Paraboloid,
    /// Ellipsoid with optional z cuts.
    Ellipsoid,
}

impl SolidKind {
    /// Parse a GEMC shape name, accepting the aliases the tables use.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "Box" => Some(SolidKind::Box),
            "Tube" => Some(SolidKind::Tube),
            "Sphere" => Some(SolidKind::Sphere),
            "Cons" => Some(SolidKind::Cons),
            "Trd" => Some(SolidKind::Trd),
            "G4Trap" => Some(SolidKind::Trap),
            "G4GenericTrap" => Some(SolidKind::GenericTrap),
            "Parallelepiped" => Some(SolidKind::Parallelepiped),
            "Polycone" => Some(SolidKind::Polycone),
            "Pgon" | "Polyhedra" => Some(SolidKind::Polyhedra),
            "EllipticalTube" | "Eltu" => Some(SolidKind::EllipticalTube),
            "Paraboloid" => Some(SolidKind::Paraboloid),
            "Ellipsoid" => Some(SolidKind::Ellipsoid),
            _ => None,
        }
    }

    /// The canonical GEMC table name.
    pub fn gemc_name(self) -> &'static str {
        match self {
            SolidKind::Box => "Box",
            SolidKind::Tube => "Tube",
            SolidKind::Sphere => "Sphere",
            SolidKind::Cons => "Cons",
            SolidKind::Trd => "Trd",
            SolidKind::Trap => "G4Trap",
            SolidKind::GenericTrap => "G4GenericTrap",
            SolidKind::Parallelepiped => "Parallelepiped",
            SolidKind::Polycone => "Polycone",
            SolidKind::Polyhedra => "Polyhedra",
            SolidKind::EllipticalTube => "EllipticalTube",
            SolidKind::Paraboloid => "Paraboloid",
            SolidKind::Ellipsoid => "Ellipsoid",
        }
    }
}

impl fmt::Display for SolidKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gemc_name())
    }
}

/// Boolean combination operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOp {
    /// `+`
    Union,
    /// `-`
    Subtraction,
    /// `*`
    Intersection,
}

impl BooleanOp {
    /// The operator symbol used in `Operation:` descriptors.
    pub fn symbol(self) -> char {
        match self {
            BooleanOp::Union => '+',
            BooleanOp::Subtraction => '-',
            BooleanOp::Intersection => '*',
        }
    }

    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(BooleanOp::Union),
            "-" => Some(BooleanOp::Subtraction),
            "*" => Some(BooleanOp::Intersection),
            _ => None,
        }
    }
}

/// A parsed `Operation:` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSpec {
    /// True for `Operation:@`: both operand placements are interpreted
    /// relative to the mother and re-expressed in the first operand's
    /// frame. (`Operation:~` parses but keeps absolute placement.)
    pub relative: bool,
    /// Name of the first operand record.
    pub first: String,
    /// The combination operator.
    pub op: BooleanOp,
    /// Name of the second operand record.
    pub second: String,
}

/// A record's `type` field, decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeType {
    /// One of the primitive solids.
    Primitive(SolidKind),
    /// A boolean combination of two other records.
    Operation(OperationSpec),
    /// Reuse of another record's solid.
    CopyOf(String),
    /// Operand-only marker; never built or placed by itself.
    Component,
    /// Anything the dispatcher does not know. Reported at build time.
    Unknown(String),
}

impl ShapeType {
    /// Decode a `type` field string.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text == "Component" {
            return ShapeType::Component;
        }
        if text.starts_with("Operation:") {
            if let Some(caps) = OPERATION_RE.captures(text) {
                let relative = caps.get(1).map(|m| m.as_str()) == Some("@");
                if let Some(op) = BooleanOp::from_symbol(&caps[3]) {
                    return ShapeType::Operation(OperationSpec {
                        relative,
                        first: caps[2].to_string(),
                        op,
                        second: caps[4].to_string(),
                    });
                }
            }
            return ShapeType::Unknown(text.to_string());
        }
        if let Some(caps) = COPY_OF_RE.captures(text) {
            return ShapeType::CopyOf(caps[1].trim().to_string());
        }
        match SolidKind::parse(text) {
            Some(kind) => ShapeType::Primitive(kind),
            None => ShapeType::Unknown(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_and_aliases() {
        assert_eq!(ShapeType::parse("Box"), ShapeType::Primitive(SolidKind::Box));
        assert_eq!(
            ShapeType::parse("Eltu"),
            ShapeType::Primitive(SolidKind::EllipticalTube)
        );
        assert_eq!(
            ShapeType::parse("Pgon"),
            ShapeType::Primitive(SolidKind::Polyhedra)
        );
        assert_eq!(
            ShapeType::parse("G4Trap"),
            ShapeType::Primitive(SolidKind::Trap)
        );
    }

    #[test]
    fn operation_markers() {
        let plain = ShapeType::parse("Operation: body - hole");
        assert_eq!(
            plain,
            ShapeType::Operation(OperationSpec {
                relative: false,
                first: "body".to_string(),
                op: BooleanOp::Subtraction,
                second: "hole".to_string(),
            })
        );

        let relative = ShapeType::parse("Operation:@ body + cap");
        match relative {
            ShapeType::Operation(spec) => {
                assert!(spec.relative);
                assert_eq!(spec.op, BooleanOp::Union);
            }
            other => panic!("expected Operation, got {other:?}"),
        }

        // Tilde parses but keeps absolute placement.
        let tilde = ShapeType::parse("Operation:~ a * b");
        match tilde {
            ShapeType::Operation(spec) => {
                assert!(!spec.relative);
                assert_eq!(spec.op, BooleanOp::Intersection);
            }
            other => panic!("expected Operation, got {other:?}"),
        }
    }

    #[test]
    fn operation_without_spaces() {
        match ShapeType::parse("Operation:@body-hole") {
            ShapeType::Operation(spec) => {
                assert_eq!(spec.first, "body");
                assert_eq!(spec.second, "hole");
                assert_eq!(spec.op, BooleanOp::Subtraction);
            }
            other => panic!("expected Operation, got {other:?}"),
        }
    }

    #[test]
    fn copy_of() {
        assert_eq!(
            ShapeType::parse("CopyOf paddle_1"),
            ShapeType::CopyOf("paddle_1".to_string())
        );
    }

    #[test]
    fn component_marker() {
        assert_eq!(ShapeType::parse("Component"), ShapeType::Component);
    }

    #[test]
    fn unknown_shapes_are_preserved() {
        assert_eq!(
            ShapeType::parse("Torus"),
            ShapeType::Unknown("Torus".to_string())
        );
        assert!(matches!(
            ShapeType::parse("Operation: lonely +"),
            ShapeType::Unknown(_)
        ));
    }
}
