//! Placement transforms resolved from records.
//!
//! Convention used throughout: a transform maps child-local coordinates
//! into the mother frame, so a child point `p` lands at
//! `rotation * p + translation`. Every composite-operand formula below
//! holds under this convention.

use gemc_model::{GeometryRecord, UnitSystem};
use nalgebra::{Rotation3, Vector3};

use crate::error::BuildError;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

/// The six axis sequences a rotation field can select.
///
/// The i-th rotation angle applies about the i-th axis letter, each
/// successive rotation composed on the left, so `xyz` means rotate
/// about x first, then y, then z in the fixed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
    /// x, then y, then z (the default).
    #[default]
    Xyz,
    /// x, then z, then y.
    Xzy,
    /// y, then x, then z.
    Yxz,
    /// y, then z, then x.
    Yzx,
    /// z, then x, then y.
    Zxy,
    /// z, then y, then x.
    Zyx,
}

impl RotationOrder {
    /// Parse an order string like `zxy`.
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        match text.trim() {
            "" | "xyz" => Ok(RotationOrder::Xyz),
            "xzy" => Ok(RotationOrder::Xzy),
            "yxz" => Ok(RotationOrder::Yxz),
            "yzx" => Ok(RotationOrder::Yzx),
            "zxy" => Ok(RotationOrder::Zxy),
            "zyx" => Ok(RotationOrder::Zyx),
            other => Err(BuildError::UnknownRotationOrder(other.to_string())),
        }
    }

    /// The axes in application order.
    pub fn axes(self) -> [Axis; 3] {
        match self {
            RotationOrder::Xyz => [Axis::X, Axis::Y, Axis::Z],
            RotationOrder::Xzy => [Axis::X, Axis::Z, Axis::Y],
            RotationOrder::Yxz => [Axis::Y, Axis::X, Axis::Z],
            RotationOrder::Yzx => [Axis::Y, Axis::Z, Axis::X],
            RotationOrder::Zxy => [Axis::Z, Axis::X, Axis::Y],
            RotationOrder::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }

    /// The order as it appears in the rotation field.
    pub fn as_str(self) -> &'static str {
        match self {
            RotationOrder::Xyz => "xyz",
            RotationOrder::Xzy => "xzy",
            RotationOrder::Yxz => "yxz",
            RotationOrder::Yzx => "yzx",
            RotationOrder::Zxy => "zxy",
            RotationOrder::Zyx => "zyx",
        }
    }
}

fn elementary(axis: Axis, angle: f64) -> Rotation3<f64> {
    match axis {
        Axis::X => Rotation3::from_axis_angle(&Vector3::x_axis(), angle),
        Axis::Y => Rotation3::from_axis_angle(&Vector3::y_axis(), angle),
        Axis::Z => Rotation3::from_axis_angle(&Vector3::z_axis(), angle),
    }
}

/// Compose the rotation for three angles (radians) under an axis order.
pub fn compose_rotation(order: RotationOrder, angles: [f64; 3]) -> Rotation3<f64> {
    let mut rotation = Rotation3::identity();
    for (axis, angle) in order.axes().iter().zip(angles) {
        rotation = elementary(*axis, angle) * rotation;
    }
    rotation
}

/// A resolved placement: rotation then translation into the mother frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedTransform {
    /// Offset of the child origin in the mother frame.
    pub translation: Vector3<f64>,
    /// Maps child-local directions into the mother frame.
    pub rotation: Rotation3<f64>,
}

impl ResolvedTransform {
    /// The identity placement.
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: Rotation3::identity(),
        }
    }

    /// Resolve a record's position and rotation fields. Positions come
    /// out in the system's base length unit, angles are composed in
    /// radians following the record's axis order.
    pub fn resolve(record: &GeometryRecord, system: &UnitSystem) -> Result<Self, BuildError> {
        let length = system.length.symbol();
        let translation = Vector3::new(
            record.position.converted(0, length, system)?,
            record.position.converted(1, length, system)?,
            record.position.converted(2, length, system)?,
        );
        let order = match &record.rotation_order {
            None => RotationOrder::default(),
            Some(text) => RotationOrder::parse(text)?,
        };
        let angles = [
            record.rotation.converted(0, "rad", system)?,
            record.rotation.converted(1, "rad", system)?,
            record.rotation.converted(2, "rad", system)?,
        ];
        Ok(Self {
            translation,
            rotation: compose_rotation(order, angles),
        })
    }

    /// Where a child-local point lands in the mother frame.
    pub fn apply(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation * point + self.translation
    }

    /// Re-express this placement in `base`'s local frame. Used for
    /// relative-mode boolean operands, where both operands are authored
    /// relative to the shared mother but the combination happens in the
    /// first operand's frame.
    pub fn relative_to(&self, base: &ResolvedTransform) -> ResolvedTransform {
        let inverse = base.rotation.inverse();
        ResolvedTransform {
            translation: inverse * (self.translation - base.translation),
            rotation: inverse * self.rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemc_model::{GeometryRecord, UnitList, UnitSystem};
    use std::f64::consts::FRAC_PI_2;

    fn assert_matrix(rotation: &Rotation3<f64>, expected: [[f64; 3]; 3]) {
        for (i, row) in expected.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                assert!(
                    (rotation.matrix()[(i, j)] - value).abs() < 1e-12,
                    "entry ({i},{j}): {} vs {value}",
                    rotation.matrix()[(i, j)]
                );
            }
        }
    }

    #[test]
    fn order_parsing() {
        assert_eq!(RotationOrder::parse("zxy").unwrap(), RotationOrder::Zxy);
        assert_eq!(RotationOrder::parse("").unwrap(), RotationOrder::Xyz);
        for order in [
            RotationOrder::Xyz,
            RotationOrder::Xzy,
            RotationOrder::Yxz,
            RotationOrder::Yzx,
            RotationOrder::Zxy,
            RotationOrder::Zyx,
        ] {
            assert_eq!(RotationOrder::parse(order.as_str()).unwrap(), order);
        }
        assert!(matches!(
            RotationOrder::parse("xxy"),
            Err(BuildError::UnknownRotationOrder(_))
        ));
    }

    #[test]
    fn single_axis_rotation_moves_y_to_z() {
        let rot = compose_rotation(RotationOrder::Xyz, [FRAC_PI_2, 0.0, 0.0]);
        let moved = rot * Vector3::new(0.0, 1.0, 0.0);
        assert!((moved - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn composition_order_matters() {
        // (90, 90, 0) degrees under xyz is Ry(90)*Rx(90); under zyx it
        // is Ry(90)*Rz(90). Both have closed forms and they differ.
        let xyz = compose_rotation(RotationOrder::Xyz, [FRAC_PI_2, FRAC_PI_2, 0.0]);
        let zyx = compose_rotation(RotationOrder::Zyx, [FRAC_PI_2, FRAC_PI_2, 0.0]);

        assert_matrix(&xyz, [[0.0, 1.0, 0.0], [0.0, 0.0, -1.0], [-1.0, 0.0, 0.0]]);
        assert_matrix(&zyx, [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);

        let mut max_diff: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                max_diff = max_diff.max((xyz.matrix()[(i, j)] - zyx.matrix()[(i, j)]).abs());
            }
        }
        assert!(max_diff > 0.5);
    }

    #[test]
    fn resolve_converts_units_and_order() {
        let mut rec = GeometryRecord::new("probe");
        rec.position = UnitList::uniform(vec![10.0, 0.0, 25.0], "mm");
        rec.rotation = UnitList::uniform(vec![90.0, 0.0, 0.0], "deg");
        rec.rotation_order = Some("zxy".to_string());

        let sys = UnitSystem::DEFAULT;
        let resolved = ResolvedTransform::resolve(&rec, &sys).unwrap();
        assert!((resolved.translation - Vector3::new(1.0, 0.0, 2.5)).norm() < 1e-12);
        // First angle applies about z under zxy.
        let moved = resolved.rotation * Vector3::new(1.0, 0.0, 0.0);
        assert!((moved - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-12);

        rec.rotation_order = Some("abc".to_string());
        assert!(matches!(
            ResolvedTransform::resolve(&rec, &sys),
            Err(BuildError::UnknownRotationOrder(_))
        ));
    }

    #[test]
    fn relative_placement_subtracts_base_translation() {
        let a = ResolvedTransform {
            translation: Vector3::new(2.0, 0.0, 0.0),
            rotation: Rotation3::identity(),
        };
        let b = ResolvedTransform {
            translation: Vector3::new(5.0, 0.0, 0.0),
            rotation: Rotation3::identity(),
        };
        let net = b.relative_to(&a);
        assert!((net.translation - Vector3::new(3.0, 0.0, 0.0)).norm() < 1e-12);
        assert_matrix(
            &net.rotation,
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        );
    }

    #[test]
    fn relative_placement_rotates_into_base_frame() {
        // Base rotated 90 degrees about z; an offset of +y in the mother
        // is +x in the base's local frame.
        let a = ResolvedTransform {
            translation: Vector3::zeros(),
            rotation: compose_rotation(RotationOrder::Xyz, [0.0, 0.0, FRAC_PI_2]),
        };
        let b = ResolvedTransform {
            translation: Vector3::new(0.0, 1.0, 0.0),
            rotation: Rotation3::identity(),
        };
        let net = b.relative_to(&a);
        assert!((net.translation - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn apply_rotates_then_translates() {
        let t = ResolvedTransform {
            translation: Vector3::new(0.0, 0.0, 5.0),
            rotation: compose_rotation(RotationOrder::Xyz, [0.0, 0.0, FRAC_PI_2]),
        };
        let p = t.apply(Vector3::new(1.0, 0.0, 0.0));
        assert!((p - Vector3::new(0.0, 1.0, 5.0)).norm() < 1e-12);
    }
}
