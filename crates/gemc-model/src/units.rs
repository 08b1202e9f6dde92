//! Unit conversion for GEMC geometry tables.
//!
//! GEMC records carry per-component unit tags (`5*cm`, `90*deg`). A
//! [`UnitSystem`] fixes a base length and base angle unit and provides the
//! factor and canonical-symbol lookups used everywhere else: parsing,
//! serialization, and transform resolution.

use std::fmt;

use crate::error::ModelError;

/// Supported length units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    /// Millimeter.
    Mm,
    /// Centimeter.
    Cm,
    /// Meter.
    M,
    /// Inch (accepted as `inch` or `inches` on input).
    Inch,
}

impl LengthUnit {
    /// The unit's size in millimeters.
    pub fn in_millimeters(self) -> f64 {
        match self {
            LengthUnit::Mm => 1.0,
            LengthUnit::Cm => 10.0,
            LengthUnit::M => 1000.0,
            LengthUnit::Inch => 25.4,
        }
    }

    /// The canonical symbol written to geometry tables.
    pub fn symbol(self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::M => "m",
            LengthUnit::Inch => "inch",
        }
    }

    /// Parse a length unit symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "mm" => Some(LengthUnit::Mm),
            "cm" => Some(LengthUnit::Cm),
            "m" => Some(LengthUnit::M),
            "inch" | "inches" => Some(LengthUnit::Inch),
            _ => None,
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Supported angle units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    /// Radian.
    Rad,
    /// Milliradian.
    Mrad,
    /// Degree.
    Deg,
}

impl AngleUnit {
    /// The unit's size in radians.
    pub fn in_radians(self) -> f64 {
        match self {
            AngleUnit::Rad => 1.0,
            AngleUnit::Mrad => 1e-3,
            AngleUnit::Deg => std::f64::consts::PI / 180.0,
        }
    }

    /// The canonical symbol written to geometry tables.
    pub fn symbol(self) -> &'static str {
        match self {
            AngleUnit::Rad => "rad",
            AngleUnit::Mrad => "mrad",
            AngleUnit::Deg => "deg",
        }
    }

    /// Parse an angle unit symbol.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "rad" => Some(AngleUnit::Rad),
            "mrad" => Some(AngleUnit::Mrad),
            "deg" => Some(AngleUnit::Deg),
            _ => None,
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// The quantity kind a unit symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    /// Lengths (mm, cm, m, inch).
    Length,
    /// Angles (rad, mrad, deg).
    Angle,
    /// The dimensionless `counts` pseudo-unit.
    Count,
}

/// The `counts` pseudo-unit: factor 1, canonicalizes to itself.
pub const COUNTS: &str = "counts";

/// A base-unit pair defining conversions for one geometry table.
///
/// Length and angle tables are independent; asking to convert between
/// kinds is a caller error, not a silent garbage factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSystem {
    /// Base length unit.
    pub length: LengthUnit,
    /// Base angle unit.
    pub angle: AngleUnit,
}

impl UnitSystem {
    /// The GEMC default bases: centimeters and radians.
    pub const DEFAULT: Self = Self {
        length: LengthUnit::Cm,
        angle: AngleUnit::Rad,
    };

    /// Create a system from explicit bases.
    pub fn new(length: LengthUnit, angle: AngleUnit) -> Self {
        Self { length, angle }
    }

    /// Parse a base-unit description like `"cm rad"` or `"mm deg"`.
    ///
    /// Tokens may come in either order; omitted kinds keep their default.
    pub fn parse(spec: &str) -> Result<Self, ModelError> {
        let mut system = Self::DEFAULT;
        for token in spec.split_whitespace() {
            let token = token.trim_matches('*');
            if let Some(length) = LengthUnit::from_symbol(token) {
                system.length = length;
            } else if let Some(angle) = AngleUnit::from_symbol(token) {
                system.angle = angle;
            } else if token != COUNTS {
                return Err(ModelError::UnknownUnit(token.to_string()));
            }
        }
        if system.length == LengthUnit::Inch {
            tracing::warn!("base unit of inches is not recommended for GEANT4");
        }
        Ok(system)
    }

    /// The kind of a unit symbol.
    pub fn kind_of(&self, symbol: &str) -> Result<UnitKind, ModelError> {
        let symbol = symbol.trim();
        if LengthUnit::from_symbol(symbol).is_some() {
            Ok(UnitKind::Length)
        } else if AngleUnit::from_symbol(symbol).is_some() {
            Ok(UnitKind::Angle)
        } else if symbol == COUNTS {
            Ok(UnitKind::Count)
        } else {
            Err(ModelError::UnknownUnit(symbol.to_string()))
        }
    }

    /// The factor that takes one `symbol` to one base unit of its kind.
    pub fn factor(&self, symbol: &str) -> Result<f64, ModelError> {
        let symbol = symbol.trim();
        if let Some(length) = LengthUnit::from_symbol(symbol) {
            Ok(length.in_millimeters() / self.length.in_millimeters())
        } else if let Some(angle) = AngleUnit::from_symbol(symbol) {
            Ok(angle.in_radians() / self.angle.in_radians())
        } else if symbol == COUNTS {
            Ok(1.0)
        } else {
            Err(ModelError::UnknownUnit(symbol.to_string()))
        }
    }

    /// The canonical (base) symbol for a unit's kind.
    pub fn canonical(&self, symbol: &str) -> Result<&'static str, ModelError> {
        Ok(match self.kind_of(symbol)? {
            UnitKind::Length => self.length.symbol(),
            UnitKind::Angle => self.angle.symbol(),
            UnitKind::Count => COUNTS,
        })
    }

    /// The base symbol for a quantity kind.
    pub fn base_symbol(&self, kind: UnitKind) -> &'static str {
        match kind {
            UnitKind::Length => self.length.symbol(),
            UnitKind::Angle => self.angle.symbol(),
            UnitKind::Count => COUNTS,
        }
    }

    /// Convert `value` from one unit to another of the same kind.
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64, ModelError> {
        if self.kind_of(from)? != self.kind_of(to)? {
            return Err(ModelError::MixedUnits {
                from: from.trim().to_string(),
                to: to.trim().to_string(),
            });
        }
        Ok(value * self.factor(from)? / self.factor(to)?)
    }
}

impl Default for UnitSystem {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn factors_for_cm_base() {
        let sys = UnitSystem::DEFAULT;
        assert!((sys.factor("mm").unwrap() - 0.1).abs() < 1e-12);
        assert!((sys.factor("cm").unwrap() - 1.0).abs() < 1e-12);
        assert!((sys.factor("m").unwrap() - 100.0).abs() < 1e-12);
        assert!((sys.factor("inch").unwrap() - 2.54).abs() < 1e-12);
        assert!((sys.factor("deg").unwrap() - PI / 180.0).abs() < 1e-15);
        assert!((sys.factor("counts").unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn factors_follow_the_base() {
        let sys = UnitSystem::new(LengthUnit::Mm, AngleUnit::Mrad);
        assert!((sys.factor("cm").unwrap() - 10.0).abs() < 1e-12);
        assert!((sys.factor("inch").unwrap() - 25.4).abs() < 1e-12);
        assert!((sys.factor("rad").unwrap() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn convert_round_trips_within_each_kind() {
        let sys = UnitSystem::DEFAULT;
        let lengths = ["mm", "cm", "m", "inch"];
        let angles = ["rad", "mrad", "deg"];
        for a in lengths {
            for b in lengths {
                let out = sys.convert(sys.convert(7.25, a, b).unwrap(), b, a).unwrap();
                assert!((out - 7.25).abs() < 1e-9, "{a}->{b}->{a} gave {out}");
            }
        }
        for a in angles {
            for b in angles {
                let out = sys.convert(sys.convert(0.35, a, b).unwrap(), b, a).unwrap();
                assert!((out - 0.35).abs() < 1e-9, "{a}->{b}->{a} gave {out}");
            }
        }
    }

    #[test]
    fn convert_known_values() {
        let sys = UnitSystem::DEFAULT;
        assert!((sys.convert(1.0, "inch", "mm").unwrap() - 25.4).abs() < 1e-12);
        assert!((sys.convert(180.0, "deg", "rad").unwrap() - PI).abs() < 1e-12);
        assert!((sys.convert(2.0, "counts", "counts").unwrap() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let sys = UnitSystem::DEFAULT;
        assert!(matches!(
            sys.convert(1.0, "cm", "deg"),
            Err(ModelError::MixedUnits { .. })
        ));
    }

    #[test]
    fn unknown_unit_is_an_error() {
        let sys = UnitSystem::DEFAULT;
        assert!(matches!(
            sys.factor("furlong"),
            Err(ModelError::UnknownUnit(_))
        ));
    }

    #[test]
    fn inches_alias() {
        let sys = UnitSystem::DEFAULT;
        assert!((sys.factor("inches").unwrap() - 2.54).abs() < 1e-12);
        assert_eq!(sys.canonical("inches").unwrap(), "cm");
    }

    #[test]
    fn parse_base_spec() {
        let sys = UnitSystem::parse("cm deg").unwrap();
        assert_eq!(sys.length, LengthUnit::Cm);
        assert_eq!(sys.angle, AngleUnit::Deg);

        let sys = UnitSystem::parse("mm").unwrap();
        assert_eq!(sys.length, LengthUnit::Mm);
        assert_eq!(sys.angle, AngleUnit::Rad);

        assert!(UnitSystem::parse("parsec").is_err());
    }

    #[test]
    fn canonical_maps_to_base_of_kind() {
        let sys = UnitSystem::new(LengthUnit::M, AngleUnit::Deg);
        assert_eq!(sys.canonical("mm").unwrap(), "m");
        assert_eq!(sys.canonical("mrad").unwrap(), "deg");
        assert_eq!(sys.canonical("counts").unwrap(), "counts");
    }
}
