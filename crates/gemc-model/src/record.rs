//! The GEMC geometry record: one volume, one pipe-delimited line.
//!
//! A record is eighteen fields in fixed order. Numeric fields (position,
//! rotation, dimensions) are lists of `magnitude*unit` tokens; the rotation
//! field may carry a leading `ordered: <seq>` selecting the axis order.
//! Parsing is row-shaped and header-agnostic: any source that can produce
//! the eighteen field strings (text table, database row) goes through
//! [`GeometryRecord::from_fields`].

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::units::{UnitKind, UnitSystem};

/// Field names in positional order, matching the GEMC table columns.
pub const FIELD_NAMES: [&str; 18] = [
    "name",
    "mother",
    "description",
    "pos",
    "rot",
    "col",
    "type",
    "dimensions",
    "material",
    "magfield",
    "ncopy",
    "pMany",
    "exist",
    "visible",
    "style",
    "sensitivity",
    "hitType",
    "identity",
];

/// How numeric fields are interpreted while parsing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseOptions {
    /// Base units for tags that are omitted and for forced conversion.
    pub system: UnitSystem,
    /// Convert every magnitude into the base unit at parse time and
    /// canonicalize its tag.
    pub force_unit_conversion: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            system: UnitSystem::DEFAULT,
            force_unit_conversion: false,
        }
    }
}

// ===== Dimensioned value lists =====

/// A list of magnitudes with one unit tag per entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitList {
    /// The magnitudes.
    pub values: Vec<f64>,
    /// One unit symbol per magnitude.
    pub units: Vec<String>,
}

impl UnitList {
    /// An empty list.
    pub fn empty() -> Self {
        Self {
            values: Vec::new(),
            units: Vec::new(),
        }
    }

    /// A list with one tag per value. Lengths must agree.
    pub fn new(values: Vec<f64>, units: Vec<String>) -> Result<Self, ModelError> {
        if values.len() != units.len() {
            return Err(ModelError::parse(
                "units",
                format!("{} values but {} unit tags", values.len(), units.len()),
            ));
        }
        Ok(Self { values, units })
    }

    /// A list with a single tag broadcast over every value.
    pub fn uniform(values: Vec<f64>, unit: &str) -> Self {
        let units = vec![unit.to_string(); values.len()];
        Self { values, units }
    }

    /// Three zeros tagged with `unit`.
    pub fn zeros3(unit: &str) -> Self {
        Self::uniform(vec![0.0, 0.0, 0.0], unit)
    }

    /// Parse a GEMC value string like `"2.5*cm 0*deg 12"`.
    ///
    /// Tokens without a `*` must be bare numbers and get the base unit of
    /// `kind`. Tags are checked against the unit tables; in forced mode
    /// magnitudes are converted to base and tags canonicalized.
    pub fn parse(
        text: &str,
        kind: UnitKind,
        options: &ParseOptions,
        field: &'static str,
    ) -> Result<Self, ModelError> {
        let mut values = Vec::new();
        let mut units = Vec::new();
        for token in text.split_whitespace() {
            match token.split_once('*') {
                None => {
                    let value: f64 = token.parse().map_err(|_| {
                        ModelError::parse(field, format!("'{token}' is not a number"))
                    })?;
                    values.push(value);
                    units.push(options.system.base_symbol(kind).to_string());
                }
                Some((magnitude, unit)) => {
                    let value: f64 = magnitude.parse().map_err(|_| {
                        ModelError::parse(field, format!("bad magnitude in '{token}'"))
                    })?;
                    // Reject unknown tags here rather than at first use.
                    options.system.kind_of(unit)?;
                    if options.force_unit_conversion {
                        values.push(value * options.system.factor(unit)?);
                        units.push(options.system.canonical(unit)?.to_string());
                    } else {
                        let unit = if unit == "inches" { "inch" } else { unit };
                        values.push(value);
                        units.push(unit.to_string());
                    }
                }
            }
        }
        Ok(Self { values, units })
    }

    /// Render as `value*unit` tokens joined by spaces.
    pub fn to_gemc(&self) -> String {
        self.values
            .iter()
            .zip(&self.units)
            .map(|(v, u)| format!("{v}*{u}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value and tag at `index`.
    pub fn get(&self, index: usize) -> Option<(f64, &str)> {
        Some((*self.values.get(index)?, self.units.get(index)?.as_str()))
    }

    /// Convert the entry at `index` into `target` units.
    pub fn converted(
        &self,
        index: usize,
        target: &str,
        system: &UnitSystem,
    ) -> Result<f64, ModelError> {
        let (value, unit) = self.get(index).ok_or_else(|| {
            ModelError::parse("units", format!("no entry at index {index}"))
        })?;
        system.convert(value, unit, target)
    }
}

// ===== Rotation field =====

/// Parse the rotation field: optional `ordered: <seq>` prefix, then the
/// three angles.
///
/// A single bare `0` is tolerated as "no rotation" with a diagnostic; any
/// other single token is a parse error.
pub fn parse_rotation(
    text: &str,
    options: &ParseOptions,
) -> Result<(UnitList, Option<String>), ModelError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.first() == Some(&"ordered:") {
        let order = tokens
            .get(1)
            .ok_or_else(|| ModelError::parse("rot", "'ordered:' without an axis sequence"))?;
        let rest = tokens[2..].join(" ");
        let angles = UnitList::parse(&rest, UnitKind::Angle, options, "rot")?;
        return Ok((angles, Some(order.to_string())));
    }
    if tokens.len() == 1 {
        if tokens[0] == "0" {
            tracing::warn!("rotation with a single '0' entry, treating as no rotation");
            return Ok((
                UnitList::zeros3(options.system.angle.symbol()),
                None,
            ));
        }
        return Err(ModelError::parse(
            "rot",
            format!("single entry '{}' is not a rotation", tokens[0]),
        ));
    }
    let angles = UnitList::parse(text, UnitKind::Angle, options, "rot")?;
    Ok((angles, None))
}

// ===== The record itself =====

/// Wireframe or solid rendering for a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawStyle {
    /// Outline only (style flag 0).
    Wireframe,
    /// Filled surfaces (style flag 1).
    Solid,
}

impl DrawStyle {
    /// The integer flag written to tables.
    pub fn flag(self) -> u8 {
        match self {
            DrawStyle::Wireframe => 0,
            DrawStyle::Solid => 1,
        }
    }

    /// Parse the table flag.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag.trim() {
            "0" => Some(DrawStyle::Wireframe),
            "1" => Some(DrawStyle::Solid),
            _ => None,
        }
    }
}

/// One GEMC geometry volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    /// Volume name, unique within a store.
    pub name: String,
    /// Name of the containing volume.
    pub mother: String,
    /// Free-text description.
    pub description: String,
    /// Placement relative to the mother's origin (three entries).
    pub position: UnitList,
    /// Rotation angles (three entries).
    pub rotation: UnitList,
    /// Axis order for the rotation; `None` means the default `xyz`.
    pub rotation_order: Option<String>,
    /// Color as six hex digits plus optional transparency digit.
    pub color: String,
    /// Shape descriptor string (`Box`, `Operation:@ a - b`, `CopyOf x`, ...).
    pub shape_type: String,
    /// Shape dimensions; layout depends on the shape kind.
    pub dimensions: UnitList,
    /// Material name, or the `Component` marker.
    pub material: String,
    /// Magnetic field name, or `no`.
    pub magnetic_field: String,
    /// Copy number used when attaching the placed node.
    pub copy_number: i32,
    /// Placement multiplicity flag (carried, not interpreted here).
    pub multiplicity: i32,
    /// When false the shape is built but the volume is never placed.
    pub exists: bool,
    /// Visibility flag passed through to the toolkit.
    pub visible: bool,
    /// Render style passed through to the toolkit.
    pub style: DrawStyle,
    /// Sensitive-detector assignment (opaque here).
    pub sensitivity: String,
    /// Hit-type assignment (opaque here).
    pub hit_type: String,
    /// Identity string (opaque here).
    pub identity: String,
}

impl Default for GeometryRecord {
    fn default() -> Self {
        let sys = UnitSystem::DEFAULT;
        Self {
            name: "unknown".to_string(),
            mother: "root".to_string(),
            description: String::new(),
            position: UnitList::zeros3(sys.length.symbol()),
            rotation: UnitList::zeros3(sys.angle.symbol()),
            rotation_order: None,
            color: "000000".to_string(),
            shape_type: String::new(),
            dimensions: UnitList::empty(),
            material: "Vacuum".to_string(),
            magnetic_field: "no".to_string(),
            copy_number: 1,
            multiplicity: 1,
            exists: true,
            visible: true,
            style: DrawStyle::Solid,
            sensitivity: "no".to_string(),
            hit_type: String::new(),
            identity: String::new(),
        }
    }
}

fn parse_flag(field: &'static str, text: &str) -> Result<bool, ModelError> {
    match text.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(ModelError::parse(
            field,
            format!("expected 0 or 1, got '{other}'"),
        )),
    }
}

fn parse_int(field: &'static str, text: &str) -> Result<i32, ModelError> {
    text.trim()
        .parse()
        .map_err(|_| ModelError::parse(field, format!("'{text}' is not an integer")))
}

impl GeometryRecord {
    /// A record with the given name and defaults everywhere else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a record from the eighteen positional field strings.
    ///
    /// This is the row-shaped input used by both the text importer and
    /// database rows. Every field must parse.
    pub fn from_fields(fields: &[&str], options: &ParseOptions) -> Result<Self, ModelError> {
        if fields.len() != FIELD_NAMES.len() {
            return Err(ModelError::parse(
                "record",
                format!("expected {} fields, got {}", FIELD_NAMES.len(), fields.len()),
            ));
        }
        let (rotation, rotation_order) = parse_rotation(fields[4], options)?;
        let style = DrawStyle::from_flag(fields[14])
            .ok_or_else(|| ModelError::parse("style", format!("'{}' is not 0 or 1", fields[14])))?;
        Ok(Self {
            name: fields[0].to_string(),
            mother: fields[1].to_string(),
            description: fields[2].to_string(),
            position: UnitList::parse(fields[3], UnitKind::Length, options, "pos")?,
            rotation,
            rotation_order,
            color: fields[5].to_string(),
            shape_type: fields[6].to_string(),
            dimensions: UnitList::parse(fields[7], UnitKind::Length, options, "dimensions")?,
            material: fields[8].to_string(),
            magnetic_field: fields[9].to_string(),
            copy_number: parse_int("ncopy", fields[10])?,
            multiplicity: parse_int("pMany", fields[11])?,
            exists: parse_flag("exist", fields[12])?,
            visible: parse_flag("visible", fields[13])?,
            style,
            sensitivity: fields[15].to_string(),
            hit_type: fields[16].to_string(),
            identity: fields[17].to_string(),
        })
    }

    /// Build a record from up to eighteen field strings, substituting the
    /// default for every field that fails to parse and logging each
    /// substitution. Malformed lines are kept, never dropped.
    pub fn from_fields_lossy(fields: &[&str], options: &ParseOptions) -> Self {
        let mut record = Self::default();
        if fields.len() != FIELD_NAMES.len() {
            tracing::warn!(
                got = fields.len(),
                "record has the wrong field count, missing fields get defaults"
            );
        }
        let field = |i: usize| fields.get(i).copied();

        if let Some(v) = field(0) {
            record.name = v.to_string();
        }
        if let Some(v) = field(1) {
            record.mother = v.to_string();
        }
        if let Some(v) = field(2) {
            record.description = v.to_string();
        }
        if let Some(v) = field(3) {
            match UnitList::parse(v, UnitKind::Length, options, "pos") {
                Ok(pos) => record.position = pos,
                Err(e) => tracing::warn!(record = %record.name, "bad position: {e}"),
            }
        }
        if let Some(v) = field(4) {
            match parse_rotation(v, options) {
                Ok((rot, order)) => {
                    record.rotation = rot;
                    record.rotation_order = order;
                }
                Err(e) => tracing::warn!(record = %record.name, "bad rotation: {e}"),
            }
        }
        if let Some(v) = field(5) {
            record.color = v.to_string();
        }
        if let Some(v) = field(6) {
            record.shape_type = v.to_string();
        }
        if let Some(v) = field(7) {
            match UnitList::parse(v, UnitKind::Length, options, "dimensions") {
                Ok(dims) => record.dimensions = dims,
                Err(e) => tracing::warn!(record = %record.name, "bad dimensions: {e}"),
            }
        }
        if let Some(v) = field(8) {
            record.material = v.to_string();
        }
        if let Some(v) = field(9) {
            record.magnetic_field = v.to_string();
        }
        if let Some(v) = field(10) {
            match parse_int("ncopy", v) {
                Ok(n) => record.copy_number = n,
                Err(e) => tracing::warn!(record = %record.name, "{e}"),
            }
        }
        if let Some(v) = field(11) {
            match parse_int("pMany", v) {
                Ok(n) => record.multiplicity = n,
                Err(e) => tracing::warn!(record = %record.name, "{e}"),
            }
        }
        if let Some(v) = field(12) {
            match parse_flag("exist", v) {
                Ok(b) => record.exists = b,
                Err(e) => tracing::warn!(record = %record.name, "{e}"),
            }
        }
        if let Some(v) = field(13) {
            match parse_flag("visible", v) {
                Ok(b) => record.visible = b,
                Err(e) => tracing::warn!(record = %record.name, "{e}"),
            }
        }
        if let Some(v) = field(14) {
            match DrawStyle::from_flag(v) {
                Some(s) => record.style = s,
                None => tracing::warn!(record = %record.name, "bad style flag '{v}'"),
            }
        }
        if let Some(v) = field(15) {
            record.sensitivity = v.to_string();
        }
        if let Some(v) = field(16) {
            record.hit_type = v.to_string();
        }
        if let Some(v) = field(17) {
            record.identity = v.to_string();
        }
        record
    }

    /// The rotation field rendered with its `ordered:` prefix when one is
    /// set.
    fn rotation_field(&self) -> String {
        match &self.rotation_order {
            Some(order) => format!("ordered: {order} {}", self.rotation.to_gemc()),
            None => self.rotation.to_gemc(),
        }
    }

    /// The eighteen rendered field strings in positional order.
    ///
    /// This is the row-shaped output for database writers and the text
    /// serializer alike.
    pub fn to_fields(&self) -> [String; 18] {
        [
            self.name.clone(),
            self.mother.clone(),
            self.description.clone(),
            self.position.to_gemc(),
            self.rotation_field(),
            self.color.clone(),
            self.shape_type.clone(),
            self.dimensions.to_gemc(),
            self.material.clone(),
            self.magnetic_field.clone(),
            self.copy_number.to_string(),
            self.multiplicity.to_string(),
            u8::from(self.exists).to_string(),
            u8::from(self.visible).to_string(),
            self.style.flag().to_string(),
            self.sensitivity.clone(),
            self.hit_type.clone(),
            self.identity.clone(),
        ]
    }

    /// Render the record as one pipe-delimited table line.
    pub fn serialize(&self) -> String {
        self.to_fields().join(" | ")
    }

    /// Check every field for structural sanity, reporting the first
    /// failure by field name.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.position.len() != 3 {
            return Err(ModelError::parse(
                "pos",
                format!("expected 3 entries, got {}", self.position.len()),
            ));
        }
        if self.position.units.len() != self.position.values.len() {
            return Err(ModelError::parse("pos", "unit tag count mismatch"));
        }
        if self.rotation.len() != 3 {
            return Err(ModelError::parse(
                "rot",
                format!("expected 3 entries, got {}", self.rotation.len()),
            ));
        }
        if self.rotation.units.len() != self.rotation.values.len() {
            return Err(ModelError::parse("rot", "unit tag count mismatch"));
        }
        crate::color::Color::parse(&self.color)?;
        if self.dimensions.units.len() != self.dimensions.values.len() {
            return Err(ModelError::parse("dimensions", "unit tag count mismatch"));
        }
        Ok(())
    }
}

// ===== Trapezoid survey helper =====

/// G4Trap placement parameters computed from survey points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyTrapezoid {
    /// Center x of the trapezoid.
    pub center_x: f64,
    /// Center z of the trapezoid.
    pub center_z: f64,
    /// Skew angle of the center line with respect to z.
    pub skew_angle: f64,
    /// Half width at the front face.
    pub half_width_front: f64,
    /// Half width at the back face.
    pub half_width_back: f64,
}

/// Compute G4Trap parameters for a trapezoid with its front face at
/// `z = front` and the given depth, from a left (`p1`) and right (`p2`)
/// edge point with their angles to the z axis.
pub fn trapezoid_from_survey(
    front: f64,
    depth: f64,
    p1x: f64,
    p1z: f64,
    theta1: f64,
    p2x: f64,
    p2z: f64,
    theta2: f64,
) -> SurveyTrapezoid {
    let z1 = front;
    let z2 = front + depth;

    let dx1 = ((p2x - p1x) - (z1 - p1z) * theta1.tan() + (z1 - p2z) * theta2.tan()) / 2.0;
    let dx2 = ((p2x - p1x) - (z2 - p1z) * theta1.tan() + (z2 - p2z) * theta2.tan()) / 2.0;

    // Edge lines evaluated at the mid plane, used only for the sanity check.
    let mid = (z1 + z2) / 2.0;
    let pp1x = p1x + (mid - p1z) * theta1.tan();
    let pp2x = p2x + (mid - p2z) * theta2.tan();

    let c1x = p2x + (z1 - p2z) * theta2.tan() - dx1;
    let c2x = p2x + (z2 - p2z) * theta2.tan() - dx2;

    let center_x = (c1x + c2x) / 2.0;
    let center_z = front + depth / 2.0;
    let skew_angle = (c2x - c1x).atan2(depth);

    if dx1 <= 0.0 || dx2 <= 0.0 || pp1x > pp2x {
        tracing::warn!(
            dx1,
            dx2,
            pp1x,
            pp2x,
            "probable problem with trapezoid survey inputs"
        );
    }

    SurveyTrapezoid {
        center_x,
        center_z,
        skew_angle,
        half_width_front: dx1,
        half_width_back: dx2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::{AngleUnit, LengthUnit};

    fn options() -> ParseOptions {
        ParseOptions::default()
    }

    const LINE: &str = "target | root | the target cell | 0*cm 0*cm 5*cm | 0*deg 0*deg 0*deg | \
                        ff0000 | Tube | 0*cm 1.5*cm 2*cm 0*deg 360*deg | LH2 | no | 1 | 1 | 1 \
                        | 1 | 1 | target | target | id manual 1";

    fn fields(line: &str) -> Vec<&str> {
        line.split('|').map(str::trim).collect()
    }

    #[test]
    fn parse_full_record() {
        let rec = GeometryRecord::from_fields(&fields(LINE), &options()).unwrap();
        assert_eq!(rec.name, "target");
        assert_eq!(rec.mother, "root");
        assert_eq!(rec.position.values, vec![0.0, 0.0, 5.0]);
        assert_eq!(rec.position.units, vec!["cm", "cm", "cm"]);
        assert_eq!(rec.rotation.units, vec!["deg", "deg", "deg"]);
        assert_eq!(rec.shape_type, "Tube");
        assert_eq!(rec.dimensions.len(), 5);
        assert_eq!(rec.material, "LH2");
        assert!(rec.exists);
        assert_eq!(rec.style, DrawStyle::Solid);
        assert_eq!(rec.identity, "id manual 1");
    }

    #[test]
    fn serialize_round_trips() {
        let rec = GeometryRecord::from_fields(&fields(LINE), &options()).unwrap();
        let line = rec.serialize();
        let back = GeometryRecord::from_fields(&fields(&line), &options()).unwrap();
        assert_eq!(rec, back);
    }

    #[test]
    fn ordered_rotation_round_trips() {
        let mut rec = GeometryRecord::new("coil");
        rec.rotation = UnitList::uniform(vec![90.0, 0.0, 45.0], "deg");
        rec.rotation_order = Some("zxy".to_string());
        let line = rec.serialize();
        assert!(line.contains("ordered: zxy 90*deg"));
        let back = GeometryRecord::from_fields(&fields(&line), &options()).unwrap();
        assert_eq!(back.rotation_order.as_deref(), Some("zxy"));
        assert_eq!(rec, back);
    }

    #[test]
    fn single_zero_rotation_is_tolerated() {
        let (rot, order) = parse_rotation("0", &options()).unwrap();
        assert_eq!(rot.values, vec![0.0, 0.0, 0.0]);
        assert_eq!(rot.units, vec!["rad", "rad", "rad"]);
        assert!(order.is_none());
    }

    #[test]
    fn single_nonzero_rotation_is_an_error() {
        assert!(parse_rotation("5", &options()).is_err());
    }

    #[test]
    fn bare_numbers_get_the_kind_base() {
        let rot = UnitList::parse("0 0 0", UnitKind::Angle, &options(), "rot").unwrap();
        assert_eq!(rot.units, vec!["rad", "rad", "rad"]);
        let pos = UnitList::parse("1 2 3", UnitKind::Length, &options(), "pos").unwrap();
        assert_eq!(pos.units, vec!["cm", "cm", "cm"]);
    }

    #[test]
    fn forced_conversion_rewrites_values_and_tags() {
        let opts = ParseOptions {
            system: UnitSystem::new(LengthUnit::Cm, AngleUnit::Rad),
            force_unit_conversion: true,
        };
        let pos = UnitList::parse("10*mm 1*inches 0.5*m", UnitKind::Length, &opts, "pos").unwrap();
        assert!((pos.values[0] - 1.0).abs() < 1e-12);
        assert!((pos.values[1] - 2.54).abs() < 1e-12);
        assert!((pos.values[2] - 50.0).abs() < 1e-12);
        assert_eq!(pos.units, vec!["cm", "cm", "cm"]);
    }

    #[test]
    fn unknown_unit_tag_is_rejected() {
        assert!(UnitList::parse("1*cubit", UnitKind::Length, &options(), "pos").is_err());
    }

    #[test]
    fn garbage_magnitude_is_rejected() {
        assert!(UnitList::parse("abc*cm", UnitKind::Length, &options(), "pos").is_err());
        assert!(UnitList::parse("abc", UnitKind::Length, &options(), "pos").is_err());
    }

    #[test]
    fn lossy_parse_keeps_the_record() {
        let mut f = fields(LINE);
        f[10] = "not-a-number";
        f[12] = "7";
        let rec = GeometryRecord::from_fields_lossy(&f, &options());
        assert_eq!(rec.name, "target");
        assert_eq!(rec.copy_number, 1);
        assert!(rec.exists);
    }

    #[test]
    fn lossy_parse_pads_missing_fields() {
        let rec = GeometryRecord::from_fields_lossy(&["stub", "root"], &options());
        assert_eq!(rec.name, "stub");
        assert_eq!(rec.mother, "root");
        assert_eq!(rec.material, "Vacuum");
    }

    #[test]
    fn validate_reports_bad_arity() {
        let mut rec = GeometryRecord::new("flat");
        rec.position = UnitList::uniform(vec![1.0, 2.0], "cm");
        let err = rec.validate().unwrap_err();
        assert!(err.to_string().contains("pos"));
    }

    #[test]
    fn validate_reports_bad_color() {
        let mut rec = GeometryRecord::new("ugly");
        rec.color = "redish".to_string();
        assert!(rec.validate().is_err());
    }

    #[test]
    fn to_fields_matches_field_names() {
        let rec = GeometryRecord::default();
        assert_eq!(rec.to_fields().len(), FIELD_NAMES.len());
    }

    #[test]
    fn symmetric_survey_trapezoid() {
        let t = trapezoid_from_survey(0.0, 10.0, -5.0, 0.0, 0.0, 5.0, 0.0, 0.0);
        assert!(t.center_x.abs() < 1e-12);
        assert!((t.center_z - 5.0).abs() < 1e-12);
        assert!(t.skew_angle.abs() < 1e-12);
        assert!((t.half_width_front - 5.0).abs() < 1e-12);
        assert!((t.half_width_back - 5.0).abs() < 1e-12);
    }

    #[test]
    fn skewed_survey_trapezoid() {
        let theta = std::f64::consts::FRAC_PI_4;
        let t = trapezoid_from_survey(0.0, 10.0, -5.0, 0.0, theta, 5.0, 0.0, theta);
        // Parallel edges at 45 degrees: a parallelogram, skewed by 45.
        assert!((t.half_width_front - 5.0).abs() < 1e-12);
        assert!((t.half_width_back - 5.0).abs() < 1e-12);
        assert!((t.skew_angle - theta).abs() < 1e-12);
        assert!((t.center_x - 5.0).abs() < 1e-12);
    }
}
