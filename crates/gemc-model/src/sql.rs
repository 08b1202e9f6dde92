//! SQL text for GEMC geometry tables.
//!
//! Pure string rendering; talking to a database stays outside this
//! crate. The layout follows the GEMC MySQL conventions: the eighteen
//! record columns plus the legacy `rmin`/`rmax` pair and a timestamp,
//! and for version-2 tables a variation column and integer id.

use crate::record::GeometryRecord;

const GEOMETRY_COLUMNS: &str = "\
  `name` varchar(40) DEFAULT NULL,
  `mother` varchar(100) DEFAULT NULL,
  `description` varchar(200) DEFAULT NULL,
  `pos` varchar(100) DEFAULT NULL,
  `rot` varchar(100) DEFAULT NULL,
  `col` varchar(10) DEFAULT NULL,
  `type` varchar(100) DEFAULT NULL,
  `dimensions` text,
  `material` varchar(60) DEFAULT NULL,
  `magfield` varchar(40) DEFAULT NULL,
  `ncopy` int(11) DEFAULT NULL,
  `pMany` int(11) DEFAULT NULL,
  `exist` int(11) DEFAULT NULL,
  `visible` int(11) DEFAULT NULL,
  `style` int(11) DEFAULT NULL,
  `sensitivity` varchar(40) DEFAULT NULL,
  `hitType` varchar(100) DEFAULT NULL,
  `identity` varchar(200) DEFAULT NULL,
  `rmin` int(11) DEFAULT NULL,
  `rmax` int(11) DEFAULT NULL,
  `time` timestamp NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP";

fn quoted(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render the INSERT statement for one record.
///
/// With a variation the two trailing version-2 columns are filled in;
/// without one the statement targets a version-1 table. The rotation
/// column keeps any `ordered:` prefix so the axis order survives a
/// database round trip.
pub fn insert_statement(
    record: &GeometryRecord,
    table: &str,
    variation: Option<&str>,
    id: i32,
) -> String {
    let fields = record.to_fields();
    let mut values: Vec<String> = Vec::with_capacity(23);
    for text in &fields[..10] {
        values.push(quoted(text));
    }
    for text in &fields[10..15] {
        values.push(text.clone());
    }
    for text in &fields[15..18] {
        values.push(quoted(text));
    }
    // rmin and rmax are unused but still part of the table layout.
    values.push("0".to_string());
    values.push("100000".to_string());
    values.push("now()".to_string());
    if let Some(variation) = variation {
        values.push(quoted(variation));
        values.push(id.to_string());
    }
    format!("INSERT INTO {table} VALUES ({});", values.join(","))
}

/// Render the CREATE TABLE statement for a geometry table.
///
/// Version-2 tables add the variation and id columns and the unique key
/// over them; version-1 tables stop at the timestamp.
pub fn create_geometry_table(table: &str, gemc_v2: bool) -> String {
    let mut sql = format!("CREATE TABLE `{table}` (\n{GEOMETRY_COLUMNS}");
    if gemc_v2 {
        sql.push_str(
            ",\n  `variation` varchar(200) DEFAULT 'original',\n  `id` int(11) DEFAULT 0,\n  UNIQUE KEY (`variation`,`id`,`name`)",
        );
    }
    sql.push_str("\n) ENGINE=MyISAM DEFAULT CHARSET=latin1;");
    sql
}
