//! GEANT4 exception-block scanning.
//!
//! A run log contains warning blocks bracketed by `G4Exception-START`
//! and `G4Exception-END` banners. Two flavors carry overlap
//! information: `GeomNav1002` stuck-track navigation warnings and
//! `GeomVol1002` overlap-checker reports (the latter come from running
//! the engine with its overlap check switched on). Everything else is
//! skipped. All coordinates in these messages are millimeters.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::OverlapError;

static START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)G4Exception-START").unwrap());
static END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)G4Exception-END").unwrap());
static NAV_FLAVOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*\* G4Exception\s+:\s+GeomNav").unwrap());
static VOL_FLAVOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*\* G4Exception\s+:\s+GeomVol").unwrap());

static CURRENT_VOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Current\s+phys volume:\s+'(.*)'").unwrap());
static PREVIOUS_VOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Previous\s+phys volume:\s+'(.*)'").unwrap());
static POSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)at position\s*:\s*\(\s*([-+\d.]+)\*?,\s?([-+\d.]+)\s*,\s?([-+\d.]+)\s*\)")
        .unwrap()
});
static DIRECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)in direction\s*:\s*\(\s*([-+\d.]+)\*?,\s?([-+\d.]+)\s*,\s?([-+\d.]+)\s*\)")
        .unwrap()
});

static OVERLAP_VOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Overlap is detected for volume\s+(.*)\s+\((.*)\)").unwrap());
static WITH_MOTHER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)with its mother volume\s+(.*)\s+\((.*)\)").unwrap());
static WITH_VOLUME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)with\s+(.*)\s+\((.*)\) volume").unwrap());
static LOCAL_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)local point\s+\(\s*([-+\d.]+)\*?,\s?([-+\d.]+)\s*,\s?([-+\d.]+)\s*\),\s+overlapping by at least:\s*(.*)",
    )
    .unwrap()
});

/// Flavor-specific detail of one overlap diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlapKind {
    /// Stuck-track navigation warning (`GeomNav1002`).
    Navigation {
        /// Track direction at the stuck point, when reported.
        direction: Option<[f64; 3]>,
        /// Volume the navigator came from.
        previous: Option<String>,
    },
    /// Overlap-checker report (`GeomVol1002`).
    Checker {
        /// Solid type of the overlapping volume.
        volume_type: Option<String>,
        /// The volume overlapped with, a mother or a sibling.
        other: Option<String>,
        /// That volume's solid type.
        other_type: Option<String>,
        /// Overlap depth as printed, e.g. `1.20916 mm`.
        depth: Option<String>,
    },
}

/// One overlap diagnostic pulled out of a run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlap {
    /// Overlap position in millimeters.
    pub position: [f64; 3],
    /// The volume the engine complained about.
    pub volume: Option<String>,
    /// Flavor detail.
    pub kind: OverlapKind,
}

/// Scan log text for overlap diagnostics, in file order.
pub fn scan_text(text: &str) -> Result<Vec<Overlap>, OverlapError> {
    let lines: Vec<&str> = text.lines().collect();
    let mut overlaps = Vec::new();
    for (start, end) in blocks(&lines) {
        let block = &lines[start..end];
        let Some(flavor) = block.first() else {
            continue;
        };
        let parsed = if NAV_FLAVOR_RE.is_match(flavor) {
            parse_navigation(block, start)?
        } else if VOL_FLAVOR_RE.is_match(flavor) {
            parse_checker(block, start)?
        } else {
            tracing::debug!(line = start + 1, "exception block without geometry flavor");
            None
        };
        overlaps.extend(parsed);
    }
    Ok(overlaps)
}

/// Scan a reader holding log text.
pub fn scan_reader<R: Read>(mut reader: R) -> Result<Vec<Overlap>, OverlapError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    scan_text(&text)
}

/// Scan a log file on disk.
pub fn scan_log(path: impl AsRef<Path>) -> Result<Vec<Overlap>, OverlapError> {
    let text = std::fs::read_to_string(path)?;
    scan_text(&text)
}

/// Half-open line ranges between the exception banners. A block with
/// no end banner runs to the end of the log.
fn blocks(lines: &[&str]) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if !START_RE.is_match(lines[i]) {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = lines.len();
        for (j, line) in lines.iter().enumerate().skip(start) {
            if END_RE.is_match(line) {
                end = j;
                break;
            }
        }
        out.push((start, end));
        i = end + 1;
    }
    out
}

fn parse_navigation(block: &[&str], start: usize) -> Result<Option<Overlap>, OverlapError> {
    let mut volume = None;
    let mut previous = None;
    let mut position = None;
    let mut direction = None;
    for (offset, line) in block.iter().enumerate() {
        if let Some(caps) = CURRENT_VOL_RE.captures(line) {
            volume = Some(caps[1].to_string());
        }
        if let Some(caps) = PREVIOUS_VOL_RE.captures(line) {
            previous = Some(caps[1].to_string());
        }
        if let Some(caps) = POSITION_RE.captures(line) {
            position = Some(triplet(&caps, start + offset)?);
        }
        if let Some(caps) = DIRECTION_RE.captures(line) {
            direction = Some(triplet(&caps, start + offset)?);
        }
    }
    Ok(position.map(|position| Overlap {
        position,
        volume,
        kind: OverlapKind::Navigation {
            direction,
            previous,
        },
    }))
}

/// The checker prints a three-line stanza: the detected volume, the
/// volume it overlaps with on the next line, and the local point with
/// the overlap depth on the line after that.
fn parse_checker(block: &[&str], start: usize) -> Result<Option<Overlap>, OverlapError> {
    let mut out = None;
    for (offset, line) in block.iter().enumerate() {
        let Some(caps) = OVERLAP_VOL_RE.captures(line) else {
            continue;
        };
        let volume = caps[1].trim().to_string();
        let volume_type = Some(caps[2].to_string());

        let mut other = None;
        let mut other_type = None;
        if let Some(next) = block.get(offset + 1) {
            if let Some(caps) = WITH_MOTHER_RE.captures(next) {
                other = Some(caps[1].trim().to_string());
                other_type = Some(caps[2].to_string());
            } else if let Some(caps) = WITH_VOLUME_RE.captures(next) {
                other = Some(caps[1].trim().to_string());
                other_type = Some(caps[2].to_string());
            }
        }
        if let Some(point_line) = block.get(offset + 2) {
            if let Some(caps) = LOCAL_POINT_RE.captures(point_line) {
                out = Some(Overlap {
                    position: triplet(&caps, start + offset + 2)?,
                    volume: Some(volume),
                    kind: OverlapKind::Checker {
                        volume_type,
                        other,
                        other_type,
                        depth: Some(caps[4].trim().to_string()),
                    },
                });
            }
        }
    }
    Ok(out)
}

fn triplet(caps: &Captures<'_>, index: usize) -> Result<[f64; 3], OverlapError> {
    let parse = |group: usize| -> Result<f64, OverlapError> {
        caps[group].parse().map_err(|_| OverlapError::Malformed {
            line: index + 1,
            message: format!("'{}' is not a number", &caps[group]),
        })
    };
    Ok([parse(1)?, parse(2)?, parse(3)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAV_BLOCK: &str = "\
some unrelated output
-------- WWWW ------- G4Exception-START -------- WWWW -------
*** G4Exception : GeomNav1002
      issued by : G4PropagatorInField::ComputeStep()
Particle is stuck; it will be killed.
  Zero progress for 51 attempted steps.
  Current phys volume: 'DC_cell_12'
   - at position : ( 123.456, -78.9, 2345.6 )
     in direction: ( 0.1, -0.2, 0.97 )
  Previous phys volume: 'DC_gas'
*** This is just a warning message. ***
-------- WWWW -------- G4Exception-END --------- WWWW -------
trailing output
";

    const CHECKER_BLOCK: &str = "\
-------- WWWW ------- G4Exception-START -------- WWWW -------
*** G4Exception : GeomVol1002
      issued by : G4PVPlacement::CheckOverlaps()
Overlap is detected for volume paddle_1 (G4Box)
          with its mother volume mother_LG (G4Trap)
          at mother local point (-151.109, 0, 287.347), overlapping by at least: 1.20916 mm
*** This is just a warning message. ***
-------- WWWW -------- G4Exception-END --------- WWWW -------
";

    #[test]
    fn navigation_block_yields_position_and_volumes() {
        let overlaps = scan_text(NAV_BLOCK).unwrap();
        assert_eq!(overlaps.len(), 1);
        let overlap = &overlaps[0];
        assert_eq!(overlap.position, [123.456, -78.9, 2345.6]);
        assert_eq!(overlap.volume.as_deref(), Some("DC_cell_12"));
        match &overlap.kind {
            OverlapKind::Navigation {
                direction,
                previous,
            } => {
                assert_eq!(*direction, Some([0.1, -0.2, 0.97]));
                assert_eq!(previous.as_deref(), Some("DC_gas"));
            }
            other => panic!("expected a navigation overlap, got {other:?}"),
        }
    }

    #[test]
    fn checker_block_yields_mother_and_depth() {
        let overlaps = scan_text(CHECKER_BLOCK).unwrap();
        assert_eq!(overlaps.len(), 1);
        let overlap = &overlaps[0];
        assert_eq!(overlap.position, [-151.109, 0.0, 287.347]);
        assert_eq!(overlap.volume.as_deref(), Some("paddle_1"));
        match &overlap.kind {
            OverlapKind::Checker {
                volume_type,
                other,
                other_type,
                depth,
            } => {
                assert_eq!(volume_type.as_deref(), Some("G4Box"));
                assert_eq!(other.as_deref(), Some("mother_LG"));
                assert_eq!(other_type.as_deref(), Some("G4Trap"));
                assert_eq!(depth.as_deref(), Some("1.20916 mm"));
            }
            other => panic!("expected a checker overlap, got {other:?}"),
        }
    }

    #[test]
    fn checker_block_with_sibling_volume() {
        let text = "\
G4Exception-START
*** G4Exception : GeomVol1002
      issued by : G4PVPlacement::CheckOverlaps()
Overlap is detected for volume xtal_02 (G4Box)
          with xtal_01 (G4Box) volume's
          local point (2.5, 0, 0), overlapping by at least: 0.1 mm
G4Exception-END
";
        let overlaps = scan_text(text).unwrap();
        assert_eq!(overlaps.len(), 1);
        match &overlaps[0].kind {
            OverlapKind::Checker { other, .. } => {
                assert_eq!(other.as_deref(), Some("xtal_01"));
            }
            other => panic!("expected a checker overlap, got {other:?}"),
        }
    }

    #[test]
    fn blocks_without_geometry_flavor_are_skipped() {
        let text = "\
G4Exception-START
*** G4Exception : PART102
      issued by : G4ParticleGun
G4Exception-END
";
        assert!(scan_text(text).unwrap().is_empty());
    }

    #[test]
    fn unterminated_block_runs_to_end_of_log() {
        let text = "\
G4Exception-START
*** G4Exception : GeomNav1002
  Current phys volume: 'cell'
   - at position : ( 1, 2, 3 )
";
        let overlaps = scan_text(text).unwrap();
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn several_blocks_come_back_in_file_order() {
        let text = format!("{NAV_BLOCK}\n{CHECKER_BLOCK}");
        let overlaps = scan_text(&text).unwrap();
        assert_eq!(overlaps.len(), 2);
        assert!(matches!(overlaps[0].kind, OverlapKind::Navigation { .. }));
        assert!(matches!(overlaps[1].kind, OverlapKind::Checker { .. }));
    }

    #[test]
    fn overlaps_serialize_for_json_reports() {
        let overlaps = scan_text(CHECKER_BLOCK).unwrap();
        let json = serde_json::to_value(&overlaps).unwrap();
        let first = &json[0];
        assert_eq!(first["position"][0], -151.109);
        assert_eq!(first["volume"], "paddle_1");
        assert_eq!(first["kind"]["Checker"]["other"], "mother_LG");
    }

    #[test]
    fn bad_number_in_matched_position_is_malformed() {
        let text = "\
G4Exception-START
*** G4Exception : GeomNav1002
   - at position : ( 1.2.3, 0, 0 )
G4Exception-END
";
        let err = scan_text(text).unwrap_err();
        assert!(matches!(err, OverlapError::Malformed { line: 3, .. }));
    }

    #[test]
    fn plain_logs_have_no_overlaps() {
        assert!(scan_text("nothing to see here\n").unwrap().is_empty());
    }
}
