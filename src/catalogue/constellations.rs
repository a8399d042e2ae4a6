//! # Constellation stick figures
//!
//! The line-definition source lists, per row, a constellation abbreviation
//! and up to 31 bright-star identifiers (Harvard References) forming one
//! continuous polyline. A constellation that cannot be drawn without lifting
//! the pen owns several rows; continuation rows leave the abbreviation blank
//! and inherit it from the row above. Original row order is kept as the
//! line-group key so disjoint polylines stay distinguishable.
//!
//! Resolution happens once, after the starfield catalogue is available:
//! identifiers referenced by the line data but absent from the starfield are
//! reported as a warning list and the affected segments simply never render
//! (the constellation shows gaps). This is a data-quality issue, never an
//! error.

use ahash::AHashSet;
use camino::Utf8Path;
use smallvec::SmallVec;

use crate::almanac_errors::AlmanacError;
use crate::constants::{FastHashMap, HrId};

use super::table::Table;
use super::Catalogue;

/// File name of the line-definition source inside the catalogue directory.
pub const LINES_FILE: &str = "ConstellationLines.csv";

/// A 2-D screen position supplied by the presentation layer.
pub type ScreenPos = [f32; 2];

/// A plottable line segment between two visible stars.
pub type Segment = [ScreenPos; 2];

/// One continuous polyline of one constellation, in drawing order.
#[derive(Debug, Clone)]
struct LineGroup {
    constellation: String,
    stars: SmallVec<[HrId; 8]>,
}

/// The resolved constellation line data, read-only after construction.
#[derive(Debug, Clone)]
pub struct Constellations {
    groups: Vec<LineGroup>,
}

impl Constellations {
    /// Load the line-definition file and cross-reference the starfield.
    pub fn load(path: &Utf8Path, starfield: &Catalogue) -> Result<Self, AlmanacError> {
        let table = Table::from_csv_path(path, b',')?;
        Self::resolve(&table, starfield)
    }

    /// Resolve a loaded line-definition table against the starfield catalogue.
    ///
    /// Arguments
    /// -----------------
    /// * `table`: rows of `abr, s01..s31`. A blank `abr` continues the
    ///   previous row's constellation; blank or non-numeric identifier slots
    ///   are discarded (a polyline may use fewer than the maximum slots).
    /// * `starfield`: the normalized bright-star catalogue whose identifiers
    ///   the line data references.
    ///
    /// Return
    /// ----------
    /// * The resolved line groups, or [`AlmanacError::MissingColumn`] when
    ///   the table has no `abr` column. Identifiers missing from the
    ///   starfield are warned about, never fatal.
    pub fn resolve(table: &Table, starfield: &Catalogue) -> Result<Self, AlmanacError> {
        let abr_col = table.column("abr")?;
        // Identifier slots, in header order: s01, s02, ...
        let star_cols: Vec<usize> = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(_, h)| h.len() == 3 && h.starts_with('s') && h[1..].parse::<u8>().is_ok())
            .map(|(i, _)| i)
            .collect();

        let mut groups: Vec<LineGroup> = Vec::new();
        let mut current = String::new();
        for row in 0..table.len() {
            let abr = table.value(row, abr_col);
            if !abr.is_empty() {
                current = abr.to_string();
            }
            if current.is_empty() {
                // Continuation row before any named constellation.
                continue;
            }

            let stars: SmallVec<[HrId; 8]> = star_cols
                .iter()
                .filter_map(|&col| table.value(row, col).parse::<HrId>().ok())
                .collect();
            if stars.is_empty() {
                continue;
            }
            groups.push(LineGroup {
                constellation: current.clone(),
                stars,
            });
        }

        let resolved = Constellations { groups };
        resolved.warn_unresolved(starfield);
        Ok(resolved)
    }

    /// Report identifiers referenced by the line data but absent from the
    /// starfield. The affected segments render as gaps.
    fn warn_unresolved(&self, starfield: &Catalogue) {
        let known: AHashSet<HrId> = starfield
            .entries()
            .iter()
            .filter_map(|e| e.id.hr())
            .collect();

        let mut missing: Vec<HrId> = self
            .groups
            .iter()
            .flat_map(|g| g.stars.iter().copied())
            .filter(|hr| !known.contains(hr))
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if !missing.is_empty() {
            eprintln!("Constellation identifiers not found in the starfield: {missing:?}");
        }
    }

    /// Number of line groups across all constellations.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Plottable segments and label anchors for the currently visible stars.
    ///
    /// Arguments
    /// -----------------
    /// * `positions`: screen position per identifier, only for identifiers
    ///   currently visible (in range and unfiltered).
    ///
    /// Return
    /// ----------
    /// * One segment list per line group with at least one drawable segment.
    ///   A segment is drawable only when **both** endpoints are visible;
    ///   there is no clipping of half-visible segments.
    /// * One label anchor per constellation, at the first visible identifier
    ///   encountered in its groups in row order. A fully invisible
    ///   constellation gets no label.
    pub fn visible_segments_and_labels(
        &self,
        positions: &FastHashMap<HrId, ScreenPos>,
    ) -> (Vec<Vec<Segment>>, Vec<(ScreenPos, &str)>) {
        let mut segments_by_group = Vec::new();
        let mut labels: Vec<(ScreenPos, &str)> = Vec::new();

        for group in &self.groups {
            let segments: Vec<Segment> = group
                .stars
                .windows(2)
                .filter_map(|pair| {
                    let from = positions.get(&pair[0])?;
                    let to = positions.get(&pair[1])?;
                    Some([*from, *to])
                })
                .collect();
            if !segments.is_empty() {
                segments_by_group.push(segments);
            }

            if !labels.iter().any(|(_, abr)| *abr == group.constellation) {
                if let Some(pos) = group.stars.iter().find_map(|hr| positions.get(hr)) {
                    labels.push((*pos, group.constellation.as_str()));
                }
            }
        }

        (segments_by_group, labels)
    }
}

#[cfg(test)]
mod constellations_test {
    use super::*;
    use crate::catalogue::{ColumnSpec, CoordKind, TargetKind};

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn starfield(hrs: &[u32]) -> Catalogue {
        let rows = hrs
            .iter()
            .map(|hr| row(&[&hr.to_string(), "06 45 08.9", "-16 42 58", "2.0"]))
            .collect();
        let table = Table::from_rows(&["HR", "RAJ2000", "DEJ2000", "Vmag"], rows).unwrap();
        let spec = ColumnSpec {
            id: "HR",
            ra: "RAJ2000",
            ra_kind: CoordKind::Sexagesimal,
            dec: "DEJ2000",
            dec_kind: CoordKind::Sexagesimal,
            magnitude: "Vmag",
        };
        Catalogue::normalize("STAR", &table, &spec, (-2.0, 6.0), TargetKind::Star).unwrap()
    }

    fn lines_table(rows: Vec<Vec<String>>) -> Table {
        Table::from_rows(&["abr", "s01", "s02", "s03", "s04"], rows).unwrap()
    }

    #[test]
    fn test_forward_fill_and_slot_discard() {
        let table = lines_table(vec![
            row(&["Ori", "1", "2", "3", ""]),
            row(&["", "4", "5", "", ""]),
            row(&["UMa", "6", "7", "x", "8"]),
        ]);
        let cons = Constellations::resolve(&table, &starfield(&[1, 2, 3, 4, 5, 6, 7, 8])).unwrap();
        assert_eq!(cons.group_count(), 3);
        // Continuation row belongs to Ori; the non-numeric slot of UMa is
        // discarded without terminating the list.
        assert_eq!(cons.groups[1].constellation, "Ori");
        assert_eq!(cons.groups[1].stars.as_slice(), &[4, 5]);
        assert_eq!(cons.groups[2].stars.as_slice(), &[6, 7, 8]);
    }

    #[test]
    fn test_both_endpoints_required() {
        let table = lines_table(vec![row(&["Ori", "1", "2", "3", ""])]);
        let cons = Constellations::resolve(&table, &starfield(&[1, 2, 3])).unwrap();

        // Only the two ends of the polyline are visible: no adjacent pair is
        // fully visible, so no segments, but the label still anchors at the
        // first visible star.
        let positions: FastHashMap<HrId, ScreenPos> =
            [(1, [0.0, 0.0]), (3, [2.0, 2.0])].into_iter().collect();
        let (segments, labels) = cons.visible_segments_and_labels(&positions);
        assert!(segments.is_empty());
        assert_eq!(labels, vec![([0.0, 0.0], "Ori")]);

        // With the middle star visible both segments appear.
        let positions: FastHashMap<HrId, ScreenPos> =
            [(1, [0.0, 0.0]), (2, [1.0, 1.0]), (3, [2.0, 2.0])]
                .into_iter()
                .collect();
        let (segments, _) = cons.visible_segments_and_labels(&positions);
        assert_eq!(segments, vec![vec![
            [[0.0, 0.0], [1.0, 1.0]],
            [[1.0, 1.0], [2.0, 2.0]],
        ]]);
    }

    #[test]
    fn test_one_label_per_constellation() {
        let table = lines_table(vec![
            row(&["Ori", "1", "2", "", ""]),
            row(&["", "3", "4", "", ""]),
            row(&["UMa", "5", "6", "", ""]),
        ]);
        let cons = Constellations::resolve(&table, &starfield(&[1, 2, 3, 4, 5, 6])).unwrap();

        // The first Ori group is fully hidden; the label falls through to the
        // first visible star of the second group.
        let positions: FastHashMap<HrId, ScreenPos> = [
            (3, [3.0, 0.0]),
            (4, [4.0, 0.0]),
            (5, [5.0, 0.0]),
            (6, [6.0, 0.0]),
        ]
        .into_iter()
        .collect();
        let (segments, labels) = cons.visible_segments_and_labels(&positions);
        assert_eq!(segments.len(), 2);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0], ([3.0, 0.0], "Ori"));
        assert_eq!(labels[1], ([5.0, 0.0], "UMa"));
    }

    #[test]
    fn test_missing_abr_column() {
        let table = Table::from_rows(&["s01", "s02"], vec![]).unwrap();
        assert!(matches!(
            Constellations::resolve(&table, &starfield(&[1])),
            Err(AlmanacError::MissingColumn(c)) if c == "abr"
        ));
    }
}
