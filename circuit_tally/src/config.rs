// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use geo_types::MultiPolygon;

/// A single row of the electoral results table.
///
/// Rows are immutable once loaded; the engine only ever reads them.
#[derive(PartialEq, Debug, Clone)]
pub struct VoteRecord {
    /// District identifier as found in the source. Zero-padding conventions
    /// differ between sources, so identifiers are normalized before any
    /// comparison.
    pub district_id: String,
    pub office_name: String,
    pub party_name: String,
    pub vote_count: u64,
}

/// A district polygon with its grouping label, as read from the geometry
/// source. Coordinates are expected in EPSG:4326.
#[derive(PartialEq, Debug, Clone)]
pub struct DistrictShape {
    pub district_code: String,
    /// The region (cabecera) this district belongs to.
    pub header_region: String,
    pub shape: MultiPolygon<f64>,
}

/// The current filter selection. This is the analog of the dropdowns of an
/// interactive front end: one value of this struct describes one view.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Selection {
    /// Office (cargo) to tabulate, matched exactly.
    pub office: String,
    /// Optional region restriction.
    pub region: Option<String>,
    /// Optional single-district restriction.
    pub district: Option<String>,
}

impl Selection {
    pub fn for_office(office: &str) -> Selection {
        Selection {
            office: office.to_string(),
            region: None,
            district: None,
        }
    }
}

// ******** Output data structures *********

/// Vote sum and share for one (district, party) pair.
#[derive(PartialEq, Debug, Clone)]
pub struct AggregatedResult {
    pub district_id: String,
    pub party_name: String,
    pub vote_count_sum: u64,
    /// Share of the district total, in percent. A district with a zero total
    /// reports 0.0 here.
    pub vote_percentage: f64,
}

/// The winning party of one district.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DominantParty {
    pub district_id: String,
    pub party_name: String,
    pub vote_count_sum: u64,
}

/// A district polygon joined with its winning party and display color.
#[derive(PartialEq, Debug, Clone)]
pub struct ColoredDistrict {
    pub district_code: String,
    pub header_region: String,
    /// `None` only under [`JoinPolicy::Left`], for districts without vote
    /// data.
    pub winner: Option<String>,
    pub display_color: String,
    pub shape: MultiPolygon<f64>,
}

/// District by party percentage matrix. Cells are rounded to two decimals,
/// missing combinations hold 0.0. Rows and columns are sorted by identifier
/// and party name.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PercentageTable {
    pub parties: Vec<String>,
    pub rows: Vec<(String, Vec<f64>)>,
}

/// Everything the presentation layer needs for one selection: the colored
/// polygons, the per-district percentage matrix, and the party totals over
/// the whole selected area.
#[derive(PartialEq, Debug, Clone)]
pub struct MapView {
    pub districts: Vec<ColoredDistrict>,
    pub percentages: PercentageTable,
    /// Party name to percentage of the grand total, sorted by party name and
    /// rounded to two decimals.
    pub party_totals: Vec<(String, f64)>,
}

/// Errors that prevent a session from being assembled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum TallyErrors {
    /// Two geometry rows normalize to the same district code. Joining against
    /// such a table would silently duplicate vote rows.
    DuplicateDistrictCode(String),
}

impl Error for TallyErrors {}

impl Display for TallyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TallyErrors::DuplicateDistrictCode(code) => {
                write!(f, "duplicate district code in the geometry table: {}", code)
            }
        }
    }
}

// ********* Configuration **********

/// What to do with districts present in the geometry but absent from the
/// aggregated votes.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum JoinPolicy {
    /// Drop them from the map.
    Inner,
    /// Keep them, with no winner and the fallback color.
    Left,
}

/// How to pick a winner when two parties hold the same maximal count in a
/// district. Both rules are deterministic: the same input always produces
/// the same winner.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakRule {
    /// The lexicographically smallest party name wins the tie.
    Alphabetical,
    /// The party appearing first in the vote table wins the tie.
    TableOrder,
}

/// Party name to display color table.
///
/// Lookup is total: names without an entry get the fallback color. Matching
/// is case-sensitive and exact.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColorScheme {
    entries: Vec<(String, String)>,
    fallback: String,
}

impl ColorScheme {
    pub fn new(entries: &[(&str, &str)], fallback: &str) -> ColorScheme {
        ColorScheme {
            entries: entries
                .iter()
                .map(|(party, color)| (party.to_string(), color.to_string()))
                .collect(),
            fallback: fallback.to_string(),
        }
    }

    pub fn color_for(&self, party_name: &str) -> &str {
        self.entries
            .iter()
            .find(|(party, _)| party == party_name)
            .map(|(_, color)| color.as_str())
            .unwrap_or(self.fallback.as_str())
    }

    pub fn fallback(&self) -> &str {
        self.fallback.as_str()
    }
}

impl Default for ColorScheme {
    /// The party colors used by the 2023 Argentine general election maps.
    fn default() -> ColorScheme {
        ColorScheme::new(
            &[
                ("LA LIBERTAD AVANZA", "violet"),
                ("JUNTOS POR EL CAMBIO", "yellow"),
                ("UNION POR LA PATRIA", "blue"),
            ],
            "grey",
        )
    }
}

/// The configuration options of the aggregation pipeline.
#[derive(PartialEq, Debug, Clone)]
pub struct TallyRules {
    pub join_policy: JoinPolicy,
    pub tiebreak_rule: TieBreakRule,
    pub colors: ColorScheme,
}

impl Default for TallyRules {
    fn default() -> TallyRules {
        TallyRules {
            join_policy: JoinPolicy::Inner,
            tiebreak_rule: TieBreakRule::Alphabetical,
            colors: ColorScheme::default(),
        }
    }
}
