pub use crate::config::*;
use crate::TallySession;

use geo_types::MultiPolygon;

/// A builder for assembling a tally session row by row.
///
/// This is the programmatic counterpart of the file readers: tests and
/// embedding applications add districts and vote rows directly.
///
/// ```
/// use circuit_tally::builder::Builder;
/// use circuit_tally::{Selection, TallyRules};
/// use geo_types::{LineString, MultiPolygon, Polygon};
/// # use circuit_tally::TallyErrors;
///
/// let ring = LineString::from(vec![
///     (0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0),
/// ]);
/// let shape = MultiPolygon(vec![Polygon::new(ring, vec![])]);
///
/// let mut builder = Builder::new(&TallyRules::default());
/// builder.district("0001", "La Plata", shape);
/// builder.add_vote("01", "PRESIDENTE", "UNION POR LA PATRIA", 70);
/// builder.add_vote("01", "PRESIDENTE", "LA LIBERTAD AVANZA", 30);
///
/// let session = builder.build()?;
/// let view = session.snapshot(&Selection::for_office("PRESIDENTE"));
/// assert_eq!(view.districts.len(), 1);
/// assert_eq!(view.districts[0].display_color, "blue");
/// # Ok::<(), TallyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: TallyRules,
    pub(crate) _districts: Vec<DistrictShape>,
    pub(crate) _votes: Vec<VoteRecord>,
}

impl Builder {
    pub fn new(rules: &TallyRules) -> Builder {
        Builder {
            _rules: rules.clone(),
            _districts: Vec::new(),
            _votes: Vec::new(),
        }
    }

    /// Adds one district polygon. Identifiers are normalized at build time,
    /// so any zero-padding convention is acceptable here.
    pub fn district(&mut self, code: &str, region: &str, shape: MultiPolygon<f64>) {
        self._districts.push(DistrictShape {
            district_code: code.to_string(),
            header_region: region.to_string(),
            shape,
        });
    }

    /// Adds one vote row.
    pub fn add_vote(&mut self, district: &str, office: &str, party: &str, count: u64) {
        self._votes.push(VoteRecord {
            district_id: district.to_string(),
            office_name: office.to_string(),
            party_name: party.to_string(),
            vote_count: count,
        });
    }

    pub fn build(self) -> Result<TallySession, TallyErrors> {
        TallySession::new(self._votes, self._districts, self._rules)
    }
}
