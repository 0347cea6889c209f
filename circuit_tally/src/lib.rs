mod config;
use log::{debug, info};

use std::collections::{BTreeMap, HashMap, HashSet};

pub use crate::config::*;

pub mod builder;
pub mod manual;
pub mod quick_start;

/// Strips the leading zeros of a district identifier.
///
/// The vote table and the geometry table pad their identifiers differently,
/// so both sides go through this before any comparison. The result is never
/// empty: an all-zero (or empty) identifier maps to `"0"`. Idempotent.
pub fn normalize_district_id(raw: &str) -> String {
    let stripped = raw.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// The loaded tables and the rules that govern the pipeline.
///
/// A session owns read-only snapshots of the vote table and the geometry
/// table; every view is recomputed synchronously from them by [`snapshot`].
/// There is no hidden shared state and nothing is mutated after construction.
///
/// [`snapshot`]: TallySession::snapshot
pub struct TallySession {
    votes: Vec<VoteRecord>,
    districts: Vec<DistrictShape>,
    rules: TallyRules,
}

impl TallySession {
    /// Normalizes all the identifiers once and validates the geometry table.
    pub fn new(
        votes: Vec<VoteRecord>,
        districts: Vec<DistrictShape>,
        rules: TallyRules,
    ) -> Result<TallySession, TallyErrors> {
        let mut districts = districts;
        let mut seen: HashSet<String> = HashSet::new();
        for d in districts.iter_mut() {
            d.district_code = normalize_district_id(&d.district_code);
            if !seen.insert(d.district_code.clone()) {
                return Err(TallyErrors::DuplicateDistrictCode(d.district_code.clone()));
            }
        }
        let mut votes = votes;
        for v in votes.iter_mut() {
            v.district_id = normalize_district_id(&v.district_id);
        }
        info!(
            "session: {} vote records, {} district shapes",
            votes.len(),
            districts.len()
        );
        Ok(TallySession {
            votes,
            districts,
            rules,
        })
    }

    /// The distinct office names of the vote table, sorted.
    pub fn offices(&self) -> Vec<String> {
        let mut res: Vec<String> = self.votes.iter().map(|v| v.office_name.clone()).collect();
        res.sort();
        res.dedup();
        res
    }

    /// The distinct region labels of the geometry table, sorted.
    pub fn regions(&self) -> Vec<String> {
        let mut res: Vec<String> = self
            .districts
            .iter()
            .map(|d| d.header_region.clone())
            .collect();
        res.sort();
        res.dedup();
        res
    }

    pub fn rules(&self) -> &TallyRules {
        &self.rules
    }

    /// Recomputes the full view for one selection.
    ///
    /// A selection that matches nothing produces an empty view, not an error.
    pub fn snapshot(&self, selection: &Selection) -> MapView {
        info!(
            "snapshot: office {:?} region {:?} district {:?}",
            selection.office, selection.region, selection.district
        );
        let shapes = filter_districts(&self.districts, selection);
        let records = filter_votes(&self.votes, selection, &shapes);
        debug!(
            "snapshot: {} shapes and {} vote records after filtering",
            shapes.len(),
            records.len()
        );

        let aggregates = aggregate_votes(&records);
        let dominant = dominant_parties(&aggregates, self.rules.tiebreak_rule);
        let districts = join_districts(
            &shapes,
            &dominant,
            self.rules.join_policy,
            &self.rules.colors,
        );
        let percentages = pivot_percentages(&aggregates);
        let party_totals = party_totals(&aggregates);

        info!(
            "snapshot: {} colored districts, {} table rows",
            districts.len(),
            percentages.rows.len()
        );
        MapView {
            districts,
            percentages,
            party_totals,
        }
    }
}

/// Runs the full pipeline for a single selection.
///
/// One-call convenience over building a [`TallySession`] and taking a
/// [`TallySession::snapshot`]. Callers that recompute over the same tables
/// repeatedly should keep the session instead.
pub fn run_map_stats(
    votes: Vec<VoteRecord>,
    districts: Vec<DistrictShape>,
    rules: &TallyRules,
    selection: &Selection,
) -> Result<MapView, TallyErrors> {
    info!(
        "run_map_stats: processing {} vote records against {} shapes, rules: {:?}",
        votes.len(),
        districts.len(),
        rules
    );
    let session = TallySession::new(votes, districts, rules.clone())?;
    Ok(session.snapshot(selection))
}

fn filter_districts<'a>(
    districts: &'a [DistrictShape],
    selection: &Selection,
) -> Vec<&'a DistrictShape> {
    let wanted = selection
        .district
        .as_deref()
        .map(normalize_district_id);
    districts
        .iter()
        .filter(|d| {
            let region_ok = match &selection.region {
                Some(region) => d.header_region == *region,
                None => true,
            };
            let district_ok = match &wanted {
                Some(code) => d.district_code == *code,
                None => true,
            };
            region_ok && district_ok
        })
        .collect()
}

/// Keeps the records of the selected office whose district appears in the
/// filtered geometry. Districts the geometry does not know about cannot be
/// drawn, so they do not participate in the tables either.
fn filter_votes<'a>(
    votes: &'a [VoteRecord],
    selection: &Selection,
    shapes: &[&DistrictShape],
) -> Vec<&'a VoteRecord> {
    let codes: HashSet<&str> = shapes.iter().map(|d| d.district_code.as_str()).collect();
    votes
        .iter()
        .filter(|v| v.office_name == selection.office && codes.contains(v.district_id.as_str()))
        .collect()
}

/// Groups by (district, party), sums the counts and computes the share of
/// each party in its district. Results keep the first-appearance order of
/// the input.
fn aggregate_votes(records: &[&VoteRecord]) -> Vec<AggregatedResult> {
    let mut sums: HashMap<(String, String), u64> = HashMap::new();
    let mut order: Vec<(String, String)> = Vec::new();
    for r in records {
        let key = (r.district_id.clone(), r.party_name.clone());
        match sums.get_mut(&key) {
            Some(total) => *total += r.vote_count,
            None => {
                sums.insert(key.clone(), r.vote_count);
                order.push(key);
            }
        }
    }

    let mut district_totals: HashMap<String, u64> = HashMap::new();
    for key in order.iter() {
        *district_totals.entry(key.0.clone()).or_insert(0) += sums[key];
    }

    let mut res: Vec<AggregatedResult> = Vec::new();
    for (district_id, party_name) in order {
        let vote_count_sum = sums[&(district_id.clone(), party_name.clone())];
        let total = district_totals[&district_id];
        // A district whose rows all carry zero votes has a zero total; its
        // shares are reported as zero rather than dividing.
        let vote_percentage = if total == 0 {
            0.0
        } else {
            vote_count_sum as f64 / total as f64 * 100.0
        };
        res.push(AggregatedResult {
            district_id,
            party_name,
            vote_count_sum,
            vote_percentage,
        });
    }
    debug!("aggregate_votes: {} (district, party) groups", res.len());
    res
}

/// Selects the maximal row of each district under the given tie-break rule.
fn dominant_parties(aggregates: &[AggregatedResult], rule: TieBreakRule) -> Vec<DominantParty> {
    // First-appearance rank of every party, for TieBreakRule::TableOrder.
    let mut party_rank: HashMap<&str, usize> = HashMap::new();
    for a in aggregates {
        let next = party_rank.len();
        party_rank.entry(a.party_name.as_str()).or_insert(next);
    }

    let mut best: HashMap<&str, &AggregatedResult> = HashMap::new();
    let mut district_order: Vec<&str> = Vec::new();
    for a in aggregates {
        match best.get(a.district_id.as_str()) {
            None => {
                best.insert(a.district_id.as_str(), a);
                district_order.push(a.district_id.as_str());
            }
            Some(incumbent) => {
                if beats(a, incumbent, rule, &party_rank) {
                    best.insert(a.district_id.as_str(), a);
                }
            }
        }
    }

    district_order
        .iter()
        .map(|district| {
            let a = best[district];
            DominantParty {
                district_id: a.district_id.clone(),
                party_name: a.party_name.clone(),
                vote_count_sum: a.vote_count_sum,
            }
        })
        .collect()
}

fn beats(
    challenger: &AggregatedResult,
    incumbent: &AggregatedResult,
    rule: TieBreakRule,
    party_rank: &HashMap<&str, usize>,
) -> bool {
    if challenger.vote_count_sum != incumbent.vote_count_sum {
        return challenger.vote_count_sum > incumbent.vote_count_sum;
    }
    match rule {
        TieBreakRule::Alphabetical => challenger.party_name < incumbent.party_name,
        TieBreakRule::TableOrder => {
            party_rank[challenger.party_name.as_str()] < party_rank[incumbent.party_name.as_str()]
        }
    }
}

/// Joins the filtered geometry with the dominant parties, on normalized
/// codes. Inner join drops districts without vote data; left join keeps them
/// with the fallback color.
fn join_districts(
    shapes: &[&DistrictShape],
    dominant: &[DominantParty],
    policy: JoinPolicy,
    colors: &ColorScheme,
) -> Vec<ColoredDistrict> {
    let by_district: HashMap<&str, &DominantParty> = dominant
        .iter()
        .map(|d| (d.district_id.as_str(), d))
        .collect();

    let mut res: Vec<ColoredDistrict> = Vec::new();
    for s in shapes {
        match (by_district.get(s.district_code.as_str()), policy) {
            (Some(winner), _) => res.push(ColoredDistrict {
                district_code: s.district_code.clone(),
                header_region: s.header_region.clone(),
                winner: Some(winner.party_name.clone()),
                display_color: colors.color_for(&winner.party_name).to_string(),
                shape: s.shape.clone(),
            }),
            (None, JoinPolicy::Left) => res.push(ColoredDistrict {
                district_code: s.district_code.clone(),
                header_region: s.header_region.clone(),
                winner: None,
                display_color: colors.fallback().to_string(),
                shape: s.shape.clone(),
            }),
            (None, JoinPolicy::Inner) => {
                debug!(
                    "join_districts: no vote data for district {}, dropped",
                    s.district_code
                );
            }
        }
    }
    res
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Pivots the aggregation into a district by party matrix with zero-filled
/// cells, rounded to two decimals for display.
fn pivot_percentages(aggregates: &[AggregatedResult]) -> PercentageTable {
    let mut parties: Vec<String> = aggregates.iter().map(|a| a.party_name.clone()).collect();
    parties.sort();
    parties.dedup();
    let mut district_ids: Vec<String> = aggregates.iter().map(|a| a.district_id.clone()).collect();
    district_ids.sort();
    district_ids.dedup();

    let columns: HashMap<&str, usize> = parties
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.as_str(), idx))
        .collect();
    let row_index: HashMap<&str, usize> = district_ids
        .iter()
        .enumerate()
        .map(|(idx, d)| (d.as_str(), idx))
        .collect();

    let mut rows: Vec<(String, Vec<f64>)> = district_ids
        .iter()
        .map(|d| (d.clone(), vec![0.0; parties.len()]))
        .collect();
    for a in aggregates {
        let row = row_index[a.district_id.as_str()];
        let col = columns[a.party_name.as_str()];
        rows[row].1[col] = round2(a.vote_percentage);
    }

    PercentageTable { parties, rows }
}

/// Sums the aggregation over all the districts of the current selection and
/// normalizes to percentages of the grand total.
fn party_totals(aggregates: &[AggregatedResult]) -> Vec<(String, f64)> {
    let mut sums: BTreeMap<String, u64> = BTreeMap::new();
    for a in aggregates {
        *sums.entry(a.party_name.clone()).or_insert(0) += a.vote_count_sum;
    }
    let grand_total: u64 = sums.values().sum();
    sums.into_iter()
        .map(|(party, sum)| {
            let pct = if grand_total == 0 {
                0.0
            } else {
                round2(sum as f64 / grand_total as f64 * 100.0)
            };
            (party, pct)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, MultiPolygon, Polygon};

    fn square(x0: f64, y0: f64) -> MultiPolygon<f64> {
        let ring = LineString::from(vec![
            (x0, y0),
            (x0 + 1.0, y0),
            (x0 + 1.0, y0 + 1.0),
            (x0, y0 + 1.0),
            (x0, y0),
        ]);
        MultiPolygon(vec![Polygon::new(ring, vec![])])
    }

    fn vote(district: &str, office: &str, party: &str, count: u64) -> VoteRecord {
        VoteRecord {
            district_id: district.to_string(),
            office_name: office.to_string(),
            party_name: party.to_string(),
            vote_count: count,
        }
    }

    fn district(code: &str, region: &str) -> DistrictShape {
        DistrictShape {
            district_code: code.to_string(),
            header_region: region.to_string(),
            shape: square(0.0, 0.0),
        }
    }

    #[test]
    fn normalization_strips_padding_and_keeps_a_zero() {
        assert_eq!(normalize_district_id("0123"), "123");
        assert_eq!(normalize_district_id("123"), "123");
        assert_eq!(normalize_district_id("0000"), "0");
        assert_eq!(normalize_district_id(""), "0");
        // Idempotent on its own output.
        for raw in ["0123", "0000", "", "10"] {
            let once = normalize_district_id(raw);
            assert_eq!(normalize_district_id(&once), once);
        }
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let records = vec![
            vote("1", "X", "A", 17),
            vote("1", "X", "B", 5),
            vote("1", "X", "C", 11),
            vote("2", "X", "A", 3),
            vote("2", "X", "B", 9),
        ];
        let refs: Vec<&VoteRecord> = records.iter().collect();
        let aggregates = aggregate_votes(&refs);
        for district in ["1", "2"] {
            let sum: f64 = aggregates
                .iter()
                .filter(|a| a.district_id == district)
                .map(|a| a.vote_percentage)
                .sum();
            assert!((sum - 100.0).abs() < 1e-6, "district {}: {}", district, sum);
        }
    }

    #[test]
    fn zero_total_reports_zero_shares() {
        let records = vec![vote("1", "X", "A", 0), vote("1", "X", "B", 0)];
        let refs: Vec<&VoteRecord> = records.iter().collect();
        let aggregates = aggregate_votes(&refs);
        assert_eq!(aggregates.len(), 2);
        for a in aggregates {
            assert_eq!(a.vote_percentage, 0.0);
        }
    }

    #[test]
    fn repeated_rows_are_summed_before_ranking() {
        let records = vec![
            vote("1", "X", "A", 30),
            vote("1", "X", "B", 45),
            vote("1", "X", "A", 40),
        ];
        let refs: Vec<&VoteRecord> = records.iter().collect();
        let aggregates = aggregate_votes(&refs);
        let dominant = dominant_parties(&aggregates, TieBreakRule::Alphabetical);
        assert_eq!(dominant.len(), 1);
        assert_eq!(dominant[0].party_name, "A");
        assert_eq!(dominant[0].vote_count_sum, 70);
    }

    #[test]
    fn tie_resolves_to_the_smallest_party_name() {
        // Input order must not matter.
        for records in [
            vec![vote("1", "X", "A", 50), vote("1", "X", "B", 50)],
            vec![vote("1", "X", "B", 50), vote("1", "X", "A", 50)],
        ] {
            let refs: Vec<&VoteRecord> = records.iter().collect();
            let aggregates = aggregate_votes(&refs);
            let dominant = dominant_parties(&aggregates, TieBreakRule::Alphabetical);
            assert_eq!(dominant[0].party_name, "A");
        }
    }

    #[test]
    fn table_order_tie_break_follows_first_appearance() {
        let records = vec![vote("1", "X", "B", 50), vote("1", "X", "A", 50)];
        let refs: Vec<&VoteRecord> = records.iter().collect();
        let aggregates = aggregate_votes(&refs);
        let dominant = dominant_parties(&aggregates, TieBreakRule::TableOrder);
        assert_eq!(dominant[0].party_name, "B");
    }

    #[test]
    fn color_lookup_is_total() {
        let colors = ColorScheme::default();
        assert_eq!(colors.color_for("LA LIBERTAD AVANZA"), "violet");
        assert_eq!(colors.color_for("JUNTOS POR EL CAMBIO"), "yellow");
        assert_eq!(colors.color_for("UNION POR LA PATRIA"), "blue");
        assert_eq!(colors.color_for("SOME OTHER LIST"), "grey");
        // Case-sensitive, exact.
        assert_eq!(colors.color_for("La Libertad Avanza"), "grey");
        assert_eq!(colors.color_for(""), "grey");
    }

    #[test]
    fn inner_join_drops_districts_without_votes() {
        let votes = vec![
            vote("1", "X", "A", 10),
            vote("2", "X", "A", 4),
            vote("2", "X", "B", 6),
        ];
        let districts = vec![district("1", "R"), district("2", "R"), district("3", "R")];
        let view = run_map_stats(
            votes,
            districts,
            &TallyRules::default(),
            &Selection::for_office("X"),
        )
        .unwrap();
        assert_eq!(view.districts.len(), 2);
        let codes: Vec<&str> = view
            .districts
            .iter()
            .map(|d| d.district_code.as_str())
            .collect();
        assert_eq!(codes, vec!["1", "2"]);
    }

    #[test]
    fn left_join_keeps_districts_without_votes() {
        let votes = vec![vote("1", "X", "A", 10)];
        let districts = vec![district("1", "R"), district("3", "R")];
        let rules = TallyRules {
            join_policy: JoinPolicy::Left,
            ..TallyRules::default()
        };
        let view = run_map_stats(votes, districts, &rules, &Selection::for_office("X")).unwrap();
        assert_eq!(view.districts.len(), 2);
        let empty = view
            .districts
            .iter()
            .find(|d| d.district_code == "3")
            .unwrap();
        assert_eq!(empty.winner, None);
        assert_eq!(empty.display_color, "grey");
    }

    #[test]
    fn padded_identifiers_join_after_normalization() {
        let votes = vec![vote("01", "X", "A", 30), vote("01", "X", "B", 70)];
        let districts = vec![district("1", "R")];
        let view = run_map_stats(
            votes,
            districts,
            &TallyRules::default(),
            &Selection::for_office("X"),
        )
        .unwrap();

        assert_eq!(view.districts.len(), 1);
        assert_eq!(view.districts[0].winner.as_deref(), Some("B"));

        assert_eq!(view.percentages.parties, vec!["A", "B"]);
        assert_eq!(view.percentages.rows.len(), 1);
        assert_eq!(view.percentages.rows[0].0, "1");
        assert_eq!(view.percentages.rows[0].1, vec![30.0, 70.0]);
    }

    #[test]
    fn unknown_office_yields_an_empty_view() {
        let votes = vec![vote("1", "X", "A", 10)];
        let districts = vec![district("1", "R")];
        let view = run_map_stats(
            votes,
            districts,
            &TallyRules::default(),
            &Selection::for_office("NO SUCH OFFICE"),
        )
        .unwrap();
        assert!(view.districts.is_empty());
        assert!(view.percentages.rows.is_empty());
        assert!(view.party_totals.is_empty());
    }

    #[test]
    fn region_filter_restricts_both_map_and_tables() {
        let votes = vec![
            vote("1", "X", "A", 10),
            vote("2", "X", "B", 20),
            vote("3", "X", "A", 30),
        ];
        let districts = vec![
            district("1", "La Plata"),
            district("2", "La Plata"),
            district("3", "Quilmes"),
        ];
        let selection = Selection {
            office: "X".to_string(),
            region: Some("La Plata".to_string()),
            district: None,
        };
        let view =
            run_map_stats(votes, districts, &TallyRules::default(), &selection).unwrap();
        assert_eq!(view.districts.len(), 2);
        assert_eq!(view.percentages.rows.len(), 2);
        // Totals cover the filtered scope only: 10 A + 20 B.
        assert_eq!(
            view.party_totals,
            vec![("A".to_string(), 33.33), ("B".to_string(), 66.67)]
        );
    }

    #[test]
    fn single_district_selection() {
        let votes = vec![vote("1", "X", "A", 10), vote("2", "X", "B", 20)];
        let districts = vec![district("1", "R"), district("2", "R")];
        let selection = Selection {
            office: "X".to_string(),
            region: None,
            district: Some("0002".to_string()),
        };
        let view =
            run_map_stats(votes, districts, &TallyRules::default(), &selection).unwrap();
        assert_eq!(view.districts.len(), 1);
        assert_eq!(view.districts[0].district_code, "2");
        assert_eq!(view.percentages.rows.len(), 1);
    }

    #[test]
    fn pivot_rounds_to_two_decimals() {
        let votes = vec![vote("1", "X", "A", 1), vote("1", "X", "B", 2)];
        let districts = vec![district("1", "R")];
        let view = run_map_stats(
            votes,
            districts,
            &TallyRules::default(),
            &Selection::for_office("X"),
        )
        .unwrap();
        assert_eq!(view.percentages.rows[0].1, vec![33.33, 66.67]);
    }

    #[test]
    fn duplicate_district_codes_are_rejected() {
        let districts = vec![district("01", "R"), district("1", "R")];
        let res = TallySession::new(Vec::new(), districts, TallyRules::default());
        assert_eq!(
            res.err(),
            Some(TallyErrors::DuplicateDistrictCode("1".to_string()))
        );
    }

    #[test]
    fn offices_and_regions_are_sorted_and_distinct() {
        let votes = vec![
            vote("1", "SENADOR", "A", 1),
            vote("1", "PRESIDENTE", "A", 1),
            vote("2", "PRESIDENTE", "B", 1),
        ];
        let districts = vec![district("1", "Quilmes"), district("2", "La Plata")];
        let session = TallySession::new(votes, districts, TallyRules::default()).unwrap();
        assert_eq!(session.offices(), vec!["PRESIDENTE", "SENADOR"]);
        assert_eq!(session.regions(), vec!["La Plata", "Quilmes"]);
    }
}
