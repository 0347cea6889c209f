use log::{info, warn};

use circuit_tally::{
    JoinPolicy, MapView, Selection, TallyErrors, TallyRules, TallySession, TieBreakRule,
};
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_archive;
pub mod io_circuits;
pub mod io_votes;
pub mod render;

#[derive(Debug, Snafu)]
pub enum MapError {
    #[snafu(display("Error opening votes file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of the votes file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Votes file {path} is missing the columns {missing:?}"))]
    VotesSchemaMismatch { path: String, missing: Vec<String> },
    #[snafu(display("Line {lineno} of the votes file has no value for column {column}"))]
    CsvLineTooShort { lineno: usize, column: String },
    #[snafu(display("Could not read {value:?} as a vote count (line {lineno})"))]
    BadVoteCount { value: String, lineno: usize },

    #[snafu(display("Error opening geometry file {path}"))]
    GeoJsonOpen { source: std::io::Error, path: String },
    #[snafu(display("Error parsing geometry file {path}"))]
    GeoJsonParse {
        source: geojson::Error,
        path: String,
    },
    #[snafu(display("Feature {index} of the geometry file has no usable property {name:?}"))]
    GeoSchemaMismatch { index: usize, name: String },
    #[snafu(display("Feature {index} of the geometry file carries a non-polygonal geometry"))]
    GeoNotPolygonal { index: usize },

    #[snafu(display("Error opening archive {path}"))]
    ZipOpen {
        source: zip::result::ZipError,
        path: String,
    },
    #[snafu(display("No entry matching {wanted:?} in archive {path}"))]
    ZipEntryMissing { wanted: String, path: String },

    #[snafu(display("Error reading input {path}"))]
    ReadingInput { source: std::io::Error, path: String },
    #[snafu(display("Error writing output {path}"))]
    WritingOutput { source: std::io::Error, path: String },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },
    #[snafu(display("Error parsing the reference summary {path}"))]
    ParsingReference {
        source: serde_json::Error,
        path: String,
    },

    #[snafu(display("Could not assemble the tally session: {source}"))]
    Session { source: TallyErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type MapResult<T> = Result<T, MapError>;

/// The selection and rules echoed at the top of the JSON summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub office: String,
    pub region: Option<String>,
    pub district: Option<String>,
    pub join: String,
    pub tiebreak: String,
}

fn validate_rules(join: Option<&str>, tiebreak: Option<&str>) -> MapResult<TallyRules> {
    let join_policy = match join {
        None | Some("inner") => JoinPolicy::Inner,
        Some("left") => JoinPolicy::Left,
        Some(x) => {
            whatever!("Cannot use join policy {:?} (expected 'inner' or 'left')", x)
        }
    };
    let tiebreak_rule = match tiebreak {
        None | Some("alphabetical") => TieBreakRule::Alphabetical,
        Some("tableOrder") => TieBreakRule::TableOrder,
        Some(x) => {
            whatever!(
                "Cannot use tiebreak rule {:?} (expected 'alphabetical' or 'tableOrder')",
                x
            )
        }
    };
    Ok(TallyRules {
        join_policy,
        tiebreak_rule,
        ..TallyRules::default()
    })
}

fn map_title(selection: &Selection) -> String {
    let region = selection.region.as_deref().unwrap_or("Todas");
    format!("Mapa de Circuitos en {} ({})", region, selection.office)
}

fn build_summary_js(rules: &TallyRules, selection: &Selection, view: &MapView) -> JSValue {
    let c = SummaryConfig {
        office: selection.office.clone(),
        region: selection.region.clone(),
        district: selection.district.clone(),
        join: match rules.join_policy {
            JoinPolicy::Inner => "inner",
            JoinPolicy::Left => "left",
        }
        .to_string(),
        tiebreak: match rules.tiebreak_rule {
            TieBreakRule::Alphabetical => "alphabetical",
            TieBreakRule::TableOrder => "tableOrder",
        }
        .to_string(),
    };

    let mut districts: Vec<JSValue> = Vec::new();
    for d in view.districts.iter() {
        districts.push(json!({
            "circuito": d.district_code,
            "cabecera": d.header_region,
            "winner": d.winner,
            "color": d.display_color,
        }));
    }

    let mut table: JSMap<String, JSValue> = JSMap::new();
    for (district, cells) in view.percentages.rows.iter() {
        let mut row: JSMap<String, JSValue> = JSMap::new();
        for (party, pct) in view.percentages.parties.iter().zip(cells.iter()) {
            row.insert(party.clone(), json!(pct));
        }
        table.insert(district.clone(), JSValue::Object(row));
    }

    let mut totals: JSMap<String, JSValue> = JSMap::new();
    for (party, pct) in view.party_totals.iter() {
        totals.insert(party.clone(), json!(pct));
    }

    json!({
        "config": c,
        "districts": districts,
        "percentages": table,
        "totals": totals,
    })
}

fn read_summary(path: &str) -> MapResult<JSValue> {
    let contents = fs::read_to_string(path).context(ReadingInputSnafu { path })?;
    let js: JSValue =
        serde_json::from_str(contents.as_str()).context(ParsingReferenceSnafu { path })?;
    Ok(js)
}

fn print_tables(view: &MapView) {
    let width = view
        .percentages
        .rows
        .iter()
        .map(|(district, _)| district.len())
        .max()
        .unwrap_or(0)
        .max("circuito".len());

    let mut header = format!("{:<width$}", "circuito", width = width);
    for party in view.percentages.parties.iter() {
        header.push_str(&format!("  {:>w$}", party, w = party.len().max(6)));
    }
    println!("{}", header);
    for (district, cells) in view.percentages.rows.iter() {
        let mut line = format!("{:<width$}", district, width = width);
        for (party, pct) in view.percentages.parties.iter().zip(cells.iter()) {
            line.push_str(&format!("  {:>w$.2}", pct, w = party.len().max(6)));
        }
        println!("{}", line);
    }
    println!();
    println!("Total percentages over the selected area:");
    for (party, pct) in view.party_totals.iter() {
        println!("  {:>6.2}  {}", pct, party);
    }
}

pub fn run_map(args: &Args) -> MapResult<()> {
    let rules = validate_rules(args.join.as_deref(), args.tiebreak.as_deref())?;

    let votes = io_votes::read_votes_path(&args.votes, args.votes_entry.as_deref(), args.limit)?;
    info!("run_map: {} vote records read from {}", votes.len(), args.votes);
    let shapes = io_circuits::read_circuits_path(&args.circuits, args.circuits_entry.as_deref())?;
    info!(
        "run_map: {} district shapes read from {}",
        shapes.len(),
        args.circuits
    );

    let session = TallySession::new(votes, shapes, rules.clone()).context(SessionSnafu {})?;

    if args.list {
        println!("Offices:");
        for office in session.offices() {
            println!("  {}", office);
        }
        println!("Regions:");
        for region in session.regions() {
            println!("  {}", region);
        }
        return Ok(());
    }

    let office = match &args.office {
        Some(office) => office.clone(),
        None => {
            whatever!("No office selected. Use --office (or --list to see the available values)")
        }
    };
    let selection = Selection {
        office,
        region: args.region.clone(),
        district: args.district.clone(),
    };

    let view = session.snapshot(&selection);

    if view.districts.is_empty() && view.percentages.rows.is_empty() {
        warn!("run_map: nothing matches the current selection");
        println!("No data for {} in the selected area.", selection.office);
    } else {
        print_tables(&view);
    }

    if let Some(out) = &args.out {
        let svg = render::render_svg(&view, &map_title(&selection), 900);
        fs::write(out, svg).context(WritingOutputSnafu { path: out.clone() })?;
        info!("run_map: map written to {}", out);
    }

    let summary_js = build_summary_js(&rules, &selection, &view);
    let pretty = serde_json::to_string_pretty(&summary_js).context(SerializingSummarySnafu {})?;

    match args.summary.as_deref() {
        Some("stdout") => println!("{}", pretty),
        Some(path) => {
            fs::write(path, &pretty).context(WritingOutputSnafu { path })?;
            info!("run_map: summary written to {}", path);
        }
        None => {}
    }

    if let Some(reference_path) = &args.reference {
        let reference = read_summary(reference_path)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference).context(SerializingSummarySnafu {})?;
        if pretty_reference != pretty {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty.as_str(), "\n");
            whatever!("Difference detected between the computed summary and the reference summary");
        }
    }

    Ok(())
}
