use clap::Parser;

/// This program builds electoral district choropleth maps and percentage
/// tables from an electoral results table and a district geometry file.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The electoral results table in CSV format. A .zip archive is
    /// accepted; the contained .csv entry is used.
    #[clap(long, value_parser)]
    pub votes: String,

    /// (file path) The district geometry as a GeoJSON feature collection. A .zip
    /// archive is accepted; the contained .geojson entry is used.
    #[clap(long, value_parser)]
    pub circuits: String,

    /// (optional) Entry name inside the votes archive, when the extension lookup
    /// is not enough.
    #[clap(long, value_parser)]
    pub votes_entry: Option<String>,

    /// (optional) Entry name inside the circuits archive.
    #[clap(long, value_parser)]
    pub circuits_entry: Option<String>,

    /// The office (cargo) to tabulate, matched exactly against the cargo_nombre
    /// column. Mandatory unless --list is passed.
    #[clap(long, value_parser)]
    pub office: Option<String>,

    /// (optional) Restrict the map to one region (cabecera).
    #[clap(long, value_parser)]
    pub region: Option<String>,

    /// (optional) Restrict the map to a single district code (circuito).
    #[clap(long, value_parser)]
    pub district: Option<String>,

    /// (default inner) Join policy for districts without vote data: 'inner' drops
    /// them from the map, 'left' keeps them uncolored.
    #[clap(long, value_parser)]
    pub join: Option<String>,

    /// (default alphabetical) Tie-break rule when two parties share the maximal
    /// count in a district: 'alphabetical' or 'tableOrder'.
    #[clap(long, value_parser)]
    pub tiebreak: Option<String>,

    /// (optional) Read at most this many vote rows. Useful to keep trial runs
    /// fast on the full national table.
    #[clap(long, value_parser)]
    pub limit: Option<usize>,

    /// (file path or empty) If specified, the choropleth map will be written as
    /// SVG to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the
    /// computation will be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub summary: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, circmap will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, prints the office and region names found in the
    /// inputs and exits.
    #[clap(long, takes_value = false)]
    pub list: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard
    /// output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
