/*!

This is the long-form manual for `circuit_tally` and `circmap`.

## Input formats

`circmap` consumes two local files. Both may be given directly or wrapped in
a ZIP archive, which is how the government portals publish them; when a
`.zip` path is given, the entry is located by extension (override with
`--votes-entry` / `--circuits-entry`).

### Electoral results (CSV)

A CSV file with a header row. The following columns are required; any other
column is ignored:

| column              | content                                   |
|---------------------|-------------------------------------------|
| `circuito_id`       | district identifier, possibly zero-padded |
| `cargo_nombre`      | office being voted for                    |
| `agrupacion_nombre` | party or coalition name                   |
| `votos_cantidad`    | non-negative vote count                   |

A missing column aborts the run with a message naming every missing column.
Counts are read as integers; a float rendering with a zero fractional part
(`"123.0"`) is tolerated.

### District geometry (GeoJSON)

A `FeatureCollection` where every feature carries a `Polygon` or
`MultiPolygon` geometry in EPSG:4326 and the properties:

| property   | content                                         |
|------------|-------------------------------------------------|
| `circuito` | district code, as a string or a bare number     |
| `cabecera` | region label the district belongs to            |

## Identifier normalization

The two sources pad district identifiers differently (`"0001"` in the
results, `"1"` in the geometry). Both sides are stripped of leading zeros
before joining. An all-zero identifier becomes `"0"`, never the empty
string.

## Rules

* `--join inner` (default) drops districts that have no vote rows for the
  selected office; `--join left` keeps them on the map with the fallback
  color and no winner.
* `--tiebreak alphabetical` (default) resolves equal maximal counts towards
  the lexicographically smallest party name; `--tiebreak tableOrder`
  resolves towards the party appearing first in the vote table. Both are
  reproducible run over run.
* Party colors are a fixed, case-sensitive table; unlisted parties render in
  grey.

## Outputs

* The per-district percentage matrix and the party totals of the selected
  area, printed to stdout.
* `--out map.svg` writes the choropleth map.
* `--summary out.json` (or `--summary stdout`) writes a JSON summary holding
  the selection, the colored districts, the percentage matrix and the party
  totals.
* `--reference ref.json` compares the computed summary against a reference
  file and fails on any difference.

*/
