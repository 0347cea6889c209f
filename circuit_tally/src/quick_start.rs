/*!

# Quick start

This example walks through building a district map for the 2023 Argentine
general election, from the published archives to an SVG choropleth.

**Getting the data** Two files are needed: the electoral results CSV and the
electoral district geometry. Both are published as ZIP archives:

* results: `2023_generales_1.zip` from the national open data portal
  (contains `ResultadosElectorales_2023_Generales.csv`);
* geometry: `circuitos-electorales.zip` from the Buenos Aires province
  catalog (contains `circuitos-electorales.geojson`).

Download both; there is no need to unpack them, `circmap` reads the entries
straight out of the archives.

**Discovering the selection values** The office and region names must match
the source exactly. List them first:

```bash
circmap --votes 2023_generales_1.zip --circuits circuitos-electorales.zip --list
```

**Building a map** Pick an office (and optionally a region) and render:

```bash
circmap --votes 2023_generales_1.zip --circuits circuitos-electorales.zip \
    --office PRESIDENTE --region "La Plata" --out la_plata.svg
```

After running this command, the percentage tables are printed and the map is
written:

```text
[INFO  circuit_tally] session: 1203440 vote records, 13411 district shapes
[INFO  circuit_tally] snapshot: office "PRESIDENTE" region Some("La Plata") district None
[INFO  circuit_tally] snapshot: 163 colored districts, 163 table rows
circuito  JUNTOS POR EL CAMBIO  LA LIBERTAD AVANZA  UNION POR LA PATRIA
1                        24.11               31.96                35.78
...
```

Each district is filled with the color of its winning party; districts
without vote rows for the selected office are dropped (pass `--join left`
to keep them in grey).

**Machine-readable output** Add `--summary results.json` to keep the tables
in JSON form, for example to check a later run against it with
`--reference results.json`.

*/
