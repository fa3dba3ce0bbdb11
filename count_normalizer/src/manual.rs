/*!

This is the long-form manual for `count_normalizer` and `bikeviz`.

## Input layouts

Two layouts are recognized. Column names are free text: the role of every
column is inferred from its name and, as a last resort, from the type of its
values (see [`crate::classify::ROLE_RULES`] for the exact order of the rules).

### Wide

One row per time period, one column per location. The cells are counts.

| Year | Month | Burrard Bridge | Hornby Street | ... |
|------|-------|----------------|---------------|-----|
| 2022 | Jan   | 1000           | 0             |     |
| 2022 | Feb   | 1,250          | *             |     |

Each positive count becomes one observation. A blank, zero or `*` cell
means "not measured" and produces nothing. The date of a row is resolved
once and shared by all the observations of that row.

### Long

One row per observation, with a date, a location and a count column:

| Location   | Direction | date       | Volume |
|------------|-----------|------------|--------|
| Lions Gate | N         | 2023-05-10 | 1,250  |

Extra columns (`Direction` here) are ignored. When several count columns are
present, the first one whose name says so (`count`, `volume`, `trips`) is
used. Zero counts are kept in this layout, unless configured otherwise with
the `zeroCounts` option.

### Unrecognized tables

When neither layout applies, a loosened pass is attempted: if the table has
a date, every other column whose values all look like counts is read as a
location of a wide table. Otherwise the source produces no data.

## Dates

In order of preference:
* an explicit date column (`2023-05-10`, `2023/05/10`, `05/10/2023`,
  `10-May-2023`, with or without a time of day)
* month-level labels in the date column (`2023-05`, `May 2023`, `23-May`)
* separate year and month columns. Two-digit years are read as 20xx, months
  may be numbers, names or abbreviations.

When only the month is known, the date is set to the 15th of the month.

## Source formats

The `bikeviz` program reads:
* `csv` delimited text (the delimiter can be configured)
* `xlsx` and `xls` spreadsheets. Without a configured worksheet name, the
  first worksheet with more than 5 columns is used, and the first worksheet
  otherwise.

Tables published as PDF documents must first be extracted to delimited text.

## Output

The combined dataset is written as a CSV file with the columns
`Date,Year,Month,Route,Count`, sorted by date and route. When the same
date and route appear in both the recent and the historical sources, the
recent value is kept.

*/
