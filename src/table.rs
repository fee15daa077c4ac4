//! # Transfer Tables
//!
//! Positional, comma-separated tables of transfers, as exported from a
//! spreadsheet:
//!
//! ```text
//! source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water
//! 3,A1,5,A1,18.25,70.65
//! 1,A10,5,A10,50.75,38.15
//! ```
//!
//! Columns are matched by position, never by header name. The first line
//! with a non-empty first field is the header and is discarded; later lines
//! whose first field is empty are skipped. Volumes are rounded to two decimal
//! places when parsed.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{PlanError, Result};
use crate::labware::{Location, Slot, WellName};

/// Round a volume to two decimal places.
pub fn round_volume(volume: f64) -> f64 {
    (volume * 100.0).round() / 100.0
}

/// Positional column contract of a transfer table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TableLayout {
    /// `source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water`
    Standardize,
    /// `source_slot,source_well,tube_well,vol_dna`; every destination is a
    /// tube in the rack on `tube_rack`.
    Pool {
        /// Slot of the destination tube rack.
        tube_rack: Slot,
    },
    /// `barcode_well,dest_slot,dest_well`; every source is a well of the
    /// adapter plate on `adapter_slot` and every transfer moves `volume`.
    Barcode {
        /// Slot of the adapter strip plate.
        adapter_slot: Slot,
        /// Volume moved per row in µL.
        volume: f64,
    },
}

impl TableLayout {
    /// Number of fields a row must have.
    pub fn column_count(&self) -> usize {
        self.header().len()
    }

    /// Header written when serializing.
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            TableLayout::Standardize => &[
                "source_slot",
                "source_well",
                "dest_slot",
                "dest_well",
                "vol_dna",
                "vol_water",
            ],
            TableLayout::Pool { .. } => &["source_slot", "source_well", "tube_well", "vol_dna"],
            TableLayout::Barcode { .. } => &["barcode_well", "dest_slot", "dest_well"],
        }
    }
}

/// One transfer: move `volume` from `source` to `destination`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Where the liquid is taken from.
    pub source: Location,
    /// Where the liquid goes.
    pub destination: Location,
    /// Volume in µL as written in the table. Bounds apply to this value;
    /// the robot moves it rounded to two decimals.
    pub volume: f64,
    /// Diluent added to the destination before the transfer, if any.
    pub water_volume: Option<f64>,
}

/// An ordered, immutable list of transfer records.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferTable {
    layout: TableLayout,
    records: Vec<TransferRecord>,
}

impl TransferTable {
    /// Wrap already-typed records.
    pub fn from_records(layout: TableLayout, records: Vec<TransferRecord>) -> Self {
        Self { layout, records }
    }

    /// Parse a raw comma-separated table.
    pub fn parse(raw: &str, layout: TableLayout) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        let mut records = Vec::new();
        let mut header_seen = false;

        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line() as usize).unwrap_or(0);

            if row.get(0).map_or(true, str::is_empty) {
                continue;
            }
            if !header_seen {
                header_seen = true;
                continue;
            }

            if row.len() < layout.column_count() {
                return Err(PlanError::malformed(
                    line,
                    format!(
                        "expected {} fields, found {}",
                        layout.column_count(),
                        row.len()
                    ),
                ));
            }

            let field = |i: usize| row.get(i).unwrap_or("");
            let record = match layout {
                TableLayout::Standardize => TransferRecord {
                    source: location(field(0), field(1), line)?,
                    destination: location(field(2), field(3), line)?,
                    volume: volume(field(4), line)?,
                    water_volume: Some(volume(field(5), line)?),
                },
                TableLayout::Pool { tube_rack } => TransferRecord {
                    source: location(field(0), field(1), line)?,
                    destination: Location::new(tube_rack, well(field(2), line)?),
                    volume: volume(field(3), line)?,
                    water_volume: None,
                },
                TableLayout::Barcode {
                    adapter_slot,
                    volume,
                } => TransferRecord {
                    source: Location::new(adapter_slot, well(field(0), line)?),
                    destination: location(field(1), field(2), line)?,
                    volume,
                    water_volume: None,
                },
            };
            records.push(record);
        }

        Ok(Self { layout, records })
    }

    /// Serialize back to the positional text form, header included.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(self.layout.header())?;

        for r in &self.records {
            let row: Vec<String> = match self.layout {
                TableLayout::Standardize => vec![
                    r.source.slot.to_string(),
                    r.source.well.to_string(),
                    r.destination.slot.to_string(),
                    r.destination.well.to_string(),
                    r.volume.to_string(),
                    r.water_volume.unwrap_or(0.0).to_string(),
                ],
                TableLayout::Pool { .. } => vec![
                    r.source.slot.to_string(),
                    r.source.well.to_string(),
                    r.destination.well.to_string(),
                    r.volume.to_string(),
                ],
                TableLayout::Barcode { .. } => vec![
                    r.source.well.to_string(),
                    r.destination.slot.to_string(),
                    r.destination.well.to_string(),
                ],
            };
            writer.write_record(&row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| PlanError::IoError(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| PlanError::config(format!("non UTF-8 table output: {}", e)))
    }

    /// Records in table order.
    pub fn records(&self) -> &[TransferRecord] {
        &self.records
    }

    /// Iterate records in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, TransferRecord> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a TransferTable {
    type Item = &'a TransferRecord;
    type IntoIter = std::slice::Iter<'a, TransferRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn location(slot: &str, well_name: &str, line: usize) -> Result<Location> {
    let slot = Slot::from_str(slot).map_err(|e| PlanError::malformed(line, e))?;
    Ok(Location::new(slot, well(well_name, line)?))
}

fn well(name: &str, line: usize) -> Result<WellName> {
    WellName::from_str(name).map_err(|e| PlanError::malformed(line, e))
}

fn volume(value: &str, line: usize) -> Result<f64> {
    let v: f64 = value
        .parse()
        .map_err(|_| PlanError::malformed(line, format!("'{}' is not a volume", value)))?;
    if !v.is_finite() {
        return Err(PlanError::malformed(line, format!("'{}' is not a finite volume", value)));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARDIZE: &str = "
    source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water
    1,A1,1,A1,40,60
    1,C1,1,B1,66.67,33.33
    2,D1,2,C1,20,80
    3,E3,2,D1,10,90
    ";

    #[test]
    fn test_parse_single_row() {
        let table = TransferTable::parse("header\n1,A1,5,A1,40,60", TableLayout::Standardize).unwrap();
        assert_eq!(table.len(), 1);
        let r = &table.records()[0];
        assert_eq!(r.volume, 40.0);
        assert_eq!(r.water_volume, Some(60.0));
        assert_eq!(r.source.to_string(), "1:A1");
        assert_eq!(r.destination.to_string(), "5:A1");
    }

    #[test]
    fn test_parse_indented_block() {
        let table = TransferTable::parse(STANDARDIZE, TableLayout::Standardize).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.records()[1].volume, 66.67);
        assert_eq!(table.records()[3].destination.well.to_string(), "D1");
    }

    #[test]
    fn test_blank_first_field_is_skipped() {
        let raw = "a,b,c,d,e,f\n1,A1,5,A1,10,10\n,A2,5,A2,10,10\n   \n2,A3,5,A3,10,10\n";
        let table = TransferTable::parse(raw, TableLayout::Standardize).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].source.slot.number(), 2);
    }

    #[test]
    fn test_short_row_is_malformed() {
        let raw = "header\n1,A1,5,A1,40,60\n1,A2,5,A2,40\n";
        match TransferTable::parse(raw, TableLayout::Standardize) {
            Err(PlanError::MalformedRow { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("expected 6 fields, found 5"));
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_values_are_malformed() {
        for raw in [
            "h\n1,Z1,5,A1,40,60",
            "h\n0,A1,5,A1,40,60",
            "h\n1,A1,5,A1,forty,60",
            "h\n1,A1,5,A1,NaN,60",
        ] {
            assert!(matches!(
                TransferTable::parse(raw, TableLayout::Standardize),
                Err(PlanError::MalformedRow { line: 2, .. })
            ));
        }
    }

    #[test]
    fn test_volumes_kept_as_written() {
        let table = TransferTable::parse("h\n1,A1,5,A1,12.3456,0.004", TableLayout::Standardize).unwrap();
        assert_eq!(table.records()[0].volume, 12.3456);
        assert_eq!(table.records()[0].water_volume, Some(0.004));
        assert_eq!(round_volume(12.3456), 12.35);
    }

    #[test]
    fn test_pool_layout() {
        let layout = TableLayout::Pool {
            tube_rack: Slot::new(1).unwrap(),
        };
        let raw = "source_slot,source_well,tube_well,vol_dna\n1,A1,A1,40\n3,C11,A3,54.1    \n";
        let table = TransferTable::parse(raw, layout).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].destination.to_string(), "1:A3");
        assert_eq!(table.records()[1].volume, 54.1);
        assert_eq!(table.records()[1].water_volume, None);
    }

    #[test]
    fn test_barcode_layout() {
        let layout = TableLayout::Barcode {
            adapter_slot: Slot::new(2).unwrap(),
            volume: 2.0,
        };
        let raw = "barcode_well, dest_slot, dest_well\nA1,5,A1\nA2,6,B2\n";
        let table = TransferTable::parse(raw, layout).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].source.to_string(), "2:A2");
        assert_eq!(table.records()[1].destination.to_string(), "6:B2");
        assert_eq!(table.records()[1].volume, 2.0);
    }

    #[test]
    fn test_roundtrip_preserves_order_and_values() {
        let table = TransferTable::parse(STANDARDIZE, TableLayout::Standardize).unwrap();
        let text = table.to_csv_string().unwrap();
        assert!(text.starts_with("source_slot,source_well,dest_slot,dest_well,vol_dna,vol_water\n"));
        let restored = TransferTable::parse(&text, TableLayout::Standardize).unwrap();
        assert_eq!(restored, table);
    }

    #[test]
    fn test_empty_table() {
        let table = TransferTable::parse("", TableLayout::Standardize).unwrap();
        assert!(table.is_empty());
        let table = TransferTable::parse("only,a,header,row,x,y", TableLayout::Standardize).unwrap();
        assert!(table.is_empty());
    }
}
