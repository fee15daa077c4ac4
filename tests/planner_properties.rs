//! Property tests for tool selection, batching and transfer tables.

use liquidplan::labware::{Location, Slot, WellName};
use liquidplan::planner::{group_for_batch, validate_records, ToolId, ToolSet, TransferPass, VolumeBounds, WashSchedule};
use liquidplan::table::{round_volume, TableLayout, TransferRecord, TransferTable};
use proptest::prelude::*;

fn location() -> impl Strategy<Value = Location> {
    (1u8..=11, 0u8..8, 1u8..=12).prop_map(|(slot, row, column)| {
        Location::new(Slot::new(slot).unwrap(), WellName::new(row, column).unwrap())
    })
}

fn record() -> impl Strategy<Value = TransferRecord> {
    (location(), location(), 1.0f64..200.0, 0.0f64..200.0).prop_map(|(source, destination, volume, water)| {
        TransferRecord {
            source,
            destination,
            volume,
            water_volume: Some(water),
        }
    })
}

proptest! {
    /// Volumes up to the small tool's capacity go to it, larger ones to the large tool
    #[test]
    fn test_tool_threshold(volume in 0.0f64..=300.0) {
        let bounds = VolumeBounds { min: 0.0, max: 300.0 };
        let tool = ToolSet::PAIR.select_tool(volume, bounds, "prop").unwrap();
        if volume == 0.0 {
            prop_assert_eq!(tool, None);
        } else if volume <= 20.0 {
            prop_assert_eq!(tool, Some(ToolId::Small));
        } else {
            prop_assert_eq!(tool, Some(ToolId::Large));
        }
    }

    /// Anything outside the bounds is rejected
    #[test]
    fn test_out_of_bounds_rejected(volume in prop_oneof![-100.0f64..1.0, 200.0001f64..1000.0]) {
        prop_assert!(ToolSet::PAIR.select_tool(volume, VolumeBounds::DNA, "prop").is_err());
    }

    /// Groups cover every item exactly once, in order, all full but the last
    #[test]
    fn test_group_for_batch_partition(count in 0usize..200, batch in 1usize..15) {
        let groups = group_for_batch(count, batch);
        let flattened: Vec<usize> = groups.iter().cloned().flatten().collect();
        prop_assert_eq!(flattened, (0..count).collect::<Vec<_>>());
        prop_assert_eq!(groups.len(), (count + batch - 1) / batch);
        if let Some((last, full)) = groups.split_last() {
            prop_assert!(full.iter().all(|g| g.len() == batch));
            prop_assert!(!last.is_empty() && last.len() <= batch);
        }
    }

    /// Elution ranges cover every column once
    #[test]
    fn test_elution_covers_columns(columns in 1usize..=12, batch in 1usize..=12) {
        let schedule = WashSchedule::new(columns, batch);
        let covered: Vec<usize> = schedule.elution.iter().cloned().flatten().collect();
        prop_assert_eq!(covered, (0..columns).collect::<Vec<_>>());
        prop_assert_eq!(schedule.air_dry, schedule.groups.len() % 2 == 1);
        if let Some(after) = schedule.early_elution_after {
            prop_assert!(after < schedule.groups.len());
        }
    }

    /// Serializing and parsing again keeps order and the values as written
    #[test]
    fn test_table_text_roundtrip(records in prop::collection::vec(record(), 1..40)) {
        let table = TransferTable::from_records(TableLayout::Standardize, records.clone());
        let text = table.to_csv_string().unwrap();
        let parsed = TransferTable::parse(&text, TableLayout::Standardize).unwrap();

        prop_assert_eq!(parsed.records(), records.as_slice());
    }

    /// Planned volumes are the written ones rounded to two decimals
    #[test]
    fn test_planned_volumes_rounded(records in prop::collection::vec(record(), 1..40)) {
        let planned = validate_records(&records, &ToolSet::PAIR, VolumeBounds::WATER, TransferPass::Water, |r| {
            r.water_volume.unwrap_or(0.0)
        })
        .unwrap();
        for (record, transfer) in records.iter().zip(&planned) {
            let rounded = round_volume(record.water_volume.unwrap_or(0.0));
            prop_assert_eq!(transfer.volume, rounded);
            prop_assert_eq!(transfer.tool.is_none(), rounded == 0.0);
        }
    }
}
