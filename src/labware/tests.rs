use super::*;
use std::str::FromStr;

#[test]
fn test_well_name_parsing() {
    let well = WellName::from_str("C11").unwrap();
    assert_eq!(well.row_letter(), 'C');
    assert_eq!(well.column(), 11);
    assert_eq!(well.to_string(), "C11");

    // lowercase and padding are tolerated
    assert_eq!(WellName::from_str(" h12 ").unwrap().to_string(), "H12");

    assert!(WellName::from_str("I1").is_err());
    assert!(WellName::from_str("A0").is_err());
    assert!(WellName::from_str("A13").is_err());
    assert!(WellName::from_str("").is_err());
    assert!(WellName::from_str("A").is_err());
}

#[test]
fn test_row_major_order() {
    let wells: Vec<String> = WellName::row_major().map(|w| w.to_string()).collect();
    assert_eq!(wells.len(), 96);
    assert_eq!(wells[0], "A1");
    assert_eq!(wells[11], "A12");
    assert_eq!(wells[12], "B1");
    assert_eq!(wells[95], "H12");

    for (i, well) in WellName::row_major().enumerate() {
        assert_eq!(well.row_major_index(), i);
    }
}

#[test]
fn test_first_n_wells() {
    let wells: Vec<String> = WellName::first_n(30).map(|w| w.to_string()).collect();
    assert_eq!(wells.len(), 30);
    assert_eq!(wells.last().map(String::as_str), Some("C6"));
    assert_eq!(WellName::first_n(200).count(), 96);
}

#[test]
fn test_column_head() {
    assert_eq!(WellName::column_head(0).unwrap().to_string(), "A1");
    assert_eq!(WellName::column_head(11).unwrap().to_string(), "A12");
    assert!(WellName::column_head(12).is_none());
}

#[test]
fn test_slot_bounds() {
    assert!(Slot::new(0).is_none());
    assert!(Slot::new(12).is_none());
    assert_eq!(Slot::from_str(" 5 ").unwrap().number(), 5);
    assert!(Slot::from_str("x").is_err());
}

#[test]
fn test_enumerated_options() {
    assert_eq!(Mount::from_str("LEFT").unwrap(), Mount::Left);
    assert!(Mount::from_str("middle").is_err());

    assert_eq!(
        PlateType::from_str("nest_100ul").unwrap().load_name(),
        load_names::NEST_96_100UL
    );
    assert!(PlateType::from_str("corning_384").is_err());

    assert_eq!(PlateStatus::from_str("fresh").unwrap(), PlateStatus::Clean);
    assert_eq!(PlateStatus::from_str("used").unwrap(), PlateStatus::Used);
    assert!(PlateStatus::from_str("dirty").is_err());

    assert_eq!(ExtraRack::from_str("300").unwrap(), ExtraRack::Large);
    assert!(ExtraRack::from_str("1000").is_err());
}

#[test]
fn test_extra_rack_slots() {
    assert_eq!(ExtraRack::None.tip_slots(), (&[10u8, 11][..], &[8u8, 9][..]));
    assert_eq!(ExtraRack::Large.tip_slots().0, &[7, 10, 11]);
    assert_eq!(ExtraRack::Small.tip_slots().1, &[7, 8, 9]);
}

#[test]
fn test_plate_series() {
    let plates = PlateDescriptor::series(2, 3, PlateType::Nest100ul, "sample plate");
    let slots: Vec<u8> = plates.iter().map(|p| p.slot.number()).collect();
    assert_eq!(slots, vec![2, 3, 4]);
    assert_eq!(plates[2].label, "sample plate 3");

    // Plates that would fall off the deck are dropped
    assert_eq!(PlateDescriptor::series(10, 5, PlateType::Biorad200ul, "p").len(), 2);
}

#[test]
fn test_serde_forms() {
    let loc = Location::new(Slot::new(5).unwrap(), WellName::from_str("B3").unwrap());
    let json = serde_json::to_string(&loc).unwrap();
    assert_eq!(json, r#"{"slot":5,"well":"B3"}"#);
    let restored: Location = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, loc);

    assert!(serde_json::from_str::<Location>(r#"{"slot":12,"well":"B3"}"#).is_err());
    assert_eq!(
        serde_json::from_str::<PlateStatus>(r#""fresh""#).unwrap(),
        PlateStatus::Clean
    );
}
