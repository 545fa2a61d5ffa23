use wiser_hub::Temperature;

#[test]
fn from_hub_units() {
    let t = Temperature::from_hub_units(215);
    assert!((t.celsius() - 21.5).abs() < 0.001);
    assert_eq!(t.to_hub_units(), 215);
}

#[test]
fn hub_units_are_rounded_not_truncated() {
    assert_eq!(Temperature::from_celsius(20.06).to_hub_units(), 201);
    assert_eq!(Temperature::from_celsius(20.04).to_hub_units(), 200);
    assert_eq!(Temperature::from_celsius(19.99).to_hub_units(), 200);
    // 0.57 * 10.0 is 5.699999999999999
    assert_eq!(Temperature::from_celsius(0.57).to_hub_units(), 6);
}

#[test]
fn off_sentinel() {
    assert_eq!(Temperature::OFF.to_hub_units(), -200);
    assert!(Temperature::from_hub_units(-200).is_off());
    assert!(!Temperature::from_celsius(5.0).is_off());
}

#[test]
fn valid_range_is_inclusive() {
    assert!(Temperature::MIN.is_valid());
    assert!(Temperature::MAX.is_valid());
    assert!(Temperature::from_celsius(18.5).is_valid());
    assert!(!Temperature::from_celsius(4.9).is_valid());
    assert!(!Temperature::from_celsius(30.1).is_valid());
    assert!(!Temperature::from_celsius(0.0).is_valid());
}

#[test]
fn off_is_valid_but_not_in_range() {
    assert!(Temperature::OFF.is_valid());
    assert!(!Temperature::OFF.is_in_range());
}

#[test]
fn ordering() {
    assert!(Temperature::from_celsius(3.0) < Temperature::MIN);
    assert!(Temperature::OFF < Temperature::MIN);
}

#[test]
fn display() {
    assert_eq!(Temperature::from_celsius(21.0).to_string(), "21.0\u{00b0}C");
    assert_eq!(Temperature::from_hub_units(185).to_string(), "18.5\u{00b0}C");
}
