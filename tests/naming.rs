use std::path::Path;

use csv_ingest::naming::TableNaming;
use proptest::prelude::*;
use regex::Regex;

#[test]
fn resolves_against_base_name_not_full_path() {
    let naming = TableNaming::Pattern(Regex::new(r"^(.+)_\d{8}_.*\.csv$").expect("pattern"));
    let name = naming
        .resolve(Path::new("/srv/drop_1234/wide_20210725_a.csv"))
        .expect("resolve");
    assert_eq!(name, "wide");
}

#[test]
fn explicit_table_overrides_any_pattern_concerns() {
    let naming = TableNaming::Explicit("flights".into());
    assert_eq!(
        naming.resolve(Path::new("does-not-match-anything")).unwrap(),
        "flights"
    );
}

proptest! {
    /// For any captured stem, resolution returns exactly the captured
    /// substring of the file name.
    #[test]
    fn capture_group_is_returned_verbatim(stem in "[a-z][a-z0-9_]{0,20}", suffix in "[0-9]{1,6}") {
        let naming = TableNaming::Pattern(Regex::new(r"^(.+)-\d+\.csv$").expect("pattern"));
        let file = format!("{stem}-{suffix}.csv");
        let resolved = naming.resolve(Path::new(&file)).expect("matching input");
        prop_assert_eq!(resolved, stem);
    }

    #[test]
    fn resolution_is_deterministic(stem in "[a-z]{1,12}") {
        let naming = TableNaming::Pattern(Regex::new(r"^(.+)\.csv$").expect("pattern"));
        let file = format!("{stem}.csv");
        let first = naming.resolve(Path::new(&file)).expect("match");
        let second = naming.resolve(Path::new(&file)).expect("match");
        prop_assert_eq!(first, second);
    }
}
