//! Filter engine: empty-means-all, subset correctness, cascade, copies.

use chrono::NaiveDate;
use salesdash_core::{
    catalog::Catalog,
    classifier::Chipset,
    config::GenerationConfig,
    dataset::{generate, Dataset},
    dimensions::{SalesChannel, Team, Theater, Weighted},
    filter::{filter, filter_options, DateRange, FilterCriteria, ResolvedFilter},
    record::TransactionRecord,
};
use std::collections::BTreeSet;
use std::sync::Arc;

fn build(cfg: GenerationConfig) -> Dataset {
    generate(&cfg.params().unwrap(), &cfg.profile().unwrap(), Arc::new(Catalog::builtin()))
}

fn dataset(seed: u64, n: i64) -> Dataset {
    build(GenerationConfig { seed, record_count: n, ..Default::default() })
}

fn names(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn ids(records: &[TransactionRecord]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

#[test]
fn empty_criteria_is_identity() {
    let ds = dataset(42, 3_000);
    let out = filter(&ds, &FilterCriteria::all());
    assert_eq!(out.records(), ds.records());
}

/// 100 records, theater domain restricted to Americas. Both {Americas}
/// and {} must return all 100.
#[test]
fn restricted_theater_scenario() {
    let ds = build(GenerationConfig {
        seed: 42,
        record_count: 100,
        theaters: vec![Weighted::new(Theater::Americas, 1.0)],
        ..Default::default()
    });

    let americas = FilterCriteria {
        theaters: BTreeSet::from([Theater::Americas]),
        ..Default::default()
    };
    let only_americas = filter(&ds, &americas);
    assert_eq!(only_americas.len(), 100);
    assert!(only_americas.iter().all(|r| r.sale().theater == Theater::Americas));

    let everything = filter(&ds, &FilterCriteria::all());
    assert_eq!(everything.len(), 100);
}

#[test]
fn filter_output_is_exactly_the_matching_subset() {
    let ds = dataset(99, 5_000);
    let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 8, 31).unwrap();
    let criteria = FilterCriteria {
        theaters: BTreeSet::from([Theater::Europe, Theater::Japan]),
        chipsets: BTreeSet::from([Chipset::M3Series, Chipset::ASeries]),
        channels: BTreeSet::from([SalesChannel::Online, SalesChannel::Retail]),
        teams: (1..=10).map(Team).collect(),
        date_range: Some(DateRange::new(start, end)),
        ..Default::default()
    };

    let expected: Vec<String> = ds
        .records()
        .iter()
        .filter(|r| {
            let s = r.sale();
            matches!(s.theater, Theater::Europe | Theater::Japan)
                && matches!(r.chipset(), Chipset::M3Series | Chipset::ASeries)
                && matches!(s.channel, SalesChannel::Online | SalesChannel::Retail)
                && s.team.0 <= 10
                && s.timestamp.date() >= start
                && s.timestamp.date() <= end
        })
        .map(|r| r.id().to_string())
        .collect();

    let out = filter(&ds, &criteria);
    assert!(!out.is_empty(), "criteria should match something in 5000 records");
    assert_eq!(ids(&out), expected);
}

#[test]
fn within_dimension_is_or() {
    let ds = dataset(5, 2_000);
    let one = |c: &str| {
        filter(&ds, &FilterCriteria { categories: names(&[c]), ..Default::default() }).len()
    };
    let both = filter(
        &ds,
        &FilterCriteria { categories: names(&["iPhone", "Audio"]), ..Default::default() },
    )
    .len();
    assert_eq!(both, one("iPhone") + one("Audio"));
}

#[test]
fn unknown_category_matches_nothing() {
    let ds = dataset(42, 1_000);
    let criteria = FilterCriteria { categories: names(&["Newton"]), ..Default::default() };
    assert!(filter(&ds, &criteria).is_empty(), "stale UI value must give an empty result");
}

#[test]
fn unknown_color_matches_nothing() {
    let ds = dataset(42, 1_000);
    let criteria = FilterCriteria { colors: names(&["Chartreuse"]), ..Default::default() };
    assert!(filter(&ds, &criteria).is_empty());
}

#[test]
fn stale_model_selection_is_dropped_by_category_change() {
    let ds = dataset(42, 2_000);
    // The user picked a Mac model, then switched the category to iPhone.
    let criteria = FilterCriteria {
        categories: names(&["iPhone"]),
        models: names(&["MacBook Air M3"]),
        ..Default::default()
    };
    let out = filter(&ds, &criteria);
    let all_iphone = filter(
        &ds,
        &FilterCriteria { categories: names(&["iPhone"]), ..Default::default() },
    );
    assert_eq!(ids(&out), ids(&all_iphone));
    assert!(!out.is_empty());
}

#[test]
fn stale_color_is_dropped_but_reachable_color_kept() {
    let catalog = Catalog::builtin();
    let criteria = FilterCriteria {
        categories: names(&["Mac"]),
        colors: names(&["Midnight", "Sky Blue"]),
        ..Default::default()
    };
    let resolved = ResolvedFilter::resolve(&criteria, &catalog);
    assert!(resolved.colors.allows(&"Midnight".to_string()));
    assert!(!resolved.colors.allows(&"Sky Blue".to_string()));
    assert!(!resolved.colors.allows(&"Silver".to_string()));
}

#[test]
fn inverted_date_range_matches_nothing() {
    let ds = dataset(42, 500);
    let criteria = FilterCriteria {
        date_range: Some(DateRange::new(
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )),
        ..Default::default()
    };
    assert!(filter(&ds, &criteria).is_empty());
}

#[test]
fn options_cascade_from_category_selection() {
    let ds = dataset(42, 2_000);
    let criteria = FilterCriteria {
        categories: names(&["iPad"]),
        models: names(&["iPad Pro M2"]),
        ..Default::default()
    };
    let options = filter_options(&ds, &criteria);
    assert_eq!(options.models, vec!["iPad Air".to_string(), "iPad Pro M2".to_string()]);
    assert_eq!(options.colors, vec!["Silver".to_string(), "Space Gray".to_string()]);
    assert_eq!(options.categories.len(), 5, "category options are never restricted");
    assert_eq!(options.theaters.len(), 5);
    assert_eq!(options.teams.len(), 20);
}

#[test]
fn criteria_round_trip_from_ui_json() {
    let json = r#"{"theaters":["Greater China"],"chipsets":["M2 Series"],"teams":[3]}"#;
    let criteria: FilterCriteria = serde_json::from_str(json).unwrap();
    assert_eq!(criteria.theaters, BTreeSet::from([Theater::GreaterChina]));
    assert_eq!(criteria.chipsets, BTreeSet::from([Chipset::M2Series]));
    assert_eq!(criteria.teams, BTreeSet::from([Team(3)]));
    assert!(criteria.categories.is_empty());
}
