//! Name Addressing Property Tests
//!
//! Tests for name addressing invariants:
//! - Selector grammar offset laws
//! - Occurrence ordering and repetition
//! - Position/occurrence round trip
//! - Pattern selection contains exact selection
//! - Cell access agrees with column-then-row access
//! - Name index tracks the identifying column

use lattab::{
    parse_selector, Column, NameIndex, RowSelector, Scalar, SelectorDescriptor, Table,
};

// =============================================================================
// Helper Functions
// =============================================================================

const NAMES: [&str; 5] = ["ip1", "ip2", "ip2", "ip3", "tab$end"];

fn lattice() -> Table {
    Table::new([
        ("name", Column::from_text(NAMES)),
        ("s", Column::from_f64(vec![1.0, 2.0, 2.1, 3.0, 4.0])),
        ("turns", Column::from_i64(vec![10, 20, 30, 40, 50])),
    ])
    .unwrap()
}

/// A longer lattice with heavy repetition
fn repeated_lattice() -> Table {
    let names: Vec<String> = (0..40)
        .map(|i| match i % 4 {
            0 => "drift".to_string(),
            1 => format!("mq.{}", i / 8),
            2 => "drift".to_string(),
            _ => format!("mb.{}", i),
        })
        .collect();
    let s = (0..40).map(|i| i as f64 * 0.5).collect();
    Table::new([("name", Column::from_text(names)), ("s", Column::from_f64(s))]).unwrap()
}

fn positions(t: &Table, selector: impl Into<RowSelector>) -> Vec<usize> {
    t.select(&selector.into()).unwrap().positions()
}

// =============================================================================
// Selector Grammar Tests
// =============================================================================

/// Scenario parses from the name grammar.
#[test]
fn test_parse_scenarios() {
    assert_eq!(
        parse_selector("example::5<<3").unwrap().as_tuple(),
        ("example", Some(5), -3)
    );
    assert_eq!(
        parse_selector("example::0>>-1").unwrap().as_tuple(),
        ("example", Some(0), -1)
    );
}

/// `<<n` is `>>-n` and `<<-n` is `>>n`.
#[test]
fn test_offset_direction_laws() {
    for n in [0, 1, 3, 17] {
        let back = parse_selector(&format!("ip2::1<<{}", n)).unwrap();
        let fwd_neg = parse_selector(&format!("ip2::1>>-{}", n)).unwrap();
        assert_eq!(back, fwd_neg);

        let back_neg = parse_selector(&format!("ip2::1<<-{}", n)).unwrap();
        let fwd = parse_selector(&format!("ip2::1>>{}", n)).unwrap();
        assert_eq!(back_neg, fwd);
    }
}

/// Canonical rendering parses back to the same descriptor.
#[test]
fn test_descriptor_display_round_trip() {
    for text in ["ip2", "ip2::1", "ip2::-1>>2", "ip2<<3", "ip[23]::0"] {
        let descriptor = SelectorDescriptor::parse(text).unwrap();
        let again = SelectorDescriptor::parse(&descriptor.to_string()).unwrap();
        assert_eq!(descriptor, again);
    }
}

// =============================================================================
// Name Index Tests
// =============================================================================

/// resolve(b, k, n) == resolve(b, k, 0) + n
#[test]
fn test_resolve_offset_law() {
    let index = NameIndex::build(&Column::from_text(NAMES), 0);
    for k in [None, Some(0), Some(1), Some(-1)] {
        let base = index.resolve("ip2", k, 0).unwrap();
        for n in -3..=3 {
            assert_eq!(index.resolve("ip2", k, n).unwrap(), base + n);
        }
    }
}

/// Occurrence positions strictly ascend with k.
#[test]
fn test_get_index_strictly_ascending() {
    let t = repeated_lattice();
    let index = t.name_index().unwrap();
    for name in index.names() {
        let count = index.occurrences(name).len() as i64;
        let rows: Vec<usize> = (0..count)
            .map(|k| index.get_index(name, Some(k)).unwrap())
            .collect();
        assert!(rows.windows(2).all(|w| w[0] < w[1]), "{} not ascending", name);
    }
}

/// Repetition iff two or more occurrences.
#[test]
fn test_is_repeated_iff_multiple_occurrences() {
    let t = repeated_lattice();
    let index = t.name_index().unwrap();
    for name in index.names() {
        assert_eq!(index.is_repeated(name), index.occurrences(name).len() >= 2);
    }
    assert!(!index.is_repeated("absent"));
}

/// (name, k) -> position -> occurrence_of -> (name, k)
#[test]
fn test_occurrence_round_trip() {
    let t = repeated_lattice();
    let index = t.name_index().unwrap();
    for row in 0..t.len() {
        let (name, k) = index.occurrence_of(row).unwrap();
        assert_eq!(index.get_index(name, Some(k as i64)).unwrap(), row);
        let selector = RowSelector::from(format!("{}::{}", name, k));
        assert_eq!(t.select(&selector).unwrap().single(), Some(row));
    }
}

/// Occurrence lists partition the rows.
#[test]
fn test_occurrences_cover_rows() {
    let t = repeated_lattice();
    let index = t.name_index().unwrap();
    let total: usize = index.names().map(|n| index.occurrences(n).len()).sum();
    assert_eq!(total, t.len());
}

// =============================================================================
// Pattern Tests
// =============================================================================

/// Rows picked by an exact name are a subset of a looser pattern's rows.
#[test]
fn test_pattern_monotonicity() {
    let t = lattice();
    let exact = positions(&t, "ip2");
    for pattern in ["ip[23]", "ip.*", ".*"] {
        let loose = positions(&t, pattern);
        assert!(exact.iter().all(|r| loose.contains(r)), "{}", pattern);
    }
    assert!(positions(&t, "ip[23]").len() <= positions(&t, "ip.*").len());
}

/// Patterns that match nothing select nothing.
#[test]
fn test_unmatched_pattern_is_empty() {
    let t = lattice();
    assert!(positions(&t, "q.*").is_empty());
    assert!(positions(&t, "q.*::0").is_empty());
}

// =============================================================================
// Access Equivalence Tests
// =============================================================================

/// T[C][i] == T[C, i] for every row selector shape.
#[test]
fn test_column_then_row_matches_cell_access() {
    let t = lattice();
    let turns = t.get("turns").unwrap().into_column().unwrap();
    let selectors: Vec<RowSelector> = vec![
        RowSelector::from(0),
        RowSelector::from(-1),
        RowSelector::from("ip2::1"),
        RowSelector::from("ip[23]"),
        RowSelector::from(1..4),
        RowSelector::name_range("ip1", "ip3"),
        RowSelector::value_range("s", 1.5, 3.5),
        RowSelector::from(vec![4, 0, 0]),
        RowSelector::from(vec!["tab$end", "ip1"]),
        RowSelector::from(vec![true, false, false, true, true]),
        RowSelector::chain([RowSelector::from(1..5), RowSelector::from(-1)]),
    ];

    for selector in selectors {
        let rows = t.select(&selector).unwrap();
        let direct = t.get_at("turns", selector.clone()).unwrap();
        match rows.single() {
            Some(row) => assert_eq!(direct.into_scalar(), turns.get(row), "{:?}", selector),
            None => assert_eq!(
                direct.into_column(),
                Some(turns.take(&rows.positions())),
                "{:?}",
                selector
            ),
        }
    }
}

/// A chain resolves each stage relative to the previous stage.
#[test]
fn test_chain_scenario() {
    let t = lattice();
    let chain = RowSelector::chain([t.matching("s > 1").unwrap(), RowSelector::from(1)]);
    assert_eq!(t.select(&chain).unwrap().single(), Some(2));
    assert_eq!(t.get_at("s", chain).unwrap().into_scalar(), Some(Scalar::Float(2.1)));
}

// =============================================================================
// Index Invalidation Tests
// =============================================================================

/// Replacing the identifying column is seen by the next lookup.
#[test]
fn test_replaced_names_are_indexed() {
    let mut t = lattice();
    assert_eq!(positions(&t, "ip2"), vec![1]);

    t.set("name", Column::from_text(["a", "b", "c", "ip2", "e"])).unwrap();
    assert_eq!(positions(&t, "ip2"), vec![3]);
    assert_eq!(t.select(&"ip1".into()).unwrap_err().code(), "TABLE_LOOKUP");
}

/// Broadcasting into the identifying column rebuilds the index.
#[test]
fn test_broadcast_names_rebuilds_index() {
    let mut t = lattice();
    let before = t.name_index().unwrap();
    t.set("name", "marker").unwrap();
    let after = t.name_index().unwrap();
    assert!(after.version() > before.version());
    assert_eq!(after.occurrences("marker"), &[0, 1, 2, 3, 4]);
    assert!(before.contains("ip1"));
}
