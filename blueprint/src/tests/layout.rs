use crate::{
    circuits::{
        assignment::Assignment,
        component::ColumnBinding,
        layout::{cell, rows_for, RowCursor},
        lookup::RANGE_16BIT,
        manifest::{Manifest, WitnessRange},
        var::{ColumnKind, Var},
    },
    error::ComponentError,
};
use ark_bn254::Fr;
use ark_ff::One;
use proptest::prelude::*;

proptest! {
    #[test]
    fn linear_block_cells(start in 0usize..1000, n in 1usize..500, witness_amount in 1usize..40) {
        let rows = rows_for(n, witness_amount);
        prop_assert!(rows * witness_amount >= n);
        prop_assert!((rows - 1) * witness_amount < n);

        let mut seen = std::collections::HashSet::new();
        for i in 0..n {
            let (column, row) = cell(start, i, witness_amount);
            prop_assert!(column < witness_amount);
            prop_assert!(row >= start && row < start + rows);
            prop_assert_eq!((row - start) * witness_amount + column, i);
            prop_assert!(seen.insert((column, row)));
        }
        // the last value lands on the last row
        prop_assert_eq!(cell(start, n - 1, witness_amount).1, start + rows - 1);
    }

    #[test]
    fn cursor_hands_out_disjoint_ranges(start in 0usize..100, parts in proptest::collection::vec(0usize..20, 0..10)) {
        let mut cursor = RowCursor::new(start);
        let mut next = start;
        for rows in &parts {
            let range = cursor.reserve(*rows);
            prop_assert_eq!(range.start, next);
            prop_assert_eq!(range.len(), *rows);
            next = range.end;
        }
        let total: usize = parts.iter().sum();
        prop_assert_eq!(cursor.current_row(), start + total);
        prop_assert!(cursor.finish(total).is_ok());
    }
}

#[test]
fn cursor_reports_layout_mismatch() {
    let mut cursor = RowCursor::new(10);
    cursor.reserve(3);
    cursor.reserve(4);
    assert_eq!(cursor.consumed(), 7);
    assert_eq!(
        cursor.finish(8),
        Err(ComponentError::LayoutMismatch {
            expected: 8,
            actual: 7
        })
    );
}

#[test]
fn witness_ranges() {
    let any = WitnessRange::at_least(3);
    assert!(!any.contains(2));
    assert!(any.contains(3));
    assert!(any.contains(100));

    let twelves = WitnessRange::stepped(12, None, 12);
    assert!(twelves.contains(12));
    assert!(twelves.contains(24));
    assert!(!twelves.contains(15));

    let both = any.intersect(&twelves);
    assert_eq!(both.min, 12);
    assert_eq!(both.step, 12);

    let bounded = WitnessRange::stepped(2, Some(9), 1).intersect(&WitnessRange::at_least(5));
    assert!(bounded.contains(5));
    assert!(bounded.contains(9));
    assert!(!bounded.contains(10));
}

#[test]
fn witness_range_intersection_keeps_only_common_amounts() {
    let odd = WitnessRange::stepped(3, None, 2);
    let twelves = WitnessRange::stepped(12, None, 12);
    let none = odd.intersect(&twelves);
    assert!(none.is_empty());
    assert!((0..100).all(|amount| !none.contains(amount)));
    assert_eq!(
        Manifest::new(odd)
            .merge(&Manifest::new(twelves))
            .check(&ColumnBinding::contiguous(12)),
        Err(ComponentError::UnsupportedWitnessAmount(12))
    );

    // odd amounts of the form 5 + 3 i
    let common = odd.intersect(&WitnessRange::stepped(5, None, 3));
    assert_eq!((common.min, common.step), (5, 6));
    for amount in 0..100 {
        assert_eq!(
            common.contains(amount),
            odd.contains(amount) && amount >= 5 && (amount - 5) % 3 == 0
        );
    }

    // the first common amount lies past the upper bound
    let capped = WitnessRange::stepped(2, Some(10), 2).intersect(&twelves);
    assert!(capped.is_empty());
}

#[test]
fn manifest_merge_is_conservative() {
    let a = Manifest::new(WitnessRange::at_least(5))
        .with_lookup(RANGE_16BIT, 4)
        .with_gates(1);
    let b = Manifest::new(WitnessRange::at_least(3))
        .with_lookup(RANGE_16BIT, 6)
        .with_gates(2)
        .with_constant();
    let merged = a.merge(&b);
    assert_eq!(merged.witness.min, 5);
    assert_eq!(merged.lookup_columns, 6);
    assert_eq!(merged.lookup_tables.len(), 1);
    assert_eq!(merged.gates, 3);
    assert!(merged.constant_required);
}

#[test]
fn manifest_check_reports_the_missing_resource() {
    let manifest = Manifest::new(WitnessRange::stepped(12, None, 12))
        .with_lookup(RANGE_16BIT, 2)
        .with_constant();

    assert_eq!(
        manifest.check(&ColumnBinding::contiguous(11)),
        Err(ComponentError::InsufficientColumns {
            kind: ColumnKind::Witness,
            required: 12,
            available: 11
        })
    );
    assert_eq!(
        manifest.check(&ColumnBinding::contiguous(15)),
        Err(ComponentError::UnsupportedWitnessAmount(15))
    );
    assert_eq!(
        manifest.check(&ColumnBinding::contiguous(24).with_lookup_columns(1)),
        Err(ComponentError::InsufficientColumns {
            kind: ColumnKind::Lookup,
            required: 2,
            available: 1
        })
    );
    assert_eq!(
        manifest.check(&ColumnBinding::contiguous(24).with_lookup_columns(2)),
        Err(ComponentError::InsufficientColumns {
            kind: ColumnKind::Constant,
            required: 1,
            available: 0
        })
    );
    let binding = ColumnBinding::contiguous(24)
        .with_lookup_columns(2)
        .with_constants(vec![0]);
    assert!(manifest.check(&binding).is_ok());
}

#[test]
fn bindings_map_logical_columns() {
    let binding = ColumnBinding::new(vec![4, 7, 9]).with_constants(vec![2]);
    assert_eq!(binding.witness_amount(), 3);
    assert_eq!(binding.witness(1, 5).index, 7);
    assert_eq!(binding.block_cell(10, 4).index, 7);
    assert_eq!(binding.block_cell(10, 4).row, 11);
    assert_eq!(binding.constant(0, 3).index, 2);
    assert_ne!(
        binding.selector_key("gate"),
        ColumnBinding::contiguous(3).selector_key("gate")
    );
}

#[test]
fn lookup_columns_cannot_be_assigned() {
    let mut assignment = Assignment::<Fr>::new();
    assert_eq!(
        assignment.assign(&Var::absolute(ColumnKind::Lookup, 0, 3), Fr::one()),
        Err(ComponentError::UnwritableColumn(ColumnKind::Lookup))
    );
    assert_eq!(assignment.rows_amount(), 0);

    assignment
        .assign(&Var::absolute(ColumnKind::Selector, 1, 3), Fr::one())
        .unwrap();
    assert_eq!(assignment.rows_amount(), 4);
}
