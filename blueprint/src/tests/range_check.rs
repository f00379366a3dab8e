use super::framework::TestFramework;
use crate::{
    circuits::{
        component::{ColumnBinding, Component},
        lookup::RANGE_16BIT,
    },
    components::range_check::{RangeCheck, RangeCheckInput},
    error::{CircuitError, ComponentError},
};
use ark_bn254::Fr;
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;
use rand::{rngs::StdRng, Rng, SeedableRng};

const RNG_SEED: [u8; 32] = [
    4, 91, 200, 13, 67, 221, 8, 140, 37, 62, 119, 250, 3, 88, 176, 45, 19, 203, 71, 6, 154, 33, 98,
    240, 127, 50, 11, 185, 74, 216, 29, 162,
];

fn binding() -> ColumnBinding {
    ColumnBinding::contiguous(15).with_lookup_columns(6)
}

#[test]
fn range_check_accepts_values_in_range() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    for bits in [8, 16, 40, 64, 68] {
        let mut test = TestFramework::<Fr>::new();
        let values: Vec<Fr> = (0..5)
            .map(|_| {
                let value: u128 = rng.gen::<u128>() & ((1u128 << bits) - 1);
                Fr::from(value)
            })
            .collect();
        let vars = test.public_inputs(0, 0, &values);

        let component = RangeCheck::<Fr>::new(binding(), values.len(), bits).unwrap();
        test.place(&component, &RangeCheckInput { values: vars }, 0);
        test.verify().unwrap();
        assert_eq!(test.circuit.tables().iter().count(), 1);
    }
}

#[test]
fn range_check_of_largest_value() {
    let mut test = TestFramework::<Fr>::new();
    let largest = Fr::from(BigUint::from(1u32) << 68) - Fr::one();
    let vars = test.public_inputs(0, 0, &[largest, Fr::zero()]);

    let component = RangeCheck::<Fr>::new(binding(), 2, 68).unwrap();
    test.place(&component, &RangeCheckInput { values: vars }, 3);
    test.verify().unwrap();
}

#[test]
fn range_check_rejects_values_out_of_range() {
    for (bits, value) in [(64, Fr::from(u64::MAX) + Fr::one()), (40, Fr::from(1u64 << 40))] {
        let mut test = TestFramework::<Fr>::new();
        let vars = test.public_inputs(0, 0, &[value]);
        let component = RangeCheck::<Fr>::new(binding(), 1, bits).unwrap();
        test.place(&component, &RangeCheckInput { values: vars }, 0);
        assert!(matches!(
            test.verify(),
            Err(CircuitError::Constraint { .. } | CircuitError::Lookup { .. })
        ));
    }
}

#[test]
fn range_check_rejects_negative_values() {
    let mut test = TestFramework::<Fr>::new();
    let vars = test.public_inputs(0, 0, &[-Fr::one()]);
    let component = RangeCheck::<Fr>::new(binding(), 1, 64).unwrap();
    test.place(&component, &RangeCheckInput { values: vars }, 0);
    assert!(test.verify().is_err());
}

#[test]
fn range_check_rejects_a_tampered_limb() {
    let mut test = TestFramework::<Fr>::new();
    let vars = test.public_inputs(0, 0, &[Fr::from(0x1234_5678u64)]);
    let component = RangeCheck::<Fr>::new(binding(), 1, 32).unwrap();
    test.place(&component, &RangeCheckInput { values: vars }, 0);
    test.verify().unwrap();

    let limb = component.binding().witness(1, 0);
    test.tamper(&limb, Fr::from(0x5679u64));
    assert_eq!(
        test.verify(),
        Err(CircuitError::Constraint {
            gate: 0,
            row: 0,
            index: 0
        })
    );
}

#[test]
fn range_check_packs_groups_per_row() {
    // 16-bit values take 2 cells and 1 lookup each
    let binding = ColumnBinding::contiguous(8).with_lookup_columns(3);
    let component = RangeCheck::<Fr>::new(binding, 7, 16).unwrap();
    assert_eq!(component.rows_amount(), 3);
    assert_eq!(RangeCheck::<Fr>::rows_for(7, 16, 8, 3), Some(3));
    assert_eq!(RangeCheck::<Fr>::rows_for(7, 64, 4, 6), None);
    assert!(RangeCheck::<Fr>::manifest_for(16)
        .lookup_tables
        .contains(RANGE_16BIT));
}

#[test]
fn range_check_configuration_errors() {
    assert!(matches!(
        RangeCheck::<Fr>::new(binding(), 0, 64),
        Err(ComponentError::InvalidParameters(_))
    ));
    assert!(matches!(
        RangeCheck::<Fr>::new(binding(), 1, Fr::MODULUS_BIT_SIZE as usize),
        Err(ComponentError::BitsExceedFieldCapacity { .. })
    ));
    assert!(matches!(
        RangeCheck::<Fr>::new(ColumnBinding::contiguous(15), 1, 64),
        Err(ComponentError::InsufficientColumns { .. })
    ));
    assert!(matches!(
        RangeCheck::<Fr>::new(ColumnBinding::contiguous(4).with_lookup_columns(6), 1, 64),
        Err(ComponentError::InsufficientColumns { .. })
    ));
}
