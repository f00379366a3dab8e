use super::framework::TestFramework;
use crate::{
    circuits::component::{ColumnBinding, Component},
    components::ec::{UnifiedAddition, UnifiedAdditionInput},
    error::{CircuitError, ComponentError},
};
use ark_bn254::{Fq, Fr as Scalar, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{One, UniformRand, Zero};
use rand::{rngs::StdRng, SeedableRng};

const RNG_SEED: [u8; 32] = [
    48, 3, 219, 130, 77, 14, 201, 96, 165, 22, 59, 242, 8, 113, 186, 37, 90, 151, 26, 204, 63, 1,
    178, 245, 120, 69, 11, 194, 82, 157, 33, 228,
];

fn random_point(rng: &mut StdRng) -> G1Affine {
    (G1Affine::generator() * Scalar::rand(rng)).into_affine()
}

/// Places `p + q` at `row`, with inputs in public input columns
fn add(
    test: &mut TestFramework<Fq>,
    component: &UnifiedAddition<Fq>,
    p: &G1Affine,
    q: &G1Affine,
    row: usize,
) -> (Fq, Fq, Fq) {
    let p_vars = test.public_inputs(0, 2 * row, &[p.x, p.y]);
    let q_vars = test.public_inputs(1, 2 * row, &[q.x, q.y]);
    let input = UnifiedAdditionInput {
        p: (p_vars[0], p_vars[1]),
        q: (q_vars[0], q_vars[1]),
    };
    let output = test.place(component, &input, row);
    (
        test.value(&output.x),
        test.value(&output.y),
        test.value(&output.infinity),
    )
}

#[test]
fn unified_addition_of_distinct_points() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut test = TestFramework::<Fq>::new();
    let component = UnifiedAddition::<Fq>::new(ColumnBinding::contiguous(15)).unwrap();

    for row in 0..8 {
        let (p, q) = (random_point(rng), random_point(rng));
        let sum = (p + q).into_affine();
        assert_eq!(add(&mut test, &component, &p, &q, row), (sum.x, sum.y, Fq::zero()));
    }
    test.verify().unwrap();
}

#[test]
fn unified_addition_doubles() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut test = TestFramework::<Fq>::new();
    let component = UnifiedAddition::<Fq>::new(ColumnBinding::contiguous(11)).unwrap();

    for row in 0..4 {
        let p = random_point(rng);
        let double = (p + p).into_affine();
        assert_eq!(
            add(&mut test, &component, &p, &p, row),
            (double.x, double.y, Fq::zero())
        );
    }
    test.verify().unwrap();
}

#[test]
fn unified_addition_of_opposite_points() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut test = TestFramework::<Fq>::new();
    let component = UnifiedAddition::<Fq>::new(ColumnBinding::contiguous(11)).unwrap();

    let p = random_point(rng);
    let (_, _, infinity) = add(&mut test, &component, &p, &-p, 0);
    assert_eq!(infinity, Fq::one());
    test.verify().unwrap();
}

#[test]
fn unified_addition_rejects_a_wrong_sum() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut test = TestFramework::<Fq>::new();
    let component = UnifiedAddition::<Fq>::new(ColumnBinding::contiguous(11)).unwrap();

    let (p, q) = (random_point(rng), random_point(rng));
    add(&mut test, &component, &p, &q, 0);
    test.verify().unwrap();

    let output = component.result(0);
    test.tamper(&output.x, p.x);
    assert!(matches!(
        test.verify(),
        Err(CircuitError::Constraint { row: 0, .. })
    ));

    // claiming infinity for distinct points
    let mut test = TestFramework::<Fq>::new();
    add(&mut test, &component, &p, &q, 0);
    test.tamper(&output.infinity, Fq::one());
    assert!(test.verify().is_err());
}

#[test]
fn unified_addition_needs_eleven_columns() {
    assert!(matches!(
        UnifiedAddition::<Fq>::new(ColumnBinding::contiguous(10)),
        Err(ComponentError::InsufficientColumns { .. })
    ));
}
