use super::{
    framework::TestFramework,
    non_native::{binding, NonNativeTest},
};
use crate::{
    circuits::component::{ColumnBinding, Component},
    components::{
        ec::{IncompleteAdd, IncompleteAddInput, PointVars},
        non_native::{ChunkParams, ModulusVars},
    },
    error::{CircuitError, ComponentError},
};
use ark_bn254::Fr;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::UniformRand;
use ark_secp256k1::{Affine, Fr as Scalar};
use num_bigint::BigUint;
use rand::{rngs::StdRng, SeedableRng};

const RNG_SEED: [u8; 32] = [
    9, 177, 64, 28, 213, 140, 5, 99, 36, 250, 81, 17, 162, 44, 203, 120, 7, 58, 190, 233, 12, 75,
    146, 31, 224, 93, 68, 2, 159, 111, 40, 185,
];

fn random_point(rng: &mut StdRng) -> Affine {
    (Affine::generator() * Scalar::rand(rng)).into_affine()
}

impl NonNativeTest {
    fn point(&mut self, point: &Affine) -> PointVars {
        let (x, y) = self
            .params
            .point_chunks::<Fr, _>(point)
            .unwrap()
            .expect("finite point");
        PointVars {
            x: self.input_chunks(&x),
            y: self.input_chunks(&y),
        }
    }

    fn read_point(&self, point: &PointVars) -> (BigUint, BigUint) {
        (self.read(&point.x), self.read(&point.y))
    }
}

fn expected(point: &Affine) -> (BigUint, BigUint) {
    (point.x.into(), point.y.into())
}

#[test]
fn incomplete_add_of_random_points() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = IncompleteAdd::<Fr>::new(binding(), t.params).unwrap();

    let mut row = 0;
    for _ in 0..2 {
        let (p, q) = (random_point(rng), random_point(rng));
        let input = IncompleteAddInput {
            p: t.point(&p),
            q: t.point(&q),
            modulus: t.modulus.clone(),
        };
        let output = t.test.place(&component, &input, row);
        assert_eq!(t.read_point(&output), expected(&(p + q).into_affine()));
        row += component.rows_amount();
    }
    t.test.verify().unwrap();
}

#[test]
fn incomplete_add_on_narrow_tables() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let narrow = ColumnBinding::contiguous(9).with_lookup_columns(6);
    let component = IncompleteAdd::<Fr>::new(narrow, t.params).unwrap();
    assert!(
        component.rows_amount()
            > IncompleteAdd::<Fr>::new(binding(), t.params)
                .unwrap()
                .rows_amount()
    );

    let (p, q) = (random_point(rng), random_point(rng));
    let input = IncompleteAddInput {
        p: t.point(&p),
        q: t.point(&q),
        modulus: t.modulus.clone(),
    };
    let output = t.test.place(&component, &input, 1);
    assert_eq!(t.read_point(&output), expected(&(p + q).into_affine()));
    t.test.verify().unwrap();
}

#[test]
fn incomplete_add_rejects_opposite_points() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = IncompleteAdd::<Fr>::new(binding(), t.params).unwrap();

    let p = random_point(rng);
    let input = IncompleteAddInput {
        p: t.point(&p),
        q: t.point(&-p),
        modulus: t.modulus.clone(),
    };
    t.test.place(&component, &input, 0);
    // the slope is zero, so lambda (x_Q - x_P) + y_P = y_P is not tied to y_Q
    assert!(matches!(
        t.test.verify(),
        Err(CircuitError::CopyConstraint(_, right)) if input.q.y.contains(&right)
    ));
}

#[test]
fn incomplete_add_of_a_point_with_itself_is_not_a_doubling() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = IncompleteAdd::<Fr>::new(binding(), t.params).unwrap();

    let p = random_point(rng);
    let input = IncompleteAddInput {
        p: t.point(&p),
        q: t.point(&p),
        modulus: t.modulus.clone(),
    };
    let output = t.test.place(&component, &input, 0);
    // a zero slope satisfies every identity with R = (-2 x_P, -y_P)
    t.test.verify().unwrap();

    let (x, y) = expected(&p);
    let modulus = &t.p;
    let minus = |v: BigUint| (modulus - v % modulus) % modulus;
    assert_eq!(t.read_point(&output), (minus(2u32 * x), minus(y)));
    assert_ne!(t.read_point(&output), expected(&(p + p).into_affine()));
}

#[test]
fn incomplete_add_rejects_a_wrong_sum() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = IncompleteAdd::<Fr>::new(binding(), t.params).unwrap();

    let (p, q) = (random_point(rng), random_point(rng));
    let input = IncompleteAddInput {
        p: t.point(&p),
        q: t.point(&q),
        modulus: t.modulus.clone(),
    };
    let output = t.test.place(&component, &input, 0);
    t.test.verify().unwrap();

    let y = t.test.value(&output.y[0]);
    t.test.tamper(&output.y[0], y + Fr::from(1u64));
    assert!(t.test.verify().is_err());
}

#[test]
fn incomplete_add_needs_range_check_lookups() {
    let params = ChunkParams::new(4, 64).unwrap();
    assert!(matches!(
        IncompleteAdd::<Fr>::new(ColumnBinding::contiguous(15).with_lookup_columns(2), params),
        Err(ComponentError::InsufficientColumns { .. })
    ));
    // a wrong number of chunks is reported, not truncated
    let mut test = TestFramework::<Fr>::new();
    let component = IncompleteAdd::<Fr>::new(binding(), params).unwrap();
    let short = test.public_inputs(0, 0, &[Fr::from(1u64); 3]);
    let point = PointVars {
        x: short.clone(),
        y: short.clone(),
    };
    let input = IncompleteAddInput {
        p: point.clone(),
        q: point,
        modulus: ModulusVars {
            p: short.clone(),
            pp: short,
        },
    };
    assert!(matches!(
        component.generate_assignments(&mut test.assignment, &input, 0),
        Err(ComponentError::InvalidParameters(_))
    ));
}
