use super::framework::TestFramework;
use crate::{
    circuits::{component::{ColumnBinding, Component}, var::Var},
    components::non_native::{
        chunks::{compose_field_chunks, two_to},
        random_below, Addition, AdditionInput, CheckModP, CheckModPInput, ChunkParams,
        ModulusVars, Multiplication, MultiplicationInput, Negation, NegationInput,
    },
    error::{CircuitError, ComponentError},
};
use ark_bn254::Fr;
use ark_ff::{One, PrimeField, Zero};
use num_bigint::BigUint;
use rand::{rngs::StdRng, SeedableRng};

const RNG_SEED: [u8; 32] = [
    0, 131, 7, 254, 21, 76, 189, 42, 3, 99, 150, 201, 14, 66, 240, 81, 172, 9, 35, 118, 27, 213,
    58, 144, 6, 97, 188, 31, 222, 70, 15, 164,
];

/// secp256k1 base field elements as 4 chunks of 64 bits over BN254
pub(crate) struct NonNativeTest {
    pub(crate) test: TestFramework<Fr>,
    pub(crate) params: ChunkParams,
    pub(crate) modulus: ModulusVars,
    pub(crate) p: BigUint,
    inputs: usize,
}

impl NonNativeTest {
    pub(crate) fn new() -> Self {
        let params = ChunkParams::new(4, 64).unwrap();
        let p: BigUint = ark_secp256k1::Fq::MODULUS.into();
        let (p_chunks, pp_chunks) = params.modulus_chunks::<Fr>(&p).unwrap();

        let mut test = TestFramework::new();
        let modulus = ModulusVars {
            p: test.public_inputs(0, 0, &p_chunks),
            pp: test.public_inputs(0, 4, &pp_chunks),
        };
        Self {
            test,
            params,
            modulus,
            p,
            inputs: 0,
        }
    }

    /// Stores a chunked value in the next free public input column
    pub(crate) fn input(&mut self, value: &BigUint) -> Vec<Var> {
        let chunks = self.params.to_field_chunks::<Fr>(value).unwrap();
        self.input_chunks(&chunks)
    }

    pub(crate) fn input_chunks(&mut self, chunks: &[Fr]) -> Vec<Var> {
        self.inputs += 1;
        self.test.public_inputs(self.inputs, 0, chunks)
    }

    pub(crate) fn read(&self, vars: &[Var]) -> BigUint {
        compose_field_chunks(&self.test.values(vars), self.params.chunk_bits)
    }
}

pub(crate) fn binding() -> ColumnBinding {
    ColumnBinding::contiguous(15).with_lookup_columns(6)
}

#[test]
fn addition_of_random_values() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = Addition::<Fr>::new(binding(), t.params).unwrap();

    let mut row = 0;
    for _ in 0..4 {
        let (x, y) = (random_below(rng, &t.p), random_below(rng, &t.p));
        let input = AdditionInput {
            x: t.input(&x),
            y: t.input(&y),
            modulus: t.modulus.clone(),
        };
        let output = t.test.place(&component, &input, row);
        assert_eq!(t.read(&output.z), (x + y) % &t.p);
        row += component.rows_amount();
    }
    t.test.verify().unwrap();
}

#[test]
fn addition_edge_cases() {
    let mut t = NonNativeTest::new();
    let max = &t.p - 1u32;
    let component = Addition::<Fr>::new(binding(), t.params).unwrap();

    let mut row = 0;
    for (x, y) in [
        (BigUint::zero(), BigUint::zero()),
        (max.clone(), BigUint::one()),
        (max.clone(), max.clone()),
        (BigUint::one(), BigUint::zero()),
    ] {
        let input = AdditionInput {
            x: t.input(&x),
            y: t.input(&y),
            modulus: t.modulus.clone(),
        };
        let output = t.test.place(&component, &input, row);
        assert_eq!(t.read(&output.z), (x + y) % &t.p);
        row += component.rows_amount();
    }
    t.test.verify().unwrap();
}

#[test]
fn addition_rejects_a_wrong_sum() {
    let mut t = NonNativeTest::new();
    let component = Addition::<Fr>::new(binding(), t.params).unwrap();
    let input = AdditionInput {
        x: t.input(&BigUint::from(5u32)),
        y: t.input(&BigUint::from(7u32)),
        modulus: t.modulus.clone(),
    };
    let output = t.test.place(&component, &input, 0);
    t.test.verify().unwrap();

    t.test.tamper(&output.z[0], Fr::from(13u64));
    assert!(t.test.verify().is_err());
}

#[test]
fn addition_rejects_an_input_that_differs_from_its_copy() {
    let mut t = NonNativeTest::new();
    let component = Addition::<Fr>::new(binding(), t.params).unwrap();
    let input = AdditionInput {
        x: t.input(&BigUint::from(5u32)),
        y: t.input(&BigUint::from(7u32)),
        modulus: t.modulus.clone(),
    };
    t.test.place(&component, &input, 0);
    t.test.verify().unwrap();

    // the gates only see the copy, which still holds 5
    t.test.tamper(&input.x[0], Fr::from(6u64));
    assert!(matches!(
        t.test.verify(),
        Err(CircuitError::CopyConstraint(from, _)) if from == input.x[0]
    ));
}

#[test]
fn negation_of_random_values() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = Negation::<Fr>::new(binding(), t.params).unwrap();

    let mut row = 0;
    let mut values: Vec<BigUint> = (0..3).map(|_| random_below(rng, &t.p)).collect();
    values.push(BigUint::zero());
    values.push(&t.p - 1u32);
    for x in values {
        let input = NegationInput {
            x: t.input(&x),
            modulus: t.modulus.clone(),
        };
        let output = t.test.place(&component, &input, row);
        assert_eq!(t.read(&output.y), (&t.p - &x) % &t.p);
        row += component.rows_amount();
    }
    t.test.verify().unwrap();
}

#[test]
fn multiplication_of_random_values() {
    let rng = &mut StdRng::from_seed(RNG_SEED);
    let mut t = NonNativeTest::new();
    let component = Multiplication::<Fr>::new(binding(), t.params).unwrap();

    let mut row = 0;
    let max = &t.p - 1u32;
    let mut pairs: Vec<(BigUint, BigUint)> = (0..3)
        .map(|_| (random_below(rng, &t.p), random_below(rng, &t.p)))
        .collect();
    pairs.push((max.clone(), max));
    pairs.push((BigUint::zero(), BigUint::from(3u32)));
    for (x, y) in pairs {
        let input = MultiplicationInput {
            x: t.input(&x),
            y: t.input(&y),
            modulus: t.modulus.clone(),
        };
        let output = t.test.place(&component, &input, row);
        assert_eq!(t.read(&output.r), (x * y) % &t.p);
        row += component.rows_amount();
    }
    t.test.verify().unwrap();
}

#[test]
fn multiplication_on_narrow_tables() {
    let mut t = NonNativeTest::new();
    let component =
        Multiplication::<Fr>::new(ColumnBinding::contiguous(9).with_lookup_columns(6), t.params)
            .unwrap();
    let (x, y) = (BigUint::from(0xdead_beefu64), &t.p - 2u32);
    let input = MultiplicationInput {
        x: t.input(&x),
        y: t.input(&y),
        modulus: t.modulus.clone(),
    };
    let output = t.test.place(&component, &input, 2);
    assert_eq!(t.read(&output.r), (x * y) % &t.p);
    t.test.verify().unwrap();
}

#[test]
fn multiplication_rejects_a_shifted_remainder() {
    // r + p is congruent to r but not canonical
    let mut t = NonNativeTest::new();
    let component = Multiplication::<Fr>::new(binding(), t.params).unwrap();
    let input = MultiplicationInput {
        x: t.input(&BigUint::from(3u32)),
        y: t.input(&BigUint::from(4u32)),
        modulus: t.modulus.clone(),
    };
    let output = t.test.place(&component, &input, 0);
    t.test.verify().unwrap();

    let shifted = t
        .params
        .to_field_chunks::<Fr>(&(BigUint::from(12u32) + &t.p))
        .unwrap();
    for (var, value) in output.r.iter().zip(shifted) {
        t.test.tamper(var, value);
    }
    assert!(t.test.verify().is_err());
}

#[test]
fn check_mod_p_accepts_canonical_values() {
    let mut t = NonNativeTest::new();
    let component = CheckModP::<Fr>::new(binding(), t.params).unwrap();
    let mut row = 0;
    for x in [BigUint::zero(), BigUint::from(42u32), &t.p - 1u32] {
        let input = CheckModPInput {
            x: t.input(&x),
            pp: t.modulus.pp.clone(),
        };
        t.test.place(&component, &input, row);
        row += component.rows_amount();
    }
    t.test.verify().unwrap();
}

#[test]
fn check_mod_p_rejects_values_above_the_modulus() {
    let pp = two_to(256) - BigUint::from(ark_secp256k1::Fq::MODULUS);
    for offset in [BigUint::zero(), BigUint::one(), pp - 1u32] {
        let mut t = NonNativeTest::new();
        let component = CheckModP::<Fr>::new(binding(), t.params).unwrap();
        let value = &t.p + &offset;
        let input = CheckModPInput {
            x: t.input(&value),
            pp: t.modulus.pp.clone(),
        };
        t.test.place(&component, &input, 0);
        assert!(matches!(
            t.test.verify(),
            Err(CircuitError::Constraint { .. })
        ));
    }
}

#[test]
fn non_native_configuration_errors() {
    let params = ChunkParams::new(4, 64).unwrap();
    assert!(matches!(
        Addition::<Fr>::new(ColumnBinding::contiguous(15), params),
        Err(ComponentError::InsufficientColumns { .. })
    ));
    // carries of 128-bit chunks overflow the native field
    let wide = ChunkParams::new(2, 128).unwrap();
    assert!(matches!(
        Multiplication::<Fr>::new(binding(), wide),
        Err(ComponentError::BitsExceedFieldCapacity { .. })
    ));
}
