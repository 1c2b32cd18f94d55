//! Pattern functions: the black box that decides petal color and shape
//!
//! Painting only depends on a mapping from four inputs
//! `(radius, angle feature, layer, bias)` to a vector of outputs where
//! slots 0..=2 are RGB in [0, 1] and slot 3 is the ray cut factor.
//! The remaining slots (up to [`OUTPUT_COUNT`]) are reserved for trait
//! derivation and must still be produced by any substitute source.

use noise::{NoiseFn, Perlin};
use serde_json::Value;
use xxhash_rust::xxh3::xxh3_64;

/// Inputs consumed by a pattern function
pub const INPUT_COUNT: usize = 4;
/// Outputs produced by a pattern function
pub const OUTPUT_COUNT: usize = 14;

pub type PatternInputs = [f64; INPUT_COUNT];
pub type PatternOutputs = [f64; OUTPUT_COUNT];

/// A pattern generator queried by the radial painter
///
/// Implementations may carry activation state between calls; the painter
/// calls [`PatternFunction::reset`] after every evaluation so consecutive
/// queries never observe each other.
pub trait PatternFunction {
    fn evaluate(&mut self, inputs: PatternInputs) -> PatternOutputs;

    /// Clear any state left by the previous evaluation
    fn reset(&mut self) {}

    /// Evaluate, then reset
    fn query(&mut self, inputs: PatternInputs) -> PatternOutputs {
        let outputs = self.evaluate(inputs);
        self.reset();
        outputs
    }
}

impl<P: PatternFunction + ?Sized> PatternFunction for &mut P {
    fn evaluate(&mut self, inputs: PatternInputs) -> PatternOutputs {
        (**self).evaluate(inputs)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<P: PatternFunction + ?Sized> PatternFunction for Box<P> {
    fn evaluate(&mut self, inputs: PatternInputs) -> PatternOutputs {
        (**self).evaluate(inputs)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Adapts a closure returning the four painting outputs; the reserved
/// slots are zero.
pub struct FnPattern<F>(pub F);

impl<F> PatternFunction for FnPattern<F>
where
    F: FnMut(PatternInputs) -> [f64; 4],
{
    fn evaluate(&mut self, inputs: PatternInputs) -> PatternOutputs {
        let head = (self.0)(inputs);
        let mut outputs = [0.0; OUTPUT_COUNT];
        outputs[..4].copy_from_slice(&head);
        outputs
    }
}

/// Seeded 4D Perlin stand-in for an evolved network
///
/// Each output samples the noise field at its own offset, so channels are
/// decorrelated while staying a pure function of the inputs.
#[derive(Clone)]
pub struct NoisePattern {
    perlin: Perlin,
    /// Input scale (larger = busier patterns)
    pub frequency: f64,
    /// Output gain before clamping to [-1, 1]
    pub gain: f64,
}

impl NoisePattern {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            frequency: 0.37,
            gain: 1.8,
        }
    }
}

impl PatternFunction for NoisePattern {
    fn evaluate(&mut self, inputs: PatternInputs) -> PatternOutputs {
        let [radius, angle, layer, bias] = inputs;
        let mut outputs = [0.0; OUTPUT_COUNT];
        for (k, out) in outputs.iter_mut().enumerate() {
            let offset = k as f64 * 17.31;
            let point = [
                radius * self.frequency * 0.25 + offset,
                angle * 1.7 + offset * 0.5,
                layer * self.frequency + offset * 0.25,
                bias * 0.5,
            ];
            *out = (self.perlin.get(point) * self.gain).clamp(-1.0, 1.0);
        }
        // Color channels live in [0, 1]
        for c in &mut outputs[..3] {
            *c = 0.5 + 0.5 * *c;
        }
        outputs
    }
}

/// Turns a serialized genome into a pattern function
pub trait GenomeRealizer {
    type Pattern: PatternFunction;

    fn realize(&self, genome: &Value) -> Self::Pattern;
}

/// Realizes any genome as a [`NoisePattern`] seeded from its JSON text,
/// so the same record always paints the same flower.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoiseRealizer;

impl GenomeRealizer for NoiseRealizer {
    type Pattern = NoisePattern;

    fn realize(&self, genome: &Value) -> NoisePattern {
        let hash = xxh3_64(genome.to_string().as_bytes());
        NoisePattern::new((hash ^ (hash >> 32)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Stateful {
        calls: u32,
        resets: u32,
    }

    impl PatternFunction for Stateful {
        fn evaluate(&mut self, _inputs: PatternInputs) -> PatternOutputs {
            self.calls += 1;
            let mut out = [0.0; OUTPUT_COUNT];
            out[0] = (self.calls - self.resets) as f64;
            out
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    #[test]
    fn test_query_resets_after_each_call() {
        let mut pattern = Stateful { calls: 0, resets: 0 };
        for _ in 0..3 {
            assert_eq!(pattern.query([0.0; 4])[0], 1.0);
        }
        assert_eq!(pattern.resets, 3);
    }

    #[test]
    fn test_fn_pattern_pads_outputs() {
        let mut pattern = FnPattern(|i: PatternInputs| [i[0], i[1], i[2], i[3]]);
        let out = pattern.query([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(&out[..4], &[1.0, 2.0, 3.0, 4.0]);
        assert!(out[4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_noise_pattern_is_pure_and_bounded() {
        let mut pattern = NoisePattern::new(11);
        let inputs = [12.0, 0.4, 2.0, 1.0];
        let a = pattern.query(inputs);
        let b = pattern.query(inputs);
        assert_eq!(a, b);
        assert!(a[..3].iter().all(|v| (0.0..=1.0).contains(v)));
        assert!(a.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_realizer_is_deterministic() {
        let genome = json!({"nodes": [1, 2, 3]});
        let other = json!({"nodes": [3, 2, 1]});
        let inputs = [5.0, -0.3, 1.0, 1.0];

        let mut a = NoiseRealizer.realize(&genome);
        let mut b = NoiseRealizer.realize(&genome);
        assert_eq!(a.query(inputs), b.query(inputs));

        let mut c = NoiseRealizer.realize(&other);
        let differs = (0..20).any(|i| {
            let probe = [i as f64, 0.7, 2.0, 1.0];
            a.query(probe) != c.query(probe)
        });
        assert!(differs);
    }
}
