//! Compressed shape encoding.
//!
//! Samples are quantized to `QUANT`, differentiated and run-length encoded:
//! a value occurring once is stored as is, a run of `n >= 2` equal values as
//! `value value n-2`.

/// Shape as written to `[SHAPES]`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredShape {
    pub id: usize,
    /// Sample count of the uncompressed shape, regardless of what is stored
    pub num_samples: usize,
    pub data: Vec<f64>,
}

const QUANT: f64 = 1e-7;

pub fn store_all(shapes: &[(usize, Vec<f64>)], compress: bool) -> Vec<StoredShape> {
    shapes
        .iter()
        .map(|(id, samples)| store(*id, samples, compress))
        .collect()
}

/// Keep the compressed encoding only if it stores fewer values than the raw samples.
pub fn store(id: usize, samples: &[f64], compress: bool) -> StoredShape {
    let packed = compress
        .then(|| compress_shape(samples))
        .filter(|packed| packed.len() < samples.len());
    StoredShape {
        id,
        num_samples: samples.len(),
        data: packed.unwrap_or_else(|| samples.to_vec()),
    }
}

pub fn compress_shape(samples: &[f64]) -> Vec<f64> {
    let scaled: Vec<f64> = samples.iter().map(|x| x / QUANT).collect();

    // Quantized derivative. The accumulated quantization error is corrected
    // whenever it crosses a step, so the integral stays within one step.
    let mut deriv = Vec::with_capacity(scaled.len());
    let mut prev = 0.0;
    let mut integral = 0.0;
    let mut prev_err = 0.0;
    for (i, &x) in scaled.iter().enumerate() {
        let step = (x - prev).round();
        prev = x;
        integral += step;
        let err = (x - integral).round();
        let correction = if i == 0 { 0.0 } else { err - prev_err };
        deriv.push(step + correction);
        prev_err = err;
    }

    let mut packed = Vec::new();
    let mut i = 0;
    while i < deriv.len() {
        let value = deriv[i];
        let mut run = 1;
        while i + run < deriv.len() && (deriv[i + run] - value).abs() <= 1e-8 {
            run += 1;
        }
        let value = clean(value * QUANT);
        packed.push(value);
        if run >= 2 {
            packed.push(value);
            packed.push((run - 2) as f64);
        }
        i += run;
    }
    packed
}

fn clean(x: f64) -> f64 {
    if x.abs() < 1e-10 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decompress(packed: &[f64]) -> Vec<f64> {
        let mut deriv = Vec::new();
        let mut i = 0;
        while i < packed.len() {
            if i + 2 < packed.len() && packed[i] == packed[i + 1] {
                let count = packed[i + 2] as usize + 2;
                deriv.extend(std::iter::repeat_n(packed[i], count));
                i += 3;
            } else {
                deriv.push(packed[i]);
                i += 1;
            }
        }
        deriv
            .iter()
            .scan(0.0, |acc, d| {
                *acc += d;
                Some(*acc)
            })
            .collect()
    }

    #[test]
    fn constant_shape() {
        let packed = compress_shape(&[1.0; 100]);
        assert_eq!(packed, [1.0, 0.0, 0.0, 97.0]);
        let restored = decompress(&packed);
        assert_eq!(restored.len(), 100);
        assert!(restored.iter().all(|x| (x - 1.0).abs() < 1e-9));
    }

    #[test]
    fn ramp_within_quantization() {
        let ramp: Vec<f64> = (0..50).map(|i| i as f64 / 49.0).collect();
        let restored = decompress(&compress_shape(&ramp));
        assert_eq!(restored.len(), ramp.len());
        for (a, b) in restored.iter().zip(&ramp) {
            assert!((a - b).abs() <= 1.5e-7);
        }
    }

    #[test]
    fn short_shapes_stay_raw() {
        let stored = store(3, &[1.0, 1.0], true);
        assert_eq!(stored.data, [1.0, 1.0]);
        assert_eq!(stored.num_samples, 2);

        let stored = store(4, &[0.5; 10], true);
        assert_eq!(stored.data.len(), 4);
        assert_eq!(stored.num_samples, 10);

        let stored = store(4, &[0.5; 10], false);
        assert_eq!(stored.data, [0.5; 10]);
    }
}
