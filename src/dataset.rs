use rand::{Rng, seq::SliceRandom};

use crate::{MlpErr, Result};

/// A set of samples kept as two flat buffers, inputs and expected outputs,
/// ready to be fed to [`crate::Network::train_batch`].
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    x_size: usize,
    y_size: usize,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `data` - Rows of `x_size` inputs followed by `y_size` expected outputs.
    /// * `x_size` - The width of an input.
    /// * `y_size` - The width of an expected output.
    ///
    /// # Returns
    /// An error if either width is zero, there are no rows or the last row is
    /// incomplete.
    pub fn new(data: &[f64], x_size: usize, y_size: usize) -> Result<Self> {
        if x_size == 0 || y_size == 0 {
            return Err(MlpErr::invalid(
                "dataset",
                format!("rows of {x_size} inputs and {y_size} outputs"),
            ));
        }

        let row = x_size.checked_add(y_size).ok_or_else(|| {
            MlpErr::invalid(
                "dataset",
                format!("rows of {x_size} inputs and {y_size} outputs overflow"),
            )
        })?;
        if data.is_empty() || data.len() % row != 0 {
            return Err(MlpErr::invalid(
                "dataset",
                format!("{} values don't make rows of {row}", data.len()),
            ));
        }

        let (x, y) = data
            .chunks_exact(row)
            .map(|row| row.split_at(x_size))
            .fold((Vec::new(), Vec::new()), |(mut x, mut y), (xi, yi)| {
                x.extend_from_slice(xi);
                y.extend_from_slice(yi);
                (x, y)
            });

        Ok(Self {
            x_size,
            y_size,
            x,
            y,
        })
    }

    /// The amount of samples.
    pub fn len(&self) -> usize {
        self.x.len() / self.x_size
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    /// Every input, one after the other.
    pub fn inputs(&self) -> &[f64] {
        &self.x
    }

    /// Every expected output, one after the other.
    pub fn expected(&self) -> &[f64] {
        &self.y
    }

    /// Iterates over the `(input, expected)` pairs.
    pub fn samples(&self) -> impl Iterator<Item = (&[f64], &[f64])> {
        self.x
            .chunks_exact(self.x_size)
            .zip(self.y.chunks_exact(self.y_size))
    }

    /// Shuffles the samples, keeping every input with its expected output.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        let mut x = Vec::with_capacity(self.x.len());
        let mut y = Vec::with_capacity(self.y.len());

        for i in order {
            x.extend_from_slice(&self.x[i * self.x_size..(i + 1) * self.x_size]);
            y.extend_from_slice(&self.y[i * self.y_size..(i + 1) * self.y_size]);
        }

        self.x = x;
        self.y = y;
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    const AND2: [f64; 12] = [
        0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 1.0, //
    ];

    #[test]
    fn rows_are_split_into_inputs_and_outputs() {
        let dataset = Dataset::new(&AND2, 2, 1).unwrap();

        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.inputs(), [0., 0., 0., 1., 1., 0., 1., 1.]);
        assert_eq!(dataset.expected(), [0., 0., 0., 1.]);
    }

    #[test]
    fn incomplete_rows_are_rejected() {
        assert!(Dataset::new(&AND2[..11], 2, 1).is_err());
        assert!(Dataset::new(&[], 2, 1).is_err());
        assert!(Dataset::new(&AND2, 0, 3).is_err());
    }

    #[test]
    fn overflowing_row_widths_are_rejected() {
        for (x_size, y_size) in [(usize::MAX, 1), (1, usize::MAX)] {
            assert!(matches!(
                Dataset::new(&[1., 2.], x_size, y_size),
                Err(MlpErr::InvalidArgument { what: "dataset", .. })
            ));
        }
    }

    #[test]
    fn shuffling_keeps_samples_together() {
        let mut dataset = Dataset::new(&AND2, 2, 1).unwrap();
        dataset.shuffle(&mut StdRng::seed_from_u64(7));

        assert_eq!(dataset.len(), 4);
        for (x, y) in dataset.samples() {
            let and = if x[0] == 1. && x[1] == 1. { 1. } else { 0. };
            assert_eq!(y, [and]);
        }

        let mut rows: Vec<_> = dataset.samples().map(|(x, _)| x.to_vec()).collect();
        rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(rows, [[0., 0.], [0., 1.], [1., 0.], [1., 1.]]);
    }
}
