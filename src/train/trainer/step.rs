//! Training step operations

use super::core::Trainer;
use crate::encode::EncodedFeatures;
use crate::model::layers::sigmoid;
use ndarray::Array1;

impl Trainer {
    /// One forward/backward/update on `batch`.
    ///
    /// Returns the mean batch loss and the number of rows classified
    /// correctly at 0.5 during the forward pass.
    pub fn train_step(&mut self, batch: &EncodedFeatures) -> (f64, usize) {
        if batch.is_empty() {
            return (0.0, 0);
        }

        let (logits, cache) = self.model.forward_train(&batch.locs, &batch.vals, &mut self.rng);
        let targets = Array1::from(batch.targets());
        let (loss, dlogits) = self.loss_fn.forward(&logits, &targets);

        let correct = logits
            .iter()
            .zip(&batch.labels)
            .filter(|&(&z, &label)| (sigmoid(z) > 0.5) == label)
            .count();

        self.model.zero_grad();
        self.model.backward(&cache, &dlogits);
        self.optimizer.step(&mut self.model.params_mut());
        self.model.apply_constraints();
        self.model.update_statistics(&cache);
        self.steps += 1;

        (loss, correct)
    }
}
