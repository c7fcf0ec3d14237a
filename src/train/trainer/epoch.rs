//! Epoch-level and multi-epoch training

use super::core::Trainer;
use super::result::{EpochMetrics, TrainResult};
use crate::encode::EncodedFeatures;
use crate::train::{batches, shuffled_order};
use exetree_common::{log, LogLevel};
use std::time::Instant;

impl Trainer {
    /// Train for one epoch over `data`, reshuffled into fresh batches.
    pub fn train_epoch(&mut self, epoch: usize, data: &EncodedFeatures) -> EpochMetrics {
        let mut total_loss = 0.0;
        let mut correct = 0;
        let mut steps = 0;

        let order = shuffled_order(data.len(), &mut self.rng);
        for (i, batch) in batches(data, &order, self.config.batch_size).enumerate() {
            let (loss, batch_correct) = self.train_step(&batch);
            total_loss += loss * batch.len() as f64;
            correct += batch_correct;
            steps += 1;

            log(
                self.config.log_level,
                LogLevel::Verbose,
                &format!("  epoch {epoch} step {}: loss={loss:.4}", i + 1),
            );
        }

        let rows = data.len().max(1) as f64;
        let metrics = EpochMetrics {
            epoch,
            loss: total_loss / rows,
            accuracy: correct as f64 / rows,
            steps,
        };
        log(
            self.config.log_level,
            LogLevel::Normal,
            &format!(
                "Epoch {}/{}: loss={:.4} accuracy={:.4} lr={:.6}",
                epoch,
                self.config.epochs,
                metrics.loss,
                metrics.accuracy,
                self.lr()
            ),
        );
        metrics
    }

    /// Run every configured epoch.
    ///
    /// An empty dataset takes no steps and yields an empty history.
    pub fn train(&mut self, data: &EncodedFeatures) -> TrainResult {
        let start = Instant::now();
        if data.is_empty() {
            log(self.config.log_level, LogLevel::Normal, "No training samples; skipping training");
            return TrainResult::default();
        }
        log(
            self.config.log_level,
            LogLevel::Verbose,
            &format!(
                "Training on {} samples: {} epochs, batch size {}, {} loss",
                data.len(),
                self.config.epochs,
                self.config.batch_size,
                self.loss_fn.name()
            ),
        );

        let history: Vec<EpochMetrics> =
            (1..=self.config.epochs).map(|epoch| self.train_epoch(epoch, data)).collect();

        let final_loss = history.last().map_or(0.0, |m| m.loss);
        let best_loss = history.iter().map(|m| m.loss).fold(f64::INFINITY, f64::min);
        TrainResult {
            final_epoch: history.len(),
            final_loss,
            best_loss: if best_loss.is_finite() { best_loss } else { final_loss },
            steps: self.steps,
            history,
            elapsed_secs: start.elapsed().as_secs_f64(),
        }
    }
}
