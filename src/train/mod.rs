//! Training loop for the success classifier
//!
//! - Loss: binary cross-entropy on logits
//! - Mini-batches reshuffled every epoch from the seeded rng
//! - Per-epoch loss and accuracy
//!
//! # Example
//!
//! ```no_run
//! use exetree::model::{ConvClassifier, ModelConfig};
//! use exetree::optim::Adam;
//! use exetree::train::{TrainConfig, Trainer};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! # let features: exetree::EncodedFeatures = todo!();
//! let mut rng = StdRng::seed_from_u64(0);
//! let model = ConvClassifier::new(ModelConfig::default(), features.poscount(), 8, &mut rng);
//! let optimizer = Box::new(Adam::default_params(0.01));
//! let mut trainer = Trainer::new(model, optimizer, TrainConfig::default());
//! let result = trainer.train(&features);
//! println!("final loss={:.4}", result.final_loss);
//! ```

mod batch;
mod config;
mod loss;
mod trainer;

pub use batch::{batches, shuffled_order};
pub use config::TrainConfig;
pub use loss::{BCEWithLogitsLoss, LossFn};
pub use trainer::{EpochMetrics, TrainResult, Trainer};
