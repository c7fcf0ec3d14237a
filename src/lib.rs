//! exetree: learn which execution prefixes lead to successful fuzzing runs
//!
//! Fuzzlogs (one `<value> <location>` observation per line) are replayed into
//! an [`ExecutionTree`] whose nodes are shared run prefixes. Every node is
//! encoded as a fixed-width row of location ids and values, labelled with
//! whether any successful run passed through it, and a small convolutional
//! network learns to predict that label.
//!
//! # Modules
//!
//! - [`tree`]: execution-prefix trie and location index
//! - [`encode`]: fixed-width feature rows
//! - [`logparse`]: fuzzlog files and directories
//! - [`model`]: the classifier and its layers
//! - [`optim`]: Adam
//! - [`train`]: loss and training loop
//! - [`eval`]: thresholded scoring and validation
//! - [`io`]: checkpoints
//! - [`config`]: YAML run configuration
//! - [`pipeline`]: the end-to-end run
//! - [`cli`]: command-line front end

pub mod cli;
pub mod config;
pub mod encode;
pub mod eval;
pub mod io;
pub mod logparse;
pub mod model;
pub mod optim;
pub mod pipeline;
pub mod train;
pub mod tree;

pub use encode::{encode, encode_run, encode_runs, EncodedFeatures};
pub use eval::{correct_fraction, score, DEFAULT_THRESHOLD};
pub use exetree_common::{ExetreeError, LogLevel, Result};
pub use model::{ConvClassifier, ModelConfig};
pub use tree::{ExecutionTree, LocationIndex, Node, NodeId, Observation};
