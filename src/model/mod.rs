//! Encoder classifier and the trainable-model seam

pub mod encoder;
pub mod learner;
pub mod tokenizer;

pub use encoder::{EncoderClassifier, EncoderConfig};
pub use learner::{bce_with_logits_loss, Learner, TrainSample};
pub use tokenizer::ByteTokenizer;
