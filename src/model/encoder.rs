//! Encoder classifier
//!
//! A compact pre-norm encoder over byte tokens: embedding table, a stack of
//! mixing + feed-forward blocks with residual connections, mean pooling, and
//! a linear head sized to the trained label count. Blocks are the unit of
//! progressive unfreezing: "unfreeze to -N" keeps the trailing N blocks and
//! the head trainable.

use crate::error::{Error, Result};
use crate::model::tokenizer::VOCAB_SIZE;
use aprender::autograd::Tensor;
use aprender::nn::{Linear, Module, RMSNorm, ReLU};

/// Architecture hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub ffn_size: usize,
    pub n_blocks: usize,
}

impl EncoderConfig {
    /// Resolve a size preset by its published name.
    ///
    /// # Errors
    /// Returns `Error::Config` for an unknown preset name.
    pub fn preset(name: &str) -> Result<Self> {
        match name {
            "encoder-mini" => Ok(Self::mini()),
            "encoder-base" => Ok(Self {
                vocab_size: VOCAB_SIZE,
                hidden_size: 128,
                ffn_size: 512,
                n_blocks: 6,
            }),
            "encoder-large" => Ok(Self {
                vocab_size: VOCAB_SIZE,
                hidden_size: 256,
                ffn_size: 1024,
                n_blocks: 12,
            }),
            other => Err(Error::Config(format!(
                "unknown pretrained model '{other}' (expected encoder-mini, encoder-base or encoder-large)"
            ))),
        }
    }

    /// Smallest preset; also the test configuration.
    #[must_use]
    pub fn mini() -> Self {
        Self {
            vocab_size: VOCAB_SIZE,
            hidden_size: 32,
            ffn_size: 128,
            n_blocks: 2,
        }
    }
}

/// Deterministic uniform init in Xavier range, LCG-driven.
fn xavier_init(fan_in: usize, fan_out: usize, count: usize, seed: u64) -> Vec<f32> {
    let scale = (6.0 / (fan_in + fan_out) as f32).sqrt();
    let mut rng_state = seed;
    (0..count)
        .map(|_| {
            rng_state = rng_state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let u = (rng_state >> 33) as f32 / (1u64 << 31) as f32;
            (2.0 * u - 1.0) * scale
        })
        .collect()
}

/// One encoder block: token mixing and a ReLU² feed-forward, both pre-normed
/// with residual connections.
pub struct EncoderBlock {
    mix: Linear,
    ff_expand: Linear,
    ff_project: Linear,
    relu: ReLU,
    hidden_size: usize,
}

impl EncoderBlock {
    #[must_use]
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            mix: Linear::new(config.hidden_size, config.hidden_size),
            ff_expand: Linear::new(config.hidden_size, config.ffn_size),
            ff_project: Linear::new(config.ffn_size, config.hidden_size),
            relu: ReLU::new(),
            hidden_size: config.hidden_size,
        }
    }

    /// Forward pass over `[seq_len, hidden]`.
    #[must_use]
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let normed = rms_norm(x, self.hidden_size);
        let mixed = self.mix.forward(&normed);
        let x = mixed.add(x);

        let normed = rms_norm(&x, self.hidden_size);
        let h = self.relu.forward(&self.ff_expand.forward(&normed));
        // ReLU²: relu(x).square()
        let h_data = h.data();
        let squared: Vec<f32> = h_data.iter().map(|&v| v * v).collect();
        let h = Tensor::new(&squared, h.shape());
        let h = self.ff_project.forward(&h);

        h.add(&x)
    }
}

impl Module for EncoderBlock {
    fn forward(&self, input: &Tensor) -> Tensor {
        self.forward(input)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = Vec::new();
        params.extend(self.mix.parameters());
        params.extend(self.ff_expand.parameters());
        params.extend(self.ff_project.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = Vec::new();
        params.extend(self.mix.parameters_mut());
        params.extend(self.ff_expand.parameters_mut());
        params.extend(self.ff_project.parameters_mut());
        params
    }
}

fn rms_norm(x: &Tensor, hidden: usize) -> Tensor {
    RMSNorm::without_affine(&[hidden]).forward(x)
}

/// Encoder classifier: embedding, block stack, mean pool, linear head.
pub struct EncoderClassifier {
    config: EncoderConfig,
    /// Embedding table, `[vocab_size * hidden]` flattened row-major
    embed: Tensor,
    blocks: Vec<EncoderBlock>,
    head: Linear,
    num_labels: usize,
}

impl EncoderClassifier {
    /// Build a fresh classifier with deterministic initialization.
    #[must_use]
    pub fn new(config: EncoderConfig, num_labels: usize) -> Self {
        let embed_data = xavier_init(
            config.vocab_size,
            config.hidden_size,
            config.vocab_size * config.hidden_size,
            42,
        );
        let embed = Tensor::new(&embed_data, &[config.vocab_size, config.hidden_size]);
        let blocks = (0..config.n_blocks).map(|_| EncoderBlock::new(&config)).collect();
        let head = Linear::new(config.hidden_size, num_labels);
        Self { config, embed, blocks, head, num_labels }
    }

    #[must_use]
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    #[must_use]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Number of output columns (the trained label count).
    #[must_use]
    pub fn num_labels(&self) -> usize {
        self.num_labels
    }

    /// Look up embeddings for a token sequence: `[seq_len, hidden]`.
    fn embed_ids(&self, ids: &[u32]) -> Tensor {
        let h = self.config.hidden_size;
        let table = self.embed.data();
        let mut out = vec![0.0f32; ids.len() * h];
        for (pos, &id) in ids.iter().enumerate() {
            let row = (id as usize).min(self.config.vocab_size - 1) * h;
            for j in 0..h {
                out[pos * h + j] = table[row + j];
            }
        }
        Tensor::new(&out, &[ids.len(), h])
    }

    /// Mean-pool `[seq_len, hidden]` to `[1, hidden]`.
    fn mean_pool(&self, x: &Tensor, seq_len: usize) -> Tensor {
        let h = self.config.hidden_size;
        let data = x.data();
        let mut pooled = vec![0.0f32; h];
        for pos in 0..seq_len {
            for j in 0..h {
                pooled[j] += data[pos * h + j];
            }
        }
        let inv_len = 1.0 / seq_len.max(1) as f32;
        for v in &mut pooled {
            *v *= inv_len;
        }
        Tensor::new(&pooled, &[1, h])
    }

    /// Raw logits for one token sequence: `[num_labels]` values.
    #[must_use]
    pub fn forward_logits(&self, ids: &[u32]) -> Tensor {
        let mut x = self.embed_ids(ids);
        for block in &self.blocks {
            x = block.forward(&x);
        }
        let pooled = self.mean_pool(&x, ids.len());
        self.head.forward(&pooled)
    }

    /// Trainable parameters for the current freeze state.
    ///
    /// `first_block == None` means nothing is frozen (embedding, every block,
    /// and the head train). `Some(n)` trains only blocks `n..` plus the head.
    pub fn trainable_parameters_mut(&mut self, first_block: Option<usize>) -> Vec<&mut Tensor> {
        let mut params = Vec::new();
        let from = match first_block {
            None => {
                params.push(&mut self.embed);
                0
            }
            Some(n) => n.min(self.blocks.len()),
        };
        for block in &mut self.blocks[from..] {
            params.extend(block.parameters_mut());
        }
        params.extend(self.head.parameters_mut());
        params
    }
}

impl Module for EncoderClassifier {
    /// Forward over a pre-embedded `[seq_len, hidden]` input.
    fn forward(&self, input: &Tensor) -> Tensor {
        let seq_len = input.shape()[0];
        let mut x = input.clone();
        for block in &self.blocks {
            x = block.forward(&x);
        }
        let pooled = self.mean_pool(&x, seq_len);
        self.head.forward(&pooled)
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![&self.embed];
        for block in &self.blocks {
            params.extend(block.parameters());
        }
        params.extend(self.head.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![&mut self.embed];
        for block in &mut self.blocks {
            params.extend(block.parameters_mut());
        }
        params.extend(self.head.parameters_mut());
        params
    }
}
