use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use rand::{RngCore, SeedableRng, rngs::StdRng};
use wordloom::{
    Tokenizer, TokenizerOptions,
    sampling::{SamplerOptions, sample},
};

use crate::input_output::{InputArgs, OutputArgs};

/// Args for the sample command.
#[derive(clap::Args, Debug)]
pub struct SampleArgs {
    /// Sampling temperature; 0 selects the arg-max.
    #[arg(long, default_value_t = 1.0)]
    temperature: f32,

    /// Nucleus threshold in [0, 1]; 0 disables truncation.
    #[arg(long, default_value_t = 1.0)]
    top_p: f32,

    /// Log-space bias for one token, as INDEX=BIAS; may be repeated.
    #[arg(long = "bias", value_parser = parse_bias)]
    biases: Vec<(usize, f32)>,

    /// Seed for reproducible draws.
    #[arg(long)]
    seed: Option<u64>,

    /// Optional `tokenizer.json`; when given, the decoded token follows each index.
    #[arg(long)]
    vocab: Option<PathBuf>,

    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,
}

fn parse_bias(arg: &str) -> Result<(usize, f32), String> {
    let (index, bias) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=BIAS: {arg:?}"))?;
    let index = index.trim().parse::<usize>().map_err(|e| format!("bad index {index:?}: {e}"))?;
    let bias = bias.trim().parse::<f32>().map_err(|e| format!("bad bias {bias:?}: {e}"))?;
    Ok((index, bias))
}

impl SampleArgs {
    /// The sampler options selected by the flags.
    fn options(&self) -> SamplerOptions {
        SamplerOptions::default()
            .with_temperature(self.temperature)
            .with_top_p(self.top_p)
            .with_logit_bias(self.biases.iter().copied())
    }

    /// Run the sample command.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let options = self.options();
        options.validate()?;

        let tokenizer = match &self.vocab {
            Some(path) => Some(Tokenizer::<u32>::from_path(path, TokenizerOptions::default())?),
            None => None,
        };
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut reader = self.input.open_reader()?;
        let mut writer = self.output.open_writer()?;
        run_sample(
            &mut reader,
            &mut writer,
            &options,
            tokenizer.as_ref(),
            &mut rng,
        )
    }
}

/// Sample one index per line of whitespace- or comma-separated logits.
fn run_sample(
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
    options: &SamplerOptions,
    tokenizer: Option<&Tokenizer<u32>>,
    rng: &mut dyn RngCore,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in reader.lines() {
        let line = line?;
        let logits = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<f32>, _>>()?;
        if logits.is_empty() {
            continue;
        }

        let index = sample(&logits, options, rng)?;
        log::debug!("Sampled index {index} of {}", logits.len());

        match tokenizer {
            Some(tokenizer) => {
                let text = u32::try_from(index)
                    .map(|id| tokenizer.decode_token(id))
                    .unwrap_or_default();
                writeln!(writer, "{index}\t{text:?}")?;
            }
            None => writeln!(writer, "{index}")?,
        }
        writer.flush()?;
    }
    Ok(())
}
