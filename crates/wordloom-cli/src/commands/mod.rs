mod cat;
mod sample;

/// Subcommands for wordloom-cli
#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Act as a streaming tokenizer.
    Cat(cat::CatArgs),

    /// Sample token indices from logits vectors, one per line.
    Sample(sample::SampleArgs),
}

impl Commands {
    /// Run the subcommand.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        match self {
            Commands::Cat(cmd) => cmd.run(),
            Commands::Sample(cmd) => cmd.run(),
        }
    }
}
