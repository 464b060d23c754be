use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use derangements::DERANGEMENT_WINDOW;
use derangements::anagram::{FinderConfig, find_derangements};
use derangements::codec::Codec;
use derangements::env::create_term_env;
use derangements::pipeline::derangement_groups;
use derangements::wordlist::load_word_list;
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "derangements")]
#[command(about = "Find anagram pairs that share no letter position", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Bucket words directly and print one derangement pair per line
    Find(SearchArgs),

    /// Run the search through encoded terms and print the groups as JSON
    Encoded(SearchArgs),
}

#[derive(Args)]
struct SearchArgs {
    /// JSON file holding an array of uppercase words
    words: PathBuf,

    /// Number of leading positions that must all differ
    #[arg(long, default_value_t = DERANGEMENT_WINDOW)]
    window: usize,
}

impl SearchArgs {
    fn load(&self) -> Result<(Vec<String>, FinderConfig)> {
        let words = load_word_list(&self.words)
            .with_context(|| format!("failed to read word list {}", self.words.display()))?;
        info!("{} words, window {}", words.len(), self.window);
        Ok((
            words,
            FinderConfig {
                window: self.window,
            },
        ))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match &cli.command {
        Commands::Find(args) => {
            let (words, config) = args.load()?;
            let found =
                find_derangements(&words, &config).context("derangement search failed")?;
            for pair in found {
                println!("{pair}");
            }
        }
        Commands::Encoded(args) => {
            let (words, config) = args.load()?;
            let env = create_term_env();
            let mut codec = Codec::new();
            let groups = derangement_groups(&env, &mut codec, &words, &config)
                .context("encoded derangement search failed")?;
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
    }

    Ok(())
}
