//! tagrag CLI - ask questions about a tag-structured document
//!
//! # Commands
//!
//! ```bash
//! # Answer one question
//! tagrag --corpus manual.md ask "How do I export reports?"
//!
//! # Show the excerpts retrieval would hand to the model
//! tagrag --corpus manual.md retrieve "export reports"
//!
//! # List all tags
//! tagrag --corpus manual.md list
//!
//! # Interactive shell ('exit' to quit, 'list apis' to list tags)
//! tagrag --corpus manual.md shell
//! ```

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tagrag_lib::{
    config::PipelineConfig,
    corpus::{self, FileSource},
    embed::{Embedder, MiniLmEmbedder, OpenAiEmbedder},
    generate::{GeminiGenerator, Generator, OpenAiGenerator},
    pipeline::Pipeline,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type CliPipeline = Pipeline<FileSource, Box<dyn Embedder>, Box<dyn Generator>>;

#[derive(Parser)]
#[command(name = "tagrag")]
#[command(about = "Question answering over tag-structured documents")]
#[command(version)]
struct Cli {
    /// Corpus file with '# ' headings
    #[arg(long, env = "TAGRAG_CORPUS", default_value = "manual.md")]
    corpus: PathBuf,

    /// Optional TOML file with pipeline settings
    #[arg(long, env = "TAGRAG_CONFIG")]
    config: Option<PathBuf>,

    /// Generation service
    #[arg(long, env = "TAGRAG_PROVIDER", value_enum, default_value_t = Provider::Gemini)]
    provider: Provider,

    /// Gemini API key
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    google_api_key: Option<String>,

    /// Gemini model
    #[arg(long, env = "TAGRAG_GEMINI_MODEL", default_value = "gemini-1.5-flash")]
    gemini_model: String,

    /// API key for OpenAI-compatible endpoints
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    openai_base_url: String,

    /// Chat model used when --provider openai
    #[arg(long, env = "TAGRAG_OPENAI_MODEL", default_value = "gpt-4o-mini")]
    openai_model: String,

    /// Embedding backend
    #[arg(long, env = "TAGRAG_EMBEDDER", value_enum, default_value_t = EmbedderKind::Local)]
    embedder: EmbedderKind,

    /// Embedding model used when --embedder openai
    #[arg(long, default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// Vector size of --embedding-model
    #[arg(long, default_value = "1536")]
    embedding_dimension: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        /// Question to answer
        question: String,
    },

    /// Print the excerpts retrieved for a question without generating an answer
    Retrieve {
        /// Question to retrieve for
        question: String,
    },

    /// List all tags in the corpus
    List,

    /// Interactive question loop
    Shell,
}

#[derive(Clone, Copy, ValueEnum)]
enum Provider {
    Gemini,
    Openai,
}

#[derive(Clone, Copy, ValueEnum)]
enum EmbedderKind {
    Local,
    Openai,
}

fn main() -> Result<()> {
    // logs go to stderr, stdout carries answers
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    let source = FileSource::new(&cli.corpus);

    match &cli.command {
        Commands::List => {
            print_tags(&corpus::list_tags(&source)?);
        }

        Commands::Ask { question } => {
            let mut pipeline = build_pipeline(&cli, source, config)?;
            println!("{}", pipeline.answer(question)?);
        }

        Commands::Retrieve { question } => {
            let mut pipeline = build_pipeline(&cli, source, config)?;
            let excerpts = pipeline.retrieve_only(question)?;
            println!("Retrieved {} excerpts:\n", excerpts.len());
            for (i, excerpt) in excerpts.iter().enumerate() {
                println!("--- #{} ({}) ---", i + 1, excerpt.tag.as_deref().unwrap_or("-"));
                println!("{excerpt}\n");
            }
        }

        Commands::Shell => {
            let pipeline = build_pipeline(&cli, source, config)?;
            run_shell(pipeline)?;
        }
    }

    Ok(())
}

fn build_pipeline(cli: &Cli, source: FileSource, config: PipelineConfig) -> Result<CliPipeline> {
    let timeout = config.timeout();

    let generator: Box<dyn Generator> = match cli.provider {
        Provider::Gemini => {
            let key = cli
                .google_api_key
                .as_deref()
                .ok_or_else(|| anyhow!("GOOGLE_API_KEY must be set for the Gemini provider"))?;
            Box::new(GeminiGenerator::new(key, &cli.gemini_model, timeout)?)
        }
        Provider::Openai => {
            let key = cli
                .openai_api_key
                .as_deref()
                .ok_or_else(|| anyhow!("OPENAI_API_KEY must be set for the OpenAI provider"))?;
            Box::new(OpenAiGenerator::new(
                key,
                &cli.openai_base_url,
                &cli.openai_model,
                timeout,
            )?)
        }
    };

    let embedder: Box<dyn Embedder> = match cli.embedder {
        EmbedderKind::Local => {
            eprintln!("Loading MiniLM model (first run downloads ~90MB)...");
            Box::new(MiniLmEmbedder::new().context("failed to load local embedding model")?)
        }
        EmbedderKind::Openai => {
            let key = cli
                .openai_api_key
                .as_deref()
                .ok_or_else(|| anyhow!("OPENAI_API_KEY must be set for the OpenAI embedder"))?;
            Box::new(OpenAiEmbedder::new(
                key,
                &cli.openai_base_url,
                &cli.embedding_model,
                cli.embedding_dimension,
                timeout,
            )?)
        }
    };

    info!(
        generator = generator.model_name(),
        embedder = embedder.model_name(),
        corpus = %source.path().display(),
        "pipeline ready"
    );
    Ok(Pipeline::new(source, embedder, generator, config))
}

fn print_tags(tags: &[String]) {
    println!("All APIs in the document ({}):\n{}", tags.len(), tags.join("\n"));
}

fn run_shell(mut pipeline: CliPipeline) -> Result<()> {
    println!("Ask a question about the document. Type 'exit' to quit, 'list apis' to list all APIs.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        match input.to_lowercase().as_str() {
            "" => continue,
            "exit" => break,
            "list apis" => match pipeline.list_tags() {
                Ok(tags) => print_tags(&tags),
                Err(e) => eprintln!("error: {e}"),
            },
            _ => match pipeline.answer(input) {
                Ok(answer) => println!("{answer}"),
                Err(e) => eprintln!("error: {e}"),
            },
        }
    }

    println!("Bye!");
    Ok(())
}
