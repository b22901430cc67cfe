use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reviewscope::extraction::{QuestionSet, questions};
use reviewscope::profiles::{
    MemoryProfileStore, ProfileCriteria, aggregate, filter_profiles, filter_profiles_ranked,
};
use serde_json::json;

#[derive(Parser)]
#[command(
    name = "review-filter",
    about = "Offline profile filtering and review text extraction"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter a JSON profile dump and print matching profiles with aggregates.
    Filter {
        /// JSON array of company profiles.
        #[arg(long)]
        input: PathBuf,
        /// Write the result here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print only the aggregates.
        #[arg(long)]
        aggregates_only: bool,
        /// Order by relevance and keep at most `--limit` profiles.
        #[arg(long)]
        ranked: bool,
        #[arg(long, default_value_t = reviewscope::profiles::RANKED_PROFILE_LIMIT)]
        limit: usize,
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Render one review section as question/answer lines.
    Qa {
        /// File holding the raw section text.
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum)]
        catalog: Catalog,
    },
}

#[derive(Args)]
struct CriteriaArgs {
    #[arg(long = "focus")]
    focus_names: Vec<String>,
    #[arg(long)]
    min_reviews: Option<u32>,
    #[arg(long)]
    max_reviews: Option<u32>,
    #[arg(long = "id")]
    ids: Vec<String>,
    #[arg(long = "industry")]
    industry_names: Vec<String>,
    #[arg(long = "reviewer-title")]
    reviewer_titles: Vec<String>,
    #[arg(long = "reviewer-name")]
    reviewer_names: Vec<String>,
    #[arg(long = "project-focus")]
    project_focus_names: Vec<String>,
    #[arg(long = "with-linkedin")]
    include_only_with_linkedin: bool,
    #[arg(long = "without-linkedin")]
    include_only_without_linkedin: bool,
    #[arg(long = "background")]
    background_keywords: Vec<String>,
    #[arg(long = "challenge")]
    challenge_keywords: Vec<String>,
    #[arg(long = "solution")]
    solution_keywords: Vec<String>,
    #[arg(long = "feedback")]
    feedback_keywords: Vec<String>,
}

impl From<CriteriaArgs> for ProfileCriteria {
    fn from(args: CriteriaArgs) -> Self {
        ProfileCriteria {
            focus_names: args.focus_names,
            min_reviews: args.min_reviews,
            max_reviews: args.max_reviews,
            ids: args.ids,
            industry_names: args.industry_names,
            reviewer_titles: args.reviewer_titles,
            reviewer_names: args.reviewer_names,
            project_focus_names: args.project_focus_names,
            include_only_with_linkedin: args.include_only_with_linkedin,
            include_only_without_linkedin: args.include_only_without_linkedin,
            background_keywords: args.background_keywords,
            challenge_keywords: args.challenge_keywords,
            solution_keywords: args.solution_keywords,
            feedback_keywords: args.feedback_keywords,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Catalog {
    Background,
    Solution,
    Challenge,
    Feedback,
}

impl Catalog {
    fn questions(self) -> &'static QuestionSet {
        match self {
            Catalog::Background => questions::background(),
            Catalog::Solution => questions::solution(),
            Catalog::Challenge => questions::challenge(),
            Catalog::Feedback => questions::feedback(),
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Filter {
            input,
            output,
            aggregates_only,
            ranked,
            limit,
            criteria,
        } => {
            if limit == 0 {
                bail!("--limit must be positive");
            }
            let store = MemoryProfileStore::load_json(&input)
                .await
                .with_context(|| format!("failed to load profiles from {}", input.display()))?;
            let criteria = ProfileCriteria::from(criteria);
            let profiles = if ranked {
                filter_profiles_ranked(&store, &criteria, limit).await?
            } else {
                filter_profiles(&store, &criteria).await?
            };
            let aggregates = aggregate(&profiles);
            let value = if aggregates_only {
                serde_json::to_value(&aggregates)?
            } else {
                json!({ "profiles": profiles, "aggregates": aggregates })
            };
            let rendered = serde_json::to_string_pretty(&value)?;
            write_output(output, &rendered)
        }
        Command::Qa { input, catalog } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            write_output(None, &catalog.questions().extract(&text))
        }
    }
}

fn write_output(path: Option<PathBuf>, contents: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(&path, format!("{contents}\n"))
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{contents}").context("failed to write to stdout")
        }
    }
}
