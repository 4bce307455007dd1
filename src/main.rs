// Command-line front end for a course gradebook.
// Reads connection settings, then runs one column or grade operation.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use lti_gradebook::{CachedGradebook, Column, Grade, Gradebook, LtiConfig};

#[derive(Debug, Parser)]
#[command(name = "lti-gradebook", version, about = "Manage a Moodle course gradebook over LTI")]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, env = "LTI_GRADEBOOK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all columns
    List,
    /// Show one column
    Show { id: u64 },
    /// Create a column
    #[command(allow_negative_numbers = true)]
    Create {
        title: String,
        maximum_score: f64,
        #[arg(long)]
        tag: Option<String>,
    },
    /// Change the title, maximum score or tag of a column
    #[command(allow_negative_numbers = true)]
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long = "max-score")]
        maximum_score: Option<f64>,
        #[arg(long)]
        tag: Option<String>,
        /// Remove the column's tag
        #[arg(long, conflicts_with = "tag")]
        clear_tag: bool,
    },
    /// Delete a column
    Delete { id: u64 },
    /// Record a final grade for a user
    #[command(allow_negative_numbers = true)]
    Grade {
        column_id: u64,
        user_id: u64,
        score: f64,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// List recorded results for a column
    Results { column_id: u64 },
}

fn print_column(column: &Column) {
    println!(
        "{:>8}  {:<32}  {:>8}  {}",
        column.id(),
        column.title(),
        column.maximum_score(),
        column.tag().unwrap_or("-")
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lti_gradebook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = LtiConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!(base_url = %config.base_url, course = config.course_id, "using gradebook");
    let gradebook = CachedGradebook::from_config(&config)?;

    match cli.command {
        Command::List => {
            for column in gradebook.list_columns().await? {
                print_column(&column);
            }
        }
        Command::Show { id } => print_column(&gradebook.get_column(id).await?),
        Command::Create {
            title,
            maximum_score,
            tag,
        } => {
            let column = gradebook
                .create_column(Some(title.as_str()), maximum_score, tag.as_deref())
                .await?;
            print_column(&column);
        }
        Command::Update {
            id,
            title,
            maximum_score,
            tag,
            clear_tag,
        } => {
            let mut column = gradebook.get_column(id).await?;
            if let Some(title) = title {
                column.set_title(title);
            }
            if let Some(maximum_score) = maximum_score {
                column.set_maximum_score(maximum_score);
            }
            if clear_tag {
                column.set_tag(None);
            } else if tag.is_some() {
                column.set_tag(tag);
            }
            gradebook.update_column(&column).await?;
            print_column(&column);
        }
        Command::Delete { id } => {
            gradebook.delete_column(id).await?;
            info!(id, "deleted column");
        }
        Command::Grade {
            column_id,
            user_id,
            score,
            comment,
        } => {
            let grade = Grade::new(score).with_comment(comment);
            gradebook.set_grade(column_id, user_id, &grade).await?;
            info!(column = column_id, user = user_id, score, "recorded grade");
        }
        Command::Results { column_id } => {
            for result in gradebook.list_results(column_id).await? {
                println!(
                    "{:>8}  {:>8}  {:>8}  {}",
                    result.user_id,
                    result.result_score.map_or("-".to_string(), |s| s.to_string()),
                    result.result_maximum.map_or("-".to_string(), |s| s.to_string()),
                    result.comment.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("lti-gradebook").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_negative_numbers_reach_validation() {
        assert!(matches!(
            parse(&["create", "Quiz", "-5"]),
            Command::Create { maximum_score, .. } if maximum_score == -5.0
        ));
        assert!(matches!(
            parse(&["grade", "3", "42", "-1.5"]),
            Command::Grade { score, .. } if score == -1.5
        ));
        assert!(matches!(
            parse(&["update", "3", "--max-score", "-2"]),
            Command::Update { maximum_score: Some(m), .. } if m == -2.0
        ));
    }

    #[test]
    fn test_clear_tag() {
        assert!(matches!(
            parse(&["update", "3", "--clear-tag"]),
            Command::Update { clear_tag: true, tag: None, .. }
        ));
        assert!(
            Cli::try_parse_from(["lti-gradebook", "update", "3", "--tag", "x", "--clear-tag"])
                .is_err()
        );
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
