//! Command-line front end for the chore preference form.
//!
//! # Responsibility
//! - Drive one `FormSession` per invocation against a SQLite store.
//! - Keep output plain and line-oriented.

use anyhow::{bail, Context, Result};
use choreprefs_core::db::open_db;
use choreprefs_core::{
    default_log_level, init_logging, ChoreId, ChoreRepository, FormSession, IdentityResolver,
    PreferenceRepository, PreferenceStore, RoommateRepository, Score, SessionConfig,
    SqliteChoreRepository, SqlitePreferenceRepository, SqliteRoommateRepository,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "choreprefs")]
#[command(about = "Record household chore preferences", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file
    #[arg(long, global = true, default_value = "choreprefs.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the chore catalog
    Catalog,

    /// Add one chore to the catalog
    #[command(name = "add-chore")]
    AddChore { name: String },

    /// Show the scores stored for a roommate (defaults filled in)
    Show { name: String },

    /// Save scores for a roommate, creating the roommate when needed
    Submit {
        name: String,

        /// Score for one chore as `<chore_id>=<1..5>`; repeatable
        #[arg(long = "score", value_parser = parse_score_arg)]
        scores: Vec<(ChoreId, Score)>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let chores = SqliteChoreRepository::new(&conn);
    let resolver = IdentityResolver::new(SqliteRoommateRepository::new(&conn));
    let store = PreferenceStore::new(SqlitePreferenceRepository::new(&conn));

    match cli.command {
        Commands::Catalog => {
            for chore in chores.list_chores()? {
                println!("{}\t{}", chore.id, chore.name);
            }
        }
        Commands::AddChore { name } => {
            let chore = chores.create_chore(&name)?;
            println!("added chore {}\t{}", chore.id, chore.name);
        }
        Commands::Show { name } => {
            let mut session = FormSession::load(&chores, SessionConfig::default());
            resolve_now(&mut session, &name, &resolver, &store);
            match session.identity() {
                Some(roommate) => println!("roommate {} ({})", roommate.name, roommate.id),
                None => println!("no roommate named `{}` yet", name.trim()),
            }
            print_scores(&session);
        }
        Commands::Submit { name, scores } => {
            let mut session = FormSession::load(&chores, SessionConfig::default());
            resolve_now(&mut session, &name, &resolver, &store);
            for (chore_id, score) in scores {
                session.set_score(chore_id, score)?;
            }

            let request = session.begin_submit()?;
            let result = request.run(&resolver, &store);
            session.finish_submit(request, result);

            print_scores(&session);
            if let Some(notice) = session.notice() {
                if notice.is_error() {
                    bail!("{notice}");
                }
                println!("{notice}");
            }
        }
    }

    Ok(())
}

/// Types the name and blurs the field in one step.
fn resolve_now<R, P>(
    session: &mut FormSession,
    name: &str,
    resolver: &IdentityResolver<R>,
    store: &PreferenceStore<P>,
) where
    R: RoommateRepository,
    P: PreferenceRepository,
{
    session.set_name(name, Instant::now());
    if let Some(request) = session.settle() {
        let outcome = request.run(resolver, store);
        session.apply_resolution(request, outcome);
    }
}

fn print_scores(session: &FormSession) {
    for (chore, score) in session.display_scores() {
        println!("{}\t{}\t{}", chore.id, chore.name, score);
    }
}

fn parse_score_arg(raw: &str) -> Result<(ChoreId, Score), String> {
    let (chore, score) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <chore_id>=<score>, got `{raw}`"))?;
    let chore_id = chore
        .trim()
        .parse::<ChoreId>()
        .map_err(|err| format!("invalid chore id `{chore}`: {err}"))?;
    let value = score
        .trim()
        .parse::<u8>()
        .map_err(|err| format!("invalid score `{score}`: {err}"))?;
    let score = Score::new(value).map_err(|err| err.to_string())?;
    Ok((chore_id, score))
}

#[cfg(test)]
mod tests {
    use super::parse_score_arg;

    #[test]
    fn parse_score_arg_accepts_pair() {
        let (chore_id, score) = parse_score_arg("2=4").unwrap();
        assert_eq!(chore_id, 2);
        assert_eq!(score.get(), 4);
    }

    #[test]
    fn parse_score_arg_rejects_out_of_range_and_malformed() {
        assert!(parse_score_arg("2=6").unwrap_err().contains("outside"));
        assert!(parse_score_arg("2").is_err());
        assert!(parse_score_arg("x=3").is_err());
    }
}
