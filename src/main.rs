use anyhow::{Context, Error, bail, ensure};
use clap::{Args, Parser, Subcommand};
use mysql_time::{
    datatypes::mysql_time::MySqlTime,
    modules::work_hours::{WorkHour, WorkHourStore},
    util::logging,
};
use std::{path::PathBuf, str::FromStr};

#[derive(Debug, Clone)]
struct ArgumentsTime(MySqlTime);
impl FromStr for ArgumentsTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = MySqlTime::from_text(s).context("from_text")?;
        Ok(Self(inner))
    }
}

#[derive(Debug, Parser)]
#[clap(name = "mysql-time")]
struct Arguments {
    /// SQLite database holding the work_hour table
    #[clap(long, default_value = "work_hours.sqlite")]
    database: PathBuf,

    #[clap(short, long)]
    verbose: bool,

    #[clap(subcommand)]
    subcommand: ArgumentsSubcommand,
}

#[derive(Debug, Subcommand)]
enum ArgumentsSubcommand {
    /// Parse TIME literals and print their canonical form
    Parse(ArgumentsParse),
    /// Store work hours for a user, missing or empty times are stored as NULL
    Set(ArgumentsSet),
    Get(ArgumentsUser),
    List,
    Remove(ArgumentsUser),
}

#[derive(Debug, Args)]
struct ArgumentsParse {
    #[clap(required = true)]
    literals: Vec<String>,
}

#[derive(Debug, Args)]
struct ArgumentsSet {
    user_id: i64,
    #[clap(long)]
    start: Option<ArgumentsTime>,
    #[clap(long)]
    end: Option<ArgumentsTime>,
}

#[derive(Debug, Args)]
struct ArgumentsUser {
    user_id: i64,
}

fn main() -> Result<(), Error> {
    let arguments = Arguments::parse();

    logging::configure(module_path!(), arguments.verbose);

    match arguments.subcommand {
        ArgumentsSubcommand::Parse(arguments_parse) => {
            parse(&arguments_parse.literals).context("parse")?
        }
        ArgumentsSubcommand::Set(arguments_set) => {
            let store = WorkHourStore::open(&arguments.database).context("open")?;
            let work_hour = WorkHour {
                user_id: arguments_set.user_id,
                work_hour_start: arguments_set.start.map(|time| time.0).unwrap_or_default(),
                work_hour_end: arguments_set.end.map(|time| time.0).unwrap_or_default(),
            };
            store.upsert(&work_hour).context("upsert")?;
            log::info!("stored work hours for user {}", work_hour.user_id);
        }
        ArgumentsSubcommand::Get(arguments_user) => {
            let store = WorkHourStore::open(&arguments.database).context("open")?;
            let work_hour = match store.get(arguments_user.user_id).context("get")? {
                Some(work_hour) => work_hour,
                None => bail!("no work hours for user {}", arguments_user.user_id),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&work_hour).context("to_string_pretty")?
            );
        }
        ArgumentsSubcommand::List => {
            let store = WorkHourStore::open(&arguments.database).context("open")?;
            let work_hours = store.list().context("list")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&work_hours).context("to_string_pretty")?
            );
        }
        ArgumentsSubcommand::Remove(arguments_user) => {
            let store = WorkHourStore::open(&arguments.database).context("open")?;
            let removed = store.remove(arguments_user.user_id).context("remove")?;
            ensure!(removed, "no work hours for user {}", arguments_user.user_id);
            log::info!("removed work hours for user {}", arguments_user.user_id);
        }
    }

    Ok(())
}

fn parse(literals: &[String]) -> Result<(), Error> {
    let mut failed = 0usize;
    for literal in literals {
        match literal.parse::<MySqlTime>() {
            Ok(time) => {
                let seconds = time.duration().map_or(0, |duration| duration.num_seconds());
                println!("{literal}\t{time}\t{seconds}");
            }
            Err(error) => {
                log::error!("{error}");
                failed += 1;
            }
        }
    }
    ensure!(failed == 0, "{failed} of {} literals failed", literals.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ArgumentsTime, parse};
    use std::str::FromStr;

    #[test]
    fn parse_1() {
        assert!(parse(&["005:30:15".to_owned(), "123456".to_owned()]).is_ok());
    }
    #[test]
    fn parse_failed() {
        let error = parse(&["5".to_owned(), "11:12".to_owned()]).unwrap_err();
        assert_eq!(error.to_string(), "1 of 2 literals failed");
    }

    #[test]
    fn arguments_time_1() {
        let time = ArgumentsTime::from_str("-1:30").unwrap();
        assert_eq!(time.0.to_string(), "-001:30:00");
    }
    #[test]
    fn arguments_time_empty() {
        let time = ArgumentsTime::from_str("").unwrap();
        assert!(!time.0.is_set());
    }
    #[test]
    fn arguments_time_invalid() {
        assert!(ArgumentsTime::from_str("123").is_err());
    }
}
