use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::BankId;
use services::{BankService, Clock, QuizLoopService, RosterMode, extract_pages};
use storage::json::{JsonFileRepository, write_json_report};
use storage::pages::read_html_pages;
use storage::repository::Storage;
use tracing::info;

mod config;
mod logging;
mod terminal;

use config::Config;
use terminal::{Exit, Terminal};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingTarget { command: Command },
    UnknownArg(String),
    InvalidBankId { raw: String },
    InvalidCount { raw: String },
    InvalidRange { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingTarget { command } => {
                write!(f, "{command} requires a {}", command.target_name())
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidBankId { raw } => {
                write!(f, "invalid bank id: {raw} (expected <vendor>/<exam>)")
            }
            ArgsError::InvalidCount { raw } => write!(f, "invalid --count value: {raw}"),
            ArgsError::InvalidRange { raw } => {
                write!(f, "invalid --range value: {raw} (expected <start>..<end>)")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- vendors [--dir <path>]");
    eprintln!("  cargo run -p app -- banks <vendor> [--dir <path>]");
    eprintln!("  cargo run -p app -- audit <vendor>/<exam> [--dir <path>] [--out <file>]");
    eprintln!(
        "  cargo run -p app -- quiz  <vendor>/<exam> [--dir <path>] [--count <n>] [--range <start>..<end>]"
    );
    eprintln!("  cargo run -p app -- extract <html_dir> <vendor>/<exam> [--dir <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --dir ./questions");
    eprintln!("  --out audit_report.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_DIR, QUIZ_REPORT_PATH, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Vendors,
    Banks,
    Audit,
    Quiz,
    Extract,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "vendors" => Some(Self::Vendors),
            "banks" => Some(Self::Banks),
            "audit" => Some(Self::Audit),
            "quiz" => Some(Self::Quiz),
            "extract" => Some(Self::Extract),
            _ => None,
        }
    }

    fn target_name(self) -> &'static str {
        match self {
            Self::Vendors => "nothing",
            Self::Banks => "vendor",
            Self::Audit | Self::Quiz => "bank id",
            Self::Extract => "page directory and bank id",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vendors => "vendors",
            Self::Banks => "banks",
            Self::Audit => "audit",
            Self::Quiz => "quiz",
            Self::Extract => "extract",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct Args {
    config: Config,
    /// Page directory for `extract`.
    source: Option<PathBuf>,
    target: Option<String>,
    count: Option<usize>,
    range: Option<(usize, usize)>,
}

impl Args {
    fn parse(
        command: Command,
        args: &mut impl Iterator<Item = String>,
        mut config: Config,
    ) -> Result<Self, ArgsError> {
        let mut source = None;
        let mut target = None;
        let mut count = None;
        let mut range = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dir" => config.bank_dir = PathBuf::from(require_value(args, "--dir")?),
                "--out" if command == Command::Audit => {
                    config.report_path = PathBuf::from(require_value(args, "--out")?);
                }
                "--count" if command == Command::Quiz => {
                    let value = require_value(args, "--count")?;
                    let parsed: usize = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCount { raw: value.clone() })?;
                    count = Some(parsed);
                }
                "--range" if command == Command::Quiz => {
                    let value = require_value(args, "--range")?;
                    range = Some(parse_range(&value).ok_or(ArgsError::InvalidRange { raw: value })?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if !arg.starts_with("--") && command == Command::Extract && source.is_none() => {
                    source = Some(PathBuf::from(arg));
                }
                _ if !arg.starts_with("--") && target.is_none() && command != Command::Vendors => {
                    target = Some(arg);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let incomplete = match command {
            Command::Vendors => false,
            Command::Extract => source.is_none() || target.is_none(),
            _ => target.is_none(),
        };
        if incomplete {
            return Err(ArgsError::MissingTarget { command });
        }

        Ok(Self {
            config,
            source,
            target,
            count,
            range,
        })
    }

    fn bank_id(&self) -> Result<BankId, ArgsError> {
        let raw = self.target.clone().unwrap_or_default();
        raw.parse()
            .map_err(|_| ArgsError::InvalidBankId { raw })
    }

    fn roster_mode(&self) -> RosterMode {
        RosterMode::from_options(self.count, self.range)
    }
}

/// Parse `<start>..<end>` as zero-based, end-exclusive bounds.
fn parse_range(raw: &str) -> Option<(usize, usize)> {
    let (start, end) = raw.split_once("..")?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if matches!(first.as_str(), "--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(cmd, &mut argv, Config::from_env()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    logging::init();
    info!(dir = %parsed.config.bank_dir.display(), command = %cmd, "opening question banks");

    // Keep file layout knowledge in the binary glue; services only see the repository trait.
    let storage = Storage::json_dir(&parsed.config.bank_dir);
    let banks = BankService::new(Arc::clone(&storage.banks));

    match cmd {
        Command::Vendors => {
            for vendor in banks.vendors().await? {
                println!("{vendor}");
            }
        }
        Command::Banks => {
            let vendor = parsed.target.as_deref().unwrap_or_default();
            for bank in banks.banks(vendor).await? {
                println!("{bank}");
            }
        }
        Command::Audit => {
            let bank_id = parsed.bank_id()?;
            let service = QuizLoopService::new(Clock::system(), banks);
            let report = service.audit(&bank_id).await?;
            write_json_report(&parsed.config.report_path, &report).await?;
            info!(
                bank = %bank_id,
                questions = report.total_questions,
                path = %parsed.config.report_path.display(),
                "audit report written"
            );
            println!("{}", parsed.config.report_path.display());
        }
        Command::Extract => {
            let bank_id = parsed.bank_id()?;
            let pages_dir = parsed.source.clone().unwrap_or_default();
            let pages = read_html_pages(&pages_dir).await?;
            let extraction = extract_pages(pages);

            let path = JsonFileRepository::new(&parsed.config.bank_dir).bank_path(&bank_id);
            write_json_report(&path, &extraction.records).await?;
            info!(
                bank = %bank_id,
                pages = %pages_dir.display(),
                records = extraction.records.len(),
                usable = extraction.usable_questions(),
                failed = extraction.failed.len(),
                path = %path.display(),
                "question bank written"
            );
            println!("{}", path.display());
        }
        Command::Quiz => {
            let bank_id = parsed.bank_id()?;
            let service = QuizLoopService::new(Clock::system(), banks);
            let mut session = service.start_session(&bank_id, parsed.roster_mode()).await?;

            let stdin = std::io::stdin().lock();
            let stdout = std::io::stdout().lock();
            match Terminal::new(stdin, stdout).run(&mut session)? {
                Exit::Finished(summary) => info!(
                    bank = %bank_id,
                    correct = summary.score.correct,
                    total = summary.score.total,
                    attempts = summary.attempts,
                    "quiz finished"
                ),
                Exit::Quit => info!(bank = %bank_id, "quiz abandoned"),
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // Binary glue prints once.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(command: Command, args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(command, &mut iter, Config::default())
    }

    #[test]
    fn quiz_args_build_roster_mode() {
        let args = parse(
            Command::Quiz,
            &["aws/sysops", "--count", "5", "--range", "10..40", "--dir", "/banks"],
        )
        .unwrap();
        assert_eq!(args.bank_id().unwrap(), BankId::new("aws", "sysops").unwrap());
        assert_eq!(
            args.roster_mode(),
            RosterMode::Range { start: 10, end: 40, count: Some(5) }
        );
        assert_eq!(args.config.bank_dir, PathBuf::from("/banks"));
    }

    #[test]
    fn flags_are_scoped_to_their_command() {
        assert!(matches!(
            parse(Command::Audit, &["aws/sysops", "--count", "3"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(Command::Vendors, &["aws"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            parse(Command::Quiz, &["aws/sysops", "--range", "5-9"]),
            Err(ArgsError::InvalidRange { .. })
        ));
        assert!(matches!(
            parse(Command::Quiz, &["aws/sysops", "--count"]),
            Err(ArgsError::MissingValue { flag: "--count" })
        ));
        assert!(matches!(
            parse(Command::Banks, &[]),
            Err(ArgsError::MissingTarget { command: Command::Banks })
        ));
        let args = parse(Command::Audit, &["no-slash"]).unwrap();
        assert!(matches!(args.bank_id(), Err(ArgsError::InvalidBankId { .. })));
    }

    #[test]
    fn extract_takes_page_dir_then_bank_id() {
        let args = parse(Command::Extract, &["html_pages/aws", "aws/sysops", "--dir", "/banks"]).unwrap();
        assert_eq!(args.source, Some(PathBuf::from("html_pages/aws")));
        assert_eq!(args.bank_id().unwrap(), BankId::new("aws", "sysops").unwrap());
        assert_eq!(args.config.bank_dir, PathBuf::from("/banks"));

        assert!(matches!(
            parse(Command::Extract, &["html_pages/aws"]),
            Err(ArgsError::MissingTarget { command: Command::Extract })
        ));
        assert!(matches!(
            parse(Command::Extract, &["html_pages/aws", "aws/sysops", "--count", "2"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn range_parsing() {
        assert_eq!(parse_range("0..10"), Some((0, 10)));
        assert_eq!(parse_range(" 3 .. 4 "), Some((3, 4)));
        assert_eq!(parse_range("..4"), None);
    }
}
