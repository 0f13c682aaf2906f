//! Interactive line session over stdin.
//!
//! Statement imports run as background tasks so the session keeps taking
//! commands; each finished extraction is applied to the ledger when it
//! resolves, one at a time, on the session's own task.

use super::{dashboard, report, ui};
use crate::core::extract::{self, ExtractedCandidate, ImportOutcome};
use crate::core::{
    BudgetTracker, Ledger, NewSubscription, StatementExtractor, UsageFrequency, WasteReport,
};
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info};

pub const DEFAULT_CATEGORY: &str = "Entertainment";
pub const DEFAULT_FREQUENCY: UsageFrequency = UsageFrequency::Daily;

const HELP: &str = "\
Commands:
  add <name...> <price> [category=<c>] [freq=<f>]  Track a subscription
  list                                             Show all subscriptions
  waste                                            Show the waste report
  stats                                            Show the dashboard
  remove <id>                                      Stop tracking a subscription
  freq <id> <daily|weekly|monthly|rarely|never>    Change how often it is used
  budget [amount]                                  Show or set the monthly budget
  import <file>                                    Detect subscriptions in a statement
  cancel                                           Abort pending imports
  help                                             Show this help
  quit                                             Leave the session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// `None` when the entry was incomplete; such entries are dropped quietly.
    Add(Option<NewSubscription>),
    List,
    Waste,
    Stats,
    Remove(String),
    Frequency(String, UsageFrequency),
    Budget(Option<f64>),
    Import(PathBuf),
    Cancel,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            bail!("Empty command");
        };
        let args: Vec<&str> = tokens.collect();

        match command.to_lowercase().as_str() {
            "add" => parse_add(&args),
            "list" | "ls" => Ok(SessionCommand::List),
            "waste" => Ok(SessionCommand::Waste),
            "stats" | "dashboard" => Ok(SessionCommand::Stats),
            "remove" | "rm" => match args.as_slice() {
                [id] => Ok(SessionCommand::Remove(id.to_string())),
                _ => bail!("Usage: remove <id>"),
            },
            "freq" | "frequency" => match args.as_slice() {
                [id, frequency] => Ok(SessionCommand::Frequency(
                    id.to_string(),
                    frequency.parse()?,
                )),
                _ => bail!("Usage: freq <id> <daily|weekly|monthly|rarely|never>"),
            },
            "budget" => match args.as_slice() {
                [] => Ok(SessionCommand::Budget(None)),
                [amount] => {
                    let amount = parse_amount(amount)
                        .with_context(|| format!("Invalid budget amount: {amount}"))?;
                    Ok(SessionCommand::Budget(Some(amount)))
                }
                _ => bail!("Usage: budget [amount]"),
            },
            "import" => {
                if args.is_empty() {
                    bail!("Usage: import <file>");
                }
                Ok(SessionCommand::Import(PathBuf::from(args.join(" "))))
            }
            "cancel" => Ok(SessionCommand::Cancel),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            other => bail!("Unknown command: {other}. Type 'help' for a list of commands."),
        }
    }
}

fn parse_amount(text: &str) -> Result<f64> {
    let trimmed = text.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '.');
    Ok(trimmed.parse::<f64>()?)
}

fn parse_add(args: &[&str]) -> Result<SessionCommand> {
    let mut category = DEFAULT_CATEGORY.to_string();
    let mut frequency = DEFAULT_FREQUENCY;
    let mut words = Vec::new();

    for arg in args {
        match arg.split_once('=') {
            Some((key, value)) => match key.to_lowercase().as_str() {
                "category" | "cat" => {
                    if !value.is_empty() {
                        category = value.to_string();
                    }
                }
                "freq" | "frequency" => frequency = value.parse()?,
                _ => bail!("Unknown option: {key}"),
            },
            None => words.push(*arg),
        }
    }

    let Some((price, name)) = words.split_last() else {
        return Ok(SessionCommand::Add(None));
    };
    let Ok(price) = parse_amount(price) else {
        return Ok(SessionCommand::Add(None));
    };

    let candidate = NewSubscription::new(name.join(" "), price, category, frequency);
    if candidate.is_well_formed() {
        Ok(SessionCommand::Add(Some(candidate)))
    } else {
        Ok(SessionCommand::Add(None))
    }
}

type ExtractionResult = (String, Result<Vec<ExtractedCandidate>>);

pub struct Session {
    ledger: Ledger,
    budget: BudgetTracker,
    extractor: Arc<dyn StatementExtractor>,
    symbol: String,
    pending: JoinSet<ExtractionResult>,
}

impl Session {
    pub fn new(
        budget: BudgetTracker,
        extractor: Arc<dyn StatementExtractor>,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            ledger: Ledger::new(),
            budget,
            extractor,
            symbol: symbol.into(),
            pending: JoinSet::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn budget(&self) -> &BudgetTracker {
        &self.budget
    }

    pub fn pending_imports(&self) -> usize {
        self.pending.len()
    }

    /// Parses and runs one line of input, returning what to print.
    pub fn handle_line(&mut self, line: &str) -> Result<(LoopControl, String)> {
        if line.trim().is_empty() {
            return Ok((LoopControl::Continue, String::new()));
        }
        let command: SessionCommand = line.parse()?;
        self.execute(command)
    }

    pub fn execute(&mut self, command: SessionCommand) -> Result<(LoopControl, String)> {
        debug!(?command, "Executing session command");
        let output = match command {
            SessionCommand::Add(None) => String::new(),
            SessionCommand::Add(Some(candidate)) => {
                let name = candidate.name.clone();
                let id = self.ledger.add(candidate);
                format!("Added {name} ({id}).\n{}", self.stats_line())
            }
            SessionCommand::List => {
                report::render_subscriptions(self.ledger.subscriptions(), &self.symbol)
            }
            SessionCommand::Waste => report::render_waste_report(
                &WasteReport::from_subscriptions(self.ledger.iter()),
                &self.symbol,
            ),
            SessionCommand::Stats => self.render_dashboard(),
            SessionCommand::Remove(id) => {
                if self.ledger.remove(&id) {
                    format!("Removed {id}.\n{}", self.stats_line())
                } else {
                    format!("No subscription with id {id}.")
                }
            }
            SessionCommand::Frequency(id, frequency) => {
                if self.ledger.update_frequency(&id, frequency) {
                    format!("{id} is now used {frequency}.\n{}", self.stats_line())
                } else {
                    format!("No subscription with id {id}.")
                }
            }
            SessionCommand::Budget(None) => {
                dashboard::render_budget(&self.budget.status(&self.ledger.stats()), &self.symbol)
            }
            SessionCommand::Budget(Some(amount)) => {
                self.budget.set_budget(amount)?;
                dashboard::render_budget(&self.budget.status(&self.ledger.stats()), &self.symbol)
            }
            SessionCommand::Import(path) => self.start_import(path)?,
            SessionCommand::Cancel => {
                let count = self.pending.len();
                // Dropping the set aborts its tasks
                self.pending = JoinSet::new();
                format!("Cancelled {count} pending import(s).")
            }
            SessionCommand::Help => HELP.to_string(),
            SessionCommand::Quit => return Ok((LoopControl::Exit, "Goodbye.".to_string())),
        };
        Ok((LoopControl::Continue, output))
    }

    fn start_import(&mut self, path: PathBuf) -> Result<String> {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read statement file: {}", path.display()))?;
        let label = path.display().to_string();

        if text.trim().is_empty() {
            return Ok(format!("{label}: {}", ImportOutcome::NothingFound.message()));
        }

        let extractor = Arc::clone(&self.extractor);
        let task_label = label.clone();
        self.pending.spawn(async move {
            let result = extractor.extract(&text).await;
            (task_label, result)
        });
        info!(file = %label, "Started statement import");
        Ok(format!("Analyzing {label} in the background..."))
    }

    /// Waits for the next background import and applies it to the ledger.
    /// Returns `None` when nothing is pending.
    pub async fn next_import(&mut self) -> Option<String> {
        let joined = self.pending.join_next().await?;
        let (label, outcome) = match joined {
            Ok((label, result)) => {
                let outcome = extract::apply_extraction(&mut self.ledger, result);
                (label, outcome)
            }
            Err(e) if e.is_cancelled() => return Some("Import cancelled.".to_string()),
            Err(e) => (
                "import".to_string(),
                ImportOutcome::Failed(format!("Import task failed: {e}")),
            ),
        };

        let message = match &outcome {
            ImportOutcome::Added(_) => format!(
                "{label}: {}\n{}",
                outcome.message(),
                self.stats_line()
            ),
            ImportOutcome::NothingFound => format!("{label}: {}", outcome.message()),
            ImportOutcome::Failed(_) => format!(
                "{label}: {}",
                ui::style_text(&outcome.message(), ui::StyleType::Error)
            ),
        };
        Some(message)
    }

    fn stats_line(&self) -> String {
        dashboard::summary_line(&self.ledger.stats(), &self.symbol)
    }

    pub fn render_dashboard(&self) -> String {
        let stats = self.ledger.stats();
        dashboard::render(&stats, &self.budget.status(&stats), &self.symbol)
    }
}

fn print_prompt() {
    print!("subaudit> ");
    let _ = std::io::stdout().flush();
}

/// Runs the session until `quit` or end of input.
pub async fn run(mut session: Session) -> Result<()> {
    println!("{}\n", session.render_dashboard());
    println!(
        "{}",
        ui::style_text("Type 'help' for a list of commands.", ui::StyleType::Subtle)
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    println!();
                    break;
                };
                match session.handle_line(&line) {
                    Ok((control, output)) => {
                        if !output.is_empty() {
                            println!("{output}");
                        }
                        if control == LoopControl::Exit {
                            break;
                        }
                    }
                    Err(e) => println!("{}", ui::style_text(&format!("{e:#}"), ui::StyleType::Error)),
                }
            }
            Some(message) = session.next_import(), if session.pending_imports() > 0 => {
                println!("\n{message}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryCollection;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    struct MockExtractor {
        candidates: Option<Vec<ExtractedCandidate>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl StatementExtractor for MockExtractor {
        async fn extract(&self, _text: &str) -> Result<Vec<ExtractedCandidate>> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.candidates
                .clone()
                .ok_or_else(|| anyhow!("network unreachable"))
        }
    }

    fn session_with(candidates: Option<Vec<ExtractedCandidate>>) -> Session {
        let extractor = MockExtractor {
            candidates,
            delay: None,
        };
        Session::new(
            BudgetTracker::load(Arc::new(MemoryCollection::new())),
            Arc::new(extractor),
            "$",
        )
    }

    fn statement_file(contents: &str) -> NamedTempFile {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), contents).unwrap();
        file
    }

    fn run_line(session: &mut Session, line: &str) -> String {
        let (control, output) = session.handle_line(line).unwrap();
        assert_eq!(control, LoopControl::Continue);
        output
    }

    #[test]
    fn test_parse_add() {
        let command: SessionCommand = "add Amazon Prime 14.99 category=Shopping freq=never"
            .parse()
            .unwrap();
        assert_eq!(
            command,
            SessionCommand::Add(Some(NewSubscription::new(
                "Amazon Prime",
                14.99,
                "Shopping",
                UsageFrequency::Never
            )))
        );

        // Manual entries default to Entertainment / Daily, prices may carry a symbol
        let command: SessionCommand = "add Netflix $15.99".parse().unwrap();
        assert_eq!(
            command,
            SessionCommand::Add(Some(NewSubscription::new(
                "Netflix",
                15.99,
                "Entertainment",
                UsageFrequency::Daily
            )))
        );
    }

    #[test]
    fn test_parse_incomplete_add_is_ignored() {
        assert_eq!(
            "add".parse::<SessionCommand>().unwrap(),
            SessionCommand::Add(None)
        );
        assert_eq!(
            "add 15.99".parse::<SessionCommand>().unwrap(),
            SessionCommand::Add(None)
        );
        assert_eq!(
            "add Netflix".parse::<SessionCommand>().unwrap(),
            SessionCommand::Add(None)
        );
        assert_eq!(
            "add Gym -5".parse::<SessionCommand>().unwrap(),
            SessionCommand::Add(None)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!("add Gym 10 freq=sometimes".parse::<SessionCommand>().is_err());
        assert!("add Gym 10 colour=red".parse::<SessionCommand>().is_err());
        assert!("remove".parse::<SessionCommand>().is_err());
        assert!("freq abc".parse::<SessionCommand>().is_err());
        assert!("budget lots".parse::<SessionCommand>().is_err());
        assert!("import".parse::<SessionCommand>().is_err());

        let err = "dance".parse::<SessionCommand>().unwrap_err();
        assert!(err.to_string().starts_with("Unknown command: dance"));
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(
            "LIST".parse::<SessionCommand>().unwrap(),
            SessionCommand::List
        );
        assert_eq!(
            "freq abc-1 rarely".parse::<SessionCommand>().unwrap(),
            SessionCommand::Frequency("abc-1".to_string(), UsageFrequency::Rarely)
        );
        assert_eq!(
            "budget 80".parse::<SessionCommand>().unwrap(),
            SessionCommand::Budget(Some(80.0))
        );
        assert_eq!(
            "import my statement.txt".parse::<SessionCommand>().unwrap(),
            SessionCommand::Import(PathBuf::from("my statement.txt"))
        );
        assert_eq!(
            "exit".parse::<SessionCommand>().unwrap(),
            SessionCommand::Quit
        );
    }

    #[tokio::test]
    async fn test_session_walkthrough() {
        let mut session = session_with(Some(Vec::new()));

        let output = run_line(&mut session, "add Netflix 15.99 freq=daily");
        assert!(output.contains("Added Netflix"));
        assert!(output.contains("Monthly total $15.99 | waste $0.00"));
        let netflix = session.ledger().subscriptions()[0].id().to_string();

        let output = run_line(&mut session, &format!("freq {netflix} never"));
        assert!(output.contains("waste $15.99 | annual savings $191.88"));

        let output = run_line(&mut session, "add Gym 22.50 category=Fitness freq=rarely");
        assert!(output.contains("Monthly total $38.49 | waste $38.49 | annual savings $461.88"));

        let output = run_line(&mut session, &format!("remove {netflix}"));
        assert!(output.contains("Monthly total $22.50 | waste $22.50"));
        assert_eq!(session.ledger().len(), 1);

        let output = run_line(&mut session, "waste");
        assert!(output.contains("Gym"));
        assert!(output.contains("$270.00"));
    }

    #[tokio::test]
    async fn test_unknown_ids_are_noops() {
        let mut session = session_with(Some(Vec::new()));
        run_line(&mut session, "add Netflix 15.99");
        let before = session.ledger().subscriptions().to_vec();

        let output = run_line(&mut session, "remove nope");
        assert_eq!(output, "No subscription with id nope.");
        let output = run_line(&mut session, "freq nope never");
        assert_eq!(output, "No subscription with id nope.");
        assert_eq!(session.ledger().subscriptions(), before.as_slice());
    }

    #[tokio::test]
    async fn test_incomplete_add_prints_nothing() {
        let mut session = session_with(Some(Vec::new()));
        assert_eq!(run_line(&mut session, "add Netflix"), "");
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_budget_commands() {
        let mut session = session_with(Some(Vec::new()));

        let output = run_line(&mut session, "budget");
        assert!(output.contains("$100.00"));

        let output = run_line(&mut session, "budget 10");
        assert!(output.contains("$10.00"));
        assert_eq!(session.budget().budget(), 10.0);

        let output = run_line(&mut session, "add Netflix 15.99");
        assert!(output.contains("Added"));
        let output = run_line(&mut session, "budget");
        assert!(output.contains("Over budget!"));

        assert!(session.handle_line("budget -4").is_err());
        assert_eq!(session.budget().budget(), 10.0);
    }

    #[tokio::test]
    async fn test_import_runs_in_background() {
        let mut session = session_with(Some(vec![
            ExtractedCandidate {
                name: "Netflix".to_string(),
                price: 15.99,
                category: "Entertainment".to_string(),
            },
            ExtractedCandidate {
                name: "Planet Fitness".to_string(),
                price: 22.50,
                category: "Fitness".to_string(),
            },
        ]));
        let file = statement_file("12/01 NETFLIX.COM 15.99\n12/05 PLANET FITNESS 22.50");

        let output = run_line(&mut session, &format!("import {}", file.path().display()));
        assert!(output.starts_with("Analyzing"));
        assert_eq!(session.pending_imports(), 1);

        // The session keeps answering while the import is pending
        run_line(&mut session, "add Hulu 7.99");

        let message = session.next_import().await.unwrap();
        assert!(message.contains("Added 2 subscriptions."));
        assert_eq!(session.pending_imports(), 0);
        assert!(session.next_import().await.is_none());

        let names: Vec<_> = session.ledger().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Hulu", "Netflix", "Planet Fitness"]);
        for sub in session.ledger().iter().skip(1) {
            assert_eq!(sub.frequency(), UsageFrequency::Weekly);
            assert!(!sub.is_waste());
        }
    }

    #[tokio::test]
    async fn test_import_nothing_found() {
        let mut session = session_with(Some(Vec::new()));
        let file = statement_file("12/03 GROCERY STORE 54.10");

        run_line(&mut session, &format!("import {}", file.path().display()));
        let message = session.next_import().await.unwrap();

        assert!(message.contains(extract::NOTHING_FOUND_MESSAGE));
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_import_failure_is_reported() {
        let mut session = session_with(None);
        run_line(&mut session, "add Gym 22.50 freq=rarely");
        let file = statement_file("12/01 NETFLIX.COM 15.99");

        run_line(&mut session, &format!("import {}", file.path().display()));
        let message = session.next_import().await.unwrap();

        assert!(message.contains(extract::FAILURE_MESSAGE));
        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test]
    async fn test_import_blank_or_missing_file() {
        let mut session = session_with(Some(Vec::new()));
        let file = statement_file("   \n");

        let output = run_line(&mut session, &format!("import {}", file.path().display()));
        assert!(output.contains(extract::NOTHING_FOUND_MESSAGE));
        assert_eq!(session.pending_imports(), 0);

        let result = session.handle_line("import /definitely/not/here.txt");
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read statement file")
        );
    }

    #[tokio::test]
    async fn test_cancel_pending_imports() {
        let extractor = MockExtractor {
            candidates: Some(vec![ExtractedCandidate {
                name: "Netflix".to_string(),
                price: 15.99,
                category: "Entertainment".to_string(),
            }]),
            delay: Some(Duration::from_secs(30)),
        };
        let mut session = Session::new(
            BudgetTracker::load(Arc::new(MemoryCollection::new())),
            Arc::new(extractor),
            "$",
        );
        let file = statement_file("12/01 NETFLIX.COM 15.99");

        run_line(&mut session, &format!("import {}", file.path().display()));
        assert_eq!(session.pending_imports(), 1);

        let output = run_line(&mut session, "cancel");
        assert_eq!(output, "Cancelled 1 pending import(s).");
        assert_eq!(session.pending_imports(), 0);
        assert!(session.next_import().await.is_none());
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_quit() {
        let mut session = session_with(Some(Vec::new()));
        let (control, output) = session.handle_line("quit").unwrap();
        assert_eq!(control, LoopControl::Exit);
        assert_eq!(output, "Goodbye.");
    }
}
