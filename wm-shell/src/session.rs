//! The shell's working memory and the command handlers that mutate it.
//! Each handler returns [`Outcome`] on success — `Done` when it already
//! printed what it needed, `NothingToDo` when there was genuinely nothing
//! to do — and [`ShellError`] for bad arguments or a propagated parser or
//! engine error.

use std::fs;
use std::path::Path;
use std::time::Instant;

use wm_core::{EngineError, WorkingMemory};
use wm_kb::{parse_facts, parse_goal, parse_rules, purify, ParserState};
use wm_model::{FactContainer, GoalContainer, RuleContainer};
use wm_search::{a_star_search, best_first_search, breadth_first_search, depth_first_search, Heuristic, SearchOutcome};

use crate::error::ShellError;

pub const MAXDEPTH_DEFAULT: usize = 1000;

pub enum Outcome {
    Done,
    NothingToDo,
}

/// The shell's mutable working memory, with its three fields addressable
/// independently since the shell edits them one at a time.
#[derive(Default)]
pub struct Session {
    pub facts: FactContainer,
    pub rules: RuleContainer,
    pub goal: GoalContainer,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    fn working_memory(&self) -> WorkingMemory {
        WorkingMemory::new(self.facts.clone(), self.rules.clone(), self.goal.clone())
    }

    /// `load FILEPATH` — replaces the whole session from a knowledge-base
    /// file.
    pub fn load(&mut self, filepath: &str) -> Result<Outcome, ShellError> {
        let text = fs::read_to_string(Path::new(filepath))
            .map_err(|_| ShellError::BadArguments("file path given doesn't exist".into()))?;
        let kb = wm_kb::load_from_text(&text)?;
        self.facts = kb.facts;
        self.rules = kb.rules;
        self.goal = kb.goal;
        println!("\nFile {filepath} loaded successfully\n");
        Ok(Outcome::Done)
    }

    /// `def_facts` — `lines` is the free-form text collected by the REPL's
    /// multi-line reader, already blank-line-terminated.
    pub fn def_facts(&mut self, lines: &[String]) -> Result<Outcome, ShellError> {
        let purified = purify(&lines.join("\n"));
        let mut state = ParserState::Unknown;
        let parsed = parse_facts(&purified, &mut state)?;
        if parsed.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.facts.update(&parsed);
        Ok(Outcome::Done)
    }

    pub fn del_fact(&mut self, factname: Option<&str>) -> Result<Outcome, ShellError> {
        if self.facts.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        let Some(factname) = factname else {
            return Ok(Outcome::NothingToDo);
        };
        self.facts.remove(factname).map_err(|_| ShellError::BadArguments("factname not found".into()))?;
        println!("{factname} retracted");
        Ok(Outcome::Done)
    }

    pub fn def_rule(&mut self, lines: &[String]) -> Result<Outcome, ShellError> {
        let purified = purify(&lines.join("\n"));
        let mut state = ParserState::Unknown;
        let parsed = parse_rules(&purified, &mut state)?;
        if parsed.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.rules.update(&parsed);
        Ok(Outcome::Done)
    }

    pub fn del_rule(&mut self, rule_name: Option<&str>) -> Result<Outcome, ShellError> {
        if self.rules.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        let Some(rule_name) = rule_name else {
            return Ok(Outcome::NothingToDo);
        };
        self.rules.remove(rule_name).map_err(|_| ShellError::BadArguments("rule not found".into()))?;
        println!("Done");
        Ok(Outcome::Done)
    }

    pub fn print_facts(&self) {
        println!("{}", self.facts);
    }

    pub fn print_rules(&self) {
        println!("{}", self.rules);
    }

    pub fn clear_facts(&mut self) -> Outcome {
        if self.facts.is_empty() {
            return Outcome::NothingToDo;
        }
        self.facts.clear();
        println!("Facts cleared");
        Outcome::Done
    }

    pub fn clear_rules(&mut self) -> Outcome {
        if self.rules.is_empty() {
            return Outcome::NothingToDo;
        }
        self.rules.clear();
        println!("Rules cleared");
        Outcome::Done
    }

    pub fn def_goal(&mut self, lines: &[String]) -> Result<Outcome, ShellError> {
        let purified = purify(&lines.join("\n"));
        let mut state = ParserState::Unknown;
        let parsed = parse_goal(&purified, &mut state)?;
        if parsed.is_empty() {
            return Ok(Outcome::NothingToDo);
        }
        self.goal.update(&parsed);
        Ok(Outcome::Done)
    }

    pub fn del_goal(&mut self) -> Outcome {
        if self.goal.is_empty() {
            return Outcome::NothingToDo;
        }
        self.goal.clear();
        println!("Goal cleared");
        Outcome::Done
    }

    pub fn print_goal(&self) {
        println!("{}", self.goal);
    }

    fn ready_for_search(&self) -> bool {
        !self.facts.is_empty() && !self.rules.is_empty() && !self.goal.is_empty()
    }

    pub fn run_bfs(&self, max_depth: usize) -> Result<Outcome, ShellError> {
        if !self.ready_for_search() {
            return Ok(Outcome::NothingToDo);
        }
        run_and_report(self, max_depth, |wm, max_depth| breadth_first_search(wm, max_depth))?;
        Ok(Outcome::Done)
    }

    pub fn run_dfs(&self, max_depth: usize) -> Result<Outcome, ShellError> {
        if !self.ready_for_search() {
            return Ok(Outcome::NothingToDo);
        }
        run_and_report(self, max_depth, |wm, max_depth| depth_first_search(wm, max_depth))?;
        Ok(Outcome::Done)
    }

    pub fn run_a_star(&self, heuristic: &Heuristic, max_depth: usize) -> Result<Outcome, ShellError> {
        if !self.ready_for_search() {
            return Ok(Outcome::NothingToDo);
        }
        run_and_report(self, max_depth, |wm, max_depth| a_star_search(wm, heuristic, max_depth))?;
        Ok(Outcome::Done)
    }

    pub fn run_best_first(&self, heuristic: &Heuristic, max_depth: usize) -> Result<Outcome, ShellError> {
        if !self.ready_for_search() {
            return Ok(Outcome::NothingToDo);
        }
        run_and_report(self, max_depth, |wm, max_depth| best_first_search(wm, heuristic, max_depth))?;
        Ok(Outcome::Done)
    }
}

/// Runs `search` over the session's working memory and prints a report:
/// initial state, fired rules (if any) in order, arrival state, then a
/// SUCCESS/FAILURE summary with path length, penetrance, visited count,
/// and wall-clock elapsed time.
fn run_and_report(
    session: &Session,
    max_depth: usize,
    search: impl FnOnce(&WorkingMemory, usize) -> Result<SearchOutcome, EngineError>,
) -> Result<(), ShellError> {
    let wm = session.working_memory();
    let start = Instant::now();
    let outcome = search(&wm, max_depth)?;
    let elapsed = start.elapsed();

    println!("Initial state:\n{}\n", wm.initial_state);
    match &outcome.path {
        Some(path) if !path.is_empty() => {
            let rendered: Vec<String> = path.iter().map(ToString::to_string).collect();
            println!("Rule applied:\n\n{}\n", rendered.join("\n\n"));
            println!("Arrival state:\n{}", outcome.arrival_state);
            println!(
                "\nSUCCESS\nPath length: {}\nPenetrance: {}\nVisited nodes count: {}\nTime elapsed: {}",
                path.len(),
                outcome.penetrance().map(|p| p.to_string()).unwrap_or_else(|| "n/a".to_string()),
                outcome.visited,
                format_elapsed(elapsed),
            );
        }
        Some(_) => {
            println!("Arrival state:\n{}", outcome.arrival_state);
            println!(
                "\nSUCCESS\nPath length: 0\nPenetrance: n/a\nVisited nodes count: {}\nTime elapsed: {}",
                outcome.visited,
                format_elapsed(elapsed),
            );
        }
        None => {
            println!("Arrival state:\n{}", outcome.arrival_state);
            println!(
                "\nFAILURE\nVisited nodes count: {}\nTime elapsed: {}",
                outcome.visited,
                format_elapsed(elapsed),
            );
        }
    }
    Ok(())
}

fn format_elapsed(elapsed: std::time::Duration) -> String {
    let secs = elapsed.as_secs();
    if secs > 60 {
        format!("{} minutes, {} seconds", secs / 60, secs % 60)
    } else {
        format!("{secs} seconds")
    }
}
