//! Interactive shell for the inference engine. `wm-shell [KB_FILE]`
//! optionally loads a knowledge base up front, then drops into a
//! `reedline`-backed REPL exposing the commands in [`command::COMMAND_TABLE`].

mod command;
mod error;
mod session;

use clap::Parser;
use reedline::{DefaultPrompt, Reedline, Signal};
use std::path::PathBuf;

use command::{parse_line, Command, COMMAND_TABLE};
use error::ShellError;
use session::{Outcome, Session, MAXDEPTH_DEFAULT};
use wm_search::Heuristic;

const VERSION: &str = "0.1";

#[derive(Parser, Debug)]
#[command(name = "wm-shell", about = "Interactive shell for the forward-chaining inference engine")]
struct Cli {
    /// Knowledge-base file to load before entering the REPL.
    kb_file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")))
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(-1);
        }
    };

    tracing::info!(version = VERSION, "starting wm-shell");

    let mut session = Session::new();
    if let Some(path) = &cli.kb_file {
        if let Err(err) = session.load(&path.to_string_lossy()) {
            println!("{err}");
        }
    }

    run_repl(session);
}

/// The REPL loop itself, modeled on `reedline`'s
/// `Signal::Success`/`Signal::CtrlD`/`Signal::CtrlC` pattern.
fn run_repl(mut session: Session) {
    println!("Expert System Shell v. {VERSION}");
    let mut line_editor = Reedline::create();
    let prompt = DefaultPrompt::default();

    loop {
        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(buffer)) => {
                println!();
                dispatch(&mut session, &buffer, &mut line_editor, &prompt);
                println!();
            }
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => {
                quit();
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }
}

fn quit() -> ! {
    println!("Have a good day :)");
    std::process::exit(0);
}

fn dispatch(session: &mut Session, line: &str, line_editor: &mut Reedline, prompt: &DefaultPrompt) {
    let command = parse_line(line);
    let result = match &command {
        Command::Help => {
            print_help();
            Ok(Outcome::Done)
        }
        Command::Quit => quit(),
        Command::Load { filepath } => session.load(filepath),
        Command::DefFacts => {
            println!("Enter one or more facts, blank line when done\n");
            let lines = read_block(line_editor, prompt);
            session.def_facts(&lines)
        }
        Command::DelFact { factname } => session.del_fact(factname.as_deref()),
        Command::DefRule => {
            println!("Enter one or more rules, blank line when done\n");
            let lines = read_block(line_editor, prompt);
            session.def_rule(&lines)
        }
        Command::DelRule { rule_name } => session.del_rule(rule_name.as_deref()),
        Command::Facts => {
            session.print_facts();
            Ok(Outcome::Done)
        }
        Command::Rules => {
            session.print_rules();
            Ok(Outcome::Done)
        }
        Command::ClearFacts => Ok(session.clear_facts()),
        Command::ClearRules => Ok(session.clear_rules()),
        Command::DefGoal => {
            println!("Enter the goal, blank line when done\n");
            let lines = read_block(line_editor, prompt);
            session.def_goal(&lines)
        }
        Command::DelGoal => Ok(session.del_goal()),
        Command::Goal => {
            session.print_goal();
            Ok(Outcome::Done)
        }
        Command::RunBfs { max_depth } => parse_max_depth(max_depth.as_deref()).and_then(|d| session.run_bfs(d)),
        Command::RunDfs { max_depth } => parse_max_depth(max_depth.as_deref()).and_then(|d| session.run_dfs(d)),
        Command::RunAStar { h_name, h_attrs, max_depth } => parse_heuristic(h_name, h_attrs.as_deref())
            .and_then(|h| parse_max_depth(max_depth.as_deref()).map(|d| (h, d)))
            .and_then(|(h, d)| session.run_a_star(&h, d)),
        Command::RunBestFirst { h_name, h_attrs, max_depth } => parse_heuristic(h_name, h_attrs.as_deref())
            .and_then(|h| parse_max_depth(max_depth.as_deref()).map(|d| (h, d)))
            .and_then(|(h, d)| session.run_best_first(&h, d)),
        Command::Unrecognized => {
            println!("Unrecognized command.\nTyping 'help' could be useful for you..");
            Ok(Outcome::Done)
        }
    };

    match result {
        Ok(Outcome::Done) => {}
        Ok(Outcome::NothingToDo) => println!("Nothing to do."),
        Err(ShellError::BadArguments(cause)) => {
            println!("Bad arguments error: {cause}");
            if let Some(usage) = usage_for(&command) {
                println!("\nCorrect usage is:\n{usage}");
            }
        }
        Err(err) => println!("{err}"),
    }
}

fn usage_for(command: &Command) -> Option<&'static str> {
    let name = match command {
        Command::Load { .. } => "load",
        Command::DelFact { .. } => "del_fact",
        Command::DelRule { .. } => "del_rule",
        Command::RunAStar { .. } => "run_AStar",
        Command::RunBestFirst { .. } => "run_BestFirst",
        Command::RunBfs { .. } => "run_BFS",
        Command::RunDfs { .. } => "run_DFS",
        _ => return None,
    };
    COMMAND_TABLE.iter().find(|spec| spec.name == name).map(|spec| spec.usage)
}

fn print_help() {
    println!("Available commands are:");
    for spec in COMMAND_TABLE {
        println!("\t{}", spec.usage);
    }
}

/// Collects free-form lines for `def_facts`/`def_rule`/`def_goal`,
/// terminated by a blank line — or, once at least one line has been typed,
/// by two consecutive blank lines.
fn read_block(line_editor: &mut Reedline, prompt: &DefaultPrompt) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    loop {
        let line = match line_editor.read_line(prompt) {
            Ok(Signal::Success(buffer)) => buffer,
            Ok(Signal::CtrlD) | Ok(Signal::CtrlC) => quit(),
            Err(_) => break,
        };
        if let Some(last) = lines.last() {
            if last.is_empty() && line.is_empty() {
                break;
            }
        } else if line.is_empty() {
            break;
        }
        lines.push(line);
    }
    lines
}

fn parse_max_depth(raw: Option<&str>) -> Result<usize, ShellError> {
    match raw {
        None => Ok(MAXDEPTH_DEFAULT),
        Some(text) => text.parse().map_err(|_| ShellError::BadArguments("max depth must be an integer".into())),
    }
}

/// Parses a `run_AStar`/`run_BestFirst` heuristic token and its optional
/// comma-separated attribute triple: `HAMMINGDISTANCE` takes no
/// attributes, `MANHATTANDISTANCE`/`LINEARCONFLICT` each take exactly
/// three — `value,x,y`.
fn parse_heuristic(h_name: &str, h_attrs: Option<&str>) -> Result<Heuristic, ShellError> {
    match h_name {
        "HAMMINGDISTANCE" => {
            if h_attrs.is_some() {
                return Err(ShellError::BadArguments("HAMMINGDISTANCE takes no attributes".into()));
            }
            Ok(Heuristic::Hamming)
        }
        "MANHATTANDISTANCE" | "LINEARCONFLICT" => {
            let attrs = h_attrs.ok_or_else(|| ShellError::BadArguments("wrong heuristic attributes".into()))?;
            let parts: Vec<&str> = attrs.split(',').collect();
            if parts.len() != 3 {
                return Err(ShellError::BadArguments("wrong heuristic attributes".into()));
            }
            let (value_attr, x_attr, y_attr) = (parts[0].to_string(), parts[1].to_string(), parts[2].to_string());
            if h_name == "MANHATTANDISTANCE" {
                Ok(Heuristic::Manhattan { value_attr, x_attr, y_attr })
            } else {
                Ok(Heuristic::LinearConflict { value_attr, x_attr, y_attr })
            }
        }
        _ => Err(ShellError::BadArguments("unknown heuristic function".into())),
    }
}
