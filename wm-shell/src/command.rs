//! The REPL's command grammar: a closed enum parsed from the first
//! whitespace-separated token of a line.

/// One REPL command, parsed from a line's tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Load { filepath: String },
    DefFacts,
    DelFact { factname: Option<String> },
    DefRule,
    DelRule { rule_name: Option<String> },
    Facts,
    Rules,
    ClearFacts,
    ClearRules,
    DefGoal,
    DelGoal,
    Goal,
    RunBfs { max_depth: Option<String> },
    RunDfs { max_depth: Option<String> },
    RunAStar { h_name: String, h_attrs: Option<String>, max_depth: Option<String> },
    RunBestFirst { h_name: String, h_attrs: Option<String>, max_depth: Option<String> },
    Unrecognized,
}

/// `(name, usage)` — backs the `help` command, which lists one line per
/// command, read straight out of this static table.
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
}

pub const COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec { name: "clear_facts", usage: "clear_facts - clear the facts list" },
    CommandSpec { name: "clear_rules", usage: "clear_rules - clear the rules list" },
    CommandSpec { name: "def_facts", usage: "def_facts - assert new world fact(s)" },
    CommandSpec { name: "def_goal", usage: "def_goal - set the goal" },
    CommandSpec { name: "def_rule", usage: "def_rule - define new rule(s)" },
    CommandSpec { name: "del_fact", usage: "del_fact [FACTNAME] - retract a fact" },
    CommandSpec { name: "del_goal", usage: "del_goal - unset the goal" },
    CommandSpec { name: "del_rule", usage: "del_rule [RULENAME] - delete an existing rule" },
    CommandSpec { name: "facts", usage: "facts - print the entire facts list" },
    CommandSpec { name: "goal", usage: "goal - print the goal" },
    CommandSpec { name: "help", usage: "help - print this usage" },
    CommandSpec { name: "load", usage: "load FILEPATH - load the knowledge base (facts, rules, goal) from a file" },
    CommandSpec { name: "quit", usage: "quit - exit interactive shell" },
    CommandSpec { name: "rules", usage: "rules - print the entire rules list" },
    CommandSpec {
        name: "run_AStar",
        usage: "run_AStar {HAMMINGDISTANCE|(LINEARCONFLICT|MANHATTANDISTANCE) content,x,y} [MAX_DEPTH]",
    },
    CommandSpec {
        name: "run_BestFirst",
        usage: "run_BestFirst {HAMMINGDISTANCE|(LINEARCONFLICT|MANHATTANDISTANCE) content,x,y} [MAX_DEPTH]",
    },
    CommandSpec { name: "run_BFS", usage: "run_BFS [MAX_DEPTH]" },
    CommandSpec { name: "run_DFS", usage: "run_DFS [MAX_DEPTH]" },
];

/// Parses one REPL input line into a [`Command`]. Unknown first tokens and
/// too few arguments for a command requiring them both fall out through the
/// caller's handling (`Unrecognized` for the former; the latter is left to
/// each command's own optional-argument handling, matching `shell.py`'s
/// `*args`-based handlers where only genuinely compulsory arguments are
/// enforced).
pub fn parse_line(line: &str) -> Command {
    let mut tokens = line.split_whitespace();
    let Some(command) = tokens.next() else {
        return Command::Unrecognized;
    };
    let rest: Vec<&str> = tokens.collect();

    match command {
        "help" => Command::Help,
        "quit" => Command::Quit,
        "load" => match rest.first() {
            Some(path) => Command::Load { filepath: path.to_string() },
            None => Command::Unrecognized,
        },
        "def_facts" => Command::DefFacts,
        "del_fact" => Command::DelFact { factname: rest.first().map(|s| s.to_string()) },
        "def_rule" => Command::DefRule,
        "del_rule" => Command::DelRule { rule_name: rest.first().map(|s| s.to_string()) },
        "facts" => Command::Facts,
        "rules" => Command::Rules,
        "clear_facts" => Command::ClearFacts,
        "clear_rules" => Command::ClearRules,
        "def_goal" => Command::DefGoal,
        "del_goal" => Command::DelGoal,
        "goal" => Command::Goal,
        "run_BFS" => Command::RunBfs { max_depth: rest.first().map(|s| s.to_string()) },
        "run_DFS" => Command::RunDfs { max_depth: rest.first().map(|s| s.to_string()) },
        "run_AStar" => match rest.first() {
            Some(h_name) => Command::RunAStar {
                h_name: h_name.to_string(),
                h_attrs: rest.get(1).map(|s| s.to_string()),
                max_depth: rest.get(2).map(|s| s.to_string()),
            },
            None => Command::Unrecognized,
        },
        "run_BestFirst" => match rest.first() {
            Some(h_name) => Command::RunBestFirst {
                h_name: h_name.to_string(),
                h_attrs: rest.get(1).map(|s| s.to_string()),
                max_depth: rest.get(2).map(|s| s.to_string()),
            },
            None => Command::Unrecognized,
        },
        _ => Command::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_unrecognized() {
        assert_eq!(parse_line(""), Command::Unrecognized);
        assert_eq!(parse_line("   "), Command::Unrecognized);
    }

    #[test]
    fn load_requires_a_path() {
        assert_eq!(parse_line("load"), Command::Unrecognized);
        assert_eq!(parse_line("load kb.txt"), Command::Load { filepath: "kb.txt".into() });
    }

    #[test]
    fn del_fact_without_a_name_defers_to_the_handler() {
        assert_eq!(parse_line("del_fact"), Command::DelFact { factname: None });
        assert_eq!(parse_line("del_fact A"), Command::DelFact { factname: Some("A".into()) });
    }

    #[test]
    fn run_a_star_parses_heuristic_name_attrs_and_depth() {
        assert_eq!(
            parse_line("run_AStar MANHATTANDISTANCE val,row,col 50"),
            Command::RunAStar {
                h_name: "MANHATTANDISTANCE".into(),
                h_attrs: Some("val,row,col".into()),
                max_depth: Some("50".into()),
            }
        );
    }

    #[test]
    fn unknown_first_token_is_unrecognized() {
        assert_eq!(parse_line("frobnicate"), Command::Unrecognized);
    }
}
