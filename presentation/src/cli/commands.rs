//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use role_quorum_application::EarlyOutcome;
use role_quorum_domain::Direction;
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Ballot choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteChoice {
    Yes,
    No,
}

impl From<VoteChoice> for Direction {
    fn from(choice: VoteChoice) -> Self {
        match choice {
            VoteChoice::Yes => Direction::Yes,
            VoteChoice::No => Direction::No,
        }
    }
}

/// Outcome a moderator can force
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VetoChoice {
    Approve,
    Deny,
}

impl VetoChoice {
    pub fn approves(self) -> bool {
        self == VetoChoice::Approve
    }
}

/// How to end a vote early
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EndChoice {
    /// Approve regardless of votes
    Approve,
    /// Deny regardless of votes
    Deny,
    /// Let the votes cast so far decide
    #[default]
    Abstain,
}

impl From<EndChoice> for EarlyOutcome {
    fn from(choice: EndChoice) -> Self {
        match choice {
            EndChoice::Approve => EarlyOutcome::Approve,
            EndChoice::Deny => EarlyOutcome::Deny,
            EndChoice::Abstain => EarlyOutcome::Abstain,
        }
    }
}

/// CLI arguments for role-quorum
#[derive(Parser, Debug)]
#[command(name = "role-quorum")]
#[command(author, version, about = "Weighted community voting on role requests")]
#[command(long_about = r#"
Role Quorum runs weighted yes/no votes on role requests.

Each request asks for one role. Members vote with a weight taken from the
roles they hold, and when the deadline passes the request is approved if the
weighted share of yes votes reaches the role's threshold. Moderators can veto,
end a vote early, or remove a request.

Configuration files are loaded from (in priority order):
1. ROLE_QUORUM_* env vars    e.g. ROLE_QUORUM_VOTING__PERIOD_SECONDS=3600
2. --config <path>           Explicit config file
3. ./role-quorum.toml        Project-level config
4. ~/.config/role-quorum/config.toml   Global config

Example:
  role-quorum open --requester 1 --id 42 --title "Expert request"
  role-quorum vote 42 --voter 7 --role Paragon yes
  role-quorum end 42 --moderator 9 --role "Sentinel (mod)" --outcome approve
  role-quorum watch
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// State file to use instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    pub state_file: Option<PathBuf>,
}

/// Acting moderator and the roles they hold
#[derive(Args, Debug, Clone)]
pub struct ModeratorArgs {
    /// User id of the moderator
    #[arg(long, value_name = "USER")]
    pub moderator: u64,

    /// Roles held by the moderator (repeat or comma-separate)
    #[arg(long = "role", value_name = "ROLE", value_delimiter = ',')]
    pub roles: Vec<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Open a new role request
    Open {
        /// User id of the requester
        #[arg(long, value_name = "USER")]
        requester: u64,

        /// Request id (the thread id)
        #[arg(long, value_name = "ID")]
        id: u64,

        /// Request title; the role is read from it unless --role is given
        #[arg(long)]
        title: String,

        /// Role being requested
        #[arg(long)]
        role: Option<String>,

        /// Deadline as Unix seconds (default: now + voting period)
        #[arg(long, value_name = "UNIX_SECONDS")]
        deadline: Option<i64>,
    },

    /// Attach the message that displays the vote
    Prompt {
        id: u64,
        #[arg(value_name = "MESSAGE_ID")]
        message: u64,
    },

    /// Cast or change a vote
    Vote {
        id: u64,

        /// User id of the voter
        #[arg(long, value_name = "USER")]
        voter: u64,

        /// Roles held by the voter (repeat or comma-separate)
        #[arg(long = "role", value_name = "ROLE", value_delimiter = ',')]
        roles: Vec<String>,

        #[arg(value_enum)]
        choice: VoteChoice,
    },

    /// Withdraw a vote
    Cancel {
        id: u64,

        #[arg(long, value_name = "USER")]
        voter: u64,
    },

    /// Leave anonymous feedback on a request
    Feedback {
        id: u64,

        #[arg(long, value_name = "USER")]
        voter: u64,

        text: String,
    },

    /// Force the outcome of a request when it closes (moderators only)
    Veto {
        id: u64,

        #[command(flatten)]
        moderator: ModeratorArgs,

        #[arg(value_enum)]
        choice: VetoChoice,
    },

    /// End a vote early (moderators only)
    End {
        id: u64,

        #[command(flatten)]
        moderator: ModeratorArgs,

        #[arg(long, value_enum, default_value = "abstain")]
        outcome: EndChoice,
    },

    /// Delete an active request without deciding it (moderators only)
    Remove {
        id: u64,

        #[command(flatten)]
        moderator: ModeratorArgs,
    },

    /// Show voting data for a request, or list active requests
    Show { id: Option<u64> },

    /// Show every closed request for an id
    History { id: u64 },

    /// Close every request whose deadline has passed
    Sweep {
        /// Treat this Unix time as now
        #[arg(long, value_name = "UNIX_SECONDS")]
        now: Option<i64>,
    },

    /// Sweep expired requests on an interval until Ctrl-C
    Watch,

    /// Show thresholds, vote weights and roles that ignore weight
    Rules,

    /// Show configuration sources and the effective configuration
    Config,
}
