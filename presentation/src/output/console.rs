//! Console output formatter for role requests and verdicts

use colored::Colorize;
use role_quorum_application::{CastVote, Verdict};
use role_quorum_domain::{BallotEntry, Direction, RoleRequest, RolePolicy, Timestamp};
use serde::Serialize;

/// Formats requests, votes and verdicts for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    // ==================== Rules ====================

    /// Voting rules: thresholds, vote weights and roles that ignore weight
    pub fn rules(policy: &RolePolicy) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Role Quorum"));
        output.push_str(
            "\nMembers vote Yes or No on each role request. When the deadline passes\n\
             the request is approved if the weighted share of Yes votes reaches the\n\
             role's threshold. A moderator veto overrides the votes.\n",
        );

        output.push_str(&Self::section_header("Acceptance Threshold Percentages"));
        let mut thresholds: Vec<(f64, &str)> = policy
            .votable_roles
            .iter()
            .filter_map(|role| policy.threshold(role).map(|t| (t, role.as_str())))
            .collect();
        thresholds.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (threshold, roles) in Self::group(thresholds) {
            output.push_str(&format!(
                "{}: {}\n",
                Self::percent(threshold).bold(),
                roles.join(", ")
            ));
        }

        output.push_str(&Self::section_header("Vote Weights"));
        let mut weights: Vec<(u64, &str)> = policy
            .vote_weights
            .iter()
            .map(|(role, weight)| (*weight, role.as_str()))
            .collect();
        weights.sort_by_key(|(weight, _)| *weight);
        for (weight, roles) in Self::group(weights) {
            output.push_str(&format!("{}: {}\n", weight.to_string().bold(), roles.join(", ")));
        }
        output.push_str(&format!(
            "{}\n",
            format!("Anyone else: {}", policy.default_vote_weight).dimmed()
        ));

        output.push_str(&Self::section_header("Role Requests Where Vote Weight is Ignored"));
        if policy.ignore_vote_weight.is_empty() {
            output.push_str(&format!("{}\n", "None".dimmed()));
        }
        for role in &policy.ignore_vote_weight {
            output.push_str(&format!("{}\n", role));
        }

        output.push_str(&Self::footer());
        output
    }

    // ==================== Requests ====================

    /// Voting data for one request: votes table, totals, feedback and veto
    pub fn request(request: &RoleRequest, now: Timestamp) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&format!(
            "Voting Data for {} Request",
            request.role()
        )));
        output.push_str(&format!(
            "\n{} {}\n",
            "Request Title:".cyan().bold(),
            request.title()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Requester:".cyan().bold(),
            request.requester()
        ));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Threshold:".cyan().bold(),
            Self::percent(request.acceptance_threshold()),
            if request.ignores_vote_weight() {
                "vote weight ignored"
            } else {
                "weighted"
            }
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Deadline:".cyan().bold(),
            Self::timestamp(request.deadline())
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status(request, now)
        ));

        output.push_str(&Self::section_header("Votes"));
        output.push_str(&Self::votes_table(request));

        output.push_str(&Self::section_header("Vote Totals"));
        let tally = request.tally();
        output.push_str(&format!(
            "{} {}\n{} {}\n{} {}\n",
            "Yes:".green().bold(),
            tally.yes,
            "No:".red().bold(),
            tally.no,
            "Participants:".bold(),
            request.participant_count()
        ));

        output.push_str(&Self::section_header("Feedback"));
        if request.feedback().is_empty() {
            output.push_str(&format!("{}\n", "No feedback submitted".dimmed()));
        }
        for entry in request.feedback() {
            output.push_str(&format!("  * {}: {}\n", entry.author, entry.text));
        }

        if let Some(veto) = request.veto() {
            output.push_str(&Self::section_header("Veto"));
            output.push_str(&format!(
                "Veto by {}: {}\n",
                veto.overrider,
                if veto.approve {
                    "Approved".green()
                } else {
                    "Denied".red()
                }
            ));
        }

        output.push_str(&Self::footer());
        output
    }

    /// One line per closed request sharing an id, oldest first
    pub fn history(requests: &[RoleRequest]) -> String {
        if requests.is_empty() {
            return format!("{}\n", "No closed requests.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&Self::section_header("Closed Requests"));
        for (index, request) in requests.iter().enumerate() {
            output.push_str(&format!(
                "{:>3}. {:<10} {:<9} {}  {}\n",
                index + 1,
                request.role(),
                Self::outcome_label(request.decide()),
                request.tally(),
                Self::timestamp(request.deadline()).dimmed()
            ));
        }
        output
    }

    /// Summary line for each active request
    pub fn active<'a>(requests: impl IntoIterator<Item = &'a RoleRequest>, now: Timestamp) -> String {
        let mut output = String::new();
        for request in requests {
            output.push_str(&format!(
                "{:<20} {:<10} {}  {}  {}\n",
                request.id().to_string().bold(),
                request.role(),
                request.tally(),
                Self::status(request, now),
                request.title().dimmed()
            ));
        }

        if output.is_empty() {
            output = format!("{}\n", "No active requests.".dimmed());
        }
        output
    }

    // ==================== Votes and verdicts ====================

    /// Confirmation shown to a voter
    pub fn cast_vote(cast: &CastVote) -> String {
        let noun = if cast.weight == 1 { "vote" } else { "votes" };
        match cast.replaced {
            Some((previous, _)) if previous != cast.direction => format!(
                "Your vote was changed from {} to {} with {} {}.",
                previous, cast.direction, cast.weight, noun
            ),
            Some(_) => format!(
                "Your {} vote was updated to {} {}.",
                cast.direction, cast.weight, noun
            ),
            None => format!("You voted {} with {} {}.", cast.direction, cast.weight, noun),
        }
    }

    /// Results message for a closed request
    pub fn verdict(verdict: &Verdict) -> String {
        let mut output = format!(
            "Voting has ended for {} ({} request by {}).\nResults:\n{} {}\n{} {}\n",
            verdict.request_id,
            verdict.role,
            verdict.requester,
            "Yes:".green().bold(),
            verdict.tally.yes,
            "No:".red().bold(),
            verdict.tally.no
        );

        let outcome = if verdict.is_approved() {
            format!("Approved: {} will be granted.", verdict.role)
                .green()
                .bold()
        } else {
            "Denied.".red().bold()
        };
        output.push_str(&format!("{}\n", outcome));

        if let Some(moderator) = verdict.vetoed_by {
            output.push_str(&format!(
                "{}\n",
                format!("Outcome decided by moderator {}.", moderator).dimmed()
            ));
        }
        output
    }

    /// Format as JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    // ==================== Helpers ====================

    fn votes_table(request: &RoleRequest) -> String {
        let mut votes: Vec<(Direction, &BallotEntry)> = request.votes().collect();
        if votes.is_empty() {
            return format!("{}\n", "No votes cast".dimmed());
        }
        votes.sort_by(|a, b| b.1.weight.cmp(&a.1.weight));

        let mut table = format!("{:<20} | {:<4} | {}\n", "User", "Vote", "Count");
        table.push_str(&"-".repeat(36));
        table.push('\n');
        for (direction, entry) in votes {
            let label = match direction {
                Direction::Yes => "Yes".green(),
                Direction::No => "No".red(),
            };
            table.push_str(&format!(
                "{:<20} | {:<4} | {}\n",
                entry.voter.to_string(),
                label,
                entry.weight
            ));
        }
        table
    }

    fn status(request: &RoleRequest, now: Timestamp) -> String {
        if request.is_closed() {
            format!("Closed, {}", Self::outcome_label(request.decide()))
        } else if request.is_expired(now) {
            "Expired, awaiting sweep".yellow().to_string()
        } else {
            "Open".green().to_string()
        }
    }

    fn outcome_label(approved: bool) -> String {
        if approved {
            "approved".green().to_string()
        } else {
            "denied".red().to_string()
        }
    }

    /// Group consecutive entries sharing a key
    fn group<K: PartialEq + Copy>(entries: Vec<(K, &str)>) -> Vec<(K, Vec<&str>)> {
        let mut groups: Vec<(K, Vec<&str>)> = Vec::new();
        for (key, name) in entries {
            match groups.last_mut() {
                Some((last, names)) if *last == key => names.push(name),
                _ => groups.push((key, vec![name])),
            }
        }
        groups
    }

    /// Format a fraction as a percentage without float noise (0.9 -> "90%")
    pub fn percent(fraction: f64) -> String {
        let text = format!("{:.2}", fraction * 100.0);
        let text = text.trim_end_matches('0').trim_end_matches('.');
        format!("{}%", text)
    }

    fn timestamp(seconds: Timestamp) -> String {
        chrono::DateTime::from_timestamp(seconds, 0)
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| seconds.to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
