use std::fmt::{self, Write};

#[cfg(feature = "colorized_output")]
use console::{style, Emoji};

use crate::driver::PlanStats;

/// Outcome of one plan check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed, but something deserves a look
    Warning(String),
    /// Check failed; the workflow will not plan
    Failed(String),
}

impl CheckStatus {
    fn tone(&self) -> Tone {
        match self {
            CheckStatus::Ok => Tone::Pass,
            CheckStatus::Warning(_) => Tone::Warn,
            CheckStatus::Failed(_) => Tone::Fail,
        }
    }
}

/// A named plan check and its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCheck {
    /// What was checked
    pub name: String,
    /// Result of the check
    pub status: CheckStatus,
}

impl PlanCheck {
    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// Overall outcome of a [`PlanReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed
    Ready,
    /// The workflow plans, but some volumes or settings deserve a look
    ReadyWithWarnings,
    /// At least one check failed
    Blocked,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ready => write!(f, "ready to run"),
            Verdict::ReadyWithWarnings => write!(f, "ready to run, with warnings"),
            Verdict::Blocked => write!(f, "not runnable"),
        }
    }
}

/// Every check run against one workflow file, plus the dry-run tally when
/// the workflow got that far.
#[derive(Debug)]
pub struct PlanReport {
    /// Checks in the order they ran
    pub checks: Vec<PlanCheck>,
    /// Workflow that was checked
    pub workflow: String,
    /// Counters from a successful dry run
    pub stats: Option<PlanStats>,
}

impl PlanReport {
    /// Start an empty report for `workflow`
    pub fn new(workflow: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            workflow: workflow.into(),
            stats: None,
        }
    }

    /// Record a check
    pub fn add_check(&mut self, check: PlanCheck) {
        self.checks.push(check);
    }

    fn count(&self, tone: Tone) -> usize {
        self.checks.iter().filter(|c| c.status.tone() == tone).count()
    }

    /// Whether any check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Whether any check warned
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.count(Tone::Pass)
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(Tone::Warn)
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.count(Tone::Fail)
    }

    /// Whether the workflow can be sent to the robot
    pub fn verdict(&self) -> Verdict {
        if self.has_failures() {
            Verdict::Blocked
        } else if self.has_warnings() {
            Verdict::ReadyWithWarnings
        } else {
            Verdict::Ready
        }
    }

    /// Render with terminal colours when the `colorized_output` feature is
    /// enabled, as plain text otherwise
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        let painter = Colored;
        #[cfg(not(feature = "colorized_output"))]
        let painter = Plain;

        let mut output = String::new();
        // Writing into a String cannot fail
        let _ = self.render(&mut output, &painter);
        output
    }

    fn render(&self, out: &mut impl Write, painter: &impl Painter) -> fmt::Result {
        writeln!(out, "{}", painter.paint(&format!("Checking {} workflow", self.workflow), Tone::Heading))?;
        writeln!(out)?;

        for check in &self.checks {
            let tone = check.status.tone();
            write!(out, "  {} {}", painter.symbol(tone), painter.paint(&check.name, tone))?;
            match &check.status {
                CheckStatus::Ok => writeln!(out)?,
                CheckStatus::Warning(msg) | CheckStatus::Failed(msg) => writeln!(out, ": {}", msg)?,
            }
        }

        if let Some(stats) = &self.stats {
            writeln!(out)?;
            writeln!(out, "{}", painter.paint("Plan", Tone::Heading))?;
            writeln!(out, "  commands:  {}", stats.commands)?;
            writeln!(
                out,
                "  tips:      {} picked up, {} dropped, {} returned",
                stats.tip_pickups, stats.tips_dropped, stats.tips_returned
            )?;
            writeln!(out, "  dispensed: {:.2} uL in {} steps", stats.dispensed_ul, stats.dispenses)?;
            writeln!(out, "  waiting:   {:.0} min", stats.delay_seconds / 60.0)?;
        }

        writeln!(out)?;
        let tone = match self.verdict() {
            Verdict::Ready => Tone::Pass,
            Verdict::ReadyWithWarnings => Tone::Warn,
            Verdict::Blocked => Tone::Fail,
        };
        writeln!(
            out,
            "{} ({} passed, {} warnings, {} failed)",
            painter.paint(&format!("Workflow {}", self.verdict()), tone),
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &Plain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Pass,
    Warn,
    Fail,
    Heading,
}

trait Painter {
    fn paint(&self, text: &str, tone: Tone) -> String;
    fn symbol(&self, tone: Tone) -> String;
}

struct Plain;

impl Painter for Plain {
    fn paint(&self, text: &str, _tone: Tone) -> String {
        text.to_string()
    }

    fn symbol(&self, tone: Tone) -> String {
        match tone {
            Tone::Pass => "[ok]",
            Tone::Warn => "[warn]",
            Tone::Fail => "[fail]",
            Tone::Heading => "",
        }
        .to_string()
    }
}

#[cfg(feature = "colorized_output")]
struct Colored;

#[cfg(feature = "colorized_output")]
impl Painter for Colored {
    fn paint(&self, text: &str, tone: Tone) -> String {
        let styled = style(text);
        match tone {
            Tone::Pass => styled.green(),
            Tone::Warn => styled.yellow(),
            Tone::Fail => styled.red().bold(),
            Tone::Heading => styled.bold().cyan(),
        }
        .to_string()
    }

    fn symbol(&self, tone: Tone) -> String {
        let emoji = match tone {
            Tone::Pass => Emoji("✓", "[ok]"),
            Tone::Warn => Emoji("⚠", "[warn]"),
            Tone::Fail => Emoji("✗", "[fail]"),
            Tone::Heading => Emoji("", ""),
        };
        self.paint(&emoji.to_string(), tone)
    }
}
