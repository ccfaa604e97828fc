//! Recall, update, and forget checks against a live session
//!
//! One session plays all three scenarios in order, exactly as a user
//! would: state a fact, digress, ask it back; correct the fact, ask
//! again; wipe everything, ask one last time. Answers are judged by
//! case-insensitive containment.

use anyhow::{Context, Result, bail};

use memolab_memory::{HybridSession, SessionError};

use crate::{SessionOpts, session};

struct Scenario {
    name: &'static str,
    setup: &'static [&'static str],
    question: &'static str,
    expect: Expect,
}

enum Expect {
    Contains(&'static str),
    OmitsAll(&'static [&'static str]),
}

impl Expect {
    fn judge(&self, answer: &str) -> bool {
        let answer = answer.to_lowercase();
        match self {
            Expect::Contains(needle) => answer.contains(needle),
            Expect::OmitsAll(needles) => needles.iter().all(|n| !answer.contains(n)),
        }
    }
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "Recall",
        setup: &[
            "My name is André.",
            "I live in Lyon and it rains a lot here.",
        ],
        question: "What is my name?",
        expect: Expect::Contains("andré"),
    },
    Scenario {
        name: "Update",
        setup: &["Actually, my name is Marc."],
        question: "What is my name?",
        expect: Expect::Contains("marc"),
    },
    Scenario {
        name: "Forget",
        setup: &["Forget everything about me."],
        question: "Do you know my name?",
        expect: Expect::OmitsAll(&["andré", "marc"]),
    },
];

pub struct CheckRow {
    pub scenario: &'static str,
    pub question: &'static str,
    pub answer: String,
    pub passed: bool,
}

pub async fn run(opts: SessionOpts) -> Result<()> {
    let provider = session::build_provider(&opts);
    let checks = session::build_session(provider, &opts);

    println!("Running memory checks against '{}'.", opts.model);
    println!();

    let rows = run_checks(&checks)
        .await
        .context("memory check turn failed")?;
    print_table(&rows);

    let failed = rows.iter().filter(|row| !row.passed).count();
    if failed > 0 {
        bail!("{} of {} checks failed", failed, rows.len());
    }
    println!("All {} checks passed.", rows.len());
    Ok(())
}

async fn run_checks(session: &HybridSession) -> Result<Vec<CheckRow>, SessionError> {
    let mut rows = Vec::with_capacity(SCENARIOS.len());
    for scenario in SCENARIOS {
        for line in scenario.setup {
            session.respond(line).await?;
        }

        let outcome = session.respond(scenario.question).await?;
        let passed = scenario.expect.judge(&outcome.content);
        rows.push(CheckRow {
            scenario: scenario.name,
            question: scenario.question,
            answer: outcome.content,
            passed,
        });
    }
    Ok(rows)
}

fn print_table(rows: &[CheckRow]) {
    println!(
        "{:<8} {:<22} {:<46} {}",
        "Test", "Question", "Answer", "Verdict"
    );
    println!("{:-<8} {:-<22} {:-<46} {:-<7}", "", "", "", "");
    for row in rows {
        println!(
            "{:<8} {:<22} {:<46} {}",
            row.scenario,
            truncate(row.question, 20),
            truncate(&row.answer, 44),
            if row.passed { "✓" } else { "✗" }
        );
    }
    println!();
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
