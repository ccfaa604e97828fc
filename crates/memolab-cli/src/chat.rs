//! Interactive chat REPL with persistent hybrid memory

use std::io::{self, Write};

use anyhow::Result;

use memolab_core::MemorySnapshot;

use crate::{SessionOpts, session};

pub async fn run(opts: SessionOpts) -> Result<()> {
    let chat = session::build_chat_session(&opts);

    println!("memolab chat. Model: {}.", opts.model);
    match chat.restore().await {
        Ok(true) => {
            println!("Restored memory from {}:", opts.memory_file.display());
            print_snapshot(&chat.snapshot());
        }
        Ok(false) => {}
        Err(e) => eprintln!("\n[Error] {}\n", e),
    }
    println!("Type 'help' for commands, 'exit' to leave.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You > ");
        stdout.flush().ok();

        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        match input.to_lowercase().as_str() {
            "exit" | "quit" => {
                println!("Goodbye!");
                break;
            }
            "help" | "?" => {
                print_help();
                continue;
            }
            "save" => {
                match chat.save().await {
                    Ok(snapshot) => {
                        println!("Memory saved to {}:", opts.memory_file.display());
                        println!("{}", serde_json::to_string_pretty(&snapshot)?);
                    }
                    Err(e) => eprintln!("\n[Error] {}\n", e),
                }
                continue;
            }
            "reset" => {
                match chat.reset().await {
                    Ok(()) => println!("Memory cleared."),
                    Err(e) => eprintln!("\n[Error] {}\n", e),
                }
                continue;
            }
            _ => {}
        }

        match chat.respond(input).await {
            Ok(outcome) => {
                for candidate in &outcome.slots_set {
                    println!("[memory] noted {} = {}", candidate.slot, candidate.value);
                }
                if outcome.forgot {
                    println!("[memory] facts and summary cleared");
                }
                if outcome.compacted_messages > 0 {
                    println!(
                        "[memory] folded {} messages into the summary",
                        outcome.compacted_messages
                    );
                }

                if outcome.content.is_empty() {
                    println!("Bot > (empty reply)");
                } else {
                    println!("Bot > {}", outcome.content);
                }
                println!("  ({:.1}s)", outcome.elapsed.as_secs_f64());
            }
            Err(e) => eprintln!("\n[Error] {}\n", e),
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &MemorySnapshot) {
    if !snapshot.summary.is_empty() {
        println!("  summary: {}", snapshot.summary);
    }
    for (slot, value) in &snapshot.slots {
        println!("  {} = {}", slot, value);
    }
    println!("  {} buffered messages", snapshot.buffer.len());
}

fn print_help() {
    println!("Commands:");
    println!("  save   persist the memory file and print its contents");
    println!("  reset  clear buffer, summary, and facts; remove the file");
    println!("  help   this message");
    println!("  exit   leave (also: quit)");
    println!("Anything else is sent to the model.");
}
