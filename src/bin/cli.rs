use bonus_pool::{
    AllocationStrategy, BonusLedger, ImportMode, LedgerError, MemberId, MemberUpdate, NewMember,
    PoolSettings, export_members_to_csv, import_members_from_csv, load_settings_from_json,
    money, save_settings_to_json,
};
use bonus_pool::exchange::parse_amount;
use std::io::{self, Write};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const TABLE_HEADERS: [&str; 8] = [
    "#",
    "name",
    "role",
    "eligible",
    "manual_pct",
    "allocation",
    "alloc_pct",
    "notes",
];

fn render_members_table(ledger: &BonusLedger) -> String {
    let currency = ledger.settings().currency;
    let rows: Vec<[String; 8]> = ledger
        .members()
        .iter()
        .enumerate()
        .map(|(idx, m)| {
            [
                (idx + 1).to_string(),
                m.name.clone(),
                m.role.clone(),
                currency.format(money::round_units(m.eligible_amount)),
                m.manual_allocation_percentage
                    .map(|pct| format!("{pct}"))
                    .unwrap_or_else(|| "auto".to_string()),
                currency.format(m.actual_allocation),
                format!(
                    "{:.1}%",
                    money::allocation_percentage(m.actual_allocation, m.eligible_amount)
                ),
                m.notes.clone().unwrap_or_default(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = TABLE_HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let push_row = |out: &mut String, cells: &[&str]| {
        out.push('|');
        for (ci, cell) in cells.iter().enumerate() {
            out.push(' ');
            out.push_str(cell);
            let pad = widths[ci].saturating_sub(cell.chars().count());
            out.push_str(&" ".repeat(pad));
            out.push_str(" |");
        }
        out.push('\n');
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    push_row(&mut out, &TABLE_HEADERS);
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut out, &cells);
    }
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_pool_line(ledger));
    out
}

fn render_pool_line(ledger: &BonusLedger) -> String {
    let pool = ledger.pool();
    let currency = ledger.settings().currency;
    let mut line = format!(
        "Pool: total {} ({}% of eligible), allocated {}, remaining {}, strategy {}",
        currency.format(pool.total_amount),
        pool.percentage_of_eligible,
        currency.format(pool.allocated_amount),
        currency.format(pool.remaining_amount),
        pool.allocation_strategy,
    );
    if pool.is_overcommitted() {
        line.push_str(" [OVERCOMMITTED]");
    }
    if !ledger.is_engine_engaged() {
        line.push_str(" [allocations cleared; run 'allocate']");
    }
    line
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show team members and pool totals\n  summary                            Show allocation breakdown, largest first\n  demo                               Load a three-person sample team\n  add <eligible> <name> | <role> [| notes]\n                                     Add a team member\n  update <member> name|role <text...>\n  update <member> eligible <amount>\n  update <member> notes [text...]    Set notes (omit text to clear)\n  manual <member> <pct|auto>         Set or clear a manual allocation percentage\n  remove <member>                    Remove a team member\n  strategy <equal|proportional|custom>\n                                     Set the allocation strategy\n  strategies                         List allocation strategies\n  percent <pct>                      Set pool size as % of total eligible (1-100)\n  allocate                           Run automatic allocation\n  reset                              Clear overrides and zero all allocations\n  import <replace|append> <path>     Import team members from CSV\n  export <path>                      Export allocations to CSV\n  settings show                      Show pool settings\n  settings load <json_path>          Load pool settings from JSON\n  settings save <json_path>          Save pool settings to JSON\n  quit|exit                          Exit\n\n<member> is the row number shown by 'show' or the member id."
    );
}

fn print_strategies() {
    println!("Available allocation strategies:");
    for (key, description) in AllocationStrategy::variants() {
        println!("  {:<14} {}", key, description);
    }
}

fn print_settings(settings: &PoolSettings) {
    println!("Percentage of eligible: {}", settings.percentage_of_eligible);
    println!("Allocation strategy   : {}", settings.allocation_strategy);
    println!("Currency              : {}", settings.currency);
}

fn resolve_member(ledger: &BonusLedger, raw: &str) -> Option<MemberId> {
    if let Ok(row) = raw.parse::<usize>() {
        return row
            .checked_sub(1)
            .and_then(|idx| ledger.members().get(idx))
            .map(|m| m.id);
    }
    MemberId::from_str(raw)
        .ok()
        .filter(|id| ledger.find_member(id).is_some())
}

fn parse_add(rest: &str) -> Result<NewMember, String> {
    let rest = rest.trim();
    let (amount_s, remainder) = rest
        .split_once(char::is_whitespace)
        .ok_or_else(|| "Usage: add <eligible> <name> | <role> [| notes]".to_string())?;
    let eligible_amount =
        parse_amount(amount_s).ok_or_else(|| format!("Invalid eligible amount '{amount_s}'"))?;
    let mut fields = remainder.split('|').map(str::trim);
    let name = fields.next().unwrap_or("");
    let role = fields.next().unwrap_or("");
    let mut candidate = NewMember::new(name, role, eligible_amount);
    if let Some(notes) = fields.next().filter(|n| !n.is_empty()) {
        candidate = candidate.with_notes(notes);
    }
    Ok(candidate)
}

fn rest_of(input: &str, skip: usize) -> String {
    input
        .split_whitespace()
        .skip(skip)
        .collect::<Vec<_>>()
        .join(" ")
}

fn report(ledger: &BonusLedger, result: Result<(), LedgerError>, done: &str) {
    match result {
        Ok(()) => {
            println!("{done}");
            println!("{}", render_members_table(ledger));
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let settings = match std::env::var("BONUS_POOL_SETTINGS") {
        Ok(path) => match load_settings_from_json(&path) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Ignoring settings from {}: {}", path, e);
                PoolSettings::default()
            }
        },
        Err(_) => PoolSettings::default(),
    };
    let mut ledger = match BonusLedger::with_settings(settings) {
        Ok(ledger) => ledger,
        Err(_) => BonusLedger::new(),
    };

    println!("Bonus Pool (CLI) - type 'help' for commands\n");
    println!("{}", render_members_table(&ledger));

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_members_table(&ledger)),
            "summary" => {
                let summary = ledger.summary();
                let currency = ledger.settings().currency;
                println!("Summary ({})", summary.to_cli_summary());
                if summary.slices.is_empty() {
                    println!("No allocations to display");
                }
                for slice in &summary.slices {
                    println!("  {:<24} {}", slice.label, currency.format(slice.amount));
                }
            }
            "demo" => {
                let sample = vec![
                    NewMember::new("Alex Johnson", "Senior Developer", 10_000.0),
                    NewMember::new("Jamie Smith", "Product Manager", 12_000.0),
                    NewMember::new("Taylor Brown", "Designer", 8_000.0),
                ];
                let result = ledger.replace_all_members(sample);
                report(&ledger, result, "Sample team loaded.");
            }
            "add" => match parse_add(input.trim_start_matches("add")) {
                Ok(candidate) => match ledger.add_member(candidate) {
                    Ok(id) => {
                        println!("Member added (id={}).", id);
                        println!("{}", render_members_table(&ledger));
                    }
                    Err(e) => println!("Error: {}", e),
                },
                Err(msg) => println!("{}", msg),
            },
            "update" => {
                let member_s = parts.next();
                let field = parts.next();
                let (Some(member_s), Some(field)) = (member_s, field) else {
                    println!("Usage: update <member> name|role|eligible|notes <value>");
                    continue;
                };
                let Some(id) = resolve_member(&ledger, member_s) else {
                    println!("Member {} not found.", member_s);
                    continue;
                };
                let value = rest_of(input, 3);
                let update = match field {
                    "name" => MemberUpdate::name(value),
                    "role" => MemberUpdate::role(value),
                    "eligible" => match parse_amount(&value) {
                        Some(amount) => MemberUpdate::eligible_amount(amount),
                        None => {
                            println!("Invalid eligible amount '{}'", value);
                            continue;
                        }
                    },
                    "notes" => MemberUpdate::notes(Some(value).filter(|v| !v.is_empty())),
                    other => {
                        println!("Unknown field '{}'.", other);
                        println!("Usage: update <member> name|role|eligible|notes <value>");
                        continue;
                    }
                };
                let result = ledger.update_member(&id, update);
                report(&ledger, result, "Member updated.");
            }
            "manual" => {
                let member_s = parts.next();
                let value_s = parts.next();
                let (Some(member_s), Some(value_s)) = (member_s, value_s) else {
                    println!("Usage: manual <member> <pct|auto>");
                    continue;
                };
                let Some(id) = resolve_member(&ledger, member_s) else {
                    println!("Member {} not found.", member_s);
                    continue;
                };
                let percentage = if value_s.eq_ignore_ascii_case("auto") {
                    None
                } else {
                    match value_s.trim_end_matches('%').parse::<f64>() {
                        Ok(v) => Some(v),
                        Err(_) => {
                            println!("Invalid percentage");
                            continue;
                        }
                    }
                };
                let result = ledger.set_manual_allocation(&id, percentage);
                report(&ledger, result, "Manual allocation set.");
            }
            "remove" => match parts.next() {
                Some(member_s) => match resolve_member(&ledger, member_s) {
                    Some(id) => {
                        let name = ledger
                            .find_member(&id)
                            .map(|m| m.name.clone())
                            .unwrap_or_default();
                        if ledger.remove_member(&id) {
                            println!("Removed member {}.", name);
                            println!("{}", render_members_table(&ledger));
                        }
                    }
                    None => println!("Member {} not found.", member_s),
                },
                None => println!("Usage: remove <member>"),
            },
            "strategy" => match parts.next().map(AllocationStrategy::from_str) {
                Some(Ok(strategy)) => {
                    ledger.set_allocation_strategy(strategy);
                    println!("Strategy set to {}.", strategy);
                    println!("{}", render_members_table(&ledger));
                }
                Some(Err(e)) => println!("{}. Use 'strategies' to list options.", e),
                None => println!("Usage: strategy <equal|proportional|custom>"),
            },
            "strategies" => print_strategies(),
            "percent" => match parts.next().map(|s| s.trim_end_matches('%').parse::<f64>()) {
                Some(Ok(pct)) => {
                    let result = ledger.set_percentage_of_eligible(pct);
                    report(&ledger, result, "Percentage of eligible updated.");
                }
                Some(Err(_)) => println!("Invalid percentage"),
                None => println!("Usage: percent <pct>"),
            },
            "allocate" => match ledger.run_auto_allocate() {
                Ok(summary) => {
                    println!("Allocated ({})", summary.to_cli_summary());
                    println!("{}", render_members_table(&ledger));
                }
                Err(e) => println!("Cannot allocate: {}.", e),
            },
            "reset" => {
                ledger.reset_allocations();
                println!("Allocations reset.");
                println!("{}", render_members_table(&ledger));
            }
            "import" => {
                let mode_s = parts.next();
                let path = parts.next();
                match (mode_s.map(ImportMode::from_str), path) {
                    (Some(Ok(mode)), Some(path)) => {
                        match import_members_from_csv(&mut ledger, path, mode) {
                            Ok(outcome) => {
                                println!(
                                    "Imported {} member(s) from {} ({}, skipped {}).",
                                    outcome.imported,
                                    path,
                                    outcome.mode.as_str(),
                                    outcome.skipped
                                );
                                println!("{}", render_members_table(&ledger));
                            }
                            Err(e) => println!("Import failed: {}", e),
                        }
                    }
                    _ => println!("Usage: import <replace|append> <path>"),
                }
            }
            "export" => match parts.next() {
                Some(path) => match export_members_to_csv(ledger.members(), path) {
                    Ok(()) => println!(
                        "Exported {} member(s) to {}.",
                        ledger.members().len(),
                        path
                    ),
                    Err(e) => println!("Export failed: {}", e),
                },
                None => println!("Usage: export <path>"),
            },
            "settings" => match parts.next() {
                Some("show") | None => print_settings(ledger.settings()),
                Some("load") => match parts.next() {
                    Some(path) => match load_settings_from_json(path) {
                        Ok(settings) => match ledger.apply_settings(settings) {
                            Ok(()) => {
                                println!("Settings loaded from {}.", path);
                                print_settings(ledger.settings());
                            }
                            Err(e) => println!("Error applying settings: {}", e),
                        },
                        Err(e) => println!("Error loading settings: {}", e),
                    },
                    None => println!("Usage: settings load <json_path>"),
                },
                Some("save") => match parts.next() {
                    Some(path) => match save_settings_to_json(ledger.settings(), path) {
                        Ok(()) => println!("Settings saved to {}.", path),
                        Err(e) => println!("Error saving settings: {}", e),
                    },
                    None => println!("Usage: settings save <json_path>"),
                },
                Some(other) => {
                    println!("Unknown settings command '{}'.", other);
                    println!("Usage: settings show|load <json_path>|save <json_path>");
                }
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
