use super::{ExchangeError, ExchangeResult, ImportMode};
use crate::ledger::BonusLedger;
use crate::member::{NewMember, TeamMember};
use crate::member_validation;
use crate::money;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info};

const REQUIRED_HEADERS: [(&str, &str); 3] = [
    ("name", "name"),
    ("role", "role"),
    ("eligibleamount", "eligibleAmount"),
];
const NOTES_HEADER: &str = "notes";

pub const EXPORT_HEADERS: [&str; 6] = [
    "Name",
    "Role",
    "Eligible Amount",
    "Actual Allocation",
    "Allocation %",
    "Notes",
];

/// Records that survived validation, plus a count of the rows that did not.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportReport {
    pub members: Vec<NewMember>,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub mode: ImportMode,
    pub imported: usize,
    pub skipped: usize,
}

// "Eligible Amount", "eligible_amount" and "eligibleAmount" all match.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parses a decorated amount such as `$12,000` or `₹ 8,000.50`. Negative and
/// non-numeric input yields `None`.
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned: String = input
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '₹') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => None,
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> &'r str {
    record.get(idx).map(str::trim).unwrap_or("")
}

pub fn parse_members_csv<R: Read>(reader: R) -> ExchangeResult<ImportReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let position = |key: &str| headers.iter().position(|h| h == key);

    let (name_idx, role_idx, amount_idx) = match (
        position("name"),
        position("role"),
        position("eligibleamount"),
    ) {
        (Some(name), Some(role), Some(amount)) => (name, role, amount),
        _ => {
            let missing = REQUIRED_HEADERS
                .iter()
                .filter(|(key, _)| position(*key).is_none())
                .map(|(_, display)| display.to_string())
                .collect();
            return Err(ExchangeError::MissingHeaders(missing));
        }
    };
    let notes_idx = position(NOTES_HEADER);

    let mut candidates = Vec::new();
    let mut skipped = 0usize;
    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                debug!(row = row + 1, error = %err, "skipping unreadable csv row");
                skipped += 1;
                continue;
            }
        };

        let Some(eligible_amount) = parse_amount(field(&record, amount_idx)) else {
            debug!(row = row + 1, "skipping csv row with invalid eligible amount");
            skipped += 1;
            continue;
        };
        let mut candidate = NewMember::new(
            field(&record, name_idx),
            field(&record, role_idx),
            eligible_amount,
        );
        if let Some(notes) = notes_idx.map(|idx| field(&record, idx)) {
            if !notes.is_empty() {
                candidate.notes = Some(notes.to_string());
            }
        }
        candidates.push(candidate);
    }

    let report = screen_members(candidates);
    if report.members.is_empty() {
        return Err(ExchangeError::NoValidRecords);
    }
    Ok(ImportReport {
        members: report.members,
        skipped: skipped + report.skipped,
    })
}

/// Drops candidates that fail ingestion validation and counts them.
pub fn screen_members(candidates: Vec<NewMember>) -> ImportReport {
    let mut members = Vec::with_capacity(candidates.len());
    let mut skipped = 0usize;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        match member_validation::validate_candidate(&candidate) {
            Ok(()) => members.push(candidate),
            Err(err) => {
                debug!(record = idx + 1, error = %err, "skipping invalid team member record");
                skipped += 1;
            }
        }
    }
    ImportReport { members, skipped }
}

/// Hands parsed records to the ledger in one atomic call.
pub fn apply_import(
    ledger: &mut BonusLedger,
    report: ImportReport,
    mode: ImportMode,
) -> ExchangeResult<ImportOutcome> {
    let imported = report.members.len();
    match mode {
        ImportMode::Replace => ledger.replace_all_members(report.members)?,
        ImportMode::Append => {
            ledger.append_members(report.members)?;
        }
    }
    info!(
        mode = mode.as_str(),
        imported,
        skipped = report.skipped,
        "team members imported"
    );
    Ok(ImportOutcome {
        mode,
        imported,
        skipped: report.skipped,
    })
}

pub fn import_members_from_csv<P: AsRef<Path>>(
    ledger: &mut BonusLedger,
    path: P,
    mode: ImportMode,
) -> ExchangeResult<ImportOutcome> {
    let file = File::open(path)?;
    let report = parse_members_csv(file)?;
    apply_import(ledger, report, mode)
}

pub fn write_members_csv<W: Write>(members: &[TeamMember], writer: W) -> ExchangeResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(EXPORT_HEADERS)?;
    for member in members {
        let percentage =
            money::allocation_percentage(member.actual_allocation, member.eligible_amount);
        writer.write_record([
            member.name.as_str(),
            member.role.as_str(),
            member.eligible_amount.to_string().as_str(),
            member.actual_allocation.to_string().as_str(),
            format!("{percentage:.1}").as_str(),
            member.notes.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_members_to_csv<P: AsRef<Path>>(
    members: &[TeamMember],
    path: P,
) -> ExchangeResult<()> {
    let file = File::create(path)?;
    write_members_csv(members, file)
}
