//! End-of-battle report: fixed-width text and JSON.

use std::io::{self, Write};
use std::path::Path;

use invasion_core::factions::Faction;
use invasion_core::stats::{BattleStatistics, FactionStats, KillRecord};

fn delay(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn write_kill<W: Write>(out: &mut W, record: &KillRecord) -> io::Result<()> {
    writeln!(
        out,
        "{:>6} {:>6} {:>4} {:>6} {:>6} {:>6} {:>6}",
        record.td,
        record.id.0,
        record.kind.code(),
        record.tj,
        delay(record.df),
        delay(record.dd),
        record.db
    )
}

fn write_faction<W: Write>(out: &mut W, stats: &FactionStats) -> io::Result<()> {
    writeln!(
        out,
        "======================== {} Army ========================",
        stats.faction.display_name()
    )?;

    write!(out, "{:<24}", "Units created:")?;
    for kind in &stats.kinds {
        write!(out, " {} {:<5}", kind.kind, kind.total)?;
    }
    writeln!(out, " total {}", stats.total)?;

    write!(out, "{:<24}", "Units destroyed:")?;
    for kind in &stats.kinds {
        write!(out, " {} {:<5}", kind.kind, kind.destroyed)?;
    }
    writeln!(out, " total {}", stats.destroyed)?;

    write!(out, "{:<24}", "Destroyed percentage:")?;
    for kind in &stats.kinds {
        write!(out, " {} {:>6.2}%", kind.kind, kind.destroyed_percent)?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "{:<24} {:.2}% ({} of {})",
        "Destroyed overall:", stats.destroyed_percent, stats.destroyed, stats.total
    )?;
    writeln!(
        out,
        "{:<24} Df {:.2}  Dd {:.2}  Db {:.2}",
        "Average delays:", stats.average_df, stats.average_dd, stats.average_db
    )?;
    writeln!(
        out,
        "{:<24} Df/Db {:.2}%  Dd/Db {:.2}%",
        "Delay ratios:", stats.df_db_percent, stats.dd_db_percent
    )?;
    writeln!(
        out,
        "{:<24} {} ({:.2}%)",
        "Healed:", stats.healed, stats.healed_percent
    )?;
    writeln!(out, "{:<24} {}", "Infected:", stats.infected)?;
    writeln!(
        out,
        "{:<24} {:.2}",
        "Average live health:", stats.average_live_health
    )?;
    writeln!(out)
}

/// Write the text report.
pub fn write_report<W: Write>(out: &mut W, stats: &BattleStatistics) -> io::Result<()> {
    writeln!(
        out,
        "{:>6} {:>6} {:>4} {:>6} {:>6} {:>6} {:>6}",
        "Td", "ID", "Kind", "Tj", "Df", "Dd", "Db"
    )?;
    for record in &stats.killed {
        write_kill(out, record)?;
    }
    writeln!(out)?;

    for faction in &stats.factions {
        // allied section only when the allies were ever called
        if faction.faction == Faction::EarthAllied && faction.total == 0 {
            continue;
        }
        write_faction(out, faction)?;
    }

    writeln!(out, "Timesteps: {}", stats.timesteps)?;
    writeln!(out, "Battle result: {}", stats.outcome.label())?;
    for faction in &stats.capped {
        writeln!(
            out,
            "WARNING: {} army reached its unit cap; later units were not created",
            faction.display_name()
        )?;
    }
    Ok(())
}

/// Render the text report to a string.
#[must_use]
pub fn render_report(stats: &BattleStatistics) -> String {
    let mut out = Vec::new();
    // writing to a Vec cannot fail
    let _ = write_report(&mut out, stats);
    String::from_utf8_lossy(&out).into_owned()
}

/// Save the text report to `path`.
pub fn save_report<P: AsRef<Path>>(path: P, stats: &BattleStatistics) -> io::Result<()> {
    std::fs::write(path, render_report(stats))
}

/// Save the statistics as pretty JSON.
pub fn save_json<P: AsRef<Path>>(path: P, stats: &BattleStatistics) -> io::Result<()> {
    let json = serde_json::to_string_pretty(stats).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// Load statistics saved by [`save_json`].
pub fn load_json<P: AsRef<Path>>(path: P) -> io::Result<BattleStatistics> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(std::io::Error::other)
}
