//! Interactive-mode printout of the battle after each timestep.

use std::io::{self, Write};

use invasion_core::factions::Faction;
use invasion_core::game::{Game, TickEvents};
use invasion_core::unit::UnitId;

const RULE: &str = "==============";

fn id_list(ids: &[UnitId]) -> String {
    let inner = ids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{inner}]")
}

fn heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "{RULE} {title} {RULE}")
}

/// Print the state of `game` after the timestep described by `events`.
///
/// The allied army section only shows while the allies are called or
/// still have units on the field.
pub fn render_tick<W: Write>(out: &mut W, game: &Game, events: &TickEvents) -> io::Result<()> {
    let field = game.battlefield();
    writeln!(out, "Current Timestep {}", events.tick)?;

    for faction in Faction::ALL {
        let army = field.army(faction);
        if faction == Faction::EarthAllied && !game.allies_called() && army.is_dead() {
            continue;
        }
        heading(out, &format!("{} Army Alive Units", faction.display_name()))?;
        for &kind in army.kinds() {
            let ids = army.unit_ids(kind);
            writeln!(out, "{} {kind} {}", ids.len(), id_list(&ids))?;
        }
        writeln!(out)?;
    }

    heading(out, "Units fighting at current step")?;
    for attack in &events.attacks {
        writeln!(
            out,
            "{} {} {} {}",
            attack.kind,
            attack.attacker,
            attack.kind.attack_verb(),
            id_list(&attack.targets)
        )?;
    }
    writeln!(out)?;

    let maintenance = field.maintenance_ids();
    heading(out, "Unit Maintenance List")?;
    writeln!(out, "{} units {}", maintenance.len(), id_list(&maintenance))?;
    writeln!(out)?;

    let killed = field.killed_ids();
    heading(out, "Killed/Destructed Units")?;
    writeln!(out, "{} units {}", killed.len(), id_list(&killed))?;

    if events.allies_called {
        writeln!(out, "Infection threshold reached: allied army called")?;
    }
    if events.allies_withdrawn > 0 {
        writeln!(
            out,
            "Infection cleared: {} allied units withdrawn",
            events.allies_withdrawn
        )?;
    }
    writeln!(out)
}

/// Print the silent-mode banner.
pub fn render_silent_start<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Silent Mode")?;
    writeln!(out, "Simulation Starts...")
}

/// Print the silent-mode closing line. The output file is only mentioned
/// when a report was written.
pub fn render_silent_end<W: Write>(out: &mut W, report_written: bool) -> io::Result<()> {
    if report_written {
        writeln!(out, "Simulation ends, Output file is created")
    } else {
        writeln!(out, "Simulation ends")
    }
}
