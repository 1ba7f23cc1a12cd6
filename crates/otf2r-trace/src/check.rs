//! Event stream consistency checks.
//!
//! Per location: timestamps do not decrease, every leave matches the
//! innermost open enter, no region stays open at the end, and metric samples
//! carry one value per class member. Problems are collected, not fatal.

use std::collections::BTreeMap;

use anyhow::Result;
use otf2r_core::{Def, Location, LocationRef, Region};

use crate::event::Event;
use crate::reader::{EventHandler, Reader};

/// Outcome of [`check_events`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Events seen.
    pub events: u64,
    /// Events per kind.
    pub per_kind: BTreeMap<&'static str, u64>,
    /// Locations seen.
    pub locations: u64,
    /// Human-readable problems, in discovery order.
    pub issues: Vec<String>,
}

impl CheckReport {
    /// Whether no problem was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Default)]
struct Checker {
    report: CheckReport,
    stack: Vec<Def<Region>>,
    last_time: Option<u64>,
}

impl EventHandler for Checker {
    fn on_location_begin(&mut self, _location: LocationRef, _definition: &Def<Location>) -> Result<()> {
        self.stack.clear();
        self.last_time = None;
        self.report.locations += 1;
        Ok(())
    }

    fn on_event(&mut self, loc: LocationRef, event: &Event) -> Result<()> {
        self.report.events += 1;
        *self.report.per_kind.entry(event.kind()).or_default() += 1;

        if let Some(last) = self.last_time {
            if event.time() < last {
                self.report
                    .issues
                    .push(format!("location {loc}: time {} after {last}", event.time()));
            }
        }
        self.last_time = Some(event.time());

        match event {
            Event::Enter { region, .. } => self.stack.push(region.clone()),
            Event::Leave { region, time } => match self.stack.pop() {
                Some(open) if open.reference() == region.reference() => {}
                Some(open) => self.report.issues.push(format!(
                    "location {loc}: leave of region {} at {time} while region {} is open",
                    region.reference(),
                    open.reference()
                )),
                None => self
                    .report
                    .issues
                    .push(format!("location {loc}: leave of region {} at {time} without enter", region.reference())),
            },
            Event::Metric { metric, values, time } => {
                if let Some(class) = metric.class().data() {
                    if class.members.len() != values.len() {
                        self.report.issues.push(format!(
                            "location {loc}: metric {} at {time} has {} values for {} members",
                            metric.reference(),
                            values.len(),
                            class.members.len()
                        ));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_location_end(&mut self, location: LocationRef, _events: u64) -> Result<()> {
        if !self.stack.is_empty() {
            self.report.issues.push(format!(
                "location {location}: {} region(s) left open",
                self.stack.len()
            ));
        }
        Ok(())
    }
}

/// Replay `reader`'s events and check them.
pub fn check_events(reader: &mut Reader) -> Result<CheckReport> {
    let mut checker = Checker::default();
    reader.read_events(&mut checker)?;
    Ok(checker.report)
}
