use std::fmt::Write;

use crate::algorithms::ConvergenceState;
use crate::protocol::RoundSnapshot;

const COLUMN_WIDTH: usize = 6;

/// Distance tables of every router at one round, destinations as rows and
/// vias as columns.
pub fn format_round(snapshot: &RoundSnapshot, routers: &[String]) -> String {
    let mut out = String::new();

    for router in routers {
        let others: Vec<&String> = routers.iter().filter(|r| *r != router).collect();

        let _ = writeln!(out, "Distance Table of router {} at t={}:", router, snapshot.round);
        let _ = write!(out, "{:w$}", "", w = COLUMN_WIDTH);
        for via in &others {
            let _ = write!(out, "{:<w$}", via, w = COLUMN_WIDTH);
        }
        out.truncate(out.trim_end().len());
        out.push('\n');

        for destination in &others {
            let _ = write!(out, "{:<w$}", destination, w = COLUMN_WIDTH);
            for via in &others {
                let cost = snapshot.cost(router, destination, via);
                let _ = write!(out, "{:<w$}", cost.to_string(), w = COLUMN_WIDTH);
            }
            out.truncate(out.trim_end().len());
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Routing tables as `destination,via,cost` lines, `INF` for unreachable.
pub fn format_routing_tables(state: &ConvergenceState) -> String {
    let mut out = String::new();

    for router in state.index.iter() {
        let _ = writeln!(out, "Routing Table of router {}:", router);
        for destination in state.index.iter().filter(|d| *d != router) {
            let route = state.best_route(router, destination);
            match route.via {
                Some(via) if route.cost.is_finite() => {
                    let _ = writeln!(out, "{},{},{}", destination, via, route.cost);
                }
                _ => {
                    let _ = writeln!(out, "{},INF,INF", destination);
                }
            }
        }
        out.push('\n');
    }

    out
}
