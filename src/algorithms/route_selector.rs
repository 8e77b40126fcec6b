use crate::RouterId;
use crate::protocol::{BestRoute, Cost, DistanceTable};

/// Picks the cheapest via towards `destination` from `table`.
///
/// Only finite costs are eligible. Among vias tied at the minimum, the
/// smallest identifier wins regardless of the order `vias` comes in, so the
/// result only depends on the table contents. If no via has a finite cost
/// the destination is unreachable.
pub fn select_route<'a, I>(table: &DistanceTable, destination: &str, vias: I) -> BestRoute
where
    I: IntoIterator<Item = &'a RouterId>,
{
    let mut best: Option<(&RouterId, u32)> = None;

    for via in vias {
        let Cost::Finite(cost) = table.get_cost(destination, via) else {
            continue;
        };

        let better = match best {
            None => true,
            Some((best_via, best_cost)) => {
                cost < best_cost || (cost == best_cost && via < best_via)
            }
        };
        if better {
            best = Some((via, cost));
        }
    }

    match best {
        Some((via, cost)) => BestRoute::new(via, Cost::Finite(cost)),
        None => BestRoute::unreachable(),
    }
}
