use tracing::debug;

use super::{LookupError, LookupTable, Position};
use crate::network::{ElementId, Network, SwitchElement, TableError};

/// Union-find over bus slots; the representative of a set is always the
/// member with the lowest original position.
#[derive(Debug, Clone)]
struct SlotMerge {
    parent: Vec<Position>,
}

impl SlotMerge {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, slot: Position) -> Position {
        let mut root = slot;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // path compression
        let mut current = slot;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    fn union(&mut self, a: Position, b: Position) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}

/// Build the bus lookup of `net`
///
/// Buses keep their row order as original order. With
/// `fuse_closed_bus_switches` every closed bus-bus switch merges its two buses
/// into one slot.
pub fn bus_lookup(
    net: &Network,
    fuse_closed_bus_switches: bool,
) -> Result<LookupTable<ElementId>, LookupError> {
    let buses = net.table("bus")?.data();
    let mut lookup = LookupTable::from_identifiers(buses.index())?;

    if !fuse_closed_bus_switches {
        return Ok(lookup);
    }

    let mut merge = SlotMerge::new(lookup.len());
    let mut fused_switches = 0usize;

    for (index, row) in net.table("switch")?.data().rows() {
        let malformed = |_: TableError| LookupError::MalformedSwitch { index };
        let et = row.text("et").map_err(malformed)?;
        let element = et
            .parse::<SwitchElement>()
            .map_err(|_| LookupError::MalformedSwitch { index })?;
        if element != SwitchElement::Bus || !row.boolean("closed").map_err(malformed)? {
            continue;
        }

        let bus = lookup.position(&row.int("bus").map_err(malformed)?)?;
        let other = lookup.position(&row.int("element").map_err(malformed)?)?;
        merge.union(bus, other);
        fused_switches += 1;
    }

    for position in 0..lookup.len() {
        let root = merge.find(position);
        if root != position {
            lookup.assign_slot(position, root)?;
        }
    }

    debug!(
        buses = lookup.len(),
        slots = lookup.slot_count(),
        fused_switches,
        "built bus lookup"
    );

    Ok(lookup)
}
