use super::{LookupError, LookupTable, Position};
use crate::network::ElementId;

/// Translate between element identifiers and storage positions
///
/// With `fused_indices` the selection holds element identifiers and the result
/// holds their (possibly shared) slots, in input order and with duplicates kept.
/// Without it the selection holds pre-fusion positions and the result holds the
/// identifiers originally stored there, regardless of any later fusion.
pub fn get_indices(
    selection: &[ElementId],
    lookup: &LookupTable<ElementId>,
    fused_indices: bool,
) -> Result<Vec<ElementId>, LookupError> {
    if fused_indices {
        return Ok(lookup
            .positions(selection)?
            .into_iter()
            .map(|p| p as ElementId)
            .collect());
    }

    let positions = selection
        .iter()
        .map(|&value| {
            Position::try_from(value).map_err(|_| LookupError::PositionOutOfRange {
                position: value,
                len: lookup.len(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    lookup.original_identifiers(&positions)
}
