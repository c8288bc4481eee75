//! Domain invariants for batch reordering
//!
//! Checked by the optimizer tests and property tests. `rank` is the
//! precedence function the output was sorted with.

use super::value_objects::PrecedenceRank;
use shared_types::RuntimeEvent;

/// INVARIANT-1: Permutation
/// The output holds exactly the input events, each exactly once.
pub fn invariant_permutation(input: &[RuntimeEvent], output: &[RuntimeEvent]) -> bool {
    input.len() == output.len() && match_positions(input, output).is_some()
}

/// INVARIANT-2: Rank Order
/// Ranks never decrease along the output.
pub fn invariant_rank_order(
    output: &[RuntimeEvent],
    rank: impl Fn(&RuntimeEvent) -> PrecedenceRank,
) -> bool {
    output.windows(2).all(|pair| rank(&pair[0]) <= rank(&pair[1]))
}

/// INVARIANT-3: Stability
/// Events of equal rank keep their input order.
pub fn invariant_stable_within_rank(
    input: &[RuntimeEvent],
    output: &[RuntimeEvent],
    rank: impl Fn(&RuntimeEvent) -> PrecedenceRank,
) -> bool {
    let Some(positions) = match_positions(input, output) else {
        return false;
    };

    for i in 0..output.len() {
        for j in (i + 1)..output.len() {
            if rank(&output[i]) == rank(&output[j]) && positions[i] > positions[j] {
                return false;
            }
        }
    }

    true
}

/// For each output event, the input index it came from.
///
/// Equal events are matched first-unused-first, so duplicates map in order.
fn match_positions(input: &[RuntimeEvent], output: &[RuntimeEvent]) -> Option<Vec<usize>> {
    let mut used = vec![false; input.len()];
    let mut positions = Vec::with_capacity(output.len());

    for event in output {
        let index = input
            .iter()
            .enumerate()
            .position(|(i, candidate)| !used[i] && candidate == event)?;
        used[index] = true;
        positions.push(index);
    }

    Some(positions)
}
