use super::arrangement::ray_crosses;
use crate::lattice::{cross, dot, ring_area2, IntPoint, IntPolygon, IntRing};
use log::trace;
use std::collections::BTreeMap;

/// Rank of the turn from the reversed incoming direction `cur -> prev` to `cur -> next`,
/// rotating clockwise: smaller ranks are reached first.
#[inline]
fn turn_rank(prev: IntPoint, cur: IntPoint, next: IntPoint) -> u8 {
    let c = cross(cur, prev, next);
    if c < 0 {
        0
    } else if c == 0 && dot(cur, prev, next) < 0 {
        1
    } else if c > 0 {
        2
    } else {
        3
    }
}

/// Removes and returns the outgoing edge at `cur` that is the first clockwise turn from the
/// reversed incoming direction (the leftmost turn).
fn take_next(
    outgoing: &mut BTreeMap<IntPoint, Vec<IntPoint>>,
    prev: IntPoint,
    cur: IntPoint,
) -> Option<IntPoint> {
    let targets = outgoing.get_mut(&cur)?;
    let mut best: Option<(usize, u8)> = None;
    for (i, &next) in targets.iter().enumerate() {
        let rank = turn_rank(prev, cur, next);
        let better = match best {
            None => true,
            Some((j, best_rank)) => {
                rank < best_rank || (rank == best_rank && cross(cur, next, targets[j]) < 0)
            }
        };
        if better {
            best = Some((i, rank));
        }
    }

    best.map(|(i, _)| targets.swap_remove(i))
}

fn take_edge(outgoing: &mut BTreeMap<IntPoint, Vec<IntPoint>>, a: IntPoint, b: IntPoint) -> bool {
    match outgoing.get_mut(&a) {
        Some(targets) => match targets.iter().position(|&t| t == b) {
            Some(i) => {
                targets.swap_remove(i);
                true
            }
            None => false,
        },
        None => false,
    }
}

/// Splits a closed walk at every repeated vertex into simple rings.
fn split_at_repeats(walk: Vec<IntPoint>) -> Vec<IntRing> {
    let mut rings = Vec::new();
    let mut stack: Vec<IntPoint> = Vec::with_capacity(walk.len());
    let mut position: BTreeMap<IntPoint, usize> = BTreeMap::new();

    for p in walk {
        if let Some(&i) = position.get(&p) {
            let tail: Vec<IntPoint> = stack.drain(i + 1..).collect();
            for q in &tail {
                position.remove(q);
            }
            let mut ring = Vec::with_capacity(tail.len() + 1);
            ring.push(p);
            ring.extend(tail);
            rings.push(ring);
        } else {
            position.insert(p, stack.len());
            stack.push(p);
        }
    }

    rings.push(stack);
    rings
}

/// Removes vertexes where the ring does not turn (including zero width spikes).
pub(crate) fn remove_collinear(mut ring: IntRing) -> IntRing {
    loop {
        let n = ring.len();
        if n < 3 {
            return ring;
        }

        let keep: Vec<bool> = (0..n)
            .map(|i| cross(ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]) != 0)
            .collect();
        if keep.iter().all(|&k| k) {
            return ring;
        }

        ring = ring
            .into_iter()
            .zip(keep)
            .filter_map(|(p, k)| k.then_some(p))
            .collect();
    }
}

/// Joins directed boundary edges into closed simple rings.
///
/// Outer rings come out counter clockwise and holes clockwise as long as the edges have the
/// filled side on their left.
pub(crate) fn stitch(edges: &[(IntPoint, IntPoint)]) -> Vec<IntRing> {
    let mut outgoing: BTreeMap<IntPoint, Vec<IntPoint>> = BTreeMap::new();
    for &(a, b) in edges {
        outgoing.entry(a).or_default().push(b);
    }

    let mut rings = Vec::new();
    for &(start, first) in edges {
        if !take_edge(&mut outgoing, start, first) {
            continue;
        }

        let mut walk = vec![start];
        let (mut prev, mut cur) = (start, first);
        let closed = loop {
            if cur == start {
                break true;
            }
            walk.push(cur);
            match take_next(&mut outgoing, prev, cur) {
                Some(next) => {
                    prev = cur;
                    cur = next;
                }
                None => break false,
            }
        };

        if !closed {
            trace!("dropping open chain of {} vertexes starting at {:?}", walk.len(), start);
            continue;
        }

        rings.extend(
            split_at_repeats(walk)
                .into_iter()
                .map(remove_collinear)
                .filter(|r| r.len() >= 3 && ring_area2(r) != 0),
        );
    }

    rings
}

/// True if the doubled coordinate point `m` is inside `ring` (even-odd).
pub(crate) fn ring_contains_doubled(ring: &[IntPoint], m: IntPoint) -> bool {
    let n = ring.len();
    (0..n)
        .filter(|&i| ray_crosses(m, ring[i], ring[(i + 1) % n]))
        .count()
        % 2
        == 1
}

/// Groups rings into polygons: every clockwise ring is attached as a hole to the smallest counter
/// clockwise ring containing it.
pub(crate) fn group_rings(rings: Vec<IntRing>) -> Vec<IntPolygon> {
    let (outers, holes): (Vec<_>, Vec<_>) = rings
        .into_iter()
        .map(|r| (ring_area2(&r), r))
        .partition(|(area, _)| *area > 0);

    let mut polygons: Vec<(i128, IntPolygon)> =
        outers.into_iter().map(|(area, r)| (area, vec![r])).collect();

    for (_, hole) in holes {
        let m = IntPoint::new(hole[0].x + hole[1].x, hole[0].y + hole[1].y);
        let owner = polygons
            .iter()
            .enumerate()
            .filter(|(_, (_, rings))| ring_contains_doubled(&rings[0], m))
            .min_by_key(|(_, (area, _))| *area)
            .map(|(i, _)| i);

        match owner {
            Some(i) => polygons[i].1.push(hole),
            None => trace!("dropping hole without enclosing ring at {:?}", hole[0]),
        }
    }

    polygons.into_iter().map(|(_, p)| p).collect()
}
