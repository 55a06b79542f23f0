use std::collections::VecDeque;

use common::slice::{Path, Point2, Segment, COINCIDENT_DIST_SQ};

/// Chains one layer's unordered segment soup into open and closed paths.
///
/// Greedy endpoint matching: seed a path with an arbitrary segment, then
/// keep scanning the pool for a segment touching the path's head or tail
/// and splice it on. Worst case O(n²) in the segment count since every
/// extension rescans the pool; fine at the mesh sizes this runs on, a
/// documented limit for very dense layers.
///
/// Every input segment ends up in exactly one output path; nothing is
/// discarded here.
pub fn stitch_segments(mut pool: Vec<Segment>) -> Vec<Path> {
    let mut paths = Vec::new();

    while let Some(seed) = pool.pop() {
        let mut points = VecDeque::from([seed.a, seed.b]);

        while let Some((index, at_head)) = next_link(&pool, &points) {
            let segment = pool.swap_remove(index);
            if at_head {
                let head = points[0];
                let next = if coincident(segment.a, head) {
                    segment.b
                } else {
                    segment.a
                };
                points.push_front(next);
            } else {
                let tail = points[points.len() - 1];
                let next = if coincident(segment.a, tail) {
                    segment.b
                } else {
                    segment.a
                };
                points.push_back(next);
            }
        }

        let mut points = Vec::from(points);
        let closed = points.len() > 2 && coincident(points[0], points[points.len() - 1]);
        if closed {
            points.pop();
        }

        paths.push(Path { points, closed });
    }

    paths
}

/// Finds a pool segment with an endpoint touching the path's head or tail,
/// returning its index and whether it extends the head.
fn next_link(pool: &[Segment], points: &VecDeque<Point2>) -> Option<(usize, bool)> {
    let head = points[0];
    let tail = points[points.len() - 1];

    for (index, segment) in pool.iter().enumerate() {
        for end in [segment.a, segment.b] {
            if coincident(end, head) {
                return Some((index, true));
            }
            if coincident(end, tail) {
                return Some((index, false));
            }
        }
    }

    None
}

fn coincident(a: Point2, b: Point2) -> bool {
    (a - b).norm_squared() < COINCIDENT_DIST_SQ
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(a: (f32, f32), b: (f32, f32)) -> Segment {
        Segment::new(Point2::new(a.0, a.1), Point2::new(b.0, b.1))
    }

    /// Total segments represented by a path: one per edge, plus the closing
    /// edge for closed paths.
    fn segments_in(path: &Path) -> usize {
        path.points.len() - 1 + path.closed as usize
    }

    #[test]
    fn three_segments_form_one_closed_triangle() {
        let segments = vec![
            segment((0.0, 0.0), (1.0, 0.0)),
            segment((1.0, 0.0), (0.0, 1.0)),
            segment((0.0, 1.0), (0.0, 0.0)),
        ];

        let paths = stitch_segments(segments);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
        assert_eq!(paths[0].points.len(), 3);
    }

    #[test]
    fn broken_chain_stays_open() {
        let segments = vec![
            segment((0.0, 0.0), (1.0, 0.0)),
            segment((1.0, 0.0), (2.0, 1.0)),
            segment((2.0, 1.0), (3.0, 1.0)),
        ];

        let paths = stitch_segments(segments);
        assert_eq!(paths.len(), 1);
        assert!(!paths[0].closed);
        assert_eq!(paths[0].points.len(), 4);
    }

    #[test]
    fn segment_orientation_does_not_matter() {
        // Same triangle, every pair flipped.
        let segments = vec![
            segment((1.0, 0.0), (0.0, 0.0)),
            segment((0.0, 1.0), (1.0, 0.0)),
            segment((0.0, 0.0), (0.0, 1.0)),
        ];

        let paths = stitch_segments(segments);
        assert_eq!(paths.len(), 1);
        assert!(paths[0].closed);
        assert_eq!(paths[0].points.len(), 3);
    }

    #[test]
    fn disjoint_loops_come_out_separately() {
        let unit_square = |dx: f32| {
            vec![
                segment((dx, 0.0), (dx + 1.0, 0.0)),
                segment((dx + 1.0, 0.0), (dx + 1.0, 1.0)),
                segment((dx + 1.0, 1.0), (dx, 1.0)),
                segment((dx, 1.0), (dx, 0.0)),
            ]
        };

        let mut segments = unit_square(0.0);
        segments.extend(unit_square(10.0));

        let paths = stitch_segments(segments);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|path| path.closed));
        assert!(paths.iter().all(|path| path.points.len() == 4));
    }

    #[test]
    fn every_segment_is_consumed_exactly_once() {
        let segments = vec![
            segment((0.0, 0.0), (1.0, 0.0)),
            segment((1.0, 0.0), (1.0, 1.0)),
            segment((5.0, 5.0), (6.0, 5.0)),
            segment((1.0, 1.0), (0.0, 0.0)),
        ];
        let total = segments.len();

        let paths = stitch_segments(segments);
        assert_eq!(paths.iter().map(segments_in).sum::<usize>(), total);
    }

    #[test]
    fn endpoints_within_tolerance_still_chain() {
        let segments = vec![
            segment((0.0, 0.0), (1.0, 0.0)),
            segment((1.0, 1e-4), (1.0, 1.0)),
        ];

        let paths = stitch_segments(segments);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].points.len(), 3);
    }

    #[test]
    fn no_segments_no_paths() {
        assert!(stitch_segments(Vec::new()).is_empty());
    }
}
