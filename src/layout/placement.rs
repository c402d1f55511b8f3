// Greedy label placement with local refinement.
//
// Every anchor gets one box chosen from a fixed list of templates:
// 1. instantiate every template per anchor, drop boxes outside the drawing area
// 2. seed each candidate's penalty with its template preference plus the share
//    of its area covered by other anchors' candidates
// 3. greedily fix the cheapest candidate, withdraw its siblings and discount
//    the overlap they contributed to everyone else
// 4. revisit each anchor against the boxes actually chosen for the others,
//    for at most MAX_REFINEMENT_PASSES passes
//
// Candidates live in a flat arena addressed by index; anchors are addressed by
// their position in the request slice.

use super::geometry::{LabelPos, Point2D, PointLabel, Rect};

/// Upper bound on local-refinement passes.
const MAX_REFINEMENT_PASSES: usize = 3;

/// One label to place: its anchor and the measured size of its text box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRequest {
    pub anchor: Point2D,
    pub width: f64,
    pub height: f64,
}

impl LabelRequest {
    pub fn new(anchor: Point2D, width: f64, height: f64) -> Self {
        LabelRequest {
            anchor,
            width,
            height,
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    anchor: usize,
    label: PointLabel,
}

/// Chosen label per request; requests without a feasible box are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placement {
    labels: Vec<Option<PointLabel>>,
}

impl Placement {
    /// Label chosen for the request at `index`.
    pub fn get(&self, index: usize) -> Option<&PointLabel> {
        self.labels.get(index).and_then(Option::as_ref)
    }

    /// Label chosen for an anchor, matched by exact coordinates.
    pub fn label_for(&self, anchor: Point2D) -> Option<&PointLabel> {
        self.iter()
            .find(|(_, label)| label.anchor == anchor)
            .map(|(_, label)| label)
    }

    /// `(request index, label)` pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PointLabel)> {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.as_ref().map(|l| (i, l)))
    }

    /// Number of placed labels.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Places labels inside a drawing area using a fixed set of templates.
#[derive(Debug, Clone)]
pub struct LabelPlacer {
    space: f64,
    area: Rect,
    templates: Vec<LabelPos>,
}

impl LabelPlacer {
    /// Placer trying the "above" template family.
    pub fn new(space: f64, area: Rect) -> Self {
        LabelPlacer::with_templates(space, area, LabelPos::ABOVE.to_vec())
    }

    pub fn with_templates(space: f64, area: Rect, templates: Vec<LabelPos>) -> Self {
        debug_assert!(
            !templates.is_empty(),
            "at least one label template is required"
        );
        LabelPlacer {
            space,
            area,
            templates,
        }
    }

    pub fn area(&self) -> &Rect {
        &self.area
    }

    /// Choose one box per request.
    pub fn place(&self, requests: &[LabelRequest]) -> Placement {
        let (mut candidates, by_anchor) = self.generate_candidates(requests);
        seed_penalties(&mut candidates);
        let mut assigned = greedy_assign(&mut candidates, &by_anchor);
        refine(&candidates, &by_anchor, &mut assigned);

        let labels: Vec<Option<PointLabel>> = assigned
            .iter()
            .enumerate()
            .map(|(anchor, &chosen)| {
                chosen.map(|c| {
                    let mut label = candidates[c].label.clone();
                    label.reset_penalty();
                    label.add_penalty(overlap_with_assigned(&candidates, &assigned, anchor, c));
                    label
                })
            })
            .collect();

        let placement = Placement { labels };
        log::debug!(
            "placed {} of {} labels from {} candidates",
            placement.len(),
            requests.len(),
            candidates.len()
        );
        placement
    }

    fn generate_candidates(&self, requests: &[LabelRequest]) -> (Vec<Candidate>, Vec<Vec<usize>>) {
        let mut candidates = Vec::with_capacity(requests.len() * self.templates.len());
        let mut by_anchor: Vec<Vec<usize>> = vec![Vec::new(); requests.len()];

        for (anchor, req) in requests.iter().enumerate() {
            for &pos in &self.templates {
                let label = PointLabel::new(req.anchor, pos, req.width, req.height, self.space);
                if !self.area.contains_rect(label.rect()) {
                    continue;
                }
                by_anchor[anchor].push(candidates.len());
                candidates.push(Candidate { anchor, label });
            }
            if by_anchor[anchor].is_empty() {
                log::trace!(
                    "no template fits label at ({:.1}, {:.1})",
                    req.anchor.x,
                    req.anchor.y
                );
            }
        }
        (candidates, by_anchor)
    }
}

/// Add to every candidate the overlap it has with all other anchors' candidates.
fn seed_penalties(candidates: &mut [Candidate]) {
    let deltas: Vec<f64> = candidates
        .iter()
        .map(|c| {
            candidates
                .iter()
                .filter(|other| other.anchor != c.anchor)
                .map(|other| c.label.overlap_fraction(&other.label))
                .sum()
        })
        .collect();
    for (candidate, delta) in candidates.iter_mut().zip(deltas) {
        candidate.label.add_penalty(delta);
    }
}

/// Repeatedly fix the cheapest open candidate. Returns the chosen candidate
/// index per anchor.
fn greedy_assign(candidates: &mut [Candidate], by_anchor: &[Vec<usize>]) -> Vec<Option<usize>> {
    let mut open = vec![true; candidates.len()];
    let mut assigned: Vec<Option<usize>> = vec![None; by_anchor.len()];

    loop {
        // First minimum wins, so ties go to the lower index.
        let best = (0..candidates.len())
            .filter(|&i| open[i])
            .min_by(|&a, &b| {
                candidates[a]
                    .label
                    .penalty()
                    .total_cmp(&candidates[b].label.penalty())
            });
        let Some(best) = best else {
            break;
        };

        let anchor = candidates[best].anchor;
        assigned[anchor] = Some(best);

        let withdrawn: Vec<usize> = by_anchor[anchor]
            .iter()
            .copied()
            .filter(|&i| open[i] && i != best)
            .collect();
        for &i in &by_anchor[anchor] {
            open[i] = false;
        }

        for k in 0..candidates.len() {
            if !open[k] {
                continue;
            }
            let relief: f64 = withdrawn
                .iter()
                .map(|&r| candidates[k].label.overlap_fraction(&candidates[r].label))
                .sum();
            candidates[k].label.add_penalty(-relief);
        }
    }
    assigned
}

/// Overlap share of candidate `c` against the boxes assigned to every other anchor.
fn overlap_with_assigned(
    candidates: &[Candidate],
    assigned: &[Option<usize>],
    anchor: usize,
    c: usize,
) -> f64 {
    assigned
        .iter()
        .enumerate()
        .filter(|&(other, _)| other != anchor)
        .filter_map(|(_, chosen)| *chosen)
        .map(|j| candidates[c].label.overlap_fraction(&candidates[j].label))
        .sum()
}

/// Move each anchor to its cheapest template given everyone else's current box.
/// A move within a pass is not revisited until the next pass.
fn refine(candidates: &[Candidate], by_anchor: &[Vec<usize>], assigned: &mut [Option<usize>]) {
    let cost = |assigned: &[Option<usize>], anchor: usize, c: usize| {
        candidates[c].label.pos.penalty() + overlap_with_assigned(candidates, assigned, anchor, c)
    };

    for pass in 0..MAX_REFINEMENT_PASSES {
        let mut moved = 0;
        for anchor in 0..by_anchor.len() {
            let Some(current) = assigned[anchor] else {
                continue;
            };
            let mut best = current;
            let mut best_cost = cost(&*assigned, anchor, current);
            for &c in &by_anchor[anchor] {
                let candidate_cost = cost(&*assigned, anchor, c);
                if candidate_cost < best_cost {
                    best = c;
                    best_cost = candidate_cost;
                }
            }
            if best != current {
                assigned[anchor] = Some(best);
                moved += 1;
            }
        }
        log::trace!("refinement pass {pass}: {moved} labels moved");
        if moved == 0 {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(0.0, 0.0, 1000.0, 1000.0)
    }

    fn assert_inside(placement: &Placement, bounds: &Rect) {
        for (_, label) in placement.iter() {
            let min = label.min_loc();
            let max = label.max_loc();
            assert!(min.x >= bounds.min_x && min.y >= bounds.min_y);
            assert!(max.x <= bounds.max_x && max.y <= bounds.max_y);
        }
    }

    fn total_overlap(placement: &Placement) -> f64 {
        let labels: Vec<&PointLabel> = placement.iter().map(|(_, l)| l).collect();
        let mut total = 0.0;
        for i in 0..labels.len() {
            for j in (i + 1)..labels.len() {
                total += labels[i].rect().intersection_area(labels[j].rect());
            }
        }
        total
    }

    #[test]
    fn test_single_anchor_prefers_centered_above() {
        let placer = LabelPlacer::new(2.0, area());
        let request = LabelRequest::new(Point2D::new(500.0, 500.0), 20.0, 10.0);
        let placement = placer.place(&[request]);
        let label = placement.get(0).unwrap();
        assert_eq!(label.pos, LabelPos::Above);
        assert_eq!(label.min_loc(), Point2D::new(490.0, 488.0));
        assert_eq!(label.link_point(), None);
        assert_eq!(label.penalty(), 0.0);
    }

    #[test]
    fn test_close_anchors_get_disjoint_boxes() {
        let a = Point2D::new(100.0, 500.0);
        let b = Point2D::new(108.0, 500.0);
        let requests = [
            LabelRequest::new(a, 20.0, 10.0),
            LabelRequest::new(b, 20.0, 10.0),
        ];

        // Both centred boxes would collide
        let ca = PointLabel::new(a, LabelPos::Above, 20.0, 10.0, 2.0);
        let cb = PointLabel::new(b, LabelPos::Above, 20.0, 10.0, 2.0);
        assert!(ca.rect().intersection_area(cb.rect()) > 0.0);

        let placement = LabelPlacer::new(2.0, area()).place(&requests);
        assert_eq!(placement.len(), 2);
        assert_eq!(total_overlap(&placement), 0.0);
        assert!(placement.label_for(a).is_some());
        assert!(placement.label_for(b).is_some());
        assert!(placement.iter().any(|(_, l)| l.link_point().is_some()));
    }

    #[test]
    fn test_infeasible_anchor_is_dropped() {
        let bounds = Rect::new(0.0, 0.0, 5.0, 5.0);
        let placer = LabelPlacer::new(0.5, bounds);
        let small = LabelRequest::new(Point2D::new(2.5, 4.5), 1.0, 1.0);
        let huge = LabelRequest::new(Point2D::new(1.0, 4.0), 50.0, 50.0);

        let alone = placer.place(&[small]);
        let together = placer.place(&[small, huge]);

        assert_eq!(together.len(), 1);
        assert!(together.get(1).is_none());
        assert_eq!(together.get(0), alone.get(0));
        assert_inside(&together, &bounds);
    }

    #[test]
    fn test_boxes_stay_inside_area() {
        let bounds = Rect::new(0.0, 0.0, 200.0, 100.0);
        let requests: Vec<LabelRequest> = (0..12)
            .map(|i| {
                let x = 5.0 + i as f64 * 16.0;
                let y = 40.0 + (i % 3) as f64 * 25.0;
                LabelRequest::new(Point2D::new(x, y), 24.0, 8.0)
            })
            .collect();

        let placement = LabelPlacer::new(2.0, bounds).place(&requests);
        assert!(!placement.is_empty());
        assert_inside(&placement, &bounds);
    }

    #[test]
    fn test_placement_is_deterministic() {
        let requests: Vec<LabelRequest> = (0..20)
            .map(|i| {
                let x = 100.0 + (i * 37 % 200) as f64;
                let y = 300.0 + (i * 53 % 120) as f64;
                LabelRequest::new(Point2D::new(x, y), 18.0 + (i % 4) as f64 * 6.0, 10.0)
            })
            .collect();
        let placer = LabelPlacer::new(2.0, area());
        assert_eq!(placer.place(&requests), placer.place(&requests));
    }

    #[test]
    fn test_restricted_templates() {
        let placer = LabelPlacer::with_templates(2.0, area(), vec![LabelPos::AboveLeft1]);
        let request = LabelRequest::new(Point2D::new(50.0, 50.0), 10.0, 10.0);
        let placement = placer.place(&[request]);
        assert_eq!(placement.get(0).unwrap().pos, LabelPos::AboveLeft1);
    }

    fn prepared(
        placer: &LabelPlacer,
        requests: &[LabelRequest],
    ) -> (Vec<Candidate>, Vec<Vec<usize>>) {
        let (mut candidates, by_anchor) = placer.generate_candidates(requests);
        seed_penalties(&mut candidates);
        (candidates, by_anchor)
    }

    #[test]
    fn test_seeded_penalty_sums_overlap_shares() {
        // Same row, right-hand boxes 20 wide: A∩B = 10, A∩C = B∩C = 15
        let requests = [
            LabelRequest::new(Point2D::new(100.0, 500.0), 20.0, 10.0),
            LabelRequest::new(Point2D::new(110.0, 500.0), 20.0, 10.0),
            LabelRequest::new(Point2D::new(105.0, 500.0), 20.0, 10.0),
        ];
        let placer = LabelPlacer::with_templates(2.0, area(), vec![LabelPos::AboveRight1]);
        let (candidates, _) = prepared(&placer, &requests);

        let seeded: Vec<f64> = candidates.iter().map(|c| c.label.penalty()).collect();
        let expected = [0.3 + 0.5 + 0.75, 0.3 + 0.5 + 0.75, 0.3 + 0.75 + 0.75];
        for (got, want) in seeded.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} != {want}");
        }
    }

    #[test]
    fn test_withdrawn_siblings_relieve_overlap() {
        // A's right box clips B's centred box by 2 units (0.1 of its area)
        let requests = [
            LabelRequest::new(Point2D::new(100.0, 500.0), 20.0, 10.0),
            LabelRequest::new(Point2D::new(130.0, 500.0), 20.0, 10.0),
        ];
        let placer = LabelPlacer::with_templates(
            2.0,
            area(),
            vec![LabelPos::Above, LabelPos::AboveRight1],
        );
        let (mut candidates, by_anchor) = prepared(&placer, &requests);
        assert_eq!(candidates[2].label.pos, LabelPos::Above);
        assert_eq!(candidates[2].label.penalty(), 0.1);
        assert_eq!(candidates[3].label.penalty(), 0.3);

        let assigned = greedy_assign(&mut candidates, &by_anchor);

        // A keeps its centred box, so its right box is withdrawn and B's
        // centred box no longer pays for it
        assert_eq!(assigned, vec![Some(0), Some(2)]);
        assert_eq!(candidates[2].label.penalty(), 0.0);
        assert_eq!(candidates[3].label.penalty(), 0.3);
    }

    #[test]
    fn test_refinement_moves_greedy_choice() {
        let a = Point2D::new(108.0, 490.0);
        let b = Point2D::new(92.0, 490.0);
        let requests = [
            LabelRequest::new(a, 20.0, 10.0),
            LabelRequest::new(b, 20.0, 10.0),
        ];
        let placer = LabelPlacer::new(2.0, area());

        // Greedy fixes A on its right before B settles, because A's centred
        // box still pays for overlapping B's unchosen candidates
        let (mut candidates, by_anchor) = prepared(&placer, &requests);
        let mut assigned = greedy_assign(&mut candidates, &by_anchor);
        let greedy_a = assigned[0].map(|c| candidates[c].label.pos);
        let greedy_b = assigned[1].map(|c| candidates[c].label.pos);
        assert_eq!(greedy_a, Some(LabelPos::AboveRight1));
        assert_eq!(greedy_b, Some(LabelPos::Above));

        refine(&candidates, &by_anchor, &mut assigned);
        assert_eq!(
            assigned[0].map(|c| candidates[c].label.pos),
            Some(LabelPos::Above)
        );

        // Centred boxes [98, 118] and [82, 102] share 4 of 20 units
        let placement = placer.place(&requests);
        let label_a = placement.get(0).unwrap();
        let label_b = placement.get(1).unwrap();
        assert_eq!(label_a.pos, LabelPos::Above);
        assert_eq!(label_b.pos, LabelPos::Above);
        assert!((label_a.penalty() - 0.2).abs() < 1e-12);
        assert!((label_b.penalty() - 0.2).abs() < 1e-12);
        assert!(label_a.penalty() < LabelPos::AboveRight1.penalty());
    }

    #[test]
    fn test_empty_input() {
        let placement = LabelPlacer::new(2.0, area()).place(&[]);
        assert!(placement.is_empty());
    }
}
