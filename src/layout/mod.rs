/// Label layout: geometry and overlap-minimising placement.
///
/// Architecture:
/// ```text
///  anchors + measured label sizes
///        │
///        ▼
///   ┌───────────┐
///   │ geometry  │  LabelPos templates → candidate PointLabel boxes
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ placement │  greedy pick + local refinement → one box per anchor
///   └───────────┘
/// ```

pub mod geometry;
pub mod placement;
