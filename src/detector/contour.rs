//! Hierarchical contour extraction (Suzuki–Abe border following).
//!
//! Every border in the mask becomes a [`ContourNode`] in a flat arena. Outer
//! borders of foreground regions and hole borders alternate down the tree, so a
//! finder pattern shows up as outer ring → hole → inner square.
use crate::models::{BitMatrix, Point, PointI};

/// Kind of border a contour follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    /// Outer boundary of a foreground component
    Outer,
    /// Boundary of a background hole inside a foreground component
    Hole,
}

/// One contour in the tree. Links are indices into [`ContourTree::nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContourNode {
    /// Border pixels with collinear runs compressed; implicitly closed
    pub points: Vec<PointI>,
    /// Outer or hole border
    pub kind: BorderKind,
    /// Enclosing contour
    pub parent: Option<usize>,
    /// First enclosed contour
    pub first_child: Option<usize>,
    /// Next contour sharing the same parent
    pub next_sibling: Option<usize>,
}

impl ContourNode {
    /// Outline as floating point vertices
    pub fn outline(&self) -> Vec<Point> {
        self.points.iter().map(|p| p.to_f32()).collect()
    }
}

/// Arena of contours for one binary mask
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourTree {
    nodes: Vec<ContourNode>,
    // Tail of each node's child list, and of the root list, for O(1) appends
    last_child: Vec<Option<usize>>,
    last_root: Option<usize>,
}

impl ContourTree {
    /// All contours in discovery (raster) order
    pub fn nodes(&self) -> &[ContourNode] {
        &self.nodes
    }

    /// Contour by index
    pub fn get(&self, index: usize) -> Option<&ContourNode> {
        self.nodes.get(index)
    }

    /// Number of contours
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the mask had no foreground
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Indices of top-level contours
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.nodes.len()).filter(|&i| self.nodes[i].parent.is_none())
    }

    /// Indices of the direct children of `index`, following sibling links
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let mut next = self.nodes.get(index).and_then(|n| n.first_child);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.nodes[current].next_sibling;
            Some(current)
        })
    }

    /// Depth of `index` below the top level (roots are 0)
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(index).and_then(|n| n.parent);
        while let Some(p) = current {
            depth += 1;
            current = self.nodes[p].parent;
        }
        depth
    }

    fn push(&mut self, points: Vec<PointI>, kind: BorderKind, parent: Option<usize>) {
        let index = self.nodes.len();
        self.nodes.push(ContourNode {
            points,
            kind,
            parent,
            first_child: None,
            next_sibling: None,
        });
        self.last_child.push(None);

        let tail = match parent {
            Some(p) => self.last_child[p].replace(index),
            None => self.last_root.replace(index),
        };
        match (tail, parent) {
            (Some(prev), _) => self.nodes[prev].next_sibling = Some(index),
            (None, Some(p)) => self.nodes[p].first_child = Some(index),
            (None, None) => {}
        }
    }
}

/// Clockwise 8-neighborhood in image coordinates (y grows downward), starting east
const DIRS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

fn dir_index(dx: i32, dy: i32) -> usize {
    DIRS.iter().position(|&d| d == (dx, dy)).unwrap_or(0)
}

/// Padded label image: 0 background, 1 unvisited foreground, ±NBD visited border
struct LabelGrid {
    width: i32,
    labels: Vec<i32>,
}

impl LabelGrid {
    fn from_mask(mask: &BitMatrix) -> Self {
        let width = mask.width() as i32 + 2;
        let height = mask.height() as i32 + 2;
        let mut labels = vec![0i32; (width * height) as usize];
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                if mask.get(x, y) {
                    labels[(y + 1) * width as usize + x + 1] = 1;
                }
            }
        }
        Self { width, labels }
    }

    #[inline]
    fn at(&self, x: i32, y: i32) -> i32 {
        self.labels[(y * self.width + x) as usize]
    }

    #[inline]
    fn set(&mut self, x: i32, y: i32, v: i32) {
        self.labels[(y * self.width + x) as usize] = v;
    }
}

/// Extract the full contour hierarchy of `mask`.
pub fn extract_contours(mask: &BitMatrix) -> ContourTree {
    let mut tree = ContourTree::default();
    if mask.is_empty() {
        return tree;
    }

    let mut grid = LabelGrid::from_mask(mask);
    let (w, h) = (mask.width() as i32, mask.height() as i32);

    // Border number 1 is the frame; real borders start at 2 and map to arena index nbd - 2
    let mut nbd: i32 = 1;

    for y in 1..=h {
        let mut lnbd: i32 = 1;
        for x in 1..=w {
            let f = grid.at(x, y);
            if f == 0 {
                continue;
            }

            let start = if f == 1 && grid.at(x - 1, y) == 0 {
                Some((BorderKind::Outer, (x - 1, y)))
            } else if f >= 1 && grid.at(x + 1, y) == 0 {
                if f > 1 {
                    lnbd = f;
                }
                Some((BorderKind::Hole, (x + 1, y)))
            } else {
                None
            };

            if let Some((kind, from)) = start {
                nbd += 1;
                let parent = border_parent(&tree, kind, lnbd);
                let raw = follow_border(&mut grid, (x, y), from, nbd);
                let points = compress_collinear(&raw);
                tree.push(points, kind, parent);
            }

            let f = grid.at(x, y);
            if f != 1 {
                lnbd = f.abs();
            }
        }
    }

    tree
}

/// Parent of a new border given the last border met on this row (`lnbd`)
fn border_parent(tree: &ContourTree, kind: BorderKind, lnbd: i32) -> Option<usize> {
    if lnbd <= 1 {
        // The frame acts as a hole border with no parent
        return None;
    }
    let prev_index = (lnbd - 2) as usize;
    let prev = tree.get(prev_index)?;
    match (kind, prev.kind) {
        (BorderKind::Outer, BorderKind::Outer) | (BorderKind::Hole, BorderKind::Hole) => prev.parent,
        (BorderKind::Outer, BorderKind::Hole) | (BorderKind::Hole, BorderKind::Outer) => Some(prev_index),
    }
}

/// Trace one border starting at `start`, entering from background neighbor `from`.
/// Returns border pixels in unpadded image coordinates.
fn follow_border(grid: &mut LabelGrid, start: (i32, i32), from: (i32, i32), nbd: i32) -> Vec<PointI> {
    let (sx, sy) = start;
    let to_image = |x: i32, y: i32| PointI::new(x - 1, y - 1);

    // Clockwise search for the first foreground neighbor
    let d0 = dir_index(from.0 - sx, from.1 - sy);
    let first = (0..8).map(|k| (d0 + k) % 8).find(|&d| {
        let (dx, dy) = DIRS[d];
        grid.at(sx + dx, sy + dy) != 0
    });

    let Some(d1) = first else {
        // Isolated pixel
        grid.set(sx, sy, -nbd);
        return vec![to_image(sx, sy)];
    };

    let p1 = (sx + DIRS[d1].0, sy + DIRS[d1].1);
    let mut p2 = p1;
    let mut p3 = start;
    let mut points = Vec::new();

    loop {
        points.push(to_image(p3.0, p3.1));

        // Counter-clockwise search around p3, starting just after p2
        let back = dir_index(p2.0 - p3.0, p2.1 - p3.1);
        let mut east_examined_zero = false;
        let mut p4 = p3;
        for k in 1..=8 {
            let d = (back + 8 - k) % 8;
            let (dx, dy) = DIRS[d];
            let (nx, ny) = (p3.0 + dx, p3.1 + dy);
            if grid.at(nx, ny) != 0 {
                p4 = (nx, ny);
                break;
            }
            if d == 0 {
                east_examined_zero = true;
            }
        }

        if east_examined_zero {
            grid.set(p3.0, p3.1, -nbd);
        } else if grid.at(p3.0, p3.1) == 1 {
            grid.set(p3.0, p3.1, nbd);
        }

        if p4 == start && p3 == p1 {
            break;
        }
        p2 = p3;
        p3 = p4;
    }

    points
}

/// Drop points that continue a straight horizontal, vertical or diagonal run
fn compress_collinear(points: &[PointI]) -> Vec<PointI> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }
    let step = |a: PointI, b: PointI| ((b.x - a.x).signum(), (b.y - a.y).signum());

    let kept: Vec<PointI> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() { points.to_vec() } else { kept }
}
