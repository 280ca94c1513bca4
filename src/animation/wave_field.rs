use std::ops::Range;

/// A component of the field: `sin(phase) * max_tier * weight`.
struct WaveTerm {
    row: f64,
    col: f64,
    /// How much the distance from the center contributes to the phase.
    distance: f64,
    time: f64,
    weight: f64,
}

const TERMS: [WaveTerm; 6] = [
    // horizontal
    WaveTerm { row: 0.0, col: 0.3, distance: 0.0, time: 2.0, weight: 0.15 },
    // vertical
    WaveTerm { row: 0.25, col: 0.0, distance: 0.0, time: 1.5, weight: 0.12 },
    // diagonal
    WaveTerm { row: 0.2, col: 0.2, distance: 0.0, time: 1.8, weight: 0.10 },
    // radial
    WaveTerm { row: 0.0, col: 0.0, distance: 0.4, time: -2.5, weight: 0.08 },
    // ripple
    WaveTerm { row: 0.8, col: 0.6, distance: 0.0, time: 4.0, weight: 0.05 },
    // detail
    WaveTerm { row: 1.2, col: 1.1, distance: 0.0, time: 3.0, weight: 0.03 },
];

/// A grid of heights made out of overlapping waves.
///
/// Heights live in `[0, max_tier]` and start out at the middle of that range.
#[derive(Clone, Debug)]
pub struct WaveField {
    rows: usize,
    cols: usize,
    max_tier: usize,
    heights: Vec<f64>,
    distances: Vec<f64>,
}

impl WaveField {
    pub fn new(rows: usize, cols: usize, max_tier: usize) -> Self {
        let midpoint = (max_tier / 2) as f64;
        let (center_row, center_col) = ((rows / 2) as f64, (cols / 2) as f64);
        let distances = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row as f64 - center_row).hypot(col as f64 - center_col)))
            .collect();
        Self { rows, cols, max_tier, heights: vec![midpoint; rows * cols], distances }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn midpoint(&self) -> f64 {
        (self.max_tier / 2) as f64
    }

    /// The height at a cell. Cells outside the field sit at the midpoint.
    pub fn height(&self, row: usize, col: usize) -> f64 {
        self.index(row, col).map(|index| self.heights[index]).unwrap_or_else(|| self.midpoint())
    }

    /// The height at a cell rounded to a tier.
    pub fn tier(&self, row: usize, col: usize) -> usize {
        (self.height(row, col).round() as usize).min(self.max_tier)
    }

    /// Distance of a cell from the center of the field.
    pub fn distance(&self, row: usize, col: usize) -> f64 {
        self.index(row, col).map(|index| self.distances[index]).unwrap_or(0.0)
    }

    /// Recompute the heights at time `time` for the rows in `rows`.
    ///
    /// Each row is only evaluated up to its entry in `line_lengths`, rows without an entry are
    /// skipped entirely.
    pub fn propagate(&mut self, time: f64, rows: Range<usize>, line_lengths: &[usize]) {
        let max_tier = self.max_tier as f64;
        let midpoint = self.midpoint();
        for row in rows.start..rows.end.min(self.rows) {
            let Some(length) = line_lengths.get(row) else {
                continue;
            };
            for col in 0..(*length).min(self.cols) {
                let index = row * self.cols + col;
                let (r, c, distance) = (row as f64, col as f64, self.distances[index]);
                let waves: f64 = TERMS
                    .iter()
                    .map(|term| {
                        let phase = r * term.row + c * term.col + distance * term.distance + time * term.time;
                        phase.sin() * max_tier * term.weight
                    })
                    .sum();
                self.heights[index] = (midpoint + waves).clamp(0.0, max_tier);
            }
        }
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }
}
