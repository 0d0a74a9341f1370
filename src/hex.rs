//! Axial hex coordinate math for the strategic map
//!
//! Coordinates follow the axial (q, r) system with flat-top pixel layout.

use serde::{Deserialize, Serialize};

/// The six axial direction offsets, east-first, counter-clockwise winding.
const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Axial hex coordinate (q, r system)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32, // Column
    pub r: i32, // Row
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Get all 6 adjacent hexes
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let mut out = [*self; 6];
        for (i, (dq, dr)) in DIRECTIONS.iter().enumerate() {
            out[i] = HexCoord::new(self.q + dq, self.r + dr);
        }
        out
    }

    /// Neighbor in a specific direction (0 = east, winding counter-clockwise)
    pub fn neighbor(&self, direction: usize) -> HexCoord {
        let (dq, dr) = DIRECTIONS[direction % 6];
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Distance in hex steps using the axial coordinate formula
    pub fn distance(&self, other: HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = ((self.q + self.r) - (other.q + other.r)).abs();
        (dq + dr + ds) / 2
    }

    /// Convert to cube coordinates for certain calculations
    pub fn to_cube(&self) -> (i32, i32, i32) {
        let x = self.q;
        let z = self.r;
        let y = -x - z;
        (x, y, z)
    }

    /// All hexes within `radius` steps of this one, including itself
    pub fn range(&self, radius: i32) -> Vec<HexCoord> {
        let mut results = Vec::new();
        for q in -radius..=radius {
            let r1 = (-radius).max(-q - radius);
            let r2 = radius.min(-q + radius);
            for r in r1..=r2 {
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }

    /// Hexes forming the ring at exactly `radius` steps
    pub fn ring(&self, radius: i32) -> Vec<HexCoord> {
        if radius == 0 {
            return vec![*self];
        }

        let mut results = Vec::new();
        // Start at the ring corner east of center and walk around
        let mut hex = HexCoord::new(self.q + radius, self.r - radius);
        for direction in 0..6 {
            for _ in 0..radius {
                results.push(hex);
                hex = hex.neighbor(direction);
            }
        }
        results
    }

    /// Spiral of hexes out to `max_radius`, center first
    pub fn spiral(&self, max_radius: i32) -> Vec<HexCoord> {
        let mut results = vec![*self];
        for radius in 1..=max_radius {
            results.extend(self.ring(radius));
        }
        results
    }

    /// Line of hexes from this coordinate to `other`, endpoints included
    pub fn line_to(&self, other: HexCoord) -> Vec<HexCoord> {
        let distance = self.distance(other);
        let mut results = Vec::with_capacity(distance as usize + 1);
        for i in 0..=distance {
            let t = if distance == 0 { 0.0 } else { i as f32 / distance as f32 };
            let fq = self.q as f32 * (1.0 - t) + other.q as f32 * t;
            let fr = self.r as f32 * (1.0 - t) + other.r as f32 * t;
            results.push(HexCoord::round(fq, fr));
        }
        results
    }

    /// Round fractional axial coordinates to the nearest hex
    pub fn round(fq: f32, fr: f32) -> HexCoord {
        let fs = -fq - fr;

        let mut rq = fq.round();
        let mut rr = fr.round();
        let rs = fs.round();

        let q_diff = (rq - fq).abs();
        let r_diff = (rr - fr).abs();
        let s_diff = (rs - fs).abs();

        if q_diff > r_diff && q_diff > s_diff {
            rq = -rr - rs;
        } else if r_diff > s_diff {
            rr = -rq - rs;
        }

        HexCoord::new(rq as i32, rr as i32)
    }

    /// Pixel position of this hex center (flat-top layout)
    pub fn to_pixel(&self, size: f32) -> (f32, f32) {
        let sqrt3 = 3.0_f32.sqrt();
        let x = size * (1.5 * self.q as f32);
        let y = size * (sqrt3 / 2.0 * self.q as f32 + sqrt3 * self.r as f32);
        (x, y)
    }

    /// Hex containing a pixel position (flat-top layout)
    pub fn from_pixel(x: f32, y: f32, size: f32) -> HexCoord {
        let sqrt3 = 3.0_f32.sqrt();
        let fq = (2.0 / 3.0 * x) / size;
        let fr = (-1.0 / 3.0 * x + sqrt3 / 3.0 * y) / size;
        HexCoord::round(fq, fr)
    }

    /// Convert to odd-r offset coordinates (for rectangular grids)
    pub fn to_offset(&self) -> (i32, i32) {
        let col = self.q + (self.r + (self.r & 1)).div_euclid(2);
        (col, self.r)
    }

    /// Convert odd-r offset coordinates back to axial
    pub fn from_offset(col: i32, row: i32) -> HexCoord {
        let q = col - (row + (row & 1)).div_euclid(2);
        HexCoord::new(q, row)
    }

    /// Check whether this hex falls inside a rectangular offset grid
    pub fn in_bounds(&self, width: i32, height: i32) -> bool {
        let (col, row) = self.to_offset();
        col >= 0 && col < width && row >= 0 && row < height
    }
}

/// Center of mass of a set of hexes, rounded to the nearest hex
pub fn center_of_mass(hexes: &[HexCoord]) -> HexCoord {
    if hexes.is_empty() {
        return HexCoord::new(0, 0);
    }

    let total_q: i32 = hexes.iter().map(|h| h.q).sum();
    let total_r: i32 = hexes.iter().map(|h| h.r).sum();
    HexCoord::round(
        total_q as f32 / hexes.len() as f32,
        total_r as f32 / hexes.len() as f32,
    )
}
