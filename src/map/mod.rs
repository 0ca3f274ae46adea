use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::GameConfig;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Floor,
    Border,
    Water,
    ObstacleLeft,
    ObstacleRight,
    BossMarker,
}

impl Cell {
    pub fn is_passable(&self) -> bool {
        matches!(self, Cell::Floor | Cell::Water | Cell::BossMarker)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cell::Floor => "floor",
            Cell::Border => "border",
            Cell::Water => "water",
            Cell::ObstacleLeft | Cell::ObstacleRight => "obstacle",
            Cell::BossMarker => "boss marker",
        }
    }
}

/// A boss distance is every full `interval` of climbing, never the start.
pub fn is_boss_distance(world_offset: u32, interval: u32) -> bool {
    interval > 0 && world_offset >= interval && world_offset % interval == 0
}

/// Produces one row of terrain at a time from the session RNG.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    pub width: i32,
    pub obstacle_percent: i32,
    pub hazard_percent: i32,
    pub boss_interval: u32,
    pub boss_band_half_width: i32,
}

impl TerrainGenerator {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            width: config.map_width,
            obstacle_percent: config.obstacle_percent,
            hazard_percent: config.hazard_percent,
            boss_interval: config.boss_interval,
            boss_band_half_width: config.boss_band_half_width,
        }
    }

    /// Inclusive column range of the boss band, clipped to the interior.
    pub fn boss_band(&self) -> (i32, i32) {
        let center = self.width / 2;
        let lo = (center - self.boss_band_half_width).max(1);
        let hi = (center + self.boss_band_half_width).min(self.width - 2);
        (lo, hi)
    }

    pub fn boss_marker_column(&self) -> i32 {
        self.width / 2
    }

    pub fn generate_row(&self, rng: &mut RandomNumberGenerator, world_offset: u32) -> Vec<Cell> {
        let width = self.width as usize;
        let mut row = vec![Cell::Floor; width];
        row[0] = Cell::Border;
        row[width - 1] = Cell::Border;

        let boss_room = is_boss_distance(world_offset, self.boss_interval);
        let (band_lo, band_hi) = self.boss_band();
        if boss_room {
            debug!(world_offset, "generating boss room row");
        }

        let mut x = 1;
        while x < self.width - 1 {
            if boss_room && x >= band_lo && x <= band_hi {
                row[x as usize] = if x == self.boss_marker_column() {
                    Cell::BossMarker
                } else {
                    Cell::Floor
                };
                x += 1;
                continue;
            }

            let roll = rng.range(0, 100);
            if roll < self.obstacle_percent {
                // A pair needs x + 1 to stay inside the right border.
                if x + 1 < self.width - 1 && !(boss_room && x + 1 >= band_lo && x + 1 <= band_hi)
                {
                    row[x as usize] = Cell::ObstacleLeft;
                    row[x as usize + 1] = Cell::ObstacleRight;
                    x += 2;
                    continue;
                }
                row[x as usize] = Cell::Floor;
            } else if roll < self.obstacle_percent + self.hazard_percent {
                row[x as usize] = Cell::Water;
            }
            x += 1;
        }

        row
    }
}

/// The visible window over the endless vertical world. Row 0 is the top.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub cells: Vec<Cell>,
}

impl Viewport {
    /// Border columns with open floor between them.
    pub fn open(width: i32, height: i32) -> Self {
        let mut cells = vec![Cell::Floor; (width * height) as usize];
        for y in 0..height {
            cells[(y * width) as usize] = Cell::Border;
            cells[(y * width + width - 1) as usize] = Cell::Border;
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn generate(
        generator: &TerrainGenerator,
        height: i32,
        rng: &mut RandomNumberGenerator,
        world_offset: u32,
    ) -> Self {
        let mut cells = Vec::with_capacity((generator.width * height) as usize);
        for _ in 0..height {
            cells.extend(generator.generate_row(rng, world_offset));
        }
        Self {
            width: generator.width,
            height,
            cells,
        }
    }

    /// Rebuilds a viewport from row-major cells; `None` if the sizes disagree.
    pub fn from_cells(width: i32, height: i32, cells: Vec<Cell>) -> Option<Self> {
        let expected = width.checked_mul(height)?;
        if width <= 0 || height <= 0 || cells.len() != expected as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(Point::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn in_bounds(&self, point: Point) -> bool {
        point.x >= 0 && point.x < self.width && point.y >= 0 && point.y < self.height
    }

    pub fn cell_at(&self, point: Point) -> Option<Cell> {
        self.idx(point.x, point.y).map(|idx| self.cells[idx])
    }

    pub fn set_cell(&mut self, point: Point, cell: Cell) {
        if let Some(idx) = self.idx(point.x, point.y) {
            self.cells[idx] = cell;
        }
    }

    pub fn is_passable(&self, point: Point) -> bool {
        self.cell_at(point).is_some_and(|cell| cell.is_passable())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width as usize)
    }

    pub fn find(&self, wanted: Cell) -> Option<Point> {
        self.cells
            .iter()
            .position(|cell| *cell == wanted)
            .map(|idx| Point::new(idx as i32 % self.width, idx as i32 / self.width))
    }

    /// Drops the bottom row, moves every row down one and installs `row` on top.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.width as usize);
        let width = self.width as usize;
        self.cells.rotate_right(width);
        self.cells[..width].copy_from_slice(&row[..width]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::from_config(&GameConfig::default())
    }

    #[test]
    fn borders_are_always_impassable() {
        let generator = generator();
        for seed in 0..20 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            for offset in [0, 17, 200, 401] {
                let row = generator.generate_row(&mut rng, offset);
                assert_eq!(row.len(), generator.width as usize);
                assert_eq!(row[0], Cell::Border);
                assert_eq!(row[row.len() - 1], Cell::Border);
                assert!(!row[0].is_passable());
            }
        }
    }

    #[test]
    fn obstacle_halves_always_pair_up() {
        let generator = TerrainGenerator {
            obstacle_percent: 60,
            ..generator()
        };
        let mut rng = RandomNumberGenerator::seeded(7);
        for _ in 0..200 {
            let row = generator.generate_row(&mut rng, 3);
            for (x, cell) in row.iter().enumerate() {
                match cell {
                    Cell::ObstacleLeft => assert_eq!(row[x + 1], Cell::ObstacleRight),
                    Cell::ObstacleRight => assert_eq!(row[x - 1], Cell::ObstacleLeft),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn clipped_pair_degrades_to_floor() {
        let generator = TerrainGenerator {
            width: 5,
            obstacle_percent: 100,
            hazard_percent: 0,
            ..generator()
        };
        let mut rng = RandomNumberGenerator::seeded(1);
        let row = generator.generate_row(&mut rng, 1);
        assert_eq!(
            row,
            vec![
                Cell::Border,
                Cell::ObstacleLeft,
                Cell::ObstacleRight,
                Cell::Floor,
                Cell::Border
            ]
        );
    }

    #[test]
    fn boss_room_band_is_open_with_one_marker() {
        let generator = TerrainGenerator {
            obstacle_percent: 50,
            hazard_percent: 50,
            ..generator()
        };
        let mut rng = RandomNumberGenerator::seeded(99);
        let row = generator.generate_row(&mut rng, 200);
        let (lo, hi) = generator.boss_band();
        for x in lo..=hi {
            let expected = if x == generator.boss_marker_column() {
                Cell::BossMarker
            } else {
                Cell::Floor
            };
            assert_eq!(row[x as usize], expected, "column {x}");
        }
        assert_eq!(
            row.iter().filter(|cell| **cell == Cell::BossMarker).count(),
            1
        );
    }

    #[test]
    fn boss_distance_requires_a_full_interval() {
        assert!(!is_boss_distance(0, 200));
        assert!(!is_boss_distance(199, 200));
        assert!(is_boss_distance(200, 200));
        assert!(is_boss_distance(400, 200));
        assert!(!is_boss_distance(401, 200));
        assert!(!is_boss_distance(5, 0));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert!(Viewport::from_cells(i32::MAX, 3, vec![Cell::Floor; 4]).is_none());
        assert!(Viewport::from_cells(3, 2, vec![Cell::Floor; 5]).is_none());
        assert!(Viewport::from_cells(3, 2, vec![Cell::Floor; 6]).is_some());
    }

    #[test]
    fn no_boss_room_before_first_interval() {
        let generator = generator();
        let mut rng = RandomNumberGenerator::seeded(3);
        let row = generator.generate_row(&mut rng, 0);
        assert!(!row.contains(&Cell::BossMarker));
    }

    #[test]
    fn push_row_shifts_everything_down() {
        let mut viewport = Viewport::open(6, 4);
        viewport.set_cell(Point::new(2, 0), Cell::Water);
        viewport.set_cell(Point::new(3, 3), Cell::Water);

        let fresh = vec![
            Cell::Border,
            Cell::ObstacleLeft,
            Cell::ObstacleRight,
            Cell::Floor,
            Cell::Floor,
            Cell::Border,
        ];
        viewport.push_row(fresh.clone());

        let rows: Vec<&[Cell]> = viewport.rows().collect();
        assert_eq!(rows[0], fresh.as_slice());
        assert_eq!(viewport.cell_at(Point::new(2, 1)), Some(Cell::Water));
        // The old bottom row is gone.
        assert!(!rows[3].contains(&Cell::Water));
        assert_eq!(viewport.cells.len(), 24);
    }

    #[test]
    fn out_of_bounds_is_not_passable() {
        let viewport = Viewport::open(6, 4);
        assert!(!viewport.is_passable(Point::new(-1, 0)));
        assert!(!viewport.is_passable(Point::new(2, 4)));
        assert!(!viewport.is_passable(Point::new(0, 1)));
        assert!(viewport.is_passable(Point::new(1, 1)));
    }
}
