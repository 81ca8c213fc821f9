use scene::DispatchRounding;

/// Number of work groups per dimension for one compute dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupGrid {
    pub x: u32,
    pub y: u32,
}

/// Sizes the dispatch grid so the kernel's tiles cover the whole framebuffer.
///
/// The tile size comes from the kernel's `@workgroup_size` and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPlanner {
    tile: (u32, u32),
    rounding: DispatchRounding,
}

impl DispatchPlanner {
    pub fn new(workgroup_size: [u32; 3], rounding: DispatchRounding) -> Self {
        Self {
            tile: (workgroup_size[0].max(1), workgroup_size[1].max(1)),
            rounding,
        }
    }

    pub fn tile_size(&self) -> (u32, u32) {
        self.tile
    }

    pub fn plan(&self, width: u32, height: u32) -> WorkgroupGrid {
        let (width, height) = match self.rounding {
            DispatchRounding::TileMultiple => (width, height),
            DispatchRounding::PowerOfTwo => (width.next_power_of_two(), height.next_power_of_two()),
        };
        WorkgroupGrid {
            x: width.div_ceil(self.tile.0),
            y: height.div_ceil(self.tile.1),
        }
    }

    /// Pixels covered by `grid`.
    pub fn coverage(&self, grid: WorkgroupGrid) -> (u32, u32) {
        (grid.x * self.tile.0, grid.y * self.tile.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_multiple() {
        let planner = DispatchPlanner::new([32, 32, 1], DispatchRounding::TileMultiple);
        assert_eq!(planner.plan(1024, 768), WorkgroupGrid { x: 32, y: 24 });
        assert_eq!(planner.plan(1025, 769), WorkgroupGrid { x: 33, y: 25 });
        assert_eq!(planner.plan(1, 1), WorkgroupGrid { x: 1, y: 1 });
    }

    #[test]
    fn test_grid_covers_framebuffer() {
        for rounding in [DispatchRounding::TileMultiple, DispatchRounding::PowerOfTwo] {
            for tile in [[16, 8, 1], [32, 32, 1], [7, 3, 1], [64, 1, 1]] {
                let planner = DispatchPlanner::new(tile, rounding);
                for width in (1..2100).step_by(37) {
                    for height in (1..1300).step_by(29) {
                        let grid = planner.plan(width, height);
                        let (covered_x, covered_y) = planner.coverage(grid);
                        assert!(covered_x >= width && covered_y >= height, "{:?} {:?} {}x{}", rounding, tile, width, height);
                    }
                }
            }
        }
    }

    #[test]
    fn test_tile_multiple_is_minimal() {
        let planner = DispatchPlanner::new([16, 8, 1], DispatchRounding::TileMultiple);
        let grid = planner.plan(1000, 700);
        let (covered_x, covered_y) = planner.coverage(grid);
        assert!(covered_x - 1000 < 16);
        assert!(covered_y - 700 < 8);
    }

    #[test]
    fn test_power_of_two() {
        let planner = DispatchPlanner::new([32, 32, 1], DispatchRounding::PowerOfTwo);
        assert_eq!(planner.plan(1024, 768), WorkgroupGrid { x: 32, y: 32 });
        assert_eq!(planner.plan(800, 600), WorkgroupGrid { x: 32, y: 32 });
        // tile larger than the rounded extent still dispatches one group
        assert_eq!(planner.plan(3, 5), WorkgroupGrid { x: 1, y: 1 });
    }

    #[test]
    fn test_zero_tile_is_treated_as_one() {
        let planner = DispatchPlanner::new([0, 0, 1], DispatchRounding::TileMultiple);
        assert_eq!(planner.tile_size(), (1, 1));
        assert_eq!(planner.plan(10, 20), WorkgroupGrid { x: 10, y: 20 });
    }
}
