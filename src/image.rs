use crate::error::*;
use crate::grid::*;

/// Heat map of a grid, one pixel per cell, row `i` is image line `i`.
/// Values are scaled between the grid's own min and max before going
/// through the TURBO gradient, a flat grid comes out uniformly dark.
pub fn heatmap(grid: &Grid) -> image::RgbImage {
    let dimension = grid.dimension() as u32;
    let gradient = colorous::TURBO;
    let (min, max) = grid
        .as_slice()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    let range = max - min;

    let mut img = image::RgbImage::new(dimension, dimension);
    for row in 0..grid.dimension() {
        for (col, v) in grid.row(row).iter().enumerate() {
            let t = if range > 0.0 { (v - min) / range } else { 0.0 };
            let c = gradient.eval_continuous(t);
            img.put_pixel(col as u32, row as u32, image::Rgb(c.as_array()));
        }
    }
    img
}

pub fn write_heatmap<F: AsRef<std::path::Path>>(
    grid: &Grid,
    s: &F,
) -> RelaxResult<()> {
    profiling::scope!("write_heatmap");
    heatmap(grid).save(s)?;
    Ok(())
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn heatmap_test() {
        let mut grid = Grid::new(4);
        grid.set(2, 1, 3.0);
        let img = heatmap(&grid);
        assert_eq!(img.dimensions(), (4, 4));

        let low = image::Rgb(colorous::TURBO.eval_continuous(0.0).as_array());
        let high = image::Rgb(colorous::TURBO.eval_continuous(1.0).as_array());
        assert_eq!(*img.get_pixel(0, 0), low);
        assert_eq!(*img.get_pixel(1, 2), high);
    }

    #[test]
    fn flat_heatmap_test() {
        let img = heatmap(&Grid::filled(3, 2.5));
        let low = image::Rgb(colorous::TURBO.eval_continuous(0.0).as_array());
        assert!(img.pixels().all(|p| *p == low));
    }
}
