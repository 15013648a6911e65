//! Raw grid files: `f64` values in native byte order, row-major,
//! no header and no length prefix. The reader has to know the dimension.

use crate::error::*;
use crate::grid::*;
use std::io::prelude::*;
use std::path::Path;

/// Value written into freshly allocated buffers before an import, so a
/// short or failed read can be spotted afterwards.
pub const SENTINEL: f64 = -1.0;

const VALUE_BYTES: i64 = std::mem::size_of::<f64>() as i64;

/// Read a `dimension x dimension` grid, the file must hold exactly that
/// many values.
pub fn read_raw<P: AsRef<Path>>(path: &P, dimension: usize) -> RelaxResult<Grid> {
    tracing::info!(path = ?path.as_ref(), dimension, "reading raw grid");
    let file = std::fs::File::open(path)?;
    let file_len = file.metadata()?.len() as usize;
    let expected = dimension * dimension;
    if file_len != expected * VALUE_BYTES as usize {
        return Err(RelaxError::DimensionMismatch {
            expected,
            found: file_len / VALUE_BYTES as usize,
        });
    }

    let mut input = std::io::BufReader::new(file);
    let mut grid = Grid::filled(dimension, SENTINEL);
    input.read_exact(bytemuck::cast_slice_mut(grid.as_mut_slice()))?;
    Ok(grid)
}

/// Read the top left `dimension x dimension` window of a larger
/// `data_size x data_size` file.
pub fn read_raw_window<P: AsRef<Path>>(
    path: &P,
    data_size: usize,
    dimension: usize,
) -> RelaxResult<Grid> {
    if dimension > data_size {
        return Err(RelaxError::InvalidParameter(format!(
            "window {} is larger than the {}x{} data set",
            dimension, data_size, data_size
        )));
    }
    tracing::info!(
        path = ?path.as_ref(),
        data_size,
        dimension,
        "reading raw grid window"
    );
    let file = std::fs::File::open(path)?;
    let file_len = file.metadata()?.len() as usize;
    let expected = data_size * data_size;
    if file_len < expected * VALUE_BYTES as usize {
        return Err(RelaxError::DimensionMismatch {
            expected,
            found: file_len / VALUE_BYTES as usize,
        });
    }

    let mut input = std::io::BufReader::new(file);
    let mut grid = Grid::filled(dimension, SENTINEL);
    let skip = (data_size - dimension) as i64 * VALUE_BYTES;
    for i in 0..dimension {
        input.read_exact(bytemuck::cast_slice_mut(grid.row_mut(i)))?;
        if i + 1 < dimension {
            input.seek_relative(skip)?;
        }
    }
    Ok(grid)
}

pub fn write_raw<P: AsRef<Path>>(path: &P, grid: &Grid) -> RelaxResult<()> {
    tracing::info!(path = ?path.as_ref(), dimension = grid.dimension(), "writing raw grid");
    let mut output = std::io::BufWriter::new(std::fs::File::create(path)?);
    output.write_all(bytemuck::cast_slice(grid.as_slice()))?;
    output.flush()?;
    Ok(())
}

/// True when no cell still holds the sentinel.
/// This only shows that every cell was written, not that it is correct.
pub fn verify_no_sentinel(grid: &Grid) -> bool {
    grid.as_slice().iter().all(|v| *v != SENTINEL)
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("relax_io_{}_{}.bin", name, std::process::id()));
        path
    }

    fn numbered(dimension: usize) -> Grid {
        let data = (0..dimension * dimension).map(|i| i as f64).collect();
        Grid::from_vec(dimension, data).unwrap()
    }

    #[test]
    fn raw_file_test() {
        let path = scratch_path("raw");
        let grid = numbered(6);
        write_raw(&path, &grid).unwrap();
        assert_eq!(
            std::fs::metadata(&path).unwrap().len(),
            36 * VALUE_BYTES as u64
        );

        let read = read_raw(&path, 6).unwrap();
        assert_eq!(read, grid);
        assert!(verify_no_sentinel(&read));

        assert!(matches!(
            read_raw(&path, 5),
            Err(RelaxError::DimensionMismatch {
                expected: 25,
                found: 36
            })
        ));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn window_test() {
        let path = scratch_path("window");
        write_raw(&path, &numbered(6)).unwrap();

        let window = read_raw_window(&path, 6, 3).unwrap();
        assert_eq!(window.row(0), &[0.0, 1.0, 2.0]);
        assert_eq!(window.row(1), &[6.0, 7.0, 8.0]);
        assert_eq!(window.row(2), &[12.0, 13.0, 14.0]);

        assert!(read_raw_window(&path, 6, 7).is_err());
        assert!(read_raw_window(&path, 7, 3).is_err());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn sentinel_test() {
        let mut grid = Grid::new(3);
        assert!(verify_no_sentinel(&grid));
        grid.set(1, 2, SENTINEL);
        assert!(!verify_no_sentinel(&grid));
    }
}
