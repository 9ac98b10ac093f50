/////////////////////////////////////////////
// A generic 2-dimensional array structure //
/////////////////////////////////////////////

use std::io::Error;
use std::io::ErrorKind;
use std::ops::{AddAssign, SubAssign};

/// A simple in-memory 2-D grid that is not connected to a file. Used for
/// scratch state (visit flags, neighbour counts, component labels) alongside
/// a `Raster`. Reads outside the grid return the nodata value and writes
/// outside the grid are ignored.
///
/// Example:
///
/// ```
/// use iwp_common::structures::Array2D;
/// let mut x: Array2D<i32> = Array2D::new(100, 500, 0, -1).unwrap();
/// x.set_value(50, 100, 1);
/// assert_eq!(x.get_value(50, 100), 1);
/// assert_eq!(x.get_value(-1, 0), -1);
/// ```
#[derive(Clone, Debug)]
pub struct Array2D<T: Copy + AddAssign + SubAssign> {
    pub columns: isize,
    pub rows: isize,
    data: Vec<T>,
    pub nodata: T,
}

impl<T> Array2D<T>
where
    T: Copy + AddAssign + SubAssign,
{
    pub fn new(rows: isize, columns: isize, initial_value: T, nodata: T) -> Result<Array2D<T>, Error> {
        if rows < 0 || columns < 0 {
            return Err(Error::new(
                ErrorKind::InvalidData,
                "Only non-negative rows and columns values accepted.",
            ));
        }
        Ok(Array2D {
            columns,
            rows,
            nodata,
            data: vec![initial_value; (rows * columns) as usize],
        })
    }

    pub fn set_value(&mut self, row: isize, column: isize, value: T) {
        if column >= 0 && row >= 0 && column < self.columns && row < self.rows {
            self.data[(row * self.columns + column) as usize] = value;
        }
    }

    pub fn get_value(&self, row: isize, column: isize) -> T {
        if row < 0 || column < 0 || row >= self.rows || column >= self.columns {
            return self.nodata;
        }
        self.data[(row * self.columns + column) as usize]
    }

    pub fn increment(&mut self, row: isize, column: isize, value: T) {
        if column >= 0 && row >= 0 && column < self.columns && row < self.rows {
            self.data[(row * self.columns + column) as usize] += value;
        }
    }

    pub fn decrement(&mut self, row: isize, column: isize, value: T) {
        if column >= 0 && row >= 0 && column < self.columns && row < self.rows {
            self.data[(row * self.columns + column) as usize] -= value;
        }
    }

    pub fn num_cells(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod test {
    use super::Array2D;

    #[test]
    fn test_out_of_bounds_reads_nodata() {
        let mut a: Array2D<u8> = Array2D::new(3, 4, 0, 255).unwrap();
        a.set_value(2, 3, 7);
        a.set_value(3, 3, 9); // ignored
        assert_eq!(a.get_value(2, 3), 7);
        assert_eq!(a.get_value(3, 3), 255);
        assert_eq!(a.get_value(0, -1), 255);
        a.increment(2, 3, 1);
        a.decrement(2, 3, 3);
        assert_eq!(a.get_value(2, 3), 5);
        assert_eq!(a.num_cells(), 12);
    }

    #[test]
    fn test_negative_dimensions() {
        assert!(Array2D::<i32>::new(-1, 4, 0, -1).is_err());
    }
}
