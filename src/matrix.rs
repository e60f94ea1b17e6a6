// mirath-rx/src/matrix.rs
use crate::f16::F16;
use crate::vector::Vector;
use zeroize::Zeroize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    elements: Vec<F16>, // Stored in row-major order
    rows: usize,
    cols: usize,
}

impl Matrix {
    pub fn new(rows: usize, cols: usize, elements: Vec<F16>) -> Result<Self, String> {
        if rows * cols != elements.len() {
            return Err(format!(
                "invalid dimensions: {}x{} does not match element count {}",
                rows,
                cols,
                elements.len()
            ));
        }
        Ok(Matrix { elements, rows, cols })
    }

    pub fn zero(rows: usize, cols: usize) -> Self {
        Matrix {
            elements: vec![F16::ZERO; rows * cols],
            rows,
            cols,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Matrix::zero(n, n);
        for i in 0..n {
            m.elements[i * n + i] = F16::ONE;
        }
        m
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn elements(&self) -> &[F16] {
        &self.elements
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<F16> {
        if row < self.rows && col < self.cols {
            Some(self.elements[row * self.cols + col])
        } else {
            None
        }
    }

    // Unchecked accessor for internal hot paths; dimensions are invariants
    // of the callers.
    pub fn at(&self, row: usize, col: usize) -> F16 {
        self.elements[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: F16) -> Result<(), String> {
        if row < self.rows && col < self.cols {
            self.elements[row * self.cols + col] = value;
            Ok(())
        } else {
            Err(format!(
                "set out of bounds: ({}, {}) for {}x{} matrix",
                row, col, self.rows, self.cols
            ))
        }
    }

    pub fn transpose(&self) -> Self {
        let mut new_elements = vec![F16::ZERO; self.rows * self.cols];
        for r in 0..self.rows {
            for c in 0..self.cols {
                new_elements[c * self.rows + r] = self.elements[r * self.cols + c];
            }
        }
        Matrix {
            elements: new_elements,
            rows: self.cols,
            cols: self.rows,
        }
    }

    // Matrix product over GF(16).
    pub fn mul(&self, rhs: &Matrix) -> Result<Matrix, String> {
        if self.cols != rhs.rows {
            return Err(format!(
                "matrix product shape mismatch: {}x{} * {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            ));
        }
        let mut out = Matrix::zero(self.rows, rhs.cols);
        for r in 0..self.rows {
            for inner in 0..self.cols {
                let lhs_val = self.at(r, inner);
                if lhs_val == F16::ZERO {
                    continue; // public-data fast path; secret operands never reach rank/solve
                }
                for c in 0..rhs.cols {
                    let cur = out.at(r, c);
                    out.elements[r * rhs.cols + c] = cur + lhs_val * rhs.at(inner, c);
                }
            }
        }
        Ok(out)
    }

    // Dense product without the zero skip, for secret operands.
    pub fn mul_ct(&self, rhs: &Matrix) -> Result<Matrix, String> {
        if self.cols != rhs.rows {
            return Err(format!(
                "matrix product shape mismatch: {}x{} * {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            ));
        }
        let mut out = Matrix::zero(self.rows, rhs.cols);
        for r in 0..self.rows {
            for c in 0..rhs.cols {
                let mut acc = F16::ZERO;
                for inner in 0..self.cols {
                    acc = acc + self.at(r, inner) * rhs.at(inner, c);
                }
                out.elements[r * rhs.cols + c] = acc;
            }
        }
        Ok(out)
    }

    pub fn mul_vector(&self, vector: &Vector) -> Result<Vector, String> {
        if self.cols != vector.len() {
            return Err(format!(
                "matrix-vector shape mismatch: cols {} vs len {}",
                self.cols,
                vector.len()
            ));
        }
        let mut out = Vec::with_capacity(self.rows);
        for r in 0..self.rows {
            let mut acc = F16::ZERO;
            for c in 0..self.cols {
                acc = acc + self.at(r, c) * vector.elements()[c];
            }
            out.push(acc);
        }
        Ok(Vector::new(out))
    }

    // Horizontal concatenation [self | rhs].
    pub fn hstack(&self, rhs: &Matrix) -> Result<Matrix, String> {
        if self.rows != rhs.rows {
            return Err(format!(
                "hstack row mismatch: {} vs {}",
                self.rows, rhs.rows
            ));
        }
        let cols = self.cols + rhs.cols;
        let mut elements = Vec::with_capacity(self.rows * cols);
        for r in 0..self.rows {
            elements.extend_from_slice(&self.elements[r * self.cols..(r + 1) * self.cols]);
            elements.extend_from_slice(&rhs.elements[r * rhs.cols..(r + 1) * rhs.cols]);
        }
        Ok(Matrix {
            elements,
            rows: self.rows,
            cols,
        })
    }

    // Column-major vectorization: vec(M)[c*rows + r] = M[r, c].
    pub fn vec_cols(&self) -> Vec<F16> {
        let mut out = Vec::with_capacity(self.rows * self.cols);
        for c in 0..self.cols {
            for r in 0..self.rows {
                out.push(self.at(r, c));
            }
        }
        out
    }

    fn swap_rows(&mut self, r1: usize, r2: usize) {
        if r1 != r2 {
            for c in 0..self.cols {
                self.elements.swap(r1 * self.cols + c, r2 * self.cols + c);
            }
        }
    }

    fn scale_row(&mut self, row: usize, scalar: F16) {
        for c in 0..self.cols {
            let cur = self.elements[row * self.cols + c];
            self.elements[row * self.cols + c] = cur * scalar;
        }
    }

    fn add_scaled_row(&mut self, target: usize, source: usize, scalar: F16) {
        for c in 0..self.cols {
            let add = self.elements[source * self.cols + c] * scalar;
            let cur = self.elements[target * self.cols + c];
            self.elements[target * self.cols + c] = cur + add;
        }
    }

    // Rank via Gaussian elimination. Public-data only (verification and
    // tests); timing here may depend on the values.
    pub fn rank(&self) -> usize {
        let mut work = self.clone();
        let mut pivot_row = 0;
        for col in 0..work.cols {
            if pivot_row >= work.rows {
                break;
            }
            let mut i = pivot_row;
            while i < work.rows && work.at(i, col) == F16::ZERO {
                i += 1;
            }
            if i == work.rows {
                continue;
            }
            work.swap_rows(pivot_row, i);
            let inv = work.at(pivot_row, col).inverse();
            work.scale_row(pivot_row, inv);
            for r in 0..work.rows {
                if r != pivot_row {
                    let factor = work.at(r, col);
                    if factor != F16::ZERO {
                        work.add_scaled_row(r, pivot_row, factor);
                    }
                }
            }
            pivot_row += 1;
        }
        pivot_row
    }

    // Solves A·x = b by reducing the augmented system to row-echelon form.
    // Requires full column rank; returns None when the system is
    // inconsistent or underdetermined. Public-data only.
    pub fn solve(&self, b: &Vector) -> Result<Option<Vector>, String> {
        if self.rows != b.len() {
            return Err("matrix rows must match rhs length".to_string());
        }
        let mut work = self.clone();
        let mut rhs: Vec<F16> = b.elements().to_vec();
        let mut pivot_cols = Vec::new();
        let mut pivot_row = 0;

        for col in 0..work.cols {
            if pivot_row >= work.rows {
                break;
            }
            let mut i = pivot_row;
            while i < work.rows && work.at(i, col) == F16::ZERO {
                i += 1;
            }
            if i == work.rows {
                continue;
            }
            work.swap_rows(pivot_row, i);
            rhs.swap(pivot_row, i);
            let inv = work.at(pivot_row, col).inverse();
            work.scale_row(pivot_row, inv);
            rhs[pivot_row] = rhs[pivot_row] * inv;
            for r in 0..work.rows {
                if r != pivot_row {
                    let factor = work.at(r, col);
                    if factor != F16::ZERO {
                        work.add_scaled_row(r, pivot_row, factor);
                        rhs[r] = rhs[r] + rhs[pivot_row] * factor;
                    }
                }
            }
            pivot_cols.push(col);
            pivot_row += 1;
        }

        if pivot_cols.len() != work.cols {
            return Ok(None); // not full column rank
        }
        // Rows below the pivots must have zero rhs or the system is inconsistent
        for r in pivot_cols.len()..work.rows {
            if rhs[r] != F16::ZERO {
                return Ok(None);
            }
        }
        let mut x = vec![F16::ZERO; work.cols];
        for (row, col) in pivot_cols.iter().enumerate() {
            x[*col] = rhs[row];
        }
        Ok(Some(Vector::new(x)))
    }
}

impl Zeroize for Matrix {
    fn zeroize(&mut self) {
        self.elements.zeroize();
    }
}
