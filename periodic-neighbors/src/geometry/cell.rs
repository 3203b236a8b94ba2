//! The `UnitCell` type represents the enclosing box of a system, with periodic
//! boundary conditions along any subset of the three cell vectors.
use crate::{Error, Matrix3, Vector3D};

/// Cell vectors shorter than this are considered to be missing
const ZERO_LENGTH: f64 = 1e-12;

/// Cells with `|det(H)| / (|a| |b| |c|)` below this threshold are singular
const SINGULAR_VOLUME_RATIO: f64 = 1e-10;

/// An `UnitCell` defines the system physical boundaries.
///
/// The cell matrix is stored in row major order: `matrix[0]` is the first cell
/// vector `a`, `matrix[1]` the second cell vector `b` and `matrix[2]` the third
/// cell vector `c`. Each of these vectors can be periodic or not.
///
/// Vectors along non-periodic directions are allowed to be zero (or otherwise
/// degenerate). Internally, they are replaced by unit vectors orthogonal to the
/// other cell vectors, which gives a well-defined system of fractional
/// coordinates for any cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct UnitCell {
    /// Unit cell matrix, as given by the user
    matrix: Matrix3,
    /// Periodic boundary conditions along each cell vector
    periodic: [bool; 3],
    /// Cell matrix with missing non-periodic vectors replaced
    completed: Matrix3,
    /// Inverse of the transpose of the completed matrix, used to get
    /// fractional coordinates
    inverse: Matrix3,
}

impl UnitCell {
    /// Create a new unit cell with the given cell `matrix` and periodic
    /// boundary conditions.
    ///
    /// This fails with `Error::InvalidGeometry` if the cell is singular along
    /// one of the periodic directions, or if the matrix is not finite.
    pub fn new(matrix: Matrix3, periodic: [bool; 3]) -> Result<UnitCell, Error> {
        for axis in 0..3 {
            if !matrix.row(axis).is_finite() {
                return Err(Error::InvalidGeometry(format!(
                    "cell vector {} is not finite", axis
                )));
            }

            if periodic[axis] && matrix.row(axis).norm() < ZERO_LENGTH {
                return Err(Error::InvalidGeometry(format!(
                    "cell vector {} is zero but the cell is periodic along this direction", axis
                )));
            }
        }

        // first only replace zero-length non-periodic vectors, keeping the
        // ones given by the user
        let mut missing = [false; 3];
        for axis in 0..3 {
            missing[axis] = !periodic[axis] && matrix.row(axis).norm() < ZERO_LENGTH;
        }

        let mut completed = complete_matrix(&matrix, missing);
        if is_singular(&completed) {
            // non-periodic vectors are degenerate with the others, replace
            // all of them
            completed = complete_matrix(&matrix, [!periodic[0], !periodic[1], !periodic[2]]);
            if is_singular(&completed) {
                return Err(Error::InvalidGeometry(
                    "the cell matrix is singular along periodic directions".into()
                ));
            }
        }

        return Ok(UnitCell {
            matrix: matrix,
            periodic: periodic,
            completed: completed,
            inverse: completed.transposed().inverse(),
        });
    }

    /// Create an infinite unit cell, without any periodic boundary condition
    pub fn infinite() -> UnitCell {
        UnitCell {
            matrix: Matrix3::zero(),
            periodic: [false; 3],
            completed: Matrix3::one(),
            inverse: Matrix3::one(),
        }
    }

    /// Create a periodic orthorhombic unit cell, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> UnitCell {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "Cell lengths must be positive");
        let matrix = Matrix3::new([
            [a, 0.0, 0.0],
            [0.0, b, 0.0],
            [0.0, 0.0, c]
        ]);
        UnitCell {
            matrix: matrix,
            periodic: [true; 3],
            completed: matrix,
            inverse: matrix.inverse(),
        }
    }

    /// Create a periodic cubic unit cell, with side lengths `length, length,
    /// length`.
    pub fn cubic(length: f64) -> UnitCell {
        UnitCell::orthorhombic(length, length, length)
    }

    /// Create a periodic triclinic unit cell, with side lengths `a, b, c` and
    /// angles `alpha, beta, gamma` (in degrees).
    pub fn triclinic(a: f64, b: f64, c: f64, alpha: f64, beta: f64, gamma: f64) -> Result<UnitCell, Error> {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "Cell lengths must be positive");
        let cos_alpha = alpha.to_radians().cos();
        let cos_beta = beta.to_radians().cos();
        let (sin_gamma, cos_gamma) = gamma.to_radians().sin_cos();

        let b_x = b * cos_gamma;
        let b_y = b * sin_gamma;

        let c_x = c * cos_beta;
        let c_y = c * (cos_alpha - cos_beta * cos_gamma) / sin_gamma;
        let c_z = f64::sqrt(c * c - c_y * c_y - c_x * c_x);

        return UnitCell::new(Matrix3::new([
            [a,   0.0, 0.0],
            [b_x, b_y, 0.0],
            [c_x, c_y, c_z],
        ]), [true; 3]);
    }

    /// Get the cell matrix, as given by the user
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get the periodic boundary conditions along the three cell vectors
    pub fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    /// Check if this unit cell is infinite, *i.e.* if it does not have
    /// periodic boundary conditions in any direction.
    pub fn is_infinite(&self) -> bool {
        self.periodic == [false; 3]
    }

    /// Get the distances between the opposite faces of the unit cell, *i.e.*
    /// the component of each cell vector orthogonal to the plane spanned by
    /// the two other vectors.
    ///
    /// For non-periodic directions, this uses the completed cell and the
    /// values are only meaningful as a scale for fractional coordinates.
    pub fn distances_between_faces(&self) -> Vector3D {
        let a = self.completed.row(0);
        let b = self.completed.row(1);
        let c = self.completed.row(2);

        // normal vectors to the planes
        let na = (b ^ c).normalized();
        let nb = (c ^ a).normalized();
        let nc = (a ^ b).normalized();

        Vector3D::new(f64::abs(na * a), f64::abs(nb * b), f64::abs(nc * c))
    }

    /// Get the fractional representation of the `vector` in this cell
    pub fn fractional(&self, vector: Vector3D) -> Vector3D {
        // this needs to use the inverse of the transpose of the matrix, since
        // the matrix stores cell vectors as rows
        return self.inverse * vector;
    }

    /// Get the Cartesian representation of the `fractional` vector in this
    /// cell
    pub fn cartesian(&self, fractional: Vector3D) -> Vector3D {
        return self.completed.transposed() * fractional;
    }
}

fn is_singular(matrix: &Matrix3) -> bool {
    let norms = matrix.row(0).norm() * matrix.row(1).norm() * matrix.row(2).norm();
    if norms == 0.0 {
        return true;
    }
    return f64::abs(matrix.determinant()) / norms < SINGULAR_VOLUME_RATIO;
}

/// Replace the `missing` rows of `matrix` by unit vectors orthogonal to the
/// remaining rows, keeping the resulting cell right-handed.
fn complete_matrix(matrix: &Matrix3, missing: [bool; 3]) -> Matrix3 {
    let mut rows = [matrix.row(0), matrix.row(1), matrix.row(2)];
    let present = missing.iter().filter(|&&m| !m).count();

    match present {
        3 => {},
        2 => {
            let axis = missing.iter().position(|&m| m).expect("one axis is missing");
            let normal = rows[(axis + 1) % 3] ^ rows[(axis + 2) % 3];
            if normal.norm() > ZERO_LENGTH {
                rows[axis] = normal.normalized();
            } else {
                rows[axis] = Vector3D::zero();
            }
        },
        1 => {
            let axis = missing.iter().position(|&m| !m).expect("one axis is present");
            let v = rows[axis].normalized();

            // use the Cartesian direction least aligned with `v` to build an
            // orthonormal basis
            let mut helper = Vector3D::zero();
            let mut smallest = f64::INFINITY;
            for k in 0..3 {
                if v[k].abs() < smallest {
                    smallest = v[k].abs();
                    helper = Vector3D::zero();
                    helper[k] = 1.0;
                }
            }

            let u = (v ^ helper).normalized();
            let w = (v ^ u).normalized();
            rows[(axis + 1) % 3] = u;
            rows[(axis + 2) % 3] = w;
        },
        _ => {
            return Matrix3::one();
        }
    }

    return Matrix3::new([rows[0].into(), rows[1].into(), rows[2].into()]);
}
