//! Chain tensor (tensor-train) container
//!
//! Operators, right-hand sides and solutions share the same representation:
//! an ordered list of 4D cores with shape (left_bond, row_dim, col_dim, right_bond).
//! Vectors have `col_dim == 1` at every site.

use rand::Rng;

use crate::error::{Result, SleError};
use crate::types::{tensor4_from_data, tensor4_zeros, Tensor4, Tensor4Ops};

/// Tensor-train decomposition of an operator or a vector
///
/// T\[(i1,j1), ..., (iL,jL)\] = A1\[i1,j1\] * A2\[i2,j2\] * ... * AL\[iL,jL\]
///
/// where each Ak\[ik,jk\] is a matrix of shape (rk-1, rk).
#[derive(Debug, Clone)]
pub struct ChainTensor {
    cores: Vec<Tensor4<f64>>,
    /// Bond dimensions, length order + 1
    ranks: Vec<usize>,
}

impl ChainTensor {
    /// Create a chain tensor from a list of 4D cores
    ///
    /// Each core should have shape (left_bond, row_dim, col_dim, right_bond)
    /// where the right_bond of core i equals the left_bond of core i+1,
    /// and the outer bonds are 1.
    pub fn new(cores: Vec<Tensor4<f64>>) -> Result<Self> {
        check_cores(&cores)?;
        let mut ranks = Vec::with_capacity(cores.len() + 1);
        ranks.push(cores[0].left_dim());
        ranks.extend(cores.iter().map(|c| c.right_dim()));
        Ok(Self { cores, ranks })
    }

    /// Identity operator on the given mode dimensions (all ranks 1)
    pub fn identity(dims: &[usize]) -> Result<Self> {
        let cores = dims
            .iter()
            .map(|&d| {
                let mut core: Tensor4<f64> = tensor4_zeros(1, d, d, 1);
                for s in 0..d {
                    core.set4(0, s, s, 0, 1.0);
                }
                core
            })
            .collect();
        Self::new(cores)
    }

    /// Rank-one vector given by the outer product of the site factors
    pub fn rank_one(factors: &[Vec<f64>]) -> Result<Self> {
        let cores = factors
            .iter()
            .map(|f| {
                let mut core: Tensor4<f64> = tensor4_zeros(1, f.len(), 1, 1);
                for (s, &v) in f.iter().enumerate() {
                    core.set4(0, s, 0, 0, v);
                }
                core
            })
            .collect();
        Self::new(cores)
    }

    /// Rank-one tensor with all entries equal to one
    pub fn ones(row_dims: &[usize], col_dims: &[usize]) -> Result<Self> {
        check_mode_lengths(row_dims, col_dims)?;
        let cores = row_dims
            .iter()
            .zip(col_dims)
            .map(|(&m, &n)| Tensor4::from_elem([1, m, n, 1], 1.0))
            .collect();
        Self::new(cores)
    }

    /// Random tensor with entries drawn uniformly from [-1, 1)
    ///
    /// `ranks` must have length `row_dims.len() + 1` with both ends equal to 1.
    pub fn random<R: Rng>(
        row_dims: &[usize],
        col_dims: &[usize],
        ranks: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        check_mode_lengths(row_dims, col_dims)?;
        if ranks.len() != row_dims.len() + 1 {
            return Err(SleError::InvalidConfig {
                message: format!(
                    "expected {} ranks for {} sites, got {}",
                    row_dims.len() + 1,
                    row_dims.len(),
                    ranks.len()
                ),
            });
        }
        let cores = (0..row_dims.len())
            .map(|i| {
                let len = ranks[i] * row_dims[i] * col_dims[i] * ranks[i + 1];
                let data: Vec<f64> = (0..len).map(|_| rng.random_range(-1.0..1.0)).collect();
                tensor4_from_data(data, ranks[i], row_dims[i], col_dims[i], ranks[i + 1])
            })
            .collect();
        Self::new(cores)
    }

    /// Number of sites
    pub fn order(&self) -> usize {
        self.cores.len()
    }

    /// All cores
    pub fn cores(&self) -> &[Tensor4<f64>] {
        &self.cores
    }

    /// Core at site `i`
    pub fn core(&self, i: usize) -> &Tensor4<f64> {
        &self.cores[i]
    }

    /// Bond dimensions (length order + 1)
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    /// Bond dimension at bond `i` (0..=order)
    pub fn rank(&self, i: usize) -> usize {
        self.ranks[i]
    }

    /// Largest bond dimension
    pub fn max_rank(&self) -> usize {
        self.ranks.iter().copied().max().unwrap_or(0)
    }

    /// Row mode dimensions
    pub fn row_dims(&self) -> Vec<usize> {
        self.cores.iter().map(|c| c.row_dim()).collect()
    }

    /// Column mode dimensions
    pub fn col_dims(&self) -> Vec<usize> {
        self.cores.iter().map(|c| c.col_dim()).collect()
    }

    /// Row mode dimension at site `i`
    pub fn row_dim(&self, i: usize) -> usize {
        self.cores[i].row_dim()
    }

    /// Column mode dimension at site `i`
    pub fn col_dim(&self, i: usize) -> usize {
        self.cores[i].col_dim()
    }

    /// Whether every column mode has dimension 1
    pub fn is_vector(&self) -> bool {
        self.cores.iter().all(|c| c.col_dim() == 1)
    }

    /// Independent deep copy
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Re-check the bond invariant and the rank bookkeeping
    pub fn validate(&self) -> Result<()> {
        check_cores(&self.cores)?;
        if self.ranks.len() != self.cores.len() + 1 {
            return Err(SleError::RankMismatch {
                bond: self.ranks.len().min(self.cores.len()),
                recorded: self.ranks.len(),
                actual: self.cores.len() + 1,
            });
        }
        for (i, core) in self.cores.iter().enumerate() {
            if self.ranks[i] != core.left_dim() {
                return Err(SleError::RankMismatch {
                    bond: i,
                    recorded: self.ranks[i],
                    actual: core.left_dim(),
                });
            }
        }
        let last = self.cores.len();
        if self.ranks[last] != 1 {
            return Err(SleError::RankMismatch {
                bond: last,
                recorded: self.ranks[last],
                actual: 1,
            });
        }
        Ok(())
    }

    /// Convert to a dense tensor
    ///
    /// Returns a flat vector in row-major order over the interleaved modes
    /// (row_0, col_0, row_1, col_1, ...), along with that shape.
    /// For vectors the column modes have size 1, so the data is the plain
    /// row-major vector.
    ///
    /// Warning: This can be very large for high-dimensional tensors!
    pub fn full(&self) -> (Vec<f64>, Vec<usize>) {
        let shape: Vec<usize> = self
            .cores
            .iter()
            .flat_map(|c| [c.row_dim(), c.col_dim()])
            .collect();

        // acc[(flat, bond)] with flat the row-major index over processed modes
        let mut acc = vec![1.0];
        let mut bond = 1;
        let mut size = 1;
        for core in &self.cores {
            let m = core.row_dim() * core.col_dim();
            let r = core.right_dim();
            let mut next = vec![0.0; size * m * r];
            for p in 0..size {
                for a in 0..bond {
                    let w = acc[p * bond + a];
                    if w == 0.0 {
                        continue;
                    }
                    for s in 0..core.row_dim() {
                        for t in 0..core.col_dim() {
                            let q = p * m + s * core.col_dim() + t;
                            for b in 0..r {
                                next[q * r + b] += w * *core.get4(a, s, t, b);
                            }
                        }
                    }
                }
            }
            acc = next;
            bond = r;
            size *= m;
        }
        (acc, shape)
    }

    pub(crate) fn set_core(&mut self, i: usize, core: Tensor4<f64>) {
        self.cores[i] = core;
    }

    pub(crate) fn set_rank(&mut self, bond: usize, rank: usize) {
        self.ranks[bond] = rank;
    }
}

fn check_cores(cores: &[Tensor4<f64>]) -> Result<()> {
    let (first, last) = match (cores.first(), cores.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SleError::Empty),
    };
    if first.left_dim() != 1 || last.right_dim() != 1 {
        return Err(SleError::InvalidBoundary);
    }
    for (i, pair) in cores.windows(2).enumerate() {
        if pair[0].right_dim() != pair[1].left_dim() {
            return Err(SleError::BondDimensionMismatch {
                site: i,
                left_right: pair[0].right_dim(),
                right_left: pair[1].left_dim(),
            });
        }
    }
    Ok(())
}

fn check_mode_lengths(row_dims: &[usize], col_dims: &[usize]) -> Result<()> {
    if row_dims.len() != col_dims.len() {
        return Err(SleError::InvalidConfig {
            message: format!(
                "{} row dimensions but {} column dimensions",
                row_dims.len(),
                col_dims.len()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(ChainTensor::new(vec![]), Err(SleError::Empty)));
    }

    #[test]
    fn test_new_rejects_open_boundary() {
        let core: Tensor4<f64> = tensor4_zeros(2, 2, 1, 1);
        assert!(matches!(
            ChainTensor::new(vec![core]),
            Err(SleError::InvalidBoundary)
        ));
    }

    #[test]
    fn test_new_rejects_bond_mismatch() {
        let c0: Tensor4<f64> = tensor4_zeros(1, 2, 1, 2);
        let c1: Tensor4<f64> = tensor4_zeros(3, 2, 1, 1);
        let err = ChainTensor::new(vec![c0, c1]).unwrap_err();
        assert!(matches!(
            err,
            SleError::BondDimensionMismatch {
                site: 0,
                left_right: 2,
                right_left: 3
            }
        ));
    }

    #[test]
    fn test_accessors() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let tt = ChainTensor::random(&[2, 3, 4], &[1, 1, 1], &[1, 2, 3, 1], &mut rng).unwrap();
        assert_eq!(tt.order(), 3);
        assert_eq!(tt.ranks(), &[1, 2, 3, 1]);
        assert_eq!(tt.rank(2), 3);
        assert_eq!(tt.max_rank(), 3);
        assert_eq!(tt.row_dims(), vec![2, 3, 4]);
        assert_eq!(tt.col_dims(), vec![1, 1, 1]);
        assert_eq!(tt.row_dim(1), 3);
        assert_eq!(tt.col_dim(1), 1);
        assert!(tt.is_vector());
        assert!(tt.validate().is_ok());
        for core in tt.cores() {
            for l in 0..core.left_dim() {
                for s in 0..core.row_dim() {
                    for r in 0..core.right_dim() {
                        assert!((-1.0..1.0).contains(core.get4(l, s, 0, r)));
                    }
                }
            }
        }
    }

    #[test]
    fn test_random_rejects_wrong_rank_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = ChainTensor::random(&[2, 2], &[1, 1], &[1, 1], &mut rng).unwrap_err();
        assert!(matches!(err, SleError::InvalidConfig { .. }));
    }

    #[test]
    fn test_random_rejects_open_ranks() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = ChainTensor::random(&[2, 2], &[1, 1], &[2, 2, 1], &mut rng).unwrap_err();
        assert!(matches!(err, SleError::InvalidBoundary));
    }

    #[test]
    fn test_copy_is_independent() {
        let tt = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();
        let mut copy = tt.copy();
        copy.set_core(0, tensor4_zeros(1, 2, 1, 1));
        assert_eq!(*tt.core(0).get4(0, 1, 0, 0), 1.0);
        assert_eq!(*copy.core(0).get4(0, 1, 0, 0), 0.0);
    }

    #[test]
    fn test_identity_full() {
        let id = ChainTensor::identity(&[2, 3]).unwrap();
        assert!(!id.is_vector());
        let (data, shape) = id.full();
        assert_eq!(shape, vec![2, 2, 3, 3]);
        for i0 in 0..2 {
            for j0 in 0..2 {
                for i1 in 0..3 {
                    for j1 in 0..3 {
                        let idx = ((i0 * 2 + j0) * 3 + i1) * 3 + j1;
                        let expected = if i0 == j0 && i1 == j1 { 1.0 } else { 0.0 };
                        assert_eq!(data[idx], expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_rank_one_full() {
        let tt = ChainTensor::rank_one(&[vec![1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap();
        let (data, shape) = tt.full();
        assert_eq!(shape, vec![2, 1, 3, 1]);
        assert_eq!(data, vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_full_rank_two() {
        // x = [1, 0] (x) [1, 1] + [0, 1] (x) [2, -1]
        let c0 = tensor4_from_data(vec![1.0, 0.0, 0.0, 1.0], 1, 2, 1, 2);
        let c1 = tensor4_from_data(vec![1.0, 1.0, 2.0, -1.0], 2, 2, 1, 1);
        let tt = ChainTensor::new(vec![c0, c1]).unwrap();
        let (data, _) = tt.full();
        assert_eq!(data, vec![1.0, 1.0, 2.0, -1.0]);
    }

    #[test]
    fn test_validate_detects_stale_rank() {
        let mut tt = ChainTensor::ones(&[2, 2], &[1, 1]).unwrap();
        tt.set_rank(1, 3);
        assert!(matches!(
            tt.validate(),
            Err(SleError::RankMismatch {
                bond: 1,
                recorded: 3,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_ones_rejects_length_mismatch() {
        assert!(matches!(
            ChainTensor::ones(&[2, 2], &[1]),
            Err(SleError::InvalidConfig { .. })
        ));
    }
}
