//! Block-structured composition of QUBO levels.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::linalg::{QuboMatrix, ShapeError};
use crate::qubo::{
    format_problem, from_matrix, parse_solution, JobEnvelope, ProblemType,
    VARIABLE_COUNT_PARAMETER,
};
use crate::solver::{submit_with_timeout, ExternalSolver, ExternalSolverError, GreedyBitFlip};

use super::config::HierarchicalConfig;
use super::level::{Connection, QuboLevel};

/// Combines independent QUBO levels into one problem and solves it with
/// constrained local search.
///
/// The combined matrix places each level's matrix, scaled by its weight, on
/// the block diagonal. Every connection adds
/// `weight · inter_level_weight` to all variable pairs between its two
/// levels, symmetrically. A variable with a fixed target `t` gets
/// `constraint_weight · (2 - 2t)` on its diagonal and is never flipped by the
/// search.
///
/// # Example
///
/// ```
/// use std::collections::BTreeMap;
/// use qam::hierarchical::{HierarchicalConfig, HierarchicalQubo};
/// use qam::linalg::QuboMatrix;
///
/// let mut composer = HierarchicalQubo::new(HierarchicalConfig::default().with_seed(1));
/// let a = composer
///     .add_level(QuboMatrix::identity(2), None, BTreeMap::from([("x0".into(), 1)]), 1.0)
///     .unwrap();
/// let b = composer.add_level(QuboMatrix::identity(2), None, BTreeMap::new(), 1.0).unwrap();
/// assert!(composer.add_connection(a, b, 1.0));
///
/// let solution = composer.optimize();
/// assert_eq!(solution["level_0"][0], 1);
/// ```
pub struct HierarchicalQubo {
    config: HierarchicalConfig,
    levels: Vec<QuboLevel>,
    connections: Vec<Connection>,
    external: Option<Arc<dyn ExternalSolver>>,
    rng: StdRng,
}

impl fmt::Debug for HierarchicalQubo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HierarchicalQubo")
            .field("config", &self.config)
            .field("levels", &self.levels.len())
            .field("connections", &self.connections)
            .field("external", &self.external.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Default for HierarchicalQubo {
    fn default() -> Self {
        Self::new(HierarchicalConfig::default())
    }
}

/// Result key of level `index`.
pub fn level_name(index: usize) -> String {
    format!("level_{index}")
}

impl HierarchicalQubo {
    pub fn new(config: HierarchicalConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            levels: Vec::new(),
            connections: Vec::new(),
            external: None,
            rng,
        }
    }

    /// Tries `solver` before the local search; its answer is clamped to the
    /// constraints and then polished.
    pub fn with_external_solver(mut self, solver: Arc<dyn ExternalSolver>) -> Self {
        self.external = Some(solver);
        self
    }

    pub fn config(&self) -> &HierarchicalConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[QuboLevel] {
        &self.levels
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Appends a level and returns its index.
    ///
    /// # Errors
    ///
    /// [`ShapeError`] if the matrix is not square or `variables` does not
    /// match its side.
    pub fn add_level(
        &mut self,
        matrix: QuboMatrix,
        variables: Option<Vec<String>>,
        constraints: BTreeMap<String, u8>,
        weight: f64,
    ) -> Result<usize, ShapeError> {
        self.levels
            .push(QuboLevel::new(matrix, variables, constraints, weight)?);
        Ok(self.levels.len() - 1)
    }

    /// Couples two distinct levels.
    ///
    /// Returns false for out-of-range indices or an exact duplicate of an
    /// existing connection. Self-connections are also refused with false:
    /// coupling inside a level belongs in that level's matrix, so
    /// `from == to` never adds a connection.
    pub fn add_connection(&mut self, from: usize, to: usize, weight: f64) -> bool {
        if from >= self.levels.len() || to >= self.levels.len() || from == to {
            return false;
        }
        let connection = Connection { from, to, weight };
        if self.connections.contains(&connection) {
            return false;
        }
        self.connections.push(connection);
        true
    }

    pub fn level_variables(&self, index: usize) -> Option<&[String]> {
        self.levels.get(index).map(QuboLevel::variables)
    }

    pub fn level_constraints(&self, index: usize) -> Option<&BTreeMap<String, u8>> {
        self.levels.get(index).map(QuboLevel::constraints)
    }

    fn offsets(&self) -> Vec<usize> {
        self.levels
            .iter()
            .scan(0, |offset, level| {
                let start = *offset;
                *offset += level.size();
                Some(start)
            })
            .collect()
    }

    /// The combined block matrix including coupling and constraint penalties.
    pub fn combined_matrix(&self) -> QuboMatrix {
        let offsets = self.offsets();
        let size = self.levels.iter().map(QuboLevel::size).sum();
        let mut q = QuboMatrix::square(size);

        for (level, &offset) in self.levels.iter().zip(&offsets) {
            q.set_block(offset, offset, &level.matrix().scaled(level.weight()));
        }

        for c in &self.connections {
            let coupling = c.weight * self.config.inter_level_weight;
            let (a, b) = (&self.levels[c.from], &self.levels[c.to]);
            for i in 0..a.size() {
                for j in 0..b.size() {
                    q.add_at(offsets[c.from] + i, offsets[c.to] + j, coupling);
                    q.add_at(offsets[c.to] + j, offsets[c.from] + i, coupling);
                }
            }
        }

        let cw = self.config.constraint_weight;
        for (level, &offset) in self.levels.iter().zip(&offsets) {
            for k in 0..level.size() {
                if let Some(target) = level.target(k) {
                    q.add_at(offset + k, offset + k, 2.0 * cw - 2.0 * cw * f64::from(target));
                }
            }
        }
        q
    }

    /// Fixed targets over the combined variable order.
    fn targets(&self) -> Vec<Option<u8>> {
        self.levels
            .iter()
            .flat_map(|level| (0..level.size()).map(move |k| level.target(k)))
            .collect()
    }

    /// Solves the combined problem and splits the bits per level, keyed
    /// `level_<index>`.
    ///
    /// Constrained variables always equal their target in the result.
    pub fn optimize(&mut self) -> BTreeMap<String, Vec<u8>> {
        if self.levels.is_empty() {
            return BTreeMap::new();
        }
        let q = self.combined_matrix();
        let targets = self.targets();
        let frozen: Vec<bool> = targets.iter().map(Option::is_some).collect();

        let start = match self.external_start(&q, &targets) {
            Some(bits) => bits,
            None => targets
                .iter()
                .map(|t| t.unwrap_or_else(|| u8::from(self.rng.gen_bool(0.5))))
                .collect(),
        };
        let search = GreedyBitFlip::new(self.config.max_iterations, self.config.convergence_threshold);
        let bits = search.solve(&q, start, Some(&frozen));
        tracing::debug!(
            levels = self.levels.len(),
            variables = bits.len(),
            energy = q.energy(&bits),
            "hierarchical QUBO solved"
        );

        let mut results = BTreeMap::new();
        let mut rest = bits.as_slice();
        for (index, level) in self.levels.iter().enumerate() {
            let (head, tail) = rest.split_at(level.size());
            results.insert(level_name(index), head.to_vec());
            rest = tail;
        }
        results
    }

    /// External answer clamped to the targets, or `None` after logging the
    /// failure.
    fn external_start(&self, q: &QuboMatrix, targets: &[Option<u8>]) -> Option<Vec<u8>> {
        let solver = self.external.clone()?;
        let name = solver.name().to_string();
        match self.submit(solver, q) {
            Ok(bits) => Some(
                bits.into_iter()
                    .zip(targets)
                    .map(|(b, t)| t.unwrap_or(b))
                    .collect(),
            ),
            Err(error) => {
                tracing::warn!(solver = %name, %error, "external solver failed, using local search");
                None
            }
        }
    }

    fn submit(
        &self,
        solver: Arc<dyn ExternalSolver>,
        q: &QuboMatrix,
    ) -> Result<Vec<u8>, ExternalSolverError> {
        let n = q.rows();
        let job = JobEnvelope::new(format_problem(&from_matrix(q), ProblemType::Qubo))
            .with_parameter(VARIABLE_COUNT_PARAMETER, json!(n));
        let response = submit_with_timeout(solver, job, self.config.submission_timeout)?;
        Ok(parse_solution(&response, n)?)
    }
}
