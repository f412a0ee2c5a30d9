//! Reasoning-weighted schedule optimization.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::linalg::QuboMatrix;
use crate::qubo::{
    format_problem, parse_solution, to_matrix, Assignment, JobEnvelope, ProblemType, QuboError,
    QuboScheduler, QuboTerm, VARIABLE_COUNT_PARAMETER,
};
use crate::reasoning::QuantumReasoningState;
use crate::task::{DependencyGraph, Task};
use crate::time_window::WindowEngine;

use super::candidate::{schedule_energy, sequential, CandidateSearch, Schedule};
use super::classical::{random_bits, GreedyBitFlip};
use super::config::SolverConfig;
use super::error::{ExternalSolverError, InfeasibleScheduleError};
use super::external::{submit_with_timeout, ExternalSolver};
use super::validate::{validate_dependencies, validate_resources};
use super::weighting::ReasoningWeights;

/// Backend that produced a [`QuboSolution`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum SolutionSource {
    External(String),
    Classical,
}

/// Bits minimizing a QUBO, with the energy before and after local search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct QuboSolution {
    pub bits: Vec<u8>,
    pub energy: f64,
    /// Energy of the starting point; equals `energy` for external answers.
    pub seed_energy: f64,
    pub source: SolutionSource,
}

/// Result of [`ReasoningScheduler::optimize_schedule`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleOutcome {
    /// Start time per task id.
    pub schedule: Schedule,
    /// `xᵀQx` of the schedule's slot occupancy.
    pub objective_value: f64,
    /// Mean normalized reasoning weight.
    pub reasoning_influence: f64,
    /// True if the candidate search failed and tasks were run back to back.
    pub sequential_fallback: bool,
}

impl ScheduleOutcome {
    fn empty() -> Self {
        Self {
            schedule: Schedule::new(),
            objective_value: 0.0,
            reasoning_influence: 0.0,
            sequential_fallback: false,
        }
    }
}

/// Schedules tasks over a horizon with a QUBO biased by a reasoning state.
///
/// Every entry point recovers locally: external-solver failures fall back
/// to [`GreedyBitFlip`], an exhausted search falls back to a sequential
/// schedule. Both are logged with `tracing`.
pub struct ReasoningScheduler {
    config: SolverConfig,
    external: Option<Arc<dyn ExternalSolver>>,
    rng: StdRng,
}

impl fmt::Debug for ReasoningScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasoningScheduler")
            .field("config", &self.config)
            .field("external", &self.external.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl Default for ReasoningScheduler {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl ReasoningScheduler {
    pub fn new(config: SolverConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            config,
            external: None,
            rng,
        }
    }

    /// Submits QUBOs to `solver` before trying the classical fallback.
    pub fn with_external_solver(mut self, solver: Arc<dyn ExternalSolver>) -> Self {
        self.external = Some(solver);
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Position QUBO over `horizon` slots, weighted by `state`.
    pub fn build_qubo_with_reasoning(
        &self,
        horizon: usize,
        state: &QuantumReasoningState,
    ) -> Vec<QuboTerm> {
        ReasoningWeights::from_state(state, horizon).terms()
    }

    /// Minimizes the `n`-variable QUBO given by `terms`.
    ///
    /// Tries the external solver first when one is configured; any failure
    /// is logged and answered by greedy descent from a random seed.
    pub fn solve_qubo(&mut self, terms: &[QuboTerm], n: usize) -> QuboSolution {
        let q = to_matrix(terms, n);

        if let Some(solver) = self.external.clone() {
            let name = solver.name().to_string();
            match self.submit_external(solver, terms, n) {
                Ok(bits) => {
                    let energy = q.energy(&bits);
                    tracing::debug!(solver = %name, energy, "external QUBO solution");
                    return QuboSolution {
                        bits,
                        energy,
                        seed_energy: energy,
                        source: SolutionSource::External(name),
                    };
                }
                Err(error) => {
                    tracing::warn!(solver = %name, %error, "external QUBO solver failed, using classical fallback");
                }
            }
        }
        self.solve_classical(&q)
    }

    fn submit_external(
        &self,
        solver: Arc<dyn ExternalSolver>,
        terms: &[QuboTerm],
        n: usize,
    ) -> Result<Vec<u8>, ExternalSolverError> {
        let job = JobEnvelope::new(format_problem(terms, ProblemType::Qubo))
            .with_parameter(VARIABLE_COUNT_PARAMETER, json!(n));
        let response = submit_with_timeout(solver, job, self.config.submission_timeout)?;
        Ok(parse_solution(&response, n)?)
    }

    fn solve_classical(&mut self, q: &QuboMatrix) -> QuboSolution {
        let seed = random_bits(q.rows(), &mut self.rng);
        let seed_energy = q.energy(&seed);
        let bits = GreedyBitFlip::new(self.config.max_sweeps, 0.0).solve(q, seed, None);
        QuboSolution {
            energy: q.energy(&bits),
            bits,
            seed_energy,
            source: SolutionSource::Classical,
        }
    }

    /// Builds the task–agent–window QUBO of `problem`, solves it and decodes
    /// the selected assignments.
    ///
    /// The configured `makespan_weight` is divided by `horizon`, so the
    /// latest window costs at most `makespan_weight`.
    pub fn solve_assignment(
        &mut self,
        problem: &mut QuboScheduler,
        horizon: u32,
    ) -> Result<Vec<Assignment>, QuboError> {
        let weight = self.config.makespan_weight / f64::from(horizon.max(1));
        let terms = problem.build(horizon, weight)?;
        let n = problem.variable_map().map_or(0, |m| m.len());
        let solution = self.solve_qubo(&terms, n);
        problem.decode_solution(&solution.bits)
    }

    /// Assigns a start time to every task within `horizon`.
    ///
    /// Candidates respect dependency precedence and resource exclusivity;
    /// the one with the lowest reasoning-weighted occupancy energy wins. The
    /// QUBO solution seeds one guided candidate, the rest are random, up to
    /// `max_attempts` in total. Without any feasible candidate the tasks run
    /// back to back in dependency order.
    pub fn optimize_schedule(
        &mut self,
        tasks: &[Task],
        horizon: u32,
        state: &QuantumReasoningState,
    ) -> ScheduleOutcome {
        if tasks.is_empty() || horizon == 0 {
            return ScheduleOutcome::empty();
        }

        let n = horizon as usize;
        let weights = ReasoningWeights::from_state(state, n);
        let q = weights.matrix();
        let reasoning_influence = weights.influence();

        let graph = match DependencyGraph::build(tasks) {
            Ok(graph) => graph,
            Err(e) => {
                let error = InfeasibleScheduleError::from(e);
                tracing::warn!(%error, "using sequential schedule");
                let order: Vec<usize> = (0..tasks.len()).collect();
                return self.fallback(tasks, &order, &q, reasoning_influence);
            }
        };

        let guide = self.solve_qubo(&weights.terms(), n);
        let engine = WindowEngine::new(tasks, horizon);
        let search = CandidateSearch::new(tasks, &graph, &engine);

        let attempts = self.config.max_attempts.max(1);
        let mut best: Option<(Schedule, f64)> = None;
        let mut consider = |candidate: Option<Schedule>| {
            let Some(schedule) = candidate else {
                return;
            };
            if !validate_dependencies(tasks, &schedule) || !validate_resources(tasks, &schedule) {
                return;
            }
            let energy = schedule_energy(&q, tasks, &schedule);
            if best.as_ref().map_or(true, |(_, e)| energy < *e) {
                best = Some((schedule, energy));
            }
        };

        consider(search.guided(&guide.bits));
        for _ in 1..attempts {
            consider(search.random(&mut self.rng));
        }

        match best {
            Some((schedule, objective_value)) => {
                tracing::debug!(tasks = tasks.len(), horizon, objective_value, "schedule optimized");
                ScheduleOutcome {
                    schedule,
                    objective_value,
                    reasoning_influence,
                    sequential_fallback: false,
                }
            }
            None => {
                let error = InfeasibleScheduleError::NoFeasibleCandidate { attempts };
                tracing::warn!(%error, "using sequential schedule");
                self.fallback(tasks, &graph.topo_order(), &q, reasoning_influence)
            }
        }
    }

    fn fallback(
        &self,
        tasks: &[Task],
        order: &[usize],
        q: &QuboMatrix,
        reasoning_influence: f64,
    ) -> ScheduleOutcome {
        let schedule = sequential(tasks, order);
        ScheduleOutcome {
            objective_value: schedule_energy(q, tasks, &schedule),
            schedule,
            reasoning_influence,
            sequential_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::DecisionPath;
    use crate::solver::external::testing::{FailingSolver, FixedSolver, SlowSolver};
    use crate::task::Agent;
    use serde_json::json;
    use std::time::Duration;

    fn seeded() -> ReasoningScheduler {
        ReasoningScheduler::new(SolverConfig::default().with_seed(17))
    }

    fn state_with_positions(positions: &[usize]) -> QuantumReasoningState {
        let mut state = QuantumReasoningState::new();
        for &p in positions {
            state.add_decision_path(
                DecisionPath::new(format!("p{p}"), 0.0, vec![format!("schedule_{p}")]),
                1.0,
            );
        }
        state
    }

    #[test]
    fn end_to_end_dependency_example() {
        let tasks = vec![
            Task::new("task1", 2),
            Task::new("task2", 1).with_dependency("task1"),
        ];
        let mut scheduler = seeded();
        let outcome = scheduler.optimize_schedule(&tasks, 4, &QuantumReasoningState::new());

        assert!(outcome.schedule.contains_key("task1"));
        assert!(outcome.schedule.contains_key("task2"));
        assert!(outcome.schedule["task1"] < outcome.schedule["task2"]);
        assert!(!outcome.sequential_fallback);
        assert_eq!(outcome.reasoning_influence, 0.0);
    }

    #[test]
    fn dependency_ordering_holds_across_seeds() {
        let tasks = vec![Task::new("a", 1), Task::new("b", 1).with_dependency("a")];
        for seed in 0..20 {
            let mut scheduler = ReasoningScheduler::new(SolverConfig::default().with_seed(seed));
            let outcome = scheduler.optimize_schedule(&tasks, 6, &state_with_positions(&[0, 3]));
            assert!(outcome.schedule["a"] < outcome.schedule["b"]);
        }
    }

    #[test]
    fn shared_resources_never_overlap() {
        let tasks = vec![
            Task::new("a", 2).with_resource("gpu"),
            Task::new("b", 2).with_resource("gpu"),
            Task::new("c", 2).with_resource("gpu"),
        ];
        let mut scheduler = seeded();
        let outcome = scheduler.optimize_schedule(&tasks, 6, &QuantumReasoningState::new());
        assert!(validate_resources(&tasks, &outcome.schedule));
        let mut starts: Vec<u32> = outcome.schedule.values().copied().collect();
        starts.sort_unstable();
        assert_eq!(starts, vec![0, 2, 4]);
    }

    #[test]
    fn reasoning_influence_is_reported() {
        let tasks = vec![Task::new("a", 1)];
        let mut scheduler = seeded();
        let outcome = scheduler.optimize_schedule(&tasks, 4, &state_with_positions(&[1]));
        assert!((outcome.reasoning_influence - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reasoning_pulls_task_to_favoured_slot() {
        let tasks = vec![Task::new("a", 1)];
        let mut scheduler = seeded();
        let outcome = scheduler.optimize_schedule(&tasks, 4, &state_with_positions(&[2]));
        assert_eq!(outcome.schedule["a"], 2);
        assert!((outcome.objective_value - 0.0).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_give_empty_schedule() {
        let mut scheduler = seeded();
        let state = QuantumReasoningState::new();
        let outcome = scheduler.optimize_schedule(&[], 4, &state);
        assert!(outcome.schedule.is_empty());
        let outcome = scheduler.optimize_schedule(&[Task::new("a", 1)], 0, &state);
        assert!(outcome.schedule.is_empty());
        assert_eq!(outcome.objective_value, 0.0);
    }

    #[test]
    fn infeasible_horizon_falls_back_to_sequential() {
        let tasks = vec![Task::new("a", 3), Task::new("b", 3).with_dependency("a")];
        let mut scheduler = seeded();
        let outcome = scheduler.optimize_schedule(&tasks, 4, &QuantumReasoningState::new());
        assert!(outcome.sequential_fallback);
        assert_eq!(outcome.schedule["a"], 0);
        assert_eq!(outcome.schedule["b"], 3);
    }

    #[test]
    fn dependency_cycle_falls_back_to_sequential() {
        let tasks = vec![
            Task::new("a", 1).with_dependency("b"),
            Task::new("b", 1).with_dependency("a"),
        ];
        let mut scheduler = seeded();
        let outcome = scheduler.optimize_schedule(&tasks, 4, &QuantumReasoningState::new());
        assert!(outcome.sequential_fallback);
        assert_eq!(outcome.schedule.len(), 2);
    }

    #[test]
    fn failing_external_solver_falls_back() {
        let state = state_with_positions(&[0, 2, 5]);
        for seed in 0..10 {
            let mut scheduler = ReasoningScheduler::new(SolverConfig::default().with_seed(seed))
                .with_external_solver(Arc::new(FailingSolver));
            let terms = scheduler.build_qubo_with_reasoning(6, &state);
            let solution = scheduler.solve_qubo(&terms, 6);
            assert_eq!(solution.source, SolutionSource::Classical);
            assert_eq!(solution.bits.len(), 6);
            assert!(solution.energy <= solution.seed_energy + 1e-12);
        }
    }

    #[test]
    fn malformed_external_answer_falls_back() {
        let mut scheduler = seeded()
            .with_external_solver(Arc::new(FixedSolver(json!({"solution": [1, 0]}))));
        let terms = scheduler.build_qubo_with_reasoning(3, &QuantumReasoningState::new());
        let solution = scheduler.solve_qubo(&terms, 3);
        assert_eq!(solution.source, SolutionSource::Classical);
    }

    #[test]
    fn external_timeout_falls_back() {
        let config = SolverConfig {
            submission_timeout: Duration::from_millis(20),
            ..SolverConfig::default().with_seed(1)
        };
        let mut scheduler = ReasoningScheduler::new(config)
            .with_external_solver(Arc::new(SlowSolver(Duration::from_millis(500))));
        let terms = scheduler.build_qubo_with_reasoning(2, &QuantumReasoningState::new());
        assert_eq!(scheduler.solve_qubo(&terms, 2).source, SolutionSource::Classical);
    }

    #[test]
    fn external_configuration_answer_is_used() {
        let response = json!({"solutions": [{"configuration": {"1": 1}}]});
        let mut scheduler = seeded().with_external_solver(Arc::new(FixedSolver(response)));
        let terms = scheduler.build_qubo_with_reasoning(3, &QuantumReasoningState::new());
        let solution = scheduler.solve_qubo(&terms, 3);
        assert_eq!(solution.bits, vec![0, 1, 0]);
        assert_eq!(solution.source, SolutionSource::External("fixed".into()));
        assert_eq!(solution.energy, 1.0);
    }

    #[test]
    fn assignment_problem_is_solved_and_decoded() {
        let mut problem = QuboScheduler::with_problem(
            vec![Task::new("t1", 2), Task::new("t2", 2)],
            vec![Agent::new("a1")],
        );
        for seed in 0..10 {
            let mut scheduler = ReasoningScheduler::new(SolverConfig::default().with_seed(seed));
            let assignments = scheduler.solve_assignment(&mut problem, 4).unwrap();
            assert_eq!(assignments.len(), 2);
            assert!(!assignments[0].window.overlaps(&assignments[1].window));
        }
    }
}
