//! QUBO term builder for task–agent–window scheduling.

use crate::task::{Agent, Task};
use crate::time_window::TimeWindow;
use crate::Id;

use super::error::QuboError;
use super::term::QuboTerm;
use super::variables::VariableMap;
use super::wire::{format_problem, ProblemPayload, ProblemType};

/// Penalty on each pair of variables of one task (exactly-one constraint).
const ASSIGNMENT_PAIR_PENALTY: f64 = 2.0;
/// Reward on each single variable of one task (exactly-one constraint).
const ASSIGNMENT_LINEAR_REWARD: f64 = -1.0;
/// Penalty on each pair of overlapping variables on one agent.
const OVERLAP_PENALTY: f64 = 2.0;

/// One decoded `(task, agent, window)` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub task_id: Id,
    pub agent_id: Id,
    pub window: TimeWindow,
}

/// Builds the QUBO for placing tasks on agents within a horizon.
///
/// The problem has three parts:
///
/// 1. **Exactly-one assignment**: for every task, `-1` per variable and `+2`
///    per unordered pair of its variables. The energy `k² - 2k` over the `k`
///    selected variables is minimal at `k = 1`.
/// 2. **Agent overlap**: `+2` for every pair of variables on the same agent
///    whose windows overlap.
/// 3. **Makespan**: `weight · window.end` per variable, so earlier completion
///    is cheaper.
///
/// # Example
///
/// ```
/// use qam::qubo::QuboScheduler;
/// use qam::task::{Agent, Task};
///
/// let mut scheduler = QuboScheduler::new();
/// scheduler.add_task(Task::new("t1", 2));
/// scheduler.add_agent(Agent::new("a1"));
///
/// let terms = scheduler.build(4, 0.1).unwrap();
/// assert!(!terms.is_empty());
/// assert_eq!(scheduler.variable_map().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuboScheduler {
    tasks: Vec<Task>,
    agents: Vec<Agent>,
    variables: Option<VariableMap>,
}

impl QuboScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scheduler preloaded with `tasks` and `agents`.
    pub fn with_problem(tasks: Vec<Task>, agents: Vec<Agent>) -> Self {
        Self {
            tasks,
            agents,
            variables: None,
        }
    }

    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// The mapping created by the last build, if any.
    pub fn variable_map(&self) -> Option<&VariableMap> {
        self.variables.as_ref()
    }

    /// (Re)creates the variable mapping for `horizon`, invalidating any
    /// previously issued indices.
    pub fn create_variable_mapping(&mut self, horizon: u32) -> &VariableMap {
        self.variables
            .insert(VariableMap::build(&self.tasks, &self.agents, horizon))
    }

    fn mapping(&self, what: &'static str) -> Result<&VariableMap, QuboError> {
        self.variables
            .as_ref()
            .ok_or(QuboError::MissingVariableMap(what))
    }

    /// Exactly-one assignment terms for every task.
    ///
    /// # Errors
    ///
    /// `MissingVariableMap` if no mapping has been created yet.
    pub fn build_assignment_constraints(&self) -> Result<Vec<QuboTerm>, QuboError> {
        let map = self.mapping("task assignment constraints")?;
        let mut terms = Vec::new();
        for task in &self.tasks {
            let vars: Vec<usize> = map.indices_for_task(&task.id).collect();
            for (pos, &i) in vars.iter().enumerate() {
                terms.push(QuboTerm::linear(i, ASSIGNMENT_LINEAR_REWARD));
                for &j in &vars[pos + 1..] {
                    terms.push(QuboTerm::quadratic(i, j, ASSIGNMENT_PAIR_PENALTY));
                }
            }
        }
        Ok(terms)
    }

    /// Penalties for overlapping windows on the same agent.
    ///
    /// # Errors
    ///
    /// `MissingVariableMap` if no mapping has been created yet.
    pub fn build_overlap_constraints(&self) -> Result<Vec<QuboTerm>, QuboError> {
        let map = self.mapping("agent overlap constraints")?;
        let mut terms = Vec::new();
        for agent in &self.agents {
            let vars: Vec<(usize, TimeWindow)> = map
                .indices_for_agent(&agent.id)
                .filter_map(|i| map.decode(i).map(|k| (i, k.window)))
                .collect();
            for (pos, &(i, wi)) in vars.iter().enumerate() {
                for &(j, wj) in &vars[pos + 1..] {
                    if wi.overlaps(&wj) {
                        terms.push(QuboTerm::quadratic(i, j, OVERLAP_PENALTY));
                    }
                }
            }
        }
        Ok(terms)
    }

    /// Linear completion-time terms.
    ///
    /// # Errors
    ///
    /// `MissingVariableMap` if no mapping has been created yet.
    pub fn build_makespan_objective(&self, weight: f64) -> Result<Vec<QuboTerm>, QuboError> {
        let map = self.mapping("makespan objective")?;
        Ok(map
            .iter()
            .map(|(i, key)| QuboTerm::linear(i, weight * f64::from(key.window.end())))
            .collect())
    }

    /// Creates a fresh mapping for `horizon` and returns the complete QUBO.
    pub fn build(&mut self, horizon: u32, makespan_weight: f64) -> Result<Vec<QuboTerm>, QuboError> {
        self.create_variable_mapping(horizon);

        let mut terms = self.build_assignment_constraints()?;
        terms.extend(self.build_overlap_constraints()?);
        terms.extend(self.build_makespan_objective(makespan_weight)?);

        tracing::debug!(
            horizon,
            variables = self.variables.as_ref().map_or(0, VariableMap::len),
            terms = terms.len(),
            "built scheduling QUBO"
        );
        Ok(terms)
    }

    /// Decodes a solved bit vector into the selected assignments.
    ///
    /// # Errors
    ///
    /// - `MissingVariableMap` if no mapping exists
    /// - `SolutionLength` if `bits` does not match the mapping size
    pub fn decode_solution(&self, bits: &[u8]) -> Result<Vec<Assignment>, QuboError> {
        let map = self.mapping("solution decoding")?;
        if bits.len() != map.len() {
            return Err(QuboError::SolutionLength {
                expected: map.len(),
                found: bits.len(),
            });
        }
        Ok(map
            .iter()
            .filter(|(i, _)| bits[*i] != 0)
            .map(|(_, key)| Assignment {
                task_id: key.task_id.clone(),
                agent_id: key.agent_id.clone(),
                window: key.window,
            })
            .collect())
    }

    /// Formats `terms` with the external solver wire schema.
    pub fn format_for_external(&self, terms: &[QuboTerm]) -> ProblemPayload {
        format_problem(terms, ProblemType::Qubo)
    }
}
