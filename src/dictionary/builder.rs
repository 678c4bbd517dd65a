use std::time::{Duration, Instant};

use log::{debug, info};

use super::tables::{PolicyTable, QTable, Table, TableKind};
use crate::{
    Result,
    app::SolveConfig,
    enumeration::{
        StateAction, all_possible_sa_pairs, all_possible_states, deduplicate_states,
        possible_states_for_ground_truths, sa_pairs_from_states,
    },
    exact::{Solver, SolverStats},
    mouselab::{BeliefState, MouselabEnv, State},
    ports::{NoopObserver, TableObserver},
};

/// Which states a table covers.
#[derive(Debug, Clone, Copy)]
pub enum TableScope<'a> {
    /// Every reachable state, deduplicated with the given sentinel.
    Full { sentinel: f64 },
    /// Only states reachable under the given ground truths.
    Partial { ground_truths: &'a [Vec<f64>] },
}

/// Q-values of every reachable (state, action) pair.
pub fn construct_q_dictionary(solver: &mut Solver<'_>, sentinel: f64) -> Result<QTable> {
    let pairs = all_possible_sa_pairs(solver.env(), sentinel)?;
    fill_q(solver, pairs, &mut NoopObserver)
}

/// Optimal decisions in every reachable state.
pub fn construct_pi_dictionary(solver: &mut Solver<'_>, sentinel: f64) -> Result<PolicyTable> {
    let states = deduplicate_states(all_possible_states(solver.env())?, sentinel)?;
    fill_policy(solver, states, &mut NoopObserver)
}

/// Q-values restricted to states reachable under `ground_truths`.
pub fn construct_partial_q_dictionary(
    solver: &mut Solver<'_>,
    ground_truths: &[Vec<f64>],
) -> Result<QTable> {
    let states = possible_states_for_ground_truths(solver.env(), ground_truths)?;
    fill_q(solver, sa_pairs_from_states(&states), &mut NoopObserver)
}

/// Decisions restricted to states reachable under `ground_truths`.
pub fn construct_partial_pi_dictionary(
    solver: &mut Solver<'_>,
    ground_truths: &[Vec<f64>],
) -> Result<PolicyTable> {
    let states = possible_states_for_ground_truths(solver.env(), ground_truths)?;
    fill_policy(solver, states, &mut NoopObserver)
}

/// Build a table of `kind` over `scope`, reporting progress to `observer`.
pub fn build_table(
    solver: &mut Solver<'_>,
    kind: TableKind,
    scope: TableScope<'_>,
    observer: &mut dyn TableObserver,
) -> Result<Table> {
    let env = solver.env();
    let states = match scope {
        TableScope::Full { sentinel } => deduplicate_states(all_possible_states(env)?, sentinel)?,
        TableScope::Partial { ground_truths } => {
            possible_states_for_ground_truths(env, ground_truths)?
        }
    };
    debug!("building {kind} table over {} states", states.len());
    match kind {
        TableKind::Q => fill_q(solver, sa_pairs_from_states(&states), observer).map(Table::Q),
        TableKind::Policy => fill_policy(solver, states, observer).map(Table::Policy),
    }
}

fn fill_q(
    solver: &mut Solver<'_>,
    pairs: Vec<StateAction>,
    observer: &mut dyn TableObserver,
) -> Result<QTable> {
    observer.on_table_start(TableKind::Q, pairs.len())?;
    let mut table = QTable::new();
    for (done, (state, action)) in pairs.into_iter().enumerate() {
        let q = solver.q(&State::Belief(state.clone()), action)?;
        table.insert(state, action, q);
        observer.on_entry(done + 1)?;
    }
    observer.on_table_end(table.len())?;
    Ok(table)
}

fn fill_policy(
    solver: &mut Solver<'_>,
    states: Vec<BeliefState>,
    observer: &mut dyn TableObserver,
) -> Result<PolicyTable> {
    observer.on_table_start(TableKind::Policy, states.len())?;
    let mut table = PolicyTable::new();
    for (done, state) in states.into_iter().enumerate() {
        let record = solver.pi(&State::Belief(state.clone()))?;
        table.insert(state, record);
        observer.on_entry(done + 1)?;
    }
    observer.on_table_end(table.len())?;
    Ok(table)
}

/// Result of [`timed_solve`].
#[derive(Debug)]
pub struct SolveReport<'env> {
    pub solver: Solver<'env>,
    /// Optimal value of the initial state.
    pub value: f64,
    /// Time to solve the initial state.
    pub solve_time: Duration,
    /// Time including table construction.
    pub total_time: Duration,
    pub stats: SolverStats,
    pub table: Option<Table>,
}

/// Solve `env` from its initial state and optionally build the table the
/// configuration asks for.
///
/// With `ground_truths` the table is restricted to states reachable under
/// them; otherwise it covers every reachable state.
pub fn timed_solve<'env>(
    env: &'env MouselabEnv,
    config: &SolveConfig,
    ground_truths: Option<&[Vec<f64>]>,
    observer: &mut dyn TableObserver,
) -> Result<SolveReport<'env>> {
    let start = Instant::now();
    let mut solver = Solver::new(env)
        .with_canonicalization(config.canonicalization)
        .with_blinkered(config.blinkered);

    let value = solver.v(&env.initial_state())?;
    let solve_time = start.elapsed();
    info!("optimal -> {value:.2} in {:.3} sec", solve_time.as_secs_f64());
    info!("rewarded fraction: {}", env.pct_reward());
    info!(
        "q calls: {}, v calls: {}",
        solver.stats().q_calls,
        solver.stats().v_calls
    );

    let table = match config.table {
        Some(kind) => {
            let scope = match ground_truths {
                Some(ground_truths) => TableScope::Partial { ground_truths },
                None => TableScope::Full {
                    sentinel: config.sentinel,
                },
            };
            let table = build_table(&mut solver, kind, scope, observer)?;
            info!("{kind} table holds {} entries", table.len());
            Some(table)
        }
        None => None,
    };

    Ok(SolveReport {
        stats: *solver.stats(),
        solver,
        value,
        solve_time,
        total_time: start.elapsed(),
        table,
    })
}
