//! Best-first graph search over puzzle states.
//!
//! Every algorithm runs the same loop: pop the cheapest node off a priority
//! queue, test it for the goal, skip it if its state was already expanded,
//! otherwise expand it and queue the successors whose states were not. They
//! differ only in the key the queue is ordered by, and in whether the loop
//! stops at the first goal (everything but Branch-and-Bound) or keeps going
//! to tighten an upper bound.
//!
//! Nodes live in an arena for the duration of one search and refer to their
//! parent by index; the path is copied out of the arena when a goal is found.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{Duration, Instant};

use fxhash::FxHashSet;
use itertools::Itertools;
use log::{debug, info, log_enabled, trace, Level};
use pathfinding::directed::bfs::bfs_reach;
use smallvec::SmallVec;

use crate::error::UnknownName;
use crate::heuristic::{BlockingPieces, Heuristic};
use crate::moves::{perform_moves, successors, Move};
use crate::state::State;

const PROGRESS_INTERVAL: usize = 100_000;

/// A state on a search path, with how it was reached and how it was scored.
#[derive(Clone, Debug)]
pub struct SearchNode {
    state: State,
    last_move: Option<Move>,
    path_cost: u32,
    heuristic_value: u32,
}

impl SearchNode {
    fn root(state: State, heuristic_value: u32) -> Self {
        Self {
            state,
            last_move: None,
            path_cost: 0,
            heuristic_value,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    /// The move that produced this node, `None` for the initial state.
    pub fn last_move(&self) -> Option<&Move> {
        self.last_move.as_ref()
    }

    /// Number of moves from the initial state (`g`).
    pub fn path_cost(&self) -> u32 {
        self.path_cost
    }

    /// Heuristic estimate for this node's state (`h`), zero in an uninformed
    /// search.
    pub fn heuristic_value(&self) -> u32 {
        self.heuristic_value
    }

    /// `g + h`.
    pub fn total_cost(&self) -> u32 {
        self.path_cost.saturating_add(self.heuristic_value)
    }

    pub fn description(&self) -> String {
        match &self.last_move {
            Some(mv) => mv.to_string(),
            None => "Initial state".to_owned(),
        }
    }
}

/// Counters for a single search run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes taken off the frontier and goal-tested or expanded. Pops of
    /// states that were already expanded are not counted.
    pub nodes_explored: usize,
    /// Successor states produced by expansions, duplicates included.
    pub nodes_generated: usize,
    pub max_frontier_size: usize,
    pub elapsed: Duration,
}

impl Display for SearchStats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes explored, {} generated, max frontier {}, {:.3?}",
            self.nodes_explored, self.nodes_generated, self.max_frontier_size, self.elapsed
        )
    }
}

/// The result of a search. Running out of states is an ordinary outcome.
#[derive(Clone, Debug)]
pub enum SearchOutcome {
    /// `path` runs from the initial state to the goal, both included.
    Solved {
        path: Vec<SearchNode>,
        stats: SearchStats,
    },
    Unsolved {
        stats: SearchStats,
    },
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved { .. })
    }

    pub fn path(&self) -> Option<&[SearchNode]> {
        match self {
            SearchOutcome::Solved { path, .. } => Some(path),
            SearchOutcome::Unsolved { .. } => None,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        match self {
            SearchOutcome::Solved { stats, .. } | SearchOutcome::Unsolved { stats } => stats,
        }
    }

    /// Number of moves in the solution.
    pub fn move_count(&self) -> Option<usize> {
        self.path().map(|path| path.len() - 1)
    }

    /// The solution's moves in order, empty when unsolved.
    pub fn moves(&self) -> Vec<Move> {
        self.path()
            .into_iter()
            .flatten()
            .filter_map(|node| node.last_move().copied())
            .collect()
    }
}

/// Something that can search for a solution from an initial state.
pub trait Solver: Send + Sync {
    fn name(&self) -> &str;

    /// The heuristic guiding this solver, if it uses one.
    fn heuristic(&self) -> Option<&dyn Heuristic>;

    fn solve(&self, initial: &State) -> SearchOutcome;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Termination {
    FirstGoal,
    /// Keep searching after a goal, pruning anything whose `g + h` cannot beat
    /// the cheapest goal found so far.
    Bounded,
}

struct ArenaNode {
    node: SearchNode,
    parent: Option<usize>,
}

fn path_to(arena: &[ArenaNode], goal: usize) -> Vec<SearchNode> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(index) = current {
        path.push(arena[index].node.clone());
        current = arena[index].parent;
    }
    path.reverse();
    path
}

fn best_first<K>(
    name: &str,
    initial: &State,
    heuristic: Option<&dyn Heuristic>,
    key: K,
    termination: Termination,
) -> SearchOutcome
where
    K: Fn(&SearchNode) -> u32,
{
    let start = Instant::now();
    let estimate = |state: &State| heuristic.map_or(0, |h| h.calculate(state));

    let mut stats = SearchStats::default();
    let mut arena = Vec::new();
    let mut visited = FxHashSet::default();
    // ties on the key are popped in insertion order
    let mut frontier = BinaryHeap::new();
    let mut inserted = 0usize;
    let mut upper_bound: Option<u32> = None;
    let mut best = None;

    let root = SearchNode::root(initial.clone(), estimate(initial));
    frontier.push(Reverse((key(&root), inserted, 0)));
    arena.push(ArenaNode {
        node: root,
        parent: None,
    });
    stats.max_frontier_size = 1;

    let mut buffer = SmallVec::<[(Move, State); 32]>::new();
    while let Some(Reverse((_, _, index))) = frontier.pop() {
        let node = &arena[index].node;

        if node.state.is_goal() {
            stats.nodes_explored += 1;
            match termination {
                Termination::FirstGoal => {
                    best = Some(index);
                    break;
                }
                Termination::Bounded => {
                    if upper_bound.map_or(true, |bound| node.path_cost < bound) {
                        debug!("{name}: new best solution of {} moves", node.path_cost);
                        upper_bound = Some(node.path_cost);
                        best = Some(index);
                    }
                    continue;
                }
            }
        }

        if visited.contains(&node.state) {
            continue;
        }
        if upper_bound.map_or(false, |bound| node.total_cost() >= bound) {
            continue;
        }

        stats.nodes_explored += 1;
        if log_enabled!(Level::Debug) && stats.nodes_explored % PROGRESS_INTERVAL == 0 {
            debug!(
                "{name}: {} nodes explored, frontier {}, depth {}",
                stats.nodes_explored,
                frontier.len(),
                node.path_cost
            );
        }
        trace!(
            "{name}: expanding {} (g={}, h={})",
            node.description(),
            node.path_cost,
            node.heuristic_value
        );

        visited.insert(node.state.clone());
        let path_cost = node.path_cost + 1;
        buffer.clear();
        perform_moves(&node.state, &mut buffer);
        stats.nodes_generated += buffer.len();

        for (mv, state) in buffer.drain(..) {
            if visited.contains(&state) {
                continue;
            }

            let heuristic_value = estimate(&state);
            let child = SearchNode {
                state,
                last_move: Some(mv),
                path_cost,
                heuristic_value,
            };
            if upper_bound.map_or(false, |bound| child.total_cost() >= bound) {
                continue;
            }

            inserted += 1;
            frontier.push(Reverse((key(&child), inserted, arena.len())));
            arena.push(ArenaNode {
                node: child,
                parent: Some(index),
            });
        }

        stats.max_frontier_size = stats.max_frontier_size.max(frontier.len());
    }

    stats.elapsed = start.elapsed();
    let heuristic_name = heuristic.map_or("none", |h| h.name());
    match best {
        Some(goal) => {
            let path = path_to(&arena, goal);
            info!(
                "{name} (heuristic: {heuristic_name}) solved in {} moves: {stats}",
                path.len() - 1
            );
            SearchOutcome::Solved { path, stats }
        }
        None => {
            info!("{name} (heuristic: {heuristic_name}) found no solution: {stats}");
            SearchOutcome::Unsolved { stats }
        }
    }
}

/// Expands states in order of path cost. Finds a solution with the fewest
/// moves.
#[derive(Copy, Clone, Debug, Default)]
pub struct UniformCost;

impl Solver for UniformCost {
    fn name(&self) -> &str {
        Algorithm::UniformCost.name()
    }

    fn heuristic(&self) -> Option<&dyn Heuristic> {
        None
    }

    fn solve(&self, initial: &State) -> SearchOutcome {
        best_first(
            self.name(),
            initial,
            None,
            SearchNode::path_cost,
            Termination::FirstGoal,
        )
    }
}

macro_rules! informed_solver {
    ($(#[$meta:meta])* $solver:ident) => {
        $(#[$meta])*
        pub struct $solver {
            heuristic: Box<dyn Heuristic>,
        }

        impl $solver {
            pub fn new<H: Heuristic + 'static>(heuristic: H) -> Self {
                Self {
                    heuristic: Box::new(heuristic),
                }
            }
        }

        impl Default for $solver {
            fn default() -> Self {
                Self::new(BlockingPieces)
            }
        }
    };
}

informed_solver!(
    /// Expands states in order of heuristic value alone. Usually explores far
    /// fewer states than the others, at the price of longer solutions.
    GreedyBestFirst
);

informed_solver!(
    /// Expands states in order of `g + h`. Optimal when the heuristic never
    /// overestimates.
    AStar
);

informed_solver!(
    /// Orders by `g + h` like A*, but keeps searching after the first goal and
    /// prunes every node whose `g + h` is no better than the cheapest goal
    /// found so far.
    BranchAndBound
);

impl Solver for GreedyBestFirst {
    fn name(&self) -> &str {
        Algorithm::GreedyBestFirst.name()
    }

    fn heuristic(&self) -> Option<&dyn Heuristic> {
        Some(&*self.heuristic)
    }

    fn solve(&self, initial: &State) -> SearchOutcome {
        best_first(
            self.name(),
            initial,
            Some(&*self.heuristic),
            SearchNode::heuristic_value,
            Termination::FirstGoal,
        )
    }
}

impl Solver for AStar {
    fn name(&self) -> &str {
        Algorithm::AStar.name()
    }

    fn heuristic(&self) -> Option<&dyn Heuristic> {
        Some(&*self.heuristic)
    }

    fn solve(&self, initial: &State) -> SearchOutcome {
        best_first(
            self.name(),
            initial,
            Some(&*self.heuristic),
            SearchNode::total_cost,
            Termination::FirstGoal,
        )
    }
}

impl Solver for BranchAndBound {
    fn name(&self) -> &str {
        Algorithm::BranchAndBound.name()
    }

    fn heuristic(&self) -> Option<&dyn Heuristic> {
        Some(&*self.heuristic)
    }

    fn solve(&self, initial: &State) -> SearchOutcome {
        best_first(
            self.name(),
            initial,
            Some(&*self.heuristic),
            SearchNode::total_cost,
            Termination::Bounded,
        )
    }
}

/// The search algorithms, selectable by name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Algorithm {
    UniformCost,
    GreedyBestFirst,
    AStar,
    BranchAndBound,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::UniformCost,
        Algorithm::GreedyBestFirst,
        Algorithm::AStar,
        Algorithm::BranchAndBound,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::UniformCost => "Uniform Cost Search",
            Algorithm::GreedyBestFirst => "Greedy Best-First Search",
            Algorithm::AStar => "A* Search",
            Algorithm::BranchAndBound => "Branch and Bound",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            Algorithm::UniformCost => &["ucs"],
            Algorithm::GreedyBestFirst => &["gbfs", "greedy"],
            Algorithm::AStar => &["astar", "a*"],
            Algorithm::BranchAndBound => &["bnb", "branch-and-bound"],
        }
    }

    pub fn is_informed(self) -> bool {
        self != Algorithm::UniformCost
    }

    /// A solver for this algorithm. Uniform-Cost drops `heuristic`.
    pub fn solver<H: Heuristic + 'static>(self, heuristic: H) -> Box<dyn Solver> {
        match self {
            Algorithm::UniformCost => Box::new(UniformCost),
            Algorithm::GreedyBestFirst => Box::new(GreedyBestFirst::new(heuristic)),
            Algorithm::AStar => Box::new(AStar::new(heuristic)),
            Algorithm::BranchAndBound => Box::new(BranchAndBound::new(heuristic)),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Algorithm::ALL
            .into_iter()
            .find(|a| {
                a.name().eq_ignore_ascii_case(wanted)
                    || a.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(wanted))
            })
            .ok_or_else(|| UnknownName {
                kind: "algorithm",
                name: s.to_owned(),
                expected: Algorithm::ALL.iter().map(|a| a.aliases()[0]).join(", "),
            })
    }
}

/// Number of distinct configurations reachable from `initial`, itself
/// included, following every legal move (exit moves too).
pub fn reachable_states(initial: &State) -> usize {
    bfs_reach(initial.clone(), |state| {
        successors(state).into_iter().map(|(_, next)| next)
    })
    .count()
}
