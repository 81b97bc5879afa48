use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    fmt::Debug,
    ops::{Deref, DerefMut},
};

use log::debug;

/// Supertrait that collects all the requirements on the NodeReference values
/// Must be copy, comparable and not references (hence 'static)
pub trait NodeReference: Copy + Eq + Debug + 'static {}

pub trait MapTrait {
    /// The type that can be used to reference nodes in the map
    type Reference: NodeReference;

    /// The type that the map uses for storage
    type Storage<T: Default + Copy + Clone + 'static>: MapStorage<T, Reference = Self::Reference>;

    /// Check if the provided node reference is valid
    fn is_valid(&self, node: Self::Reference) -> bool;

    /// Return an iterator over the nodes that can be reached from the provided node in one step.
    /// Every step has the same cost.
    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference>;

    /// Lower bound on the number of steps between two nodes. Must never overestimate, otherwise
    /// the returned paths are no longer guaranteed to be the shortest.
    fn estimate(&self, from: Self::Reference, to: Self::Reference) -> usize;

    /// Create a storage for values of type T
    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T>;
}

pub trait MapStorage<T> {
    type Reference: NodeReference;

    fn is_valid(&self, node: Self::Reference) -> bool;
    fn get(&self, node: Self::Reference) -> T;
    fn get_mut(&mut self, node: Self::Reference) -> &mut T;
}

/// The objects that we store in the priority queue
#[derive(Debug)]
struct ToVisit<R> {
    /// cost so far plus the estimate of the remaining cost
    estimate: usize,
    /// insertion order, breaks ties between equal estimates
    sequence: u64,
    cost: usize,
    point: R,
}

impl<R> Ord for ToVisit<R> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.estimate
            .cmp(&other.estimate)
            .then(self.sequence.cmp(&other.sequence))
            .reverse() // reverse for BinaryHeap to be a min-heap
    }
}

impl<R> PartialOrd for ToVisit<R> {
    fn partial_cmp(&self, other: &ToVisit<R>) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> PartialEq for ToVisit<R> {
    fn eq(&self, other: &ToVisit<R>) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R> Eq for ToVisit<R> {}

#[derive(Clone, Copy, Debug)]
pub struct VisitedItem<R> {
    pub cost: usize,
    pub from: Option<R>,
}

/// Best known cost and predecessor of a node, `None` while the node has not been reached
#[derive(Clone, Copy, Debug)]
pub struct Visited<R>(Option<VisitedItem<R>>);

impl<R> Default for Visited<R> {
    fn default() -> Self {
        Visited(None)
    }
}
impl<R> Deref for Visited<R> {
    type Target = Option<VisitedItem<R>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<R> DerefMut for Visited<R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<R: Copy> Visited<R> {
    fn cost(&self) -> Option<usize> {
        self.0.map(|item| item.cost)
    }

    fn predecessor(&self) -> Option<R> {
        self.0.and_then(|item| item.from)
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult<R> {
    /// all nodes from start to goal, both included
    pub path: Vec<R>,
    pub start: R,
    pub goal: R,
    pub total_cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState<R> {
    Computing,
    NoPathFound,
    PathFound(PathResult<R>),
}

impl<R> PathFinderState<R> {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// A* search that can be advanced one node expansion at a time
#[derive(Debug)]
pub struct PathFinder<
    R: NodeReference,
    S: MapStorage<Visited<R>, Reference = R>,
    M: MapTrait<Reference = R, Storage<Visited<R>> = S>,
> {
    start: R,
    goal: R,
    visited: S,
    visit_list: BinaryHeap<ToVisit<R>>,
    sequence: u64,
    expanded: usize,
    state: PathFinderState<R>,
    _map: std::marker::PhantomData<M>,
}

impl<
        R: NodeReference,
        S: MapStorage<Visited<R>, Reference = R>,
        M: MapTrait<Reference = R, Storage<Visited<R>> = S>,
    > PathFinder<R, S, M>
{
    pub fn new(start: R, goal: R, visited: S) -> Self {
        let mut finder = Self {
            start,
            goal,
            visited,
            visit_list: BinaryHeap::new(),
            sequence: 0,
            expanded: 0,
            state: PathFinderState::Computing,
            _map: std::marker::PhantomData,
        };

        if !finder.visited.is_valid(start) {
            finder.state = PathFinderState::NoPathFound;
            return finder;
        }

        *finder.visited.get_mut(start) = Visited(Some(VisitedItem {
            cost: 0,
            from: None,
        }));
        // the start is alone in the frontier, its estimate is never compared
        finder.push(0, 0, start);
        finder
    }

    fn push(&mut self, estimate: usize, cost: usize, point: R) {
        self.visit_list.push(ToVisit {
            estimate,
            sequence: self.sequence,
            cost,
            point,
        });
        self.sequence += 1;
    }

    pub fn finish(mut self, map: &M) -> (PathFinderState<R>, S) {
        loop {
            match self.step(map) {
                PathFinderState::Computing => {}
                s => return (s, self.visited),
            }
        }
    }

    pub fn step(&mut self, map: &M) -> PathFinderState<R> {
        if self.state.is_done() {
            return self.state.clone();
        }
        let Some(visit) = self.visit_list.pop() else {
            debug!(
                "frontier exhausted after expanding {} nodes, {:?} is unreachable",
                self.expanded, self.goal
            );
            self.state = PathFinderState::NoPathFound;
            return self.state.clone();
        };

        // a cheaper route to this point was found after this entry was queued
        if self
            .visited
            .get(visit.point)
            .cost()
            .is_some_and(|best| visit.cost > best)
        {
            return self.state.clone();
        }
        self.expanded += 1;

        if visit.point == self.goal {
            // backtrack to find the total shortest path
            let mut path: Vec<R> = vec![self.goal];
            let mut current = self.goal;
            while let Some(from) = self.visited.get(current).predecessor() {
                path.push(from);
                current = from;
            }
            path.reverse();

            debug!(
                "found goal {:?} at cost {} after expanding {} nodes",
                self.goal, visit.cost, self.expanded
            );

            self.state = PathFinderState::PathFound(PathResult {
                path,
                total_cost: visit.cost,
                start: self.start,
                goal: self.goal,
            });
            return self.state.clone();
        }

        let tentative = visit.cost + 1;
        for point in map.neighbors_of(visit.point) {
            // only strictly better routes are recorded, so no node is queued twice at one cost
            let improves = match self.visited.get(point).cost() {
                Some(best) => tentative < best,
                None => true,
            };
            if improves {
                *self.visited.get_mut(point) = Visited(Some(VisitedItem {
                    cost: tentative,
                    from: Some(visit.point),
                }));
                self.push(tentative + map.estimate(point, self.goal), tentative, point);
            }
        }

        self.state.clone()
    }

    pub fn state(&self) -> &PathFinderState<R> {
        &self.state
    }

    pub fn get_visited(&self) -> &S {
        &self.visited
    }

    /// Number of nodes taken off the frontier and expanded so far
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    pub fn start(&self) -> R {
        self.start
    }

    pub fn goal(&self) -> R {
        self.goal
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::{Grid, Point};

    #[test]
    fn test_step_until_found() {
        let grid: Grid = "#####\n#   #\n#####".parse().unwrap();
        let mut finder = PathFinder::new(Point::new(1, 1), Point::new(3, 1), grid.create_storage());

        let mut steps = 0;
        while !finder.step(&grid).is_done() {
            steps += 1;
        }

        assert_eq!(steps, 2);
        assert_eq!(finder.expanded(), 3);
        assert_eq!(
            finder.state(),
            &PathFinderState::PathFound(PathResult {
                path: vec![Point::new(1, 1), Point::new(2, 1), Point::new(3, 1)],
                start: Point::new(1, 1),
                goal: Point::new(3, 1),
                total_cost: 2,
            })
        );
        // finished searches keep their result
        assert_eq!(&finder.step(&grid), finder.state());
        assert_eq!(finder.get_visited().get(Point::new(2, 1)).cost(), Some(1));
    }

    #[test]
    fn test_start_outside_map() {
        let grid = Grid::new(3, 3);
        let finder: PathFinder<_, _, Grid> =
            PathFinder::new(Point::new(5, 1), Point::new(1, 1), grid.create_storage());

        assert_eq!(finder.start(), Point::new(5, 1));
        assert_eq!(finder.goal(), Point::new(1, 1));
        assert_eq!(finder.finish(&grid).0, PathFinderState::NoPathFound);
    }

    #[test]
    fn test_frontier_orders_by_estimate_then_insertion() {
        let mut heap = BinaryHeap::new();
        for (estimate, sequence) in [(5, 0), (3, 1), (3, 2), (4, 3), (3, 4)] {
            heap.push(ToVisit {
                estimate,
                sequence,
                cost: 0,
                point: sequence,
            });
        }

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|v| v.sequence)).collect();
        assert_eq!(order, vec![1, 2, 4, 3, 0]);
    }

    #[test]
    fn test_visited_defaults_to_unreached() {
        let visited: Visited<u8> = Visited::default();
        assert!(visited.is_none());
        assert_eq!(visited.cost(), None);
        assert_eq!(visited.predecessor(), None);
    }
}
