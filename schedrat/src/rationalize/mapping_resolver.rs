use std::collections::HashSet;

/// outcome of following a mapping chain to its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// the chain ended at a node that maps to itself
    Base(usize),
    /// the chain revisited `revisited`. `last` is the final node reached
    /// before the chain closed on itself.
    Cycle { last: usize, revisited: usize },
}

impl Resolution {
    pub fn node(&self) -> usize {
        match self {
            Resolution::Base(node) => *node,
            Resolution::Cycle { last, .. } => *last,
        }
    }
}

/// directed "maps to" relation over indexed items where every item maps to at
/// most one other. resolution follows the chain to a fixed point and compresses
/// the visited path so later lookups are constant time.
#[derive(Debug, Clone)]
pub struct MappingResolver {
    parent: Vec<usize>,
}

impl MappingResolver {
    pub fn new(size: usize) -> MappingResolver {
        MappingResolver {
            parent: (0..size).collect(),
        }
    }

    pub fn is_mapped(&self, node: usize) -> bool {
        self.parent.get(node).is_some_and(|p| *p != node)
    }

    /// records `source -> target` unless `source` is already mapped; the first
    /// mapping recorded for a source wins.
    pub fn map(&mut self, source: usize, target: usize) -> bool {
        if source == target || target >= self.parent.len() || self.is_mapped(source) {
            return false;
        }
        match self.parent.get_mut(source) {
            Some(p) => {
                *p = target;
                true
            }
            None => false,
        }
    }

    pub fn resolve(&mut self, node: usize) -> Resolution {
        let mut visited = HashSet::new();
        let mut path = vec![];
        let mut current = node;
        loop {
            if !visited.insert(current) {
                let last = path.last().copied().unwrap_or(current);
                return Resolution::Cycle {
                    last,
                    revisited: current,
                };
            }
            let next = match self.parent.get(current) {
                Some(next) => *next,
                None => return Resolution::Base(current),
            };
            if next == current {
                for p in path {
                    self.parent[p] = current;
                }
                return Resolution::Base(current);
            }
            path.push(current);
            current = next;
        }
    }
}

#[cfg(test)]
mod test {
    use super::{MappingResolver, Resolution};

    #[test]
    fn test_chain_resolves_to_fixed_point() {
        let mut resolver = MappingResolver::new(4);
        assert!(resolver.map(3, 2));
        assert!(resolver.map(2, 0));
        assert_eq!(resolver.resolve(3), Resolution::Base(0));
        assert_eq!(resolver.resolve(1), Resolution::Base(1));
        assert!(!resolver.is_mapped(0));
        assert!(resolver.is_mapped(3));
    }

    #[test]
    fn test_first_mapping_wins() {
        let mut resolver = MappingResolver::new(3);
        assert!(resolver.map(2, 0));
        assert!(!resolver.map(2, 1));
        assert_eq!(resolver.resolve(2), Resolution::Base(0));
    }

    #[test]
    fn test_cycle_stops_without_looping() {
        let mut resolver = MappingResolver::new(3);
        assert!(resolver.map(0, 1));
        assert!(resolver.map(1, 2));
        assert!(resolver.map(2, 0));
        assert_eq!(
            resolver.resolve(0),
            Resolution::Cycle {
                last: 2,
                revisited: 0
            }
        );
    }
}
