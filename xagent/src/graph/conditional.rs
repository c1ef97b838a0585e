//! Conditional edges: pick the next node from the state after a node runs.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Router function: `(state) -> key`.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Router plus optional key-to-node map.
///
/// Without a map the key is the next node id (or END). With a map, `map[key]` is used when
/// present and the key itself otherwise.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        match self.path_map.as_ref().and_then(|m| m.get(&key)) {
            Some(target) => target.clone(),
            None => key,
        }
    }
}

/// How the runner finds the node after `from`.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Fixed successor (or END). The node's own `Next` is still honoured.
    Unconditional(String),
    /// Successor chosen by the router; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: A mapped key resolves through the map; an unmapped key is used verbatim.
    #[test]
    fn resolve_with_and_without_map() {
        let router: ConditionalRouter<usize> = ConditionalRouter::new(
            Arc::new(|n: &usize| if *n > 0 { "more".into() } else { "planner".into() }),
            Some([("more".to_string(), "research_team".to_string())].into_iter().collect()),
        );
        assert_eq!(router.resolve_next(&3), "research_team");
        assert_eq!(router.resolve_next(&0), "planner");
    }
}
