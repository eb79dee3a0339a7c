use super::{
    CommentStrategy, GoStrategy, PythonStrategy, RustStrategy, SourceLanguage, WasmStrategy,
    DEFAULT_SENTINEL,
};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn CommentStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::with_sentinel(DEFAULT_SENTINEL)
    }

    /// Registers every built-in strategy matching `@<sentinel>` tags
    pub fn with_sentinel(sentinel: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GoStrategy::new(sentinel)));
        registry.register(Arc::new(RustStrategy::new(sentinel)));
        registry.register(Arc::new(PythonStrategy::new(sentinel)));
        registry.register(Arc::new(WasmStrategy::new(sentinel)));
        registry
    }

    /// Later registrations for the same language replace earlier ones
    pub fn register(&mut self, strategy: Arc<dyn CommentStrategy>) {
        self.strategies
            .retain(|existing| existing.language() != strategy.language());
        self.strategies.push(strategy);
    }

    pub fn get(&self, language: SourceLanguage) -> Option<Arc<dyn CommentStrategy>> {
        self.strategies
            .iter()
            .find(|s| s.language() == language)
            .cloned()
    }

    pub fn languages(&self) -> Vec<SourceLanguage> {
        self.strategies.iter().map(|s| s.language()).collect()
    }

    pub fn all_excluded_dirs(&self) -> Vec<&str> {
        let mut set = HashSet::new();
        for strategy in &self.strategies {
            for dir in strategy.excluded_dirs() {
                set.insert(*dir);
            }
        }
        let mut dirs: Vec<&str> = set.into_iter().collect();
        dirs.sort_unstable();
        dirs
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
