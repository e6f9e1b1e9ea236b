use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::info;

use super::entities::EntityBackend;
use super::sentiment::SentimentBackend;
use super::AnalysisError;

type Slot<M> = Mutex<HashMap<String, Arc<M>>>;

/// Loaded model handles keyed by model id. Each id is loaded at most once and
/// then shared by every caller.
#[derive(Default)]
pub struct ModelRegistry {
    sentiment: Slot<SentimentBackend>,
    entities: Slot<EntityBackend>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentiment<F>(&self, model: &str, loader: F) -> Result<Arc<SentimentBackend>, AnalysisError>
    where
        F: FnOnce() -> Result<SentimentBackend, AnalysisError>,
    {
        get_or_load(&self.sentiment, model, loader)
    }

    pub fn entities<F>(&self, model: &str, loader: F) -> Result<Arc<EntityBackend>, AnalysisError>
    where
        F: FnOnce() -> Result<EntityBackend, AnalysisError>,
    {
        get_or_load(&self.entities, model, loader)
    }

    pub fn len(&self) -> usize {
        let sentiment = self.sentiment.lock().map(|m| m.len()).unwrap_or(0);
        let entities = self.entities.lock().map(|m| m.len()).unwrap_or(0);
        sentiment + entities
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn get_or_load<M, F>(slot: &Slot<M>, key: &str, loader: F) -> Result<Arc<M>, AnalysisError>
where
    F: FnOnce() -> Result<M, AnalysisError>,
{
    {
        let cache = slot.lock().map_err(|_| AnalysisError::RegistryPoisoned)?;
        if let Some(model) = cache.get(key) {
            return Ok(Arc::clone(model));
        }
    }

    let model = Arc::new(loader()?);
    info!("Loaded model {}", key);

    let mut cache = slot.lock().map_err(|_| AnalysisError::RegistryPoisoned)?;
    Ok(Arc::clone(
        cache.entry(key.to_string()).or_insert(model),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::nlp::lexicon::LexiconScorer;

    #[test]
    fn loader_runs_once_per_key() {
        let registry = ModelRegistry::new();
        let mut loads = 0;

        for _ in 0..3 {
            registry
                .sentiment("lexicon", || {
                    loads += 1;
                    Ok(SentimentBackend::Lexicon(LexiconScorer::new()))
                })
                .unwrap();
        }

        assert_eq!(loads, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let registry = ModelRegistry::new();
        let err = registry.sentiment("broken", || Err(AnalysisError::MissingToken));
        assert!(err.is_err());
        assert!(registry.is_empty());
    }
}
