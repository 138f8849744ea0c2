//! One-shot transfer of a selected template from the library view to the
//! builder view.
//!
//! The producer writes the template into a single-slot store and redirects
//! with the template id in the query; the consumer reads the slot back and
//! only trusts it when the ids agree.

use crate::config::{AppConfig, TEMPLATE_LIBRARY};
use crate::query::{query_param, TEMPLATE_PARAM};
use crate::types::*;
use tracing::debug;

/// A durable key/value store where each key is a single slot.
///
/// `put` overwrites whatever the slot held before.
pub trait HandoffStore {
    fn put(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    fn peek(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn clear(&mut self, key: &str) -> Result<(), StoreError>;

    fn take(&mut self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.peek(key)?;
        if value.is_some() {
            self.clear(key)?;
        }
        Ok(value)
    }
}

pub trait Navigator {
    fn navigate(&mut self, target: &Navigation) -> Result<(), NavigationError>;
}

/// Remembers every navigation instead of performing it.
#[derive(Debug, Default, Clone)]
pub struct RecordingNavigator {
    pub visited: Vec<Navigation>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, target: &Navigation) -> Result<(), NavigationError> {
        self.visited.push(target.clone());
        Ok(())
    }
}

pub fn builder_navigation(config: &AppConfig, id: &TemplateId) -> Navigation {
    Navigation {
        path: config.builder_path.clone(),
        query: Some(format!("{}={}", TEMPLATE_PARAM, id)),
    }
}

/// Persist `template` under the configured key, then redirect to the
/// builder. A failed write returns before any navigation happens.
pub fn select_template<S, N>(
    store: &mut S,
    navigator: &mut N,
    config: &AppConfig,
    template: &Template,
) -> Result<Navigation, HandoffError>
where
    S: HandoffStore + ?Sized,
    N: Navigator + ?Sized,
{
    if !config.feature(TEMPLATE_LIBRARY) {
        return Err(HandoffError::FeatureDisabled(TEMPLATE_LIBRARY.to_string()));
    }
    let id = TemplateId::parse(&template.id.to_string())?;

    let serialized = serde_json::to_string(template)?;
    store.put(&config.storage_key, &serialized)?;
    debug!(key = %config.storage_key, template = %id, "stored selected template");

    let target = builder_navigation(config, &id);
    navigator.navigate(&target)?;
    Ok(target)
}

/// Builder side of the handoff: the stored template, if it is the one the
/// `template` query parameter asks for.
pub fn load_selected_template<S>(
    store: &S,
    config: &AppConfig,
    query: &str,
) -> Result<Option<Template>, HandoffError>
where
    S: HandoffStore + ?Sized,
{
    let Some(requested) = query_param(query, TEMPLATE_PARAM) else {
        return Ok(None);
    };
    let Some(raw) = store.peek(&config.storage_key)? else {
        debug!(key = %config.storage_key, "no stored template");
        return Ok(None);
    };

    let template: Template = serde_json::from_str(&raw).map_err(StoreError::Corrupt)?;
    if template.id != requested {
        debug!(stored = %template.id, requested, "stored template does not match request");
        return Ok(None);
    }
    Ok(Some(template))
}

/// Empty the slot once the builder has consumed it.
pub fn finish_handoff<S>(store: &mut S, config: &AppConfig) -> Result<(), HandoffError>
where
    S: HandoffStore + ?Sized,
{
    store.clear(&config.storage_key)?;
    Ok(())
}
