//! Tag → template inverted index.
//!
//! The index is an immutable [`TagSnapshot`] behind an `Arc`. A rebuild
//! constructs a complete new snapshot and swaps the pointer, so a pass that
//! grabbed the previous snapshot keeps a consistent view, and a failed rebuild
//! leaves the previous snapshot in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::SpawnError;
use crate::host::TemplateCatalogue;
use crate::template::Template;

/// One immutable generation of the index.
#[derive(Debug, Default)]
pub struct TagSnapshot {
    /// Pools are sorted by template id so draws are reproducible under a seed.
    by_tag: BTreeMap<String, Vec<Arc<Template>>>,
    by_id: BTreeMap<String, Arc<Template>>,
}

impl TagSnapshot {
    /// Index `templates`.
    ///
    /// Invalid templates are skipped with a warning. When two templates share
    /// an id the first one wins, so re-inserting the same template is a no-op.
    #[must_use]
    pub fn build(templates: Vec<Template>) -> Self {
        let mut by_id: BTreeMap<String, Arc<Template>> = BTreeMap::new();
        for template in templates {
            if let Err(err) = template.validate() {
                warn!(%err, "skipping spawnable template");
                continue;
            }
            if by_id.contains_key(&template.id) {
                warn!(template = %template.id, "duplicate spawnable template id; keeping the first");
                continue;
            }
            by_id.insert(template.id.clone(), Arc::new(template));
        }

        let mut by_tag: BTreeMap<String, Vec<Arc<Template>>> = BTreeMap::new();
        for template in by_id.values() {
            for tag in &template.tags {
                debug!(tag, template = %template.id, "indexing tag");
                by_tag.entry(tag.clone()).or_default().push(Arc::clone(template));
            }
        }

        Self { by_tag, by_id }
    }

    /// Templates carrying `tag`. Empty if none do.
    #[must_use]
    pub fn get(&self, tag: &str) -> &[Arc<Template>] {
        self.by_tag.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up a template by id.
    #[must_use]
    pub fn template(&self, id: &str) -> Option<&Arc<Template>> {
        self.by_id.get(id)
    }

    /// All indexed templates, tagged or not, in id order.
    pub fn templates(&self) -> impl Iterator<Item = &Arc<Template>> {
        self.by_id.values()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.by_tag.keys().map(String::as_str)
    }

    #[must_use]
    pub fn template_count(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// The live index: a swappable pointer to the current snapshot.
#[derive(Debug, Default)]
pub struct TagIndex {
    snapshot: Arc<TagSnapshot>,
}

impl TagIndex {
    /// An empty index. Every lookup yields an empty pool until the first rebuild.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-read `catalogue` and swap in a fresh snapshot.
    ///
    /// Returns the number of indexed templates.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::Catalogue`] if the catalogue cannot be listed;
    /// the previous snapshot stays active.
    pub fn rebuild(&mut self, catalogue: &dyn TemplateCatalogue) -> Result<usize, SpawnError> {
        let templates = match catalogue.list_spawnable() {
            Ok(templates) => templates,
            Err(err) => {
                warn!(%err, "catalogue rebuild failed; keeping previous index");
                return Err(err.into());
            }
        };

        let snapshot = TagSnapshot::build(templates);
        let count = snapshot.template_count();
        if snapshot.is_empty() {
            warn!("catalogue lists no spawnable templates");
        }
        for tag in snapshot.tags() {
            debug!(tag, templates = snapshot.get(tag).len(), "indexed tag");
        }
        info!(
            templates = count,
            tags = snapshot.by_tag.len(),
            "rebuilt spawnable tag index"
        );
        self.snapshot = Arc::new(snapshot);
        Ok(count)
    }

    /// The current snapshot. Hold it for the duration of a pass.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TagSnapshot> {
        Arc::clone(&self.snapshot)
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> &[Arc<Template>] {
        self.snapshot.get(tag)
    }
}
