//! Derived name-resolution state for a query tree.
//!
//! The index is rebuilt wholesale after every structural mutation; nothing
//! patches it incrementally. Rebuilding walks the primary source, then every
//! join edge in attachment order, flattening the joined trees' name surfaces
//! into two maps: the features a caller actually selected, and everything
//! the participating sources could offer.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::feature::Feature;
use crate::filter::Filter;
use crate::query::join::Join;
use crate::source::SourceGroup;

/// One resolvable feature occurrence in a query.
///
/// The prefix is the fully composed one: a feature reached through nested
/// prefixed joins carries the concatenation of every prefix on its path.
#[derive(Debug, Clone)]
pub struct FeatureEntry {
    /// The referenced feature.
    pub feature: Feature,
    /// Composed prefix, when the feature arrived through a prefixed join.
    pub prefix: Option<String>,
    /// The source group that owns the feature.
    pub source: Arc<SourceGroup>,
}

impl FeatureEntry {
    fn new(feature: Feature, prefix: Option<String>, source: Arc<SourceGroup>) -> Self {
        Self {
            feature,
            prefix,
            source,
        }
    }

    /// The name under which the entry is addressed: `prefix + name`.
    pub fn effective_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, self.feature.name),
            None => self.feature.name.clone(),
        }
    }
}

/// Compose an outer join prefix onto an entry's existing prefix.
pub(crate) fn compose_prefix(outer: Option<&str>, inner: Option<&str>) -> Option<String> {
    match (outer, inner) {
        (None, None) => None,
        (None, Some(inner)) => Some(inner.to_owned()),
        (Some(outer), None) => Some(outer.to_owned()),
        (Some(outer), Some(inner)) => Some(format!("{}{}", outer, inner)),
    }
}

/// Name-resolution maps derived from a query tree.
///
/// Each entry is bucketed under its raw feature name and, when prefixed,
/// additionally under its effective name, so both spellings resolve.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    /// Explicitly selected features across the whole tree.
    selected: HashMap<String, Vec<FeatureEntry>>,
    /// Every feature of every participating source.
    available: HashMap<String, Vec<FeatureEntry>>,
    /// Ordered flat projection (selected entries, attachment order).
    selection: Vec<FeatureEntry>,
    /// Ordered flat view of the available map.
    catalog: Vec<FeatureEntry>,
    /// Participating sources, deduplicated, attachment order.
    sources: Vec<Arc<SourceGroup>>,
    /// Conjunction of the filters of the whole tree.
    merged_filter: Option<Filter>,
}

impl FeatureIndex {
    /// Build the index for one query node.
    ///
    /// With `strict` set, inserting a selected feature that already
    /// resolves fails with `DuplicateFeature`; lenient builds accept the
    /// collision and keep every entry, which is only appropriate when
    /// shuttling a foreign record through unchanged.
    pub(crate) fn build(
        primary: &Arc<SourceGroup>,
        features: &[Feature],
        joins: &[Join],
        filter: Option<&Filter>,
        strict: bool,
    ) -> QueryResult<Self> {
        let mut index = FeatureIndex::default();
        index.add_source(primary);
        index.merged_filter = filter.cloned();

        for feature in features {
            index.insert_selected(
                FeatureEntry::new(feature.clone(), None, Arc::clone(primary)),
                strict,
            )?;
        }
        for feature in &primary.features {
            index.insert_available(FeatureEntry::new(feature.clone(), None, Arc::clone(primary)));
        }

        for join in joins {
            index.merge_join(join, strict)?;
        }

        Ok(index)
    }

    /// Flatten one join edge's right-hand tree into this index.
    fn merge_join(&mut self, join: &Join, strict: bool) -> QueryResult<()> {
        let right = join.query.index();
        let prefix = join.prefix.as_deref();

        for entry in right.selection() {
            self.insert_selected(
                FeatureEntry::new(
                    entry.feature.clone(),
                    compose_prefix(prefix, entry.prefix.as_deref()),
                    Arc::clone(&entry.source),
                ),
                strict,
            )?;
        }
        for entry in right.catalog() {
            self.insert_available(FeatureEntry::new(
                entry.feature.clone(),
                compose_prefix(prefix, entry.prefix.as_deref()),
                Arc::clone(&entry.source),
            ));
        }
        for source in right.sources() {
            self.add_source(source);
        }
        self.merged_filter = Filter::conjoin(
            self.merged_filter.take(),
            right.merged_filter().cloned(),
        );
        Ok(())
    }

    fn insert_selected(&mut self, entry: FeatureEntry, strict: bool) -> QueryResult<()> {
        if strict && self.feature_exists(&entry.feature.name, entry.prefix.as_deref()) {
            return Err(QueryError::DuplicateFeature(entry.feature.name.clone()));
        }
        self.selected
            .entry(entry.feature.name.clone())
            .or_default()
            .push(entry.clone());
        if entry.prefix.is_some() {
            self.selected
                .entry(entry.effective_name())
                .or_default()
                .push(entry.clone());
        }
        self.selection.push(entry);
        Ok(())
    }

    fn insert_available(&mut self, entry: FeatureEntry) {
        self.available
            .entry(entry.feature.name.clone())
            .or_default()
            .push(entry.clone());
        if entry.prefix.is_some() {
            self.available
                .entry(entry.effective_name())
                .or_default()
                .push(entry.clone());
        }
        self.catalog.push(entry);
    }

    fn add_source(&mut self, source: &Arc<SourceGroup>) {
        let seen = self.sources.iter().any(|s| {
            s.store_name == source.store_name && s.name == source.name && s.version == source.version
        });
        if !seen {
            self.sources.push(Arc::clone(source));
        }
    }

    /// Would selecting `name` under `prefix` collide with an existing
    /// selected entry?
    ///
    /// True when the raw-name bucket already holds an entry with the same
    /// prefix, or when the prefixed spelling is taken by an unprefixed
    /// feature of that exact name.
    pub fn feature_exists(&self, name: &str, prefix: Option<&str>) -> bool {
        if let Some(entries) = self.selected.get(name) {
            if entries.iter().any(|e| e.prefix.as_deref() == prefix) {
                return true;
            }
        }
        if let Some(prefix) = prefix {
            let effective = format!("{}{}", prefix, name);
            if let Some(entries) = self.selected.get(&effective) {
                if entries.iter().any(|e| e.prefix.is_none()) {
                    return true;
                }
            }
        }
        false
    }

    /// Resolve a selected feature by name.
    ///
    /// A bucket holding several entries resolves to the unprefixed one when
    /// exactly that spelling exists; otherwise the name is ambiguous.
    pub fn resolve(&self, name: &str) -> QueryResult<&FeatureEntry> {
        let entries = self
            .selected
            .get(name)
            .ok_or_else(|| QueryError::FeatureNotFound(name.to_owned()))?;
        if entries.len() == 1 {
            return Ok(&entries[0]);
        }
        let mut unprefixed = entries.iter().filter(|e| e.prefix.is_none());
        match (unprefixed.next(), unprefixed.next()) {
            (Some(entry), None) => Ok(entry),
            _ => Err(QueryError::AmbiguousFeature(name.to_owned())),
        }
    }

    /// Resolve a name against everything the participating sources offer.
    ///
    /// Ambiguity is not an error here: the first entry in attachment order
    /// wins. Used to place filter predicates, where any owning source is a
    /// valid answer. A name no source offers is `FeatureNotFound`.
    pub fn resolve_any(&self, name: &str) -> QueryResult<&FeatureEntry> {
        self.available
            .get(name)
            .and_then(|entries| entries.first())
            .ok_or_else(|| QueryError::FeatureNotFound(name.to_owned()))
    }

    /// Ordered flat projection of the whole tree.
    pub fn selection(&self) -> &[FeatureEntry] {
        &self.selection
    }

    /// Ordered flat view of everything the sources offer.
    pub(crate) fn catalog(&self) -> &[FeatureEntry] {
        &self.catalog
    }

    /// Participating sources, deduplicated, in attachment order.
    pub fn sources(&self) -> &[Arc<SourceGroup>] {
        &self.sources
    }

    /// Conjunction of every filter in the tree.
    pub fn merged_filter(&self) -> Option<&Filter> {
        self.merged_filter.as_ref()
    }
}
