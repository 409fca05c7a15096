//! Query composition over feature sources.
//!
//! A [`Query`] is a recursive structure: one primary source plus an ordered
//! list of join edges whose right-hand sides are queries themselves. Every
//! structural mutation re-derives the node's [`FeatureIndex`] from scratch,
//! so name resolution always reflects the current tree. Mutations validate
//! before committing: a failed `join`, `select`, or `filter` leaves the
//! node exactly as it was.

pub mod index;
pub mod interchange;
pub mod join;
pub mod time;

use std::sync::Arc;

pub use index::{FeatureEntry, FeatureIndex};
pub use interchange::{JoinRecord, QueryRecord};
pub use join::{Join, JoinType};
pub use time::EventTime;

use crate::error::{QueryError, QueryResult};
use crate::feature::Feature;
use crate::filter::Filter;
use crate::source::SourceGroup;

/// A composable logical read query over one or more feature sources.
///
/// Built from a source group (see `SourceGroup::select_all` and friends or
/// [`Query::new`]), then extended in place:
///
/// ```
/// use std::sync::Arc;
/// use quiver::prelude::*;
///
/// # fn main() -> QueryResult<()> {
/// let trades = Arc::new(
///     SourceGroup::new("fs_featurestore", "trades", 1)
///         .with_feature("id")
///         .with_feature("amount"),
/// );
/// let accounts = Arc::new(
///     SourceGroup::new("fs_featurestore", "accounts", 1)
///         .with_feature("id")
///         .with_feature("risk_band"),
/// );
///
/// let mut query = trades.select_all()?;
/// query
///     .join(Join::new(accounts.select(&["risk_band"])?).with_on(vec!["id"]))?
///     .filter(Feature::new("amount").gt(100))?
///     .as_of(Some("2024-01-01".into()), None)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) store_name: String,
    pub(crate) store_id: Option<i32>,
    pub(crate) source: Arc<SourceGroup>,
    pub(crate) features: Vec<Feature>,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<Filter>,
    pub(crate) start_time: Option<i64>,
    pub(crate) end_time: Option<i64>,
    pub(crate) index: FeatureIndex,
}

impl Query {
    /// Create a query selecting `features` from `source`.
    ///
    /// Fails with `DuplicateFeature` when the projection repeats a name.
    pub fn new(source: Arc<SourceGroup>, features: Vec<Feature>) -> QueryResult<Self> {
        let index = FeatureIndex::build(&source, &features, &[], None, true)?;
        Ok(Self {
            store_name: source.store_name.clone(),
            store_id: source.id,
            source,
            features,
            joins: vec![],
            filter: None,
            start_time: None,
            end_time: None,
            index,
        })
    }

    /// Reassemble a query from recorded parts, rebuilding the index.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        store_name: String,
        store_id: Option<i32>,
        source: Arc<SourceGroup>,
        features: Vec<Feature>,
        joins: Vec<Join>,
        filter: Option<Filter>,
        start_time: Option<i64>,
        end_time: Option<i64>,
        strict: bool,
    ) -> QueryResult<Self> {
        let index = FeatureIndex::build(&source, &features, &joins, filter.as_ref(), strict)?;
        Ok(Self {
            store_name,
            store_id,
            source,
            features,
            joins,
            filter,
            start_time,
            end_time,
            index,
        })
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Replace the projection of this node's primary source.
    pub fn select(&mut self, features: Vec<Feature>) -> QueryResult<&mut Self> {
        let index =
            FeatureIndex::build(&self.source, &features, &self.joins, self.filter.as_ref(), true)?;
        self.features = features;
        self.index = index;
        Ok(self)
    }

    /// Append one feature to the projection.
    ///
    /// Fails with `DuplicateFeature` when the name already resolves among
    /// the selected features, joined ones included.
    pub fn append_feature(&mut self, feature: Feature) -> QueryResult<&mut Self> {
        if self.index.feature_exists(&feature.name, None) {
            return Err(QueryError::DuplicateFeature(feature.name));
        }
        self.features.push(feature);
        self.rebuild()?;
        Ok(self)
    }

    /// Attach a join edge.
    ///
    /// The right-hand node's entire selected name surface is checked
    /// against this node first: a collision fails with `UsePrefix` when
    /// the edge has no prefix, `ChangePrefix` when it has one, and the
    /// edge is not attached.
    pub fn join(&mut self, mut join: Join) -> QueryResult<&mut Self> {
        join.normalize_keys();
        self.check_join(&join)?;
        self.joins.push(join);
        self.rebuild()?;
        Ok(self)
    }

    fn check_join(&self, join: &Join) -> QueryResult<()> {
        for entry in join.query.index.selection() {
            let prefix = index::compose_prefix(join.prefix.as_deref(), entry.prefix.as_deref());
            if self.index.feature_exists(&entry.feature.name, prefix.as_deref()) {
                return Err(if join.prefix.is_some() {
                    QueryError::ChangePrefix(entry.feature.name.clone())
                } else {
                    QueryError::UsePrefix(entry.feature.name.clone())
                });
            }
        }
        Ok(())
    }

    /// Attach a filter, conjoining it with any filter already present.
    ///
    /// Every predicate must name a feature placeable in some participating
    /// source at this moment; the check is not repeated when later joins
    /// change the name surface.
    pub fn filter(&mut self, filter: Filter) -> QueryResult<&mut Self> {
        self.check_filter(&filter)?;
        self.filter = Some(match self.filter.take() {
            Some(current) => current.and(filter),
            None => filter,
        });
        self.rebuild()?;
        Ok(self)
    }

    fn check_filter(&self, filter: &Filter) -> QueryResult<()> {
        for feature in filter.predicate_features() {
            self.source_group_for(feature)?;
        }
        Ok(())
    }

    /// Set the time-travel window.
    ///
    /// `wallclock` is the inclusive upper bound, `exclude_until` the
    /// exclusive lower bound. The window is also stamped onto the
    /// right-hand node of every join currently attached - a one-time
    /// snapshot, not a live link: joins attached afterwards are
    /// unaffected, and calling again overwrites everything.
    pub fn as_of(
        &mut self,
        wallclock: Option<EventTime>,
        exclude_until: Option<EventTime>,
    ) -> QueryResult<&mut Self> {
        let end_time = wallclock.map(|t| t.to_epoch_millis()).transpose()?;
        let start_time = exclude_until.map(|t| t.to_epoch_millis()).transpose()?;
        for join in &mut self.joins {
            join.query.start_time = start_time;
            join.query.end_time = end_time;
        }
        self.start_time = start_time;
        self.end_time = end_time;
        self.rebuild()?;
        Ok(self)
    }

    /// Set both window bounds on this node only, without touching joins.
    #[deprecated(note = "use as_of with an exclusive lower bound instead")]
    pub fn pull_changes(
        &mut self,
        wallclock_start_time: EventTime,
        wallclock_end_time: EventTime,
    ) -> QueryResult<&mut Self> {
        let start_time = wallclock_start_time.to_epoch_millis()?;
        let end_time = wallclock_end_time.to_epoch_millis()?;
        self.start_time = Some(start_time);
        self.end_time = Some(end_time);
        self.rebuild()?;
        Ok(self)
    }

    fn rebuild(&mut self) -> QueryResult<()> {
        self.index =
            FeatureIndex::build(&self.source, &self.features, &self.joins, self.filter.as_ref(), true)?;
        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a selected feature by (possibly prefixed) name.
    pub fn resolve_feature(&self, name: &str) -> QueryResult<&FeatureEntry> {
        self.index.resolve(name)
    }

    /// Find the participating source group that owns a feature.
    ///
    /// A feature carrying an explicit source id is matched by id; anything
    /// else falls back to name resolution over everything the sources
    /// offer, where the first match wins.
    pub fn source_group_for(&self, feature: &Feature) -> QueryResult<Arc<SourceGroup>> {
        if let Some(source_id) = feature.source_id {
            return self
                .index
                .sources()
                .iter()
                .find(|s| s.id == Some(source_id))
                .cloned()
                .ok_or_else(|| QueryError::SourceNotFound(feature.name.clone()));
        }
        Ok(Arc::clone(&self.index.resolve_any(&feature.name)?.source))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The primary source of this node.
    pub fn source(&self) -> &Arc<SourceGroup> {
        &self.source
    }

    /// Feature store name.
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Feature store id, if known.
    pub fn store_id(&self) -> Option<i32> {
        self.store_id
    }

    /// Attached join edges, in attachment order.
    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Flat ordered projection across the whole tree.
    pub fn features(&self) -> &[FeatureEntry] {
        self.index.selection()
    }

    /// Conjunction of every filter in the tree.
    pub fn filters(&self) -> Option<&Filter> {
        self.index.merged_filter()
    }

    /// Participating sources, deduplicated, in attachment order.
    pub fn source_groups(&self) -> &[Arc<SourceGroup>] {
        self.index.sources()
    }

    /// The derived name-resolution index.
    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    /// Exclusive lower window bound, milliseconds since the epoch.
    pub fn start_time(&self) -> Option<i64> {
        self.start_time
    }

    /// Inclusive upper window bound, milliseconds since the epoch.
    pub fn end_time(&self) -> Option<i64> {
        self.end_time
    }

    /// Whether this node or any joined node carries a window bound.
    pub fn is_time_travel(&self) -> bool {
        self.start_time.is_some()
            || self.end_time.is_some()
            || self.joins.iter().any(|j| j.query.is_time_travel())
    }
}
