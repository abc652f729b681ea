//! # Similarity Graph Construction
//!
//! One pairwise pass over the instances feeds a [`LinkSink`]:
//!
//! ```text
//! for a in instances:                      (source order)
//!     for b after a:  w = similarity(a, b) → candidate link a → b   (w > 0)
//!     weigh_nodes:    w = similarity(a, a) → candidate self-link
//!     LinkCutter::cut(candidates)          (link_cut > 0, big sets only)
//!     sink.accept_link(a, ..) … sink.finish_source(a)
//! sink.accept_isolated(..)                 (zero-similarity targets)
//! ```
//!
//! Similarity is symmetric, so each unordered pair is evaluated once and the
//! edge is kept on the source enumerated first.
//!
//! ## Sinks
//!
//! | Sink        | Module   | Output                              |
//! |-------------|----------|-------------------------------------|
//! | `GraphSink` | here     | in-memory [`Graph`]                 |
//! | `NetWriter` | `writer` | `.rcg` network text for the engine  |

pub mod cut;
pub mod writer;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::model::{Graph, InstanceId, Link, LinkSet};
use crate::source::SimilaritySource;
use crate::{Error, Result};

pub use cut::{cut_margin, LinkCutter, LinkStats};
pub use writer::{save_net, NetWriter};

// ============================================================================
// Options
// ============================================================================

/// Graph construction options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetOptions {
    /// Weigh nodes by their self-similarity (self-loops).
    pub weigh_nodes: bool,
    /// Weighted Jaccard instead of cosine similarity.
    pub jaccard: bool,
    /// Link cutting ratio in [0, 1); `0` keeps every link.
    pub link_cut: f32,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self { weigh_nodes: false, jaccard: false, link_cut: 0.0 }
    }
}

impl NetOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.link_cut) {
            return Err(Error::InvalidArgument(format!(
                "the link cutting ratio is out of [0, 1): {}",
                self.link_cut
            )));
        }
        Ok(())
    }

    pub fn cuts_links(&self) -> bool {
        self.link_cut > 0.0
    }
}

// ============================================================================
// Sink
// ============================================================================

/// Receiver of the per-source link sets of a graph construction.
pub trait LinkSink {
    /// A retained link of `source`.
    fn accept_link(&mut self, source: InstanceId, link: Link) -> Result<()>;

    /// All links of `source` were delivered (possibly none).
    fn finish_source(&mut self, source: InstanceId) -> Result<()>;

    /// An instance seen with zero similarity; may have no links at all.
    fn accept_isolated(&mut self, id: InstanceId) -> Result<()>;
}

/// Materializes the links into a [`Graph`].
#[derive(Debug, Default)]
pub struct GraphSink {
    graph: Graph,
    pending: Vec<Link>,
}

impl GraphSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }
}

impl LinkSink for GraphSink {
    fn accept_link(&mut self, _source: InstanceId, link: Link) -> Result<()> {
        self.pending.push(link);
        Ok(())
    }

    fn finish_source(&mut self, source: InstanceId) -> Result<()> {
        self.graph.add_node_and_links(source, self.pending.drain(..));
        Ok(())
    }

    fn accept_isolated(&mut self, id: InstanceId) -> Result<()> {
        self.graph.add_nodes([id]);
        Ok(())
    }
}

// ============================================================================
// Pairwise pass
// ============================================================================

/// Counters of one graph construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub sources: usize,
    /// Links delivered to the sink, self-loops included.
    pub links: usize,
    /// Sources whose candidate links were cut.
    pub cut_sources: usize,
    /// Ids reported as potentially isolated.
    pub isolated: usize,
}

fn checked_similarity<S: SimilaritySource + ?Sized>(
    source: &S,
    a: &str,
    b: &str,
    jaccard: bool,
) -> Result<f32> {
    let weight = source.similarity(a, b, jaccard);
    if weight.is_nan() || weight < 0.0 {
        return Err(Error::InvalidArgument(format!(
            "similarity of ({a}, {b}) is out of range: {weight}"
        )));
    }
    Ok(weight)
}

/// Evaluate all instance pairs of `source` once and feed the retained links
/// to `sink`.
pub fn build_links<S, K>(source: &S, options: &NetOptions, sink: &mut K) -> Result<BuildStats>
where
    S: SimilaritySource + ?Sized,
    K: LinkSink + ?Sized,
{
    options.validate()?;
    let instances = source.instances();
    let cutter = LinkCutter::new(options.link_cut, instances.len());
    let mut stats = BuildStats::default();
    let mut isolated: HashSet<InstanceId> = HashSet::new();
    let mut links = LinkSet::new();

    for (i, inst) in instances.iter().enumerate() {
        let sid = source.instance_id(inst)?;
        let mut lstats = LinkStats::default();
        links.clear();

        for other in &instances[i + 1..] {
            let did = source.instance_id(other)?;
            let weight = checked_similarity(source, inst, other, options.jaccard)?;
            if weight == 0.0 {
                isolated.insert(did);
                continue;
            }
            links.push(Link::new(did, weight));
            lstats.add(weight);
        }

        if options.weigh_nodes {
            let weight = checked_similarity(source, inst, inst, options.jaccard)?;
            if weight != 0.0 {
                lstats.add_self_link();
                links.push(Link::new(sid, weight));
            } else {
                isolated.insert(sid);
            }
        }

        if cutter.cut(&mut links, &lstats)?.is_some() {
            stats.cut_sources += 1;
        }
        for ln in &links {
            sink.accept_link(sid, *ln)?;
        }
        sink.finish_source(sid)?;
        stats.sources += 1;
        stats.links += links.len();
    }

    let mut isolated: Vec<InstanceId> = isolated.into_iter().collect();
    isolated.sort_unstable();
    for id in &isolated {
        sink.accept_isolated(*id)?;
    }
    stats.isolated = isolated.len();

    tracing::debug!(
        sources = stats.sources,
        links = stats.links,
        cut_sources = stats.cut_sources,
        margin = cutter.margin(),
        "pairwise pass completed"
    );
    Ok(stats)
}

/// Build the in-memory input graph for the clustering engine.
pub fn build_graph<S: SimilaritySource + ?Sized>(source: &S, options: &NetOptions) -> Result<Graph> {
    let mut sink = GraphSink::new();
    build_links(source, options, &mut sink)?;
    let graph = sink.into_graph();
    tracing::info!(nodes = graph.node_count(), links = graph.link_count(), "the input graph is formed");
    Ok(graph)
}
