//! Similarity graph construction: in-memory graph and `.rcg` network text
//! from the same pairwise pass.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use pretty_assertions::assert_eq;
use statix::network::{build_graph, build_links, save_net};
use statix::{
    GraphSink, InstanceId, Link, MemorySource, NetOptions, NetWriter, PropertyOccurrences,
    PropertyWeights, SimilaritySource,
};

/// Source wrapper counting the similarity evaluations per unordered pair.
struct CountingSource {
    inner: MemorySource,
    calls: RefCell<HashMap<(String, String), usize>>,
}

impl CountingSource {
    fn new(inner: MemorySource) -> Self {
        Self { inner, calls: RefCell::new(HashMap::new()) }
    }

    fn assert_each_pair_once(&self) {
        let calls = self.calls.borrow();
        let n = self.inner.instances().len();
        assert_eq!(calls.len(), n * (n - 1) / 2);
        assert!(calls.values().all(|&c| c == 1), "{calls:?}");
    }
}

impl SimilaritySource for CountingSource {
    fn instances(&self) -> &[String] {
        self.inner.instances()
    }

    fn instance_id(&self, instance: &str) -> statix::Result<InstanceId> {
        self.inner.instance_id(instance)
    }

    fn similarity(&self, a: &str, b: &str, jaccard: bool) -> f32 {
        let key = if a <= b { (a.to_string(), b.to_string()) } else { (b.to_string(), a.to_string()) };
        *self.calls.borrow_mut().entry(key).or_default() += 1;
        self.inner.similarity(a, b, jaccard)
    }

    fn set_property_weights(&mut self, weights: PropertyWeights) {
        self.inner.set_property_weights(weights);
    }

    fn load_input_data(&mut self, path: &Path, filter_untyped: bool, id_map: Option<&Path>) -> statix::Result<PropertyOccurrences> {
        self.inner.load_input_data(path, filter_untyped, id_map)
    }

    fn load_gt_data(&mut self, path: &Path, targets: &PropertyOccurrences, dirty: bool) -> statix::Result<PropertyWeights> {
        self.inner.load_gt_data(path, targets, dirty)
    }
}

fn triangle() -> MemorySource {
    MemorySource::new()
        .with_instance("i1", 1)
        .with_instance("i2", 2)
        .with_instance("i3", 3)
        .with_similarity("i1", "i2", 0.2)
        .with_similarity("i1", "i3", 0.0)
        .with_similarity("i2", "i3", 0.6)
}

/// A hub linked to 39 leaves, half weakly; the leaves are unrelated.
fn hub() -> MemorySource {
    (1..40).fold(MemorySource::new().with_instance("hub", 0), |src, i| {
        let leaf = format!("leaf{i}");
        let weight = if i <= 20 { 0.1 } else { 1.0 };
        src.with_instance(leaf.as_str(), i).with_similarity("hub", &leaf, weight)
    })
}

#[test]
fn test_triangle_graph() {
    let src = CountingSource::new(triangle());
    let graph = build_graph(&src, &NetOptions::default()).unwrap();

    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.links(InstanceId(1)), &[Link::new(InstanceId(2), 0.2)]);
    assert_eq!(graph.links(InstanceId(2)), &[Link::new(InstanceId(3), 0.6)]);
    // 3 is reached through 2's adjacency only, never linked to 1
    assert!(graph.links(InstanceId(3)).is_empty());
    assert_eq!(graph.weight(InstanceId(3), InstanceId(2)), Some(0.6));
    assert_eq!(graph.weight(InstanceId(1), InstanceId(3)), None);
    src.assert_each_pair_once();
}

#[test]
fn test_triangle_network_text() {
    let src = CountingSource::new(triangle());
    let mut writer = NetWriter::new(Vec::new(), 3, false).unwrap();
    let stats = build_links(&src, &NetOptions::default(), &mut writer).unwrap();
    let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();

    assert_eq!(text, "/Graph weighted:1 validated:1\n/Nodes 3\n/Edges\n1> 2:0.2\n2> 3:0.6\n3>\n");
    assert_eq!(stats.sources, 3);
    assert_eq!(stats.links, 2);
    src.assert_each_pair_once();
}

#[test]
fn test_graph_and_text_agree() {
    let src = hub();
    let opts = NetOptions { link_cut: 0.5, ..Default::default() };

    let mut sink = GraphSink::new();
    let graph_stats = build_links(&src, &opts, &mut sink).unwrap();
    let mut writer = NetWriter::new(Vec::new(), src.instances().len(), opts.cuts_links()).unwrap();
    let text_stats = build_links(&src, &opts, &mut writer).unwrap();

    assert_eq!(graph_stats, text_stats);
    assert_eq!(sink.into_graph().link_count(), text_stats.links);
}

#[test]
fn test_link_cutting_keeps_strong_links() {
    let src = CountingSource::new(hub());
    let opts = NetOptions { link_cut: 0.5, ..Default::default() };
    let mut sink = GraphSink::new();
    let stats = build_links(&src, &opts, &mut sink).unwrap();
    let graph = sink.into_graph();

    assert_eq!(stats.cut_sources, 1);
    assert_eq!(graph.node_count(), 40);
    let hub_links = graph.links(InstanceId(0));
    assert_eq!(hub_links.len(), 19);
    assert!(hub_links.iter().all(|ln| ln.weight == 1.0));
    // Weakly linked leaves remain as isolated nodes
    assert!(graph.contains(InstanceId(1)));
    assert!(graph.links(InstanceId(1)).is_empty());
    src.assert_each_pair_once();
}

#[test]
fn test_link_cutting_disabled_keeps_everything() {
    let graph = build_graph(&hub(), &NetOptions::default()).unwrap();
    assert_eq!(graph.links(InstanceId(0)).len(), 39);
}

#[test]
fn test_save_net_with_filtered_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("set.rcg");
    let mut src = MemorySource::new()
        .with_instance("typed", 1)
        .with_instance("loose", 2)
        .with_untyped("loose")
        .with_similarity("typed", "loose", 0.5);
    src.load_input_data(&dir.path().join("set.nt"), true, None).unwrap();

    let opts = NetOptions { link_cut: 0.3, ..Default::default() };
    save_net(&src, &opts, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "/Graph weighted:1 validated:1\n/Nodes 2\n/Edges\n\
         # Note: duplicated edges may exist and should be omitted\n\
         1> 4294967294:0.5\n4294967294>\n"
    );
}

#[test]
fn test_id_map_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let id_map = dir.path().join("set.idm");
    let mut src = MemorySource::new()
        .with_instance("a", 7)
        .with_instance("b", 8)
        .with_untyped("b");
    src.load_input_data(&dir.path().join("set.nt"), true, Some(&id_map)).unwrap();
    let text = std::fs::read_to_string(&id_map).unwrap();
    assert_eq!(text, "7\ta\n4294967288\tb\n");
}

#[test]
fn test_cutting_with_weighed_nodes() {
    // Self-link joins the retain decision, the cutoff stays at about 0.319
    for (self_weight, kept) in [(0.05f32, false), (1.0, true)] {
        let src = CountingSource::new(hub().with_similarity("hub", "hub", self_weight));
        let opts = NetOptions { weigh_nodes: true, link_cut: 0.5, ..Default::default() };

        let mut sink = GraphSink::new();
        let stats = build_links(&src, &opts, &mut sink).unwrap();
        let graph = sink.into_graph();
        assert_eq!(stats.cut_sources, 1);
        let hub_links = graph.links(InstanceId(0));
        assert_eq!(hub_links.len(), if kept { 20 } else { 19 });
        assert!(hub_links.iter().all(|ln| ln.weight == 1.0));
        assert_eq!(graph.weight(InstanceId(0), InstanceId(0)).is_some(), kept);

        let mut writer = NetWriter::new(Vec::new(), src.instances().len(), opts.cuts_links()).unwrap();
        build_links(&src, &opts, &mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let hub_line = text.lines().find(|l| l.starts_with("0>")).unwrap();
        assert_eq!(hub_line.ends_with(" 0:1"), kept, "{hub_line}");
        assert!(!hub_line.contains(":0.1"));
    }
}
