//! End-to-end tests for weighted best-first search.
//!
//! Covers the single-source settle order, the node cap, unidirectional vs
//! bidirectional agreement, all-cheapest-paths enumeration and the
//! configuration factory.

mod common;

use common::{expected, NamedGraph, R1};
use neo4j_graphalgo::algo::{
    self, Dijkstra, PropertyCost, RelationshipExpander, SearchState, UnitCost,
};
use neo4j_graphalgo::{Direction, Error, MemoryGraph, PathFinder, SearchConfig};
use pretty_assertions::assert_eq;

type Finder<'g> = Dijkstra<RelationshipExpander<&'g MemoryGraph>, PropertyCost, f64>;

fn finder(db: &MemoryGraph) -> Finder<'_> {
    Dijkstra::new(
        RelationshipExpander::for_types(db, [(R1, Direction::Both)]),
        PropertyCost::new("cost"),
    )
}

/// start-a-b-c-d-e chain of cost 1 with cheaper and cheaper links to x.
fn cross_edges() -> NamedGraph {
    let mut g = NamedGraph::new();
    g.make_weighted_edge("start", "a", "cost", 1.0);
    g.make_weighted_edge("a", "x", "cost", 9.0);
    g.make_weighted_edge("a", "b", "cost", 1.0);
    g.make_weighted_edge("b", "x", "cost", 7.0);
    g.make_weighted_edge("b", "c", "cost", 1.0);
    g.make_weighted_edge("c", "x", "cost", 5.0);
    g.make_weighted_edge("c", "d", "cost", 1.0);
    g.make_weighted_edge("d", "x", "cost", 3.0);
    g.make_weighted_edge("d", "e", "cost", 1.0);
    g.make_weighted_edge("e", "x", "cost", 1.0);
    g
}

// ============================================================================
// 1. Single-source iteration
// ============================================================================

#[test]
fn test_settles_in_cost_order_and_improves_x() {
    let g = cross_edges();
    let dijkstra = finder(&g.db);
    let x = g.id("x");

    let mut settled = dijkstra.settled_from(g.id("start")).unwrap();
    let mut order = Vec::new();
    let mut x_costs = Vec::new();
    while let Some(step) = settled.next() {
        let (node, _) = step.unwrap();
        order.push(g.name(node).to_owned());
        if let Some(cost) = settled.tentative_cost(x) {
            x_costs.push(*cost);
        }
    }

    assert_eq!(order, vec!["start", "a", "b", "c", "d", "e", "x"]);
    assert_eq!(x_costs, vec![10.0, 9.0, 8.0, 7.0, 6.0, 6.0]);
    assert_eq!(settled.settled_cost(x), Some(&6.0));
    assert_eq!(settled.state(), SearchState::Exhausted);
}

#[test]
fn test_node_cap_bounds_settled_nodes() {
    let g = cross_edges();
    for cap in 0..=8 {
        let dijkstra = finder(&g.db).limit_max_nodes(cap);
        let mut settled = dijkstra.settled_from(g.id("start")).unwrap();
        let count = settled.by_ref().count();
        assert_eq!(count, cap.min(7));
        assert!(settled.nodes_settled() <= cap);
    }
}

#[test]
fn test_node_cap_cancels_path_search() {
    let g = cross_edges();
    for bidirectional in [true, false] {
        let dijkstra = finder(&g.db).bidirectional(bidirectional).limit_max_nodes(2);
        let found = dijkstra.find_single_path(g.id("start"), g.id("e")).unwrap();
        let stats = dijkstra.last_stats().unwrap();
        assert_eq!(stats.state, SearchState::Cancelled);
        assert!(stats.nodes_settled <= 2);
        // cancellation is not an error; there may or may not be a partial answer
        if let Some(path) = found {
            assert_eq!(path.end(), g.id("e"));
        }
    }
}

// ============================================================================
// 2. Cheapest paths
// ============================================================================

#[test]
fn test_both_modes_agree_on_cheapest_path() {
    let g = cross_edges();
    for bidirectional in [true, false] {
        let dijkstra = finder(&g.db).bidirectional(bidirectional);
        let found = dijkstra.find_single_path(g.id("start"), g.id("x")).unwrap().unwrap();
        assert_eq!(found.weight, 6.0);
        assert_eq!(g.render(&found.path), "start,a,b,c,d,e,x");

        let back = dijkstra.find_single_path(g.id("x"), g.id("start")).unwrap().unwrap();
        assert_eq!(back.weight, 6.0);
        assert_eq!(g.render(&back.path), "x,e,d,c,b,a,start");
    }
}

#[test]
fn test_all_cheapest_paths_in_a_grid() {
    // 3x3 grid of unit weights: 6 monotone routes from corner to corner
    let mut g = NamedGraph::new();
    let name = |r: usize, c: usize| format!("{r}{c}");
    for r in 0..3 {
        for c in 0..3 {
            if c + 1 < 3 {
                g.make_weighted_edge(&name(r, c), &name(r, c + 1), "cost", 1.0);
            }
            if r + 1 < 3 {
                g.make_weighted_edge(&name(r, c), &name(r + 1, c), "cost", 1.0);
            }
        }
    }
    for bidirectional in [true, false] {
        let dijkstra = finder(&g.db).bidirectional(bidirectional);
        let paths = dijkstra.find_all_paths(g.id("00"), g.id("22")).unwrap();
        assert!(paths.iter().all(|p| p.weight == 4.0));
        let rendered = g.render_all(paths.iter().map(|p| &p.path));
        assert_eq!(
            rendered,
            expected(&[
                "00,01,02,12,22",
                "00,01,11,12,22",
                "00,01,11,21,22",
                "00,10,11,12,22",
                "00,10,11,21,22",
                "00,10,20,21,22",
            ]),
            "bidirectional={bidirectional}"
        );
    }
}

#[test]
fn test_bidirectional_does_not_stop_at_first_meeting() {
    // the two-hop route meets first but the four-hop route is cheaper
    let mut g = NamedGraph::new();
    g.make_weighted_edge("s", "m", "cost", 10.0);
    g.make_weighted_edge("m", "t", "cost", 10.0);
    g.make_edge_chain("s,p,q,r,t");
    let dijkstra = Dijkstra::new(
        RelationshipExpander::for_types(&g.db, [(R1, Direction::Both)]),
        PropertyCost::with_default("cost", 1.0),
    );
    let found = dijkstra.find_single_path(g.id("s"), g.id("t")).unwrap().unwrap();
    assert_eq!(found.weight, 4.0);
    assert_eq!(g.render(&found.path), "s,p,q,r,t");
}

#[test]
fn test_default_config_keeps_fractional_and_zero_cost_ties() {
    // two routes s-a-b-t and s-c-d-t of 0.1, 0.2, 0.3, bridged by a free a-c
    let mut g = NamedGraph::new();
    g.make_weighted_edge("s", "a", "cost", 0.1);
    g.make_weighted_edge("a", "b", "cost", 0.2);
    g.make_weighted_edge("b", "t", "cost", 0.3);
    g.make_weighted_edge("s", "c", "cost", 0.1);
    g.make_weighted_edge("c", "d", "cost", 0.2);
    g.make_weighted_edge("d", "t", "cost", 0.3);
    g.make_weighted_edge("a", "c", "cost", 0.0);

    let dijkstra = algo::dijkstra(
        RelationshipExpander::for_types(&g.db, [(R1, Direction::Both)]),
        PropertyCost::new("cost"),
        &SearchConfig::default(),
    );
    let paths = dijkstra.find_all_paths(g.id("s"), g.id("t")).unwrap();
    assert!(paths.iter().all(|p| p.weight == 0.1 + 0.2 + 0.3));
    assert_eq!(
        g.render_all(paths.iter().map(|p| &p.path)),
        expected(&["s,a,b,t", "s,a,c,d,t", "s,c,a,b,t", "s,c,d,t"])
    );
}

#[test]
fn test_unit_cost_counts_hops() {
    let mut g = NamedGraph::new();
    g.make_edge_chain("a,b,c,d");
    g.make_edge_chain("a,e,d");
    let dijkstra: Dijkstra<_, _, u32> =
        Dijkstra::new(RelationshipExpander::all_types(&g.db, Direction::Outgoing), UnitCost);
    let found = dijkstra.find_single_path(g.id("a"), g.id("d")).unwrap().unwrap();
    assert_eq!(found.weight, 2);
    assert_eq!(g.render(&found), "a,e,d");
}

#[test]
fn test_unreachable_and_missing_nodes() {
    let mut g = NamedGraph::new();
    g.make_weighted_edge("a", "b", "cost", 1.0);
    g.node("island");
    let dijkstra = finder(&g.db);
    assert!(dijkstra.find_all_paths(g.id("a"), g.id("island")).unwrap().is_empty());
    assert_eq!(dijkstra.last_stats().unwrap().state, SearchState::Exhausted);

    let missing = neo4j_graphalgo::NodeId(9_999);
    assert!(matches!(dijkstra.find_single_path(g.id("a"), missing), Err(Error::InvalidArgument(_))));
    assert!(matches!(dijkstra.settled_from(missing), Err(Error::InvalidArgument(_))));
}

#[test]
fn test_missing_cost_property_propagates() {
    let mut g = NamedGraph::new();
    g.make_edge("a", "b");
    let err = finder(&g.db).find_single_path(g.id("a"), g.id("b")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

// ============================================================================
// 3. Configuration
// ============================================================================

#[test]
fn test_factory_reads_config() {
    let g = cross_edges();
    let config = SearchConfig::default().with_bidirectional(false).with_max_nodes(100);
    let dijkstra = algo::dijkstra(
        RelationshipExpander::for_types(&g.db, [(R1, Direction::Both)]),
        PropertyCost::new("cost"),
        &config,
    );
    let found = dijkstra.find_single_path(g.id("start"), g.id("x")).unwrap().unwrap();
    assert_eq!(found.weight, 6.0);
    assert_eq!(dijkstra.last_stats().unwrap().state, SearchState::Found);
}
