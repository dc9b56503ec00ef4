//! Test graph factories.
//!
//! Every builder returns a `(nodes, edges)` pair with unit weights unless
//! stated otherwise.
#![allow(dead_code)]

use crate::graph::models::{Edge, Node};

pub type Fixture = (Vec<Node>, Vec<Edge>);

pub fn nodes(ids: &[&str]) -> Vec<Node> {
    ids.iter().map(|id| Node::new(*id)).collect()
}

/// Path graph `ids[0] – ids[1] – …`; edge ids concatenate endpoint ids (`"AB"`).
pub fn chain(ids: &[&str]) -> Fixture {
    let edges = ids
        .windows(2)
        .map(|w| Edge::unweighted(format!("{}{}", w[0], w[1]), w[0], w[1]))
        .collect();
    (nodes(ids), edges)
}

/// Simple cycle over `ids`, closing edge from the last id back to the first.
pub fn cycle(ids: &[&str]) -> Fixture {
    let (n, mut e) = chain(ids);
    if let (Some(first), Some(last)) = (ids.first(), ids.last()) {
        e.push(Edge::unweighted(format!("{last}{first}"), *last, *first));
    }
    (n, e)
}

/// Star: `hub` connected to `leaf_0 … leaf_{n-1}`.
pub fn star(leaves: usize) -> Fixture {
    let mut n = vec![Node::new("hub")];
    let mut e = Vec::new();
    for i in 0..leaves {
        let leaf = format!("leaf_{i}");
        e.push(Edge::unweighted(format!("hub-{leaf}"), "hub", leaf.as_str()));
        n.push(Node::new(leaf));
    }
    (n, e)
}

/// Complete graph `K_n` over `k0 … k{n-1}`.
pub fn complete(n: usize) -> Fixture {
    let ids: Vec<String> = (0..n).map(|i| format!("k{i}")).collect();
    let mut e = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            e.push(Edge::unweighted(
                format!("{}-{}", ids[i], ids[j]),
                ids[i].as_str(),
                ids[j].as_str(),
            ));
        }
    }
    (ids.into_iter().map(Node::new).collect(), e)
}

/// Two disjoint triangles `a1 a2 a3` and `b1 b2 b3`.
pub fn two_triangles() -> Fixture {
    let (mut n, mut e) = cycle(&["a1", "a2", "a3"]);
    let (n2, e2) = cycle(&["b1", "b2", "b3"]);
    n.extend(n2);
    e.extend(e2);
    (n, e)
}

/// Two cliques `a_*` and `b_*` of `size` nodes joined by the edge `a_0 – b_0`.
pub fn two_cliques(size: usize) -> Fixture {
    let mut n = Vec::new();
    let mut e = Vec::new();
    for prefix in ["a", "b"] {
        let ids: Vec<String> = (0..size).map(|i| format!("{prefix}_{i}")).collect();
        for i in 0..size {
            for j in (i + 1)..size {
                e.push(Edge::unweighted(
                    format!("{}-{}", ids[i], ids[j]),
                    ids[i].as_str(),
                    ids[j].as_str(),
                ));
            }
        }
        n.extend(ids.into_iter().map(Node::new));
    }
    e.push(Edge::unweighted("bridge", "a_0", "b_0"));
    (n, e)
}
