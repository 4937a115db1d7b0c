use std::collections::{HashMap, HashSet, VecDeque};

/// Finds the cycles of a graph in which every node has at most one outgoing
/// edge.
///
/// `edges` lists `(from, to)` pairs in the order the nodes were declared;
/// each `from` appears at most once. Every cycle is reported once, starting
/// at the first node that was visited twice while following edges from the
/// earliest unexplored start node.
pub fn find_cycles(edges: &[(String, String)]) -> Vec<Vec<String>> {
    let successors: HashMap<&str, &str> = edges
        .iter()
        .map(|(from, to)| (from.as_str(), to.as_str()))
        .collect();

    let mut start_nodes: VecDeque<&str> = edges.iter().map(|(from, _)| from.as_str()).collect();
    let mut explored: HashSet<&str> = HashSet::new();
    let mut cycles = Vec::new();

    while let Some(start) = start_nodes.pop_front() {
        let mut node = start;
        let mut visited = vec![node];

        while let Some(&next) = successors.get(node) {
            node = next;
            start_nodes.retain(|n| *n != node);

            if let Some(index) = visited.iter().position(|n| *n == node) {
                cycles.push(visited[index..].iter().map(|n| (*n).to_owned()).collect());
                break;
            }

            // Anything reachable from an earlier walk has been reported already.
            if explored.contains(node) {
                break;
            }

            visited.push(node);
        }

        explored.extend(visited);
    }

    cycles
}
