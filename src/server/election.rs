use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::common::cluster::{NodeRecord, NodeState, NodeView};

/// A record is online while its last heartbeat is at most `node_timeout` old.
pub fn is_online(record: &NodeRecord, now: DateTime<Utc>, node_timeout: Duration) -> bool {
    !record.is_older_than(node_timeout, now)
}

/// Picks the online record with the earliest startup. Identical startup
/// timestamps fall back to the lexically smallest instance id so every
/// instance reading the same snapshot agrees.
pub fn elect_master<'a, I>(records: I, now: DateTime<Utc>, node_timeout: Duration) -> Option<&'a NodeRecord>
where
    I: IntoIterator<Item = &'a NodeRecord>,
{
    records
        .into_iter()
        .filter(|record| is_online(record, now, node_timeout))
        .min_by(|a, b| {
            a.startup_timestamp
                .cmp(&b.startup_timestamp)
                .then_with(|| a.instance_id.cmp(&b.instance_id))
        })
}

/// Classifies every record of a snapshot, ordered by instance id.
pub fn node_views(
    nodes: &BTreeMap<String, NodeRecord>,
    local_config_hash: &str,
    now: DateTime<Utc>,
    node_timeout: Duration,
) -> Vec<NodeView> {
    let master_id = elect_master(nodes.values(), now, node_timeout).map(|m| m.instance_id.as_str());
    nodes
        .values()
        .map(|record| {
            let state = if Some(record.instance_id.as_str()) == master_id {
                NodeState::Master
            } else if is_online(record, now, node_timeout) {
                NodeState::Online
            } else {
                NodeState::Offline
            };
            NodeView {
                instance_id: record.instance_id.clone(),
                last_heartbeat: record.timestamp,
                startup_time: match state {
                    NodeState::Offline => None,
                    _ => Some(record.startup_timestamp),
                },
                state,
                config_matches: record.config_hash == local_config_hash,
            }
        })
        .collect()
}
