//! Grouping of neighbouring meters that post the same schedule.
//!
//! Meters are first partitioned by a schedule [`Signature`], then, within
//! each partition, linked whenever two of them stand within the clustering
//! radius of each other. Linking is transitive, so a cluster can stretch
//! further than the radius along a street.

use std::collections::HashMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::locate::{haversine_m, GeoPoint, Meter};
use crate::schedule::Schedule;

/// Default linking radius.
pub const DEFAULT_RADIUS_M: f64 = 20.0;

/// Content hash of a schedule, independent of rule order, duplicates, day
/// spelling and time notation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Signature(String);

impl Signature {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hex SHA-256 over the schedule's canonical rule lines. A schedule with no
/// posted rules hashes apart from one whose rules were all dropped, since the
/// two evaluate differently.
pub fn signature(schedule: &Schedule) -> Signature {
    let canonical = schedule.canonical();
    let mut hasher = Sha256::new();
    if canonical.is_unposted() {
        hasher.update(b"unposted\n");
    }
    for rule in canonical.rules() {
        hasher.update(rule.canonical_line().as_bytes());
        hasher.update(b"\n");
    }
    Signature(format!("{:x}", hasher.finalize()))
}

/// Meters sharing one schedule within linking distance of each other.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Cluster {
    pub id: String,
    pub signature: Signature,
    /// Member post ids, sorted.
    pub post_ids: Vec<String>,
    pub centroid: GeoPoint,
    /// Distance from the centroid to the farthest member, to the centimeter.
    pub approx_max_radius_m: f64,
    /// Most common member street name.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub street_name: Option<String>,
    /// Shared schedule in canonical form, so messages do not depend on
    /// which member's spelling came first.
    pub schedule: Schedule,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.post_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.post_ids.is_empty()
    }

    /// The cluster as a single meter at its centroid, so it can be evaluated
    /// and searched like any other.
    pub fn to_meter(&self) -> Meter {
        Meter {
            post_id: self.id.clone(),
            location: self.centroid,
            street_name: self.street_name.clone(),
            schedule: self.schedule.clone(),
        }
    }
}

/// Disjoint-set forest with path halving and union by rank.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Label points so that any two within `radius_m` share a label. Labels are
/// `0..k`, numbered in order of first appearance.
fn link_within(points: &[GeoPoint], radius_m: f64) -> Vec<usize> {
    let n = points.len();
    let mut uf = UnionFind::new(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if haversine_m(points[i], points[j]) <= radius_m {
                uf.union(i, j);
            }
        }
    }

    let mut labels_by_root = HashMap::new();
    (0..n)
        .map(|i| {
            let root = uf.find(i);
            let next = labels_by_root.len();
            *labels_by_root.entry(root).or_insert(next)
        })
        .collect()
}

fn centroid(points: &[GeoPoint]) -> GeoPoint {
    let n = points.len().max(1) as f64;
    let (lat, lon) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lon), p| (lat + p.lat, lon + p.lon));
    GeoPoint::new(lat / n, lon / n)
}

/// Most frequent non-blank value; the earliest seen wins a tie.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        })
        .map(|(value, _)| value.to_string())
}

/// Cluster meters by shared schedule and proximity. Cluster ids run
/// `C00001`, `C00002`, ... in order of each schedule's first appearance.
pub fn cluster_meters(meters: &[Meter], radius_m: f64) -> Vec<Cluster> {
    let mut groups: Vec<(Signature, Vec<&Meter>)> = Vec::new();
    let mut group_index: HashMap<Signature, usize> = HashMap::new();
    for meter in meters {
        let sig = signature(&meter.schedule);
        let index = *group_index.entry(sig.clone()).or_insert_with(|| {
            groups.push((sig, Vec::new()));
            groups.len() - 1
        });
        groups[index].1.push(meter);
    }

    let mut clusters = Vec::new();
    for (sig, members) in &groups {
        let points: Vec<GeoPoint> = members.iter().map(|m| m.location).collect();
        let labels = link_within(&points, radius_m);
        let count = labels.iter().max().map_or(0, |max| max + 1);

        for label in 0..count {
            let subset: Vec<&Meter> = members
                .iter()
                .zip(&labels)
                .filter(|(_, l)| **l == label)
                .map(|(m, _)| *m)
                .collect();
            let sub_points: Vec<GeoPoint> = subset.iter().map(|m| m.location).collect();
            let center = centroid(&sub_points);
            let max_r = sub_points
                .iter()
                .map(|p| haversine_m(center, *p))
                .fold(0.0, f64::max);
            let mut post_ids: Vec<String> = subset.iter().map(|m| m.post_id.clone()).collect();
            post_ids.sort();

            clusters.push(Cluster {
                id: format!("C{:05}", clusters.len() + 1),
                signature: sig.clone(),
                post_ids,
                centroid: center,
                approx_max_radius_m: (max_r * 100.0).round() / 100.0,
                street_name: mode(subset.iter().filter_map(|m| m.street_name.as_deref())),
                schedule: subset[0].schedule.canonical(),
            });
        }
    }

    debug!(
        meters = meters.len(),
        schedules = groups.len(),
        clusters = clusters.len(),
        radius_m,
        "clustered meters"
    );
    clusters
}
