use crate::prelude::HashMap;
use crate::{
    core::{config::ClusterOptions, geo::LngLat},
    data::geojson::GeoJsonFeature,
    MapError, Result,
};

/// Zoom levels are packed into the low bits of a cluster id
const ZOOM_BITS: u64 = 5;

/// A group of nearby features at one zoom level
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub id: u64,
    pub center: LngLat,
    /// Indices into the index's feature list, in input order
    pub members: Vec<usize>,
    pub zoom: u8,
}

impl Cluster {
    pub fn count(&self) -> usize {
        self.members.len()
    }

    /// Cluster ids encode the zoom and the first member
    pub fn encode_id(zoom: u8, first_member: usize) -> u64 {
        ((first_member as u64) << ZOOM_BITS) | u64::from(zoom)
    }

    pub fn decode_id(id: u64) -> (u8, usize) {
        ((id & ((1 << ZOOM_BITS) - 1)) as u8, (id >> ZOOM_BITS) as usize)
    }

    fn to_feature(&self) -> GeoJsonFeature {
        let mut properties = serde_json::Map::new();
        properties.insert("cluster".into(), true.into());
        properties.insert("cluster_id".into(), self.id.into());
        properties.insert("point_count".into(), (self.count() as u64).into());
        properties.insert(
            "point_count_abbreviated".into(),
            abbreviate(self.count()).into(),
        );
        GeoJsonFeature::point(self.center, properties)
    }
}

/// "1.2k" style counts for cluster labels
pub fn abbreviate(count: usize) -> String {
    if count >= 10_000 {
        format!("{}k", count / 1000)
    } else if count >= 1000 {
        format!("{:.1}k", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}

/// Grid clustering over a fixed feature set.
///
/// Features are bucketed into square cells of `radius` world pixels at each
/// integer zoom. Cells nest across zooms, so a cluster only ever splits as
/// the zoom increases. Above `max_zoom` nothing is clustered.
pub struct ClusterIndex {
    options: ClusterOptions,
    features: Vec<GeoJsonFeature>,
}

impl ClusterIndex {
    pub fn new(options: ClusterOptions, features: Vec<GeoJsonFeature>) -> Self {
        Self { options, features }
    }

    fn cell_of(&self, index: usize, zoom: u8) -> (i64, i64) {
        let pixel = self.features[index].coordinates().to_world_pixels(zoom);
        (
            (pixel.x / self.options.radius).floor() as i64,
            (pixel.y / self.options.radius).floor() as i64,
        )
    }

    /// Groups feature indices by grid cell, cells in first-seen order
    fn grid(&self, zoom: u8, indices: impl Iterator<Item = usize>) -> Vec<Vec<usize>> {
        let mut cell_slots: HashMap<(i64, i64), usize> = HashMap::default();
        let mut cells: Vec<Vec<usize>> = Vec::new();

        for index in indices {
            let cell = self.cell_of(index, zoom);
            let slot = *cell_slots.entry(cell).or_insert_with(|| {
                cells.push(Vec::new());
                cells.len() - 1
            });
            cells[slot].push(index);
        }
        cells
    }

    /// Clusters (two or more members) at an integer zoom level
    pub fn clusters(&self, zoom: u8) -> Vec<Cluster> {
        if zoom > self.options.max_zoom {
            return Vec::new();
        }

        self.grid(zoom, 0..self.features.len())
            .into_iter()
            .filter(|members| members.len() > 1)
            .map(|members| {
                let (lng, lat) = members.iter().fold((0.0, 0.0), |(lng, lat), &i| {
                    let c = self.features[i].coordinates();
                    (lng + c.lng, lat + c.lat)
                });
                let n = members.len() as f64;
                Cluster {
                    id: Cluster::encode_id(zoom, members[0]),
                    center: LngLat::new(lng / n, lat / n),
                    members,
                    zoom,
                }
            })
            .collect()
    }

    /// What a clustered source renders at `zoom`: cluster features followed by
    /// the features that are not part of any cluster
    pub fn render(&self, zoom: f64) -> Vec<GeoJsonFeature> {
        let zoom = zoom.floor().clamp(0.0, f64::from(u8::MAX)) as u8;
        let clusters = self.clusters(zoom);

        let mut clustered = vec![false; self.features.len()];
        for cluster in &clusters {
            for &member in &cluster.members {
                clustered[member] = true;
            }
        }

        let mut rendered: Vec<GeoJsonFeature> = clusters.iter().map(Cluster::to_feature).collect();
        rendered.extend(
            self.features
                .iter()
                .zip(clustered)
                .filter(|(_, is_clustered)| !is_clustered)
                .map(|(feature, _)| feature.clone()),
        );
        rendered
    }

    /// Re-derives the cluster an id refers to
    pub fn cluster(&self, cluster_id: u64) -> Result<Cluster> {
        let (zoom, first) = Cluster::decode_id(cluster_id);
        if first >= self.features.len() || zoom > self.options.max_zoom {
            return Err(MapError::ClusterNotFound(cluster_id));
        }

        self.clusters(zoom)
            .into_iter()
            .find(|c| c.id == cluster_id)
            .ok_or(MapError::ClusterNotFound(cluster_id))
    }

    /// First zoom at which the cluster breaks apart, or `max_zoom + 1` when
    /// its members never separate
    pub fn expansion_zoom(&self, cluster_id: u64) -> Result<u8> {
        let cluster = self.cluster(cluster_id)?;

        for zoom in cluster.zoom + 1..=self.options.max_zoom {
            let cells = self.grid(zoom, cluster.members.iter().copied());
            if cells.len() > 1 {
                return Ok(zoom);
            }
        }
        Ok(self.options.max_zoom + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::point::{Category, MapPoint}, data::geojson::FeatureCollection};

    fn index(coords: &[(f64, f64)]) -> ClusterIndex {
        let points: Vec<_> = coords
            .iter()
            .enumerate()
            .map(|(i, &(lng, lat))| {
                MapPoint::new(
                    format!("p-{i}"),
                    format!("P {i}"),
                    LngLat::new(lng, lat),
                    Category::Beach,
                )
            })
            .collect();
        ClusterIndex::new(
            ClusterOptions::default(),
            FeatureCollection::from_points(&points).features,
        )
    }

    #[test]
    fn test_id_roundtrip() {
        let id = Cluster::encode_id(7, 1234);
        assert_eq!(Cluster::decode_id(id), (7, 1234));
    }

    #[test]
    fn test_abbreviate() {
        assert_eq!(abbreviate(12), "12");
        assert_eq!(abbreviate(1234), "1.2k");
        assert_eq!(abbreviate(25_000), "25k");
    }

    #[test]
    fn test_nearby_points_cluster_at_low_zoom() {
        let idx = index(&[(-32.42, -3.85), (-32.421, -3.851), (-32.419, -3.849)]);

        let clusters = idx.clusters(5);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count(), 3);

        let rendered = idx.render(5.0);
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].is_cluster());
        assert_eq!(rendered[0].point_count(), Some(3));
    }

    #[test]
    fn test_no_clusters_above_max_zoom() {
        let idx = index(&[(-32.42, -3.85), (-32.42, -3.85)]);
        assert!(idx.clusters(15).is_empty());
        assert_eq!(idx.render(16.0).len(), 2);
        assert!(idx.render(16.0).iter().all(|f| !f.is_cluster()));
    }

    #[test]
    fn test_distant_points_stay_individual() {
        let idx = index(&[(-32.42, -3.85), (-34.88, -8.05)]);
        let rendered = idx.render(8.0);
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|f| f.point_id().is_some()));
    }

    #[test]
    fn test_expansion_zoom_splits_cluster() {
        let idx = index(&[(-32.40, -3.85), (-32.45, -3.85)]);
        let cluster = idx.clusters(3).pop().unwrap();

        let expansion = idx.expansion_zoom(cluster.id).unwrap();
        assert!(expansion > 3 && expansion <= 14);

        // at the expansion zoom the two points land in different cells
        assert!(idx.clusters(expansion).is_empty());
        // one level earlier they are still together
        assert_eq!(idx.clusters(expansion - 1).len(), 1);
    }

    #[test]
    fn test_identical_points_never_split() {
        let idx = index(&[(-32.42, -3.85), (-32.42, -3.85)]);
        let cluster = idx.clusters(10).pop().unwrap();
        assert_eq!(idx.expansion_zoom(cluster.id).unwrap(), 15);
        assert_eq!(cluster.members.len(), 2);
    }

    #[test]
    fn test_unknown_cluster_id() {
        let idx = index(&[(-32.42, -3.85)]);
        assert!(matches!(
            idx.expansion_zoom(Cluster::encode_id(3, 0)),
            Err(MapError::ClusterNotFound(_))
        ));
        assert!(idx.expansion_zoom(Cluster::encode_id(3, 99)).is_err());
    }
}
