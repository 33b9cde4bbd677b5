use crate::entities::Coordinates;
use crate::services::distance::haversine_km;

#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub candidate: T,
    pub distance_km: f64,
}

/// Orders geocoded candidates by distance from `origin`.
///
/// Candidates without coordinates are dropped. The sort is stable, so ties
/// keep the order the candidates were supplied in.
pub fn rank_by_distance<T>(
    origin: Coordinates,
    candidates: Vec<(T, Option<Coordinates>)>,
    limit: usize,
) -> Vec<Ranked<T>> {
    let mut ranked = candidates
        .into_iter()
        .filter_map(|(candidate, coords)| {
            coords.map(|coords| Ranked {
                candidate,
                distance_km: haversine_km(origin, coords),
            })
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_ascending_drops_unknown_and_truncates() {
        let origin = Coordinates::new(0.0, 0.0);
        let candidates = vec![
            ("far", Some(Coordinates::new(0.0, 3.0))),
            ("lost", None),
            ("near", Some(Coordinates::new(0.0, 1.0))),
            ("mid", Some(Coordinates::new(0.0, 2.0))),
        ];
        let ranked = rank_by_distance(origin, candidates, 2);
        let names = ranked.iter().map(|r| r.candidate).collect::<Vec<_>>();
        assert_eq!(names, vec!["near", "mid"]);
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn ties_keep_input_order() {
        let origin = Coordinates::new(0.0, 0.0);
        let spot = Some(Coordinates::new(1.0, 1.0));
        let ranked = rank_by_distance(origin, vec![("a", spot), ("b", spot), ("c", spot)], 10);
        let names = ranked.iter().map(|r| r.candidate).collect::<Vec<_>>();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let origin = Coordinates::new(0.0, 0.0);
        let ranked = rank_by_distance(origin, vec![("a", Some(origin))], 0);
        assert!(ranked.is_empty());
    }
}
