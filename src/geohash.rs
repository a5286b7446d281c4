//! # Geohash Fingerprints
//!
//! A geohash is a short base-32 string naming a latitude/longitude cell;
//! each added character quarters (alternately halves) the cell, so a
//! 9-character hash pins a location to roughly 5 m × 5 m. The summary
//! workflow stores one hash per activity as a coarse, comparable location
//! fingerprint: two activities in the same area share a hash prefix, and
//! equal routes always produce equal hashes.
//!
//! The fingerprint is taken at the center of the route's bounding box, so
//! it describes the area the activity covered rather than where the
//! recording started.

use crate::route::RouteGeometry;

/// Characters of the geohash base-32 alphabet, in value order.
const BASE32: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Fingerprint precision used for activity routes.
pub const GEOHASH_PRECISION: usize = 9;

/// Encode a coordinate as a geohash of `precision` characters.
///
/// Bits alternate between longitude and latitude, longitude first; every
/// five bits emit one base-32 character. Output is always lowercase.
pub fn encode(latitude: f64, longitude: f64, precision: usize) -> String {
    let mut lat_range = (-90.0_f64, 90.0_f64);
    let mut lon_range = (-180.0_f64, 180.0_f64);

    let mut hash = String::with_capacity(precision);
    let mut index = 0usize;
    let mut bit = 0u8;
    let mut even_bit = true;

    while hash.len() < precision {
        if even_bit {
            let mid = (lon_range.0 + lon_range.1) / 2.0;
            if longitude >= mid {
                index = index * 2 + 1;
                lon_range.0 = mid;
            } else {
                index *= 2;
                lon_range.1 = mid;
            }
        } else {
            let mid = (lat_range.0 + lat_range.1) / 2.0;
            if latitude >= mid {
                index = index * 2 + 1;
                lat_range.0 = mid;
            } else {
                index *= 2;
                lat_range.1 = mid;
            }
        }
        even_bit = !even_bit;

        bit += 1;
        if bit == 5 {
            hash.push(BASE32[index] as char);
            bit = 0;
            index = 0;
        }
    }

    hash
}

/// Fingerprint a route at [`GEOHASH_PRECISION`] characters.
///
/// The encoded coordinate is the center of the route's bounding box, so
/// the fingerprint depends only on the geometry, not on point density or
/// traversal direction.
pub fn encode_route(route: &RouteGeometry) -> String {
    let center = route.center();
    encode(center.latitude, center.longitude, GEOHASH_PRECISION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GpsPoint;

    #[test]
    fn test_encode_known_values() {
        // Jutland, Denmark - the classic reference coordinate.
        assert_eq!(encode(57.64911, 10.40744, 9), "u4pruydqq");
        assert_eq!(encode(57.64911, 10.40744, 11), "u4pruydqqvj");
        // León, Spain.
        assert_eq!(encode(42.605, -5.603, 5), "ezs42");
    }

    #[test]
    fn test_encode_longer_hash_extends_shorter() {
        let short = encode(51.5074, -0.1278, 6);
        let long = encode(51.5074, -0.1278, 9);
        assert!(long.starts_with(&short));
    }

    #[test]
    fn test_encode_output_is_lowercase_base32() {
        let hash = encode(-33.8688, 151.2093, 9);
        assert_eq!(hash.len(), 9);
        assert!(hash
            .bytes()
            .all(|b| BASE32.contains(&b) && !b.is_ascii_uppercase()));
    }

    #[test]
    fn test_encode_extremes() {
        // Poles and the antimeridian still produce full-length hashes.
        assert_eq!(encode(90.0, 180.0, 9).len(), 9);
        assert_eq!(encode(-90.0, -180.0, 9).len(), 9);
        assert_eq!(encode(0.0, 0.0, 9).len(), 9);
    }

    #[test]
    fn test_encode_route_is_deterministic() {
        let route = RouteGeometry::new(vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5120, -0.1200),
            GpsPoint::new(51.5160, -0.1150),
        ]);
        let first = encode_route(&route);
        let second = encode_route(&route);
        assert_eq!(first, second);
        assert_eq!(first.len(), GEOHASH_PRECISION);
    }

    #[test]
    fn test_encode_route_two_points_uses_midpoint() {
        let a = GpsPoint::new(51.5074, -0.1278);
        let b = GpsPoint::new(51.5120, -0.1200);
        let route = RouteGeometry::new(vec![a, b]);

        let midpoint_hash = encode(
            (a.latitude + b.latitude) / 2.0,
            (a.longitude + b.longitude) / 2.0,
            GEOHASH_PRECISION,
        );
        assert_eq!(encode_route(&route), midpoint_hash);
    }

    #[test]
    fn test_encode_route_ignores_traversal_direction() {
        let points = vec![
            GpsPoint::new(51.5074, -0.1278),
            GpsPoint::new(51.5120, -0.1200),
            GpsPoint::new(51.5160, -0.1150),
        ];
        let forward = RouteGeometry::new(points.clone());
        let backward = RouteGeometry::new(points.into_iter().rev().collect());
        assert_eq!(encode_route(&forward), encode_route(&backward));
    }
}
