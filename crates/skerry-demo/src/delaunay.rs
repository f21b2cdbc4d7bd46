//! Delaunay triangulation backed by `delaunator`.

use delaunator::Point;
use glam::DVec2;
use skerry_terrain::{GenerationError, TriangleMesh, Triangulator};

/// Triangulates node centers with a plain (unconstrained) Delaunay mesh.
#[derive(Clone, Copy, Debug, Default)]
pub struct DelaunayTriangulator;

impl Triangulator for DelaunayTriangulator {
    fn triangulate(&self, points: &[DVec2]) -> Result<TriangleMesh, GenerationError> {
        let input: Vec<Point> = points.iter().map(|p| Point { x: p.x, y: p.y }).collect();
        let result = delaunator::triangulate(&input);
        if result.triangles.is_empty() {
            return Err(GenerationError::Triangulation(format!(
                "no triangles for {} points (collinear or duplicate input)",
                points.len()
            )));
        }

        let triangles = result
            .triangles
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();
        Ok(TriangleMesh {
            vertices: points.to_vec(),
            triangles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_area(mesh: &TriangleMesh, [a, b, c]: [usize; 3]) -> f64 {
        let (a, b, c) = (mesh.vertices[a], mesh.vertices[b], mesh.vertices[c]);
        (b - a).perp_dot(c - a)
    }

    #[test]
    fn test_square_splits_into_two_triangles() {
        let points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(0.0, 1.1),
        ];
        let mesh = DelaunayTriangulator.triangulate(&points).unwrap();
        assert_eq!(mesh.vertices, points);
        assert_eq!(mesh.triangles.len(), 2);
    }

    #[test]
    fn test_winding_is_consistent() {
        let points: Vec<DVec2> = (0..30)
            .map(|i| {
                let a = i as f64 * 2.399;
                DVec2::new(a.cos(), a.sin()) * (1.0 + i as f64 * 0.1)
            })
            .collect();
        let mesh = DelaunayTriangulator.triangulate(&points).unwrap();
        let first = signed_area(&mesh, mesh.triangles[0]).signum();
        assert!(
            mesh.triangles
                .iter()
                .all(|&t| signed_area(&mesh, t).signum() == first)
        );
    }

    #[test]
    fn test_collinear_points_are_rejected() {
        let points = [DVec2::ZERO, DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0)];
        let err = DelaunayTriangulator.triangulate(&points).unwrap_err();
        assert!(matches!(err, GenerationError::Triangulation(_)));
    }
}
