//! End-to-end checks over the sampler, height pass and island assembly.

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skerry_terrain::*;

struct FanTriangulator;

impl Triangulator for FanTriangulator {
    fn triangulate(&self, points: &[DVec2]) -> Result<TriangleMesh, GenerationError> {
        Ok(TriangleMesh {
            vertices: points.to_vec(),
            triangles: (1..points.len() - 1).map(|i| [0, i, i + 1]).collect(),
        })
    }
}

fn small_region() -> PoissonDiscSettings {
    PoissonDiscSettings {
        region_size: DVec2::new(10.0, 10.0),
        min_radius: 0.5,
        max_radius: 1.5,
        root_count: 1,
        root_placement: RootPlacement::Origin,
        ..Default::default()
    }
}

#[test]
fn small_region_with_origin_root_saturates() {
    let settings = small_region();
    let mut sampler = PoissonDiscSampler::new(PerlinNoise2D::new(NoiseSettings {
        seed: 1234,
        ..Default::default()
    }));
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    let graph = sampler.sample_points(&settings, &mut rng).unwrap();

    assert!(!graph.is_empty());
    assert_eq!(graph.nodes()[0].position(), DVec2::ZERO);
    assert!(graph.is_forest());
    assert_eq!(graph.edges().len(), graph.len() - graph.roots().len());

    for node in graph.nodes() {
        assert!(settings.contains(node.position()), "{:?} outside region", node.position());
    }
    let nodes = graph.nodes();
    for (i, a) in nodes.iter().enumerate() {
        for b in &nodes[i + 1..] {
            assert!(a.position().distance(b.position()) >= a.radius() + b.radius() - 1e-9);
        }
    }
}

#[test]
fn sampled_graph_agrees_with_its_grid() {
    let settings = PoissonDiscSettings {
        region_size: DVec2::new(30.0, 18.0),
        root_count: 4,
        ..Default::default()
    };
    let mut sampler = PoissonDiscSampler::new(PerlinNoise2D::default());
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let len = sampler.sample_points(&settings, &mut rng).unwrap().len();

    let grid = sampler.grid();
    assert_eq!(grid.len(), len);
    assert_eq!(grid.cell_size(), settings.max_radius);
    for (index, disk) in sampler.graph().nodes().iter().enumerate() {
        let node = grid.get(skerry_grid::ObjectId::new(index as u64)).unwrap();
        assert_eq!(&node.disk, disk);
    }
}

#[test]
fn island_generation_is_reproducible() {
    let settings = IslandSettings {
        seed: 77,
        poisson: small_region(),
        ..Default::default()
    };

    let mut a = IslandGenerator::new(PerlinNoise2D::new(settings.noise.clone()), FanTriangulator);
    let mut b = IslandGenerator::new(PerlinNoise2D::new(settings.noise.clone()), FanTriangulator);
    let first = a.generate(&settings, None).unwrap();
    let second = b.generate(&settings, None).unwrap();

    assert_eq!(first, second);
    let (lo, hi) = first.height_range().unwrap();
    assert!(lo >= settings.heights.min_height);
    assert!(hi <= settings.heights.max_height);
}

#[test]
fn island_roots_depend_only_on_position() {
    let settings = IslandSettings {
        seed: 5,
        poisson: PoissonDiscSettings {
            root_count: 2,
            region_size: DVec2::new(16.0, 16.0),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut generator = IslandGenerator::new(PerlinNoise2D::default(), FanTriangulator);
    let island = generator.generate(&settings, None).unwrap();
    let synth = HeightSynthesizer::new(settings.heights.clone()).unwrap();

    for &root in &island.roots {
        let v = island.vertices[root];
        assert_eq!(v.y, synth.root_height(DVec2::new(v.x, v.z)));
    }
}
