//! Benchmarks for PLY body decoding across the three encodings

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use meshply_core::{Point3d, TriangleMesh};
use meshply_io::{PlyReader, PlyWriteOptions, PlyWriter};

/// A grid mesh with `side * side` vertices
fn generate_grid_mesh(side: usize) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (col as f64 * 0.01, row as f64 * 0.01);
            mesh.add_vertex(Point3d::new(x, y, (x * 7.0).sin() * (y * 3.0).cos()));
        }
    }
    for row in 0..side - 1 {
        for col in 0..side - 1 {
            let i = row * side + col;
            mesh.add_face([i, i + 1, i + side + 1]);
            mesh.add_face([i, i + side + 1, i + side]);
        }
    }
    mesh
}

fn encode(mesh: &TriangleMesh, options: PlyWriteOptions) -> Vec<u8> {
    let mut bytes = Vec::new();
    PlyWriter::new(options)
        .write_mesh_to_writer(mesh, None, &mut bytes)
        .expect("Failed to encode PLY mesh");
    bytes
}

fn benchmark_mesh_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("ply_mesh_reading");

    for side in [32, 128, 512] {
        let mesh = generate_grid_mesh(side);
        let encodings = [
            ("ascii", PlyWriteOptions::ascii()),
            ("binary_double", PlyWriteOptions::binary()),
            (
                "binary_float",
                PlyWriteOptions::binary().with_vertices_as_floats(true),
            ),
        ];

        for (name, options) in encodings {
            let reader = PlyReader::from_bytes(encode(&mesh, options))
                .expect("Failed to parse PLY header");
            group.throughput(Throughput::Elements((mesh.vertex_count() + mesh.face_count()) as u64));
            group.bench_with_input(BenchmarkId::new(name, side), &reader, |b, reader| {
                b.iter(|| black_box(reader.read_mesh().expect("Failed to read PLY mesh")));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_mesh_reading);
criterion_main!(benches);
