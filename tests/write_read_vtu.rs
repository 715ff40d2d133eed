use earthgrid::mesh::{AnnulusGrid, AxisSpan, BoxGrid, SphereGrid};
use earthgrid::prelude::*;
use earthgrid::{PointField, VtuFile};

fn model(point: &[f64], depth: f64, gravity: f64) -> f64 {
    1600. + 0.3 * depth * gravity + point[0].sin()
}

fn write(mesh: &Mesh, compositions: usize, encoding: Encoding) -> Vec<u8> {
    let mut file = Vec::new();
    earthgrid::export(&mut file, mesh, &model, 9.81, compositions, encoding).unwrap();
    file
}

fn check_round_trip(mesh: &Mesh, file: &VtuFile) {
    assert_eq!(file.num_points, mesh.num_points());
    assert_eq!(file.num_cells, mesh.num_cells());
    assert_eq!(file.points, mesh.padded_points());

    let connectivity: Vec<i64> = mesh.connectivity().iter().map(|&n| n as i64).collect();
    assert_eq!(file.connectivity, connectivity);

    let offsets: Vec<i64> = mesh.offsets().into_iter().map(|o| o as i64).collect();
    assert_eq!(file.offsets, offsets);

    assert!(file
        .types
        .iter()
        .all(|&t| t == mesh.cell_type().vtk_id()));

    for cell in 0..mesh.num_cells() {
        assert_eq!(file.cell(cell).map(<[i64]>::len), Some(mesh.cell_type().num_nodes()));
    }

    assert_eq!(
        file.point_data.get("Depth"),
        Some(&PointField::new("Depth".into(), mesh.depth().to_vec()))
    );
    assert_eq!(file.active_scalars.as_deref(), Some("T"));
}

#[test]
fn ascii_box() {
    let mesh = BoxGrid::plane(AxisSpan::new(0., 3., 3), AxisSpan::new(-2., 0., 2))
        .build()
        .unwrap();

    let file = earthgrid::read_vtu(write(&mesh, 2, Encoding::Ascii).as_slice()).unwrap();

    check_round_trip(&mesh, &file);
    assert_eq!(file.point_data.len(), 4);
    assert_eq!(
        file.point_data.get("Composition 1").unwrap().values,
        vec![0.; mesh.num_points()]
    );
}

#[test]
fn base64_annulus() {
    let mesh = AnnulusGrid::new(1., 2., 3).build().unwrap();

    let file = earthgrid::read_vtu(write(&mesh, 0, Encoding::Base64).as_slice()).unwrap();

    check_round_trip(&mesh, &file);

    let expected = PointFields::sample(&mesh, &model, 9.81, 0);
    assert_eq!(file.point_data, expected);
}

#[test]
fn encodings_agree() {
    let mesh = SphereGrid::new(0.5, 1., 2, 2).build().unwrap();

    let ascii = earthgrid::read_vtu(write(&mesh, 1, Encoding::Ascii).as_slice()).unwrap();
    let base64 = earthgrid::read_vtu(write(&mesh, 1, Encoding::Base64).as_slice()).unwrap();

    check_round_trip(&mesh, &ascii);
    assert_eq!(ascii, base64);
}

#[test]
fn mesh_without_point_data() {
    let mesh = BoxGrid::volume(
        AxisSpan::new(0., 1., 1),
        AxisSpan::new(0., 1., 1),
        AxisSpan::new(0., 1., 1),
    )
    .build()
    .unwrap();

    let data = VtkData::new(&mesh, ());

    let mut buffer = Vec::new();
    earthgrid::write_vtk(&mut buffer, &data, Encoding::Base64).unwrap();

    let file = earthgrid::read_vtu(buffer.as_slice()).unwrap();

    assert_eq!(file.connectivity, vec![0, 4, 6, 2, 1, 5, 7, 3]);
    assert!(file.point_data.is_empty());
    assert_eq!(file.active_scalars, None);

    // the same mesh with a field attached afterwards
    let data = data.new_data(PointFields::new().with_field("Depth", mesh.depth().to_vec()));

    let mut buffer = Vec::new();
    earthgrid::write_vtk(&mut buffer, &data, Encoding::Ascii).unwrap();

    let file = earthgrid::read_vtu(buffer.as_slice()).unwrap();
    assert_eq!(file.active_scalars.as_deref(), Some("Depth"));
}

#[test]
fn read_from_disk() {
    let mesh = AnnulusGrid::new(0.5, 1., 1).build().unwrap();

    let path = std::env::temp_dir().join(format!("earthgrid-{}.vtu", std::process::id()));
    std::fs::write(&path, write(&mesh, 0, Encoding::Base64)).unwrap();

    let file = earthgrid::read_and_parse(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    check_round_trip(&mesh, &file);
}

#[test]
fn mismatched_field_is_not_written() {
    let mesh = AnnulusGrid::new(0.5, 1., 1).build().unwrap();
    let fields = PointFields::new().with_field("T", vec![0.; 3]);

    let mut buffer = Vec::new();
    let result = earthgrid::write_vtk(&mut buffer, &VtkData::new(&mesh, fields), Encoding::Ascii);

    assert!(matches!(result, Err(earthgrid::Error::FieldLength { .. })));
    assert!(buffer.is_empty());
}
