use imo_pcd::{read, save_imo_pcd, write, Error, PointCloud, PointImo};
use ndarray::Array2;
use std::fs::{read_dir, read_to_string, remove_file, File};
use std::io::{BufRead, BufReader};
use std::path::Path;

fn imo_points(count: usize) -> Vec<PointImo> {
    (0..count)
        .map(|i| PointImo {
            x: i as f32 * 0.5,
            y: -(i as f32),
            z: 100.0 + i as f32,
            intensity: (i % 256) as f32,
            laserid: (i % 128) as u16,
            timeoffset: i as f64 * 1e-6,
            yawangle: i as f32 * 0.2 - 60.0,
            mirrorid: (i % 3) as u8,
        })
        .collect()
}

fn header_lines(path: &Path) -> Vec<String> {
    let reader = BufReader::new(File::open(path).unwrap());
    let mut lines = Vec::new();
    for line in reader.split(b'\n') {
        let line = String::from_utf8(line.unwrap()).unwrap();
        let done = line.starts_with("DATA");
        lines.push(line);
        if done {
            break;
        }
    }
    lines
}

#[test]
fn imo_header() {
    let path = Path::new("imo_header.pcd");
    let coords = Array2::<f32>::ones((7, 4));
    save_imo_pcd(coords.view(), path).unwrap();
    let lines = header_lines(path);
    remove_file(path).unwrap();

    assert_eq!(
        lines,
        vec![
            "# .PCD v0.7 - Point Cloud Data file format",
            "VERSION 0.7",
            "FIELDS x y z intensity laserid timeoffset yawangle mirrorid",
            "SIZE 4 4 4 4 2 8 4 1",
            "TYPE F F F F U F F U",
            "COUNT 1 1 1 1 1 1 1 1",
            "WIDTH 7",
            "HEIGHT 1",
            "VIEWPOINT 0 0 0 1 0 0 0",
            "POINTS 7",
            "DATA binary",
        ]
    );
}

#[test]
fn imo_payload_size() {
    let path = Path::new("imo_payload_size.pcd");
    let cloud = PointCloud::from_points(imo_points(10)).unwrap();
    write(&cloud, path).unwrap();
    let header_size: usize = header_lines(path).iter().map(|l| l.len() + 1).sum();
    let file_size = path.metadata().unwrap().len() as usize;
    remove_file(path).unwrap();
    assert_eq!(file_size, header_size + 10 * 31);
}

#[test]
fn write_read_cycle_all_fields() {
    let path = Path::new("write_read_cycle_all_fields.pcd");
    let cloud = PointCloud::from_points(imo_points(1000)).unwrap();
    write(&cloud, path).unwrap();
    let read_back = read::<PointImo>(path).unwrap();
    remove_file(path).unwrap();
    assert_eq!(read_back, cloud);
}

#[test]
fn write_read_cycle_empty() {
    let path = Path::new("write_read_cycle_empty.pcd");
    let cloud = PointCloud::<PointImo>::default();
    write(&cloud, path).unwrap();
    let read_back = read::<PointImo>(path).unwrap();
    remove_file(path).unwrap();
    assert!(read_back.is_empty());
    assert_eq!(read_back.width(), 0);
    assert_eq!(read_back.height(), 1);
}

#[test]
fn replace_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pcd");
    std::fs::write(&path, "previous content").unwrap();

    let cloud = PointCloud::from_points(imo_points(5)).unwrap();
    write(&cloud, &path).unwrap();
    let cloud = PointCloud::from_points(imo_points(2)).unwrap();
    write(&cloud, &path).unwrap();

    let read_back = read::<PointImo>(&path).unwrap();
    assert_eq!(read_back.len(), 2);

    // No temporary files are left behind
    let entries: Vec<_> = read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn invalid_input_keeps_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.pcd");
    std::fs::write(&path, "previous content").unwrap();

    let coords = Array2::<f32>::zeros((3, 5));
    let err = save_imo_pcd(coords.view(), &path).unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(read_to_string(&path).unwrap(), "previous content");
}

#[test]
fn missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("scan.pcd");
    let cloud = PointCloud::from_points(imo_points(1)).unwrap();
    let err = write(&cloud, &path).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn replace_keeps_permissions() {
    use std::fs::{set_permissions, Permissions};
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("private.pcd");
    std::fs::write(&path, "old").unwrap();
    set_permissions(&path, Permissions::from_mode(0o600)).unwrap();

    let cloud = PointCloud::from_points(imo_points(3)).unwrap();
    write(&cloud, &path).unwrap();

    let mode = path.metadata().unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    assert_eq!(read::<PointImo>(&path).unwrap().len(), 3);
}

#[cfg(unix)]
#[test]
fn new_file_uses_default_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let reference = dir.path().join("reference");
    File::create(&reference).unwrap();
    let path = dir.path().join("new.pcd");

    let cloud = PointCloud::from_points(imo_points(1)).unwrap();
    write(&cloud, &path).unwrap();

    let expected = reference.metadata().unwrap().permissions().mode() & 0o777;
    let mode = path.metadata().unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, expected);
}

#[cfg(unix)]
#[test]
fn write_through_symlink() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("target.pcd");
    let link = dir.path().join("link.pcd");
    std::fs::write(&target, "old").unwrap();
    symlink("target.pcd", &link).unwrap();

    let cloud = PointCloud::from_points(imo_points(3)).unwrap();
    write(&cloud, &link).unwrap();

    let link_type = link.symlink_metadata().unwrap().file_type();
    assert!(link_type.is_symlink());
    assert_eq!(read::<PointImo>(&target).unwrap(), cloud);
    assert_eq!(read::<PointImo>(&link).unwrap(), cloud);
}

#[cfg(unix)]
#[test]
fn write_through_dangling_symlink() {
    use std::os::unix::fs::symlink;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("created.pcd");
    let link = dir.path().join("link.pcd");
    symlink("created.pcd", &link).unwrap();

    let cloud = PointCloud::from_points(imo_points(2)).unwrap();
    write(&cloud, &link).unwrap();

    assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(read::<PointImo>(&target).unwrap().len(), 2);
}

#[cfg(unix)]
#[test]
fn read_only_directory() {
    use std::fs::{create_dir, set_permissions, Permissions};
    use std::io::ErrorKind;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    create_dir(&locked).unwrap();
    set_permissions(&locked, Permissions::from_mode(0o555)).unwrap();

    // Permissions are not enforced for root
    if File::create(locked.join("check")).is_err() {
        let cloud = PointCloud::from_points(imo_points(1)).unwrap();
        let err = write(&cloud, locked.join("scan.pcd")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.io_kind(), Some(ErrorKind::PermissionDenied));
    }

    set_permissions(&locked, Permissions::from_mode(0o755)).unwrap();
}
