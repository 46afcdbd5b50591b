use super::*;

#[test]
fn groups_by_underscore_then_extension() {
    let names = [
        "3_with_工作流_1.jpg",
        "2_with_工作流_1.jpg",
        "cover_with_logo.jpg",
        "plain.jpg",
        "a_with_logo_v2.png",
    ];
    let groups = group_by_marker(names, DEFAULT_MARKER).unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups["工作流"],
        vec!["2_with_工作流_1.jpg".to_string(), "3_with_工作流_1.jpg".to_string()]
    );
    assert_eq!(
        groups["logo"],
        vec!["a_with_logo_v2.png".to_string(), "cover_with_logo.jpg".to_string()]
    );
}

#[test]
fn group_keys_are_sorted() {
    let groups = group_by_marker(["x_with_b.png", "x_with_a.png", "y_with_c_.png"], "with").unwrap();
    let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn marker_is_matched_literally() {
    let groups = group_by_marker(["a_v.1_x.png", "a_vz1_y.png"], "v.1").unwrap();
    assert_eq!(groups.keys().collect::<Vec<_>>(), vec!["x"]);
}

#[test]
fn names_without_a_match_are_skipped() {
    assert!(group_by_marker(["with_x.png", "a_with_", "a_with_.png"], "with")
        .unwrap()
        .is_empty());
}

#[test]
fn scan_directory_reads_only_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("1_with_red_a.jpg"), b"x").unwrap();
    std::fs::write(dir.path().join("2_with_red.jpg"), b"x").unwrap();
    std::fs::create_dir(dir.path().join("3_with_blue_dir")).unwrap();

    let groups = scan_directory(dir.path(), DEFAULT_MARKER).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["red"].len(), 2);

    let out = dir.path().join("out/groups.json");
    write_groups_json(&groups, &out).unwrap();
    let back: Groups = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(back, groups);
}

#[test]
fn missing_directory_is_not_found() {
    let err = scan_directory(Path::new("/definitely/not/here"), "with").unwrap_err();
    assert!(matches!(
        err,
        CoverError::ResourceNotFound {
            kind: ResourceKind::Directory,
            ..
        }
    ));
}
