use super::*;

fn fake(tag: u8) -> LoadedFont {
    LoadedFont::from_bytes(vec![tag; 4])
}

#[test]
fn default_roles_match_known_families() {
    let roles = FamilyRoles::default();
    assert_eq!(roles.role_for("\"综艺体\", sans-serif"), FontRole::Zongyi);
    assert_eq!(roles.role_for("'MyCoolEnglishFont'"), FontRole::English);
    assert_eq!(roles.role_for("serif, 'MyCoolEnglishFont'"), FontRole::English);
    assert_eq!(roles.role_for("Helvetica"), FontRole::Main);
    assert_eq!(roles.role_for(""), FontRole::Main);
}

#[test]
fn role_lookup_is_exact_per_family_not_substring() {
    let roles = FamilyRoles::default();
    assert_eq!(roles.role_for("MyCoolEnglishFontBold"), FontRole::Main);
}

#[test]
fn first_listed_family_wins() {
    let roles = FamilyRoles::default();
    assert_eq!(
        roles.role_for("MyCoolEnglishFont, 综艺体"),
        FontRole::English
    );
}

#[test]
fn assignments_extend_and_replace_entries() {
    let mut roles = FamilyRoles::empty();
    assert_eq!(roles.role_for("综艺体"), FontRole::Main);

    roles.insert_assignment("Display Font=zongyi").unwrap();
    roles.insert_assignment("'Body Latin' = english").unwrap();
    assert_eq!(roles.role_for("display font"), FontRole::Zongyi);
    assert_eq!(roles.role_for("Body Latin"), FontRole::English);

    roles.insert_assignment("Display Font=main").unwrap();
    assert_eq!(roles.role_for("Display Font"), FontRole::Main);

    assert!(roles.insert_assignment("no-separator").is_err());
    assert!(roles.insert_assignment("=zongyi").is_err());
    assert!(roles.insert_assignment("X=bold").is_err());
}

#[test]
fn font_table_ignores_empty_paths() {
    let table = FontTable {
        main: Some(PathBuf::from("main.ttf")),
        italic: Some(PathBuf::new()),
        ..FontTable::default()
    };
    assert_eq!(table.path_for(FontRole::Main), Some(Path::new("main.ttf")));
    assert_eq!(table.path_for(FontRole::Italic), None);
    assert_eq!(table.path_for(FontRole::Zongyi), None);
}

#[test]
fn font_for_falls_back_to_main() {
    let lib = FontLibrary::new(fake(1));
    assert_eq!(lib.font_for(FontRole::Zongyi, false).id, lib.main().id);
    assert_eq!(lib.font_for(FontRole::English, false).id, lib.main().id);
    assert_eq!(lib.font_for(FontRole::Main, true).id, lib.main().id);
}

#[test]
fn font_for_prefers_role_and_italic_override() {
    let lib = FontLibrary::new(fake(1))
        .with_font(FontRole::Zongyi, fake(2))
        .with_font(FontRole::Italic, fake(3));

    let zongyi = lib.font_for(FontRole::Zongyi, false);
    assert_eq!(zongyi.bytes[0], 2);

    let italic = lib.font_for(FontRole::Zongyi, true);
    assert_eq!(italic.bytes[0], 3);

    let ids: Vec<u32> = lib.iter().map(|(_, f)| f.id).collect();
    assert_eq!(ids.len(), 3);
    let mut dedup = ids.clone();
    dedup.dedup();
    assert_eq!(ids, dedup);
}

#[test]
fn loading_a_non_font_file_is_a_font_error() {
    let path = std::env::temp_dir().join(format!("coverkit_not_a_font_{}.ttf", std::process::id()));
    std::fs::write(&path, b"definitely not a font").unwrap();
    let err = LoadedFont::from_path(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);
    assert!(matches!(err, CoverError::FontResolution(_)));

    let missing = std::env::temp_dir().join("coverkit_missing_font_dir/none.ttf");
    assert!(matches!(
        LoadedFont::from_path(&missing),
        Err(CoverError::FontResolution(_))
    ));
}

#[test]
fn load_survives_missing_optional_faces() {
    if system_default_font().is_none() {
        return;
    }
    let table = FontTable {
        main: None,
        zongyi: Some(PathBuf::from("/nonexistent/zongyi.ttf")),
        english: None,
        italic: Some(PathBuf::from("/nonexistent/italic.ttf")),
    };
    let lib = FontLibrary::load(&table).unwrap();
    assert!(matches!(lib.main().origin, FontOrigin::System { .. }));
    assert!(lib.get(FontRole::Italic).is_none());
    assert!(lib.get(FontRole::English).is_none());
    assert!(!lib.font_for(FontRole::Zongyi, true).bytes.is_empty());
}
