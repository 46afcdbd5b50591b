use super::*;

fn frame(px: [u8; 4], width: u32, height: u32) -> FrameRGBA {
    FrameRGBA {
        width,
        height,
        data: px.repeat((width * height) as usize),
        premultiplied: true,
    }
}

#[test]
fn format_follows_extension() {
    assert_eq!(output_format(Path::new("a/b.jpg")).unwrap(), ImageFormat::Jpeg);
    assert_eq!(output_format(Path::new("a/b.JPEG")).unwrap(), ImageFormat::Jpeg);
    assert_eq!(output_format(Path::new("b.png")).unwrap(), ImageFormat::Png);
    assert!(output_format(Path::new("noext")).is_err());
    assert!(format_keeps_alpha(ImageFormat::Png));
    assert!(!format_keeps_alpha(ImageFormat::Jpeg));
}

#[test]
fn flatten_blends_premultiplied_over_background() {
    let out = flatten_to_rgb8(&[128, 0, 0, 128, 10, 20, 30, 255], true, [0, 0, 255, 255]);
    assert_eq!(out, vec![128, 0, 127, 10, 20, 30]);

    let straight = flatten_to_rgb8(&[255, 255, 255, 0], false, [1, 2, 3, 255]);
    assert_eq!(straight, vec![1, 2, 3]);
}

#[test]
fn png_round_trips_straight_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/out.png");
    // premultiplied (100, 50, 0, 128) is straight (199, 100, 0, 128)
    write_image(&frame([100, 50, 0, 128], 3, 2), &path, &OutputOptions::default()).unwrap();

    let back = image::open(&path).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (3, 2));
    let px = back.get_pixel(1, 1).0;
    assert_eq!(px[3], 128);
    assert!(px[0].abs_diff(199) <= 1, "{px:?}");
    assert!(px[1].abs_diff(100) <= 1, "{px:?}");
}

#[test]
fn jpeg_is_flattened_and_opaque() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jpg");
    let opts = OutputOptions {
        flatten_rgba: [255, 255, 255, 255],
        jpeg_quality: 90,
    };
    write_image(&frame([0, 0, 0, 0], 16, 16), &path, &opts).unwrap();

    let back = image::open(&path).unwrap();
    assert!(!back.color().has_alpha());
    let px = back.to_rgb8().get_pixel(8, 8).0;
    assert!(px.iter().all(|&c| c >= 250), "{px:?}");
}

#[test]
fn wide_sample_formats_are_written_from_8bit_frames() {
    let dir = tempfile::tempdir().unwrap();
    // premultiplied (100, 50, 0, 128) is straight (199, 100, 0, 128)
    let src = frame([100, 50, 0, 128], 4, 3);

    for name in ["out.ff", "out.exr"] {
        let path = dir.path().join(name);
        write_image(&src, &path, &OutputOptions::default()).unwrap();
        let back = image::open(&path).unwrap();
        assert!(back.color().has_alpha(), "{name}");
        let back = back.to_rgba8();
        assert_eq!(back.dimensions(), (4, 3), "{name}");
        let px = back.get_pixel(2, 1).0;
        assert!(px[0].abs_diff(199) <= 2, "{name}: {px:?}");
        assert!(px[1].abs_diff(100) <= 2, "{name}: {px:?}");
        assert!(px[3].abs_diff(128) <= 2, "{name}: {px:?}");
    }

    let path = dir.path().join("out.hdr");
    write_image(&src, &path, &OutputOptions::default()).unwrap();
    let back = image::open(&path).unwrap();
    assert_eq!((back.width(), back.height()), (4, 3));
    assert!(!back.color().has_alpha());
}

#[test]
fn write_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.png");
    write_image(&frame([0, 0, 0, 255], 2, 2), &path, &OutputOptions::default()).unwrap();
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("out.png")]);
}

#[test]
fn bad_frames_and_options_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut short = frame([0, 0, 0, 255], 2, 2);
    short.data.pop();
    assert!(matches!(
        write_image(&short, &dir.path().join("a.png"), &OutputOptions::default()),
        Err(CoverError::Render(_))
    ));

    let opts = OutputOptions {
        jpeg_quality: 0,
        ..OutputOptions::default()
    };
    assert!(matches!(
        write_image(&frame([0; 4], 1, 1), &dir.path().join("a.jpg"), &opts),
        Err(CoverError::Validation(_))
    ));
    assert!(!dir.path().join("a.png").exists());
}
