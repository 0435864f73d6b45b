use {
    chrono::Utc,
    image::{Rgba, RgbaImage},
    nexus_autodl::{
        detector::Detection,
        frame::{Frame, MonitorInfo},
        ButtonRole, DebugSink, Rect, TemplateId,
    },
};

#[test]
fn writes_annotated_png_and_json_record() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DebugSink::new(dir.path().join("frames")).unwrap();

    let monitor = MonitorInfo {
        index: 0,
        x: 0,
        y: 0,
        width: 320,
        height: 240,
    };
    let frame = Frame {
        monitor,
        image: RgbaImage::from_pixel(320, 240, Rgba([40, 40, 40, 255])),
        captured_at: Utc::now(),
    };
    let detections = vec![Detection {
        template_id: TemplateId::from(0),
        role: ButtonRole::WebsiteDownload,
        bounds: Rect::from_xywh(50, 40, 120, 60),
        match_count: 12,
    }];
    sink.record(3, &frame, &detections).unwrap();

    let png_path = dir.path().join("frames/frame_000003_m0.png");
    let json_path = dir.path().join("frames/frame_000003_m0.json");
    assert!(png_path.is_file());
    assert!(json_path.is_file());

    let annotated = image::open(&png_path).unwrap().to_rgba8();
    assert_eq!(annotated.dimensions(), (320, 240));
    // Top left corner of the detection box is painted with the highlight
    // color.
    assert_eq!(annotated.get_pixel(50, 40), &Rgba([0, 200, 0, 255]));
    // Pixels outside the box and label are untouched.
    assert_eq!(annotated.get_pixel(300, 200), &Rgba([40, 40, 40, 255]));

    let record: serde_json::Value =
        serde_json::from_str(&fs_err::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(record["cycle"], 3);
    assert_eq!(record["monitor"]["width"], 320);
    assert_eq!(record["detections"][0]["role"], "WebsiteDownload");
    assert_eq!(record["detections"][0]["match_count"], 12);
}

#[test]
fn record_files_are_keyed_by_cycle_and_monitor() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DebugSink::new(dir.path()).unwrap();
    let frame = Frame {
        monitor: MonitorInfo {
            index: 1,
            x: 1920,
            y: 0,
            width: 64,
            height: 64,
        },
        image: RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255])),
        captured_at: Utc::now(),
    };
    sink.record(12, &frame, &[]).unwrap();
    assert!(dir.path().join("frame_000012_m1.png").is_file());
    assert!(dir.path().join("frame_000012_m1.json").is_file());
}
