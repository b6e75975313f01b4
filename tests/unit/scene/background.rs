use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn parses_solid_colors() {
    let bg = Background::parse("#ffe4e1").unwrap();
    assert_eq!(bg, Background::Color(ColorDef::parse_css("#ffe4e1").unwrap()));
    assert_eq!(bg.to_css(), "#ffe4e1");
    assert!(bg.asset().is_none());
}

#[test]
fn parses_url_with_and_without_quotes() {
    for expr in [
        "url(/backgrounds/pink-paper.jpg)",
        "url('/backgrounds/pink-paper.jpg')",
        "url(\"/backgrounds/pink-paper.jpg\")",
    ] {
        let bg = Background::parse(expr).unwrap();
        assert_eq!(
            bg.asset().map(AssetRef::as_str),
            Some("/backgrounds/pink-paper.jpg"),
            "{expr}"
        );
    }
    assert!(Background::parse("url()").is_err());
    assert!(Background::parse("url(/a.jpg").is_err());
}

#[test]
fn parses_gradient_with_angle_and_positions() {
    let bg = Background::parse("linear-gradient(135deg, #ff9a9e 0%, rgba(254, 207, 239, 0.5) 100%)")
        .unwrap();
    let Background::LinearGradient(g) = &bg else {
        panic!("expected gradient");
    };
    assert_eq!(g.direction, GradientDirection::Angle(135.0));
    assert_eq!(g.stops.len(), 2);
    assert_eq!(g.stops[1].position, Some(1.0));
    assert!(approx(g.stops[1].color.a, 0.5));

    let again = Background::parse(&bg.to_css()).unwrap();
    assert_eq!(again.to_css(), bg.to_css());
}

#[test]
fn gradient_defaults_to_bottom_and_spreads_stops() {
    let Background::LinearGradient(g) =
        Background::parse("linear-gradient(red, white, blue)").unwrap()
    else {
        panic!("expected gradient");
    };
    assert!(approx(g.direction.angle_deg(100.0, 50.0), 180.0));
    let stops = g.resolved_stops();
    let positions: Vec<f64> = stops.iter().map(|(p, _)| *p).collect();
    assert_eq!(positions, vec![0.0, 0.5, 1.0]);
}

#[test]
fn stop_positions_never_decrease() {
    let Background::LinearGradient(g) =
        Background::parse("linear-gradient(to right, red 60%, white 20%, blue)").unwrap()
    else {
        panic!("expected gradient");
    };
    let positions: Vec<f64> = g.resolved_stops().iter().map(|(p, _)| *p).collect();
    assert!(approx(positions[0], 0.6));
    assert!(approx(positions[1], 0.6));
    assert!(approx(positions[2], 1.0));
}

#[test]
fn side_and_corner_angles() {
    let dir = |s: &str| {
        let Background::LinearGradient(g) =
            Background::parse(&format!("linear-gradient({s}, red, blue)")).unwrap()
        else {
            panic!("expected gradient");
        };
        g.direction
    };
    assert!(approx(dir("to right").angle_deg(10.0, 10.0), 90.0));
    assert!(approx(dir("to top").angle_deg(10.0, 10.0), 0.0));
    assert!(approx(dir("to bottom right").angle_deg(10.0, 10.0), 135.0));
    assert!(approx(dir("to top right").angle_deg(10.0, 10.0), 45.0));
    assert!(approx(dir("0.25turn").angle_deg(1.0, 1.0), 90.0));
    // Wide boxes flatten the corner angle toward the vertical axis.
    assert!(dir("to top right").angle_deg(400.0, 100.0) < 45.0);
}

#[test]
fn color_at_interpolates_between_stops() {
    let stops = vec![
        (0.0, ColorDef::rgba(0.0, 0.0, 0.0, 1.0)),
        (1.0, ColorDef::rgba(1.0, 1.0, 1.0, 1.0)),
    ];
    let mid = LinearGradient::color_at(&stops, 0.5);
    assert!(approx(mid.r, 0.5));
    assert_eq!(LinearGradient::color_at(&stops, -1.0), stops[0].1);
    assert_eq!(LinearGradient::color_at(&stops, 2.0), stops[1].1);
}

#[test]
fn rejects_malformed_gradients() {
    assert!(Background::parse("linear-gradient(red)").is_err());
    assert!(Background::parse("linear-gradient(to nowhere, red, blue)").is_err());
    assert!(Background::parse("linear-gradient(red, , blue)").is_err());
    assert!(Background::parse("radial-gradient(red, blue)").is_err());
}

#[test]
fn serde_uses_expression_text() {
    let bg: Background = serde_json::from_str("\"url(/backgrounds/white-paper.jpg)\"").unwrap();
    assert_eq!(bg, Background::image("/backgrounds/white-paper.jpg"));
    assert_eq!(
        serde_json::to_string(&bg).unwrap(),
        "\"url(/backgrounds/white-paper.jpg)\""
    );
    assert_eq!(Background::default().to_css(), "#ffffff");
}
