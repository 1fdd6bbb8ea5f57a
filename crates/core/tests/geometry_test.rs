//! Geometry properties over boxes, polygons and typed regions.

use tablegrid_core::GridError;
use tablegrid_core::geometry::{BBox, Polygon, Region, Reshape, Size};
use tablegrid_core::regions::{LayoutBox, TextLine, TypedRegion};

fn sample_boxes() -> Vec<BBox> {
    vec![
        BBox::new(0.0, 0.0, 10.0, 10.0),
        BBox::new(5.0, 3.0, 25.0, 9.0),
        BBox::new(12.0, -4.0, 18.0, 30.0),
        BBox::new(40.0, 40.0, 41.0, 45.0),
        BBox::new(8.5, 7.25, 9.0, 7.5),
    ]
}

#[test]
fn test_bbox_normalized_has_ordered_edges() {
    let inverted = [
        BBox::new(10.0, 20.0, 0.0, 5.0),
        BBox::new(-3.0, 8.0, -7.0, 2.0),
        BBox::new(1.0, 1.0, 1.0, 1.0),
    ];
    for b in inverted {
        let n = b.normalized();
        assert!(n.x0 <= n.x1);
        assert!(n.top <= n.bottom);
        assert!(n.area() >= 0.0);
    }

    let polygon = Polygon::new([[30.0, 40.0], [10.0, 40.0], [10.0, 5.0], [30.0, 5.0]]);
    let bbox = polygon.bbox();
    assert!(bbox.x0 <= bbox.x1 && bbox.top <= bbox.bottom);
    assert!(polygon.area() >= 0.0);
}

#[test]
fn test_intersection_area_is_symmetric() {
    let boxes = sample_boxes();
    for a in &boxes {
        for b in &boxes {
            assert_eq!(
                a.intersection_area(b, 0.0, 0.0),
                b.intersection_area(a, 0.0, 0.0)
            );
        }
    }
}

#[test]
fn test_intersection_pct_bounds() {
    let boxes = sample_boxes();
    for a in &boxes {
        for b in &boxes {
            let pct = a.intersection_pct(b, 0.0, 0.0).unwrap();
            assert!((0.0..=1.0).contains(&pct), "{pct} out of range");
        }
        assert_eq!(a.intersection_pct(a, 0.0, 0.0).unwrap(), 1.0);
    }

    let inner = BBox::new(2.0, 2.0, 4.0, 4.0);
    let outer = BBox::new(0.0, 0.0, 10.0, 10.0);
    assert_eq!(inner.intersection_pct(&outer, 0.0, 0.0).unwrap(), 1.0);
    assert_eq!(outer.intersection_pct(&inner, 0.0, 0.0).unwrap(), 0.04);
}

#[test]
fn test_intersection_pct_zero_area_is_zero() {
    let line = BBox::new(5.0, 5.0, 5.0, 20.0);
    let page = BBox::new(0.0, 0.0, 100.0, 100.0);
    assert_eq!(line.intersection_pct(&page, 0.0, 0.0).unwrap(), 0.0);
}

#[test]
fn test_margin_fraction_out_of_range_rejected() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BBox::new(5.0, 5.0, 15.0, 15.0);
    let err = a.intersection_pct(&b, 1.5, 0.0).unwrap_err();
    assert!(matches!(err, GridError::ParameterViolation(_)));
    assert!(a.intersection_pct(&b, 0.0, -0.1).is_err());
    assert!(a.intersection_pct(&b, 1.0, 1.0).is_ok());
}

#[test]
fn test_margin_dilates_nearby_boxes() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0);
    let b = BBox::new(12.0, 0.0, 22.0, 10.0);
    assert_eq!(a.intersection_pct(&b, 0.0, 0.0).unwrap(), 0.0);
    assert!(a.intersection_pct(&b, 0.5, 0.0).unwrap() > 0.0);
}

#[test]
fn test_merge_bounds() {
    let boxes = sample_boxes();
    for a in &boxes {
        for b in &boxes {
            let merged = a.to_polygon().merge(&b.to_polygon()).bbox();
            assert_eq!(
                merged,
                BBox::new(
                    a.x0.min(b.x0),
                    a.top.min(b.top),
                    a.x1.max(b.x1),
                    a.bottom.max(b.bottom)
                )
            );
        }
    }
}

#[test]
fn test_rescale_round_trip_within_truncation() {
    let model = Size::new(500.0, 400.0);
    let image = Size::new(1000.0, 800.0);
    let polygon = BBox::new(101.0, 203.0, 655.0, 797.0).to_polygon();
    let back = polygon.rescale(image, model).rescale(model, image);
    for (orig, got) in polygon.corners().iter().zip(back.corners()) {
        assert!((orig[0] - got[0]).abs() <= 2.0);
        assert!((orig[1] - got[1]).abs() <= 2.0);
    }
}

#[test]
fn test_fit_to_bounds_is_idempotent() {
    let bounds = BBox::new(0.0, 0.0, 20.0, 20.0);
    for b in sample_boxes() {
        let once = b.to_polygon().fit_to_bounds(&bounds);
        assert_eq!(once.fit_to_bounds(&bounds), once);
        let bbox = once.bbox();
        assert!(bbox.x0 >= 0.0 && bbox.x1 <= 20.0);
        assert!(bbox.top >= 0.0 && bbox.bottom <= 20.0);
    }
}

#[test]
fn test_intersection_polygon_emptiness() {
    let a = BBox::new(0.0, 0.0, 10.0, 10.0).to_polygon();
    let b = BBox::new(5.0, 5.0, 15.0, 15.0).to_polygon();
    let c = BBox::new(20.0, 20.0, 30.0, 30.0).to_polygon();
    let overlap = a.intersection_polygon(&b);
    assert!(!overlap.is_empty());
    assert_eq!(overlap.bbox(), BBox::new(5.0, 5.0, 10.0, 10.0));
    assert!(a.intersection_polygon(&c).is_empty());
}

#[test]
fn test_malformed_shapes_rejected() {
    let three = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]];
    assert!(matches!(
        Polygon::from_nested(&three),
        Err(GridError::ShapeViolation(_))
    ));
    let bad_corner = vec![vec![0.0, 0.0], vec![1.0], vec![1.0, 1.0], vec![0.0, 1.0]];
    assert!(Polygon::from_nested(&bad_corner).is_err());
    assert!(BBox::from_slice(&[0.0, 1.0, 2.0]).is_err());

    assert!(serde_json::from_str::<BBox>("[0, 0, 1]").is_err());
    assert!(serde_json::from_str::<Polygon>("[[0, 0], [1, 0], [1, 1]]").is_err());
    let ok: BBox = serde_json::from_str("[1, 2, 3, 4]").unwrap();
    assert_eq!(ok, BBox::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn test_map_polygon_keeps_payload() {
    let line = TextLine {
        polygon: BBox::new(10.0, 10.0, 30.0, 20.0).to_polygon(),
        text: "total".to_string(),
        confidence: Some(0.9),
    };
    let moved = line.map_polygon(|p| p.shift(Some(-10.0), None));
    assert_eq!(moved.text, "total");
    assert_eq!(moved.confidence, Some(0.9));
    assert_eq!(moved.bbox(), BBox::new(0.0, 10.0, 20.0, 20.0));
}

#[test]
fn test_typed_region_dispatch() {
    let layout = LayoutBox {
        polygon: BBox::new(0.0, 0.0, 50.0, 20.0).to_polygon(),
        confidence: None,
        label: "Table".to_string(),
        position: 0,
        top_k: None,
    };
    let region = TypedRegion::from(layout);
    assert_eq!(region.label().as_deref(), Some("Table"));
    assert_eq!(region.area(), 1000.0);

    let scaled = region.map_polygon(|p| p.rescale(Size::new(100.0, 100.0), Size::new(200.0, 200.0)));
    assert_eq!(scaled.bbox(), BBox::new(0.0, 0.0, 100.0, 40.0));
    assert!(matches!(scaled, TypedRegion::Layout(_)));
}
