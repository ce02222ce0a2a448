use rubix_rs::models::{Dimension, DimensionSpec, FeatureFlags, PlotDimensions, TableShape};
use rubix_rs::sizing::{SizingPolicy, default_colorbar_height};
use rubix_rs::{ErrorKind, SizingError};

fn shape(rows: usize, cols: usize) -> Option<TableShape> {
    Some(TableShape::new(rows, cols))
}

fn no_flags() -> FeatureFlags {
    FeatureFlags {
        show_metadata_rows: false,
        show_metadata_rows_labels: false,
        show_metadata_cols: false,
        duplicate_metadata_cols: false,
        show_rows_legend: false,
        show_cols_legend: false,
        show_colorbar: false,
    }
}

/// Every flag set, each one enabled on its own.
fn single_flags() -> Vec<FeatureFlags> {
    let base = no_flags();
    vec![
        FeatureFlags { show_metadata_rows: true, ..base },
        FeatureFlags { show_metadata_rows_labels: true, ..base },
        FeatureFlags { show_metadata_cols: true, ..base },
        FeatureFlags { duplicate_metadata_cols: true, ..base },
        FeatureFlags { show_rows_legend: true, ..base },
        FeatureFlags { show_cols_legend: true, ..base },
        FeatureFlags { show_colorbar: true, ..base },
    ]
}

#[test]
fn tall_narrow_table_gets_width_floor() {
    let dims = SizingPolicy::standard().default_dimensions(shape(100, 5));
    assert_eq!(dims, PlotDimensions::new(720, 600));
}

#[test]
fn wide_table_keeps_cell_width() {
    let dims = SizingPolicy::standard().default_dimensions(shape(10, 300));
    assert_eq!(dims, PlotDimensions::new(1800, 60));
}

#[test]
fn width_floor_is_capped() {
    // floor would be 1.2 * 6000 = 7200, capped at 900
    let dims = SizingPolicy::standard().default_dimensions(shape(1000, 3));
    assert_eq!(dims, PlotDimensions::new(900, 6000));
}

#[test]
fn no_data_uses_fallback() {
    for policy in [SizingPolicy::standard(), SizingPolicy::compact()] {
        assert_eq!(policy.default_dimensions(None), PlotDimensions::new(1000, 500));
    }
}

#[test]
fn defaults_are_at_least_one_pixel() {
    let dims = SizingPolicy::standard().default_dimensions(shape(0, 0));
    assert!(dims.width >= 1 && dims.height >= 1);
}

#[test]
fn default_width_never_below_floor() {
    let policy = SizingPolicy::standard();
    for rows in [1usize, 7, 50, 149, 150, 151, 400] {
        for cols in [1usize, 3, 20, 120, 500] {
            let d = policy.default_dimensions(shape(rows, cols));
            let floor = (1.2 * d.height as f64).min(900.0);
            assert!(
                d.width as f64 >= floor.round(),
                "{}x{} -> {:?} below floor {}",
                rows,
                cols,
                d,
                floor
            );
        }
    }
}

#[test]
fn proportional_width_follows_aspect_ratio() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Proportional,
        height: Dimension::Fixed(300),
    };
    // 5 rows, 10 columns: width = height * 2
    let dims = policy.resolve_proportional(spec, shape(5, 10)).unwrap();
    assert_eq!(dims, PlotDimensions::new(600, 300));
}

#[test]
fn proportional_height_follows_aspect_ratio() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Fixed(800),
        height: Dimension::Proportional,
    };
    let dims = policy.resolve_proportional(spec, shape(20, 40)).unwrap();
    assert_eq!(dims, PlotDimensions::new(800, 400));
}

#[test]
fn proportional_result_is_rounded() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Fixed(100),
        height: Dimension::Proportional,
    };
    // 100 * 2 / 3 = 66.67
    let dims = policy.resolve_proportional(spec, shape(2, 3)).unwrap();
    assert_eq!(dims.height, 67);
}

#[test]
fn fixed_spec_is_returned_unchanged() {
    let policy = SizingPolicy::standard();
    let fixed = DimensionSpec::from(PlotDimensions::new(640, 480));
    assert_eq!(
        policy.resolve_proportional(fixed, None).unwrap(),
        PlotDimensions::new(640, 480)
    );
    assert_eq!(
        policy.resolve_proportional(fixed, shape(3, 4)).unwrap(),
        PlotDimensions::new(640, 480)
    );
}

#[test]
fn resolving_twice_changes_nothing() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Proportional,
        height: Dimension::Fixed(450),
    };
    let once = policy.resolve_proportional(spec, shape(30, 7)).unwrap();
    let twice = policy
        .resolve_proportional(DimensionSpec::from(once), shape(30, 7))
        .unwrap();
    assert_eq!(once, twice);
}

#[test]
fn proportional_without_data_is_missing_data() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Fixed(800),
        height: Dimension::Proportional,
    };
    let err = policy.resolve_proportional(spec, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingData);
    assert!(err.to_string().contains("upload your data first"));
    assert!(err.to_string().contains("height"));
}

#[test]
fn both_proportional_is_a_configuration_error() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Proportional,
        height: Dimension::Proportional,
    };
    for s in [None, shape(10, 10)] {
        let err = policy.resolve_proportional(spec, s).unwrap_err();
        assert_eq!(err, SizingError::BothProportional);
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}

#[test]
fn empty_table_cannot_drive_proportional_size() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Proportional,
        height: Dimension::Fixed(400),
    };
    let err = policy.resolve_proportional(spec, shape(0, 4)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn default_geometry_adds_enabled_margins() {
    let policy = SizingPolicy::standard();
    let geo = policy.embedding_geometry(PlotDimensions::new(720, 600), &FeatureFlags::default());
    assert_eq!(geo.margin_left, 50 + 72 + 150);
    assert_eq!(geo.margin_right, 75 + 100);
    assert_eq!(geo.margin_top, 25 + 72 + 25);
    assert_eq!(geo.margin_bottom, 50 + 100);
    assert_eq!(geo.total_width, 720 + 272 + 175);
    assert_eq!(geo.total_height, 600 + 122 + 150);
}

#[test]
fn bare_geometry_keeps_base_margins() {
    let policy = SizingPolicy::standard();
    let none = no_flags();
    let geo = policy.embedding_geometry(PlotDimensions::new(100, 100), &none);
    assert_eq!(geo.total_width, 100 + 50 + 100);
    assert_eq!(geo.total_height, 100 + 25 + 25 + 50);
}

#[test]
fn enabling_any_flag_never_shrinks_geometry() {
    let policy = SizingPolicy::standard();
    let dims = PlotDimensions::new(500, 400);
    let before = policy.embedding_geometry(dims, &no_flags());
    for on in single_flags() {
        let after = policy.embedding_geometry(dims, &on);
        assert!(after.total_width >= before.total_width);
        assert!(after.total_height >= before.total_height);
        assert!(
            after.total_width > before.total_width || after.total_height > before.total_height,
            "{:?} added no space",
            on
        );
    }
}

#[test]
fn geometry_is_deterministic() {
    let policy = SizingPolicy::compact();
    let dims = policy.default_dimensions(shape(250, 40));
    let a = policy.embedding_geometry(dims, &FeatureFlags::default());
    let b = policy.embedding_geometry(dims, &FeatureFlags::default());
    assert_eq!(a, b);
}

#[test]
fn colorbar_default_is_quarter_height() {
    assert_eq!(default_colorbar_height(PlotDimensions::new(720, 600)), 150);
    assert_eq!(default_colorbar_height(PlotDimensions::new(1000, 500)), 125);
    assert_eq!(default_colorbar_height(PlotDimensions::new(10, 2)), 1);
}

#[test]
fn oversized_fixed_side_is_rejected() {
    let policy = SizingPolicy::standard();
    let spec = DimensionSpec {
        width: Dimension::Fixed(2_147_483_647),
        height: Dimension::Fixed(300),
    };
    let err = policy.resolve_proportional(spec, shape(2, 2)).unwrap_err();
    assert!(matches!(err, SizingError::InvalidDimension { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn oversized_derived_side_is_rejected() {
    let policy = SizingPolicy::standard();
    // 1 row, 1000 columns: width would be 90000 * 1000
    let spec = DimensionSpec {
        width: Dimension::Proportional,
        height: Dimension::Fixed(90_000),
    };
    let err = policy.resolve_proportional(spec, shape(1, 1000)).unwrap_err();
    assert!(err.to_string().contains("width"));
}

#[test]
fn huge_tables_get_bounded_defaults() {
    let dims = SizingPolicy::standard().default_dimensions(shape(50_000, 50_000));
    assert_eq!(dims, PlotDimensions::new(Dimension::MAX_PX, Dimension::MAX_PX));
    let resolved = SizingPolicy::standard()
        .resolve_proportional(DimensionSpec::from(dims), shape(50_000, 50_000))
        .unwrap();
    assert_eq!(resolved, dims);
}
