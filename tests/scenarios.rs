mod common;

use alphatree::filter::{
    AlphaSelector, AreaSelector, DepthShade, FilterEngine, MeanColor, RegionPalette,
    SalienceSelector,
};
use alphatree::metric::{Euclidean, Manhattan, Normalized};
use alphatree::{AlphaTree, NodeId, PixelGrid, TreeConfig, TreeError, LEAF_ALPHA};
use test_case::test_case;

const TWO_PIXELS: [u8; 6] = [0, 0, 0, 10, 0, 0];

#[test]
fn two_pixel_tree_shape() {
    let tree = common::build(2, 1, 3, &TWO_PIXELS, &TreeConfig::default());
    assert_eq!(tree.len(), 3);

    let root = NodeId::new(2);
    assert_eq!(tree.root(), Some(root));
    assert_eq!(tree.alpha(root), 10.0);
    assert_eq!(tree.area(root), 2);
    assert_eq!(tree.parent(NodeId::new(0)), Some(root));
    assert_eq!(tree.parent(NodeId::new(1)), Some(root));

    let mut mean = [0u8; 3];
    tree.mean_color_into(root, &mut mean);
    assert_eq!(mean, [5, 0, 0]);
    assert_eq!(tree.stats().min(root), &[0, 0, 0]);
    assert_eq!(tree.stats().max(root), &[10, 0, 0]);
}

#[test_case(1.0, &[0, 0, 0, 10, 0, 0]; "lambda 1 keeps pixels")]
#[test_case(2.0, &[5, 0, 0, 5, 0, 0]; "lambda 2 merges")]
#[test_case(100.0, &[5, 0, 0, 5, 0, 0]; "out of range falls back to root")]
fn two_pixel_area_filter(lambda: f64, expected: &[u8]) {
    let tree = common::build(2, 1, 3, &TWO_PIXELS, &TreeConfig::default());
    let mut engine = FilterEngine::new(&tree, AreaSelector, MeanColor);
    assert_eq!(engine.filter(lambda).unwrap(), expected);
}

#[test_case(0.5; "below any edge")]
#[test_case(1.0; "one pixel")]
#[test_case(9.0; "whole image")]
#[test_case(1e9; "far out of range")]
fn uniform_image_is_unchanged(lambda: f64) {
    let data: Vec<u8> = [30u8, 60, 90].repeat(9);
    let tree = common::build(3, 3, 3, &data, &TreeConfig::default());
    assert_eq!(tree.len(), 9 + 1);
    assert_eq!(tree.alpha(NodeId::new(9)), 0.0);

    let mut area = FilterEngine::new(&tree, AreaSelector, MeanColor);
    assert_eq!(area.filter(lambda).unwrap(), data);
    let mut salience = FilterEngine::new(&tree, SalienceSelector, MeanColor);
    assert_eq!(salience.filter(lambda).unwrap(), data);
}

#[test]
fn zero_size_image_builds_empty_tree() {
    let tree = common::build(0, 0, 3, &[], &TreeConfig::default());
    assert!(tree.is_empty());
    assert_eq!(tree.roots().count(), 0);
    let mut engine = FilterEngine::new(&tree, AreaSelector, MeanColor);
    assert!(engine.filter(1.0).unwrap().is_empty());
}

#[test]
fn single_pixel_image_is_a_leaf() {
    let tree = common::build(1, 1, 3, &[1, 2, 3], &TreeConfig::new(8).unwrap());
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.alpha(NodeId::new(0)), LEAF_ALPHA);
    assert_eq!(tree.parent(NodeId::new(0)), None);

    let mut engine = FilterEngine::new(&tree, AreaSelector, MeanColor);
    assert_eq!(engine.filter(50.0).unwrap(), vec![1, 2, 3]);
}

#[test]
fn eight_connectivity_joins_diagonals_first() {
    // Diagonal pixels are identical, anti-diagonal ones differ strongly.
    let data = [0u8, 200, 200, 0];
    let grid = PixelGrid::new(2, 2, 1, &data).unwrap();
    let four = AlphaTree::build(&grid, &Manhattan, &TreeConfig::new(4).unwrap()).unwrap();
    let eight = AlphaTree::build(&grid, &Manhattan, &TreeConfig::new(8).unwrap()).unwrap();

    // 4-conn only ever sees 200-steps: one node holding everything.
    assert_eq!(four.len(), 5);
    // 8-conn merges each diagonal at 0, then joins them at 200.
    assert_eq!(eight.len(), 7);
    assert_eq!(eight.alpha(NodeId::new(4)), 0.0);
    assert_eq!(eight.alpha(NodeId::new(6)), 200.0);
}

#[test]
fn alpha_filter_cuts_at_merge_level() {
    let data = common::two_halves(4, 2);
    let tree = common::build(4, 2, 3, &data, &TreeConfig::default());
    let mut engine = FilterEngine::new(&tree, AlphaSelector, MeanColor);

    // Below the step between halves the two flat zones stay apart.
    assert_eq!(engine.region_count(0.0).unwrap(), 2);
    assert_eq!(engine.filter(10.0).unwrap(), data);
    // At the step everything is one region.
    let step = (3.0f64 * 200.0 * 200.0).sqrt();
    assert_eq!(engine.region_count(step).unwrap(), 1);
}

#[test]
fn salience_filter_removes_weak_detail() {
    // Left half has one slightly brighter pixel.
    let mut data = common::two_halves(4, 2);
    data[0..3].copy_from_slice(&[26, 26, 26]);
    let tree = common::build(4, 2, 3, &data, &TreeConfig::default());
    let mut engine = FilterEngine::new(&tree, SalienceSelector, MeanColor);

    assert_eq!(engine.region_count(5.0).unwrap(), 3);
    assert_eq!(engine.region_count(20.0).unwrap(), 2);
}

#[test]
fn exclude_top_builds_forest() {
    let data = common::two_halves(4, 2);
    let config = TreeConfig::default()
        .with_lambda_min(1.0)
        .unwrap()
        .with_exclude_top(true);
    let tree = common::build(4, 2, 3, &data, &config);

    assert_eq!(tree.root(), None);
    let roots: Vec<NodeId> = tree.roots().collect();
    assert_eq!(roots.len(), 2);
    assert!(roots.iter().all(|&r| tree.area(r) == 4 && tree.alpha(r) == 1.0));
    assert_eq!(tree.summary().roots, 2);

    // Each pixel falls back to its own tree's root.
    let mut engine = FilterEngine::new(&tree, AreaSelector, MeanColor);
    assert_eq!(engine.filter(1000.0).unwrap(), data);
}

#[test]
fn normalized_metric_rescales_alphas() {
    let grid = PixelGrid::new(2, 1, 3, &TWO_PIXELS).unwrap();
    let metric = Normalized::new(Euclidean, 0.0, 1.0).unwrap();
    let tree = AlphaTree::build(&grid, &metric, &TreeConfig::default()).unwrap();

    let expected = 10.0 / (3.0f64.sqrt() * 255.0);
    assert!((tree.alpha(NodeId::new(2)) - expected).abs() < 1e-12);
}

#[test]
fn depth_and_palette_colourings() {
    let data = common::two_halves(4, 1);
    let tree = common::build(4, 1, 3, &data, &TreeConfig::default());

    let mut depth = FilterEngine::new(&tree, AreaSelector, DepthShade::new(&tree));
    assert_eq!(depth.filter(100.0).unwrap(), vec![255; 12]);
    assert_eq!(depth.filter(2.0).unwrap(), vec![127; 12]);

    let mut palette = FilterEngine::new(&tree, AreaSelector, RegionPalette::new(3));
    let out = palette.filter(2.0).unwrap();
    assert_eq!(out[0..3], out[3..6]);
    assert_eq!(out[6..9], out[9..12]);
    assert_ne!(out[0..3], out[6..9]);
}

#[test_case(3, 2, 3, 17; "short buffer")]
#[test_case(2, 2, 1, 5; "long buffer")]
fn mismatched_buffers_are_rejected(w: usize, h: usize, c: usize, len: usize) {
    let data = vec![0u8; len];
    assert!(matches!(
        PixelGrid::new(w, h, c, &data),
        Err(TreeError::BufferSizeMismatch { actual, .. }) if actual == len
    ));
}

#[test]
fn configuration_errors() {
    assert!(matches!(PixelGrid::new(1, 1, 0, &[]), Err(TreeError::ZeroChannels)));
    assert!(matches!(TreeConfig::new(6), Err(TreeError::InvalidConnectivity(6))));
    assert!(matches!(
        TreeConfig::default().with_lambda_min(-0.5),
        Err(TreeError::InvalidLambdaMin(_))
    ));
}
