//! Tests for box geometry

use super::*;
use proptest::prelude::*;

fn qb(start: &[u64], count: &[u64]) -> QueryBox {
    QueryBox::new(start.to_vec(), count.to_vec()).unwrap()
}

fn disjoint(a: &QueryBox, b: &QueryBox) -> bool {
    a.intersect(b).unwrap().is_empty()
}

#[test]
fn test_new_rejects_mismatched_lengths() {
    let err = QueryBox::new(vec![0, 0], vec![1]).unwrap_err();
    assert!(matches!(err, Error::InvalidBox { .. }));
}

#[test]
fn test_new_rejects_zero_dimensions() {
    assert!(QueryBox::new(vec![], vec![]).is_err());
}

#[test]
fn test_new_rejects_overflowing_upper() {
    assert!(QueryBox::new(vec![u64::MAX], vec![1]).is_err());
}

#[test]
fn test_from_bounds() {
    let b = QueryBox::from_bounds(&[2, 3], &[5, 10]).unwrap();
    assert_eq!(b, qb(&[2, 3], &[3, 7]));
    assert!(QueryBox::from_bounds(&[5], &[2]).is_err());
}

#[test]
fn test_volume_and_upper() {
    let b = qb(&[1, 2, 3], &[4, 5, 6]);
    assert_eq!(b.volume(), 120);
    assert_eq!(b.upper(0), Some(5));
    assert_eq!(b.upper(2), Some(9));
    assert_eq!(b.upper(3), None);
    assert!(!b.is_empty());
}

#[test]
fn test_empty_sentinel() {
    let e = QueryBox::empty(3);
    assert_eq!(e.dim(), 3);
    assert_eq!(e.volume(), 0);
    assert!(e.is_empty());
}

#[test]
fn test_volume_saturates() {
    let b = qb(&[0, 0], &[u64::MAX / 2, 4]);
    assert_eq!(b.volume(), u64::MAX);
}

#[test]
fn test_intersect_overlapping() {
    let a = qb(&[0, 0], &[10, 10]);
    let b = qb(&[5, 5], &[10, 10]);
    assert_eq!(a.intersect(&b).unwrap(), qb(&[5, 5], &[5, 5]));
    assert_eq!(b.intersect(&a).unwrap(), qb(&[5, 5], &[5, 5]));
}

#[test]
fn test_intersect_disjoint_is_empty() {
    let a = qb(&[0, 0], &[10, 10]);
    let b = qb(&[20, 0], &[5, 5]);
    assert_eq!(a.intersect(&b).unwrap(), QueryBox::empty(2));
}

#[test]
fn test_intersect_touching_is_empty() {
    let a = qb(&[0, 0], &[10, 10]);
    let b = qb(&[10, 0], &[5, 10]);
    assert_eq!(a.intersect(&b).unwrap().volume(), 0);
}

#[test]
fn test_intersect_dimension_mismatch() {
    let a = qb(&[0, 0], &[10, 10]);
    let b = qb(&[0], &[10]);
    let err = a.intersect(&b).unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn test_contains() {
    let outer = qb(&[0, 0], &[10, 10]);
    assert!(outer.contains(&qb(&[2, 2], &[3, 3])));
    assert!(outer.contains(&outer));
    assert!(!outer.contains(&qb(&[8, 8], &[3, 3])));
    assert!(!outer.contains(&qb(&[0], &[1])));
    assert!(outer.contains(&QueryBox::empty(2)));
}

#[test]
fn test_complement_split_equal_is_empty() {
    let b = qb(&[3, 4], &[5, 6]);
    assert!(b.complement_split(&b).unwrap().is_empty());
}

#[test]
fn test_complement_split_disjoint_returns_self() {
    let b = qb(&[0, 0], &[5, 5]);
    let other = qb(&[10, 10], &[5, 5]);
    assert_eq!(b.complement_split(&other).unwrap(), vec![b]);
}

#[test]
fn test_complement_split_centered_hole_2d() {
    let outer = qb(&[0, 0], &[10, 10]);
    let inner = qb(&[3, 3], &[4, 4]);
    let pieces = outer.complement_split(&inner).unwrap();

    assert_eq!(
        pieces,
        vec![
            qb(&[0, 0], &[3, 10]),
            qb(&[7, 0], &[3, 10]),
            qb(&[3, 0], &[4, 3]),
            qb(&[3, 7], &[4, 3]),
        ]
    );
    let total: u64 = pieces.iter().map(QueryBox::volume).sum();
    assert_eq!(total, outer.volume() - inner.volume());
}

#[test]
fn test_complement_split_corner_overlap() {
    // Q = (5,5)+(10,10), cached A = (0,0)+(10,10): overlap is the top-left quarter
    let q = qb(&[5, 5], &[10, 10]);
    let a = qb(&[0, 0], &[10, 10]);
    let pieces = q.complement_split(&a).unwrap();

    assert_eq!(pieces, vec![qb(&[10, 5], &[5, 10]), qb(&[5, 10], &[5, 5])]);
}

#[test]
fn test_complement_split_at_most_two_per_axis() {
    let outer = qb(&[0, 0, 0], &[9, 9, 9]);
    let inner = qb(&[3, 3, 3], &[3, 3, 3]);
    let pieces = outer.complement_split(&inner).unwrap();
    assert_eq!(pieces.len(), 6);
}

#[test]
fn test_serde_json_roundtrip_validates() {
    let b = qb(&[1, 2], &[3, 4]);
    let json = serde_json::to_string(&b).unwrap();
    assert_eq!(json, r#"{"start":[1,2],"count":[3,4]}"#);
    assert_eq!(serde_json::from_str::<QueryBox>(&json).unwrap(), b);

    let overflow = format!(r#"{{"start":[{}],"count":[5]}}"#, u64::MAX);
    assert!(serde_json::from_str::<QueryBox>(&overflow).is_err());
    assert!(serde_json::from_str::<QueryBox>(r#"{"start":[],"count":[]}"#).is_err());
    assert!(serde_json::from_str::<QueryBox>(r#"{"start":[0,0],"count":[1]}"#).is_err());
}

#[test]
fn test_key_string_format() {
    assert_eq!(qb(&[0, 0], &[10, 10]).to_key_string(), "0,0|10,10");
    assert_eq!(qb(&[7], &[3]).to_key_string(), "7|3");
}

#[test]
fn test_key_string_parse() {
    let b: QueryBox = "1,2,3|4,5,6".parse().unwrap();
    assert_eq!(b, qb(&[1, 2, 3], &[4, 5, 6]));
}

#[test]
fn test_key_string_parse_errors() {
    assert!(matches!(
        "1,2".parse::<QueryBox>(),
        Err(Error::InvalidKey { .. })
    ));
    assert!(matches!(
        "1,x|2,3".parse::<QueryBox>(),
        Err(Error::InvalidKey { .. })
    ));
    assert!(matches!(
        "1,2|3".parse::<QueryBox>(),
        Err(Error::InvalidKey { .. })
    ));
}

#[test]
fn test_serde_json() {
    let b = qb(&[1, 2], &[3, 4]);
    let json = serde_json::to_string(&b).unwrap();
    assert_eq!(json, r#"{"start":[1,2],"count":[3,4]}"#);
}

fn arb_box(dim: usize) -> impl Strategy<Value = QueryBox> {
    (
        prop::collection::vec(0u64..20, dim),
        prop::collection::vec(1u64..12, dim),
    )
        .prop_map(|(start, count)| QueryBox::new(start, count).unwrap())
}

fn arb_pair() -> impl Strategy<Value = (QueryBox, QueryBox)> {
    (1usize..=4).prop_flat_map(|dim| (arb_box(dim), arb_box(dim)))
}

proptest! {
    #[test]
    fn prop_complement_split_is_disjoint_cover((outer, inner) in arb_pair()) {
        let pieces = outer.complement_split(&inner).unwrap();
        let overlap = outer.intersect(&inner).unwrap();

        prop_assert!(pieces.len() <= 2 * outer.dim() || overlap.is_empty());
        for (i, p) in pieces.iter().enumerate() {
            prop_assert!(!p.is_empty());
            prop_assert!(outer.contains(p));
            prop_assert!(disjoint(p, &overlap));
            for q in &pieces[i + 1..] {
                prop_assert!(disjoint(p, q));
            }
        }
        let total: u64 = pieces.iter().map(QueryBox::volume).sum();
        prop_assert_eq!(total + overlap.volume(), outer.volume());
    }

    #[test]
    fn prop_intersect_is_symmetric((a, b) in arb_pair()) {
        let ab = a.intersect(&b).unwrap();
        let ba = b.intersect(&a).unwrap();
        prop_assert_eq!(&ab, &ba);
        prop_assert!(ab.is_empty() || (a.contains(&ab) && b.contains(&ab)));
    }

    #[test]
    fn prop_key_string_round_trips(b in (1usize..=5).prop_flat_map(arb_box)) {
        let parsed: QueryBox = b.to_key_string().parse().unwrap();
        prop_assert_eq!(parsed, b);
    }
}
