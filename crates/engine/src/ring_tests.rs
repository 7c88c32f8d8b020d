use super::*;

#[test]
fn drops_oldest_when_full() {
    let mut ring = OutputRing::new(3);
    for n in 0..5 {
        ring.push(n.to_string());
    }
    assert_eq!(ring.lines(), vec!["2", "3", "4"]);
}

#[test]
fn empty_ring_has_no_lines() {
    let ring = OutputRing::new(10);
    assert!(ring.lines().is_empty());
}
