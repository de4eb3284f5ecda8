use super::types::FingerTally;

/// Finger count with the highest tally. Ties go to the lowest count, since
/// the tally is scanned 2 -> 5 and only a strictly greater tally replaces the
/// current pick. An all-zero tally owns nothing.
pub fn dominant_finger_count(tally: &FingerTally) -> Option<u8> {
    let mut best: Option<(u8, u32)> = None;
    for (finger_count, count) in tally.iter() {
        if count == 0 {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((finger_count, count)),
        }
    }
    best.map(|(finger_count, _)| finger_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(entries: &[(u8, u32)]) -> FingerTally {
        let mut tally = FingerTally::default();
        for &(finger_count, times) in entries {
            for _ in 0..times {
                tally.increment(finger_count);
            }
        }
        tally
    }

    #[test]
    fn highest_tally_wins() {
        assert_eq!(dominant_finger_count(&tally(&[(2, 1), (3, 4)])), Some(3));
        assert_eq!(dominant_finger_count(&tally(&[(5, 2), (4, 1)])), Some(5));
    }

    #[test]
    fn ties_go_to_lowest_finger_count() {
        assert_eq!(dominant_finger_count(&tally(&[(4, 3), (3, 3)])), Some(3));
        assert_eq!(
            dominant_finger_count(&tally(&[(2, 2), (3, 2), (4, 2), (5, 2)])),
            Some(2)
        );
        assert_eq!(dominant_finger_count(&tally(&[(5, 1), (4, 1)])), Some(4));
    }

    #[test]
    fn empty_tally_has_no_owner() {
        assert_eq!(dominant_finger_count(&FingerTally::default()), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let tally = tally(&[(2, 3), (3, 5), (4, 5)]);
        let first = dominant_finger_count(&tally);
        assert_eq!(first, Some(3));
        assert_eq!(dominant_finger_count(&tally), first);
    }
}
