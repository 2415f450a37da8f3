use crate::HALF_TURN;

/// Folds an accumulated rotation back into the open interval (-180°, 180°)
/// and returns the folded angle along with the number of half-turn seams that
/// were crossed.
///
/// This is a truncating remainder, so the sign of `rotation` is preserved and
/// exactly ±180° folds to 0° with one seam crossed. The seam count is signed.
pub fn fold_half_turns(rotation: f64) -> (f64, i64) {
    let seams = (rotation / HALF_TURN).trunc();
    (rotation % HALF_TURN, seams as i64)
}

/// Returns the angle that would bring `rotation` to the nearest neutral
/// orientation (-180°, 0°, or 180°), or 0 if `rotation` is farther than
/// `tolerance` degrees from all of them.
pub fn align_angle(rotation: f64, tolerance: f64) -> f64 {
    if rotation >= HALF_TURN - tolerance {
        HALF_TURN - rotation
    } else if rotation <= -HALF_TURN + tolerance {
        -HALF_TURN - rotation
    } else if rotation.abs() <= tolerance {
        -rotation
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::DEFAULT_SNAP_TOLERANCE;

    #[test]
    fn test_align_angle_bands() {
        let tol = DEFAULT_SNAP_TOLERANCE;
        assert_eq!(align_angle(170.0, tol), 10.0);
        assert_eq!(align_angle(-170.0, tol), -10.0);
        assert_eq!(align_angle(5.0, tol), -5.0);
        assert_eq!(align_angle(90.0, tol), 0.0);

        // Band edges are inclusive.
        assert_eq!(align_angle(165.0, tol), 15.0);
        assert_eq!(align_angle(-165.0, tol), -15.0);
        assert_eq!(align_angle(15.0, tol), -15.0);
        assert_eq!(align_angle(-15.0, tol), 15.0);
        assert_eq!(align_angle(15.5, tol), 0.0);
        assert_eq!(align_angle(164.5, tol), 0.0);

        assert_eq!(align_angle(0.0, tol), 0.0);
        assert_eq!(align_angle(40.0, 45.0), -40.0);
    }

    #[test]
    fn test_fold_half_turns() {
        assert_eq!(fold_half_turns(20.0), (20.0, 0));
        assert_eq!(fold_half_turns(200.0), (20.0, 1));
        assert_eq!(fold_half_turns(185.0), (5.0, 1));
        assert_eq!(fold_half_turns(180.0), (0.0, 1));
        assert_eq!(fold_half_turns(-180.0), (-0.0, -1));
        assert_eq!(fold_half_turns(-200.0), (-20.0, -1));
        assert_eq!(fold_half_turns(400.0), (40.0, 2));
        assert_eq!(fold_half_turns(-179.0), (-179.0, 0));
    }

    proptest! {
        #[test]
        fn proptest_fold_stays_in_range(rotation in -2000.0..2000.0_f64) {
            let (folded, seams) = fold_half_turns(rotation);
            prop_assert!(folded > -HALF_TURN && folded < HALF_TURN);
            prop_assert!((folded + seams as f64 * HALF_TURN - rotation).abs() < 1e-9);
        }

        #[test]
        fn proptest_align_lands_on_neutral(rotation in -179.9..179.9_f64) {
            let aligned = rotation + align_angle(rotation, DEFAULT_SNAP_TOLERANCE);
            let on_neutral = [-HALF_TURN, 0.0, HALF_TURN]
                .iter()
                .any(|&n| (aligned - n).abs() < 1e-9);
            prop_assert!(on_neutral || aligned == rotation);
        }
    }
}
