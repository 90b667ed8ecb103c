/// Outcome of iterating a single point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// The orbit stayed within the threshold for every evaluated step.
    Bounded,
    /// `|z|` exceeded the threshold on step `iterations` (1-based).
    Escaped { iterations: u32 },
}

impl Membership {
    #[inline]
    pub fn is_bounded(self) -> bool {
        matches!(self, Self::Bounded)
    }
}

/// Returns `true` if `c` lies inside the main cardioid.
#[inline]
fn in_cardioid(re: f64, im: f64) -> bool {
    let im2 = im * im;
    let q = (re - 0.25) * (re - 0.25) + im2;
    q * (q + (re - 0.25)) <= 0.25 * im2
}

/// Returns `true` if `c` lies inside the period-2 bulb.
#[inline]
fn in_period2_bulb(re: f64, im: f64) -> bool {
    (re + 1.0) * (re + 1.0) + im * im <= 0.0625
}

/// Classify `c = re + im·i` under `z_{n+1} = z_n² + c`, `z_0 = 0`.
///
/// Runs at most `max_iterations` steps and reports `Escaped` on the first
/// step where `x² + y² > threshold²`. With `max_iterations == 0` no step is
/// evaluated and the point is `Bounded`.
///
/// Orbits inside the main cardioid and the period-2 bulb never leave the
/// disc of radius 2, so for `threshold >= 2` those points are answered
/// without iterating. Smaller thresholds always run the full recurrence.
#[inline]
pub fn classify(re: f64, im: f64, max_iterations: u32, threshold: f64) -> Membership {
    if max_iterations == 0 {
        return Membership::Bounded;
    }
    if threshold >= 2.0 && (in_cardioid(re, im) || in_period2_bulb(re, im)) {
        return Membership::Bounded;
    }

    let threshold_sq = threshold * threshold;
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;
    let mut n = 0_u32;

    while n < max_iterations {
        n += 1;
        let next_x = x * x - y * y + re;
        let next_y = 2.0 * x * y + im;
        x = next_x;
        y = next_y;
        if x * x + y * y > threshold_sq {
            return Membership::Escaped { iterations: n };
        }
    }

    Membership::Bounded
}
